//! Bearer token storage
//!
//! The token returned by login is kept in a single file and read back whenever a chat
//! connection is opened.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::error::TokenError;

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config_dir>/agenda/token`
    pub fn default_location() -> Result<Self, TokenError> {
        let dir = dirs::config_dir().ok_or(TokenError::NoConfigDir)?;
        Ok(Self::new(dir.join("agenda").join("token")))
    }

    /// Use `path` if given, else the default location
    pub fn resolve(path: Option<&Path>) -> Result<Self, TokenError> {
        match path {
            Some(path) => Ok(Self::new(path)),
            None => Self::default_location(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, token: &str) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %self.path.display(), "Token saved");
        Ok(())
    }

    /// The stored token, or `None` if nothing is stored
    pub fn load(&self) -> Result<Option<String>, TokenError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Forget the token. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), TokenError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_clear() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token"));

        assert_eq!(store.load().unwrap(), None);
        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_blank_file_is_no_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "  \n").unwrap();

        assert_eq!(TokenStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        let store = TokenStore::resolve(Some(path.as_path())).unwrap();
        assert_eq!(store.path(), path.as_path());
    }
}
