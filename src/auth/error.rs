use thiserror::Error;

/// Errors talking to the auth and user endpoints
#[derive(Error, Debug)]
pub enum AuthError {
    /// The server answered with a non-success status. `message` is shown to the user.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Auth service unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

impl AuthError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AuthError::Timeout
        } else if e.is_connect() {
            AuthError::Unavailable
        } else {
            AuthError::Request(e)
        }
    }
}

/// Registration form problems caught before anything is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("Las contraseñas no coinciden.")]
    PasswordMismatch,

    #[error("El campo {0} es obligatorio")]
    MissingField(&'static str),

    #[error("Edad inválida: {0}")]
    InvalidAge(String),

    #[error("Rol desconocido: {0}")]
    UnknownRole(String),
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("No configuration directory available for the token file")]
    NoConfigDir,

    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),
}
