//! User registration form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::RegistrationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Profesor,
    Alumno,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Profesor, Role::Alumno];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Profesor => "profesor",
            Role::Alumno => "alumno",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistrationError::UnknownRole(s.to_string()))
    }
}

/// Registration form contents as typed by the user
#[derive(Debug, Clone, Default)]
pub struct UserRegistration {
    pub user_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub age: String,
    pub address: String,
    pub role: Option<Role>,
}

/// Body of `POST /user`. The password confirmation never leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationPayload {
    pub user_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub age: u32,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "rol")]
    pub role: Role,
}

impl UserRegistration {
    /// Check the form the way the submit button does
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.password != self.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }
        let required = [
            ("nombre", &self.user_name),
            ("apellido", &self.last_name),
            ("correo", &self.email),
            ("contraseña", &self.password),
            ("edad", &self.age),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(RegistrationError::MissingField(field));
            }
        }
        self.parsed_age()?;
        if self.role.is_none() {
            return Err(RegistrationError::MissingField("rol"));
        }
        Ok(())
    }

    pub fn to_payload(&self) -> Result<RegistrationPayload, RegistrationError> {
        self.validate()?;
        let role = self.role.ok_or(RegistrationError::MissingField("rol"))?;
        Ok(RegistrationPayload {
            user_name: self.user_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: format_phone(&self.phone),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            age: self.parsed_age()?,
            address: self.address.trim().to_string(),
            role,
        })
    }

    fn parsed_age(&self) -> Result<u32, RegistrationError> {
        self.age
            .trim()
            .parse()
            .map_err(|_| RegistrationError::InvalidAge(self.age.clone()))
    }
}

/// Mask a phone number as `DDD-DDD-DDDD`, keeping at most ten digits.
///
/// Non-digits are dropped; up to three digits are returned unmasked.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(10).collect();
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}
