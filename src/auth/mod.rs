//! Login, Registration and Token Storage
//!
//! - **client**: `POST /auth` and `POST /user`
//! - **registration**: Form validation and phone masking
//! - **token**: File-backed bearer token store

mod client;
mod error;
mod registration;
mod token;

pub use client::{AuthClient, LoginResponse};
pub use error::{AuthError, RegistrationError, TokenError};
pub use registration::{format_phone, RegistrationPayload, Role, UserRegistration};
pub use token::TokenStore;
