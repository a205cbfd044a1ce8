//! Login and registration payloads.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use rahat_core::{Email, EmailError};

use super::User;

/// Credentials submitted to `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

impl LoginCredentials {
    /// Build credentials from raw form input.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email is not shaped like an address.
    pub fn new(email: &str, password: impl Into<String>) -> Result<Self, EmailError> {
        Ok(Self {
            email: Email::parse(email)?,
            password: SecretString::from(password.into()),
        })
    }
}

/// Payload of `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub name: String,
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    #[serde(serialize_with = "expose")]
    pub password_confirmation: SecretString,
}

/// Response of login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(deserialize_with = "secret")]
    pub token: SecretString,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}
