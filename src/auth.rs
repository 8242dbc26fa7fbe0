//! Account login, registration and the stored session token
//!
//! Failures carry the banner text shown to the user: the backend's `detail`
//! when it sent one, otherwise a generic message. A token is stored only
//! after a successful exchange.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::gateway::{BackendClient, GatewayError};

mod token_store;

pub use token_store::TokenStore;

/// Storage key holding the access token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";

pub const MIN_PASSWORD_LEN: usize = 6;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Form rejected before anything was sent
    #[error("{0}")]
    Validation(String),

    /// Backend refused the request
    #[error("{0}")]
    Rejected(String),

    #[error("Response did not contain an access token")]
    MissingToken,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Failed to store auth token: {0}")]
    Storage(#[from] std::io::Error),
}

/// Sign-up form as entered, including the confirmation field
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub software_experience: String,
    pub hardware_experience: String,
    pub robotics_knowledge: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
    software_experience: &'a str,
    hardware_experience: &'a str,
    robotics_knowledge: &'a str,
}

impl<'a> From<&'a RegistrationForm> for RegisterBody<'a> {
    fn from(form: &'a RegistrationForm) -> Self {
        RegisterBody {
            email: &form.email,
            password: &form.password,
            software_experience: &form.software_experience,
            hardware_experience: &form.hardware_experience,
            robotics_knowledge: &form.robotics_knowledge,
        }
    }
}

/// Local checks run before a registration is sent
pub fn validate_registration(form: &RegistrationForm) -> Result<(), AuthError> {
    if form.password != form.confirm_password {
        return Err(AuthError::Validation("Passwords do not match".to_string()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Banner text for a failed auth response
///
/// `detail` may be a plain string or a list of validation entries with a
/// `msg` each.
pub fn extract_detail(body: &Value, fallback: &str) -> String {
    match body.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::Array(entries)) if !entries.is_empty() => entries
            .iter()
            .map(|entry| {
                entry
                    .get("msg")
                    .and_then(Value::as_str)
                    .filter(|msg| !msg.is_empty())
                    .unwrap_or("Validation error")
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => fallback.to_string(),
    }
}

fn accept_token(
    store: &TokenStore,
    status: u16,
    body: &Value,
    fallback: &str,
) -> Result<String, AuthError> {
    if !(200..300).contains(&status) {
        log::debug!("Auth request rejected with status {}", status);
        return Err(AuthError::Rejected(extract_detail(body, fallback)));
    }

    let token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    store.save(token)?;
    Ok(token.to_string())
}

/// `POST /auth/login`; stores and returns the access token
pub async fn login(
    client: &BackendClient,
    store: &TokenStore,
    email: &str,
    password: &str,
) -> Result<String, AuthError> {
    let (status, body) = client
        .post_value(LOGIN_PATH, &LoginBody { email, password })
        .await?;
    accept_token(store, status, &body, LOGIN_FAILED)
}

/// Validate the form, then `POST /auth/register`; stores and returns the token
pub async fn register(
    client: &BackendClient,
    store: &TokenStore,
    form: &RegistrationForm,
) -> Result<String, AuthError> {
    validate_registration(form)?;
    let (status, body) = client
        .post_value(REGISTER_PATH, &RegisterBody::from(form))
        .await?;
    accept_token(store, status, &body, REGISTRATION_FAILED)
}

/// Forget the stored token
pub fn logout(store: &TokenStore) -> Result<(), AuthError> {
    store.clear()?;
    Ok(())
}

/// `sub` claim of a JWT, for display only
///
/// The signature is not checked.
pub fn decode_subject(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims
        .get("sub")
        .and_then(Value::as_str)
        .filter(|sub| !sub.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod auth_tests;
