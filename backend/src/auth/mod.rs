use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "pit_admin_session";

/// Subject carried by every admin session token.
const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("session expiry out of range")]
    Expiry,
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Compares both fields in constant time; no hashing, no lockout.
pub fn validate_credentials(config: &AppConfig, email: &str, password: &str) -> bool {
    let email_ok = constant_time_eq(email.as_bytes(), config.admin_email.as_bytes());
    let password_ok = constant_time_eq(password.as_bytes(), config.admin_password.as_bytes());
    email_ok & password_ok
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for (i, x) in a.iter().enumerate() {
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}

pub fn create_token(config: &AppConfig) -> Result<String, AuthError> {
    let ttl = Duration::try_hours(config.session_ttl_hours).ok_or(AuthError::Expiry)?;
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or(AuthError::Expiry)?
        .timestamp();
    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        exp: usize::try_from(expiration).map_err(|_| AuthError::Expiry)?,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn validate_token(token: &str, config: &AppConfig) -> Result<(), AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &Validation::default(),
    )?;
    if token_data.claims.sub != ADMIN_SUBJECT {
        return Err(AuthError::Token(
            jsonwebtoken::errors::ErrorKind::InvalidSubject.into(),
        ));
    }
    Ok(())
}

/// `Set-Cookie` value that opens an admin session.
pub fn create_session(config: &AppConfig) -> Result<String, AuthError> {
    let token = create_token(config)?;
    Ok(session_cookie(config, &token, config.session_ttl_hours * 60 * 60))
}

/// `Set-Cookie` value that clears the admin session.
pub fn destroy_session(config: &AppConfig) -> String {
    session_cookie(config, "", 0)
}

fn session_cookie(config: &AppConfig, value: &str, max_age: i64) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Reads a cookie from every `Cookie` header of the request.
fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn is_authenticated(headers: &HeaderMap, config: &AppConfig) -> bool {
    match read_cookie(headers, SESSION_COOKIE) {
        Some(token) if !token.is_empty() => match validate_token(token, config) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Rejected admin session: {}", e);
                false
            }
        },
        _ => false,
    }
}

pub async fn authenticate(
    State(state): State<AppState>,
    request: Request,
    next: middleware::Next,
) -> Result<Response, AppError> {
    if !is_authenticated(request.headers(), &state.config) {
        return Err(AppError::Unauthorized);
    }
    log::info!("Authenticated admin for {} {}", request.method(), request.uri());
    Ok(next.run(request).await)
}
