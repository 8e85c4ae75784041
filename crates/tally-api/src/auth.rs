//! HTTP Basic-auth extractors.
//!
//! Two fixed principals are configured per server instance: an admin and an
//! agency account. Handlers take [`Session`] to require any authenticated
//! caller, or [`AdminSession`] to additionally require the admin role.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use tally_core::store::ReportStore;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Admin,
  Agency,
}

/// One configured account.
#[derive(Clone)]
pub struct Principal {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub principals: Vec<Principal>,
}

/// An authenticated caller.
pub struct Session {
  pub role: Role,
}

/// Marker: present in the handler means the caller authenticated as admin.
pub struct AdminSession;

/// Verify credentials directly from headers.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<Session, ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let principal = config
    .principals
    .iter()
    .find(|p| p.username == username)
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&principal.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(Session { role: principal.role })
}

impl<S> FromRequestParts<AppState<S>> for Session
where
  S: ReportStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth)
  }
}

impl<S> FromRequestParts<AppState<S>> for AdminSession
where
  S: ReportStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let session = verify_auth(&parts.headers, &state.auth)?;
    if session.role != Role::Admin {
      return Err(ApiError::Forbidden);
    }
    Ok(AdminSession)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::http::header;
  use rand_core::OsRng;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn make_config() -> AuthConfig {
    AuthConfig {
      principals: vec![
        Principal {
          username:      "admin".to_string(),
          password_hash: hash("admin-secret"),
          role:          Role::Admin,
        },
        Principal {
          username:      "agency".to_string(),
          password_hash: hash("agency-secret"),
          role:          Role::Agency,
        },
      ],
    }
  }

  fn headers_with_basic(user: &str, pass: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let encoded = B64.encode(format!("{user}:{pass}"));
    headers.insert(
      header::AUTHORIZATION,
      format!("Basic {encoded}").parse().unwrap(),
    );
    headers
  }

  #[test]
  fn correct_credentials_resolve_role() {
    let config = make_config();
    let session =
      verify_auth(&headers_with_basic("admin", "admin-secret"), &config).unwrap();
    assert_eq!(session.role, Role::Admin);
    let session =
      verify_auth(&headers_with_basic("agency", "agency-secret"), &config)
        .unwrap();
    assert_eq!(session.role, Role::Agency);
  }

  #[test]
  fn wrong_password_is_unauthorized() {
    let config = make_config();
    let result = verify_auth(&headers_with_basic("admin", "wrong"), &config);
    assert!(matches!(result, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn unknown_user_is_unauthorized() {
    let config = make_config();
    let result = verify_auth(&headers_with_basic("nobody", "x"), &config);
    assert!(matches!(result, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn missing_header_is_unauthorized() {
    let config = make_config();
    let result = verify_auth(&HeaderMap::new(), &config);
    assert!(matches!(result, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn invalid_base64_is_unauthorized() {
    let config = make_config();
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      "Basic !!!not-base64!!!".parse().unwrap(),
    );
    let result = verify_auth(&headers, &config);
    assert!(matches!(result, Err(ApiError::Unauthorized)));
  }
}
