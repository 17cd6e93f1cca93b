//! Access gate, staff sessions, and admin Basic auth.
//!
//! Staff prove themselves once with the shared access code and an
//! allow-listed name, and get a bearer token back. Administrators send HTTP
//! Basic credentials on every request.

use std::{
  collections::{BTreeSet, HashMap},
  sync::{PoisonError, RwLock},
};

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore as _};
use sculpt_core::{blob::BlobStore, store::SubmissionStore};
use sha2::{Digest, Sha256};

use crate::{AppState, error::Error};

// ─── Secrets ──────────────────────────────────────────────────────────────────

/// Check `secret` against an argon2 PHC string.
fn verify_secret(secret: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    tracing::error!("configured secret is not a valid argon2 PHC string");
    return false;
  };
  Argon2::default()
    .verify_password(secret.as_bytes(), &parsed)
    .is_ok()
}

// ─── Access gate ──────────────────────────────────────────────────────────────

/// The shared access code plus the employee allow-list.
pub struct AccessGate {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  access_code_hash: String,
  allowlist:        BTreeSet<String>,
}

impl AccessGate {
  pub fn new(access_code_hash: String, names: impl IntoIterator<Item = String>) -> Self {
    let allowlist = names
      .into_iter()
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty())
      .collect();
    Self { access_code_hash, allowlist }
  }

  /// The code is checked first, so a stranger learns nothing about the
  /// allow-list.
  pub fn verify(&self, name: &str, access_code: &str) -> Result<(), Error> {
    if !verify_secret(access_code, &self.access_code_hash) {
      return Err(Error::Unauthorized("invalid access code".into()));
    }
    if !self.allows(name) {
      return Err(Error::Forbidden(format!("{name} is not on the employee list")));
    }
    Ok(())
  }

  pub fn allows(&self, name: &str) -> bool { self.allowlist.contains(name.trim()) }

  /// Allow-listed names in sorted order.
  pub fn employees(&self) -> impl Iterator<Item = &str> {
    self.allowlist.iter().map(String::as_str)
  }
}

// ─── Sessions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Session {
  pub employee_name: String,
  pub expires_at:    DateTime<Utc>,
}

/// In-process session table. Only SHA-256 digests of tokens are kept.
pub struct Sessions {
  ttl:   Duration,
  table: RwLock<HashMap<String, Session>>,
}

fn token_digest(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

impl Sessions {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, table: RwLock::new(HashMap::new()) }
  }

  /// Mint a token for `employee_name`. Expired entries are pruned on the way.
  pub fn issue(&self, employee_name: &str) -> (String, Session) {
    let mut raw = [0u8; 32];
    OsRng.fill_bytes(&mut raw);
    let token = hex::encode(raw);

    let now = Utc::now();
    let session = Session {
      employee_name: employee_name.to_owned(),
      expires_at:    now + self.ttl,
    };

    let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
    table.retain(|_, s| s.expires_at > now);
    table.insert(token_digest(&token), session.clone());

    (token, session)
  }

  pub fn resolve(&self, token: &str) -> Option<Session> {
    let digest = token_digest(token);
    let session = self
      .table
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(&digest)
      .cloned()?;

    if session.expires_at <= Utc::now() {
      self
        .table
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&digest);
      return None;
    }
    Some(session)
  }
}

/// Extractor: a request carrying a live staff bearer token.
pub struct StaffSession(pub Session);

impl<S, B> FromRequestParts<AppState<S, B>> for StaffSession
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    let token = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.strip_prefix("Bearer "))
      .ok_or_else(|| Error::Unauthorized("missing session token".into()))?;

    state
      .sessions
      .resolve(token.trim())
      .map(StaffSession)
      .ok_or_else(|| Error::Unauthorized("session expired, verify again".into()))
  }
}

// ─── Admin ────────────────────────────────────────────────────────────────────

/// Credentials accepted for the admin surface.
#[derive(Clone)]
pub struct AdminCredentials {
  pub username:      String,
  /// PHC string produced by argon2.
  pub password_hash: String,
}

/// Verify HTTP Basic credentials directly from headers.
pub fn verify_admin(headers: &HeaderMap, creds: &AdminCredentials) -> Result<(), Error> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::AdminUnauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::AdminUnauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::AdminUnauthorized)?;
  let pair    = std::str::from_utf8(&decoded).map_err(|_| Error::AdminUnauthorized)?;

  let (username, password) = pair.split_once(':').ok_or(Error::AdminUnauthorized)?;

  if username != creds.username || !verify_secret(password, &creds.password_hash) {
    return Err(Error::AdminUnauthorized);
  }
  Ok(())
}

/// Zero-size marker: present in the handler means the admin authenticated.
pub struct Admin;

impl<S, B> FromRequestParts<AppState<S, B>> for Admin
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    verify_admin(&parts.headers, &state.admin)?;
    Ok(Admin)
  }
}
