//! HTTP surface for the Sculpt submission portal.
//!
//! Exposes an axum [`Router`] over any [`SubmissionStore`] and [`BlobStore`]
//! pair: the staff verify/upload flow, the admin roster with model
//! management, blob delivery, and a health check.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod view;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, post},
};
use chrono::Duration;
use sculpt_core::{Limits, SubmissionLifecycle, blob::BlobStore, store::SubmissionStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AccessGate, AdminCredentials, Sessions};
use handlers::{admin, health, submission, uploads, verify};

/// Room for multipart boundaries and text fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Sessions never outlive this, whatever the configuration says.
const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SCULPT_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  #[serde(default = "default_upload_dir")]
  pub upload_dir:          PathBuf,
  /// Prefix of every locator handed out, e.g. `/api/uploads`.
  #[serde(default = "default_public_prefix")]
  pub public_prefix:       String,
  /// argon2 PHC string of the shared staff access code.
  pub access_code_hash:    String,
  #[serde(default)]
  pub employees:           Vec<String>,
  /// JSON array of names, merged with `employees`.
  #[serde(default)]
  pub employees_file:      Option<PathBuf>,
  #[serde(default = "default_admin_username")]
  pub admin_username:      String,
  pub admin_password_hash: String,
  #[serde(default = "default_max_photo_bytes")]
  pub max_photo_bytes:     usize,
  #[serde(default = "default_max_model_bytes")]
  pub max_model_bytes:     usize,
  #[serde(default = "default_session_ttl_secs")]
  pub session_ttl_secs:    u64,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("sculpt.db") }
fn default_upload_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_public_prefix() -> String { "/api/uploads".into() }
fn default_admin_username() -> String { "admin".into() }
fn default_max_photo_bytes() -> usize { Limits::default().max_photo_bytes }
fn default_max_model_bytes() -> usize { Limits::default().max_model_bytes }
fn default_session_ttl_secs() -> u64 { 12 * 60 * 60 }

impl ServerConfig {
  pub fn limits(&self) -> Limits {
    Limits {
      max_photo_bytes: self.max_photo_bytes,
      max_model_bytes: self.max_model_bytes,
    }
  }

  pub fn session_ttl(&self) -> Duration {
    let secs = self.session_ttl_secs.min(MAX_SESSION_TTL_SECS);
    Duration::seconds(secs as i64)
  }

  /// Largest request body the router accepts.
  pub fn body_limit(&self) -> usize {
    self.max_photo_bytes.max(self.max_model_bytes) + MULTIPART_OVERHEAD
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, B> {
  pub lifecycle: Arc<SubmissionLifecycle<S, B>>,
  pub gate:      Arc<AccessGate>,
  pub sessions:  Arc<Sessions>,
  pub admin:     Arc<AdminCredentials>,
  pub config:    Arc<ServerConfig>,
}

// Manual impl: the stores sit behind `Arc` and need not be `Clone`.
impl<S, B> Clone for AppState<S, B> {
  fn clone(&self) -> Self {
    Self {
      lifecycle: Arc::clone(&self.lifecycle),
      gate:      Arc::clone(&self.gate),
      sessions:  Arc::clone(&self.sessions),
      admin:     Arc::clone(&self.admin),
      config:    Arc::clone(&self.config),
    }
  }
}

impl<S, B> AppState<S, B>
where
  S: SubmissionStore,
  B: BlobStore,
{
  /// Wire the stores, gate and session table from `config`. `employees` is
  /// the fully resolved allow-list.
  pub fn new(config: ServerConfig, store: S, blobs: B, employees: Vec<String>) -> Self {
    let lifecycle = SubmissionLifecycle::new(Arc::new(store), Arc::new(blobs), config.limits());
    Self {
      lifecycle: Arc::new(lifecycle),
      gate:      Arc::new(AccessGate::new(config.access_code_hash.clone(), employees)),
      sessions:  Arc::new(Sessions::new(config.session_ttl())),
      admin:     Arc::new(AdminCredentials {
        username:      config.admin_username.clone(),
        password_hash: config.admin_password_hash.clone(),
      }),
      config:    Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the portal.
pub fn router<S, B>(state: AppState<S, B>) -> Router
where
  S: SubmissionStore + 'static,
  B: BlobStore + 'static,
{
  let body_limit = state.config.body_limit();

  Router::new()
    .route("/api/verify",                          post(verify::handler::<S, B>))
    .route("/api/submission",                      get(submission::get_own::<S, B>).post(submission::upload_photo::<S, B>))
    .route("/api/admin/submissions",               get(admin::roster::<S, B>))
    .route("/api/admin/submissions/{name}/model",  post(admin::upload_model::<S, B>).delete(admin::delete_model::<S, B>))
    .route("/api/admin/submissions/{name}/photo",  delete(admin::delete_photo::<S, B>))
    .route("/api/uploads/{*path}",                 get(uploads::handler::<S, B>))
    .route("/api/health",                          get(health::handler::<S, B>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use rand_core::OsRng;
  use sculpt_blob_fs::FsBlobStore;
  use sculpt_core::submission::{Submission, SubmissionPatch};
  use sculpt_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  const ACCESS_CODE: &str = "Canovo2025";
  const ADMIN_PASSWORD: &str = "sculptify2025";
  const BOUNDARY: &str = "sculpt-test-boundary";

  type State = AppState<SqliteStore, FsBlobStore>;

  /// Cheap parameters; verification reads them back from the PHC string.
  fn hash(secret: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(1024, 1, 1, None).unwrap();
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
      .hash_password(secret.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn test_config(dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
      host:                "127.0.0.1".into(),
      port:                3000,
      store_path:          PathBuf::from(":memory:"),
      upload_dir:          dir.join("uploads"),
      public_prefix:       "/api/uploads".into(),
      access_code_hash:    hash(ACCESS_CODE),
      employees:           vec![],
      employees_file:      None,
      admin_username:      "admin".into(),
      admin_password_hash: hash(ADMIN_PASSWORD),
      max_photo_bytes:     1024,
      max_model_bytes:     4096,
      session_ttl_secs:    3600,
    }
  }

  async fn make_state() -> (State, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open_in_memory().await.unwrap();
    let blobs = FsBlobStore::open(dir.path().join("uploads"), "/api/uploads")
      .await
      .unwrap();

    let config = test_config(dir.path());
    let employees = vec!["Alice".to_string(), "Bob".to_string(), "张伟".to_string()];
    (AppState::new(config, store, blobs, employees), dir)
  }

  fn admin_header() -> String {
    format!("Basic {}", B64.encode(format!("admin:{ADMIN_PASSWORD}")))
  }

  /// A multipart body with one file part and any number of text parts.
  fn multipart(file_field: &str, file_name: &str, bytes: &[u8], texts: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in texts {
      body.extend_from_slice(
        format!(
          "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .as_bytes(),
      );
    }
    body.extend_from_slice(
      format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{file_field}\"; \
         filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
      )
      .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
  }

  async fn send<S, B>(
    state:   &AppState<S, B>,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, String)>,
    body:    Vec<u8>,
  ) -> Response
  where
    S: SubmissionStore + 'static,
    B: BlobStore + 'static,
  {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body)).unwrap();
    router(state.clone()).oneshot(req).await.unwrap()
  }

  async fn body_bytes(resp: Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap()
      .to_vec()
  }

  async fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
  }

  async fn verify<S, B>(state: &AppState<S, B>, name: &str, code: &str) -> Response
  where
    S: SubmissionStore + 'static,
    B: BlobStore + 'static,
  {
    let body = json!({ "name": name, "accessCode": code }).to_string();
    send(
      state,
      "POST",
      "/api/verify",
      vec![(header::CONTENT_TYPE, "application/json".into())],
      body.into_bytes(),
    )
    .await
  }

  async fn login<S, B>(state: &AppState<S, B>, name: &str) -> String
  where
    S: SubmissionStore + 'static,
    B: BlobStore + 'static,
  {
    let resp = verify(state, name, ACCESS_CODE).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    format!("Bearer {}", json["token"].as_str().unwrap())
  }

  async fn upload_photo<S, B>(
    state:     &AppState<S, B>,
    bearer:    &str,
    file_name: &str,
    bytes:     &[u8],
  ) -> Response
  where
    S: SubmissionStore + 'static,
    B: BlobStore + 'static,
  {
    send(
      state,
      "POST",
      "/api/submission",
      vec![
        (header::AUTHORIZATION, bearer.to_owned()),
        (header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")),
      ],
      multipart("photo", file_name, bytes, &[]),
    )
    .await
  }

  async fn upload_model(state: &State, uri_name: &str, bytes: &[u8]) -> Response {
    send(
      state,
      "POST",
      &format!("/api/admin/submissions/{uri_name}/model"),
      vec![
        (header::AUTHORIZATION, admin_header()),
        (header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")),
      ],
      multipart("model", "bust.glb", bytes, &[]),
    )
    .await
  }

  async fn admin(state: &State, method: &str, uri: &str) -> Response {
    send(state, method, uri, vec![(header::AUTHORIZATION, admin_header())], vec![]).await
  }

  /// Locators use the default public prefix, so they are request paths.
  fn delivery_uri(locator: &Value) -> String { locator.as_str().unwrap().to_owned() }

  // ── Verify ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn verify_checks_code_then_allowlist() {
    let (state, _dir) = make_state().await;

    let resp = verify(&state, "Alice", "wrong").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(resp).await["error"].is_string());

    let resp = verify(&state, "Mallory", ACCESS_CODE).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = verify(&state, "  Alice ", ACCESS_CODE).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["employeeName"], "Alice");
    assert_eq!(json["token"].as_str().unwrap().len(), 64);
    assert!(json["expiresAt"].is_string());
  }

  #[tokio::test]
  async fn verify_rejects_malformed_body() {
    let (state, _dir) = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/api/verify",
      vec![(header::CONTENT_TYPE, "application/json".into())],
      b"{\"name\":".to_vec(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = verify(&state, "   ", ACCESS_CODE).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Staff surface ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn staff_photo_flow() {
    let (state, _dir) = make_state().await;
    let bearer = login(&state, "Alice").await;

    let resp = send(&state, "GET", "/api/submission", vec![(header::AUTHORIZATION, bearer.clone())], vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_json(resp).await.is_null());

    let resp = upload_photo(&state, &bearer, "me.JPG", b"jpeg bytes").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["employeeName"], "Alice");
    assert_eq!(json["stage"], "pending");
    assert_eq!(json["stageLabel"], "待处理");
    let locator = json["photoLocator"].as_str().unwrap();
    assert!(locator.starts_with("/api/uploads/photos/photo_QWxpY2U_"));
    assert!(locator.ends_with(".jpg"));

    let resp = send(&state, "GET", "/api/submission", vec![(header::AUTHORIZATION, bearer)], vec![]).await;
    let json = body_json(resp).await;
    assert_eq!(json["photoLocator"], locator);
  }

  #[tokio::test]
  async fn staff_requires_a_session() {
    let (state, _dir) = make_state().await;

    let resp = send(&state, "GET", "/api/submission", vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = upload_photo(&state, "Bearer not-a-token", "me.jpg", b"jpeg").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn staff_cannot_upload_for_someone_else() {
    let (state, _dir) = make_state().await;
    let bearer = login(&state, "Alice").await;

    let resp = send(
      &state,
      "POST",
      "/api/submission",
      vec![
        (header::AUTHORIZATION, bearer),
        (header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")),
      ],
      multipart("photo", "me.jpg", b"jpeg", &[("employeeName", "Bob")]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(state.lifecycle.get_submission("Bob").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn staff_upload_validation() {
    let (state, _dir) = make_state().await;
    let bearer = login(&state, "Alice").await;

    let resp = upload_photo(&state, &bearer, "me.gif", b"gif").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = upload_photo(&state, &bearer, "me.jpg", b"").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = upload_photo(&state, &bearer, "me.jpg", &[0u8; 2048]).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let resp = send(
      &state,
      "POST",
      "/api/submission",
      vec![
        (header::AUTHORIZATION, bearer),
        (header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")),
      ],
      multipart("selfie", "me.jpg", b"jpeg", &[]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(state.lifecycle.get_submission("Alice").await.unwrap().is_none());
  }

  // ── Admin surface ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_requires_basic_auth() {
    let (state, _dir) = make_state().await;

    let resp = send(&state, "GET", "/api/admin/submissions", vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_some());

    let wrong = format!("Basic {}", B64.encode("admin:guess"));
    let resp = send(&state, "GET", "/api/admin/submissions", vec![(header::AUTHORIZATION, wrong)], vec![]).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A staff token is not an admin credential.
    let bearer = login(&state, "Alice").await;
    let resp = send(&state, "DELETE", "/api/admin/submissions/Alice/photo", vec![(header::AUTHORIZATION, bearer)], vec![]).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn admin_full_lifecycle() {
    let (state, _dir) = make_state().await;
    let bearer = login(&state, "Alice").await;
    let photo = body_json(upload_photo(&state, &bearer, "alice.png", b"png bytes").await).await;
    let photo_uri = delivery_uri(&photo["photoLocator"]);

    // Roster: allow-list order, Alice pending, others none.
    let roster = body_json(admin(&state, "GET", "/api/admin/submissions").await).await;
    let rows = roster.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["employeeName"], "Alice");
    assert_eq!(rows[0]["stage"], "pending");
    assert_eq!(rows[1]["employeeName"], "Bob");
    assert_eq!(rows[1]["stage"], "none");
    assert_eq!(rows[1]["stageLabel"], "未上传");
    assert!(rows[1]["submission"].is_null());

    // Model upload completes the submission.
    let resp = upload_model(&state, "Alice", b"glTF binary").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["stage"], "completed");
    assert_eq!(json["status"], "completed");
    assert_eq!(json["stageLabel"], "已完成");
    let model_uri = delivery_uri(&json["modelLocator"]);
    assert!(model_uri.starts_with("/api/uploads/models/model_QWxpY2U_"));

    // Delivery.
    let resp = send(&state, "GET", &model_uri, vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "model/gltf-binary");
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "public, max-age=31536000, immutable");
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(resp.headers()[header::CONTENT_LENGTH], "11");
    assert_eq!(body_bytes(resp).await, b"glTF binary");

    let resp = send(&state, "GET", &photo_uri, vec![], vec![]).await;
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");

    // Delete model: back to pending, file gone.
    let resp = admin(&state, "DELETE", "/api/admin/submissions/Alice/model").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["stage"], "pending");
    assert!(json["modelLocator"].is_null());
    let resp = send(&state, "GET", &model_uri, vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Delete photo: submission removed, second delete is 404.
    let resp = admin(&state, "DELETE", "/api/admin/submissions/Alice/photo").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&state, "GET", &photo_uri, vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = admin(&state, "DELETE", "/api/admin/submissions/Alice/photo").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&state, "GET", "/api/submission", vec![(header::AUTHORIZATION, bearer)], vec![]).await;
    assert!(body_json(resp).await.is_null());
  }

  #[tokio::test]
  async fn delete_photo_cascades_to_model() {
    let (state, _dir) = make_state().await;
    let bearer = login(&state, "张伟").await;
    upload_photo(&state, &bearer, "z.jpeg", b"jpeg").await;

    // Percent-encoded UTF-8 path segment.
    let encoded = "%E5%BC%A0%E4%BC%9F";
    let json = body_json(upload_model(&state, encoded, b"glTF").await).await;
    let model_uri = delivery_uri(&json["modelLocator"]);

    let resp = admin(&state, "DELETE", &format!("/api/admin/submissions/{encoded}/photo")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&state, "GET", &model_uri, vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn model_operations_need_a_submission() {
    let (state, _dir) = make_state().await;

    let resp = upload_model(&state, "Bob", b"glTF").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_json(resp).await["error"].is_string());

    let resp = admin(&state, "DELETE", "/api/admin/submissions/Bob/model").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // No blob was written for the rejected model.
    let models = std::fs::read_dir(state.config.upload_dir.join("models")).unwrap().count();
    assert_eq!(models, 0);
  }

  #[tokio::test]
  async fn model_must_be_glb() {
    let (state, _dir) = make_state().await;
    let bearer = login(&state, "Alice").await;
    upload_photo(&state, &bearer, "a.jpg", b"jpeg").await;

    let resp = send(
      &state,
      "POST",
      "/api/admin/submissions/Alice/model",
      vec![
        (header::AUTHORIZATION, admin_header()),
        (header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}")),
      ],
      multipart("model", "bust.obj", b"o cube", &[]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Delivery / health ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn delivery_refuses_traversal_and_missing() {
    let (state, dir) = make_state().await;
    std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();

    let resp = send(&state, "GET", "/api/uploads/%2E%2E%2Fsecret.txt", vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&state, "GET", "/api/uploads/photos/missing.jpg", vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // In-flight writes and stray files under the root are not blobs.
    let root = &state.config.upload_dir;
    std::fs::write(root.join(".tmp/inflight"), b"half a file").unwrap();
    std::fs::write(root.join("stray.txt"), b"not a blob").unwrap();
    for uri in ["/api/uploads/.tmp/inflight", "/api/uploads/stray.txt"] {
      let resp = send(&state, "GET", uri, vec![], vec![]).await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri} was served");
    }
  }

  // ── Record store failures ───────────────────────────────────────────────────

  #[derive(Debug, thiserror::Error)]
  #[error("disk I/O error at /var/lib/sculpt/sculpt.db")]
  struct DiskError;

  /// Reads as empty and refuses every write.
  struct BrokenStore;

  impl SubmissionStore for BrokenStore {
    type Error = DiskError;

    async fn find_by_name(&self, _name: &str) -> Result<Option<Submission>, DiskError> { Ok(None) }

    async fn upsert(&self, _name: &str, _patch: SubmissionPatch) -> Result<Submission, DiskError> {
      Err(DiskError)
    }

    async fn update(
      &self,
      _name: &str,
      _patch: SubmissionPatch,
    ) -> Result<Option<Submission>, DiskError> {
      Err(DiskError)
    }

    async fn delete_by_name(&self, _name: &str) -> Result<bool, DiskError> { Err(DiskError) }

    async fn list(&self) -> Result<Vec<Submission>, DiskError> { Ok(vec![]) }

    async fn ping(&self) -> Result<(), DiskError> { Err(DiskError) }
  }

  #[tokio::test]
  async fn record_store_failure_is_a_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = FsBlobStore::open(dir.path().join("uploads"), "/api/uploads")
      .await
      .unwrap();
    let state = AppState::new(test_config(dir.path()), BrokenStore, blobs, vec!["Alice".into()]);
    let bearer = login(&state, "Alice").await;

    let resp = upload_photo(&state, &bearer, "a.jpg", b"jpeg").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = body_json(resp).await["error"].as_str().unwrap().to_owned();
    assert!(!message.contains("disk I/O"), "leaked: {message}");
    assert!(!message.contains("/var/lib"), "leaked: {message}");

    // The photo blob was written before the record failed and stays behind.
    let photos = std::fs::read_dir(dir.path().join("uploads/photos")).unwrap().count();
    assert_eq!(photos, 1);

    let resp = send(&state, "GET", "/api/health", vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await["status"], "error");
  }

  #[tokio::test]
  async fn health_reports_ok() {
    let (state, _dir) = make_state().await;
    let resp = send(&state, "GET", "/api/health", vec![], vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
  }

  #[test]
  fn config_defaults_fill_in() {
    let cfg: ServerConfig = serde_json::from_value(json!({
      "access_code_hash": "x",
      "admin_password_hash": "y",
    }))
    .unwrap();
    assert_eq!(cfg.public_prefix, "/api/uploads");
    assert_eq!(cfg.admin_username, "admin");
    assert_eq!(cfg.limits().max_photo_bytes, 10 * 1024 * 1024);
    assert_eq!(cfg.limits().max_model_bytes, 50 * 1024 * 1024);
    assert_eq!(cfg.session_ttl(), Duration::hours(12));
    assert_eq!(cfg.body_limit(), 51 * 1024 * 1024);
  }
}
