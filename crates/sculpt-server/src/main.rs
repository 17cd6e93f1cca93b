//! sculpt-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `SCULPT_*` environment variables, opens the SQLite record store and the
//! upload directory, and serves the portal over HTTP.
//!
//! # Secret hash generation
//!
//! `access_code_hash` and `admin_password_hash` are argon2 PHC strings:
//!
//! ```sh
//! cargo run -p sculpt-server -- --hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use sculpt_blob_fs::FsBlobStore;
use sculpt_server::{AppState, ServerConfig};
use sculpt_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sculpt submission portal server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a secret entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let secret = read_secret()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(secret.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SCULPT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let employees = load_employees(&server_cfg)?;
  if employees.is_empty() {
    tracing::warn!("employee allow-list is empty; nobody can verify");
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let upload_dir = expand_tilde(&server_cfg.upload_dir);
  let blobs = FsBlobStore::open(&upload_dir, server_cfg.public_prefix.clone())
    .await
    .with_context(|| format!("failed to prepare upload dir {upload_dir:?}"))?;

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!(
    employees = employees.len(),
    store = %store_path.display(),
    uploads = %upload_dir.display(),
    "configuration loaded"
  );

  let state = AppState::new(server_cfg, store, blobs, employees);
  let app = sculpt_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Inline `employees` plus the names in `employees_file`, deduplicated.
fn load_employees(cfg: &ServerConfig) -> anyhow::Result<Vec<String>> {
  let mut names = cfg.employees.clone();

  if let Some(file) = &cfg.employees_file {
    let file = expand_tilde(file);
    let raw = std::fs::read_to_string(&file)
      .with_context(|| format!("failed to read employees file {file:?}"))?;
    let listed: Vec<String> = serde_json::from_str(&raw)
      .with_context(|| format!("{file:?} is not a JSON array of names"))?;
    names.extend(listed);
  }

  names.sort();
  names.dedup();
  Ok(names)
}

/// Read a secret from stdin.
fn read_secret() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Secret: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
