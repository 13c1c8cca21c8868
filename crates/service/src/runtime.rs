//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure writable runtime directories exist before serving traffic.
pub async fn ensure_env(upload_dir: &str, data_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(upload_dir, data_dir).await
}
