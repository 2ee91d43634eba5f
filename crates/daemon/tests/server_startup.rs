//! Startup failures of the `p2n` binary.
//!
//! Every case here must exit before any network access.

use std::io::Write;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tempfile::{NamedTempFile, TempDir};
use tokio::time::timeout;

/// Legacy variables that would otherwise leak in from the host.
const LEGACY_ENV: [&str; 10] = [
    "PRETIX_EVENT_SLUG",
    "PRETIX_API_TOKEN",
    "PRETIX_API_TOKEN_SECRET_NAME",
    "NEXTCLOUD_USERNAME",
    "NEXTCLOUD_USERNAME_SECRET_NAME",
    "NEXTCLOUD_PASSWORD",
    "NEXTCLOUD_PASSWORD_SECRET_NAME",
    "RUN_ONCE",
    "LOGGING_LEVEL",
    "TZ",
];

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

async fn run_binary(config_path: &Path, secrets_dir: &Path, env: &[(&str, &str)]) -> Output {
    let mut command = tokio::process::Command::new(env!("CARGO_BIN_EXE_p2n"));
    command
        .env("P2N_CONFIG", config_path)
        .env("P2N_SECRETS_DIR", secrets_dir)
        .env("RUST_LOG", "error");
    for name in LEGACY_ENV {
        command.env_remove(name);
    }
    for (name, value) in env {
        command.env(name, value);
    }

    timeout(Duration::from_secs(10), command.output())
        .await
        .expect("Command timed out")
        .expect("Failed to execute command")
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let secrets = TempDir::new().unwrap();
    let result = run_binary(Path::new("/nonexistent/p2n.toml"), secrets.path(), &[]).await;

    assert_eq!(result.status.code(), Some(1));
}

#[tokio::test]
async fn test_missing_event_slug_exits_with_error() {
    let config = write_config(
        r#"
[pretix]
api_token = "token"
"#,
    );
    let secrets = TempDir::new().unwrap();

    let result = run_binary(config.path(), secrets.path(), &[]).await;

    assert_eq!(result.status.code(), Some(1));
}

#[tokio::test]
async fn test_missing_credentials_exit_with_error() {
    let config = write_config(
        r#"
[pretix]
event_slug = "teencamp-2025"
"#,
    );
    let secrets = TempDir::new().unwrap();

    let result = run_binary(config.path(), secrets.path(), &[]).await;

    assert_eq!(result.status.code(), Some(1));
}

#[tokio::test]
async fn test_invalid_run_once_exits_with_error() {
    let config = write_config(
        r#"
[pretix]
event_slug = "teencamp-2025"
api_token = "token"
"#,
    );
    let secrets = TempDir::new().unwrap();

    let result = run_binary(config.path(), secrets.path(), &[("RUN_ONCE", "maybe")]).await;

    assert_eq!(result.status.code(), Some(1));
}
