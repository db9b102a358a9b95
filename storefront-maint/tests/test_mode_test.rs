/// Tests for the test-mode command, which works on a local dotenv file and
/// never needs a database

use std::fs;
use std::path::PathBuf;
use storefront_maint::cli::{Cli, Command, Toggle};
use storefront_maint::commands;
use uuid::Uuid;

fn temp_env_file(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("storefront-maint-{}.env", Uuid::new_v4()));
    fs::write(&path, contents).expect("Failed to write temp file");
    path
}

fn test_mode(file: &PathBuf, state: Option<Toggle>) -> Cli {
    Cli {
        // Would fail the run if a pool were opened
        database_url: Some("postgresql://nobody@127.0.0.1:1/none".to_string()),
        command: Command::TestMode {
            state,
            file: file.clone(),
            key: "TEST_MODE".to_string(),
        },
    }
}

#[tokio::test]
async fn test_toggle_preserves_other_lines() {
    let original = "# storefront settings\nSITE_DOMAIN=shop.example.com\n\nTEST_MODE=false\nAPP_ENV=development\n";
    let path = temp_env_file(original);

    commands::run(test_mode(&path, Some(Toggle::On))).await.unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "# storefront settings\nSITE_DOMAIN=shop.example.com\n\nTEST_MODE=true\nAPP_ENV=development\n"
    );

    commands::run(test_mode(&path, Some(Toggle::Off))).await.unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), original);

    fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_report_does_not_write() {
    let path = temp_env_file("TEST_MODE=yes\n");

    commands::run(test_mode(&path, None)).await.unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "TEST_MODE=yes\n");

    fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_missing_file_is_created_on_set() {
    let path = std::env::temp_dir().join(format!("storefront-maint-{}.env", Uuid::new_v4()));

    commands::run(test_mode(&path, None)).await.unwrap();
    assert!(!path.exists(), "reporting must not create the file");

    commands::run(test_mode(&path, Some(Toggle::On))).await.unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "TEST_MODE=true\n");

    fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_database_command_needs_url() {
    let cli = Cli {
        database_url: None,
        command: Command::LinkRequests,
    };

    let err = commands::run(cli).await.unwrap_err();
    assert!(err.to_string().contains("DATABASE_URL"), "unexpected error: {}", err);
}
