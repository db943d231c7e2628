use anyhow::Result;
use freight_rates::core::ConfigProvider;
use freight_rates::utils::validation::Validate;
use freight_rates::{BackendSettings, RateFilter, RateRepository, RestBackend, TomlConfig};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_config_file_drives_rest_backend() -> Result<()> {
    let server = MockServer::start();
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("freight-rates.toml");

    std::env::set_var("FREIGHT_RATES_CONFIG_TEST_TOKEN", "token-from-env");
    let config_content = format!(
        r#"
[backend]
url = "{}"
api_key = "anon-key"
access_token = "${{FREIGHT_RATES_CONFIG_TEST_TOKEN}}"
table = "rates_from_file"
timeout_seconds = 5
"#,
        server.base_url()
    );
    tokio::fs::write(&config_path, config_content).await?;

    let config = TomlConfig::from_file(&config_path)?;
    config.validate()?;
    assert_eq!(config.access_token(), Some("token-from-env"));

    let user_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/auth/v1/user")
            .header("authorization", "Bearer token-from-env");
        then.status(200)
            .json_body(json!({"id": "user-9"}));
    });
    let select_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/rates_from_file")
            .query_param("user_id", "eq.user-9");
        then.status(200).json_body(json!([]));
    });

    let settings = BackendSettings::from_toml(&config);
    let repo = RateRepository::with_table(RestBackend::from_config(&settings)?, settings.table());
    let rates = repo.load(RateFilter::All).await?;

    assert!(rates.is_empty());
    user_mock.assert();
    select_mock.assert();
    Ok(())
}

#[test]
fn test_missing_config_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = TomlConfig::from_file(temp_dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, freight_rates::RateError::IoError(_)));
}

#[test]
fn test_settings_without_key_fail_validation() {
    let config = TomlConfig::from_toml_str(
        r#"
[backend]
url = "https://project.supabase.co"
api_key = "${FREIGHT_RATES_KEY_NOBODY_SET}"
"#,
    )
    .unwrap();

    assert!(config.validate().is_err());
    assert!(BackendSettings::from_toml(&config).validate().is_err());
}
