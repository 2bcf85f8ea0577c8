use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const USD_RESPONSE: &str = r#"{
        "base": "USD",
        "date": "2024-05-01",
        "rates": {"USD": 1, "EUR": 0.92, "GBP": 0.79, "JPY": 157.8}
    }"#;

    pub async fn create_mock_server(base: &str, status: u16, expected_calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/latest/{base}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(USD_RESPONSE))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
providers:
  exchangerate:
    base_url: {base_url}
locale: "en-US"
persist_cache: false
"#
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }

    pub fn write_persistent_config(dir: &std::path::Path, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let data_path = dir.join("data");
        let config_content = format!(
            r#"
providers:
  exchangerate:
    base_url: {base_url}
persist_cache: true
data_path: "{}"
"#,
            data_path.display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

fn memory_only() -> fxconv::RunOptions {
    fxconv::RunOptions {
        offline: false,
        no_persist: true,
    }
}

#[test_log::test(tokio::test)]
async fn test_full_convert_flow_with_mock() {
    let mock_server = test_utils::create_mock_server("USD", 200, 1).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "100".to_string(),
            from: "USD".to_string(),
            to: "EUR".to_string(),
        },
        Some(config_path.to_str().unwrap()),
        memory_only(),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_list_command_with_mock() {
    let mock_server = test_utils::create_mock_server("USD", 200, 1).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::List,
        Some(config_path.to_str().unwrap()),
        memory_only(),
    )
    .await;
    assert!(result.is_ok(), "List command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_convert_reports_api_failure() {
    let mock_server = test_utils::create_mock_server("USD", 500, 1).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "100".to_string(),
            from: "USD".to_string(),
            to: "EUR".to_string(),
        },
        Some(config_path.to_str().unwrap()),
        memory_only(),
    )
    .await;

    let err = result.expect_err("Expected the conversion to fail");
    assert_eq!(
        err.to_string(),
        "Failed to convert currency. Please try again later."
    );
}

#[test_log::test(tokio::test)]
async fn test_invalid_amount_never_reaches_api() {
    let mock_server = test_utils::create_mock_server("USD", 200, 0).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "-5".to_string(),
            from: "USD".to_string(),
            to: "EUR".to_string(),
        },
        Some(config_path.to_str().unwrap()),
        memory_only(),
    )
    .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Amount cannot be negative"
    );
}

#[test_log::test(tokio::test)]
async fn test_offline_without_cache_never_reaches_api() {
    let mock_server = test_utils::create_mock_server("USD", 200, 0).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());

    let result = fxconv::run_command(
        fxconv::AppCommand::Convert {
            amount: "100".to_string(),
            from: "USD".to_string(),
            to: "EUR".to_string(),
        },
        Some(config_path.to_str().unwrap()),
        fxconv::RunOptions {
            offline: true,
            no_persist: true,
        },
    )
    .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("offline"), "unexpected message: {message}");
}

#[test_log::test(tokio::test)]
async fn test_session_reuses_cached_rates() {
    use fxconv::cli::binding::{Banner, Event, View};

    // Verified on drop: only one request reaches the API
    let mock_server = test_utils::create_mock_server("USD", 200, 1).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), &mock_server.uri());
    let config = fxconv::core::config::AppConfig::load_from_path(&config_path).unwrap();

    let mut app = fxconv::App::from_config(&config, memory_only()).unwrap();

    let submit = || Event::Submit {
        amount: "1000".to_string(),
        from: "usd".to_string(),
        to: "jpy".to_string(),
    };

    let first = app.session.handle(submit()).await;
    info!(?first, "First conversion");
    assert_eq!(first.view, View::Converted("1,000 USD = 157,800 JPY".to_string()));
    assert!(first.banner.is_none());

    let second = app.session.handle(submit()).await;
    assert_eq!(second.view, first.view);
    assert_eq!(second.banner, Some(Banner::Cached { minutes: 0 }));
}

#[test_log::test(tokio::test)]
async fn test_disk_cache_survives_between_runs() {
    // One request for the whole test, the later runs read the disk cache
    let mock_server = test_utils::create_mock_server("USD", 200, 1).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_persistent_config(dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    let convert = || fxconv::AppCommand::Convert {
        amount: "100".to_string(),
        from: "USD".to_string(),
        to: "EUR".to_string(),
    };
    let online = fxconv::RunOptions::default();
    let offline = fxconv::RunOptions {
        offline: true,
        no_persist: false,
    };

    fxconv::run_command(convert(), Some(config_path), online)
        .await
        .expect("First run should fetch");
    fxconv::run_command(convert(), Some(config_path), online)
        .await
        .expect("Second run should use the disk cache");
    fxconv::run_command(convert(), Some(config_path), offline)
        .await
        .expect("Offline run should use the disk cache");

    fxconv::run_command(
        fxconv::AppCommand::ClearCache {
            base: Some("usd".to_string()),
        },
        Some(config_path),
        online,
    )
    .await
    .unwrap();

    let message = fxconv::run_command(convert(), Some(config_path), offline)
        .await
        .unwrap_err()
        .to_string();
    assert!(message.contains("offline"), "unexpected message: {message}");
}
