use pdf_service_client::*;

#[test]
fn test_defaults() {
    let config = ServiceConfig::default();
    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.render_dpi, 150.0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation() {
    let mut config = ServiceConfig {
        base_url: "  ".to_string(),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ClientError::Config(_))));

    config.base_url = "localhost:8080".to_string();
    match config.validate() {
        Err(ClientError::Config(msg)) => assert!(msg.contains("http://")),
        _ => panic!("Expected Config error"),
    }

    config.base_url = "https://pdf.example.org".to_string();
    config.timeout_secs = 0;
    assert!(config.validate().is_err());

    config.timeout_secs = 5;
    config.render_dpi = 0.0;
    assert!(config.validate().is_err());
    config.render_dpi = f32::NAN;
    assert!(config.validate().is_err());
}

#[tokio::test]
async fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service.json");

    let config = ServiceConfig {
        base_url: "http://10.0.0.2:8080".to_string(),
        timeout_secs: 90,
        render_dpi: 300.0,
    };
    config.save(&path).await.unwrap();
    assert_eq!(ServiceConfig::load(&path).await.unwrap(), config);
}

#[tokio::test]
async fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service.json");
    tokio::fs::write(&path, r#"{ "base_url": "http://pdf:8080" }"#)
        .await
        .unwrap();

    let config = ServiceConfig::load(&path).await.unwrap();
    assert_eq!(config.base_url, "http://pdf:8080");
    assert_eq!(config.timeout_secs, 30);
}

#[tokio::test]
async fn test_load_rejects_invalid_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service.json");

    tokio::fs::write(&path, "not json").await.unwrap();
    assert!(matches!(
        ServiceConfig::load(&path).await,
        Err(ClientError::Config(_))
    ));

    tokio::fs::write(&path, r#"{ "timeout_secs": 0 }"#).await.unwrap();
    assert!(ServiceConfig::load(&path).await.is_err());

    assert!(matches!(
        ServiceConfig::load(dir.path().join("missing.json")).await,
        Err(ClientError::Io(_))
    ));
}
