use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.ollama.protocol, "http");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text:latest");
    assert_eq!(config.ollama.retry_attempts, 3);
    assert_eq!(config.ingest.max_tokens, 2000);
    assert!((config.reflection.threshold - 7.0).abs() < f32::EPSILON);
    assert_eq!(config.reflection.max_attempts, 3);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.generation_model = "  ".to_string();
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidModel(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.ollama.timeout_seconds = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ingest.max_tokens = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidMaxTokens(0))
    ));

    let mut invalid_config = config.clone();
    invalid_config.reflection.threshold = 11.0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidThreshold(_))
    ));

    let mut invalid_config = config.clone();
    invalid_config.reflection.max_attempts = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidMaxAttempts(0))
    ));

    let mut invalid_config = config;
    invalid_config.reflection.top_k = 0;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::InvalidTopK(0))
    ));
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let parsed_config: Config = toml::from_str(&toml_str).expect("should parse toml correctly");
    assert_eq!(config, parsed_config);
}

#[test]
fn partial_config_uses_defaults() {
    let partial_toml = r#"
        [ollama]
        host = "gpu-box"

        [reflection]
        threshold = 8.5
    "#;

    let config: Config = toml::from_str(partial_toml).expect("partial config should parse");
    assert_eq!(config.ollama.host, "gpu-box");
    assert_eq!(config.ollama.port, 11434);
    assert!((config.reflection.threshold - 8.5).abs() < f32::EPSILON);
    assert_eq!(config.reflection.max_attempts, 3);
    assert_eq!(config.store, StoreConfig::default());
}

#[test]
fn setter_validation() {
    let mut config = OllamaConfig::default();

    assert!(config.set_protocol("https".to_string()).is_ok());
    assert!(config.set_host("example.com".to_string()).is_ok());
    assert!(config.set_port(8080).is_ok());
    assert!(config.set_embedding_model("mxbai-embed-large".to_string()).is_ok());
    assert!(config.set_generation_model("qwen2.5:14b".to_string()).is_ok());
    assert!(config.set_timeout_seconds(30).is_ok());

    assert!(config.set_protocol("ftp".to_string()).is_err());
    assert!(config.set_port(0).is_err());
    assert!(config.set_embedding_model(String::new()).is_err());
    assert!(config.set_generation_model(" ".to_string()).is_err());
    assert!(config.set_timeout_seconds(601).is_err());

    assert_eq!(config.protocol, "https");
    assert_eq!(config.host, "example.com");
    assert_eq!(config.port, 8080);
}

#[test]
fn load_missing_file_returns_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::load(temp_dir.path()).expect("missing config should load defaults");

    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.get_base_dir(), temp_dir.path());
}

#[test]
fn save_then_load() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config {
        base_dir: temp_dir.path().join("nested"),
        ..Config::default()
    };
    config.ollama.generation_model = "mistral:7b".to_string();
    config.reflection.top_k = 3;

    config.save().expect("config should save");
    assert!(config.config_file_path().exists());

    let loaded = Config::load(temp_dir.path().join("nested")).expect("config should load");
    assert_eq!(loaded, config);
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[reflection]\nmax_attempts = 0\n",
    )
    .expect("should write config");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn store_paths_resolve_against_base_dir() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let mut config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };

    assert_eq!(config.vector_path(), temp_dir.path().join("db/vectors.bin"));
    assert_eq!(
        config.document_path(),
        temp_dir.path().join("db/documents.json")
    );

    let absolute = temp_dir.path().join("elsewhere/docs.json");
    config.store.document_file = absolute.clone();
    assert_eq!(config.document_path(), absolute);
}

#[test]
#[serial]
fn default_dir_honours_env_override() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    // SAFETY: serialized with other environment-mutating tests
    unsafe {
        std::env::set_var(HOME_ENV_VAR, temp_dir.path());
    }
    let dir = Config::default_dir();
    // SAFETY: see above
    unsafe {
        std::env::remove_var(HOME_ENV_VAR);
    }

    assert_eq!(
        dir.expect("env override should resolve"),
        temp_dir.path().to_path_buf()
    );
}
