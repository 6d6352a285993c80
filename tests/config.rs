use assert_fs::prelude::*;
use probe_catalog::config::{self, ScanConfig, DEFAULT_HOST, DEFAULT_PORT};
use probe_catalog::error::ConfigError;
use probe_catalog::Modality;

#[test]
fn default_config_round_trips_through_the_loader() {
    let text = config::default_config_toml("127.0.0.1", 9000);
    let parsed = ScanConfig::from_toml_str(&text).unwrap();

    assert_eq!(parsed.general.max_budget, 1_000_000);
    assert_eq!(parsed.general.max_th, 0.3);
    assert!(!parsed.general.optimize);
    assert!(!parsed.general.enable_multi_step_attack);
    assert_eq!(parsed.thresholds.low, 0.15);
    assert_eq!(parsed.thresholds.high, 0.5);
    assert_eq!(
        parsed.dataset_names(),
        ["AgenticBackend", "simonycl/aya-23-8B_advbench_jailbreak"]
    );

    let backend = &parsed.modules["AgenticBackend"];
    let opts = backend.opts.as_ref().unwrap();
    assert_eq!(opts.get("port").and_then(|v| v.as_integer()), Some(9000));

    let request = parsed.request_template().unwrap();
    assert_eq!(request.url, "http://127.0.0.1:9000/v1/self-probe");
    assert_eq!(request.modality(), Modality::Text);
}

#[test]
fn optional_sections_fall_back_to_defaults() {
    let parsed = ScanConfig::from_toml_str(
        "[general]\nllmSpec = \"POST http://localhost/x\"\n",
    )
    .unwrap();
    assert_eq!(parsed.general.max_th, 0.3);
    assert_eq!(parsed.general.max_budget, 1_000_000);
    assert!(parsed.modules.is_empty());
    assert_eq!(parsed.thresholds.medium, 0.3);
}

#[test]
fn invalid_documents_are_reported() {
    assert!(matches!(
        ScanConfig::from_toml_str("[general]\nmaxBudget = 5\n"),
        Err(ConfigError::InvalidToml(_))
    ));

    let parsed = ScanConfig::from_toml_str("[general]\nllmSpec = \"POST\"\n").unwrap();
    assert!(matches!(
        parsed.request_template(),
        Err(ConfigError::InvalidTemplate(_))
    ));
}

#[test]
fn dotted_lookup_reads_nested_values() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("agesec.toml");
    file.write_str(&config::default_config_toml(DEFAULT_HOST, DEFAULT_PORT))
        .unwrap();

    let document = config::load_value(file.path()).unwrap();
    let max_th = config::lookup(&document, "general.max_th").unwrap();
    assert_eq!(max_th.as_float(), Some(0.3));
    let port = config::lookup(&document, "modules.AgenticBackend.opts.port").unwrap();
    assert_eq!(port.as_integer(), Some(8718));
    assert!(config::lookup(&document, "general.missing").is_none());
    assert!(config::lookup(&document, "general.max_th.deeper").is_none());
    assert!(matches!(
        config::require(&document, "thresholds.extreme"),
        Err(ConfigError::MissingKey(key)) if key == "thresholds.extreme"
    ));

    let loaded = ScanConfig::load(file.path()).unwrap();
    assert_eq!(loaded.general.max_th, 0.3);
}

#[test]
fn missing_file_is_reported() {
    let temp = assert_fs::TempDir::new().unwrap();
    let missing = temp.path().join("absent.toml");
    assert!(matches!(
        ScanConfig::load(&missing),
        Err(ConfigError::FileNotFound(path)) if path == missing
    ));
}
