use std::error::Error;
use std::fs;

use benchrun::config::{ConfigLookup, LayeredConfig, MapConfig, keys, load_from_path, load_or_default};
use benchrun::errors::BenchrunError;

type TestResult = Result<(), Box<dyn Error>>;

const SAMPLE: &str = r#"
[runner]
max-memory = "3g"
use-membar = false
extra-flags = ["-XX:+UseG1GC", "-Dbench.seed=7"]
port-probe-timeout-ms = 250
"#;

#[test]
fn loads_nested_runner_table() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("benchmark.toml");
    fs::write(&path, SAMPLE)?;

    let config = load_from_path(&path)?;

    assert_eq!(config.get_string(keys::MAX_MEMORY)?, "3g");
    assert!(!config.get_bool(keys::USE_MEMBAR)?);
    assert_eq!(config.get_string(keys::EXTRA_FLAGS)?, "-XX:+UseG1GC -Dbench.seed=7");
    assert_eq!(config.get_u64(keys::PORT_PROBE_TIMEOUT_MS)?, 250);
    assert!(config.get("runner").is_none());
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nope.toml");

    let err = load_or_default(Some(path.as_path())).err().ok_or("expected an error")?;

    assert!(matches!(err, BenchrunError::IoError(_)), "{err:?}");
    Ok(())
}

#[test]
fn malformed_toml_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[runner\nmax-memory = ")?;

    let err = load_from_path(&path).err().ok_or("expected an error")?;

    assert!(matches!(err, BenchrunError::TomlError(_)), "{err:?}");
    Ok(())
}

#[test]
fn overrides_shadow_file_values() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("benchmark.toml");
    fs::write(&path, SAMPLE)?;

    let overrides = MapConfig::from_pairs(["runner.max-memory=", "runner.use-membar=yes"])?;
    let config = LayeredConfig::new()
        .push(overrides)
        .push(load_from_path(&path)?);

    assert_eq!(config.get_string(keys::MAX_MEMORY)?, "");
    assert!(config.get_bool(keys::USE_MEMBAR)?);
    assert_eq!(config.get_u64(keys::PORT_PROBE_TIMEOUT_MS)?, 250);
    Ok(())
}

#[test]
fn override_pairs_need_an_equals_sign() {
    assert!(MapConfig::from_pairs(["runner.max-memory"]).is_err());
    assert!(MapConfig::from_pairs(["=2g"]).is_err());
}
