//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<SynthConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {:?}", path))?;
    let config: SynthConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 44100
  buffer_size: 256

control:
  poll_interval_ms: 5
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.buffer_size, 256);
        assert_eq!(config.control.poll_interval_ms, 5);
        assert_eq!(config.control.report_interval_ms, 500);
    }

    #[test]
    fn test_load_rejects_invalid_sample_rate() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"audio:\n  sample_rate: 1000\n").unwrap();

        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: SynthConfig =
            serde_yaml::from_str(include_str!("../../touchsynth.example.yaml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.voices, default_voices());
        assert_eq!(config.sensor.gestures.len(), 5);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_config(Path::new("/nonexistent/touchsynth.yaml")).is_err());
    }
}
