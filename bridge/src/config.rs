use oslc_cm::config::{Config as CmConfig, ValidationError};
use serde::Deserialize;
use std::fs::File;

#[derive(Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub sentry_dsn: String,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub oslc_cm: CmConfig,
}

impl Config {
    /// Loads and validates the YAML file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.oslc_cm.validate()?;

        Ok(config)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    const SERVICE_YAML: &str = r#"
oslc_cm:
    listener:
        host: 0.0.0.0
        port: 8080
    admin_listener:
        host: 127.0.0.1
        port: 8081
    base_uri: http://localhost:8080/bugz
    path_prefix: /bugz
    bugzilla:
        url: https://bugs.example.org/
        credentials:
            api_key: abc123
"#;

    #[test]
    fn full_config() {
        let yaml = format!(
            r#"
metrics:
    statsd_host: 127.0.0.1
    statsd_port: 8125
logging:
    sentry_dsn: https://key@sentry.example.org/1
{SERVICE_YAML}"#
        );
        let tmp = write_tmp_file(&yaml);
        let config = Config::from_file(tmp.path()).unwrap();

        assert_eq!(
            config.common.metrics,
            Some(MetricsConfig {
                statsd_host: "127.0.0.1".into(),
                statsd_port: 8125,
            })
        );
        assert_eq!(
            config.common.logging.unwrap().sentry_dsn,
            "https://key@sentry.example.org/1"
        );
        assert_eq!(config.oslc_cm.listener.port, 8080);
        assert_eq!(config.oslc_cm.path_prefix, "/bugz");
        assert_eq!(config.oslc_cm.page_size, 20);
    }

    #[test]
    fn service_only_config() {
        let tmp = write_tmp_file(SERVICE_YAML);
        let config = Config::from_file(tmp.path()).unwrap();

        assert_eq!(config.common, CommonConfig::default());
        assert!(config.oslc_cm.provide_html);
    }

    #[test]
    fn missing_file() {
        let result = Config::from_file(std::path::Path::new("/nonexistent/bridge.yaml"));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn unparseable_config() {
        let tmp = write_tmp_file("oslc_cm: [not, a, map]\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn invalid_config() {
        let tmp = write_tmp_file(&SERVICE_YAML.replace("port: 8081", "port: 0"));
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::Validation(ValidationError::InvalidPort))
        ));
    }
}
