use chrono::format::{Item, StrftimeItems};

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Lookup base URL is set and timeout is not 0
/// - Report header and file prefix are not empty
/// - Report date format parses as a chrono format string
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.lookup.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "lookup.base_url cannot be empty".to_string(),
        ));
    }

    if config.lookup.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "lookup.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.report.header.is_empty() {
        return Err(ConfigError::ValidationError(
            "report.header cannot be empty".to_string(),
        ));
    }

    if config.report.file_prefix.is_empty() {
        return Err(ConfigError::ValidationError(
            "report.file_prefix cannot be empty".to_string(),
        ));
    }

    if StrftimeItems::new(&config.report.date_format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::ValidationError(format!(
            "report.date_format is not a valid format: {}",
            config.report.date_format
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArtifactConfig, LookupConfig, ReportConfig};

    fn valid_config() -> Config {
        Config {
            report: ReportConfig::new("/srv/accession"),
            lookup: LookupConfig::new("http://localhost:9090"),
            artifact: ArtifactConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = valid_config();
        config.lookup.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_base_url_fails() {
        let mut config = valid_config();
        config.lookup.base_url = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_header_fails() {
        let mut config = valid_config();
        config.report.header = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_date_format_fails() {
        let mut config = valid_config();
        config.report.date_format = "%Y%m%".to_string();
        assert!(validate_config(&config).is_err());
    }
}
