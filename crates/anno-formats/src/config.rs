// Parser and writer configuration

use crate::schema::{Format, FormatVersion};
use anno_common::{AnnoError, Result};
use serde::{Deserialize, Serialize};

/// Configuration shared by the GAF and GPAD/GPI builders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum rows per document chunk (None = whole file in one document)
    pub split_size: Option<usize>,

    /// Keep GPAD rows whose entity is missing from the GPI document
    pub include_unknown_bioentities: bool,

    /// Record and forward warnings (surplus columns, unmapped evidence,
    /// unknown entities). Errors are always reported.
    pub report_warnings: bool,

    /// Log a progress line every N data rows (0 = never)
    pub progress_interval: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            split_size: None,
            include_unknown_bioentities: false,
            report_warnings: true,
            progress_interval: 1_000_000,
        }
    }
}

impl ParserConfig {
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ParserConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.split_size == Some(0) {
            return Err(AnnoError::Config(
                "Split size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ParserConfig
#[derive(Debug, Default)]
pub struct ParserConfigBuilder {
    split_size: Option<usize>,
    include_unknown_bioentities: Option<bool>,
    report_warnings: Option<bool>,
    progress_interval: Option<usize>,
}

impl ParserConfigBuilder {
    pub fn split_size(mut self, size: usize) -> Self {
        self.split_size = Some(size);
        self
    }

    pub fn include_unknown_bioentities(mut self, include: bool) -> Self {
        self.include_unknown_bioentities = Some(include);
        self
    }

    pub fn report_warnings(mut self, report: bool) -> Self {
        self.report_warnings = Some(report);
        self
    }

    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    pub fn build(self) -> ParserConfig {
        let default = ParserConfig::default();

        ParserConfig {
            split_size: self.split_size,
            include_unknown_bioentities: self
                .include_unknown_bioentities
                .unwrap_or(default.include_unknown_bioentities),
            report_warnings: self.report_warnings.unwrap_or(default.report_warnings),
            progress_interval: self.progress_interval.unwrap_or(default.progress_interval),
        }
    }
}

/// Target versions for the writers and gzip level for `.gz` outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub gaf_version: FormatVersion,
    pub gpad_version: FormatVersion,
    pub gpi_version: FormatVersion,

    /// flate2 compression level, 0-9
    pub compression_level: u32,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            gaf_version: Format::Gaf.default_version(),
            gpad_version: Format::Gpad.default_version(),
            gpi_version: Format::Gpi.default_version(),
            compression_level: 6,
        }
    }
}

impl WriterConfig {
    pub fn version_for(&self, format: Format) -> FormatVersion {
        match format {
            Format::Gaf => self.gaf_version,
            Format::Gpad => self.gpad_version,
            Format::Gpi => self.gpi_version,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            return Err(AnnoError::Config(format!(
                "Compression level must be 0-9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Environment Variable Support
// ============================================================================

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    })
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl ParserConfig {
    /// Load configuration from environment variables
    ///
    /// - `ANNO_SPLIT_SIZE`
    /// - `ANNO_INCLUDE_UNKNOWN_BIOENTITIES`
    /// - `ANNO_REPORT_WARNINGS`
    /// - `ANNO_PROGRESS_INTERVAL`
    pub fn from_env() -> Result<Self> {
        let default = ParserConfig::default();
        let config = ParserConfig {
            split_size: env_parse("ANNO_SPLIT_SIZE"),
            include_unknown_bioentities: env_bool("ANNO_INCLUDE_UNKNOWN_BIOENTITIES")
                .unwrap_or(default.include_unknown_bioentities),
            report_warnings: env_bool("ANNO_REPORT_WARNINGS").unwrap_or(default.report_warnings),
            progress_interval: env_parse("ANNO_PROGRESS_INTERVAL")
                .unwrap_or(default.progress_interval),
        };
        config.validate()?;
        Ok(config)
    }
}

impl WriterConfig {
    /// `ANNO_GAF_VERSION`, `ANNO_GPAD_VERSION`, `ANNO_GPI_VERSION`,
    /// `ANNO_COMPRESSION_LEVEL`
    pub fn from_env() -> Result<Self> {
        let default = WriterConfig::default();
        let config = WriterConfig {
            gaf_version: env_parse("ANNO_GAF_VERSION").unwrap_or(default.gaf_version),
            gpad_version: env_parse("ANNO_GPAD_VERSION").unwrap_or(default.gpad_version),
            gpi_version: env_parse("ANNO_GPI_VERSION").unwrap_or(default.gpi_version),
            compression_level: env_parse("ANNO_COMPRESSION_LEVEL")
                .unwrap_or(default.compression_level),
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.split_size, None);
        assert!(!config.include_unknown_bioentities);
        assert!(config.report_warnings);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ParserConfig::builder()
            .split_size(100)
            .include_unknown_bioentities(true)
            .progress_interval(0)
            .build();
        assert_eq!(config.split_size, Some(100));
        assert!(config.include_unknown_bioentities);
        assert!(config.report_warnings);
        assert_eq!(config.progress_interval, 0);
    }

    #[test]
    fn test_validate_split_size() {
        let config = ParserConfig::builder().split_size(0).build();
        assert!(matches!(config.validate(), Err(AnnoError::Config(_))));
    }

    #[test]
    fn test_from_json_str() {
        let config = ParserConfig::from_json_str(r#"{"split_size": 250}"#).expect("valid json");
        assert_eq!(config.split_size, Some(250));
        assert_eq!(config.progress_interval, 1_000_000);

        assert!(ParserConfig::from_json_str(r#"{"split_size": 0}"#).is_err());
        assert!(ParserConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_writer_config() {
        let config = WriterConfig::default();
        assert_eq!(config.version_for(Format::Gaf), FormatVersion::new(2, 0));
        assert_eq!(config.version_for(Format::Gpi), FormatVersion::new(1, 1));

        let config = WriterConfig {
            compression_level: 12,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
