//! Default configuration values for Memory-Editor

use serde::{Deserialize, Serialize};

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub chunk_size: usize,
    pub max_threads: usize,
    pub alignment: usize,
    pub writable_only: bool,
    pub parallel: bool,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            chunk_size: 65536, // 64KB
            max_threads: num_cpus::get().min(8),
            alignment: 1,
            writable_only: false,
            parallel: false,
        },
        logging: LoggingDefaults {
            level: "info".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_defaults() {
        let config = default_config();
        assert!(config.scanner.max_threads > 0);
        assert!(config.scanner.max_threads <= 8);
        assert_eq!(config.scanner.chunk_size, 65536);
        assert_eq!(config.scanner.alignment, 1);
        assert!(!config.scanner.writable_only);
        assert!(!config.scanner.parallel);
    }

    #[test]
    fn test_logging_defaults() {
        assert_eq!(default_config().logging.level, "info");
    }

    #[test]
    fn test_serialization() {
        let config = default_config();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("chunk_size"));
        assert!(serialized.contains("level"));

        let deserialized: ConfigDefaults = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.scanner.chunk_size, config.scanner.chunk_size);
        assert_eq!(deserialized.logging.level, config.logging.level);
    }
}
