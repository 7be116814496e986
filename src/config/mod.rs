//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file → loader (load_config)
//!     → schema.rs (serde deserialization, defaults)
//!     → validation.rs (semantic checks, all errors collected)
//!     → EngineConfig accepted by Engine::new
//! ```

pub mod schema;
pub mod validation;

use std::fs;
use std::path::Path;

pub use schema::{ChainFamily, EngineConfig, PoolConfig, SelectionPolicy, UpstreamSpec};
pub use validation::{validate_address, validate_config, ValidationError};

/// Error type for configuration loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Invalid(errors) => {
                write!(f, "Invalid configuration: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: EngineConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config.pool, &config.upstreams).map_err(ConfigError::Invalid)?;

    Ok(config)
}
