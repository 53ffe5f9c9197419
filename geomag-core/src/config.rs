//! Runtime configuration.
//!
//! A small TOML file can name the primary coefficient source consulted
//! before the installation-relative fallbacks:
//!
//! ```toml
//! coefficient_file = "/usr/share/geomag/igrf12coeffs.txt"
//! ```

use crate::errors::{GeomagError, GeomagResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings controlling where the coefficient table is loaded from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Primary coefficient file, tried before the installation-relative
    /// locations. `None` falls back to the distribution file name in the
    /// working directory.
    pub coefficient_file: Option<PathBuf>,
}

impl ModelConfig {
    /// Parse configuration from TOML text. `origin` only labels errors.
    pub fn from_toml(text: &str, origin: &Path) -> GeomagResult<Self> {
        toml::from_str(text).map_err(|err| GeomagError::InvalidConfiguration {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Read configuration from a file; a missing file yields the defaults,
    /// anything else unreadable or malformed is an error.
    pub fn load(path: &Path) -> GeomagResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(GeomagError::InvalidConfiguration {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }
}
