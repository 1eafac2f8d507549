//! Timeline data (career, education, ...) loaded from TOML.
//!
//! ```toml
//! [[entries]]
//! year = "2021"
//! place = "Acme Corp"
//! role = "Engineer"
//! category = "Work"
//! detail = "Built the billing pipeline."
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

/// A single timeline entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub year: String,
    pub place: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Ordered timeline entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Parse timeline data from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or an entry misses `year`
    /// or `place`.
    pub fn from_toml(content: &str) -> Result<Self, TimelineError> {
        Ok(toml::from_str(content)?)
    }

    /// Load timeline data from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, TimelineError> {
        let content = std::fs::read_to_string(path).map_err(|source| TimelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}
