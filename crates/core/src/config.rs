//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Request
//! handling never reads process-wide environment variables, which keeps behaviour consistent
//! across threads and test harnesses.

use crate::constants::{DEFAULT_DATA_DIR, DOCUMENTS_DIR_NAME};
use crate::{FormError, FormResult};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    reference_date: Option<NaiveDate>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `reference_date`, when set, pins "today" for status derivation. Demos and fixtures use it
    /// to get stable output; production leaves it unset.
    pub fn new(data_dir: PathBuf, reference_date: Option<NaiveDate>) -> FormResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(FormError::InvalidInput("data_dir cannot be empty".into()));
        }

        Ok(Self {
            data_dir,
            reference_date,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join(DOCUMENTS_DIR_NAME)
    }

    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    /// The date status views should treat as today.
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Resolve the data directory from an optional environment value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse the reference date from an optional environment value (`YYYY-MM-DD`).
///
/// If `value` is `None` or blank, no reference date is pinned.
pub fn reference_date_from_env_value(value: Option<String>) -> FormResult<Option<NaiveDate>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    value
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|e| {
                FormError::InvalidInput(format!("reference date '{v}' is not YYYY-MM-DD: {e}"))
            })
        })
        .transpose()
}
