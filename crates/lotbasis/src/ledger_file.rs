//! JSON ledger files.
//!
//! A ledger file holds an opening inventory and a date-keyed list of events:
//!
//! ```json
//! {
//!   "inventory": {"7": [{"2020-01-01": -5, "Quantity": 10}]},
//!   "transactions": {
//!     "2020-02-01": [
//!       {"Type": "SELL",
//!        "Out": [{"SKU": 7, "Quantity": 4, "Price": 0, "Date": "2020-02-01"}],
//!        "In":  [{"SKU": "$CASH", "Quantity": 1, "Price": 30, "Date": "2020-02-01"}]}
//!     ]
//!   }
//! }
//! ```
//!
//! Both keys are optional.

use lotbasis_core::{Inventory, LedgerEvent, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a ledger file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid ledger.
    #[error("invalid ledger in {path}: {source}")]
    Json {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Opening inventory plus the events to replay against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFile {
    /// Lots held before the first event
    #[serde(default)]
    pub inventory: Inventory,
    /// Events by date, in listed order
    #[serde(default)]
    pub transactions: BTreeMap<NaiveDate, Vec<LedgerEvent>>,
}

impl LedgerFile {
    /// Read and parse a ledger file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&source).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of events across all dates.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.transactions.values().map(Vec::len).sum()
    }
}
