//! Lotbasis CLI tools.
//!
//! This crate provides the `lotbasis-report` command, which replays a JSON
//! trade ledger against its opening inventory and reports realized sales,
//! profit or loss, and the inventory left over.
//!
//! # Example Usage
//!
//! ```bash
//! lotbasis-report ledger.json
//! lotbasis-report --format json --cash-dates last-wins ledger.json
//! RUST_LOG=lotbasis_booking=trace lotbasis-report ledger.json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod ledger_file;
