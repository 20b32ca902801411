//! Read-only reconstruction of an on-chain matching market.
//!
//! Two reports, both rebuilt from scratch on every run:
//! - the live offer book, by sweeping every offer slot up to the counter
//! - the historical trade tape, by replaying `LogTake` events
//!
//! The binary wires these to a JSON-RPC node; the library takes its reads
//! through [`onchain::MarketReader`] so it can be driven by anything.

pub mod amount;
pub mod config;
pub mod error;
pub mod offers;
pub mod onchain;
pub mod report;
pub mod trades;

pub use error::{Error, Result};
