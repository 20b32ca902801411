//! Raw shapes handed over by the transport layer before any decoding.

use alloy::primitives::{Address, B256, U256};
use std::collections::BTreeMap;

/// One decoded event argument.
///
/// Older clients deliver `bytes32` values as text (one char per byte)
/// instead of raw bytes, so both shapes appear for the same argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Bytes(Vec<u8>),
    Text(String),
    Address(Address),
    Uint(U256),
}

impl ArgValue {
    /// Short name of the shape, used in decoding errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ArgValue::Bytes(_) => "bytes",
            ArgValue::Text(_) => "text",
            ArgValue::Address(_) => "address",
            ArgValue::Uint(_) => "uint",
        }
    }
}

/// A `LogTake` log entry as a name → argument mapping.
///
/// Keys: `id`, `maker`, `taker`, `pay_token`, `pay_amount`, `buy_token`,
/// `buy_amount`, `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub transaction_hash: B256,
    pub args: BTreeMap<String, ArgValue>,
}

impl RawEvent {
    pub fn new(transaction_hash: B256) -> Self {
        Self {
            transaction_hash,
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, name: &str, value: ArgValue) -> Self {
        self.args.insert(name.to_string(), value);
        self
    }

    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.get(name)
    }
}
