//! Error taxonomy for a reconstruction run.
//!
//! Every variant is fatal: a pipeline either completes and prints, or it
//! aborts with one of these and prints nothing. Inactive offer slots and
//! off-pair trades are not errors and never surface here.

use alloy::primitives::B256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The node could not be reached or rejected the request.
    #[error("rpc transport failure: {0}")]
    Transport(String),

    /// A contract read returned something the ABI cannot decode.
    #[error("contract call `{method}` failed: {reason}")]
    Contract { method: &'static str, reason: String },

    #[error("trade event {tx_hash}: missing argument `{field}`")]
    MissingArgument { tx_hash: B256, field: &'static str },

    #[error("trade event {tx_hash}: argument `{field}` is {found}, expected {expected}")]
    UnexpectedArgument {
        tx_hash: B256,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// The offer id of a trade arrived in neither byte nor text form.
    #[error("offer id must be bytes or text, got {0}")]
    UnexpectedIdShape(&'static str),

    #[error("offer id `{0}` contains a character above U+00FF")]
    NonByteCharacter(String),

    #[error("value of {0} bytes does not fit in 256 bits")]
    Overflow(usize),

    /// The denominator leg of a classified trade is zero, so no price exists.
    #[error("trade {tx_hash} has a zero {leg} leg")]
    ZeroAmount { tx_hash: B256, leg: &'static str },

    #[error("invalid trade direction `{0}`, expected `buy` or `sell`")]
    InvalidDirection(String),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
