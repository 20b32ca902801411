//! Decoding of raw `LogTake` mappings into [`TradeEvent`]s.

use crate::error::{Error, Result};
use crate::onchain::types::{ArgValue, RawEvent};
use crate::trades::TradeEvent;

use alloy::primitives::{Address, U256};

/// Interpret an event argument as a big-endian unsigned integer.
///
/// Accepts raw bytes, or text where each char's code point is one byte
/// (how some clients hand back `bytes32`). Both shapes of the same value
/// decode to the same integer; any other shape is rejected.
pub fn decode_big_endian_unsigned(value: &ArgValue) -> Result<U256> {
    match value {
        ArgValue::Bytes(bytes) => be_bytes_to_u256(bytes),
        ArgValue::Text(text) => {
            let bytes = text
                .chars()
                .map(|c| u8::try_from(u32::from(c)))
                .collect::<std::result::Result<Vec<u8>, _>>()
                .map_err(|_| Error::NonByteCharacter(text.escape_default().to_string()))?;
            be_bytes_to_u256(&bytes)
        }
        other => Err(Error::UnexpectedIdShape(other.kind())),
    }
}

fn be_bytes_to_u256(bytes: &[u8]) -> Result<U256> {
    U256::try_from_be_slice(bytes).ok_or(Error::Overflow(bytes.len()))
}

impl TradeEvent {
    /// Decode one raw event. Missing or mistyped arguments are fatal.
    pub fn decode(raw: &RawEvent) -> Result<Self> {
        let timestamp = uint_arg(raw, "timestamp")?;
        let timestamp = u64::try_from(timestamp).map_err(|_| Error::UnexpectedArgument {
            tx_hash: raw.transaction_hash,
            field: "timestamp",
            expected: "uint64",
            found: "uint256",
        })?;

        Ok(TradeEvent {
            tx_hash: raw.transaction_hash,
            offer_id: decode_big_endian_unsigned(arg(raw, "id")?)?,
            maker: address_arg(raw, "maker")?,
            taker: address_arg(raw, "taker")?,
            pay_token: address_arg(raw, "pay_token")?,
            pay_amount: uint_arg(raw, "pay_amount")?,
            buy_token: address_arg(raw, "buy_token")?,
            buy_amount: uint_arg(raw, "buy_amount")?,
            timestamp,
        })
    }
}

fn arg<'a>(raw: &'a RawEvent, field: &'static str) -> Result<&'a ArgValue> {
    raw.arg(field).ok_or(Error::MissingArgument {
        tx_hash: raw.transaction_hash,
        field,
    })
}

fn address_arg(raw: &RawEvent, field: &'static str) -> Result<Address> {
    match arg(raw, field)? {
        ArgValue::Address(a) => Ok(*a),
        other => Err(unexpected(raw, field, "address", other)),
    }
}

fn uint_arg(raw: &RawEvent, field: &'static str) -> Result<U256> {
    match arg(raw, field)? {
        ArgValue::Uint(v) => Ok(*v),
        other => Err(unexpected(raw, field, "uint", other)),
    }
}

fn unexpected(raw: &RawEvent, field: &'static str, expected: &'static str, found: &ArgValue) -> Error {
    Error::UnexpectedArgument {
        tx_hash: raw.transaction_hash,
        field,
        expected,
        found: found.kind(),
    }
}

/// Fixture builder shared by the trade tests.
#[cfg(test)]
pub(crate) fn sample_event(
    tx_byte: u8,
    pay_token: Address,
    pay_amount: u64,
    buy_token: Address,
    buy_amount: u64,
) -> RawEvent {
    use alloy::primitives::{address, B256};

    RawEvent::new(B256::repeat_byte(tx_byte))
        .with_arg("id", ArgValue::Bytes(vec![0, 0, 0, tx_byte]))
        .with_arg("maker", ArgValue::Address(address!("00000000000000000000000000000000000000aa")))
        .with_arg("taker", ArgValue::Address(address!("00000000000000000000000000000000000000bb")))
        .with_arg("pay_token", ArgValue::Address(pay_token))
        .with_arg("pay_amount", ArgValue::Uint(U256::from(pay_amount)))
        .with_arg("buy_token", ArgValue::Address(buy_token))
        .with_arg("buy_amount", ArgValue::Uint(U256::from(buy_amount)))
        .with_arg("timestamp", ArgValue::Uint(U256::from(1_500_000_000u64)))
}
