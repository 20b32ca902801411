//! Historical trade tape rebuilt from `LogTake` events.
//!
//! Pipeline:
//! 1. resolve the block range once (an open upper bound means "chain head now")
//! 2. fetch every `LogTake` in range and decode it into a [`TradeEvent`]
//! 3. classify each event against the configured [`TradingPair`] into a
//!    [`ClassifiedTrade`]; events on any other pair drop out
//!
//! Classification is deliberately lopsided. Paying `token_a` for `token_b`
//! is a *sell*, priced `buy_amount / pay_amount` with `pay_amount` as the
//! size; paying `token_b` for `token_a` is a *buy*, priced
//! `pay_amount / buy_amount` with `buy_amount` as the size. Price is always
//! quoted in `token_a` per `token_b`, and the size shown for a sell is the
//! `token_a` leg.

mod decode;

pub use decode::decode_big_endian_unsigned;

use crate::amount::format_amount;
use crate::error::{Error, Result};
use crate::onchain::types::RawEvent;

use alloy::primitives::{address, Address, B256, U256};
use chrono::DateTime;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, info};

/// DAI on Ethereum mainnet, the default `token_a`.
pub const DAI: Address = address!("89d24A6b4CcB1B6fAA2625fE562bDD9a23260359");
/// WETH on Ethereum mainnet, the default `token_b`.
pub const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

// ─── Events ──────────────────────────────────────────────────────────────────

/// One historical fill, as emitted by the market.
///
/// `pay_token`/`buy_token` name the maker offer's legs; `pay_amount` is what
/// the taker handed in and `buy_amount` what it took out of the offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeEvent {
    pub tx_hash: B256,
    pub offer_id: U256,
    pub maker: Address,
    pub taker: Address,
    pub pay_token: Address,
    pub pay_amount: U256,
    pub buy_token: Address,
    pub buy_amount: U256,
    pub timestamp: u64,
}

/// Raw dump line: each amount next to the token the offer moved it in.
impl std::fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trade {}: {} [{}] for {} [{}] (maker: {}, taker: {}, timestamp: {})",
            self.tx_hash,
            format_amount(self.buy_amount),
            self.pay_token,
            format_amount(self.pay_amount),
            self.buy_token,
            self.maker,
            self.taker,
            iso_timestamp(self.timestamp)
        )
    }
}

// ─── Classification ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "buy" => Ok(Direction::Buy),
            "sell" => Ok(Direction::Sell),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

/// The one pair the tape is classified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingPair {
    pub token_a: Address,
    pub token_b: Address,
}

impl Default for TradingPair {
    fn default() -> Self {
        Self {
            token_a: DAI,
            token_b: WETH,
        }
    }
}

impl TradingPair {
    /// Direction of `event` on this pair, or `None` if it traded something else.
    pub fn classify(&self, event: &TradeEvent) -> Option<Direction> {
        if event.pay_token == self.token_a && event.buy_token == self.token_b {
            Some(Direction::Sell)
        } else if event.pay_token == self.token_b && event.buy_token == self.token_a {
            Some(Direction::Buy)
        } else {
            None
        }
    }
}

/// Exact ratio of two leg amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPrice {
    pub numerator: U256,
    pub denominator: U256,
}

impl UnitPrice {
    /// The ratio as a `Decimal`, or `None` if either leg is beyond its range.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let numerator = Decimal::from_str(&self.numerator.to_string()).ok()?;
        let denominator = Decimal::from_str(&self.denominator.to_string()).ok()?;
        numerator.checked_div(denominator).map(|d| d.normalize())
    }

    pub fn to_f64(&self) -> f64 {
        u256_to_f64(self.numerator) / u256_to_f64(self.denominator)
    }
}

/// Whole numbers keep one fractional digit (`250.0`).
impl std::fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_decimal() {
            Some(d) if d.scale() == 0 => write!(f, "{d}.0"),
            Some(d) => write!(f, "{d}"),
            None => write!(f, "{:?}", self.to_f64()),
        }
    }
}

fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse().unwrap_or(f64::INFINITY)
}

/// A fill on the configured pair, with its direction, price and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTrade {
    pub event: TradeEvent,
    pub direction: Direction,
    pub unit_price: UnitPrice,
    /// Smallest-unit amount shown as the trade size.
    pub size: U256,
}

impl ClassifiedTrade {
    /// Price and size `event` as a `direction` trade.
    ///
    /// Fails if the leg that would divide the price is zero.
    pub fn new(event: TradeEvent, direction: Direction) -> Result<Self> {
        let (numerator, denominator, leg) = match direction {
            Direction::Sell => (event.buy_amount, event.pay_amount, "pay"),
            Direction::Buy => (event.pay_amount, event.buy_amount, "buy"),
        };
        if denominator.is_zero() {
            return Err(Error::ZeroAmount {
                tx_hash: event.tx_hash,
                leg,
            });
        }

        Ok(Self {
            size: denominator,
            unit_price: UnitPrice {
                numerator,
                denominator,
            },
            direction,
            event,
        })
    }

    /// Classify `event` against `pair`; `Ok(None)` if it is off-pair.
    pub fn from_event(event: TradeEvent, pair: &TradingPair) -> Result<Option<Self>> {
        match pair.classify(&event) {
            Some(direction) => Self::new(event, direction).map(Some),
            None => Ok(None),
        }
    }

    pub fn display_size(&self) -> String {
        format_amount(self.size)
    }
}

impl std::fmt::Display for ClassifiedTrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | price: {} | size: {} | {}",
            iso_timestamp(self.event.timestamp),
            self.direction,
            self.unit_price,
            self.display_size(),
            self.event.tx_hash
        )
    }
}

// ─── Block range and replay ──────────────────────────────────────────────────

/// Upper end of a block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockBound {
    /// The chain head, looked up once when the scan starts.
    #[default]
    Latest,
    Number(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockRange {
    pub from_block: u64,
    pub to_block: BlockBound,
}

impl BlockRange {
    /// Pin the range to concrete block numbers, calling `head` at most once.
    pub fn resolve<H>(&self, head: H) -> Result<(u64, u64)>
    where
        H: FnOnce() -> Result<u64>,
    {
        let to_block = match self.to_block {
            BlockBound::Number(n) => n,
            BlockBound::Latest => head()?,
        };
        Ok((self.from_block, to_block))
    }
}

/// Fetch and decode every trade event in `range`, in the order the chain
/// yields them.
pub fn load_trades<H, F>(range: &BlockRange, head: H, mut fetch_events: F) -> Result<Vec<TradeEvent>>
where
    H: FnOnce() -> Result<u64>,
    F: FnMut(u64, u64) -> Result<Vec<RawEvent>>,
{
    let (from_block, to_block) = range.resolve(head)?;
    info!(from_block = from_block, to_block = to_block, "replaying trade events");

    if from_block > to_block {
        return Ok(Vec::new());
    }

    let events = fetch_events(from_block, to_block)?
        .iter()
        .map(TradeEvent::decode)
        .collect::<Result<Vec<_>>>()?;

    info!(events = events.len(), "decoded trade events");
    Ok(events)
}

/// The directional tape for `pair` over `range`.
///
/// Off-pair events are dropped silently; any decoding or pricing failure
/// aborts the whole run.
pub fn list_trades<H, F>(
    range: &BlockRange,
    pair: &TradingPair,
    head: H,
    fetch_events: F,
) -> Result<Vec<ClassifiedTrade>>
where
    H: FnOnce() -> Result<u64>,
    F: FnMut(u64, u64) -> Result<Vec<RawEvent>>,
{
    let mut trades = Vec::new();
    for event in load_trades(range, head, fetch_events)? {
        let tx_hash = event.tx_hash;
        match ClassifiedTrade::from_event(event, pair)? {
            Some(trade) => trades.push(trade),
            None => debug!(tx_hash = %tx_hash, "skipping off-pair trade"),
        }
    }

    info!(trades = trades.len(), "classified trades on pair");
    Ok(trades)
}

/// ISO-8601 rendering of a Unix timestamp, in UTC.
pub fn iso_timestamp(ts: u64) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|d| d.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| format!("ts={ts}"))
}
