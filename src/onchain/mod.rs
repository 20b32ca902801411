//! Read access to the matching market contract.
//!
//! The reconstruction pipelines only see the [`MarketReader`] trait:
//! - `last_offer_id` / `offer` to sweep the offer slots
//! - `block_number` / `take_events` to replay the trade tape
//!
//! [`RpcMarket`] implements it against a JSON-RPC node via alloy.

pub mod abi;
pub mod client;
pub mod types;

pub use client::RpcMarket;
pub use types::{ArgValue, RawEvent};

use crate::error::Result;
use crate::offers::OfferSlot;

/// Blocking reads against one market contract.
pub trait MarketReader {
    /// Current offer counter (highest id ever assigned).
    fn last_offer_id(&self) -> Result<u64>;

    /// Storage slot behind `offer_id`, active or not.
    fn offer(&self, offer_id: u64) -> Result<OfferSlot>;

    /// Every `LogTake` in `from_block..=to_block`, in block order.
    fn take_events(&self, from_block: u64, to_block: u64) -> Result<Vec<RawEvent>>;

    /// Height of the chain head.
    fn block_number(&self) -> Result<u64>;
}
