//! Reconstruction of the live order book from the contract's offer slots.
//!
//! The contract keeps offers in a dense id space with no enumeration
//! primitive: ids are handed out from a counter and a filled or cancelled
//! offer just has its `active` flag cleared. The only way to list what is
//! resting in the book is to visit every id up to the counter.

use crate::amount::format_amount;
use crate::error::Result;

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

/// Progress is logged every this many visited ids.
const PROGRESS_EVERY: u64 = 500;

/// Raw storage record behind one offer id, as returned by `offers(uint256)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferSlot {
    pub sell_amount: U256,
    pub sell_token: Address,
    pub buy_amount: U256,
    pub buy_token: Address,
    pub owner: Address,
    pub active: bool,
    pub timestamp: u64,
}

/// A resting offer in the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub offer_id: u64,
    /// Smallest-unit quantity of `sell_token` on offer.
    pub sell_amount: U256,
    pub sell_token: Address,
    /// Smallest-unit quantity of `buy_token` wanted in return.
    pub buy_amount: U256,
    pub buy_token: Address,
    pub owner: Address,
    /// Unix time the offer was made.
    pub timestamp: u64,
}

impl Offer {
    /// Build an offer from its slot, or `None` if the slot is no longer active.
    pub fn from_slot(offer_id: u64, slot: OfferSlot) -> Option<Self> {
        if !slot.active {
            return None;
        }
        Some(Self {
            offer_id,
            sell_amount: slot.sell_amount,
            sell_token: slot.sell_token,
            buy_amount: slot.buy_amount,
            buy_token: slot.buy_token,
            owner: slot.owner,
            timestamp: slot.timestamp,
        })
    }
}

impl std::fmt::Display for Offer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Offer #{}: {} [{}] for {} [{}] (owner: {})",
            self.offer_id,
            format_amount(self.sell_amount),
            self.sell_token,
            format_amount(self.buy_amount),
            self.buy_token,
            self.owner
        )
    }
}

/// Probe ids `1..=max_id` in ascending order and keep the active ones.
///
/// `max_id` is a snapshot of the offer counter; offers created while the
/// sweep runs are not seen. Any fetch failure aborts the whole sweep.
pub fn list_active_offers<F>(max_id: u64, mut fetch: F) -> Result<Vec<Offer>>
where
    F: FnMut(u64) -> Result<OfferSlot>,
{
    info!(max_id = max_id, "sweeping offer slots");

    let mut offers = Vec::new();
    for offer_id in 1..=max_id {
        let slot = fetch(offer_id)?;
        if let Some(offer) = Offer::from_slot(offer_id, slot) {
            offers.push(offer);
        }
        if offer_id % PROGRESS_EVERY == 0 {
            debug!(offer_id = offer_id, active = offers.len(), "offer sweep progress");
        }
    }

    info!(visited = max_id, active = offers.len(), "offer sweep complete");
    Ok(offers)
}
