//! Printing the two reports.
//!
//! Each report is fully reconstructed before the first line is written, so a
//! failed run prints nothing for that pipeline.

use crate::config::{Config, Mode, TradeFormat};
use crate::error::Result;
use crate::offers::list_active_offers;
use crate::onchain::MarketReader;
use crate::trades::{list_trades, load_trades, BlockRange, TradingPair};

use std::io::Write;
use tracing::info;

/// Print the report selected by `config.mode`. Returns the number of lines.
pub fn run<R: MarketReader, W: Write>(config: &Config, reader: &R, out: &mut W) -> Result<usize> {
    match config.mode {
        Mode::Orders => print_orders(reader, out),
        Mode::Trades => print_trades(reader, &config.range, &config.pair, config.trade_format, out),
    }
}

/// One line per active offer, ascending by id.
pub fn print_orders<R: MarketReader, W: Write>(reader: &R, out: &mut W) -> Result<usize> {
    let last_offer_id = reader.last_offer_id()?;
    info!(last_offer_id = last_offer_id, "read offer counter");

    let offers = list_active_offers(last_offer_id, |id| reader.offer(id))?;
    for offer in &offers {
        writeln!(out, "{offer}")?;
    }
    Ok(offers.len())
}

/// One line per trade in `range`, in block order.
///
/// `Raw` prints every event; `Tape` prints only trades on `pair`.
pub fn print_trades<R: MarketReader, W: Write>(
    reader: &R,
    range: &BlockRange,
    pair: &TradingPair,
    format: TradeFormat,
    out: &mut W,
) -> Result<usize> {
    let head = || reader.block_number();
    let fetch = |from: u64, to: u64| reader.take_events(from, to);

    match format {
        TradeFormat::Raw => {
            let events = load_trades(range, head, fetch)?;
            for event in &events {
                writeln!(out, "{event}")?;
            }
            Ok(events.len())
        }
        TradeFormat::Tape => {
            let trades = list_trades(range, pair, head, fetch)?;
            for trade in &trades {
                writeln!(out, "{trade}")?;
            }
            Ok(trades.len())
        }
    }
}
