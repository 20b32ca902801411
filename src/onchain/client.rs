//! Blocking `MarketReader` over an alloy HTTP provider.
//!
//! alloy is async; each read is driven to completion on a private
//! current-thread tokio runtime, so callers see plain blocking calls and
//! nothing runs concurrently.

use crate::error::{Error, Result};
use crate::offers::OfferSlot;
use crate::onchain::abi::SimpleMarket::{self, SimpleMarketInstance};
use crate::onchain::types::{ArgValue, RawEvent};
use crate::onchain::MarketReader;

use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::{Filter, Log};
use alloy::sol_types::SolEvent;
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// Default number of blocks per `eth_getLogs` request.
pub const DEFAULT_LOG_CHUNK_SIZE: u64 = 10_000;

pub struct RpcMarket {
    runtime: Runtime,
    provider: RootProvider,
    contract: SimpleMarketInstance<RootProvider>,
    address: Address,
    log_chunk_size: u64,
}

impl RpcMarket {
    /// Build a reader for the market at `address` behind `http://host:port`.
    pub fn connect(host: &str, port: u16, address: Address, log_chunk_size: u64) -> Result<Self> {
        let endpoint = format!("http://{host}:{port}");
        let url: reqwest::Url = endpoint
            .parse()
            .map_err(|e| Error::Transport(format!("invalid endpoint {endpoint}: {e}")))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Transport(format!("failed to start runtime: {e}")))?;

        let provider = RootProvider::new_http(url);
        let contract = SimpleMarket::new(address, provider.clone());

        info!(endpoint = %endpoint, contract = %address, "market reader ready");

        Ok(Self {
            runtime,
            provider,
            contract,
            address,
            log_chunk_size: log_chunk_size.max(1),
        })
    }

    /// Query logs in chunks so a full-history scan stays under node range limits.
    fn get_logs_chunked(&self, base_filter: &Filter, from: u64, to: u64) -> Result<Vec<Log>> {
        let mut all_logs = Vec::new();
        let mut start = from;
        while start <= to {
            let end = start.saturating_add(self.log_chunk_size - 1).min(to);
            let filter = base_filter.clone().from_block(start).to_block(end);
            let logs = self
                .runtime
                .block_on(async { self.provider.get_logs(&filter).await })
                .map_err(|e| Error::Transport(e.to_string()))?;
            debug!(from_block = start, to_block = end, logs = logs.len(), "fetched log chunk");
            all_logs.extend(logs);
            if end == u64::MAX {
                break;
            }
            start = end + 1;
        }
        Ok(all_logs)
    }
}

impl MarketReader for RpcMarket {
    fn last_offer_id(&self) -> Result<u64> {
        let counter: U256 = self
            .runtime
            .block_on(async { self.contract.last_offer_id().call().await })
            .map_err(|e| Error::Contract {
                method: "last_offer_id",
                reason: e.to_string(),
            })?;
        u64::try_from(counter).map_err(|_| Error::Contract {
            method: "last_offer_id",
            reason: format!("counter {counter} exceeds u64"),
        })
    }

    fn offer(&self, offer_id: u64) -> Result<OfferSlot> {
        let slot = self
            .runtime
            .block_on(async { self.contract.offers(U256::from(offer_id)).call().await })
            .map_err(|e| Error::Contract {
                method: "offers",
                reason: e.to_string(),
            })?;

        Ok(OfferSlot {
            sell_amount: slot.sell_how_much,
            sell_token: slot.sell_which_token,
            buy_amount: slot.buy_how_much,
            buy_token: slot.buy_which_token,
            owner: slot.owner,
            active: slot.active,
            timestamp: slot.timestamp,
        })
    }

    fn take_events(&self, from_block: u64, to_block: u64) -> Result<Vec<RawEvent>> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(SimpleMarket::LogTake::SIGNATURE_HASH);

        self.get_logs_chunked(&filter, from_block, to_block)?
            .iter()
            .map(raw_event_from_log)
            .collect()
    }

    fn block_number(&self) -> Result<u64> {
        self.runtime
            .block_on(async { self.provider.get_block_number().await })
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

/// Flatten a `LogTake` log into the name → argument mapping the trade
/// decoder consumes.
///
/// `take_amt` is what the maker offer gave up and `give_amt` what the taker
/// handed in, so the taker's `pay_amount` is `give_amt`.
fn raw_event_from_log(log: &Log) -> Result<RawEvent> {
    let tx_hash = log.transaction_hash.ok_or_else(|| Error::Contract {
        method: "LogTake",
        reason: "log without transaction hash".to_string(),
    })?;
    let decoded = log
        .log_decode::<SimpleMarket::LogTake>()
        .map_err(|e| Error::Contract {
            method: "LogTake",
            reason: e.to_string(),
        })?;
    let take = decoded.inner.data;

    Ok(RawEvent::new(tx_hash)
        .with_arg("id", ArgValue::Bytes(take.id.to_vec()))
        .with_arg("maker", ArgValue::Address(take.maker))
        .with_arg("taker", ArgValue::Address(take.taker))
        .with_arg("pay_token", ArgValue::Address(take.pay_gem))
        .with_arg("pay_amount", ArgValue::Uint(U256::from(take.give_amt)))
        .with_arg("buy_token", ArgValue::Address(take.buy_gem))
        .with_arg("buy_amount", ArgValue::Uint(U256::from(take.take_amt)))
        .with_arg("timestamp", ArgValue::Uint(U256::from(take.timestamp))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trades::{ClassifiedTrade, TradeEvent, TradingPair, DAI, WETH};
    use alloy::primitives::{address, B256};

    const MARKET: Address = address!("14FBCA95be7e99C15Cc2996c6C9d841e54B79425");
    const MAKER: Address = address!("00000000000000000000000000000000000000aa");
    const TAKER: Address = address!("00000000000000000000000000000000000000bb");
    const ONE: u128 = 1_000_000_000_000_000_000;

    fn take_log(pay_gem: Address, buy_gem: Address, take_amt: u128, give_amt: u128) -> Log {
        let event = SimpleMarket::LogTake {
            id: B256::left_padding_from(&[0x2a]),
            pair: B256::repeat_byte(0xcc),
            maker: MAKER,
            pay_gem,
            buy_gem,
            taker: TAKER,
            take_amt,
            give_amt,
            timestamp: 1_500_000_000,
        };
        Log {
            inner: alloy::primitives::Log {
                address: MARKET,
                data: event.encode_log_data(),
            },
            transaction_hash: Some(B256::repeat_byte(0x11)),
            ..Default::default()
        }
    }

    fn tape_line(log: &Log) -> String {
        let event = TradeEvent::decode(&raw_event_from_log(log).unwrap()).unwrap();
        ClassifiedTrade::from_event(event, &TradingPair::default())
            .unwrap()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_log_take_amounts() {
        let log = take_log(DAI, WETH, 250 * ONE, ONE);
        let event = TradeEvent::decode(&raw_event_from_log(&log).unwrap()).unwrap();

        assert_eq!(event.tx_hash, B256::repeat_byte(0x11));
        assert_eq!(event.offer_id, U256::from(42u64));
        assert_eq!(event.maker, MAKER);
        assert_eq!(event.taker, TAKER);
        assert_eq!(event.pay_token, DAI);
        assert_eq!(event.pay_amount, U256::from(ONE));
        assert_eq!(event.buy_token, WETH);
        assert_eq!(event.buy_amount, U256::from(250 * ONE));
        assert_eq!(event.timestamp, 1_500_000_000);
        let tx = event.tx_hash;
        assert!(event.to_string().starts_with(&format!(
            "Trade {tx}: 250.000000000000000000 [{DAI}] for 1.000000000000000000 [{WETH}]"
        )));
    }

    #[test]
    fn test_log_take_sell_tape() {
        let tx = B256::repeat_byte(0x11);
        assert_eq!(
            tape_line(&take_log(DAI, WETH, 250 * ONE, ONE)),
            format!("2017-07-14T02:40:00 | sell | price: 250.0 | size: 1.000000000000000000 | {tx}")
        );
    }

    #[test]
    fn test_log_take_buy_tape() {
        let tx = B256::repeat_byte(0x11);
        assert_eq!(
            tape_line(&take_log(WETH, DAI, ONE, 250 * ONE)),
            format!("2017-07-14T02:40:00 | buy | price: 250.0 | size: 1.000000000000000000 | {tx}")
        );
    }

    #[test]
    fn test_log_without_tx_hash_is_fatal() {
        let mut log = take_log(DAI, WETH, ONE, ONE);
        log.transaction_hash = None;
        assert!(matches!(
            raw_event_from_log(&log),
            Err(Error::Contract { method: "LogTake", reason }) if reason == "log without transaction hash"
        ));
    }
}
