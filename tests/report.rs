//! End-to-end report output against an in-memory market.

use alloy::primitives::{address, Address, B256, U256};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use oasis_tape::config::{Config, LoggingConfig, Mode, RpcConfig, TradeFormat};
use oasis_tape::offers::OfferSlot;
use oasis_tape::onchain::{ArgValue, MarketReader, RawEvent};
use oasis_tape::report;
use oasis_tape::trades::{BlockBound, BlockRange, TradingPair, DAI, WETH};
use oasis_tape::{Error, Result};

const MARKET: Address = address!("14FBCA95be7e99C15Cc2996c6C9d841e54B79425");
const OWNER: Address = address!("00000000000000000000000000000000000000aa");
const TAKER: Address = address!("00000000000000000000000000000000000000bb");
const MKR: Address = address!("9f8F72aA9304c8B593d555F12eF6589cC3A579A2");

const ONE: u128 = 1_000_000_000_000_000_000;

struct FakeMarket {
    slots: BTreeMap<u64, OfferSlot>,
    events: Vec<(u64, RawEvent)>,
    heads: Vec<u64>,
    head_calls: Cell<usize>,
    ranges: RefCell<Vec<(u64, u64)>>,
}

impl FakeMarket {
    fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            events: Vec::new(),
            heads: vec![1_000],
            head_calls: Cell::new(0),
            ranges: RefCell::new(Vec::new()),
        }
    }

    fn with_offer(mut self, id: u64, active: bool, sell: u128, buy: u128) -> Self {
        self.slots.insert(
            id,
            OfferSlot {
                sell_amount: U256::from(sell),
                sell_token: DAI,
                buy_amount: U256::from(buy),
                buy_token: WETH,
                owner: OWNER,
                active,
                timestamp: 1_500_000_000,
            },
        );
        self
    }

    fn with_take(
        mut self,
        block: u64,
        tx_byte: u8,
        pay: (Address, u128),
        buy: (Address, u128),
        id: ArgValue,
    ) -> Self {
        let raw = RawEvent::new(B256::repeat_byte(tx_byte))
            .with_arg("id", id)
            .with_arg("maker", ArgValue::Address(OWNER))
            .with_arg("taker", ArgValue::Address(TAKER))
            .with_arg("pay_token", ArgValue::Address(pay.0))
            .with_arg("pay_amount", ArgValue::Uint(U256::from(pay.1)))
            .with_arg("buy_token", ArgValue::Address(buy.0))
            .with_arg("buy_amount", ArgValue::Uint(U256::from(buy.1)))
            .with_arg("timestamp", ArgValue::Uint(U256::from(1_500_000_000u64 + block)));
        self.events.push((block, raw));
        self
    }
}

impl MarketReader for FakeMarket {
    fn last_offer_id(&self) -> Result<u64> {
        Ok(self.slots.keys().next_back().copied().unwrap_or(0))
    }

    fn offer(&self, offer_id: u64) -> Result<OfferSlot> {
        self.slots
            .get(&offer_id)
            .cloned()
            .ok_or_else(|| Error::Transport(format!("no slot {offer_id}")))
    }

    fn take_events(&self, from_block: u64, to_block: u64) -> Result<Vec<RawEvent>> {
        self.ranges.borrow_mut().push((from_block, to_block));
        Ok(self
            .events
            .iter()
            .filter(|(block, _)| (from_block..=to_block).contains(block))
            .map(|(_, raw)| raw.clone())
            .collect())
    }

    fn block_number(&self) -> Result<u64> {
        let n = self.head_calls.get();
        self.head_calls.set(n + 1);
        Ok(self.heads[n.min(self.heads.len() - 1)])
    }
}

fn config(mode: Mode, trade_format: TradeFormat) -> Config {
    Config {
        rpc: RpcConfig::default(),
        contract: MARKET,
        range: BlockRange::default(),
        mode,
        trade_format,
        pair: TradingPair::default(),
        log_chunk_size: 10_000,
        logging: LoggingConfig::default(),
    }
}

fn render(config: &Config, market: &FakeMarket) -> Result<(usize, String)> {
    let mut out = Vec::new();
    let lines = report::run(config, market, &mut out)?;
    Ok((lines, String::from_utf8(out).unwrap()))
}

#[test]
fn orders_report_lists_only_active_offers() {
    let market = FakeMarket::new()
        .with_offer(1, false, ONE, ONE)
        .with_offer(2, true, ONE, ONE / 2)
        .with_offer(3, false, ONE, ONE)
        .with_offer(4, true, 3 * ONE, 1)
        .with_offer(5, false, ONE, ONE);

    let (lines, text) = render(&config(Mode::Orders, TradeFormat::Tape), &market).unwrap();

    assert_eq!(lines, 2);
    assert_eq!(
        text,
        format!(
            "Offer #2: 1.000000000000000000 [{DAI}] for 0.500000000000000000 [{WETH}] (owner: {OWNER})\n\
             Offer #4: 3.000000000000000000 [{DAI}] for 0.000000000000000001 [{WETH}] (owner: {OWNER})\n"
        )
    );
}

#[test]
fn orders_report_prints_nothing_on_failure() {
    // Counter says 3 but slot 2 cannot be read.
    let market = FakeMarket::new()
        .with_offer(1, true, ONE, ONE)
        .with_offer(3, true, ONE, ONE);

    let mut out = Vec::new();
    let result = report::run(&config(Mode::Orders, TradeFormat::Tape), &market, &mut out);
    assert!(matches!(result, Err(Error::Transport(_))));
    assert!(out.is_empty());
}

#[test]
fn tape_report_classifies_and_filters() {
    let market = FakeMarket::new()
        .with_take(10, 0xa1, (DAI, ONE), (WETH, 250 * ONE), ArgValue::Bytes(vec![7]))
        .with_take(11, 0xa2, (MKR, ONE), (DAI, ONE), ArgValue::Bytes(vec![8]))
        .with_take(12, 0xa3, (WETH, 500 * ONE), (DAI, 2 * ONE), ArgValue::Text("\x09".into()));

    let (lines, text) = render(&config(Mode::Trades, TradeFormat::Tape), &market).unwrap();
    let tx1 = B256::repeat_byte(0xa1);
    let tx3 = B256::repeat_byte(0xa3);

    assert_eq!(lines, 2);
    assert_eq!(
        text,
        format!(
            "2017-07-14T02:40:10 | sell | price: 250.0 | size: 1.000000000000000000 | {tx1}\n\
             2017-07-14T02:40:12 | buy | price: 250.0 | size: 2.000000000000000000 | {tx3}\n"
        )
    );
}

#[test]
fn raw_report_prints_every_event() {
    let market = FakeMarket::new()
        .with_take(10, 0xa1, (DAI, 300 * ONE), (WETH, ONE), ArgValue::Bytes(vec![7]))
        .with_take(11, 0xa2, (MKR, ONE), (DAI, 3 * ONE), ArgValue::Bytes(vec![8]));

    let (lines, text) = render(&config(Mode::Trades, TradeFormat::Raw), &market).unwrap();
    let tx2 = B256::repeat_byte(0xa2);

    assert_eq!(lines, 2);
    let second = text.lines().nth(1).unwrap();
    assert_eq!(
        second,
        format!(
            "Trade {tx2}: 3.000000000000000000 [{MKR}] for 1.000000000000000000 [{DAI}] \
             (maker: {OWNER}, taker: {TAKER}, timestamp: 2017-07-14T02:40:11)"
        )
    );
}

#[test]
fn open_range_uses_first_head_only() {
    let mut market = FakeMarket::new()
        .with_take(10, 0xa1, (DAI, ONE), (WETH, ONE), ArgValue::Bytes(vec![1]))
        .with_take(60, 0xa2, (DAI, ONE), (WETH, ONE), ArgValue::Bytes(vec![2]));
    market.heads = vec![50, 100, 150];

    let (lines, _) = render(&config(Mode::Trades, TradeFormat::Tape), &market).unwrap();

    assert_eq!(lines, 1);
    assert_eq!(market.head_calls.get(), 1);
    assert_eq!(*market.ranges.borrow(), vec![(0, 50)]);
}

#[test]
fn fixed_range_is_passed_through() {
    let market = FakeMarket::new();
    let mut cfg = config(Mode::Trades, TradeFormat::Tape);
    cfg.range = BlockRange {
        from_block: 5,
        to_block: BlockBound::Number(9),
    };

    let (lines, _) = render(&cfg, &market).unwrap();

    assert_eq!(lines, 0);
    assert_eq!(market.head_calls.get(), 0);
    assert_eq!(*market.ranges.borrow(), vec![(5, 9)]);
}

#[test]
fn malformed_id_aborts_trades_report() {
    let market = FakeMarket::new()
        .with_take(10, 0xa1, (DAI, ONE), (WETH, ONE), ArgValue::Bytes(vec![1]))
        .with_take(11, 0xa2, (DAI, ONE), (WETH, ONE), ArgValue::Uint(U256::from(2u64)));

    let mut out = Vec::new();
    let result = report::run(&config(Mode::Trades, TradeFormat::Tape), &market, &mut out);
    assert!(matches!(result, Err(Error::UnexpectedIdShape("uint"))));
    assert!(out.is_empty());
}
