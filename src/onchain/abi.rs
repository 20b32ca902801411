//! Contract ABI for the matching market and its `LogTake` topic hash.
//!
//! Only the two read methods and the one event we replay are declared.

use alloy::primitives::{b256, keccak256, B256};
use alloy::sol;

sol! {
    #[sol(rpc)]
    contract SimpleMarket {
        /// High-water mark of offer ids handed out so far.
        function last_offer_id() external view returns (uint256);

        /// Storage slot behind one offer id.
        function offers(uint256 id) external view returns (
            uint256 sell_how_much,
            address sell_which_token,
            uint256 buy_how_much,
            address buy_which_token,
            address owner,
            bool active,
            uint64 timestamp
        );

        /// Emitted once per fill, from the maker offer's point of view:
        /// `take_amt` of `pay_gem` left the offer, `give_amt` of `buy_gem`
        /// came in.
        #[derive(Debug)]
        event LogTake(
            bytes32 id,
            bytes32 indexed pair,
            address indexed maker,
            address pay_gem,
            address buy_gem,
            address indexed taker,
            uint128 take_amt,
            uint128 give_amt,
            uint64 timestamp
        );
    }
}

pub const LOG_TAKE_SIGNATURE: &str =
    "LogTake(bytes32,bytes32,address,address,address,address,uint128,uint128,uint64)";

/// keccak256("LogTake(bytes32,bytes32,address,address,address,address,uint128,uint128,uint64)")
pub const LOG_TAKE_TOPIC: B256 =
    b256!("3383e3357c77fd2e3a4b30deea81179bc70a795d053d14d5b7f2f01d0fd4596f");

/// Verify that the pre-computed topic hashes match the event signatures.
/// Call this at startup to catch a signature mismatch before scanning.
pub fn verify_topic_hashes() -> Vec<(String, bool)> {
    let checks = vec![(LOG_TAKE_SIGNATURE, LOG_TAKE_TOPIC)];

    checks
        .into_iter()
        .map(|(sig, expected)| (sig.to_string(), keccak256(sig.as_bytes()) == expected))
        .collect()
}
