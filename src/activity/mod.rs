pub mod etherscan;

pub use etherscan::{first_activity_from_payload, EtherscanClient, GENESIS_DATE};
