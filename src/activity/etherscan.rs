use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::{
    config::EtherscanSettings,
    models::{BadgeError, Result, TokenActivity},
    utils::truncate_address,
};

/// Reported for addresses that have never transacted: mainnet launch day.
pub const GENESIS_DATE: &str = "2015/07/30";

const NO_TRANSACTIONS: &str = "No transactions found";

/// Etherscan `txlist` client.
pub struct EtherscanClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct TxListEnvelope {
    status: String,
    message: String,
    #[serde(default)]
    result: Value,
}

#[derive(Deserialize)]
struct TxItem {
    #[serde(rename = "timeStamp")]
    time_stamp: String,
}

impl EtherscanClient {
    pub fn new(settings: &EtherscanSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| BadgeError::ConfigError("ETHERSCAN_API_KEY is not set".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| BadgeError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Date of the earliest transaction sent or received by `address`.
    pub async fn get_first_activity_date(&self, address: &str) -> Result<TokenActivity> {
        let payload = self.fetch_transactions(address, "0", "latest").await?;
        first_activity_from_payload(address, payload)
    }

    async fn fetch_transactions(&self, address: &str, start_block: &str, end_block: &str) -> Result<Value> {
        debug!(address = %truncate_address(address), "fetching transaction list");

        let response = self.http_client
            .get(format!("{}/api", self.api_url))
            .query(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", address),
                ("startblock", start_block),
                ("endblock", end_block),
                ("sort", "asc"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Etherscan request failed");
                e
            })?;

        Ok(response.json::<Value>().await?)
    }
}

/// Interpret a raw `txlist` response.
///
/// The explicit "no transactions" reply yields [`GENESIS_DATE`]; any other
/// non-`OK` reply is a provider error carrying the payload.
pub fn first_activity_from_payload(address: &str, payload: Value) -> Result<TokenActivity> {
    let envelope: TxListEnvelope = match serde_json::from_value(payload.clone()) {
        Ok(envelope) => envelope,
        Err(_) => return Err(BadgeError::Provider { payload }),
    };

    if envelope.status == "0" && envelope.message == NO_TRANSACTIONS {
        return Ok(activity(address, GENESIS_DATE.to_string()));
    }

    if envelope.message != "OK" {
        return Err(BadgeError::Provider { payload });
    }

    let items: Vec<TxItem> = match serde_json::from_value(envelope.result) {
        Ok(items) => items,
        Err(_) => return Err(BadgeError::Provider { payload }),
    };

    let Some(first) = items.first() else {
        return Ok(activity(address, GENESIS_DATE.to_string()));
    };

    match format_timestamp(&first.time_stamp) {
        Some(date) => Ok(activity(address, date)),
        None => Err(BadgeError::Provider { payload }),
    }
}

fn activity(address: &str, first_tx_date: String) -> TokenActivity {
    TokenActivity {
        sender_address: address.to_string(),
        first_tx_date,
    }
}

/// Unix seconds to `YYYY/MM/DD` (UTC).
fn format_timestamp(timestamp: &str) -> Option<String> {
    let secs: i64 = timestamp.trim().parse().ok()?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y/%m/%d").to_string())
}
