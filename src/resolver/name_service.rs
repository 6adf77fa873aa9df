use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider, ProviderError},
    types::Address,
};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    config::EnsSettings,
    models::{BadgeError, Result},
};

/// Name-service lookups the resolver depends on.
///
/// Implementations return `Ok(None)` when a record simply does not exist and
/// reserve `Err` for transport or configuration failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NameService: Send + Sync {
    /// Primary ENS name for `address`, if one is registered.
    async fn reverse_lookup(&self, address: Address) -> Result<Option<String>>;

    /// URI of the `avatar` record for `name`, if set and resolvable.
    async fn avatar_record(&self, name: &str) -> Result<Option<String>>;
}

/// ENS client backed by a JSON-RPC mainnet provider.
pub struct EnsClient {
    provider: Arc<Provider<Http>>,
    chain_id: u64,
}

impl EnsClient {
    pub fn new(settings: &EnsSettings) -> Result<Self> {
        let url = reqwest::Url::parse(&settings.rpc_url)
            .map_err(|e| BadgeError::ConfigError(format!("Invalid RPC URL: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| BadgeError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let provider = Provider::new(Http::new_with_client(url, http_client));

        Ok(Self {
            provider: Arc::new(provider),
            chain_id: settings.chain_id,
        })
    }

    /// Confirm the endpoint serves the configured chain.
    pub async fn verify_chain(&self) -> Result<()> {
        let chain_id = self.provider.get_chainid().await
            .map_err(|e| BadgeError::lookup("chain id", e))?;

        if chain_id.as_u64() != self.chain_id {
            return Err(BadgeError::ConfigError(
                format!("Chain ID mismatch: expected {}, got {}", self.chain_id, chain_id)
            ));
        }

        info!(chain_id = self.chain_id, "ENS provider chain verified");
        Ok(())
    }
}

/// ENS-level failures that mean "no record", as opposed to a broken transport.
fn is_missing_record(err: &ProviderError) -> bool {
    matches!(
        err,
        ProviderError::EnsError(_) | ProviderError::EnsNotOwned(_) | ProviderError::CustomError(_)
    )
}

/// Run a provider call, turning a panic while decoding a malformed reply
/// (e.g. a bare `0x` from a resolver without the method) into an error string.
async fn guarded<F: Future>(call: F) -> std::result::Result<F::Output, String> {
    AssertUnwindSafe(call)
        .catch_unwind()
        .await
        .map_err(|panic| panic_message(panic.as_ref()))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("malformed provider reply: {}", detail)
}

/// Record values the avatar loader can fetch as-is.
fn is_direct_avatar(record: &str) -> bool {
    reqwest::Url::parse(record)
        .map(|url| matches!(url.scheme(), "http" | "https" | "data" | "ipfs"))
        .unwrap_or(false)
}

impl EnsClient {
    /// Turn a raw `avatar` text record into a fetchable URI. Failures here
    /// (NFT owner check, tokenURI call, metadata fetch, bad URL) mean the
    /// record does not resolve, not that the lookup broke.
    async fn avatar_uri(&self, name: &str, record: &str) -> Option<String> {
        if record.is_empty() {
            return None;
        }

        if is_direct_avatar(record) {
            return Some(record.to_string());
        }

        if !record.starts_with("eip155:") {
            debug!(name = %name, record = %record, "unrecognised avatar record");
            return None;
        }

        let resolved = guarded(self.provider.resolve_avatar(name))
            .await
            .and_then(|result| result.map_err(|e| e.to_string()));

        match resolved {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!(name = %name, error = %e, "NFT avatar did not resolve");
                None
            }
        }
    }
}

#[async_trait]
impl NameService for EnsClient {
    async fn reverse_lookup(&self, address: Address) -> Result<Option<String>> {
        let lookup = guarded(self.provider.lookup_address(address))
            .await
            .map_err(|e| BadgeError::lookup("name", e))?;

        match lookup {
            Ok(name) if name.is_empty() => Ok(None),
            Ok(name) => Ok(Some(name)),
            Err(e) if is_missing_record(&e) => {
                debug!(address = ?address, error = %e, "no primary ENS name");
                Ok(None)
            }
            Err(e) => Err(BadgeError::lookup("name", e)),
        }
    }

    async fn avatar_record(&self, name: &str) -> Result<Option<String>> {
        let field = guarded(self.provider.resolve_field(name, "avatar"))
            .await
            .map_err(|e| BadgeError::lookup("avatar", e))?;

        let record = match field {
            Ok(record) => record,
            Err(e) if is_missing_record(&e) => {
                debug!(name = %name, error = %e, "no ENS avatar record");
                return Ok(None);
            }
            Err(e) => return Err(BadgeError::lookup("avatar", e)),
        };

        Ok(self.avatar_uri(name, record.trim()).await)
    }
}
