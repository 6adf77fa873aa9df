pub mod identicon;
pub mod name_service;

pub use identicon::{identicon_data_uri, Blockie};
pub use name_service::{EnsClient, NameService};

use ethers::types::Address;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    models::{ResolvedIdentity, Result},
    utils::{to_lower_hex, truncate_address},
};

/// Resolves the display name and avatar for an address.
///
/// A missing record always falls back (no name, identicon avatar); only
/// lookup transport failures are returned as errors.
pub struct Resolver {
    names: Arc<dyn NameService>,
}

impl Resolver {
    pub fn new(names: Arc<dyn NameService>) -> Self {
        Self { names }
    }

    pub async fn resolve_name(&self, address: Address) -> Result<Option<String>> {
        self.names.reverse_lookup(address).await
    }

    pub async fn resolve_avatar(&self, address: Address) -> Result<String> {
        let name = self.resolve_name(address).await?;
        self.avatar_for(address, name.as_deref()).await
    }

    /// Name then avatar, sharing the single reverse lookup.
    pub async fn resolve(&self, address: Address) -> Result<ResolvedIdentity> {
        let name = self.resolve_name(address).await?;
        let avatar_ref = self.avatar_for(address, name.as_deref()).await?;

        info!(
            address = %truncate_address(&to_lower_hex(&address)),
            name = name.as_deref().unwrap_or("-"),
            "resolved identity"
        );

        Ok(ResolvedIdentity { name, avatar_ref })
    }

    async fn avatar_for(&self, address: Address, name: Option<&str>) -> Result<String> {
        let Some(name) = name else {
            return identicon_data_uri(&to_lower_hex(&address));
        };

        match self.names.avatar_record(name).await? {
            Some(uri) => Ok(uri),
            None => {
                debug!(name = %name, "falling back to identicon avatar");
                identicon_data_uri(&to_lower_hex(&address))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BadgeError;
    use super::name_service::MockNameService;
    use std::str::FromStr;

    fn addr(s: &str) -> Address {
        Address::from_str(s).unwrap()
    }

    const UNNAMED: &str = "0x742d35cc6634c0532925a3b844bc9e7595f6e842";
    const NAMED: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    #[tokio::test]
    async fn test_unnamed_address_gets_deterministic_identicon() {
        let mut names = MockNameService::new();
        names.expect_reverse_lookup().returning(|_| Ok(None));
        names.expect_avatar_record().never();

        let resolver = Resolver::new(Arc::new(names));
        let first = resolver.resolve_avatar(addr(UNNAMED)).await.unwrap();
        let second = resolver.resolve_avatar(addr(UNNAMED)).await.unwrap();

        assert!(first.starts_with("data:image/png;base64,"));
        assert_eq!(first, second);
        assert_eq!(first, identicon_data_uri(UNNAMED).unwrap());
    }

    #[tokio::test]
    async fn test_named_without_avatar_falls_back() {
        let mut names = MockNameService::new();
        names.expect_reverse_lookup().returning(|_| Ok(Some("vitalik.eth".to_string())));
        names.expect_avatar_record()
            .withf(|name: &str| name == "vitalik.eth")
            .times(1)
            .returning(|_| Ok(None));

        let resolver = Resolver::new(Arc::new(names));
        let identity = resolver.resolve(addr(NAMED)).await.unwrap();

        assert_eq!(identity.name.as_deref(), Some("vitalik.eth"));
        assert_eq!(identity.avatar_ref, identicon_data_uri(NAMED).unwrap());
    }

    #[tokio::test]
    async fn test_named_with_avatar_uses_record() {
        let mut names = MockNameService::new();
        names.expect_reverse_lookup()
            .times(1)
            .returning(|_| Ok(Some("vitalik.eth".to_string())));
        names.expect_avatar_record()
            .returning(|_| Ok(Some("https://euc.li/vitalik.eth".to_string())));

        let resolver = Resolver::new(Arc::new(names));
        let identity = resolver.resolve(addr(NAMED)).await.unwrap();

        assert_eq!(identity.avatar_ref, "https://euc.li/vitalik.eth");
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let mut names = MockNameService::new();
        names.expect_reverse_lookup()
            .returning(|_| Err(BadgeError::lookup("name", "connection reset")));

        let resolver = Resolver::new(Arc::new(names));

        assert!(matches!(
            resolver.resolve_name(addr(NAMED)).await,
            Err(BadgeError::Lookup { stage: "name", .. })
        ));
        assert!(resolver.resolve(addr(NAMED)).await.is_err());
    }

    #[tokio::test]
    async fn test_avatar_transport_failure_is_not_masked() {
        let mut names = MockNameService::new();
        names.expect_reverse_lookup().returning(|_| Ok(Some("vitalik.eth".to_string())));
        names.expect_avatar_record()
            .returning(|_| Err(BadgeError::lookup("avatar", "timeout")));

        let resolver = Resolver::new(Arc::new(names));

        assert!(matches!(
            resolver.resolve_avatar(addr(NAMED)).await,
            Err(BadgeError::Lookup { stage: "avatar", .. })
        ));
    }
}
