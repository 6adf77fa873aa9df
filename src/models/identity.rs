use serde::{Deserialize, Serialize};

/// Name and avatar reference resolved for one address.
///
/// `avatar_ref` is always loadable: either the ENS avatar URI or a
/// `data:image/png;base64,` identicon derived from the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub name: Option<String>,
    pub avatar_ref: String,
}

/// First on-chain activity of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenActivity {
    pub sender_address: String,
    pub first_tx_date: String,
}
