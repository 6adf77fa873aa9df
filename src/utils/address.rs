use ethers::types::Address;
use std::str::FromStr;
use crate::models::{Result, BadgeError};

/// Parse a `0x`-prefixed, 40 hex character Ethereum address.
///
/// Checksum casing is not verified; mixed case is accepted as-is.
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();

    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return Err(BadgeError::InvalidAddress(input.to_string()));
    }

    Address::from_str(trimmed).map_err(|_| BadgeError::InvalidAddress(input.to_string()))
}

/// Lower-case `0x` hex form, the canonical seed for identicons.
pub fn to_lower_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Shorten an address for logs: `0x1234...abcd`.
pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_char_boundary(6) || !address.is_char_boundary(address.len() - 4) {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
