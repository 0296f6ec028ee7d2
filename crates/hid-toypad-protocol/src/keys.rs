//! Key A derivation for compatible NFC readers.
//!
//! Each tag's sector key is a function of its UID and a fixed secret
//! schedule baked into the vendor's readers: SHA-1 over `PRE || uid || POST`,
//! then a byte permutation of the digest. The permutation and constants are
//! bit-exact requirements; see the vector tests.

use crate::{ProtocolError, ProtocolResult};
use sha1::{Digest, Sha1};

/// 16-byte prefix of the hashed block.
pub const KEY_PRE: [u8; 16] = [
    0x0A, 0x14, 0xFD, 0x05, 0x07, 0xFF, 0x4B, 0xCD, 0x02, 0x6B, 0xA8, 0x3F, 0x0A, 0x3B, 0x89,
    0xA9,
];

/// 15-byte suffix of the hashed block.
pub const KEY_POST: [u8; 15] = [
    0x28, 0x63, 0x29, 0x20, 0x44, 0x69, 0x73, 0x6E, 0x65, 0x79, 0x20, 0x32, 0x30, 0x31, 0x33,
];

/// Highest sector a compatible tag exposes.
const MAX_SECTOR: u8 = 4;

/// Derive the 6-byte Key A for a tag, rendered lowercase hex.
///
/// `uid_hex` must be 14 lowercase hex characters with the `04` NXP
/// manufacturer prefix. `sector` is validated against the tag layout but
/// does not enter the derivation; every sector of a tag shares the key.
pub fn derive_key_a(uid_hex: &str, sector: u8) -> ProtocolResult<String> {
    if !is_valid_uid_hex(uid_hex) {
        return Err(ProtocolError::InvalidUid(uid_hex.to_string()));
    }
    if sector > MAX_SECTOR {
        return Err(ProtocolError::InvalidSector(sector));
    }

    // Validation above guarantees this decodes.
    let uid = hex::decode(uid_hex).map_err(|_| ProtocolError::InvalidUid(uid_hex.to_string()))?;

    let mut hasher = Sha1::new();
    hasher.update(KEY_PRE);
    hasher.update(&uid);
    hasher.update(KEY_POST);
    let digest = hasher.finalize();

    let key = [
        digest[3], digest[2], digest[1], digest[0], digest[7], digest[6],
    ];
    Ok(hex::encode(key))
}

/// `^04[0-9a-f]{12}$`
fn is_valid_uid_hex(uid_hex: &str) -> bool {
    uid_hex.len() == 14
        && uid_hex.starts_with("04")
        && uid_hex
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_uppercase_uid() {
        assert_eq!(
            derive_key_a("0456263A873A80", 0),
            Err(ProtocolError::InvalidUid("0456263A873A80".to_string()))
        );
    }

    #[test]
    fn test_rejects_wrong_manufacturer_prefix() {
        assert!(matches!(
            derive_key_a("0856263a873a80", 0),
            Err(ProtocolError::InvalidUid(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            derive_key_a("0456263a873a", 0),
            Err(ProtocolError::InvalidUid(_))
        ));
        assert!(matches!(
            derive_key_a("0456263a873a8000", 0),
            Err(ProtocolError::InvalidUid(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_sector() {
        assert_eq!(
            derive_key_a("0456263a873a80", 5),
            Err(ProtocolError::InvalidSector(5))
        );
    }

    #[test]
    fn test_sector_does_not_affect_key() {
        let keys: Vec<_> = (0..=4)
            .map(|sector| derive_key_a("0456263a873a80", sector).expect("valid input"))
            .collect();
        assert!(keys.iter().all(|k| k == &keys[0]));
    }
}
