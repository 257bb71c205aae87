//! # Hashing
//!
//! Double SHA-256 as used for header hashes and merkle nodes.
//!
//! Hashes are kept in internal byte order (exactly as produced by the hash
//! function). Block explorers show them reversed; the `display` helpers
//! convert between the two.

use sha2::{Digest, Sha256};

use crate::entities::Hash;

/// SHA-256 applied twice.
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut output = [0u8; 32];
    output.copy_from_slice(&second);
    output
}

/// Parent node of two merkle children.
pub fn merkle_parent(left: &Hash, right: &Hash) -> Hash {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left);
    buf[32..].copy_from_slice(right);
    double_sha256(&buf)
}

/// Render a hash in display (reversed, big-endian) order.
pub fn hash_to_display_hex(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Parse a display-order hex string into internal byte order.
pub fn hash_from_display_hex(hex: &str) -> Result<Hash, hex::FromHexError> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(hex, &mut out)?;
    out.reverse();
    Ok(out)
}

/// Flip display-order bytes (for example from `hex_literal::hex!`) into
/// internal byte order. Usable in `const` items.
pub const fn hash_from_display_bytes(display: [u8; 32]) -> Hash {
    let mut out = [0u8; 32];
    let mut i = 0;
    while i < 32 {
        out[i] = display[31 - i];
        i += 1;
    }
    out
}
