//! # Compact Targets
//!
//! The 32-bit "nBits" encoding of a 256-bit proof-of-work target.
//!
//! ```text
//! bits = EE MM MM MM    target = mantissa * 256^(exponent - 3)
//! ```
//!
//! Lower target = harder block. The mantissa's high bit is a sign bit in the
//! original format; negative targets are meaningless, so they decode to zero,
//! as do encodings that would overflow 256 bits. No hash can meet a zero
//! target.

use primitive_types::{U256, U512};

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Decode compact bits into a target.
pub fn decode_compact(bits: u32) -> U256 {
    let exponent = bits >> 24;
    let mantissa = bits & MANTISSA_MASK;

    if bits & SIGN_BIT != 0 || mantissa == 0 {
        return U256::zero();
    }

    if exponent <= 3 {
        return U256::from(mantissa >> (8 * (3 - exponent)));
    }

    let overflows = exponent > 34
        || (mantissa > 0xff && exponent > 33)
        || (mantissa > 0xffff && exponent > 32);
    if overflows {
        return U256::zero();
    }

    U256::from(mantissa) << (8 * (exponent - 3) as usize)
}

/// Encode a target into normalized compact bits.
pub fn encode_compact(target: U256) -> u32 {
    let mut size = (target.bits() + 7) / 8;
    let mut mantissa = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        (target >> (8 * (size - 3))).low_u32()
    };

    // keep the sign bit clear
    if mantissa & SIGN_BIT != 0 {
        mantissa >>= 8;
        size += 1;
    }

    mantissa | ((size as u32) << 24)
}

/// Expected number of hashes to find a block at `bits`: `2^256 / (target + 1)`.
///
/// Zero for an unusable (zero) target.
pub fn block_work(bits: u32) -> U256 {
    let target = decode_compact(bits);
    if target.is_zero() {
        return U256::zero();
    }
    // 2^256 / (t + 1) == (~t / (t + 1)) + 1, without leaving 256 bits
    (!target / (target + U256::one())) + U256::one()
}

/// Narrow a 512-bit intermediate back to a target, capped at `max`.
pub(crate) fn cap_target(value: U512, max: U256) -> U256 {
    if value > U512::from(max) {
        return max;
    }
    U256::try_from(value).unwrap_or(max)
}
