//! Identity and color utilities.
//!
//! Ids are short opaque strings, unique enough to avoid collisions within a
//! single session. They are not cryptographically unique and collisions are
//! not detected.

use crate::rng::DeterministicRng;

/// Number of characters in a generated id.
pub const ID_LEN: usize = 9;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Mints a new base-36 id of [`ID_LEN`] characters.
pub fn generate_id(rng: &mut dyn DeterministicRng) -> String {
    (0..ID_LEN)
        .map(|_| {
            let digit = rng.next_u32_range(0, 35) as usize;
            char::from(ID_ALPHABET[digit])
        })
        .collect()
}

/// Derives a `#RRGGBB` color from a display name.
///
/// Polynomial rolling hash (`hash * 31 + code`) over UTF-16 code units with
/// signed 32-bit wrap-around, folded into the low 24 bits. The same name maps
/// to the same color in every process.
#[must_use]
pub fn string_to_color(name: &str) -> String {
    let hash = name.encode_utf16().fold(0_i32, |hash, unit| {
        i32::from(unit).wrapping_add((hash << 5).wrapping_sub(hash))
    });
    format!("#{:06X}", hash & 0x00ff_ffff)
}
