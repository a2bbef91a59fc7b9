//! Allocation of display codepoints.
//!
//! Every plain-text character is assigned the codepoint that will render its glyph in the output font.
//! [`Allocation::Auto`] draws distinct random codepoints from the Private Use Area and is intentionally non-deterministic unless the generator is seeded.
//! [`Allocation::Shadow`] reuses the codepoints of the shadow text position by position.

use crate::ctx::Allocation;
use crate::data::CharacterSet;
use crate::error::{Error, Result};
use rand::seq::index;
use rand::Rng;
use std::ops::Range;

/// The codepoints available to [`Allocation::Auto`].
pub const PRIVATE_USE_RANGE: Range<u32> = 0xE000..0xF8FF;

/// The number of codepoints in [`PRIVATE_USE_RANGE`].
pub const PRIVATE_USE_CAPACITY: usize = (PRIVATE_USE_RANGE.end - PRIVATE_USE_RANGE.start) as usize;

/// Returns one display codepoint per plain-text character, in plain-text order.
///
/// # Errors
///
/// - [`Error::Capacity`] if more than [`PRIVATE_USE_CAPACITY`] characters are auto-allocated.
/// - [`Error::Configuration`] if the shadow text is shorter than the plain text.
///
/// # Example
///
/// ```
/// # use fontmask::alloc::allocate;
/// # use fontmask::ctx::Allocation;
/// # use fontmask::data::CharacterSet;
/// let plain: CharacterSet = "ab".chars().collect();
/// let shadow: CharacterSet = "xyz".chars().collect();
/// let codes = allocate(&plain, &shadow, Allocation::Shadow, &mut rand::thread_rng()).unwrap();
/// assert_eq!(codes, ['x', 'y']);
/// ```
pub fn allocate<R: Rng + ?Sized>(
    plain: &CharacterSet,
    shadow: &CharacterSet,
    allocation: Allocation,
    rng: &mut R,
) -> Result<Vec<char>> {
    match allocation {
        Allocation::Auto => allocate_private_use(plain.len(), rng),
        Allocation::Shadow => allocate_shadow(plain, shadow),
    }
}

/// Samples `count` distinct codepoints from [`PRIVATE_USE_RANGE`] without replacement.
pub fn allocate_private_use<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Result<Vec<char>> {
    if count > PRIVATE_USE_CAPACITY {
        return Err(Error::Capacity {
            requested: count,
            available: PRIVATE_USE_CAPACITY,
        });
    }

    log::debug!("sampling {} private use codepoints", count);

    let codes = index::sample(rng, PRIVATE_USE_CAPACITY, count)
        .into_iter()
        .filter_map(|offset| char::from_u32(PRIVATE_USE_RANGE.start + offset as u32))
        .collect();

    Ok(codes)
}

fn allocate_shadow(plain: &CharacterSet, shadow: &CharacterSet) -> Result<Vec<char>> {
    if shadow.len() < plain.len() {
        return Err(Error::Configuration(format!(
            "the shadow text has {} characters but the plain text needs {}",
            shadow.len(),
            plain.len()
        )));
    }

    if shadow.len() > plain.len() {
        log::debug!(
            "ignoring {} surplus shadow characters",
            shadow.len() - plain.len()
        );
    }

    Ok(shadow.iter().take(plain.len()).copied().collect())
}
