//! Bitmask flags for callers configuring obfuscations with integers.
//!
//! The flags decode into a [`Context`]:
//!
//! ```
//! # use fontmask::ctx::{Allocation, Context};
//! # use fontmask::flags::{Behavior, Output};
//! let ctx = Context::from_flags(
//!     (Behavior::SHADOW | Behavior::DIGITS).bits(),
//!     Output::NATIVE.bits(),
//! )
//! .unwrap();
//! assert_eq!(ctx.allocation, Allocation::Shadow);
//! assert!(ctx.enrichment.digits);
//! assert!(!ctx.output.web);
//! ```

use crate::ctx::{Allocation, Context, Enrichment, OutputFormats};
use crate::error::{Error, Result};
use bitflags::bitflags;

bitflags! {
    /// Selects allocation, shuffling and enrichment.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct Behavior: u32 {
        /// Random Private Use Area codepoints.
        const AUTO = 0x0001;
        /// Codepoints of the shadow text.
        const SHADOW = 0x0002;
        /// Shuffles the plain text.
        const SHUFFLE = 0x0100;
        /// Appends `0` to `9`.
        const DIGITS = 0x1000;
        /// Appends `a` to `z`.
        const LOWERCASE = 0x2000;
        /// Appends `A` to `Z`.
        const UPPERCASE = 0x4000;
        /// Appends the supplementary block of common characters.
        const SUPPLEMENT = 0x8000;
    }
}

bitflags! {
    /// Selects the written file formats.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct Output: u32 {
        /// `.ttf`
        const NATIVE = 0x0001;
        /// `.woff` and `.woff2`
        const WEB = 0x0002;
    }
}

impl Context {
    /// Creates a default context configured by behavior and output bitmasks.
    ///
    /// Without [`Behavior::AUTO`] or [`Behavior::SHADOW`], the allocation defaults to [`Allocation::Auto`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a mask contains unknown bits or both allocation bits are set.
    pub fn from_flags(behavior: u32, output: u32) -> Result<Context> {
        Context::default().with_flags(behavior, output)
    }

    /// Applies behavior and output bitmasks to the context.
    ///
    /// See [`Context::from_flags`].
    pub fn with_flags(mut self, behavior: u32, output: u32) -> Result<Context> {
        let behavior = Behavior::from_bits(behavior).ok_or_else(|| {
            Error::Configuration(format!("unknown behavior flags 0x{:04X}", behavior))
        })?;
        let output = Output::from_bits(output).ok_or_else(|| {
            Error::Configuration(format!("unknown output flags 0x{:04X}", output))
        })?;

        if behavior.contains(Behavior::AUTO | Behavior::SHADOW) {
            return Err(Error::Configuration(
                "auto and shadow allocation are mutually exclusive".to_string(),
            ));
        }

        self.allocation = if behavior.contains(Behavior::SHADOW) {
            Allocation::Shadow
        } else {
            Allocation::Auto
        };
        self.shuffle = behavior.contains(Behavior::SHUFFLE);
        self.enrichment = Enrichment {
            digits: behavior.contains(Behavior::DIGITS),
            lowercase: behavior.contains(Behavior::LOWERCASE),
            uppercase: behavior.contains(Behavior::UPPERCASE),
            supplement: behavior.contains(Behavior::SUPPLEMENT),
        };
        self.output = OutputFormats {
            native: output.contains(Output::NATIVE),
            web: output.contains(Output::WEB),
        };

        log::debug!("decoded flags {:?} {:?}", behavior, output);

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_allocation_bit_defaults_to_auto() {
        let ctx = Context::from_flags(Behavior::SHUFFLE.bits(), 0).unwrap();
        assert_eq!(ctx.allocation, Allocation::Auto);
        assert!(ctx.shuffle);
        assert!(!ctx.output.native && !ctx.output.web);
    }

    #[test]
    fn test_all_enrichment_bits() {
        let ctx = Context::from_flags(0xF001, 0x0003).unwrap();
        assert_eq!(
            ctx.enrichment,
            Enrichment {
                digits: true,
                lowercase: true,
                uppercase: true,
                supplement: true,
            }
        );
        assert!(ctx.output.native && ctx.output.web);
    }

    #[test]
    fn test_invalid_combinations() {
        assert!(matches!(
            Context::from_flags(0x0003, 0x0001),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Context::from_flags(0x0010, 0x0001),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Context::from_flags(0x0001, 0x0004),
            Err(Error::Configuration(_))
        ));
    }
}
