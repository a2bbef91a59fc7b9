//! Normalization of plain and shadow texts into character sets.
//!
//! A text is normalized in these steps:
//!
//! 1. Enrichment appends the character groups selected by [`Context::enrichment`] (plain text only).
//! 2. Duplicates are removed, keeping first occurrences. With [`EmojiMatching::Grapheme`] whole grapheme clusters are compared so emoji sequences stay intact.
//! 3. Emoji are replaced by ASCII placeholders such as `:grinning_face:`.
//! 4. Whitespace is removed and placeholder characters that repeat earlier characters are dropped.
//! 5. The plain text is shuffled if [`Context::shuffle`] is set.
//!
//! Normalization is idempotent: normalizing a normalized text does not change it.

use crate::ctx::{Allocation, Context, EmojiMatching};
use crate::data::CharacterSet;
use itertools::Itertools;
use rand::Rng;
use unicode_segmentation::UnicodeSegmentation;

/// The characters appended by [`Enrichment::digits`](crate::ctx::Enrichment::digits).
pub const DIGITS: &str = "0123456789";
/// The characters appended by [`Enrichment::lowercase`](crate::ctx::Enrichment::lowercase).
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
/// The characters appended by [`Enrichment::uppercase`](crate::ctx::Enrichment::uppercase).
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// The bundled supplementary block: the Latin, Greek and Cyrillic letters, punctuation, currency signs and arrows of the bundled source font.
///
/// [`Context::supplement`] replaces it.
pub const COMMON_CHARACTERS: &str = include_str!("../data/common_characters.txt");
/// About 3200 frequent Chinese characters, a supplement for CJK source fonts.
///
/// The bundled source font has no CJK glyphs; set [`Context::source_font`] to a font covering these characters.
///
/// ```no_run
/// # use fontmask::ctx::{Context, Enrichment};
/// # use fontmask::text::COMMON_CHINESE_CHARACTERS;
/// let ctx = Context {
///     enrichment: Enrichment {
///         supplement: true,
///         ..Enrichment::default()
///     },
///     supplement: Some(COMMON_CHINESE_CHARACTERS.to_string()),
///     source_font: Some("fonts/NotoSansSC-Regular.ttf".into()),
///     ..Context::default()
/// };
/// ```
pub const COMMON_CHINESE_CHARACTERS: &str = include_str!("../data/common_chinese_characters.txt");

/// Returns `text` with the character groups selected by the context appended.
pub fn enrich(text: &str, ctx: &Context) -> String {
    let mut text = text.to_string();
    let enrichment = ctx.enrichment;

    if enrichment.digits {
        text.push_str(DIGITS);
    }
    if enrichment.lowercase {
        text.push_str(LOWERCASE);
    }
    if enrichment.uppercase {
        text.push_str(UPPERCASE);
    }
    if enrichment.supplement {
        text.push_str(ctx.supplement.as_deref().unwrap_or(COMMON_CHARACTERS));
    }

    text
}

/// Deduplicates `text`, replaces emoji by placeholders and removes whitespace.
///
/// Placeholders are deduplicated like any other characters, so a placeholder token only survives intact if none of its characters occurred before.
/// Dropping duplicate scalars can join the remaining ones into a new emoji sequence, such as the regional indicators of `🇺🇺🇸`; such sequences are replaced as well, until the set contains no emoji.
///
/// ```
/// # use fontmask::ctx::EmojiMatching;
/// # use fontmask::text::normalize;
/// let set = normalize("hello world", EmojiMatching::Grapheme);
/// assert_eq!(set.to_string(), "helowrd");
///
/// let set = normalize("a b😀a", EmojiMatching::Grapheme);
/// assert_eq!(set.to_string(), "ab:grin_fce");
/// ```
pub fn normalize(text: &str, matching: EmojiMatching) -> CharacterSet {
    let deduplicated: String = match matching {
        EmojiMatching::Grapheme => text.graphemes(true).unique().collect(),
        EmojiMatching::Scalar => text.chars().unique().collect(),
    };
    let mut set: CharacterSet = demojize(&deduplicated, matching).chars().collect();

    // Placeholders are ASCII, so every pass removes emoji scalars until none are left.
    loop {
        let text = set.to_string();
        let demojized = demojize(&text, matching);
        if demojized == text {
            return set;
        }
        log::trace!("deduplication formed new emoji in {:?}", text);
        set = demojized.chars().collect();
    }
}

/// Prepares the plain text: enrichment, normalization and the optional shuffle.
pub fn prepare_plain<R: Rng + ?Sized>(text: &str, ctx: &Context, rng: &mut R) -> CharacterSet {
    let mut set = normalize(&enrich(text, ctx), ctx.emoji_matching);

    if ctx.shuffle {
        if ctx.allocation == Allocation::Shadow {
            log::warn!("shuffling the plain text breaks its correspondence with the shadow text");
        }
        set.shuffle(rng);
    }

    log::debug!("plain text normalized to {} characters", set.len());

    set
}

/// Prepares the shadow text: normalization without enrichment or shuffle.
pub fn prepare_shadow(text: &str, ctx: &Context) -> CharacterSet {
    let set = normalize(text, ctx.emoji_matching);
    log::debug!("shadow text normalized to {} characters", set.len());
    set
}

/// Replaces every emoji in `text` by its placeholder.
///
/// ```
/// # use fontmask::ctx::EmojiMatching;
/// # use fontmask::text::demojize;
/// assert_eq!(demojize("ok 😀", EmojiMatching::Grapheme), "ok :grinning_face:");
/// ```
pub fn demojize(text: &str, matching: EmojiMatching) -> String {
    match matching {
        EmojiMatching::Grapheme => text
            .graphemes(true)
            .map(|grapheme| match lookup(grapheme) {
                Some(emoji) => placeholder(emoji),
                None => demojize_scalars(grapheme),
            })
            .collect(),
        EmojiMatching::Scalar => demojize_scalars(text),
    }
}

fn demojize_scalars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_emoji = false;

    for c in text.chars() {
        if after_emoji && is_emoji_continuation(c) {
            continue;
        }

        match lookup_scalar(c) {
            Some(emoji) => {
                out.push_str(&placeholder(emoji));
                after_emoji = true;
            }
            None => {
                out.push(c);
                after_emoji = false;
            }
        }
    }

    out
}

/// Looks up an emoji, also without variation selectors.
fn lookup(grapheme: &str) -> Option<&'static emojis::Emoji> {
    emojis::get(grapheme).or_else(|| {
        let stripped: String = grapheme
            .chars()
            .filter(|&c| !is_variation_selector(c))
            .collect();
        if stripped.is_empty() || stripped == grapheme {
            None
        } else {
            emojis::get(&stripped)
        }
    })
}

/// Looks up a single scalar, also in its emoji presentation.
fn lookup_scalar(c: char) -> Option<&'static emojis::Emoji> {
    let mut buf = [0; 4];
    emojis::get(c.encode_utf8(&mut buf)).or_else(|| emojis::get(&format!("{}\u{FE0F}", c)))
}

fn is_variation_selector(c: char) -> bool {
    matches!(c, '\u{FE0E}' | '\u{FE0F}')
}

fn is_emoji_continuation(c: char) -> bool {
    is_variation_selector(c) || c == '\u{200D}' || c == '\u{20E3}'
}

/// Returns the placeholder of an emoji: its name in snake case between colons.
fn placeholder(emoji: &emojis::Emoji) -> String {
    let name = emoji
        .name()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .join("_");
    format!(":{}:", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Enrichment;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_normalize_whitespace_and_emoji() {
        let set = normalize("a b😀a", EmojiMatching::Grapheme);
        assert_eq!(&set.as_slice()[..2], ['a', 'b']);
        assert_eq!(set.to_string(), "ab:grin_fce");
        assert!(set.iter().all(|c| !c.is_whitespace()));
        assert_eq!(set.iter().filter(|&&c| c == 'a').count(), 1);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let texts = [
            "a b😀a",
            "  \t\n",
            "Hello, World! 你好，世界",
            "👍🏽 ok ❤️",
            "🇺🇺🇸",
            "x🇺🇺🇸",
            "🇩🇪🇩🇪🇫🇷",
        ];
        for text in texts {
            for matching in [EmojiMatching::Grapheme, EmojiMatching::Scalar] {
                let once = normalize(text, matching);
                let twice = normalize(&once.to_string(), matching);
                assert_eq!(once, twice, "{:?}", text);
            }
        }
    }

    #[test]
    fn test_deduplication_leaves_no_emoji() {
        for text in ["🇺🇺🇸", "x🇺🇺🇸"] {
            let set = normalize(text, EmojiMatching::Grapheme);
            let normalized = set.to_string();
            assert!(normalized.is_ascii(), "{:?} -> {:?}", text, normalized);
            assert_eq!(demojize(&normalized, EmojiMatching::Grapheme), normalized);
        }
    }

    #[test]
    fn test_unicode_whitespace_is_removed() {
        let set = normalize("a\u{3000}b\u{00A0}c\u{2029}", EmojiMatching::Grapheme);
        assert_eq!(set.to_string(), "abc");
    }

    #[test]
    fn test_joined_emoji_become_one_placeholder() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let text = demojize(family, EmojiMatching::Grapheme);
        assert!(text.starts_with(':') && text.ends_with(':'));
        assert_eq!(text.matches(':').count(), 2);
        assert!(text.is_ascii());
    }

    #[test]
    fn test_scalar_matching_drops_variation_selectors() {
        let text = demojize("\u{2764}\u{FE0F}x", EmojiMatching::Scalar);
        assert!(text.is_ascii());
        assert!(text.ends_with(":x"));
    }

    #[test]
    fn test_enrichment() {
        let ctx = Context {
            enrichment: Enrichment {
                digits: true,
                uppercase: true,
                ..Enrichment::default()
            },
            ..Context::default()
        };
        assert_eq!(enrich("x", &ctx), format!("x{}{}", DIGITS, UPPERCASE));

        let ctx = Context {
            enrichment: Enrichment {
                supplement: true,
                ..Enrichment::default()
            },
            supplement: Some("甲乙".to_string()),
            ..Context::default()
        };
        assert_eq!(enrich("x", &ctx), "x甲乙");
    }

    #[test]
    fn test_bundled_supplements_survive_normalization() {
        let set = normalize(COMMON_CHARACTERS, EmojiMatching::Grapheme);
        assert_eq!(set.len(), COMMON_CHARACTERS.trim_end().chars().count());
        assert!(set.contains('é') && set.contains('Ж') && set.contains('€'));

        let set = normalize(COMMON_CHINESE_CHARACTERS, EmojiMatching::Grapheme);
        assert!(set.len() > 3000);
        assert!(set.contains('的'));
    }

    #[test]
    fn test_shuffle_permutes_plain_text() {
        let ctx = Context {
            shuffle: true,
            enrichment: Enrichment {
                lowercase: true,
                ..Enrichment::default()
            },
            ..Context::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let shuffled = prepare_plain("", &ctx, &mut rng);
        let mut sorted = shuffled.as_slice().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, LOWERCASE.chars().collect::<Vec<_>>());
        assert_ne!(shuffled.to_string(), LOWERCASE);

        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(prepare_plain("", &ctx, &mut rng), shuffled);
    }

    #[test]
    fn test_shadow_is_not_enriched() {
        let ctx = Context {
            enrichment: Enrichment {
                digits: true,
                ..Enrichment::default()
            },
            ..Context::default()
        };
        assert_eq!(prepare_shadow("xy", &ctx).to_string(), "xy");
    }
}
