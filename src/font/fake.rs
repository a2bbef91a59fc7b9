//! An in-memory source font for tests.

use super::SourceFont;
use crate::data::{GlyphName, GlyphRecord, HorizontalMetrics, Outline, Point};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub(crate) struct FakeFont {
    pub(crate) glyphs: Vec<(GlyphName, GlyphRecord)>,
    pub(crate) cmap: BTreeMap<char, GlyphName>,
}

/// A square outline whose size identifies the glyph.
pub(crate) fn square(size: i16) -> Outline {
    let point = |x, y| Point { x, y, on_curve: true };
    Outline {
        contours: vec![vec![point(0, 0), point(0, size), point(size, size), point(size, 0)]],
    }
}

impl FakeFont {
    /// A font with `.notdef`, `null` and one glyph per character of `chars`.
    pub(crate) fn with_chars(chars: &str) -> Self {
        let mut font = FakeFont::default();
        font.push(GlyphName::notdef(), 100);
        font.push(GlyphName::new("null"), 0);

        for (index, c) in chars.chars().enumerate() {
            let name = GlyphName::new(format!("glyph_{}", c));
            font.push(name.clone(), 200 + index as i16);
            font.cmap.insert(c, name);
        }

        font
    }

    fn push(&mut self, name: GlyphName, size: i16) {
        let record = GlyphRecord {
            outline: if size == 0 { Outline::default() } else { square(size) },
            metrics: HorizontalMetrics {
                advance_width: size as u16 + 50,
                left_side_bearing: 0,
            },
        };
        self.glyphs.push((name, record));
    }

    pub(crate) fn record(&self, name: &GlyphName) -> Result<&GlyphRecord> {
        self.glyphs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, record)| record)
            .ok_or_else(|| Error::UnknownGlyph(name.clone()))
    }
}

impl SourceFont for FakeFont {
    fn best_cmap(&self) -> BTreeMap<char, GlyphName> {
        self.cmap.clone()
    }

    fn glyph_order(&self) -> Vec<GlyphName> {
        self.glyphs.iter().map(|(name, _)| name.clone()).collect()
    }

    fn outline(&self, name: &GlyphName) -> Result<Outline> {
        Ok(self.record(name)?.outline.clone())
    }

    fn metrics(&self, name: &GlyphName) -> Result<HorizontalMetrics> {
        Ok(self.record(name)?.metrics)
    }

    fn units_per_em(&self) -> u16 {
        1000
    }

    fn ascent(&self) -> i16 {
        800
    }

    fn descent(&self) -> i16 {
        -200
    }
}
