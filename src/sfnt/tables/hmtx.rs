//! # hmtx — Horizontal Metrics Table
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx).
//!
//! Trailing glyphs sharing the advance width of the last full metric are stored as left side bearings only.

use super::glyf::{GlyfTable, GlyphSummary};
use bytes::{BufMut, Bytes, BytesMut};

/// The number of full `longHorMetric` records, as announced by `hhea`.
pub fn number_of_h_metrics(glyf: &GlyfTable) -> u16 {
    let advances: Vec<u16> = glyf
        .glyphs
        .iter()
        .map(|x| x.metrics.advance_width)
        .collect();

    match advances.last() {
        Some(&last) => {
            let trailing = advances.iter().rev().take_while(|&&x| x == last).count();
            (advances.len() - trailing + 1) as u16
        }
        None => 0,
    }
}

/// Returns an `hmtx` table for the glyphs.
pub fn compile(glyf: &GlyfTable) -> Bytes {
    let full = number_of_h_metrics(glyf) as usize;
    let length = full * 4 + (glyf.glyphs.len() - full) * 2;
    let mut buf = BytesMut::with_capacity(length);

    let (long, short) = glyf.glyphs.split_at(full);

    for glyph in long {
        buf.put_u16(glyph.metrics.advance_width);
        buf.put_i16(left_side_bearing(glyph));
    }

    for glyph in short {
        buf.put_i16(left_side_bearing(glyph));
    }

    debug_assert_eq!(length, buf.len());

    buf.freeze()
}

/// The left side bearing of a glyph; equal to `xMin` for glyphs with contours.
fn left_side_bearing(glyph: &GlyphSummary) -> i16 {
    glyph
        .bounds
        .map_or(glyph.metrics.left_side_bearing, |bounds| bounds.x_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bounds, HorizontalMetrics};

    fn glyph(advance_width: u16, x_min: Option<i16>) -> GlyphSummary {
        GlyphSummary {
            bounds: x_min.map(|x_min| Bounds {
                x_min,
                y_min: 0,
                x_max: x_min + 10,
                y_max: 10,
            }),
            points: 4,
            contours: 1,
            metrics: HorizontalMetrics {
                advance_width,
                left_side_bearing: 7,
            },
        }
    }

    fn table(glyphs: Vec<GlyphSummary>) -> GlyfTable {
        GlyfTable {
            glyf: Bytes::new(),
            loca: Bytes::new(),
            glyphs,
        }
    }

    #[test]
    fn test_trailing_advances_are_collapsed() {
        let glyf = table(vec![
            glyph(500, Some(5)),
            glyph(600, None),
            glyph(600, Some(-3)),
            glyph(600, Some(2)),
        ]);
        assert_eq!(number_of_h_metrics(&glyf), 2);

        let hmtx = compile(&glyf);
        #[rustfmt::skip]
        let expected: &[u8] = &[
            0x01, 0xF4, 0, 5,
            0x02, 0x58, 0, 7,
            0xFF, 0xFD,
            0, 2,
        ];
        assert_eq!(&hmtx[..], expected);
    }

    #[test]
    fn test_distinct_advances() {
        let glyf = table(vec![glyph(1, None), glyph(2, None)]);
        assert_eq!(number_of_h_metrics(&glyf), 2);
        assert_eq!(compile(&glyf).len(), 8);
        assert_eq!(number_of_h_metrics(&table(Vec::new())), 0);
    }
}
