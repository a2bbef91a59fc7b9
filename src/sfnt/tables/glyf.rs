//! # glyf and loca — Glyph Data and Index to Location
//!
//! *Specification:*
//! [OpenType glyf](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf),
//! [OpenType loca](https://docs.microsoft.com/en-us/typography/opentype/spec/loca).
//!
//! Every glyph is written as a simple glyph without instructions.
//! Coordinates are stored as deltas from the previous point; deltas of at most 255 units take one byte and runs of equal flags are packed with the repeat flag.
//! Glyphs without contours have zero length.
//!
//! `loca` always uses long offsets, which `head` announces with `indexToLocFormat = 1`.

use crate::data::{Bounds, FontSpec, HorizontalMetrics, Outline, Point};
use crate::error::{Error, Result};
use crate::util;
use bytes::{BufMut, Bytes, BytesMut};

const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;

/// The compiled `glyf` and `loca` tables with a summary of every glyph.
#[derive(Debug, Clone)]
pub struct GlyfTable {
    /// The `glyf` table.
    pub glyf: Bytes,
    /// The `loca` table with long offsets.
    pub loca: Bytes,
    /// One summary per glyph, in glyph id order.
    pub glyphs: Vec<GlyphSummary>,
}

/// Values of a compiled glyph needed by other tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphSummary {
    /// The bounding box; `None` for glyphs without contours.
    pub bounds: Option<Bounds>,
    /// The number of points.
    pub points: u16,
    /// The number of contours.
    pub contours: u16,
    /// The horizontal metrics.
    pub metrics: HorizontalMetrics,
}

impl GlyfTable {
    /// The union of all glyph bounds, or `None` if no glyph has contours.
    pub fn bounds(&self) -> Option<Bounds> {
        self.glyphs
            .iter()
            .filter_map(|x| x.bounds)
            .reduce(Bounds::union)
    }

    /// The largest number of points in a glyph.
    pub fn max_points(&self) -> u16 {
        self.glyphs.iter().map(|x| x.points).max().unwrap_or(0)
    }

    /// The largest number of contours in a glyph.
    pub fn max_contours(&self) -> u16 {
        self.glyphs.iter().map(|x| x.contours).max().unwrap_or(0)
    }
}

/// Compiles the `glyf` and `loca` tables for the glyphs of `spec` in glyph order.
///
/// # Errors
///
/// - [`Error::UnknownGlyph`] if the glyph order names a glyph without a record.
/// - [`Error::Limit`] if a glyph has more than 65535 points or a coordinate delta exceeds 16 bits.
pub fn compile(spec: &FontSpec) -> Result<GlyfTable> {
    let mut glyf = BytesMut::new();
    let mut loca = BytesMut::with_capacity((spec.glyph_order.len() + 1) * 4);
    let mut glyphs = Vec::with_capacity(spec.glyph_order.len());

    for name in &spec.glyph_order {
        let record = spec.glyph(name)?;

        loca.put_u32(glyf.len() as u32);
        let bounds = compile_glyph(&record.outline, &mut glyf)?;
        glyf.put_bytes(0, util::padding(glyf.len()));

        log::trace!("glyph {}: {} points", name, record.outline.point_count());

        glyphs.push(GlyphSummary {
            bounds,
            points: record.outline.point_count() as u16,
            contours: contours(&record.outline).count() as u16,
            metrics: record.metrics,
        });
    }

    loca.put_u32(glyf.len() as u32);

    log::debug!("glyf: {} bytes for {} glyphs", glyf.len(), glyphs.len());

    Ok(GlyfTable {
        glyf: glyf.freeze(),
        loca: loca.freeze(),
        glyphs,
    })
}

fn contours(outline: &Outline) -> impl Iterator<Item = &Vec<Point>> {
    outline.contours.iter().filter(|x| !x.is_empty())
}

/// Writes a simple glyph and returns its bounds; writes nothing for an empty outline.
fn compile_glyph(outline: &Outline, buf: &mut BytesMut) -> Result<Option<Bounds>> {
    let bounds = match outline.bounds() {
        Some(bounds) if contours(outline).next().is_some() => bounds,
        _ => return Ok(None),
    };

    if outline.point_count() > u16::MAX as usize {
        return Err(Error::Limit(format!(
            "a glyph has {} points, at most {} are supported",
            outline.point_count(),
            u16::MAX
        )));
    }

    let number_of_contours = contours(outline).count() as i16;
    buf.put_i16(number_of_contours);
    buf.put_i16(bounds.x_min);
    buf.put_i16(bounds.y_min);
    buf.put_i16(bounds.x_max);
    buf.put_i16(bounds.y_max);

    let mut end = 0usize;
    for contour in contours(outline) {
        end += contour.len();
        buf.put_u16((end - 1) as u16);
    }

    let instruction_length = 0;
    buf.put_u16(instruction_length);

    let mut flags = Vec::with_capacity(end);
    let mut xs = BytesMut::new();
    let mut ys = BytesMut::new();
    let (mut x, mut y) = (0i32, 0i32);

    for point in contours(outline).flatten() {
        let mut flag = if point.on_curve { ON_CURVE_POINT } else { 0 };
        let (px, py) = (point.x as i32, point.y as i32);
        flag |= encode_delta(px - x, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE, &mut xs)?;
        flag |= encode_delta(py - y, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE, &mut ys)?;
        flags.push(flag);
        x = px;
        y = py;
    }

    pack_flags(&flags, buf);
    buf.put(xs);
    buf.put(ys);

    Ok(Some(bounds))
}

/// Writes a coordinate delta and returns the flag bits describing it.
fn encode_delta(delta: i32, short: u8, same_or_positive: u8, out: &mut BytesMut) -> Result<u8> {
    match delta {
        0 => Ok(same_or_positive),
        -255..=255 => {
            out.put_u8(delta.unsigned_abs() as u8);
            Ok(if delta > 0 { short | same_or_positive } else { short })
        }
        _ => {
            let delta = i16::try_from(delta).map_err(|_| {
                Error::Limit(format!("coordinate delta {} exceeds 16 bits", delta))
            })?;
            out.put_i16(delta);
            Ok(0)
        }
    }
}

/// Writes flags, packing runs of equal flags with [`REPEAT_FLAG`].
fn pack_flags(flags: &[u8], buf: &mut BytesMut) {
    let mut rest = flags;

    while let Some(&flag) = rest.first() {
        let run = rest.iter().take(256).take_while(|&&x| x == flag).count();
        if run > 1 {
            buf.put_u8(flag | REPEAT_FLAG);
            buf.put_u8((run - 1) as u8);
        } else {
            buf.put_u8(flag);
        }
        rest = &rest[run..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GlyphName, GlyphRecord};

    fn point(x: i16, y: i16) -> Point {
        Point {
            x,
            y,
            on_curve: true,
        }
    }

    fn spec(outlines: Vec<Outline>) -> FontSpec {
        let mut spec = FontSpec::default();
        for (index, outline) in outlines.into_iter().enumerate() {
            let name = GlyphName::new(format!("g{}", index));
            spec.glyph_order.push(name.clone());
            spec.glyphs.insert(
                name,
                GlyphRecord {
                    outline,
                    metrics: HorizontalMetrics::default(),
                },
            );
        }
        spec
    }

    #[test]
    fn test_square() {
        let square = Outline {
            contours: vec![vec![
                point(0, 0),
                point(0, 100),
                point(100, 100),
                point(100, 0),
            ]],
        };
        let table = compile(&spec(vec![Outline::default(), square])).unwrap();

        #[rustfmt::skip]
        let expected: &[u8] = &[
            0, 1, 0, 0, 0, 0, 0, 100, 0, 100, // header
            0, 3, // endPtsOfContours
            0, 0, // instructionLength
            0x31, 0x35, 0x33, 0x15, // flags
            100, // x
            100, 100, // y
            0, 0, 0, // padding
        ];
        assert_eq!(&table.glyf[..], expected);
        assert_eq!(&table.loca[..], [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 24]);

        assert_eq!(table.glyphs[0].bounds, None);
        assert_eq!(table.max_points(), 4);
        assert_eq!(table.max_contours(), 1);
        assert_eq!(
            table.bounds(),
            Some(Bounds {
                x_min: 0,
                y_min: 0,
                x_max: 100,
                y_max: 100
            })
        );
    }

    #[test]
    fn test_flags_repeat_and_long_deltas() {
        let mut buf = BytesMut::new();
        pack_flags(&[1, 1, 1, 2, 3, 3], &mut buf);
        assert_eq!(&buf[..], [1 | REPEAT_FLAG, 2, 2, 3 | REPEAT_FLAG, 1]);

        let mut out = BytesMut::new();
        assert_eq!(
            encode_delta(-300, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE, &mut out).unwrap(),
            0
        );
        assert_eq!(&out[..], (-300i16).to_be_bytes());
        assert!(matches!(
            encode_delta(40000, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE, &mut out),
            Err(Error::Limit(_))
        ));
    }

    #[test]
    fn test_long_flag_runs_are_split() {
        let mut buf = BytesMut::new();
        pack_flags(&[7; 300], &mut buf);
        assert_eq!(&buf[..], [7 | REPEAT_FLAG, 255, 7 | REPEAT_FLAG, 43]);
    }
}
