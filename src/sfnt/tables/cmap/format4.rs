//! # Format 4: Segment mapping to delta values
//!
//! Implementation of the `cmap` format 4 subtable.
//!
//! *Specification:*
//! [OpenType](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values),
//! [TrueType](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html).
//!
//! The entry to this module is the [`compile`] function.
//! It returns a `cmap` format 4 subtable for a given character map.
//!
//! ```
//! # use fontmask::ctx::Context;
//! # use fontmask::data::CharacterMap;
//! # use fontmask::sfnt::tables::cmap::format4::compile;
//! let ctx = Context::default();
//! let mut map = CharacterMap::new();
//! map.insert('A', 1);
//! map.insert('B', 2);
//! map.insert('C', 3);
//! let subtable = compile(&map, &ctx).unwrap();
//! ```
//!
//! [`compile_segments`] allows manual control over the segments used.
//! [`encoding_segments`] returns a segmentation for a character map.
//!
//! ```
//! # use fontmask::ctx::Context;
//! # use fontmask::data::CharacterMap;
//! # use fontmask::sfnt::tables::cmap::format4::{compile_segments, encoding_segments, Segment};
//! # let ctx = Context::default();
//! # let mut map = CharacterMap::new();
//! # map.insert('A', 1);
//! let mut segments = encoding_segments(&map, &ctx);
//! segments.push(Segment::sentinel());
//! let subtable = compile_segments(&map, &segments).unwrap();
//! ```

// ## Segmentation
//
// A segment maps a range of continuous character codes (*codes*) to glyph ids
// (*gids*). A *shift* segment adds one `idDelta` to every code of its range,
// so its gids must be continuous too. A *mix* segment stores the gid of every
// code in `glyphIdArray` and can represent any gids.
//
// A shift segment takes 8 bytes; a mix segment takes 8 bytes plus 2 bytes per
// code. Each run of continuous codes is first cut into shift segments wherever
// the gids are not continuous. When merging is enabled and a single mix
// segment for the whole run is smaller than its shift segments, the run is
// written as a mix segment instead.
//
// Obfuscated fonts map randomly allocated codepoints, so most runs hold a
// single code and are written as shift segments.

use crate::ctx::Context;
use crate::data::CharacterMap;
use crate::error::{Error, Result};
use crate::util;
use bytes::{BufMut, Bytes, BytesMut};
use spans::Spans;
use std::fmt;
use std::mem::size_of;

/// The size in bytes of the subtable header.
const HEADER_SIZE: usize = 7 * size_of::<u16>();
/// The size in bytes of the `reservedPad` field.
const RESERVED_PAD_FIELD_SIZE: usize = size_of::<u16>();
/// The size in bytes of a segment without `glyphIdArray` entries: `endCode`, `startCode`, `idDelta` and `idRangeOffset`.
const SEGMENT_CORE_SIZE: usize = 4 * size_of::<u16>();
/// The size in bytes of a `glyphIdArray` entry.
const GLYPH_ID_ARRAY_FIELD_SIZE: usize = size_of::<u16>();
/// The scalar of the sentinel segment, which ends every format 4 subtable.
pub const SENTINEL_SCALAR: char = '\u{FFFF}';

/// Returns a `cmap` format 4 subtable representing the given character map.
///
/// Mappings outside of the Basic Multilingual Plane are ignored.
///
/// # Errors
///
/// Returns [`Error::Limit`] if the subtable exceeds its 16-bit length field.
pub fn compile(map: &CharacterMap, ctx: &Context) -> Result<Bytes> {
    let mut segments = encoding_segments(map, ctx);
    segments.push(Segment::sentinel());

    log::debug!("cmap format 4: {} segments", segments.len());

    compile_segments(map, &segments)
}

/// Returns a `cmap` format 4 subtable representing the given segments.
///
/// This function does not append a sentinel segment; if one is desired it must be the last element of `segments`.
/// Codes of a segment without a mapping in `map` are mapped to glyph id `0`.
///
/// # Errors
///
/// Returns [`Error::Limit`] if the subtable exceeds its 16-bit length field.
pub fn compile_segments(map: &CharacterMap, segments: &[Segment]) -> Result<Bytes> {
    let length = HEADER_SIZE
        + RESERVED_PAD_FIELD_SIZE
        + segments.iter().map(Segment::size).sum::<usize>();
    let length = u16::try_from(length).map_err(|_| {
        Error::Limit(format!(
            "cmap format 4 subtable of {} bytes exceeds 65535 bytes",
            length
        ))
    })?;

    let mut buf = BytesMut::with_capacity(length as usize);
    let gid = |code: char| map.get(&code).map_or(0, |&x| x);

    buf.put_u16(4); // format
    buf.put_u16(length);
    buf.put_u16(0); // language

    let seg_count = segments.len() as u16;
    let (search_range, entry_selector, range_shift) = util::search_params(seg_count, 2);
    buf.put_u16(seg_count * 2);
    buf.put_u16(search_range);
    buf.put_u16(entry_selector);
    buf.put_u16(range_shift);

    for segment in segments {
        buf.put_u16(segment.end as u16);
    }

    buf.put_u16(0); // reservedPad

    for segment in segments {
        buf.put_u16(segment.start as u16);
    }

    for segment in segments {
        let id_delta = match segment.strategy {
            SegmentEncodingStrategy::Shift => {
                (gid(segment.start) as u16).wrapping_sub(segment.start as u16)
            }
            SegmentEncodingStrategy::Mix => 0,
        };
        buf.put_u16(id_delta);
    }

    // idRangeOffset counts from its own field to the segment's first entry in glyphIdArray
    let mut glyph_id_array_offset = 0;
    for (index, segment) in segments.iter().enumerate() {
        match segment.strategy {
            SegmentEncodingStrategy::Shift => buf.put_u16(0),
            SegmentEncodingStrategy::Mix => {
                let remaining_fields = (segments.len() - index) * size_of::<u16>();
                buf.put_u16((remaining_fields + glyph_id_array_offset) as u16);
                glyph_id_array_offset += segment.len() * GLYPH_ID_ARRAY_FIELD_SIZE;
            }
        }
    }

    for segment in segments
        .iter()
        .filter(|x| x.strategy == SegmentEncodingStrategy::Mix)
    {
        for code in segment.start..=segment.end {
            buf.put_u16(gid(code) as u16);
        }
    }

    debug_assert_eq!(length as usize, buf.len());

    Ok(buf.freeze())
}

/// Returns a segmentation of the given character map suitable for [`compile_segments`].
///
/// Mappings at or above [`SENTINEL_SCALAR`] are ignored.
/// The sentinel segment is not included.
///
/// Runs of continuous codes are merged into mix segments when [`Context::cmap_format4_merge_segments`] is set and that is smaller.
pub fn encoding_segments(map: &CharacterMap, ctx: &Context) -> Vec<Segment> {
    let mappings = map.iter().take_while(|(&code, _)| code < SENTINEL_SCALAR);
    let mut segments = Vec::new();
    let mut runs = mappings.spans_by_key(|(&code, _)| code as u32, |a, b| a + 1 == b);

    while let Some(run) = runs.next() {
        let run: Vec<(char, u32)> = run.map(|(&code, &gid)| (code, gid)).collect();
        let shifts = shift_segments(&run);

        let mix_size = Segment::size_of_mix_segment(run.len());
        let shift_size = shifts.len() * SEGMENT_CORE_SIZE;

        match (run.first(), run.last()) {
            (Some(&(start, _)), Some(&(end, _)))
                if ctx.cmap_format4_merge_segments && mix_size < shift_size =>
            {
                log::trace!("merging {} shift segments into one mix segment", shifts.len());
                segments.push(Segment {
                    start,
                    end,
                    strategy: SegmentEncodingStrategy::Mix,
                });
            }
            _ => segments.extend(shifts),
        }
    }

    segments
}

/// Cuts a run of continuous codes into segments with continuous glyph ids.
fn shift_segments(run: &[(char, u32)]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut previous_gid = None;

    for &(code, gid) in run {
        match segments.last_mut() {
            Some(segment) if previous_gid.and_then(|x: u32| x.checked_add(1)) == Some(gid) => {
                segment.end = code
            }
            _ => segments.push(Segment {
                start: code,
                end: code,
                strategy: SegmentEncodingStrategy::Shift,
            }),
        }
        previous_gid = Some(gid);
    }

    segments
}

/// A range of continuous character codes with an encoding strategy.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Segment {
    /// The start of the continuous character code range.
    pub start: char,
    /// The end of the continuous character code range.
    pub end: char,
    /// The strategy used to encode the segment.
    pub strategy: SegmentEncodingStrategy,
}

impl Segment {
    /// Returns the sentinel segment, which maps [`SENTINEL_SCALAR`] to `.notdef` and ends a list of segments.
    pub fn sentinel() -> Segment {
        Segment {
            start: SENTINEL_SCALAR,
            end: SENTINEL_SCALAR,
            strategy: SegmentEncodingStrategy::Shift,
        }
    }

    /// The size in bytes of a mix segment containing `mappings_count` mappings.
    fn size_of_mix_segment(mappings_count: usize) -> usize {
        SEGMENT_CORE_SIZE + (mappings_count * GLYPH_ID_ARRAY_FIELD_SIZE)
    }

    /// The number of mappings managed by the segment.
    pub fn len(&self) -> usize {
        ((self.end as u32) - (self.start as u32)) as usize + 1
    }

    /// The size in bytes required to represent the segment, including its `glyphIdArray` entries.
    pub fn size(&self) -> usize {
        match self.strategy {
            SegmentEncodingStrategy::Shift => SEGMENT_CORE_SIZE,
            SegmentEncodingStrategy::Mix => Segment::size_of_mix_segment(self.len()),
        }
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.len() == 1 {
            write!(f, "<{:?}>", self.start)
        } else {
            let separator = match self.strategy {
                SegmentEncodingStrategy::Shift => '-',
                SegmentEncodingStrategy::Mix => '#',
            };
            write!(
                f,
                "<{:?}{}{:?} ({})>",
                self.start,
                separator,
                self.end,
                self.len()
            )
        }
    }
}

/// The strategy used to encode a segment.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SegmentEncodingStrategy {
    /// Shifts all codes of the segment by a shared `idDelta`.
    ///
    /// Requires the glyph ids of the segment to be continuous.
    Shift,
    /// Stores the glyph id of every code in `glyphIdArray`.
    Mix,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::Optimization;
    use SegmentEncodingStrategy::{Mix, Shift};

    fn make_character_map(init_key: char, gids: &[u32]) -> CharacterMap {
        (init_key as u32..)
            .filter_map(char::from_u32)
            .zip(gids.iter().copied())
            .collect()
    }

    fn strategies(segments: &[Segment]) -> Vec<(SegmentEncodingStrategy, usize)> {
        segments.iter().map(|x| (x.strategy, x.len())).collect()
    }

    /// Resolves a code the way a reader of the subtable does.
    fn lookup(subtable: &[u8], code: u16) -> u16 {
        let read = |offset: usize| u16::from_be_bytes([subtable[offset], subtable[offset + 1]]);
        let seg_count = read(6) as usize / 2;
        let end_codes = 14;
        let start_codes = end_codes + seg_count * 2 + 2;
        let id_deltas = start_codes + seg_count * 2;
        let id_range_offsets = id_deltas + seg_count * 2;

        for index in 0..seg_count {
            if read(end_codes + index * 2) < code {
                continue;
            }
            let start = read(start_codes + index * 2);
            if start > code {
                return 0;
            }
            let id_delta = read(id_deltas + index * 2);
            let field = id_range_offsets + index * 2;
            let id_range_offset = read(field);
            if id_range_offset == 0 {
                return code.wrapping_add(id_delta);
            }
            return read(field + id_range_offset as usize + (code - start) as usize * 2);
        }
        0
    }

    #[test]
    fn test_runs_are_cut_at_discontinuous_gids() {
        let ctx = Context::new(Optimization::O0);
        let map = make_character_map('A', &[1, 2, 3, 7, 8, 4]);
        let segments = encoding_segments(&map, &ctx);
        assert_eq!(strategies(&segments), [(Shift, 3), (Shift, 2), (Shift, 1)]);
    }

    #[test]
    fn test_merging_prefers_the_smaller_encoding() {
        let ctx = Context::new(Optimization::O1);

        let map = make_character_map('A', &[5, 3, 9, 1]);
        let segments = encoding_segments(&map, &ctx);
        assert_eq!(strategies(&segments), [(Mix, 4)]);

        let map = make_character_map('A', &[1, 2, 3, 4, 9]);
        let segments = encoding_segments(&map, &ctx);
        assert_eq!(strategies(&segments), [(Shift, 4), (Shift, 1)]);
    }

    #[test]
    fn test_isolated_codes() {
        let ctx = Context::new(Optimization::O3);
        let mut map = CharacterMap::new();
        map.insert('\u{E000}', 2);
        map.insert('\u{E0A0}', 3);
        map.insert('\u{F8FE}', 4);
        map.insert('\u{1F600}', 5);
        let segments = encoding_segments(&map, &ctx);
        assert_eq!(segments.len(), 3);
    }

    #[test]
    fn test_subtable_resolves_every_mapping() {
        for o in [Optimization::O0, Optimization::O3] {
            let ctx = Context::new(o);
            let mut map = make_character_map('a', &[9, 4, 5, 6, 2, 30, 31]);
            map.insert('\u{E000}', 3);
            map.insert('\u{E001}', 8);
            map.insert('\u{F000}', 1);

            let subtable = compile(&map, &ctx).unwrap();
            assert_eq!(subtable.len(), u16::from_be_bytes([subtable[2], subtable[3]]) as usize);

            for (&code, &gid) in &map {
                assert_eq!(lookup(&subtable, code as u16), gid as u16, "{:?}", code);
            }
            assert_eq!(lookup(&subtable, 'z' as u16), 0);
            assert_eq!(lookup(&subtable, 0xFFFF), 0);
        }
    }

    #[test]
    fn test_oversized_subtable_is_rejected() {
        let ctx = Context::new(Optimization::O0);
        let map: CharacterMap = (0..9000u32)
            .filter_map(|x| char::from_u32(0x4E00 + x * 2))
            .map(|c| (c, 1))
            .collect();
        assert!(matches!(compile(&map, &ctx), Err(Error::Limit(_))));
    }
}
