//! Source fonts read with `ttf-parser`.
//!
//! TrueType and CFF flavoured fonts are supported; CFF outlines are converted to quadratic contours when copied.

use super::pen::QuadraticPen;
use super::SourceFont;
use crate::data::{GlyphName, HorizontalMetrics, Outline};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use ttf_parser::cmap::Subtable;
use ttf_parser::{Face, GlyphId, PlatformId};

/// Unicode `cmap` subtables in order of preference, as `(platform id, encoding id)`.
const CMAP_PREFERENCE: [(u16, u16); 8] = [
    (3, 10),
    (0, 6),
    (0, 4),
    (3, 1),
    (0, 3),
    (0, 2),
    (0, 1),
    (0, 0),
];

/// A font file read with `ttf-parser`.
///
/// The character map, glyph names and header values are read once when the font is loaded; outlines and metrics are read on demand.
#[derive(Debug)]
pub struct TtfFont {
    data: Vec<u8>,
    glyph_order: Vec<GlyphName>,
    glyph_ids: HashMap<GlyphName, GlyphId>,
    cmap: BTreeMap<char, GlyphName>,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
}

impl TtfFont {
    /// Parses the first font of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontParse`] if `data` is not a supported font.
    pub fn from_data(data: Vec<u8>) -> Result<TtfFont> {
        let (glyph_order, cmap, units_per_em, ascent, descent) = {
            let face = Face::parse(&data, 0)?;
            let glyph_order = glyph_names(&face);
            let cmap = best_cmap(&face, &glyph_order);
            (
                glyph_order,
                cmap,
                face.units_per_em(),
                face.tables().hhea.ascender,
                face.tables().hhea.descender,
            )
        };

        log::debug!(
            "source font has {} glyphs and {} mapped characters",
            glyph_order.len(),
            cmap.len()
        );

        let glyph_ids = glyph_order
            .iter()
            .enumerate()
            .map(|(gid, name)| (name.clone(), GlyphId(gid as u16)))
            .collect();

        Ok(TtfFont {
            data,
            glyph_order,
            glyph_ids,
            cmap,
            units_per_em,
            ascent,
            descent,
        })
    }

    fn face(&self) -> Result<Face<'_>> {
        Ok(Face::parse(&self.data, 0)?)
    }

    fn glyph_id(&self, name: &GlyphName) -> Result<GlyphId> {
        self.glyph_ids
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownGlyph(name.clone()))
    }
}

impl SourceFont for TtfFont {
    fn best_cmap(&self) -> BTreeMap<char, GlyphName> {
        self.cmap.clone()
    }

    fn glyph_order(&self) -> Vec<GlyphName> {
        self.glyph_order.clone()
    }

    fn outline(&self, name: &GlyphName) -> Result<Outline> {
        let gid = self.glyph_id(name)?;
        let mut pen = QuadraticPen::new();
        // `None` for glyphs without contours, e.g. spaces
        self.face()?.outline_glyph(gid, &mut pen);
        Ok(pen.finish())
    }

    fn metrics(&self, name: &GlyphName) -> Result<HorizontalMetrics> {
        let gid = self.glyph_id(name)?;
        let face = self.face()?;
        Ok(HorizontalMetrics {
            advance_width: face.glyph_hor_advance(gid).unwrap_or(0),
            left_side_bearing: face.glyph_hor_side_bearing(gid).unwrap_or(0),
        })
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn ascent(&self) -> i16 {
        self.ascent
    }

    fn descent(&self) -> i16 {
        self.descent
    }
}

/// Returns unique names for all glyphs, synthesizing names the font does not provide.
fn glyph_names(face: &Face<'_>) -> Vec<GlyphName> {
    let mut seen = HashSet::new();

    (0..face.number_of_glyphs())
        .map(|gid| {
            let name = match face.glyph_name(GlyphId(gid)) {
                Some(name) if !seen.contains(name) => GlyphName::new(name),
                _ if gid == 0 => GlyphName::notdef(),
                _ => GlyphName::new(format!("glyph{:05}", gid)),
            };
            seen.insert(name.as_str().to_string());
            name
        })
        .collect()
}

fn cmap_preference(subtable: &Subtable<'_>) -> Option<usize> {
    let platform_id = match subtable.platform_id {
        PlatformId::Unicode => 0,
        PlatformId::Windows => 3,
        _ => return None,
    };
    CMAP_PREFERENCE
        .iter()
        .position(|&key| key == (platform_id, subtable.encoding_id))
}

/// Reads the preferred Unicode subtable, skipping mappings to `.notdef`.
fn best_cmap(face: &Face<'_>, glyph_order: &[GlyphName]) -> BTreeMap<char, GlyphName> {
    let mut map = BTreeMap::new();

    let subtable = face.tables().cmap.and_then(|cmap| {
        cmap.subtables
            .into_iter()
            .filter_map(|subtable| cmap_preference(&subtable).map(|rank| (rank, subtable)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, subtable)| subtable)
    });

    let subtable = match subtable {
        Some(subtable) => subtable,
        None => {
            log::warn!("source font has no Unicode character map");
            return map;
        }
    };

    log::debug!(
        "using cmap subtable {:?}/{}",
        subtable.platform_id,
        subtable.encoding_id
    );

    subtable.codepoints(|code| {
        let c = match char::from_u32(code) {
            Some(c) => c,
            None => return,
        };
        if let Some(gid) = subtable.glyph_index(code).filter(|gid| gid.0 != 0) {
            if let Some(name) = glyph_order.get(gid.0 as usize) {
                map.insert(c, name.clone());
            }
        }
    });

    map
}
