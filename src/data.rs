//! The data model of an obfuscation.
//!
//! All values are created fresh for each obfuscation and dropped once the output font is written.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maps Unicode scalers to glyph ids.
///
/// A `BTreeMap` is used since a character map is frequently accessed in ascending order of character codes.
pub type CharacterMap = BTreeMap<char, u32>;

/// An ordered sequence of distinct, non-whitespace characters.
///
/// Collecting into a `CharacterSet` keeps the first occurrence of every character and drops whitespace, so the invariants hold for every value of this type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CharacterSet(Vec<char>);

impl CharacterSet {
    /// Creates an empty character set.
    pub fn new() -> Self {
        CharacterSet(Vec::new())
    }

    /// The number of characters in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set contains no characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `c` is part of the set.
    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    /// The characters in order.
    pub fn as_slice(&self) -> &[char] {
        &self.0
    }

    /// Returns an iterator over the characters in order.
    pub fn iter(&self) -> std::slice::Iter<'_, char> {
        self.0.iter()
    }

    /// Permutes the characters uniformly at random.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.0.shuffle(rng);
    }
}

impl FromIterator<char> for CharacterSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let chars = iter
            .into_iter()
            .filter(|c| !c.is_whitespace())
            .filter(|&c| seen.insert(c))
            .collect();
        CharacterSet(chars)
    }
}

impl<'a> IntoIterator for &'a CharacterSet {
    type Item = &'a char;
    type IntoIter = std::slice::Iter<'a, char>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

/// The name of a glyph.
///
/// Names are either passed through from the source font (`.notdef`, the null glyph) or derived from the codepoint a glyph is mapped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlyphName(String);

impl GlyphName {
    /// The name of the glyph rendered for characters a font does not cover.
    pub const NOTDEF: &'static str = ".notdef";

    /// Creates a glyph name.
    pub fn new(name: impl Into<String>) -> Self {
        GlyphName(name.into())
    }

    /// The `.notdef` glyph name.
    pub fn notdef() -> Self {
        GlyphName::new(GlyphName::NOTDEF)
    }

    /// Derives the name of the glyph mapped to `code`.
    ///
    /// BMP codepoints are named `uniXXXX`, codepoints beyond the BMP `uXXXXX`.
    ///
    /// ```
    /// # use fontmask::data::GlyphName;
    /// assert_eq!(GlyphName::for_codepoint('\u{E000}').as_str(), "uniE000");
    /// assert_eq!(GlyphName::for_codepoint('\u{1F600}').as_str(), "u1F600");
    /// ```
    pub fn for_codepoint(code: char) -> Self {
        let code = code as u32;
        if code <= 0xFFFF {
            GlyphName(format!("uni{:04X}", code))
        } else {
            GlyphName(format!("u{:05X}", code))
        }
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `.notdef` glyph.
    pub fn is_notdef(&self) -> bool {
        self.0 == GlyphName::NOTDEF
    }

    /// Whether this is the null glyph.
    pub fn is_null(&self) -> bool {
        matches!(self.0.as_str(), "null" | ".null" | "NULL")
    }
}

impl fmt::Display for GlyphName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A point of a TrueType contour.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Point {
    /// The horizontal position in font units.
    pub x: i16,
    /// The vertical position in font units.
    pub y: i16,
    /// Whether the point lies on the curve or is a quadratic control point.
    pub on_curve: bool,
}

/// The bounding box of an outline.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Bounds {
    /// The minimum horizontal position.
    pub x_min: i16,
    /// The minimum vertical position.
    pub y_min: i16,
    /// The maximum horizontal position.
    pub x_max: i16,
    /// The maximum vertical position.
    pub y_max: i16,
}

impl Bounds {
    /// Returns the smallest bounds containing both `self` and `other`.
    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// The quadratic outline of a glyph.
///
/// Each contour is a closed sequence of points.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Outline {
    /// The closed contours of the outline.
    pub contours: Vec<Vec<Point>>,
}

impl Outline {
    /// Whether the outline has no points, as for a space glyph.
    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(Vec::is_empty)
    }

    /// The total number of points over all contours.
    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// The bounding box of all points, or `None` for an empty outline.
    pub fn bounds(&self) -> Option<Bounds> {
        self.contours
            .iter()
            .flatten()
            .map(|p| Bounds {
                x_min: p.x,
                y_min: p.y,
                x_max: p.x,
                y_max: p.y,
            })
            .reduce(Bounds::union)
    }
}

/// The horizontal metrics of a glyph.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct HorizontalMetrics {
    /// The advance width in font units.
    pub advance_width: u16,
    /// The left side bearing in font units.
    pub left_side_bearing: i16,
}

/// A glyph copied from a source font.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct GlyphRecord {
    /// The outline of the glyph.
    pub outline: Outline,
    /// The horizontal metrics of the glyph.
    pub metrics: HorizontalMetrics,
}

/// Identifies a record of the `name` table.
///
/// The discriminants are the name ids of the OpenType specification.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum NameId {
    /// Copyright notice.
    Copyright = 0,
    /// Font family name.
    FamilyName = 1,
    /// Font subfamily (style) name.
    StyleName = 2,
    /// Unique font identifier.
    UniqueId = 3,
    /// Full font name.
    FullName = 4,
    /// Version string.
    Version = 5,
    /// PostScript name.
    PostScriptName = 6,
    /// Trademark notice.
    Trademark = 7,
    /// Manufacturer name.
    Manufacturer = 8,
    /// Designer name.
    Designer = 9,
    /// Description of the typeface.
    Description = 10,
    /// URL of the vendor.
    VendorUrl = 11,
    /// URL of the designer.
    DesignerUrl = 12,
    /// License description.
    LicenseDescription = 13,
    /// URL of the license.
    LicenseUrl = 14,
    /// Typographic family name.
    TypographicFamily = 16,
    /// Typographic subfamily name.
    TypographicSubfamily = 17,
    /// Compatible full name (Macintosh only).
    CompatibleFullName = 18,
    /// Sample text.
    SampleText = 19,
}

impl NameId {
    /// Returns the name id for a conventional field key such as `copyright` or `fullName`, or `None` if the key is unknown.
    pub fn from_key(key: &str) -> Option<NameId> {
        match key {
            "copyright" => Some(NameId::Copyright),
            "familyName" => Some(NameId::FamilyName),
            "styleName" => Some(NameId::StyleName),
            "uniqueFontIdentifier" => Some(NameId::UniqueId),
            "fullName" => Some(NameId::FullName),
            "version" => Some(NameId::Version),
            "psName" => Some(NameId::PostScriptName),
            "trademark" => Some(NameId::Trademark),
            "manufacturer" => Some(NameId::Manufacturer),
            "designer" => Some(NameId::Designer),
            "description" => Some(NameId::Description),
            "vendorURL" => Some(NameId::VendorUrl),
            "designerURL" => Some(NameId::DesignerUrl),
            "licenseDescription" => Some(NameId::LicenseDescription),
            "licenseInfoURL" => Some(NameId::LicenseUrl),
            "typographicFamily" => Some(NameId::TypographicFamily),
            "typographicSubfamily" => Some(NameId::TypographicSubfamily),
            "compatibleFullName" => Some(NameId::CompatibleFullName),
            "sampleText" => Some(NameId::SampleText),
            _ => None,
        }
    }

    /// The numeric name id.
    pub fn id(self) -> u16 {
        self as u16
    }
}

/// The naming fields of an output font.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NameTableSpec {
    /// The name of the font family.
    pub family_name: String,
    /// The style name of the font.
    pub style_name: String,
    /// Additional records, overriding derived records of the same id.
    pub extra: BTreeMap<NameId, String>,
}

impl Default for NameTableSpec {
    fn default() -> Self {
        NameTableSpec::new("CustomAwesomeFont", "Regular")
    }
}

impl NameTableSpec {
    /// Creates naming fields for a family and style.
    pub fn new(family_name: impl Into<String>, style_name: impl Into<String>) -> Self {
        NameTableSpec {
            family_name: family_name.into(),
            style_name: style_name.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Sets an extra field by its conventional key, e.g. `"copyright"` or `"licenseDescription"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the key does not name a `name` table record.
    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Result<Self> {
        let id = NameId::from_key(key)
            .ok_or_else(|| Error::Configuration(format!("unknown name field '{}'", key)))?;
        self.extra.insert(id, value.into());
        Ok(self)
    }

    /// The PostScript name, `family-style` without characters PostScript names disallow.
    ///
    /// ```
    /// # use fontmask::data::NameTableSpec;
    /// let names = NameTableSpec::new("Custom Font", "Bold");
    /// assert_eq!(names.postscript_name(), "CustomFont-Bold");
    /// ```
    pub fn postscript_name(&self) -> String {
        format!("{}-{}", self.family_name, self.style_name)
            .chars()
            .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
            .collect()
    }

    /// All records of the `name` table in order of name id.
    pub fn records(&self) -> BTreeMap<NameId, String> {
        let mut records = BTreeMap::new();
        let postscript_name = self.postscript_name();
        records.insert(NameId::FamilyName, self.family_name.clone());
        records.insert(NameId::StyleName, self.style_name.clone());
        records.insert(NameId::UniqueId, postscript_name.clone());
        records.insert(
            NameId::FullName,
            format!("{} {}", self.family_name, self.style_name),
        );
        records.insert(NameId::Version, "Version 1.000".to_string());
        records.insert(NameId::PostScriptName, postscript_name);

        for (&id, value) in &self.extra {
            records.insert(id, value.clone());
        }

        records
    }
}

/// Everything needed to compile an output font.
#[derive(Debug, Default, Clone)]
pub struct FontSpec {
    /// The design units per em, copied from the source font.
    pub units_per_em: u16,
    /// The ascent, copied from the source font.
    pub ascent: i16,
    /// The descent, copied from the source font.
    pub descent: i16,
    /// The glyphs in glyph id order.
    pub glyph_order: Vec<GlyphName>,
    /// Maps display codepoints to glyphs.
    pub cmap: BTreeMap<char, GlyphName>,
    /// The outline and metrics of every glyph in `glyph_order`.
    pub glyphs: HashMap<GlyphName, GlyphRecord>,
    /// The naming fields.
    pub names: NameTableSpec,
}

impl FontSpec {
    /// Returns the glyph record for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownGlyph`] if the glyph is not part of the spec.
    pub fn glyph(&self, name: &GlyphName) -> Result<&GlyphRecord> {
        self.glyphs
            .get(name)
            .ok_or_else(|| Error::UnknownGlyph(name.clone()))
    }

    /// Resolves the cmap to glyph ids using the glyph order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownGlyph`] if the cmap references a glyph missing from the glyph order.
    pub fn character_map(&self) -> Result<CharacterMap> {
        let ids: HashMap<&GlyphName, u32> = self
            .glyph_order
            .iter()
            .enumerate()
            .map(|(gid, name)| (name, gid as u32))
            .collect();

        self.cmap
            .iter()
            .map(|(&code, name)| {
                ids.get(name)
                    .map(|&gid| (code, gid))
                    .ok_or_else(|| Error::UnknownGlyph(name.clone()))
            })
            .collect()
    }
}

/// The display codepoint assigned to a plain-text character.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayCode(pub char);

impl DisplayCode {
    /// The numeric codepoint.
    pub fn codepoint(self) -> u32 {
        self.0 as u32
    }

    /// The codepoint as a hexadecimal HTML numeric character reference.
    ///
    /// ```
    /// # use fontmask::data::DisplayCode;
    /// assert_eq!(DisplayCode('\u{E000}').html_escape(), "&#xE000;");
    /// ```
    pub fn html_escape(self) -> String {
        format!("&#x{:X};", self.codepoint())
    }

    /// The codepoint as a CSS escape, suitable for the `content` property.
    ///
    /// ```
    /// # use fontmask::data::DisplayCode;
    /// assert_eq!(DisplayCode('\u{E01A}').css_escape(), "\\E01A");
    /// ```
    pub fn css_escape(self) -> String {
        format!("\\{:X}", self.codepoint())
    }
}

impl fmt::Display for DisplayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html_escape())
    }
}

/// Maps each plain-text character to the codepoint that renders it in the output font.
///
/// Entries keep the order of the (possibly shuffled) plain text.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObfuscationMap(IndexMap<char, DisplayCode>);

impl ObfuscationMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        ObfuscationMap(IndexMap::new())
    }

    pub(crate) fn insert(&mut self, plain: char, display: DisplayCode) -> Option<DisplayCode> {
        self.0.insert(plain, display)
    }

    /// Returns the display codepoint of `plain`.
    pub fn get(&self, plain: char) -> Option<DisplayCode> {
        self.0.get(&plain).copied()
    }

    /// The number of mapped characters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no character is mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the entries in plain-text order.
    pub fn iter(&self) -> impl Iterator<Item = (char, DisplayCode)> + '_ {
        self.0.iter().map(|(&plain, &display)| (plain, display))
    }

    /// Rewrites `text` into HTML character references, keeping unmapped characters.
    ///
    /// ```
    /// # use fontmask::data::{DisplayCode, ObfuscationMap};
    /// let map: ObfuscationMap = [('a', DisplayCode('\u{E000}'))].into_iter().collect();
    /// assert_eq!(map.encode("a b"), "&#xE000; b");
    /// ```
    pub fn encode(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.get(c).map_or_else(|| c.to_string(), DisplayCode::html_escape))
            .collect()
    }

    /// Rewrites `text` into display characters, keeping unmapped characters.
    pub fn obfuscate(&self, text: &str) -> String {
        text.chars()
            .map(|c| self.get(c).map_or(c, |display| display.0))
            .collect()
    }
}

impl FromIterator<(char, DisplayCode)> for ObfuscationMap {
    fn from_iter<I: IntoIterator<Item = (char, DisplayCode)>>(iter: I) -> Self {
        ObfuscationMap(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_set_invariants() {
        let set: CharacterSet = "ab a\tb\nc".chars().collect();
        assert_eq!(set.as_slice(), ['a', 'b', 'c']);
        assert_eq!(set.to_string(), "abc");
    }

    #[test]
    fn test_glyph_name_reserved() {
        assert!(GlyphName::notdef().is_notdef());
        assert!(GlyphName::new("null").is_null());
        assert!(GlyphName::new(".null").is_null());
        assert!(!GlyphName::for_codepoint('a').is_null());
        assert_eq!(GlyphName::for_codepoint('a').as_str(), "uni0061");
    }

    #[test]
    fn test_outline_bounds() {
        let point = |x, y| Point { x, y, on_curve: true };
        let outline = Outline {
            contours: vec![vec![point(10, -20), point(300, 0)], vec![point(5, 700)]],
        };
        assert_eq!(outline.point_count(), 3);
        assert_eq!(
            outline.bounds(),
            Some(Bounds {
                x_min: 5,
                y_min: -20,
                x_max: 300,
                y_max: 700
            })
        );
        assert_eq!(Outline::default().bounds(), None);
        assert!(Outline::default().is_empty());
    }

    #[test]
    fn test_name_records() {
        let names = NameTableSpec::default()
            .with_field("copyright", "(c) nobody")
            .unwrap()
            .with_field("fullName", "Custom Full")
            .unwrap();
        let records = names.records();
        assert_eq!(records[&NameId::FamilyName], "CustomAwesomeFont");
        assert_eq!(records[&NameId::PostScriptName], "CustomAwesomeFont-Regular");
        assert_eq!(records[&NameId::FullName], "Custom Full");
        assert_eq!(records[&NameId::Copyright], "(c) nobody");
        assert!(NameTableSpec::default().with_field("nope", "x").is_err());
    }

    #[test]
    fn test_character_map_resolves_glyph_ids() {
        let mut spec = FontSpec::default();
        spec.glyph_order = vec![GlyphName::notdef(), GlyphName::for_codepoint('\u{E001}')];
        spec.cmap
            .insert('\u{E001}', GlyphName::for_codepoint('\u{E001}'));
        assert_eq!(spec.character_map().unwrap()[&'\u{E001}'], 1);

        spec.cmap.insert('\u{E002}', GlyphName::new("missing"));
        assert!(matches!(spec.character_map(), Err(Error::UnknownGlyph(_))));
    }

    #[test]
    fn test_obfuscation_map_rewrites_text() {
        let mut map = ObfuscationMap::new();
        map.insert('a', DisplayCode('\u{E123}'));
        map.insert('b', DisplayCode('\u{F000}'));
        assert_eq!(map.encode("abz"), "&#xE123;&#xF000;z");
        assert_eq!(map.obfuscate("ba"), "\u{F000}\u{E123}");
        assert_eq!(map.get('b').unwrap().to_string(), "&#xF000;");
    }
}
