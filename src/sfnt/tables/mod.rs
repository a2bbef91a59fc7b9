//! Compilers for the tables of a TrueType font.
//!
//! Each module compiles one table (`glyf` also compiles `loca`).
//! Tables that summarize the glyph set, such as `head` and `maxp`, read the summary collected by [`glyf::compile`].

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;
