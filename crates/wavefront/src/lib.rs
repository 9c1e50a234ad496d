//! Wavefront OBJ/MTL loading: turn geometry and material text into
//! flat, render-ready vertex/index/color buffers, one set per named
//! object or group.
//!
//! The parsers are pure string-to-data transforms. No file access
//! happens here (`mtllib` is informational; the caller supplies the
//! material text) and no state is shared between calls, so separate
//! models can be loaded in parallel without coordination.
//!
//! The default entry points never fail: malformed or unrecognized
//! lines are logged and skipped so a partially correct model still
//! loads. The `_strict` variants instead reject the document on the
//! first malformed line.

pub mod error;
pub mod material;
pub mod model;
pub mod obj;

pub use error::{ErrorKind, ParseError};
pub use material::{Material, MaterialLibrary, parse_materials, parse_materials_strict};
pub use model::ObjectModel;
pub use obj::{parse_geometry, parse_geometry_strict};

/// Iterate over the content lines of a document: 1-based line number,
/// trimmed text, blanks and `#` comments dropped.
pub(crate) fn directive_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

pub(crate) fn parse_float(token: Option<&str>, line: usize) -> Result<f32, ParseError> {
    let token = token.ok_or_else(|| ErrorKind::MissingField("numeric argument").at(line))?;
    token
        .parse::<f32>()
        .map_err(|_| ErrorKind::MalformedNumber(token.to_string()).at(line))
}

pub(crate) fn parse_vec3<'a, I: Iterator<Item = &'a str>>(
    parts: &mut I,
    line: usize,
) -> Result<[f32; 3], ParseError> {
    Ok([
        parse_float(parts.next(), line)?,
        parse_float(parts.next(), line)?,
        parse_float(parts.next(), line)?,
    ])
}

pub(crate) fn parse_vec2<'a, I: Iterator<Item = &'a str>>(
    parts: &mut I,
    line: usize,
) -> Result<[f32; 2], ParseError> {
    Ok([
        parse_float(parts.next(), line)?,
        parse_float(parts.next(), line)?,
    ])
}
