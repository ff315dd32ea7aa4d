//! Cover handling: decoding, squaring, placeholder art and palette extraction.

/// Square cover preparation and placeholder artwork.
pub mod cover;
/// Image decoding and PNG export.
pub mod decode;
/// Dominant-colour extraction.
pub mod palette;
/// SVG rasterization through `resvg`.
pub mod svg_raster;
