use std::collections::HashMap;

use crate::foundation::error::{VinylcastError, VinylcastResult};
use crate::text::builtin;
use crate::text::fonts::{FontFace, OutlineFace, ResolvedFont};

/// Extra transparent border around outline masks so overhanging glyphs are not clipped.
const OUTLINE_PAD: u32 = 4;

/// Measured size of a single line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineMetrics {
    /// Advance width in pixels.
    pub width: u32,
    /// Line height in pixels.
    pub height: u32,
}

/// 8-bit coverage of one rasterized line. `origin_*` is the offset of the mask's top-left
/// corner relative to the line box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageMask {
    pub width: u32,
    pub height: u32,
    pub origin_x: i32,
    pub origin_y: i32,
    pub data: Vec<u8>,
}

impl CoverageMask {
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }
}

/// Measures and rasterizes single lines for any [`ResolvedFont`].
///
/// Outline faces are shaped with parley and filled with vello_cpu; the built-in face uses
/// its bitmap table.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    families: HashMap<String, String>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextShaper")
            .field("registered_faces", &self.families.len())
            .finish()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    pub fn measure(&mut self, font: &ResolvedFont, text: &str) -> VinylcastResult<LineMetrics> {
        check_size(font.size_px)?;
        match &font.face {
            FontFace::Builtin => Ok(LineMetrics {
                width: builtin::text_width(text, font.size_px),
                height: builtin::line_height(font.size_px),
            }),
            FontFace::Outline(face) => {
                let layout = self.layout(face, font.size_px, text)?;
                Ok(LineMetrics {
                    width: layout.width().ceil().max(0.0) as u32,
                    height: layout.height().ceil().max(0.0) as u32,
                })
            }
        }
    }

    pub fn rasterize(&mut self, font: &ResolvedFont, text: &str) -> VinylcastResult<CoverageMask> {
        check_size(font.size_px)?;
        match &font.face {
            FontFace::Builtin => {
                let (width, height, data) = builtin::rasterize(text, font.size_px);
                Ok(CoverageMask {
                    width,
                    height,
                    origin_x: 0,
                    origin_y: 0,
                    data,
                })
            }
            FontFace::Outline(face) => self.rasterize_outline(face, font.size_px, text),
        }
    }

    fn rasterize_outline(
        &mut self,
        face: &OutlineFace,
        size_px: f32,
        text: &str,
    ) -> VinylcastResult<CoverageMask> {
        let layout = self.layout(face, size_px, text)?;
        let width = layout.width().ceil().max(0.0) as u32 + 2 * OUTLINE_PAD;
        let height = layout.height().ceil().max(0.0) as u32 + 2 * OUTLINE_PAD;
        let width_u16 = u16::try_from(width)
            .map_err(|_| VinylcastError::validation(format!("text line too wide: {width}px")))?;
        let height_u16 = u16::try_from(height)
            .map_err(|_| VinylcastError::validation(format!("text line too tall: {height}px")))?;

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::new(face.data.clone()),
            face.index,
        );
        let pad = OUTLINE_PAD as f32;
        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x + pad,
                    y: g.y + pad,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.render_to_pixmap(&mut pixmap);

        // White paint: premultiplied alpha is the coverage.
        let data = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();
        Ok(CoverageMask {
            width,
            height,
            origin_x: -(OUTLINE_PAD as i32),
            origin_y: -(OUTLINE_PAD as i32),
            data,
        })
    }

    fn layout(
        &mut self,
        face: &OutlineFace,
        size_px: f32,
        text: &str,
    ) -> VinylcastResult<parley::Layout<()>> {
        let family_name = self.family_for(face)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Register `face` with parley once and return the family name it registered under.
    fn family_for(&mut self, face: &OutlineFace) -> VinylcastResult<String> {
        let key = format!("{}#{}#{}", face.post_script_name, face.index, face.weight);
        if let Some(name) = self.families.get(&key) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::new(face.data.clone()), None);
        let mut names = Vec::with_capacity(families.len());
        for (id, _) in families {
            if let Some(name) = self.font_ctx.collection.family_name(id) {
                names.push(name.to_string());
            }
        }
        let name = names
            .iter()
            .find(|n| **n == face.family)
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| VinylcastError::validation("no font families registered from font bytes"))?;

        self.families.insert(key, name.clone());
        Ok(name)
    }
}

fn check_size(size_px: f32) -> VinylcastResult<()> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(VinylcastError::validation(
            "text size_px must be finite and > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
