use crate::foundation::core::StageLayout;
use crate::foundation::error::{LayerName, VinylcastError, VinylcastResult};
use crate::foundation::frame::PremulImage;
use crate::foundation::math::mul_div255_u8;
use crate::text::fonts::{FontPair, FontResolver, ResolvedFont, resolve_pair};
use crate::text::shaper::{CoverageMask, TextShaper};

pub const BASE_FONT_SIZE: f32 = 60.0;
/// Left and right padding inside the overlay.
pub const SIDE_MARGIN: u32 = 20;
pub const TOP_MARGIN: u32 = 20;
/// Top plus bottom padding counted into the overlay height.
pub const VERTICAL_MARGINS: u32 = 40;
pub const LINE_GAP: u32 = 5;
/// Space between the artist block and the title block.
pub const BLOCK_GAP: u32 = 15;
pub const MIN_OVERLAY_HEIGHT: u32 = 250;
pub const TITLE_SHRINK: f32 = 0.85;
/// A two-line title longer than this many characters is shrunk.
pub const LONG_TITLE_CHARS: usize = 50;
pub const DEFAULT_LABEL: &str = "Unknown";

const SHADOW: [u8; 4] = [0, 0, 0, 200];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const SYNTHETIC_BOLD_PASS: [u8; 4] = [255, 255, 255, 230];

#[rustfmt::skip]
const ARTIST_OUTLINE: [(i32, i32); 16] = [
    (-3, -3), (-3, 0), (-3, 3), (0, -3), (0, 3), (3, -3), (3, 0), (3, 3),
    (-2, -2), (-2, 2), (2, -2), (2, 2), (-1, -1), (-1, 1), (1, -1), (1, 1),
];
#[rustfmt::skip]
const TITLE_OUTLINE: [(i32, i32); 8] = [
    (-2, -2), (-2, 2), (2, -2), (2, 2), (-1, -1), (-1, 1), (1, -1), (1, 1),
];
const LABEL_OUTLINE: [(i32, i32); 4] = [(-2, -2), (-2, 2), (2, -2), (2, 2)];

/// One wrapped line with its measured size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub width: u32,
    pub height: u32,
}

/// Wrapped lines of one run (artist or title) and the font they were measured with.
#[derive(Clone, Debug)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub font: ResolvedFont,
}

impl TextBlock {
    pub fn font_size(&self) -> f32 {
        self.font.size_px
    }

    /// Sum of line heights, each followed by [`LINE_GAP`].
    pub fn height(&self) -> u32 {
        self.lines.iter().map(|l| l.height + LINE_GAP).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockStyle {
    Artist,
    Title,
    Label,
}

/// Everything needed to rasterize the overlay. Computed once per job.
#[derive(Clone, Debug)]
pub struct TextLayout {
    pub artist: Option<TextBlock>,
    pub title: Option<TextBlock>,
    /// Present only when both artist and title are empty.
    pub default_label: Option<TextBlock>,
    pub width: u32,
    pub height: u32,
}

/// The rasterized overlay and where it sits on the stage.
#[derive(Clone, Debug)]
pub struct TextOverlay {
    pub image: PremulImage,
    pub x: i32,
    pub y: i32,
}

impl TextOverlay {
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Greedy word wrap: words are packed while the measured line fits `max_width`. A single
/// word wider than `max_width` gets a line of its own and is never split.
pub fn wrap_text(
    shaper: &mut TextShaper,
    font: &ResolvedFont,
    text: &str,
    max_width: u32,
) -> VinylcastResult<Vec<TextLine>> {
    let mut lines = Vec::new();
    let mut current: Option<TextLine> = None;

    for word in text.split_whitespace() {
        let candidate = match &current {
            Some(line) => format!("{} {word}", line.text),
            None => word.to_string(),
        };
        let m = shaper.measure(font, &candidate)?;
        if m.width <= max_width {
            current = Some(TextLine {
                text: candidate,
                width: m.width,
                height: m.height,
            });
            continue;
        }
        match current.take() {
            Some(done) => {
                lines.push(done);
                let m = shaper.measure(font, word)?;
                let line = TextLine {
                    text: word.to_string(),
                    width: m.width,
                    height: m.height,
                };
                if m.width <= max_width {
                    current = Some(line);
                } else {
                    lines.push(line);
                }
            }
            None => lines.push(TextLine {
                text: candidate,
                width: m.width,
                height: m.height,
            }),
        }
    }
    lines.extend(current);
    Ok(lines)
}

/// Wrap artist (bold) and title (regular) for an overlay `overlay_width` pixels wide and
/// size the overlay.
pub fn layout_text(
    shaper: &mut TextShaper,
    fonts: &FontPair,
    artist: &str,
    title: &str,
    overlay_width: u32,
) -> VinylcastResult<TextLayout> {
    let max_width = overlay_width.saturating_sub(2 * SIDE_MARGIN);
    let artist = artist.trim();
    let title = title.trim();

    let mut height = VERTICAL_MARGINS;

    let artist_block = if artist.is_empty() {
        None
    } else {
        let lines = wrap_text(shaper, &fonts.bold, artist, max_width)?;
        let block = TextBlock {
            lines,
            font: fonts.bold.clone(),
        };
        height += block.height() + BLOCK_GAP;
        Some(block)
    };

    let title_block = if title.is_empty() {
        None
    } else {
        let mut font = fonts.regular.clone();
        let mut lines = wrap_text(shaper, &font, title, max_width)?;
        let long = lines.len() > 2
            || (lines.len() == 2 && title.chars().count() > LONG_TITLE_CHARS);
        if long {
            font = font.with_size((font.size_px * TITLE_SHRINK).floor());
            tracing::debug!(size = font.size_px, "shrinking long title");
            lines = wrap_text(shaper, &font, title, max_width)?;
        }
        let block = TextBlock { lines, font };
        height += block.height();
        Some(block)
    };

    let default_label = if artist_block.is_none() && title_block.is_none() {
        let m = shaper.measure(&fonts.regular, DEFAULT_LABEL)?;
        Some(TextBlock {
            lines: vec![TextLine {
                text: DEFAULT_LABEL.to_string(),
                width: m.width,
                height: m.height,
            }],
            font: fonts.regular.clone(),
        })
    } else {
        None
    };

    Ok(TextLayout {
        artist: artist_block,
        title: title_block,
        default_label,
        width: overlay_width,
        height: height.max(MIN_OVERLAY_HEIGHT),
    })
}

/// Rasterize `layout` into a premultiplied overlay placed at the stage's text slot.
pub fn render_overlay(
    shaper: &mut TextShaper,
    layout: &TextLayout,
    stage: &StageLayout,
) -> VinylcastResult<TextOverlay> {
    let mut image = PremulImage::transparent(layout.width, layout.height);
    let mut y = TOP_MARGIN as i32;

    if let Some(block) = &layout.artist {
        y = draw_block(shaper, &mut image, block, BlockStyle::Artist, y)?;
        y += BLOCK_GAP as i32;
    }
    if let Some(block) = &layout.title {
        draw_block(shaper, &mut image, block, BlockStyle::Title, y)?;
    }
    if let Some(block) = &layout.default_label {
        draw_block(shaper, &mut image, block, BlockStyle::Label, y)?;
    }

    let x = (stage.canvas.width as i32 - layout.width as i32).div_euclid(2);
    Ok(TextOverlay {
        image,
        x,
        y: stage.text_top,
    })
}

/// Resolve fonts, lay out and rasterize the overlay for one job.
#[tracing::instrument(skip(resolver))]
pub fn build_overlay(
    resolver: &dyn FontResolver,
    family: &str,
    artist: &str,
    title: &str,
    stage: &StageLayout,
) -> VinylcastResult<TextOverlay> {
    let fonts = resolve_pair(resolver, family, BASE_FONT_SIZE);
    let mut shaper = TextShaper::new();
    let built = layout_text(&mut shaper, &fonts, artist, title, stage.text_width)
        .and_then(|layout| render_overlay(&mut shaper, &layout, stage));
    built.map_err(|e| match e {
        e @ VinylcastError::LayerConstruction { .. } => e,
        other => VinylcastError::layer(LayerName::Text, other.to_string()),
    })
}

fn draw_block(
    shaper: &mut TextShaper,
    image: &mut PremulImage,
    block: &TextBlock,
    style: BlockStyle,
    mut y: i32,
) -> VinylcastResult<i32> {
    for line in &block.lines {
        let mask = shaper.rasterize(&block.font, &line.text)?;
        let x = (image.width as i32 - line.width as i32).div_euclid(2);
        let outline: &[(i32, i32)] = match style {
            BlockStyle::Artist => &ARTIST_OUTLINE,
            BlockStyle::Title => &TITLE_OUTLINE,
            BlockStyle::Label => &LABEL_OUTLINE,
        };
        for (dx, dy) in outline {
            draw_mask(image, &mask, x + dx, y + dy, SHADOW);
        }
        if style == BlockStyle::Artist && block.font.synthetic_bold {
            draw_mask(image, &mask, x - 1, y - 1, SYNTHETIC_BOLD_PASS);
            draw_mask(image, &mask, x + 1, y + 1, SYNTHETIC_BOLD_PASS);
        }
        draw_mask(image, &mask, x, y, WHITE);
        y += (line.height + LINE_GAP) as i32;
    }
    Ok(y)
}

/// Composite `color` (straight alpha) through `mask` onto `image` with its line box at
/// `(x, y)`. Clipped to the image.
fn draw_mask(image: &mut PremulImage, mask: &CoverageMask, x: i32, y: i32, color: [u8; 4]) {
    let ox = x + mask.origin_x;
    let oy = y + mask.origin_y;
    let iw = image.width as i32;
    let ih = image.height as i32;

    let x0 = ox.max(0);
    let y0 = oy.max(0);
    let x1 = (ox + mask.width as i32).min(iw);
    let y1 = (oy + mask.height as i32).min(ih);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let color_a = u16::from(color[3]);
    for py in y0..y1 {
        let my = (py - oy) as u32;
        for px in x0..x1 {
            let cov = mask.coverage((px - ox) as u32, my);
            if cov == 0 {
                continue;
            }
            let a = mul_div255_u8(u16::from(cov), color_a);
            if a == 0 {
                continue;
            }
            let a16 = u16::from(a);
            let inv = 255 - a16;
            let i = (py as usize * image.width as usize + px as usize) * 4;
            let d = &mut image.data[i..i + 4];
            for ch in 0..3 {
                let s = mul_div255_u8(u16::from(color[ch]), a16);
                d[ch] = s.saturating_add(mul_div255_u8(u16::from(d[ch]), inv));
            }
            d[3] = a.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
