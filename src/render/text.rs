//! Report text
//!
//! Glyphs are rasterized with `ab_glyph`. Noto Sans is bundled; a character
//! it has no glyph for is drawn from the first fallback face that has one, so
//! scripts such as Devanagari come from fonts installed on the system. Widths
//! are measured with the same faces that draw them.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, GlyphId, InvalidFont, PxScale, ScaleFont, point};
use image::{Rgba, RgbaImage};

/// Bundled primary face followed by fallbacks in lookup order
#[derive(Clone)]
pub struct FontStack {
    primary: FontArc,
    fallbacks: Vec<FontArc>,
}

impl std::fmt::Debug for FontStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontStack")
            .field("fallbacks", &self.fallbacks.len())
            .finish()
    }
}

fn read_face(path: &Path) -> anyhow::Result<FontArc> {
    let bytes = std::fs::read(path)?;
    Ok(FontArc::try_from_vec(bytes)?)
}

impl FontStack {
    pub fn bundled() -> Result<Self, InvalidFont> {
        Ok(Self {
            primary: FontArc::try_from_slice(notosans::REGULAR_TTF)?,
            fallbacks: Vec::new(),
        })
    }

    /// Bundled face plus every readable font among `fallbacks`
    pub fn load(fallbacks: &[PathBuf]) -> Result<Self, InvalidFont> {
        let mut stack = Self::bundled()?;
        for path in fallbacks {
            match read_face(path) {
                Ok(face) => {
                    log::debug!("Fallback font {}", path.display());
                    stack.fallbacks.push(face);
                }
                Err(err) => log::debug!("Skipping font {}: {err:#}", path.display()),
            }
        }
        Ok(stack)
    }

    pub fn sized(&self, px: u32) -> SizedFont<'_> {
        SizedFont {
            stack: self,
            px: px as f32,
        }
    }

    /// First face with a real glyph for `ch`, else the primary's `.notdef`
    fn face_for(&self, ch: char) -> (&FontArc, GlyphId) {
        std::iter::once(&self.primary)
            .chain(&self.fallbacks)
            .find_map(|face| {
                let id = face.glyph_id(ch);
                (id.0 != 0).then_some((face, id))
            })
            .unwrap_or((&self.primary, GlyphId(0)))
    }
}

/// A font stack at one em size in pixels
#[derive(Clone, Copy)]
pub struct SizedFont<'a> {
    stack: &'a FontStack,
    px: f32,
}

struct Placed<'a> {
    face: &'a FontArc,
    id: GlyphId,
    x: f32,
}

impl<'a> SizedFont<'a> {
    /// ab_glyph scales by ascent-to-descent height, `px` is the em size
    fn scale(&self, face: &FontArc) -> PxScale {
        let upem = face.units_per_em().unwrap_or(1000.0);
        PxScale::from(self.px * face.height_unscaled() / upem)
    }

    pub fn line_height(&self) -> u32 {
        let primary = &self.stack.primary;
        primary.as_scaled(self.scale(primary)).height().ceil() as u32
    }

    fn ascent(&self) -> f32 {
        let primary = &self.stack.primary;
        primary.as_scaled(self.scale(primary)).ascent()
    }

    /// Glyphs with their pen positions, and the final pen position
    fn layout(&self, text: &str) -> (Vec<Placed<'a>>, f32) {
        let mut placed = Vec::new();
        let mut caret = 0.0;
        let mut prev: Option<(&FontArc, GlyphId)> = None;

        for ch in text.chars() {
            let (face, id) = self.stack.face_for(ch);
            let scaled = face.as_scaled(self.scale(face));
            // Kerning only applies between glyphs of the same face
            if let Some((_, prev_id)) = prev.filter(|(f, _)| std::ptr::eq(*f, face)) {
                caret += scaled.kern(prev_id, id);
            }
            placed.push(Placed { face, id, x: caret });
            caret += scaled.h_advance(id);
            prev = Some((face, id));
        }
        (placed, caret)
    }

    /// Rendered width of `text` on a single line
    pub fn measure(&self, text: &str) -> u32 {
        self.layout(text).1.ceil() as u32
    }

    /// Draw a single line of text with its top-left corner at (`x`, `y`)
    pub fn draw(&self, img: &mut RgbaImage, x: i64, y: i64, text: &str, color: Rgba<u8>) {
        let (width, height) = (i64::from(img.width()), i64::from(img.height()));
        let baseline = y as f32 + self.ascent();

        for glyph in self.layout(text).0 {
            let pen = point(x as f32 + glyph.x, baseline);
            let positioned = glyph.id.with_scale_and_position(self.scale(glyph.face), pen);
            let Some(outlined) = glyph.face.outline_glyph(positioned) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let tx = bounds.min.x as i64 + i64::from(gx);
                let ty = bounds.min.y as i64 + i64::from(gy);
                if tx < 0 || ty < 0 || tx >= width || ty >= height {
                    return;
                }
                let alpha = (coverage * f32::from(color[3])).round().clamp(0.0, 255.0) as u8;
                let dst = img.get_pixel_mut(tx as u32, ty as u32);
                *dst = blend_pixel(*dst, Rgba([color[0], color[1], color[2], alpha]));
            });
        }
    }
}

fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let a = f32::from(src[3]) / 255.0;
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let mix = |d: u8, s: u8| {
        (f32::from(d) * inv + f32::from(s) * a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    let out_a = (f32::from(dst[3]) + f32::from(src[3]) * inv)
        .round()
        .clamp(0.0, 255.0) as u8;
    Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), out_a])
}

/// Greedy word wrap
///
/// Words are added to the current line until the next one would push its
/// width past `max_width`; that word then starts a new line. A word wider
/// than `max_width` gets a line of its own and is never split.
pub fn wrap_text(font: SizedFont<'_>, text: &str, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if font.measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
