//! Composite report rendering
//!
//! Lays out the original image with its selection, the segmented cutout and
//! the wrapped caption and translation on one canvas, then writes it as PNG.

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::{Rgba, RgbaImage, imageops};
use tiny_skia::{LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::{
    self, LINE_HEIGHT, PADDING, SECTION_SPACING, TEXT_SIZE, TITLE_SIZE, palette,
};
use super::text::{FontStack, wrap_text};
use crate::capture::image::ImageAsset;
use crate::domain::{Native, Rect, TranslationResult};
use crate::error::Error;

pub const REPORT_FILE_NAME: &str = "image-analysis-report.png";

/// Everything that goes into one report
#[derive(Clone, Debug)]
pub struct ReportJob {
    pub original: ImageAsset,
    pub segmented: ImageAsset,
    pub region: Rect<Native>,
    pub caption: String,
    pub translation: Option<TranslationResult>,
    pub accent: Rgba<u8>,
    /// Fonts for characters the bundled face lacks
    pub fonts: Vec<PathBuf>,
    pub dir: PathBuf,
}

/// Canvas size and wrapped text of a report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLayout {
    pub width: u32,
    pub height: u32,
    pub caption_lines: Vec<String>,
    pub translation_lines: Vec<String>,
}

fn caption_text(caption: &str) -> String {
    format!("Caption: {caption}")
}

fn translation_text(translation: &TranslationResult) -> String {
    format!(
        "Translation ({}): {}",
        translation.language.code(),
        translation.text
    )
}

/// Compute the report layout; the same wrapping is used for drawing
pub fn layout_report(
    fonts: &FontStack,
    original: (u32, u32),
    segmented_height: u32,
    caption: &str,
    translation: Option<&TranslationResult>,
) -> ReportLayout {
    let font = fonts.sized(TEXT_SIZE);
    let max_width = geometry::text_width(original.0);

    let caption_lines = wrap_text(font, &caption_text(caption), max_width);
    let translation_lines = translation
        .map(|t| wrap_text(font, &translation_text(t), max_width))
        .unwrap_or_default();

    let height = geometry::report_height(
        original.1,
        segmented_height,
        geometry::text_block_height(caption_lines.len()),
        geometry::text_block_height(translation_lines.len()),
    );
    let width = original.0 + PADDING * 2;
    log::debug!(
        "Report layout {width}x{height}: {} caption lines, {} translation lines",
        caption_lines.len(),
        translation_lines.len()
    );

    ReportLayout {
        width,
        height,
        caption_lines,
        translation_lines,
    }
}

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let Some(size) = tiny_skia::IntSize::from_wh(img.width(), img.height()) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

fn stroke_rect(img: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
    let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) else {
        return;
    };
    with_pixmap(img, |pixmap| {
        let path = PathBuilder::from_rect(rect);
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: geometry::STROKE_WIDTH,
            line_join: LineJoin::Miter,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    });
}

fn draw_lines(img: &mut RgbaImage, fonts: &FontStack, lines: &[String], top: u32) {
    let font = fonts.sized(TEXT_SIZE);
    // Center glyphs vertically in the line box
    let inset = LINE_HEIGHT.saturating_sub(font.line_height()) / 2;
    for (i, line) in lines.iter().enumerate() {
        let y = top + i as u32 * LINE_HEIGHT + inset;
        font.draw(img, i64::from(PADDING), i64::from(y), line, palette::TEXT);
    }
}

/// Draw the report for decoded images
pub fn compose_report(
    fonts: &FontStack,
    original: &RgbaImage,
    segmented: &RgbaImage,
    region: Rect<Native>,
    caption: &str,
    translation: Option<&TranslationResult>,
    accent: Rgba<u8>,
) -> RgbaImage {
    let layout = layout_report(
        fonts,
        original.dimensions(),
        segmented.height(),
        caption,
        translation,
    );
    let mut canvas = RgbaImage::from_pixel(layout.width, layout.height, palette::BACKGROUND);
    let title_font = fonts.sized(TITLE_SIZE);
    let pad = i64::from(PADDING);

    let mut y = PADDING;
    title_font.draw(&mut canvas, pad, i64::from(y), geometry::ORIGINAL_TITLE, accent);
    y += TITLE_SIZE + SECTION_SPACING / 2;

    imageops::overlay(&mut canvas, original, pad, i64::from(y));
    stroke_rect(
        &mut canvas,
        (PADDING + region.x1()) as f32,
        (y + region.y1()) as f32,
        region.width() as f32,
        region.height() as f32,
        accent,
    );
    y += original.height() + PADDING;

    title_font.draw(&mut canvas, pad, i64::from(y), geometry::SEGMENTED_TITLE, accent);
    y += TITLE_SIZE + SECTION_SPACING / 2;
    imageops::overlay(&mut canvas, segmented, pad, i64::from(y));
    y += segmented.height() + PADDING;

    draw_lines(&mut canvas, fonts, &layout.caption_lines, y);
    y += geometry::text_block_height(layout.caption_lines.len()) + SECTION_SPACING;
    draw_lines(&mut canvas, fonts, &layout.translation_lines, y);

    canvas
}

fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Write the report into `dir`; the file appears only once fully encoded
pub fn save_report(img: &RgbaImage, dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;

    let mut writer = BufWriter::new(tmp.as_file());
    write_png(&mut writer, img).context("failed to encode report")?;
    io::Write::flush(&mut writer)?;
    drop(writer);

    let path = dir.join(REPORT_FILE_NAME);
    tmp.persist(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write the segmented cutout as `segmented-object.<ext>` into `dir`
pub fn save_segmented(asset: &ImageAsset, dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("segmented-object.{}", asset.extension()));
    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::fs::write(tmp.path(), asset.bytes())?;
    tmp.persist(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Decode both images, compose and save the report
///
/// Both decodes run before either result is checked. Any failure aborts the
/// whole report and leaves nothing behind in the target directory.
pub async fn run_report(job: ReportJob) -> Result<PathBuf, Error> {
    let (original, segmented) = futures::join!(async { job.original.decode() }, async {
        job.segmented.decode()
    });
    let fail = |err: Error| {
        log::error!("Report composition failed: {err}");
        Error::ReportCompositionFailed(err.to_string())
    };
    let original = original.map_err(fail)?;
    let segmented = segmented.map_err(fail)?;
    let fonts = FontStack::load(&job.fonts).map_err(|err| {
        log::error!("Report composition failed: {err}");
        Error::ReportCompositionFailed(err.to_string())
    })?;

    let report = compose_report(
        &fonts,
        &original,
        &segmented,
        job.region,
        &job.caption,
        job.translation.as_ref(),
        job.accent,
    );
    let path = save_report(&report, &job.dir)
        .map_err(|err| Error::ReportCompositionFailed(format!("{err:#}")))?;
    log::info!("Report written to {}", path.display());
    Ok(path)
}
