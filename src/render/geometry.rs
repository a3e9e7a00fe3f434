//! Report layout constants and block arithmetic
//!
//! All sizes are in report pixels; the report is drawn at the native
//! resolution of the original image.

/// Outer margin and gap between the image sections
pub const PADDING: u32 = 40;
/// Height of a section title row
pub const TITLE_SIZE: u32 = 24;
/// Nominal size of body text
pub const TEXT_SIZE: u32 = 16;
/// Vertical advance between wrapped text lines
pub const LINE_HEIGHT: u32 = 22;
/// Gap between a title and its content, and between text blocks
pub const SECTION_SPACING: u32 = 20;
/// Width of the selection outline
pub const STROKE_WIDTH: f32 = 4.0;

/// Report color palette
pub mod palette {
    use image::Rgba;

    /// #111827
    pub const BACKGROUND: Rgba<u8> = Rgba([17, 24, 39, 255]);
    /// #E5E7EB
    pub const TEXT: Rgba<u8> = Rgba([229, 231, 235, 255]);
}

pub const ORIGINAL_TITLE: &str = "Original Image & Selection";
pub const SEGMENTED_TITLE: &str = "Segmented Object";

/// Height of a block of `lines` wrapped text lines
#[inline]
pub fn text_block_height(lines: usize) -> u32 {
    lines as u32 * LINE_HEIGHT
}

/// Width available to body text on a report for an image `image_width` wide
#[inline]
pub fn text_width(image_width: u32) -> u32 {
    image_width.saturating_sub(PADDING * 2)
}

/// Full report height for the given section heights
pub fn report_height(
    original_height: u32,
    segmented_height: u32,
    caption_height: u32,
    translation_height: u32,
) -> u32 {
    PADDING * 5
        + original_height
        + segmented_height
        + caption_height
        + translation_height
        + SECTION_SPACING * 3
        + TITLE_SIZE * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_lines_take_forty_four_pixels() {
        assert_eq!(text_block_height(2), 44);
        assert_eq!(text_block_height(0), 0);
    }

    #[test]
    fn height_sums_all_sections() {
        // 200 + 300 + 150 + 44 + 0 + 60 + 48
        assert_eq!(report_height(300, 150, 44, 0), 802);
    }

    #[test]
    fn narrow_images_leave_no_text_width() {
        assert_eq!(text_width(400), 320);
        assert_eq!(text_width(60), 0);
    }
}
