//! Prompt text sent to the vision and translation models

use crate::domain::{ImageDimensions, Language, Native, Rect};

pub fn caption_prompt(region: Rect<Native>) -> String {
    format!(
        "Generate a detailed, descriptive caption for the primary object located inside the \
         bounding box with top-left corner at ({}, {}) and bottom-right corner at ({}, {}).",
        region.x1(),
        region.y1(),
        region.x2(),
        region.y2()
    )
}

pub fn segmentation_prompt(region: Rect<Native>, dimensions: ImageDimensions) -> String {
    format!(
        "I have an image with dimensions {}x{} pixels. Perform instance segmentation on the \
         object located inside the bounding box with top-left corner at ({}, {}) and \
         bottom-right corner at ({}, {}). Generate a new image of the same dimensions, showing \
         only the segmented object on a transparent background.",
        dimensions.width,
        dimensions.height,
        region.x1(),
        region.y1(),
        region.x2(),
        region.y2()
    )
}

pub fn translation_prompt(text: &str, language: Language) -> String {
    format!(
        "Translate the following English text to {}: \"{}\"",
        language.name(),
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_embed_integer_corners() {
        let region = Rect::from_corners(12, 7, 300, 250);
        let caption = caption_prompt(region);
        assert!(caption.contains("(12, 7)"));
        assert!(caption.contains("(300, 250)"));

        let segment = segmentation_prompt(region, ImageDimensions::new(640, 480));
        assert!(segment.starts_with("I have an image with dimensions 640x480 pixels."));
        assert!(segment.contains("transparent background"));
    }

    #[test]
    fn translation_prompt_names_the_language() {
        let prompt = translation_prompt("A red apple", Language::French);
        assert_eq!(
            prompt,
            "Translate the following English text to French: \"A red apple\""
        );
    }
}
