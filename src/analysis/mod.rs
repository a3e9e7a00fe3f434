//! Region analysis against a remote vision model
//!
//! This module contains:
//! - The capability trait the model client implements (mod.rs)
//! - Prompt construction (prompts.rs)
//! - The Gemini REST client (gemini.rs)
//! - The orchestrator driving the process state (orchestrator.rs)

pub mod gemini;
pub mod orchestrator;
pub mod prompts;

use std::future::Future;

use crate::capture::image::ImageAsset;
use crate::domain::{AnalysisResult, ImageDimensions, Language, Native, Rect};
use crate::error::Error;

/// Region of interest together with the full image size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionRequest {
    pub region: Rect<Native>,
    pub dimensions: ImageDimensions,
}

/// Remote captioning, segmentation and translation
///
/// Each call is independent; `caption` and `segment` may run concurrently
/// for the same region.
pub trait VisionCapability {
    /// Caption of the region, or `None` when the model returned no text
    fn caption(
        &self,
        image: &ImageAsset,
        request: RegionRequest,
    ) -> impl Future<Output = Result<Option<String>, Error>>;

    /// Transparent cutout of the region, or `None` when no image came back
    fn segment(
        &self,
        image: &ImageAsset,
        request: RegionRequest,
    ) -> impl Future<Output = Result<Option<ImageAsset>, Error>>;

    fn translate(
        &self,
        text: &str,
        language: Language,
    ) -> impl Future<Output = Result<String, Error>>;
}

/// Caption and segment one region, succeeding only if both succeed
///
/// Both requests are issued at once and awaited together; neither result is
/// looked at until the other has settled.
pub async fn analyze<C: VisionCapability>(
    capability: &C,
    image: &ImageAsset,
    request: RegionRequest,
) -> Result<AnalysisResult, Error> {
    let (caption, segmented) = futures::join!(
        capability.caption(image, request),
        capability.segment(image, request)
    );

    let caption = caption?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(Error::CaptionGenerationFailed)?;
    let segmented = segmented?.ok_or(Error::SegmentationNoImageReturned)?;

    Ok(AnalysisResult { caption, segmented })
}
