//! Error taxonomy for selection, analysis, translation and reporting

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Drag smaller than the minimum size; never shown to the user
    #[error("selection is smaller than the minimum size")]
    SelectionTooSmall,
    /// The image has no on-screen size yet, so screen points cannot be mapped
    #[error("image is not laid out yet")]
    LayoutNotReady,
    #[error("caption generation failed")]
    CaptionGenerationFailed,
    #[error("segmentation returned no image")]
    SegmentationNoImageReturned,
    #[error("translation failed: {0}")]
    TranslationFailed(String),
    #[error("report composition failed: {0}")]
    ReportCompositionFailed(String),
    #[error("image decode failed: {0}")]
    ImageDecodeFailed(String),
    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),
    #[error("media device unavailable: {0}")]
    MediaDeviceUnavailable(String),
    /// Transport or protocol failure talking to the remote model
    #[error("model request failed: {0}")]
    Capability(String),
}

impl Error {
    /// Message shown in the analysis error panel
    pub fn user_message(&self) -> String {
        match self {
            Error::CaptionGenerationFailed => "Failed to generate caption.".to_string(),
            Error::SegmentationNoImageReturned => {
                "Failed to generate segmented image. The model may not have returned an image."
                    .to_string()
            }
            Error::Capability(msg) => msg.clone(),
            Error::ReportCompositionFailed(_) => {
                "Could not generate the report. Please try again.".to_string()
            }
            Error::MediaDeviceUnavailable(_) => {
                "Sorry, text-to-speech is not available on this system.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Capability(format!("{err:#}"))
    }
}
