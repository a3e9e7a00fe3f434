//! Message and task types for an analysis session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for organized message handling
//! - Task enum describing the asynchronous work a message asks for

use std::path::PathBuf;

use crate::analysis::orchestrator::{
    AnalysisJob, AnalysisOutcome, TranslationJob, TranslationOutcome,
};
use crate::capture::image::LoadedImage;
use crate::domain::{DisplaySize, Language, PointerEvent};
use crate::error::Error;
use crate::render::report::ReportJob;

// ============================================================================
// Image Source Types
// ============================================================================

#[derive(Debug, Clone)]
pub enum ImageMsg {
    /// A new image replaces the current one and clears all results
    Loaded(LoadedImage),
    /// The image was laid out at this on-screen size
    Layout(DisplaySize),
}

// ============================================================================
// Analysis Types
// ============================================================================

#[derive(Debug, Clone)]
pub enum AnalysisMsg {
    /// Caption and segmentation for a region settled
    Finished(AnalysisOutcome),
    /// Translate the current caption
    Translate(Language),
    /// A translation request settled
    Translated(TranslationOutcome),
}

// ============================================================================
// Output Types
// ============================================================================

#[derive(Debug, Clone)]
pub enum ReportMsg {
    /// Compose and save the report, optionally into a specific directory
    Requested(Option<PathBuf>),
    Finished(Result<PathBuf, Error>),
}

#[derive(Debug, Clone)]
pub enum SpeechMsg {
    Caption,
    Translation,
    Finished(Result<(), Error>),
}

// ============================================================================
// Main Message Enum
// ============================================================================

#[derive(Debug, Clone)]
pub enum Msg {
    Image(ImageMsg),
    Pointer(PointerEvent),
    Analysis(AnalysisMsg),
    Report(ReportMsg),
    Speech(SpeechMsg),
}

impl From<ImageMsg> for Msg {
    fn from(msg: ImageMsg) -> Self {
        Msg::Image(msg)
    }
}

impl From<PointerEvent> for Msg {
    fn from(event: PointerEvent) -> Self {
        Msg::Pointer(event)
    }
}

impl From<AnalysisMsg> for Msg {
    fn from(msg: AnalysisMsg) -> Self {
        Msg::Analysis(msg)
    }
}

impl From<ReportMsg> for Msg {
    fn from(msg: ReportMsg) -> Self {
        Msg::Report(msg)
    }
}

impl From<SpeechMsg> for Msg {
    fn from(msg: SpeechMsg) -> Self {
        Msg::Speech(msg)
    }
}

/// Asynchronous work requested by [`Session::update`](super::state::Session::update)
#[derive(Debug, Clone)]
pub enum Task {
    Analyze(AnalysisJob),
    Translate(TranslationJob),
    ComposeReport(ReportJob),
    Speak { text: String, lang: String },
}
