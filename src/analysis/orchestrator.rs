//! Analysis orchestration
//!
//! Owns the process state. Every selection gets a fresh [`RequestToken`];
//! a completion is applied only if its token is still the latest, so a slow
//! request for an old region can never replace the state of a newer one.
//! The request itself is not aborted, its result is simply dropped.

use super::{RegionRequest, VisionCapability, analyze};
use crate::capture::image::{ImageAsset, LoadedImage};
use crate::domain::{
    AnalysisResult, Language, Native, ProcessState, Rect, RequestToken, TranslationResult,
};
use crate::error::Error;

/// Work order for one analysis request
#[derive(Clone, Debug)]
pub struct AnalysisJob {
    pub token: RequestToken,
    pub image: ImageAsset,
    pub request: RegionRequest,
}

#[derive(Clone, Debug)]
pub struct AnalysisOutcome {
    pub token: RequestToken,
    pub result: Result<AnalysisResult, Error>,
}

/// Work order for one translation of the current caption
#[derive(Clone, Debug)]
pub struct TranslationJob {
    /// Analysis whose caption is being translated
    pub analysis: RequestToken,
    pub seq: u64,
    pub caption: String,
    pub language: Language,
}

#[derive(Clone, Debug)]
pub struct TranslationOutcome {
    pub analysis: RequestToken,
    pub seq: u64,
    pub language: Language,
    pub result: Result<String, Error>,
}

pub async fn run_analysis<C: VisionCapability>(
    capability: &C,
    job: AnalysisJob,
) -> AnalysisOutcome {
    log::info!("Analysis {} started for region {}", job.token, job.request.region);
    let result = analyze(capability, &job.image, job.request).await;
    AnalysisOutcome {
        token: job.token,
        result,
    }
}

pub async fn run_translation<C: VisionCapability>(
    capability: &C,
    job: TranslationJob,
) -> TranslationOutcome {
    let result = capability.translate(&job.caption, job.language).await;
    TranslationOutcome {
        analysis: job.analysis,
        seq: job.seq,
        language: job.language,
        result,
    }
}

#[derive(Debug, Default)]
pub struct Orchestrator {
    state: ProcessState,
    latest: RequestToken,
    translation: Option<TranslationResult>,
    /// Sequence number of the translation in flight, if any
    translating: Option<u64>,
    translation_seq: u64,
}

impl Orchestrator {
    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn translation(&self) -> Option<&TranslationResult> {
        self.translation.as_ref()
    }

    pub fn is_translating(&self) -> bool {
        self.translating.is_some()
    }

    /// Start analysing a new region; any earlier request becomes stale
    pub fn select(&mut self, image: &LoadedImage, region: Rect<Native>) -> AnalysisJob {
        self.latest = self.latest.next();
        self.state = ProcessState::Loading {
            token: self.latest,
            region,
        };
        self.clear_translation();

        AnalysisJob {
            token: self.latest,
            image: image.asset.clone(),
            request: RegionRequest {
                region,
                dimensions: image.dimensions,
            },
        }
    }

    /// Invalidate the request in flight, if any, without starting a new one
    pub fn supersede(&mut self) {
        self.latest = self.latest.next();
        if self.state.is_loading() {
            log::debug!("Pending analysis superseded");
            self.state = ProcessState::Idle;
        }
    }

    /// Back to the initial state; outstanding results will be ignored
    pub fn reset(&mut self) {
        self.latest = self.latest.next();
        self.state = ProcessState::Idle;
        self.clear_translation();
    }

    /// Apply a finished analysis; returns false if it was stale
    pub fn finish(&mut self, outcome: AnalysisOutcome) -> bool {
        let region = match &self.state {
            ProcessState::Loading { token, region }
                if *token == outcome.token && outcome.token == self.latest =>
            {
                *region
            }
            _ => {
                log::warn!("Discarding stale analysis result {}", outcome.token);
                return false;
            }
        };

        self.state = match outcome.result {
            Ok(result) => {
                log::info!("Analysis {} succeeded: {}", outcome.token, result.caption);
                self.clear_translation();
                ProcessState::Success {
                    token: outcome.token,
                    region,
                    result,
                }
            }
            Err(err) => {
                log::error!("Analysis {} failed: {err}", outcome.token);
                ProcessState::Error {
                    region,
                    message: err.user_message(),
                }
            }
        };
        true
    }

    /// Start translating the current caption
    ///
    /// Returns `None` when there is no caption or a translation is already
    /// running. The previous translation stays visible until a new one lands.
    pub fn translate(&mut self, language: Language) -> Option<TranslationJob> {
        if self.is_translating() {
            log::debug!("Translation already in progress");
            return None;
        }
        let ProcessState::Success { token, result, .. } = &self.state else {
            return None;
        };

        self.translation_seq += 1;
        self.translating = Some(self.translation_seq);
        Some(TranslationJob {
            analysis: *token,
            seq: self.translation_seq,
            caption: result.caption.clone(),
            language,
        })
    }

    /// Apply a finished translation; failures are logged and otherwise ignored
    pub fn finish_translation(&mut self, outcome: TranslationOutcome) -> bool {
        if self.translating != Some(outcome.seq) {
            log::debug!("Ignoring translation {} (no longer pending)", outcome.seq);
            return false;
        }
        self.translating = None;

        let current = match &self.state {
            ProcessState::Success { token, .. } => Some(*token),
            _ => None,
        };
        if current != Some(outcome.analysis) {
            log::debug!("Ignoring translation for replaced caption");
            return false;
        }

        match outcome.result {
            Ok(text) => {
                log::info!("Caption translated to {}", outcome.language);
                self.translation = Some(TranslationResult {
                    language: outcome.language,
                    text,
                });
                true
            }
            Err(err) => {
                log::warn!("Translation failed: {err}");
                false
            }
        }
    }

    fn clear_translation(&mut self) {
        self.translation = None;
        self.translating = None;
    }
}
