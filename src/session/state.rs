//! Session state and message handling
//!
//! A session owns the loaded image, the selection tool and the analysis
//! orchestrator. `update` applies one message and returns the asynchronous
//! work it requires; completions come back as further messages.

use std::path::PathBuf;

use image::Rgba;

use super::messages::{AnalysisMsg, ImageMsg, Msg, ReportMsg, SpeechMsg, Task};
use crate::analysis::orchestrator::Orchestrator;
use crate::capture::image::LoadedImage;
use crate::config::RegionLensConfig;
use crate::domain::{
    DisplaySize, ImageLayout, Native, PointerEvent, ProcessState, Rect, Screen, SelectionEvent,
    SelectionTool, TranslationResult,
};
use crate::render::report::ReportJob;
use crate::speech::CAPTION_LANG;

#[derive(Debug)]
pub struct Session {
    image: Option<LoadedImage>,
    layout: DisplaySize,
    tool: SelectionTool,
    /// Last finalized region in native pixels
    selection: Option<Rect<Native>>,
    orchestrator: Orchestrator,
    report_busy: bool,
    last_report: Option<PathBuf>,
    /// Latest message for the user outside the analysis panel
    notice: Option<String>,
    accent: Rgba<u8>,
    report_dir: PathBuf,
    report_fonts: Vec<PathBuf>,
}

impl Session {
    pub fn new(config: &RegionLensConfig) -> Self {
        Self {
            image: None,
            layout: DisplaySize::default(),
            tool: SelectionTool::new(config.min_selection_px),
            selection: None,
            orchestrator: Orchestrator::default(),
            report_busy: false,
            last_report: None,
            notice: None,
            accent: Rgba(config.accent_color.to_rgba_u8()),
            report_dir: config.report_dir(),
            report_fonts: config.report_fonts.clone(),
        }
    }

    pub fn selection(&self) -> Option<Rect<Native>> {
        self.selection
    }

    /// Solid overlay of the finished selection, in screen space
    pub fn overlay(&self) -> Option<Rect<Screen>> {
        self.tool.finished()
    }

    /// Dashed rectangle of the drag in progress
    #[cfg(test)]
    pub fn preview(&self) -> Option<Rect<Screen>> {
        self.tool.preview()
    }

    pub fn state(&self) -> &ProcessState {
        self.orchestrator.state()
    }

    pub fn translation(&self) -> Option<&TranslationResult> {
        self.orchestrator.translation()
    }

    #[cfg(test)]
    pub fn is_translating(&self) -> bool {
        self.orchestrator.is_translating()
    }

    pub fn last_report(&self) -> Option<&PathBuf> {
        self.last_report.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Task> {
        match msg {
            Msg::Image(msg) => {
                self.handle_image(msg);
                Vec::new()
            }
            Msg::Pointer(event) => self.handle_pointer(event),
            Msg::Analysis(msg) => self.handle_analysis(msg),
            Msg::Report(msg) => self.handle_report(msg),
            Msg::Speech(msg) => self.handle_speech(msg),
        }
    }

    fn clear(&mut self) {
        self.tool.reset();
        self.selection = None;
        self.orchestrator.reset();
        self.last_report = None;
        self.notice = None;
    }

    fn handle_image(&mut self, msg: ImageMsg) {
        match msg {
            ImageMsg::Loaded(image) => {
                log::info!("New {} image loaded", image.dimensions);
                self.clear();
                self.layout = DisplaySize::default();
                self.image = Some(image);
            }
            ImageMsg::Layout(size) => {
                if self.image.is_none() {
                    return;
                }
                log::debug!("Image laid out at {}x{}", size.width, size.height);
                self.layout = size;
            }
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) -> Vec<Task> {
        let Some(image) = &self.image else {
            return Vec::new();
        };
        let layout = ImageLayout {
            displayed: self.layout,
            native: image.dimensions,
        };

        match self.tool.handle(event, layout) {
            SelectionEvent::Started => {
                self.selection = None;
                self.orchestrator.supersede();
                Vec::new()
            }
            SelectionEvent::Finalized { region, .. } => {
                self.selection = Some(region);
                let job = self.orchestrator.select(image, region);
                vec![Task::Analyze(job)]
            }
            SelectionEvent::Preview(_) | SelectionEvent::Discarded(_) | SelectionEvent::None => {
                Vec::new()
            }
        }
    }

    fn handle_analysis(&mut self, msg: AnalysisMsg) -> Vec<Task> {
        match msg {
            AnalysisMsg::Finished(outcome) => {
                self.orchestrator.finish(outcome);
                Vec::new()
            }
            AnalysisMsg::Translate(language) => self
                .orchestrator
                .translate(language)
                .map(Task::Translate)
                .into_iter()
                .collect(),
            AnalysisMsg::Translated(outcome) => {
                self.orchestrator.finish_translation(outcome);
                Vec::new()
            }
        }
    }

    fn handle_report(&mut self, msg: ReportMsg) -> Vec<Task> {
        match msg {
            ReportMsg::Requested(dir) => {
                if self.report_busy {
                    log::debug!("Report already being composed");
                    return Vec::new();
                }
                let (Some(image), ProcessState::Success { region, result, .. }) =
                    (&self.image, self.orchestrator.state())
                else {
                    log::warn!("No analysis result to build a report from");
                    return Vec::new();
                };

                self.report_busy = true;
                vec![Task::ComposeReport(ReportJob {
                    original: image.asset.clone(),
                    segmented: result.segmented.clone(),
                    region: *region,
                    caption: result.caption.clone(),
                    translation: self.orchestrator.translation().cloned(),
                    accent: self.accent,
                    fonts: self.report_fonts.clone(),
                    dir: dir.unwrap_or_else(|| self.report_dir.clone()),
                })]
            }
            ReportMsg::Finished(result) => {
                self.report_busy = false;
                match result {
                    Ok(path) => {
                        self.notice = Some(format!("Report saved to {}", path.display()));
                        self.last_report = Some(path);
                    }
                    Err(err) => {
                        log::error!("Report failed: {err}");
                        self.notice = Some(err.user_message());
                    }
                }
                Vec::new()
            }
        }
    }

    fn handle_speech(&mut self, msg: SpeechMsg) -> Vec<Task> {
        let (text, lang) = match msg {
            SpeechMsg::Caption => match self.orchestrator.state().result() {
                Some(result) => (result.caption.clone(), CAPTION_LANG.to_string()),
                None => return Vec::new(),
            },
            SpeechMsg::Translation => match self.orchestrator.translation() {
                Some(t) => (t.text.clone(), t.language.code().to_string()),
                None => return Vec::new(),
            },
            SpeechMsg::Finished(Ok(())) => return Vec::new(),
            SpeechMsg::Finished(Err(err)) => {
                log::warn!("Speech failed: {err}");
                self.notice = Some(err.user_message());
                return Vec::new();
            }
        };
        vec![Task::Speak { text, lang }]
    }
}
