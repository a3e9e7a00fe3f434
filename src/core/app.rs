//! Application event loop
//!
//! Messages are applied to the [`Session`] in order; the tasks they produce
//! run concurrently on the current thread and feed their completions back as
//! new messages until nothing is left in flight.

use std::collections::VecDeque;

use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};

use crate::analysis::VisionCapability;
use crate::analysis::orchestrator::{run_analysis, run_translation};
use crate::render::report::run_report;
use crate::session::messages::{AnalysisMsg, Msg, ReportMsg, SpeechMsg, Task};
use crate::session::state::Session;
use crate::speech;

pub struct App<C> {
    session: Session,
    capability: C,
    speech_command: String,
}

fn task_future<'a, C: VisionCapability>(
    capability: &'a C,
    speech_command: &'a str,
    task: Task,
) -> LocalBoxFuture<'a, Msg> {
    match task {
        Task::Analyze(job) => run_analysis(capability, job)
            .map(|outcome| Msg::from(AnalysisMsg::Finished(outcome)))
            .boxed_local(),
        Task::Translate(job) => run_translation(capability, job)
            .map(|outcome| Msg::from(AnalysisMsg::Translated(outcome)))
            .boxed_local(),
        Task::ComposeReport(job) => run_report(job)
            .map(|result| Msg::from(ReportMsg::Finished(result)))
            .boxed_local(),
        Task::Speak { text, lang } => async move {
            let result = speech::speak(speech_command, &text, &lang).await;
            Msg::from(SpeechMsg::Finished(result))
        }
        .boxed_local(),
    }
}

impl<C: VisionCapability> App<C> {
    pub fn new(session: Session, capability: C, speech_command: String) -> Self {
        Self {
            session,
            capability,
            speech_command,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply `msgs` in order, then run until every task has completed
    ///
    /// All messages are applied before any task is polled, so a later
    /// selection in the batch supersedes an earlier one that is still
    /// in flight.
    pub async fn dispatch_all(&mut self, msgs: impl IntoIterator<Item = Msg>) {
        let Self {
            session,
            capability,
            speech_command,
        } = self;

        let mut queue: VecDeque<Msg> = msgs.into_iter().collect();
        let mut pending: FuturesUnordered<LocalBoxFuture<'_, Msg>> = FuturesUnordered::new();

        loop {
            while let Some(msg) = queue.pop_front() {
                for task in session.update(msg) {
                    pending.push(task_future(&*capability, speech_command.as_str(), task));
                }
            }
            match pending.next().await {
                Some(msg) => queue.push_back(msg),
                None => break,
            }
        }
    }

    pub async fn dispatch(&mut self, msg: Msg) {
        self.dispatch_all([msg]).await;
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use image::ImageFormat;

    use super::*;
    use crate::analysis::RegionRequest;
    use crate::capture::image::{ImageAsset, LoadedImage, tests::encoded};
    use crate::config::RegionLensConfig;
    use crate::domain::{DisplaySize, Language, PointerEvent, ProcessState, ScreenPoint};
    use crate::error::Error;
    use crate::session::messages::ImageMsg;

    /// Answers immediately with a caption naming the region's left edge
    struct EchoCapability;

    impl VisionCapability for EchoCapability {
        fn caption(
            &self,
            _image: &ImageAsset,
            request: RegionRequest,
        ) -> impl Future<Output = Result<Option<String>, Error>> {
            let caption = format!("object at x={}", request.region.x1());
            async move { Ok(Some(caption)) }
        }

        fn segment(
            &self,
            _image: &ImageAsset,
            request: RegionRequest,
        ) -> impl Future<Output = Result<Option<ImageAsset>, Error>> {
            let size = request.region.width().max(1);
            async move {
                Ok(Some(ImageAsset::new(
                    encoded(size, size, ImageFormat::Png),
                    "image/png",
                )))
            }
        }

        fn translate(
            &self,
            text: &str,
            language: Language,
        ) -> impl Future<Output = Result<String, Error>> {
            let translated = format!("{}: {text}", language.code());
            async move { Ok(translated) }
        }
    }

    fn app() -> App<EchoCapability> {
        let config = RegionLensConfig::default();
        let mut session = Session::new(&config);
        let image = LoadedImage::from_bytes(encoded(200, 100, ImageFormat::Png)).unwrap();
        session.update(ImageMsg::Loaded(image).into());
        session.update(ImageMsg::Layout(DisplaySize::new(200.0, 100.0)).into());
        App::new(session, EchoCapability, "regionlens-no-such-tts".to_string())
    }

    fn drag(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Msg> {
        vec![
            PointerEvent::Down(ScreenPoint::new(x0, y0)).into(),
            PointerEvent::Move(ScreenPoint::new(x1, y1)).into(),
            PointerEvent::Up(ScreenPoint::new(x1, y1)).into(),
        ]
    }

    #[tokio::test]
    async fn drag_runs_analysis_to_success() {
        let mut app = app();
        app.dispatch_all(drag(10.0, 10.0, 60.0, 60.0)).await;

        let result = app.session().state().result().unwrap();
        assert_eq!(result.caption, "object at x=10");
    }

    #[tokio::test]
    async fn only_the_last_of_two_selections_lands() {
        let mut app = app();
        let mut msgs = drag(10.0, 10.0, 60.0, 60.0);
        msgs.extend(drag(100.0, 10.0, 150.0, 60.0));
        app.dispatch_all(msgs).await;

        let state = app.session().state();
        assert_eq!(state.result().unwrap().caption, "object at x=100");
        assert_eq!(state.region(), app.session().selection());
    }

    #[tokio::test]
    async fn translation_then_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.dispatch_all(drag(10.0, 10.0, 60.0, 60.0)).await;
        app.dispatch(AnalysisMsg::Translate(Language::Spanish).into()).await;
        assert_eq!(
            app.session().translation().unwrap().text,
            "es: object at x=10"
        );

        app.dispatch(ReportMsg::Requested(Some(dir.path().to_path_buf())).into())
            .await;
        let path = app.session().last_report().unwrap();
        assert!(path.ends_with("image-analysis-report.png"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn missing_speech_command_is_reported() {
        let mut app = app();
        app.dispatch_all(drag(10.0, 10.0, 60.0, 60.0)).await;
        app.dispatch(SpeechMsg::Caption.into()).await;

        assert!(matches!(app.session().state(), ProcessState::Success { .. }));
        assert_eq!(
            app.session().notice(),
            Some("Sorry, text-to-speech is not available on this system.")
        );
    }
}
