//! Command line interface
//!
//! `analyze` replays a pointer gesture over an image laid out at a given
//! on-screen size, then prints the caption and optionally translates, speaks
//! and writes a report. `config` shows or resets the stored settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Deserialize;

use crate::analysis::gemini::GeminiClient;
use crate::capture::image::LoadedImage;
use crate::config::RegionLensConfig;
use crate::core::app::App;
use crate::domain::{
    ContainerBounds, DisplaySize, Language, PointerEvent, ProcessState, ScreenPoint,
};
use crate::render::report::save_segmented;
use crate::session::messages::{AnalysisMsg, ImageMsg, Msg, ReportMsg, SpeechMsg};
use crate::session::state::Session;

#[derive(Parser, Debug)]
#[command(
    name = "regionlens",
    version,
    about = "Select a region of an image, caption and segment it, and export a report"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select a region with a drag or an event script and analyze it
    Analyze(AnalyzeArgs),
    /// Show or reset the stored configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// PNG, JPEG or WEBP image
    pub image: PathBuf,
    /// On-screen size of the image, as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_size)]
    pub displayed: DisplaySize,
    /// Drag from X0,Y0 to X1,Y1 in on-screen pixels
    #[arg(
        long,
        value_parser = parse_drag,
        conflicts_with = "events",
        required_unless_present = "events"
    )]
    pub drag: Option<Drag>,
    /// JSON file with a list of {"kind","x","y"} pointer events
    #[arg(long)]
    pub events: Option<PathBuf>,
    /// Top-left corner of the image when gesture positions are viewport coordinates
    #[arg(long, value_name = "LEFT,TOP", value_parser = parse_origin)]
    pub origin: Option<ContainerBounds>,
    /// Translate the caption (es, fr or hi)
    #[arg(long)]
    pub translate: Option<Language>,
    /// Write the report, into DIR or the configured save location
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub report: Option<Option<PathBuf>>,
    /// Speak the caption and translation aloud
    #[arg(long, action = ArgAction::SetTrue)]
    pub speak: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the configuration (default unless --reset is given)
    #[arg(long, action = ArgAction::SetTrue)]
    pub show: bool,
    /// Overwrite the configuration with defaults
    #[arg(long, action = ArgAction::SetTrue)]
    pub reset: bool,
}

/// A straight drag between two on-screen points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub from: ScreenPoint,
    pub to: ScreenPoint,
}

impl Drag {
    pub fn events(self) -> Vec<PointerEvent> {
        vec![
            PointerEvent::Down(self.from),
            PointerEvent::Move(self.to),
            PointerEvent::Up(self.to),
        ]
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EventKind {
    Down,
    Move,
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct ScriptedEvent {
    kind: EventKind,
    x: f32,
    y: f32,
}

impl From<ScriptedEvent> for PointerEvent {
    fn from(event: ScriptedEvent) -> Self {
        let pos = ScreenPoint::new(event.x, event.y);
        match event.kind {
            EventKind::Down => PointerEvent::Down(pos),
            EventKind::Move => PointerEvent::Move(pos),
            EventKind::Up => PointerEvent::Up(pos),
            EventKind::Leave => PointerEvent::Leave(pos),
        }
    }
}

fn parse_size(s: &str) -> Result<DisplaySize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid size '{v}': {e}"))
    };
    Ok(DisplaySize::new(parse(w)?, parse(h)?))
}

fn parse_numbers(s: &str) -> Result<Vec<f32>, String> {
    s.split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinates '{s}': {e}"))
}

fn parse_origin(s: &str) -> Result<ContainerBounds, String> {
    let [left, top] = parse_numbers(s)?[..] else {
        return Err(format!("expected LEFT,TOP, got '{s}'"));
    };
    Ok(ContainerBounds { left, top })
}

fn parse_drag(s: &str) -> Result<Drag, String> {
    let [x0, y0, x1, y1] = parse_numbers(s)?[..] else {
        return Err(format!("expected X0,Y0,X1,Y1, got '{s}'"));
    };
    Ok(Drag {
        from: ScreenPoint::new(x0, y0),
        to: ScreenPoint::new(x1, y1),
    })
}

pub fn load_events(path: &Path) -> Result<Vec<PointerEvent>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let events: Vec<ScriptedEvent> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid event script {}", path.display()))?;
    Ok(events.into_iter().map(PointerEvent::from).collect())
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => analyze(args),
        Commands::Config(args) => config(args),
    }
}

fn config(args: ConfigArgs) -> Result<()> {
    let path = RegionLensConfig::path().ok_or_else(|| anyhow!("no config directory available"))?;
    if args.reset {
        RegionLensConfig::default().save();
        println!("Configuration reset: {}", path.display());
        if !args.show {
            return Ok(());
        }
    }
    let config = RegionLensConfig::load();
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    let config = RegionLensConfig::load();
    let image = LoadedImage::from_path(&args.image)?;
    let gestures = match (args.drag, &args.events) {
        (Some(drag), _) => drag.events(),
        (None, Some(path)) => load_events(path)?,
        (None, None) => bail!("either --drag or --events is required"),
    };
    let gestures: Vec<PointerEvent> = match args.origin {
        Some(origin) => gestures.into_iter().map(|e| e.relative_to(origin)).collect(),
        None => gestures,
    };

    let api_key = RegionLensConfig::api_key().ok_or_else(|| {
        anyhow!(
            "no API key; set {}",
            RegionLensConfig::API_KEY_VARS.join(" or ")
        )
    })?;
    let client = GeminiClient::new(&config, api_key)?;
    let mut app = App::new(
        Session::new(&config),
        client,
        config.speech_command.clone(),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(async {
        let mut msgs: Vec<Msg> = vec![
            ImageMsg::Loaded(image).into(),
            ImageMsg::Layout(args.displayed).into(),
        ];
        msgs.extend(gestures.into_iter().map(Msg::from));
        app.dispatch_all(msgs).await;

        let session = app.session();
        log::info!("Analysis finished: {}", session.state().label());
        if let Some(overlay) = session.overlay() {
            println!("Selection: {overlay}");
        }
        if let Some(region) = session.selection() {
            println!("Region: {region}");
        }
        match session.state() {
            ProcessState::Success { result, .. } => {
                println!("Caption: {}", result.caption);
            }
            ProcessState::Error { message, .. } => bail!("{message}"),
            ProcessState::Idle | ProcessState::Loading { .. } => {
                bail!("no region was selected")
            }
        }

        if let Some(language) = args.translate {
            app.dispatch(AnalysisMsg::Translate(language).into()).await;
            match app.session().translation() {
                Some(t) => println!("Translation ({}): {}", t.language.code(), t.text),
                None => eprintln!("Translation to {language} failed"),
            }
        }

        if args.speak {
            app.dispatch(SpeechMsg::Caption.into()).await;
            if app.session().translation().is_some() {
                app.dispatch(SpeechMsg::Translation.into()).await;
            }
            if let Some(notice) = app.session().notice() {
                eprintln!("{notice}");
            }
        }

        if let Some(dir) = args.report {
            let dir = dir.unwrap_or_else(|| config.report_dir());
            app.dispatch(ReportMsg::Requested(Some(dir.clone())).into())
                .await;
            let Some(path) = app.session().last_report() else {
                bail!(
                    "{}",
                    app.session()
                        .notice()
                        .unwrap_or("Could not generate the report.")
                );
            };
            println!("Report: {}", path.display());

            if let Some(result) = app.session().state().result() {
                let cutout = save_segmented(&result.segmented, &dir)?;
                println!("Segmented object: {}", cutout.display());
            }
        }
        Ok(())
    })
}
