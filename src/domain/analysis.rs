//! Analysis results and the process state shown to the user

use std::fmt;
use std::str::FromStr;

use super::geometry::{Native, Rect};
use crate::capture::image::ImageAsset;

/// Caption and segmented cutout for one region; always produced together
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    pub caption: String,
    pub segmented: ImageAsset,
}

/// Translation of the current caption
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationResult {
    pub language: Language,
    pub text: String,
}

/// Monotonic id of an analysis request; only the latest one may land
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl RequestToken {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Analysis process state; each variant carries only what is valid for it
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProcessState {
    #[default]
    Idle,
    Loading {
        token: RequestToken,
        region: Rect<Native>,
    },
    Success {
        token: RequestToken,
        region: Rect<Native>,
        result: AnalysisResult,
    },
    Error {
        region: Rect<Native>,
        message: String,
    },
}

impl ProcessState {
    pub fn label(&self) -> &'static str {
        match self {
            ProcessState::Idle => "idle",
            ProcessState::Loading { .. } => "loading",
            ProcessState::Success { .. } => "success",
            ProcessState::Error { .. } => "error",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ProcessState::Loading { .. })
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            ProcessState::Success { result, .. } => Some(result),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn region(&self) -> Option<Rect<Native>> {
        match self {
            ProcessState::Idle => None,
            ProcessState::Loading { region, .. }
            | ProcessState::Success { region, .. }
            | ProcessState::Error { region, .. } => Some(*region),
        }
    }
}

/// Languages offered for caption translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Spanish,
    French,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Spanish, Language::French, Language::Hindi];

    /// English name, used in the translation prompt
    pub fn name(self) -> &'static str {
        match self {
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::Hindi => "Hindi",
        }
    }

    /// Language tag, used for speech and the report
    pub fn code(self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::French => "fr",
            Language::Hindi => "hi",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .into_iter()
            .find(|lang| {
                lang.code().eq_ignore_ascii_case(wanted) || lang.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Language::ALL.iter().map(|l| l.code()).collect();
                format!("unknown language '{wanted}' (expected one of {})", known.join(", "))
            })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
