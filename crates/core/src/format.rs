//! Export formats and their container/codec mapping.

use serde::{Deserialize, Serialize};

/// Requested export container format.
///
/// Parsing is lenient: any unknown or missing value falls back to MP4,
/// so a stale or hand-edited client payload still produces a render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Mp4,
    Webm,
    Mov,
}

impl ExportFormat {
    /// Parse a format string, defaulting to MP4 for unknown values.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "webm" => Self::Webm,
            "mov" => Self::Mov,
            _ => Self::Mp4,
        }
    }

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
            Self::Mov => "mov",
        }
    }

    /// Codec the engine is asked to encode with for this container.
    pub fn codec(self) -> &'static str {
        match self {
            Self::Mp4 => "h264",
            Self::Webm => "vp8",
            Self::Mov => "prores",
        }
    }

    /// Canonical lowercase name, as persisted in render records.
    pub fn as_str(self) -> &'static str {
        self.extension()
    }
}
