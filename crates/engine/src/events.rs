//! Typed progress events emitted by the engine during a render.

use serde::{Deserialize, Serialize};

/// One progress tick from the engine.
///
/// Either counter may be absent: some engines only report totals once
/// frame counting settles, and some report nothing at all.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderProgress {
    #[serde(default)]
    pub rendered_frames: Option<u64>,
    #[serde(default)]
    pub total_frames: Option<u64>,
}

impl RenderProgress {
    /// Completion percentage, clamped to 0–100.
    ///
    /// Unknown or zero totals yield 0 rather than dividing by zero or
    /// guessing.
    pub fn percent(&self) -> u8 {
        let total = match self.total_frames {
            Some(t) if t > 0 => t,
            _ => return 0,
        };
        let rendered = self.rendered_frames.unwrap_or(0);
        let pct = (rendered as f64 / total as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}
