//! Duration severity buckets.
//!
//! One classifier serves both single spans and aggregate (avg/max) values so
//! the thresholds cannot drift apart between the two.

use crate::utils::config::DURATION_BUCKET_BOUNDS_US;
use colored::Color;
use serde::{Deserialize, Serialize};

/// Nine severity buckets, ordered from fastest to slowest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DurationBucket {
    /// < 1ms
    Under1Ms,
    /// < 10ms
    Under10Ms,
    /// < 100ms
    Under100Ms,
    /// < 500ms
    Under500Ms,
    /// < 1s
    Under1S,
    /// < 3s
    Under3S,
    /// < 10s
    Under10S,
    /// < 30s
    Under30S,
    /// >= 30s
    Over30S,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 9] = [
        DurationBucket::Under1Ms,
        DurationBucket::Under10Ms,
        DurationBucket::Under100Ms,
        DurationBucket::Under500Ms,
        DurationBucket::Under1S,
        DurationBucket::Under3S,
        DurationBucket::Under10S,
        DurationBucket::Under30S,
        DurationBucket::Over30S,
    ];

    /// Severity index, 0 (fastest) to 8 (slowest)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Terminal color used for this bucket
    pub fn color(self) -> Color {
        match self {
            DurationBucket::Under1Ms => Color::BrightGreen,
            DurationBucket::Under10Ms => Color::Green,
            DurationBucket::Under100Ms => Color::BrightCyan,
            DurationBucket::Under500Ms => Color::Cyan,
            DurationBucket::Under1S => Color::BrightYellow,
            DurationBucket::Under3S => Color::Yellow,
            DurationBucket::Under10S => Color::BrightMagenta,
            DurationBucket::Under30S => Color::BrightRed,
            DurationBucket::Over30S => Color::Red,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DurationBucket::Under1Ms => "<1ms",
            DurationBucket::Under10Ms => "<10ms",
            DurationBucket::Under100Ms => "<100ms",
            DurationBucket::Under500Ms => "<500ms",
            DurationBucket::Under1S => "<1s",
            DurationBucket::Under3S => "<3s",
            DurationBucket::Under10S => "<10s",
            DurationBucket::Under30S => "<30s",
            DurationBucket::Over30S => ">=30s",
        }
    }
}

/// Classify a duration given in microseconds
pub fn classify_duration(duration_us: u64) -> DurationBucket {
    let index = DURATION_BUCKET_BOUNDS_US
        .iter()
        .position(|bound| duration_us < *bound)
        .unwrap_or(DURATION_BUCKET_BOUNDS_US.len());

    DurationBucket::ALL[index]
}

/// Human-readable duration: `850µs`, `12.40ms`, `3.21s`
pub fn format_duration(duration_us: u64) -> String {
    if duration_us < 1_000 {
        format!("{}µs", duration_us)
    } else if duration_us < 1_000_000 {
        format!("{:.2}ms", duration_us as f64 / 1_000.0)
    } else {
        format!("{:.2}s", duration_us as f64 / 1_000_000.0)
    }
}
