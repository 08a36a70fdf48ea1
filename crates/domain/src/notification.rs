use serde::{Deserialize, Serialize};

/// How long a transient alert stays on screen.
pub const ALERT_DURATION_SECONDS: u32 = 5;

/// Severity colour attached to a user-facing alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// Operation succeeded.
    Green,
    /// Informational.
    Blue,
    /// Completed with caveats.
    Orange,
    /// Needs attention.
    Yellow,
    /// Operation failed.
    Red,
    /// Neutral.
    Gray,
    /// Any other desk colour, such as `purple` or `darkgrey`.
    #[serde(other)]
    Other,
}

impl Indicator {
    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Gray => "gray",
            Self::Other => "other",
        }
    }

    /// Returns true for the success colour.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Green)
    }
}

/// Transient alert shown to the person editing permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity colour.
    pub indicator: Indicator,
    /// Human-readable text.
    pub message: String,
    /// Seconds before the alert fades.
    pub duration_seconds: u32,
}

impl Notification {
    /// Creates an alert with the standard display duration.
    #[must_use]
    pub fn new(indicator: Indicator, message: impl Into<String>) -> Self {
        Self {
            indicator,
            message: message.into(),
            duration_seconds: ALERT_DURATION_SECONDS,
        }
    }
}
