use std::fmt;

/// Fallback value written when a result cannot be determined or persisted
/// reliably.
pub const SENTINEL: &str = "N/A";

/// The resolved value for one spreadsheet row. Exactly one outcome is
/// produced per non-empty domain; the resolver never surfaces a raw error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleOutcome {
    /// The snapshot's `<title>` text, trimmed.
    Title(String),
    /// The archive index had no successful captures for the domain.
    NoSnapshot,
    /// The snapshot was fetched but contained no usable `<title>` element.
    ExtractionFailed {
        /// Timestamp of the capture that was fetched.
        timestamp: String,
    },
    /// An archive call failed after exhausting its retry budget.
    FetchError(String),
    /// The archive answered with something structurally unexpected, or the
    /// snapshot bytes could not be decoded.
    DataError(String),
    /// Anything that escaped classification.
    Unknown,
}

impl TitleOutcome {
    /// The string that lands in the spreadsheet cell for this outcome.
    pub fn display_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TitleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleOutcome::Title(text) => write!(f, "{text}"),
            TitleOutcome::NoSnapshot => write!(f, "no snapshot available"),
            TitleOutcome::ExtractionFailed { timestamp } => {
                write!(f, "error: could not extract <title> from snapshot {timestamp}")
            }
            TitleOutcome::FetchError(detail) => write!(f, "wayback request error: {detail}"),
            TitleOutcome::DataError(detail) => write!(f, "data processing error: {detail}"),
            TitleOutcome::Unknown => write!(f, "{SENTINEL}"),
        }
    }
}
