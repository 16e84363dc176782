use std::fmt;

/// One archived capture, identified by its CDX timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReference {
    pub timestamp: String,
}

/// The CDX response rows did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureShapeError {
    pub message: String,
}

impl CaptureShapeError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CaptureShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unexpected capture index shape: {}", self.message)
    }
}

impl std::error::Error for CaptureShapeError {}

/// Strip the CDX header row and map the remaining `[timestamp]` rows into
/// snapshot references, preserving the order received (newest first, since
/// the index query sorts descending).
///
/// An empty response (no rows at all) and a header-only response both yield
/// an empty window. A data row without a timestamp column is a shape error;
/// it is not retryable.
pub fn parse_capture_rows(rows: &[Vec<String>]) -> Result<Vec<SnapshotReference>, CaptureShapeError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    rows[1..]
        .iter()
        .enumerate()
        .map(|(idx, row)| match row.first() {
            Some(timestamp) => Ok(SnapshotReference {
                timestamp: timestamp.clone(),
            }),
            None => Err(CaptureShapeError::new(format!(
                "capture row {} has no timestamp field",
                idx + 1
            ))),
        })
        .collect()
}

/// Select the capture to fetch from a newest-first window: the last element,
/// i.e. the least recent of the limited top-N recent successful captures.
///
/// Deliberate quirk carried over from the original behavior: this is NOT the
/// globally oldest capture, only the oldest inside the recent window.
pub fn select_capture(window: &[SnapshotReference]) -> Option<&SnapshotReference> {
    window.last()
}
