//! Waytitle core: pure pipeline logic, no IO.
//!
//! Everything here is deterministic and synchronous: outcome types and their
//! display mapping, capture-window selection, the pending-batch state
//! machine, cell addressing, and the retry-policy description the IO layer
//! executes.
mod a1;
mod batch;
mod outcome;
mod retry;
mod sanitize;
mod select;

pub use a1::rowcol_to_a1;
pub use batch::{degrade, first_empty_column, CellUpdate, PendingBatch};
pub use outcome::{TitleOutcome, SENTINEL};
pub use retry::RetryPolicy;
pub use sanitize::sanitize_worksheet_title;
pub use select::{parse_capture_rows, select_capture, CaptureShapeError, SnapshotReference};
