//! Waytitle engine: archive and spreadsheet IO pipeline.
mod archive;
mod decode;
mod extract;
mod process;
mod resolve;
mod retry;
mod sheets;
mod writer;

pub use archive::{ArchiveClient, ArchiveError, ArchiveSettings, Snapshot};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use extract::extract_title;
pub use process::{ProcessSettings, RunSummary, SheetProcessor};
pub use resolve::TitleResolver;
pub use retry::with_retries;
pub use sheets::{GoogleSheetsClient, SheetsClient, SheetsError, SheetsSettings, Worksheet};
pub use writer::{BatchWriter, WriterSettings};
