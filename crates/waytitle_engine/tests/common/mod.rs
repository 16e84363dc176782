#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use waytitle_core::CellUpdate;
use waytitle_engine::{SheetsClient, SheetsError, Worksheet};

pub fn worksheet(title: &str) -> Worksheet {
    Worksheet {
        sheet_id: 0,
        title: title.to_string(),
    }
}

/// In-memory spreadsheet double. Failures are scripted per call: each
/// `batch_update` (or `read_rows`) pops the next scripted error, and succeeds
/// once the queue is empty.
#[derive(Default)]
pub struct FakeSheets {
    pub worksheets: Vec<Worksheet>,
    pub rows: Vec<Vec<String>>,
    pub batches: Mutex<Vec<Vec<CellUpdate>>>,
    pub write_failures: Mutex<VecDeque<SheetsError>>,
    pub read_failures: Mutex<VecDeque<SheetsError>>,
}

impl FakeSheets {
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            worksheets: vec![worksheet("Sheet1")],
            rows,
            ..Self::default()
        }
    }

    pub fn script_write_failures(&self, errors: impl IntoIterator<Item = SheetsError>) {
        self.write_failures.lock().unwrap().extend(errors);
    }

    pub fn script_read_failures(&self, errors: impl IntoIterator<Item = SheetsError>) {
        self.read_failures.lock().unwrap().extend(errors);
    }

    pub fn recorded_batches(&self) -> Vec<Vec<CellUpdate>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetsClient for FakeSheets {
    async fn spreadsheet_title(&self) -> Result<String, SheetsError> {
        Ok("Fake Spreadsheet".to_string())
    }

    async fn list_worksheets(&self) -> Result<Vec<Worksheet>, SheetsError> {
        Ok(self.worksheets.clone())
    }

    async fn read_rows(&self, _worksheet: &Worksheet) -> Result<Vec<Vec<String>>, SheetsError> {
        if let Some(err) = self.read_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.rows.clone())
    }

    async fn batch_update(
        &self,
        _worksheet: &Worksheet,
        updates: &[CellUpdate],
    ) -> Result<(), SheetsError> {
        if let Some(err) = self.write_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.batches.lock().unwrap().push(updates.to_vec());
        Ok(())
    }
}

pub fn transport() -> SheetsError {
    SheetsError::Transport("connection reset".to_string())
}
