use crate::config::ColumnMap;
use crate::domain::model::RawEntry;
use crate::utils::error::{Result, SyncError};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads personnel rows from a CSV export, skipping the header row.
pub struct CsvSource<R: Read> {
    reader: csv::Reader<R>,
    columns: ColumnMap,
}

impl CsvSource<File> {
    pub fn open<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file, columns))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R, columns: &ColumnMap) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        Self {
            reader,
            columns: columns.clone(),
        }
    }

    /// Rows in file order. Yields a [`SyncError::MalformedRow`] for any row
    /// too short to hold every mapped column.
    pub fn entries(self) -> impl Iterator<Item = Result<RawEntry>> {
        let columns = self.columns;
        self.reader
            .into_records()
            .map(move |record| -> Result<RawEntry> { entry_from_record(&record?, &columns) })
    }
}

fn entry_from_record(record: &StringRecord, columns: &ColumnMap) -> Result<RawEntry> {
    let required = columns.required_width();
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    if record.len() < required {
        return Err(SyncError::MalformedRow {
            line,
            required,
            found: record.len(),
        });
    }

    let at = |index: usize| record.get(index).unwrap_or("").to_string();

    Ok(RawEntry {
        line,
        login: at(columns.login),
        first_name: at(columns.first_name),
        last_name: at(columns.last_name),
        email: at(columns.email),
        phone: at(columns.phone),
        mobile: at(columns.mobile),
        groups: at(columns.groups),
    })
}

/// Loads every row of `path`; the first malformed row aborts the load.
pub fn load_entries<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> Result<Vec<RawEntry>> {
    let entries = CsvSource::open(path, columns)?
        .entries()
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!("Loaded {} CSV rows", entries.len());
    Ok(entries)
}
