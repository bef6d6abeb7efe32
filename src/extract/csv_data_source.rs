use crate::extract::error::ExtractionError;
use crate::extract::traits::HasSource;
use csv::{ErrorKind, Reader, ReaderBuilder, StringRecord};
use log::{debug, warn};
use polars::prelude::{Column, DataFrame, PlSmallStr};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Field delimiter of a CSV source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    #[default]
    Pipe,
    Comma,
    /// Pipe if the header line contains one, comma otherwise.
    Detect,
}

impl Separator {
    fn resolve(&self, path: &Path) -> Result<u8, ExtractionError> {
        match self {
            Separator::Pipe => Ok(b'|'),
            Separator::Comma => Ok(b','),
            Separator::Detect => {
                let mut first_line = String::new();
                BufReader::new(File::open(path)?).read_line(&mut first_line)?;
                let detected = if first_line.contains('|') { b'|' } else { b',' };
                debug!(
                    "Detected separator '{}' for {path:?}",
                    detected as char
                );
                Ok(detected)
            }
        }
    }
}

/// Defines a delimited text file as a data source.
///
/// Every cell is read as a string. Leading whitespace is skipped, empty cells
/// become null and rows whose field count differs from the header are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvDataSource {
    pub source: PathBuf,
    pub separator: Separator,
    pub quote: u8,
}

impl CsvDataSource {
    pub fn new(source: PathBuf, separator: Separator) -> Self {
        Self {
            source,
            separator,
            quote: b'"',
        }
    }

    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Reads the whole file into one frame.
    pub fn read_all(&self) -> Result<DataFrame, ExtractionError> {
        let mut chunks = self.chunks(usize::MAX)?;
        match chunks.next() {
            Some(frame) => frame,
            None => RowBuffer::new(chunks.header()).into_frame(),
        }
    }

    /// Streams the file as frames of at most `chunk_size` rows.
    pub fn chunks(&self, chunk_size: usize) -> Result<CsvChunks, ExtractionError> {
        self.ensure_exists()?;
        let delimiter = self.separator.resolve(&self.source)?;
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(self.quote)
            .has_headers(true)
            .flexible(true)
            .from_path(&self.source)?;

        let header: Vec<String> = reader
            .headers()?
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        if header.is_empty() || header.iter().all(String::is_empty) {
            return Err(ExtractionError::MissingHeader(self.source.clone()));
        }

        Ok(CsvChunks {
            reader,
            header,
            source: self.source.clone(),
            chunk_size: chunk_size.max(1),
            record: StringRecord::new(),
            finished: false,
            skipped: 0,
        })
    }
}

impl HasSource for CsvDataSource {
    fn source(&self) -> &Path {
        &self.source
    }
}

/// Iterator over fixed-size frames of a CSV file.
#[derive(Debug)]
pub struct CsvChunks {
    reader: Reader<File>,
    header: Vec<String>,
    source: PathBuf,
    chunk_size: usize,
    record: StringRecord,
    finished: bool,
    skipped: usize,
}

impl CsvChunks {
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Rows dropped so far because they were malformed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for CsvChunks {
    type Item = Result<DataFrame, ExtractionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut buffer = RowBuffer::new(&self.header);
        while buffer.len() < self.chunk_size {
            match self.reader.read_record(&mut self.record) {
                Ok(true) => {
                    if !buffer.push(&self.record) {
                        self.skipped += 1;
                        warn!(
                            "Skipping line {} of {:?}: expected {} fields, found {}.",
                            self.record.position().map_or(0, |p| p.line()),
                            self.source,
                            self.header.len(),
                            self.record.len()
                        );
                    }
                }
                Ok(false) => {
                    self.finished = true;
                    break;
                }
                Err(err) if matches!(err.kind(), ErrorKind::Io(_)) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
                Err(err) => {
                    self.skipped += 1;
                    warn!("Skipping malformed line in {:?}: {err}", self.source);
                }
            }
        }

        if buffer.is_empty() {
            return None;
        }
        debug!("Read {} rows from {:?}", buffer.len(), self.source);
        Some(buffer.into_frame())
    }
}

struct RowBuffer<'a> {
    header: &'a [String],
    columns: Vec<Vec<Option<String>>>,
    rows: usize,
}

impl<'a> RowBuffer<'a> {
    fn new(header: &'a [String]) -> Self {
        Self {
            header,
            columns: vec![Vec::new(); header.len()],
            rows: 0,
        }
    }

    fn len(&self) -> usize {
        self.rows
    }

    fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns `false` and keeps nothing when the record has the wrong width.
    fn push(&mut self, record: &StringRecord) -> bool {
        if record.len() != self.header.len() {
            return false;
        }
        for (column, field) in self.columns.iter_mut().zip(record.iter()) {
            let field = field.trim_start();
            column.push((!field.is_empty()).then(|| field.to_string()));
        }
        self.rows += 1;
        true
    }

    fn into_frame(self) -> Result<DataFrame, ExtractionError> {
        let columns = self
            .header
            .iter()
            .zip(self.columns)
            .map(|(name, values)| Column::new(PlSmallStr::from(name.as_str()), values))
            .collect::<Vec<Column>>();
        Ok(DataFrame::new(columns)?)
    }
}
