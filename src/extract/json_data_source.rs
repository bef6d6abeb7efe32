use crate::extract::error::ExtractionError;
use crate::extract::traits::HasSource;
use crate::transform::records::Record;
use log::{info, warn};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// How the records are laid out in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonLayout {
    /// A single top-level array of objects.
    #[default]
    Array,
    /// One object per line.
    Lines,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonDataSource {
    pub source: PathBuf,
    pub layout: JsonLayout,
}

impl JsonDataSource {
    pub fn new(source: PathBuf, layout: JsonLayout) -> Self {
        Self { source, layout }
    }

    /// Reads every object in the file. Non-object entries are skipped.
    pub fn read_records(&self) -> Result<Vec<Record>, ExtractionError> {
        self.ensure_exists()?;
        let records = match self.layout {
            JsonLayout::Array => self.read_array()?,
            JsonLayout::Lines => self.read_lines()?,
        };
        info!("Read {} records from {:?}", records.len(), self.source);
        Ok(records)
    }

    fn read_array(&self) -> Result<Vec<Record>, ExtractionError> {
        let reader = BufReader::new(File::open(&self.source)?);
        let value: Value = serde_json::from_reader(reader)?;
        match value {
            Value::Array(values) => Ok(values
                .into_iter()
                .enumerate()
                .filter_map(|(idx, value)| self.as_record(idx, value))
                .collect()),
            _ => Err(ExtractionError::NotAJsonArray(self.source.clone())),
        }
    }

    fn read_lines(&self) -> Result<Vec<Record>, ExtractionError> {
        let reader = BufReader::new(File::open(&self.source)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(&line) {
                Ok(value) => records.extend(self.as_record(idx, value)),
                Err(err) => warn!("Skipping line {} of {:?}: {err}", idx + 1, self.source),
            }
        }
        Ok(records)
    }

    fn as_record(&self, idx: usize, value: Value) -> Option<Record> {
        match value {
            Value::Object(record) => Some(record),
            other => {
                warn!(
                    "Skipping entry {idx} of {:?}: expected an object, found {other}",
                    self.source
                );
                None
            }
        }
    }
}

impl HasSource for JsonDataSource {
    fn source(&self) -> &Path {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temporary directory")
    }

    #[rstest]
    fn test_read_array(temp_dir: TempDir) {
        let path = temp_dir.path().join("Order.json");
        fs::write(
            &path,
            r#"[{"OrderId": "o1", "TotalPrice": 10.5}, 3, {"OrderId": "o2"}]"#,
        )
        .unwrap();

        let records = JsonDataSource::new(path, JsonLayout::Array)
            .read_records()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["OrderId"], "o2");
    }

    #[rstest]
    fn test_read_lines_skips_broken_lines(temp_dir: TempDir) {
        let path = temp_dir.path().join("Order.json");
        fs::write(&path, "{\"ORDER_ID\": \"1\"}\n{broken\n\n{\"ORDER_ID\": \"2\"}\n").unwrap();

        let records = JsonDataSource::new(path, JsonLayout::Lines)
            .read_records()
            .unwrap();

        assert_eq!(records.len(), 2);
    }

    #[rstest]
    fn test_object_root_is_rejected(temp_dir: TempDir) {
        let path = temp_dir.path().join("Order.json");
        fs::write(&path, r#"{"OrderId": "o1"}"#).unwrap();

        let result = JsonDataSource::new(path, JsonLayout::Array).read_records();
        assert!(matches!(result, Err(ExtractionError::NotAJsonArray(_))));
    }
}
