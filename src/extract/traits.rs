use crate::extract::error::ExtractionError;
use std::path::Path;

/// A file backed source of rows.
pub trait HasSource {
    fn source(&self) -> &Path;

    fn exists(&self) -> bool {
        self.source().is_file()
    }

    /// Fails with [`ExtractionError::MissingFile`] when the file is absent.
    fn ensure_exists(&self) -> Result<(), ExtractionError> {
        if self.exists() {
            Ok(())
        } else {
            Err(ExtractionError::MissingFile(self.source().to_path_buf()))
        }
    }
}
