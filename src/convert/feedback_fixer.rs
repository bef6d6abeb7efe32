use crate::constants::DEFAULT_REVIEW;
use crate::convert::error::ConvertError;
use crate::extract::csv_data_source::{CsvDataSource, Separator};
use crate::transform::error::TransformError;
use crate::transform::records::cell_as_string;
use csv::WriterBuilder;
use log::info;
use polars::prelude::Column;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixReport {
    pub kept: usize,
    /// Rows without a customer or product.
    pub dropped: usize,
    pub filled_reviews: usize,
}

/// Drops feedback rows missing `CUSTOMER_ID` or `PRODUCT_ID` and gives every row
/// a trimmed `REVIEW`.
///
/// The whole input is read before `output` is written, so both may be the same file.
pub fn fix_feedback(input: &Path, output: &Path) -> Result<FixReport, ConvertError> {
    let frame = CsvDataSource::new(input.to_path_buf(), Separator::Pipe).read_all()?;
    let column = |name: &str| {
        frame.column(name).map_err(|_| TransformError::MissingColumn {
            table: "Feedback".to_string(),
            column: name.to_string(),
        })
    };
    let customer = column("CUSTOMER_ID")?;
    let product = column("PRODUCT_ID")?;
    let review = column("REVIEW")?;

    let mut writer = WriterBuilder::new().delimiter(b'|').from_path(output)?;
    let names: Vec<&str> = frame.get_column_names().iter().map(|n| n.as_str()).collect();
    writer.write_record(&names)?;

    let mut report = FixReport::default();
    let columns: &[Column] = frame.get_columns();
    for idx in 0..frame.height() {
        if is_blank(customer, idx)? || is_blank(product, idx)? {
            report.dropped += 1;
            continue;
        }

        let mut row = Vec::with_capacity(columns.len());
        for column in columns {
            let value = cell_as_string(column, idx)?;
            if column.name() != review.name() {
                row.push(value.unwrap_or_default());
                continue;
            }
            match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(text) => row.push(text),
                None => {
                    report.filled_reviews += 1;
                    row.push(DEFAULT_REVIEW.to_string());
                }
            }
        }
        writer.write_record(&row)?;
        report.kept += 1;
    }
    writer.flush()?;

    info!(
        "Wrote {} feedback rows to {output:?}, dropped {}, filled {} reviews.",
        report.kept, report.dropped, report.filled_reviews
    );
    Ok(report)
}

fn is_blank(column: &Column, idx: usize) -> Result<bool, TransformError> {
    Ok(cell_as_string(column, idx)?.is_none_or(|v| v.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temporary directory")
    }

    #[rstest]
    fn test_fix_feedback_in_place(temp_dir: TempDir) {
        let path = temp_dir.path().join("Feedback.csv");
        fs::write(
            &path,
            "PRODUCT_ID|CUSTOMER_ID|RATE|REVIEW\n\
             p1|c1|4|  great mug  \n\
             p2||1|never arrived\n\
             |c3|2|meh\n\
             p4|c4|5|\n\
             p5|c5|3|\"pipes | inside\"\n",
        )
        .unwrap();

        let report = fix_feedback(&path, &path).unwrap();

        assert_eq!(
            report,
            FixReport {
                kept: 3,
                dropped: 2,
                filled_reviews: 1
            }
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "PRODUCT_ID|CUSTOMER_ID|RATE|REVIEW\n\
             p1|c1|4|great mug\n\
             p4|c4|5|No review provided\n\
             p5|c5|3|\"pipes | inside\"\n"
        );
    }

    #[rstest]
    fn test_fix_feedback_requires_review_column(temp_dir: TempDir) {
        let path = temp_dir.path().join("Feedback.csv");
        fs::write(&path, "PRODUCT_ID|CUSTOMER_ID\np1|c1\n").unwrap();

        let err = fix_feedback(&path, &temp_dir.path().join("out.csv")).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Transform(TransformError::MissingColumn { column, .. })
                if column == "REVIEW"
        ));
    }
}
