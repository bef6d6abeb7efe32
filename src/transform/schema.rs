use crate::transform::data_processing::casting::{
    coerce_datetime, coerce_float, coerce_integer, coerce_text, fill_missing, prefix_values,
    strip_chars,
};
use crate::transform::error::TransformError;
use crate::transform::records::cell_as_string;
use log::debug;
use polars::prelude::{Column, DataFrame, PlSmallStr};

/// Where a field is read from in the extracted table.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    Name(String),
    /// Zero based. Used for files whose header does not match the target names.
    Position(usize),
}

/// How the raw string cells of a field are turned into loadable values.
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    Text,
    TrimmedText,
    /// Unparseable cells fall back to `default`, or null when there is none.
    Integer {
        default: Option<i64>,
    },
    /// Unparseable cells become null.
    Float,
    /// Normalised to `YYYY-MM-DD HH:MM:SS`, unparseable cells become null.
    DateTime,
    FillMissing(String),
    StripChars(char),
    /// Prepends the prefix, nulls stay null.
    Prefixed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub source: FieldSource,
    pub target: String,
    pub coercion: Coercion,
}

impl FieldSpec {
    pub fn named(source: &str, target: &str, coercion: Coercion) -> Self {
        Self {
            source: FieldSource::Name(source.to_string()),
            target: target.to_string(),
            coercion,
        }
    }

    pub fn positional(position: usize, target: &str, coercion: Coercion) -> Self {
        Self {
            source: FieldSource::Position(position),
            target: target.to_string(),
            coercion,
        }
    }

    /// Keeps a column under its own name, untouched.
    pub fn keep(name: &str) -> Self {
        Self::named(name, name, Coercion::Text)
    }

    fn apply(&self, column: &Column) -> Result<Column, TransformError> {
        let target = self.target.as_str();
        match &self.coercion {
            Coercion::Text => coerce_text(column, target, false),
            Coercion::TrimmedText => coerce_text(column, target, true),
            Coercion::Integer { default } => coerce_integer(column, target, *default),
            Coercion::Float => coerce_float(column, target),
            Coercion::DateTime => coerce_datetime(column, target),
            Coercion::FillMissing(fill) => fill_missing(column, target, fill),
            Coercion::StripChars(ch) => strip_chars(column, target, *ch),
            Coercion::Prefixed(prefix) => prefix_values(column, target, prefix),
        }
    }
}

/// Builds the primary-key field of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySpec {
    /// Copies an output field.
    Field(String),
    /// Joins several output fields with `separator`. Null when any part is null.
    Composite {
        fields: Vec<String>,
        separator: String,
    },
}

/// Declarative description of how one source file becomes loadable rows.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    /// Files with a different column count are rejected as a whole.
    pub expected_width: Option<usize>,
    pub key: Option<KeySpec>,
    pub key_field: String,
    /// Carry source columns no field reads from through unchanged, after the fields.
    pub keep_rest: bool,
}

impl EntitySchema {
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            fields,
            expected_width: None,
            key: None,
            key_field: "_key".to_string(),
            keep_rest: false,
        }
    }

    pub fn keeping_rest(mut self) -> Self {
        self.keep_rest = true;
        self
    }

    pub fn with_expected_width(mut self, width: usize) -> Self {
        self.expected_width = Some(width);
        self
    }

    pub fn with_key(mut self, key: KeySpec) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_key_field(mut self, key_field: &str) -> Self {
        self.key_field = key_field.to_string();
        self
    }

    /// Renames, coerces and keys `df`. Columns not named by a field are dropped,
    /// the key (if any) becomes the first column.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        if let Some(expected) = self.expected_width
            && df.width() != expected
        {
            return Err(TransformError::UnexpectedWidth {
                table: self.name.clone(),
                found: df.width(),
                expected,
            });
        }

        let mut columns = self
            .fields
            .iter()
            .map(|field| field.apply(self.source_column(df, &field.source)?))
            .collect::<Result<Vec<Column>, TransformError>>()?;

        if self.keep_rest {
            let rest: Vec<Column> = df
                .get_columns()
                .iter()
                .enumerate()
                .filter(|(position, column)| !self.reads(*position, column.name().as_str()))
                .filter(|(_, column)| !columns.iter().any(|c| c.name() == column.name()))
                .map(|(_, column)| column.clone())
                .collect();
            columns.extend(rest);
        }

        if let Some(key) = &self.key {
            let key_column = self.build_key(key, &columns, df.height())?;
            columns.insert(0, key_column);
        }

        debug!(
            "Transformed {} rows of '{}' into {} fields.",
            df.height(),
            self.name,
            columns.len()
        );
        Ok(DataFrame::new(columns)?)
    }

    fn reads(&self, position: usize, name: &str) -> bool {
        self.fields.iter().any(|field| match &field.source {
            FieldSource::Name(source) => source == name,
            FieldSource::Position(source) => *source == position,
        })
    }

    fn source_column<'a>(
        &self,
        df: &'a DataFrame,
        source: &FieldSource,
    ) -> Result<&'a Column, TransformError> {
        let found = match source {
            FieldSource::Name(name) => df.column(name).ok(),
            FieldSource::Position(position) => df.get_columns().get(*position),
        };
        found.ok_or_else(|| TransformError::MissingColumn {
            table: self.name.clone(),
            column: match source {
                FieldSource::Name(name) => name.clone(),
                FieldSource::Position(position) => format!("#{position}"),
            },
        })
    }

    fn build_key(
        &self,
        key: &KeySpec,
        columns: &[Column],
        height: usize,
    ) -> Result<Column, TransformError> {
        let find = |name: &str| {
            columns
                .iter()
                .find(|c| c.name().as_str() == name)
                .ok_or_else(|| TransformError::MissingColumn {
                    table: self.name.clone(),
                    column: name.to_string(),
                })
        };

        let (parts, separator) = match key {
            KeySpec::Field(field) => (vec![find(field)?], ""),
            KeySpec::Composite { fields, separator } => (
                fields
                    .iter()
                    .map(|f| find(f))
                    .collect::<Result<Vec<&Column>, TransformError>>()?,
                separator.as_str(),
            ),
        };

        let mut keys: Vec<Option<String>> = Vec::with_capacity(height);
        for idx in 0..height {
            let values = parts
                .iter()
                .map(|column| cell_as_string(column, idx))
                .collect::<Result<Option<Vec<String>>, TransformError>>()?;
            keys.push(values.map(|v| v.join(separator)));
        }

        Ok(Column::new(PlSmallStr::from(self.key_field.as_str()), keys))
    }
}
