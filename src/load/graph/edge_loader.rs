use crate::constants::DEFAULT_EDGE_CHUNK_SIZE;
use crate::extract::csv_data_source::CsvDataSource;
use crate::load::error::LoadError;
use crate::load::graph::rid_resolver::{RidMap, RidResolver};
use crate::load::graph::script::{CommandScript, create_edge_statement};
use crate::load::graph::sink::execute_transactional;
use crate::load::traits::CommandExecutor;
use crate::transform::records::cell_as_string;
use log::{debug, info};
use polars::prelude::{Column, DataFrame};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// What happens to an edge whose endpoint key has no record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Skip the edge.
    #[default]
    Drop,
    /// Abort the load with [`LoadError::UnresolvedEndpoint`].
    Fail,
    /// Hand the edge back in [`EdgeReport::deferred`].
    Defer,
}

/// One side of an edge class: the vertex class, its key field and the source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub class: String,
    pub key_field: String,
    pub column: String,
}

impl EndpointSpec {
    pub fn new(class: &str, key_field: &str, column: &str) -> Self {
        Self {
            class: class.to_string(),
            key_field: key_field.to_string(),
            column: column.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub class: String,
    pub source: CsvDataSource,
    pub from: EndpointSpec,
    pub to: EndpointSpec,
    /// Columns copied onto the edge with `SET`.
    pub attributes: Vec<String>,
}

impl EdgeSpec {
    pub fn new(class: &str, source: CsvDataSource, from: EndpointSpec, to: EndpointSpec) -> Self {
        Self {
            class: class.to_string(),
            source,
            from,
            to,
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: &[&str]) -> Self {
        self.attributes = attributes.iter().map(|a| a.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLoadOptions {
    pub chunk_size: usize,
    /// Stop once this many edges have been submitted, across all chunks.
    pub max_edges: Option<usize>,
    pub on_unresolved: UnresolvedPolicy,
}

impl Default for EdgeLoadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_EDGE_CHUNK_SIZE,
            max_edges: None,
            on_unresolved: UnresolvedPolicy::default(),
        }
    }
}

/// An edge read from the source whose endpoints are still natural keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdge {
    pub from_key: String,
    pub to_key: String,
    pub attributes: Vec<(String, Option<String>)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeReport {
    pub rows_read: usize,
    /// Rows without a value in one of the endpoint columns.
    pub incomplete_rows: usize,
    pub unresolved: usize,
    /// `CREATE EDGE` statements sent, committed or not.
    pub submitted: usize,
    pub created: usize,
    pub failed_chunks: usize,
    /// Whether `max_edges` stopped the load early.
    pub capped: bool,
    pub deferred: Vec<PendingEdge>,
}

/// Streams an edge file chunk by chunk and creates one transactional script per chunk.
#[derive(Debug)]
pub struct EdgeLoader<'a, E: ?Sized> {
    executor: &'a E,
    rid_page_size: usize,
    options: EdgeLoadOptions,
}

impl<'a, E: CommandExecutor + ?Sized> EdgeLoader<'a, E> {
    pub fn new(executor: &'a E, rid_page_size: usize, options: EdgeLoadOptions) -> Self {
        Self {
            executor,
            rid_page_size,
            options,
        }
    }

    pub fn load(&self, spec: &EdgeSpec) -> Result<EdgeReport, LoadError> {
        let chunks = spec.source.chunks(self.options.chunk_size)?;
        info!(
            "Loading {:?} into '{}', unresolved endpoints: {}.",
            spec.source.source, spec.class, self.options.on_unresolved
        );
        let (from_rids, to_rids) = self.resolve_endpoints(spec);

        let mut report = EdgeReport::default();
        for (idx, chunk) in chunks.enumerate() {
            if self.cap_reached(&report) {
                report.capped = true;
                break;
            }
            let frame = chunk?;
            info!(
                "Processing chunk {} of '{}' with {} rows.",
                idx + 1,
                spec.class,
                frame.height()
            );
            let pending = pending_edges(spec, &frame, &mut report)?;
            self.submit(
                spec,
                pending,
                (&from_rids, &to_rids),
                self.options.on_unresolved,
                &mut report,
            )?;
            if report.capped {
                break;
            }
        }

        log_report(spec, &report);
        Ok(report)
    }

    /// Retries edges returned by an earlier [`EdgeLoadOptions::on_unresolved`] `Defer` load.
    /// Edges that still do not resolve come back in the report.
    pub fn load_deferred(
        &self,
        spec: &EdgeSpec,
        pending: Vec<PendingEdge>,
    ) -> Result<EdgeReport, LoadError> {
        let (from_rids, to_rids) = self.resolve_endpoints(spec);
        let mut report = EdgeReport {
            rows_read: pending.len(),
            ..Default::default()
        };

        let mut remaining = pending.into_iter().peekable();
        while remaining.peek().is_some() && !report.capped {
            let chunk: Vec<PendingEdge> = remaining
                .by_ref()
                .take(self.options.chunk_size.max(1))
                .collect();
            self.submit(
                spec,
                chunk,
                (&from_rids, &to_rids),
                UnresolvedPolicy::Defer,
                &mut report,
            )?;
        }

        log_report(spec, &report);
        Ok(report)
    }

    fn resolve_endpoints(&self, spec: &EdgeSpec) -> (RidMap, RidMap) {
        let resolver = RidResolver::new(self.executor, self.rid_page_size);
        (
            resolver.resolve(&spec.from.class, &spec.from.key_field),
            resolver.resolve(&spec.to.class, &spec.to.key_field),
        )
    }

    fn cap_reached(&self, report: &EdgeReport) -> bool {
        self.options
            .max_edges
            .is_some_and(|max| report.submitted >= max)
    }

    fn submit(
        &self,
        spec: &EdgeSpec,
        pending: Vec<PendingEdge>,
        (from_rids, to_rids): (&RidMap, &RidMap),
        policy: UnresolvedPolicy,
        report: &mut EdgeReport,
    ) -> Result<(), LoadError> {
        let mut script = CommandScript::new();
        for edge in pending {
            if self.cap_reached(report) {
                info!("Reached the limit of {} edges for '{}'.", report.submitted, spec.class);
                report.capped = true;
                break;
            }

            let (Some(from_rid), Some(to_rid)) =
                (from_rids.get(&edge.from_key), to_rids.get(&edge.to_key))
            else {
                match policy {
                    UnresolvedPolicy::Drop => {
                        debug!(
                            "Dropping edge {} -> {} of '{}'.",
                            edge.from_key, edge.to_key, spec.class
                        );
                        report.unresolved += 1;
                    }
                    UnresolvedPolicy::Fail => {
                        let (class, key) = if from_rids.contains_key(&edge.from_key) {
                            (&spec.to.class, edge.to_key)
                        } else {
                            (&spec.from.class, edge.from_key)
                        };
                        return Err(LoadError::UnresolvedEndpoint {
                            edge_class: spec.class.clone(),
                            class: class.clone(),
                            key,
                        });
                    }
                    UnresolvedPolicy::Defer => {
                        report.unresolved += 1;
                        report.deferred.push(edge);
                    }
                }
                continue;
            };

            script.push(create_edge_statement(
                &spec.class,
                from_rid,
                to_rid,
                &edge.attributes,
            ));
            report.submitted += 1;
        }

        if script.is_empty() {
            return Ok(());
        }
        match execute_transactional(self.executor, &spec.class, &script) {
            Ok(created) => {
                report.created += created;
                info!("Created {created} edges in '{}'.", spec.class);
            }
            Err(_) => report.failed_chunks += 1,
        }
        Ok(())
    }
}

fn log_report(spec: &EdgeSpec, report: &EdgeReport) {
    info!(
        "Finished '{}': {} created, {} submitted, {} unresolved, {} failed chunks{}.",
        spec.class,
        report.created,
        report.submitted,
        report.unresolved,
        report.failed_chunks,
        if report.capped { ", stopped at the limit" } else { "" }
    );
}

/// Columns named `from`/`to` stand in for `FROM_ID`/`TO_ID`.
fn endpoint_column<'f>(frame: &'f DataFrame, name: &str) -> Result<&'f Column, LoadError> {
    let fallback = match name {
        "FROM_ID" => Some("from"),
        "TO_ID" => Some("to"),
        _ => None,
    };
    frame
        .column(name)
        .ok()
        .or_else(|| fallback.and_then(|alt| frame.column(alt).ok()))
        .ok_or_else(|| {
            crate::transform::error::TransformError::MissingColumn {
                table: format!("{:?}", frame.get_column_names()),
                column: name.to_string(),
            }
            .into()
        })
}

fn pending_edges(
    spec: &EdgeSpec,
    frame: &DataFrame,
    report: &mut EdgeReport,
) -> Result<Vec<PendingEdge>, LoadError> {
    let from_column = endpoint_column(frame, &spec.from.column)?;
    let to_column = endpoint_column(frame, &spec.to.column)?;
    let attribute_columns: Vec<(&String, Option<&Column>)> = spec
        .attributes
        .iter()
        .map(|name| (name, frame.column(name).ok()))
        .collect();

    let mut pending = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        report.rows_read += 1;
        let from_key = cell_as_string(from_column, idx)?.map(|k| k.trim().to_string());
        let to_key = cell_as_string(to_column, idx)?.map(|k| k.trim().to_string());
        let (Some(from_key), Some(to_key)) = (from_key, to_key) else {
            report.incomplete_rows += 1;
            continue;
        };

        let mut attributes = Vec::with_capacity(attribute_columns.len());
        for (name, column) in &attribute_columns {
            let value = match column {
                Some(column) => cell_as_string(column, idx)?,
                None => None,
            };
            attributes.push((name.to_string(), value));
        }

        pending.push(PendingEdge {
            from_key,
            to_key,
            attributes,
        });
    }
    Ok(pending)
}
