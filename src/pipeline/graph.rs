use crate::catalog::graph::{
    self as catalog, CUSTOMER_FILE, EDGE_CLASSES, FEEDBACK_FILE, POST_FILE, PRODUCT_FILE,
    TAG_FILE, VENDOR_FILE, VERTEX_CLASSES, edge_specs,
};
use crate::catalog::{length_plan, place_plan, price_plan};
use crate::config::GraphStoreConfig;
use crate::error::PipelineError;
use crate::extract::csv_data_source::{CsvDataSource, Separator};
use crate::load::batch::{BatchLoader, BatchReport};
use crate::load::graph::{EdgeLoader, GraphBatchSink, RidMap, RidResolver, clear_class};
use crate::load::traits::CommandExecutor;
use crate::pipeline::{LoaderOutcome, RunSummary, skip_missing};
use crate::transform::EntitySchema;
use crate::transform::fragmentation::read_number;
use crate::transform::records::{Record, frame_to_records, value_as_key};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;

/// Loads the `Dataset` tree into the graph store: vertices first, then edges between them.
#[derive(Debug)]
pub struct GraphPipeline<'a, E: ?Sized> {
    executor: &'a E,
    config: GraphStoreConfig,
}

impl<'a, E: CommandExecutor + ?Sized> GraphPipeline<'a, E> {
    pub fn new(executor: &'a E, config: &GraphStoreConfig) -> Self {
        Self {
            executor,
            config: config.clone(),
        }
    }

    pub fn run(&self) -> RunSummary {
        info!("Starting graph load from {:?}", self.config.data_dir);
        let mut summary = RunSummary::default();

        if self.config.truncate_on_start {
            self.clear(&mut summary);
        }

        summary.record("Customer", self.load_people("Customer", "CUSTOMER_ID"));
        summary.record("Person", self.load_people("Person", "PERSON_ID"));
        summary.record(
            "Vendor",
            self.load_table(VENDOR_FILE, Separator::Comma, &catalog::vendor()),
        );
        summary.record("Product", self.load_products());
        summary.record("Feedback", self.load_feedback());
        summary.record("Post", self.load_posts());
        summary.record("Tag", self.load_table(TAG_FILE, Separator::Pipe, &catalog::tag()));
        self.load_edges(&mut summary);

        info!(
            "Concluded graph load: {} loaders finished, {} failed.",
            summary.outcomes.len(),
            summary.failures.len()
        );
        summary
    }

    /// Edge classes go first so no vertex is truncated while edges still reference it.
    fn clear(&self, summary: &mut RunSummary) {
        for class in EDGE_CLASSES.iter().chain(VERTEX_CLASSES) {
            if let Err(err) = clear_class(self.executor, class) {
                summary.record(&format!("clear {class}"), Err(err.into()));
            }
        }
    }

    fn csv(&self, file: &str, separator: Separator) -> CsvDataSource {
        CsvDataSource::new(self.config.data_dir.join(file), separator)
    }

    fn insert(&self, class: &str, records: &[Record], batch_size: usize) -> BatchReport {
        let sink = GraphBatchSink::new(self.executor);
        BatchLoader::new(batch_size).load(&sink, class, records)
    }

    fn resolver(&self) -> RidResolver<'a, E> {
        RidResolver::new(self.executor, self.config.rid_page_size)
    }

    /// The person file becomes `class` plus its North/Center/South fragments.
    fn load_people(&self, class: &str, key_field: &str) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(CUSTOMER_FILE, Separator::Pipe);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }
        info!("Loading {:?} into {class} and its fragments.", source.source);

        let frame = catalog::person_vertex(class, key_field).transform(&source.read_all()?)?;
        let mut report = self.insert(class, &frame_to_records(&frame)?, self.config.batch_size);
        for fragment in place_plan(class, "PLACE")?.fragment_frame(&frame)? {
            report += self.insert(
                &fragment.name,
                &frame_to_records(&fragment.frame)?,
                self.config.batch_size,
            );
        }
        Ok(LoaderOutcome::Loaded(report))
    }

    fn load_table(
        &self,
        file: &str,
        separator: Separator,
        schema: &EntitySchema,
    ) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(file, separator);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }
        info!("Loading {:?} into {}.", source.source, schema.name);

        let frame = schema.transform(&source.read_all()?)?;
        Ok(LoaderOutcome::Loaded(self.insert(
            &schema.name,
            &frame_to_records(&frame)?,
            self.config.batch_size,
        )))
    }

    /// Products reference their vendor by record id; products of unknown vendors are dropped.
    fn load_products(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(PRODUCT_FILE, Separator::Comma);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }

        let frame = catalog::product().transform(&source.read_all()?)?;
        let vendors = self.resolver().resolve("Vendor", "VENDOR_ID");

        let mut products = Vec::with_capacity(frame.height());
        let mut dropped = 0usize;
        for mut record in frame_to_records(&frame)? {
            let rid = record
                .get("VENDOR_ID")
                .and_then(value_as_key)
                .and_then(|key| vendors.get(&key).cloned());
            match rid {
                Some(rid) => {
                    record.insert("VENDOR_ID".to_string(), Value::String(rid));
                    products.push(record);
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!("Dropped {dropped} products whose vendor is not loaded.");
        }

        let mut report = self.insert("Product", &products, self.config.batch_size);
        for fragment in price_plan("Product", "PRICE")?.fragment_records(&products, read_number) {
            report += self.insert(&fragment.name, &fragment.records, self.config.batch_size);
        }
        Ok(LoaderOutcome::Loaded(report))
    }

    /// Streams the feedback file, resolving only the customers and products each chunk mentions.
    fn load_feedback(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(FEEDBACK_FILE, Separator::Pipe);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }

        let resolver = self.resolver();
        let chunk_size = self.config.feedback_chunk_size;
        let mut report = BatchReport::default();
        for (idx, chunk) in source.chunks(chunk_size)?.enumerate() {
            let rows = frame_to_records(&chunk?)?;
            info!("Processing feedback chunk {} with {} rows.", idx + 1, rows.len());

            let customers = resolver.resolve_keys(
                "Customer",
                "CUSTOMER_ID",
                &unique_keys(&rows, "CUSTOMER_ID"),
            );
            let products =
                resolver.resolve_keys("Product", "PRODUCT_ID", &unique_keys(&rows, "PRODUCT_ID"));

            let feedback: Vec<Record> = rows
                .iter()
                .filter_map(|row| feedback_vertex(row, &customers, &products))
                .collect();
            if feedback.len() < rows.len() {
                warn!(
                    "Dropped {} feedback rows with an unknown customer or product.",
                    rows.len() - feedback.len()
                );
            }
            report += self.insert("Feedback", &feedback, chunk_size);
        }
        Ok(LoaderOutcome::Loaded(report))
    }

    fn load_posts(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(POST_FILE, Separator::Pipe);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }

        let schema = catalog::post();
        let plan = length_plan("Post", "LENGTH")?;
        let batch_size = self.config.post_batch_size;
        let mut report = BatchReport::default();
        for (idx, chunk) in source.chunks(self.config.post_chunk_size)?.enumerate() {
            let frame = schema.transform(&chunk?)?;
            info!("Processing post chunk {} with {} rows.", idx + 1, frame.height());

            report += self.insert("Post", &frame_to_records(&frame)?, batch_size);
            for fragment in plan.fragment_frame(&frame)? {
                report += self.insert(
                    &fragment.name,
                    &frame_to_records(&fragment.frame)?,
                    batch_size,
                );
            }
        }
        Ok(LoaderOutcome::Loaded(report))
    }

    /// Loads every edge class, then gives deferred edges one more resolution attempt.
    fn load_edges(&self, summary: &mut RunSummary) {
        let loader = EdgeLoader::new(
            self.executor,
            self.config.rid_page_size,
            self.config.edge_options(),
        );

        let mut retries = Vec::new();
        for spec in edge_specs(&self.config.data_dir) {
            if let Some(skipped) = skip_missing(&spec.source) {
                summary.record(&spec.class, Ok(skipped));
                continue;
            }
            match loader.load(&spec) {
                Ok(mut report) => {
                    let deferred = std::mem::take(&mut report.deferred);
                    summary.record(&spec.class, Ok(LoaderOutcome::Edges(report)));
                    if !deferred.is_empty() {
                        retries.push((spec, deferred));
                    }
                }
                Err(err) => summary.record(&spec.class, Err(err.into())),
            }
        }

        for (spec, deferred) in retries {
            info!("Retrying {} deferred edges of '{}'.", deferred.len(), spec.class);
            let result = loader
                .load_deferred(&spec, deferred)
                .map(LoaderOutcome::Edges)
                .map_err(PipelineError::from);
            summary.record(&format!("{} (deferred)", spec.class), result);
        }
    }
}

fn unique_keys(rows: &[Record], field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(|row| row.get(field).and_then(value_as_key))
        .filter(|key| !key.is_empty() && seen.insert(key.clone()))
        .collect()
}

fn feedback_vertex(row: &Record, customers: &RidMap, products: &RidMap) -> Option<Record> {
    let product = products.get(&row.get("PRODUCT_ID").and_then(value_as_key)?)?;
    let customer = customers.get(&row.get("CUSTOMER_ID").and_then(value_as_key)?)?;

    let mut vertex = Record::new();
    vertex.insert("PRODUCT_ID".to_string(), Value::String(product.clone()));
    vertex.insert("CUSTOMER_ID".to_string(), Value::String(customer.clone()));
    vertex.insert(
        "RATE".to_string(),
        row.get("RATE")
            .and_then(read_number)
            .map_or(Value::Null, Value::from),
    );
    vertex.insert(
        "REVIEW".to_string(),
        row.get("REVIEW").cloned().unwrap_or(Value::Null),
    );
    Some(vertex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::error::LoadError;
    use crate::load::graph::UnresolvedPolicy;
    use crate::test_suite::mocks::MockCommandExecutor;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    type Scripts = Arc<Mutex<Vec<String>>>;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temporary directory")
    }

    fn write(dir: &Path, file: &str, content: &str) {
        let path = dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn config(dir: &TempDir) -> GraphStoreConfig {
        GraphStoreConfig {
            data_dir: dir.path().to_path_buf(),
            truncate_on_start: false,
            ..Default::default()
        }
    }

    /// Answers lookups from `rows` (class -> rows) and records every other command.
    fn graph(rows: Value, scripts: Scripts) -> MockCommandExecutor {
        let mut executor = MockCommandExecutor::new();
        executor.expect_execute().returning(move |command, _| {
            if command.starts_with("SELECT ") {
                let class = command
                    .split(" FROM ")
                    .nth(1)
                    .and_then(|rest| rest.split_whitespace().next())
                    .unwrap_or_default();
                return Ok(json!({"result": rows.get(class).cloned().unwrap_or(json!([]))}));
            }
            scripts.lock().unwrap().push(command.to_string());
            Ok(json!({"result": []}))
        });
        executor
    }

    fn inserts_into(scripts: &Scripts, class: &str) -> usize {
        let prefix = format!("INSERT INTO {class} CONTENT");
        scripts
            .lock()
            .unwrap()
            .iter()
            .map(|script| script.lines().filter(|l| l.starts_with(&prefix)).count())
            .sum()
    }

    #[rstest]
    fn test_missing_files_are_skipped(temp_dir: TempDir) {
        let mut executor = MockCommandExecutor::new();
        executor.expect_execute().never();

        let summary = GraphPipeline::new(&executor, &config(&temp_dir)).run();

        assert!(summary.failures.is_empty());
        assert_eq!(summary.outcomes.len(), 7 + EDGE_CLASSES.len());
    }

    #[rstest]
    fn test_people_are_loaded_with_fragments(temp_dir: TempDir) {
        write(
            temp_dir.path(),
            CUSTOMER_FILE,
            "ID|FIRSTNAME|LASTNAME|BIRTHDAY|CREATION_DATE|PLACE\n\
             1|Ana|Lo|1989-12-03|2010-02-14T15:32:10.447+0000|12\n\
             2|Bo|Li|1990-01-01|2010-02-14T15:32:10.447+0000|1200\n",
        );
        let scripts = Scripts::default();
        let executor = graph(json!({}), scripts.clone());

        let summary = GraphPipeline::new(&executor, &config(&temp_dir)).run();

        assert!(summary.is_clean());
        assert_eq!(inserts_into(&scripts, "Customer"), 2);
        assert_eq!(inserts_into(&scripts, "Customer_North"), 1);
        assert_eq!(inserts_into(&scripts, "Customer_South"), 1);
        assert_eq!(inserts_into(&scripts, "Person"), 2);
        assert!(
            scripts.lock().unwrap()[0].contains(r#""CUSTOMER_ID":"1","FIRST_NAME":"Ana""#)
        );
    }

    #[rstest]
    fn test_products_reference_vendor_rids(temp_dir: TempDir) {
        write(
            temp_dir.path(),
            PRODUCT_FILE,
            "PRODUCT_ID,TITLE,PRICE,VENDOR_ID\np1,Mug,9.5,v1\np2,Desk,250,v1\np3,Lamp,20,v9\n",
        );
        let scripts = Scripts::default();
        let executor = graph(
            json!({"Vendor": [{"VENDOR_ID": "v1", "@rid": "#30:0"}]}),
            scripts.clone(),
        );

        GraphPipeline::new(&executor, &config(&temp_dir)).run();

        assert_eq!(inserts_into(&scripts, "Product"), 2);
        assert_eq!(inserts_into(&scripts, "Product_Cheap"), 1);
        assert_eq!(inserts_into(&scripts, "Product_Expensive"), 1);
        let product_script = &scripts.lock().unwrap()[0];
        assert!(product_script.contains(r##""VENDOR_ID":"#30:0""##));
        assert!(!product_script.contains("Lamp"));
    }

    #[rstest]
    fn test_feedback_resolves_each_chunk(temp_dir: TempDir) {
        write(
            temp_dir.path(),
            FEEDBACK_FILE,
            "PRODUCT_ID|CUSTOMER_ID|RATE|REVIEW\np1|1|4.5|good\np1|7|1|bad\n",
        );
        let scripts = Scripts::default();
        let executor = graph(
            json!({
                "Product": [{"PRODUCT_ID": "p1", "@rid": "#40:1"}],
                "Customer": [{"CUSTOMER_ID": "1", "@rid": "#11:1"}],
            }),
            scripts.clone(),
        );

        GraphPipeline::new(&executor, &config(&temp_dir)).run();

        let scripts = scripts.lock().unwrap();
        assert_eq!(scripts.len(), 1);
        assert_eq!(
            scripts[0],
            "BEGIN;\n\
             INSERT INTO Feedback CONTENT {\"PRODUCT_ID\":\"#40:1\",\"CUSTOMER_ID\":\"#11:1\",\"RATE\":4.5,\"REVIEW\":\"good\"};\n\
             COMMIT"
        );
    }

    #[rstest]
    fn test_edges_follow_the_unresolved_policy(temp_dir: TempDir) {
        write(
            temp_dir.path(),
            "SocialNetwork/person_knows_person_0_0.csv",
            "from|to|creationDate\n1|1|2010-01-01\n9|1|2010-01-02\n",
        );
        let scripts = Scripts::default();
        let executor = graph(
            json!({
                "Customer": [{"CUSTOMER_ID": "1", "@rid": "#11:1"}],
                "Person": [{"PERSON_ID": "1", "@rid": "#12:1"}],
            }),
            scripts.clone(),
        );
        let config = GraphStoreConfig {
            on_unresolved: UnresolvedPolicy::Fail,
            ..config(&temp_dir)
        };

        let summary = GraphPipeline::new(&executor, &config).run();

        assert!(matches!(
            summary.failure("CUSTOMER_KNOWS_PERSON"),
            Some(PipelineError::Load(LoadError::UnresolvedEndpoint { .. }))
        ));
        assert!(scripts.lock().unwrap().is_empty());
    }

    #[rstest]
    fn test_deferred_edges_are_retried_once(temp_dir: TempDir) {
        write(
            temp_dir.path(),
            "SocialNetwork/post_hasTag_tag_0_0.csv",
            "POST_ID|TAG_ID\n5|1\n6|2\n",
        );
        let scripts = Scripts::default();
        let executor = graph(
            json!({
                "Post": [{"POST_ID": "5", "@rid": "#20:5"}, {"POST_ID": "6", "@rid": "#20:6"}],
                "Tag": [{"TAG_ID": "1", "@rid": "#21:1"}],
            }),
            scripts.clone(),
        );
        let config = GraphStoreConfig {
            on_unresolved: UnresolvedPolicy::Defer,
            ..config(&temp_dir)
        };

        let summary = GraphPipeline::new(&executor, &config).run();

        match summary.outcome("POST_HAS_TAG (deferred)") {
            Some(LoaderOutcome::Edges(report)) => assert_eq!(report.deferred.len(), 1),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(scripts.lock().unwrap().len(), 1);
    }

    #[rstest]
    fn test_edge_classes_are_truncated_first(temp_dir: TempDir) {
        let scripts = Scripts::default();
        let executor = graph(json!({}), scripts.clone());
        let config = GraphStoreConfig {
            truncate_on_start: true,
            ..config(&temp_dir)
        };

        GraphPipeline::new(&executor, &config).run();

        let scripts = scripts.lock().unwrap();
        assert_eq!(scripts.len(), EDGE_CLASSES.len() + VERTEX_CLASSES.len());
        assert_eq!(scripts[0], "TRUNCATE CLASS CUSTOMER_KNOWS_PERSON UNSAFE");
        assert_eq!(scripts.last().unwrap(), "TRUNCATE CLASS Tag UNSAFE");
    }
}
