use crate::catalog::document::{
    self as catalog, COLLECTIONS, CUSTOMER_FILE, FEEDBACK_FILE, INVOICE_FILE, ORDER_FILE,
    POST_FILE, PRODUCT_FILE, RELATIONS, RelationPlan, TAG_FILE, VENDOR_FILE,
};
use crate::catalog::{length_plan, pandemic_plan, place_plan, price_plan};
use crate::config::DocumentStoreConfig;
use crate::error::PipelineError;
use crate::extract::csv_data_source::{CsvDataSource, Separator};
use crate::extract::json_data_source::{JsonDataSource, JsonLayout};
use crate::extract::xml_data_source::XmlDataSource;
use crate::load::batch::{BatchLoader, BatchReport};
use crate::load::document::{DocumentBatchSink, clear_collection};
use crate::load::traits::DocumentStore;
use crate::pipeline::{LoaderOutcome, RunSummary, skip_missing};
use crate::transform::EntitySchema;
use crate::transform::error::TransformError;
use crate::transform::fragmentation::read_date;
use crate::transform::records::{Record, frame_to_records};
use crate::transform::validation::{invoice_document, validate_order};
use log::{info, warn};
use polars::prelude::DataFrame;
use std::path::PathBuf;

/// Loads the flat files of one directory into the document store.
#[derive(Debug)]
pub struct DocumentPipeline<'a, S: ?Sized> {
    store: &'a S,
    data_dir: PathBuf,
    batches: BatchLoader,
    truncate_on_start: bool,
}

impl<'a, S: DocumentStore + ?Sized> DocumentPipeline<'a, S> {
    pub fn new(store: &'a S, config: &DocumentStoreConfig) -> Self {
        Self {
            store,
            data_dir: config.data_dir.clone(),
            batches: BatchLoader::new(config.batch_size),
            truncate_on_start: config.truncate_on_start,
        }
    }

    pub fn run(&self) -> RunSummary {
        info!("Starting document load from {:?}", self.data_dir);
        let mut summary = RunSummary::default();

        if self.truncate_on_start {
            self.clear(&mut summary);
        }

        summary.record("Customer", self.load_customer());
        summary.record("Person", self.load_person());
        summary.record("Feedback", self.load_feedback());
        summary.record("Invoice", self.load_invoice());
        summary.record("Tag", self.load_table(TAG_FILE, Separator::Pipe, &catalog::tag()));
        summary.record(
            "Vendor",
            self.load_table(VENDOR_FILE, Separator::Detect, &catalog::vendor()),
        );
        summary.record("Order", self.load_orders());
        summary.record("Product", self.load_products());
        summary.record("Post", self.load_posts());
        for relation in RELATIONS {
            summary.record(relation.collection, self.load_relation(relation));
        }

        info!(
            "Concluded document load: {} loaders finished, {} failed.",
            summary.outcomes.len(),
            summary.failures.len()
        );
        summary
    }

    fn clear(&self, summary: &mut RunSummary) {
        for collection in COLLECTIONS {
            if let Err(err) = clear_collection(self.store, collection) {
                summary.record(&format!("clear {collection}"), Err(err.into()));
            }
        }
    }

    fn csv(&self, file: &str, separator: Separator) -> CsvDataSource {
        CsvDataSource::new(self.data_dir.join(file), separator)
    }

    fn insert(&self, collection: &str, records: &[Record], overwrite: bool) -> BatchReport {
        let sink = DocumentBatchSink::new(self.store, overwrite);
        self.batches.load(&sink, collection, records)
    }

    fn insert_frame(
        &self,
        collection: &str,
        frame: &DataFrame,
    ) -> Result<BatchReport, PipelineError> {
        Ok(self.insert(collection, &frame_to_records(frame)?, false))
    }

    fn load_customer(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(CUSTOMER_FILE, Separator::Pipe);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }
        info!("Loading {:?} into Customer and its fragments.", source.source);

        let frame = catalog::customer().transform(&source.read_all()?)?;
        let mut report = BatchReport::default();
        for fragment in place_plan("Customer", "place")?.fragment_frame(&frame)? {
            report += self.insert_frame(&fragment.name, &fragment.frame)?;
        }
        report += self.insert_frame("Customer", &frame)?;
        Ok(LoaderOutcome::Loaded(report))
    }

    fn load_person(&self) -> Result<LoaderOutcome, PipelineError> {
        self.load_table(CUSTOMER_FILE, Separator::Pipe, &catalog::person())
    }

    fn load_feedback(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(FEEDBACK_FILE, Separator::Pipe).with_quote(b'\'');
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }
        let frame = catalog::feedback().transform(&source.read_all()?)?;
        Ok(LoaderOutcome::Loaded(self.insert_frame("Feedback", &frame)?))
    }

    /// Reads a whole file, applies `schema` and inserts into the collection named after it.
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
        Ok(LoaderOutcome::Loaded(self.insert_frame(&schema.name, &frame)?))
    }

    fn load_invoice(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = XmlDataSource::new(self.data_dir.join(INVOICE_FILE));
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }

        let invoices = source.read_invoices()?;
        let documents: Vec<Record> = invoices.iter().filter_map(invoice_document).collect();
        if documents.len() < invoices.len() {
            warn!(
                "Skipped {} invoices without id, date or numeric total.",
                invoices.len() - documents.len()
            );
        }
        info!("{} invoices passed validation.", documents.len());
        Ok(LoaderOutcome::Loaded(self.insert("Invoice", &documents, false)))
    }

    fn load_orders(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = JsonDataSource::new(self.data_dir.join(ORDER_FILE), JsonLayout::Array);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }

        let orders = source.read_records()?;
        info!("Read {} orders from {:?}.", orders.len(), source.source);
        let valid: Vec<Record> = orders
            .into_iter()
            .filter_map(|order| match validate_order(order) {
                Ok(order) => Some(order),
                Err(rejection) => {
                    warn!("Skipping order: {rejection}");
                    None
                }
            })
            .collect();
        info!("{} orders passed validation.", valid.len());

        let mut report = self.insert("Order", &valid, true);
        for fragment in pandemic_plan("Order", "OrderDate")?.fragment_records(&valid, read_date) {
            info!("{} orders go to '{}'.", fragment.records.len(), fragment.name);
            report += self.insert(&fragment.name, &fragment.records, true);
        }
        Ok(LoaderOutcome::Loaded(report))
    }

    fn load_products(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(PRODUCT_FILE, Separator::Comma);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }

        let frame = catalog::product().transform(&source.read_all()?)?;
        let mut report = self.insert_frame("Product", &frame)?;
        for fragment in price_plan("Product", "price")?.fragment_frame(&frame)? {
            report += self.insert_frame(&fragment.name, &fragment.frame)?;
        }
        Ok(LoaderOutcome::Loaded(report))
    }

    fn load_posts(&self) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(POST_FILE, Separator::Pipe);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }

        let frame = catalog::post().transform(&source.read_all()?)?;
        let mut report = self.insert_frame("Post", &frame)?;
        for fragment in length_plan("Post", "length")?.fragment_frame(&frame)? {
            report += self.insert_frame(&fragment.name, &fragment.frame)?;
        }
        Ok(LoaderOutcome::Loaded(report))
    }

    fn load_relation(&self, relation: &RelationPlan) -> Result<LoaderOutcome, PipelineError> {
        let source = self.csv(relation.file, Separator::Pipe);
        if let Some(skipped) = skip_missing(&source) {
            return Ok(skipped);
        }
        info!("Loading {:?} into {}.", source.source, relation.collection);

        let mut frame = source.read_all()?;
        for column in relation.drop_columns {
            if frame.column(column).is_ok() {
                frame = frame.drop(column).map_err(TransformError::from)?;
            }
        }
        let frame = relation.schema().transform(&frame)?;
        Ok(LoaderOutcome::Loaded(
            self.insert_frame(relation.collection, &frame)?,
        ))
    }
}
