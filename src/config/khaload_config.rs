use crate::constants::{
    DEFAULT_DATABASE, DEFAULT_DOCUMENT_BATCH_SIZE, DEFAULT_DOCUMENT_DATA_DIR,
    DEFAULT_DOCUMENT_HOST, DEFAULT_EDGE_CHUNK_SIZE, DEFAULT_FEEDBACK_CHUNK_SIZE,
    DEFAULT_GRAPH_BATCH_SIZE, DEFAULT_GRAPH_DATA_DIR, DEFAULT_GRAPH_HOST, DEFAULT_POST_BATCH_SIZE,
    DEFAULT_POST_CHUNK_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RID_PAGE_SIZE,
    DEFAULT_USERNAME,
};
use crate::load::graph::{EdgeLoadOptions, UnresolvedPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Settings of both pipelines. Every field falls back to the values the loaders were built against.
#[derive(Debug, Deserialize, Serialize, Validate, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct KhaloadConfig {
    #[serde(default)]
    #[validate(nested)]
    pub document: DocumentStoreConfig,
    #[serde(default)]
    #[validate(nested)]
    pub graph: GraphStoreConfig,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DocumentStoreConfig {
    /// Directory holding the flat `Customer.csv`, `Order.json`, `Invoice.xml`, ... files.
    #[serde(default = "default_document_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_document_host")]
    #[validate(length(min = 1))]
    pub host: String,
    #[serde(default = "default_database")]
    #[validate(length(min = 1))]
    pub database: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_document_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,
    #[serde(default = "default_true")]
    pub truncate_on_start: bool,
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_document_data_dir(),
            host: default_document_host(),
            database: default_database(),
            username: default_username(),
            password: String::new(),
            batch_size: default_document_batch_size(),
            truncate_on_start: true,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GraphStoreConfig {
    /// Directory with the `Customer/`, `Vendor/`, `Product/`, `Feedback/` and
    /// `SocialNetwork/` folders.
    #[serde(default = "default_graph_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_graph_host")]
    #[validate(length(min = 1))]
    pub host: String,
    #[serde(default = "default_database")]
    #[validate(length(min = 1))]
    pub database: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_graph_batch_size")]
    #[validate(range(min = 1))]
    pub batch_size: usize,
    #[serde(default = "default_rid_page_size")]
    #[validate(range(min = 1))]
    pub rid_page_size: usize,
    #[serde(default = "default_edge_chunk_size")]
    #[validate(range(min = 1))]
    pub edge_chunk_size: usize,
    #[serde(default = "default_feedback_chunk_size")]
    #[validate(range(min = 1))]
    pub feedback_chunk_size: usize,
    #[serde(default = "default_post_chunk_size")]
    #[validate(range(min = 1))]
    pub post_chunk_size: usize,
    #[serde(default = "default_post_batch_size")]
    #[validate(range(min = 1))]
    pub post_batch_size: usize,
    /// Upper bound on edges created per edge class. Unbounded when absent.
    #[serde(default)]
    pub max_edges: Option<usize>,
    #[serde(default)]
    pub on_unresolved: UnresolvedPolicy,
    #[serde(default = "default_true")]
    pub truncate_on_start: bool,
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

impl GraphStoreConfig {
    pub fn edge_options(&self) -> EdgeLoadOptions {
        EdgeLoadOptions {
            chunk_size: self.edge_chunk_size,
            max_edges: self.max_edges,
            on_unresolved: self.on_unresolved,
        }
    }
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_graph_data_dir(),
            host: default_graph_host(),
            database: default_database(),
            username: default_username(),
            password: String::new(),
            batch_size: default_graph_batch_size(),
            rid_page_size: default_rid_page_size(),
            edge_chunk_size: default_edge_chunk_size(),
            feedback_chunk_size: default_feedback_chunk_size(),
            post_chunk_size: default_post_chunk_size(),
            post_batch_size: default_post_batch_size(),
            max_edges: None,
            on_unresolved: UnresolvedPolicy::default(),
            truncate_on_start: true,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_document_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOCUMENT_DATA_DIR)
}

fn default_graph_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_GRAPH_DATA_DIR)
}

fn default_document_host() -> String {
    DEFAULT_DOCUMENT_HOST.to_string()
}

fn default_graph_host() -> String {
    DEFAULT_GRAPH_HOST.to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_document_batch_size() -> usize {
    DEFAULT_DOCUMENT_BATCH_SIZE
}

fn default_graph_batch_size() -> usize {
    DEFAULT_GRAPH_BATCH_SIZE
}

fn default_rid_page_size() -> usize {
    DEFAULT_RID_PAGE_SIZE
}

fn default_edge_chunk_size() -> usize {
    DEFAULT_EDGE_CHUNK_SIZE
}

fn default_feedback_chunk_size() -> usize {
    DEFAULT_FEEDBACK_CHUNK_SIZE
}

fn default_post_chunk_size() -> usize {
    DEFAULT_POST_CHUNK_SIZE
}

fn default_post_batch_size() -> usize {
    DEFAULT_POST_BATCH_SIZE
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}
