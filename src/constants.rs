pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // Date only
    "%Y.%m.%d", // Date only
    "%m/%d/%Y", // US date format
    "%d-%m-%Y", // European date format
    "%d.%m.%Y", // European date format
];

pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",         // e.g., 2025-09-04 11:00:59
    "%Y-%m-%dT%H:%M:%S",         // e.g., 2025-09-04T11:00:59
    "%Y-%m-%d %H:%M:%S%.f",      // With fractional seconds
    "%Y-%m-%dT%H:%M:%S%.f",      // With fractional seconds
    "%Y-%m-%dT%H:%M:%S%.f%z",    // e.g., 2010-03-24T05:41:24.373+0000
    "%a, %d %b %Y %H:%M:%S GMT", // RFC 822 format
    "%+",                        // RFC 3339 / ISO 8601 format
];

/// Every coerced date/datetime is written back in this shape.
pub const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Orders placed on or after this day belong to the post-pandemic fragment.
pub const PANDEMIC_CUTOFF: &str = "2020-03-11";

pub const DEFAULT_DOCUMENT_DATA_DIR: &str = "/home/khabench/Desktop/test/data/Global";
pub const DEFAULT_GRAPH_DATA_DIR: &str = "/home/khabench/Desktop/test/Dataset";

pub const DEFAULT_DOCUMENT_HOST: &str = "http://127.0.0.1:7101";
pub const DEFAULT_GRAPH_HOST: &str = "http://localhost:2480";
pub const DEFAULT_DATABASE: &str = "KhaBench";
pub const DEFAULT_USERNAME: &str = "root";

pub const DEFAULT_DOCUMENT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_GRAPH_BATCH_SIZE: usize = 5000;
pub const DEFAULT_RID_PAGE_SIZE: usize = 50000;
pub const DEFAULT_EDGE_CHUNK_SIZE: usize = 10000;
pub const DEFAULT_FEEDBACK_CHUNK_SIZE: usize = 5000;
pub const DEFAULT_POST_CHUNK_SIZE: usize = 100000;
pub const DEFAULT_POST_BATCH_SIZE: usize = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_REVIEW: &str = "No review provided";
