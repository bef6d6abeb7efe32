pub mod edge_loader;
pub use edge_loader::{
    EdgeLoadOptions, EdgeLoader, EdgeReport, EdgeSpec, EndpointSpec, PendingEdge,
    UnresolvedPolicy,
};
pub mod orient_client;
pub use orient_client::GraphClient;
pub mod rid_resolver;
pub use rid_resolver::{RidMap, RidResolver};
pub mod script;
pub mod sink;
pub use sink::{GraphBatchSink, clear_class, execute_transactional};
