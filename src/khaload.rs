use crate::config::{ConfigLoader, KhaloadConfig};
use crate::error::ConstructionError;
use crate::load::document::DocumentClient;
use crate::load::graph::GraphClient;
use crate::pipeline::{DocumentPipeline, GraphPipeline, RunSummary};
use log::info;
use std::path::Path;
use strum_macros::{Display, EnumString};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    Document,
    Graph,
}

/// Reads and validates the settings. Without a file the built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<KhaloadConfig, ConstructionError> {
    let config: KhaloadConfig = match path {
        Some(path) if !path.exists() => {
            return Err(ConstructionError::NoConfigFileFound(path.to_path_buf()));
        }
        Some(path) => {
            info!("Reading settings from {path:?}.");
            ConfigLoader::load(path.to_path_buf())?
        }
        None => KhaloadConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Connects to the selected backend and runs all of its loaders.
pub fn run(backend: Backend, config: &KhaloadConfig) -> Result<RunSummary, ConstructionError> {
    info!("Starting the {backend} load.");
    let summary = match backend {
        Backend::Document => {
            let client = DocumentClient::from_config(&config.document)?;
            DocumentPipeline::new(&client, &config.document).run()
        }
        Backend::Graph => {
            let client = GraphClient::from_config(&config.graph)?;
            GraphPipeline::new(&client, &config.graph).run()
        }
    };
    Ok(summary)
}
