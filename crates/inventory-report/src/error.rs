use models::inventory::{Guid, InventoryKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{kind} name `{name}` has no numeric position token")]
    MalformedName { kind: InventoryKind, name: String },

    #[error("duplicate guid `{0}` in inventory snapshot")]
    DuplicateGuid(Guid),

    #[error("fetching `{collection}`: {message}")]
    Fetch { collection: String, message: String },

    #[error("HTTP error: {context}: {source}")]
    Http {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("parsing YAML `{path}`: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("serializing JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot path `{}`: {message}", path.display())]
    IoPath {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("`{0}` was read before it was fetched")]
    NotFetched(String),

    #[error("connection to the inventory service is closed")]
    ConnectionClosed,

    #[error("loading configuration: {0}")]
    Config(#[from] report_config::ConfigError),

    #[error("no inventory source configured, pass --snapshot or --url")]
    MissingSource,
}

impl ReportError {
    pub(crate) fn fetch(collection: impl Into<String>, message: impl Into<String>) -> Self {
        ReportError::Fetch {
            collection: collection.into(),
            message: message.into(),
        }
    }
}
