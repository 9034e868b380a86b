use crate::backend::SearchBackend;
use crate::cli::CommandLineArgs;
use crate::dispatcher::QueryDispatcher;
use crate::elasticsearch::ElasticsearchClient;
use crate::error::QueryError;
use crate::query::QuerySettings;

use std::sync::Arc;

/// Shared application state passed to each query request handler.
pub struct AppState {
    /// Query dispatcher.
    pub dispatcher: QueryDispatcher,
}

impl AppState {
    /// Create and return an [AppState] backed by the Elasticsearch cluster named in `args`.
    pub fn new(args: &CommandLineArgs) -> Result<Self, QueryError> {
        let backend = ElasticsearchClient::from_args(args)?;
        tracing::info!("Using search backend at {}", args.elasticsearch_url);
        Ok(Self::with_backend(args, Arc::new(backend)))
    }

    /// Create and return an [AppState] using the given search backend.
    pub fn with_backend(args: &CommandLineArgs, backend: Arc<dyn SearchBackend>) -> Self {
        let settings = QuerySettings {
            file_index: args.file_index.clone(),
            directory_index: args.directory_index.clone(),
            page_size: args.page_size,
        };
        Self {
            dispatcher: QueryDispatcher::new(backend, settings),
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
