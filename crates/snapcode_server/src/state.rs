use crate::ingest::Ingestor;
use snapcode_core::traits::{AssetStore, Notifier};

#[derive(Clone)]
pub struct AppState<S: AssetStore + Clone, N: Notifier + Clone> {
    pub ingestor: Ingestor<S, N>,
}
