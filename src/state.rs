use crate::{config::Config, database::Store};

/// Shared by every worker thread through `web::Data`.
pub struct AppState {
    pub store: Store,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        Self { store, config }
    }
}
