use std::sync::Arc;

use mongodb::{Client, Database};

use crate::core::config::Settings;

/// Process-wide handle: created once at start, shared read-only, closed once at exit.
#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    client: Client,
    db: Database,
}

impl AppState {
    pub(crate) fn new(settings: Settings, client: Client) -> Self {
        let db = client.database(settings.database().name());
        Self { inner: Arc::new(InnerState { settings, client, db }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &Database {
        &self.inner.db
    }

    pub(crate) async fn close(self) {
        self.inner.client.clone().shutdown().await;
        tracing::info!("Database connection closed");
    }
}
