// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, session::SessionStore, store::CatalogStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub sessions: SessionStore,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, config: Config) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            config,
        }
    }
}

impl FromRef<AppState> for Arc<dyn CatalogStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
