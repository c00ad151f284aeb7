use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{
    config::Config,
    registration::TeamIdGenerator,
    sheet::{RowStore, fallback::FallbackWriter},
};

/// Everything the handlers share. Cloned per request, so all members are
/// cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RowStore>,
    pub fallback: Arc<FallbackWriter>,
    pub team_ids: Arc<TeamIdGenerator>,
    key: Key,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn RowStore>) -> Self {
        let key = Key::derive_from(config.secret_key.as_bytes());
        let fallback =
            Arc::new(FallbackWriter::new(config.fallback_file.clone()));

        AppState {
            config: Arc::new(config),
            store,
            fallback,
            team_ids: Arc::new(TeamIdGenerator::default()),
            key,
        }
    }
}

// Lets `PrivateCookieJar` find the signing key.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}
