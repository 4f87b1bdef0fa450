use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;
use url::Url;
use usulan_dal::Pool;
use usulan_store::{StorePrefix, file_store::FileStore};

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

// Empty garde validation context uses the unit type; axum-valid's `Garde`
// extractor pulls the context out of the router state via `FromRef`.
impl FromRef<AppState> for () {
    fn from_ref(_: &AppState) -> Self {}
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool, store: FileStore) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                app_config,
                pool,
                store,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn store(&self) -> &FileStore {
        &self.state.store
    }
}

struct AppStateInner {
    pool: Pool,
    store: FileStore,
    app_config: AppConfig,
}

pub struct AppConfig {
    /// base URL of the server as visible to clients
    pub base_url: Url,
    pub file_store_path: PathBuf,
    pub default_page_size: u32,
    pub upload_limit_kb: usize,
}

impl AppConfig {
    /// External form of a stored image key.
    pub fn image_url(&self, key: &str) -> String {
        format!(
            "{}/storage/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            StorePrefix::Usulans.as_str(),
            key
        )
    }
}
