pub mod api;
pub mod config;
pub mod ords;
pub mod storage;

use config::Config;

use crate::api::error::ApiError;
use crate::ords::{OrdsClient, OrdsError};
use crate::storage::ObjectStorage;

pub struct AppState {
    pub config: Config,
    ords: Option<OrdsClient>,
    storage: Option<ObjectStorage>,
}

impl AppState {
    pub fn new(config: Config, ords: Option<OrdsClient>, storage: Option<ObjectStorage>) -> Self {
        Self {
            config,
            ords,
            storage,
        }
    }

    /// The ORDS client, or a 500 config error when no base URL is set.
    pub fn ords(&self) -> Result<&OrdsClient, ApiError> {
        self.ords.as_ref().ok_or_else(|| OrdsError::NotConfigured.into())
    }

    /// The object-storage handle, or a 500 config error when unset.
    pub fn storage(&self) -> Result<&ObjectStorage, ApiError> {
        self.storage.as_ref().ok_or_else(|| {
            tracing::error!("Object storage is not configured");
            ApiError::internal("El almacenamiento de archivos no está configurado")
        })
    }
}
