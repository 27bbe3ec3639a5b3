use crate::analysts::AnalystService;
use crate::analytics::AnalyticsService;
use crate::auth::AuthService;
use crate::config::ClientConfig;
use crate::errors::{ApiError, ServiceError, ServiceResult};
use crate::http::{Body, HttpClient};
use crate::session::SessionStore;
use crate::storage::{FileStorage, SessionStorage};
use crate::system::SystemService;
use crate::upload::UploadService;
use reqwest::multipart::Form;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// Shared handle over the backend: HTTP wrapper plus the session store.
#[derive(Clone)]
pub struct ApiContext {
    pub http: HttpClient,
    pub session: SessionStore,
}

impl ApiContext {
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            session: SessionStore::new(storage),
        })
    }

    /// Context whose session lives in the JSON file named by the config.
    pub fn with_file_storage(config: &ClientConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(FileStorage::open(config.session_path.clone()));
        Self::new(config, storage)
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self)
    }

    pub fn analysts(&self) -> AnalystService<'_> {
        AnalystService::new(self)
    }

    pub fn analytics(&self) -> AnalyticsService<'_> {
        AnalyticsService::new(self)
    }

    pub fn uploads(&self) -> UploadService<'_> {
        UploadService::new(self)
    }

    pub fn system(&self) -> SystemService<'_> {
        SystemService::new(self)
    }

    pub(crate) async fn authed_get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ServiceResult<Body> {
        let result = self.http.get(path, query, self.session.token()).await;
        self.settle(result)
    }

    pub(crate) async fn authed_post(&self, path: &str, body: Value) -> ServiceResult<Body> {
        let result = self.http.post(path, body, self.session.token()).await;
        self.settle(result)
    }

    pub(crate) async fn authed_put(&self, path: &str, body: Value) -> ServiceResult<Body> {
        let result = self.http.put(path, body, self.session.token()).await;
        self.settle(result)
    }

    pub(crate) async fn authed_multipart(
        &self,
        path: &str,
        query: &[(&str, String)],
        form: Form,
    ) -> ServiceResult<Body> {
        let result = self
            .http
            .post_multipart(path, query, form, self.session.token())
            .await;
        self.settle(result)
    }

    pub(crate) async fn authed_delete(&self, path: &str) -> ServiceResult<Body> {
        let result = self.http.delete(path, self.session.token()).await;
        self.settle(result)
    }

    /// A 401 on an authenticated call ends the session.
    fn settle(&self, result: Result<Body, ApiError>) -> ServiceResult<Body> {
        result.map_err(|err| {
            if err.is_unauthorized() {
                warn!("backend rejected the session token, logging out");
                if let Err(storage_err) = self.session.clear() {
                    error!("failed to drop the rejected session: {storage_err}");
                }
            }
            ServiceError::from(err)
        })
    }
}
