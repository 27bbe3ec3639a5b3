use crate::errors::ServiceResult;
use serde::Serialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Load state of one dashboard panel. Each panel owns its own state so a
/// failing panel never blocks the others.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum PanelState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> PanelState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PanelState::Ready(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PanelState<U> {
        match self {
            PanelState::Loading => PanelState::Loading,
            PanelState::Ready(value) => PanelState::Ready(f(value)),
            PanelState::Failed(message) => PanelState::Failed(message),
        }
    }
}

impl<T> From<ServiceResult<T>> for PanelState<T> {
    fn from(result: ServiceResult<T>) -> Self {
        match result {
            Ok(value) => PanelState::Ready(value),
            Err(err) => PanelState::Failed(err.to_string()),
        }
    }
}

/// Lifetime of one mounted view. Leaving the view cancels the scope and any
/// response still in flight is dropped instead of being applied.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leave(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// `None` when the view was left before the request settled.
    pub async fn load<T, F>(&self, request: F) -> Option<PanelState<T>>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("view left, dropping in-flight panel request");
                None
            }
            result = request => {
                if self.token.is_cancelled() {
                    None
                } else {
                    Some(PanelState::from(result))
                }
            }
        }
    }
}
