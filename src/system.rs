use crate::errors::ServiceResult;
use crate::models::HealthStatus;
use crate::state::ApiContext;
use serde_json::Value;
use tracing::warn;

/// Connectivity checks. Neither call needs a session, so neither touches it.
pub struct SystemService<'a> {
    ctx: &'a ApiContext,
}

impl<'a> SystemService<'a> {
    pub fn new(ctx: &'a ApiContext) -> Self {
        Self { ctx }
    }

    /// Connection test against the backend root. Returns its greeting.
    pub async fn ping(&self) -> ServiceResult<String> {
        let value = self.ctx.http.get("/", &[], None).await?.into_value();
        Ok(match value {
            Value::String(text) => text,
            other => other
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// The backend answers 200 even when its database is down; check
    /// `is_ok` on the result.
    pub async fn health(&self) -> ServiceResult<HealthStatus> {
        let body = self.ctx.http.get("/health", &[], None).await?;
        let status: HealthStatus = body.json()?;
        if !status.is_ok() {
            warn!(
                "backend unhealthy: database {}",
                status.database.as_deref().unwrap_or("unknown")
            );
        }
        Ok(status)
    }
}
