use crate::envelope;
use crate::errors::{ServiceError, ServiceResult};
use crate::models::{Analyst, NewAnalyst};
use crate::state::ApiContext;
use serde_json::Value;
use tracing::info;
use validator::ValidateEmail;

/// Analyst accounts must belong to the organization's mail domain.
pub const ANALYST_EMAIL_DOMAIN: &str = "@anders.com";

const ANALYSTS_PATH: &str = "/users/analysts";

/// Admin-side CRUD over analyst accounts.
pub struct AnalystService<'a> {
    ctx: &'a ApiContext,
}

impl<'a> AnalystService<'a> {
    pub fn new(ctx: &'a ApiContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Analyst>> {
        let value = self.ctx.authed_get(ANALYSTS_PATH, &[]).await?.into_value();
        let key = if value.get("analysts").is_none() && value.get("data").is_some() {
            "data"
        } else {
            "analysts"
        };
        envelope::list(value, key)
    }

    /// Not idempotent; never retried automatically.
    pub async fn create(&self, analyst: &NewAnalyst) -> ServiceResult<Analyst> {
        let analyst = validate_analyst(analyst)?;
        let body = self
            .ctx
            .authed_post(ANALYSTS_PATH, to_value(&analyst)?)
            .await?;
        let created: Analyst = envelope::object(body.into_value(), "analyst")?;
        info!("created analyst {} ({})", created.id, created.email);
        Ok(created)
    }

    pub async fn update(&self, id: i64, analyst: &NewAnalyst) -> ServiceResult<Analyst> {
        let analyst = validate_analyst(analyst)?;
        let body = self
            .ctx
            .authed_put(&format!("{ANALYSTS_PATH}/{id}"), to_value(&analyst)?)
            .await?;
        envelope::object(body.into_value(), "analyst")
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let body = self
            .ctx
            .authed_delete(&format!("{ANALYSTS_PATH}/{id}"))
            .await?;
        envelope::ensure_success(&body.into_value())?;
        info!("deleted analyst {id}");
        Ok(())
    }
}

fn to_value(analyst: &NewAnalyst) -> ServiceResult<Value> {
    serde_json::to_value(analyst).map_err(|err| ServiceError::Decode(err.to_string()))
}

/// Trims every field and checks names and the organizational email domain.
pub fn validate_analyst(analyst: &NewAnalyst) -> ServiceResult<NewAnalyst> {
    let cleaned = NewAnalyst::new(
        analyst.first_name.trim(),
        analyst.last_name.trim(),
        analyst.email.trim().to_lowercase(),
    );
    if cleaned.first_name.is_empty() || cleaned.last_name.is_empty() {
        return Err(ServiceError::validation("first and last name are required"));
    }
    validate_email(&cleaned.email)?;
    if !cleaned.email.ends_with(ANALYST_EMAIL_DOMAIN) {
        return Err(ServiceError::validation(format!(
            "analyst email must end with {ANALYST_EMAIL_DOMAIN}"
        )));
    }
    Ok(cleaned)
}

pub fn validate_email(email: &str) -> ServiceResult<()> {
    if email.to_string().validate_email() {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "invalid email address: {email}"
        )))
    }
}
