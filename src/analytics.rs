use crate::envelope;
use crate::errors::ServiceResult;
use crate::models::{
    AnalyticsRecord, AnalyticsSummary, ClientAnalytics, MlStatus, ModelPerformance,
    Recommendation, RecommendationQuery,
};
use crate::state::ApiContext;
use serde_json::Value;

/// Read-only analytics fetchers. Nothing here is cached; every call goes to
/// the backend.
pub struct AnalyticsService<'a> {
    ctx: &'a ApiContext,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(ctx: &'a ApiContext) -> Self {
        Self { ctx }
    }

    pub async fn client_data(
        &self,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<Vec<AnalyticsRecord>> {
        let params = [("limit", limit.to_string()), ("offset", offset.to_string())];
        let body = self.ctx.authed_get("/client-data", &params).await?;
        envelope::list(body.into_value(), "data")
    }

    pub async fn summary(&self) -> ServiceResult<AnalyticsSummary> {
        let body = self.ctx.authed_get("/analytics/summary", &[]).await?;
        envelope::object(body.into_value(), "analytics")
    }

    /// An unloaded model is a valid status, not a failure.
    pub async fn ml_status(&self) -> ServiceResult<MlStatus> {
        let body = self.ctx.authed_get("/ml/status", &[]).await?;
        let value = body.into_value();
        envelope::ensure_success(&value)?;
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        let info = value.get("model_info").cloned().unwrap_or(value);
        let mut status: MlStatus = envelope::object(info, "model_info")?;
        if status.message.is_none() {
            status.message = message;
        }
        Ok(status)
    }

    pub async fn cross_sell_recommendations(
        &self,
        query: &RecommendationQuery,
    ) -> ServiceResult<Vec<Recommendation>> {
        let body = self
            .ctx
            .authed_get("/ml/cross-sell-recommendations", &query_params(query))
            .await?;
        let recommendations: Vec<Recommendation> =
            envelope::list(body.into_value(), "recommendations")?;
        Ok(recommendations
            .into_iter()
            .map(Recommendation::normalized)
            .collect())
    }

    pub async fn model_performance(&self) -> ServiceResult<ModelPerformance> {
        let body = self.ctx.authed_get("/ml/model-performance", &[]).await?;
        envelope::object(body.into_value(), "performance")
    }

    pub async fn client_analytics(
        &self,
        panel: ClientAnalytics,
    ) -> ServiceResult<Vec<AnalyticsRecord>> {
        let value = self.ctx.authed_get(panel.path(), &[]).await?.into_value();
        let is_list = value.is_array() || value.get("data").is_some_and(Value::is_array);
        if is_list {
            return envelope::list(value, "data");
        }
        envelope::ensure_success(&value)?;
        Ok(vec![AnalyticsRecord::from(value)])
    }
}

fn query_params(query: &RecommendationQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    if let Some(min) = query.min_probability {
        params.push(("min_probability", min.to_string()));
    }
    if let Some(comercial) = query.comercial.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        params.push(("comercial", comercial.to_string()));
    }
    params
}
