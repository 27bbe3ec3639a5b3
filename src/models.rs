use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalystStatus {
    Activo,
    Inactivo,
    #[default]
    Pendiente,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyst {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub status: AnalystStatus,
}

impl Analyst {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Body of analyst create/update calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAnalyst {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewAnalyst {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

/// One row of backend analytics data. The shape is owned by the backend, so
/// every accessor is lenient and never fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyticsRecord(pub Map<String, Value>);

impl AnalyticsRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Non-empty trimmed string value of `field`.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric value of `field`; numeric strings are accepted. Non-finite or
    /// missing values read as `None`.
    pub fn number(&self, field: &str) -> Option<f64> {
        let value = match self.0.get(field)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        parse_date(self.text(field)?)
    }
}

impl From<Value> for AnalyticsRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Some(date) = raw
        .get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
    {
        return Some(date);
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedCategory {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(default, alias = "probabilidad")]
    pub probability: f64,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    Alta,
    Media,
    Baja,
    #[serde(rename = "Muy Baja")]
    MuyBaja,
}

impl Priority {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.7 {
            Self::Alta
        } else if probability >= 0.5 {
            Self::Media
        } else if probability >= 0.3 {
            Self::Baja
        } else {
            Self::MuyBaja
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub client_id: i64,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub probability: f64,
    #[serde(default, alias = "productos_potenciales")]
    pub predicted_categories: Vec<PredictedCategory>,
    #[serde(default, alias = "tipo_cliente")]
    pub client_type: Option<String>,
    #[serde(default, alias = "categoria")]
    pub category: Option<String>,
    #[serde(default, alias = "comercial")]
    pub commercial: Option<String>,
    #[serde(default)]
    pub is_simulated: bool,
}

impl Recommendation {
    pub fn priority(&self) -> Priority {
        Priority::from_probability(self.probability)
    }

    /// Clamps the probability into `[0, 1]`; NaN becomes zero. Backend labels
    /// such as `"N/A"` are dropped so that they count as missing.
    pub fn normalized(mut self) -> Self {
        self.probability = if self.probability.is_nan() {
            0.0
        } else {
            self.probability.clamp(0.0, 1.0)
        };
        for field in [&mut self.client_type, &mut self.category, &mut self.commercial] {
            if field
                .as_deref()
                .is_some_and(|v| v.trim().is_empty() || v.trim() == "N/A")
            {
                *field = None;
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RecommendationQuery {
    pub limit: Option<u32>,
    pub min_probability: Option<f64>,
    pub comercial: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MlStatus {
    #[serde(default)]
    pub loaded: bool,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub training_date: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Value>,
    #[serde(default)]
    pub feature_importance: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    #[serde(default)]
    pub total_records: u64,
    #[serde(default)]
    pub total_venta: f64,
    #[serde(default)]
    pub average_venta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub summary: SummaryTotals,
    #[serde(default)]
    pub top_clientes: Vec<AnalyticsRecord>,
    #[serde(default)]
    pub top_comerciales: Vec<AnalyticsRecord>,
    #[serde(default)]
    pub top_categorias: Vec<AnalyticsRecord>,
}

/// Client analytics panels served under `/clients/analytics/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAnalytics {
    SegmentationStacked,
    FrequencyScatter,
    AcquisitionTrend,
    MostProfitable,
    DashboardSummary,
}

impl ClientAnalytics {
    pub fn path(self) -> &'static str {
        match self {
            Self::SegmentationStacked => "/clients/analytics/segmentation-stacked",
            Self::FrequencyScatter => "/clients/analytics/frequency-scatter",
            Self::AcquisitionTrend => "/clients/analytics/acquisition-trend",
            Self::MostProfitable => "/clients/analytics/most-profitable",
            Self::DashboardSummary => "/clients/analytics/dashboard-summary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGroup {
    pub key: String,
    pub total: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: String,
    pub count: u64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub value: f64,
    pub moving_average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParetoBand {
    #[serde(rename = "Top 80%")]
    Top80,
    #[serde(rename = "Medio 15%")]
    Middle15,
    #[serde(rename = "Bottom 5%")]
    Bottom5,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoEntry {
    pub rank: usize,
    pub label: String,
    pub value: f64,
    pub share: f64,
    pub cumulative_share: f64,
    pub band: ParetoBand,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParetoReport {
    pub entries: Vec<ParetoEntry>,
    pub total: f64,
    /// Smallest number of leading entries whose cumulative share reaches 80%.
    pub vital_few: usize,
}

/// Headline numbers for the loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetStats {
    pub total_records: usize,
    pub total_clients: usize,
    pub total_products: usize,
    pub total_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadDetails {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub total_rows: u64,
    #[serde(default)]
    pub processed_rows: u64,
    #[serde(default)]
    pub saved_rows: u64,
    #[serde(default)]
    pub errors_count: u64,
    #[serde(default)]
    pub columns_found: Vec<String>,
}

/// Backend answer to a CSV upload. Row-level problems arrive in `errors`
/// while the upload as a whole still succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: UploadDetails,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
