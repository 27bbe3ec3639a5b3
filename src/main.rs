use dashboard_client::{
    ApiContext, ClientConfig, ServiceResult,
    enrich::{DemoDataEnricher, NoEnrichment, RecommendationEnricher},
    models::{
        Analyst, AnalyticsRecord, DatasetStats, HealthStatus, MlStatus, ParetoReport,
        RankedGroup, Recommendation, RecommendationQuery, Role, TrendPoint,
    },
    panel::{PanelState, ViewScope},
    stats::{dataset_stats, group_and_rank, month_buckets, monthly_trend, pareto_by},
};
use serde::Serialize;
use std::env;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const TOP_N: usize = 10;
const CLIENT_DATA_LIMIT: u32 = 1000;

#[derive(Debug, Serialize)]
struct SalesViews {
    dataset: DatasetStats,
    top_products: Vec<RankedGroup>,
    top_executives: Vec<RankedGroup>,
    monthly_sales: Vec<TrendPoint>,
    product_pareto: ParetoReport,
}

#[derive(Debug, Serialize)]
struct DashboardReport {
    user: Option<String>,
    backend: PanelState<HealthStatus>,
    sales: PanelState<SalesViews>,
    ml_status: PanelState<MlStatus>,
    recommendations: PanelState<Vec<Recommendation>>,
    analysts: Option<PanelState<Vec<Analyst>>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    info!("using backend {}", config.base_url);
    let ctx = ApiContext::with_file_storage(&config)?;

    let credentials = (env::var("DASHBOARD_EMAIL"), env::var("DASHBOARD_PASSWORD"));
    if let (Ok(email), Ok(password)) = credentials {
        if let Err(err) = ctx.auth().login(&email, &password).await {
            error!("login failed: {err}");
            return Err(err.into());
        }
    } else if !ctx.auth().is_authenticated() {
        warn!("no stored session and no DASHBOARD_EMAIL/DASHBOARD_PASSWORD set");
    }

    if let Ok(path) = env::var("DASHBOARD_UPLOAD_CSV") {
        match ctx.uploads().upload_file(Path::new(&path), true).await {
            Ok(receipt) => info!("{}", receipt.message),
            Err(err) => {
                error!("upload of {path} failed: {err}");
                return Err(err.into());
            }
        }
    }

    let enricher: Box<dyn RecommendationEnricher> = match env::var("DASHBOARD_DEMO_DATA") {
        Ok(raw) => {
            let seed = DemoDataEnricher::parse_seed(&raw);
            Box::new(DemoDataEnricher::new(seed).with_limit(48))
        }
        Err(_) => Box::new(NoEnrichment),
    };

    let report = build_report(&ctx, enricher.as_ref()).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn build_report(
    ctx: &ApiContext,
    enricher: &dyn RecommendationEnricher,
) -> DashboardReport {
    let scope = ViewScope::new();
    let user = ctx.auth().current_user();
    let is_admin = user.as_ref().is_some_and(|u| u.role == Role::Admin);

    let query = RecommendationQuery {
        limit: Some(200),
        min_probability: Some(0.3),
        comercial: env::var("DASHBOARD_COMERCIAL").ok(),
    };

    let analytics = ctx.analytics();
    let system = ctx.system();
    let (backend, sales, ml_status, recommendations, analysts) = tokio::join!(
        scope.load(system.health()),
        scope.load(sales_views(ctx)),
        scope.load(analytics.ml_status()),
        scope.load(analytics.cross_sell_recommendations(&query)),
        async {
            if is_admin {
                scope.load(ctx.analysts().list()).await
            } else {
                None
            }
        },
    );

    DashboardReport {
        user: user.map(|u| u.email),
        backend: backend.unwrap_or(PanelState::Loading),
        sales: sales.unwrap_or(PanelState::Loading),
        ml_status: ml_status.unwrap_or(PanelState::Loading),
        recommendations: recommendations
            .unwrap_or(PanelState::Loading)
            .map(|recs| enricher.enrich(recs)),
        analysts,
    }
}

async fn sales_views(ctx: &ApiContext) -> ServiceResult<SalesViews> {
    let records: Vec<AnalyticsRecord> =
        ctx.analytics().client_data(CLIENT_DATA_LIMIT, 0).await?;
    let buckets = month_buckets(&records, "fecha", Some("venta"));
    Ok(SalesViews {
        dataset: dataset_stats(&records, "client_name", "product", "value"),
        top_products: group_and_rank(&records, "product", "value", TOP_N),
        top_executives: group_and_rank(&records, "comercial", "venta", TOP_N),
        monthly_sales: monthly_trend(&buckets, true),
        product_pareto: pareto_by(&records, "product", "value"),
    })
}
