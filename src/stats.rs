use crate::models::{
    AnalyticsRecord, DatasetStats, MonthBucket, ParetoBand, ParetoEntry, ParetoReport,
    RankedGroup, TrendPoint,
};
use chrono::Datelike;
use std::collections::{BTreeMap, HashSet};

pub const MONTH_WINDOW: usize = 12;
pub const MOVING_AVERAGE_PERIODS: usize = 3;
pub const PARETO_THRESHOLD: f64 = 80.0;

/// Groups by `key_field`, sums `value_field` and keeps the `top_n` largest
/// groups. Equal totals keep first-seen order. Records without a key are
/// skipped; missing values count as zero.
pub fn group_and_rank(
    records: &[AnalyticsRecord],
    key_field: &str,
    value_field: &str,
    top_n: usize,
) -> Vec<RankedGroup> {
    let mut groups: Vec<RankedGroup> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();

    for record in records {
        let Some(key) = record.text(key_field) else {
            continue;
        };
        let value = record.number(value_field).unwrap_or(0.0);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(RankedGroup {
                key: key.to_string(),
                total: 0.0,
                count: 0,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.total += value;
        group.count = group.count.saturating_add(1);
    }

    groups.sort_by(|a, b| b.total.total_cmp(&a.total));
    groups.truncate(top_n);
    groups
}

/// `YYYY-MM` buckets over `date_field`, oldest first, last twelve only.
/// Months without records are absent rather than zero-filled.
pub fn month_buckets(
    records: &[AnalyticsRecord],
    date_field: &str,
    value_field: Option<&str>,
) -> Vec<MonthBucket> {
    let mut buckets: BTreeMap<String, MonthBucket> = BTreeMap::new();

    for record in records {
        let Some(date) = record.date(date_field) else {
            continue;
        };
        let label = month_label(date);
        let bucket = buckets.entry(label.clone()).or_insert_with(|| MonthBucket {
            month: label,
            count: 0,
            total: 0.0,
        });
        bucket.count = bucket.count.saturating_add(1);
        if let Some(field) = value_field {
            bucket.total += record.number(field).unwrap_or(0.0);
        }
    }

    let skip = buckets.len().saturating_sub(MONTH_WINDOW);
    buckets.into_values().skip(skip).collect()
}

/// Trailing average over three periods. The first two entries lack history
/// and repeat their own value.
pub fn moving_average(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            if i + 1 < MOVING_AVERAGE_PERIODS {
                *value
            } else {
                let window = &values[i + 1 - MOVING_AVERAGE_PERIODS..=i];
                window.iter().sum::<f64>() / MOVING_AVERAGE_PERIODS as f64
            }
        })
        .collect()
}

/// Month buckets paired with their moving average. Uses the summed value when
/// `use_totals` is set, the record count otherwise.
pub fn monthly_trend(buckets: &[MonthBucket], use_totals: bool) -> Vec<TrendPoint> {
    let values: Vec<f64> = buckets
        .iter()
        .map(|b| if use_totals { b.total } else { b.count as f64 })
        .collect();
    let averages = moving_average(&values);

    buckets
        .iter()
        .zip(values)
        .zip(averages)
        .map(|((bucket, value), moving_average)| TrendPoint {
            month: bucket.month.clone(),
            value,
            moving_average,
        })
        .collect()
}

/// Ranks items by value and tracks their cumulative share of the total.
/// Non-positive and non-finite values are left out.
pub fn pareto<I, S>(items: I) -> ParetoReport
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    let mut items: Vec<(String, f64)> = items
        .into_iter()
        .map(|(label, value)| (label.into(), value))
        .filter(|(_, value)| value.is_finite() && *value > 0.0)
        .collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total: f64 = items.iter().map(|(_, value)| value).sum();
    if items.is_empty() {
        return ParetoReport::default();
    }

    let last = items.len() - 1;
    let mut running = 0.0;
    let mut vital_few = 0;
    let entries: Vec<ParetoEntry> = items
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            running += value;
            let cumulative_share = if i == last {
                100.0
            } else {
                (running * 100.0 / total).min(100.0)
            };
            if vital_few == 0 && cumulative_share >= PARETO_THRESHOLD {
                vital_few = i + 1;
            }
            ParetoEntry {
                rank: i + 1,
                label,
                value,
                share: value * 100.0 / total,
                cumulative_share,
                band: band(cumulative_share),
            }
        })
        .collect();

    ParetoReport {
        entries,
        total,
        vital_few,
    }
}

/// Pareto over grouped records, e.g. product sales.
pub fn pareto_by(
    records: &[AnalyticsRecord],
    key_field: &str,
    value_field: &str,
) -> ParetoReport {
    let groups = group_and_rank(records, key_field, value_field, usize::MAX);
    pareto(groups.into_iter().map(|g| (g.key, g.total)))
}

/// Record count, distinct clients and products, and the summed value.
/// Blank clients or products are not counted as a distinct entry.
pub fn dataset_stats(
    records: &[AnalyticsRecord],
    client_field: &str,
    product_field: &str,
    value_field: &str,
) -> DatasetStats {
    let mut clients = HashSet::new();
    let mut products = HashSet::new();
    let mut total_value = 0.0;

    for record in records {
        if let Some(client) = record.text(client_field) {
            clients.insert(client);
        }
        if let Some(product) = record.text(product_field) {
            products.insert(product);
        }
        total_value += record.number(value_field).unwrap_or(0.0);
    }

    DatasetStats {
        total_records: records.len(),
        total_clients: clients.len(),
        total_products: products.len(),
        total_value,
    }
}

fn band(cumulative_share: f64) -> ParetoBand {
    if cumulative_share <= PARETO_THRESHOLD {
        ParetoBand::Top80
    } else if cumulative_share <= 95.0 {
        ParetoBand::Middle15
    } else {
        ParetoBand::Bottom5
    }
}

fn month_label(date: chrono::NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
