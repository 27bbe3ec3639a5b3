//! Demo enrichment of incomplete recommendation payloads.
//!
//! The backend sometimes returns recommendations without a client type or
//! predicted categories. Dashboards still want something to render, so an
//! enricher may fill the gaps with simulated values. Every record it touches
//! carries `is_simulated = true`; real model output is never overwritten.

use crate::models::{PredictedCategory, Recommendation};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashSet;
use tracing::{debug, warn};

pub const CLIENT_TYPES: [&str; 12] = [
    "Fabricante pinturas",
    "Servicios químicos",
    "Servicios recubrimientos",
    "Fabricante químicos",
    "Distribuidor",
    "Servicios industriales",
    "Fabricante adhesivos",
    "Empresa construcción",
    "Servicios metalúrgicos",
    "Fabricante plásticos",
    "Servicios galvanoplastia",
    "Empresa minería",
];

const PAINT_CATEGORIES: [&str; 3] = ["Dispersiones acrílicas", "Pigmentos", "Coalescentes"];
const CHEMICAL_CATEGORIES: [&str; 3] = ["Solventes", "Tensoactivos", "Ácidos orgánicos"];
const INDUSTRIAL_CATEGORIES: [&str; 3] = ["Resinas", "Aditivos industriales", "Lubricantes"];

/// Relative strength of the 1st, 2nd and 3rd suggested category.
const CATEGORY_FACTORS: [f64; 3] = [0.93, 0.88, 0.85];

pub trait RecommendationEnricher: Send + Sync {
    fn enrich(&self, recommendations: Vec<Recommendation>) -> Vec<Recommendation>;
}

/// Leaves backend output untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

impl RecommendationEnricher for NoEnrichment {
    fn enrich(&self, recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
        recommendations
    }
}

/// Deterministic simulated enrichment: the same seed and input always give
/// the same output.
#[derive(Debug, Clone)]
pub struct DemoDataEnricher {
    seed: u64,
    filler_clients: Vec<String>,
    limit: Option<usize>,
}

impl DemoDataEnricher {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            filler_clients: Vec::new(),
            limit: None,
        }
    }

    /// Simulated clients appended after the real ones when not already present.
    pub fn with_filler_clients<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filler_clients = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Seed from a user-supplied string. Unparsable input falls back to 0
    /// with a warning.
    pub fn parse_seed(raw: &str) -> u64 {
        raw.trim().parse().unwrap_or_else(|err| {
            warn!("invalid demo data seed {raw:?}: {err}, using 0");
            0
        })
    }

    fn rng_for(&self, client_key: &str) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ fnv1a(client_key.as_bytes()))
    }

    fn fill(&self, mut rec: Recommendation, client_key: &str) -> Recommendation {
        let mut rng = self.rng_for(client_key);

        if rec.client_type.is_none() {
            rec.client_type = Some(CLIENT_TYPES[rng.gen_range(0..CLIENT_TYPES.len())].to_string());
            rec.is_simulated = true;
        }
        let client_type = rec.client_type.clone().unwrap_or_default();
        if rec.category.is_none() {
            rec.category = Some(category_for(&client_type).to_string());
            rec.is_simulated = true;
        }
        if rec.predicted_categories.is_empty() {
            rec.predicted_categories =
                simulated_categories(&client_type, rec.probability, &mut rng);
            rec.is_simulated = true;
        }
        rec
    }
}

impl RecommendationEnricher for DemoDataEnricher {
    fn enrich(&self, recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(recommendations.len() + self.filler_clients.len());

        for rec in recommendations {
            let key = client_key(&rec.client_name);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            out.push(self.fill(rec, &key));
        }

        for (index, name) in self.filler_clients.iter().enumerate() {
            let key = client_key(name);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            let mut rng = self.rng_for(&key);
            let filler = Recommendation {
                client_id: 1000 + index as i64,
                client_name: name.trim().to_string(),
                probability: 0.5 + rng.gen_range(0.0..0.4),
                predicted_categories: Vec::new(),
                client_type: None,
                category: None,
                commercial: None,
                is_simulated: true,
            };
            out.push(self.fill(filler, &key));
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        debug!(
            "enriched recommendations: {} total, {} simulated",
            out.len(),
            out.iter().filter(|r| r.is_simulated).count()
        );
        out
    }
}

fn client_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn category_for(client_type: &str) -> &'static str {
    let lower = client_type.to_lowercase();
    if lower.contains("pinturas") {
        "Pinturas"
    } else if lower.contains("químicos") {
        "Químicos"
    } else {
        "Industrial"
    }
}

fn simulated_categories(client_type: &str, base: f64, rng: &mut StdRng) -> Vec<PredictedCategory> {
    let names = match category_for(client_type) {
        "Pinturas" => PAINT_CATEGORIES,
        "Químicos" => CHEMICAL_CATEGORIES,
        _ => INDUSTRIAL_CATEGORIES,
    };
    let base = if base > 0.0 { base } else { 0.5 };
    let mut categories: Vec<PredictedCategory> = names
        .iter()
        .zip(CATEGORY_FACTORS)
        .map(|(name, factor)| {
            let jitter = rng.gen_range(0.97..=1.0);
            PredictedCategory {
                name: name.to_string(),
                probability: (base * factor * jitter).clamp(0.0, 1.0),
                weight: 0.0,
            }
        })
        .collect();

    let total: f64 = categories.iter().map(|c| c.probability).sum();
    for category in &mut categories {
        category.weight = if total > 0.0 {
            category.probability / total
        } else {
            0.0
        };
    }
    categories.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    categories
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(id: i64, name: &str) -> Recommendation {
        Recommendation {
            client_id: id,
            client_name: name.to_string(),
            probability: 0.8,
            predicted_categories: vec![PredictedCategory {
                name: "Resinas".to_string(),
                probability: 0.8,
                weight: 1.0,
            }],
            client_type: Some("Distribuidor".to_string()),
            category: Some("Industrial".to_string()),
            commercial: Some("Juan Pérez".to_string()),
            is_simulated: false,
        }
    }

    #[test]
    fn complete_records_are_not_marked_simulated() {
        let input = vec![real(1, "ACME S.A.")];
        let out = DemoDataEnricher::new(7).enrich(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn gaps_are_filled_and_flagged() {
        let mut partial = real(2, "TEKNO QUIMICA PERU S.A.C.");
        partial.client_type = None;
        partial.predicted_categories.clear();
        let out = DemoDataEnricher::new(7).enrich(vec![partial]);
        assert_eq!(out.len(), 1);
        let rec = &out[0];
        assert!(rec.is_simulated);
        assert!(CLIENT_TYPES.contains(&rec.client_type.as_deref().unwrap()));
        assert_eq!(rec.predicted_categories.len(), 3);
        let weights: f64 = rec.predicted_categories.iter().map(|c| c.weight).sum();
        assert!((weights - 1.0).abs() < 1e-9);
        assert!(
            rec.predicted_categories
                .windows(2)
                .all(|w| w[0].probability >= w[1].probability)
        );
    }

    #[test]
    fn output_is_deterministic_per_seed() {
        let mut partial = real(3, "AJ PACK S.A.C.");
        partial.client_type = None;
        partial.predicted_categories.clear();
        let enricher = DemoDataEnricher::new(42).with_filler_clients(["QUIMICA SUIZA S.A."]);
        let first = enricher.enrich(vec![partial.clone()]);
        let second = enricher.enrich(vec![partial]);
        assert_eq!(first, second);
    }

    #[test]
    fn duplicates_collapse_and_fillers_respect_limit() {
        let enricher = DemoDataEnricher::new(1)
            .with_filler_clients(["acme s.a.", "AJ PACK S.A.C.", "ANTO GROUP S.A.C."])
            .with_limit(2);
        let out = enricher.enrich(vec![real(1, "ACME S.A."), real(9, " acme s.a. ")]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].client_id, 1);
        assert_eq!(out[1].client_name, "AJ PACK S.A.C.");
        assert!(out[1].is_simulated);
        assert!((0.5..0.9).contains(&out[1].probability));
    }

    #[test]
    fn seed_parsing_falls_back_to_zero() {
        assert_eq!(DemoDataEnricher::parse_seed(" 42 "), 42);
        assert_eq!(DemoDataEnricher::parse_seed("demo"), 0);
        assert_eq!(DemoDataEnricher::parse_seed(""), 0);
    }

    #[test]
    fn no_enrichment_passes_through() {
        let input = vec![real(1, "A"), real(1, "A")];
        assert_eq!(NoEnrichment.enrich(input.clone()), input);
    }
}
