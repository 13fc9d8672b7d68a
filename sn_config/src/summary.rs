use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::ApiLimits;
use crate::normalize::resolve_rpm;
use crate::normalize::rpm_to_rps;

/// Normalised quota for one endpoint class
///
/// `rpm`/`rps` are absent when the provider declared nothing usable; `extra` carries any raw
/// fields kept for display (provider name, daily quota, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Endpoint {
    pub rpm: Option<f64>,
    pub rps: Option<f64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Endpoint {
    /// Endpoint from a per-minute figure, with the per-second rate derived from it
    pub fn from_rpm(rpm: Option<f64>) -> Self {
        Self { rpm, rps: rpm_to_rps(rpm), extra: BTreeMap::new() }
    }

    /// Endpoint with no normalised rate, keeping every raw field of `raw`
    pub fn passthrough<T: Serialize>(raw: &T) -> Self {
        let extra = match serde_json::to_value(raw) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => BTreeMap::new(),
        };
        Self { rpm: None, rps: None, extra }
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// A provider is either a single endpoint or a set of named endpoint classes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderSummary {
    Flat(Endpoint),
    Grouped(BTreeMap<String, Endpoint>),
}

/// Provider name -> normalised quotas, recomputed on demand from [`ApiLimits`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LimitSummary {
    providers: BTreeMap<String, ProviderSummary>,
}

impl LimitSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: impl Into<String>, summary: ProviderSummary) -> Option<ProviderSummary> {
        self.providers.insert(provider.into(), summary)
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderSummary> {
        self.providers.get(name)
    }

    /// Resolve a dotted key such as `binance.futures` or `fred`
    ///
    /// Any segment that does not exist resolves to `None`; lookups never fail.
    pub fn lookup(&self, key: &str) -> Option<&Endpoint> {
        let mut segments = key.split('.');
        let provider = self.providers.get(segments.next()?)?;

        match (provider, segments.next(), segments.next()) {
            (ProviderSummary::Flat(endpoint), None, _) => Some(endpoint),
            (ProviderSummary::Grouped(classes), Some(class), None) => classes.get(class),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderSummary)> {
        self.providers.iter().map(|(name, summary)| (name.as_str(), summary))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn int_rpm(v: Option<i64>) -> Option<f64> {
    v.map(|v| v as f64)
}

/// Build the normalised summary for every declared provider
///
/// Binance, FRED, Yahoo and Newsdata get `rpm`/`rps`. Telegram, NewsAPI and GNews quotas are not
/// expressed per minute and are passed through raw, so a limiter configured from them falls back
/// to its default rate.
pub fn summarize_limits(api: &ApiLimits) -> LimitSummary {
    let mut out = LimitSummary::new();

    if let Some(binance) = &api.binance {
        let mut classes = BTreeMap::new();
        if let Some(spot) = &binance.spot {
            classes.insert("spot".to_string(), Endpoint::from_rpm(int_rpm(spot.requests_per_min)));
        }
        if let Some(futures) = &binance.futures {
            let mut endpoint = Endpoint::from_rpm(int_rpm(futures.requests_per_min));
            if let Some(orders) = futures.orders_per_min {
                endpoint = endpoint.with_extra("orders_per_min", orders);
            }
            classes.insert("futures".to_string(), endpoint);
        }
        out.insert("binance", ProviderSummary::Grouped(classes));
    }

    if let Some(telegram) = &api.telegram {
        out.insert("telegram", ProviderSummary::Flat(Endpoint::passthrough(telegram)));
    }

    if let Some(newsapi) = &api.newsapi {
        out.insert("newsapi", ProviderSummary::Flat(Endpoint::passthrough(newsapi)));
    }

    if let Some(gnews) = &api.gnews {
        out.insert("gnews", ProviderSummary::Flat(Endpoint::passthrough(gnews)));
    }

    if let Some(fred) = &api.fred {
        out.insert("fred", ProviderSummary::Flat(Endpoint::from_rpm(int_rpm(fred.requests_per_min))));
    }

    if let Some(yahoo) = &api.yahoo_provider {
        let endpoint = Endpoint::from_rpm(int_rpm(yahoo.requests_per_min))
            .with_extra("name", yahoo.name.clone())
            .with_extra("per_day", yahoo.requests_per_day);
        out.insert("yahoo_provider", ProviderSummary::Flat(endpoint));
    }

    if let Some(newsdata) = &api.newsdata {
        let rpm = resolve_rpm(newsdata.requests_per_min, int_rpm(newsdata.requests_per_15min));
        out.insert("newsdata", ProviderSummary::Flat(Endpoint::from_rpm(rpm)));
    }

    out
}
