//! Remote attendance summary API client.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{AttendanceRecord, DaySummary, PersonItem, PersonRange, ResolvedInterval};

/// HTTP client for the summary API.
///
/// Every query degrades to an empty result on network failure, non-2xx
/// status or unreadable JSON; the dashboard shows zeros instead of an error.
pub struct SummaryClient {
    client: Client,
    base_url: String,
}

impl SummaryClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The API endpoint (e.g., "https://example.org/exec")
    /// * `timeout_secs` - Per-request timeout
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Summary of a single day (`route=summary`).
    pub async fn fetch_day_summary(&self, date: NaiveDate) -> Option<DaySummary> {
        let params = [("route", "summary".to_string()), ("date", iso(date))];
        self.get_body(&params)
            .await
            .and_then(|body| parse_day_summary(&body))
            .unwrap_or_else(|e| degrade("summary", e, None))
    }

    /// Summaries of every reported day in `from..=to` (`route=summary_range`).
    pub async fn fetch_summary_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<DaySummary> {
        let params = [
            ("route", "summary_range".to_string()),
            ("from", iso(from)),
            ("to", iso(to)),
        ];
        self.get_body(&params)
            .await
            .and_then(|body| parse_summary_range(&body))
            .unwrap_or_else(|e| degrade("summary_range", e, Vec::new()))
    }

    /// Per-day records of one employee (`route=person`).
    pub async fn fetch_person(&self, name: &str, range: PersonRange, on: &str) -> Vec<AttendanceRecord> {
        let params = [
            ("route", "person".to_string()),
            ("name", name.to_string()),
            ("range", range.as_str().to_string()),
            ("on", on.to_string()),
        ];
        self.get_body(&params)
            .await
            .and_then(|body| parse_person_items(&body))
            .map(|items| items.into_iter().map(AttendanceRecord::from).collect())
            .unwrap_or_else(|e| degrade("person", e, Vec::new()))
    }

    /// Summaries covering `interval`, using the single-day route when possible.
    pub async fn fetch_summaries(&self, interval: &ResolvedInterval) -> Vec<DaySummary> {
        if interval.is_single_day() {
            self.fetch_day_summary(interval.from).await.into_iter().collect()
        } else {
            self.fetch_summary_range(interval.from, interval.to).await
        }
    }

    async fn get_body(&self, params: &[(&str, String)]) -> Result<String> {
        debug!("GET {} {:?}", self.base_url, params);

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("HTTP {status}")));
        }

        response.text().await.map_err(|e| AppError::upstream(e.to_string()))
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn degrade<T>(route: &str, error: AppError, fallback: T) -> T {
    warn!("route={route} unavailable, showing empty result: {error}");
    fallback
}

/// Extract the `data` member of a response envelope.
fn envelope_data(body: &str) -> Result<Value> {
    let mut json: Value =
        serde_json::from_str(body).map_err(|e| AppError::upstream(format!("malformed JSON: {e}")))?;
    Ok(json.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}

/// Deserialize each array element, skipping the ones that don't fit.
fn parse_items<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("Skipping malformed item: {e}");
                None
            }
        })
        .collect();

    if parsed.len() < total {
        info!("Parsed {} of {} items", parsed.len(), total);
    }
    parsed
}

/// Parse a `route=summary` body. `data: null` means no data for that day.
pub fn parse_day_summary(body: &str) -> Result<Option<DaySummary>> {
    match envelope_data(body)? {
        Value::Null => Ok(None),
        data => serde_json::from_value(data)
            .map(Some)
            .map_err(|e| AppError::upstream(format!("bad summary payload: {e}"))),
    }
}

/// Parse a `route=summary_range` body. A non-array `data` yields no rows.
pub fn parse_summary_range(body: &str) -> Result<Vec<DaySummary>> {
    Ok(parse_items(envelope_data(body)?))
}

/// Parse a `route=person` body (`data.items`).
pub fn parse_person_items(body: &str) -> Result<Vec<PersonItem>> {
    let mut data = envelope_data(body)?;
    let items = data.get_mut("items").map(Value::take).unwrap_or(Value::Null);
    Ok(parse_items(items))
}
