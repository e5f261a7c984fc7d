//! HTTP record source.
//!
//! Fetches the metric rows as JSON from a query endpoint. The endpoint may return a bare
//! array of row objects or an object with a `rows` array. Endpoint settings come from the
//! environment (a `.env` file is honored):
//!
//! - `METRIC_SOURCE_URL`
//! - `METRIC_SOURCE_TOKEN` (optional bearer token)
//! - `METRIC_SOURCE_TIMEOUT_SECS` (optional, default 30)

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::data::csv_source::{DEFAULT_DATE_COLUMN, DEFAULT_METRIC_COLUMN};
use crate::data::RecordSource;
use crate::domain::{RawDate, RawRecord, RawScalar};
use crate::error::AppError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct HttpSource {
    client: Client,
    url: String,
    token: Option<String>,
    date_column: String,
    metric_column: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            token,
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            metric_column: DEFAULT_METRIC_COLUMN.to_string(),
        })
    }

    /// Build from `METRIC_SOURCE_*` variables. `url` overrides `METRIC_SOURCE_URL`.
    pub fn from_env(url: Option<String>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let url = match url {
            Some(u) => u,
            None => std::env::var("METRIC_SOURCE_URL")
                .map_err(|_| AppError::new(2, "Missing METRIC_SOURCE_URL in environment (.env)."))?,
        };
        let token = std::env::var("METRIC_SOURCE_TOKEN").ok().filter(|t| !t.is_empty());
        let timeout_secs = match std::env::var("METRIC_SOURCE_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::new(2, format!("METRIC_SOURCE_TIMEOUT_SECS must be an integer, got '{raw}'."))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(url, token, Duration::from_secs(timeout_secs))
    }

    pub fn with_columns(mut self, date_column: impl Into<String>, metric_column: impl Into<String>) -> Self {
        self.date_column = date_column.into();
        self.metric_column = metric_column.into();
        self
    }
}

impl RecordSource for HttpSource {
    fn describe(&self) -> String {
        format!("http:{}", self.url)
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, AppError> {
        let mut req = self.client.get(&self.url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .map_err(|e| AppError::new(4, format!("Metric source request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Metric source request failed with status {}.", resp.status()),
            ));
        }

        let body: Value = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse metric source response: {e}")))?;

        let rows = parse_rows(&body, &self.date_column, &self.metric_column)?;
        tracing::info!(rows = rows.len(), url = %self.url, "fetched http source");
        Ok(rows)
    }
}

/// Turn a JSON response body into raw records.
pub fn parse_rows(body: &Value, date_column: &str, metric_column: &str) -> Result<Vec<RawRecord>, AppError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("rows") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AppError::new(4, "Metric source response has no `rows` array."));
            }
        },
        _ => return Err(AppError::new(4, "Metric source response must be a JSON array or object.")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let obj = item
                .as_object()
                .ok_or_else(|| AppError::new(4, format!("Row {i} of metric source response is not an object.")))?;

            let business_date = match obj.get(date_column) {
                Some(Value::String(s)) if !s.is_empty() => RawDate::Text(s.clone()),
                Some(Value::Null) | None => RawDate::Missing,
                Some(other) => RawDate::Text(other.to_string()),
            };
            let metric_value = match obj.get(metric_column) {
                Some(Value::Number(n)) => n.as_f64().map_or(RawScalar::Missing, RawScalar::Number),
                Some(Value::String(s)) => RawScalar::Text(s.clone()),
                Some(Value::Null) | None => RawScalar::Missing,
                Some(other) => RawScalar::Text(other.to_string()),
            };
            let dimensions: BTreeMap<String, String> = obj
                .iter()
                .filter(|(k, _)| k.as_str() != date_column && k.as_str() != metric_column)
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), v)
                })
                .collect();

            Ok(RawRecord {
                business_date,
                metric_value,
                dimensions,
            })
        })
        .collect()
}
