//! HTTP client for the InfluxDB 2.x query API.

use crate::types::{FieldSeries, JobstatsData};
use crate::{MetricsSource, SEARCH_WINDOW, flux};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum InfluxError {
    #[error("Invalid InfluxDB URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("InfluxDB request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("InfluxDB API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse InfluxDB response: {0}")]
    Parse(String),
}

/// Body for the /api/v2/query endpoint.
///
/// Annotations are disabled so the response is plain CSV with one
/// header row per result table.
#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    r#type: &'static str,
    dialect: Dialect,
}

#[derive(Serialize)]
struct Dialect {
    header: bool,
    annotations: [&'static str; 0],
}

impl<'a> QueryRequest<'a> {
    fn new(query: &'a str) -> Self {
        Self {
            query,
            r#type: "flux",
            dialect: Dialect {
                header: true,
                annotations: [],
            },
        }
    }
}

/// A row of a CSV query result, keyed by column name.
pub type CsvRow = HashMap<String, String>;

/// InfluxDB 2.x metrics client.
#[derive(Debug, Clone)]
pub struct InfluxClient {
    http: reqwest::Client,
    query_url: Url,
    token: String,
    bucket: String,
}

impl InfluxClient {
    pub fn new(
        base_url: &str,
        org: &str,
        token: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self, InfluxError> {
        let mut query_url = Url::parse(base_url)?.join("/api/v2/query")?;
        query_url.query_pairs_mut().append_pair("org", org);

        Ok(Self {
            http: reqwest::Client::new(),
            query_url,
            token: token.into(),
            bucket: bucket.into(),
        })
    }

    /// Run a Flux query and return the result rows.
    async fn query(&self, flux: &str) -> Result<Vec<CsvRow>, InfluxError> {
        let response = self
            .http
            .post(self.query_url.clone())
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/csv")
            .json(&QueryRequest::new(flux))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InfluxError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        parse_query_csv(&body)
    }
}

impl MetricsSource for InfluxClient {
    async fn peak_memory(&self, metrics_id: &str, window: &str) -> Option<u64> {
        let query = flux::max_memory_query(&self.bucket, metrics_id, window);
        let rows = match self.query(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("InfluxDB peak-memory query failed: {}", e);
                return None;
            }
        };

        // Samples are stored in MB
        first_value(&rows).map(|mb| (mb * 1024.0 * 1024.0) as u64)
    }

    async fn average_cpu(&self, metrics_id: &str) -> Option<f64> {
        let query = flux::avg_cpu_query(&self.bucket, metrics_id, SEARCH_WINDOW);
        let rows = match self.query(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("InfluxDB average-CPU query failed: {}", e);
                return None;
            }
        };

        first_value(&rows)
    }

    async fn lustre_jobstats(&self, metrics_id: &str) -> Option<JobstatsData> {
        let query = flux::lustre_jobstats_query(&self.bucket, metrics_id, SEARCH_WINDOW);
        let rows = match self.query(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("InfluxDB Lustre jobstats query failed: {}", e);
                return None;
            }
        };

        Some(group_jobstats(&rows))
    }
}

/// Extract the `_value` of the first result row as a float.
pub fn first_value(rows: &[CsvRow]) -> Option<f64> {
    rows.first()?.get("_value")?.parse().ok()
}

/// Group jobstats rows into the nested fs -> server -> field structure,
/// preserving sample order within each series.
pub fn group_jobstats(rows: &[CsvRow]) -> JobstatsData {
    let mut data = JobstatsData::new();

    for row in rows {
        let (Some(fs), Some(server), Some(field), Some(value)) = (
            row.get("fs"),
            row.get("server"),
            row.get("_field"),
            row.get("_value"),
        ) else {
            continue;
        };
        let Ok(value) = value.parse::<f64>() else {
            continue;
        };

        data.entry(fs.clone())
            .or_default()
            .entry(server.clone())
            .or_default()
            .entry(field.clone())
            .or_insert_with(FieldSeries::default)
            .value
            .push(value);
    }

    data
}

/// Parse an un-annotated CSV query response into rows.
///
/// Multi-table results repeat the header line mid-stream; any row whose
/// cells match the header is treated as a new header.
pub fn parse_query_csv(body: &str) -> Result<Vec<CsvRow>, InfluxError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| InfluxError::Parse(e.to_string()))?;

        let is_header = record.iter().any(|cell| cell == "_value");
        if is_header {
            columns = record.iter().map(|c| c.to_string()).collect();
            continue;
        }
        if columns.is_empty() {
            return Err(InfluxError::Parse("CSV data before header".to_string()));
        }

        let row: CsvRow = columns
            .iter()
            .cloned()
            .zip(record.iter().map(|c| c.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
