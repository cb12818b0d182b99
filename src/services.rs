//! Clients for the external services the audit consults.
//!
//! - [`DevStatsClient`]: contribution counts per user for a lookback period,
//!   queried with `POST /api/ds/query`.
//! - [`CodeSearchClient`]: whether a user appears in any `OWNERS` file,
//!   queried with `GET /api/v1/search`.
//!
//! Both sit behind traits so the audit can run against fixed data in tests.
//! Calls are blocking and sequential; any transport error, non-success
//! status or undecodable body aborts the caller.

use std::collections::BTreeMap;

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::{CODE_SEARCH_URL, DEVSTATS_URL};
use crate::error::{Error, Result};

/// A user's activity in the lookback period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub rank: u64,
    pub username: String,
    pub count: u64,
}

/// Source of per-user contribution counts.
pub trait ContributionSource {
    /// Contributions keyed by lowercased username.
    fn contributions(&self, period: &str) -> Result<BTreeMap<String, Contribution>>;
}

/// Tells whether a user is listed in some `OWNERS` file.
pub trait OwnersLookup {
    fn is_owner(&self, username: &str) -> Result<bool>;
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    queries: Vec<Query>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Query {
    ref_id: String,
    datasource_id: u32,
    raw_sql: String,
    format: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: BTreeMap<String, QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    frames: Vec<Frame>,
}

#[derive(Debug, Deserialize)]
struct Frame {
    data: FrameData,
}

#[derive(Debug, Deserialize)]
struct FrameData {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Ranked contributions per developer for one period.
fn contributions_sql(period: &str) -> String {
    format!(
        r#"select
  sub."Rank",
  sub.name as name,
  sub.value
from (
  select row_number() over (order by sum(value) desc) as "Rank",
    split_part(name, '$$$', 1) as name,
    sum(value) as value
  from
    shdev
  where
    series = 'hdev_contributionsallall'
    and period = '{}'
  group by
    split_part(name, '$$$', 1)
) sub"#,
        period.replace('\'', "''")
    )
}

/// Contribution statistics from a DevStats instance.
pub struct DevStatsClient {
    client: Client,
    url: String,
}

impl DevStatsClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl Default for DevStatsClient {
    fn default() -> Self {
        Self::new(DEVSTATS_URL)
    }
}

impl ContributionSource for DevStatsClient {
    fn contributions(&self, period: &str) -> Result<BTreeMap<String, Contribution>> {
        let body = QueryRequest {
            queries: vec![Query {
                ref_id: "A".to_string(),
                datasource_id: 1,
                raw_sql: contributions_sql(period),
                format: "table".to_string(),
            }],
        };

        debug!("querying {} for period {}", self.url, period);
        let resp = self.client.post(&self.url).json(&body).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Network {
                url: self.url.clone(),
                message: format!("bad status from devstats: {}", status),
            });
        }
        let text = resp.text()?;
        parse_contributions(&self.url, &text)
    }
}

/// Decode a query response whose first frame holds rank, name and count
/// columns.
pub fn parse_contributions(url: &str, body: &str) -> Result<BTreeMap<String, Contribution>> {
    let bad_shape = |what: &str| Error::Network {
        url: url.to_string(),
        message: format!("unexpected devstats response: {}", what),
    };

    let parsed: QueryResponse = serde_json::from_str(body)?;
    let frame = parsed
        .results
        .get("A")
        .and_then(|r| r.frames.first())
        .ok_or_else(|| bad_shape("missing frame"))?;
    let [ranks, names, counts] = match frame.data.values.as_slice() {
        [ranks, names, counts, ..] => [ranks, names, counts],
        _ => return Err(bad_shape("expected rank, name and value columns")),
    };

    let mut contributions = BTreeMap::new();
    for ((rank, name), count) in ranks.iter().zip(names).zip(counts) {
        let username = name.as_str().ok_or_else(|| bad_shape("non-string name"))?;
        let contribution = Contribution {
            rank: rank.as_f64().ok_or_else(|| bad_shape("non-numeric rank"))? as u64,
            username: username.to_string(),
            count: count.as_f64().ok_or_else(|| bad_shape("non-numeric value"))? as u64,
        };
        contributions.insert(username.to_lowercase(), contribution);
    }
    Ok(contributions)
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Stats", default)]
    stats: SearchStats,
}

#[derive(Debug, Default, Deserialize)]
struct SearchStats {
    #[serde(rename = "FilesOpened", default)]
    files_opened: u64,
}

/// Owner lookups through a code search service indexing `OWNERS` files.
pub struct CodeSearchClient {
    client: Client,
    url: String,
}

impl CodeSearchClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl Default for CodeSearchClient {
    fn default() -> Self {
        Self::new(CODE_SEARCH_URL)
    }
}

impl OwnersLookup for CodeSearchClient {
    fn is_owner(&self, username: &str) -> Result<bool> {
        let resp = self
            .client
            .get(&self.url)
            .query(&[
                ("stats", "fosho"),
                ("repos", "*"),
                ("rng", ":20"),
                ("q", username),
                ("i", "fosho"),
                ("files", "OWNERS"),
                ("excludeFiles", "vendor/"),
            ])
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Network {
                url: self.url.clone(),
                message: format!("bad status from code search: {}", status),
            });
        }
        let text = resp.text()?;
        parse_owner_response(&text)
    }
}

/// A user is an owner if the search opened at least one `OWNERS` file.
pub fn parse_owner_response(body: &str) -> Result<bool> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    Ok(parsed.stats.files_opened > 0)
}
