//! # NIWA Tide Data Fetching
//!
//! This module fetches high and low water predictions for the site from the
//! NIWA tide forecaster API.
//!
//! ## Data Source
//!
//! ### NIWA Tide API
//! - **URL**: `{base}/data?lat=..&long=..&startDate=YYYY-MM-DD&numberOfDays=1&datum=MSL`
//! - **Auth**: `x-apikey` request header
//! - **Format**: JSON `values` array of `{ "time": RFC 3339, "value": metres }`
//! - **Data**: without an `interval` parameter only the turning points are
//!   returned, typically four per day
//!
//! ### Data Processing Pipeline
//! 1. **Fetch**: HTTP GET with the site coordinates and local date
//! 2. **Parse**: Deserialize the `values` array
//! 3. **Classify**: Each value above the response mean is high water, the rest low
//! 4. **Return**: Time-sorted [`TideExtremum`]s in the site's offset
//!
//! ## Error Handling
//! - **No key**: `ConfigurationMissing`, no request is made
//! - **Network or status failures**: `Http`, carrying the `reqwest` error
//! - **Malformed JSON**: `Decode`, carrying the `serde_json` error
//! - **Empty or unparsable values**: `EmptyData`
//!
//! Every error is absorbed by the [`crate::sources::TideChain`], which moves on
//! to the synthetic tide model.

use crate::config::{ProviderConfig, SiteConfig, NIWA_KEY_VAR};
use crate::error::SourceError;
use crate::sources::TideSource;
use crate::tide::round_tenth;
use crate::{TideExtremum, TideKind};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use tracing::{debug, warn};

const SOURCE_NAME: &str = "niwa";
const API_KEY_HEADER: &str = "x-apikey";

#[derive(Debug, Deserialize)]
struct TideValue {
    time: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct TideResponse {
    #[serde(default)]
    values: Vec<TideValue>,
}

/// Live tide predictions from NIWA.
pub struct NiwaTides {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    latitude: f64,
    longitude: f64,
    offset: FixedOffset,
}

impl NiwaTides {
    pub fn new(client: reqwest::Client, provider: &ProviderConfig, site: &SiteConfig) -> Self {
        NiwaTides {
            client,
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key: provider.api_key.clone(),
            latitude: site.latitude,
            longitude: site.longitude,
            offset: site.offset(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/data", self.base_url)
    }

    fn query(&self, date: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("lat", self.latitude.to_string()),
            ("long", self.longitude.to_string()),
            ("startDate", date.format("%Y-%m-%d").to_string()),
            ("numberOfDays", "1".to_string()),
            ("datum", "MSL".to_string()),
        ]
    }
}

#[async_trait]
impl TideSource for NiwaTides {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_tide_extrema(&self, date: NaiveDate) -> Result<Vec<TideExtremum>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::ConfigurationMissing {
                source_name: SOURCE_NAME,
                key: NIWA_KEY_VAR,
            })?;

        let url = self.endpoint();
        debug!(%url, %date, "requesting tide predictions");

        let body = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&self.query(date))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(SourceError::http(SOURCE_NAME))?
            .bytes()
            .await
            .map_err(SourceError::http(SOURCE_NAME))?;
        let response: TideResponse = SourceError::decode_json(SOURCE_NAME, &body)?;

        let extrema = extrema_from_response(&response, self.offset);
        if extrema.is_empty() {
            return Err(SourceError::EmptyData {
                source_name: SOURCE_NAME,
            });
        }
        Ok(extrema)
    }
}

/// Convert NIWA turning points into extrema, classifying each against the
/// mean of all values in the response.
fn extrema_from_response(response: &TideResponse, offset: FixedOffset) -> Vec<TideExtremum> {
    let parsed: Vec<(DateTime<FixedOffset>, f64)> = response
        .values
        .iter()
        .filter_map(|v| match DateTime::parse_from_rfc3339(&v.time) {
            Ok(time) if v.value.is_finite() => Some((time.with_timezone(&offset), v.value)),
            Ok(_) => {
                warn!(time = %v.time, "skipping non-finite tide value");
                None
            }
            Err(err) => {
                warn!(time = %v.time, error = %err, "skipping tide value with bad timestamp");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        return Vec::new();
    }

    let mean = parsed.iter().map(|(_, value)| value).sum::<f64>() / parsed.len() as f64;
    let mut extrema: Vec<TideExtremum> = parsed
        .into_iter()
        .map(|(time, value)| TideExtremum {
            time,
            height: round_tenth(value),
            kind: if value > mean {
                TideKind::High
            } else {
                TideKind::Low
            },
        })
        .collect();

    extrema.sort_by_key(|extremum| extremum.time);
    extrema
}
