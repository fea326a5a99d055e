// src/utils/epss_api.rs

use anyhow::{Context, Result};
use log::{debug, error};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::models::score::ScoreRecord;

const EPSS_API_BASE_URL: &str = "https://api.first.org/data/v1/epss";

#[derive(Debug, Deserialize)]
struct EpssApiResponse {
	#[serde(default)]
	data: Vec<EpssApiRecord>,
}

/// One entry from the EPSS API. Scores arrive as decimal strings on the wire.
#[derive(Debug, Deserialize)]
struct EpssApiRecord {
	cve: String,
	epss: String,
	percentile: String,
	date: String,
}

impl EpssApiRecord {
	fn into_score_record(self) -> Result<ScoreRecord> {
		let epss = self
			.epss
			.parse::<f64>()
			.with_context(|| format!("Invalid EPSS value '{}' for {}", self.epss, self.cve))?;
		let percentile = self
			.percentile
			.parse::<f64>()
			.with_context(|| format!("Invalid percentile value '{}' for {}", self.percentile, self.cve))?;

		Ok(ScoreRecord::new(self.cve, epss, percentile, self.date))
	}
}

#[derive(Clone)]
pub struct EpssApiClient {
	client: reqwest::Client,
	base_url: String,
}

impl EpssApiClient {
	pub fn new() -> Result<Self> {
		Self::with_base_url(EPSS_API_BASE_URL.to_string())
	}

	pub fn with_base_url(base_url: String) -> Result<Self> {
		let mut headers = HeaderMap::new();
		headers.insert(
			USER_AGENT,
			HeaderValue::from_static("EPSS-Score-Tracker/1.0"),
		);

		let client = reqwest::Client::builder()
			.default_headers(headers)
			.build()
			.context("Failed to create HTTP client")?;

		Ok(Self { client, base_url })
	}

	/// Fetches the EPSS record for one CVE ID. One request, no retry.
	///
	/// Any failure (network error, bad status, malformed body, empty result
	/// set) is logged and collapses to `None`; the caller skips the
	/// identifier and continues.
	pub async fn fetch_score(&self, cve_id: &str) -> Option<ScoreRecord> {
		match self.try_fetch(cve_id).await {
			Ok(Some(record)) => Some(record),
			Ok(None) => {
				error!("Error fetching EPSS for {}: no data found", cve_id);
				None
			}
			Err(e) => {
				error!("Error fetching EPSS for {}: {:#}", cve_id, e);
				None
			}
		}
	}

	async fn try_fetch(&self, cve_id: &str) -> Result<Option<ScoreRecord>> {
		let url = format!("{}?cve={}", self.base_url, cve_id);
		debug!("Fetching EPSS data for {}", cve_id);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.context("Failed to send request to EPSS API")?;

		if !response.status().is_success() {
			return Err(anyhow::anyhow!(
				"EPSS API request failed with status: {}",
				response.status()
			));
		}

		let body = response
			.json::<EpssApiResponse>()
			.await
			.context("Failed to parse EPSS API response")?;

		match body.data.into_iter().next() {
			Some(raw) => Ok(Some(raw.into_score_record()?)),
			None => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::score::PRIORITY_ADVISORY;

	#[test]
	fn test_deserialize_api_response() {
		let body = r#"{
			"status": "OK",
			"data": [
				{
					"cve": "CVE-2021-44228",
					"epss": "0.97542",
					"percentile": "0.99997",
					"date": "2024-01-15"
				}
			]
		}"#;

		let response: EpssApiResponse = serde_json::from_str(body).unwrap();
		let record = response
			.data
			.into_iter()
			.next()
			.unwrap()
			.into_score_record()
			.unwrap();

		assert_eq!(record.cve, "CVE-2021-44228");
		assert_eq!(record.epss, 0.97542);
		assert_eq!(record.percentile, 0.99997);
		assert_eq!(record.date, "2024-01-15");
		assert_eq!(record.priority, PRIORITY_ADVISORY);
	}

	#[test]
	fn test_deserialize_empty_result_set() {
		let body = r#"{"status": "OK", "data": []}"#;
		let response: EpssApiResponse = serde_json::from_str(body).unwrap();
		assert!(response.data.is_empty());
	}

	#[test]
	fn test_missing_data_field_defaults_empty() {
		let body = r#"{"status": "OK"}"#;
		let response: EpssApiResponse = serde_json::from_str(body).unwrap();
		assert!(response.data.is_empty());
	}

	#[test]
	fn test_unparseable_score_is_an_error() {
		let raw = EpssApiRecord {
			cve: "CVE-2023-0001".to_string(),
			epss: "not-a-number".to_string(),
			percentile: "0.5".to_string(),
			date: "2024-01-15".to_string(),
		};
		assert!(raw.into_score_record().is_err());
	}
}
