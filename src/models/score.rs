// src/models/score.rs

use serde::{Deserialize, Serialize};

/// Advisory attached to a record when the exploitation probability is high.
pub const PRIORITY_ADVISORY: &str = "The probability of exploitation is 50 percent or greater. Examine the asset(s) exposure to threat actors and potential for data loss";

/// EPSS scores at or above this value carry the priority advisory.
pub const PRIORITY_THRESHOLD: f64 = 0.50;

/// One EPSS score for a CVE ID, as persisted in the ledger.
///
/// The serde renames match the ledger's CSV header row. Records are keyed by
/// `cve` and replaced wholesale when a newer fetch arrives, never merged
/// field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
	#[serde(rename = "CVE")]
	pub cve: String,

	#[serde(rename = "EPSS")]
	pub epss: f64,

	#[serde(rename = "Percentile")]
	pub percentile: f64,

	#[serde(rename = "Date")]
	pub date: String,

	#[serde(rename = "Priority")]
	pub priority: String,
}

impl ScoreRecord {
	pub fn new(cve: String, epss: f64, percentile: f64, date: String) -> Self {
		Self {
			cve,
			epss,
			percentile,
			date,
			priority: priority_note(epss).to_string(),
		}
	}
}

/// Returns the advisory text for a given EPSS score, or "" below the threshold.
pub fn priority_note(epss: f64) -> &'static str {
	if epss >= PRIORITY_THRESHOLD {
		PRIORITY_ADVISORY
	} else {
		""
	}
}
