// src/repositories/ledger_repo.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use log::info;

use crate::models::score::ScoreRecord;

/// Ledger file kept in the working directory.
pub const DEFAULT_LEDGER_PATH: &str = "epss_scores.csv";

/// Flat-file store for the score ledger. The whole file is read into memory,
/// merged by CVE ID, and rewritten; there is exactly one writer and at most
/// one record per CVE at rest.
pub struct LedgerRepository {
	path: PathBuf,
}

impl LedgerRepository {
	pub fn new() -> Self {
		Self::with_path(DEFAULT_LEDGER_PATH)
	}

	pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
		Self { path: path.into() }
	}

	/// Loads the persisted ledger, or an empty one when the file does not exist.
	pub fn load(&self) -> Result<Vec<ScoreRecord>> {
		if !self.path.exists() {
			return Ok(Vec::new());
		}

		let mut rdr = ReaderBuilder::new()
			.trim(csv::Trim::All)
			.from_path(&self.path)
			.with_context(|| format!("Failed to open ledger at {:?}", self.path))?;

		let mut records = Vec::new();
		for result in rdr.deserialize::<ScoreRecord>() {
			let record = result.context("Failed to deserialize ledger row")?;
			records.push(record);
		}

		Ok(records)
	}

	/// Rewrites the whole ledger file, header row first.
	pub fn save(&self, records: &[ScoreRecord]) -> Result<()> {
		let mut wtr = WriterBuilder::new()
			.from_path(&self.path)
			.with_context(|| format!("Failed to create ledger at {:?}", self.path))?;

		for record in records {
			wtr.serialize(record).context("Failed to write ledger row")?;
		}
		wtr.flush().context("Failed to flush ledger")?;

		info!("CSV file written: {:?}", self.path);
		Ok(())
	}

	/// Loads, merges and rewrites the ledger; returns the final row count.
	pub fn update(&self, fetched: Vec<ScoreRecord>) -> Result<usize> {
		let existing = self.load()?;
		let merged = merge_records(existing, fetched);
		self.save(&merged)?;
		Ok(merged.len())
	}
}

/// Merges newly fetched records into the existing set by CVE ID.
///
/// A fetched record replaces the existing record sharing its key wholesale,
/// and is appended otherwise. Existing order is preserved and appended
/// records keep fetch order. Linear scan per new record; fine at the
/// expected scale of low hundreds of rows.
pub fn merge_records(mut existing: Vec<ScoreRecord>, fetched: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
	for record in fetched {
		match existing.iter().position(|r| r.cve == record.cve) {
			Some(index) => existing[index] = record,
			None => existing.push(record),
		}
	}
	existing
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(cve: &str, epss: f64) -> ScoreRecord {
		ScoreRecord::new(cve.to_string(), epss, 0.5, "2024-01-15".to_string())
	}

	#[test]
	fn test_merge_replaces_by_key() {
		let existing = vec![record("CVE-2020-0001", 0.1), record("CVE-2020-0002", 0.2)];
		let fetched = vec![record("CVE-2020-0002", 0.9)];

		let merged = merge_records(existing, fetched);
		assert_eq!(merged.len(), 2);
		assert_eq!(merged[0].cve, "CVE-2020-0001");
		assert_eq!(merged[1].cve, "CVE-2020-0002");
		assert_eq!(merged[1].epss, 0.9);
	}

	#[test]
	fn test_merge_appends_new_keys_in_fetch_order() {
		let existing = vec![record("CVE-2020-0001", 0.1)];
		let fetched = vec![record("CVE-2021-0001", 0.3), record("CVE-2021-0002", 0.4)];

		let merged = merge_records(existing, fetched);
		let cves: Vec<&str> = merged.iter().map(|r| r.cve.as_str()).collect();
		assert_eq!(cves, vec!["CVE-2020-0001", "CVE-2021-0001", "CVE-2021-0002"]);
	}

	#[test]
	fn test_merge_into_empty_ledger() {
		let fetched = vec![record("CVE-2022-0001", 0.6)];
		let merged = merge_records(Vec::new(), fetched);
		assert_eq!(merged.len(), 1);
	}

	#[test]
	fn test_load_missing_file_is_empty() {
		let dir = tempfile::tempdir().unwrap();
		let repo = LedgerRepository::with_path(dir.path().join("missing.csv"));
		assert!(repo.load().unwrap().is_empty());
	}

	#[test]
	fn test_fresh_ledger_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("epss_scores.csv");
		let repo = LedgerRepository::with_path(&path);

		let fetched = vec![record("CVE-2020-0001", 0.75), record("CVE-2020-0002", 0.05)];
		let total = repo.update(fetched).unwrap();
		assert_eq!(total, 2);

		let contents = std::fs::read_to_string(&path).unwrap();
		let mut lines = contents.lines();
		assert_eq!(lines.next().unwrap(), "CVE,EPSS,Percentile,Date,Priority");

		let reloaded = repo.load().unwrap();
		assert_eq!(reloaded.len(), 2);
		assert_eq!(reloaded[0].cve, "CVE-2020-0001");
		assert_eq!(reloaded[0].epss, 0.75);
		assert_ne!(reloaded[0].priority, "");
		assert_eq!(reloaded[1].cve, "CVE-2020-0002");
		assert_eq!(reloaded[1].priority, "");
	}

	#[test]
	fn test_update_rewrites_existing_record() {
		let dir = tempfile::tempdir().unwrap();
		let repo = LedgerRepository::with_path(dir.path().join("epss_scores.csv"));

		repo.update(vec![record("CVE-2020-0001", 0.1)]).unwrap();
		let total = repo.update(vec![record("CVE-2020-0001", 0.8)]).unwrap();
		assert_eq!(total, 1);

		let reloaded = repo.load().unwrap();
		assert_eq!(reloaded.len(), 1);
		assert_eq!(reloaded[0].epss, 0.8);
	}

	#[test]
	fn test_update_with_no_fetched_records_keeps_ledger() {
		let dir = tempfile::tempdir().unwrap();
		let repo = LedgerRepository::with_path(dir.path().join("epss_scores.csv"));

		repo.update(vec![record("CVE-2020-0001", 0.2)]).unwrap();
		let total = repo.update(Vec::new()).unwrap();
		assert_eq!(total, 1);

		let reloaded = repo.load().unwrap();
		assert_eq!(reloaded[0].cve, "CVE-2020-0001");
		assert_eq!(reloaded[0].epss, 0.2);
	}
}
