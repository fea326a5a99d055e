// src/utils/input_reader.rs

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use csv::ReaderBuilder;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::time::timeout;

use crate::errors::InputError;

/// How long to wait for a single interactive submission.
const INPUT_TIMEOUT: Duration = Duration::from_secs(50);

/// A source of one line of operator input.
///
/// Abstracted so tests can feed canned input without real I/O or timers.
#[async_trait]
pub trait InputSource {
	async fn read_line(&mut self) -> Result<String, InputError>;
}

/// Reads from standard input, bounding each wait by [`INPUT_TIMEOUT`].
///
/// The timer covers one wait call: an empty submission re-prompts and starts
/// a fresh 50 second window, so the contract is "fail after 50 seconds of
/// inactivity since the last submission".
pub struct StdinSource {
	reader: BufReader<Stdin>,
}

impl StdinSource {
	pub fn new() -> Self {
		Self {
			reader: BufReader::new(tokio::io::stdin()),
		}
	}
}

#[async_trait]
impl InputSource for StdinSource {
	async fn read_line(&mut self) -> Result<String, InputError> {
		let mut line = String::new();
		let read = timeout(INPUT_TIMEOUT, self.reader.read_line(&mut line))
			.await
			.map_err(|_| InputError::Timeout)?;

		match read? {
			0 => Err(InputError::Closed),
			_ => Ok(line.trim().to_string()),
		}
	}
}

/// Prompts for CVE IDs (or a CSV file path) and resolves the submission into
/// an ordered identifier list. Empty submissions re-prompt indefinitely.
pub async fn collect_cve_ids<S: InputSource + ?Sized>(source: &mut S) -> Result<Vec<String>> {
	println!("Enter CVE IDs (separated by commas) or provide a CSV file path:");
	info!("Prompted user for CVE IDs or CSV file path");

	let input = loop {
		let line = source.read_line().await?;
		if !line.is_empty() {
			break line;
		}
		println!("Please enter valid CVE IDs separated by commas or provide a valid CSV file path.");
		warn!("Empty input entered, prompting again");
	};

	if input.ends_with(".csv") {
		read_cves_from_csv(Path::new(&input))
	} else {
		Ok(split_cve_list(&input))
	}
}

/// Splits a comma-separated identifier list, trimming surrounding whitespace.
fn split_cve_list(input: &str) -> Vec<String> {
	input
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

/// Reads identifiers from the first column of a headerless CSV file.
fn read_cves_from_csv(path: &Path) -> Result<Vec<String>> {
	let mut rdr = ReaderBuilder::new()
		.has_headers(false)
		.trim(csv::Trim::All)
		.flexible(true)
		.from_path(path)
		.with_context(|| format!("Failed to open CVE list at {:?}", path))?;

	let mut cves = Vec::new();
	for result in rdr.records() {
		let record = result.context("Failed to read row from CVE list")?;
		if let Some(first) = record.get(0) {
			if !first.is_empty() {
				cves.push(first.to_string());
			}
		}
	}

	info!("Read {} CVE IDs from {:?}", cves.len(), path);
	Ok(cves)
}
