// src/main.rs

mod errors;
mod models;
mod repositories;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use log::{error, info};

use models::score::ScoreRecord;
use repositories::ledger_repo::LedgerRepository;
use utils::epss_api::EpssApiClient;
use utils::input_reader::{self, StdinSource};

struct App {
	epss_client: EpssApiClient,
	ledger: LedgerRepository,
}

impl App {
	fn new() -> Result<Self> {
		utils::logger::init();

		let banner = format!(
			"Starting CVE EPSS Scores Program at {}",
			Local::now().format("%Y-%m-%d %H:%M:%S")
		);
		println!("{}", banner);
		info!("{}", banner);

		let epss_client = EpssApiClient::new().context("Failed to create EPSS API client")?;

		Ok(App {
			epss_client,
			ledger: LedgerRepository::new(),
		})
	}

	async fn run(&self) -> Result<()> {
		let mut source = StdinSource::new();
		let cves = input_reader::collect_cve_ids(&mut source).await?;
		info!("Processing {} CVE IDs", cves.len());

		let fetched = self.fetch_scores(&cves).await;
		info!("Fetched scores for {} of {} CVE IDs", fetched.len(), cves.len());

		let total = self
			.ledger
			.update(fetched)
			.context("Failed to update ledger")?;
		info!("Ledger now holds {} records", total);

		Ok(())
	}

	/// Fetches scores one identifier at a time, awaiting each response before
	/// the next request. Identifiers with no data are skipped.
	async fn fetch_scores(&self, cves: &[String]) -> Vec<ScoreRecord> {
		let mut fetched = Vec::new();
		for cve in cves {
			if let Some(record) = self.epss_client.fetch_score(cve).await {
				fetched.push(record);
			}
		}
		fetched
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let app = App::new()?;

	match app.run().await {
		Ok(()) => {
			println!("Program completed.");
			info!("Program completed");
			Ok(())
		}
		Err(e) => {
			error!("Error in main function: {:#}", e);
			Err(e)
		}
	}
}
