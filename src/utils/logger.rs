use std::fs::OpenOptions;

use env_logger::{Builder, Env, Target};

/// Side-channel log file appended in the working directory.
pub const LOG_FILE_PATH: &str = "log.txt";

/// Initializes logging into the append-only log file, one timestamped line
/// per event. Falls back to stderr when the file cannot be opened.
pub fn init() {
	let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
	builder.format_timestamp_millis().format_module_path(true);

	match OpenOptions::new().create(true).append(true).open(LOG_FILE_PATH) {
		Ok(file) => {
			builder.target(Target::Pipe(Box::new(file)));
		}
		Err(e) => {
			eprintln!("Could not open {}: {}; logging to stderr", LOG_FILE_PATH, e);
		}
	}

	builder.init();
}
