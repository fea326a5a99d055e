use thiserror::Error;

/// Failures while waiting for operator input. These are fatal: they propagate
/// to the top level, get logged, and end the run.
#[derive(Debug, Error)]
pub enum InputError {
	#[error("Timeout: No input received.")]
	Timeout,

	#[error("Input stream closed")]
	Closed,

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
