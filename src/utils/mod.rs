pub mod epss_api;
pub mod input_reader;
pub mod logger;
