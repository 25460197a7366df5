pub mod config;
pub mod fingerprint;
pub mod generate;
