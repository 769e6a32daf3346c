//! Data preparation for a single-page sales dashboard.
//!
//! Loading and cleaning run once per source file ([`loader::DataLoader`]);
//! every interaction then goes through [`reports::render`], which filters the
//! cached records and builds the view model the presentation layer draws.
pub mod config;
pub mod dates;
pub mod error;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod output;
pub mod reports;
pub mod schema;
pub mod table;
pub mod types;
pub mod util;

use log::LevelFilter;
use std::{env, sync::OnceLock};

pub use error::DashboardError;

static LOGGER: OnceLock<()> = OnceLock::new();

pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sales_dashboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}
