//! Command-line and environment configuration.

use chrono::NaiveDate;
use clap::Parser;

use crate::backfill::{BackfillConfig, MonthStepping};
use crate::constants::{DEFAULT_MAX_MONTHS_CHECKED, DEFAULT_TARGET_MONTHS, EE_API_BASE};

/// Vegetation index server
#[derive(Parser, Debug, Clone)]
#[command(name = "veg-index-server")]
#[command(about = "Monthly NDVI/EVI/NDWI for a point or polygon, computed on Earth Engine")]
pub struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:5000", env = "LISTEN_ADDR")]
    pub listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// Base64-encoded service account key (raw JSON is accepted too)
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS", hide_env_values = true)]
    pub credentials: String,

    /// Earth Engine project; defaults to the key's project_id
    #[arg(long, env = "EE_PROJECT")]
    pub project: Option<String>,

    /// Earth Engine REST API base URL
    #[arg(long, default_value = EE_API_BASE, env = "EE_API_BASE")]
    pub api_base: String,

    /// Fixed "today" for the month scan (YYYY-MM-DD); wall clock if unset
    #[arg(long, env = "REFERENCE_DATE")]
    pub reference_date: Option<NaiveDate>,

    /// How to step back through candidate months
    #[arg(long, value_enum, default_value_t = MonthStepping::Calendar, env = "MONTH_STEPPING")]
    pub stepping: MonthStepping,

    /// Number of months with data to return
    #[arg(long, default_value_t = DEFAULT_TARGET_MONTHS, env = "TARGET_MONTHS")]
    pub target_months: usize,

    /// Maximum number of months to look back
    #[arg(long, default_value_t = DEFAULT_MAX_MONTHS_CHECKED, env = "MAX_MONTHS")]
    pub max_months: usize,
}

impl Args {
    pub fn backfill_config(&self) -> BackfillConfig {
        BackfillConfig {
            target_months: self.target_months,
            max_months_checked: self.max_months,
            reference_date: self.reference_date,
            stepping: self.stepping,
        }
    }
}
