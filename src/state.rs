//! Application state shared across handlers.

use std::sync::Arc;

use crate::backfill::{BackfillConfig, MonthBackfill};
use crate::imagery::ImageryClient;

pub struct AppState {
    pub backfill: MonthBackfill,
}

impl AppState {
    pub fn new(client: Arc<dyn ImageryClient>, config: BackfillConfig) -> Self {
        Self {
            backfill: MonthBackfill::new(client, config),
        }
    }
}
