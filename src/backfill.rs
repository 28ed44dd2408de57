//! Month backfill: walk backward from a reference month collecting index
//! samples until enough months with vegetation data are found.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Datelike, Duration, Months, NaiveDate, Utc};

use crate::constants::{
    DEFAULT_MAX_MONTHS_CHECKED, DEFAULT_TARGET_MONTHS, EVI_BAND, NDVI_BAND, NDWI_BAND,
    NDWI_EXPRESSION, NIR_BAND, REDUCTION_SCALE, REFLECTANCE_DATASET, SWIR_BAND,
    VEGETATION_DATASET,
};
use crate::formatters::{format_month_record, scale_vegetation_index};
use crate::imagery::{Aoi, BandExpression, CatalogQuery, DateRange, ImageryClient};
use crate::models::MonthRecord;

/// How candidate months are derived from the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MonthStepping {
    /// Exact calendar months.
    #[default]
    Calendar,
    /// `reference - 30 * k` days. Drifts against month lengths and can
    /// visit the same month twice.
    ThirtyDay,
}

impl MonthStepping {
    /// Date inside the `offset`-th candidate month before `reference`.
    pub fn candidate(self, reference: NaiveDate, offset: u32) -> NaiveDate {
        match self {
            MonthStepping::Calendar => {
                let first = reference.with_day(1).unwrap_or(reference);
                first
                    .checked_sub_months(Months::new(offset))
                    .unwrap_or(NaiveDate::MIN)
            }
            MonthStepping::ThirtyDay => reference
                .checked_sub_signed(Duration::days(30 * i64::from(offset)))
                .unwrap_or(NaiveDate::MIN),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackfillConfig {
    pub target_months: usize,
    pub max_months_checked: usize,
    /// `None` uses today's UTC date.
    pub reference_date: Option<NaiveDate>,
    pub stepping: MonthStepping,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            target_months: DEFAULT_TARGET_MONTHS,
            max_months_checked: DEFAULT_MAX_MONTHS_CHECKED,
            reference_date: None,
            stepping: MonthStepping::Calendar,
        }
    }
}

impl BackfillConfig {
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

pub struct MonthBackfill {
    client: Arc<dyn ImageryClient>,
    config: BackfillConfig,
}

impl MonthBackfill {
    pub fn new(client: Arc<dyn ImageryClient>, config: BackfillConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &BackfillConfig {
        &self.config
    }

    /// Most recent months with vegetation data, newest first.
    ///
    /// Returns fewer than `target_months` records (possibly none) when the
    /// scan depth runs out first. Remote errors abort the scan.
    pub async fn recent_months(&self, aoi: &Aoi) -> Result<Vec<MonthRecord>> {
        let reference = self.config.reference_date();
        let mut records = Vec::new();
        let mut months_back: u32 = 0;
        let mut months_checked = 0;

        while records.len() < self.config.target_months
            && months_checked < self.config.max_months_checked
        {
            let candidate = self.config.stepping.candidate(reference, months_back);
            if let Some(record) = self.sample_month(aoi, DateRange::month_of(candidate)).await? {
                records.push(record);
            }

            months_back += 1;
            months_checked += 1;
        }

        tracing::debug!(
            "Checked {} months from {}, {} with data",
            months_checked,
            reference,
            records.len()
        );
        Ok(records)
    }

    /// Samples one month; `None` when the vegetation catalog has no images.
    async fn sample_month(&self, aoi: &Aoi, range: DateRange) -> Result<Option<MonthRecord>> {
        let vegetation = CatalogQuery::new(VEGETATION_DATASET, range, &[NDVI_BAND, EVI_BAND]);

        let images = self.client.count(&vegetation).await?;
        if images == 0 {
            tracing::debug!("No vegetation images for {}", range.start.format("%Y-%m"));
            return Ok(None);
        }

        let sample = self
            .client
            .sample_mean(&vegetation, aoi, REDUCTION_SCALE)
            .await?;
        let ndvi = scale_vegetation_index(sample.get(NDVI_BAND));
        let evi = scale_vegetation_index(sample.get(EVI_BAND));

        let ndwi = self.sample_ndwi(aoi, range).await?;

        tracing::debug!(
            "Sampled {} ({} images): ndvi={:?} evi={:?} ndwi={:?}",
            range.start.format("%Y-%m"),
            images,
            ndvi,
            evi,
            ndwi
        );

        Ok(Some(format_month_record(
            range.start.year(),
            range.start.month(),
            ndvi,
            evi,
            ndwi,
        )))
    }

    async fn sample_ndwi(&self, aoi: &Aoi, range: DateRange) -> Result<Option<f64>> {
        let reflectance = CatalogQuery::new(REFLECTANCE_DATASET, range, &[NIR_BAND, SWIR_BAND]);

        if self.client.count(&reflectance).await? == 0 {
            return Ok(None);
        }

        let expr = BandExpression {
            expression: NDWI_EXPRESSION.to_string(),
            variables: vec![
                ("NIR".to_string(), NIR_BAND.to_string()),
                ("SWIR".to_string(), SWIR_BAND.to_string()),
            ],
            output: NDWI_BAND.to_string(),
        };
        let sample = self
            .client
            .sample_expression(&reflectance, &expr, aoi, REDUCTION_SCALE)
            .await?;

        Ok(sample.get(NDWI_BAND))
    }
}
