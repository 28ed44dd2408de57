//! Imagery catalog query contract.
//!
//! The backfill loop only talks to an [`ImageryClient`]; the Earth Engine
//! implementation lives in [`crate::service`] and tests substitute a fake.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Area of interest for a spatial reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum Aoi {
    /// A single `[lng, lat]` position.
    Point([f64; 2]),
    /// Exterior ring first, then any holes. Each ring is a list of `[lng, lat]`.
    Polygon(Vec<Vec<[f64; 2]>>),
}

impl Aoi {
    pub fn kind(&self) -> &'static str {
        match self {
            Aoi::Point(_) => "Point",
            Aoi::Polygon(_) => "Polygon",
        }
    }
}

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The calendar month containing `date`: first of that month up to the
    /// first of the next.
    pub fn month_of(date: NaiveDate) -> Self {
        use chrono::Datelike;

        let start = date.with_day(1).unwrap_or(date);
        let end = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        }
        .unwrap_or(start);

        Self { start, end }
    }
}

/// A catalog filtered to a date range with a band selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub collection: String,
    pub range: DateRange,
    pub bands: Vec<String>,
}

impl CatalogQuery {
    pub fn new(collection: &str, range: DateRange, bands: &[&str]) -> Self {
        Self {
            collection: collection.to_string(),
            range,
            bands: bands.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// Band arithmetic evaluated over the temporal mean of a query.
///
/// `variables` binds expression names to selected band names, e.g.
/// `NIR -> sur_refl_b02`. The result is a single band called `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandExpression {
    pub expression: String,
    pub variables: Vec<(String, String)>,
    pub output: String,
}

/// Spatial mean per band. `None` means the band came back without a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandSample {
    values: HashMap<String, Option<f64>>,
}

impl BandSample {
    pub fn new(values: HashMap<String, Option<f64>>) -> Self {
        Self { values }
    }

    /// Value for `band`; missing keys and explicit nulls are both absent.
    pub fn get(&self, band: &str) -> Option<f64> {
        self.values.get(band).copied().flatten()
    }
}

impl<const N: usize> From<[(&str, Option<f64>); N]> for BandSample {
    fn from(entries: [(&str, Option<f64>); N]) -> Self {
        Self::new(
            entries
                .into_iter()
                .map(|(band, value)| (band.to_string(), value))
                .collect(),
        )
    }
}

/// Remote imagery analytics capability.
#[async_trait]
pub trait ImageryClient: Send + Sync {
    /// Number of catalog entries matching the query's date range.
    async fn count(&self, query: &CatalogQuery) -> Result<u64>;

    /// Temporal mean of the selected bands, spatially averaged over `aoi`
    /// at `scale` meters with best-effort coverage.
    async fn sample_mean(&self, query: &CatalogQuery, aoi: &Aoi, scale: f64) -> Result<BandSample>;

    /// Like [`ImageryClient::sample_mean`], but reduces the result of `expr`
    /// instead of the raw bands.
    async fn sample_expression(
        &self,
        query: &CatalogQuery,
        expr: &BandExpression,
        aoi: &Aoi,
        scale: f64,
    ) -> Result<BandSample>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_of_mid_month() {
        let range = DateRange::month_of(date(2022, 7, 19));
        assert_eq!(range.start, date(2022, 7, 1));
        assert_eq!(range.end, date(2022, 8, 1));
    }

    #[test]
    fn test_month_of_december_rolls_year() {
        let range = DateRange::month_of(date(2022, 12, 31));
        assert_eq!(range.start, date(2022, 12, 1));
        assert_eq!(range.end, date(2023, 1, 1));
    }

    #[test]
    fn test_band_sample_absent_values() {
        let sample = BandSample::from([("NDVI", Some(4200.0)), ("EVI", None)]);
        assert_eq!(sample.get("NDVI"), Some(4200.0));
        assert_eq!(sample.get("EVI"), None);
        assert_eq!(sample.get("NDWI"), None);
    }
}
