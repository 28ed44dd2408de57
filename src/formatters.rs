use chrono::Month;

use crate::constants::VEGETATION_SCALE;
use crate::models::{MonthRecord, VegetationCategory};

/// Classifies vegetation density from NDVI
pub fn classify_vegetation(ndvi: Option<f64>) -> VegetationCategory {
    match ndvi {
        Some(v) if v > 0.5 => VegetationCategory::Dense,
        Some(v) if v > 0.2 => VegetationCategory::Moderate,
        Some(_) => VegetationCategory::Sparse,
        None => VegetationCategory::NoData,
    }
}

/// Converts a raw MOD13A1 band mean into a normalized index
pub fn scale_vegetation_index(raw: Option<f64>) -> Option<f64> {
    raw.map(|v| v / VEGETATION_SCALE)
}

/// English month name for a 1-based month number
pub fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

/// Builds a month record from already-scaled index values
pub fn format_month_record(
    year: i32,
    month: u32,
    ndvi: Option<f64>,
    evi: Option<f64>,
    ndwi: Option<f64>,
) -> MonthRecord {
    MonthRecord {
        year,
        month,
        month_name: month_name(month),
        ndvi,
        evi,
        ndwi,
        vegetation_category: classify_vegetation(ndvi),
    }
}
