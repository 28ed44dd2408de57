use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::imagery::Aoi;

// ============================================================================
// HTTP API Models
// ============================================================================

/// Body of `POST /get_last4months`.
#[derive(Debug, Deserialize)]
pub struct GeometryRequest {
    /// Only a missing key defaults to `"Point"`; an explicit null or a
    /// non-string value is an invalid type.
    #[serde(rename = "type", default = "default_geometry_type")]
    pub geometry_type: Value,
    #[serde(default)]
    pub coordinates: Option<Vec<Value>>,
}

impl GeometryRequest {
    /// Validates the geometry and converts it into an area of interest.
    ///
    /// Empty coordinates are reported before the geometry type is looked at.
    pub fn into_aoi(self) -> Result<Aoi, AppError> {
        let coords = match self.coordinates {
            Some(coords) if !coords.is_empty() => coords,
            _ => return Err(AppError::NoCoordinates),
        };

        match self.geometry_type.as_str() {
            Some("Point") => parse_position(&coords[0]).map(Aoi::Point),
            Some("Polygon") => parse_polygon(&coords).map(Aoi::Polygon),
            _ => Err(AppError::InvalidGeometryType),
        }
    }
}

fn default_geometry_type() -> Value {
    Value::String("Point".to_string())
}

fn parse_position(value: &Value) -> Result<[f64; 2], AppError> {
    let items = value
        .as_array()
        .ok_or_else(|| AppError::InvalidCoordinates(format!("expected [lng, lat], got {}", value)))?;

    if items.len() < 2 {
        return Err(AppError::InvalidCoordinates(format!(
            "expected [lng, lat], got {}",
            value
        )));
    }

    let lng = items[0]
        .as_f64()
        .ok_or_else(|| AppError::InvalidCoordinates(format!("longitude is not a number: {}", items[0])))?;
    let lat = items[1]
        .as_f64()
        .ok_or_else(|| AppError::InvalidCoordinates(format!("latitude is not a number: {}", items[1])))?;

    Ok([lng, lat])
}

fn parse_ring(values: &[Value]) -> Result<Vec<[f64; 2]>, AppError> {
    let ring = values
        .iter()
        .map(parse_position)
        .collect::<Result<Vec<_>, _>>()?;

    if ring.len() < 3 {
        return Err(AppError::InvalidCoordinates(format!(
            "polygon ring needs at least 3 positions, got {}",
            ring.len()
        )));
    }
    Ok(ring)
}

/// Accepts either a bare ring `[[lng, lat], ...]` or GeoJSON rings
/// `[[[lng, lat], ...], ...]`.
fn parse_polygon(coords: &[Value]) -> Result<Vec<Vec<[f64; 2]>>, AppError> {
    let nested = coords[0]
        .as_array()
        .and_then(|first| first.first())
        .map(Value::is_array)
        .unwrap_or(false);

    if nested {
        coords
            .iter()
            .map(|ring| match ring.as_array() {
                Some(positions) => parse_ring(positions),
                None => Err(AppError::InvalidCoordinates(format!(
                    "expected a ring of positions, got {}",
                    ring
                ))),
            })
            .collect()
    } else {
        Ok(vec![parse_ring(coords)?])
    }
}

/// Vegetation density derived from NDVI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VegetationCategory {
    #[serde(rename = "Dense Vegetation / High Bloom")]
    Dense,
    #[serde(rename = "Moderate Vegetation / Possible Bloom")]
    Moderate,
    #[serde(rename = "Sparse Vegetation / No Bloom")]
    Sparse,
    #[serde(rename = "No Data")]
    NoData,
}

/// Indices sampled for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRecord {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    #[serde(rename = "NDVI")]
    pub ndvi: Option<f64>,
    #[serde(rename = "EVI")]
    pub evi: Option<f64>,
    #[serde(rename = "NDWI")]
    pub ndwi: Option<f64>,
    #[serde(rename = "VegetationCategory")]
    pub vegetation_category: VegetationCategory,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

// ============================================================================
// Earth Engine / OAuth Wire Models
// ============================================================================

/// Response of `value:compute`.
#[derive(Debug, Deserialize)]
pub struct ComputeResponse {
    pub result: Option<Value>,
}

/// Service-account key file, as downloaded from the cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> GeometryRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_point_uses_first_position() {
        let aoi = request(json!({"type": "Point", "coordinates": [[-122.4, 37.8]]}))
            .into_aoi()
            .unwrap();
        assert_eq!(aoi, Aoi::Point([-122.4, 37.8]));
    }

    #[test]
    fn test_missing_type_defaults_to_point() {
        let aoi = request(json!({"coordinates": [[10, 20]]})).into_aoi().unwrap();
        assert_eq!(aoi, Aoi::Point([10.0, 20.0]));
    }

    #[test]
    fn test_null_type_is_invalid() {
        let err = request(json!({"type": null, "coordinates": [[10, 20]]}))
            .into_aoi()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometryType));

        let err = request(json!({"type": 7, "coordinates": [[10, 20]]}))
            .into_aoi()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometryType));
    }

    #[test]
    fn test_empty_coordinates_checked_before_type() {
        let err = request(json!({"type": "Line", "coordinates": []}))
            .into_aoi()
            .unwrap_err();
        assert!(matches!(err, AppError::NoCoordinates));

        let err = request(json!({"type": "Point"})).into_aoi().unwrap_err();
        assert!(matches!(err, AppError::NoCoordinates));
    }

    #[test]
    fn test_unknown_type() {
        let err = request(json!({"type": "Line", "coordinates": [[0, 0], [1, 1]]}))
            .into_aoi()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidGeometryType));
    }

    #[test]
    fn test_polygon_bare_ring() {
        let aoi = request(json!({
            "type": "Polygon",
            "coordinates": [[0, 0], [1, 0], [1, 1], [0, 0]]
        }))
        .into_aoi()
        .unwrap();
        assert_eq!(
            aoi,
            Aoi::Polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]])
        );
    }

    #[test]
    fn test_polygon_geojson_rings() {
        let aoi = request(json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 0]]]
        }))
        .into_aoi()
        .unwrap();
        match aoi {
            Aoi::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 4);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_positions() {
        let err = request(json!({"type": "Point", "coordinates": [["a", 1]]}))
            .into_aoi()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCoordinates(_)));

        let err = request(json!({"type": "Polygon", "coordinates": [[0, 0], [1, 1]]}))
            .into_aoi()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCoordinates(_)));
    }

    #[test]
    fn test_month_record_field_names() {
        let record = MonthRecord {
            year: 2022,
            month: 11,
            month_name: "November".to_string(),
            ndvi: Some(0.61),
            evi: Some(0.4),
            ndwi: None,
            vegetation_category: VegetationCategory::Dense,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "year": 2022,
                "month": 11,
                "month_name": "November",
                "NDVI": 0.61,
                "EVI": 0.4,
                "NDWI": null,
                "VegetationCategory": "Dense Vegetation / High Bloom"
            })
        );
    }
}
