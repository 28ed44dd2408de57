/// User agent string for HTTP requests
pub const USER_AGENT: &str = "veg-index-server/0.1.0";

/// Earth Engine REST API base URL
pub const EE_API_BASE: &str = "https://earthengine.googleapis.com";

/// Default OAuth2 token endpoint for service-account grants
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth2 scope required by Earth Engine
pub const EE_SCOPE: &str = "https://www.googleapis.com/auth/earthengine";

/// MODIS 16-day vegetation indices (NDVI/EVI)
pub const VEGETATION_DATASET: &str = "MODIS/006/MOD13A1";
pub const NDVI_BAND: &str = "NDVI";
pub const EVI_BAND: &str = "EVI";

/// MODIS 8-day surface reflectance
pub const REFLECTANCE_DATASET: &str = "MODIS/006/MOD09A1";
pub const NIR_BAND: &str = "sur_refl_b02";
pub const SWIR_BAND: &str = "sur_refl_b06";

pub const NDWI_EXPRESSION: &str = "(NIR - SWIR) / (NIR + SWIR)";
pub const NDWI_BAND: &str = "NDWI";

/// Ground resolution in meters for spatial reduction
pub const REDUCTION_SCALE: f64 = 500.0;

/// MOD13A1 stores indices as integers multiplied by this factor
pub const VEGETATION_SCALE: f64 = 10000.0;

pub const DEFAULT_TARGET_MONTHS: usize = 6;
pub const DEFAULT_MAX_MONTHS_CHECKED: usize = 24;
