//! Vegetation index server
//!
//! Returns NDVI, EVI and NDWI for the most recent months with MODIS coverage
//! over a point or polygon, computed remotely on Earth Engine.

pub mod backfill;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod expression;
pub mod formatters;
pub mod handlers;
pub mod imagery;
pub mod models;
pub mod service;
pub mod state;
