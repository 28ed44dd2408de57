//! Earth Engine expression graphs.
//!
//! `value:compute` takes a serialized computation graph. Everything here is
//! built inline as nested `functionInvocationValue` nodes under a single root.

use serde_json::{json, Map, Value};

use crate::imagery::{Aoi, BandExpression, CatalogQuery};

fn constant(value: impl Into<Value>) -> Value {
    json!({ "constantValue": value.into() })
}

fn invoke(function: &str, arguments: Vec<(&str, Value)>) -> Value {
    let arguments: Map<String, Value> = arguments
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

    json!({
        "functionInvocationValue": {
            "functionName": function,
            "arguments": arguments,
        }
    })
}

/// `ImageCollection.load(id).filterDate(start, end)`
pub fn filtered_collection(query: &CatalogQuery) -> Value {
    let range = invoke(
        "DateRange",
        vec![
            ("start", constant(query.range.start.format("%Y-%m-%d").to_string())),
            ("end", constant(query.range.end.format("%Y-%m-%d").to_string())),
        ],
    );
    let filter = invoke(
        "Filter.dateRangeContains",
        vec![
            ("leftValue", range),
            ("rightField", constant("system:time_start")),
        ],
    );
    let collection = invoke(
        "ImageCollection.load",
        vec![("id", constant(query.collection.clone()))],
    );

    invoke(
        "Collection.filter",
        vec![("collection", collection), ("filter", filter)],
    )
}

/// Number of images in the filtered collection.
pub fn collection_size(query: &CatalogQuery) -> Value {
    invoke(
        "Collection.size",
        vec![("collection", filtered_collection(query))],
    )
}

fn select(image: Value, bands: &[String]) -> Value {
    invoke(
        "Image.select",
        vec![("input", image), ("bandSelectors", constant(json!(bands)))],
    )
}

/// Per-pixel temporal mean of the filtered collection, restricted to the
/// query's bands.
///
/// `ImageCollection.reduce` names its outputs `<band>_mean`; those are
/// selected and renamed back to the bare band names.
pub fn mean_image(query: &CatalogQuery) -> Value {
    let reduced = invoke(
        "ImageCollection.reduce",
        vec![
            ("collection", filtered_collection(query)),
            ("reducer", invoke("Reducer.mean", vec![])),
        ],
    );
    let reduced_names: Vec<String> = query
        .bands
        .iter()
        .map(|band| format!("{}_mean", band))
        .collect();

    invoke(
        "Image.select",
        vec![
            ("input", reduced),
            ("bandSelectors", constant(json!(reduced_names))),
            ("newNames", constant(json!(query.bands))),
        ],
    )
}

/// Evaluates `expr` over `image` and renames the result band.
pub fn apply_expression(image: Value, expr: &BandExpression) -> Value {
    let bindings: Map<String, Value> = expr
        .variables
        .iter()
        .map(|(name, band)| (name.clone(), select(image.clone(), std::slice::from_ref(band))))
        .collect();

    let evaluated = invoke(
        "Image.expression",
        vec![
            ("expression", constant(expr.expression.clone())),
            ("map", json!({ "dictionaryValue": { "values": bindings } })),
        ],
    );

    invoke(
        "Image.rename",
        vec![("input", evaluated), ("names", constant(json!([expr.output])))],
    )
}

pub fn geometry(aoi: &Aoi) -> Value {
    match aoi {
        Aoi::Point(position) => invoke(
            "GeometryConstructors.Point",
            vec![("coordinates", constant(json!(position)))],
        ),
        Aoi::Polygon(rings) => invoke(
            "GeometryConstructors.Polygon",
            vec![("coordinates", constant(json!(rings)))],
        ),
    }
}

/// Best-effort spatial mean of every band of `image` over `aoi`.
pub fn reduce_region(image: Value, aoi: &Aoi, scale: f64) -> Value {
    invoke(
        "Image.reduceRegion",
        vec![
            ("image", image),
            ("reducer", invoke("Reducer.mean", vec![])),
            ("geometry", geometry(aoi)),
            ("scale", constant(scale)),
            ("bestEffort", constant(true)),
        ],
    )
}

/// Wraps a root node into a `value:compute` request body.
pub fn compute_body(root: Value) -> Value {
    json!({
        "expression": {
            "result": "0",
            "values": { "0": root },
        }
    })
}
