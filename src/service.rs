use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::constants::USER_AGENT;
use crate::credentials::TokenProvider;
use crate::expression::{
    apply_expression, collection_size, compute_body, mean_image, reduce_region,
};
use crate::imagery::{Aoi, BandExpression, BandSample, CatalogQuery, ImageryClient};
use crate::models::ComputeResponse;

/// Earth Engine REST client backing the imagery queries
pub struct EarthEngineClient {
    client: Client,
    tokens: TokenProvider,
    compute_url: String,
}

impl EarthEngineClient {
    /// Creates a client for `project` against the REST API at `api_base`
    pub fn new(client: Client, tokens: TokenProvider, api_base: &str, project: &str) -> Self {
        let compute_url = format!(
            "{}/v1/projects/{}/value:compute",
            api_base.trim_end_matches('/'),
            project
        );

        Self {
            client,
            tokens,
            compute_url,
        }
    }

    /// Builds the shared HTTP client
    pub fn http_client() -> Result<Client> {
        Ok(Client::builder().user_agent(USER_AGENT).build()?)
    }

    /// Fetches a first access token so bad credentials fail at startup
    pub async fn verify_credentials(&self) -> Result<()> {
        self.tokens.access_token().await?;
        tracing::info!(
            "Earth Engine credentials verified for {}",
            self.tokens.client_email()
        );
        Ok(())
    }

    /// Evaluates an expression graph and returns its `result` value
    async fn compute(&self, root: Value) -> Result<Value> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(&self.compute_url)
            .bearer_auth(token)
            .json(&compute_body(root))
            .send()
            .await
            .context("Earth Engine request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Earth Engine request failed with status: {} {}", status, body);
        }

        let data = response
            .json::<ComputeResponse>()
            .await
            .context("Malformed Earth Engine response")?;

        data.result
            .context("Earth Engine response has no result")
    }
}

/// Reads a `reduceRegion` dictionary; nulls and non-numbers become absent
fn parse_band_sample(result: Value) -> Result<BandSample> {
    let Value::Object(entries) = result else {
        anyhow::bail!("Expected a band dictionary, got {}", result);
    };

    let values: HashMap<String, Option<f64>> = entries
        .into_iter()
        .map(|(band, value)| (band, value.as_f64()))
        .collect();

    Ok(BandSample::new(values))
}

#[async_trait]
impl ImageryClient for EarthEngineClient {
    async fn count(&self, query: &CatalogQuery) -> Result<u64> {
        let result = self.compute(collection_size(query)).await?;
        result
            .as_u64()
            .with_context(|| format!("Expected an image count, got {}", result))
    }

    async fn sample_mean(&self, query: &CatalogQuery, aoi: &Aoi, scale: f64) -> Result<BandSample> {
        let root = reduce_region(mean_image(query), aoi, scale);
        parse_band_sample(self.compute(root).await?)
    }

    async fn sample_expression(
        &self,
        query: &CatalogQuery,
        expr: &BandExpression,
        aoi: &Aoi,
        scale: f64,
    ) -> Result<BandSample> {
        let image = apply_expression(mean_image(query), expr);
        let root = reduce_region(image, aoi, scale);
        parse_band_sample(self.compute(root).await?)
    }
}
