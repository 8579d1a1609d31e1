use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Url};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::input::Criteria;

/// Order reason sent with every data blocks request (6332: credit risk).
pub const ORDER_REASON: &str = "6332";

/// Requests-per-second limiter shared by every client of a run.
#[derive(Clone)]
pub struct RequestLimiter {
    inner: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RequestLimiter {
    pub fn per_second(requests: u32) -> Result<Self, AppError> {
        let requests = NonZeroU32::new(requests).ok_or_else(|| {
            AppError::ConfigError("rate limit must be at least one request per second".to_string())
        })?;

        Ok(Self {
            inner: Arc::new(RateLimiter::direct(Quota::per_second(requests))),
        })
    }

    async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

/// Status and raw body of an API response. Non-2xx responses are returned
/// as well; their body is D&B's error report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

async fn execute(
    limiter: &RequestLimiter,
    request: RequestBuilder,
    what: &str,
) -> Result<ApiResponse, AppError> {
    limiter.wait().await;

    let response = request
        .send()
        .await
        .map_err(|e| AppError::ExternalApiError(format!("{} request failed: {}", what, e)))?;

    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| {
        AppError::ExternalApiError(format!("Failed to read {} response: {}", what, e))
    })?;

    if (200..300).contains(&status) {
        tracing::debug!("✓ {} ➡️ status: {}", what, status);
    } else {
        tracing::warn!("✗ {} ➡️ status: {}", what, status);
    }

    Ok(ApiResponse { status, body })
}

fn build_url(base_url: &str, path: &str, query: &[(&str, String)]) -> Result<Url, AppError> {
    Url::parse_with_params(&format!("{}{}", base_url, path), query)
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))
}

/// D&B Direct+ REST client.
pub struct DnbDplClient {
    client: Client,
    base_url: String,
    token: String,
    limiter: RequestLimiter,
}

impl DnbDplClient {
    pub fn new(base_url: &str, token: &str, limiter: RequestLimiter) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            limiter,
        }
    }

    pub fn from_config(config: &Config, limiter: RequestLimiter) -> anyhow::Result<Self> {
        Ok(Self::new(&config.dnb_dpl_base_url, config.require_token()?, limiter))
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<ApiResponse, AppError> {
        let url = build_url(&self.base_url, path, query)?;

        // Token stays out of the logs
        tracing::debug!("GET {}", url);

        let request = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/json");

        execute(&self.limiter, request, what).await
    }

    /// Data blocks for one DUNS, e.g. `companyinfo_L2_v1`.
    pub async fn data_blocks(
        &self,
        duns: &str,
        block_ids: &[String],
        trade_up: Option<&str>,
    ) -> Result<ApiResponse, AppError> {
        let mut query = vec![
            ("blockIDs", block_ids.join(",")),
            ("orderReason", ORDER_REASON.to_string()),
        ];
        if let Some(trade_up) = trade_up {
            query.push(("tradeUp", trade_up.to_string()));
        }

        self.get(
            &format!("/v1/data/duns/{}", duns),
            &query,
            &format!("DUNS: {}", duns),
        )
        .await
    }

    /// Beneficial ownership (`cmpbol` or `cmpbos`) from `ownership_percentage` up.
    pub async fn beneficial_owner(
        &self,
        duns: &str,
        product_id: &str,
        ownership_percentage: f64,
    ) -> Result<ApiResponse, AppError> {
        let query = [
            ("duns", duns.to_string()),
            ("productId", product_id.to_string()),
            ("versionId", "v1".to_string()),
            ("tradeUp", "hq".to_string()),
            ("ownershipPercentage", ownership_percentage.to_string()),
        ];

        self.get(
            "/v1/beneficialowner",
            &query,
            &format!("Beneficial owner {}", duns),
        )
        .await
    }

    pub async fn full_family_tree(
        &self,
        duns: &str,
        exclude_branches: bool,
    ) -> Result<ApiResponse, AppError> {
        let mut query = vec![("page[size]", "1000".to_string())];
        if exclude_branches {
            query.push(("exclusionCriteria", "Branches".to_string()));
        }

        self.get(
            &format!("/v1/familyTree/{}", duns),
            &query,
            &format!("Family tree {}", duns),
        )
        .await
    }

    pub async fn reference_categories(&self) -> Result<ApiResponse, AppError> {
        self.get("/v1/referenceData/categories", &[], "Reference data categories")
            .await
    }

    pub async fn reference_category(&self, id: &str) -> Result<ApiResponse, AppError> {
        self.get(
            "/v1/referenceData/category",
            &[("id", id.to_string())],
            &format!("Reference data category {}", id),
        )
        .await
    }

    /// Identity resolution for one row of criteria.
    pub async fn cleanse_match(&self, criteria: &Criteria) -> Result<ApiResponse, AppError> {
        let query: Vec<(&str, String)> = criteria
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect();

        self.get("/v1/match/cleanseMatch", &query, "Identity resolution")
            .await
    }
}

/// Gleif LEI registry client.
pub struct GleifClient {
    client: Client,
    base_url: String,
    limiter: RequestLimiter,
}

impl GleifClient {
    pub fn new(base_url: &str, limiter: RequestLimiter) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter,
        }
    }

    /// LEI records of entities registered as `registered_as` in `country`.
    pub async fn lei_records(
        &self,
        country: &str,
        registered_as: &str,
        page_size: u32,
        page_number: u32,
    ) -> Result<ApiResponse, AppError> {
        let query = [
            ("page[size]", page_size.to_string()),
            ("page[number]", page_number.to_string()),
            ("filter[entity.legalAddress.country]", country.to_lowercase()),
            ("filter[entity.registeredAs]", registered_as.to_string()),
        ];
        let url = build_url(&self.base_url, "/api/v1/lei-records", &query)?;

        tracing::debug!("GET {}", url);

        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.api+json");

        execute(
            &self.limiter,
            request,
            &format!("LEI records {} {}", country, registered_as),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_limit_is_rejected() {
        assert!(RequestLimiter::per_second(0).is_err());
        assert!(RequestLimiter::per_second(5).is_ok());
    }

    #[test]
    fn test_success_range() {
        let ok = ApiResponse {
            status: 200,
            body: String::new(),
        };
        let not_found = ApiResponse {
            status: 404,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!not_found.is_success());
    }
}
