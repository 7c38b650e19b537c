use super::{LookupError, PropertyProvider, RequestKind, MIN_SUGGEST_PREFIX_LEN};
use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::property::{ComparableRecord, PropertyRecord};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const LOOKUP_PATH: &str = "/v1/address-lookup";
const COMPARABLES_PATH: &str = "/v1/comparables/search";
const SUGGESTIONS_PATH: &str = "/v1/address-suggestions";

/// Bearer-authenticated client for a Realie-compatible property data API.
pub struct RealieClient {
    http: Client,
    base_url: String,
    api_key: String,
    retries: u32,
}

impl RealieClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rehab-offer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| LookupError::transport(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            retries,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, AppError> {
        let api_key = config.require_api_key()?;
        Ok(Self::new(
            config.base_url.clone(),
            api_key,
            config.timeout,
            config.retries,
        )?)
    }

    async fn get(
        &self,
        kind: RequestKind,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Response, LookupError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(request = kind.label(), attempt, %url, "calling property data provider");

            let outcome = self
                .http
                .get(&url)
                .query(query)
                .bearer_auth(&self.api_key)
                .send()
                .await;

            match outcome {
                Ok(response) if is_retryable(response.status()) && attempt <= self.retries => {
                    warn!(
                        request = kind.label(),
                        status = %response.status(),
                        attempt,
                        "provider temporarily unavailable, retrying"
                    );
                }
                Ok(response) => return Ok(response),
                Err(err) if (err.is_timeout() || err.is_connect()) && attempt <= self.retries => {
                    warn!(
                        request = kind.label(),
                        error = %err,
                        attempt,
                        "transient transport failure, retrying"
                    );
                }
                Err(err) => {
                    return Err(LookupError::transport(format!(
                        "{} failed: {err}",
                        kind.label()
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl PropertyProvider for RealieClient {
    async fn lookup(&self, address: &str) -> Result<PropertyRecord, LookupError> {
        let response = self
            .get(RequestKind::Lookup, LOOKUP_PATH, &[("address", address)])
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found(address));
        }
        if !response.status().is_success() {
            return Err(error_from_body(response).await);
        }

        let record = response
            .json::<Option<PropertyRecord>>()
            .await
            .map_err(|err| LookupError::transport(format!("invalid property response: {err}")))?;

        match record {
            Some(mut record) => {
                if record.formatted_address.trim().is_empty() {
                    record.formatted_address = address.to_string();
                }
                info!(address = %record.formatted_address, "property lookup resolved");
                Ok(record)
            }
            None => Err(not_found(address)),
        }
    }

    async fn suggest(&self, prefix: &str) -> Result<Vec<String>, LookupError> {
        let prefix = prefix.trim();
        if prefix.chars().count() < MIN_SUGGEST_PREFIX_LEN {
            return Ok(Vec::new());
        }

        let response = self
            .get(RequestKind::Suggest, SUGGESTIONS_PATH, &[("query", prefix)])
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(error_from_body(response).await);
        }

        let payload = response
            .json::<SuggestionsPayload>()
            .await
            .map_err(|err| LookupError::transport(format!("invalid suggestions response: {err}")))?;
        Ok(payload.into_vec())
    }

    async fn comparables(&self, address: &str) -> Result<Vec<ComparableRecord>, LookupError> {
        let response = self
            .get(RequestKind::Comparables, COMPARABLES_PATH, &[("address", address)])
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(error_from_body(response).await);
        }

        let payload = response
            .json::<ComparablesPayload>()
            .await
            .map_err(|err| LookupError::transport(format!("invalid comparables response: {err}")))?;
        let comparables = payload.into_vec();
        info!(%address, count = comparables.len(), "comparables search resolved");
        Ok(comparables)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuggestionsPayload {
    List(Vec<String>),
    Wrapped { suggestions: Vec<String> },
}

impl SuggestionsPayload {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(items) | Self::Wrapped { suggestions: items } => items,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ComparablesPayload {
    List(Vec<ComparableRecord>),
    Wrapped { comparables: Vec<ComparableRecord> },
}

impl ComparablesPayload {
    fn into_vec(self) -> Vec<ComparableRecord> {
        match self {
            Self::List(items) | Self::Wrapped { comparables: items } => items,
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

fn not_found(address: &str) -> LookupError {
    LookupError::NotFound {
        address: address.to_string(),
    }
}

async fn error_from_body(response: Response) -> LookupError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(%status, "property data provider rejected request");
    if body.trim().is_empty() {
        LookupError::transport(format!("property data provider returned {status}"))
    } else {
        LookupError::transport(body)
    }
}
