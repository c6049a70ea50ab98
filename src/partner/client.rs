use async_trait::async_trait;

use crate::config::PartnerConfig;
use crate::domain::{DisbursementRequest, DisbursementResponse, PartnerClientError, PayoutPartner};

/// Client for the partner's create-disbursement endpoint.
///
/// Each call is a single POST with a bounded timeout. There is no retry: a
/// timed out request may still have been executed by the partner.
#[derive(Debug, Clone)]
pub struct PartnerClient {
    url: String,
    api_key: String,
    http: reqwest::Client,
}

impl PartnerClient {
    pub fn new(config: &PartnerConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            url: config.disbursement_url(),
            api_key: config.api_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl PayoutPartner for PartnerClient {
    async fn create_disbursement(
        &self,
        request: DisbursementRequest,
    ) -> Result<DisbursementResponse, PartnerClientError> {
        let request = request.with_default_currency();

        let response = self
            .http
            .post(&self.url)
            .header("X-API-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(network_error)?;
        tracing::debug!(
            reference_id = %request.reference_id,
            %status,
            "payout partner answered"
        );

        Ok(serde_json::from_slice(&body)?)
    }
}

fn network_error(error: reqwest::Error) -> PartnerClientError {
    PartnerClientError::Network(Box::new(error))
}
