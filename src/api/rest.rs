//! REST implementation of the ledger-management API
//!
//! One request per call, no automatic retries: remote failures are
//! classified by response code and surfaced to the caller unchanged.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::api::models::{
    BalanceModel, BroadcastRequest, CreateOperationRequest, FaucetTransactionModel,
    OperationModel, PageModel, StakingContextModel, StakingContextRequest,
};
use crate::api::{BalanceScope, LedgerApi};
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Error body returned by the platform on non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    correlation_id: String,
}

/// REST client for the ledger-management API.
pub struct RestLedgerApi {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestLedgerApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        let api_key = if config.api_key.is_empty() {
            None
        } else {
            Some(config.api_key.clone())
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?method, "API request");
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| Error::MalformedResponse(e.to_string()))
        } else {
            let body = response.json::<ApiErrorBody>().await.unwrap_or(ApiErrorBody {
                code: String::new(),
                message: String::new(),
                correlation_id: String::new(),
            });
            Err(classify_error(status, body))
        }
    }

    fn balance_path(scope: &BalanceScope) -> String {
        match scope {
            BalanceScope::Wallet { wallet_id } => format!("/wallets/{wallet_id}/balances"),
            BalanceScope::Address {
                wallet_id,
                address_id,
            } => format!("/wallets/{wallet_id}/addresses/{address_id}/balances"),
        }
    }
}

/// Map a non-2xx response to the error taxonomy.
fn classify_error(status: StatusCode, body: ApiErrorBody) -> Error {
    let ApiErrorBody {
        code,
        message,
        correlation_id,
    } = body;
    match status {
        StatusCode::NOT_FOUND => Error::NotFound {
            code,
            message,
            correlation_id,
        },
        StatusCode::BAD_REQUEST => Error::MalformedRequest {
            code,
            message,
            correlation_id,
        },
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            code,
            message,
            correlation_id,
        },
        StatusCode::CONFLICT => Error::AlreadyExists {
            code,
            message,
            correlation_id,
        },
        other => Error::Api {
            status: other.as_u16(),
            code,
            message,
            correlation_id,
        },
    }
}

#[async_trait]
impl LedgerApi for RestLedgerApi {
    async fn create_operation(
        &self,
        wallet_id: &str,
        address_id: &str,
        request: &CreateOperationRequest,
    ) -> Result<OperationModel> {
        let path = format!("/wallets/{wallet_id}/addresses/{address_id}/operations");
        self.execute(self.request(Method::POST, &path).json(request))
            .await
    }

    async fn broadcast_operation(
        &self,
        wallet_id: &str,
        address_id: &str,
        operation_id: &str,
        request: &BroadcastRequest,
    ) -> Result<OperationModel> {
        let path = format!(
            "/wallets/{wallet_id}/addresses/{address_id}/operations/{operation_id}/broadcast"
        );
        self.execute(self.request(Method::POST, &path).json(request))
            .await
    }

    async fn get_operation(
        &self,
        wallet_id: &str,
        address_id: &str,
        operation_id: &str,
    ) -> Result<OperationModel> {
        let path =
            format!("/wallets/{wallet_id}/addresses/{address_id}/operations/{operation_id}");
        self.execute(self.request(Method::GET, &path)).await
    }

    async fn list_operations(
        &self,
        wallet_id: &str,
        address_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<PageModel<OperationModel>> {
        let path = format!("/wallets/{wallet_id}/addresses/{address_id}/operations");
        let mut builder = self
            .request(Method::GET, &path)
            .query(&[("pageSize", page_size.to_string())]);
        if let Some(token) = page_token {
            builder = builder.query(&[("pageToken", token)]);
        }
        self.execute(builder).await
    }

    async fn list_balances(
        &self,
        scope: &BalanceScope,
        page_token: Option<&str>,
    ) -> Result<PageModel<BalanceModel>> {
        let mut builder = self.request(Method::GET, &Self::balance_path(scope));
        if let Some(token) = page_token {
            builder = builder.query(&[("pageToken", token)]);
        }
        self.execute(builder).await
    }

    async fn get_balance(
        &self,
        scope: &BalanceScope,
        asset_id: &str,
    ) -> Result<Option<BalanceModel>> {
        let path = format!("{}/{asset_id}", Self::balance_path(scope));
        match self.execute(self.request(Method::GET, &path)).await {
            Ok(balance) => Ok(Some(balance)),
            // absence of server data maps to "no balance", never an error
            Err(Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_staking_context(
        &self,
        request: &StakingContextRequest,
    ) -> Result<StakingContextModel> {
        self.execute(self.request(Method::POST, "/stake/context").json(request))
            .await
    }

    async fn request_faucet_funds(
        &self,
        wallet_id: &str,
        address_id: &str,
        asset_id: Option<&str>,
    ) -> Result<FaucetTransactionModel> {
        let path = format!("/wallets/{wallet_id}/addresses/{address_id}/faucet");
        let mut builder = self.request(Method::POST, &path);
        if let Some(asset) = asset_id {
            builder = builder.query(&[("assetId", asset)]);
        }
        self.execute(builder).await
    }
}
