//! JSON-RPC client for the certificate service.
//!
//! Every call is a POST to `<server>/json`:
//!
//! ```json
//! {"method": "cert_show", "params": [["17"], {"chain": true, "version": "1.0"}], "id": 0}
//! ```
//!
//! and answers `{"result": ..., "error": null, "id": 0}` or
//! `{"result": null, "error": {"code": ..., "name": ..., "message": ..., "kw": {...}}, "id": 0}`.

use async_trait::async_trait;
use custos_cert::{
    CertResult, CertService, FindCriteria, FindResult, IssueOptions, RequestData,
    RequestDataParams, ShowOptions,
};
use custos_errors::{decode_from_peer, PublicError, WireError};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::RpcError;

/// Header carrying the authentication token.
pub const TOKEN_HEADER: &str = "X-Custos-Token";

/// JSON-RPC request envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Command name.
    pub method: String,
    /// Positional arguments and options.
    pub params: (Vec<Value>, Map<String, Value>),
    /// Request id.
    pub id: u64,
}

/// JSON-RPC response envelope.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Command output on success.
    #[serde(default)]
    pub result: Option<Value>,
    /// Public error on failure.
    #[serde(default)]
    pub error: Option<WireError>,
    /// Echoed request id.
    #[serde(default)]
    pub id: Option<Value>,
}

/// HTTP client for a Custos server.
#[derive(Debug)]
pub struct RpcClient {
    client: Client,
    config: ClientConfig,
    endpoint: String,
}

impl RpcClient {
    /// Creates a client for `config`.
    pub fn new(config: ClientConfig) -> Result<Self, RpcError> {
        reqwest::Url::parse(&config.endpoint())
            .map_err(|e| RpcError::Client(format!("invalid server URL {:?}: {}", config.server, e)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RpcError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            config,
        })
    }

    /// Endpoint URL calls are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds the envelope for `method`.
    fn envelope<O: Serialize>(
        &self,
        method: &str,
        args: Vec<Value>,
        options: &O,
    ) -> Result<RpcRequest, PublicError> {
        let mut options = match serde_json::to_value(options) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                return Err(RpcError::Client(format!("cannot encode options: {}", e)).into())
            },
        };
        options.insert(
            "version".to_string(),
            Value::String(self.config.api_version.clone()),
        );

        Ok(RpcRequest {
            method: method.to_string(),
            params: (args, options),
            id: 0,
        })
    }

    /// Invokes `method` and decodes its result.
    pub async fn call<O, R>(&self, method: &str, args: Vec<Value>, options: &O) -> Result<R, PublicError>
    where
        O: Serialize,
        R: DeserializeOwned,
    {
        let request = self.envelope(method, args, options)?;
        debug!(method = method, endpoint = %self.endpoint, "calling server");

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.config.token {
            builder = builder.header(TOKEN_HEADER, token);
        }

        let response = builder.send().await.map_err(|e| RpcError::Connect {
            uri: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| RpcError::Connect {
            uri: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        interpret(&self.endpoint, status, &body)
    }
}

/// Turns an HTTP answer into the command result or a public error.
pub(crate) fn interpret<R: DeserializeOwned>(
    uri: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<R, PublicError> {
    let malformed = |reason: String| -> PublicError {
        RpcError::Malformed {
            uri: uri.to_string(),
            reason,
        }
        .into()
    };

    let response: RpcResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(_) if status == StatusCode::UNAUTHORIZED => {
            return Err(RpcError::Unauthorized {
                uri: uri.to_string(),
            }
            .into())
        },
        Err(e) => return Err(malformed(format!("HTTP {}: {}", status.as_u16(), e))),
    };

    if let Some(wire) = response.error {
        debug!(code = wire.code, name = %wire.name, "server reported an error");
        return Err(decode_from_peer(wire, uri));
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(RpcError::Unauthorized {
            uri: uri.to_string(),
        }
        .into());
    }
    if !status.is_success() {
        return Err(malformed(format!("HTTP {} without error", status.as_u16())));
    }

    let result = response
        .result
        .ok_or_else(|| malformed("response has neither result nor error".into()))?;
    serde_json::from_value(result).map_err(|e| malformed(e.to_string()))
}

#[async_trait]
impl CertService for RpcClient {
    async fn cert_get_requestdata(
        &self,
        params: RequestDataParams,
    ) -> Result<RequestData, PublicError> {
        self.call("cert_get_requestdata", Vec::new(), &params).await
    }

    async fn cert_request(
        &self,
        csr: String,
        options: IssueOptions,
    ) -> Result<CertResult, PublicError> {
        self.call("cert_request", vec![Value::String(csr)], &options).await
    }

    async fn cert_show(
        &self,
        serial: String,
        options: ShowOptions,
    ) -> Result<CertResult, PublicError> {
        self.call("cert_show", vec![Value::String(serial)], &options).await
    }

    async fn cert_find(&self, criteria: FindCriteria) -> Result<FindResult, PublicError> {
        self.call("cert_find", Vec::new(), &criteria).await
    }
}
