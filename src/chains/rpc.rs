//! Minimal JSON-RPC 2.0 client shared by the EVM and Solana sources

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::ChainError;

/// JSON-RPC endpoint
#[derive(Clone)]
pub struct JsonRpcClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, ChainError> {
        match (self.result, self.error) {
            (_, Some(err)) => Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

impl JsonRpcClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn post(&self, body: &Value) -> Result<reqwest::Response, ChainError> {
        let response = self.client.post(&self.url).json(body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChainError::Api {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(response)
    }

    /// Single call
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self.post(&body).await?.json().await?;
        let result = response.into_result()?;
        serde_json::from_value(result).map_err(|e| ChainError::Parse(format!("{}: {}", method, e)))
    }

    /// Batched call; results come back in request order
    ///
    /// A failing entry yields an `Err` in its slot without failing the
    /// whole batch.
    pub async fn batch(&self, calls: Vec<(&str, Value)>) -> Result<Vec<Result<Value, ChainError>>, ChainError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let body: Vec<Value> = calls
            .iter()
            .enumerate()
            .map(|(id, (method, params))| {
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "method": method,
                    "params": params,
                })
            })
            .collect();

        let responses: Vec<RpcResponse> = self.post(&Value::Array(body)).await?.json().await?;
        Ok(order_batch(calls.len(), responses))
    }
}

/// Place batch responses by id; missing ids become parse errors
fn order_batch(len: usize, responses: Vec<RpcResponse>) -> Vec<Result<Value, ChainError>> {
    let mut slots: Vec<Option<Result<Value, ChainError>>> = (0..len).map(|_| None).collect();

    for response in responses {
        if let Some(slot) = response.id.and_then(|id| slots.get_mut(id as usize)) {
            *slot = Some(response.into_result());
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.unwrap_or_else(|| Err(ChainError::Parse(format!("missing batch response {}", i))))
        })
        .collect()
}
