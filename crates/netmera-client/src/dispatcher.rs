//! Request dispatcher for the Netmera REST and RPC endpoints
//!
//! Two encodings exist and each backend method expects exactly one:
//! - **Form**: every parameter travels in the query string, led by `st=<token>`;
//!   a JSON content payload, when present, is the trailing `content` pair.
//! - **RPC**: a POST to `/social/rpc` whose JSON body is a `{method, params}`
//!   envelope.

use crate::config::ClientConfig;
use crate::error::{NetmeraError, Result};
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use crate::types::params;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const REST_PREFIX: &str = "/social/rest";
const RPC_PATH: &str = "/social/rpc";

/// A query/form-encoded request
#[derive(Debug, Clone)]
pub struct FormRequest {
    method: Method,
    endpoint: String,
    token: String,
    params: Vec<(String, String)>,
    content: Option<Value>,
}

impl FormRequest {
    pub fn new(method: Method, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            token: token.into(),
            params: Vec::new(),
            content: None,
        }
    }

    pub fn get(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint, token)
    }

    pub fn post(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint, token)
    }

    /// Append a parameter; order is preserved on the wire
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Append a parameter only when a value is present
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Attach a JSON content payload
    pub fn content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// An RPC-style request
#[derive(Debug, Clone)]
pub struct RpcRequest {
    method: String,
    token: String,
    params: Map<String, Value>,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            token: token.into(),
            params: Map::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param_opt(self, key: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

/// Issues requests and turns transport outcomes into typed results
///
/// # Example
///
/// ```rust,no_run
/// use netmera_client::{ClientConfig, Dispatcher, FormRequest};
///
/// # async fn example() -> netmera_client::Result<()> {
/// let dispatcher = Dispatcher::new(ClientConfig::with_api_key("my-key"))?;
/// let response = dispatcher
///     .send(FormRequest::get("/content/get", "my-key").param("path", "/mobimeracontents/1"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    /// Create a dispatcher backed by `reqwest`
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout_secs)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a dispatcher over a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ==================== Form encoding ====================

    /// Send a form request and return the parsed, non-empty JSON body
    pub async fn send(&self, request: FormRequest) -> Result<Value> {
        let FormRequest {
            method,
            endpoint,
            token,
            params: pairs,
            content,
        } = request;

        let mut query = Vec::with_capacity(pairs.len() + 2);
        query.push((params::SECURITY_TOKEN.to_string(), token));
        query.extend(pairs);
        if let Some(content) = content {
            query.push((params::CONTENT.to_string(), serde_json::to_string(&content)?));
        }

        let http = HttpRequest {
            method,
            url: format!("{}{}{}", self.config.origin(), REST_PREFIX, endpoint),
            query,
            body: None,
        };

        self.execute(&endpoint, http).await
    }

    /// Send a form request and decode the body into `T`
    pub async fn send_as<T: DeserializeOwned>(&self, request: FormRequest) -> Result<T> {
        let endpoint = request.endpoint.clone();
        let value = self.send(request).await?;
        decode(&endpoint, value)
    }

    // ==================== RPC encoding ====================

    /// Send an RPC request and return the parsed, non-empty JSON body
    pub async fn send_rpc(&self, request: RpcRequest) -> Result<Value> {
        let RpcRequest {
            method,
            token,
            params: rpc_params,
        } = request;

        let body = serde_json::json!({
            "method": &method,
            "params": &rpc_params,
        });

        let http = HttpRequest {
            method: Method::Post,
            url: format!("{}{}", self.config.origin(), RPC_PATH),
            query: vec![(params::SECURITY_TOKEN.to_string(), token)],
            body: Some(body),
        };

        self.execute(&method, http).await
    }

    /// Send an RPC request and decode the body into `T`
    pub async fn send_rpc_as<T: DeserializeOwned>(&self, request: RpcRequest) -> Result<T> {
        let method = request.method.clone();
        let value = self.send_rpc(request).await?;
        decode(&method, value)
    }

    // ==================== Helper Methods ====================

    async fn execute(&self, label: &str, request: HttpRequest) -> Result<Value> {
        debug!(method = %request.method, endpoint = label, "dispatching request");

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = label, error = %e, "transport failure");
                return Err(e);
            }
        };

        if response.status != 200 {
            warn!(endpoint = label, status = response.status, "request failed");
            return Err(NetmeraError::Io(format!("HTTP {}", response.status)));
        }

        let value: Value = serde_json::from_str(&response.body).map_err(|e| {
            warn!(endpoint = label, error = %e, "response is not JSON");
            NetmeraError::InvalidJson(e)
        })?;

        // An empty answer is reported like a transport failure.
        if is_falsy(&value) {
            warn!(endpoint = label, "empty response");
            return Err(NetmeraError::Io("empty response".to_string()));
        }

        debug!(endpoint = label, status = response.status, "request succeeded");
        Ok(value)
    }
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` are falsy
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn decode<T: DeserializeOwned>(label: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        warn!(endpoint = label, error = %e, "unexpected response shape");
        NetmeraError::InvalidResponse(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Canned {
        response: HttpResponse,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: HttpResponse {
                    status,
                    body: body.to_string(),
                },
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn dispatcher(transport: Arc<Canned>) -> Dispatcher {
        Dispatcher::with_transport(ClientConfig::with_api_key("app-key"), transport)
    }

    #[tokio::test]
    async fn test_form_request_layout() {
        let transport = Canned::new(200, r#"{"entry": []}"#);
        let dispatcher = dispatcher(transport.clone());

        dispatcher
            .send(
                FormRequest::post("/content/createContent", "tok")
                    .param("path", "/mobimeracontents")
                    .content(serde_json::json!({"title": "Hi"})),
            )
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "http://netmera.com/social/rest/content/createContent");
        assert_eq!(request.query[0], ("st".to_string(), "tok".to_string()));
        assert_eq!(request.query[1], ("path".to_string(), "/mobimeracontents".to_string()));
        assert_eq!(request.query_value("content"), Some(r#"{"title":"Hi"}"#));
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_rpc_request_layout() {
        let transport = Canned::new(200, r#"{"data": {"st": "user-token"}}"#);
        let dispatcher = dispatcher(transport.clone());

        dispatcher
            .send_rpc(RpcRequest::new("site.login", "tok").param("email", "a@b.c"))
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.url, "http://netmera.com/social/rpc");
        assert_eq!(request.query, vec![("st".to_string(), "tok".to_string())]);
        let body = request.body.as_ref().unwrap();
        assert_eq!(body["method"], "site.login");
        assert_eq!(body["params"]["email"], "a@b.c");
    }

    #[tokio::test]
    async fn test_non_200_is_io() {
        let dispatcher = dispatcher(Canned::new(500, "oops"));
        let err = dispatcher.send(FormRequest::get("/content/get", "t")).await.unwrap_err();
        assert!(matches!(err, NetmeraError::Io(_)));
    }

    #[tokio::test]
    async fn test_falsy_body_is_io() {
        for body in ["null", "false", "0", "\"\""] {
            let dispatcher = dispatcher(Canned::new(200, body));
            let err = dispatcher.send(FormRequest::get("/content/get", "t")).await.unwrap_err();
            assert!(matches!(err, NetmeraError::Io(_)), "body {} should fail", body);
        }
    }

    #[tokio::test]
    async fn test_empty_object_is_success() {
        let dispatcher = dispatcher(Canned::new(200, "{}"));
        let value = dispatcher.send(FormRequest::get("/content/get", "t")).await.unwrap();
        assert!(value.as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_json() {
        let dispatcher = dispatcher(Canned::new(200, "<html>"));
        let err = dispatcher.send(FormRequest::get("/content/get", "t")).await.unwrap_err();
        assert!(matches!(err, NetmeraError::InvalidJson(_)));
    }
}
