//! Single-use authorization tokens for mutating content calls
//!
//! Creating or updating a record is a two-step exchange: first an action token
//! is requested for a `(service, path, action)` triple, then the mutation is
//! sent carrying that token. If the first step fails the second never runs.

use netmera_client::{
    endpoints, params, ActionTokenEnvelope, Dispatcher, FormRequest, NetmeraError, Result,
};
use std::future::Future;
use tracing::debug;

/// What an action token authorizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionScope {
    pub service: String,
    pub path: String,
    pub action: String,
}

impl ActionScope {
    pub fn new(service: impl Into<String>, path: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
            action: action.into(),
        }
    }
}

/// Obtains action tokens and sequences them before a mutation
#[derive(Clone)]
pub struct ActionTokenGate {
    dispatcher: Dispatcher,
}

impl ActionTokenGate {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Request an action token for `scope`
    pub async fn authorize(&self, token: &str, scope: &ActionScope) -> Result<String> {
        let request = FormRequest::get(endpoints::ACTION_TOKEN, token)
            .param(params::PATH, &scope.path)
            .param(params::SERVICE, &scope.service)
            .param(params::ACTION, &scope.action);

        let envelope: ActionTokenEnvelope = self.dispatcher.send_as(request).await?;
        let key = envelope
            .entry
            .and_then(|entry| entry.key)
            .ok_or_else(|| NetmeraError::Io("action token missing from response".to_string()))?;

        debug!(action = %scope.action, path = %scope.path, "action token granted");
        Ok(key)
    }

    /// Authorize `scope`, then run `op` with the granted token
    pub async fn run<T, F, Fut>(&self, token: &str, scope: &ActionScope, op: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let action_token = self.authorize(token, scope).await?;
        op(action_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;
    use netmera_client::{ClientConfig, ErrorCode};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn scope() -> ActionScope {
        ActionScope::new(
            "netmera-mobimera",
            "/mobimeracontents",
            "netmera-mobimera:create-mobimera",
        )
    }

    #[tokio::test]
    async fn test_authorize_sends_scope() {
        let transport = RecordingTransport::with_responses(&[r#"{"entry": {"key": "act-1"}}"#]);
        let gate = ActionTokenGate::new(transport.dispatcher(ClientConfig::with_api_key("k")));

        let key = gate.authorize("k", &scope()).await.unwrap();
        assert_eq!(key, "act-1");

        let request = transport.request(0);
        assert!(request.url.ends_with("/social/rest/content/createActionToken"));
        assert_eq!(request.query_value("st"), Some("k"));
        assert_eq!(request.query_value("path"), Some("/mobimeracontents"));
        assert_eq!(request.query_value("service"), Some("netmera-mobimera"));
        assert_eq!(request.query_value("action"), Some("netmera-mobimera:create-mobimera"));
    }

    #[tokio::test]
    async fn test_missing_key_is_io() {
        for body in [r#"{"entry": {}}"#, r#"{"other": 1}"#] {
            let transport = RecordingTransport::with_responses(&[body]);
            let gate = ActionTokenGate::new(transport.dispatcher(ClientConfig::default()));
            let err = gate.authorize("k", &scope()).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::Io);
        }
    }

    #[tokio::test]
    async fn test_failed_authorization_skips_mutation() {
        let transport = RecordingTransport::with_statuses(&[(500, "")]);
        let gate = ActionTokenGate::new(transport.dispatcher(ClientConfig::default()));
        let ran = AtomicBool::new(false);

        let result = gate
            .run("k", &scope(), |_token| async {
                ran.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(result.is_err());
        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_run_passes_token_through() {
        let transport = RecordingTransport::with_responses(&[r#"{"entry": {"key": "act-2"}}"#]);
        let gate = ActionTokenGate::new(transport.dispatcher(ClientConfig::default()));

        let seen = gate
            .run("k", &scope(), |token| async move { Ok(token) })
            .await
            .unwrap();
        assert_eq!(seen, "act-2");
    }
}
