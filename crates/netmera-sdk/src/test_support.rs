//! Scripted transport for unit tests

use async_trait::async_trait;
use netmera_client::{
    ClientConfig, Dispatcher, HttpRequest, HttpResponse, NetmeraError, Result, Transport,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued responses in order and records every request
pub struct RecordingTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    /// Queue 200 responses with the given bodies
    pub fn with_responses(bodies: &[&str]) -> Arc<Self> {
        Self::queued(bodies.iter().map(|body| HttpResponse::ok(*body)).collect())
    }

    pub fn with_statuses(responses: &[(u16, &str)]) -> Arc<Self> {
        Self::queued(
            responses
                .iter()
                .map(|(status, body)| HttpResponse {
                    status: *status,
                    body: body.to_string(),
                })
                .collect(),
        )
    }

    fn queued(responses: VecDeque<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn dispatcher(self: &Arc<Self>, config: ClientConfig) -> Dispatcher {
        Dispatcher::with_transport(config, self.clone())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> HttpRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| NetmeraError::Io("no scripted response left".to_string()))
    }
}
