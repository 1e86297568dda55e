use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::Mutex;

use crate::errors::LlmResult;
use crate::providers::base::{Credentials, Endpoint, Transport};

/// A recorded transport call
#[derive(Debug, Clone)]
pub struct MockCall {
    pub payload: Value,
    pub credentials: Credentials,
    pub endpoint: Endpoint,
}

/// A mock transport that returns pre-configured bodies and records every call
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<Vec<Value>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockTransport {
    /// Create a new mock transport with a sequence of response bodies
    pub fn new(responses: Vec<Value>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(
        &self,
        payload: &Value,
        credentials: &Credentials,
        endpoint: &Endpoint,
    ) -> LlmResult<Value> {
        self.calls.lock().unwrap().push(MockCall {
            payload: payload.clone(),
            credentials: credentials.clone(),
            endpoint: endpoint.clone(),
        });

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Value::Null)
        } else {
            Ok(responses.remove(0))
        }
    }
}

/// Fails the test if anything tries to reach a provider
pub struct UnreachableTransport;

#[async_trait]
impl Transport for UnreachableTransport {
    async fn call(&self, _: &Value, _: &Credentials, endpoint: &Endpoint) -> LlmResult<Value> {
        panic!("unexpected transport call to {}", endpoint.url());
    }
}
