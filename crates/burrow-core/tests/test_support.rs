//! Shared test support utilities for integration tests

#![allow(dead_code)]

use burrow_core::http::{HeaderValue, Transport, TransportRequest, TransportResponse};
use burrow_core::{Api, Credentials, Error, Result};
use reqwest::header::LOCATION;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const BASE_URL: &str = "https://api.example.com/v1/";

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<TransportResponse>,
    requests: Vec<TransportRequest>,
    credentials: Vec<Credentials>,
}

/// In-memory transport replaying scripted responses
///
/// Clones share state, so a test can keep one handle for inspection while
/// the api owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body
    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.respond_with(TransportResponse::new(status, body))
    }

    pub fn respond_with(&self, response: TransportResponse) -> &Self {
        self.state.lock().unwrap().responses.push_back(response);
        self
    }

    /// Every request seen so far, oldest first
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> TransportRequest {
        self.requests()
            .pop()
            .expect("at least one request should have been sent")
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn credentials(&self) -> Vec<Credentials> {
        self.state.lock().unwrap().credentials.clone()
    }
}

impl Transport for MockTransport {
    fn request(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        state.responses.pop_front().ok_or_else(|| Error::Transport {
            message: "no scripted response left".to_string(),
            source: None,
        })
    }

    fn add_credentials(&mut self, credentials: &Credentials) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .credentials
            .push(credentials.clone());
        Ok(())
    }
}

/// An api rooted at [`BASE_URL`] talking through `transport`
pub fn api_with(transport: &MockTransport) -> Api {
    Api::builder()
        .base_url(BASE_URL)
        .transport(transport.clone())
        .build()
        .expect("test api should build")
}

/// A 201 response pointing at `location`
pub fn created(location: &str) -> TransportResponse {
    let mut response = TransportResponse::new(201, "");
    response.headers.insert(
        LOCATION,
        HeaderValue::from_str(location).expect("valid location header"),
    );
    response
}

/// A redirect response pointing at `location`
pub fn redirect(status: u16, location: &str) -> TransportResponse {
    let mut response = created(location);
    response.status = status;
    response
}

/// Body of a request as text
pub fn body_text(request: &TransportRequest) -> Option<String> {
    request
        .body
        .as_ref()
        .map(|body| String::from_utf8_lossy(body).into_owned())
}
