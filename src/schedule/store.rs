//! Timeslot persistence
//!
//! The editor hands validated intervals to a [`TimeslotStore`]. The HTTP store posts
//! each one to `POST {base_url}/timeslots`; any success status counts as stored.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::editor::Weekday;
use super::error::StoreError;
use super::time::TimeOfDay;

/// One interval as the persistence endpoint expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeslotRequest {
    pub day_of_week: Weekday,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// Destination for validated intervals
#[async_trait]
pub trait TimeslotStore: Send + Sync {
    /// Persist a single interval
    async fn create(&self, slot: &TimeslotRequest) -> Result<(), StoreError>;
}

/// Timeslot store backed by the REST endpoint
pub struct HttpTimeslotStore {
    client: Client,
    base_url: String,
}

impl HttpTimeslotStore {
    /// Create a store for the API at `base_url` (e.g. "http://localhost:3000")
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a store that shares an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/timeslots", self.base_url)
    }
}

#[async_trait]
impl TimeslotStore for HttpTimeslotStore {
    async fn create(&self, slot: &TimeslotRequest) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(slot)
            .send()
            .await
            .map_err(StoreError::from_reqwest)?;

        if response.status().is_success() {
            tracing::debug!(
                day = %slot.day_of_week,
                start = %slot.start_time,
                end = %slot.end_time,
                "Timeslot stored"
            );
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            Err(StoreError::ApiError {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store that records every request and can fail on demand
    #[derive(Default)]
    pub(crate) struct RecordingStore {
        pub(crate) requests: Mutex<Vec<TimeslotRequest>>,
        /// Fail the call with this zero-based position
        pub(crate) fail_at: Option<usize>,
        calls: Mutex<usize>,
    }

    impl RecordingStore {
        pub(crate) fn failing_at(position: usize) -> Self {
            Self {
                fail_at: Some(position),
                ..Default::default()
            }
        }

        pub(crate) fn recorded(&self) -> Vec<TimeslotRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub(crate) fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl TimeslotStore for RecordingStore {
        async fn create(&self, slot: &TimeslotRequest) -> Result<(), StoreError> {
            let position = {
                let mut calls = self.calls.lock().unwrap();
                let position = *calls;
                *calls += 1;
                position
            };
            if self.fail_at == Some(position) {
                return Err(StoreError::ApiError {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            self.requests.lock().unwrap().push(slot.clone());
            Ok(())
        }
    }
}
