// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The state of a polling loop, as seen by the pacing policies.

use std::time::{Duration, Instant};

/// The current state of a polling loop.
///
/// The LRO engine creates one of these before each pacing delay and passes it
/// to the [PollingBackoffPolicy][crate::polling_backoff_policy::PollingBackoffPolicy].
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct PollingState {
    /// The start time for this polling loop.
    pub start: Instant,

    /// The number of poll requests completed in this polling loop.
    pub attempt_count: u32,

    /// The polling interval requested by the caller, if any.
    pub poll_interval: Option<Duration>,

    /// The delay requested by the service in the most recent response, if any.
    pub retry_after: Option<Duration>,
}

impl PollingState {
    /// Create a new instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the start time, useful in mocks.
    pub fn set_start<T: Into<Instant>>(mut self, v: T) -> Self {
        self.start = v.into();
        self
    }

    /// Update the attempt count, useful in mocks.
    pub fn set_attempt_count<T: Into<u32>>(mut self, v: T) -> Self {
        self.attempt_count = v.into();
        self
    }

    /// Update the caller's polling interval.
    pub fn set_poll_interval<T: Into<Option<Duration>>>(mut self, v: T) -> Self {
        self.poll_interval = v.into();
        self
    }

    /// Update the service's requested delay.
    pub fn set_retry_after<T: Into<Option<Duration>>>(mut self, v: T) -> Self {
        self.retry_after = v.into();
        self
    }
}

impl std::default::Default for PollingState {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            attempt_count: 0,
            poll_interval: None,
            retry_after: None,
        }
    }
}
