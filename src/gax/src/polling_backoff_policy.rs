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

//! Defines the pacing policies for long-running operation polling loops.
//!
//! # Example
//! ```
//! # use arm_gax::polling_backoff_policy::*;
//! # use arm_gax::polling_state::PollingState;
//! use std::time::Duration;
//! let policy = RetryAfterBackoff::default();
//! let state = PollingState::default()
//!     .set_poll_interval(Duration::from_secs(2))
//!     .set_retry_after(Duration::from_secs(5));
//! assert_eq!(policy.wait_period(&state), Duration::from_secs(5));
//! ```
//!
//! The engine waits between poll requests. The service may request a minimum
//! delay using the `Retry-After` header, the caller may request a fixed
//! polling interval, and the engine never polls more often than once per
//! second by default.

use crate::polling_state::PollingState;
use std::sync::Arc;
use std::time::Duration;

/// The default minimum delay between two poll requests.
pub const DEFAULT_MINIMUM_DELAY: Duration = Duration::from_secs(1);

/// Determines the delay between two poll requests.
pub trait PollingBackoffPolicy: Send + Sync + std::fmt::Debug {
    /// Returns the delay before the next poll request.
    ///
    /// # Parameters
    /// * `state` - the current state of the polling loop. This method is
    ///   always called after at least one response was received.
    fn wait_period(&self, state: &PollingState) -> Duration;
}

/// A helper type to use [PollingBackoffPolicy] in operation options.
#[derive(Clone, Debug)]
pub struct PollingBackoffPolicyArg(pub Arc<dyn PollingBackoffPolicy>);

impl<T: PollingBackoffPolicy + 'static> std::convert::From<T> for PollingBackoffPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn PollingBackoffPolicy>> for PollingBackoffPolicyArg {
    fn from(value: Arc<dyn PollingBackoffPolicy>) -> Self {
        Self(value)
    }
}

/// The default pacing policy.
///
/// Waits for the largest of (1) the polling interval requested by the caller,
/// (2) the delay requested by the service via `Retry-After`, and (3) a
/// minimum delay, which defaults to [DEFAULT_MINIMUM_DELAY].
///
/// # Example
/// ```
/// # use arm_gax::polling_backoff_policy::*;
/// # use arm_gax::polling_state::PollingState;
/// use std::time::Duration;
/// let policy = RetryAfterBackoff::default();
/// assert_eq!(policy.wait_period(&PollingState::default()), Duration::from_secs(1));
/// ```
#[derive(Clone, Debug)]
pub struct RetryAfterBackoff {
    minimum: Duration,
}

impl RetryAfterBackoff {
    /// Creates a policy with a custom minimum delay.
    ///
    /// Applications should rarely need to lower the minimum. It is useful in
    /// tests and when working with local emulators.
    ///
    /// # Example
    /// ```
    /// # use arm_gax::polling_backoff_policy::*;
    /// # use arm_gax::polling_state::PollingState;
    /// use std::time::Duration;
    /// let policy = RetryAfterBackoff::with_minimum(Duration::from_millis(10));
    /// assert_eq!(policy.wait_period(&PollingState::default()), Duration::from_millis(10));
    /// ```
    pub fn with_minimum(minimum: Duration) -> Self {
        Self { minimum }
    }

    /// The minimum delay between poll requests.
    pub fn minimum(&self) -> Duration {
        self.minimum
    }
}

impl Default for RetryAfterBackoff {
    fn default() -> Self {
        Self::with_minimum(DEFAULT_MINIMUM_DELAY)
    }
}

impl PollingBackoffPolicy for RetryAfterBackoff {
    fn wait_period(&self, state: &PollingState) -> Duration {
        [state.poll_interval, state.retry_after]
            .into_iter()
            .flatten()
            .fold(self.minimum, Duration::max)
    }
}
