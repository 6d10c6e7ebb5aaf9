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

use gax::error::{Error, OperationError};
use gax::response::RawResponse;
use std::sync::Arc;

/// The state of a long-running operation.
///
/// Operations start as [Running][OperationState::Running], unless the trigger
/// response shows the operation already completed. The other states are
/// terminal, an operation never leaves them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OperationState {
    #[default]
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationState {
    /// Returns true for [Succeeded][Self::Succeeded], [Failed][Self::Failed],
    /// and [Canceled][Self::Canceled].
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Maps the value of a status field to a state.
    ///
    /// The comparison is case insensitive. Any value other than the terminal
    /// names means the operation is still running, services use many different
    /// names (`InProgress`, `Updating`, `Deleting`, ...) for that.
    pub(crate) fn from_status(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("succeeded") {
            Self::Succeeded
        } else if value.eq_ignore_ascii_case("failed") {
            Self::Failed
        } else if value.eq_ignore_ascii_case("canceled") || value.eq_ignore_ascii_case("cancelled")
        {
            Self::Canceled
        } else {
            Self::Running
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the engine knows about a long-running operation.
///
/// Once the state is terminal the snapshot is frozen. When the state is
/// [Succeeded][OperationState::Succeeded] the snapshot holds either the
/// decoded value or the reason the value is unavailable. When the state is
/// [Failed][OperationState::Failed] or [Canceled][OperationState::Canceled]
/// it holds the error reported by the service.
#[derive(Clone, Debug)]
pub struct Snapshot<T> {
    state: OperationState,
    last_response: RawResponse,
    value: Option<T>,
    error: Option<OperationError>,
    result_error: Option<Arc<Error>>,
}

impl<T> Snapshot<T> {
    pub(crate) fn running(last_response: RawResponse) -> Self {
        Self {
            state: OperationState::Running,
            last_response,
            value: None,
            error: None,
            result_error: None,
        }
    }

    /// The current state.
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Returns true if the state is terminal.
    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns true if the operation succeeded and its value is available.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// The decoded value of a successful operation.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The error reported by the service for failed or canceled operations.
    pub fn error(&self) -> Option<&OperationError> {
        self.error.as_ref()
    }

    /// Why the value of a successful operation is unavailable.
    ///
    /// Set only if the operation succeeded, but fetching or decoding the
    /// final result failed.
    pub fn result_error(&self) -> Option<&Error> {
        self.result_error.as_deref()
    }

    /// The most recent response received by the engine.
    pub fn last_response(&self) -> &RawResponse {
        &self.last_response
    }

    pub(crate) fn shared_result_error(&self) -> Option<Arc<Error>> {
        self.result_error.clone()
    }

    pub(crate) fn into_value(self) -> Option<T> {
        self.value
    }

    pub(crate) fn set_last_response(&mut self, response: RawResponse) {
        self.last_response = response;
    }

    pub(crate) fn succeed(&mut self, result: gax::Result<T>) {
        if self.is_complete() {
            return;
        }
        self.state = OperationState::Succeeded;
        match result {
            Ok(v) => self.value = Some(v),
            Err(e) => self.result_error = Some(Arc::new(e)),
        }
    }

    pub(crate) fn fail(&mut self, state: OperationState, error: OperationError) {
        if self.is_complete() || !state.is_terminal() || state == OperationState::Succeeded {
            return;
        }
        self.state = state;
        self.error = Some(error);
    }
}

impl<T: PartialEq> PartialEq for Snapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        let same_result_error = match (&self.result_error, &other.result_error) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.state == other.state
            && self.last_response == other.last_response
            && self.value == other.value
            && self.error == other.error
            && same_result_error
    }
}
