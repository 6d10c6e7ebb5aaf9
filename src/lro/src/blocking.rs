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

//! Track long-running operations from synchronous code.
//!
//! The types in this module wrap the asynchronous [Operation][crate::Operation]
//! and a private, single-threaded runtime. Each call blocks the calling thread
//! until the poll request or the polling loop completes.
//!
//! <div class="warning">
//! Do not use these types from asynchronous code. Creating or driving an
//! operation from within a runtime returns an error.
//! </div>

use crate::{Decoder, OperationOptions, OperationState, Snapshot};
use gax::Result;
use gax::error::Error;
use gax::http_client::HttpClient;
use gax::response::RawResponse;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

/// Starts tracking a long-running operation, see [crate::begin_operation].
pub fn begin_operation<T>(
    client: Arc<dyn HttpClient>,
    trigger: RawResponse,
    options: OperationOptions,
    decoder: Decoder<T>,
) -> Result<Operation<T>> {
    let inner = crate::begin_operation(client, trigger, options, decoder)?;
    Operation::new(inner)
}

/// A long-running operation tracked from synchronous code.
///
/// Same semantics as [crate::Operation]. Cancellation tokens may be cancelled
/// from other threads to stop a blocked call.
#[derive(Debug)]
pub struct Operation<T> {
    inner: crate::Operation<T>,
    runtime: Runtime,
}

impl<T> Operation<T> {
    /// Wraps an asynchronous operation.
    ///
    /// Fails if called from within a runtime.
    pub fn new(inner: crate::Operation<T>) -> Result<Self> {
        outside_runtime()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::io)?;
        Ok(Self { inner, runtime })
    }

    /// Performs at most one poll request, see [crate::Operation::advance].
    pub fn advance(&mut self, cancel: &CancellationToken) -> Result<&Snapshot<T>> {
        outside_runtime()?;
        self.runtime.block_on(self.inner.advance(cancel))
    }

    /// Polls until the operation completes, see [crate::Operation::until_done].
    pub fn until_done(
        &mut self,
        cancel: &CancellationToken,
        poll_interval: Option<Duration>,
    ) -> Result<&T> {
        outside_runtime()?;
        self.runtime
            .block_on(self.inner.until_done(cancel, poll_interval))
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn snapshot(&self) -> &Snapshot<T> {
        self.inner.snapshot()
    }

    pub fn state(&self) -> OperationState {
        self.inner.state()
    }

    pub fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    pub fn has_value(&self) -> bool {
        self.inner.has_value()
    }

    pub fn current_value(&self) -> Option<&T> {
        self.inner.current_value()
    }

    pub fn last_raw_response(&self) -> &RawResponse {
        self.inner.last_raw_response()
    }

    pub fn into_value(self) -> Option<T> {
        self.inner.into_value()
    }

    /// Returns the asynchronous operation.
    pub fn into_inner(self) -> crate::Operation<T> {
        self.inner
    }
}

// `block_on` panics when the calling thread already drives a runtime.
fn outside_runtime() -> Result<()> {
    match tokio::runtime::Handle::try_current() {
        Ok(_) => Err(Error::io(
            "blocking operations cannot be used from within an asynchronous runtime",
        )),
        Err(_) => Ok(()),
    }
}
