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

//! Types and functions to track long-running operations in REST APIs.
//!
//! Many REST APIs start provisioning actions (create, update, delete) that do
//! not complete within the initial HTTP request. The service responds with
//! `201 Created` or `202 Accepted`, and signals where to poll for progress
//! with the `Azure-AsyncOperation` or `Location` headers. Some resources
//! report their progress in a `status` or `provisioningState` field instead.
//!
//! This crate turns the response to the triggering request into an
//! [Operation]. The operation polls the service until the action completes,
//! and then fetches and decodes its result.
//!
//! # Example
//! ```
//! use arm_lro::{Decoder, FinalStateVia, OperationOptions, begin_operation};
//! use gax::http_client::HttpClient;
//! use gax::response::RawResponse;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, serde::Deserialize)]
//! struct VirtualMachine {
//!     name: String,
//! }
//!
//! async fn create_vm(client: Arc<dyn HttpClient>, trigger: RawResponse) -> gax::Result<String> {
//!     let options = OperationOptions::new()
//!         .set_request_method(http::Method::PUT)
//!         .set_final_state_via(FinalStateVia::FetchLocationHeader)
//!         .set_name("VirtualMachinesCreateOperation");
//!     let mut operation = begin_operation(client, trigger, options, Decoder::<VirtualMachine>::json())?;
//!     let cancel = CancellationToken::new();
//!     let vm = operation.until_done(&cancel, Some(Duration::from_secs(5))).await?;
//!     Ok(vm.name.clone())
//! }
//! ```

use gax::Result;
use gax::error::Error;
use gax::http_client::HttpClient;
use gax::response::RawResponse;
use std::sync::Arc;

pub mod blocking;
mod context;
mod decoder;
mod error;
mod operation;
mod options;
mod poll;
mod resolver;
mod snapshot;

pub use decoder::Decoder;
pub use error::MalformedResponse;
pub use operation::Operation;
pub use options::{DEFAULT_STATUS_FIELDS, FinalStateVia, OperationOptions};
pub use snapshot::{OperationState, Snapshot};

/// Starts tracking a long-running operation.
///
/// # Parameters
/// * `client` - the transport used to poll the operation.
/// * `trigger` - the response to the request that started the operation.
/// * `options` - how to track this operation.
/// * `decoder` - converts the final response into the operation result.
///
/// # Errors
/// * [Error::is_malformed_trigger] - the response neither completes the
///   operation nor says where to poll for progress.
/// * [Error::is_unexpected_status] - the trigger response is not a 2xx
///   response, there is no operation to track.
pub fn begin_operation<T>(
    client: Arc<dyn HttpClient>,
    trigger: RawResponse,
    options: OperationOptions,
    decoder: Decoder<T>,
) -> Result<Operation<T>> {
    Operation::new(client, trigger, options, decoder)
}

/// The result of each step in an operation stream.
///
/// See [Operation::into_stream].
#[derive(Debug)]
pub enum PollingResult<T> {
    /// The operation is still in progress.
    InProgress(OperationState),
    /// The operation completed. This includes the result.
    Completed(Result<T>),
    /// An error trying to poll the operation.
    ///
    /// Not all errors indicate that the operation failed. For example, this
    /// may fail because it was not possible to connect to the service. Such
    /// transient errors may disappear in the next polling attempt, see
    /// [Error::is_resumable].
    PollingError(Error),
}
