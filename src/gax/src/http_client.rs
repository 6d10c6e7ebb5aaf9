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

use crate::Result;
use crate::response::RawResponse;

/// The transport used by the LRO engine to poll operations.
///
/// The engine only issues `GET` requests: to the polling URL while the
/// operation is running, and at most once to fetch the final result.
///
/// Implementations must return a [RawResponse] for **every** status code.
/// The engine classifies non-2xx responses itself. Errors are reserved for
/// failures to send the request or receive the response, and should be
/// reported as [Error::io][crate::error::Error::io] or
/// [Error::timeout][crate::error::Error::timeout].
///
/// Implementations should not retry requests. Retry policies for ordinary
/// requests belong in the transport stack below this trait, if at all.
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Sends a `GET` request to `url` and returns the complete response.
    async fn get(&self, url: &str) -> Result<RawResponse>;
}

#[async_trait::async_trait]
impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        T::get(self, url).await
    }
}
