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

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A complete HTTP exchange as seen by the LRO engine.
///
/// The engine only needs the status code, the headers, and the body of each
/// response. It also needs the URL of the request that produced the response,
/// relative `Location` headers are resolved against it.
///
/// # Example
/// ```
/// # use arm_gax::response::RawResponse;
/// let response = RawResponse::new("https://svc/res/xyz", http::StatusCode::OK)
///     .set_header("retry-after", "5")
///     .set_body(r#"{"status":"InProgress"}"#);
/// assert!(response.is_success());
/// assert_eq!(response.retry_after(), Some(std::time::Duration::from_secs(5)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawResponse {
    url: String,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Creates a response with the given request URL and status code.
    pub fn new<T: Into<String>>(url: T, status: StatusCode) -> Self {
        Self {
            url: url.into(),
            status,
            ..Default::default()
        }
    }

    /// Creates a response from its parts.
    pub fn from_parts<T: Into<String>>(
        url: T,
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            headers,
            body,
        }
    }

    /// Replaces all the headers.
    pub fn set_headers(mut self, v: HeaderMap) -> Self {
        self.headers = v;
        self
    }

    /// Adds a single header.
    ///
    /// Invalid header names or values are ignored. This function is intended
    /// for tests and mocks, transports should use [set_headers][Self::set_headers].
    pub fn set_header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name = http::HeaderName::from_bytes(name.as_ref().as_bytes());
        let value = http::HeaderValue::from_str(value.as_ref());
        if let (Ok(name), Ok(value)) = (name, value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Replaces the body.
    pub fn set_body<T: Into<Bytes>>(mut self, v: T) -> Self {
        self.body = v.into();
        self
    }

    /// The URL of the request that produced this response.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns true for 2xx status codes.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the value of a header, if present and valid UTF-8.
    ///
    /// Header names are case insensitive.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The delay requested by the service via the `Retry-After` header.
    ///
    /// Only the delay-seconds form is supported. Missing or unparseable values
    /// return `None`.
    pub fn retry_after(&self) -> Option<Duration> {
        self.header_str(http::header::RETRY_AFTER.as_str())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}
