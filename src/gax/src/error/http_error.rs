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

use super::OperationError;
use bytes::Bytes;
use http::HeaderMap;

/// An error describing a non-2xx HTTP response.
#[derive(Debug, Default, Clone)]
pub struct HttpError {
    status_code: u16,
    headers: HeaderMap,
    payload: Bytes,
}

impl HttpError {
    /// Creates a new [HttpError] with the given status code, headers, and payload.
    pub fn new(status_code: u16, headers: HeaderMap, payload: Bytes) -> Self {
        Self {
            status_code,
            headers,
            payload,
        }
    }

    /// Returns the status code associated with the HTTP error response.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns the payload associated with the HTTP error response.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Returns the headers associated with the HTTP error response.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HTTP Error: code={}, headers={:?}",
            self.status_code, self.headers
        )?;
        if self.payload.is_empty() {
            return Ok(());
        }
        if let Ok(details) = OperationError::try_from(&self.payload) {
            return write!(f, ", payload:\n{details:?}");
        }
        write!(f, ", payload:\n{:?}", self.payload)
    }
}

impl std::error::Error for HttpError {}
