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

use std::time::Duration;

/// The client configuration for [crate::http::ReqwestClient].
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout for each individual request.
    pub fn set_timeout<T: Into<Duration>>(mut self, v: T) -> Self {
        self.timeout = Some(v.into());
        self
    }

    /// Sets the `User-Agent` header for each request.
    pub fn set_user_agent<T: Into<String>>(mut self, v: T) -> Self {
        self.user_agent = Some(v.into());
        self
    }
}
