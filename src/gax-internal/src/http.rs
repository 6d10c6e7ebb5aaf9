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

use gax::Result;
use gax::error::Error;
use gax::http_client::HttpClient;
use gax::response::RawResponse;

/// A [HttpClient] based on `reqwest`.
///
/// Returns a [RawResponse] for every status code. Only failures to send the
/// request or to receive the full response become errors.
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: crate::options::ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let inner = builder.build().map_err(Error::io)?;
        Ok(Self { inner })
    }

    /// Wraps an existing `reqwest::Client`, useful to share connection pools.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    async fn request_attempt(&self, url: &str) -> Result<RawResponse> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(Self::map_send_error)?;
        tracing::debug!(url, status = response.status().as_u16(), "received response");
        to_raw_response(url, response).await
    }

    fn map_send_error(err: reqwest::Error) -> Error {
        match err {
            e if e.is_timeout() => Error::timeout(e),
            e => Error::io(e),
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        self.request_attempt(url).await
    }
}

async fn to_raw_response(url: &str, response: reqwest::Response) -> Result<RawResponse> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .bytes()
        .await
        .map_err(ReqwestClient::map_send_error)?;
    Ok(RawResponse::from_parts(url, status, headers, body))
}
