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
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A fake transport that returns a scripted sequence of results.
///
/// Each call to [get][HttpClient::get] pops the next result and records the
/// requested URL. Responses are re-addressed to the requested URL, so scripts
/// do not need to repeat it. Once the script is exhausted every call fails
/// with an I/O error.
///
/// Clones share the script and the request log.
#[derive(Clone, Debug, Default)]
pub struct ScriptedClient {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    script: VecDeque<Result<RawResponse>>,
    requests: Vec<String>,
}

impl ScriptedClient {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<RawResponse>>,
    {
        let state = State {
            script: script.into_iter().collect(),
            requests: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Appends a result to the script.
    pub fn push(&self, result: Result<RawResponse>) {
        self.lock().script.push_back(result);
    }

    /// The URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    /// The number of scripted results not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lock().script.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedClient {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        let next = {
            let mut state = self.lock();
            state.requests.push(url.to_string());
            state.script.pop_front()
        };
        match next {
            None => Err(Error::io(format!("script exhausted, unexpected GET {url}"))),
            Some(Err(e)) => Err(e),
            Some(Ok(r)) => Ok(RawResponse::from_parts(
                url,
                r.status(),
                r.headers().clone(),
                r.body().clone(),
            )),
        }
    }
}
