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

//! Materializes the result of a successful operation.

use crate::context::{CompletionStrategy, PollingContext};
use crate::decoder::Decoder;
use crate::options::FinalStateVia;
use crate::poll;
use gax::Result;
use gax::error::Error;
use gax::http_client::HttpClient;
use gax::response::RawResponse;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FinalTarget {
    /// Decode the most recent response.
    LastResponse,
    /// Fetch this URL and decode the response.
    Fetch(String),
}

/// Picks the response that contains the final result.
///
/// The fetch targets always come from the trigger response, later responses
/// may have rotated the poll URL. If the trigger did not include the requested
/// header the most recent response is used.
///
/// With `LocationHeaderPresence` the final 2xx poll response is the resource
/// itself. If the fetch target is the URL that produced `last_response` the
/// engine decodes that response instead of requesting it again.
pub(crate) fn final_target<T>(
    context: &PollingContext,
    decoder: &Decoder<T>,
    last_response: &RawResponse,
) -> FinalTarget {
    if !decoder.needs_body() {
        return FinalTarget::LastResponse;
    }
    let header = match context.final_state_via {
        FinalStateVia::ReuseOriginalUri => None,
        FinalStateVia::FetchLocationHeader => context.trigger_location.as_ref(),
        FinalStateVia::FetchAzureAsyncOperationHeader => context.trigger_async_operation.as_ref(),
    };
    match header {
        Some(url)
            if context.completion == CompletionStrategy::LocationHeaderPresence
                && url == last_response.url() =>
        {
            FinalTarget::LastResponse
        }
        Some(url) => FinalTarget::Fetch(url.clone()),
        None => FinalTarget::LastResponse,
    }
}

#[derive(Debug)]
pub(crate) struct Resolved<T> {
    /// The response to the final fetch, if one was received.
    pub response: Option<RawResponse>,
    /// The decoded value, or why it is unavailable.
    pub value: Result<T>,
}

/// Fetches (if needed) and decodes the final result.
///
/// Only cancellation is returned as an error, any other failure is part of
/// the [Resolved] value: the operation succeeded even if its result is
/// unavailable.
pub(crate) async fn resolve<T>(
    client: &dyn HttpClient,
    target: FinalTarget,
    decoder: &Decoder<T>,
    last_response: &RawResponse,
    cancel: &CancellationToken,
) -> Result<Resolved<T>> {
    let url = match target {
        FinalTarget::LastResponse => {
            return Ok(Resolved {
                response: None,
                value: decoder.decode(last_response.body()),
            });
        }
        FinalTarget::Fetch(url) => url,
    };
    tracing::debug!(%url, "fetching final result");
    let response = match poll::get(client, &url, cancel).await {
        Err(e) if e.is_cancelled() => return Err(e),
        Err(e) => {
            return Ok(Resolved {
                response: None,
                value: Err(e),
            });
        }
        Ok(r) => r,
    };
    let value = if response.is_success() {
        decoder.decode(response.body())
    } else {
        Err(Error::unexpected_status(
            response.status().as_u16(),
            response.headers().clone(),
            response.body().clone(),
        ))
    };
    Ok(Resolved {
        response: Some(response),
        value,
    })
}
