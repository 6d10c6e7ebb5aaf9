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

//! Decides how to track an operation, given the response that started it.

use crate::error::MalformedResponse;
use crate::options::{FinalStateVia, OperationOptions};
use crate::poll;
use crate::snapshot::OperationState;
use gax::Result;
use gax::error::{Error, OperationError};
use gax::response::RawResponse;
use url::Url;

pub(crate) const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
pub(crate) const LOCATION: &str = "location";

/// How the engine decides if a poll response reports a completed operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CompletionStrategy {
    /// The body is a JSON object with a status field.
    StatusBody,
    /// `202 Accepted` while running, any other 2xx once complete.
    LocationHeaderPresence,
}

/// Where and how to poll a running operation.
///
/// Only the poll URL changes after construction, services may rotate it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PollingContext {
    pub poll_url: String,
    pub completion: CompletionStrategy,
    pub final_state_via: FinalStateVia,
    /// The `Location` header of the trigger response.
    pub trigger_location: Option<String>,
    /// The `Azure-AsyncOperation` header of the trigger response.
    pub trigger_async_operation: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Start {
    Polling(PollingContext),
    Completed {
        state: OperationState,
        error: Option<OperationError>,
    },
}

/// Classifies the trigger response.
///
/// Polling headers take priority: `Azure-AsyncOperation`, then `Location`.
/// Without them the body decides. A terminal status (or no status at all)
/// completes the operation immediately, any other status polls the request
/// URL.
pub(crate) fn resolve(trigger: &RawResponse, options: &OperationOptions) -> Result<Start> {
    if !trigger.is_success() {
        return Err(Error::unexpected_status(
            trigger.status().as_u16(),
            trigger.headers().clone(),
            trigger.body().clone(),
        ));
    }
    let trigger_async_operation =
        header_url(trigger, AZURE_ASYNC_OPERATION).map_err(Error::malformed_trigger)?;
    let trigger_location = header_url(trigger, LOCATION).map_err(Error::malformed_trigger)?;

    let polling = match (&trigger_async_operation, &trigger_location) {
        (Some(url), _) => Some((url.clone(), CompletionStrategy::StatusBody)),
        (None, Some(url)) => Some((url.clone(), CompletionStrategy::LocationHeaderPresence)),
        (None, None) => None,
    };
    if let Some((poll_url, completion)) = polling {
        return Ok(Start::Polling(PollingContext {
            poll_url,
            completion,
            final_state_via: options.final_state_via(),
            trigger_location,
            trigger_async_operation,
        }));
    }

    if trigger.status() == http::StatusCode::ACCEPTED {
        return Err(Error::malformed_trigger(
            MalformedResponse::MissingPollingHeaders,
        ));
    }
    let status = trigger_status(trigger, options)?;
    match status {
        None | Some((OperationState::Succeeded, _)) => Ok(Start::Completed {
            state: OperationState::Succeeded,
            error: None,
        }),
        Some((OperationState::Running, _)) => self_polling(trigger, options),
        Some((state, payload)) => Ok(Start::Completed {
            state,
            error: Some(poll::failure_details(state, &payload)),
        }),
    }
}

// Bodies that are not JSON objects are resources without a status, the
// decoder handles them.
fn trigger_status(
    trigger: &RawResponse,
    options: &OperationOptions,
) -> Result<Option<(OperationState, serde_json::Value)>> {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(trigger.body()) else {
        return Ok(None);
    };
    let Some(object) = payload.as_object() else {
        return Ok(None);
    };
    let status =
        poll::status_field(object, options.status_fields()).map_err(Error::malformed_trigger)?;
    Ok(status.map(|s| (s, payload)))
}

fn self_polling(trigger: &RawResponse, options: &OperationOptions) -> Result<Start> {
    if !options.can_poll_request_url() {
        let method = options
            .request_method()
            .map(|m| m.to_string())
            .unwrap_or_default();
        return Err(Error::malformed_trigger(
            MalformedResponse::NoResourceToPoll(method),
        ));
    }
    let poll_url = options.request_url().unwrap_or(trigger.url());
    if poll_url.is_empty() {
        return Err(Error::malformed_trigger(
            MalformedResponse::MissingRequestUrl,
        ));
    }
    Ok(Start::Polling(PollingContext {
        poll_url: poll_url.to_string(),
        completion: CompletionStrategy::StatusBody,
        final_state_via: options.final_state_via(),
        trigger_location: None,
        trigger_async_operation: None,
    }))
}

/// Returns the URL in the `name` header, if present.
///
/// Relative URLs are resolved against the URL of the request that produced
/// `response`. Empty values are treated as missing.
pub(crate) fn header_url(
    response: &RawResponse,
    name: &str,
) -> std::result::Result<Option<String>, MalformedResponse> {
    let Some(value) = response.headers().get(name) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|e| MalformedResponse::invalid_header(name, format!("{value:?}"), e))?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(response.url())
            .and_then(|base| base.join(value))
            .map_err(|e| MalformedResponse::invalid_header(name, value, e))?,
        Err(e) => return Err(MalformedResponse::invalid_header(name, value, e)),
    };
    Ok(Some(url.into()))
}
