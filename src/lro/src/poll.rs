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

//! A single poll request and the classification of its response.

use crate::context::{AZURE_ASYNC_OPERATION, CompletionStrategy, LOCATION, header_url};
use crate::error::MalformedResponse;
use crate::snapshot::OperationState;
use gax::Result;
use gax::error::{Error, OperationError};
use gax::http_client::HttpClient;
use gax::response::RawResponse;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

/// What a successful (2xx) poll response says about the operation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PollOutcome {
    pub state: OperationState,
    /// The service's error, set for failed and canceled operations.
    pub error: Option<OperationError>,
    /// A fresh polling URL announced by the response.
    pub next_poll_url: Option<String>,
}

/// Sends a `GET` request, unless `cancel` fires first.
pub(crate) async fn get(
    client: &dyn HttpClient,
    url: &str,
    cancel: &CancellationToken,
) -> Result<RawResponse> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::cancelled()),
        r = client.get(url) => r,
    }
}

/// Classifies a 2xx poll response.
pub(crate) fn classify(
    response: &RawResponse,
    strategy: CompletionStrategy,
    status_fields: &[String],
) -> std::result::Result<PollOutcome, MalformedResponse> {
    let (state, payload) = match strategy {
        CompletionStrategy::StatusBody => status_body(response, status_fields)?,
        CompletionStrategy::LocationHeaderPresence => location_presence(response, status_fields)?,
    };
    let error = match state {
        OperationState::Failed | OperationState::Canceled => {
            Some(failure_details(state, &payload))
        }
        _ => None,
    };
    let next_poll_url = match header_url(response, AZURE_ASYNC_OPERATION)? {
        Some(url) => Some(url),
        None => header_url(response, LOCATION)?,
    };
    Ok(PollOutcome {
        state,
        error,
        next_poll_url,
    })
}

fn status_body(
    response: &RawResponse,
    status_fields: &[String],
) -> std::result::Result<(OperationState, Value), MalformedResponse> {
    if response.status() == http::StatusCode::ACCEPTED && is_blank(response) {
        return Ok((OperationState::Running, Value::Null));
    }
    let payload = serde_json::from_slice::<Value>(response.body())
        .map_err(|e| MalformedResponse::NotAnObject(e.to_string()))?;
    let Some(object) = payload.as_object() else {
        return Err(MalformedResponse::NotAnObject(format!(
            "found a JSON {}",
            json_type(&payload)
        )));
    };
    let state = status_field(object, status_fields)?.unwrap_or(OperationState::Running);
    Ok((state, payload))
}

fn location_presence(
    response: &RawResponse,
    status_fields: &[String],
) -> std::result::Result<(OperationState, Value), MalformedResponse> {
    if response.status() == http::StatusCode::ACCEPTED {
        return Ok((OperationState::Running, Value::Null));
    }
    let payload = serde_json::from_slice::<Value>(response.body()).unwrap_or(Value::Null);
    let status = match payload.as_object() {
        Some(object) => status_field(object, status_fields)?,
        None => None,
    };
    Ok((status.unwrap_or(OperationState::Succeeded), payload))
}

/// Finds the status in `object`, trying each field in order.
///
/// Fields are top-level keys, dotted paths (`properties.provisioningState`)
/// or JSON pointers (`/properties/provisioningState`). Missing and `null`
/// fields are skipped. Returns `None` if no field has a value.
pub(crate) fn status_field(
    object: &Map<String, Value>,
    fields: &[String],
) -> std::result::Result<Option<OperationState>, MalformedResponse> {
    let Some((name, value)) = fields
        .iter()
        .find_map(|f| lookup(object, f).filter(|v| !v.is_null()).map(|v| (f, v)))
    else {
        return Ok(None);
    };
    match value {
        Value::String(s) => Ok(Some(OperationState::from_status(s))),
        _ => Err(MalformedResponse::StatusNotString(name.clone())),
    }
}

// Exact keys win over paths, some services use dots in top-level names.
fn lookup<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    if let Some(v) = object.get(field) {
        return Some(v);
    }
    let segments: Vec<String> = match field.strip_prefix('/') {
        Some(pointer) => pointer
            .split('/')
            .map(|s| s.replace("~1", "/").replace("~0", "~"))
            .collect(),
        None if field.contains('.') => field.split('.').map(str::to_string).collect(),
        None => return None,
    };
    let (first, rest) = segments.split_first()?;
    rest.iter()
        .try_fold(object.get(first)?, |value, key| value.as_object()?.get(key))
}

/// Extracts the service's error from a failed or canceled operation.
///
/// Services do not always include details, the state is reported anyway.
pub(crate) fn failure_details(state: OperationState, payload: &Value) -> OperationError {
    OperationError::from_payload(payload).unwrap_or_else(|| {
        OperationError::new(
            state.as_str(),
            format!("the service reports the operation as {state} without error details"),
        )
    })
}

fn is_blank(response: &RawResponse) -> bool {
    response.body().iter().all(u8::is_ascii_whitespace)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
