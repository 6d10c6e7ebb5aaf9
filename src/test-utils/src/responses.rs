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

//! Builders for canned responses.
//!
//! The request URL of these responses is empty unless set explicitly. The
//! [ScriptedClient][crate::fake_client::ScriptedClient] fills it in.

use gax::response::RawResponse;
use http::StatusCode;

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// A response with no body.
pub fn empty(code: u16) -> RawResponse {
    RawResponse::new("", status(code))
}

/// A response with a JSON body.
pub fn json(code: u16, body: serde_json::Value) -> RawResponse {
    RawResponse::new("", status(code))
        .set_header("content-type", "application/json")
        .set_body(body.to_string())
}

/// A response with a `{"status": ...}` body.
pub fn status_body(code: u16, value: &str) -> RawResponse {
    json(code, serde_json::json!({ "status": value }))
}

/// A trigger response, including the URL of the request that produced it.
pub fn trigger(url: &str, code: u16) -> RawResponse {
    RawResponse::new(url, status(code))
}
