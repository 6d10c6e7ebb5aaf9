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

/// Explains why a trigger or poll response cannot be interpreted.
///
/// The engine attaches these as the [source][std::error::Error::source] of
/// [Error::malformed_trigger][gax::error::Error::malformed_trigger] and
/// [Error::malformed_poll][gax::error::Error::malformed_poll] errors.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum MalformedResponse {
    /// The service accepted the request but did not say where to poll.
    #[error("accepted (202) response without an Azure-AsyncOperation or Location header")]
    MissingPollingHeaders,

    /// The operation is in progress, but there is no resource to poll.
    #[error("a {0} request reported an operation in progress without an Azure-AsyncOperation or Location header")]
    NoResourceToPoll(String),

    /// The URL of the request that triggered the operation is unknown.
    #[error("the operation is in progress and the request URL is unknown")]
    MissingRequestUrl,

    /// A header does not contain a valid URL.
    #[error("invalid URL in the {header} header ({value:?}): {reason}")]
    InvalidHeaderUrl {
        header: String,
        value: String,
        reason: String,
    },

    /// The body is not a JSON object.
    #[error("the response body is not a JSON object: {0}")]
    NotAnObject(String),

    /// The status field is not a string.
    #[error("the `{0}` field is not a string")]
    StatusNotString(String),
}

impl MalformedResponse {
    pub(crate) fn invalid_header<V, R>(header: &str, value: V, reason: R) -> Self
    where
        V: Into<String>,
        R: std::fmt::Display,
    {
        Self::InvalidHeaderUrl {
            header: header.to_string(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
