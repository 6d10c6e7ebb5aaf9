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
use serde::{Deserialize, Deserializer, Serialize};

/// The error details reported by a service when an operation fails.
///
/// Services report failed and canceled operations using an `error` object in
/// the status (or resource) payload:
///
/// ```norust
/// {
///   "status": "Failed",
///   "error": { "code": "Conflict", "message": "resource locked" }
/// }
/// ```
///
/// The values are kept verbatim. Some services use numeric codes, those are
/// converted to their decimal representation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct OperationError {
    #[serde(deserialize_with = "code_as_string")]
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
}

impl OperationError {
    /// Creates a new instance with the given code and message.
    ///
    /// # Example
    /// ```
    /// # use arm_gax::error::OperationError;
    /// let details = OperationError::new("Conflict", "resource locked");
    /// assert_eq!(details.code(), "Conflict");
    /// ```
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            target: None,
        }
    }

    /// Sets the target of the error.
    pub fn set_target<T: Into<String>>(mut self, v: T) -> Self {
        self.target = Some(v.into());
        self
    }

    /// The error code, as reported by the service.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The error message, as reported by the service.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The target of the error, if the service reported one.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Extracts the `error` object from a parsed payload.
    ///
    /// Returns `None` if the payload has no `error` field, or if the field is
    /// not an object.
    pub fn from_payload(payload: &serde_json::Value) -> Option<Self> {
        payload
            .get("error")
            .filter(|v| v.is_object())
            .and_then(|v| Self::deserialize(v).ok())
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "code={}, message={}", self.code, self.message)?;
        if let Some(target) = &self.target {
            write!(f, ", target={target}")?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: OperationError,
}

impl TryFrom<&Bytes> for OperationError {
    type Error = serde_json::Error;

    fn try_from(value: &Bytes) -> Result<Self, Self::Error> {
        serde_json::from_slice::<ErrorEnvelope>(value).map(|e| e.error)
    }
}

fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number for `code`, got {other}"
        ))),
    }
}
