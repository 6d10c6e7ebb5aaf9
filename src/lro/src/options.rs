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

use gax::polling_backoff_policy::{PollingBackoffPolicy, PollingBackoffPolicyArg, RetryAfterBackoff};
use std::sync::Arc;

/// Where the engine finds the final result of a successful operation.
///
/// Each API operation documents how to retrieve its result, this is not
/// inferred from the responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FinalStateVia {
    /// Decode the most recent response, without any additional request.
    ///
    /// Use this when the poll target is the resource itself, for example, when
    /// a `PUT` or `PATCH` request is polled via its own URL.
    ReuseOriginalUri,
    /// Fetch the `Location` header of the trigger response.
    #[default]
    FetchLocationHeader,
    /// Fetch the `Azure-AsyncOperation` header of the trigger response.
    FetchAzureAsyncOperationHeader,
}

impl FinalStateVia {
    /// The name used for this strategy in API descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReuseOriginalUri => "original-uri",
            Self::FetchLocationHeader => "location",
            Self::FetchAzureAsyncOperationHeader => "azure-async-operation",
        }
    }
}

impl std::fmt::Display for FinalStateVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FinalStateVia {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original-uri" => Ok(Self::ReuseOriginalUri),
            "location" => Ok(Self::FetchLocationHeader),
            "azure-async-operation" => Ok(Self::FetchAzureAsyncOperationHeader),
            _ => Err(format!("unknown final-state-via value {s:?}")),
        }
    }
}

/// The status fields inspected by default, in priority order.
///
/// Operation status resources use `status`. Resources report their
/// `provisioningState`, at the top level or under `properties`.
pub const DEFAULT_STATUS_FIELDS: [&str; 3] =
    ["status", "provisioningState", "properties.provisioningState"];

/// The name used in diagnostics when the caller does not set one.
const DEFAULT_NAME: &str = "Operation";

/// Configures how a single long-running operation is tracked.
///
/// The wrapper that issues the trigger request knows these values ahead of
/// time. None of them are inferred from the responses.
///
/// # Example
/// ```
/// # use arm_lro::{FinalStateVia, OperationOptions};
/// let options = OperationOptions::new()
///     .set_request_url("https://svc/subscriptions/s/vms/vm1")
///     .set_request_method(http::Method::PUT)
///     .set_final_state_via(FinalStateVia::ReuseOriginalUri)
///     .set_name("VirtualMachinesCreateOrUpdateOperation");
/// assert_eq!(
///     options.status_fields(),
///     ["status", "provisioningState", "properties.provisioningState"]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct OperationOptions {
    request_url: Option<String>,
    request_method: Option<http::Method>,
    final_state_via: FinalStateVia,
    status_fields: Vec<String>,
    name: String,
    polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
}

impl OperationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL of the request that started the operation.
    ///
    /// Defaults to the URL recorded in the trigger response. Operations that
    /// report their progress in the resource itself poll this URL.
    pub fn set_request_url<T: Into<String>>(mut self, v: T) -> Self {
        self.request_url = Some(v.into());
        self
    }

    /// Sets the method of the request that started the operation.
    ///
    /// `POST` and `DELETE` requests have no resource to poll at the request
    /// URL. The engine rejects their trigger responses if they report an
    /// operation in progress without polling headers.
    pub fn set_request_method(mut self, v: http::Method) -> Self {
        self.request_method = Some(v);
        self
    }

    /// Sets the strategy to retrieve the final result.
    pub fn set_final_state_via(mut self, v: FinalStateVia) -> Self {
        self.final_state_via = v;
        self
    }

    /// Sets the JSON fields that may contain the operation status.
    ///
    /// The fields are inspected in order, the first one with a non-null value
    /// is used. Each field is a top-level key, a dotted path such as
    /// `properties.provisioningState`, or a JSON pointer such as
    /// `/properties/provisioningState`.
    pub fn set_status_fields<I, S>(mut self, v: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.status_fields = v.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the operation name used in diagnostics.
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the policy that paces the polling loop.
    pub fn with_polling_backoff_policy<V: Into<PollingBackoffPolicyArg>>(mut self, v: V) -> Self {
        self.polling_backoff_policy = Some(v.into().0);
        self
    }

    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    pub fn request_method(&self) -> Option<&http::Method> {
        self.request_method.as_ref()
    }

    pub fn final_state_via(&self) -> FinalStateVia {
        self.final_state_via
    }

    pub fn status_fields(&self) -> &[String] {
        &self.status_fields
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured pacing policy, or the default policy.
    pub fn polling_backoff_policy(&self) -> Arc<dyn PollingBackoffPolicy> {
        self.polling_backoff_policy
            .clone()
            .unwrap_or_else(|| Arc::new(RetryAfterBackoff::default()))
    }

    // Only PUT, PATCH, and GET requests leave a resource at the request URL.
    pub(crate) fn can_poll_request_url(&self) -> bool {
        !matches!(
            self.request_method,
            Some(ref m) if *m == http::Method::POST || *m == http::Method::DELETE
        )
    }
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self {
            request_url: None,
            request_method: None,
            final_state_via: FinalStateVia::default(),
            status_fields: DEFAULT_STATUS_FIELDS.iter().map(|s| s.to_string()).collect(),
            name: DEFAULT_NAME.to_string(),
            polling_backoff_policy: None,
        }
    }
}
