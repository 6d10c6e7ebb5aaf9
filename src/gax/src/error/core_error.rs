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

use super::{HttpError, OperationError};
use bytes::Bytes;
use http::HeaderMap;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by the LRO engine.
///
/// The engine reports errors from multiple sources. The trigger response may
/// not describe a long-running operation, a poll may fail to reach the
/// service, the service may return an unexpected status code, the service may
/// report that the operation failed, or the caller may cancel the polling
/// loop.
///
/// Most applications will just return the error or log it, without any further
/// action. However, some applications may need to interrogate the error
/// details. This type offers a series of predicates to determine the error
/// kind. The type also offers accessors to query the most common error details.
/// Applications can query the error [source][std::error::Error::source] for
/// deeper information.
///
/// # Example
/// ```
/// use arm_gax::error::Error;
/// match example_function() {
///     Err(e) if e.is_operation_failed() => {
///         println!("the operation failed {e}, details {:?}", e.operation_error());
///     },
///     Err(e) if e.is_cancelled() => { println!("stopped waiting {e}"); },
///     Err(e) => { println!("some other error {e}"); },
///     Ok(_) => { println!("success, how boring"); },
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # use arm_gax::error::OperationError;
///     # Err(Error::operation_failed(OperationError::new("Conflict", "resource locked")))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error representing a trigger response that does not start a
    /// long-running operation.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use arm_gax::error::Error;
    /// let error = Error::malformed_trigger("202 Accepted without polling headers");
    /// assert!(error.is_malformed_trigger());
    /// assert!(error.source().is_some());
    /// ```
    pub fn malformed_trigger<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::MalformedTrigger,
            source: Some(source.into()),
        }
    }

    /// The trigger response is neither a terminal response, nor does it carry
    /// any recognized polling header.
    ///
    /// This error is returned when the operation is created, no operation is
    /// tracked.
    ///
    /// # Troubleshooting
    ///
    /// The most common cause of this problem is a service that returns
    /// `202 Accepted` without `Azure-AsyncOperation` or `Location` headers.
    /// Verify the operation is described as a long-running operation in the
    /// API description.
    pub fn is_malformed_trigger(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedTrigger)
    }

    /// Creates an error representing a non-2xx response to a poll or final
    /// fetch request.
    ///
    /// # Example
    /// ```
    /// use arm_gax::error::Error;
    /// let error = Error::unexpected_status(503, http::HeaderMap::new(), bytes::Bytes::new());
    /// assert!(error.is_unexpected_status());
    /// assert_eq!(error.http_status_code(), Some(503));
    /// ```
    pub fn unexpected_status(status_code: u16, headers: HeaderMap, payload: Bytes) -> Self {
        Self {
            kind: ErrorKind::UnexpectedStatus(Box::new(HttpError::new(
                status_code,
                headers,
                payload,
            ))),
            source: None,
        }
    }

    /// A poll or final fetch request returned a non-2xx status code.
    ///
    /// While the operation is running this error does not change the
    /// operation state. The application may call `advance()` or `until_done()`
    /// again to resume polling.
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self.kind, ErrorKind::UnexpectedStatus(_))
    }

    /// Creates an error representing a poll response that cannot be
    /// interpreted.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use arm_gax::error::Error;
    /// let error = Error::malformed_poll("the body is not a JSON object");
    /// assert!(error.is_malformed_poll());
    /// assert!(error.source().is_some());
    /// ```
    pub fn malformed_poll<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::MalformedPoll,
            source: Some(source.into()),
        }
    }

    /// The poll response violates the polling protocol.
    ///
    /// This error is permanent: the operation stops polling, and any further
    /// attempt to poll returns this error again.
    pub fn is_malformed_poll(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedPoll)
    }

    /// Creates an error representing an operation the service reports as
    /// failed.
    ///
    /// # Example
    /// ```
    /// use arm_gax::error::{Error, OperationError};
    /// let error = Error::operation_failed(OperationError::new("Conflict", "resource locked"));
    /// assert!(error.is_operation_failed());
    /// assert!(!error.is_operation_canceled());
    /// assert_eq!(error.operation_error().map(|e| e.code()), Some("Conflict"));
    /// ```
    pub fn operation_failed(details: OperationError) -> Self {
        Self {
            kind: ErrorKind::OperationFailed {
                canceled: false,
                details,
            },
            source: None,
        }
    }

    /// Creates an error representing an operation the service reports as
    /// canceled.
    ///
    /// # Example
    /// ```
    /// use arm_gax::error::{Error, OperationError};
    /// let error = Error::operation_canceled(OperationError::new("Canceled", "canceled by user"));
    /// assert!(error.is_operation_failed());
    /// assert!(error.is_operation_canceled());
    /// ```
    pub fn operation_canceled(details: OperationError) -> Self {
        Self {
            kind: ErrorKind::OperationFailed {
                canceled: true,
                details,
            },
            source: None,
        }
    }

    /// The service reports the operation reached a terminal `Failed` or
    /// `Canceled` state.
    ///
    /// This is not a problem with the client library or the polling loop, the
    /// operation legitimately ended without success. The service's error
    /// details are available via [operation_error][Error::operation_error].
    pub fn is_operation_failed(&self) -> bool {
        matches!(self.kind, ErrorKind::OperationFailed { .. })
    }

    /// The service reports the operation reached a terminal `Canceled` state.
    pub fn is_operation_canceled(&self) -> bool {
        matches!(self.kind, ErrorKind::OperationFailed { canceled: true, .. })
    }

    /// The error details reported by the service for failed or canceled
    /// operations.
    pub fn operation_error(&self) -> Option<&OperationError> {
        match &self.kind {
            ErrorKind::OperationFailed { details, .. } => Some(details),
            _ => None,
        }
    }

    /// Creates an error representing a cancellation requested by the caller.
    ///
    /// # Example
    /// ```
    /// use arm_gax::error::Error;
    /// let error = Error::cancelled();
    /// assert!(error.is_cancelled());
    /// ```
    pub fn cancelled() -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            source: None,
        }
    }

    /// The caller cancelled the polling loop.
    ///
    /// Cancelling the polling loop does not cancel the operation in the
    /// service. The operation state is unchanged, and polling may be resumed
    /// later.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// Creates an error representing a network problem.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use arm_gax::error::Error;
    /// let error = Error::io("connection reset");
    /// assert!(error.is_io());
    /// assert!(error.is_transport());
    /// assert!(error.source().is_some());
    /// ```
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Io,
            source: Some(source.into()),
        }
    }

    /// The request could not be sent, or the response could not be received.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io)
    }

    /// Creates an error representing a request that exceeded its deadline.
    ///
    /// # Example
    /// ```
    /// use arm_gax::error::Error;
    /// let error = Error::timeout("simulated timeout");
    /// assert!(error.is_timeout());
    /// assert!(error.is_transport());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            source: Some(source.into()),
        }
    }

    /// The request could not be completed before its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// A network level failure, including timeouts.
    ///
    /// Like [unexpected status codes][Error::is_unexpected_status], transport
    /// errors do not change the state of a running operation.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Io | ErrorKind::Timeout)
    }

    /// Creates an error representing a result payload that cannot be decoded.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use arm_gax::error::Error;
    /// let error = Error::deser("simulated problem");
    /// assert!(error.is_deserialization());
    /// assert!(error.source().is_some());
    /// ```
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            source: Some(source.into()),
        }
    }

    /// The result decoder could not convert the final payload.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Creates an error representing a successful operation whose result
    /// cannot be obtained.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use arm_gax::error::Error;
    /// let cause = Error::unexpected_status(404, http::HeaderMap::new(), bytes::Bytes::new());
    /// let error = Error::result_unavailable(cause);
    /// assert!(error.is_result_unavailable());
    /// assert!(error.source().is_some());
    /// ```
    pub fn result_unavailable<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::ResultUnavailable,
            source: Some(source.into()),
        }
    }

    /// The operation succeeded, but its result could not be fetched or
    /// decoded.
    ///
    /// The final result is fetched (or decoded) only once. Once this error
    /// is reported the result is permanently unavailable for the operation.
    /// The error [source][std::error::Error::source] contains the original
    /// problem.
    pub fn is_result_unavailable(&self) -> bool {
        matches!(self.kind, ErrorKind::ResultUnavailable)
    }

    /// Returns true if polling may continue after this error.
    ///
    /// Transport errors and unexpected status codes leave a running operation
    /// unchanged. So does cancellation.
    pub fn is_resumable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Io | ErrorKind::Timeout | ErrorKind::UnexpectedStatus(_) | ErrorKind::Cancelled
        )
    }

    /// The HTTP status code, if any, associated with this error.
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::UnexpectedStatus(e) => Some(e.status_code()),
            _ => None,
        }
    }

    /// The headers, if any, associated with this error.
    pub fn http_headers(&self) -> Option<&HeaderMap> {
        match &self.kind {
            ErrorKind::UnexpectedStatus(e) => Some(e.headers()),
            _ => None,
        }
    }

    /// The payload, if any, associated with this error.
    pub fn http_payload(&self) -> Option<&Bytes> {
        match &self.kind {
            ErrorKind::UnexpectedStatus(e) => Some(e.payload()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::MalformedTrigger, Some(e)) => {
                write!(f, "the response does not start a long-running operation: {e}")
            }
            (ErrorKind::MalformedPoll, Some(e)) => {
                write!(f, "cannot interpret the polling response: {e}")
            }
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the operation result: {e}")
            }
            (ErrorKind::ResultUnavailable, Some(e)) => {
                write!(
                    f,
                    "the operation succeeded, but its result is unavailable: {e}"
                )
            }
            (ErrorKind::Io, Some(e)) => write!(f, "cannot send the request: {e}"),
            (ErrorKind::Timeout, Some(e)) => {
                write!(f, "the request exceeded the request deadline {e}")
            }
            (ErrorKind::UnexpectedStatus(e), _) => write!(f, "unexpected status code: {e}"),
            (ErrorKind::OperationFailed { canceled, details }, _) => {
                let state = if *canceled { "Canceled" } else { "Failed" };
                write!(
                    f,
                    "the service reports the operation as {state} with {details}"
                )
            }
            (ErrorKind::Cancelled, _) => write!(f, "polling was cancelled by the caller"),
            (_, None) => unreachable!("no constructor allows this"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::UnexpectedStatus(e) => Some(e.as_ref()),
            _ => self
                .source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn std::error::Error)),
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    MalformedTrigger,
    UnexpectedStatus(Box<HttpError>),
    MalformedPoll,
    OperationFailed {
        canceled: bool,
        details: OperationError,
    },
    Cancelled,
    Io,
    Timeout,
    Deserialization,
    ResultUnavailable,
}
