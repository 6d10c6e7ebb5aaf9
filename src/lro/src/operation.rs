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

use crate::context::{self, PollingContext, Start};
use crate::decoder::Decoder;
use crate::error::MalformedResponse;
use crate::options::OperationOptions;
use crate::poll;
use crate::resolver;
use crate::snapshot::{OperationState, Snapshot};
use gax::Result;
use gax::error::{Error, OperationError};
use gax::http_client::HttpClient;
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_state::PollingState;
use gax::response::RawResponse;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Tracks a long-running operation.
///
/// Create operations with [begin_operation][crate::begin_operation]. The
/// operation makes progress only when the application calls
/// [advance][Operation::advance] or [until_done][Operation::until_done], there
/// is no background polling.
///
/// Both functions take `&mut self`: calls on the same operation are
/// serialized. Cancelling either function leaves the operation running, and
/// a later call continues polling from the most recent poll URL.
///
/// # Example
/// ```
/// # use arm_lro::*;
/// # use gax::http_client::HttpClient;
/// # use gax::response::RawResponse;
/// # use std::sync::Arc;
/// # use tokio_util::sync::CancellationToken;
/// async fn wait(client: Arc<dyn HttpClient>, trigger: RawResponse) -> gax::Result<serde_json::Value> {
///     let options = OperationOptions::new().set_name("VirtualMachinesCreateOperation");
///     let mut operation = begin_operation(client, trigger, options, Decoder::json())?;
///     let cancel = CancellationToken::new();
///     operation.until_done(&cancel, None).await?;
///     Ok(operation.into_value().unwrap_or_default())
/// }
/// ```
#[derive(Debug)]
pub struct Operation<T> {
    client: Arc<dyn HttpClient>,
    decoder: Decoder<T>,
    options: OperationOptions,
    backoff: Arc<dyn PollingBackoffPolicy>,
    // `None` for operations that completed with the trigger response.
    context: Option<PollingContext>,
    snapshot: Snapshot<T>,
    id: String,
    poisoned: Option<MalformedResponse>,
    start: Instant,
    attempt_count: u32,
}

impl<T> Operation<T> {
    pub(crate) fn new(
        client: Arc<dyn HttpClient>,
        trigger: RawResponse,
        options: OperationOptions,
        decoder: Decoder<T>,
    ) -> Result<Self> {
        let start = context::resolve(&trigger, &options)?;
        let backoff = options.polling_backoff_policy();
        let (context, id) = match &start {
            Start::Polling(c) => (Some(c.clone()), c.poll_url.clone()),
            Start::Completed { .. } => (
                None,
                options.request_url().unwrap_or(trigger.url()).to_string(),
            ),
        };
        let mut operation = Self {
            client,
            decoder,
            options,
            backoff,
            context,
            snapshot: Snapshot::running(trigger),
            id,
            poisoned: None,
            start: Instant::now(),
            attempt_count: 0,
        };
        let span = tracing::info_span!("lro.begin", lro.id = %operation.id, lro.name = %operation.name());
        let _enter = span.enter();
        match start {
            Start::Polling(c) => {
                tracing::debug!(poll_url = %c.poll_url, completion = ?c.completion, final_state_via = %c.final_state_via, "operation started");
            }
            Start::Completed { state, error } => operation.complete_immediately(state, error),
        }
        Ok(operation)
    }

    fn complete_immediately(&mut self, state: OperationState, error: Option<OperationError>) {
        match (state, error) {
            (OperationState::Succeeded, _) => {
                let value = self.decoder.decode(self.snapshot.last_response().body());
                self.snapshot.succeed(value);
            }
            (state, error) => {
                let error = error.unwrap_or_else(|| poll::failure_details(state, &serde_json::Value::Null));
                self.snapshot.fail(state, error);
            }
        }
        tracing::debug!(state = %self.snapshot.state(), "operation completed with the trigger response");
    }

    /// Performs at most one poll request.
    ///
    /// If the operation is complete this returns the current snapshot without
    /// any network request. Otherwise it polls once, updates the snapshot, and
    /// fetches the final result if the operation succeeded.
    ///
    /// # Errors
    /// * [Error::is_cancelled] - `cancel` fired before the response arrived.
    ///   The operation is still running.
    /// * [Error::is_unexpected_status], [Error::is_transport] - the poll
    ///   request failed. The operation is still running, and the application
    ///   may call `advance()` again.
    /// * [Error::is_malformed_poll] - the service responded with a body that
    ///   cannot be interpreted. The operation stops polling, all future calls
    ///   return this error.
    pub async fn advance(&mut self, cancel: &CancellationToken) -> Result<&Snapshot<T>> {
        let span = tracing::info_span!("lro.advance", lro.id = %self.id, lro.name = %self.name());
        self.poll_once(cancel).instrument(span).await?;
        Ok(&self.snapshot)
    }

    /// Polls until the operation completes.
    ///
    /// Waits between poll requests for the largest of `poll_interval`, the
    /// `Retry-After` header in the most recent response, and the minimum
    /// delay of the configured
    /// [PollingBackoffPolicy][gax::polling_backoff_policy::PollingBackoffPolicy].
    ///
    /// Returns the result of a successful operation.
    ///
    /// # Errors
    /// * [Error::is_operation_failed], [Error::is_operation_canceled] - the
    ///   service reports the operation as failed or canceled. Use
    ///   [Error::operation_error] to get the details.
    /// * [Error::is_result_unavailable] - the operation succeeded, but its
    ///   result could not be fetched or decoded. Retrying will not help.
    /// * Any error returned by [advance][Self::advance], or
    ///   [Error::is_cancelled] if `cancel` fires while waiting.
    pub async fn until_done(
        &mut self,
        cancel: &CancellationToken,
        poll_interval: Option<Duration>,
    ) -> Result<&T> {
        let span = tracing::info_span!("lro.until_done", lro.id = %self.id, lro.name = %self.name());
        self.poll_until_complete(cancel, poll_interval)
            .instrument(span)
            .await?;
        self.outcome()
    }

    /// A stable identifier for this operation, useful to correlate logs.
    ///
    /// This is the first poll URL, or the request URL if the operation
    /// completed immediately. It does not change if the service rotates the
    /// poll URL. It cannot be used to resume polling in another process.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The operation name used in diagnostics.
    pub fn name(&self) -> &str {
        self.options.name()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &Snapshot<T> {
        &self.snapshot
    }

    pub fn state(&self) -> OperationState {
        self.snapshot.state()
    }

    pub fn is_complete(&self) -> bool {
        self.snapshot.is_complete()
    }

    pub fn has_value(&self) -> bool {
        self.snapshot.has_value()
    }

    /// The result of the operation, if it succeeded and the result is
    /// available.
    pub fn current_value(&self) -> Option<&T> {
        self.snapshot.value()
    }

    /// The most recent response, useful for diagnostics.
    pub fn last_raw_response(&self) -> &RawResponse {
        self.snapshot.last_response()
    }

    /// Consumes the operation and returns its result, if available.
    pub fn into_value(self) -> Option<T> {
        self.snapshot.into_value()
    }

    /// Converts the operation into a stream of polling results.
    ///
    /// The stream polls like [until_done][Self::until_done], and yields a
    /// result after each poll request. It ends after the operation completes
    /// or after the first error.
    #[cfg(feature = "unstable-stream")]
    pub fn into_stream(
        self,
        cancel: CancellationToken,
        poll_interval: Option<Duration>,
    ) -> impl futures::Stream<Item = crate::PollingResult<T>> {
        use crate::PollingResult;
        use futures::stream::unfold;
        unfold(Some((self, false)), move |state| {
            let cancel = cancel.clone();
            async move {
                let (mut operation, pace) = state?;
                if pace {
                    if let Err(e) = operation.pace(&cancel, poll_interval).await {
                        return Some((PollingResult::PollingError(e), None));
                    }
                }
                let done = match operation.advance(&cancel).await {
                    Ok(s) => s.is_complete(),
                    Err(e) => return Some((PollingResult::PollingError(e), None)),
                };
                if done {
                    return Some((PollingResult::Completed(operation.into_result()), None));
                }
                let state = operation.state();
                Some((PollingResult::InProgress(state), Some((operation, true))))
            }
        })
    }

    #[cfg(feature = "unstable-stream")]
    fn into_result(self) -> Result<T> {
        self.check_outcome()?;
        let result_error = self.snapshot.shared_result_error();
        self.snapshot
            .into_value()
            .ok_or_else(|| unavailable(result_error))
    }

    async fn poll_until_complete(
        &mut self,
        cancel: &CancellationToken,
        poll_interval: Option<Duration>,
    ) -> Result<()> {
        loop {
            self.advance(cancel).await?;
            if self.snapshot.is_complete() {
                return Ok(());
            }
            self.pace(cancel, poll_interval).await?;
        }
    }

    async fn pace(&self, cancel: &CancellationToken, poll_interval: Option<Duration>) -> Result<()> {
        let state = PollingState::default()
            .set_start(self.start)
            .set_attempt_count(self.attempt_count)
            .set_poll_interval(poll_interval)
            .set_retry_after(self.snapshot.last_response().retry_after());
        let delay = self.backoff.wait_period(&state);
        tracing::debug!(?delay, attempt_count = self.attempt_count, "waiting before the next poll");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::cancelled()),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn poll_once(&mut self, cancel: &CancellationToken) -> Result<()> {
        if self.snapshot.is_complete() {
            return Ok(());
        }
        if let Some(reason) = &self.poisoned {
            return Err(Error::malformed_poll(reason.clone()));
        }
        if cancel.is_cancelled() {
            return Err(Error::cancelled());
        }
        let Some(context) = self.context.as_mut() else {
            return Ok(());
        };
        let poll_url = context.poll_url.clone();
        let completion = context.completion;

        let response = poll::get(self.client.as_ref(), &poll_url, cancel)
            .await
            .inspect_err(|e| {
                if !e.is_cancelled() {
                    tracing::warn!(%poll_url, "poll request failed: {e}");
                }
            })?;
        self.attempt_count += 1;
        self.snapshot.set_last_response(response);
        let response = self.snapshot.last_response();
        if !response.is_success() {
            let err = Error::unexpected_status(
                response.status().as_u16(),
                response.headers().clone(),
                response.body().clone(),
            );
            tracing::warn!(%poll_url, "poll request failed: {err}");
            return Err(err);
        }
        let outcome = match poll::classify(response, completion, self.options.status_fields()) {
            Ok(o) => o,
            Err(reason) => {
                tracing::warn!(%poll_url, "cannot interpret poll response, polling stops: {reason}");
                self.poisoned = Some(reason.clone());
                return Err(Error::malformed_poll(reason));
            }
        };
        if let Some(next) = outcome.next_poll_url {
            if next != poll_url {
                tracing::debug!(%poll_url, %next, "rotating poll URL");
                context.poll_url = next;
            }
        }
        match outcome.state {
            OperationState::Running => {
                tracing::debug!(attempt_count = self.attempt_count, "operation is running");
                Ok(())
            }
            OperationState::Succeeded => self.resolve_final_value(cancel).await,
            state => {
                let error = outcome
                    .error
                    .unwrap_or_else(|| poll::failure_details(state, &serde_json::Value::Null));
                tracing::debug!(%state, %error, "operation completed");
                self.snapshot.fail(state, error);
                Ok(())
            }
        }
    }

    // The state becomes terminal only after the final result is resolved.
    // If the final fetch is cancelled the operation is still running, and the
    // next poll observes the terminal status again.
    async fn resolve_final_value(&mut self, cancel: &CancellationToken) -> Result<()> {
        let Some(context) = self.context.as_ref() else {
            return Ok(());
        };
        let target =
            resolver::final_target(context, &self.decoder, self.snapshot.last_response());
        let resolved = resolver::resolve(
            self.client.as_ref(),
            target,
            &self.decoder,
            self.snapshot.last_response(),
            cancel,
        )
        .await?;
        if let Some(response) = resolved.response {
            self.snapshot.set_last_response(response);
        }
        if let Err(e) = &resolved.value {
            tracing::warn!("the operation succeeded, but its result is unavailable: {e}");
        }
        self.snapshot.succeed(resolved.value);
        tracing::debug!(has_value = self.snapshot.has_value(), "operation succeeded");
        Ok(())
    }

    fn outcome(&self) -> Result<&T> {
        self.check_outcome()?;
        self.snapshot
            .value()
            .ok_or_else(|| unavailable(self.snapshot.shared_result_error()))
    }

    // Returns the error for terminal states without a value.
    fn check_outcome(&self) -> Result<()> {
        match (self.snapshot.state(), self.snapshot.error()) {
            (OperationState::Failed, Some(e)) => Err(Error::operation_failed(e.clone())),
            (OperationState::Canceled, Some(e)) => Err(Error::operation_canceled(e.clone())),
            (OperationState::Running, _) => Err(Error::result_unavailable(
                "the operation is still running".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn unavailable(cause: Option<Arc<Error>>) -> Error {
    match cause {
        Some(e) => Error::result_unavailable(e),
        None => Error::result_unavailable("the operation did not produce a value".to_string()),
    }
}
