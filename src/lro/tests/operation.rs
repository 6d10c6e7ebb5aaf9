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

#[cfg(test)]
mod tests {
    use arm_lro::{
        Decoder, FinalStateVia, OperationOptions, OperationState, begin_operation,
    };
    use arm_test_utils::fake_client::ScriptedClient;
    use arm_test_utils::responses::*;
    use arm_test_utils::span_capture::SpanCapture;
    use gax::error::Error;
    use gax::http_client::HttpClient;
    use gax::polling_backoff_policy::RetryAfterBackoff;
    use gax::response::RawResponse;
    use http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    type Result<T> = anyhow::Result<T>;

    const REQUEST_URL: &str = "https://svc/res/xyz";
    const ASYNC_OPERATION: &str = "https://svc/ops/abc";

    #[derive(Clone, Debug, PartialEq, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct VirtualMachine {
        name: String,
        #[serde(default)]
        provisioning_state: Option<String>,
    }

    mockall::mock! {
        Client {}
        #[async_trait::async_trait]
        impl HttpClient for Client {
            async fn get(&self, url: &str) -> gax::Result<RawResponse>;
        }
    }

    impl std::fmt::Debug for MockClient {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MockClient").finish()
        }
    }

    fn accepted() -> RawResponse {
        trigger(REQUEST_URL, 202)
            .set_header("Azure-AsyncOperation", ASYNC_OPERATION)
            .set_header("Location", REQUEST_URL)
    }

    fn fast_options() -> OperationOptions {
        OperationOptions::new()
            .set_request_url(REQUEST_URL)
            .with_polling_backoff_policy(RetryAfterBackoff::with_minimum(Duration::from_millis(1)))
    }

    fn vm_body() -> serde_json::Value {
        json!({"name": "vm1", "provisioningState": "Succeeded"})
    }

    fn vm() -> VirtualMachine {
        VirtualMachine {
            name: "vm1".into(),
            provisioning_state: Some("Succeeded".into()),
        }
    }

    #[tokio::test]
    async fn created_with_body_completes_immediately() -> Result<()> {
        let mut mock = MockClient::new();
        mock.expect_get().never();
        let trigger = trigger(REQUEST_URL, 201).set_body(vm_body().to_string());
        let mut operation = begin_operation(
            Arc::new(mock),
            trigger,
            OperationOptions::new(),
            Decoder::<VirtualMachine>::json(),
        )?;
        assert!(operation.is_complete());
        assert!(operation.has_value());
        assert_eq!(operation.state(), OperationState::Succeeded);
        assert_eq!(operation.current_value(), Some(&vm()));
        assert_eq!(operation.id(), REQUEST_URL);
        assert_eq!(operation.last_raw_response().status(), StatusCode::CREATED);

        let cancel = CancellationToken::new();
        let before = operation.snapshot().clone();
        for _ in 0..3 {
            let snapshot = operation.advance(&cancel).await?;
            assert_eq!(snapshot, &before);
        }
        let value = operation.until_done(&cancel, None).await?;
        assert_eq!(value, &vm());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn async_operation_then_location_fetch() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(status_body(200, "InProgress").set_header("Retry-After", "5")),
            Ok(status_body(200, "Succeeded")),
            Ok(json(200, vm_body())),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            OperationOptions::new().set_final_state_via(FinalStateVia::FetchLocationHeader),
            Decoder::<VirtualMachine>::json(),
        )?;
        assert_eq!(operation.id(), ASYNC_OPERATION);
        assert!(!operation.is_complete());

        let start = Instant::now();
        let cancel = CancellationToken::new();
        let value = operation.until_done(&cancel, None).await?;
        assert_eq!(value, &vm());
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(
            client.requests(),
            vec![ASYNC_OPERATION, ASYNC_OPERATION, REQUEST_URL]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_operation() -> Result<()> {
        let body = json!({"status": "Failed", "error": {"code": "Conflict", "message": "resource locked"}});
        let client = ScriptedClient::new([Ok(json(200, body))]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let cancel = CancellationToken::new();
        let err = operation.until_done(&cancel, None).await.unwrap_err();
        assert!(err.is_operation_failed(), "{err:?}");
        let details = err.operation_error().expect("failures carry details");
        assert_eq!(details.code(), "Conflict");
        assert_eq!(details.message(), "resource locked");

        assert_eq!(operation.state(), OperationState::Failed);
        assert!(!operation.has_value());
        assert_eq!(
            operation.snapshot().error().map(|e| e.code()),
            Some("Conflict")
        );
        // No final fetch for failed operations.
        assert_eq!(client.requests(), vec![ASYNC_OPERATION]);
        Ok(())
    }

    #[tokio::test]
    async fn canceled_operation() -> Result<()> {
        let client = ScriptedClient::new([Ok(status_body(200, "Canceled"))]);
        let mut operation = begin_operation(
            Arc::new(client),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let err = operation
            .until_done(&CancellationToken::new(), None)
            .await
            .unwrap_err();
        assert!(err.is_operation_canceled(), "{err:?}");
        assert_eq!(operation.state(), OperationState::Canceled);
        assert!(operation.snapshot().error().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn already_cancelled() -> Result<()> {
        let mut mock = MockClient::new();
        mock.expect_get().never();
        let mut operation = begin_operation(
            Arc::new(mock),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = operation.until_done(&cancel, None).await.unwrap_err();
        assert!(err.is_cancelled(), "{err:?}");
        assert!(err.is_resumable(), "{err:?}");
        let err = operation.advance(&cancel).await.unwrap_err();
        assert!(err.is_cancelled(), "{err:?}");
        assert_eq!(operation.state(), OperationState::Running);
        Ok(())
    }

    #[tokio::test]
    async fn terminal_polling_is_idempotent() -> Result<()> {
        let mut mock = MockClient::new();
        mock.expect_get().times(1).returning(|url| {
            Ok(RawResponse::new(url, StatusCode::OK).set_body(r#"{"status":"Failed"}"#))
        });
        let mut operation = begin_operation(
            Arc::new(mock),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let cancel = CancellationToken::new();
        let first = operation.advance(&cancel).await?.clone();
        assert_eq!(first.state(), OperationState::Failed);
        for _ in 0..5 {
            let snapshot = operation.advance(&cancel).await?;
            assert_eq!(snapshot, &first);
        }
        let err = operation.until_done(&cancel, None).await.unwrap_err();
        assert!(err.is_operation_failed(), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn state_is_monotonic() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(status_body(200, "InProgress")),
            Ok(status_body(200, "Canceled")),
            Ok(status_body(200, "Succeeded")),
            Ok(status_body(200, "InProgress")),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let cancel = CancellationToken::new();
        let mut states = Vec::new();
        for _ in 0..4 {
            states.push(operation.advance(&cancel).await?.state());
        }
        assert_eq!(
            states,
            vec![
                OperationState::Running,
                OperationState::Canceled,
                OperationState::Canceled,
                OperationState::Canceled
            ]
        );
        assert_eq!(client.remaining(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn final_fetch_uses_trigger_location() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(status_body(200, "InProgress").set_header("Location", "https://svc/rotated/1")),
            Ok(status_body(202, "InProgress")
                .set_header("Azure-AsyncOperation", "/rotated/2?api-version=1")),
            Ok(status_body(200, "Succeeded").set_header("Location", "https://svc/elsewhere")),
            Ok(json(200, vm_body())),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let value = operation
            .until_done(&CancellationToken::new(), None)
            .await?;
        assert_eq!(value, &vm());
        assert_eq!(
            client.requests(),
            vec![
                ASYNC_OPERATION,
                "https://svc/rotated/1",
                "https://svc/rotated/2?api-version=1",
                REQUEST_URL
            ]
        );
        // The identity does not follow the rotation.
        assert_eq!(operation.id(), ASYNC_OPERATION);
        Ok(())
    }

    #[tokio::test]
    async fn final_fetch_uses_trigger_async_operation() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(status_body(200, "Succeeded")),
            Ok(json(200, json!({"name": "vm1", "status": "Succeeded"}))),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            fast_options().set_final_state_via(FinalStateVia::FetchAzureAsyncOperationHeader),
            Decoder::<serde_json::Value>::json(),
        )?;
        let value = operation
            .until_done(&CancellationToken::new(), None)
            .await?;
        assert_eq!(value["name"], "vm1");
        assert_eq!(client.requests(), vec![ASYNC_OPERATION, ASYNC_OPERATION]);
        Ok(())
    }

    #[tokio::test]
    async fn reuse_original_uri_decodes_last_response() -> Result<()> {
        let trigger = trigger(REQUEST_URL, 201)
            .set_body(json!({"name": "vm1", "provisioningState": "Creating"}).to_string());
        let client = ScriptedClient::new([
            Ok(json(200, json!({"name": "vm1", "provisioningState": "Updating"}))),
            Ok(json(200, vm_body())),
        ]);
        let options = fast_options()
            .set_request_method(http::Method::PUT)
            .set_final_state_via(FinalStateVia::ReuseOriginalUri);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            trigger,
            options,
            Decoder::<VirtualMachine>::json(),
        )?;
        assert_eq!(operation.id(), REQUEST_URL);
        let value = operation
            .until_done(&CancellationToken::new(), None)
            .await?;
        assert_eq!(value, &vm());
        assert_eq!(client.requests(), vec![REQUEST_URL, REQUEST_URL]);
        Ok(())
    }

    #[tokio::test]
    async fn created_resource_still_provisioning() -> Result<()> {
        let trigger = trigger(REQUEST_URL, 201).set_body(
            json!({"name": "vm1", "properties": {"provisioningState": "Creating"}}).to_string(),
        );
        let client = ScriptedClient::new([
            Ok(json(
                200,
                json!({"name": "vm1", "properties": {"provisioningState": "Creating"}}),
            )),
            Ok(json(
                200,
                json!({"name": "vm1", "properties": {"provisioningState": "Succeeded"}}),
            )),
        ]);
        let options = fast_options()
            .set_request_method(http::Method::PUT)
            .set_final_state_via(FinalStateVia::ReuseOriginalUri);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            trigger,
            options,
            Decoder::<serde_json::Value>::json(),
        )?;
        assert_eq!(operation.state(), OperationState::Running);
        assert!(!operation.has_value());

        let cancel = CancellationToken::new();
        let snapshot = operation.advance(&cancel).await?;
        assert_eq!(snapshot.state(), OperationState::Running);
        let value = operation.until_done(&cancel, None).await?;
        assert_eq!(value["properties"]["provisioningState"], "Succeeded");
        assert_eq!(client.requests(), vec![REQUEST_URL, REQUEST_URL]);
        Ok(())
    }

    #[tokio::test]
    async fn null_status_does_not_hide_provisioning_state() -> Result<()> {
        let trigger = trigger(REQUEST_URL, 201)
            .set_body(json!({"status": null, "provisioningState": "Updating"}).to_string());
        let client = ScriptedClient::new([
            Ok(json(200, json!({"status": null, "provisioningState": "Failed"}))),
            Ok(status_body(200, "Succeeded")),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            trigger,
            fast_options().set_request_method(http::Method::PATCH),
            Decoder::<serde_json::Value>::json(),
        )?;
        assert_eq!(operation.state(), OperationState::Running);
        let snapshot = operation.advance(&CancellationToken::new()).await?;
        assert_eq!(snapshot.state(), OperationState::Failed);
        assert_eq!(client.requests(), vec![REQUEST_URL]);
        Ok(())
    }

    #[tokio::test]
    async fn location_poll_returns_resource() -> Result<()> {
        let trigger = trigger(REQUEST_URL, 202).set_header("Location", "/res/xyz/status");
        let client = ScriptedClient::new([Ok(empty(202)), Ok(json(200, vm_body()))]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            trigger,
            fast_options().set_final_state_via(FinalStateVia::FetchLocationHeader),
            Decoder::<VirtualMachine>::json(),
        )?;
        let value = operation
            .until_done(&CancellationToken::new(), None)
            .await?;
        assert_eq!(value, &vm());
        // The 200 poll response is the resource, it is not requested again.
        assert_eq!(
            client.requests(),
            vec!["https://svc/res/xyz/status", "https://svc/res/xyz/status"]
        );
        assert_eq!(client.remaining(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn delete_with_location() -> Result<()> {
        let trigger = trigger(REQUEST_URL, 202).set_header("Location", "/ops/delete-1");
        let client = ScriptedClient::new([Ok(empty(202)), Ok(empty(204))]);
        let options = fast_options().set_request_method(http::Method::DELETE);
        let mut operation =
            begin_operation(Arc::new(client.clone()), trigger, options, Decoder::unit())?;
        operation
            .until_done(&CancellationToken::new(), None)
            .await?;
        assert!(operation.has_value());
        assert_eq!(operation.state(), OperationState::Succeeded);
        // The unit decoder skips the final fetch.
        assert_eq!(
            client.requests(),
            vec!["https://svc/ops/delete-1", "https://svc/ops/delete-1"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn transient_errors_do_not_poison() -> Result<()> {
        let client = ScriptedClient::new([
            Err(Error::io("connection reset")),
            Ok(empty(503).set_header("Retry-After", "1")),
            Ok(status_body(200, "InProgress")),
            Ok(status_body(200, "Succeeded")),
            Ok(json(200, vm_body())),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let cancel = CancellationToken::new();

        let err = operation.advance(&cancel).await.unwrap_err();
        assert!(err.is_io(), "{err:?}");
        assert_eq!(operation.state(), OperationState::Running);
        assert_eq!(operation.last_raw_response().status(), StatusCode::ACCEPTED);

        let err = operation.advance(&cancel).await.unwrap_err();
        assert!(err.is_unexpected_status(), "{err:?}");
        assert_eq!(err.http_status_code(), Some(503));
        assert_eq!(operation.state(), OperationState::Running);
        assert_eq!(
            operation.last_raw_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let value = operation.until_done(&cancel, None).await?;
        assert_eq!(value, &vm());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_poll_poisons() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(empty(200).set_body("<html>not json</html>")),
            Ok(status_body(200, "Succeeded")),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let cancel = CancellationToken::new();
        let err = operation.advance(&cancel).await.unwrap_err();
        assert!(err.is_malformed_poll(), "{err:?}");
        assert!(!err.is_resumable(), "{err:?}");

        let err = operation.advance(&cancel).await.unwrap_err();
        assert!(err.is_malformed_poll(), "{err:?}");
        let err = operation.until_done(&cancel, None).await.unwrap_err();
        assert!(err.is_malformed_poll(), "{err:?}");

        assert_eq!(operation.state(), OperationState::Running);
        assert_eq!(client.requests(), vec![ASYNC_OPERATION]);
        Ok(())
    }

    #[tokio::test]
    async fn result_unavailable() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(status_body(200, "Succeeded")),
            Ok(json(404, json!({"error": {"code": "NotFound", "message": "gone"}}))),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let cancel = CancellationToken::new();
        let err = operation.until_done(&cancel, None).await.unwrap_err();
        assert!(err.is_result_unavailable(), "{err:?}");
        assert_eq!(operation.state(), OperationState::Succeeded);
        assert!(operation.is_complete());
        assert!(!operation.has_value());
        assert!(operation.snapshot().error().is_none());
        let cause = operation
            .snapshot()
            .result_error()
            .expect("the cause is recorded");
        assert_eq!(cause.http_status_code(), Some(404));

        // Permanent, without any more requests.
        let err = operation.until_done(&cancel, None).await.unwrap_err();
        assert!(err.is_result_unavailable(), "{err:?}");
        assert_eq!(client.requests().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn decode_error_is_result_unavailable() -> Result<()> {
        let trigger = trigger(REQUEST_URL, 200).set_body(r#"{"unexpected": true}"#);
        let mut operation = begin_operation(
            Arc::new(ScriptedClient::default()),
            trigger,
            OperationOptions::new(),
            Decoder::<VirtualMachine>::json(),
        )?;
        assert!(operation.is_complete());
        assert!(!operation.has_value());
        let cause = operation.snapshot().result_error().expect("decode error");
        assert!(cause.is_deserialization(), "{cause:?}");
        let err = operation
            .until_done(&CancellationToken::new(), None)
            .await
            .unwrap_err();
        assert!(err.is_result_unavailable(), "{err:?}");
        assert_eq!(operation.into_value(), None);
        Ok(())
    }

    #[tokio::test]
    async fn immediate_failure() -> Result<()> {
        let body = json!({"provisioningState": "Failed", "error": {"code": "QuotaExceeded", "message": "no cores"}});
        let trigger = trigger(REQUEST_URL, 200).set_body(body.to_string());
        let mut mock = MockClient::new();
        mock.expect_get().never();
        let mut operation = begin_operation(
            Arc::new(mock),
            trigger,
            OperationOptions::new(),
            Decoder::<VirtualMachine>::json(),
        )?;
        assert_eq!(operation.state(), OperationState::Failed);
        let err = operation
            .until_done(&CancellationToken::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.operation_error().map(|e| e.code()), Some("QuotaExceeded"));
        Ok(())
    }

    #[test]
    fn malformed_trigger() {
        let result = begin_operation(
            Arc::new(ScriptedClient::default()),
            trigger(REQUEST_URL, 202),
            OperationOptions::new(),
            Decoder::<VirtualMachine>::json(),
        );
        let err = result.unwrap_err();
        assert!(err.is_malformed_trigger(), "{err:?}");
        let reason = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<arm_lro::MalformedResponse>());
        assert_eq!(
            reason,
            Some(&arm_lro::MalformedResponse::MissingPollingHeaders)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn pacing() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(status_body(200, "InProgress")),
            Ok(status_body(200, "InProgress").set_header("Retry-After", "5")),
            Ok(status_body(200, "InProgress").set_header("Retry-After", "2")),
            Ok(status_body(200, "Succeeded")),
            Ok(json(200, vm_body())),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            OperationOptions::new(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let start = Instant::now();
        operation
            .until_done(&CancellationToken::new(), Some(Duration::from_secs(3)))
            .await?;
        // max(3, none, 1) + max(3, 5, 1) + max(3, 2, 1)
        assert_eq!(start.elapsed(), Duration::from_secs(3 + 5 + 3));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_default_minimum() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(status_body(200, "InProgress")),
            Ok(status_body(200, "InProgress").set_header("Retry-After", "0")),
            Ok(status_body(200, "Succeeded")),
            Ok(json(200, vm_body())),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            OperationOptions::new(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let start = Instant::now();
        operation
            .until_done(&CancellationToken::new(), None)
            .await?;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_does_not_poison() -> Result<()> {
        let client = ScriptedClient::new([
            Ok(status_body(200, "InProgress")
                .set_header("Retry-After", "10")
                .set_header("Azure-AsyncOperation", "https://svc/ops/rotated")),
            Ok(status_body(200, "Succeeded")),
            Ok(json(200, vm_body())),
        ]);
        let mut operation = begin_operation(
            Arc::new(client.clone()),
            accepted(),
            OperationOptions::new(),
            Decoder::<VirtualMachine>::json(),
        )?;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            trigger.cancel();
        });
        let start = Instant::now();
        let err = operation.until_done(&cancel, None).await.unwrap_err();
        assert!(err.is_cancelled(), "{err:?}");
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert_eq!(operation.state(), OperationState::Running);
        assert_eq!(client.requests(), vec![ASYNC_OPERATION]);

        // Resumes from the rotated poll URL. The last response still asks
        // for a 10s delay, but the first step of a new loop polls at once.
        let value = operation
            .until_done(&CancellationToken::new(), None)
            .await?;
        assert_eq!(value, &vm());
        assert_eq!(
            client.requests(),
            vec![ASYNC_OPERATION, "https://svc/ops/rotated", REQUEST_URL]
        );
        Ok(())
    }

    #[tokio::test]
    async fn tracing_spans() -> Result<()> {
        let capture = SpanCapture::new();
        let _guard = capture.set_default();
        let client = ScriptedClient::new([Ok(status_body(200, "InProgress"))]);
        let mut operation = begin_operation(
            Arc::new(client),
            accepted(),
            fast_options().set_name("VirtualMachinesCreateOperation"),
            Decoder::<VirtualMachine>::json(),
        )?;
        operation.advance(&CancellationToken::new()).await?;

        let spans = capture.find("lro.advance");
        assert_eq!(spans.len(), 1, "{spans:?}");
        let attributes = &spans[0].attributes;
        assert_eq!(
            attributes.get("lro.id").map(String::as_str),
            Some(ASYNC_OPERATION)
        );
        assert_eq!(
            attributes.get("lro.name").map(String::as_str),
            Some("VirtualMachinesCreateOperation")
        );
        assert_eq!(capture.find("lro.begin").len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn logs_with_tracing_enabled() -> Result<()> {
        let _guard = arm_test_utils::tracing::enable_tracing();
        let client = ScriptedClient::new([
            Err(Error::timeout("slow")),
            Ok(status_body(200, "Succeeded")),
            Ok(json(200, vm_body())),
        ]);
        let mut operation = begin_operation(
            Arc::new(client),
            accepted(),
            fast_options(),
            Decoder::<VirtualMachine>::json(),
        )?;
        let cancel = CancellationToken::new();
        let err = operation.until_done(&cancel, None).await.unwrap_err();
        assert!(err.is_timeout(), "{err:?}");
        let value = operation.until_done(&cancel, None).await?;
        assert_eq!(value, &vm());
        Ok(())
    }
}
