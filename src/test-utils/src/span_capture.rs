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

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{Subscriber, field, span};
use tracing_subscriber::{Layer, layer::Context, prelude::*};

/// A captured tracing span with its attributes.
#[derive(Clone, Debug)]
pub struct CapturedSpan {
    pub name: String,
    /// Attribute keys mapped to their string representations.
    pub attributes: HashMap<String, String>,
}

struct Visitor<'a>(&'a mut HashMap<String, String>);

impl field::Visit for Visitor<'_> {
    fn record_str(&mut self, field: &field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_u64(&mut self, field: &field::Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &field::Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &field::Field, value: bool) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// Captures the spans created on the current thread.
///
/// # Example
/// ```
/// use arm_test_utils::span_capture::SpanCapture;
/// let capture = SpanCapture::new();
/// let _guard = capture.set_default();
/// tracing::info_span!("my_operation", foo = "bar").in_scope(|| {});
/// let spans = capture.spans();
/// assert_eq!(spans.len(), 1);
/// assert_eq!(spans[0].attributes.get("foo").map(String::as_str), Some("bar"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SpanCapture {
    spans: Arc<Mutex<Vec<(span::Id, CapturedSpan)>>>,
}

impl SpanCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a subscriber with this layer as the thread's default.
    pub fn set_default(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    /// Returns the spans captured so far, in creation order.
    pub fn spans(&self) -> Vec<CapturedSpan> {
        self.lock().iter().map(|(_, s)| s.clone()).collect()
    }

    /// Returns the captured spans with the given name.
    pub fn find(&self, name: &str) -> Vec<CapturedSpan> {
        self.spans()
            .into_iter()
            .filter(|s| s.name == name)
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(span::Id, CapturedSpan)>> {
        self.spans.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S> Layer<S> for SpanCapture
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &span::Id, _ctx: Context<'_, S>) {
        let mut attributes = HashMap::new();
        attrs.record(&mut Visitor(&mut attributes));
        let captured = CapturedSpan {
            name: attrs.metadata().name().to_string(),
            attributes,
        };
        self.lock().push((id.clone(), captured));
    }

    fn on_record(&self, id: &span::Id, values: &span::Record<'_>, _ctx: Context<'_, S>) {
        let mut spans = self.lock();
        if let Some((_, captured)) = spans.iter_mut().rev().find(|(i, _)| i == id) {
            values.record(&mut Visitor(&mut captured.attributes));
        }
    }
}
