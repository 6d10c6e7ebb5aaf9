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
use gax::Result;
use gax::error::Error;
use std::sync::Arc;

type DecodeFn<T> = dyn Fn(&Bytes) -> Result<T> + Send + Sync;

/// Converts the body of the final response into the operation result.
///
/// The engine calls the decoder at most once per operation, after the
/// operation succeeds.
///
/// # Example
/// ```
/// # use arm_lro::Decoder;
/// #[derive(serde::Deserialize)]
/// struct VirtualMachine { name: String }
/// let decoder = Decoder::<VirtualMachine>::json();
/// let vm = decoder.decode(&bytes::Bytes::from_static(br#"{"name":"vm1"}"#))?;
/// assert_eq!(vm.name, "vm1");
/// # Ok::<(), gax::error::Error>(())
/// ```
pub struct Decoder<T> {
    decode: Arc<DecodeFn<T>>,
    fetch: bool,
}

impl<T> Decoder<T> {
    /// Creates a decoder from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Bytes) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(f),
            fetch: true,
        }
    }

    /// Decodes `body`.
    pub fn decode(&self, body: &Bytes) -> Result<T> {
        (self.decode)(body)
    }

    /// Returns false if the decoder ignores the response body.
    ///
    /// The engine skips the final fetch for such decoders.
    pub fn needs_body(&self) -> bool {
        self.fetch
    }
}

impl<T: serde::de::DeserializeOwned> Decoder<T> {
    /// Creates a decoder for JSON bodies.
    pub fn json() -> Self {
        Self::new(|body| serde_json::from_slice::<T>(body).map_err(Error::deser))
    }
}

impl Decoder<()> {
    /// Creates a decoder for operations without a result.
    ///
    /// Typically used for delete operations.
    pub fn unit() -> Self {
        Self {
            decode: Arc::new(|_| Ok(())),
            fetch: false,
        }
    }
}

impl<T> Clone for Decoder<T> {
    fn clone(&self) -> Self {
        Self {
            decode: self.decode.clone(),
            fetch: self.fetch,
        }
    }
}

impl<T> std::fmt::Debug for Decoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("result_type", &std::any::type_name::<T>())
            .field("needs_body", &self.fetch)
            .finish()
    }
}
