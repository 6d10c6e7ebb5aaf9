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

//! Shared helpers for long-running operations.
//!
//! This crate contains the types used by the long-running operation (LRO)
//! engine and by its transports: the error type, the raw HTTP response
//! representation, the transport trait, and the pacing policies.
//!
//! <div class="warning">
//! Most applications use these types only through the <code>arm-lro</code>
//! crate. The transport trait is public so applications can plug in their own
//! HTTP stack.
//! </div>

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all the functions in the LRO engine and its
/// transports.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// The core error types used by the LRO engine.
pub mod error;

/// Defines the transport trait used by the LRO engine.
pub mod http_client;

/// The HTTP response representation shared by the engine and transports.
pub mod response;

pub mod polling_backoff_policy;
pub mod polling_state;
