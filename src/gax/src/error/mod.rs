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

//! Errors reported while tracking a long-running operation.
//!
//! The engine distinguishes between problems with the responses it receives
//! (a trigger or poll response that violates the protocol), problems reaching
//! the service (transport failures and non-2xx responses), a terminal failure
//! reported by the service itself, and caller initiated cancellation.
//!
//! # Examples
//!
//! ```
//! use arm_gax::error::Error;
//! fn handle_error(e: Error) {
//!     if let Some(details) = e.operation_error() {
//!         println!("the operation failed: {} {}", details.code(), details.message());
//!     } else if e.is_cancelled() {
//!         println!("polling cancelled, the operation may still be running");
//!     }
//! }
//! ```

mod core_error;
mod http_error;
mod operation_error;
pub use core_error::*;
pub use http_error::*;
pub use operation_error::*;
