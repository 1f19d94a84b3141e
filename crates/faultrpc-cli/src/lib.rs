// Copyright 2025 FaultRPC Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # FaultRPC CLI
//!
//! Command-line interface for the FaultRPC resiliency server.
//!
//! This crate provides the main entry point for running FaultRPC components:
//!
//! - **Server**: The fault-injecting service on a TCP port
//! - **Calls**: One-off calls of any shape, for scripting and manual testing
//!
//! ## Architecture
//!
//! The CLI uses the `argh` crate for argument parsing and dispatches to
//! `faultrpc-server` and `faultrpc-client`.
//!
//! ## Key Commands
//!
//! - `faultrpc serve`: Start a fault server
//! - `faultrpc call`: Make a call (outputs raw JSON for scripting)

pub mod call;

pub use call::{parse_metadata, parse_shape, run_call, CallPlan};
