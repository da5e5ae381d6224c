// Copyright 2019 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Asynchronous OpenStack client.
//!
//! The entry point is a [`ServiceClient`] built from an [`AuthenticatedClient`]:
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//!
//! # async fn example() -> Result<(), osclient::Error> {
//! let client = osclient::from_env().await?;
//! let network = osclient::ServiceClient::new(client, osclient::services::NETWORK)?;
//!
//! let policies = osclient::networking::qos::policies::list(&network, Default::default())?
//!     .all_pages()
//!     .await?;
//! for policy in policies {
//!     println!("{} {}", policy.id, policy.name);
//! }
//! # Ok(()) }
//! ```
//!
//! Resource modules are grouped by service: [`networking`], [`blockstorage`],
//! [`objectstorage`] and [`identity`]. Single-resource calls return an [`ApiResult`] that is
//! turned into a value with one of its `extract` calls, listings return a [`Pager`].

#![crate_name = "osclient"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    dead_code,
    improper_ctypes,
    missing_debug_implementations,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused_allocation,
    unused_comparisons,
    unused_doc_comments,
    unused_import_braces,
    unused_parens,
    unused_qualifications,
    while_true
)]
#![warn(missing_copy_implementations, missing_docs, unused, unused_results)]
#![allow(
    clippy::new_ret_no_self,
    clippy::should_implement_trait,
    clippy::wrong_self_convention
)]

// Allows the derive macros to refer to this crate by name.
extern crate self as osclient;

mod apiversion;
mod auth;
mod basic;
mod client;
pub mod common;
mod error;
mod loading;
mod macros;
mod pagination;
mod query;
mod result;
mod serviceclient;
pub mod services;
#[cfg(feature = "stream")]
mod stream;
mod url;
mod utils;

pub mod blockstorage;
pub mod identity;
pub mod networking;
pub mod objectstorage;

pub use crate::apiversion::ApiVersion;
pub use crate::auth::{AuthType, NoAuth, TokenAuth};
pub use crate::basic::BasicAuth;
pub use crate::client::{AuthenticatedClient, RequestBuilder};
pub use crate::error::{Error, ErrorKind};
pub use crate::loading::{from_config, from_env};
pub use crate::pagination::{Page, PaginatedResource, Pager, Pagination};
pub use crate::query::{
    build_query_string, build_request_body, require, with_query, wrap, BodyBuilder,
};
pub use crate::result::{extract_metadata, metadata_from_pairs, ApiResult, FromHeaders, RawResponse};
pub use crate::serviceclient::{
    ServiceClient, DELETE_OK_CODES, GET_OK_CODES, HEAD_OK_CODES, PATCH_OK_CODES, POST_OK_CODES,
    PUT_OK_CODES,
};

/// Derive [`PaginatedResource`] for a resource structure.
pub use osclient_derive::PaginatedResource;
