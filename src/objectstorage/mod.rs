// Copyright 2021 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Object Storage API (Swift v1) resources.
//!
//! Use a [`ServiceClient`](crate::ServiceClient) created with
//! [`services::OBJECT_STORAGE`](crate::services::OBJECT_STORAGE). The endpoint is the
//! account URL, e.g. `https://swift.example.com/v1/AUTH_<project>`.
//!
//! Most of the protocol is expressed in headers: option structures implement
//! [`HeaderBuilder`] and typed results implement [`FromHeaders`](crate::FromHeaders), so use
//! [`ApiResult::extract_from_headers`](crate::ApiResult::extract_from_headers) and
//! [`ApiResult::extract_metadata`](crate::ApiResult::extract_metadata) on them.

use std::collections::HashMap;

use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::{ApiResult, Error, ErrorKind, ServiceClient};

pub mod accounts;
pub mod containers;
pub mod objects;

/// Characters escaped in a single path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters escaped in a path, slashes are kept.
const PATH: &AsciiSet = &SEGMENT.remove(b'/');

/// An option structure that is sent as request headers.
pub trait HeaderBuilder {
    /// Build the request headers.
    fn to_headers(&self) -> Result<HeaderMap, Error>;
}

impl HeaderBuilder for HeaderMap {
    fn to_headers(&self) -> Result<HeaderMap, Error> {
        Ok(self.clone())
    }
}

/// Result of a bulk deletion.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkDeleteResponse {
    /// Overall status, e.g. `200 OK`.
    #[serde(rename = "Response Status")]
    pub response_status: String,
    /// Response body of the failed request, if any.
    #[serde(rename = "Response Body", default)]
    pub response_body: String,
    /// Pairs of a name and an error status.
    #[serde(rename = "Errors", default)]
    pub errors: Vec<Vec<String>>,
    /// Number of deleted items.
    #[serde(rename = "Number Deleted", default)]
    pub number_deleted: u64,
    /// Number of items that were already missing.
    #[serde(rename = "Number Not Found", default)]
    pub number_not_found: u64,
}

pub(crate) fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), Error> {
    let name = HeaderName::from_bytes(name.as_bytes())?;
    let _ = headers.insert(name, HeaderValue::from_str(value)?);
    Ok(())
}

pub(crate) fn insert_opt<T: ToString>(
    headers: &mut HeaderMap,
    name: &str,
    value: &Option<T>,
) -> Result<(), Error> {
    match value {
        Some(value) => insert_header(headers, name, &value.to_string()),
        None => Ok(()),
    }
}

/// Add `<prefix><key>: <value>` for every metadata item.
///
/// An empty value removes the item on the server.
pub(crate) fn insert_metadata(
    headers: &mut HeaderMap,
    prefix: &str,
    metadata: &HashMap<String, String>,
) -> Result<(), Error> {
    for (key, value) in metadata {
        insert_header(headers, &format!("{}{}", prefix, key), value)?;
    }
    Ok(())
}

pub(crate) fn insert_removals(
    headers: &mut HeaderMap,
    prefix: &str,
    keys: &[String],
) -> Result<(), Error> {
    for key in keys {
        insert_header(headers, &format!("{}{}", prefix, key), "x")?;
    }
    Ok(())
}

/// Validate a container name.
pub(crate) fn check_container_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        Err(Error::new(
            ErrorKind::InvalidInput,
            "Container name cannot be empty",
        ))
    } else if name.contains('/') {
        Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Container name {} cannot contain a slash", name),
        ))
    } else {
        Ok(())
    }
}

/// Escape a single path segment, e.g. a container name.
pub(crate) fn escape_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Escape a path keeping slashes, e.g. an object name.
pub(crate) fn escape_path(value: &str) -> String {
    utf8_percent_encode(value, PATH).to_string()
}

/// Build a bulk delete body: one escaped path per line.
pub(crate) fn bulk_delete_body<I>(paths: I) -> String
where
    I: IntoIterator<Item = String>,
{
    paths.into_iter().fold(String::new(), |mut body, path| {
        body.push_str(&path);
        body.push('\n');
        body
    })
}

pub(crate) async fn bulk_delete(client: &ServiceClient, body: String) -> ApiResult<BulkDeleteResponse> {
    let response = async {
        let mut url = client.url(std::iter::empty::<&str>())?;
        url.set_query(Some("bulk-delete=true"));
        debug!("Deleting {} item(s) in bulk", body.lines().count());
        client
            .post(url)
            .ok_codes([200])
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
    };
    ApiResult::new(response.await)
}
