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

//! Account metadata.
//!
//! ```rust,no_run
//! use osclient::objectstorage::accounts;
//!
//! # async fn example(swift: osclient::ServiceClient) -> Result<(), osclient::Error> {
//! let result = accounts::get(&swift, false).await;
//! let metadata = result.extract_metadata(accounts::METADATA_PREFIX)?;
//! # Ok(()) }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use http::header::HeaderMap;

use super::{insert_header, insert_metadata, insert_opt, insert_removals, HeaderBuilder};
use crate::result::{header_date, header_parse, header_string, header_timestamp};
use crate::{ApiResult, Error, FromHeaders, ServiceClient};

/// Prefix of account metadata headers.
pub const METADATA_PREFIX: &str = "X-Account-Meta-";

/// Prefix of headers removing account metadata.
pub const REMOVE_METADATA_PREFIX: &str = "X-Remove-Account-Meta-";

/// Account information from the response headers.
#[derive(Debug, Clone, Default)]
pub struct AccountHeader {
    /// Total bytes stored.
    pub bytes_used: u64,
    /// Bytes quota, if set.
    pub quota_bytes: Option<u64>,
    /// Number of containers.
    pub container_count: u64,
    /// Number of objects.
    pub object_count: u64,
    /// Secret keys for temporary URLs.
    pub temp_url_key: Option<String>,
    /// Second secret key for temporary URLs.
    pub temp_url_key_2: Option<String>,
    /// When the account was created.
    pub timestamp: Option<DateTime<Utc>>,
    /// Server time of the response.
    pub date: Option<DateTime<Utc>>,
    /// Transaction ID for troubleshooting.
    pub trans_id: Option<String>,
}

impl FromHeaders for AccountHeader {
    fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
        Ok(AccountHeader {
            bytes_used: header_parse(headers, "X-Account-Bytes-Used")?.unwrap_or_default(),
            quota_bytes: header_parse(headers, "X-Account-Meta-Quota-Bytes")?,
            container_count: header_parse(headers, "X-Account-Container-Count")?
                .unwrap_or_default(),
            object_count: header_parse(headers, "X-Account-Object-Count")?.unwrap_or_default(),
            temp_url_key: header_string(headers, "X-Account-Meta-Temp-URL-Key"),
            temp_url_key_2: header_string(headers, "X-Account-Meta-Temp-URL-Key-2"),
            timestamp: header_timestamp(headers, "X-Timestamp")?,
            date: header_date(headers, "Date")?,
            trans_id: header_string(headers, "X-Trans-Id"),
        })
    }
}

/// Options for updating an account.
#[derive(Debug, Clone, Default)]
pub struct UpdateOpts {
    /// Metadata to set, an empty value removes the item.
    pub metadata: HashMap<String, String>,
    /// Metadata keys to remove.
    pub remove_metadata: Vec<String>,
    /// Content type of the response.
    pub content_type: Option<String>,
    /// Let the server guess the content type.
    pub detect_content_type: Option<bool>,
    /// Secret keys for temporary URLs.
    pub temp_url_key: Option<String>,
    /// Second secret key for temporary URLs.
    pub temp_url_key_2: Option<String>,
}

impl HeaderBuilder for UpdateOpts {
    fn to_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        insert_metadata(&mut headers, METADATA_PREFIX, &self.metadata)?;
        insert_removals(&mut headers, REMOVE_METADATA_PREFIX, &self.remove_metadata)?;
        insert_opt(&mut headers, "Content-Type", &self.content_type)?;
        insert_opt(&mut headers, "X-Detect-Content-Type", &self.detect_content_type)?;
        insert_opt(&mut headers, "X-Account-Meta-Temp-URL-Key", &self.temp_url_key)?;
        insert_opt(
            &mut headers,
            "X-Account-Meta-Temp-URL-Key-2",
            &self.temp_url_key_2,
        )?;
        Ok(headers)
    }
}

/// Get account information and metadata.
///
/// With `newest`, the most recent replica is queried.
pub async fn get(client: &ServiceClient, newest: bool) -> ApiResult<AccountHeader> {
    let response = async {
        let url = client.url(std::iter::empty::<&str>())?;
        let mut headers = HeaderMap::new();
        if newest {
            insert_header(&mut headers, "X-Newest", "true")?;
        }
        client
            .head(url)
            .ok_codes([200, 204])
            .headers(headers)
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Update account metadata.
pub async fn update<B: HeaderBuilder>(client: &ServiceClient, opts: &B) -> ApiResult<HeaderMap> {
    let response = async {
        let headers = opts.to_headers()?;
        let url = client.url(std::iter::empty::<&str>())?;
        client
            .post(url)
            .ok_codes([201, 202, 204])
            .headers(headers)
            .send()
            .await
    };
    ApiResult::new(response.await)
}
