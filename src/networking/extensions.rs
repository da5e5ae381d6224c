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

//! API extensions enabled in the Networking service.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::common::{deser_timestamp, empty_as_default, Link};
use crate::{ApiResult, Error, PaginatedResource, Pager, Pagination, ServiceClient};

/// An API extension.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Extension {
    /// Short name used to refer to the extension.
    #[resource_id]
    pub alias: String,
    /// Human-readable name.
    pub name: String,
    /// Description of the extension.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub description: String,
    /// Links to documentation.
    #[serde(default)]
    pub links: Vec<Link>,
    /// XML namespace, not set by recent releases.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Last update of the extension.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

/// List all enabled extensions.
///
/// The listing is never paginated.
pub fn list(client: &ServiceClient) -> Result<Pager<Extension>, Error> {
    let url = client.url(["extensions"])?;
    Ok(Pager::new(client, url, Pagination::Single))
}

/// Get an extension by its alias.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, alias: S) -> ApiResult<Extension> {
    let response = async {
        let url = client.url(["extensions", alias.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("extension")
}
