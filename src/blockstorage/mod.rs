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

//! Block Storage API (Cinder v3) resources.
//!
//! Use a [`ServiceClient`](crate::ServiceClient) created with
//! [`services::BLOCK_STORAGE`](crate::services::BLOCK_STORAGE). The endpoint normally
//! includes the project ID.

use serde_json::Value;

use crate::{query, ApiResult, ServiceClient};

pub mod backups;
pub mod snapshots;
pub mod volumes;

/// Run an action on a resource: `POST /<collection>/<id>/action` with `{<action>: <args>}`.
pub(crate) async fn action(
    client: &ServiceClient,
    collection: &str,
    id: &str,
    action: &str,
    args: Value,
    ok_codes: &[u16],
) -> ApiResult<()> {
    let response = async {
        let url = client.url([collection, id, "action"])?;
        client
            .post(url)
            .ok_codes(ok_codes.iter().copied())
            .json(&query::wrap(action, args))
            .send()
            .await
    };
    ApiResult::new(response.await)
}
