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

//! Volume snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::action;
use crate::common::{deser_timestamp, empty_as_default};
use crate::{
    build_request_body, require, with_query, ApiResult, BodyBuilder, Error, PaginatedResource,
    Pager, Pagination, ServiceClient, DELETE_OK_CODES,
};

/// A volume snapshot.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Snapshot {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Name.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub name: String,
    /// Description.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub description: String,
    /// Source volume.
    pub volume_id: String,
    /// Snapshot status, e.g. `available`.
    pub status: String,
    /// Size in GiB.
    #[serde(default)]
    pub size: u64,
    /// Metadata.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub metadata: HashMap<String, String>,
    /// Creation time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Progress of the snapshot creation, e.g. `100%`.
    #[serde(rename = "os-extended-snapshot-attributes:progress", default)]
    pub progress: Option<String>,
    /// Owning project.
    #[serde(rename = "os-extended-snapshot-attributes:project_id", default)]
    pub project_id: Option<String>,
}

/// Filters for listing snapshots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOpts {
    /// Include items of all projects (admin only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_tenants: Option<bool>,
    /// Filter by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Filter by volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
    /// Filter by project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Sort keys and directions, e.g. `name:asc,created_at:desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Number of items to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// ID of the item to start after.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

/// Options for creating a snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateOpts {
    /// Volume to snapshot (required).
    pub volume_id: String,
    /// Snapshot an attached volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Snapshot metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl BodyBuilder for CreateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.volume_id, "volume_id")?;
        build_request_body(self, Some("snapshot"))
    }
}

/// Options for updating a snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOpts {
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BodyBuilder for UpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some("snapshot"))
    }
}

/// Options for the status update action used by volume drivers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStatusOpts {
    /// New status (required).
    pub status: String,
    /// Progress, e.g. `90%`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
}

/// List snapshots with summary information.
pub fn list(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Snapshot>, Error> {
    let url = with_query(client.url(["snapshots"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// List snapshots with details.
pub fn list_detail(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Snapshot>, Error> {
    let url = with_query(client.url(["snapshots", "detail"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// Get a snapshot.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<Snapshot> {
    let response = async {
        let url = client.url(["snapshots", id.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("snapshot")
}

/// Create a snapshot.
pub async fn create<B: BodyBuilder>(client: &ServiceClient, opts: &B) -> ApiResult<Snapshot> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["snapshots"])?;
        client.post(url).ok_codes([202]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("snapshot")
}

/// Update a snapshot.
pub async fn update<S, B>(client: &ServiceClient, id: S, opts: &B) -> ApiResult<Snapshot>
where
    S: AsRef<str>,
    B: BodyBuilder,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["snapshots", id.as_ref()])?;
        client.put(url).ok_codes([200]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("snapshot")
}

/// Replace the metadata of a snapshot, returning the new metadata.
pub async fn update_metadata<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    metadata: &HashMap<String, String>,
) -> ApiResult<HashMap<String, String>> {
    let response = async {
        let url = client.url(["snapshots", id.as_ref(), "metadata"])?;
        client
            .put(url)
            .ok_codes([200])
            .json(&json!({ "metadata": metadata }))
            .send()
            .await
    };
    ApiResult::new(response.await).with_envelope("metadata")
}

/// Delete a snapshot.
pub async fn delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    let response = async {
        let url = client.url(["snapshots", id.as_ref()])?;
        client
            .delete(url)
            .ok_codes(DELETE_OK_CODES.iter().copied())
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Reset the status of a snapshot (admin only).
pub async fn reset_status<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    status: &str,
) -> ApiResult<()> {
    if let Err(err) = require(&status, "status") {
        return ApiResult::new(Err(err));
    }
    let args = json!({ "status": status });
    action(client, "snapshots", id.as_ref(), "os-reset_status", args, &[202]).await
}

/// Update the status and progress of a snapshot.
pub async fn update_status<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &UpdateStatusOpts,
) -> ApiResult<()> {
    let args = match require(&opts.status, "status").and_then(|_| build_request_body(opts, None))
    {
        Ok(args) => args,
        Err(err) => return ApiResult::new(Err(err)),
    };
    action(
        client,
        "snapshots",
        id.as_ref(),
        "os-update_snapshot_status",
        args,
        &[202],
    )
    .await
}

/// Delete a snapshot regardless of its state.
pub async fn force_delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    action(
        client,
        "snapshots",
        id.as_ref(),
        "os-force_delete",
        json!({}),
        &[202],
    )
    .await
}
