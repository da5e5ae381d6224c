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

//! Volume backups, restoring and moving them between deployments.

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

/// A volume backup.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Backup {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Name.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub name: String,
    /// Description.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub description: String,
    /// Backed up volume.
    #[serde(default)]
    pub volume_id: String,
    /// Snapshot the backup was taken from.
    #[serde(default)]
    pub snapshot_id: Option<String>,
    /// Backup status, e.g. `available`.
    #[serde(default)]
    pub status: String,
    /// Reason of the failure if the status is `error`.
    #[serde(default)]
    pub fail_reason: Option<String>,
    /// Availability zone.
    #[serde(default)]
    pub availability_zone: Option<String>,
    /// Storage container of the backup.
    #[serde(default)]
    pub container: Option<String>,
    /// Size in GiB.
    #[serde(default)]
    pub size: u64,
    /// Number of objects in the storage container.
    #[serde(default)]
    pub object_count: u64,
    /// Whether the backup is incremental.
    #[serde(default)]
    pub is_incremental: bool,
    /// Whether incremental backups depend on this one.
    #[serde(default)]
    pub has_dependent_backups: bool,
    /// Backup metadata.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub metadata: HashMap<String, String>,
    /// Creation time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// When the data was actually backed up.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub data_timestamp: Option<DateTime<Utc>>,
}

/// Filters for listing backups.
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

/// Options for creating a backup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateOpts {
    /// Volume to back up (required).
    pub volume_id: String,
    /// Storage container for the backup data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Take an incremental backup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incremental: Option<bool>,
    /// Back up an attached volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Snapshot to back up instead of the volume itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Backup metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Availability zone of the backup service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

impl BodyBuilder for CreateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.volume_id, "volume_id")?;
        build_request_body(self, Some("backup"))
    }
}

/// Options for updating a backup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOpts {
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New backup metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl BodyBuilder for UpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some("backup"))
    }
}

/// Options for restoring a backup.
///
/// Without a volume ID or a name, a new volume is created.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreOpts {
    /// Existing volume to restore into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
    /// Name of the new volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BodyBuilder for RestoreOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some("restore"))
    }
}

/// Result of a restore.
#[derive(Debug, Clone, Deserialize)]
pub struct Restore {
    /// Restored backup.
    pub backup_id: String,
    /// Volume the data was restored into.
    pub volume_id: String,
    /// Name of the restored volume.
    #[serde(default)]
    pub volume_name: String,
}

/// Backup metadata that can be imported into another deployment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImportExportRecord {
    /// Name of the backup service that has the data.
    pub backup_service: String,
    /// Opaque encoded backup metadata.
    pub backup_url: String,
}

impl BodyBuilder for ImportExportRecord {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.backup_service, "backup_service")?;
        require(&self.backup_url, "backup_url")?;
        build_request_body(self, Some("backup-record"))
    }
}

/// Reference to an imported backup.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportedBackup {
    /// ID of the imported backup.
    pub id: String,
    /// Name of the imported backup.
    #[serde(default)]
    pub name: Option<String>,
}

/// List backups with summary information.
pub fn list(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Backup>, Error> {
    let url = with_query(client.url(["backups"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// List backups with details.
pub fn list_detail(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Backup>, Error> {
    let url = with_query(client.url(["backups", "detail"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// Get a backup.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<Backup> {
    let response = async {
        let url = client.url(["backups", id.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("backup")
}

/// Start a backup.
pub async fn create<B: BodyBuilder>(client: &ServiceClient, opts: &B) -> ApiResult<Backup> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["backups"])?;
        client.post(url).ok_codes([202]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("backup")
}

/// Update a backup.
pub async fn update<S, B>(client: &ServiceClient, id: S, opts: &B) -> ApiResult<Backup>
where
    S: AsRef<str>,
    B: BodyBuilder,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["backups", id.as_ref()])?;
        client.put(url).ok_codes([200]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("backup")
}

/// Delete a backup.
pub async fn delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    let response = async {
        let url = client.url(["backups", id.as_ref()])?;
        client
            .delete(url)
            .ok_codes(DELETE_OK_CODES.iter().copied())
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Restore a backup into a new or an existing volume.
pub async fn restore<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &RestoreOpts,
) -> ApiResult<Restore> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["backups", id.as_ref(), "restore"])?;
        client.post(url).ok_codes([202]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("restore")
}

/// Export the metadata of a backup.
pub async fn export<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
) -> ApiResult<ImportExportRecord> {
    let response = async {
        let url = client.url(["backups", id.as_ref(), "export_record"])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("backup-record")
}

/// Import backup metadata exported from another deployment.
pub async fn import(client: &ServiceClient, record: &ImportExportRecord) -> ApiResult<ImportedBackup> {
    let response = async {
        let body = record.to_body()?;
        let url = client.url(["backups", "import_record"])?;
        client.post(url).ok_codes([201]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("backup")
}

/// Reset the status of a backup (admin only).
pub async fn reset_status<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    status: &str,
) -> ApiResult<()> {
    if let Err(err) = require(&status, "status") {
        return ApiResult::new(Err(err));
    }
    let args = json!({ "status": status });
    action(client, "backups", id.as_ref(), "os-reset_status", args, &[202]).await
}

/// Delete a backup regardless of its state.
pub async fn force_delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    action(
        client,
        "backups",
        id.as_ref(),
        "os-force_delete",
        json!({}),
        &[202],
    )
    .await
}
