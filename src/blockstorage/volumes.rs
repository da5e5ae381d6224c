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

//! Volumes and volume actions.
//!
//! ```rust,no_run
//! use osclient::blockstorage::volumes;
//!
//! # async fn example(cinder: osclient::ServiceClient) -> Result<(), osclient::Error> {
//! let opts = volumes::CreateOpts {
//!     size: 10,
//!     name: Some("data".into()),
//!     ..Default::default()
//! };
//! let volume = volumes::create(&cinder, &opts).await.extract()?;
//! volumes::extend_size(&cinder, &volume.id, 20).await.extract_err()?;
//! # Ok(()) }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::action;
use crate::common::{deser_bool_string, deser_timestamp, empty_as_default};
use crate::{
    build_request_body, protocol_enum, require, with_query, ApiResult, BodyBuilder, Error,
    PaginatedResource, Pager, Pagination, ServiceClient, DELETE_OK_CODES,
};

/// An attachment of a volume to a server or a host.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    #[serde(default)]
    pub attachment_id: String,
    /// Server the volume is attached to.
    #[serde(default)]
    pub server_id: String,
    /// Host the volume is attached to.
    #[serde(default)]
    pub host_name: Option<String>,
    /// Device name on the server, e.g. `/dev/vdb`.
    #[serde(default)]
    pub device: String,
    /// Attached volume.
    #[serde(default)]
    pub volume_id: String,
    /// Attachment time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub attached_at: Option<DateTime<Utc>>,
}

/// A volume.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Volume {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Current state, e.g. `available` or `in-use`.
    pub status: String,
    /// Size in GiB.
    pub size: u64,
    /// Availability zone.
    #[serde(default)]
    pub availability_zone: String,
    /// Creation time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Where the volume is attached.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Volume name.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub name: String,
    /// Volume description.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub description: String,
    /// Name of the volume type.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub volume_type: String,
    /// Snapshot the volume was created from.
    #[serde(default)]
    pub snapshot_id: Option<String>,
    /// Volume the volume was cloned from.
    #[serde(default)]
    pub source_volid: Option<String>,
    /// Backup the volume was created from.
    #[serde(default)]
    pub backup_id: Option<String>,
    /// Metadata.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub metadata: HashMap<String, String>,
    /// Metadata of the image the volume was created from.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub volume_image_metadata: HashMap<String, String>,
    /// User who created it.
    #[serde(default)]
    pub user_id: String,
    /// Whether the volume can be booted from. Reported as a string by the server.
    #[serde(default, deserialize_with = "deser_bool_string")]
    pub bootable: bool,
    /// Whether the volume is encrypted.
    #[serde(default)]
    pub encrypted: bool,
    /// Whether the volume can be attached to several servers.
    #[serde(default)]
    pub multiattach: bool,
    /// Replication status.
    #[serde(default)]
    pub replication_status: Option<String>,
    /// Consistency group.
    #[serde(default)]
    pub consistencygroup_id: Option<String>,
    /// Backend host (admin only).
    #[serde(rename = "os-vol-host-attr:host", default)]
    pub host: Option<String>,
    /// Owning project.
    #[serde(rename = "os-vol-tenant-attr:tenant_id", default)]
    pub tenant_id: Option<String>,
}

/// Filters for listing volumes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOpts {
    /// List volumes of all projects (admin only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_tenants: Option<bool>,
    /// Filter by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Filter by project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Only bootable or only non-bootable volumes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootable: Option<bool>,
    /// Sort specification, e.g. `name:asc,created_at:desc`.
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

/// Options for creating a volume.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateOpts {
    /// Size in GiB (required).
    pub size: u64,
    /// Availability zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// Consistency group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistencygroup_id: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Volume metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Snapshot to create from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Volume to clone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_volid: Option<String>,
    /// Backup the volume was created from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_id: Option<String>,
    /// Image to populate the volume from.
    #[serde(rename = "imageRef", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Volume type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    /// Whether the volume can be attached to several servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiattach: Option<bool>,
}

impl BodyBuilder for CreateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.size, "size")?;
        build_request_body(self, Some("volume"))
    }
}

/// Options for updating a volume.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOpts {
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New metadata, replaces the existing one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl BodyBuilder for UpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some("volume"))
    }
}

/// Options for deleting a volume.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DeleteOpts {
    /// Also delete all snapshots of the volume.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cascade: bool,
}

protocol_enum! {
    #[doc = "Access mode of an attachment."]
    enum AttachMode {
        #[doc = "Read-write."]
        ReadWrite = "rw",
        #[doc = "Read-only."]
        ReadOnly = "ro"
    }
}

/// Options for the attach action.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachOpts {
    /// Mount point on the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mountpoint: Option<String>,
    /// Access mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AttachMode>,
    /// Server to attach to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_uuid: Option<String>,
    /// Host to attach to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

/// Options for the retype action.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeTypeOpts {
    /// New volume type (required).
    pub new_type: String,
    /// Either `never` (the default) or `on-demand`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_policy: Option<String>,
}

/// Options for the reset status action (admin only).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetStatusOpts {
    /// New status (required).
    pub status: String,
    /// New attach status, e.g. `detached`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_status: Option<String>,
    /// New migration status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_status: Option<String>,
}

/// List volumes with details.
pub fn list(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Volume>, Error> {
    let url = with_query(client.url(["volumes", "detail"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// Get a volume.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<Volume> {
    let response = async {
        let url = client.url(["volumes", id.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("volume")
}

/// Create a volume.
///
/// The volume is created asynchronously, check its status before using it.
pub async fn create<B: BodyBuilder>(client: &ServiceClient, opts: &B) -> ApiResult<Volume> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["volumes"])?;
        client.post(url).ok_codes([202]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("volume")
}

/// Update a volume.
pub async fn update<S, B>(client: &ServiceClient, id: S, opts: &B) -> ApiResult<Volume>
where
    S: AsRef<str>,
    B: BodyBuilder,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["volumes", id.as_ref()])?;
        client.put(url).ok_codes([200]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("volume")
}

/// Delete a volume.
pub async fn delete<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: DeleteOpts,
) -> ApiResult<()> {
    let response = async {
        let url = with_query(client.url(["volumes", id.as_ref()])?, &opts)?;
        client.delete(url).ok_codes(DELETE_OK_CODES.iter().copied()).send().await
    };
    ApiResult::new(response.await)
}

async fn volume_action<T: Serialize>(
    client: &ServiceClient,
    id: &str,
    name: &str,
    args: &T,
    ok_codes: &[u16],
) -> ApiResult<()> {
    match build_request_body(args, None) {
        Ok(args) => action(client, "volumes", id, name, args, ok_codes).await,
        Err(err) => ApiResult::new(Err(err)),
    }
}

/// Attach a volume to a server or a host.
///
/// This only updates the database, the actual attachment is done by the compute service.
pub async fn attach<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &AttachOpts,
) -> ApiResult<()> {
    volume_action(client, id.as_ref(), "os-attach", opts, &[202]).await
}

/// Mark a volume as detaching.
pub async fn begin_detaching<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    volume_action(client, id.as_ref(), "os-begin_detaching", &json!({}), &[202]).await
}

/// Detach a volume, optionally only one of its attachments.
pub async fn detach<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    attachment_id: Option<&str>,
) -> ApiResult<()> {
    let args = match attachment_id {
        Some(attachment_id) => json!({ "attachment_id": attachment_id }),
        None => json!({}),
    };
    volume_action(client, id.as_ref(), "os-detach", &args, &[202]).await
}

/// Reserve a volume for attaching.
pub async fn reserve<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    volume_action(client, id.as_ref(), "os-reserve", &json!({}), &[202]).await
}

/// Remove the reservation.
pub async fn unreserve<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    volume_action(client, id.as_ref(), "os-unreserve", &json!({}), &[202]).await
}

/// Grow a volume to the new size in GiB.
pub async fn extend_size<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    new_size: u64,
) -> ApiResult<()> {
    if let Err(err) = require(&new_size, "new_size") {
        return ApiResult::new(Err(err));
    }
    let args = json!({ "new_size": new_size });
    volume_action(client, id.as_ref(), "os-extend", &args, &[202]).await
}

/// Delete a volume regardless of its state.
pub async fn force_delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    volume_action(client, id.as_ref(), "os-force_delete", &json!({}), &[202]).await
}

/// Set image metadata on a volume.
pub async fn set_image_metadata<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    metadata: &HashMap<String, String>,
) -> ApiResult<()> {
    let args = json!({ "metadata": metadata });
    volume_action(client, id.as_ref(), "os-set_image_metadata", &args, &[200]).await
}

/// Mark a volume as bootable or not.
pub async fn set_bootable<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    bootable: bool,
) -> ApiResult<()> {
    let args = json!({ "bootable": bootable });
    volume_action(client, id.as_ref(), "os-set_bootable", &args, &[200]).await
}

/// Change the type of a volume.
pub async fn change_type<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &ChangeTypeOpts,
) -> ApiResult<()> {
    if let Err(err) = require(&opts.new_type, "new_type") {
        return ApiResult::new(Err(err));
    }
    volume_action(client, id.as_ref(), "os-retype", opts, &[202]).await
}

/// Reset the status of a volume (admin only).
pub async fn reset_status<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &ResetStatusOpts,
) -> ApiResult<()> {
    if let Err(err) = require(&opts.status, "status") {
        return ApiResult::new(Err(err));
    }
    volume_action(client, id.as_ref(), "os-reset_status", opts, &[202]).await
}
