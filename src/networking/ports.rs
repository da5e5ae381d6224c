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

//! Network ports.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{deser_timestamp, empty_as_default, ser_comma_separated, SortDir};
use crate::query::envelope_mut;
use crate::{
    build_request_body, require, with_query, ApiResult, BodyBuilder, Error, ErrorKind,
    PaginatedResource, Pager, Pagination, ServiceClient,
};

/// An IP address of a port.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FixedIp {
    /// Subnet of the address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet_id: String,
    /// The address, allocated by the server if empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_address: String,
}

/// An additional address allowed to pass through a port.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AddressPair {
    /// IP address or CIDR.
    pub ip_address: String,
    /// MAC address, the port one if not set.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac_address: String,
}

/// A port.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Port {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Network the port belongs to.
    pub network_id: String,
    /// Name.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub name: String,
    /// Description.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub description: String,
    /// Administrative state.
    #[serde(default)]
    pub admin_state_up: bool,
    /// Operational status, e.g. `ACTIVE` or `DOWN`.
    #[serde(default)]
    pub status: String,
    /// MAC address.
    #[serde(default)]
    pub mac_address: String,
    /// Fixed IP addresses.
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
    /// Entity using the port, e.g. `network:router_interface`.
    #[serde(default)]
    pub device_owner: String,
    /// ID of the entity using the port.
    #[serde(default)]
    pub device_id: String,
    /// Security group IDs.
    #[serde(default)]
    pub security_groups: Vec<String>,
    /// Additional addresses allowed to pass through the port.
    #[serde(default)]
    pub allowed_address_pairs: Vec<AddressPair>,
    /// Owning project.
    #[serde(default)]
    pub project_id: String,
    /// Owning project (legacy name).
    #[serde(default)]
    pub tenant_id: String,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Incremented on every update.
    #[serde(default)]
    pub revision_number: u32,
    /// Creation time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Filters for listing ports.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOpts {
    /// Filter by ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Filter by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter by description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Filter by administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Filter by network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Filter by project (legacy name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Filter by project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Filter by the owner of the device, e.g. `network:dhcp`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_owner: Option<String>,
    /// Filter by the device using the port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Filter by MAC address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// ID of the item to start after.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Field to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDir>,
    /// Items with all of these tags.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_comma_separated"
    )]
    pub tags: Option<Vec<String>>,
    /// Items with any of these tags.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_comma_separated"
    )]
    pub tags_any: Option<Vec<String>>,
    /// Items without all of these tags.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_comma_separated"
    )]
    pub not_tags: Option<Vec<String>>,
    /// Items without any of these tags.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_comma_separated"
    )]
    pub not_tags_any: Option<Vec<String>>,
}

/// Options for creating a port.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateOpts {
    /// Network to create the port on (required).
    pub network_id: String,
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// MAC address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// Fixed IP addresses, allocated automatically if empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ips: Option<Vec<FixedIp>>,
    /// Device using the port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Entity owning the port, e.g. `compute:nova`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_owner: Option<String>,
    /// Owning project (legacy name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Owning project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Security group IDs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_groups: Option<Vec<String>>,
    /// Additional addresses allowed to pass through the port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_address_pairs: Option<Vec<AddressPair>>,
    /// Additional fields not covered by this structure.
    ///
    /// A key that duplicates a regular field is rejected.
    #[serde(skip)]
    pub value_specs: HashMap<String, String>,
}

/// Merge free-form fields into the port object.
fn merge_value_specs(body: &mut Value, value_specs: &HashMap<String, String>) -> Result<(), Error> {
    if value_specs.is_empty() {
        return Ok(());
    }

    let port = envelope_mut(body, "port")?;
    for (key, value) in value_specs {
        if port.contains_key(key) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Duplicate key in value_specs: {}", key),
            ));
        }
        let _ = port.insert(key.clone(), Value::String(value.clone()));
    }
    Ok(())
}

impl BodyBuilder for CreateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.network_id, "network_id")?;
        let mut body = build_request_body(self, Some("port"))?;
        merge_value_specs(&mut body, &self.value_specs)?;
        Ok(body)
    }
}

/// Options for updating a port.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOpts {
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// New fixed IP addresses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ips: Option<Vec<FixedIp>>,
    /// Device using the port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Entity owning the port, e.g. `compute:nova`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_owner: Option<String>,
    /// New security groups, an empty list removes all groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_groups: Option<Vec<String>>,
    /// Additional addresses allowed to pass through the port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_address_pairs: Option<Vec<AddressPair>>,
    /// Additional fields not covered by this structure.
    #[serde(skip)]
    pub value_specs: HashMap<String, String>,
}

impl BodyBuilder for UpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        let mut body = build_request_body(self, Some("port"))?;
        merge_value_specs(&mut body, &self.value_specs)?;
        Ok(body)
    }
}

/// List ports.
pub fn list(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Port>, Error> {
    let url = with_query(client.url(["ports"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// Get a port.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<Port> {
    let response = async {
        let url = client.url(["ports", id.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("port")
}

/// Create a port.
pub async fn create<B: BodyBuilder>(client: &ServiceClient, opts: &B) -> ApiResult<Port> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["ports"])?;
        client.post(url).ok_codes([201]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("port")
}

/// Update a port.
pub async fn update<S, B>(client: &ServiceClient, id: S, opts: &B) -> ApiResult<Port>
where
    S: AsRef<str>,
    B: BodyBuilder,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["ports", id.as_ref()])?;
        client.put(url).ok_codes([200, 201]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("port")
}

/// Delete a port.
pub async fn delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    let response = async {
        let url = client.url(["ports", id.as_ref()])?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}
