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

//! Networking agents and their scheduling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::routers::Router;
use crate::common::{deser_timestamp, empty_as_default, SortDir};
use crate::{
    build_request_body, require, with_query, ApiResult, BodyBuilder, Error, PaginatedResource,
    Pager, Pagination, ServiceClient,
};

/// An agent.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Agent {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Administrative state.
    #[serde(default)]
    pub admin_state_up: bool,
    /// Type of the agent, e.g. `DHCP agent`.
    #[serde(default)]
    pub agent_type: String,
    /// Whether the agent reported its state recently.
    #[serde(default)]
    pub alive: bool,
    /// Whether resources are in sync with the placement service.
    #[serde(default)]
    pub resources_synced: Option<bool>,
    /// Availability zone.
    #[serde(default)]
    pub availability_zone: Option<String>,
    /// Executable name.
    #[serde(default)]
    pub binary: String,
    /// Agent-specific configuration.
    #[serde(default)]
    pub configurations: Value,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Host the agent runs on.
    #[serde(default)]
    pub host: String,
    /// Message queue topic.
    #[serde(default)]
    pub topic: String,
    /// When the agent was registered.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the agent was started.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    /// Time of the last state report.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub heartbeat_timestamp: Option<DateTime<Utc>>,
}

/// A network served by a DHCP agent.
///
/// Only the common fields are decoded.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Network {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Network name.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub name: String,
    /// Administrative state.
    #[serde(default)]
    pub admin_state_up: bool,
    /// Network status.
    #[serde(default)]
    pub status: String,
    /// Subnet IDs.
    #[serde(default)]
    pub subnets: Vec<String>,
    /// Whether the network is shared.
    #[serde(default)]
    pub shared: bool,
    /// Owning project.
    #[serde(default)]
    pub project_id: String,
}

/// Filters for listing agents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOpts {
    /// Filter by ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Filter by agent type, e.g. `DHCP agent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    /// Only alive or only dead agents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alive: Option<bool>,
    /// Filter by availability zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// Filter by executable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    /// Filter by description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Filter by host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Filter by message queue topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
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
}

/// Options for updating an agent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOpts {
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Enable or disable the agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
}

impl BodyBuilder for UpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some("agent"))
    }
}

/// Network to schedule on a DHCP agent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleDhcpNetworkOpts {
    /// Network ID (required).
    pub network_id: String,
}

impl BodyBuilder for ScheduleDhcpNetworkOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.network_id, "network_id")?;
        build_request_body(self, None)
    }
}

/// Router to schedule on an L3 agent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleL3RouterOpts {
    /// Router ID (required).
    pub router_id: String,
}

impl BodyBuilder for ScheduleL3RouterOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.router_id, "router_id")?;
        build_request_body(self, None)
    }
}

/// List agents.
pub fn list(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Agent>, Error> {
    let url = with_query(client.url(["agents"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// Get an agent.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<Agent> {
    let response = async {
        let url = client.url(["agents", id.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("agent")
}

/// Update an agent.
pub async fn update<S, B>(client: &ServiceClient, id: S, opts: &B) -> ApiResult<Agent>
where
    S: AsRef<str>,
    B: BodyBuilder,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["agents", id.as_ref()])?;
        client.put(url).ok_codes([200]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("agent")
}

/// Delete an agent.
pub async fn delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    let response = async {
        let url = client.url(["agents", id.as_ref()])?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}

/// List networks hosted by a DHCP agent.
pub fn list_dhcp_networks<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
) -> Result<Pager<Network>, Error> {
    let url = client.url(["agents", id.as_ref(), "dhcp-networks"])?;
    Ok(Pager::new(client, url, Pagination::Single))
}

/// Schedule a network on a DHCP agent.
pub async fn schedule_dhcp_network<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &ScheduleDhcpNetworkOpts,
) -> ApiResult<()> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["agents", id.as_ref(), "dhcp-networks"])?;
        client.post(url).ok_codes([201]).json(&body).send().await
    };
    ApiResult::new(response.await)
}

/// Remove a network from a DHCP agent.
pub async fn remove_dhcp_network<S1, S2>(
    client: &ServiceClient,
    id: S1,
    network_id: S2,
) -> ApiResult<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let url = client.url(["agents", id.as_ref(), "dhcp-networks", network_id.as_ref()])?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}

/// List routers hosted by an L3 agent.
pub fn list_l3_routers<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
) -> Result<Pager<Router>, Error> {
    let url = client.url(["agents", id.as_ref(), "l3-routers"])?;
    Ok(Pager::new(client, url, Pagination::Single))
}

/// Schedule a router on an L3 agent.
pub async fn schedule_l3_router<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &ScheduleL3RouterOpts,
) -> ApiResult<()> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["agents", id.as_ref(), "l3-routers"])?;
        client.post(url).ok_codes([201]).json(&body).send().await
    };
    ApiResult::new(response.await)
}

/// Remove a router from an L3 agent.
pub async fn remove_l3_router<S1, S2>(
    client: &ServiceClient,
    id: S1,
    router_id: S2,
) -> ApiResult<()>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let url = client.url(["agents", id.as_ref(), "l3-routers", router_id.as_ref()])?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}
