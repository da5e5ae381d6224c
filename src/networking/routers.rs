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

//! Layer-3 routers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::agents::Agent;
use crate::common::{deser_timestamp, empty_as_default, ser_comma_separated, SortDir};
use crate::{
    build_request_body, with_query, ApiResult, BodyBuilder, Error, ErrorKind, PaginatedResource,
    Pager, Pagination, ServiceClient,
};

/// An IP address on the external network.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExternalFixedIp {
    /// IP address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_address: String,
    /// Subnet of the address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet_id: String,
}

/// External gateway of a router.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GatewayInfo {
    /// External network ID.
    pub network_id: String,
    /// Whether SNAT is enabled, the server default is used if not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_snat: Option<bool>,
    /// Addresses on the external network.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_fixed_ips: Vec<ExternalFixedIp>,
}

/// A static route.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Route {
    /// Next hop IP address.
    pub nexthop: String,
    /// Destination CIDR.
    pub destination: String,
}

/// A router.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Router {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Name.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub name: String,
    /// Description.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub description: String,
    /// Administrative state.
    #[serde(default)]
    pub admin_state_up: bool,
    /// Operational status, e.g. `ACTIVE`.
    #[serde(default)]
    pub status: String,
    /// Gateway to an external network.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub external_gateway_info: Option<GatewayInfo>,
    /// Whether the router is distributed (admin only).
    #[serde(default)]
    pub distributed: Option<bool>,
    /// Whether the router is highly available (admin only).
    #[serde(default)]
    pub ha: Option<bool>,
    /// Extra routes.
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Requested availability zones.
    #[serde(default)]
    pub availability_zone_hints: Vec<String>,
    /// Availability zones the router is scheduled to.
    #[serde(default)]
    pub availability_zones: Vec<String>,
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

/// Result of adding or removing a router interface.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceInfo {
    /// Router ID.
    pub id: String,
    /// Subnet of the interface.
    pub subnet_id: String,
    /// Port of the interface.
    pub port_id: String,
    /// Subnets of the interface.
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    /// Network of the interface.
    #[serde(default)]
    pub network_id: String,
    /// Owning project.
    #[serde(default)]
    pub tenant_id: String,
}

/// Filters for listing routers.
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
    /// Filter by administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Filter by distributed mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributed: Option<bool>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Filter by project (legacy name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Filter by project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
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

/// Options for creating a router.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateOpts {
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Create a distributed router (admin only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributed: Option<bool>,
    /// Owning project (legacy name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Owning project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Gateway to an external network.
    #[serde(
        rename = "external_gateway_info",
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_info: Option<GatewayInfo>,
    /// Requested availability zones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone_hints: Option<Vec<String>>,
}

impl BodyBuilder for CreateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some("router"))
    }
}

/// Options for updating a router.
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
    /// Switch distributed mode (admin only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributed: Option<bool>,
    /// External gateway.
    #[serde(
        rename = "external_gateway_info",
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_info: Option<GatewayInfo>,
    /// New static routes, an empty list removes all routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Route>>,
}

impl BodyBuilder for UpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some("router"))
    }
}

/// Interface to add to or remove from a router.
///
/// Exactly one of the fields must be set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InterfaceOpts {
    /// Subnet to connect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    /// Port to use for the interface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_id: Option<String>,
}

impl InterfaceOpts {
    /// Interface on a subnet.
    pub fn subnet<S: Into<String>>(subnet_id: S) -> InterfaceOpts {
        InterfaceOpts {
            subnet_id: Some(subnet_id.into()),
            port_id: None,
        }
    }

    /// Interface using an existing port.
    pub fn port<S: Into<String>>(port_id: S) -> InterfaceOpts {
        InterfaceOpts {
            subnet_id: None,
            port_id: Some(port_id.into()),
        }
    }
}

impl BodyBuilder for InterfaceOpts {
    fn to_body(&self) -> Result<Value, Error> {
        let present = |value: &Option<String>| value.clone().filter(|id| !id.is_empty());
        let opts = InterfaceOpts {
            subnet_id: present(&self.subnet_id),
            port_id: present(&self.port_id),
        };
        match (&opts.subnet_id, &opts.port_id) {
            (Some(_), None) | (None, Some(_)) => build_request_body(&opts, None),
            _ => Err(Error::new(
                ErrorKind::InvalidInput,
                "Exactly one of subnet_id or port_id must be provided",
            )),
        }
    }
}

/// List routers.
pub fn list(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Router>, Error> {
    let url = with_query(client.url(["routers"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// Get a router.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<Router> {
    let response = async {
        let url = client.url(["routers", id.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("router")
}

/// Create a router.
pub async fn create<B: BodyBuilder>(client: &ServiceClient, opts: &B) -> ApiResult<Router> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["routers"])?;
        client.post(url).ok_codes([201]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("router")
}

/// Update a router.
pub async fn update<S, B>(client: &ServiceClient, id: S, opts: &B) -> ApiResult<Router>
where
    S: AsRef<str>,
    B: BodyBuilder,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["routers", id.as_ref()])?;
        client.put(url).ok_codes([200]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("router")
}

/// Delete a router.
pub async fn delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    let response = async {
        let url = client.url(["routers", id.as_ref()])?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}

async fn interface_action(
    client: &ServiceClient,
    id: &str,
    action: &str,
    opts: &InterfaceOpts,
) -> ApiResult<InterfaceInfo> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["routers", id, action])?;
        client.put(url).ok_codes([200]).json(&body).send().await
    };
    ApiResult::new(response.await)
}

/// Attach a subnet or a port to a router.
pub async fn add_interface<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &InterfaceOpts,
) -> ApiResult<InterfaceInfo> {
    interface_action(client, id.as_ref(), "add_router_interface", opts).await
}

/// Detach a subnet or a port from a router.
pub async fn remove_interface<S: AsRef<str>>(
    client: &ServiceClient,
    id: S,
    opts: &InterfaceOpts,
) -> ApiResult<InterfaceInfo> {
    interface_action(client, id.as_ref(), "remove_router_interface", opts).await
}

/// List L3 agents hosting a router.
pub fn list_l3_agents<S: AsRef<str>>(client: &ServiceClient, id: S) -> Result<Pager<Agent>, Error> {
    let url = client.url(["routers", id.as_ref(), "l3-agents"])?;
    Ok(Pager::new(client, url, Pagination::Single))
}

#[cfg(test)]
pub mod test {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{CreateOpts, GatewayInfo, InterfaceOpts, ListOpts, Route, UpdateOpts};
    use crate::serviceclient::test::new_client;
    use crate::services::NETWORK;
    use crate::{BodyBuilder, ErrorKind};

    const ROUTER_ID: &str = "8604a0de-7f6b-409a-a47c-a1cc7bc77b2e";

    fn router_json() -> serde_json::Value {
        json!({
            "status": "ACTIVE",
            "external_gateway_info": {
                "network_id": "8ca37218-28ff-41cb-9b10-039601ea7e6b",
                "enable_snat": true,
                "external_fixed_ips": [
                    {"ip_address": "172.24.4.6", "subnet_id": "b930d7f6-ceb7-40a0-8b81-a425dd994ccf"}
                ]
            },
            "name": "router1",
            "admin_state_up": true,
            "tenant_id": "33a40233088643acb66ff6eb0ebea679",
            "distributed": false,
            "routes": [],
            "id": ROUTER_ID,
            "created_at": "2018-03-19T19:16:56Z",
            "updated_at": ""
        })
    }

    #[tokio::test]
    async fn test_list_linked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.0/routers"))
            .and(query_param("limit", "1"))
            .and(query_param("marker", ROUTER_ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "routers": [{
                    "id": "a9254bdb-2613-4a13-ac4c-adc581fba50d",
                    "name": "router2",
                    "external_gateway_info": null
                }],
                "routers_links": [{"rel": "previous", "href": "http://example.com/previous"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let next = format!("{}/v2.0/routers?limit=1&marker={}", server.uri(), ROUTER_ID);
        Mock::given(method("GET"))
            .and(path("/v2.0/routers"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "routers": [router_json()],
                "routers_links": [{"rel": "next", "href": next}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let opts = ListOpts {
            limit: Some(1),
            ..ListOpts::default()
        };
        let routers = super::list(&cli, opts)
            .unwrap()
            .all_pages()
            .await
            .unwrap();
        assert_eq!(routers.len(), 2);
        assert_eq!(routers[0].name, "router1");
        let gw = routers[0].external_gateway_info.as_ref().unwrap();
        assert_eq!(gw.enable_snat, Some(true));
        assert_eq!(gw.external_fixed_ips[0].ip_address, "172.24.4.6");
        assert!(routers[0].created_at.is_some());
        assert!(routers[0].updated_at.is_none());
        assert_eq!(routers[1].name, "router2");
        assert!(routers[1].external_gateway_info.is_none());
    }

    #[tokio::test]
    async fn test_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/routers"))
            .and(body_json(json!({
                "router": {
                    "name": "router1",
                    "admin_state_up": true,
                    "external_gateway_info": {
                        "network_id": "8ca37218-28ff-41cb-9b10-039601ea7e6b"
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "router": router_json()
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let opts = CreateOpts {
            name: Some("router1".into()),
            admin_state_up: Some(true),
            gateway_info: Some(GatewayInfo {
                network_id: "8ca37218-28ff-41cb-9b10-039601ea7e6b".into(),
                ..GatewayInfo::default()
            }),
            ..CreateOpts::default()
        };
        let router = super::create(&cli, &opts).await.extract().unwrap();
        assert_eq!(router.id, ROUTER_ID);
    }

    #[tokio::test]
    async fn test_update_routes() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("/v2.0/routers/{}", ROUTER_ID)))
            .and(body_json(json!({
                "router": {
                    "routes": [{"nexthop": "10.1.0.10", "destination": "40.0.1.0/24"}]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "router": {
                    "id": ROUTER_ID,
                    "name": "router1",
                    "routes": [{"nexthop": "10.1.0.10", "destination": "40.0.1.0/24"}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("/v2.0/routers/{}", ROUTER_ID)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let route = Route {
            nexthop: "10.1.0.10".into(),
            destination: "40.0.1.0/24".into(),
        };
        let opts = UpdateOpts {
            routes: Some(vec![route.clone()]),
            ..UpdateOpts::default()
        };
        let router = super::update(&cli, ROUTER_ID, &opts)
            .await
            .extract()
            .unwrap();
        assert_eq!(router.routes, vec![route]);
        super::delete(&cli, ROUTER_ID).await.extract_err().unwrap();
    }

    #[tokio::test]
    async fn test_add_and_remove_interface() {
        let server = MockServer::start().await;
        let info = json!({
            "subnet_id": "0d32a837-8069-4ec3-84c4-3eef3e10b188",
            "tenant_id": "017d8de156df4177889f31a9bd6edc00",
            "port_id": "3f990102-4485-4df1-97a0-2c35bdb85b31",
            "id": ROUTER_ID
        });
        Mock::given(method("PUT"))
            .and(path(format!("/v2.0/routers/{}/add_router_interface", ROUTER_ID)))
            .and(body_json(json!({"subnet_id": "0d32a837-8069-4ec3-84c4-3eef3e10b188"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(info.clone()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!(
                "/v2.0/routers/{}/remove_router_interface",
                ROUTER_ID
            )))
            .and(body_json(json!({"port_id": "3f990102-4485-4df1-97a0-2c35bdb85b31"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(info))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let added = super::add_interface(
            &cli,
            ROUTER_ID,
            &InterfaceOpts::subnet("0d32a837-8069-4ec3-84c4-3eef3e10b188"),
        )
        .await
        .extract()
        .unwrap();
        assert_eq!(added.port_id, "3f990102-4485-4df1-97a0-2c35bdb85b31");

        let removed = super::remove_interface(
            &cli,
            ROUTER_ID,
            &InterfaceOpts::port("3f990102-4485-4df1-97a0-2c35bdb85b31"),
        )
        .await
        .extract()
        .unwrap();
        assert_eq!(removed.subnet_id, "0d32a837-8069-4ec3-84c4-3eef3e10b188");
    }

    #[tokio::test]
    async fn test_interface_requires_exactly_one() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let both = InterfaceOpts {
            subnet_id: Some("subnet".into()),
            port_id: Some("port".into()),
        };
        for opts in [
            InterfaceOpts::default(),
            both,
            InterfaceOpts::subnet(""),
            InterfaceOpts::port(""),
        ] {
            let err = super::add_interface(&cli, ROUTER_ID, &opts)
                .await
                .extract_err()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_interface_ignores_empty_id() {
        let opts = InterfaceOpts {
            subnet_id: Some("".into()),
            port_id: Some("9ab4a9f6-8b2e-4b0c-9b32-1b6b4bbbe2c7".into()),
        };
        assert_eq!(
            opts.to_body().unwrap(),
            json!({"port_id": "9ab4a9f6-8b2e-4b0c-9b32-1b6b4bbbe2c7"})
        );
    }

    #[tokio::test]
    async fn test_list_l3_agents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v2.0/routers/{}/l3-agents", ROUTER_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "agents": [{
                    "id": "ddbf087c-e38f-4a73-bcb3-c38f2a719a03",
                    "agent_type": "L3 agent",
                    "binary": "neutron-l3-agent",
                    "host": "os-compute-1",
                    "alive": true,
                    "admin_state_up": true,
                    "topic": "l3_agent",
                    "configurations": {"agent_mode": "legacy"},
                    "created_at": "2017-07-26 23:02:05",
                    "started_at": "2018-06-26 21:46:19",
                    "heartbeat_timestamp": "2019-01-09 11:43:01"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let agents = super::list_l3_agents(&cli, ROUTER_ID)
            .unwrap()
            .all_pages()
            .await
            .unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].binary, "neutron-l3-agent");
        assert_eq!(agents[0].configurations["agent_mode"], "legacy");
    }
}
