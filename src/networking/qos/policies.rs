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

//! QoS policies and their attachment to ports and networks.
//!
//! ```rust,no_run
//! use osclient::networking::qos::policies::{self, CreateOpts};
//!
//! # async fn example(network: osclient::ServiceClient) -> Result<(), osclient::Error> {
//! let opts = CreateOpts {
//!     name: "bw-limiter".into(),
//!     shared: Some(true),
//!     ..CreateOpts::default()
//! };
//! let policy = policies::create(&network, &opts).await.extract()?;
//! println!("created {}", policy.id);
//! # Ok(()) }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{deser_timestamp, empty_as_default, ser_comma_separated, SortDir};
use crate::query::envelope_mut;
use crate::{
    build_request_body, require, with_query, ApiResult, BodyBuilder, Error, PaginatedResource,
    Pager, Pagination, ServiceClient,
};

/// A QoS policy.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct Policy {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Policy name.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub name: String,
    /// Policy description.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub description: String,
    /// Whether the policy is shared with other projects.
    #[serde(default)]
    pub shared: bool,
    /// Whether this is the default policy of the project.
    #[serde(default)]
    pub is_default: bool,
    /// Owning project.
    #[serde(default)]
    pub project_id: String,
    /// Owning project (legacy name).
    #[serde(default)]
    pub tenant_id: String,
    /// Incremented on every update.
    #[serde(default)]
    pub revision_number: u32,
    /// Rules of all kinds attached to the policy, as returned by the server.
    #[serde(default)]
    pub rules: Vec<Value>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The `qos_policy_id` field of ports and networks.
///
/// Flatten it into your own structure and decode with
/// [`ApiResult::extract_into`](crate::ApiResult::extract_into):
///
/// ```rust
/// #[derive(serde::Deserialize)]
/// struct PortWithPolicy {
///     #[serde(flatten)]
///     port: osclient::networking::ports::Port,
///     #[serde(flatten)]
///     qos: osclient::networking::qos::policies::QosPolicyExt,
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct QosPolicyExt {
    /// ID of the attached policy, if any.
    #[serde(default)]
    pub qos_policy_id: Option<String>,
}

/// Filters for listing policies.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOpts {
    /// Filter by ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Filter by project (legacy name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Filter by project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Filter by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter by description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Filter by revision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<u32>,
    /// Filter by sharing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Only the default policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// ID of the policy to start after.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Field to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDir>,
    /// Policies with all of these tags.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_comma_separated"
    )]
    pub tags: Option<Vec<String>>,
    /// Policies with any of these tags.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_comma_separated"
    )]
    pub tags_any: Option<Vec<String>>,
    /// Policies without all of these tags.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_comma_separated"
    )]
    pub not_tags: Option<Vec<String>>,
    /// Policies without any of these tags.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_comma_separated"
    )]
    pub not_tags_any: Option<Vec<String>>,
}

/// Options for creating a policy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateOpts {
    /// Policy name (required).
    pub name: String,
    /// Owning project (legacy name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Owning project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Whether the item is shared with other projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether this is the default policy of the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl BodyBuilder for CreateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.name, "name")?;
        build_request_body(self, Some("policy"))
    }
}

/// Options for updating a policy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateOpts {
    /// Name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether the item is shared with other projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether this is the default policy of the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl BodyBuilder for UpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some("policy"))
    }
}

/// List policies.
pub fn list(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Policy>, Error> {
    let url = with_query(client.url(["qos", "policies"])?, &opts)?;
    Ok(Pager::new(client, url, Pagination::Linked))
}

/// Get a policy.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<Policy> {
    let response = async {
        let url = client.url(["qos", "policies", id.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("policy")
}

/// Create a policy.
pub async fn create<B: BodyBuilder>(client: &ServiceClient, opts: &B) -> ApiResult<Policy> {
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["qos", "policies"])?;
        client.post(url).ok_codes([201]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("policy")
}

/// Update a policy.
pub async fn update<S, B>(client: &ServiceClient, id: S, opts: &B) -> ApiResult<Policy>
where
    S: AsRef<str>,
    B: BodyBuilder,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["qos", "policies", id.as_ref()])?;
        client.put(url).ok_codes([200]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope("policy")
}

/// Delete a policy.
pub async fn delete<S: AsRef<str>>(client: &ServiceClient, id: S) -> ApiResult<()> {
    let response = async {
        let url = client.url(["qos", "policies", id.as_ref()])?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}

fn set_policy_id(
    body: &mut Value,
    envelope: &str,
    policy_id: Option<&str>,
    empty_clears: bool,
) -> Result<(), Error> {
    let value = match policy_id {
        Some("") if empty_clears => Value::Null,
        Some("") | None => return Ok(()),
        Some(id) => Value::String(id.to_string()),
    };
    let _ = envelope_mut(body, envelope)?.insert("qos_policy_id".into(), value);
    Ok(())
}

macro_rules! policy_ext {
    ($(#[$attr:meta])* $name:ident, $envelope:expr, $empty_clears:expr) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Default)]
        pub struct $name<B> {
            /// Builder of the base request.
            pub base: B,
            /// ID of the policy to attach.
            pub qos_policy_id: Option<String>,
        }

        impl<B> $name<B> {
            /// Wrap a base builder.
            pub fn new(base: B) -> $name<B> {
                $name {
                    base,
                    qos_policy_id: None,
                }
            }

            /// Set the policy ID.
            pub fn with_qos_policy_id<S: Into<String>>(mut self, value: S) -> Self {
                self.qos_policy_id = Some(value.into());
                self
            }
        }

        impl<B: BodyBuilder> BodyBuilder for $name<B> {
            fn to_body(&self) -> Result<Value, Error> {
                let mut body = self.base.to_body()?;
                set_policy_id(
                    &mut body,
                    $envelope,
                    self.qos_policy_id.as_deref(),
                    $empty_clears,
                )?;
                Ok(body)
            }
        }
    };
}

policy_ext! {
    /// Port creation options with a QoS policy.
    PortCreateOptsExt, "port", false
}

policy_ext! {
    /// Port update options with a QoS policy.
    ///
    /// An empty policy ID detaches the current policy.
    PortUpdateOptsExt, "port", true
}

policy_ext! {
    /// Network creation options with a QoS policy.
    NetworkCreateOptsExt, "network", false
}

policy_ext! {
    /// Network update options with a QoS policy.
    ///
    /// An empty policy ID detaches the current policy.
    NetworkUpdateOptsExt, "network", true
}

#[cfg(test)]
pub mod test {
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{
        CreateOpts, ListOpts, NetworkUpdateOptsExt, PortCreateOptsExt, PortUpdateOptsExt,
        QosPolicyExt, UpdateOpts,
    };
    use crate::networking::ports;
    use crate::serviceclient::test::new_client;
    use crate::services::NETWORK;
    use crate::{BodyBuilder, Error, ErrorKind};

    const POLICY_ID: &str = "d6ae28ce-fcb5-4180-aa62-d260a27e09ae";

    fn policy_json(name: &str) -> Value {
        json!({
            "name": name,
            "tags": [],
            "rules": [
                {
                    "max_kbps": 3000,
                    "direction": "egress",
                    "qos_policy_id": POLICY_ID,
                    "type": "bandwidth_limit",
                    "id": "30a57f4a-336b-4382-8275-d708babd2241",
                    "max_burst_kbps": 300
                }
            ],
            "tenant_id": "a77cbe0998374aed9a6798ad6c61677e",
            "created_at": "2019-05-19T11:17:50Z",
            "updated_at": "2019-05-19T11:17:57Z",
            "is_default": false,
            "revision_number": 1,
            "shared": false,
            "project_id": "a77cbe0998374aed9a6798ad6c61677e",
            "id": POLICY_ID,
            "description": ""
        })
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.0/qos/policies"))
            .and(query_param("shared", "false"))
            .and(query_param("tags", "a,b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "policies": [policy_json("QoS policy")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let opts = ListOpts {
            shared: Some(false),
            tags: Some(vec!["a".into(), "b".into()]),
            ..ListOpts::default()
        };
        let policies = super::list(&cli, opts)
            .unwrap()
            .all_pages()
            .await
            .unwrap();
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].id, POLICY_ID);
        assert_eq!(policies[0].rules.len(), 1);
        assert_eq!(policies[0].revision_number, 1);
        assert!(policies[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_get_null_description() {
        let mut body = policy_json("no-description");
        body["description"] = Value::Null;
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v2.0/qos/policies/{}", POLICY_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "policy": body })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let policy = super::get(&cli, POLICY_ID).await.extract().unwrap();
        assert_eq!(policy.name, "no-description");
        assert_eq!(policy.description, "");
    }

    #[tokio::test]
    async fn test_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/qos/policies"))
            .and(body_json(json!({
                "policy": {
                    "name": "shared-default-policy",
                    "shared": true,
                    "is_default": true,
                    "description": "use-me"
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "policy": policy_json("shared-default-policy")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let opts = CreateOpts {
            name: "shared-default-policy".into(),
            shared: Some(true),
            is_default: Some(true),
            description: Some("use-me".into()),
            ..CreateOpts::default()
        };
        let policy = super::create(&cli, &opts).await.extract().unwrap();
        assert_eq!(policy.name, "shared-default-policy");
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let err = super::create(&cli, &CreateOpts::default())
            .await
            .extract_err()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("[name]"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("/v2.0/qos/policies/{}", POLICY_ID)))
            .and(body_json(json!({"policy": {"name": "new-name", "shared": false}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "policy": policy_json("new-name")
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("/v2.0/qos/policies/{}", POLICY_ID)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let opts = UpdateOpts {
            name: Some("new-name".into()),
            shared: Some(false),
            ..UpdateOpts::default()
        };
        let policy = super::update(&cli, POLICY_ID, &opts)
            .await
            .extract()
            .unwrap();
        assert_eq!(policy.name, "new-name");
        super::delete(&cli, POLICY_ID).await.extract_err().unwrap();
    }

    #[tokio::test]
    async fn test_get_port_with_policy() {
        #[derive(Debug, serde::Deserialize)]
        struct PortWithPolicy {
            #[serde(flatten)]
            port: ports::Port,
            #[serde(flatten)]
            qos: QosPolicyExt,
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.0/ports/65c0ee9f-d634-4522-8954-51021b570b0d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "port": {
                    "id": "65c0ee9f-d634-4522-8954-51021b570b0d",
                    "network_id": "a87cc70a-3e15-4acf-8205-9b711a3531b7",
                    "name": "private-port",
                    "admin_state_up": true,
                    "status": "ACTIVE",
                    "qos_policy_id": POLICY_ID
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, NETWORK).await;
        let result = ports::get(&cli, "65c0ee9f-d634-4522-8954-51021b570b0d").await;
        let port: PortWithPolicy = result.extract_into().unwrap();
        assert_eq!(port.port.name, "private-port");
        assert_eq!(port.qos.qos_policy_id.as_deref(), Some(POLICY_ID));
    }

    #[test]
    fn test_port_create_ext() {
        let base = ports::CreateOpts {
            network_id: "a87cc70a-3e15-4acf-8205-9b711a3531b7".into(),
            name: Some("qos-port".into()),
            ..ports::CreateOpts::default()
        };
        let body = PortCreateOptsExt::new(base.clone())
            .with_qos_policy_id(POLICY_ID)
            .to_body()
            .unwrap();
        assert_eq!(
            body,
            json!({
                "port": {
                    "network_id": "a87cc70a-3e15-4acf-8205-9b711a3531b7",
                    "name": "qos-port",
                    "qos_policy_id": POLICY_ID
                }
            })
        );

        let body = PortCreateOptsExt::new(base).to_body().unwrap();
        assert!(body["port"].get("qos_policy_id").is_none());
    }

    #[test]
    fn test_port_update_ext_clears_policy() {
        let body = PortUpdateOptsExt::new(ports::UpdateOpts::default())
            .with_qos_policy_id("")
            .to_body()
            .unwrap();
        assert_eq!(body, json!({"port": {"qos_policy_id": null}}));
    }

    #[derive(Debug, Default)]
    struct NetworkOpts;

    impl BodyBuilder for NetworkOpts {
        fn to_body(&self) -> Result<Value, Error> {
            Ok(json!({"network": {"name": "private"}}))
        }
    }

    #[test]
    fn test_network_update_ext() {
        let body = NetworkUpdateOptsExt::new(NetworkOpts)
            .with_qos_policy_id(POLICY_ID)
            .to_body()
            .unwrap();
        assert_eq!(
            body,
            json!({"network": {"name": "private", "qos_policy_id": POLICY_ID}})
        );
    }

    #[test]
    fn test_ext_wrong_envelope() {
        let err = PortCreateOptsExt::new(NetworkOpts)
            .with_qos_policy_id(POLICY_ID)
            .to_body()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
