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

//! API extensions enabled in the Identity service.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::common::{deser_timestamp, empty_as_default, Link};
use crate::{ApiResult, Error, PaginatedResource, Pager, Pagination, ServiceClient};

/// An API extension.
#[derive(Debug, Clone, Deserialize)]
pub struct Extension {
    /// Short name used to refer to the extension.
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

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtensionList {
    Plain(Vec<Extension>),
    Values { values: Vec<Extension> },
}

/// Extension listing, either a plain list or wrapped in `values`.
#[derive(Debug, Deserialize)]
pub struct ExtensionCollection {
    extensions: ExtensionList,
}

impl From<ExtensionCollection> for Vec<Extension> {
    fn from(value: ExtensionCollection) -> Vec<Extension> {
        match value.extensions {
            ExtensionList::Plain(items) => items,
            ExtensionList::Values { values } => values,
        }
    }
}

impl PaginatedResource for Extension {
    type Id = String;
    type Root = ExtensionCollection;
    const COLLECTION_NAME: Option<&'static str> = Some("extensions");

    fn resource_id(&self) -> String {
        self.alias.clone()
    }
}

/// List all enabled extensions.
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

#[cfg(test)]
pub mod test {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::serviceclient::test::new_client;
    use crate::services::IDENTITY;
    use crate::ErrorKind;

    fn extension() -> serde_json::Value {
        json!({
            "updated": "2013-07-07T12:00:00-00:00",
            "name": "OpenStack S3 API",
            "links": [{
                "href": "https://github.com/openstack/identity-api",
                "type": "text/html",
                "rel": "describedby"
            }],
            "namespace": "http://docs.openstack.org/identity/api/ext/s3tokens/v1.0",
            "alias": "s3tokens",
            "description": "OpenStack S3 API."
        })
    }

    #[tokio::test]
    async fn test_list_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/extensions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "extensions": {"values": [extension()]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, IDENTITY).await;
        let exts = super::list(&cli).unwrap().all_pages().await.unwrap();
        assert_eq!(exts.len(), 1);
        assert_eq!(exts[0].alias, "s3tokens");
        assert_eq!(exts[0].links[0].media_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_list_plain() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/extensions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "extensions": [extension()]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, IDENTITY).await;
        let exts = super::list(&cli).unwrap().all_pages().await.unwrap();
        assert_eq!(exts.len(), 1);
        assert_eq!(exts[0].name, "OpenStack S3 API");
    }

    #[tokio::test]
    async fn test_list_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/extensions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "extensions": {"items": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, IDENTITY).await;
        let err = super::list(&cli).unwrap().all_pages().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/extensions/s3tokens"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"extension": extension()})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, IDENTITY).await;
        let ext = super::get(&cli, "s3tokens").await.extract().unwrap();
        assert_eq!(ext.description, "OpenStack S3 API.");
    }
}
