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

//! Containers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};

use super::{
    bulk_delete_body, check_container_name, escape_segment, insert_header, insert_metadata,
    insert_opt, insert_removals, BulkDeleteResponse, HeaderBuilder,
};
use crate::common::deser_timestamp;
use crate::result::{header_bool, header_parse, header_string, header_timestamp};
use crate::{
    with_query, ApiResult, Error, FromHeaders, PaginatedResource, Pager, Pagination,
    ServiceClient,
};

/// Prefix of container metadata headers.
pub const METADATA_PREFIX: &str = "X-Container-Meta-";

/// Prefix of headers removing container metadata.
pub const REMOVE_METADATA_PREFIX: &str = "X-Remove-Container-Meta-";

/// A container in a listing.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
#[flat_collection]
pub struct Container {
    /// Container name.
    #[resource_id]
    pub name: String,
    /// Number of objects.
    #[serde(default)]
    pub count: u64,
    /// Total size of objects.
    #[serde(default)]
    pub bytes: u64,
    /// Last modification time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// Container information from the response headers.
#[derive(Debug, Clone, Default)]
pub struct ContainerHeader {
    /// Total bytes stored.
    pub bytes_used: u64,
    /// Number of objects.
    pub object_count: u64,
    /// Access control lists.
    pub read: Option<String>,
    /// Write access control list.
    pub write: Option<String>,
    /// Storage policy name.
    pub storage_policy: Option<String>,
    /// Container for old object versions (stack mode).
    pub versions_location: Option<String>,
    /// Container for old object versions (history mode).
    pub history_location: Option<String>,
    /// Whether object versioning is enabled.
    pub versions_enabled: bool,
    /// Destination of container synchronization.
    pub sync_to: Option<String>,
    /// Creation time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Transaction ID for troubleshooting.
    pub trans_id: Option<String>,
}

impl FromHeaders for ContainerHeader {
    fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
        Ok(ContainerHeader {
            bytes_used: header_parse(headers, "X-Container-Bytes-Used")?.unwrap_or_default(),
            object_count: header_parse(headers, "X-Container-Object-Count")?
                .unwrap_or_default(),
            read: header_string(headers, "X-Container-Read"),
            write: header_string(headers, "X-Container-Write"),
            storage_policy: header_string(headers, "X-Storage-Policy"),
            versions_location: header_string(headers, "X-Versions-Location"),
            history_location: header_string(headers, "X-History-Location"),
            versions_enabled: header_bool(headers, "X-Versions-Enabled").unwrap_or(false),
            sync_to: header_string(headers, "X-Container-Sync-To"),
            timestamp: header_timestamp(headers, "X-Timestamp")?,
            trans_id: header_string(headers, "X-Trans-Id"),
        })
    }
}

/// Filters for listing containers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOpts {
    /// Maximum number of names per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Start after this name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Stop before this name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_marker: Option<String>,
    /// Only names starting with this prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Group names into pseudo-directories by this character.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// List in reverse order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
}

/// Options for creating a container.
#[derive(Debug, Clone, Default)]
pub struct CreateOpts {
    /// Container metadata.
    pub metadata: HashMap<String, String>,
    /// Read access control list.
    pub read: Option<String>,
    /// Write access control list.
    pub write: Option<String>,
    /// Destination of container synchronization.
    pub sync_to: Option<String>,
    /// Secret key for container synchronization.
    pub sync_key: Option<String>,
    /// Storage policy name.
    pub storage_policy: Option<String>,
    /// Container for old object versions (stack mode).
    pub versions_location: Option<String>,
    /// Container for old object versions (history mode).
    pub history_location: Option<String>,
    /// Enable object versioning.
    pub versions_enabled: Option<bool>,
    /// Secret key for temporary URLs.
    pub temp_url_key: Option<String>,
    /// Second secret key for temporary URLs.
    pub temp_url_key_2: Option<String>,
}

impl HeaderBuilder for CreateOpts {
    fn to_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        insert_metadata(&mut headers, METADATA_PREFIX, &self.metadata)?;
        insert_opt(&mut headers, "X-Container-Read", &self.read)?;
        insert_opt(&mut headers, "X-Container-Write", &self.write)?;
        insert_opt(&mut headers, "X-Container-Sync-To", &self.sync_to)?;
        insert_opt(&mut headers, "X-Container-Sync-Key", &self.sync_key)?;
        insert_opt(&mut headers, "X-Storage-Policy", &self.storage_policy)?;
        insert_opt(&mut headers, "X-Versions-Location", &self.versions_location)?;
        insert_opt(&mut headers, "X-History-Location", &self.history_location)?;
        insert_opt(&mut headers, "X-Versions-Enabled", &self.versions_enabled)?;
        insert_opt(&mut headers, "X-Container-Meta-Temp-URL-Key", &self.temp_url_key)?;
        insert_opt(
            &mut headers,
            "X-Container-Meta-Temp-URL-Key-2",
            &self.temp_url_key_2,
        )?;
        Ok(headers)
    }
}

/// Options for updating a container.
#[derive(Debug, Clone, Default)]
pub struct UpdateOpts {
    /// Metadata to set, an empty value removes the item.
    pub metadata: HashMap<String, String>,
    /// Metadata keys to remove.
    pub remove_metadata: Vec<String>,
    /// Read access control list.
    pub read: Option<String>,
    /// Write access control list.
    pub write: Option<String>,
    /// Destination of container synchronization.
    pub sync_to: Option<String>,
    /// Secret key for container synchronization.
    pub sync_key: Option<String>,
    /// Container for old object versions (stack mode).
    pub versions_location: Option<String>,
    /// Stop versioning in the stack mode.
    pub remove_versions_location: bool,
    /// Container for old object versions (history mode).
    pub history_location: Option<String>,
    /// Stop versioning in the history mode.
    pub remove_history_location: bool,
    /// Enable or disable object versioning.
    pub versions_enabled: Option<bool>,
    /// Secret key for temporary URLs.
    pub temp_url_key: Option<String>,
    /// Second secret key for temporary URLs.
    pub temp_url_key_2: Option<String>,
}

impl HeaderBuilder for UpdateOpts {
    fn to_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        insert_metadata(&mut headers, METADATA_PREFIX, &self.metadata)?;
        insert_removals(&mut headers, REMOVE_METADATA_PREFIX, &self.remove_metadata)?;
        insert_opt(&mut headers, "X-Container-Read", &self.read)?;
        insert_opt(&mut headers, "X-Container-Write", &self.write)?;
        insert_opt(&mut headers, "X-Container-Sync-To", &self.sync_to)?;
        insert_opt(&mut headers, "X-Container-Sync-Key", &self.sync_key)?;
        insert_opt(&mut headers, "X-Versions-Location", &self.versions_location)?;
        if self.remove_versions_location {
            insert_header(&mut headers, "X-Remove-Versions-Location", "x")?;
        }
        insert_opt(&mut headers, "X-History-Location", &self.history_location)?;
        if self.remove_history_location {
            insert_header(&mut headers, "X-Remove-History-Location", "x")?;
        }
        insert_opt(&mut headers, "X-Versions-Enabled", &self.versions_enabled)?;
        insert_opt(&mut headers, "X-Container-Meta-Temp-URL-Key", &self.temp_url_key)?;
        insert_opt(
            &mut headers,
            "X-Container-Meta-Temp-URL-Key-2",
            &self.temp_url_key_2,
        )?;
        Ok(headers)
    }
}

/// List containers with their details.
pub fn list(client: &ServiceClient, opts: ListOpts) -> Result<Pager<Container>, Error> {
    let url = with_query(client.url(std::iter::empty::<&str>())?, &[("format", "json")])?;
    let url = with_query(url, &opts)?;
    let mut headers = HeaderMap::new();
    let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(Pager::new(client, url, Pagination::Marker).with_headers(headers))
}

/// List container names only.
pub fn list_names(client: &ServiceClient, opts: ListOpts) -> Result<Pager<String>, Error> {
    let url = with_query(client.url(std::iter::empty::<&str>())?, &opts)?;
    let mut headers = HeaderMap::new();
    let _ = headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));
    Ok(Pager::new(client, url, Pagination::Marker).with_headers(headers))
}

/// Create a container or update an existing one.
pub async fn create<S, B>(client: &ServiceClient, name: S, opts: &B) -> ApiResult<HeaderMap>
where
    S: AsRef<str>,
    B: HeaderBuilder,
{
    let response = async {
        check_container_name(name.as_ref())?;
        let headers = opts.to_headers()?;
        let url = client.url([name.as_ref()])?;
        client
            .put(url)
            .ok_codes([201, 202, 204])
            .headers(headers)
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Get container information and metadata.
pub async fn get<S: AsRef<str>>(
    client: &ServiceClient,
    name: S,
    newest: bool,
) -> ApiResult<ContainerHeader> {
    let response = async {
        check_container_name(name.as_ref())?;
        let url = client.url([name.as_ref()])?;
        let mut headers = HeaderMap::new();
        if newest {
            insert_header(&mut headers, "X-Newest", "true")?;
        }
        client
            .head(url)
            .ok_codes([200, 204])
            .headers(headers)
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Update container metadata and settings.
pub async fn update<S, B>(client: &ServiceClient, name: S, opts: &B) -> ApiResult<HeaderMap>
where
    S: AsRef<str>,
    B: HeaderBuilder,
{
    let response = async {
        check_container_name(name.as_ref())?;
        let headers = opts.to_headers()?;
        let url = client.url([name.as_ref()])?;
        client
            .post(url)
            .ok_codes([201, 202, 204])
            .headers(headers)
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Delete an empty container.
pub async fn delete<S: AsRef<str>>(client: &ServiceClient, name: S) -> ApiResult<HeaderMap> {
    let response = async {
        check_container_name(name.as_ref())?;
        let url = client.url([name.as_ref()])?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}

/// Delete several empty containers in one request.
pub async fn bulk_delete<I, S>(client: &ServiceClient, names: I) -> ApiResult<BulkDeleteResponse>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paths = Vec::new();
    for name in names {
        if let Err(err) = check_container_name(name.as_ref()) {
            return ApiResult::new(Err(err));
        }
        paths.push(escape_segment(name.as_ref()));
    }
    super::bulk_delete(client, bulk_delete_body(paths)).await
}

#[cfg(test)]
pub mod test {
    use maplit::hashmap;
    use serde_json::json;
    use wiremock::matchers::{
        body_string, header, header_exists, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{CreateOpts, ListOpts, UpdateOpts, METADATA_PREFIX};
    use crate::serviceclient::test::new_client;
    use crate::services::OBJECT_STORAGE;
    use crate::ErrorKind;

    #[tokio::test]
    async fn test_list_marker_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "json"))
            .and(query_param("prefix", "ja"))
            .and(query_param_is_missing("marker"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"count": 0, "bytes": 0, "name": "janeausten", "last_modified": "2016-11-14T09:13:22.470080"},
                {"count": 1, "bytes": 14, "name": "jarvis", "last_modified": "2016-11-14T09:13:22.470080"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("marker", "jarvis"))
            .and(query_param("prefix", "ja"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let opts = ListOpts {
            prefix: Some("ja".into()),
            ..ListOpts::default()
        };
        let containers = super::list(&cli, opts)
            .unwrap()
            .all_pages()
            .await
            .unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[1].name, "jarvis");
        assert_eq!(containers[1].bytes, 14);
        assert!(containers[0].last_modified.is_some());
    }

    #[tokio::test]
    async fn test_list_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param_is_missing("marker"))
            .and(header("accept", "text/plain"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("janeausten\nmarktwain\n", "text/plain; charset=utf-8"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("marker", "marktwain"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("", "text/plain"))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let names = super::list_names(&cli, ListOpts::default())
            .unwrap()
            .all_pages()
            .await
            .unwrap();
        assert_eq!(names, vec!["janeausten", "marktwain"]);
    }

    #[tokio::test]
    async fn test_create_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/testContainer"))
            .and(header("x-container-meta-foo", "bar"))
            .and(header("x-container-read", ".r:*"))
            .respond_with(ResponseTemplate::new(201).insert_header("X-Trans-Id", "tx554ed59667a64c61866f1"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/testContainer"))
            .respond_with(
                ResponseTemplate::new(204)
                    .insert_header("X-Container-Bytes-Used", "100")
                    .insert_header("X-Container-Object-Count", "4")
                    .insert_header("X-Container-Read", ".r:*")
                    .insert_header("X-Versions-Enabled", "True")
                    .insert_header("X-Container-Meta-Foo", "bar")
                    .insert_header("X-Container-Meta-Book-Author", "Jane Austen"),
            )
            .expect(2)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let opts = CreateOpts {
            metadata: hashmap! {"Foo".to_string() => "bar".to_string()},
            read: Some(".r:*".into()),
            ..CreateOpts::default()
        };
        let headers = super::create(&cli, "testContainer", &opts)
            .await
            .extract_headers()
            .unwrap();
        assert_eq!(headers["x-trans-id"], "tx554ed59667a64c61866f1");

        let container = super::get(&cli, "testContainer", false)
            .await
            .extract_from_headers()
            .unwrap();
        assert_eq!(container.bytes_used, 100);
        assert_eq!(container.object_count, 4);
        assert!(container.versions_enabled);
        assert_eq!(container.read.as_deref(), Some(".r:*"));

        let metadata = super::get(&cli, "testContainer", false)
            .await
            .extract_metadata(METADATA_PREFIX)
            .unwrap();
        assert_eq!(
            metadata,
            hashmap! {
                "Foo".to_string() => "bar".to_string(),
                "Book-Author".to_string() => "Jane Austen".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/testContainer"))
            .and(header("x-container-write", "admin"))
            .and(header_exists("x-remove-container-meta-foo"))
            .and(header_exists("x-remove-versions-location"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/testContainer"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let opts = UpdateOpts {
            write: Some("admin".into()),
            remove_metadata: vec!["Foo".into()],
            remove_versions_location: true,
            ..UpdateOpts::default()
        };
        super::update(&cli, "testContainer", &opts)
            .await
            .extract_err()
            .unwrap();
        super::delete(&cli, "testContainer")
            .await
            .extract_err()
            .unwrap();
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(query_param("bulk-delete", "true"))
            .and(header("content-type", "text/plain"))
            .and(body_string("testContainer1\ntest%20Container2\n"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Number Not Found": 0,
                "Response Status": "200 OK",
                "Errors": [],
                "Number Deleted": 2,
                "Response Body": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let result = super::bulk_delete(&cli, ["testContainer1", "test Container2"])
            .await
            .extract()
            .unwrap();
        assert_eq!(result.number_deleted, 2);
        assert_eq!(result.response_status, "200 OK");
        assert!(result.errors.is_empty());

        let err = super::bulk_delete(&cli, ["good", "bad/name"])
            .await
            .extract()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
