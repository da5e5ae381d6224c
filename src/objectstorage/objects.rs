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

//! Objects and their content.
//!
//! ```rust,no_run
//! use osclient::objectstorage::objects;
//!
//! # async fn example(swift: osclient::ServiceClient) -> Result<(), osclient::Error> {
//! let opts = objects::CreateOpts {
//!     content_type: Some("text/plain".into()),
//!     ..Default::default()
//! };
//! objects::create(&swift, "books", "pride.txt", "It is a truth", &opts)
//!     .await
//!     .extract_err()?;
//! let response = objects::download(&swift, "books", "pride.txt", &Default::default())
//!     .await
//!     .into_response()?;
//! let content = response.into_body();
//! # Ok(()) }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Body, Method, Url};
use serde::{Deserialize, Serialize};

use super::{
    bulk_delete_body, check_container_name, escape_path, escape_segment, insert_header,
    insert_metadata, insert_opt, insert_removals, BulkDeleteResponse, HeaderBuilder,
};
use crate::common::deser_timestamp;
use crate::result::{header_bool, header_date, header_parse, header_string, header_timestamp};
use crate::{
    require, with_query, ApiResult, Error, ErrorKind, FromHeaders, PaginatedResource, Pager,
    Pagination, ServiceClient,
};

/// Prefix of object metadata headers.
pub const METADATA_PREFIX: &str = "X-Object-Meta-";

/// Prefix of headers removing object metadata.
pub const REMOVE_METADATA_PREFIX: &str = "X-Remove-Object-Meta-";

/// An object in a listing.
///
/// With a delimiter, pseudo-directories are returned as entries with only `subdir` set.
#[derive(Debug, Clone, Deserialize)]
pub struct Object {
    /// Object name, empty for pseudo-directory entries.
    #[serde(default)]
    pub name: String,
    /// Pseudo-directory, e.g. `photos/`.
    #[serde(default)]
    pub subdir: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub bytes: u64,
    /// Content type of the object.
    #[serde(default)]
    pub content_type: String,
    /// MD5 checksum of the content.
    #[serde(default)]
    pub hash: String,
    /// Last modification time.
    #[serde(default, deserialize_with = "deser_timestamp")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Whether this is the latest version.
    #[serde(default)]
    pub is_latest: bool,
    /// Version of the object when versioning is enabled.
    #[serde(default)]
    pub version_id: Option<String>,
}

impl Object {
    /// Name of the object or of the pseudo-directory.
    pub fn path(&self) -> &str {
        match self.subdir {
            Some(ref subdir) if self.name.is_empty() => subdir,
            _ => &self.name,
        }
    }
}

impl PaginatedResource for Object {
    type Id = String;
    type Root = Vec<Object>;
    const COLLECTION_NAME: Option<&'static str> = None;

    fn resource_id(&self) -> String {
        self.path().to_string()
    }
}

/// Object information from the response headers.
#[derive(Debug, Clone, Default)]
pub struct ObjectHeader {
    /// Size in bytes.
    pub content_length: u64,
    /// Content type of the object.
    pub content_type: Option<String>,
    /// Content encoding.
    pub content_encoding: Option<String>,
    /// Content disposition.
    pub content_disposition: Option<String>,
    /// MD5 checksum or the manifest checksum.
    pub etag: Option<String>,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// When the object is scheduled for removal.
    pub delete_at: Option<DateTime<Utc>>,
    /// Prefix of segments of a dynamic large object.
    pub object_manifest: Option<String>,
    /// Whether the object is a static large object.
    pub static_large_object: bool,
    /// Version ID.
    pub version_id: Option<String>,
    /// Source of a copied object.
    pub copied_from: Option<String>,
    /// Server time of the response.
    pub date: Option<DateTime<Utc>>,
    /// Transaction ID for troubleshooting.
    pub trans_id: Option<String>,
}

impl FromHeaders for ObjectHeader {
    fn from_headers(headers: &HeaderMap) -> Result<Self, Error> {
        Ok(ObjectHeader {
            content_length: header_parse(headers, "Content-Length")?.unwrap_or_default(),
            content_type: header_string(headers, "Content-Type"),
            content_encoding: header_string(headers, "Content-Encoding"),
            content_disposition: header_string(headers, "Content-Disposition"),
            etag: header_string(headers, "Etag"),
            last_modified: header_date(headers, "Last-Modified")?,
            delete_at: header_timestamp(headers, "X-Delete-At")?,
            object_manifest: header_string(headers, "X-Object-Manifest"),
            static_large_object: header_bool(headers, "X-Static-Large-Object").unwrap_or(false),
            version_id: header_string(headers, "X-Object-Version-Id"),
            copied_from: header_string(headers, "X-Copied-From"),
            date: header_date(headers, "Date")?,
            trans_id: header_string(headers, "X-Trans-Id"),
        })
    }
}

/// Filters for listing objects.
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
    /// Group names up to this character into pseudo-directories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Only list objects under this pseudo-directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// List in reverse order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
    /// List all versions of objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub versions: Option<bool>,
}

/// Options for downloading an object.
#[derive(Debug, Clone, Default)]
pub struct DownloadOpts {
    /// Byte range, e.g. `bytes=0-99`.
    pub range: Option<String>,
    /// Only download if the ETag matches.
    pub if_match: Option<String>,
    /// Only download if the ETag does not match.
    pub if_none_match: Option<String>,
    /// Only download if modified since this time.
    pub if_modified_since: Option<DateTime<Utc>>,
    /// Only download if not modified since this time.
    pub if_unmodified_since: Option<DateTime<Utc>>,
    /// Query the most recent replica.
    pub newest: bool,
}

fn http_date(value: &Option<DateTime<Utc>>) -> Option<String> {
    value
        .as_ref()
        .map(|date| date.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

impl HeaderBuilder for DownloadOpts {
    fn to_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        insert_opt(&mut headers, "Range", &self.range)?;
        insert_opt(&mut headers, "If-Match", &self.if_match)?;
        insert_opt(&mut headers, "If-None-Match", &self.if_none_match)?;
        insert_opt(
            &mut headers,
            "If-Modified-Since",
            &http_date(&self.if_modified_since),
        )?;
        insert_opt(
            &mut headers,
            "If-Unmodified-Since",
            &http_date(&self.if_unmodified_since),
        )?;
        if self.newest {
            insert_header(&mut headers, "X-Newest", "true")?;
        }
        Ok(headers)
    }
}

/// Options for creating an object.
#[derive(Debug, Clone, Default)]
pub struct CreateOpts {
    /// Object metadata.
    pub metadata: HashMap<String, String>,
    /// Content type.
    pub content_type: Option<String>,
    /// Content disposition.
    pub content_disposition: Option<String>,
    /// Content encoding.
    pub content_encoding: Option<String>,
    /// Let the server guess the content type.
    pub detect_content_type: Option<bool>,
    /// MD5 checksum of the content, verified by the server.
    pub etag: Option<String>,
    /// Remove the object after this number of seconds.
    pub delete_after: Option<u64>,
    /// Remove the object at this time.
    pub delete_at: Option<DateTime<Utc>>,
    /// Create a dynamic large object manifest with this segment prefix.
    pub object_manifest: Option<String>,
    /// Only create the object if it does not exist (`*`).
    pub if_none_match: Option<String>,
}

impl HeaderBuilder for CreateOpts {
    fn to_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        insert_metadata(&mut headers, METADATA_PREFIX, &self.metadata)?;
        insert_opt(&mut headers, "Content-Type", &self.content_type)?;
        insert_opt(&mut headers, "Content-Disposition", &self.content_disposition)?;
        insert_opt(&mut headers, "Content-Encoding", &self.content_encoding)?;
        insert_opt(&mut headers, "X-Detect-Content-Type", &self.detect_content_type)?;
        insert_opt(&mut headers, "Etag", &self.etag)?;
        insert_opt(&mut headers, "X-Delete-After", &self.delete_after)?;
        insert_opt(
            &mut headers,
            "X-Delete-At",
            &self.delete_at.map(|ts| ts.timestamp()),
        )?;
        insert_opt(&mut headers, "X-Object-Manifest", &self.object_manifest)?;
        insert_opt(&mut headers, "If-None-Match", &self.if_none_match)?;
        Ok(headers)
    }
}

/// Options for copying an object.
#[derive(Debug, Clone, Default)]
pub struct CopyOpts {
    /// Target container (required).
    pub destination_container: String,
    /// Target object name (required).
    pub destination_object: String,
    /// Metadata added to the copy.
    pub metadata: HashMap<String, String>,
    /// New content type of the copy.
    pub content_type: Option<String>,
    /// Content disposition.
    pub content_disposition: Option<String>,
    /// Content encoding.
    pub content_encoding: Option<String>,
}

impl HeaderBuilder for CopyOpts {
    fn to_headers(&self) -> Result<HeaderMap, Error> {
        require(&self.destination_object, "destination_object")?;
        check_container_name(&self.destination_container)?;
        let mut headers = HeaderMap::new();
        let destination = format!(
            "/{}/{}",
            escape_segment(&self.destination_container),
            escape_path(&self.destination_object)
        );
        insert_header(&mut headers, "Destination", &destination)?;
        insert_metadata(&mut headers, METADATA_PREFIX, &self.metadata)?;
        insert_opt(&mut headers, "Content-Type", &self.content_type)?;
        insert_opt(&mut headers, "Content-Disposition", &self.content_disposition)?;
        insert_opt(&mut headers, "Content-Encoding", &self.content_encoding)?;
        Ok(headers)
    }
}

/// Options for updating object metadata.
///
/// Swift replaces all metadata on update, items not listed are removed.
#[derive(Debug, Clone, Default)]
pub struct UpdateOpts {
    /// Metadata to set.
    pub metadata: HashMap<String, String>,
    /// Metadata keys to remove.
    pub remove_metadata: Vec<String>,
    /// New content type.
    pub content_type: Option<String>,
    /// Content disposition.
    pub content_disposition: Option<String>,
    /// Content encoding.
    pub content_encoding: Option<String>,
    /// Let the server guess the content type.
    pub detect_content_type: Option<bool>,
    /// Delete the object after this number of seconds.
    pub delete_after: Option<u64>,
    /// Delete the object at this Unix time.
    pub delete_at: Option<DateTime<Utc>>,
}

impl HeaderBuilder for UpdateOpts {
    fn to_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        insert_metadata(&mut headers, METADATA_PREFIX, &self.metadata)?;
        insert_removals(&mut headers, REMOVE_METADATA_PREFIX, &self.remove_metadata)?;
        insert_opt(&mut headers, "Content-Type", &self.content_type)?;
        insert_opt(&mut headers, "Content-Disposition", &self.content_disposition)?;
        insert_opt(&mut headers, "Content-Encoding", &self.content_encoding)?;
        insert_opt(&mut headers, "X-Detect-Content-Type", &self.detect_content_type)?;
        insert_opt(&mut headers, "X-Delete-After", &self.delete_after)?;
        insert_opt(
            &mut headers,
            "X-Delete-At",
            &self.delete_at.map(|ts| ts.timestamp()),
        )?;
        Ok(headers)
    }
}

/// Options for deleting an object.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteOpts {
    /// Set to `delete` to also remove the segments of a static large object.
    #[serde(rename = "multipart-manifest", skip_serializing_if = "Option::is_none")]
    pub multipart_manifest: Option<String>,
    /// Delete this version only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

/// Object URL, slashes in the name separate path segments.
fn object_url(client: &ServiceClient, container: &str, name: &str) -> Result<Url, Error> {
    check_container_name(container)?;
    require(&name, "name")?;
    client.url(std::iter::once(container).chain(name.split('/')))
}

/// List objects in a container with their details.
pub fn list<S: AsRef<str>>(
    client: &ServiceClient,
    container: S,
    opts: ListOpts,
) -> Result<Pager<Object>, Error> {
    check_container_name(container.as_ref())?;
    let url = with_query(client.url([container.as_ref()])?, &[("format", "json")])?;
    let url = with_query(url, &opts)?;
    let mut headers = HeaderMap::new();
    let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(Pager::new(client, url, Pagination::Marker).with_headers(headers))
}

/// List object names in a container.
///
/// With a delimiter, pseudo-directories are included as names.
pub fn list_names<S: AsRef<str>>(
    client: &ServiceClient,
    container: S,
    opts: ListOpts,
) -> Result<Pager<String>, Error> {
    check_container_name(container.as_ref())?;
    let url = with_query(client.url([container.as_ref()])?, &opts)?;
    let mut headers = HeaderMap::new();
    let _ = headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));
    Ok(Pager::new(client, url, Pagination::Marker).with_headers(headers))
}

/// Download an object.
///
/// Use [`ApiResult::into_response`] for the content and
/// [`ApiResult::extract_from_headers`] for the [`ObjectHeader`].
pub async fn download<S1, S2>(
    client: &ServiceClient,
    container: S1,
    name: S2,
    opts: &DownloadOpts,
) -> ApiResult<ObjectHeader>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let headers = opts.to_headers()?;
        let url = object_url(client, container.as_ref(), name.as_ref())?;
        client
            .get(url)
            .ok_codes([200, 206, 304])
            .headers(headers)
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Upload an object, replacing the existing one.
pub async fn create<S1, S2, B>(
    client: &ServiceClient,
    container: S1,
    name: S2,
    content: B,
    opts: &CreateOpts,
) -> ApiResult<ObjectHeader>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    B: Into<Body>,
{
    let response = async {
        let headers = opts.to_headers()?;
        let url = object_url(client, container.as_ref(), name.as_ref())?;
        client
            .put(url)
            .ok_codes([201])
            .headers(headers)
            .body(content)
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Copy an object on the server side.
pub async fn copy<S1, S2>(
    client: &ServiceClient,
    container: S1,
    name: S2,
    opts: &CopyOpts,
) -> ApiResult<ObjectHeader>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let headers = opts.to_headers()?;
        let url = object_url(client, container.as_ref(), name.as_ref())?;
        let method = Method::from_bytes(b"COPY").map_err(|e| {
            Error::new(ErrorKind::InvalidInput, format!("Invalid method: {}", e))
        })?;
        client
            .request(method, url, &[201])
            .headers(headers)
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Get object information and metadata.
pub async fn get<S1, S2>(
    client: &ServiceClient,
    container: S1,
    name: S2,
    newest: bool,
) -> ApiResult<ObjectHeader>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let url = object_url(client, container.as_ref(), name.as_ref())?;
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

/// Update object metadata.
pub async fn update<S1, S2, B>(
    client: &ServiceClient,
    container: S1,
    name: S2,
    opts: &B,
) -> ApiResult<ObjectHeader>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    B: HeaderBuilder,
{
    let response = async {
        let headers = opts.to_headers()?;
        let url = object_url(client, container.as_ref(), name.as_ref())?;
        client
            .post(url)
            .ok_codes([202])
            .headers(headers)
            .send()
            .await
    };
    ApiResult::new(response.await)
}

/// Delete an object.
pub async fn delete<S1, S2>(
    client: &ServiceClient,
    container: S1,
    name: S2,
    opts: &DeleteOpts,
) -> ApiResult<ObjectHeader>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let url = object_url(client, container.as_ref(), name.as_ref())?;
        let url = with_query(url, opts)?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}

/// Delete several objects from one container in a single request.
pub async fn bulk_delete<S, I, N>(
    client: &ServiceClient,
    container: S,
    names: I,
) -> ApiResult<BulkDeleteResponse>
where
    S: AsRef<str>,
    I: IntoIterator<Item = N>,
    N: AsRef<str>,
{
    if let Err(err) = check_container_name(container.as_ref()) {
        return ApiResult::new(Err(err));
    }
    let container = escape_segment(container.as_ref());
    let paths = names
        .into_iter()
        .map(|name| format!("{}/{}", container, escape_path(name.as_ref())))
        .collect::<Vec<_>>();
    super::bulk_delete(client, bulk_delete_body(paths)).await
}

#[cfg(test)]
pub mod test {
    use chrono::{TimeZone, Utc};
    use maplit::hashmap;
    use serde_json::json;
    use wiremock::matchers::{
        body_string, header, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{
        CopyOpts, CreateOpts, DeleteOpts, DownloadOpts, ListOpts, ObjectHeader, UpdateOpts,
    };
    use crate::objectstorage::HeaderBuilder;
    use crate::serviceclient::test::new_client;
    use crate::services::OBJECT_STORAGE;
    use crate::{ErrorKind, FromHeaders};

    #[tokio::test]
    async fn test_list_with_subdirs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/testContainer"))
            .and(query_param("format", "json"))
            .and(query_param("delimiter", "/"))
            .and(query_param_is_missing("marker"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "hash": "451e372e48e0f6b1114fa0724aa79fa1",
                    "last_modified": "2016-08-17T22:11:58.602650",
                    "bytes": 14,
                    "name": "goodbye",
                    "content_type": "application/octet-stream"
                },
                {"subdir": "pictures/"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/testContainer"))
            .and(query_param("marker", "pictures/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let opts = ListOpts {
            delimiter: Some("/".into()),
            ..ListOpts::default()
        };
        let objects = super::list(&cli, "testContainer", opts)
            .unwrap()
            .all_pages()
            .await
            .unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].path(), "goodbye");
        assert_eq!(objects[0].bytes, 14);
        assert_eq!(
            objects[0].last_modified.map(|ts| ts.timestamp()),
            Some(Utc.with_ymd_and_hms(2016, 8, 17, 22, 11, 58).unwrap().timestamp())
        );
        assert_eq!(objects[1].path(), "pictures/");
        assert!(objects[1].name.is_empty());
    }

    #[tokio::test]
    async fn test_list_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/testContainer"))
            .and(query_param_is_missing("marker"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("hello\ngoodbye\n", "text/plain"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/testContainer"))
            .and(query_param("marker", "goodbye"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let names = super::list_names(&cli, "testContainer", ListOpts::default())
            .unwrap()
            .all_pages()
            .await
            .unwrap();
        assert_eq!(names, vec!["hello", "goodbye"]);
    }

    #[tokio::test]
    async fn test_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/testContainer/testObject"))
            .and(header("range", "bytes=0-4"))
            .respond_with(
                ResponseTemplate::new(206)
                    .set_body_raw("Succe", "text/plain")
                    .insert_header("Last-Modified", "Wed, 17 Aug 2016 19:25:43 GMT")
                    .insert_header("X-Static-Large-Object", "True")
                    .insert_header("X-Delete-At", "1686838400"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let opts = DownloadOpts {
            range: Some("bytes=0-4".into()),
            ..DownloadOpts::default()
        };
        let result = super::download(&cli, "testContainer", "testObject", &opts).await;
        assert_eq!(result.status().map(|s| s.as_u16()), Some(206));
        let response = result.into_response().unwrap();
        let object = ObjectHeader::from_headers(response.headers()).unwrap();
        assert!(object.static_large_object);
        assert_eq!(object.content_type.as_deref(), Some("text/plain"));
        assert_eq!(response.into_body(), b"Succe".to_vec());
    }

    #[tokio::test]
    async fn test_get_headers() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/testContainer/dir/testObject"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/plain")
                    .insert_header("Etag", "0b5d2a3b5ab4ec8e6e5c3fa8ae7b1b8b")
                    .insert_header("Last-Modified", "Wed, 17 Aug 2016 19:25:43 GMT")
                    .insert_header("X-Static-Large-Object", "True")
                    .insert_header("X-Delete-At", "1686838400")
                    .insert_header("X-Object-Meta-Color", "blue"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let object = super::get(&cli, "testContainer", "dir/testObject", false)
            .await
            .extract_from_headers()
            .unwrap();
        assert_eq!(
            object.etag.as_deref(),
            Some("0b5d2a3b5ab4ec8e6e5c3fa8ae7b1b8b")
        );
        assert_eq!(object.content_type.as_deref(), Some("text/plain"));
        assert!(object.static_large_object);
        assert_eq!(
            object.last_modified,
            Some(Utc.with_ymd_and_hms(2016, 8, 17, 19, 25, 43).unwrap())
        );
        assert_eq!(
            object.delete_at,
            Some(Utc.with_ymd_and_hms(2023, 6, 15, 14, 13, 20).unwrap())
        );
    }

    #[tokio::test]
    async fn test_create_and_copy() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/testContainer/testObject"))
            .and(header("content-type", "text/plain"))
            .and(header("x-object-meta-color", "blue"))
            .and(body_string("Did gyre and gimble in the wabe"))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Etag", "f1b3a3f5e5c9f3e9b1c6"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("COPY"))
            .and(path("/testContainer/testObject"))
            .and(header("destination", "/newTestContainer/new%20Object"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("X-Copied-From", "testContainer/testObject"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let opts = CreateOpts {
            content_type: Some("text/plain".into()),
            metadata: hashmap! {"Color".to_string() => "blue".to_string()},
            ..CreateOpts::default()
        };
        let created = super::create(
            &cli,
            "testContainer",
            "testObject",
            "Did gyre and gimble in the wabe",
            &opts,
        )
        .await
        .extract_from_headers()
        .unwrap();
        assert_eq!(created.etag.as_deref(), Some("f1b3a3f5e5c9f3e9b1c6"));

        let opts = CopyOpts {
            destination_container: "newTestContainer".into(),
            destination_object: "new Object".into(),
            ..CopyOpts::default()
        };
        let copied = super::copy(&cli, "testContainer", "testObject", &opts)
            .await
            .extract_from_headers()
            .unwrap();
        assert_eq!(
            copied.copied_from.as_deref(),
            Some("testContainer/testObject")
        );
    }

    #[test]
    fn test_copy_requires_destination() {
        let opts = CopyOpts::default();
        assert_eq!(
            opts.to_headers().unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        let opts = CopyOpts {
            destination_container: "a/b".into(),
            destination_object: "obj".into(),
            ..CopyOpts::default()
        };
        assert_eq!(
            opts.to_headers().unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/testContainer/testObject"))
            .and(header("x-object-meta-color", "red"))
            .and(header("x-delete-at", "1686838400"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/testContainer/testObject"))
            .and(query_param("multipart-manifest", "delete"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let opts = UpdateOpts {
            metadata: hashmap! {"Color".to_string() => "red".to_string()},
            delete_at: Some(Utc.timestamp_opt(1686838400, 0).unwrap()),
            ..UpdateOpts::default()
        };
        super::update(&cli, "testContainer", "testObject", &opts)
            .await
            .extract_err()
            .unwrap();
        let opts = DeleteOpts {
            multipart_manifest: Some("delete".into()),
            ..DeleteOpts::default()
        };
        super::delete(&cli, "testContainer", "testObject", &opts)
            .await
            .extract_err()
            .unwrap();

        let err = super::delete(&cli, "testContainer", "", &DeleteOpts::default())
            .await
            .extract_err()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(query_param("bulk-delete", "true"))
            .and(body_string("testContainer/testObject1\ntestContainer/dir/test%20Object2\n"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Number Not Found": 1,
                "Response Status": "400 Bad Request",
                "Errors": [["testContainer/dir/test%20Object2", "403 Forbidden"]],
                "Number Deleted": 1,
                "Response Body": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cli = new_client(&server, OBJECT_STORAGE).await;
        let result = super::bulk_delete(
            &cli,
            "testContainer",
            ["testObject1", "dir/test Object2"],
        )
        .await
        .extract()
        .unwrap();
        assert_eq!(result.number_deleted, 1);
        assert_eq!(result.number_not_found, 1);
        assert_eq!(result.errors[0][1], "403 Forbidden");
    }
}
