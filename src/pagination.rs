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

//! Iteration over paginated listings.

use std::fmt::{self, Display};
use std::future::Future;
use std::marker::PhantomData;

use http::header::HeaderMap;
use log::{debug, trace};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::common::Link;
use super::{Error, ErrorKind, RawResponse, ServiceClient};

/// A single resource in a listing.
///
/// This trait can normally be derived. You need to add a `#[resource_id]` attribute to the field
/// that serves as a pagination marker. The collection key defaults to the plural snake case form
/// of the structure name and may be changed with `#[collection_name = "resources"]`. Use
/// `#[flat_collection]` for listings that are plain JSON arrays.
pub trait PaginatedResource: DeserializeOwned + Sized {
    /// Type of an ID.
    type Id: Display + Send;

    /// Root type of the listing.
    type Root: DeserializeOwned + Into<Vec<Self>>;

    /// Key of the collection in the response, `None` for flat collections.
    ///
    /// Links to other pages are expected under `<collection>_links`.
    const COLLECTION_NAME: Option<&'static str>;

    /// Retrieve a copy of the ID.
    fn resource_id(&self) -> Self::Id;
}

impl PaginatedResource for String {
    type Id = String;
    type Root = Vec<String>;
    const COLLECTION_NAME: Option<&'static str> = None;

    fn resource_id(&self) -> String {
        self.clone()
    }
}

/// How to find the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pagination {
    /// The next page URL is in the `<collection>_links` array with `rel` set to `next`.
    Linked,
    /// The next page is requested with the ID of the last resource as `marker`.
    Marker,
    /// The listing is never paginated.
    Single,
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page {
    response: RawResponse,
}

impl Page {
    /// Wrap a response into a page.
    pub fn new(response: RawResponse) -> Page {
        Page { response }
    }

    /// URL of this page.
    #[inline]
    pub fn url(&self) -> &Url {
        self.response.url()
    }

    /// HTTP status of this page.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Headers of this page.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Raw body of this page.
    #[inline]
    pub fn body(&self) -> &[u8] {
        self.response.body()
    }

    fn has_no_content(&self) -> bool {
        self.status() == StatusCode::NO_CONTENT
            || self.body().iter().all(|c| c.is_ascii_whitespace())
    }

    /// Extract the resources on this page.
    ///
    /// Plain text bodies are treated as one name per line.
    pub fn extract<T: PaginatedResource>(&self) -> Result<Vec<T>, Error> {
        if self.has_no_content() {
            return Ok(Vec::new());
        }

        match self.response.content_type() {
            Some("text/plain") => {
                let text = String::from_utf8_lossy(self.body());
                let names = text
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(|line| Value::String(line.to_string()))
                    .collect();
                serde_json::from_value(Value::Array(names)).map_err(Error::from)
            }
            Some("text/html") => Ok(Vec::new()),
            _ => {
                let root: T::Root = serde_json::from_slice(self.body())?;
                Ok(root.into())
            }
        }
    }

    /// Decode the whole page into an arbitrary type.
    pub fn extract_into<U: DeserializeOwned>(&self) -> Result<U, Error> {
        self.response.json(None)
    }

    /// Whether the page has no resources.
    pub fn is_empty<T: PaginatedResource>(&self) -> Result<bool, Error> {
        self.extract::<T>().map(|items| items.is_empty())
    }

    fn next_link(&self, collection: &str) -> Result<Option<Url>, Error> {
        let mut body: Value = serde_json::from_slice(self.body())?;
        let links = match body.get_mut(format!("{}_links", collection)) {
            Some(value) if !value.is_null() => value.take(),
            _ => return Ok(None),
        };
        let links: Vec<Link> = serde_json::from_value(links)?;
        match links
            .into_iter()
            .find(|link| link.rel == "next" && !link.href.is_empty())
        {
            Some(link) => self.url().join(&link.href).map(Some).map_err(|e| {
                Error::new(
                    ErrorKind::InvalidResponse,
                    format!("Invalid next page link {}: {}", link.href, e),
                )
            }),
            None => Ok(None),
        }
    }

    fn next_marker<T: PaginatedResource>(&self, items: &[T]) -> Option<Url> {
        let marker = items.last()?.resource_id().to_string();
        let mut url = self.url().clone();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "marker")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let _ = url
            .query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair("marker", &marker);
        Some(url)
    }

    /// URL of the next page given the resources extracted from this one.
    pub fn next_url<T: PaginatedResource>(
        &self,
        pagination: Pagination,
        items: &[T],
    ) -> Result<Option<Url>, Error> {
        if items.is_empty() {
            return Ok(None);
        }

        match (pagination, T::COLLECTION_NAME) {
            (Pagination::Linked, Some(collection)) => self.next_link(collection),
            (Pagination::Linked, None) | (Pagination::Single, _) => Ok(None),
            (Pagination::Marker, _) => Ok(self.next_marker(items)),
        }
    }
}

/// A lazy sequence of pages of a listing.
///
/// Nothing is fetched until one of the iteration methods is awaited. Pages are fetched strictly
/// one after another.
#[must_use = "a pager does nothing until iterated"]
pub struct Pager<T> {
    client: ServiceClient,
    url: Url,
    headers: HeaderMap,
    pagination: Pagination,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Pager<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Pager")
            .field("url", &self.url)
            .field("pagination", &self.pagination)
            .finish()
    }
}

impl<T> Clone for Pager<T> {
    fn clone(&self) -> Pager<T> {
        Pager {
            client: self.client.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            pagination: self.pagination,
            _marker: PhantomData,
        }
    }
}

/// Status codes accepted for list pages.
const PAGE_OK_CODES: &[u16] = &[200, 204];

impl<T: PaginatedResource> Pager<T> {
    /// Create a pager starting with the given URL.
    pub fn new(client: &ServiceClient, url: Url, pagination: Pagination) -> Pager<T> {
        Pager {
            client: client.clone(),
            url,
            headers: HeaderMap::new(),
            pagination,
            _marker: PhantomData,
        }
    }

    /// Send these headers with every page request.
    pub fn with_headers(mut self, headers: HeaderMap) -> Pager<T> {
        self.headers = headers;
        self
    }

    /// URL of the first page.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch one page, its resources and the URL of the following page.
    pub(crate) async fn fetch_page(&self, url: Url) -> Result<(Page, Vec<T>, Option<Url>), Error> {
        trace!("Fetching page {}", url);
        let response = self
            .client
            .request(Method::GET, url, PAGE_OK_CODES)
            .headers(self.headers.clone())
            .send()
            .await?;
        let page = Page::new(response);
        let items = page.extract::<T>()?;
        let next = page.next_url(self.pagination, &items)?;
        debug!(
            "Page {} has {} item(s), next page: {:?}",
            page.url(),
            items.len(),
            next.as_ref().map(Url::as_str)
        );
        Ok((page, items, next))
    }

    /// Call `visit` for every non-empty page.
    ///
    /// Iteration stops when the callback returns `false` or an error, or when there are no
    /// more pages. Errors are returned as is.
    pub async fn each_page<F, Fut>(self, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(Page) -> Fut,
        Fut: Future<Output = Result<bool, Error>>,
    {
        let mut next = Some(self.url.clone());
        while let Some(url) = next.take() {
            let (page, items, following) = self.fetch_page(url).await?;
            if items.is_empty() {
                break;
            }
            if !visit(page).await? {
                debug!("Pagination stopped by the caller");
                break;
            }
            next = following;
        }
        Ok(())
    }

    /// Fetch all pages and concatenate their resources.
    pub async fn all_pages(self) -> Result<Vec<T>, Error> {
        let mut result = Vec::new();
        let mut next = Some(self.url.clone());
        while let Some(url) = next.take() {
            let (_, items, following) = self.fetch_page(url).await?;
            result.extend(items);
            next = following;
        }
        Ok(result)
    }
}
