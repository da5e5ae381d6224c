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

//! A client bound to one service endpoint.

use std::sync::Arc;

use http::{HeaderName, HeaderValue};
use log::debug;
use reqwest::{Method, Url};
use static_assertions::assert_impl_all;

use super::client::RequestBuilder;
use super::services::ServiceType;
use super::{url, ApiVersion, AuthenticatedClient, Error};

/// Status codes accepted by default for GET requests.
pub const GET_OK_CODES: &[u16] = &[200];
/// Status codes accepted by default for POST requests.
pub const POST_OK_CODES: &[u16] = &[201, 202];
/// Status codes accepted by default for PUT requests.
pub const PUT_OK_CODES: &[u16] = &[201, 202];
/// Status codes accepted by default for PATCH requests.
pub const PATCH_OK_CODES: &[u16] = &[200, 202, 204];
/// Status codes accepted by default for DELETE requests.
pub const DELETE_OK_CODES: &[u16] = &[202, 204];
/// Status codes accepted by default for HEAD requests.
pub const HEAD_OK_CODES: &[u16] = &[204];

/// A client for one OpenStack service.
///
/// Holds the authenticated HTTP client, the base endpoint of the service and an optional
/// microversion. Cheap to clone.
///
/// ```rust,no_run
/// # async fn example() -> Result<(), osclient::Error> {
/// let client = osclient::from_env().await?;
/// let network = osclient::ServiceClient::new(client, osclient::services::NETWORK)?;
/// let url = network.url(["qos", "policies"])?;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: AuthenticatedClient,
    endpoint: Url,
    service: Arc<dyn ServiceType>,
    microversion: Option<(ApiVersion, HeaderName, HeaderValue)>,
}

assert_impl_all!(ServiceClient: Send, Sync);

impl ServiceClient {
    /// Create a service client using the endpoint from the authentication.
    pub fn new<S>(client: AuthenticatedClient, service: S) -> Result<ServiceClient, Error>
    where
        S: ServiceType + 'static,
    {
        let endpoint = client.get_endpoint(service.catalog_type())?;
        ServiceClient::from_endpoint(client, service, endpoint)
    }

    /// Create a service client with an explicit endpoint.
    ///
    /// The service version path is appended unless the endpoint already ends with it.
    pub fn from_endpoint<S>(
        client: AuthenticatedClient,
        service: S,
        endpoint: Url,
    ) -> Result<ServiceClient, Error>
    where
        S: ServiceType + 'static,
    {
        let endpoint = match service.version_path() {
            Some(version) if !url::ends_with(&endpoint, version) => {
                url::extend(endpoint, [version])?
            }
            _ => endpoint,
        };
        debug!(
            "Using endpoint {} for service {}",
            endpoint,
            service.catalog_type()
        );
        Ok(ServiceClient {
            client,
            endpoint,
            service: Arc::new(service),
            microversion: None,
        })
    }

    /// Send the given microversion with every request.
    pub fn with_microversion<A: Into<ApiVersion>>(
        mut self,
        version: A,
    ) -> Result<ServiceClient, Error> {
        let version = version.into();
        let (name, value) = self.service.api_version_header(version)?;
        self.microversion = Some((version, name, value));
        Ok(self)
    }

    /// Microversion in use, if any.
    #[inline]
    pub fn microversion(&self) -> Option<ApiVersion> {
        self.microversion.as_ref().map(|x| x.0)
    }

    /// Base endpoint of the service.
    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The underlying authenticated client.
    #[inline]
    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Service type.
    #[inline]
    pub fn service_type(&self) -> &dyn ServiceType {
        self.service.as_ref()
    }

    /// Build a URL from path segments relative to the endpoint.
    ///
    /// Segments are percent-encoded, so resource names may contain any characters.
    pub fn url<I>(&self, segments: I) -> Result<Url, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        url::extend(self.endpoint.clone(), segments)
    }

    /// Start a request with the microversion header and the given accepted status codes.
    pub fn request(&self, method: Method, url: Url, ok_codes: &[u16]) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .ok_codes(ok_codes.iter().copied());
        if let Some((_, ref name, ref value)) = self.microversion {
            builder.set_header(name.clone(), value.clone());
        }
        builder
    }

    /// Start a GET request (accepts 200).
    #[inline]
    pub fn get(&self, url: Url) -> RequestBuilder {
        self.request(Method::GET, url, GET_OK_CODES)
    }

    /// Start a POST request (accepts 201 and 202).
    #[inline]
    pub fn post(&self, url: Url) -> RequestBuilder {
        self.request(Method::POST, url, POST_OK_CODES)
    }

    /// Start a PUT request (accepts 201 and 202).
    #[inline]
    pub fn put(&self, url: Url) -> RequestBuilder {
        self.request(Method::PUT, url, PUT_OK_CODES)
    }

    /// Start a PATCH request (accepts 200, 202 and 204).
    #[inline]
    pub fn patch(&self, url: Url) -> RequestBuilder {
        self.request(Method::PATCH, url, PATCH_OK_CODES)
    }

    /// Start a DELETE request (accepts 202 and 204).
    #[inline]
    pub fn delete(&self, url: Url) -> RequestBuilder {
        self.request(Method::DELETE, url, DELETE_OK_CODES)
    }

    /// Start a HEAD request (accepts 204).
    #[inline]
    pub fn head(&self, url: Url) -> RequestBuilder {
        self.request(Method::HEAD, url, HEAD_OK_CODES)
    }
}
