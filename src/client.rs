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

//! Low-level authenticated client.

use std::collections::HashMap;
use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Error as HttpError;
use log::trace;
use reqwest::{Body, Client, Method, Request, RequestBuilder as HttpRequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use static_assertions::{assert_eq_size, assert_impl_all};

use super::{AuthType, Error, RawResponse};

/// Authenticated HTTP client.
///
/// Uses `Arc` internally and should be reused when possible by cloning it.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    client: Client,
    auth: Arc<dyn AuthType>,
    endpoint_overrides: HashMap<String, Url>,
}

assert_eq_size!(AuthenticatedClient, Option<AuthenticatedClient>);
assert_impl_all!(AuthenticatedClient: Send, Sync);

impl AuthenticatedClient {
    /// Create a new authenticated client.
    pub async fn new<Auth: AuthType + 'static>(
        client: Client,
        auth_type: Auth,
    ) -> Result<AuthenticatedClient, Error> {
        auth_type.refresh(&client).await?;
        Ok(AuthenticatedClient::new_internal(
            client,
            Arc::new(auth_type),
        ))
    }

    #[inline]
    pub(crate) fn new_internal(client: Client, auth: Arc<dyn AuthType>) -> AuthenticatedClient {
        AuthenticatedClient {
            client,
            auth,
            endpoint_overrides: HashMap::new(),
        }
    }

    /// Get a reference to the authentication type in use.
    #[inline]
    pub fn auth_type(&self) -> &dyn AuthType {
        self.auth.as_ref()
    }

    /// Authenticate a request.
    #[inline]
    async fn authenticate(&self, request: HttpRequestBuilder) -> Result<Request, Error> {
        self.auth
            .authenticate(&self.client, request)
            .await?
            .build()
            .map_err(Error::from)
    }

    /// Get a URL for the requested service.
    ///
    /// Endpoint overrides take precedence over the authentication type.
    pub fn get_endpoint(&self, service_type: &str) -> Result<Url, Error> {
        if let Some(found) = self.endpoint_overrides.get(service_type) {
            trace!("Using override {} for service {}", found, service_type);
            Ok(found.clone())
        } else {
            self.auth.get_endpoint(service_type)
        }
    }

    /// Endpoint overrides for this client.
    #[inline]
    pub fn endpoint_overrides(&self) -> &HashMap<String, Url> {
        &self.endpoint_overrides
    }

    /// Mutable endpoint overrides for this client.
    #[inline]
    pub fn endpoint_overrides_mut(&mut self) -> &mut HashMap<String, Url> {
        &mut self.endpoint_overrides
    }

    /// Add an endpoint override for the given service type.
    #[inline]
    pub fn with_endpoint_override<S: Into<String>>(mut self, service_type: S, url: Url) -> Self {
        let _ = self.endpoint_overrides.insert(service_type.into(), url);
        self
    }

    /// Get a reference to the inner (non-authenticated) client.
    #[inline]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Update the authentication.
    ///
    /// # Warning
    ///
    /// Authentication will also be updated for clones of this client, since they share the same
    /// authentication object.
    #[inline]
    pub async fn refresh(&mut self) -> Result<(), Error> {
        self.auth.refresh(&self.client).await
    }

    /// Start an authenticated request.
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        RequestBuilder {
            inner: self.client.request(method, url),
            client: self.clone(),
            ok_codes: None,
        }
    }
}

impl From<AuthenticatedClient> for Client {
    fn from(value: AuthenticatedClient) -> Client {
        value.client
    }
}

/// A request builder with error handling.
#[derive(Debug)]
#[must_use = "preparing a request is not enough to run it"]
pub struct RequestBuilder {
    inner: HttpRequestBuilder,
    client: AuthenticatedClient,
    ok_codes: Option<Vec<u16>>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message: Option<String>,
    faultstring: Option<String>,
    title: Option<String>,
    // Ironic legacy format: JSON inside JSON
    error_message: Option<String>,
}

impl Message {
    fn convert(self, recursive: bool) -> Option<String> {
        if let Some(value) = self.message.or(self.faultstring).or(self.title) {
            Some(value)
        } else if recursive {
            self.error_message.and_then(|json| {
                serde_json::from_str::<Message>(&json)
                    .ok()
                    .and_then(|msg| msg.convert(false))
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorResponse {
    Map(HashMap<String, Message>),
    Message(Message),
}

fn extract_message(text: String) -> String {
    serde_json::from_str::<ErrorResponse>(&text)
        .ok()
        .and_then(|body| match body {
            ErrorResponse::Map(map) => map.into_iter().next().and_then(|(_k, v)| v.convert(true)),
            ErrorResponse::Message(msg) => msg.convert(true),
        })
        .unwrap_or(text)
}

fn format_codes(codes: &[u16]) -> String {
    let inner: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
    format!("[{}]", inner.join(" "))
}

/// Check the response status against the accepted codes and buffer the body.
///
/// Without explicit codes, any successful status is accepted.
pub(crate) async fn check(
    method: &Method,
    response: Response,
    ok_codes: Option<&[u16]>,
) -> Result<RawResponse, Error> {
    let status = response.status();
    let url = response.url().clone();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    let accepted = match ok_codes {
        Some(codes) => codes.contains(&status.as_u16()),
        None => status.is_success(),
    };

    if accepted {
        trace!("HTTP {} request to {} returned {}", method, url, status);
        Ok(RawResponse::new(url, status, headers, body))
    } else {
        let text = String::from_utf8_lossy(&body).into_owned();
        let expected = match ok_codes {
            Some(codes) => format_codes(codes),
            None => "2xx".to_string(),
        };
        let message = format!(
            "Expected HTTP response code {} when accessing [{} {}], but got {} instead: {}",
            expected,
            method,
            url,
            status.as_u16(),
            extract_message(text.clone())
        );
        trace!("HTTP {} request to {} failed: {}", method, url, message);
        Err(Error::new(status.into(), message)
            .with_status(status)
            .with_body(text))
    }
}

impl RequestBuilder {
    /// Add a body to the request.
    pub fn body<T: Into<Body>>(self, body: T) -> RequestBuilder {
        RequestBuilder {
            inner: self.inner.body(body),
            ..self
        }
    }

    /// Add a header to the request.
    pub fn header<K, V>(self, key: K, value: V) -> RequestBuilder
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<HttpError>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<HttpError>,
    {
        RequestBuilder {
            inner: self.inner.header(key, value),
            ..self
        }
    }

    /// Add a header to the request in place.
    pub fn set_header(&mut self, key: HeaderName, value: HeaderValue) {
        take_mut::take(self, |rb| rb.header(key, value));
    }

    /// Add headers to a request.
    pub fn headers(self, headers: HeaderMap) -> RequestBuilder {
        RequestBuilder {
            inner: self.inner.headers(headers),
            ..self
        }
    }

    /// Add a JSON body to the request.
    pub fn json<T: Serialize + ?Sized>(self, json: &T) -> RequestBuilder {
        RequestBuilder {
            inner: self.inner.json(json),
            ..self
        }
    }

    /// Send a query with the request.
    pub fn query<T: Serialize + ?Sized>(self, query: &T) -> RequestBuilder {
        RequestBuilder {
            inner: self.inner.query(query),
            ..self
        }
    }

    /// Override the timeout for the request.
    pub fn timeout(self, timeout: Duration) -> RequestBuilder {
        RequestBuilder {
            inner: self.inner.timeout(timeout),
            ..self
        }
    }

    /// Status codes considered a success for this request.
    pub fn ok_codes<I>(self, codes: I) -> RequestBuilder
    where
        I: IntoIterator<Item = u16>,
    {
        RequestBuilder {
            ok_codes: Some(codes.into_iter().collect()),
            ..self
        }
    }

    /// Send the request, check the status and read the whole response.
    pub async fn send(self) -> Result<RawResponse, Error> {
        let req = self.client.authenticate(self.inner).await?;
        let method = req.method().clone();
        trace!("Sending HTTP {} request to {}", method, req.url());
        let response = self.client.client.execute(req).await?;
        check(&method, response, self.ok_codes.as_deref()).await
    }

    /// Send the request without checking for HTTP and OpenStack errors.
    pub async fn send_unchecked(self) -> Result<Response, Error> {
        let req = self.client.authenticate(self.inner).await?;
        trace!("Sending HTTP {} request to {}", req.method(), req.url());
        self.client.client.execute(req).await.map_err(Error::from)
    }
}
