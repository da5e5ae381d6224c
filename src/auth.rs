// Copyright 2019 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Base code for authentication.

use std::fmt;
use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use static_assertions::{assert_impl_all, assert_obj_safe};

use super::{Error, ErrorKind};

/// Trait for an authentication type.
///
/// An OpenStack authentication type is expected to be able to:
///
/// 1. attach credentials to requests,
/// 2. get an endpoint URL for the given service type.
#[async_trait]
pub trait AuthType: Debug + Sync + Send {
    /// Authenticate a request.
    async fn authenticate(
        &self,
        client: &Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, Error>;

    /// Get a URL for the requested service.
    fn get_endpoint(&self, service_type: &str) -> Result<Url, Error>;

    /// Refresh the authentication (renew the token, etc).
    async fn refresh(&self, client: &Client) -> Result<(), Error>;
}

assert_obj_safe!(AuthType);

fn fixed_endpoint(endpoint: &Option<Url>, service_type: &str) -> Result<Url, Error> {
    endpoint.clone().ok_or_else(|| {
        Error::new(
            ErrorKind::EndpointNotFound,
            format!(
                "Authentication without an endpoint, use an override for {}",
                service_type
            ),
        )
    })
}

/// Authentication type that provides no authentication.
///
/// This type always uses a pre-defined endpoint and sends no authentication information:
/// ```rust,no_run
/// # async fn example() -> Result<(), osclient::Error> {
/// let auth = osclient::NoAuth::new("https://cloud.local/network")?;
/// let client = osclient::AuthenticatedClient::new(reqwest::Client::new(), auth).await?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct NoAuth {
    endpoint: Option<Url>,
}

assert_impl_all!(NoAuth: Send, Sync);

impl NoAuth {
    /// Create a new fake authentication method using a fixed endpoint.
    ///
    /// This endpoint will be returned in response to all `get_endpoint` calls
    /// of the [AuthType](trait.AuthType.html) trait.
    #[inline]
    pub fn new<U>(endpoint: U) -> Result<NoAuth, Error>
    where
        U: AsRef<str>,
    {
        let endpoint = Url::parse(endpoint.as_ref())?;
        Ok(NoAuth {
            endpoint: Some(endpoint),
        })
    }

    /// Create a new fake authentication method without an endpoint.
    ///
    /// All calls to `get_endpoint` will fail. This option is only useful with endpoint overrides.
    #[inline]
    pub fn new_without_endpoint() -> NoAuth {
        NoAuth { endpoint: None }
    }
}

#[async_trait]
impl AuthType for NoAuth {
    async fn authenticate(
        &self,
        _client: &Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, Error> {
        Ok(request)
    }

    fn get_endpoint(&self, service_type: &str) -> Result<Url, Error> {
        fixed_endpoint(&self.endpoint, service_type)
    }

    /// This call does nothing for `NoAuth`.
    async fn refresh(&self, _client: &Client) -> Result<(), Error> {
        Ok(())
    }
}

/// Authentication with a pre-issued token.
///
/// The token is sent in the `X-Auth-Token` header of every request. This is what
/// keystoneauth calls `admin_token`.
#[derive(Clone)]
pub struct TokenAuth {
    endpoint: Option<Url>,
    token: String,
}

assert_impl_all!(TokenAuth: Send, Sync);

impl Debug for TokenAuth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenAuth")
            .field("endpoint", &self.endpoint)
            .field("token", &"***")
            .finish()
    }
}

impl TokenAuth {
    /// Create a token authentication with a fixed endpoint.
    pub fn new<U, S>(endpoint: U, token: S) -> Result<TokenAuth, Error>
    where
        U: AsRef<str>,
        S: Into<String>,
    {
        Ok(TokenAuth {
            endpoint: Some(Url::parse(endpoint.as_ref())?),
            token: token.into(),
        })
    }

    /// Create a token authentication that relies on endpoint overrides.
    pub fn new_without_endpoint<S: Into<String>>(token: S) -> TokenAuth {
        TokenAuth {
            endpoint: None,
            token: token.into(),
        }
    }
}

#[async_trait]
impl AuthType for TokenAuth {
    async fn authenticate(
        &self,
        _client: &Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, Error> {
        Ok(request.header("x-auth-token", &self.token))
    }

    fn get_endpoint(&self, service_type: &str) -> Result<Url, Error> {
        fixed_endpoint(&self.endpoint, service_type)
    }

    async fn refresh(&self, _client: &Client) -> Result<(), Error> {
        if self.token.is_empty() {
            Err(Error::new(
                ErrorKind::AuthenticationFailed,
                "An empty token cannot be used for authentication",
            ))
        } else {
            Ok(())
        }
    }
}
