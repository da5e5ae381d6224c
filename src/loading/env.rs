// Copyright 2020 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Support for `OS_` environment variables.

use std::env;
use std::sync::Arc;

use log::debug;

use crate::loading;
use crate::{AuthType, AuthenticatedClient, BasicAuth, Error, ErrorKind, NoAuth, TokenAuth};

// This is only used for unit testing.
trait Environment {
    fn get(&self, name: &'static str) -> Result<String, Error>;
}

#[derive(Debug, Clone, Copy)]
struct RealEnvironment;

impl Environment for RealEnvironment {
    fn get(&self, name: &'static str) -> Result<String, Error> {
        env::var(name).map_err(|_| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Required environment variable {} is not provided", name),
            )
        })
    }
}

/// Service types that can be overridden with `OS_<SERVICE>_ENDPOINT_OVERRIDE`.
const OVERRIDABLE: &[(&str, &str)] = &[
    ("OS_BLOCK_STORAGE_ENDPOINT_OVERRIDE", "block_storage_endpoint_override"),
    ("OS_IDENTITY_ENDPOINT_OVERRIDE", "identity_endpoint_override"),
    ("OS_NETWORK_ENDPOINT_OVERRIDE", "network_endpoint_override"),
    ("OS_OBJECT_STORE_ENDPOINT_OVERRIDE", "object_store_endpoint_override"),
];

fn _from_env<E: Environment>(env: E) -> Result<Option<AuthenticatedClient>, Error> {
    if env.get("OS_CLOUD").is_ok() {
        return Ok(None);
    }

    let auth_type = env.get("OS_AUTH_TYPE").unwrap_or_else(|_| {
        if env.get("OS_TOKEN").is_ok() {
            "admin_token".to_string()
        } else {
            "none".to_string()
        }
    });
    debug!("Loading {} authentication from the environment", auth_type);

    let client = loading::get_client(env.get("OS_CACERT").ok())?;
    let endpoint = env.get("OS_ENDPOINT").ok();

    let auth: Arc<dyn AuthType> = match auth_type.as_str() {
        "none" => Arc::new(match endpoint {
            Some(endpoint) => NoAuth::new(endpoint)?,
            None => NoAuth::new_without_endpoint(),
        }),
        "http_basic" => {
            let endpoint = env.get("OS_ENDPOINT")?;
            let user_name = env.get("OS_USERNAME")?;
            let password = env.get("OS_PASSWORD")?;
            Arc::new(BasicAuth::new(endpoint, user_name, password)?)
        }
        "admin_token" | "token" => {
            let token = env.get("OS_TOKEN")?;
            Arc::new(match endpoint {
                Some(endpoint) => TokenAuth::new(endpoint, token)?,
                None => TokenAuth::new_without_endpoint(token),
            })
        }
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unsupported authentication type: {}", auth_type),
            ))
        }
    };

    let mut result = AuthenticatedClient::new_internal(client, auth);
    for &(variable, key) in OVERRIDABLE {
        if let Ok(value) = env.get(variable) {
            loading::add_endpoint_override(&mut result, key, &value)?;
        }
    }

    Ok(Some(result))
}

/// Create an `AuthenticatedClient` from environment variables.
///
/// When `OS_CLOUD` is set, the client is loaded from `clouds.yaml` instead. Supported
/// authentication types (`OS_AUTH_TYPE`) are `admin_token` (`OS_TOKEN`), `http_basic`
/// (`OS_USERNAME` and `OS_PASSWORD`) and `none`. The endpoint is taken from `OS_ENDPOINT` and
/// `OS_<SERVICE>_ENDPOINT_OVERRIDE` variables.
pub async fn from_env() -> Result<AuthenticatedClient, Error> {
    let mut client = match _from_env(RealEnvironment)? {
        Some(client) => client,
        None => return loading::from_config(RealEnvironment.get("OS_CLOUD")?).await,
    };
    client.refresh().await?;
    Ok(client)
}

#[cfg(test)]
pub mod test {
    use std::collections::HashMap;

    use maplit::hashmap;

    use super::{Environment, _from_env};
    use crate::{Error, ErrorKind};

    impl Environment for HashMap<&'static str, &'static str> {
        fn get(&self, name: &'static str) -> Result<String, Error> {
            self.get(name)
                .cloned()
                .map(From::from)
                .ok_or_else(|| Error::new(ErrorKind::InvalidInput, name))
        }
    }

    #[test]
    fn test_token() {
        let env = hashmap! {
            "OS_ENDPOINT" => "http://example.com",
            "OS_TOKEN" => "abcdef",
        };

        let client = _from_env(env).unwrap().unwrap();
        assert_eq!(
            client.get_endpoint("network").unwrap().as_str(),
            "http://example.com/"
        );
    }

    #[test]
    fn test_token_with_type_and_overrides() {
        let env = hashmap! {
            "OS_AUTH_TYPE" => "admin_token",
            "OS_TOKEN" => "abcdef",
            "OS_NETWORK_ENDPOINT_OVERRIDE" => "http://neutron:9696",
            "OS_BLOCK_STORAGE_ENDPOINT_OVERRIDE" => "http://cinder:8776/v3/project",
        };

        let client = _from_env(env).unwrap().unwrap();
        assert_eq!(
            client.get_endpoint("network").unwrap().as_str(),
            "http://neutron:9696/"
        );
        assert_eq!(
            client.get_endpoint("block-storage").unwrap().as_str(),
            "http://cinder:8776/v3/project"
        );
        assert!(client.get_endpoint("object-store").is_err());
    }

    #[test]
    fn test_token_missing() {
        let env = hashmap! {
            "OS_AUTH_TYPE" => "admin_token",
        };

        let err = _from_env(env).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_http_basic() {
        let env = hashmap! {
            "OS_AUTH_TYPE" => "http_basic",
            "OS_ENDPOINT" => "http://example.com",
            "OS_USERNAME" => "admin",
            "OS_PASSWORD" => "password",
        };

        let _client = _from_env(env).unwrap().unwrap();
    }

    #[test]
    fn test_none() {
        let env = hashmap! {
            "OS_AUTH_TYPE" => "none",
            "OS_ENDPOINT" => "http://example.com",
        };

        let _client = _from_env(env).unwrap().unwrap();
    }

    #[test]
    fn test_unsupported() {
        let env = hashmap! {
            "OS_AUTH_TYPE" => "password",
        };

        let err = _from_env(env).err().unwrap();
        assert!(err.to_string().contains("Unsupported authentication type"));
    }

    #[test]
    fn test_cloud_is_deferred() {
        let env = hashmap! {
            "OS_CLOUD" => "devstack",
        };

        assert!(_from_env(env).unwrap().is_none());
    }
}
