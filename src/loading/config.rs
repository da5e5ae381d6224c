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

//! Support for cloud configuration file.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::loading;
use crate::utils;
use crate::{AuthType, AuthenticatedClient, BasicAuth, Error, ErrorKind, NoAuth, TokenAuth};

#[derive(Debug, Default, Deserialize)]
struct Auth {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cloud {
    #[serde(default)]
    auth: Option<Auth>,
    #[serde(default)]
    auth_type: Option<String>,
    #[serde(default)]
    cacert: Option<String>,
    #[serde(flatten)]
    options: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Root {
    clouds: HashMap<String, Cloud>,
}

fn get_mapping<'a>(root: &'a mut Mapping, key: &str, file: &str) -> Result<&'a mut Mapping, Error> {
    match root.get_mut(key) {
        Some(Value::Mapping(map)) => Ok(map),
        Some(other) => Err(Error::new(
            ErrorKind::InvalidConfig,
            format!("{} object in {} must be a mapping, got {:?}", key, file, other),
        )),
        None => Err(Error::new(
            ErrorKind::InvalidConfig,
            format!("{} must contain a {} object", file, key),
        )),
    }
}

/// Inject profiles from clouds-public.yaml into clouds.yaml.
fn inject_profiles(clouds_public: &mut Mapping, clouds: &mut Mapping) -> Result<(), Error> {
    let clouds_mapping = get_mapping(clouds, "clouds", "clouds.yaml")?;
    let clouds_public_mapping = get_mapping(clouds_public, "public-clouds", "clouds-public.yaml")?;

    for (cloud_name, cloud) in clouds_mapping.iter_mut() {
        let cloud_mapping = match cloud.as_mapping_mut() {
            Some(mapping) => mapping,
            None => {
                warn!("Cloud record {:?} is not a mapping, ignoring", cloud_name);
                continue;
            }
        };

        let profile_name = match cloud_mapping.get("profile") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(Error::new(
                    ErrorKind::InvalidConfig,
                    format!("Profile name {:?} is not a string", other),
                ))
            }
            None => continue,
        };

        match clouds_public_mapping.get(profile_name.as_str()) {
            Some(Value::Mapping(profile)) => {
                debug!("Applying profile {} to cloud {:?}", profile_name, cloud_name);
                // Do not overwrite keys that are already present.
                utils::merge_mappings(profile.clone(), cloud_mapping, false);
            }
            Some(other) => {
                return Err(Error::new(
                    ErrorKind::InvalidConfig,
                    format!("Profile {} is not a mapping: {:?}", profile_name, other),
                ))
            }
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidConfig,
                    format!("Missing profile {} in clouds-public.yaml", profile_name),
                ))
            }
        }
    }

    Ok(())
}

fn find_config<S: AsRef<str>>(filename: S) -> Option<PathBuf> {
    let filename = filename.as_ref();
    let current = Path::new(filename);
    if current.is_file() {
        match current.canonicalize() {
            Ok(val) => return Some(val),
            Err(e) => warn!("Cannot canonicalize {:?}: {}", current, e),
        }
    }

    if let Some(mut home) = dirs::home_dir() {
        home.push(".config/openstack");
        home.push(filename);
        if home.is_file() {
            return Some(home);
        }
    } else {
        warn!("Cannot find home directory");
    }

    let abs = Path::new("/etc/openstack").join(filename);
    if abs.is_file() {
        Some(abs)
    } else {
        None
    }
}

#[inline]
fn with_one_key(key: &str) -> Mapping {
    let mut result = Mapping::with_capacity(1);
    let _ = result.insert(key.into(), Value::Mapping(Mapping::new()));
    result
}

fn parse_yaml(path: &Path, filename: &str) -> Result<Mapping, Error> {
    let content = File::open(path).map_err(|e| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Cannot read {}: {}", filename, e),
        )
    })?;

    match serde_yaml::from_reader(content).map_err(|e| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Cannot parse {}: {}", filename, e),
        )
    })? {
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(Error::new(
            ErrorKind::InvalidConfig,
            format!("Root of {} is {:?}, not a mapping", filename, other),
        )),
    }
}

fn read_yaml(filename: &str, default_root_key: Option<&str>) -> Result<Mapping, Error> {
    match (find_config(filename), default_root_key) {
        (Some(path), _) => {
            debug!("Reading {} from {:?}", filename, path);
            parse_yaml(&path, filename)
        }
        (None, Some(default)) => Ok(with_one_key(default)),
        (None, None) => Err(Error::new(
            ErrorKind::InvalidConfig,
            format!("{} was not found in any location", filename),
        )),
    }
}

fn required(value: Option<String>, auth_type: &str, what: &str) -> Result<String, Error> {
    value.ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("{} authentication requires {}", auth_type, what),
        )
    })
}

fn auth_from_cloud(auth_type: &str, auth: Option<Auth>) -> Result<Arc<dyn AuthType>, Error> {
    let auth = auth.unwrap_or_default();
    Ok(match auth_type {
        "none" => Arc::new(match auth.endpoint {
            Some(endpoint) => NoAuth::new(endpoint)?,
            None => NoAuth::new_without_endpoint(),
        }),
        "http_basic" => Arc::new(BasicAuth::new(
            required(auth.endpoint, auth_type, "an endpoint")?,
            required(auth.username, auth_type, "a user name")?,
            required(auth.password, auth_type, "a password")?,
        )?),
        "admin_token" | "token" => {
            let token = required(auth.token, auth_type, "a token")?;
            Arc::new(match auth.endpoint {
                Some(endpoint) => TokenAuth::new(endpoint, token)?,
                None => TokenAuth::new_without_endpoint(token),
            })
        }
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("Unsupported authentication type: {}", auth_type),
            ))
        }
    })
}

fn from_files(
    name: &str,
    mut clouds: Mapping,
    mut clouds_public: Mapping,
    secure: Mapping,
) -> Result<AuthenticatedClient, Error> {
    utils::merge_mappings(secure, &mut clouds, true);

    inject_profiles(&mut clouds_public, &mut clouds)?;

    let mut clouds_root: Root = serde_yaml::from_value(Value::Mapping(clouds)).map_err(|e| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Cannot parse the merged cloud configuration: {}", e),
        )
    })?;

    let cloud = clouds_root
        .clouds
        .remove(name)
        .ok_or_else(|| Error::new(ErrorKind::InvalidConfig, format!("No such cloud: {}", name)))?;
    let has_token = cloud.auth.as_ref().map_or(false, |auth| auth.token.is_some());
    let auth_type = cloud.auth_type.unwrap_or_else(|| {
        let default = if has_token { "admin_token" } else { "none" };
        default.to_string()
    });
    debug!("Using {} authentication for cloud {}", auth_type, name);

    let client = loading::get_client(cloud.cacert)?;
    let auth = auth_from_cloud(&auth_type, cloud.auth)?;
    let mut result = AuthenticatedClient::new_internal(client, auth);

    for (key, value) in cloud.options {
        if key.ends_with("_endpoint_override") {
            if let Value::String(value) = value {
                loading::add_endpoint_override(&mut result, &key, &value)?;
            } else {
                return Err(Error::new(
                    ErrorKind::InvalidConfig,
                    format!("{} must be a string, got {:?}", key, value),
                ));
            }
        }
    }

    Ok(result)
}

/// Create an `AuthenticatedClient` from a `clouds.yaml` configuration file.
///
/// `clouds-public.yaml` profiles and `secure.yaml` secrets are merged in when present.
/// Supported authentication types are `admin_token`, `http_basic` and `none`. Without an
/// explicit `auth_type`, `admin_token` is used if a token is present and `none` otherwise.
pub async fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<AuthenticatedClient, Error> {
    let clouds = read_yaml("clouds.yaml", None)?;
    let clouds_public = read_yaml("clouds-public.yaml", Some("public-clouds"))?;
    let secure = read_yaml("secure.yaml", Some("clouds"))?;

    let mut client = from_files(cloud_name.as_ref(), clouds, clouds_public, secure)?;
    client.refresh().await?;
    Ok(client)
}

#[cfg(test)]
pub mod test {
    use super::{find_config, from_files, inject_profiles, read_yaml, with_one_key};
    use crate::utils::test::to_yaml;
    use crate::ErrorKind;

    #[cfg(any(feature = "native-tls", feature = "rustls"))]
    use std::io::Write;

    fn from_clouds(clouds: &str) -> Result<crate::AuthenticatedClient, crate::Error> {
        from_files(
            "devstack",
            to_yaml(clouds),
            with_one_key("public-clouds"),
            with_one_key("clouds"),
        )
    }

    #[test]
    fn test_from_config_with_profile_and_secure() {
        let clouds = to_yaml(
            r#"clouds:
  devstack:
    auth:
      endpoint: http://cloud.local
    profile: test_profile"#,
        );

        let clouds_public = to_yaml(
            r#"public-clouds:
  test_profile:
    network_endpoint_override: http://neutron:9696"#,
        );

        let secure = to_yaml(
            r#"clouds:
  devstack:
    auth:
      token: abcdef"#,
        );

        let client = from_files("devstack", clouds, clouds_public, secure).unwrap();
        assert_eq!(
            client.get_endpoint("network").unwrap().as_str(),
            "http://neutron:9696/"
        );
        assert_eq!(
            client.get_endpoint("volumev3").unwrap().as_str(),
            "http://cloud.local/"
        );
    }

    #[test]
    fn test_from_config_token_missing() {
        let e = from_clouds(
            r#"clouds:
  devstack:
    auth_type: admin_token
    auth:
      endpoint: http://cloud.local"#,
        )
        .err()
        .unwrap();
        assert_eq!(e.kind(), ErrorKind::InvalidConfig);
        assert!(e.to_string().contains("requires a token"));
    }

    #[test]
    fn test_from_config_http_basic() {
        let _ = from_clouds(
            r#"clouds:
  devstack:
    auth_type: http_basic
    auth:
      endpoint: http://url1
      username: user1
      password: password1"#,
        )
        .unwrap();
    }

    #[test]
    fn test_from_config_none_with_overrides() {
        let client = from_clouds(
            r#"clouds:
  devstack:
    auth_type: none
    block_storage_endpoint_override: http://cinder/v3/
    object_store_endpoint_override: http://swift/v1/AUTH_test"#,
        )
        .unwrap();
        assert_eq!(
            "http://cinder/v3/",
            client.endpoint_overrides().get("block_storage").unwrap().as_str()
        );
        assert_eq!(
            "http://cinder/v3/",
            client.get_endpoint("block-storage").unwrap().as_str()
        );
        assert_eq!(
            "http://swift/v1/AUTH_test",
            client.get_endpoint("object-store").unwrap().as_str()
        );
    }

    #[test]
    fn test_from_config_invalid_override() {
        let e = from_clouds(
            r#"clouds:
  devstack:
    auth_type: none
    network_endpoint_override: 42"#,
        )
        .err()
        .unwrap();
        assert!(e.to_string().contains("must be a string"));
    }

    #[test]
    fn test_from_config_no_such_cloud() {
        let e = from_files(
            "other",
            to_yaml("clouds:\n  devstack:\n    auth_type: none"),
            with_one_key("public-clouds"),
            with_one_key("clouds"),
        )
        .err()
        .unwrap();
        assert_eq!(
            e.to_string(),
            "configuration file cannot be found or is invalid: No such cloud: other"
        );
    }

    #[test]
    #[cfg(any(feature = "native-tls", feature = "rustls"))]
    fn test_from_config_cacert() {
        let mut cacert = tempfile::NamedTempFile::new().unwrap();
        write!(
            cacert,
            r#"-----BEGIN CERTIFICATE-----
MIIBYzCCAQqgAwIBAgIUJcTlPhsFyWG9S0pAAElKuSFEPBYwCgYIKoZIzj0EAwIw
FDESMBAGA1UEAwwJbG9jYWxob3N0MB4XDTIwMTAwMjExNTU1NloXDTIwMTEwMTEx
NTU1NlowFDESMBAGA1UEAwwJbG9jYWxob3N0MFkwEwYHKoZIzj0CAQYIKoZIzj0D
AQcDQgAEsfpkV9dAThk54U1K+rXUnNbpwuNo5wCRrKpk+cNR/2HBO8VydNj7dkxs
VBUvI7M9hY8dgg1jBVoPcCf0GSOvuqM6MDgwFAYDVR0RBA0wC4IJbG9jYWxob3N0
MAsGA1UdDwQEAwIHgDATBgNVHSUEDDAKBggrBgEFBQcDATAKBggqhkjOPQQDAgNH
ADBEAiAdjF7484kjb3XJoLbgqnZh4V1yHKs57eBVuil9/V0YugIgLwb/vSUAPowb
hK9jLBzNvo8qzKqaGfnGieuLeXCqFDA=
-----END CERTIFICATE-----"#
        )
        .unwrap();
        cacert.flush().unwrap();

        let _ = from_clouds(&format!(
            r#"clouds:
  devstack:
    auth_type: none
    auth:
      endpoint: http://url1
    cacert: "{}""#,
            cacert.path().display()
        ))
        .unwrap();
    }

    #[test]
    fn test_from_config_cacert_not_found() {
        let e = from_clouds(
            r#"clouds:
  devstack:
    auth_type: none
    cacert: /I/do/not/exist"#,
        )
        .err()
        .unwrap();
        if cfg!(any(feature = "native-tls", feature = "rustls")) {
            assert!(e.to_string().contains("Cannot open cacert file"));
        } else {
            assert!(e.to_string().contains("TLS support is disabled"));
        }
    }

    #[test]
    fn test_inject_profiles_error() {
        let mut clouds_data = to_yaml(
            r#"
clouds:
  devstack:
    auth:
      token: abcdef
    profile: test_profile"#,
        );

        let mut clouds_public_data = to_yaml(
            r#"
public-clouds:
  test_profile_other:
    auth:
        endpoint: http://url2"#,
        );

        let err = inject_profiles(&mut clouds_public_data, &mut clouds_data).unwrap_err();
        assert_eq!(ErrorKind::InvalidConfig, err.kind());
        assert_eq!(
            "configuration file cannot be found or is invalid: Missing profile test_profile in clouds-public.yaml",
            err.to_string()
        );
    }

    #[test]
    fn test_inject_profiles_keeps_existing() {
        let mut clouds_data = to_yaml(
            r#"
clouds:
  devstack:
    auth:
      endpoint: http://mine
    profile: test_profile"#,
        );

        let mut clouds_public_data = to_yaml(
            r#"
public-clouds:
  test_profile:
    auth:
        endpoint: http://theirs
        token: shared"#,
        );

        inject_profiles(&mut clouds_public_data, &mut clouds_data).unwrap();
        let auth = clouds_data
            .get("clouds")
            .and_then(|v| v.get("devstack"))
            .and_then(|v| v.get("auth"))
            .unwrap();
        assert_eq!(auth.get("endpoint").unwrap(), "http://mine");
        assert_eq!(auth.get("token").unwrap(), "shared");
    }

    #[test]
    fn test_read_config_file_error() {
        let e = read_yaml("doesnt_exist", None).err().unwrap();
        assert_eq!("configuration file cannot be found or is invalid: doesnt_exist was not found in any location", e.to_string());
    }

    #[test]
    fn test_find_config_fail() {
        let config = find_config("shouldnt_exist");
        assert_eq!(config, None);
    }
}
