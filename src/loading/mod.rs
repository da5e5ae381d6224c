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

//! Support for loading clients from external input.

#[cfg(any(feature = "native-tls", feature = "rustls"))]
use std::fs;

use log::debug;
#[cfg(any(feature = "native-tls", feature = "rustls"))]
use reqwest::Certificate;
use reqwest::{Client, Url};

use crate::{AuthenticatedClient, Error, ErrorKind};

/// Create an HTTP client with the provided CA certificate.
#[inline]
#[allow(unused_mut)] // mut builder unused with --no-default-features
fn get_client(cacert: Option<String>) -> Result<Client, Error> {
    let mut builder = Client::builder();
    #[cfg(any(feature = "native-tls", feature = "rustls"))]
    if let Some(cert_path) = cacert {
        let cert_content = fs::read(&cert_path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot open cacert file {}: {}", cert_path, e),
            )
        })?;

        let cert = Certificate::from_pem(&cert_content).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot parse {} as PEM: {}", cert_path, e),
            )
        })?;

        debug!("Using CA certificate from {}", cert_path);
        builder = builder.add_root_certificate(cert);
    }

    #[cfg(not(any(feature = "native-tls", feature = "rustls")))]
    if cacert.is_some() {
        return Err(Error::new(
            ErrorKind::InvalidConfig,
            "TLS support is disabled",
        ));
    }

    builder.build().map_err(|e| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Cannot initialize HTTP backend: {}", e),
        )
    })
}

/// Register an endpoint override from a `<service>_endpoint_override` option.
///
/// Both the underscore and the dash forms of the service type are registered.
fn add_endpoint_override(
    client: &mut AuthenticatedClient,
    key: &str,
    value: &str,
) -> Result<(), Error> {
    let service_type = key.trim_end_matches("_endpoint_override");
    let url = Url::parse(value)
        .map_err(|e| Error::new(ErrorKind::InvalidConfig, format!("Invalid {}: {}", key, e)))?;
    debug!("Endpoint override for {}: {}", service_type, url);
    let overrides = client.endpoint_overrides_mut();
    let _ = overrides.insert(service_type.to_string(), url.clone());
    // Handle types like block-storage
    let _ = overrides.insert(service_type.replace('_', "-"), url);
    Ok(())
}

mod config;
mod env;

pub use config::from_config;
pub use env::from_env;
