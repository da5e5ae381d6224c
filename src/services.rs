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

//! OpenStack service types.

use std::fmt::Debug;

use http::{HeaderName, HeaderValue};

use super::{ApiVersion, Error, ErrorKind};

/// Trait representing a service type.
pub trait ServiceType: Debug + Send + Sync {
    /// Service type to pass to the catalog.
    fn catalog_type(&self) -> &'static str;

    /// Path to append to the endpoint if it is not already there.
    ///
    /// Endpoints of some services (e.g. Networking) are registered without a version.
    fn version_path(&self) -> Option<&'static str> {
        None
    }

    /// Header to send to request the given microversion.
    ///
    /// The default implementation fails with `IncompatibleApiVersion`.
    fn api_version_header(&self, _version: ApiVersion) -> Result<(HeaderName, HeaderValue), Error> {
        Err(Error::new(
            ErrorKind::IncompatibleApiVersion,
            format!(
                "The {} service does not support API versions",
                self.catalog_type()
            ),
        ))
    }
}

/// A generic service.
#[derive(Copy, Clone, Debug)]
pub struct GenericService {
    catalog_type: &'static str,
    version_path: Option<&'static str>,
}

impl GenericService {
    /// Create a new generic service.
    pub const fn new(catalog_type: &'static str, version_path: Option<&'static str>) -> GenericService {
        GenericService {
            catalog_type,
            version_path,
        }
    }
}

impl ServiceType for GenericService {
    fn catalog_type(&self) -> &'static str {
        self.catalog_type
    }

    fn version_path(&self) -> Option<&'static str> {
        self.version_path
    }
}

/// The Block Storage service.
#[derive(Copy, Clone, Debug)]
pub struct BlockStorageService {
    __use_new: (),
}

impl BlockStorageService {
    /// Create a Block Storage service type.
    pub const fn new() -> BlockStorageService {
        BlockStorageService { __use_new: () }
    }
}

impl ServiceType for BlockStorageService {
    fn catalog_type(&self) -> &'static str {
        "block-storage"
    }

    fn api_version_header(&self, version: ApiVersion) -> Result<(HeaderName, HeaderValue), Error> {
        let value = HeaderValue::from_str(&format!("volume {}", version))?;
        Ok((HeaderName::from_static("openstack-api-version"), value))
    }
}

/// Block Storage service (v3).
pub const BLOCK_STORAGE: BlockStorageService = BlockStorageService::new();

/// Identity service.
pub const IDENTITY: GenericService = GenericService::new("identity", None);

/// Networking service.
pub const NETWORK: GenericService = GenericService::new("network", Some("v2.0"));

/// Object Storage service.
pub const OBJECT_STORAGE: GenericService = GenericService::new("object-store", None);

#[cfg(test)]
pub mod test {
    use super::{ServiceType, BLOCK_STORAGE, NETWORK, OBJECT_STORAGE};
    use crate::{ApiVersion, ErrorKind};

    #[test]
    fn test_block_storage_header() {
        let (name, value) = BLOCK_STORAGE.api_version_header(ApiVersion(3, 59)).unwrap();
        assert_eq!(name.as_str(), "openstack-api-version");
        assert_eq!(value.to_str().unwrap(), "volume 3.59");
    }

    #[test]
    fn test_generic_no_microversions() {
        let e = OBJECT_STORAGE
            .api_version_header(ApiVersion(1, 0))
            .err()
            .unwrap();
        assert_eq!(e.kind(), ErrorKind::IncompatibleApiVersion);
        assert_eq!(NETWORK.version_path(), Some("v2.0"));
        assert_eq!(OBJECT_STORAGE.version_path(), None);
    }
}
