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

//! QoS rule types supported by the loaded drivers.

use serde::Deserialize;
use serde_json::Value;

use crate::{ApiResult, Error, PaginatedResource, Pager, Pagination, ServiceClient};

/// A parameter accepted by a driver for a rule type.
#[derive(Debug, Clone, Deserialize)]
pub struct SupportedParameter {
    /// Parameter name, e.g. `max_kbps`.
    pub parameter_name: String,
    /// Either `range` or `choices`.
    pub parameter_type: String,
    /// Range bounds or a list of choices, depending on the type.
    #[serde(default)]
    pub parameter_values: Value,
}

/// A driver implementing a rule type.
#[derive(Debug, Clone, Deserialize)]
pub struct Driver {
    /// Driver name.
    pub name: String,
    /// Parameters the driver accepts.
    #[serde(default)]
    pub supported_parameters: Vec<SupportedParameter>,
}

/// A QoS rule type.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct RuleType {
    /// Type name, e.g. `bandwidth_limit`.
    #[resource_id]
    #[serde(rename = "type")]
    pub kind: String,
    /// Drivers supporting the type, only returned by [`get`].
    #[serde(default)]
    pub drivers: Vec<Driver>,
}

/// List available rule types.
pub fn list(client: &ServiceClient) -> Result<Pager<RuleType>, Error> {
    let url = client.url(["qos", "rule-types"])?;
    Ok(Pager::new(client, url, Pagination::Single))
}

/// Get a rule type with its drivers.
pub async fn get<S: AsRef<str>>(client: &ServiceClient, name: S) -> ApiResult<RuleType> {
    let response = async {
        let url = client.url(["qos", "rule-types", name.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope("rule_type")
}
