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

//! Rules of QoS policies.
//!
//! All operations are generic over the kind of the rule:
//!
//! ```rust,no_run
//! use osclient::networking::qos::rules::{self, BandwidthLimitRule, BandwidthLimitRuleCreateOpts};
//!
//! # async fn example(network: osclient::ServiceClient) -> Result<(), osclient::Error> {
//! let policy_id = "501005fa-3b56-4061-aaca-3f24995112e1";
//! let opts = BandwidthLimitRuleCreateOpts {
//!     max_kbps: 2000,
//!     max_burst_kbps: Some(200),
//!     ..Default::default()
//! };
//! let rule = rules::create(&network, policy_id, &opts).await.extract()?;
//!
//! let all = rules::list::<BandwidthLimitRule>(&network, policy_id, Default::default())?
//!     .all_pages()
//!     .await?;
//! rules::delete::<BandwidthLimitRule, _, _>(&network, policy_id, rule.id).await.extract_err()?;
//! # Ok(()) }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Direction;
use crate::common::SortDir;
use crate::{
    build_request_body, require, with_query, ApiResult, BodyBuilder, Error, PaginatedResource,
    Pager, Pagination, ServiceClient,
};

/// A kind of QoS rule.
pub trait QosRule: PaginatedResource<Id = String> {
    /// Path segment of the rule collection under a policy.
    const PATH: &'static str;

    /// Envelope key of a single rule.
    const ENVELOPE: &'static str;
}

/// Options for creating or updating a rule of a known kind.
pub trait RuleBuilder: BodyBuilder {
    /// The kind of rule produced.
    type Rule: QosRule;
}

/// A bandwidth limit rule.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct BandwidthLimitRule {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Maximum bandwidth in kbps.
    pub max_kbps: u32,
    /// Maximum burst size in kilobits.
    #[serde(default)]
    pub max_burst_kbps: u32,
    /// Traffic direction, egress if not reported.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QosRule for BandwidthLimitRule {
    const PATH: &'static str = "bandwidth_limit_rules";
    const ENVELOPE: &'static str = "bandwidth_limit_rule";
}

/// A DSCP marking rule.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct DscpMarkingRule {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// DSCP mark value.
    pub dscp_mark: u8,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QosRule for DscpMarkingRule {
    const PATH: &'static str = "dscp_marking_rules";
    const ENVELOPE: &'static str = "dscp_marking_rule";
}

/// A minimum bandwidth rule.
#[derive(Debug, Clone, Deserialize, PaginatedResource)]
pub struct MinimumBandwidthRule {
    /// Unique ID.
    #[resource_id]
    pub id: String,
    /// Guaranteed bandwidth in kbps.
    pub min_kbps: u32,
    /// Direction of the traffic.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QosRule for MinimumBandwidthRule {
    const PATH: &'static str = "minimum_bandwidth_rules";
    const ENVELOPE: &'static str = "minimum_bandwidth_rule";
}

/// Filters for listing rules.
///
/// Only the filters relevant to the listed kind are taken into account by the server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOpts {
    /// Filter by ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Filter by maximum bandwidth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_kbps: Option<u32>,
    /// Filter by maximum burst.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_burst_kbps: Option<u32>,
    /// Filter by minimum bandwidth.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_kbps: Option<u32>,
    /// Filter by DSCP mark.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dscp_mark: Option<u8>,
    /// Filter by direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// ID of the item to start after.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    /// Field to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDir>,
}

/// Options for creating a bandwidth limit rule.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BandwidthLimitRuleCreateOpts {
    /// Maximum bandwidth in kbps (required).
    pub max_kbps: u32,
    /// Maximum burst in kilobits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_burst_kbps: Option<u32>,
    /// Direction of the traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl BodyBuilder for BandwidthLimitRuleCreateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.max_kbps, "max_kbps")?;
        build_request_body(self, Some(BandwidthLimitRule::ENVELOPE))
    }
}

impl RuleBuilder for BandwidthLimitRuleCreateOpts {
    type Rule = BandwidthLimitRule;
}

/// Options for updating a bandwidth limit rule.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BandwidthLimitRuleUpdateOpts {
    /// Maximum bandwidth in kbps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_kbps: Option<u32>,
    /// Maximum burst in kilobits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_burst_kbps: Option<u32>,
    /// Direction of the traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl BodyBuilder for BandwidthLimitRuleUpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some(BandwidthLimitRule::ENVELOPE))
    }
}

impl RuleBuilder for BandwidthLimitRuleUpdateOpts {
    type Rule = BandwidthLimitRule;
}

/// Options for creating or updating a DSCP marking rule.
///
/// Zero is a valid mark, so the value is always sent.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DscpMarkingRuleOpts {
    /// DSCP mark value.
    pub dscp_mark: u8,
}

impl BodyBuilder for DscpMarkingRuleOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some(DscpMarkingRule::ENVELOPE))
    }
}

impl RuleBuilder for DscpMarkingRuleOpts {
    type Rule = DscpMarkingRule;
}

/// Options for creating a minimum bandwidth rule.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MinimumBandwidthRuleCreateOpts {
    /// Guaranteed bandwidth in kbps (required).
    pub min_kbps: u32,
    /// Direction of the traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl BodyBuilder for MinimumBandwidthRuleCreateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        require(&self.min_kbps, "min_kbps")?;
        build_request_body(self, Some(MinimumBandwidthRule::ENVELOPE))
    }
}

impl RuleBuilder for MinimumBandwidthRuleCreateOpts {
    type Rule = MinimumBandwidthRule;
}

/// Options for updating a minimum bandwidth rule.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MinimumBandwidthRuleUpdateOpts {
    /// Minimum guaranteed bandwidth in kbps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_kbps: Option<u32>,
    /// Direction of the traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl BodyBuilder for MinimumBandwidthRuleUpdateOpts {
    fn to_body(&self) -> Result<Value, Error> {
        build_request_body(self, Some(MinimumBandwidthRule::ENVELOPE))
    }
}

impl RuleBuilder for MinimumBandwidthRuleUpdateOpts {
    type Rule = MinimumBandwidthRule;
}

/// List rules of one kind in a policy.
pub fn list<R: QosRule>(
    client: &ServiceClient,
    policy_id: &str,
    opts: ListOpts,
) -> Result<Pager<R>, Error> {
    let url = client.url(["qos", "policies", policy_id, R::PATH])?;
    Ok(Pager::new(client, with_query(url, &opts)?, Pagination::Linked))
}

/// Get a rule.
pub async fn get<R, S1, S2>(client: &ServiceClient, policy_id: S1, rule_id: S2) -> ApiResult<R>
where
    R: QosRule,
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let url = client.url(["qos", "policies", policy_id.as_ref(), R::PATH, rule_id.as_ref()])?;
        client.get(url).send().await
    };
    ApiResult::new(response.await).with_envelope(R::ENVELOPE)
}

/// Create a rule in a policy.
pub async fn create<B, S>(client: &ServiceClient, policy_id: S, opts: &B) -> ApiResult<B::Rule>
where
    B: RuleBuilder,
    S: AsRef<str>,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url(["qos", "policies", policy_id.as_ref(), B::Rule::PATH])?;
        client.post(url).ok_codes([201]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope(B::Rule::ENVELOPE)
}

/// Update a rule.
pub async fn update<B, S1, S2>(
    client: &ServiceClient,
    policy_id: S1,
    rule_id: S2,
    opts: &B,
) -> ApiResult<B::Rule>
where
    B: RuleBuilder,
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let body = opts.to_body()?;
        let url = client.url([
            "qos",
            "policies",
            policy_id.as_ref(),
            B::Rule::PATH,
            rule_id.as_ref(),
        ])?;
        client.put(url).ok_codes([200]).json(&body).send().await
    };
    ApiResult::new(response.await).with_envelope(B::Rule::ENVELOPE)
}

/// Delete a rule.
pub async fn delete<R, S1, S2>(client: &ServiceClient, policy_id: S1, rule_id: S2) -> ApiResult<()>
where
    R: QosRule,
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    let response = async {
        let url = client.url(["qos", "policies", policy_id.as_ref(), R::PATH, rule_id.as_ref()])?;
        client.delete(url).ok_codes([204]).send().await
    };
    ApiResult::new(response.await)
}
