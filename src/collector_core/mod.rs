use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use aws_smithy_types::date_time::{DateTime, Format};
use serde::{Deserialize, Serialize};

use crate::arn;
use crate::context::AccountContext;

/// Sentinel for values the API does not expose.
pub const UNKNOWN: &str = "Unknown";

/// One discovered cloud resource, serialized flat: the core fields plus
/// whatever service-specific extras the collector attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub arn: String,
    pub name: String,
    pub subclass: String,
    pub region: String,
    pub creation_date: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ResourceRecord {
    /// Builds a record from an ARN, deriving `name` and `subclass` from
    /// it. Parse failures land as sentinel strings, never errors.
    pub fn from_arn(resource_arn: impl Into<String>, region: impl Into<String>) -> Self {
        let resource_arn = resource_arn.into();
        Self {
            name: arn::resource_name(&resource_arn),
            subclass: arn::service_code(&resource_arn),
            arn: resource_arn,
            region: region.into(),
            creation_date: UNKNOWN.to_string(),
            extra: BTreeMap::new(),
        }
    }

    pub fn created(mut self, when: impl Into<String>) -> Self {
        self.creation_date = when.into();
        self
    }

    pub fn extra(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Renders an optional SDK timestamp as ISO-8601, or the `Unknown`
/// sentinel when absent or unformattable.
pub fn iso8601(dt: Option<&DateTime>) -> String {
    dt.and_then(|d| d.fmt(Format::DateTime).ok())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Whether a collector's resources are region-scoped or account-wide.
/// Global collectors get exactly one task, pinned to the anchor region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Regional,
}

/// Ordered multimap from service key to the records collected under it.
/// A collector usually buckets under its own key, but may fan out to
/// related keys (elbv2 -> alb/nlb, ec2 -> ec2/vpc).
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Inventory {
    groups: BTreeMap<String, Vec<ResourceRecord>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, record: ResourceRecord) {
        self.groups.entry(key.into()).or_default().push(record);
    }

    /// Merges another inventory into this one, preserving arrival order
    /// within each key. Called only from the orchestrator's
    /// single-threaded merge loop after each task completes.
    pub fn absorb(&mut self, other: Inventory) {
        for (key, mut records) in other.groups {
            self.groups.entry(key).or_default().append(&mut records);
        }
    }

    pub fn total_records(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn service_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<ResourceRecord>> {
        &self.groups
    }
}

/// One service's scan logic: query the provider in one region and
/// normalize everything found into `ResourceRecord`s.
#[async_trait]
pub trait Collector: Send + Sync {
    fn key(&self) -> &'static str;

    fn scope(&self) -> Scope {
        Scope::Regional
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_arn_derives_name_and_subclass() {
        let rec = ResourceRecord::from_arn("arn:aws:s3:::my-bucket", "us-east-1");
        assert_eq!(rec.name, "my-bucket");
        assert_eq!(rec.subclass, "s3");
        assert_eq!(rec.creation_date, UNKNOWN);
    }

    #[test]
    fn from_arn_tolerates_garbage() {
        let rec = ResourceRecord::from_arn("garbage", "eu-west-1");
        assert_eq!(rec.name, arn::INVALID_FORMAT);
        assert_eq!(rec.region, "eu-west-1");
    }

    #[test]
    fn record_serializes_extras_flat() {
        let rec = ResourceRecord::from_arn("arn:aws:ec2:us-east-1:123:instance/i-1", "us-east-1")
            .extra("private_ip", "10.0.0.1");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["private_ip"], "10.0.0.1");
        assert_eq!(json["arn"], "arn:aws:ec2:us-east-1:123:instance/i-1");
    }

    #[test]
    fn absorb_appends_under_shared_keys() {
        let mut a = Inventory::new();
        a.push("ec2", ResourceRecord::from_arn("arn:aws:ec2:r1:1:instance/i-1", "r1"));
        let mut b = Inventory::new();
        b.push("ec2", ResourceRecord::from_arn("arn:aws:ec2:r2:1:instance/i-2", "r2"));
        b.push("vpc", ResourceRecord::from_arn("arn:aws:ec2:r2:1:vpc/v-1", "r2"));
        a.absorb(b);
        assert_eq!(a.groups()["ec2"].len(), 2);
        assert_eq!(a.groups()["vpc"].len(), 1);
        assert_eq!(a.total_records(), 3);
    }
}
