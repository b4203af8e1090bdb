use anyhow::{bail, Result};
use aws_sdk_ec2 as ec2;
use tracing::{info, warn};

use crate::context::AccountContext;

/// Region used for region discovery and for global-service tasks.
pub const ANCHOR_REGION: &str = "us-east-1";

/// Major regions used when DescribeRegions itself is unavailable.
const FALLBACK_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "eu-north-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-south-1",
    "sa-east-1",
];

/// Resolves the set of regions to scan: DescribeRegions against the
/// anchor region, falling back to the static list on any failure. An
/// empty result from both paths is fatal.
pub async fn resolve(ctx: &AccountContext) -> Result<Vec<String>> {
    let regions = match describe_regions(ctx).await {
        Ok(regions) if !regions.is_empty() => regions,
        Ok(_) => {
            warn!("DescribeRegions returned no regions, using fallback list");
            fallback()
        }
        Err(err) => {
            warn!(error = %err, "DescribeRegions failed, using fallback list");
            fallback()
        }
    };
    if regions.is_empty() {
        bail!("no regions available to scan");
    }
    info!(count = regions.len(), "resolved region list");
    Ok(regions)
}

async fn describe_regions(ctx: &AccountContext) -> Result<Vec<String>> {
    let client = ec2::Client::new(&ctx.for_region(ANCHOR_REGION));
    let resp = client.describe_regions().send().await?;
    Ok(resp
        .regions()
        .iter()
        .filter_map(|r| r.region_name().map(str::to_string))
        .collect())
}

fn fallback() -> Vec<String> {
    FALLBACK_REGIONS.iter().map(|r| r.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_list_is_nonempty_and_contains_anchor() {
        let regions = fallback();
        assert!(!regions.is_empty());
        assert!(regions.iter().any(|r| r == ANCHOR_REGION));
    }
}
