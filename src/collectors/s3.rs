use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3 as s3;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, Scope};
use crate::context::AccountContext;
use crate::errors;

/// Bucket listing is account-wide, so this collector runs once against
/// the anchor region; each record carries the bucket's own region.
pub struct S3Collector;

#[async_trait]
impl Collector for S3Collector {
    fn key(&self) -> &'static str {
        "s3"
    }

    fn scope(&self) -> Scope {
        Scope::Global
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = s3::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let resp = match client.list_buckets().send().await {
            Ok(resp) => resp,
            Err(err) => {
                errors::report(self.key(), region, "ListBuckets", &err);
                return Ok(inv);
            }
        };

        for bucket in resp.buckets() {
            let Some(name) = bucket.name() else { continue };

            // Per-bucket location lookup is best-effort enrichment.
            let bucket_region = match client.get_bucket_location().bucket(name).send().await {
                Ok(loc) => loc
                    .location_constraint()
                    .map(|c| c.as_str().to_string())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "us-east-1".to_string()),
                Err(err) => {
                    errors::report(self.key(), region, "GetBucketLocation", &err);
                    "us-east-1".to_string()
                }
            };
            let endpoint = if bucket_region == "us-east-1" {
                format!("https://{name}.s3.amazonaws.com")
            } else {
                format!("https://{name}.s3.{bucket_region}.amazonaws.com")
            };

            let record = ResourceRecord::from_arn(format!("arn:aws:s3:::{name}"), bucket_region)
                .created(iso8601(bucket.creation_date()))
                .extra("endpoint", endpoint);
            inv.push(self.key(), record);
        }

        Ok(inv)
    }
}
