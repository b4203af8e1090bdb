use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_eks as eks;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

pub struct EksCollector;

#[async_trait]
impl Collector for EksCollector {
    fn key(&self) -> &'static str {
        "eks"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = eks::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut token: Option<String> = None;
        loop {
            let mut req = client.list_clusters();
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListClusters", &err);
                    break;
                }
            };

            for name in resp.clusters() {
                match client.describe_cluster().name(name.as_str()).send().await {
                    Ok(details) => {
                        let Some(cluster) = details.cluster() else { continue };
                        let Some(arn) = cluster.arn() else { continue };
                        let record = ResourceRecord::from_arn(arn, region)
                            .created(iso8601(cluster.created_at()))
                            .extra("cluster_name", cluster.name().unwrap_or(name.as_str()))
                            .extra("endpoint", cluster.endpoint().unwrap_or(UNKNOWN))
                            .extra("version", cluster.version().unwrap_or(UNKNOWN));
                        inv.push(self.key(), record);
                    }
                    Err(err) => {
                        // Keep a minimal record with a constructed ARN
                        // when the describe call is denied.
                        errors::report(self.key(), region, "DescribeCluster", &err);
                        let arn =
                            format!("arn:aws:eks:{region}:{}:cluster/{name}", ctx.account_id());
                        let record = ResourceRecord::from_arn(arn, region)
                            .extra("cluster_name", name.as_str());
                        inv.push(self.key(), record);
                    }
                }
            }

            token = resp.next_token().map(str::to_string);
            if token.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
