use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_elasticache as elasticache;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

/// Cache clusters plus replication groups, bucketed separately. Neither
/// API returns an ARN, so both are constructed.
pub struct ElastiCacheCollector;

/// `address:port`, or nothing when the endpoint has no address.
fn endpoint_string(endpoint: Option<&elasticache::types::Endpoint>) -> Option<String> {
    let endpoint = endpoint?;
    let address = endpoint.address()?;
    Some(format!("{}:{}", address, endpoint.port()))
}

#[async_trait]
impl Collector for ElastiCacheCollector {
    fn key(&self) -> &'static str {
        "elasticache"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = elasticache::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();
        self.cache_clusters(&client, region, ctx, &mut inv).await;
        self.replication_groups(&client, region, ctx, &mut inv).await;
        Ok(inv)
    }
}

impl ElastiCacheCollector {
    async fn cache_clusters(
        &self,
        client: &elasticache::Client,
        region: &str,
        ctx: &AccountContext,
        inv: &mut Inventory,
    ) {
        let mut marker: Option<String> = None;
        loop {
            let mut req = client.describe_cache_clusters().show_cache_node_info(true);
            if let Some(m) = marker.as_deref() {
                req = req.marker(m);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "DescribeCacheClusters", &err);
                    return;
                }
            };

            for cluster in resp.cache_clusters() {
                let Some(id) = cluster.cache_cluster_id() else { continue };
                let endpoint = endpoint_string(cluster.configuration_endpoint())
                    .or_else(|| {
                        endpoint_string(cluster.cache_nodes().first().and_then(|n| n.endpoint()))
                    })
                    .unwrap_or_else(|| UNKNOWN.to_string());
                let arn = format!(
                    "arn:aws:elasticache:{region}:{}:cluster:{id}",
                    ctx.account_id()
                );
                let record = ResourceRecord::from_arn(arn, region)
                    .created(iso8601(cluster.cache_cluster_create_time()))
                    .extra("id", id)
                    .extra("engine", cluster.engine().unwrap_or(UNKNOWN))
                    .extra("status", cluster.cache_cluster_status().unwrap_or(UNKNOWN))
                    .extra("endpoint", endpoint);
                inv.push(self.key(), record);
            }

            marker = resp.marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }
    }

    async fn replication_groups(
        &self,
        client: &elasticache::Client,
        region: &str,
        ctx: &AccountContext,
        inv: &mut Inventory,
    ) {
        let mut marker: Option<String> = None;
        loop {
            let mut req = client.describe_replication_groups();
            if let Some(m) = marker.as_deref() {
                req = req.marker(m);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "DescribeReplicationGroups", &err);
                    return;
                }
            };

            for group in resp.replication_groups() {
                let Some(id) = group.replication_group_id() else { continue };
                let endpoint = endpoint_string(group.configuration_endpoint())
                    .or_else(|| {
                        endpoint_string(
                            group.node_groups().first().and_then(|n| n.primary_endpoint()),
                        )
                    })
                    .unwrap_or_else(|| UNKNOWN.to_string());
                let arn = format!(
                    "arn:aws:elasticache:{region}:{}:replicationgroup:{id}",
                    ctx.account_id()
                );
                let record = ResourceRecord::from_arn(arn, region)
                    .extra("id", id)
                    .extra("description", group.description().unwrap_or("No description"))
                    .extra("status", group.status().unwrap_or(UNKNOWN))
                    .extra("endpoint", endpoint);
                inv.push("elasticache_replication_group", record);
            }

            marker = resp.marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_string_joins_address_and_port() {
        let endpoint = elasticache::types::Endpoint::builder()
            .address("redis.abc123.cache.amazonaws.com")
            .port(6379)
            .build();
        assert_eq!(
            endpoint_string(Some(&endpoint)),
            Some("redis.abc123.cache.amazonaws.com:6379".to_string())
        );
    }

    #[test]
    fn endpoint_string_requires_an_address() {
        let endpoint = elasticache::types::Endpoint::builder().port(6379).build();
        assert_eq!(endpoint_string(Some(&endpoint)), None);
        assert_eq!(endpoint_string(None), None);
    }
}

