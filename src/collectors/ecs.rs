use std::collections::BTreeSet;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_ecs as ecs;
use serde_json::json;

use crate::collector_core::{Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

/// ECS clusters, enriched with a sample of their services and task
/// definitions. Enrichment failures never drop the cluster record.
pub struct EcsCollector;

#[async_trait]
impl Collector for EcsCollector {
    fn key(&self) -> &'static str {
        "ecs"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = ecs::Client::new(&ctx.for_region(region));
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

            for cluster_arn in resp.cluster_arns() {
                let details = match client
                    .describe_clusters()
                    .clusters(cluster_arn.as_str())
                    .send()
                    .await
                {
                    Ok(details) => details,
                    Err(err) => {
                        errors::report(self.key(), region, "DescribeClusters", &err);
                        continue;
                    }
                };
                let Some(cluster) = details.clusters().first() else { continue };
                let cluster_name = cluster.cluster_name().unwrap_or(UNKNOWN).to_string();

                let mut services: Vec<String> = Vec::new();
                if let Ok(svc_resp) = client
                    .list_services()
                    .cluster(cluster_arn.as_str())
                    .send()
                    .await
                {
                    services.extend(svc_resp.service_arns().iter().cloned());
                }

                let mut task_defs: BTreeSet<String> = BTreeSet::new();
                if !services.is_empty() {
                    let mut req = client.describe_services().cluster(cluster_arn.as_str());
                    for service in services.iter().take(10) {
                        req = req.services(service.as_str());
                    }
                    if let Ok(svc_details) = req.send().await {
                        for service in svc_details.services() {
                            if let Some(td) = service.task_definition() {
                                task_defs.insert(td.to_string());
                            }
                        }
                    }
                }

                let record = ResourceRecord::from_arn(cluster_arn.as_str(), region)
                    .extra("cluster_name", cluster_name)
                    .extra("service_count", services.len())
                    .extra("services", json!(services.iter().take(5).collect::<Vec<_>>()))
                    .extra(
                        "task_definitions",
                        json!(task_defs.iter().take(5).collect::<Vec<_>>()),
                    );
                inv.push(self.key(), record);
            }

            token = resp.next_token().map(str::to_string);
            if token.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
