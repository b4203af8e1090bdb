use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_rds as rds;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord};
use crate::context::AccountContext;
use crate::errors;

pub struct RdsCollector;

#[async_trait]
impl Collector for RdsCollector {
    fn key(&self) -> &'static str {
        "rds"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = rds::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut marker: Option<String> = None;
        loop {
            let mut req = client.describe_db_instances();
            if let Some(m) = marker.as_deref() {
                req = req.marker(m);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "DescribeDBInstances", &err);
                    break;
                }
            };

            for instance in resp.db_instances() {
                let Some(arn) = instance.db_instance_arn() else { continue };
                let record = ResourceRecord::from_arn(arn, region)
                    .created(iso8601(instance.instance_create_time()));
                inv.push(self.key(), record);
            }

            marker = resp.marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
