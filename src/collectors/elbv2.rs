use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_elasticloadbalancingv2 as elbv2;
use aws_sdk_elasticloadbalancingv2::types::LoadBalancerTypeEnum;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

/// Application and network load balancers, bucketed under `alb` and
/// `nlb`. Gateway load balancers are not inventoried.
pub struct ElbV2Collector;

#[async_trait]
impl Collector for ElbV2Collector {
    fn key(&self) -> &'static str {
        "elbv2"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = elbv2::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut marker: Option<String> = None;
        loop {
            let mut req = client.describe_load_balancers();
            if let Some(m) = marker.as_deref() {
                req = req.marker(m);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "DescribeLoadBalancers", &err);
                    break;
                }
            };

            for lb in resp.load_balancers() {
                let Some(arn) = lb.load_balancer_arn() else { continue };
                let bucket = match lb.r#type() {
                    Some(LoadBalancerTypeEnum::Application) => "alb",
                    Some(LoadBalancerTypeEnum::Network) => "nlb",
                    _ => continue,
                };
                let record = ResourceRecord::from_arn(arn, region)
                    .created(iso8601(lb.created_time()))
                    .extra("endpoint", lb.dns_name().unwrap_or(UNKNOWN))
                    .extra("scheme", lb.scheme().map(|s| s.as_str()).unwrap_or(UNKNOWN));
                inv.push(bucket, record);
            }

            marker = resp.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
