use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_elasticloadbalancing as elb;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

/// Classic load balancers. The API returns no ARN, so one is
/// constructed from the balancer name.
pub struct ClassicElbCollector;

#[async_trait]
impl Collector for ClassicElbCollector {
    fn key(&self) -> &'static str {
        "elb"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = elb::Client::new(&ctx.for_region(region));
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

            for lb in resp.load_balancer_descriptions() {
                let Some(name) = lb.load_balancer_name() else { continue };
                let arn = format!(
                    "arn:aws:elasticloadbalancing:{region}:{}:loadbalancer/{name}",
                    ctx.account_id()
                );
                let record = ResourceRecord::from_arn(arn, region)
                    .created(iso8601(lb.created_time()))
                    .extra("endpoint", lb.dns_name().unwrap_or(UNKNOWN))
                    .extra("scheme", lb.scheme().unwrap_or(UNKNOWN));
                inv.push("classic_elb", record);
            }

            marker = resp.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
