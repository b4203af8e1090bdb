use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_ec2 as ec2;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

/// Instances and VPCs. The two listings are guarded independently so a
/// failure in one does not block the other.
pub struct Ec2Collector;

#[async_trait]
impl Collector for Ec2Collector {
    fn key(&self) -> &'static str {
        "ec2"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = ec2::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();
        self.instances(&client, region, ctx, &mut inv).await;
        self.vpcs(&client, region, ctx, &mut inv).await;
        Ok(inv)
    }
}

impl Ec2Collector {
    async fn instances(
        &self,
        client: &ec2::Client,
        region: &str,
        ctx: &AccountContext,
        inv: &mut Inventory,
    ) {
        let mut token: Option<String> = None;
        loop {
            let mut req = client.describe_instances();
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "DescribeInstances", &err);
                    return;
                }
            };

            for reservation in resp.reservations() {
                for instance in reservation.instances() {
                    let Some(instance_id) = instance.instance_id() else { continue };
                    let arn = format!(
                        "arn:aws:ec2:{region}:{}:instance/{instance_id}",
                        ctx.account_id()
                    );
                    let record = ResourceRecord::from_arn(arn, region)
                        .created(iso8601(instance.launch_time()))
                        .extra("private_ip", instance.private_ip_address().unwrap_or("None"))
                        .extra("public_ip", instance.public_ip_address().unwrap_or("None"));
                    inv.push(self.key(), record);
                }
            }

            token = resp.next_token().map(str::to_string);
            if token.is_none() {
                break;
            }
        }
    }

    async fn vpcs(
        &self,
        client: &ec2::Client,
        region: &str,
        ctx: &AccountContext,
        inv: &mut Inventory,
    ) {
        let mut token: Option<String> = None;
        loop {
            let mut req = client.describe_vpcs();
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "DescribeVpcs", &err);
                    return;
                }
            };

            for vpc in resp.vpcs() {
                let Some(vpc_id) = vpc.vpc_id() else { continue };
                let arn = format!("arn:aws:ec2:{region}:{}:vpc/{vpc_id}", ctx.account_id());
                let record = ResourceRecord::from_arn(arn, region)
                    .extra("cidr", vpc.cidr_block().unwrap_or(UNKNOWN));
                inv.push("vpc", record);
            }

            token = resp.next_token().map(str::to_string);
            if token.is_none() {
                break;
            }
        }
    }
}
