use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_cloudformation as cloudformation;
use aws_sdk_cloudformation::types::StackStatus;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord};
use crate::context::AccountContext;
use crate::errors;

pub struct CloudFormationCollector;

#[async_trait]
impl Collector for CloudFormationCollector {
    fn key(&self) -> &'static str {
        "cloudformation"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = cloudformation::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut token: Option<String> = None;
        loop {
            let mut req = client.list_stacks();
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListStacks", &err);
                    break;
                }
            };

            for stack in resp.stack_summaries() {
                if *stack.stack_status() == StackStatus::DeleteComplete {
                    continue;
                }
                let Some(arn) = stack.stack_id() else { continue };
                let record = ResourceRecord::from_arn(arn, region)
                    .created(iso8601(Some(stack.creation_time())));
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
