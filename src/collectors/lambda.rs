use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_lambda as lambda;

use crate::collector_core::{Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

pub struct LambdaCollector;

#[async_trait]
impl Collector for LambdaCollector {
    fn key(&self) -> &'static str {
        "lambda"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = lambda::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut marker: Option<String> = None;
        loop {
            let mut req = client.list_functions();
            if let Some(m) = marker.as_deref() {
                req = req.marker(m);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListFunctions", &err);
                    break;
                }
            };

            for function in resp.functions() {
                let Some(arn) = function.function_arn() else { continue };
                let record = ResourceRecord::from_arn(arn, region)
                    .created(function.last_modified().unwrap_or(UNKNOWN));
                inv.push(self.key(), record);
            }

            marker = resp.next_marker().map(str::to_string);
            if marker.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
