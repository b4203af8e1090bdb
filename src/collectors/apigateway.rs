use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_apigateway as apigateway;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord};
use crate::context::AccountContext;
use crate::errors;

/// REST APIs (API Gateway v1).
pub struct ApiGatewayCollector;

#[async_trait]
impl Collector for ApiGatewayCollector {
    fn key(&self) -> &'static str {
        "apigateway"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = apigateway::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut position: Option<String> = None;
        loop {
            let mut req = client.get_rest_apis();
            if let Some(p) = position.as_deref() {
                req = req.position(p);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "GetRestApis", &err);
                    break;
                }
            };

            for api in resp.items() {
                let Some(id) = api.id() else { continue };
                let arn = format!(
                    "arn:aws:apigateway:{region}:{}:/restapis/{id}",
                    ctx.account_id()
                );
                let record =
                    ResourceRecord::from_arn(arn, region).created(iso8601(api.created_date()));
                inv.push(self.key(), record);
            }

            position = resp.position().map(str::to_string);
            if position.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
