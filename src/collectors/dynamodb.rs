use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_dynamodb as dynamodb;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

pub struct DynamoDbCollector;

#[async_trait]
impl Collector for DynamoDbCollector {
    fn key(&self) -> &'static str {
        "dynamodb"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = dynamodb::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut start: Option<String> = None;
        loop {
            let mut req = client.list_tables();
            if let Some(s) = start.as_deref() {
                req = req.exclusive_start_table_name(s);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListTables", &err);
                    break;
                }
            };

            for table_name in resp.table_names() {
                let arn = format!(
                    "arn:aws:dynamodb:{region}:{}:table/{table_name}",
                    ctx.account_id()
                );
                // Creation date is best-effort enrichment; the table
                // record survives a failed describe.
                let created = match client
                    .describe_table()
                    .table_name(table_name.as_str())
                    .send()
                    .await
                {
                    Ok(details) => iso8601(details.table().and_then(|t| t.creation_date_time())),
                    Err(err) => {
                        errors::report(self.key(), region, "DescribeTable", &err);
                        UNKNOWN.to_string()
                    }
                };
                inv.push(self.key(), ResourceRecord::from_arn(arn, region).created(created));
            }

            start = resp.last_evaluated_table_name().map(str::to_string);
            if start.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
