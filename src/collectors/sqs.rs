use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_sqs as sqs;
use aws_sdk_sqs::types::QueueAttributeName;

use crate::collector_core::{Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

pub struct SqsCollector;

#[async_trait]
impl Collector for SqsCollector {
    fn key(&self) -> &'static str {
        "sqs"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = sqs::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut token: Option<String> = None;
        loop {
            let mut req = client.list_queues();
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListQueues", &err);
                    break;
                }
            };

            for url in resp.queue_urls() {
                // The queue ARN only comes from the attributes call; a
                // failed lookup loses this queue, not the page.
                let attrs = match client
                    .get_queue_attributes()
                    .queue_url(url.as_str())
                    .attribute_names(QueueAttributeName::QueueArn)
                    .attribute_names(QueueAttributeName::CreatedTimestamp)
                    .send()
                    .await
                {
                    Ok(attrs) => attrs,
                    Err(err) => {
                        errors::report(self.key(), region, "GetQueueAttributes", &err);
                        continue;
                    }
                };
                let Some(map) = attrs.attributes() else { continue };
                let Some(arn) = map.get(&QueueAttributeName::QueueArn) else { continue };

                let created = map
                    .get(&QueueAttributeName::CreatedTimestamp)
                    .and_then(|s| s.parse::<i64>().ok())
                    .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
                    .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
                    .unwrap_or_else(|| UNKNOWN.to_string());

                inv.push(
                    self.key(),
                    ResourceRecord::from_arn(arn.as_str(), region).created(created),
                );
            }

            token = resp.next_token().map(str::to_string);
            if token.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
