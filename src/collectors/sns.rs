use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_sns as sns;

use crate::collector_core::{Collector, Inventory, ResourceRecord};
use crate::context::AccountContext;
use crate::errors;

pub struct SnsCollector;

#[async_trait]
impl Collector for SnsCollector {
    fn key(&self) -> &'static str {
        "sns"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = sns::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut token: Option<String> = None;
        loop {
            let mut req = client.list_topics();
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListTopics", &err);
                    break;
                }
            };

            for topic in resp.topics() {
                let Some(arn) = topic.topic_arn() else { continue };
                inv.push(self.key(), ResourceRecord::from_arn(arn, region));
            }

            token = resp.next_token().map(str::to_string);
            if token.is_none() {
                break;
            }
        }

        Ok(inv)
    }
}
