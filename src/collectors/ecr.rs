use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_ecr as ecr;
use tracing::debug;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, UNKNOWN};
use crate::context::AccountContext;
use crate::errors;

pub struct EcrCollector;

#[async_trait]
impl Collector for EcrCollector {
    fn key(&self) -> &'static str {
        "ecr"
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = ecr::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();

        let mut token: Option<String> = None;
        loop {
            let mut req = client.describe_repositories();
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "DescribeRepositories", &err);
                    break;
                }
            };

            for repo in resp.repositories() {
                let Some(arn) = repo.repository_arn() else { continue };
                let name = repo.repository_name().unwrap_or_default();
                let image_count = self.count_images(&client, region, name).await;

                let record = ResourceRecord::from_arn(arn, region)
                    .created(iso8601(repo.created_at()))
                    .extra("repo_name", name)
                    .extra("uri", repo.repository_uri().unwrap_or(UNKNOWN))
                    .extra("image_count", image_count);
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

impl EcrCollector {
    /// Best-effort image count; a failed page leaves the count where it
    /// got to.
    async fn count_images(&self, client: &ecr::Client, region: &str, repo_name: &str) -> usize {
        let mut count = 0usize;
        let mut token: Option<String> = None;
        loop {
            let mut req = client.describe_images().repository_name(repo_name);
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            match req.send().await {
                Ok(page) => {
                    count += page.image_details().len();
                    token = page.next_token().map(str::to_string);
                    if token.is_none() {
                        break;
                    }
                }
                Err(err) => {
                    debug!(region, repo = repo_name, error = ?err, "DescribeImages failed");
                    break;
                }
            }
        }
        count
    }
}
