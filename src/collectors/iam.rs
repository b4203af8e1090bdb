use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_iam as iam;
use aws_sdk_iam::types::PolicyScopeType;

use crate::collector_core::{iso8601, Collector, Inventory, ResourceRecord, Scope};
use crate::context::AccountContext;
use crate::errors;

/// IAM resources are account-wide; records carry the `global` pseudo
/// region. Roles, users, and customer-managed policies are listed
/// independently so one denied listing does not block the others.
pub struct IamCollector;

const GLOBAL_REGION: &str = "global";

#[async_trait]
impl Collector for IamCollector {
    fn key(&self) -> &'static str {
        "iam"
    }

    fn scope(&self) -> Scope {
        Scope::Global
    }

    async fn collect(&self, region: &str, ctx: &AccountContext) -> Result<Inventory> {
        let client = iam::Client::new(&ctx.for_region(region));
        let mut inv = Inventory::new();
        self.roles(&client, region, &mut inv).await;
        self.users(&client, region, &mut inv).await;
        self.policies(&client, region, &mut inv).await;
        Ok(inv)
    }
}

impl IamCollector {
    async fn roles(&self, client: &iam::Client, region: &str, inv: &mut Inventory) {
        let mut marker: Option<String> = None;
        loop {
            let mut req = client.list_roles();
            if let Some(m) = marker.as_deref() {
                req = req.marker(m);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListRoles", &err);
                    return;
                }
            };

            for role in resp.roles() {
                let record = ResourceRecord::from_arn(role.arn(), GLOBAL_REGION)
                    .created(iso8601(Some(role.create_date())))
                    .extra("item_type", "role");
                inv.push(self.key(), record);
            }

            marker = if resp.is_truncated() {
                resp.marker().map(str::to_string)
            } else {
                None
            };
            if marker.is_none() {
                break;
            }
        }
    }

    async fn users(&self, client: &iam::Client, region: &str, inv: &mut Inventory) {
        let mut marker: Option<String> = None;
        loop {
            let mut req = client.list_users();
            if let Some(m) = marker.as_deref() {
                req = req.marker(m);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListUsers", &err);
                    return;
                }
            };

            for user in resp.users() {
                let record = ResourceRecord::from_arn(user.arn(), GLOBAL_REGION)
                    .created(iso8601(Some(user.create_date())))
                    .extra("item_type", "user");
                inv.push(self.key(), record);
            }

            marker = if resp.is_truncated() {
                resp.marker().map(str::to_string)
            } else {
                None
            };
            if marker.is_none() {
                break;
            }
        }
    }

    async fn policies(&self, client: &iam::Client, region: &str, inv: &mut Inventory) {
        let mut marker: Option<String> = None;
        loop {
            let mut req = client.list_policies().scope(PolicyScopeType::Local);
            if let Some(m) = marker.as_deref() {
                req = req.marker(m);
            }
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    errors::report(self.key(), region, "ListPolicies", &err);
                    return;
                }
            };

            for policy in resp.policies() {
                let Some(arn) = policy.arn() else { continue };
                let record = ResourceRecord::from_arn(arn, GLOBAL_REGION)
                    .created(iso8601(policy.create_date()))
                    .extra("item_type", "policy");
                inv.push(self.key(), record);
            }

            marker = if resp.is_truncated() {
                resp.marker().map(str::to_string)
            } else {
                None
            };
            if marker.is_none() {
                break;
            }
        }
    }
}
