use anyhow::{Context as _, Result};
use aws_config::BehaviorVersion;
use aws_types::region::Region;
use aws_types::sdk_config::SdkConfig;

/// Init-phase state shared with every collector: the caller's account id
/// and the ambient SDK config, resolved once per process.
#[derive(Debug, Clone)]
pub struct AccountContext {
    account_id: String,
    base: SdkConfig,
}

impl AccountContext {
    /// Resolves ambient credentials and the caller identity. Failure here
    /// is fatal: nothing is scheduled without a confirmed account.
    pub async fn from_env() -> Result<Self> {
        let base = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let sts = aws_sdk_sts::Client::new(&base);
        let identity = sts.get_caller_identity().send().await.context(
            "cannot authenticate; check AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY",
        )?;
        let account_id = identity.account().unwrap_or("unknown").to_string();
        Ok(Self { account_id, base })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Derives a region-pinned SDK config without re-resolving
    /// credentials.
    pub fn for_region(&self, region: &str) -> SdkConfig {
        self.base
            .to_builder()
            .region(Region::new(region.to_string()))
            .build()
    }

    #[cfg(test)]
    pub fn for_tests(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            base: SdkConfig::builder()
                .behavior_version(BehaviorVersion::latest())
                .build(),
        }
    }
}
