mod apigateway;
mod cloudformation;
mod dynamodb;
mod ec2;
mod ecr;
mod ecs;
mod eks;
mod elasticache;
mod elb;
mod elbv2;
mod iam;
mod lambda;
mod rds;
mod s3;
mod sns;
mod sqs;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use crate::collector_core::Collector;

/// Every collector the scanner knows about.
pub fn all() -> Vec<Arc<dyn Collector>> {
    vec![
        Arc::new(s3::S3Collector),
        Arc::new(ec2::Ec2Collector),
        Arc::new(lambda::LambdaCollector),
        Arc::new(rds::RdsCollector),
        Arc::new(dynamodb::DynamoDbCollector),
        Arc::new(sns::SnsCollector),
        Arc::new(sqs::SqsCollector),
        Arc::new(iam::IamCollector),
        Arc::new(cloudformation::CloudFormationCollector),
        Arc::new(apigateway::ApiGatewayCollector),
        Arc::new(elbv2::ElbV2Collector),
        Arc::new(elb::ClassicElbCollector),
        Arc::new(eks::EksCollector),
        Arc::new(ecs::EcsCollector),
        Arc::new(ecr::EcrCollector),
        Arc::new(elasticache::ElastiCacheCollector),
    ]
}

/// Parses a comma-separated service filter; `all` (or empty) selects
/// everything. Unknown names are ignored with a warning.
pub fn select(filter: &str) -> Vec<Arc<dyn Collector>> {
    let filter = filter.trim();
    if filter.is_empty() || filter.eq_ignore_ascii_case("all") {
        return all();
    }
    let wanted: BTreeSet<String> = filter
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    let selected: Vec<Arc<dyn Collector>> = all()
        .into_iter()
        .filter(|c| wanted.contains(c.key()))
        .collect();
    let known: BTreeSet<&str> = selected.iter().map(|c| c.key()).collect();
    for name in &wanted {
        if !known.contains(name.as_str()) {
            warn!(service = %name, "unknown service in filter, ignoring");
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_registers_sixteen_services() {
        assert_eq!(all().len(), 16);
    }

    #[test]
    fn select_filters_by_key() {
        let selected = select("s3, ec2");
        let keys: Vec<_> = selected.iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["s3", "ec2"]);
    }

    #[test]
    fn select_ignores_unknown_names() {
        let selected = select("s3,no-such-service");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].key(), "s3");
    }

    #[test]
    fn select_all_keyword_returns_everything() {
        assert_eq!(select("all").len(), all().len());
        assert_eq!(select("").len(), all().len());
    }
}
