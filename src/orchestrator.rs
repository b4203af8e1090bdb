//! Task grid construction, bounded fan-out, and the post-scan reduce
//! step. Tasks are never retried and never cancelled; a failed task is a
//! permanent loss of its contribution, reported and counted.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::StreamExt;
use tracing::{error, info};

use crate::collector_core::{Collector, Inventory, ResourceRecord, Scope};
use crate::context::AccountContext;

/// Cap on in-flight tasks. Bounded to stay within provider rate limits.
const MAX_CONCURRENT_TASKS: usize = 20;

/// The unit of work: one collector against one region. Created once per
/// run, consumed by exactly one worker.
pub struct ScanTask {
    pub collector: Arc<dyn Collector>,
    pub region: String,
}

/// Crosses regional collectors with every region; global collectors get
/// a single task pinned to the anchor region.
pub fn build_task_grid(
    collectors: &[Arc<dyn Collector>],
    regions: &[String],
    anchor: &str,
) -> Vec<ScanTask> {
    let mut tasks = Vec::new();
    for collector in collectors {
        match collector.scope() {
            Scope::Global => tasks.push(ScanTask {
                collector: Arc::clone(collector),
                region: anchor.to_string(),
            }),
            Scope::Regional => {
                for region in regions {
                    tasks.push(ScanTask {
                        collector: Arc::clone(collector),
                        region: region.clone(),
                    });
                }
            }
        }
    }
    tasks
}

pub struct ScanOutcome {
    pub inventory: Inventory,
    pub tasks_total: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
}

/// Runs the full grid for the given collectors and regions.
pub async fn run_scan(
    collectors: &[Arc<dyn Collector>],
    regions: &[String],
    ctx: &AccountContext,
) -> ScanOutcome {
    let tasks = build_task_grid(collectors, regions, crate::regions::ANCHOR_REGION);
    info!(
        tasks = tasks.len(),
        collectors = collectors.len(),
        regions = regions.len(),
        "dispatching scan tasks"
    );
    run_tasks(tasks, ctx).await
}

/// Drives every task through a bounded pool and merges the per-task
/// inventories single-threaded as they complete. Task failures are
/// logged with the task's identity and do not cancel siblings.
pub async fn run_tasks(tasks: Vec<ScanTask>, ctx: &AccountContext) -> ScanOutcome {
    let tasks_total = tasks.len();
    let mut stream = futures::stream::iter(tasks)
        .map(|task| async move {
            let result = task.collector.collect(&task.region, ctx).await;
            (task, result)
        })
        .buffer_unordered(MAX_CONCURRENT_TASKS);

    let mut inventory = Inventory::new();
    let mut tasks_completed = 0usize;
    let mut tasks_failed = 0usize;
    while let Some((task, result)) = stream.next().await {
        match result {
            Ok(partial) => inventory.absorb(partial),
            Err(err) => {
                tasks_failed += 1;
                error!(
                    service = task.collector.key(),
                    region = %task.region,
                    error = %err,
                    "scan task failed"
                );
            }
        }
        tasks_completed += 1;
        if tasks_completed % 10 == 0 || tasks_completed == tasks_total {
            info!("progress: {tasks_completed}/{tasks_total} tasks completed");
        }
    }

    ScanOutcome {
        inventory,
        tasks_total,
        tasks_completed,
        tasks_failed,
    }
}

/// Region-keyed view: region -> serviceKey -> records.
pub type RegionView = BTreeMap<String, BTreeMap<String, Vec<ResourceRecord>>>;

/// Re-buckets the service-keyed aggregate by each record's region. Pure
/// function of its input; runs once, after all writers have completed.
pub fn group_by_region(inventory: &Inventory) -> RegionView {
    let mut view = RegionView::new();
    for (service_key, records) in inventory.groups() {
        for record in records {
            view.entry(record.region.clone())
                .or_default()
                .entry(service_key.clone())
                .or_default()
                .push(record.clone());
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector_core::ResourceRecord;
    use anyhow::Result;
    use async_trait::async_trait;

    struct FakeCollector {
        key: &'static str,
        scope: Scope,
        records_per_task: usize,
        fail: bool,
    }

    #[async_trait]
    impl Collector for FakeCollector {
        fn key(&self) -> &'static str {
            self.key
        }

        fn scope(&self) -> Scope {
            self.scope
        }

        async fn collect(&self, region: &str, _ctx: &AccountContext) -> Result<Inventory> {
            if self.fail {
                anyhow::bail!("synthetic failure in {region}");
            }
            let mut inv = Inventory::new();
            for i in 0..self.records_per_task {
                let arn = format!("arn:aws:{}:{}:123456789012:res/{}-{}", self.key, region, region, i);
                inv.push(self.key, ResourceRecord::from_arn(arn, region));
            }
            Ok(inv)
        }
    }

    fn regional(key: &'static str, records: usize) -> Arc<dyn Collector> {
        Arc::new(FakeCollector {
            key,
            scope: Scope::Regional,
            records_per_task: records,
            fail: false,
        })
    }

    #[test]
    fn grid_crosses_regional_and_pins_global() {
        let collectors: Vec<Arc<dyn Collector>> = vec![
            regional("svc", 0),
            Arc::new(FakeCollector {
                key: "iam",
                scope: Scope::Global,
                records_per_task: 0,
                fail: false,
            }),
        ];
        let regions = vec!["r1".to_string(), "r2".to_string()];
        let tasks = build_task_grid(&collectors, &regions, "anchor");
        assert_eq!(tasks.len(), 3);
        let global: Vec<_> = tasks.iter().filter(|t| t.collector.key() == "iam").collect();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].region, "anchor");
    }

    #[tokio::test]
    async fn completion_count_equals_grid_size_regardless_of_outcomes() {
        let collectors: Vec<Arc<dyn Collector>> = vec![
            regional("ok", 1),
            Arc::new(FakeCollector {
                key: "broken",
                scope: Scope::Regional,
                records_per_task: 0,
                fail: true,
            }),
        ];
        let regions = vec!["r1".to_string(), "r2".to_string()];
        let ctx = AccountContext::for_tests("123456789012");
        let outcome = run_scan(&collectors, &regions, &ctx).await;
        assert_eq!(outcome.tasks_total, 4);
        assert_eq!(outcome.tasks_completed, 4);
        assert_eq!(outcome.tasks_failed, 2);
        assert_eq!(outcome.inventory.total_records(), 2);
    }

    #[tokio::test]
    async fn all_failing_tasks_still_complete_with_empty_aggregate() {
        let collectors: Vec<Arc<dyn Collector>> = vec![Arc::new(FakeCollector {
            key: "denied",
            scope: Scope::Regional,
            records_per_task: 0,
            fail: true,
        })];
        let regions: Vec<String> = (0..8).map(|i| format!("r{i}")).collect();
        let ctx = AccountContext::for_tests("123456789012");
        let outcome = run_scan(&collectors, &regions, &ctx).await;
        assert_eq!(outcome.tasks_completed, 8);
        assert_eq!(outcome.tasks_failed, 8);
        assert_eq!(outcome.inventory.total_records(), 0);
    }

    #[tokio::test]
    async fn concurrent_tasks_sharing_a_key_lose_no_records() {
        // M regions x K records under one service key.
        let (m, k) = (12, 25);
        let collectors: Vec<Arc<dyn Collector>> = vec![regional("shared", k)];
        let regions: Vec<String> = (0..m).map(|i| format!("region-{i}")).collect();
        let ctx = AccountContext::for_tests("123456789012");
        let outcome = run_scan(&collectors, &regions, &ctx).await;
        let records = &outcome.inventory.groups()["shared"];
        assert_eq!(records.len(), m * k);
        let unique: std::collections::BTreeSet<_> = records.iter().map(|r| &r.arn).collect();
        assert_eq!(unique.len(), m * k);
    }

    #[tokio::test]
    async fn regroup_is_idempotent_and_keyed_by_record_region() {
        let collectors: Vec<Arc<dyn Collector>> = vec![regional("svc", 2)];
        let regions = vec!["r1".to_string(), "r2".to_string()];
        let ctx = AccountContext::for_tests("123456789012");
        let outcome = run_scan(&collectors, &regions, &ctx).await;

        let first = group_by_region(&outcome.inventory);
        let second = group_by_region(&outcome.inventory);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
        assert_eq!(first["r1"]["svc"].len(), 2);
        assert_eq!(first["r2"]["svc"].len(), 2);
    }
}
