mod arn;
mod collector_core;
mod collectors;
mod context;
mod errors;
mod orchestrator;
mod regions;
mod report;
mod utils;

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::context::AccountContext;
use crate::utils::env_or;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("starting AWS resource ARN scan");

    // Fatal phase: no tasks are scheduled unless authentication and
    // region resolution both succeed.
    let ctx = AccountContext::from_env().await?;
    info!(account = ctx.account_id(), "authenticated");
    let regions = regions::resolve(&ctx).await?;

    let selected = collectors::select(&env_or("SCAN_SERVICES", "all"));
    let outcome = orchestrator::run_scan(&selected, &regions, &ctx).await;
    info!(
        records = outcome.inventory.total_records(),
        services = outcome.inventory.service_count(),
        completed_tasks = outcome.tasks_completed,
        failed_tasks = outcome.tasks_failed,
        total_tasks = outcome.tasks_total,
        "scan finished"
    );

    let by_region = orchestrator::group_by_region(&outcome.inventory);
    report::print_summary(&by_region);

    let out_dir = PathBuf::from(env_or("SCAN_OUTPUT_DIR", "."));
    let paths = report::write_reports(&out_dir, ctx.account_id(), &outcome.inventory, &by_region)?;
    println!("\nResults saved to:");
    println!("- {} (service-based organization)", paths.by_service.display());
    println!("- {} (region-based organization)", paths.by_region.display());

    Ok(())
}
