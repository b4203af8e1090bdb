//! Report emission: the two JSON documents and the console summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::Local;

use crate::collector_core::{Inventory, ResourceRecord};
use crate::orchestrator::RegionView;

pub struct ReportPaths {
    pub by_service: PathBuf,
    pub by_region: PathBuf,
}

/// Writes the service-keyed and region-keyed JSON reports. Filenames
/// carry the account id and a run timestamp.
pub fn write_reports(
    out_dir: &Path,
    account_id: &str,
    inventory: &Inventory,
    by_region: &RegionView,
) -> Result<ReportPaths> {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");

    let by_service =
        out_dir.join(format!("aws_resources_all_regions_{account_id}_{timestamp}.json"));
    write_json(&by_service, inventory)?;

    let by_region_path =
        out_dir.join(format!("aws_resources_by_region_{account_id}_{timestamp}.json"));
    write_json(&by_region_path, by_region)?;

    Ok(ReportPaths {
        by_service,
        by_region: by_region_path,
    })
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create report file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("cannot serialize report to {}", path.display()))?;
    Ok(())
}

/// Prints the human-readable summary: regions sorted, services sorted,
/// records sorted by ARN. Informational only, not machine-parsed.
pub fn print_summary(by_region: &RegionView) {
    println!("\nAWS Resource ARNs by Region:");
    println!("==========================");
    for (region, services) in by_region {
        let region_total: usize = services.values().map(Vec::len).sum();
        println!("\nREGION: {region} ({region_total} resources)");
        println!("{}", "=".repeat(50));
        for (service_key, records) in services {
            println!("\n  {} ({} resources):", service_key.to_uppercase(), records.len());
            let mut sorted: Vec<&ResourceRecord> = records.iter().collect();
            sorted.sort_by(|a, b| a.arn.cmp(&b.arn));
            for record in sorted {
                println!("    ARN: {}", record.arn);
                println!("    Name (from ARN): {}", record.name);
                println!("    Subclass: {}", record.subclass);
                println!("    Created: {}", record.creation_date);
                for (key, value) in &record.extra {
                    match value {
                        serde_json::Value::String(s) => println!("    {key}: {s}"),
                        other => println!("    {key}: {other}"),
                    }
                }
                println!("    {}", "-".repeat(48));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::group_by_region;

    fn sample_inventory() -> Inventory {
        let mut inv = Inventory::new();
        inv.push(
            "s3",
            ResourceRecord::from_arn("arn:aws:s3:::bucket-a", "us-east-1")
                .extra("endpoint", "https://bucket-a.s3.amazonaws.com"),
        );
        inv.push(
            "ec2",
            ResourceRecord::from_arn("arn:aws:ec2:eu-west-1:123:instance/i-1", "eu-west-1"),
        );
        inv
    }

    #[test]
    fn reports_round_trip_through_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let inventory = sample_inventory();
        let by_region = group_by_region(&inventory);

        let paths = write_reports(dir.path(), "123456789012", &inventory, &by_region).unwrap();
        let name = paths.by_service.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("aws_resources_all_regions_123456789012_"));
        assert!(name.ends_with(".json"));

        let by_service: serde_json::Value =
            serde_json::from_reader(File::open(&paths.by_service).unwrap()).unwrap();
        assert_eq!(by_service["s3"][0]["arn"], "arn:aws:s3:::bucket-a");
        assert_eq!(by_service["s3"][0]["endpoint"], "https://bucket-a.s3.amazonaws.com");

        let regional: serde_json::Value =
            serde_json::from_reader(File::open(&paths.by_region).unwrap()).unwrap();
        assert_eq!(regional["eu-west-1"]["ec2"][0]["name"], "instance/i-1");
    }
}
