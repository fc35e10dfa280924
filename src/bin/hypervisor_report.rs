/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use clap::Parser;
use hypervisor_report::domain::partition_host_collisions;
use hypervisor_report::render::vm_csv_lines;
use hypervisor_report::{
    ContainerConfigBuilder, HostReport, HostSummary, InventoryReportingService, OutputFormat,
    ReportConfig, ServiceContainer,
};
use log::{debug, error, info, warn};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Parser, Debug)]
#[command(name = "hypervisor_report", version, about = "Render hypervisor inventory reports")]
struct Opt {
    /// Snapshot directories holding hw, vm, pv and optionally vg
    #[arg(required = true)]
    snapshots: Vec<PathBuf>,

    /// Directory receiving per-host folders and the fleet index
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format (html, csv, json or toml); repeatable
    #[arg(short, long = "format")]
    formats: Vec<OutputFormat>,

    /// Include the header row in per-host vms.csv
    #[arg(long)]
    csv_header: bool,

    /// Leave the link back to the fleet index off host pages
    #[arg(long)]
    no_index_link: bool,

    /// TOML report configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print each host page to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Snapshots processed at the same time
    #[arg(short = 'j', long, default_value_t = 8)]
    jobs: usize,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Opt {
    /// Command line flags take precedence over the configuration file
    fn apply_overrides(&self, config: &mut ReportConfig) {
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if !self.formats.is_empty() {
            config.formats = self.formats.clone();
        }
        if self.csv_header {
            config.csv_header = true;
        }
        if self.no_index_link {
            config.index_link = None;
        }
    }
}

/// Hosts written by [`publish_batch`] and the number that were not
struct BatchOutcome {
    /// Published reports, in input order
    published: Vec<HostReport>,
    failures: usize,
}

/// Publish every report whose output directory is not already claimed
///
/// Reports are expected in command line order. A host whose directory collides
/// with an earlier one is skipped and counted as a failure rather than
/// overwriting the earlier report.
async fn publish_batch(
    service: &Arc<dyn InventoryReportingService>,
    reports: Vec<(PathBuf, HostReport)>,
    config: &Arc<ReportConfig>,
) -> BatchOutcome {
    let (reports, collisions) = partition_host_collisions(reports, |(_, report)| {
        report.inventory.machine().id.as_str()
    });
    for ((snapshot, report), directory) in &collisions {
        error!(
            "{}: host {} would overwrite the report in {}; skipped",
            snapshot.display(),
            report.inventory.machine().id,
            config.output_dir.join(directory).display()
        );
    }
    let mut failures = collisions.len();

    let mut tasks = JoinSet::new();
    for (position, (snapshot, report)) in reports.into_iter().enumerate() {
        let service = Arc::clone(service);
        let config = Arc::clone(config);
        tasks.spawn(async move {
            let result = service.publish_report(&report, &config).await;
            (position, snapshot, report, result)
        });
    }

    let mut published = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, snapshot, report, Ok(paths))) => {
                for path in paths {
                    debug!("{}: wrote {}", snapshot.display(), path.display());
                }
                published.push((position, report));
            }
            Ok((_, snapshot, _, Err(e))) => {
                error!("{}: {}", snapshot.display(), e);
                failures += 1;
            }
            Err(e) => {
                error!("Publishing task failed: {}", e);
                failures += 1;
            }
        }
    }
    published.sort_by_key(|(position, _)| *position);

    BatchOutcome {
        published: published.into_iter().map(|(_, report)| report).collect(),
        failures,
    }
}

fn print_summary(summaries: &[HostSummary], output_dir: &Path) {
    println!("Hypervisors:");
    println!("============");
    for summary in summaries {
        println!(
            "{} - {} {} [CPU {}/{}, {} threads] [memory {}/{}] [VMs {}/{} running]",
            summary.id,
            summary.vendor,
            summary.product,
            summary.cpu_installed,
            summary.cpu_slots,
            summary.cpu_threads,
            summary.memory_installed,
            summary.memory_slots,
            summary.vm_running,
            summary.vm_total,
        );
    }
    println!("Reports have been written to {}", output_dir.display());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let opt = Opt::parse();

    let default_level = if opt.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let container = ServiceContainer::new(
        ContainerConfigBuilder::new()
            .config_path(opt.config.clone())
            .max_concurrency(opt.jobs)
            .build(),
    );

    let mut config = container.load_report_config().await?;
    opt.apply_overrides(&mut config);
    debug!("Report configuration: {:?}", config);

    let service = container.create_inventory_service();
    let config = Arc::new(config);
    let permits = Arc::new(Semaphore::new(container.config().max_concurrency));

    let mut tasks = JoinSet::new();
    for (position, snapshot) in opt.snapshots.iter().cloned().enumerate() {
        let service = Arc::clone(&service);
        let config = Arc::clone(&config);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let result = service.generate_report(&snapshot, &config).await;
            (position, snapshot, result)
        });
    }

    let mut reports = Vec::with_capacity(opt.snapshots.len());
    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, snapshot, Ok(report))) => reports.push((position, snapshot, report)),
            Ok((_, snapshot, Err(e))) => {
                error!("{}: {}", snapshot.display(), e);
                failures += 1;
            }
            Err(e) => {
                error!("Snapshot task failed: {}", e);
                failures += 1;
            }
        }
    }
    // Keep command line order regardless of completion order
    reports.sort_by_key(|(position, _, _)| *position);
    let reports: Vec<(PathBuf, HostReport)> = reports
        .into_iter()
        .map(|(_, snapshot, report)| (snapshot, report))
        .collect();

    if opt.stdout {
        for (_, report) in &reports {
            println!("{}", report.html);
        }
    } else {
        let outcome = publish_batch(&service, reports, &config).await;
        failures += outcome.failures;

        if outcome.published.is_empty() {
            warn!("No report could be published; index not written");
        } else {
            let summaries: Vec<HostSummary> =
                outcome.published.iter().map(HostReport::summary).collect();
            let vm_rows: Vec<String> = outcome
                .published
                .iter()
                .flat_map(|report| vm_csv_lines(&report.inventory, false))
                .collect();
            for path in service.publish_index(&summaries, &vm_rows, &config).await? {
                info!("Wrote {}", path.display());
            }
            print_summary(&summaries, &config.output_dir);
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} snapshots failed", failures, opt.snapshots.len()).into());
    }
    Ok(())
}
