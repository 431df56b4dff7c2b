// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tagflow::config::{load_and_validate_config, RuntimeBuilder};
use tagflow::dashboard::{self, DashboardState};
use tagflow::engine::Router;
use tagflow::observability::ObservabilityStore;
use tagflow::record::Record;

const STDIN_INPUT: &str = "-";

struct CliArgs {
    config_path: String,
    inputs: Vec<String>,
    serve_addr: Option<SocketAddr>,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <config.yaml> [input-file ... | -] [--serve ADDR]", program);
    eprintln!("Example: {} configs/pipeline.yaml app.log", program);
    eprintln!("Example: {} configs/pipeline.yaml - --serve 127.0.0.1:3000", program);
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut config_path = None;
    let mut inputs = Vec::new();
    let mut serve_addr = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--serve" {
            let addr = iter
                .next()
                .ok_or_else(|| "--serve requires an address".to_string())?;
            serve_addr = Some(
                addr.parse::<SocketAddr>()
                    .map_err(|e| format!("Invalid --serve address '{}': {}", addr, e))?,
            );
        } else if config_path.is_none() {
            config_path = Some(arg.clone());
        } else {
            inputs.push(arg.clone());
        }
    }

    let config_path = config_path.ok_or_else(|| "missing config file".to_string())?;
    if inputs.is_empty() {
        inputs.push(STDIN_INPUT.to_string());
    }

    Ok(CliArgs {
        config_path,
        inputs,
        serve_addr,
    })
}

/// Read all lines from one input, seeding each under the ingress tag.
/// Returns the number of lines seeded.
fn seed_input(router: &mut Router, ingress_tag: &str, input: &str) -> io::Result<u64> {
    let reader: Box<dyn BufRead> = if input == STDIN_INPUT {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(input)?))
    };

    let origin = if input == STDIN_INPUT { "stdin" } else { input };
    let mut count = 0u64;
    for line in reader.lines() {
        let line = line?;
        router.add_record(Record::new(ingress_tag, line).with_origin(origin));
        count += 1;
    }
    Ok(count)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let raw_args: Vec<String> = env::args().collect();
    let cli = match parse_args(&raw_args[1..]) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("❌ {}", message);
            print_usage(&raw_args[0]);
            std::process::exit(2);
        }
    };

    // Configuration failures are fatal before any record flows.
    let config = match load_and_validate_config(&cli.config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", cli.config_path, e);
            std::process::exit(2);
        }
    };

    let (registry, options) = match RuntimeBuilder::from_config(&config) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Invalid configuration {}: {}", cli.config_path, e);
            std::process::exit(2);
        }
    };

    let store = Arc::new(ObservabilityStore::new(
        config.observability.get_trace_capacity(),
        config.observability.get_error_capacity(),
    ));
    let mut router = Router::new(registry, store.clone(), options);

    // The dashboard gets its handles by injection, never via a global.
    let dashboard_state = DashboardState::new();
    if let Some(addr) = cli.serve_addr {
        dashboard_state.attach_store(store.clone());
        let serve_state = dashboard_state.clone();
        tokio::spawn(async move {
            if let Err(e) = dashboard::serve(serve_state, addr).await {
                eprintln!("❌ Dashboard failed: {}", e);
            }
        });
        println!("📡 Dashboard on http://{}/stats", addr);
    }

    println!("🚀 tagflow");
    println!("📋 Configuration: {}", cli.config_path);
    println!("🔧 Stages: {}", config.stages.len());
    println!();

    for input in &cli.inputs {
        dashboard_state.ingest().mark_pending(input);
    }

    let start_time = Instant::now();
    let mut seeded = 0u64;
    for input in &cli.inputs {
        dashboard_state.ingest().mark_processing(input);
        match seed_input(&mut router, &config.ingress_tag, input) {
            Ok(lines) => {
                dashboard_state.ingest().mark_done(input, lines);
                seeded += lines;
            }
            Err(e) => {
                eprintln!("❌ Failed to read {}: {}", input, e);
                std::process::exit(1);
            }
        }
    }

    let summary = match router.process_queue().await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("📊 Drain Results:");
    println!("⏱️  Total Time: {:?}", start_time.elapsed());
    println!("📥 Lines Seeded: {}", seeded);
    println!("🔢 Batches: {}, Records Processed: {}", summary.batches, summary.processed);

    println!("\n🔄 Per-Stage Metrics:");
    let mut metrics: Vec<_> = store.snapshot_metrics().into_iter().collect();
    metrics.sort_by(|a, b| a.0.cmp(&b.0));
    for (stage, metric) in metrics {
        println!(
            "  {} → processed={}, errors={}, elapsed={:?}",
            stage, metric.processed, metric.errors, metric.elapsed
        );
    }

    let total_errors = store.total_errors();
    if total_errors > 0 {
        println!("\n⚠️  {} record(s) dropped; recent errors:", total_errors);
        for entry in store.snapshot_errors(5) {
            println!("  [{}] {} ({})", entry.stage, entry.error, entry.content);
        }
    }

    if cli.serve_addr.is_some() {
        println!("\n📡 Dashboard still serving; press Ctrl-C to exit.");
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("❌ Failed to wait for shutdown signal: {}", e);
        }
    }
}
