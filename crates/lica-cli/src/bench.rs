use std::fs;
use std::path::Path;
use std::time::Instant;

use lica_core::{Classifier, ClassifierOptions};

use crate::batch::parse_line;
use crate::payload;

pub struct BenchOptions {
    pub payload_path: String,
    pub psl_path: Option<String>,
    pub input: Option<String>,
    pub iterations: usize,
    pub options: ClassifierOptions,
}

struct BenchResult {
    ops: usize,
    total_ms: f64,
    p50_us: f64,
    p99_us: f64,
    max_us: f64,
}

/// Used when no input file is given.
const DEFAULT_MIX: &[(&str, &str)] = &[
    ("https://www.example.com/", ""),
    ("https://news.example.org/sports/golf/tiger-woods-masters-putter", ""),
    ("https://shop.example.net/cart?item=42", "Shopping cart"),
    ("https://blog.example.com/2024/03/real-estate-market-outlook", "Real estate market outlook"),
    ("https://example.co.uk/login", "Sign in to your account"),
    ("", "Best numismatics auctions for rare coins"),
    ("not a url", "Soccer scores"),
];

pub fn run_bench(opts: BenchOptions) -> Result<(), String> {
    println!("============================================================");
    println!("LICA Benchmark");
    println!("============================================================");

    let payload = payload::read_payload(Path::new(&opts.payload_path))?;

    let cold_start = Instant::now();
    let classifier = payload::build_classifier(&payload, opts.psl_path.as_deref().map(Path::new), opts.options)?;
    let cold_start_ms = cold_start.elapsed().as_secs_f64() * 1000.0;

    let owned = match &opts.input {
        Some(path) => Some(fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?),
        None => None,
    };
    let requests: Vec<(&str, &str)> = match &owned {
        Some(text) => text.lines().filter_map(parse_line).collect(),
        None => DEFAULT_MIX.to_vec(),
    };
    if requests.is_empty() {
        return Err("Benchmark input has no entries".to_string());
    }

    println!("Cold start: {:.2}ms ({:?})", cold_start_ms, classifier);
    println!("Warmup...");
    warmup(&classifier, &requests);

    println!("------------------------------------------------------------");
    println!("Benchmark: {} entries, {} iterations", requests.len(), opts.iterations);
    println!("------------------------------------------------------------");
    let result = measure(&classifier, &requests, opts.iterations.max(1));
    println!("{}", format_result(&result));

    Ok(())
}

fn warmup(classifier: &Classifier, requests: &[(&str, &str)]) {
    for _ in 0..100 {
        for (url, title) in requests {
            let _ = classifier.classify(url, title);
        }
    }
}

fn measure(classifier: &Classifier, requests: &[(&str, &str)], iterations: usize) -> BenchResult {
    let mut latencies = Vec::with_capacity(requests.len() * iterations);

    let start = Instant::now();
    for _ in 0..iterations {
        for (url, title) in requests {
            let t = Instant::now();
            let _ = classifier.classify(url, title);
            latencies.push(t.elapsed().as_secs_f64() * 1_000_000.0);
        }
    }
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    BenchResult {
        ops: latencies.len(),
        total_ms,
        p50_us: percentile(&latencies, 0.50),
        p99_us: percentile(&latencies, 0.99),
        max_us: latencies.last().copied().unwrap_or(0.0),
    }
}

fn format_result(result: &BenchResult) -> String {
    let ops_per_sec = if result.total_ms > 0.0 {
        result.ops as f64 / (result.total_ms / 1000.0)
    } else {
        0.0
    };
    format!(
        "  Ops:        {}\n  Total:      {:.1}ms\n  Throughput: {:.0} ops/s\n  P50:        {:.2}us\n  P99:        {:.2}us\n  Max:        {:.2}us",
        result.ops, result.total_ms, ops_per_sec, result.p50_us, result.p99_us, result.max_us
    )
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64) * p).ceil() as usize;
    let idx = idx.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}
