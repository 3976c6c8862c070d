use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

use lica_core::types::INVALID_URL;
use lica_core::{Classification, Classifier, Reason};
use serde::Serialize;

pub struct BatchOptions {
    pub input: String,
    pub output: Option<String>,
}

/// One line of the classification log.
#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    title: &'a str,
    result: &'a Classification,
    classification_time_us: u64,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub categorized: usize,
    pub by_reason: BTreeMap<String, usize>,
    pub total_us: u64,
}

impl BatchSummary {
    fn record(&mut self, result: &Classification, elapsed_us: u64) {
        self.total += 1;
        self.total_us += elapsed_us;
        if result.is_categorized() {
            self.categorized += 1;
        }
        *self.by_reason.entry(reason_key(&result.reason).to_string()).or_default() += 1;
    }

    fn print(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Classified {} entries ({} categorized)", self.total, self.categorized)?;
        for (reason, count) in &self.by_reason {
            writeln!(out, "  {:<24} {}", reason, count)?;
        }
        if self.total > 0 {
            writeln!(out, "  mean time: {:.1}us", self.total_us as f64 / self.total as f64)?;
        }
        Ok(())
    }
}

/// Parse failures carry their detail as the reason; summarize them together.
fn reason_key(reason: &Reason) -> &str {
    match reason {
        Reason::InvalidUrl(_) => INVALID_URL,
        other => other.as_str(),
    }
}

/// `url<TAB>title`, title optional. Blank lines are skipped.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }
    Some(line.split_once('\t').unwrap_or((line, "")))
}

pub fn run_batch(classifier: &Classifier, opts: BatchOptions) -> Result<BatchSummary, String> {
    let text = fs::read_to_string(&opts.input)
        .map_err(|e| format!("Failed to read '{}': {}", opts.input, e))?;

    let sink: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(
            fs::File::create(path).map_err(|e| format!("Failed to create '{}': {}", path, e))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);

    let summary = classify_lines(classifier, &text, &mut out)?;
    out.flush().map_err(|e| format!("Failed to write log: {}", e))?;
    drop(out);

    // Keep stdout clean for the log when it goes there
    let result = if opts.output.is_some() {
        summary.print(&mut io::stdout().lock())
    } else {
        summary.print(&mut io::stderr().lock())
    };
    result.map_err(|e| format!("Failed to write summary: {}", e))?;

    Ok(summary)
}

fn classify_lines(classifier: &Classifier, text: &str, out: &mut dyn Write) -> Result<BatchSummary, String> {
    let mut summary = BatchSummary::default();

    for (url, title) in text.lines().filter_map(parse_line) {
        let start = Instant::now();
        let result = classifier.classify(url, title);
        let elapsed_us = start.elapsed().as_micros() as u64;

        summary.record(&result, elapsed_us);

        let entry = LogEntry {
            url,
            title,
            result: &result,
            classification_time_us: elapsed_us,
        };
        serde_json::to_writer(&mut *out, &entry).map_err(|e| format!("Failed to encode log entry: {}", e))?;
        writeln!(out).map_err(|e| format!("Failed to write log: {}", e))?;
    }

    tracing::info!("classified {} entries", summary.total);
    Ok(summary)
}
