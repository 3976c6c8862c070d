//! LICA CLI
//!
//! CLI tool for compiling rule payloads and classifying URLs.

mod batch;
mod bench;
mod fetch;
mod payload;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lica_core::{ClassifierOptions, SchemeMask};

use crate::payload::SourcePaths;

#[derive(Parser)]
#[command(name = "lica-cli")]
#[command(about = "LICA interest classifier: payload compiler and tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command that builds a classifier.
#[derive(Args)]
struct ClassifierArgs {
    /// Compiled payload JSON
    #[arg(short, long, default_value = "payload.json")]
    payload: PathBuf,

    /// Public suffix list file (heuristic suffixes when omitted)
    #[arg(long)]
    psl: Option<PathBuf>,

    /// Score single words only
    #[arg(long)]
    no_bigrams: bool,

    /// Accepted URL schemes, comma separated
    #[arg(long, value_delimiter = ',', default_value = "http,https")]
    scheme: Vec<String>,
}

impl ClassifierArgs {
    fn options(&self) -> Result<ClassifierOptions, String> {
        let mut schemes = SchemeMask::empty();
        for name in &self.scheme {
            schemes |= SchemeMask::from_scheme(name).ok_or_else(|| format!("Unknown scheme '{}'", name))?;
        }
        Ok(ClassifierOptions {
            bigrams: !self.no_bigrams,
            schemes,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile source documents into a rule payload
    Compile {
        /// Taxonomy hierarchy (file or http(s) URL)
        #[arg(long)]
        hierarchy: String,

        /// Domain, host and path rules
        #[arg(long)]
        domain_rules: String,

        /// Keyword file with positive words and ignored domains
        #[arg(long)]
        keywords: String,

        /// Stopword file
        #[arg(long)]
        stopwords: String,

        /// Site group dump
        #[arg(long, requires = "group_mapping")]
        site_groups: Option<String>,

        /// Site group to category mapping
        #[arg(long, requires = "site_groups")]
        group_mapping: Option<String>,

        /// Output payload file
        #[arg(short, long, default_value = "payload.json")]
        output: PathBuf,

        /// Public suffix list used to validate the payload
        #[arg(long)]
        psl: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Classify one URL and/or title
    Classify {
        /// URL to classify (may be empty)
        url: String,

        /// Page title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Include tokens and keyword tally
        #[arg(long)]
        explain: bool,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Classify a file of `url<TAB>title` lines into a JSON-lines log
    Batch {
        /// Input file
        #[arg(short, long)]
        input: String,

        /// Log file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },

    /// Dump payload info
    Info {
        /// Payload file to inspect
        #[arg(short, long, default_value = "payload.json")]
        payload: PathBuf,
    },

    /// Measure cold start and classification latency
    Bench {
        /// `url<TAB>title` lines to classify (built-in mix when omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Passes over the input
        #[arg(long, default_value_t = 1000)]
        iterations: usize,

        #[command(flatten)]
        classifier: ClassifierArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            hierarchy,
            domain_rules,
            keywords,
            stopwords,
            site_groups,
            group_mapping,
            output,
            psl,
            verbose,
        } => {
            let paths = SourcePaths {
                hierarchy,
                domain_rules,
                keywords,
                stopwords,
                site_groups: site_groups.zip(group_mapping),
            };
            cmd_compile(&paths, &output, psl.as_deref(), verbose)
        }
        Commands::Classify {
            url,
            title,
            explain,
            classifier,
        } => cmd_classify(&url, &title, explain, &classifier),
        Commands::Batch {
            input,
            output,
            classifier,
        } => cmd_batch(input, output, &classifier),
        Commands::Info { payload } => cmd_info(&payload),
        Commands::Bench {
            input,
            iterations,
            classifier,
        } => classifier.options().and_then(|options| {
            bench::run_bench(bench::BenchOptions {
                payload_path: classifier.payload.display().to_string(),
                psl_path: classifier.psl.as_ref().map(|p| p.display().to_string()),
                input,
                iterations,
                options,
            })
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_compile(paths: &SourcePaths, output: &Path, psl: Option<&Path>, verbose: bool) -> Result<(), String> {
    let (payload, report) = payload::compile_payload(paths)?;

    payload::build_classifier(&payload, psl, ClassifierOptions::default())
        .map_err(|e| format!("Compiled payload failed validation: {}", e))?;

    payload::write_payload(output, &payload)?;

    let build = &report.build;
    let optimize = &report.optimize;
    println!("Compiled payload to '{}'", output.display());
    println!("  Taxonomy:    {} top-level categories", build.top_levels);
    println!(
        "  Rules:       {} domain ({} from site groups), {} host, {} path",
        build.domain_rules, build.site_group_rules, build.host_rules, build.path_rules
    );
    println!(
        "  Keywords:    {} -> {} (dedupe removed {}, conflicts {})",
        optimize.keywords_before,
        optimize.keywords_after,
        optimize.keywords_deduped,
        optimize.keyword_conflicts
    );
    if verbose {
        println!(
            "  Dropped:     {} 'not in use' rules, {} duplicate rule keys",
            build.not_in_use_dropped + optimize.not_in_use_dropped,
            optimize.rules_deduped
        );
        println!("  Stopwords:   {} content words also sensitive", optimize.stopword_overlap);
        println!("  Unmapped:    {} site groups", build.unmapped_groups);
        println!("  Skipped:     {} site group entries", build.skipped_sites);
    }
    println!("  Time:        {:.1}ms", report.total_ms);

    Ok(())
}

fn cmd_classify(url: &str, title: &str, explain: bool, args: &ClassifierArgs) -> Result<(), String> {
    let classifier = payload::load_classifier(&args.payload, args.psl.as_deref(), args.options()?)?;

    let json = if explain {
        serde_json::to_string_pretty(&classifier.explain(url, title))
    } else {
        serde_json::to_string_pretty(&classifier.classify(url, title))
    }
    .map_err(|e| format!("Failed to encode result: {}", e))?;

    println!("{}", json);
    Ok(())
}

fn cmd_batch(input: String, output: Option<String>, args: &ClassifierArgs) -> Result<(), String> {
    let classifier = payload::load_classifier(&args.payload, args.psl.as_deref(), args.options()?)?;
    batch::run_batch(&classifier, batch::BatchOptions { input, output })?;
    Ok(())
}

fn cmd_info(path: &Path) -> Result<(), String> {
    let payload = payload::read_payload(path)?;
    let stats = payload.stats();

    println!("Payload: {}", path.display());
    println!("  Top-levels:          {}", stats.top_levels);
    println!("  Sub-levels:          {}", stats.sub_levels);
    println!();
    println!("Rules:");
    println!("  Domain rules:        {}", stats.domain_rules);
    println!("  Host rules:          {}", stats.host_rules);
    println!("  Path rules:          {}", stats.path_rules);
    println!("  Ignored domains:     {}", stats.ignore_domains);
    println!();
    println!("Lexicon:");
    println!("  Keywords:            {}", stats.keywords);
    println!("  Content stopwords:   {}", stats.content_stopwords);
    println!("  Sensitive stopwords: {}", stats.sensitive_stopwords);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(schemes: &[&str]) -> ClassifierArgs {
        ClassifierArgs {
            payload: PathBuf::from("payload.json"),
            psl: None,
            no_bigrams: false,
            scheme: schemes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn scheme_flags_build_mask() {
        let options = args(&["HTTPS", " ftp "]).options().unwrap();
        assert_eq!(options.schemes, SchemeMask::HTTPS | SchemeMask::FTP);
        assert!(options.bigrams);

        let err = args(&["http", "gopher"]).options().err().unwrap();
        assert_eq!(err, "Unknown scheme 'gopher'");
    }
}
