use std::fs;
use std::path::Path;
use std::time::Instant;

use lica_compiler::{build_payload, optimize_payload, parse_sources, CompileStats, OptimizeStats, SourceTexts};
use lica_core::{parse_suffix_list, Classifier, ClassifierOptions, HeuristicSuffixes, RulePayload};

use crate::fetch::SourceReader;

/// Where each compiler input comes from (file path or URL).
pub struct SourcePaths {
    pub hierarchy: String,
    pub domain_rules: String,
    pub keywords: String,
    pub stopwords: String,
    pub site_groups: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct CompileReport {
    pub build: CompileStats,
    pub optimize: OptimizeStats,
    pub total_ms: f64,
}

pub fn compile_payload(paths: &SourcePaths) -> Result<(RulePayload, CompileReport), String> {
    let start = Instant::now();

    let mut reader = SourceReader::new();
    let hierarchy = reader.read(&paths.hierarchy)?;
    let domain_rules = reader.read(&paths.domain_rules)?;
    let keywords = reader.read(&paths.keywords)?;
    let stopwords = reader.read(&paths.stopwords)?;
    let site_groups = match &paths.site_groups {
        Some((sites, mapping)) => Some((reader.read(sites)?, reader.read(mapping)?)),
        None => None,
    };

    let texts = SourceTexts {
        hierarchy: &hierarchy,
        domain_rules: &domain_rules,
        keywords: &keywords,
        stopwords: &stopwords,
        site_groups: site_groups.as_ref().map(|(s, m)| (s.as_str(), m.as_str())),
    };
    let sources = parse_sources(&texts).map_err(|e| e.to_string())?;

    let (mut payload, build) = build_payload(&sources);
    let optimize = optimize_payload(&mut payload);

    let report = CompileReport {
        build,
        optimize,
        total_ms: start.elapsed().as_secs_f64() * 1000.0,
    };

    Ok((payload, report))
}

pub fn write_payload(path: &Path, payload: &RulePayload) -> Result<(), String> {
    let json = payload
        .to_json_pretty()
        .map_err(|e| format!("Failed to encode payload: {}", e))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    fs::write(path, json).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

pub fn read_payload(path: &Path) -> Result<RulePayload, String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    RulePayload::from_slice(&bytes).map_err(|e| format!("Invalid payload '{}': {}", path.display(), e))
}

/// Build a classifier over the PSL file at `psl`, or the built-in heuristic
/// suffixes when none is given.
pub fn build_classifier(
    payload: &RulePayload,
    psl: Option<&Path>,
    options: ClassifierOptions,
) -> Result<Classifier, String> {
    let result = match psl {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
            let list = parse_suffix_list(&text)
                .map_err(|e| format!("Invalid suffix list '{}': {}", path.display(), e))?;
            Classifier::build_with_options(payload, list, options)
        }
        None => {
            tracing::warn!("no --psl given, using heuristic public suffixes");
            Classifier::build_with_options(payload, HeuristicSuffixes, options)
        }
    };

    result.map_err(|e| format_build_error(&e))
}

pub fn load_classifier(
    payload_path: &Path,
    psl: Option<&Path>,
    options: ClassifierOptions,
) -> Result<Classifier, String> {
    let payload = read_payload(payload_path)?;
    build_classifier(&payload, psl, options)
}

fn format_build_error(err: &lica_core::BuildError) -> String {
    let mut out = err.to_string();
    for problem in err.problems() {
        out.push_str("\n  - ");
        out.push_str(&problem.to_string());
    }
    out
}
