//! Shared test fixtures.

use std::collections::BTreeMap;

use crate::payload::{RulePayload, Stopwords};
use crate::psl::parse_suffix_list;

const SUFFIX_LIST: &str = "\
// ===BEGIN ICANN DOMAINS===
com
org
net
au
com.au
uk
co.uk
// ===END ICANN DOMAINS===
";

pub(crate) fn suffix_list() -> publicsuffix::List {
    parse_suffix_list(SUFFIX_LIST).expect("fixture suffix list parses")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub(crate) fn fixture_payload() -> RulePayload {
    let mut taxonomy = BTreeMap::new();
    taxonomy.insert("hobbies & interests".to_string(), strings(&["coins", "gaming"]));
    taxonomy.insert("food & drink".to_string(), strings(&["cooking", "wine"]));
    taxonomy.insert("sports".to_string(), strings(&["soccer", "golf", "tennis"]));
    taxonomy.insert("automotive".to_string(), Vec::new());
    taxonomy.insert("arts & entertainment".to_string(), strings(&["television"]));
    taxonomy.insert("home & garden".to_string(), strings(&["real estate"]));

    let mut ignore_domains = BTreeMap::new();
    ignore_domains.insert("paypal".to_string(), ["com".to_string()].into_iter().collect());
    ignore_domains.insert("mybank.co.uk".to_string(), ["co.uk".to_string()].into_iter().collect());

    let mut keywords = BTreeMap::new();
    keywords.insert("coins".to_string(), strings(&["coins", "numismatics"]));
    keywords.insert("golf".to_string(), strings(&["golf", "putter"]));
    keywords.insert("soccer".to_string(), strings(&["soccer"]));
    keywords.insert("home & garden/real estate".to_string(), strings(&["Real  Estate"]));

    RulePayload {
        taxonomy,
        domain_rules: map(&[("taste.com.au", "cooking")]),
        host_rules: map(&[
            ("soccerblog.dallasnews.com", "soccer"),
            ("au.movies.yahoo.com", "television"),
        ]),
        path_rules: map(&[("csmonitor.com/In-Gear", "automotive")]),
        ignore_domains,
        keywords,
        stopwords: Stopwords {
            content: strings(&["the", "and", "for", "http", "https", "www", "com", "your"]),
            sensitive: strings(&["login", "password", "account"]),
        },
    }
}
