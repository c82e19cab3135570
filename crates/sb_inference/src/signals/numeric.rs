//! Chart-ready numbers from free text.
//!
//! Tiers are tried in priority order and the first one that produces data
//! wins. Within a tier, pairs keep their order of appearance.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use sb_core::{ChartPoint, ChartRecord, ChartType};

use super::re;
use super::text::strip_tags;

lazy_static! {
    static ref PERCENTAGE: Regex = re(r"(\w+[\w\s]*?):\s*([0-9]+\.?[0-9]*)\s*%");
    static ref GROUP: Regex = re(r"(?i)(\w+[\w\s]*?)\s*(?:group|mice|subjects)?\s*[:(]\s*([0-9]+\.?[0-9]*)");
    static ref MEASUREMENT: Regex = re(r"(\w+[\w\s]*?):\s*([0-9]+\.?[0-9]*)\s*([a-zA-Z]+)");
    static ref MEAN_STD: Regex = re(r"(\w+[\w\s]{0,30}?)\s+([0-9]+\.?[0-9]*)\s*±\s*([0-9]+\.?[0-9]*)");
    static ref SAMPLE_SIZE: Regex = re(r"[nN]\s*=\s*([0-9]+)");
    static ref NUMERIC_SENTENCE: Regex = re(r"[^.!?]*[0-9]+\.?[0-9]*[^.!?]*[.!?]");
    static ref MULTI_DIGIT_NUMBER: Regex = re(r"[0-9]+\.?[0-9]+");
}

/// A tier needs at least this many matches.
const MIN_MATCHES: usize = 2;
const MAX_PIE_SLICES: usize = 6;
const MAX_GROUPS: usize = 8;
const MAX_BARS: usize = 6;
const MAX_SENTENCES: usize = 10;
const MAX_KEY_VALUES: usize = 10;
const MIN_GROUP_LABEL_LEN: usize = 2;

type Tier = fn(&str) -> Option<ChartRecord>;

const TIERS: &[Tier] = &[
    percentages,
    group_comparison,
    measurements,
    mean_with_error,
    sample_sizes,
    key_values,
];

/// Best chart for `text`. Tags are stripped first. Never fails: with fewer than
/// two matches in every tier the record is an empty bar chart.
pub fn extract_numerical_data(text: &str) -> ChartRecord {
    let clean = strip_tags(text);
    TIERS
        .iter()
        .find_map(|tier| tier(&clean))
        .unwrap_or_else(ChartRecord::empty)
}

fn record(chart_type: ChartType, title: &str, unit: &str, data: Vec<ChartPoint>) -> Option<ChartRecord> {
    (!data.is_empty()).then(|| ChartRecord {
        chart_type,
        title: title.to_string(),
        unit: unit.to_string(),
        data,
    })
}

fn number(caps: &Captures, group: usize) -> Option<f64> {
    caps.get(group)?.as_str().parse().ok()
}

fn label(caps: &Captures) -> String {
    caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default()
}

fn matches<'t>(pattern: &Regex, text: &'t str) -> Option<Vec<Captures<'t>>> {
    let found: Vec<Captures> = pattern.captures_iter(text).collect();
    (found.len() >= MIN_MATCHES).then_some(found)
}

fn percentages(text: &str) -> Option<ChartRecord> {
    let found = matches(&PERCENTAGE, text)?;
    let data = found
        .iter()
        .take(MAX_PIE_SLICES)
        .filter_map(|caps| Some(ChartPoint::new(label(caps), number(caps, 2)?)))
        .collect();
    record(ChartType::Pie, "Distribution", "%", data)
}

fn group_comparison(text: &str) -> Option<ChartRecord> {
    let found = matches(&GROUP, text)?;
    let data: Vec<ChartPoint> = found
        .iter()
        .filter_map(|caps| Some(ChartPoint::new(label(caps), number(caps, 2)?)))
        .filter(|point| point.label.chars().count() > MIN_GROUP_LABEL_LEN && point.value > 0.0)
        .take(MAX_GROUPS)
        .collect();
    if data.len() < MIN_MATCHES {
        return None;
    }
    record(ChartType::Bar, "Group Comparison", "", data)
}

fn measurements(text: &str) -> Option<ChartRecord> {
    let found = matches(&MEASUREMENT, text)?;
    let unit = found[0].get(3).map(|m| m.as_str()).unwrap_or("");
    let data = found
        .iter()
        .take(MAX_BARS)
        .filter_map(|caps| Some(ChartPoint::new(label(caps), number(caps, 2)?)))
        .filter(|point| point.value > 0.0)
        .collect();
    record(ChartType::Bar, "Measurements", unit, data)
}

fn mean_with_error(text: &str) -> Option<ChartRecord> {
    let found = matches(&MEAN_STD, text)?;
    let data = found
        .iter()
        .take(MAX_BARS)
        .filter_map(|caps| Some(ChartPoint::new(label(caps), number(caps, 2)?)))
        .collect();
    record(ChartType::Bar, "Experimental Results", "", data)
}

fn sample_sizes(text: &str) -> Option<ChartRecord> {
    let found = matches(&SAMPLE_SIZE, text)?;
    let data = found
        .iter()
        .take(MAX_BARS)
        .filter_map(|caps| number(caps, 1))
        .enumerate()
        .map(|(i, n)| ChartPoint::new(format!("Group {}", i + 1), n))
        .collect();
    record(ChartType::Bar, "Sample Sizes", "count", data)
}

fn key_values(text: &str) -> Option<ChartRecord> {
    let sentences: Vec<&str> = NUMERIC_SENTENCE
        .find_iter(text)
        .take(MAX_SENTENCES)
        .map(|m| m.as_str())
        .collect();
    let joined = sentences.join(" ");
    let numbers: Vec<f64> = MULTI_DIGIT_NUMBER
        .find_iter(&joined)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if numbers.len() < MIN_MATCHES {
        return None;
    }
    let data = numbers
        .into_iter()
        .take(MAX_KEY_VALUES)
        .enumerate()
        .map(|(i, n)| ChartPoint::new(format!("Value {}", i + 1), n))
        .collect();
    record(ChartType::Bar, "Key Values", "", data)
}
