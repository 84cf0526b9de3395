//! Reshape dashboard analytics into chart-ready data.
//!
//! Everything here is pure. Empty input yields the same placeholders the
//! dashboard renders: a `[0]` series and a `"No Data"` label.

use std::collections::HashMap;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::error::Error;
use crate::types::{AgentAnalytics, ShortLinkAnalytics};

pub const NO_DATA: &str = "No Data";
pub const OTHER: &str = "Other";
pub const DEFAULT_SERIES_NAME: &str = "Data";

/// Pie chart palette, applied in order.
pub const DEFAULT_COLORS: [&str; 10] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#84CC16", "#F97316",
    "#EC4899", "#6B7280",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeChart {
    pub series: Vec<Series>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Peak {
    /// e.g. `May 3, 2024`
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieChart {
    pub series: Vec<u64>,
    pub labels: Vec<String>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentShare {
    pub name: String,
    pub count: u64,
    /// 0 to 100.
    pub percentage: f64,
}

/// Single series of daily counts.
#[must_use]
pub fn to_series(data: &[ShortLinkAnalytics], name: &str) -> Vec<Series> {
    vec![Series {
        name: name.to_owned(),
        data: counts(data),
    }]
}

/// X-axis labels such as `May 1`. Unparseable dates are shown as sent.
#[must_use]
pub fn to_categories(data: &[ShortLinkAnalytics]) -> Vec<String> {
    if data.is_empty() {
        return vec![NO_DATA.to_owned()];
    }
    data.iter()
        .map(|item| {
            parse_day(&item.date)
                .and_then(|day| {
                    day.format(format_description!("[month repr:short] [day padding:none]"))
                        .ok()
                })
                .unwrap_or_else(|| item.date.clone())
        })
        .collect()
}

#[must_use]
pub fn to_time_chart(data: &[ShortLinkAnalytics], name: &str) -> TimeChart {
    TimeChart {
        series: to_series(data, name),
        categories: to_categories(data),
    }
}

/// One series per named data set, e.g. links created vs. clicks.
#[must_use]
pub fn multiple_series<'a, I>(data_sets: I) -> Vec<Series>
where
    I: IntoIterator<Item = (&'a str, &'a [ShortLinkAnalytics])>,
{
    data_sets
        .into_iter()
        .map(|(name, data)| Series {
            name: name.to_owned(),
            data: counts(data),
        })
        .collect()
}

/// Earliest and latest day present. `None` when no date parses.
#[must_use]
pub fn date_range(data: &[ShortLinkAnalytics]) -> Option<DateRange> {
    let mut days = data.iter().filter_map(|item| parse_day(&item.date));
    let first = days.next()?;
    let (start, end) = days.fold((first, first), |(lo, hi), day| (lo.min(day), hi.max(day)));
    Some(DateRange { start, end })
}

/// Every day from `start` to `end` inclusive, taking the server's row where
/// one exists and a zero count otherwise. When the server sends several rows
/// for one day, the last one is used.
///
/// # Errors
///
/// Returns [`Error::Validation`] if `start` or `end` is not a date.
pub fn fill_missing_dates(
    data: &[ShortLinkAnalytics],
    start: &str,
    end: &str,
) -> Result<Vec<ShortLinkAnalytics>, Error> {
    let start = parse_day(start)
        .ok_or_else(|| Error::Validation(format!("invalid start date {start:?}")))?;
    let end =
        parse_day(end).ok_or_else(|| Error::Validation(format!("invalid end date {end:?}")))?;

    let by_day: HashMap<Date, &ShortLinkAnalytics> = data
        .iter()
        .filter_map(|item| Some((parse_day(&item.date)?, item)))
        .collect();

    let mut filled = Vec::new();
    let mut day = start;
    while day <= end {
        match by_day.get(&day) {
            Some(existing) => filled.push((*existing).clone()),
            None => filled.push(ShortLinkAnalytics {
                date: midnight_utc(day),
                count: 0,
            }),
        }
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }
    Ok(filled)
}

#[must_use]
pub fn total_count(data: &[ShortLinkAnalytics]) -> u64 {
    data.iter().map(|item| item.count).sum()
}

/// Busiest day; the earliest one on ties.
#[must_use]
pub fn peak(data: &[ShortLinkAnalytics]) -> Option<Peak> {
    let (first, rest) = data.split_first()?;
    let best = rest
        .iter()
        .fold(first, |best, item| if item.count > best.count { item } else { best });
    let date = parse_day(&best.date)
        .and_then(|day| {
            day.format(format_description!("[month repr:short] [day padding:none], [year]"))
                .ok()
        })
        .unwrap_or_else(|| best.date.clone());
    Some(Peak {
        date,
        count: best.count,
    })
}

/// Pie chart with the default palette.
#[must_use]
pub fn to_pie_chart(data: &[AgentAnalytics]) -> PieChart {
    to_pie_chart_with_colors(data, &DEFAULT_COLORS)
}

/// Pie chart using `palette`; one color per slice, at least one.
#[must_use]
pub fn to_pie_chart_with_colors(data: &[AgentAnalytics], palette: &[&str]) -> PieChart {
    let (series, labels) = if data.is_empty() {
        (vec![0], vec![NO_DATA.to_owned()])
    } else {
        (
            data.iter().map(|item| item.count).collect(),
            data.iter().map(agent_name).collect(),
        )
    };
    let colors = palette
        .iter()
        .take(data.len().max(1))
        .map(|color| (*color).to_owned())
        .collect();
    PieChart {
        series,
        labels,
        colors,
    }
}

/// The `limit` largest agents, named (`Other` when unnamed).
#[must_use]
pub fn top_agents(data: &[AgentAnalytics], limit: usize) -> Vec<AgentAnalytics> {
    let mut sorted: Vec<AgentAnalytics> = data
        .iter()
        .map(|item| AgentAnalytics {
            name: Some(agent_name(item)),
            count: item.count,
        })
        .collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted.truncate(limit);
    sorted
}

#[must_use]
pub fn agent_percentages(data: &[AgentAnalytics]) -> Vec<AgentShare> {
    let total: u64 = data.iter().map(|item| item.count).sum();
    data.iter()
        .map(|item| AgentShare {
            name: agent_name(item),
            count: item.count,
            percentage: if total > 0 {
                item.count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

fn counts(data: &[ShortLinkAnalytics]) -> Vec<u64> {
    if data.is_empty() {
        return vec![0];
    }
    data.iter().map(|item| item.count).collect()
}

fn agent_name(item: &AgentAnalytics) -> String {
    item.name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(OTHER)
        .to_owned()
}

/// UTC calendar day of an RFC 3339 timestamp or a bare `YYYY-MM-DD`.
fn parse_day(value: &str) -> Option<Date> {
    if let Ok(at) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(at.to_offset(UtcOffset::UTC).date());
    }
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}

fn midnight_utc(day: Date) -> String {
    let date = day
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default();
    format!("{date}T00:00:00.000Z")
}
