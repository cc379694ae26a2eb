//! # HTML Report Rendering
//!
//! Turns an assembled [`Report`] into the static page that gets published.
//! The page is one table:
//!
//! | Row                       | Cells per destination              |
//! |---------------------------|------------------------------------|
//! | `Weather Info` (header)   | destination name                   |
//! | Today's Wind Force        | e.g. `Force 4`                     |
//! | Today's Wind Direction    | e.g. `South Westerly`              |
//! | Tomorrow's Wind Force     |                                    |
//! | Tomorrow's Wind Direction |                                    |
//! | `Times` (header)          | destination name                   |
//! | Current Tide Height       | metres, one decimal                |
//! | one row per time slot     | metres if navigable, else blank    |
//!
//! Any value that could not be fetched renders as an empty cell.

use crate::time_grid::TimeSlot;
use crate::wind::WindSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Summary rows preceding the hourly rows (four wind rows and current height)
pub const SUMMARY_ROWS: usize = 5;

/// Everything shown for one destination column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DestinationReport {
    pub name: String,
    pub wind: Option<WindSummary>,
    pub current_height_m: Option<f64>,
    /// One entry per time slot; `None` when not navigable or not fetched
    pub slot_heights: Vec<Option<f64>>,
}

/// One generated report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub slots: Vec<TimeSlot>,
    /// Columns, in destination table order
    pub destinations: Vec<DestinationReport>,
}

const STYLE: &str = r#"<style>
    table {
        width: 100%;
        border-collapse: collapse;
    }
    th, td {
        padding: 5px;
        border: 1px solid #ddd;
        text-align: center;
        word-wrap: break-word;
        white-space: pre-wrap;
    }
    th {
        background-color: #506BCF;
        color: white;
    }
    tr:nth-child(even) {
        background-color: #f2f2f2;
    }
    @media screen and (max-width: 600px) {
        table, th, td {
            width: 100%;
            display: block;
        }
        th {
            display: none;
        }
        td {
            padding-left: 50%;
            text-align: right;
        }
        td:before {
            content: attr(data-header);
            position: absolute;
            left: 15px;
            width: 50%;
            padding-left: 15px;
            font-weight: bold;
            text-align: left;
        }
    }
</style>"#;

/// Height with one decimal, or an empty string.
pub fn format_height(height_m: Option<f64>) -> String {
    height_m.map(|h| format!("{h:.1}")).unwrap_or_default()
}

/// Minimal escaping for text placed inside elements and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Cell builder for one of the four wind rows.
fn wind_cell(pick: fn(&WindSummary) -> String) -> impl Fn(&DestinationReport) -> String {
    move |dest| dest.wind.as_ref().map(pick).unwrap_or_default()
}

/// [`fmt::Display`] adapter that writes a [`Report`] as HTML.
pub struct HtmlReport<'a>(pub &'a Report);

impl HtmlReport<'_> {
    fn header_row(&self, f: &mut fmt::Formatter<'_>, corner: &str) -> fmt::Result {
        write!(f, "<tr><th>{}</th>", escape(corner))?;
        for dest in &self.0.destinations {
            write!(f, "<th>{}</th>", escape(&dest.name))?;
        }
        writeln!(f, "</tr>")
    }

    fn data_row<F>(&self, f: &mut fmt::Formatter<'_>, label: &str, cell: F) -> fmt::Result
    where
        F: Fn(&DestinationReport) -> String,
    {
        write!(f, "<tr><td>{}</td>", escape(label))?;
        for dest in &self.0.destinations {
            write!(
                f,
                "<td data-header=\"{}\">{}</td>",
                escape(&dest.name),
                escape(&cell(dest))
            )?;
        }
        writeln!(f, "</tr>")
    }
}

impl fmt::Display for HtmlReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(f, "<html>")?;
        writeln!(f, "<head>")?;
        writeln!(f, "<meta charset=\"utf-8\">")?;
        writeln!(f, "{STYLE}")?;
        writeln!(f, "</head>")?;
        writeln!(f, "<body>")?;
        writeln!(f, "<table>")?;

        self.header_row(f, "Weather Info")?;
        self.data_row(f, "Today's Wind Force", wind_cell(|w| w.today.force.to_string()))?;
        self.data_row(
            f,
            "Today's Wind Direction",
            wind_cell(|w| w.today.direction.to_string()),
        )?;
        self.data_row(
            f,
            "Tomorrow's Wind Force",
            wind_cell(|w| w.tomorrow.force.to_string()),
        )?;
        self.data_row(
            f,
            "Tomorrow's Wind Direction",
            wind_cell(|w| w.tomorrow.direction.to_string()),
        )?;

        self.header_row(f, "Times")?;
        self.data_row(f, "Current Tide Height", |dest| {
            format_height(dest.current_height_m)
        })?;

        for (i, slot) in self.0.slots.iter().enumerate() {
            self.data_row(f, &slot.to_string(), |dest| {
                format_height(dest.slot_heights.get(i).copied().flatten())
            })?;
        }

        writeln!(f, "</table>")?;
        writeln!(
            f,
            "<p>Generated {}</p>",
            self.0.generated_at.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(f, "</body>")?;
        write!(f, "</html>")
    }
}

/// Render the full HTML document.
pub fn render_html(report: &Report) -> String {
    HtmlReport(report).to_string()
}
