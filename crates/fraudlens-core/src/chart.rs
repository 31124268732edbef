//! Grouped bar chart of fraud counts per merchant category.

use std::fmt::{self, Write as _};

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};

use crate::summary::FraudSummary;

const PALETTE: [&str; 6] = [
    "#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860",
];
const Y_TICKS: usize = 5;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Rotation applied to category labels, in degrees.
    pub label_rotation: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Fraud counts by merchant category".to_string(),
            width: 1000,
            height: 600,
            label_rotation: -45.0,
        }
    }
}

/// Renders the summary as an SVG document: one bar group per category, one colored bar per
/// fraud flag, rotated category labels and a legend.
pub fn render_svg(
    summary: &FraudSummary,
    options: &ChartOptions,
) -> Result<String, fmt::Error> {
    let width = f64::from(options.width);
    let height = f64::from(options.height);
    let (left, right, top, bottom) = (70.0, 150.0, 50.0, 140.0);
    let plot_width = (width - left - right).max(1.0);
    let plot_height = (height - top - bottom).max(1.0);
    let baseline = top + plot_height;

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = options.width,
        h = options.height
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{x}" y="{y}" font-size="18" text-anchor="middle">{title}</text>"#,
        x = width / 2.0,
        y = top / 2.0 + 6.0,
        title = escape_xml(&options.title)
    )?;

    let step = tick_step(summary.max_count());
    let y_max = (step * Y_TICKS).max(1) as f64;
    for tick in 0..=Y_TICKS {
        let value = step * tick;
        let y = baseline - (value as f64 / y_max) * plot_height;
        writeln!(
            svg,
            r##"<line x1="{left}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#e0e0e0"/>"##,
            x2 = left + plot_width
        )?;
        writeln!(
            svg,
            r#"<text x="{x}" y="{ty:.1}" font-size="11" text-anchor="end">{value}</text>"#,
            x = left - 6.0,
            ty = y + 4.0
        )?;
    }
    writeln!(
        svg,
        r#"<text x="16" y="{y}" font-size="12" text-anchor="middle" transform="rotate(-90 16 {y})">count</text>"#,
        y = top + plot_height / 2.0
    )?;

    if summary.is_empty() {
        writeln!(
            svg,
            r#"<text x="{x}" y="{y}" font-size="14" text-anchor="middle">no data</text>"#,
            x = left + plot_width / 2.0,
            y = top + plot_height / 2.0
        )?;
    } else {
        let group_width = plot_width / summary.categories.len() as f64;
        let bar_width = group_width * 0.8 / summary.fraud_labels.len() as f64;

        for (group_idx, category) in summary.categories.iter().enumerate() {
            let group_start = left + group_width * group_idx as f64 + group_width * 0.1;
            for (label_idx, label) in summary.fraud_labels.iter().enumerate() {
                let count = summary.count(category, label);
                if count == 0 {
                    continue;
                }
                let bar_height = (count as f64 / y_max) * plot_height;
                writeln!(
                    svg,
                    r#"<rect x="{x:.1}" y="{y:.1}" width="{bw:.1}" height="{bh:.1}" fill="{fill}"><title>{category} / {label}: {count}</title></rect>"#,
                    x = group_start + bar_width * label_idx as f64,
                    y = baseline - bar_height,
                    bw = bar_width,
                    bh = bar_height,
                    fill = PALETTE[label_idx % PALETTE.len()],
                    category = escape_xml(category),
                    label = escape_xml(label),
                )?;
            }

            let label_x = left + group_width * (group_idx as f64 + 0.5);
            let label_y = baseline + 14.0;
            writeln!(
                svg,
                r#"<text x="{label_x:.1}" y="{label_y:.1}" font-size="11" text-anchor="end" transform="rotate({rotation} {label_x:.1} {label_y:.1})">{text}</text>"#,
                rotation = options.label_rotation,
                text = escape_xml(category)
            )?;
        }
    }

    writeln!(
        svg,
        r#"<line x1="{left}" y1="{baseline}" x2="{x2}" y2="{baseline}" stroke="black"/>"#,
        x2 = left + plot_width
    )?;
    writeln!(
        svg,
        r#"<line x1="{left}" y1="{top}" x2="{left}" y2="{baseline}" stroke="black"/>"#
    )?;

    let legend_x = left + plot_width + 20.0;
    writeln!(
        svg,
        r#"<text x="{legend_x}" y="{y}" font-size="12">is_fraud</text>"#,
        y = top + 10.0
    )?;
    for (idx, label) in summary.fraud_labels.iter().enumerate() {
        let y = top + 22.0 + idx as f64 * 20.0;
        writeln!(
            svg,
            r#"<rect x="{legend_x}" y="{y}" width="12" height="12" fill="{fill}"/>"#,
            fill = PALETTE[idx % PALETTE.len()]
        )?;
        writeln!(
            svg,
            r#"<text x="{x}" y="{ty}" font-size="12">{text}</text>"#,
            x = legend_x + 18.0,
            ty = y + 10.0,
            text = escape_xml(label)
        )?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// One row per category, one column per fraud flag.
pub fn counts_table(summary: &FraudSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    let mut header = vec![Cell::new("category")];
    header.extend(
        summary
            .fraud_labels
            .iter()
            .map(|label| Cell::new(format!("is_fraud={label}"))),
    );
    table.set_header(header);

    for category in &summary.categories {
        let mut row = vec![Cell::new(category)];
        row.extend(
            summary
                .fraud_labels
                .iter()
                .map(|label| Cell::new(summary.count(category, label))),
        );
        table.add_row(row);
    }

    table
}

/// Smallest 1/2/5 x 10^n step so that `Y_TICKS` steps cover `max`.
fn tick_step(max: usize) -> usize {
    let raw = max.div_ceil(Y_TICKS).max(1);
    let mut magnitude = 1usize;
    while magnitude * 10 <= raw {
        magnitude *= 10;
    }
    [1, 2, 5, 10]
        .into_iter()
        .map(|factor| factor * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(raw)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
