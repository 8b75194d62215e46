//! Valuation report export
//!
//! Renders a summary into a standalone, styled HTML document suitable for
//! download or printing. Formatting is fixed to en-US / USD.

use crate::models::{Horizon, ValuationSummary};
use crate::valuation::margin_percent;
use chrono::NaiveDate;
use std::fmt::Write;

pub const REPORT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Whole-dollar currency, e.g. `$1,234,568` or `-$2,500`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "—".to_string();
    }

    // f64::round is half away from zero, matching Intl.NumberFormat
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Long-form US date, e.g. `October 19, 2026`.
pub fn format_report_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Attachment filename for an exported report.
pub fn report_filename(company_name: &str, date: NaiveDate) -> String {
    let company: String = company_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let company = if company.is_empty() { "Company".to_string() } else { company };

    format!("{}-Valuation-Report-{}.html", company, date.format("%Y-%m-%d"))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn margin_cell(cash_flow: f64, revenue: f64) -> String {
    margin_percent(cash_flow, revenue).unwrap_or_else(|| "—".to_string())
}

const STYLE: &str = r#"
body { font-family: Helvetica, Arial, sans-serif; color: #111827; background: #ffffff; margin: 0; padding: 32px; }
.report { max-width: 960px; margin: 0 auto; }
header { display: flex; justify-content: space-between; border-bottom: 1px solid #d1d5db; padding-bottom: 24px; }
h1 { font-size: 28px; margin: 0 0 8px; }
h2 { font-size: 20px; color: #2563eb; margin: 0; }
h3 { font-size: 20px; border-bottom: 1px solid #e5e7eb; padding-bottom: 8px; }
.meta { text-align: right; font-size: 13px; color: #4b5563; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 24px; }
.row { display: flex; justify-content: space-between; padding: 4px 0; }
.label { font-weight: 600; }
.revenue { color: #16a34a; }
.expenses { color: #dc2626; }
.cashflow { color: #2563eb; }
.valuation { color: #9333ea; font-weight: 700; font-size: 18px; }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th, td { border: 1px solid #d1d5db; padding: 8px 16px; text-align: right; }
th:first-child, td:first-child { text-align: left; }
thead tr { background: #f3f4f6; }
tbody tr:nth-child(even) { background: #f9fafb; }
tr.total { background: #dbeafe; font-weight: 700; }
footer { margin-top: 32px; font-size: 12px; color: #6b7280; border-top: 1px solid #e5e7eb; padding-top: 16px; }
"#;

/// Render the full report document.
pub fn render_report_html(summary: &ValuationSummary, horizon: Horizon, date: NaiveDate) -> String {
    let company = escape_html(&summary.company_name);
    let report_date = format_report_date(date);
    let period = horizon.to_string();

    let mut html = String::with_capacity(8 * 1024);

    // Writing into a String cannot fail
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{company} Valuation Report</title>
<style>{STYLE}</style>
</head>
<body>
<div class="report">
<header>
  <div>
    <h1>Financial Valuation Report</h1>
    <h2>{company}</h2>
    <p>{period} Cash Flow Analysis &amp; DCF Valuation</p>
  </div>
  <div class="meta">
    <p>Report Date: {report_date}</p>
    <p>Valuation Method: Discounted Cash Flow</p>
    <p>Multiple Applied: {multiple}x</p>
  </div>
</header>
"#,
        multiple = summary.multiple,
    );

    let _ = write!(
        html,
        r#"<section>
<h3>Executive Summary</h3>
<div class="grid">
  <div>
    <div class="row"><span class="label">Company:</span><span>{company}</span></div>
    <div class="row"><span class="label">Analysis Period:</span><span>{period}</span></div>
    <div class="row"><span class="label">Valuation Date:</span><span>{report_date}</span></div>
  </div>
  <div>
    <div class="row"><span class="label">Total Revenue:</span><span class="revenue">{revenue}</span></div>
    <div class="row"><span class="label">Net Cash Flow:</span><span class="cashflow">{cash_flow}</span></div>
    <div class="row"><span class="label">DCF Valuation:</span><span class="valuation">{valuation}</span></div>
  </div>
</div>
</section>
"#,
        revenue = format_currency(summary.total_revenue),
        cash_flow = format_currency(summary.total_cash_flow),
        valuation = format_currency(summary.dcf_valuation),
    );

    html.push_str(
        r#"<section>
<h3>Monthly Cash Flow Analysis</h3>
<table>
<thead><tr><th>Month</th><th>Revenue</th><th>Expenses</th><th>Cash Flow</th><th>Margin %</th></tr></thead>
<tbody>
"#,
    );

    for month in &summary.months {
        let _ = writeln!(
            html,
            r#"<tr><td>{}</td><td class="revenue">{}</td><td class="expenses">{}</td><td class="cashflow">{}</td><td>{}</td></tr>"#,
            escape_html(&month.label),
            format_currency(month.revenue),
            format_currency(month.expenses),
            format_currency(month.cash_flow),
            margin_cell(month.cash_flow, month.revenue),
        );
    }

    let _ = write!(
        html,
        r#"<tr class="total"><td>Total</td><td class="revenue">{}</td><td class="expenses">{}</td><td class="cashflow">{}</td><td>{}</td></tr>
</tbody>
</table>
</section>
"#,
        format_currency(summary.total_revenue),
        format_currency(summary.total_expenses),
        format_currency(summary.total_cash_flow),
        margin_cell(summary.total_cash_flow, summary.total_revenue),
    );

    let _ = write!(
        html,
        r#"<section>
<h3>DCF Valuation Summary</h3>
<div class="grid">
  <div>
    <div class="row"><span class="label">Average Monthly Cash Flow:</span><span>{average}</span></div>
    <div class="row"><span class="label">Valuation Multiple:</span><span>{multiple}x</span></div>
    <div class="row"><span class="label">Analysis Period:</span><span>{period}</span></div>
  </div>
  <div>
    <div class="row"><span class="label">Total Cash Flow:</span><span class="cashflow">{total}</span></div>
    <div class="row"><span class="label">Enterprise Value:</span><span class="valuation">{valuation}</span></div>
  </div>
</div>
</section>
<footer>
  <p>Valuation = average monthly cash flow &times; {multiple}. Figures are derived solely from the uploaded monthly data.</p>
  <p>Generated {report_date}</p>
</footer>
</div>
</body>
</html>
"#,
        average = format_currency(summary.average_monthly_cash_flow),
        multiple = summary.multiple,
        total = format_currency(summary.total_cash_flow),
        valuation = format_currency(summary.dcf_valuation),
    );

    html
}
