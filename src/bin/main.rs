use cashflow_valuation::{
    config::AppConfig,
    ingest::{self, UploadKind},
    margin_percent,
    report::{format_currency, render_report_html, report_filename},
    sample,
    valuation::{compute_valuation, horizon_mismatch},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::{info, warn};

const USAGE: &str = "usage: valuation [FILE.csv|FILE.xlsx|FILE.xls] [--seed N] [--report OUT_DIR]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env()?;

    let mut input: Option<String> = None;
    let mut seed: u64 = 42;
    let mut report_dir: Option<String> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                seed = args.next().ok_or(USAGE)?.parse()?;
            }
            "--report" => {
                report_dir = Some(args.next().ok_or(USAGE)?);
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            other => input = Some(other.to_string()),
        }
    }

    let summary = match input {
        Some(path) => {
            let path = Path::new(&path);
            let kind = kind_for(path).ok_or(ingest::INVALID_TYPE_MESSAGE)?;
            let bytes = tokio::fs::read(path).await?;
            ingest::validate_size(bytes.len(), config.max_upload_bytes)?;

            info!(file = %path.display(), %kind, "Reading monthly figures");
            let months = ingest::extract_records(kind, &bytes).into_result()?;

            if let Some(mismatch) = horizon_mismatch(&months, config.horizon) {
                warn!(
                    expected = mismatch.expected,
                    found = mismatch.found,
                    "Row count differs from valuation horizon"
                );
            }

            let company = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Company")
                .to_string();
            compute_valuation(company, &months, config.multiple, config.horizon)
        }
        None => {
            info!(seed, "No input file, generating sample data");
            let mut rng = StdRng::seed_from_u64(seed);
            sample::sample_summary(&mut rng, config.multiple, config.horizon)
        }
    };

    println!("\n=== {} ===", summary.company_name);
    println!(
        "{:<8} {:>14} {:>14} {:>14} {:>9}",
        "Month", "Revenue", "Expenses", "Cash Flow", "Margin"
    );
    for month in &summary.months {
        println!(
            "{:<8} {:>14} {:>14} {:>14} {:>9}",
            month.label,
            format_currency(month.revenue),
            format_currency(month.expenses),
            format_currency(month.cash_flow),
            margin_percent(month.cash_flow, month.revenue).unwrap_or_else(|| "—".into()),
        );
    }
    println!(
        "{:<8} {:>14} {:>14} {:>14} {:>9}",
        "Total",
        format_currency(summary.total_revenue),
        format_currency(summary.total_expenses),
        format_currency(summary.total_cash_flow),
        margin_percent(summary.total_cash_flow, summary.total_revenue)
            .unwrap_or_else(|| "—".into()),
    );
    println!("\nAverage monthly cash flow: {}", format_currency(summary.average_monthly_cash_flow));
    println!("Multiple: {}x", summary.multiple);
    println!("DCF valuation: {}", format_currency(summary.dcf_valuation));

    if let Some(dir) = report_dir {
        let today = chrono::Local::now().date_naive();
        let html = render_report_html(&summary, config.horizon, today);
        let out = Path::new(&dir).join(report_filename(&summary.company_name, today));
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(&out, html).await?;
        println!("\nReport written to {}", out.display());
    }

    Ok(())
}

fn kind_for(path: &Path) -> Option<UploadKind> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "csv" => Some(UploadKind::Csv),
        "xlsx" => Some(UploadKind::Xlsx),
        "xls" => Some(UploadKind::Xls),
        _ => None,
    }
}
