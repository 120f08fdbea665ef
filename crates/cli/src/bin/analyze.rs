use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use models::ViewMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "analyze", about = "Aggregate an expense records file into monthly or yearly totals.")]
struct Args {
    /// Path to a JSON array of expense records (e.g., data/user.json)
    #[arg(short, long)]
    input: PathBuf,

    /// View mode: monthly (current year, truncated at today) or yearly (full history)
    #[arg(short, long, default_value = "monthly")]
    view: String,

    /// Override "today" (YYYY-MM-DD); defaults to the local date
    #[arg(long)]
    today: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn parse_view(s: &str) -> Result<ViewMode> {
    match s {
        "monthly" => Ok(ViewMode::Monthly),
        "yearly" => Ok(ViewMode::Yearly),
        other => Err(anyhow!("invalid view mode '{}', expected 'monthly' or 'yearly'", other)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let view = parse_view(&args.view)?;
    let today = match &args.today {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| anyhow!("invalid --today '{}', expected YYYY-MM-DD", s))?,
        None => Local::now().date_naive(),
    };

    let records = analysis::load_records(&args.input)?;
    let result = analysis::analyze(&records, view, today);

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);
    Ok(())
}
