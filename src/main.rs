//! Cash-Flow Planner CLI
//!
//! Loads a plan document, projects a date range for one or all scenarios,
//! prints the first days and the summary, and optionally exports the full
//! daily table to CSV.

use anyhow::{bail, Context, Result};
use cashflow_planner::rule::{load_historical_entries, ScenarioId};
use cashflow_planner::{PlanDocument, ProjectionResult, ScenarioRunner};
use chrono::{Local, Months, NaiveDate};
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cashflow_planner", version, about = "Project daily cash flow from a plan document")]
struct Args {
    /// Path to the plan document (JSON)
    document: PathBuf,

    /// First day of the projection range (defaults to the starting balance date)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the projection range (defaults to one year after the range start)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Scenario id to project (defaults to the baseline scenario)
    #[arg(long, conflicts_with = "all")]
    scenario: Option<ScenarioId>,

    /// Project every scenario and print one summary per scenario
    #[arg(long)]
    all: bool,

    /// Merge additional historical entries from a CSV file before projecting
    #[arg(long)]
    history: Option<PathBuf>,

    /// Write the full daily table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Number of days to print to the console
    #[arg(long, default_value_t = 14)]
    preview_days: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut document = PlanDocument::from_json_file(&args.document)
        .with_context(|| format!("loading plan document {}", args.document.display()))?;

    if let Some(history_path) = &args.history {
        let entries = load_historical_entries(history_path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("loading history CSV {}", history_path.display()))?;
        println!("Merged {} historical entries from {}", entries.len(), history_path.display());
        document.historical_cash_flows.extend(entries);
    }

    let range_start = args.from.unwrap_or(document.starting_balance_date);
    let range_end = match args.to {
        Some(to) => to,
        None => range_start
            .checked_add_months(Months::new(12))
            .context("projection range end overflows the calendar")?,
    };
    if range_end < range_start {
        bail!("--to {range_end} is before --from {range_start}");
    }

    let today = Local::now().date_naive();
    let runner = ScenarioRunner::new(document, range_start, range_end);

    println!("Cash-Flow Planner v{}", env!("CARGO_PKG_VERSION"));
    println!("Range: {range_start} to {range_end}\n");

    if args.all {
        let mut results = runner.run_all();
        results.sort_by_key(|(id, _)| *id);
        for (scenario_id, result) in &results {
            let name = runner
                .document()
                .scenario(*scenario_id)
                .map_or("?", |s| s.name.as_str());
            println!("Scenario {scenario_id} ({name}):");
            print_summary(result, today);
            println!();
        }
        return Ok(());
    }

    let result = match args.scenario {
        Some(id) => runner
            .run_by_id(id)
            .with_context(|| format!("scenario {id} not found in document"))?,
        None => runner
            .run_baseline()
            .context("document has no baseline scenario; pass --scenario <id>")?,
    };

    print_preview(&result, args.preview_days);
    print_summary(&result, today);

    if let Some(csv_path) = &args.csv {
        write_csv(&result, csv_path)
            .with_context(|| format!("writing {}", csv_path.display()))?;
        println!("\nFull daily table written to: {}", csv_path.display());
    }

    Ok(())
}

fn print_preview(result: &ProjectionResult, preview_days: usize) {
    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Date", "Income", "AcctA", "AcctB", "Variable", "Reno", "OneOff", "NetCF", "Balance"
    );
    println!("{}", "-".repeat(100));

    for record in result.records.iter().take(preview_days) {
        println!(
            "{:>10} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.2}",
            record.date,
            record.income,
            record.account_a,
            record.account_b,
            record.variable,
            record.renovation,
            record.one_off,
            record.net_cash_flow,
            record.running_balance,
        );
    }
    if result.records.len() > preview_days {
        println!("... ({} more days)", result.records.len() - preview_days);
    }
}

fn print_summary(result: &ProjectionResult, today: NaiveDate) {
    let summary = result.summary(today);
    println!("\nSummary:");
    println!("  Current Balance:     ${:.2}", summary.current_balance);
    println!("  Projected End:       ${:.2}", summary.projected_end_of_period);
    println!("  Total Income:        ${:.2}", summary.total_income);
    println!("  Total Expenses:      ${:.2}", summary.total_expenses);
    println!("  Balance Change:      ${:.2}", summary.balance_change);
}

fn write_csv(result: &ProjectionResult, path: &PathBuf) -> std::io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(
        file,
        "Date,Income,AccountA,AccountB,Variable,Renovation,OneOff,NetCashFlow,RunningBalance"
    )?;
    for record in &result.records {
        writeln!(
            file,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            record.date,
            record.income,
            record.account_a,
            record.account_b,
            record.variable,
            record.renovation,
            record.one_off,
            record.net_cash_flow,
            record.running_balance,
        )?;
    }
    Ok(())
}
