//! Loan Projection CLI
//!
//! Command-line interface for amortization schedules, buy-vs-rent
//! comparisons and refinance checks

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use loan_projection::amortization::{prepayment_savings, try_generate_schedule, Schedule};
use loan_projection::comparison::{analyze_refinance, ComparisonResult, RefinanceInputs};
use loan_projection::loan::{load_loans, ExtraFrequency, LoanTerms, LumpSum};
use loan_projection::rates::round_currency;
use loan_projection::scenario::{ComparisonScenario, ScenarioRunner};

/// Amortization schedules and long-horizon loan comparisons
#[derive(Parser)]
#[command(name = "loan-projection", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an amortization schedule and optionally write it to CSV/JSON
    Schedule(ScheduleArgs),
    /// Summarize every loan in a CSV file
    Batch(BatchArgs),
    /// Project a buy-vs-rent scenario from a JSON file
    Compare(CompareArgs),
    /// Compare keeping a loan against refinancing its balance
    Refinance(RefinanceArgs),
}

#[derive(Args)]
struct LoanArgs {
    /// Amount borrowed
    #[arg(long)]
    principal: f64,
    /// Nominal annual rate in percent (6.5 == 6.5%)
    #[arg(long)]
    rate: f64,
    /// Term in months
    #[arg(long)]
    months: u32,
}

#[derive(Args)]
struct ScheduleArgs {
    #[command(flatten)]
    loan: LoanArgs,
    /// Recurring extra principal payment
    #[arg(long, default_value_t = 0.0)]
    extra: f64,
    /// none, monthly, quarterly or yearly
    #[arg(long, default_value_t = ExtraFrequency::None)]
    frequency: ExtraFrequency,
    /// One-time prepayment as PERIOD:AMOUNT, repeatable
    #[arg(long = "lump-sum", value_parser = parse_lump_sum)]
    lump_sums: Vec<LumpSum>,
    /// Loan start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,
    /// Rows to print to the console
    #[arg(long, default_value_t = 24)]
    rows: usize,
    /// Write every period to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Print the full schedule as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// CSV with Name,Principal,AnnualRatePct,TermMonths[,ExtraPayment,ExtraFrequency,StartDate]
    input: PathBuf,
    /// Summary CSV to write
    #[arg(long, default_value = "loan_summary.csv")]
    output: PathBuf,
}

#[derive(Args)]
struct CompareArgs {
    /// Scenario JSON with ownership, rental and projection sections
    scenario: PathBuf,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
    /// Investment returns to sweep, e.g. 0.03,0.05,0.07
    #[arg(long, value_delimiter = ',')]
    returns: Vec<f64>,
}

#[derive(Args)]
struct RefinanceArgs {
    #[command(flatten)]
    loan: LoanArgs,
    /// Payments already made
    #[arg(long)]
    elapsed: u32,
    /// New loan rate in percent
    #[arg(long)]
    new_rate: f64,
    /// New loan term in months
    #[arg(long)]
    new_months: u32,
    #[arg(long, default_value_t = 0.0)]
    closing_costs: f64,
    /// Finance the closing costs
    #[arg(long)]
    roll: bool,
}

fn parse_lump_sum(raw: &str) -> Result<LumpSum, String> {
    let (period, amount) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected PERIOD:AMOUNT, got {}", raw))?;
    let period = period.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let amount = amount.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok(LumpSum { period, amount })
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Schedule(args) => run_schedule(args),
        Command::Batch(args) => run_batch(args),
        Command::Compare(args) => run_compare(args),
        Command::Refinance(args) => run_refinance(args),
    }
}

fn run_schedule(args: ScheduleArgs) -> Result<()> {
    let mut terms = LoanTerms::new(args.loan.principal, args.loan.rate, args.loan.months)
        .with_extra(args.extra, args.frequency);
    terms.lump_sums = args.lump_sums;
    terms.start_date = args.start_date;

    let schedule = try_generate_schedule(&terms).context("Invalid loan terms")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        print_schedule(&terms, &schedule, args.rows);
        if terms.has_extras() {
            let savings = prepayment_savings(&terms)?;
            println!("\nExtra payments:");
            println!("  Interest saved: ${:.2}", savings.interest_saved);
            println!("  Periods saved:  {}", savings.periods_saved);
        }
    }

    if let Some(path) = args.csv {
        write_schedule_csv(&path, &schedule)?;
        println!("\nFull schedule written to: {}", path.display());
    }

    Ok(())
}

fn print_schedule(terms: &LoanTerms, schedule: &Schedule, rows: usize) {
    println!("Loan: ${:.2} at {}% for {} months", terms.principal, terms.annual_rate_pct, terms.term_periods);
    println!("  Payment: ${:.2}", schedule.totals.periodic_payment);
    println!();

    println!("{:>6} {:>12} {:>12} {:>12} {:>12} {:>14}", "Period", "Interest", "Principal", "Extra", "Paid", "Balance");
    println!("{}", "-".repeat(74));

    for row in schedule.periods.iter().take(rows) {
        println!(
            "{:>6} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.period, row.interest, row.scheduled_principal, row.extra, row.total_paid, row.ending_balance,
        );
    }

    if schedule.periods.len() > rows {
        println!("... ({} more periods)", schedule.periods.len() - rows);
    }

    println!("\nYearly summary:");
    println!("{:>4} {:>12} {:>12} {:>12} {:>14} {:>8}", "Year", "Interest", "Principal", "Extra", "Balance", "Paid %");
    for year in &schedule.years {
        println!(
            "{:>4} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>7.1}%",
            year.year, year.interest, year.scheduled_principal, year.extra, year.ending_balance, year.loan_paid_to_date,
        );
    }

    let totals = &schedule.totals;
    println!("\nSummary:");
    println!("  Periods:        {}", totals.num_periods);
    println!("  Total interest: ${:.2}", totals.total_interest);
    println!("  Total paid:     ${:.2}", totals.total_paid);
    if let Some(date) = totals.payoff_date {
        println!("  Payoff date:    {}", date);
    }
}

fn write_schedule_csv(path: &Path, schedule: &Schedule) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    for row in &schedule.periods {
        writer.serialize(row.rounded())?;
    }
    writer.flush()?;
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<()> {
    let loans = load_loans(&args.input)
        .with_context(|| format!("Failed to load loans from {}", args.input.display()))?;
    info!("Loaded {} loans", loans.len());

    let summaries = ScenarioRunner::default().summarize_batch(&loans);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Unable to create {}", args.output.display()))?;
    for summary in &summaries {
        writer.serialize(summary)?;
    }
    writer.flush()?;

    let rejected = summaries.iter().filter(|s| !s.valid).count();
    println!("Summarized {} loans ({} rejected) to {}", summaries.len(), rejected, args.output.display());
    Ok(())
}

fn run_compare(args: CompareArgs) -> Result<()> {
    let scenario = ComparisonScenario::from_json_path(&args.scenario)
        .with_context(|| format!("Failed to read scenario {}", args.scenario.display()))?;
    let result = scenario.run().context("Scenario cannot be projected")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_comparison(&result);
    }

    if !args.returns.is_empty() {
        let (ownership, rental) = scenario.build_models()?;
        let runner = ScenarioRunner::new(scenario.projection.clone());
        println!("\nInvestment return sensitivity:");
        for point in runner.return_sensitivity(&ownership, &rental, &args.returns) {
            let year = point
                .break_even_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "none".to_string());
            println!("  {:>6.2}%  break-even year: {}", point.investment_return * 100.0, year);
        }
    }

    Ok(())
}

fn print_comparison(result: &ComparisonResult) {
    let (a, b) = (&result.label_a, &result.label_b);
    println!(
        "{:>4} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "Year",
        format!("{} cost", a),
        format!("{} cost", b),
        format!("{} equity", a),
        format!("{} net", a),
        format!("{} net", b),
    );
    println!("{}", "-".repeat(80));

    for row in &result.comparison {
        println!(
            "{:>4} {:>14.0} {:>14.0} {:>14.0} {:>14.0} {:>14.0}",
            row.year,
            round_currency(row.cumulative_cost_a),
            round_currency(row.cumulative_cost_b),
            round_currency(row.equity_a),
            round_currency(row.net_position_a),
            round_currency(row.net_position_b),
        );
    }

    match (result.break_even_year, result.break_even_strategy) {
        (Some(year), Some(strategy)) => println!("\n{} becomes cheaper in year {}", result.label(strategy), year),
        _ => println!("\nNo break-even within {} years", result.comparison.len()),
    }

    let crossings = result.crossings();
    if crossings.len() > 1 {
        let later: Vec<u32> = crossings.iter().skip(1).map(|c| c.year).collect();
        println!(
            "  (curves cross {} times; later crossings in years {:?})",
            crossings.len(),
            later
        );
    }
}

fn run_refinance(args: RefinanceArgs) -> Result<()> {
    if args.new_months == 0 {
        bail!("--new-months must be at least 1");
    }

    let inputs = RefinanceInputs {
        current: LoanTerms::new(args.loan.principal, args.loan.rate, args.loan.months),
        periods_elapsed: args.elapsed,
        new_rate_pct: args.new_rate,
        new_term_periods: args.new_months,
        closing_costs: args.closing_costs,
        roll_costs_into_loan: args.roll,
    };
    let analysis = analyze_refinance(&inputs).context("Refinance cannot be analyzed")?;

    println!("Remaining balance:  ${:.2}", analysis.remaining_balance);
    println!("Current payment:    ${:.2}", analysis.current_payment);
    println!("New payment:        ${:.2}", analysis.new_payment);
    println!("Monthly savings:    ${:.2}", analysis.periodic_savings);
    println!("Lifetime savings:   ${:.2}", analysis.lifetime_savings);
    match analysis.break_even_period {
        Some(period) => println!("Break-even after:   {} payments", period),
        None => println!("Break-even after:   never"),
    }

    Ok(())
}
