mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use app::DashboardApp;
use chrono::NaiveDate;
use clap::Parser;
use eframe::egui;

use config::{load_config, DashboardConfig};
use data::charts::ChartSelection;
use data::export::save_csv;
use data::loader::{load_file, parse_date};
use data::view::DashboardView;
use state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "enrollment-dashboard",
    version,
    about = "Explore student enrollment records: filters, KPIs, advising flags, CSV export"
)]
struct CliArgs {
    /// CSV, Excel or Parquet file to open (defaults to the configured dataset)
    data: Option<PathBuf>,

    /// JSON config file (defaults to ./dashboard.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Excel sheet to read instead of the first one
    #[arg(long)]
    sheet: Option<String>,

    /// Print KPIs and chart tables to stdout instead of opening a window
    #[arg(long)]
    summary: bool,

    /// Keep only this program (repeatable; summary mode)
    #[arg(long = "program", value_name = "PROGRAM", requires = "summary")]
    programs: Vec<String>,

    /// Keep only this campus (repeatable; summary mode)
    #[arg(long = "campus", value_name = "CAMPUS", requires = "summary")]
    campuses: Vec<String>,

    /// First term date to keep (summary mode)
    #[arg(long, value_parser = cli_date, requires = "summary")]
    from: Option<NaiveDate>,

    /// Last term date to keep (summary mode)
    #[arg(long, value_parser = cli_date, requires = "summary")]
    to: Option<NaiveDate>,

    /// Write the filtered rows to this CSV file (summary mode)
    #[arg(long, value_name = "FILE", requires = "summary")]
    export: Option<PathBuf>,
}

fn cli_date(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("'{s}' is not a date (expected YYYY-MM-DD)"))
}

fn main() -> Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(sheet) = &args.sheet {
        config.excel_sheet = Some(sheet.clone());
    }

    if args.summary {
        run_summary(&args, &config)
    } else {
        run_gui(&args, config)
    }
}

fn run_summary(args: &CliArgs, config: &DashboardConfig) -> Result<()> {
    let path = args
        .data
        .clone()
        .or_else(|| config.default_dataset.clone())
        .context("no dataset given and no default_dataset configured")?;
    let dataset = load_file(&path, &config.load_options())?;

    let filters = report::narrow_filters(&dataset, &args.programs, &args.campuses, args.from, args.to);
    let charts = ChartSelection::default();
    let view = DashboardView::compute(&dataset, &filters, &config.risk, charts);
    print!(
        "{}",
        report::Summary {
            dataset: &dataset,
            view: &view,
            charts,
        }
    );

    if let Some(out) = &args.export {
        save_csv(out, &dataset, &view.indices, &view.flags)?;
    }
    Ok(())
}

fn run_gui(args: &CliArgs, config: DashboardConfig) -> Result<()> {
    let explicit = args.data.clone();
    let fallback = config.default_dataset.clone();
    let mut state = AppState::new(config);

    match (explicit, fallback) {
        (Some(path), _) => state.open_path(&path),
        (None, Some(path)) if path.exists() => state.open_path(&path),
        (None, Some(path)) => log::warn!("Default dataset {} not found", path.display()),
        (None, None) => {}
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Enrollment Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("GUI error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_flags_parse() {
        let args = CliArgs::try_parse_from([
            "enrollment-dashboard",
            "students.csv",
            "--summary",
            "--program",
            "Nursing",
            "--program",
            "Business",
            "--from",
            "2024-01-01",
            "--export",
            "out.csv",
        ])
        .unwrap();
        assert!(args.summary);
        assert_eq!(args.programs, vec!["Nursing", "Business"]);
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn filters_require_summary_mode() {
        assert!(CliArgs::try_parse_from(["enrollment-dashboard", "--campus", "North"]).is_err());
        assert!(CliArgs::try_parse_from(["enrollment-dashboard", "--summary", "--to", "soon"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
