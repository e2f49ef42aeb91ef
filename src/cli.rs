use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::commands::CommandReport;
use crate::commands::reconcile::ReconcileOptions;
use crate::commands::scan::ScanOptions;

#[derive(Debug, Parser)]
#[command(
    name = "expedientes",
    version,
    about = "Reconcile legal case-file directory trees into a canonical folder taxonomy"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify, rename and merge each case root's subfolders, then route
    /// loose files; dry-run by default
    Reconcile {
        /// Directory holding the case roots to organize
        #[arg(long)]
        root: Option<PathBuf>,
        /// Institutional judgment-ID prefix identifying case roots
        #[arg(long)]
        prefix: Option<String>,
        /// JSON keyword table (category -> keyword list)
        #[arg(long)]
        keywords: Option<PathBuf>,
        /// Directory for CSV reports and the audit log
        #[arg(long)]
        reports_dir: Option<PathBuf>,
        /// Perform the filesystem mutations instead of only reporting them
        #[arg(long, conflicts_with = "simulate")]
        apply: bool,
        /// Force a dry run even when the config enables apply
        #[arg(long)]
        simulate: bool,
    },
    /// Survey case roots without touching them and report which ones still
    /// need keyword updates or manual review
    Scan {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        keywords: Option<PathBuf>,
        #[arg(long)]
        reports_dir: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Reconcile {
            root,
            prefix,
            keywords,
            reports_dir,
            apply,
            simulate,
        } => {
            let apply = if simulate {
                Some(false)
            } else if apply {
                Some(true)
            } else {
                None
            };
            commands::reconcile::run(&ReconcileOptions {
                root,
                prefix,
                keywords,
                reports_dir,
                apply,
            })?
        }
        Command::Scan {
            root,
            prefix,
            keywords,
            reports_dir,
        } => commands::scan::run(&ScanOptions {
            root,
            prefix,
            keywords,
            reports_dir,
        })?,
    };

    print_report(&report)
}

fn print_report(report: &CommandReport) -> Result<()> {
    for detail in &report.details {
        println!("{detail}");
    }
    for issue in &report.issues {
        eprintln!("issue: {issue}");
    }
    if report.ok {
        Ok(())
    } else {
        anyhow::bail!("{} completed with issues", report.command)
    }
}
