use clap::Parser;
use fintrack::args::{Args, CategoryAction, Command, LimitAction, ReportKind};
use fintrack::report::Month;
use fintrack::{commands, Home, Store};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main_inner(args: Args) -> anyhow::Result<()> {
    trace!("{args:?}");
    let home = Home::new(args.common().fintrack_home().path())?;
    let mut store = Store::load(home);

    let _: () = match args.command() {
        Command::Add(add_args) => commands::add(&mut store, add_args)?.print(),

        Command::Edit(edit_args) => commands::edit(&mut store, edit_args)?.print(),

        Command::Delete(delete_args) => commands::delete(&mut store, delete_args)?.print(),

        Command::List(list_args) => commands::list(&store, list_args)?.print(),

        Command::Category(category_args) => match category_args.action() {
            CategoryAction::Add { kind, name } => {
                commands::category_add(&mut store, *kind, name)?.print()
            }
            CategoryAction::Remove { kind, index } => {
                commands::category_remove(&mut store, *kind, *index)?.print()
            }
            CategoryAction::List { kind } => commands::category_list(&store, *kind)?.print(),
        },

        Command::Limit(limit_args) => match limit_args.action() {
            LimitAction::Set { category, amount } => {
                commands::limit_set(&mut store, category, *amount)?.print()
            }
            LimitAction::Remove { category } => {
                commands::limit_remove(&mut store, category)?.print()
            }
            LimitAction::List => commands::limit_list(&store)?.print(),
        },

        Command::Report(report_args) => match report_args.report() {
            ReportKind::Categories(range) => commands::report_categories(&store, range)?.print(),
            ReportKind::Months(range) => commands::report_months(&store, range)?.print(),
            ReportKind::ByCategory(range) => {
                commands::report_by_category(&store, range)?.print()
            }
        },

        Command::Budget => commands::budget(&store, Month::current())?.print(),

        Command::Export(export_args) => commands::export(&store, export_args)?.print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: log::LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
