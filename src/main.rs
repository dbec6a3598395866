#![forbid(unsafe_code)]

mod cli;
mod config;
mod constants;
mod descriptor;
mod notify;
mod persistence;
mod registry;
mod switcher;
mod xkb;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{Level as TraceLevel, debug, error};
use tracing_subscriber::FmtSubscriber;

use cli::{Action, Cli};
use config::{Profile, Settings};
use constants::messages;
use notify::Notifier;
use persistence::Store;
use registry::{ProfileRegistry, RegistryError};
use switcher::Switcher;
use xkb::{LayoutApplier, Setxkbmap};

fn log_level(value: Option<&str>) -> TraceLevel {
    match value.unwrap_or("warn").to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "info" => TraceLevel::INFO,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::WARN,
    }
}

fn print_empty() {
    println!("{}", messages::EMPTY_REGISTRY);
}

fn print_order(registry: &ProfileRegistry) {
    if registry.is_empty() {
        print_empty();
        return;
    }
    for entry in registry.list_order() {
        println!("{entry}");
    }
}

fn print_details(registry: &ProfileRegistry) {
    if registry.is_empty() {
        print_empty();
        return;
    }
    for profile in registry.iter() {
        println!("{profile}");
    }
}

/// Print one mapping; an unknown name is a failure, an empty registry is not
fn print_profile(registry: &ProfileRegistry, name: &str) -> ExitCode {
    match registry.describe(name) {
        Ok(profile) => {
            println!("{profile}");
            ExitCode::SUCCESS
        }
        Err(RegistryError::EmptyRegistry) => {
            print_empty();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run<A: LayoutApplier>(action: Action, switcher: &mut Switcher<A>, notifier: Option<&Notifier>) -> Result<ExitCode> {
    debug!(action = ?action, "Running");
    let notifier = notifier.filter(|_| action.may_notify());

    if action.needs_mappings() && switcher.registry().is_empty() {
        print_empty();
        return Ok(ExitCode::SUCCESS);
    }

    let selected: Option<Profile> = match action {
        Action::Current => {
            match switcher.registry().current_profile() {
                Ok(profile) => println!("{profile}"),
                Err(_) => print_empty(),
            }
            return Ok(ExitCode::SUCCESS);
        }
        Action::List => {
            print_order(switcher.registry());
            return Ok(ExitCode::SUCCESS);
        }
        Action::Details => {
            print_details(switcher.registry());
            return Ok(ExitCode::SUCCESS);
        }
        Action::Show(name) => return Ok(print_profile(switcher.registry(), &name)),
        Action::Add { name, at } => {
            switcher.add_current_layout(&name, at)?;
            return Ok(ExitCode::SUCCESS);
        }
        Action::RemoveNumber(index) => {
            switcher.remove_by_index(index)?;
            return Ok(ExitCode::SUCCESS);
        }
        Action::Remove(name) => {
            switcher.remove_by_name(&name)?;
            return Ok(ExitCode::SUCCESS);
        }
        Action::Order { from, to } => {
            switcher.reorder(from, to)?;
            return Ok(ExitCode::SUCCESS);
        }
        Action::Next => switcher.next()?,
        Action::Previous => switcher.previous()?,
        Action::SetNumber(index) => switcher.select_index(index)?,
        Action::Set(name) => switcher.select_name(&name)?,
        Action::Idle if notifier.is_none() => {
            print_order(switcher.registry());
            return Ok(ExitCode::SUCCESS);
        }
        Action::Idle => None,
    };

    if let Some(notifier) = notifier {
        let current = selected.as_ref().or_else(|| switcher.registry().current_profile().ok());
        if let Some(profile) = current {
            notifier.notify(profile);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let log_level = log_level(std::env::var(constants::env::LOG_LEVEL).ok().as_deref());
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.config_dir.clone());
    let notifier = cli.notify.then(|| Notifier::new(settings.notify_send.clone()));

    Switcher::open(Store::new(&settings.state_dir), Setxkbmap::new(settings.setxkbmap.clone()))
        .and_then(|mut switcher| run(cli.action(), &mut switcher, notifier.as_ref()))
        .inspect_err(log_failure)
}

fn log_failure(e: &anyhow::Error) {
    let reason = format!("{e:#}");
    error!(error = %reason, "kbswitch failed");
}
