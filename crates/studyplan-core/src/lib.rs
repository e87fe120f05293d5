pub mod calendar;
pub mod cli;
pub mod collection;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod notes;
pub mod pomodoro;
pub mod render;
pub mod store;
pub mod streak;
pub mod subjects;
pub mod tasks;
pub mod timetable;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let pre = cli::preprocess_args(&raw_args)?;
    let parsed = cli::GlobalCli::parse_from(pre.cleaned_args);

    cli::init_tracing(parsed.verbose, parsed.quiet)?;

    info!(
        verbose = parsed.verbose,
        quiet = parsed.quiet,
        "starting studyplan CLI"
    );
    debug!(?pre.rc_overrides, "preprocessed rc overrides");

    let mut cfg = config::Config::load(parsed.rc_file.as_deref())?;
    cfg.apply_overrides(
        pre.rc_overrides.into_iter().chain(
            parsed
                .rc_overrides
                .into_iter()
                .map(|kv| (kv.key, kv.value)),
        ),
    );

    let data_dir = config::resolve_data_dir(&cfg, parsed.data.as_deref())
        .context("failed to resolve data directory")?;

    let store = store::Store::open(&data_dir)
        .with_context(|| format!("failed to open store at {}", data_dir.display()))?;

    let mut renderer = render::Renderer::new(&cfg)?;

    let command = match parsed.command {
        Some(command) => command,
        None => {
            let name = cfg
                .get("default.command")
                .unwrap_or_else(|| "overview".to_string());
            debug!(command = %name, "no explicit command, using default");
            cli::default_command(&name)?
        }
    };

    commands::dispatch(&store, &mut renderer, command)?;

    info!("done");
    Ok(())
}
