// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use javahub_app::{Catalog, TopicId, ViewState};
use javahub_tui::clipboard::Passthrough;
use runtime::{LlmTutor, TerminalRuntime};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `javahub --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    let destination = logging::init(&config)?;
    log::debug!("logging to {destination:?}");

    let catalog_path = options.catalog_path.clone().or_else(|| config.catalog_path());
    let catalog = load_catalog(catalog_path.as_deref())?;
    if options.list {
        print!("{}", catalog_listing(&catalog));
        return Ok(());
    }

    let mut state = initial_state(catalog, config.start_topic()).with_context(|| {
        format!(
            "invalid [ui].start_topic in {}",
            options.config_path.display()
        )
    })?;

    let tutor = if config.llm_enabled() {
        let client = javahub_llm::Client::new(
            config.llm_base_url(),
            config.llm_model(),
            config.llm_timeout()?,
        )
        .with_context(|| {
            format!(
                "invalid [llm] config in {}; fix base_url/model/timeout values",
                options.config_path.display()
            )
        })?;
        Some(LlmTutor::new(client, config.llm_extra_context()))
    } else {
        None
    };
    let run_delay = config.run_delay()?;
    if options.check_only {
        println!("{} topics", state.catalog().len());
        println!("{}", check_mentor(tutor.as_ref())?);
        return Ok(());
    }

    log::info!(
        "starting with {} topics, mentor {}",
        state.catalog().len(),
        if tutor.is_some() { "enabled" } else { "disabled" }
    );
    let mut runtime = TerminalRuntime::new(tutor, run_delay, Passthrough::from_env());
    javahub_tui::run_app(&mut state, &mut runtime)
}

fn check_mentor(tutor: Option<&LlmTutor>) -> Result<String> {
    let Some(tutor) = tutor else {
        return Ok("mentor disabled".to_owned());
    };
    let client = tutor.client();
    client
        .ping()
        .with_context(|| format!("check mentor at {}", client.base_url()))?;
    Ok(format!("mentor ok: {} at {}", client.model(), client.base_url()))
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return Catalog::builtin().context("load built-in catalog");
    };
    let raw =
        fs::read_to_string(path).with_context(|| format!("read catalog {}", path.display()))?;
    Catalog::from_toml_str(&raw).with_context(|| format!("load catalog {}", path.display()))
}

fn initial_state(catalog: Catalog, start_topic: Option<&str>) -> Result<ViewState> {
    let catalog = Arc::new(catalog);
    match start_topic {
        Some(id) => Ok(ViewState::with_selection(catalog, &TopicId::from(id))?),
        None => Ok(ViewState::new(catalog)),
    }
}

fn catalog_listing(catalog: &Catalog) -> String {
    let width = catalog
        .topics()
        .iter()
        .map(|topic| topic.id.as_str().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for topic in catalog.topics() {
        out.push_str(&format!(
            "{:<width$}  {:<12}  {}\n",
            topic.id.as_str(),
            topic.category.label(),
            topic.title,
        ));
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    catalog_path: Option<PathBuf>,
    list: bool,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        catalog_path: None,
        list: false,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--catalog" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--catalog requires a file path"))?;
                options.catalog_path = Some(PathBuf::from(value.as_ref()));
            }
            "--list" => {
                options.list = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("javahub: browse Java topics, run samples, ask the mentor");
    println!("  --config <path>          Use a specific config path");
    println!("  --catalog <path>         Load topics from a TOML catalog");
    println!("  --list                   Print the catalog and exit");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config, catalog and mentor settings");
    println!("  --help                   Show this help");
}
