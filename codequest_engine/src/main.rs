#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** CodeQuest **
//! Learn programming basics by steering a character through five levels.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use log::info;

use codequest_engine::campaign::Campaign;
use codequest_engine::loader::{default_settings, resolve_catalog};
use codequest_engine::{CODEQUEST_VERSION, run_repl};

const USAGE: &str = "Usage: codequest_engine [--catalog <levels.toml>]";

fn main() -> Result<()> {
    env_logger::init();
    let catalog_path = parse_args(env::args().skip(1))?;

    info!("Start: loading CodeQuest levels...");
    let catalog = resolve_catalog(catalog_path.as_deref()).context("while loading the level catalog")?;
    let settings = default_settings();
    let mut campaign = Campaign::new(catalog, settings).context("while starting the campaign")?;
    info!("{} levels ready", campaign.levels().len());

    // clear the screen
    print!("\x1B[2J\x1B[H");
    io::stdout().flush().context("flushing stdout")?;

    let title = format!("CODEQUEST v{CODEQUEST_VERSION}");
    println!("{:^84}", title.bright_yellow().underline());
    println!(
        "\n{}\n",
        "Write code, run it, and watch your character follow along. Type `help` for commands.".italic()
    );

    run_repl(&mut campaign)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>> {
    let mut catalog = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--catalog" => {
                let Some(path) = args.next() else {
                    bail!("--catalog requires a path\n{USAGE}");
                };
                catalog = Some(PathBuf::from(path));
            },
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            },
            other => bail!("unexpected argument '{other}'\n{USAGE}"),
        }
    }
    Ok(catalog)
}
