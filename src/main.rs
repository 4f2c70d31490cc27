/*
 *  main.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Command-line front end: configure, initialise, run requests, flush
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use lcd5110::config::{self, Cli, Config};
use lcd5110::display::drivers::MockTransport;
use lcd5110::display::{Pcd8544Driver, Request, SharedDisplay, Transport};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Initialise the panel, replay the requests and push whatever is left dirty
fn run<T: Transport>(transport: T, cfg: &Config, requests: &[Request]) -> Result<()> {
    let mut driver = Pcd8544Driver::with_config(transport, cfg.display_config());
    driver.init(cfg.contrast()).context("initialising display")?;

    let display = SharedDisplay::new(driver);
    for request in requests {
        display
            .dispatch(request)
            .with_context(|| format!("executing {:?}", request))?;
    }
    display.dispatch(&Request::Flush).context("final flush")?;

    info!("{} request(s) done", requests.len());
    Ok(())
}

#[cfg(feature = "hardware")]
fn run_hardware(cfg: &Config, requests: &[Request]) -> Result<()> {
    let transport = lcd5110::display::drivers::open_linux(&cfg.bus()).context("opening PCD8544")?;
    run(transport, cfg, requests)
}

#[cfg(not(feature = "hardware"))]
fn run_hardware(_cfg: &Config, _requests: &[Request]) -> Result<()> {
    anyhow::bail!("built without the `hardware` feature, only --dry-run is available")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        println!("{}", cfg.to_yaml()?);
        return Ok(());
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} - Nokia 5110 display tool", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let requests = match cli.command.as_ref() {
        Some(command) => command.to_requests()?,
        None => Vec::new(),
    };

    if !cli.dry_run {
        if cli.pbm.is_some() {
            warn!("--pbm only applies with --dry-run, ignoring");
        }
        return run_hardware(&cfg, &requests);
    }

    let mock = MockTransport::new();
    run(mock.clone(), &cfg, &requests)?;
    info!("Dry run sent {} bytes", mock.bytes_sent());

    let panel = mock.panel();
    print!("{}", panel.to_ascii());
    if let Some(path) = cli.pbm.as_ref() {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        panel.write_pbm(BufWriter::new(file))?;
        info!("Saved panel image to {}", path.display());
    }
    Ok(())
}
