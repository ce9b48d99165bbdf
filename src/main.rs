/*
 *  main.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Startup wiring: config, logging, display, buttons, signals
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

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

use cadpager::clock::{SharedClock, SystemClock};
use cadpager::config::{self, Cli, Config, InputModeKind};
use cadpager::coordinator::{EventCoordinator, InputMode};
use cadpager::display::{DisplayFactory, PageController};
use cadpager::input::keyboard::KeyboardInput;
use cadpager::input::{EdgeSource, SwitchDecoder, SwitchPort};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Waits for SIGINT, SIGTERM or SIGHUP and logs which one arrived.
async fn signal_handler() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

fn input_mode<S>(source: S, cfg: &Config) -> InputMode
where
    S: SwitchPort + EdgeSource + 'static,
{
    match cfg.input.mode {
        InputModeKind::Polling => InputMode::Polling {
            port: Box::new(source),
            interval: cfg.input.poll_interval(),
        },
        InputModeKind::Events => InputMode::EventDriven { edges: Box::new(source) },
    }
}

/// Buttons for this run: stdin keys when emulated, GPIO otherwise
fn build_input(cfg: &Config) -> Result<InputMode> {
    if cfg.emulated {
        let keys = KeyboardInput::new(cfg.input.left_bit, cfg.input.right_bit);
        return Ok(input_mode(keys, cfg));
    }

    #[cfg(feature = "gpio")]
    {
        let buttons = cadpager::input::gpio::GpioButtons::new(&cfg.input.pins)
            .context("setting up GPIO buttons")?;
        return Ok(input_mode(buttons, cfg));
    }

    #[cfg(not(feature = "gpio"))]
    {
        warn!("Built without GPIO support, reading buttons from the keyboard");
        let keys = KeyboardInput::new(cfg.input.left_bit, cfg.input.right_bit);
        return Ok(input_mode(keys, cfg));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_from(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", config::dump_config(&cfg)?);
        return Ok(());
    }

    let debug_enabled = cfg.log_level.as_deref() == Some("debug");
    env_logger::Builder::from_env(Env::default().default_filter_or(if debug_enabled {"debug"} else {"info"}))
        .format_timestamp_secs()
        .init();

    info!("{} - every page in its turn", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    // no display, nothing to do
    let display = DisplayFactory::create_from_config(&cfg.display).context("opening display")?;

    let clock: SharedClock = Arc::new(SystemClock);
    let registry = DisplayFactory::create_pages(&cfg.pages, Arc::clone(&clock));
    let controller = PageController::new(display, registry, clock, cfg.timing.backlight())?;

    let decoder = SwitchDecoder::new(cfg.input.left_bit, cfg.input.right_bit);
    let mode = build_input(&cfg)?;
    let coordinator = EventCoordinator::new(controller, decoder, cfg.timing.tick());

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut pager = tokio::spawn(coordinator.run(mode, stop_rx));

    let joined = tokio::select! {
        signalled = signal_handler() => {
            if let Err(e) = signalled {
                error!("Signal handling failed: {}", e);
            }
            if stop_tx.send(true).is_err() {
                warn!("Coordinator already gone");
            }
            (&mut pager).await
        }
        joined = &mut pager => {
            info!("Closed application loop.");
            joined
        }
    };

    let mut controller = joined.context("coordinator task failed")??;

    info!("Main application exiting. Clearing display.");
    if let Err(e) = controller.shutdown() {
        warn!("Failed to blank display: {}", e);
    }
    Ok(())
}
