// Copyright (C) 2022 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::path::PathBuf;

use ansi_term::Colour::{Blue, Cyan, Green, Purple, Red};
use clap::{Parser, ValueHint};
use log::{debug, info};

use rovax_core::route::{RouteAction, RoutePlan};

#[derive(Parser)]
#[clap(author = "Copyright (C) 2022 Laixer Equipment B.V.")]
#[clap(version)]
#[clap(about = "Rovax route plan inspector", long_about = None)]
struct Args {
    /// Route plan file.
    #[clap(value_hint = ValueHint::FilePath)]
    file: PathBuf,

    /// Fail on an invalid plan.
    #[clap(long)]
    check: bool,

    /// Level of verbosity.
    #[clap(short, long, parse(from_occurrences))]
    verbose: usize,
}

fn style_step(index: usize) -> String {
    Purple.paint(format!("[step {:>2}]", index + 1)).to_string()
}

fn style_route(name: &str) -> String {
    Cyan.paint(format!("[route {}]", name)).to_string()
}

fn main() -> anyhow::Result<()> {
    use log::LevelFilter;

    let args = Args::parse();

    let mut log_config = simplelog::ConfigBuilder::new();
    log_config.set_time_level(LevelFilter::Off);
    log_config.set_thread_level(LevelFilter::Off);
    log_config.set_target_level(LevelFilter::Off);
    log_config.set_location_level(LevelFilter::Off);

    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    debug!("Reading route plan from {}", args.file.to_str().unwrap());

    let input = std::fs::read_to_string(&args.file)?;
    let plan = RoutePlan::decode(&input);

    for (index, action) in plan.actions.iter().enumerate() {
        let kind = match action {
            RouteAction::Lateral { .. } => Red.bold().paint("Lateral"),
            RouteAction::Turn { .. } => Green.bold().paint("Turn"),
            RouteAction::Follow { .. } => Cyan.bold().paint("Follow"),
            RouteAction::Command { .. } => Blue.bold().paint("Command"),
        };

        info!("{} {} » {}", style_step(index), kind, action);
    }

    let mut names: Vec<&String> = plan.routes.keys().collect();
    names.sort();

    for name in names {
        let route = &plan.routes[name];
        info!(
            "{} {} point(s) » {:.2} total distance",
            style_route(name),
            route.len(),
            route.length_dist()
        );
    }

    info!(
        "Mission plan holds {} action(s) over {} route(s)",
        plan.actions.len(),
        plan.routes.len()
    );

    if args.check {
        if plan.actions.is_empty() {
            return Err(anyhow::anyhow!("Mission plan is empty"));
        }

        for action in &plan.actions {
            if let RouteAction::Follow { route_name, .. } = action {
                let too_short = plan
                    .routes
                    .get(route_name)
                    .map_or(true, |route| route.len() < 2);

                if too_short {
                    return Err(anyhow::anyhow!("Route {} is too short to pursue", route_name));
                }
            }
        }

        info!("Mission plan is valid");
    }

    Ok(())
}
