/*
MIT License

Copyright (c) 2025 Ameyanagi

Card layouts follow the SAMMY code documentation (ORNL/TM-9179),
Section VI.B card descriptions.
*/

//! Main executable for sammy-par-rs

use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    sammy_par_rs::cli::Cli::parse().run()
}
