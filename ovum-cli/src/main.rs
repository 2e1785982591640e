// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use clap::{Parser, Subcommand};
use ovum_cli::cut_objects::{CutArgs, cut_objects};
use ovum_cli::match_ellipses::{MatchArgs, match_ellipses};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Match(MatchArgs),
    Cut(CutArgs),
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Match(match_args)) => match_ellipses(match_args),
        Some(Commands::Cut(cut_args)) => cut_objects(cut_args),
        None => {}
    }
}
