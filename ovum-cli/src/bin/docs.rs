// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use clap::{Parser, Subcommand};
use ovum_cli::cut_objects::CutArgs;
use ovum_cli::match_ellipses::MatchArgs;

#[derive(Parser)]
#[command(name = "ovum", version, about, long_about = None)]
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
    clap_markdown::print_help_markdown::<Cli>();
}
