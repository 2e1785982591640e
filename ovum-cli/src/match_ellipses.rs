// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use ovum_core::constant;
use ovum_core::cv::ellipse::Ellipse;
use ovum_core::error::OvumError;
use ovum_core::io;
use ovum_core::mt::{self, AnnotatedEgg, MatchResult};
use ovum_core::ut;

use crate::experiment::{ExperimentContext, fail, resolve_threads};

const COMMAND: &str = "match";

#[derive(Debug, Args)]
#[command(about = "Match annotated eggs to fitted candidate ellipses by mask overlap.")]
pub struct MatchArgs {
    #[arg(
        short = 'a',
        long,
        help = "Egg annotation table (csv, tsv or txt).",
        required = true
    )]
    pub annotations: Option<String>,

    #[arg(
        short = 'c',
        long,
        help = "Directory of candidate ellipse tables named {image_name}.csv.",
        required = true
    )]
    pub candidates: Option<String>,

    #[arg(short = 'o', long, help = "Output directory.", required = true)]
    pub output: Option<String>,

    #[arg(
        long,
        help = "Minimum Jaccard overlap for accepting a candidate.",
        default_value = "0.4"
    )]
    pub overlap_threshold: Option<f64>,

    #[arg(
        short = 'f',
        long,
        help = "Format of the match table (csv, tsv, txt, pq, parquet).",
        default_value = "csv"
    )]
    pub table_format: Option<String>,

    #[arg(short = 't', long, help = "Number of threads.")]
    pub threads: Option<usize>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct MatchConfig {
    annotations: String,
    candidates: String,
    overlap_threshold: f64,
    table_format: String,
    threads: usize,
}

fn candidate_path(directory: &Path, image_name: &str) -> PathBuf {
    directory.join(format!("{}.csv", image_name))
}

fn egg_id(egg: &AnnotatedEgg) -> String {
    format!("{}_row{}", egg.image_name, egg.row)
}

pub fn match_ellipses(args: &MatchArgs) {
    let overlap_threshold = args.overlap_threshold.unwrap_or(constant::OVERLAP_THRESHOLD);
    let table_format = args.table_format.to_owned().unwrap_or("csv".to_string());
    let threads = resolve_threads(COMMAND, args.threads);

    if !(0.0..=1.0).contains(&overlap_threshold) {
        fail(COMMAND, "overlap_threshold must be between 0 and 1.");
    }

    if !constant::SUPPORTED_OUTPUT_TABLE_FORMATS.contains(&table_format.as_str()) {
        fail(
            COMMAND,
            &format!(
                "Invalid table_format {}. Must be one of: {:?}.",
                table_format,
                constant::SUPPORTED_OUTPUT_TABLE_FORMATS
            ),
        );
    }

    let annotations = args.annotations.to_owned().unwrap_or_default();
    let candidates = args.candidates.to_owned().unwrap_or_default();

    let candidate_dir = PathBuf::from(&candidates);
    if !candidate_dir.is_dir() {
        fail(
            COMMAND,
            &format!("Candidate directory {} does not exist.", candidates),
        );
    }

    let (table, parsed) =
        mt::read_annotations(&annotations).unwrap_or_else(|err| fail(COMMAND, &err.to_string()));

    let ctx = ExperimentContext::create(COMMAND, args.output.to_owned().unwrap_or_default(), args.verbose)
        .unwrap_or_else(|err| fail(COMMAND, &err.to_string()));

    ctx.save_config(&MatchConfig {
        annotations: annotations.clone(),
        candidates: candidates.clone(),
        overlap_threshold,
        table_format: table_format.clone(),
        threads,
    })
    .unwrap_or_else(|err| ctx.abort(&err));

    let mut errors: Vec<(String, OvumError)> = Vec::new();
    let mut eggs: Vec<AnnotatedEgg> = Vec::with_capacity(parsed.len());

    for (row, egg) in parsed.into_iter().enumerate() {
        match egg {
            Ok(egg) => eggs.push(egg),
            Err(err) => errors.push((format!("row{}", row), err)),
        }
    }

    if !errors.is_empty() {
        ctx.log(&format!(
            "Skipping {} annotation rows with missing or invalid fields.",
            ut::track::thousands_format(errors.len())
        ));
    }

    ctx.log(&format!(
        "Detected {} annotated eggs across {} images.",
        ut::track::thousands_format(eggs.len()),
        ut::track::thousands_format(
            eggs.iter()
                .map(|egg| egg.image_name.as_str())
                .collect::<BTreeSet<&str>>()
                .len()
        )
    ));

    let images: Vec<(String, PathBuf)> = eggs
        .iter()
        .map(|egg| egg.image_name.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .map(|name| {
            let path = candidate_path(&candidate_dir, &name);
            (name, path)
        })
        .collect();

    let candidates: BTreeMap<String, Result<Vec<Ellipse>, OvumError>> =
        ut::pool::run_tasks(images, threads, "Loading", args.verbose, mt::read_candidates)
            .unwrap_or_else(|err| ctx.abort(&err));

    let tasks: Vec<(String, AnnotatedEgg)> =
        eggs.into_iter().map(|egg| (egg_id(&egg), egg)).collect();

    let results = ut::pool::run_tasks(tasks, threads, "Matching", args.verbose, |egg| {
        match candidates.get(&egg.image_name) {
            Some(Ok(ellipses)) => mt::match_egg(&egg, ellipses, overlap_threshold),
            Some(Err(err)) => Err(err.clone()),
            None => Err(OvumError::MissingCandidatesError(egg.image_name.clone())),
        }
    })
    .unwrap_or_else(|err| ctx.abort(&err));

    let mut matches: Vec<MatchResult> = Vec::with_capacity(results.len());
    for (id, result) in results {
        match result {
            Ok(result) => matches.push(result),
            Err(err) => errors.push((id, err)),
        }
    }

    matches.sort_by_key(|result| result.egg.row);

    let accepted = matches.iter().filter(|m| m.ellipse.is_some()).count();

    if args.verbose {
        println!();
    }

    ctx.log(&format!(
        "Complete. {} of {} eggs matched a candidate, {} below the overlap threshold.",
        ut::track::thousands_format(accepted),
        ut::track::thousands_format(matches.len()),
        ut::track::thousands_format(matches.len() - accepted),
    ));

    let mut df = mt::match_table(&table, &matches).unwrap_or_else(|err| ctx.abort(&err));

    io::write_table(&mut df, ctx.path(&format!("matches.{}", table_format)))
        .unwrap_or_else(|err| ctx.abort(&err));

    let n_errors = ctx.write_errors(&errors).unwrap_or_else(|err| ctx.abort(&err));

    if n_errors > 0 {
        ctx.log(&format!(
            "{} rows could not be matched. See {}.",
            ut::track::thousands_format(n_errors),
            constant::ERRORS_TSV
        ));
    }
}
