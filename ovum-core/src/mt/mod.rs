// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

pub mod annotation;
pub mod matcher;

pub use annotation::{AnnotatedEgg, Point2D, parse_annotations, read_annotations};
pub use matcher::{MatchResult, match_egg, match_table, read_candidates};
