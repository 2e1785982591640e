// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

pub mod cut_objects;
pub mod experiment;
pub mod match_ellipses;
