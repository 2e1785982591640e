// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

// All currently supported image formats
pub const SUPPORTED_IMAGE_FORMATS: [&str; 18] = [
    "avif", "bmp", "dds", "hdr", "ico", "jpeg", "jpg", "exr", "png", "pbm", "pgm", "ppm", "qoi",
    "tga", "tif", "tiff", "webp", "npy",
];

// The currently supported common image formats
pub const IMAGE_DYNAMIC_FORMATS: [&str; 17] = [
    "avif", "bmp", "dds", "hdr", "ico", "jpeg", "jpg", "exr", "png", "pbm", "pgm", "ppm", "qoi",
    "tga", "tif", "tiff", "webp",
];

// Delimited table formats accepted for annotations and candidates
pub const SUPPORTED_TABLE_FORMATS: [&str; 3] = ["csv", "tsv", "txt"];

// Table formats accepted for the match output
pub const SUPPORTED_OUTPUT_TABLE_FORMATS: [&str; 5] = ["csv", "tsv", "txt", "pq", "parquet"];

// Landmark columns of the egg annotation table, stored as (row, col) pairs
pub const ANNOTATION_LANDMARK_COLUMNS: [&str; 6] =
    ["ant_x", "ant_y", "post_x", "post_y", "lat_x", "lat_y"];

pub const ANNOTATION_IMAGE_NAME: &str = "image_name";
pub const ANNOTATION_IMAGE_PATH: &str = "image_path";

// Columns of a fitted ellipse candidate table
pub const ELLIPSE_COLUMNS: [&str; 5] = ["x", "y", "a", "b", "theta"];

// Prefix given to ellipse fields in the match table
pub const ELLIPSE_PREFIX: &str = "ellipse_";
pub const ELLIPSE_JACCARD: &str = "ellipse_Jaccard";

// Default minimum Jaccard overlap for accepting a candidate
pub const OVERLAP_THRESHOLD: f64 = 0.4;

// Default crop padding in pixels
pub const CROP_PADDING: u32 = 25;

// Experiment bookkeeping file names
pub const CONFIG_JSON: &str = "config.json";
pub const LOG_FILE: &str = "log.txt";
pub const ERRORS_TSV: &str = "errors.tsv";
pub const OBJECT_COUNTS_TSV: &str = "object_counts.tsv";
