// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Args;
use futures::stream::{self, StreamExt};
use kdam::BarExt;
use polars::prelude::*;
use serde::Serialize;

use ovum_core::constant;
use ovum_core::cv::CropOptions;
use ovum_core::error::OvumError;
use ovum_core::im::{LabelMask, OvumImage};
use ovum_core::io;
use ovum_core::ut;

use crate::experiment::{ExperimentContext, fail, resolve_threads};

const COMMAND: &str = "cut";

#[derive(Debug, Args)]
#[command(about = "Cut re-centered and de-rotated objects from image and mask pairs.")]
pub struct CutArgs {
    #[arg(short = 'i', long, help = "Image directory.", required = true)]
    pub images: Option<String>,

    #[arg(short = 'm', long, help = "Mask directory. Defaults to the image directory.")]
    pub masks: Option<String>,

    #[arg(short = 'o', long, help = "Output directory.", required = true)]
    pub output: Option<String>,

    #[arg(long, help = "Substring specifying images (e.g. _image).")]
    pub image_substring: Option<String>,

    #[arg(long, help = "Substring specifying masks (e.g. _mask).")]
    pub mask_substring: Option<String>,

    #[arg(
        short = 'p',
        long,
        help = "Padding added around each object after rotation.",
        default_value = "25"
    )]
    pub padding: Option<u32>,

    #[arg(
        long,
        help = "Replace pixels outside the object with the background color.",
        default_value = "true"
    )]
    pub use_mask: Option<bool>,

    #[arg(
        long,
        help = "Background color as one value or one comma separated value per channel. Inferred from the image border if absent.",
        value_delimiter = ','
    )]
    pub bg_color: Option<Vec<f64>>,

    #[arg(
        short = 'e',
        long,
        help = "Format to save object images (e.g. png, tif, npy).",
        default_value = "png"
    )]
    pub image_format: Option<String>,

    #[arg(short = 't', long, help = "Number of threads.")]
    pub threads: Option<usize>,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct CutConfig {
    images: String,
    masks: String,
    image_substring: Option<String>,
    mask_substring: Option<String>,
    crop: CropOptions,
    image_format: String,
    threads: usize,
}

/// Geometry of one saved object
#[derive(Debug, Clone)]
struct ObjectRecord {
    name: String,
    label: u32,
    centroid: [f64; 2],
    orientation: f64,
    bbox: [u32; 4],
}

/// Objects saved from one image and the objects that failed
#[derive(Debug, Default)]
struct ImageSummary {
    objects: Vec<ObjectRecord>,
    failures: Vec<(String, OvumError)>,
}

struct OutputDirs {
    images: PathBuf,
    masks: PathBuf,
    image_format: String,
    mask_format: &'static str,
}

fn cut(
    id: &str,
    image_path: &Path,
    mask_path: &Path,
    options: &CropOptions,
    dirs: &OutputDirs,
) -> Result<ImageSummary, OvumError> {
    let image = OvumImage::open(image_path)?;
    let mut mask = LabelMask::open(mask_path)?;

    if image.width() != mask.width() || image.height() != mask.height() {
        return Err(OvumError::ShapeMismatchError {
            image: (image.height(), image.width()),
            mask: (mask.height(), mask.width()),
        });
    }

    let mut summary = ImageSummary::default();

    for label in mask.relabel() {
        let name = format!("{}_{}", id, label);

        let saved = image
            .canonicalize(&mask.binary(label), options)
            .and_then(|crop| {
                crop.mask
                    .save(dirs.masks.join(format!("{}.{}", name, dirs.mask_format)))?;

                let record = ObjectRecord {
                    name: id.to_string(),
                    label,
                    centroid: crop.centroid,
                    orientation: crop.orientation,
                    bbox: crop.bbox,
                };

                crop.image
                    .save(dirs.images.join(format!("{}.{}", name, dirs.image_format)))?;

                Ok(record)
            });

        match saved {
            Ok(record) => summary.objects.push(record),
            Err(err) => summary.failures.push((name, err)),
        }
    }

    Ok(summary)
}

async fn run_all(
    pairs: Vec<(String, PathBuf, PathBuf)>,
    options: CropOptions,
    dirs: OutputDirs,
    threads: usize,
    verbose: bool,
) -> BTreeMap<String, Result<ImageSummary, OvumError>> {
    let pb = Arc::new(Mutex::new(ut::track::progress_bar(
        pairs.len(),
        "Cutting",
        verbose,
    )));

    let options = Arc::new(options);
    let dirs = Arc::new(dirs);

    stream::iter(pairs)
        .map(|(id, image, mask)| {
            let options = options.clone();
            let dirs = dirs.clone();
            let pb = pb.clone();

            async move {
                let task_id = id.clone();
                let result = tokio::task::spawn_blocking(move || {
                    cut(&id, &image, &mask, &options, &dirs)
                })
                .await
                .unwrap_or_else(|err| {
                    Err(OvumError::OtherError(format!(
                        "Failed to cut objects: {}",
                        err
                    )))
                });

                if verbose {
                    if let Ok(mut pb) = pb.lock() {
                        let _ = pb.update(1);
                    }
                }

                (task_id, result)
            }
        })
        .buffer_unordered(threads)
        .collect::<BTreeMap<_, _>>()
        .await
}

fn object_table(records: &[ObjectRecord]) -> Result<DataFrame, OvumError> {
    let f64_column = |name: &str, f: fn(&ObjectRecord) -> f64| {
        Column::new(name.into(), records.iter().map(f).collect::<Vec<f64>>())
    };

    let u32_column = |name: &str, f: fn(&ObjectRecord) -> u32| {
        Column::new(name.into(), records.iter().map(f).collect::<Vec<u32>>())
    };

    DataFrame::new(vec![
        Column::new(
            "image".into(),
            records.iter().map(|r| r.name.as_str()).collect::<Vec<&str>>(),
        ),
        u32_column("label", |r| r.label),
        f64_column("centroid_row", |r| r.centroid[0]),
        f64_column("centroid_col", |r| r.centroid[1]),
        f64_column("orientation", |r| r.orientation),
        u32_column("bbox_min_row", |r| r.bbox[0]),
        u32_column("bbox_min_col", |r| r.bbox[1]),
        u32_column("bbox_max_row", |r| r.bbox[2]),
        u32_column("bbox_max_col", |r| r.bbox[3]),
    ])
    .map_err(|err| OvumError::TableWriteError(err.to_string()))
}

fn count_table(counts: &[(String, u32)]) -> Result<DataFrame, OvumError> {
    DataFrame::new(vec![
        Column::new(
            "image".into(),
            counts.iter().map(|(id, _)| id.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            "objects".into(),
            counts.iter().map(|(_, n)| *n).collect::<Vec<u32>>(),
        ),
    ])
    .map_err(|err| OvumError::TableWriteError(err.to_string()))
}

pub fn cut_objects(args: &CutArgs) {
    let padding = args.padding.unwrap_or(constant::CROP_PADDING);
    let use_mask = args.use_mask.unwrap_or(true);
    let image_format = args
        .image_format
        .to_owned()
        .unwrap_or("png".to_string())
        .to_lowercase();
    let threads = resolve_threads(COMMAND, args.threads);

    if !constant::SUPPORTED_IMAGE_FORMATS.contains(&image_format.as_str()) {
        fail(
            COMMAND,
            &format!(
                "Invalid image_format {}. Must be one of: {:?}.",
                image_format,
                constant::SUPPORTED_IMAGE_FORMATS
            ),
        );
    }

    if let Some(bg_color) = &args.bg_color {
        if bg_color.is_empty() || bg_color.iter().any(|v| !v.is_finite()) {
            fail(COMMAND, "bg_color must contain one or more finite values.");
        }
    }

    let image_dir = args.images.to_owned().unwrap_or_default();
    let mask_dir = args.masks.to_owned().unwrap_or(image_dir.clone());

    if image_dir == mask_dir && args.image_substring == args.mask_substring {
        fail(
            COMMAND,
            "If images and masks are located in same path, different image and mask substrings must be provided.",
        );
    }

    let image_files = ut::path::collect_file_paths(
        &image_dir,
        constant::SUPPORTED_IMAGE_FORMATS.as_slice(),
        args.image_substring.as_deref(),
    )
    .unwrap_or_else(|err| fail(COMMAND, &err.to_string()));

    let mask_files = ut::path::collect_file_paths(
        &mask_dir,
        constant::SUPPORTED_IMAGE_FORMATS.as_slice(),
        args.mask_substring.as_deref(),
    )
    .unwrap_or_else(|err| fail(COMMAND, &err.to_string()));

    if image_files.is_empty() {
        fail(
            COMMAND,
            "No image files were detected. Please check your path and/or substring identifier.",
        );
    }

    if mask_files.is_empty() {
        fail(
            COMMAND,
            "No mask files were detected. Please check your path and/or substring identifier.",
        );
    }

    let pairs = ut::path::collect_file_pairs(
        &image_files,
        &mask_files,
        args.image_substring.as_deref(),
        args.mask_substring.as_deref(),
    );

    if pairs.is_empty() {
        fail(
            COMMAND,
            "No image and mask pairs share a file name. Please check your substring identifiers.",
        );
    }

    let options = CropOptions {
        padding,
        use_mask,
        bg_color: args.bg_color.clone(),
    };

    let ctx = ExperimentContext::create(COMMAND, args.output.to_owned().unwrap_or_default(), args.verbose)
        .unwrap_or_else(|err| fail(COMMAND, &err.to_string()));

    ctx.save_config(&CutConfig {
        images: image_dir.clone(),
        masks: mask_dir.clone(),
        image_substring: args.image_substring.clone(),
        mask_substring: args.mask_substring.clone(),
        crop: options.clone(),
        image_format: image_format.clone(),
        threads,
    })
    .unwrap_or_else(|err| ctx.abort(&err));

    ctx.log(&format!(
        "Detected {} image and mask pairs.",
        ut::track::thousands_format(pairs.len())
    ));

    let dirs = OutputDirs {
        images: ctx.subdirectory("images").unwrap_or_else(|err| ctx.abort(&err)),
        masks: ctx.subdirectory("masks").unwrap_or_else(|err| ctx.abort(&err)),
        mask_format: if image_format == "npy" { "npy" } else { "png" },
        image_format,
    };

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|err| {
        ctx.abort(&OvumError::OtherError(format!(
            "Failed to start runtime: {}",
            err
        )))
    });

    let results = runtime.block_on(run_all(pairs, options, dirs, threads, ctx.verbose()));

    let mut counts: Vec<(String, u32)> = Vec::new();
    let mut records: Vec<ObjectRecord> = Vec::new();
    let mut errors: Vec<(String, OvumError)> = Vec::new();

    for (id, result) in results {
        match result {
            Ok(summary) => {
                counts.push((id, summary.objects.len() as u32));
                records.extend(summary.objects);
                errors.extend(summary.failures);
            }
            Err(err) => errors.push((id, err)),
        }
    }

    if ctx.verbose() {
        println!();
    }

    ctx.log(&format!(
        "Complete. {} objects cut from {} images.",
        ut::track::thousands_format(records.len()),
        ut::track::thousands_format(counts.len())
    ));

    let mut counts = count_table(&counts).unwrap_or_else(|err| ctx.abort(&err));
    io::write_table_tsv(&mut counts, ctx.path(constant::OBJECT_COUNTS_TSV), true)
        .unwrap_or_else(|err| ctx.abort(&err));

    let mut table = object_table(&records).unwrap_or_else(|err| ctx.abort(&err));
    io::write_table_tsv(&mut table, ctx.path("objects.tsv"), true)
        .unwrap_or_else(|err| ctx.abort(&err));

    let n_errors = ctx.write_errors(&errors).unwrap_or_else(|err| ctx.abort(&err));

    if n_errors > 0 {
        ctx.log(&format!(
            "{} images or objects failed. See {}.",
            ut::track::thousands_format(n_errors),
            constant::ERRORS_TSV
        ));
    }
}
