// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::ops::Sub;
use std::path::Path;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::constant;
use crate::cv::draw::rasterize_egg_rectangle;
use crate::error::OvumError;
use crate::im::BinaryMask;
use crate::io::{column_f64, column_str, read_table};
use crate::ut::path::file_stem;

/// A (row, col) point in image coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub row: f64,
    pub col: f64,
}

impl Point2D {
    pub fn new(row: f64, col: f64) -> Point2D {
        Point2D { row, col }
    }

    pub fn is_finite(&self) -> bool {
        self.row.is_finite() && self.col.is_finite()
    }

    #[inline]
    pub fn dot(&self, other: Point2D) -> f64 {
        self.row * other.row + self.col * other.col
    }

    /// Signed area of the parallelogram spanned by the two vectors
    #[inline]
    pub fn cross(&self, other: Point2D) -> f64 {
        self.row * other.col - self.col * other.row
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.row.hypot(self.col)
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, other: Point2D) -> Point2D {
        Point2D::new(self.row - other.row, self.col - other.col)
    }
}

/// A hand annotated egg given by anterior, posterior and lateral landmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedEgg {
    pub image_name: String,
    pub anterior: Point2D,
    pub posterior: Point2D,
    pub lateral: Point2D,
    /// Row of the egg in its annotation table
    pub row: usize,
}

impl AnnotatedEgg {
    pub fn new(
        image_name: &str,
        anterior: Point2D,
        posterior: Point2D,
        lateral: Point2D,
        row: usize,
    ) -> AnnotatedEgg {
        AnnotatedEgg {
            image_name: image_name.to_string(),
            anterior,
            posterior,
            lateral,
            row,
        }
    }

    fn coordinates(&self) -> [f64; 6] {
        [
            self.anterior.row,
            self.anterior.col,
            self.posterior.row,
            self.posterior.col,
            self.lateral.row,
            self.lateral.col,
        ]
    }

    /// Side length of the square canvas used to compare the egg with ellipses
    ///
    /// The canvas spans twice the largest landmark coordinate plus the smallest
    /// one, so that ellipses reaching past the egg are not clipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use ovum_core::mt::{AnnotatedEgg, Point2D};
    ///
    /// let egg = AnnotatedEgg::new(
    ///     "ovary_01",
    ///     Point2D::new(10.0, 50.0),
    ///     Point2D::new(90.0, 50.0),
    ///     Point2D::new(50.0, 20.0),
    ///     0,
    /// );
    ///
    /// assert_eq!(egg.canvas_size().unwrap(), 190);
    /// ```
    pub fn canvas_size(&self) -> Result<u32, OvumError> {
        let coordinates = self.coordinates();

        if coordinates.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(OvumError::AnnotationError(format!(
                "Landmarks of row {} in '{}' must be finite and non-negative",
                self.row, self.image_name
            )));
        }

        let max = coordinates.iter().cloned().fold(f64::MIN, f64::max);
        let min = coordinates.iter().cloned().fold(f64::MAX, f64::min);

        Ok(((2.0 * max + min).floor() as u32).max(1))
    }

    /// Filled rectangle of the egg on its comparison canvas
    pub fn reference_mask(&self) -> Result<BinaryMask, OvumError> {
        let size = self.canvas_size()?;

        if self.anterior == self.posterior {
            return Err(OvumError::AnnotationError(format!(
                "Anterior and posterior landmarks of row {} in '{}' coincide",
                self.row, self.image_name
            )));
        }

        Ok(rasterize_egg_rectangle(
            self.anterior,
            self.posterior,
            self.lateral,
            size,
            size,
        ))
    }
}

/// Image names of an annotation table
///
/// Uses the `image_name` column when present, otherwise derives names from
/// `image_path` by dropping the directory and extension.
fn image_names(df: &DataFrame) -> Result<Vec<Option<String>>, OvumError> {
    let has_column = |name: &str| df.get_column_names().iter().any(|c| c.as_str() == name);

    if has_column(constant::ANNOTATION_IMAGE_NAME) {
        return column_str(df, constant::ANNOTATION_IMAGE_NAME);
    }

    if has_column(constant::ANNOTATION_IMAGE_PATH) {
        return Ok(column_str(df, constant::ANNOTATION_IMAGE_PATH)?
            .into_iter()
            .map(|path| path.and_then(file_stem))
            .collect());
    }

    Err(OvumError::TableReadError(format!(
        "Annotation tables require an '{}' or '{}' column",
        constant::ANNOTATION_IMAGE_NAME,
        constant::ANNOTATION_IMAGE_PATH
    )))
}

/// Parse egg annotations from a table
///
/// Returns one entry per table row. Rows with a missing image name or
/// landmark are returned as an `AnnotationError` so callers can skip them.
///
/// # Arguments
///
/// * `df` - Table with landmark columns `ant_x`, `ant_y`, `post_x`, `post_y`, `lat_x`, `lat_y`
pub fn parse_annotations(df: &DataFrame) -> Result<Vec<Result<AnnotatedEgg, OvumError>>, OvumError> {
    let names = image_names(df)?;

    let landmarks = constant::ANNOTATION_LANDMARK_COLUMNS
        .iter()
        .map(|column| column_f64(df, column))
        .collect::<Result<Vec<Vec<Option<f64>>>, OvumError>>()?;

    let eggs = (0..df.height())
        .map(|row| {
            let name = names[row].clone().ok_or_else(|| {
                OvumError::AnnotationError(format!("Row {} has no image name", row))
            })?;

            let values = landmarks
                .iter()
                .map(|column| column[row])
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| {
                    OvumError::AnnotationError(format!(
                        "Row {} of '{}' has missing landmarks",
                        row, name
                    ))
                })?;

            Ok(AnnotatedEgg::new(
                &name,
                Point2D::new(values[0], values[1]),
                Point2D::new(values[2], values[3]),
                Point2D::new(values[4], values[5]),
                row,
            ))
        })
        .collect();

    Ok(eggs)
}

/// Read an annotation table and parse its eggs
///
/// # Examples
///
/// ```no_run
/// use ovum_core::mt::read_annotations;
///
/// let (table, eggs) = read_annotations("annotations.csv").unwrap();
/// assert_eq!(table.height(), eggs.len());
/// ```
pub fn read_annotations<P: AsRef<Path>>(
    path: P,
) -> Result<(DataFrame, Vec<Result<AnnotatedEgg, OvumError>>), OvumError> {
    let df = read_table(path)?;
    let eggs = parse_annotations(&df)?;
    Ok((df, eggs))
}
