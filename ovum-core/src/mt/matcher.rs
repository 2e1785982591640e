// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constant;
use crate::cv::draw::rasterize_ellipse;
use crate::cv::ellipse::Ellipse;
use crate::cv::overlap::jaccard;
use crate::error::OvumError;
use crate::io::{column_f64, read_table};
use crate::mt::annotation::{AnnotatedEgg, Point2D};

/// Best candidate ellipse for one annotated egg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub egg: AnnotatedEgg,
    /// Canonicalized winning candidate, absent when below the overlap threshold
    pub ellipse: Option<Ellipse>,
    /// Jaccard overlap of the best candidate
    pub score: f64,
}

/// Select the candidate ellipse that best overlaps an annotated egg
///
/// The egg is drawn as a filled rectangle and every candidate as a filled
/// ellipse on a shared square canvas. The candidate with the highest Jaccard
/// overlap wins, the first one on ties. Winners below `overlap_threshold`
/// are reported by score only.
///
/// # Arguments
///
/// * `egg` - Annotated egg landmarks
/// * `candidates` - Candidate ellipses fitted on the same image
/// * `overlap_threshold` - Minimum Jaccard overlap for a match
///
/// # Examples
///
/// ```
/// use ovum_core::cv::ellipse::Ellipse;
/// use ovum_core::mt::{AnnotatedEgg, Point2D, match_egg};
///
/// let egg = AnnotatedEgg::new(
///     "ovary_01",
///     Point2D::new(10.0, 50.0),
///     Point2D::new(90.0, 50.0),
///     Point2D::new(50.0, 20.0),
///     0,
/// );
///
/// let candidates = [Ellipse::new(Point2D::new(50.0, 50.0), 40.0, 20.0, 0.0)];
/// let result = match_egg(&egg, &candidates, 0.4).unwrap();
///
/// assert!(result.ellipse.is_some());
/// assert!((result.score - 0.505).abs() < 0.01);
/// ```
pub fn match_egg(
    egg: &AnnotatedEgg,
    candidates: &[Ellipse],
    overlap_threshold: f64,
) -> Result<MatchResult, OvumError> {
    if candidates.is_empty() {
        return Err(OvumError::MissingCandidatesError(egg.image_name.clone()));
    }

    let reference = egg.reference_mask()?;
    let (width, height) = (reference.width(), reference.height());

    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let score = jaccard(&reference, &rasterize_ellipse(candidate, width, height))?;

        if best.is_none_or(|(_, top)| score > top) {
            best = Some((i, score));
        }
    }

    let (index, score) = best.ok_or(OvumError::MissingCandidatesError(egg.image_name.clone()))?;

    let ellipse = if score >= overlap_threshold {
        Some(candidates[index].canonicalize())
    } else {
        None
    };

    Ok(MatchResult {
        egg: egg.clone(),
        ellipse,
        score,
    })
}

/// Read candidate ellipses from a table with columns `x`, `y`, `a`, `b`, `theta`
///
/// Rows with a missing value or a non-positive radius are dropped. A missing file or a table without
/// usable rows is reported as `MissingCandidatesError`.
pub fn read_candidates<P: AsRef<Path>>(path: P) -> Result<Vec<Ellipse>, OvumError> {
    let display = path.as_ref().display().to_string();

    if !path.as_ref().is_file() {
        return Err(OvumError::MissingCandidatesError(display));
    }

    let df = read_table(&path)?;

    let columns = constant::ELLIPSE_COLUMNS
        .iter()
        .map(|column| column_f64(&df, column))
        .collect::<Result<Vec<Vec<Option<f64>>>, OvumError>>()?;

    let candidates: Vec<Ellipse> = (0..df.height())
        .filter_map(|row| {
            let v = columns
                .iter()
                .map(|column| column[row])
                .collect::<Option<Vec<f64>>>()?;

            Some(Ellipse::new(Point2D::new(v[0], v[1]), v[2], v[3], v[4]))
        })
        .filter(Ellipse::is_valid)
        .collect();

    if candidates.is_empty() {
        return Err(OvumError::MissingCandidatesError(display));
    }

    Ok(candidates)
}

/// Join match results onto the annotation rows they came from
///
/// Keeps the annotation columns of each matched row and appends the
/// `ellipse_*` fields (null when unmatched) and `ellipse_Jaccard`.
///
/// # Arguments
///
/// * `annotations` - Annotation table the eggs were parsed from
/// * `results` - Match results, in output row order
pub fn match_table(annotations: &DataFrame, results: &[MatchResult]) -> Result<DataFrame, OvumError> {
    let rows = results
        .iter()
        .map(|r| r.egg.row as IdxSize)
        .collect::<Vec<IdxSize>>();

    let mut df = annotations
        .take(&IdxCa::from_vec("row".into(), rows))
        .map_err(|e| OvumError::TableWriteError(e.to_string()))?;

    let field = |f: fn(&Ellipse) -> f64| -> Vec<Option<f64>> {
        results
            .iter()
            .map(|r| r.ellipse.as_ref().map(f))
            .collect()
    };

    let fields: [(&str, Vec<Option<f64>>); 5] = [
        ("x", field(|e| e.center.row)),
        ("y", field(|e| e.center.col)),
        ("a", field(|e| e.a)),
        ("b", field(|e| e.b)),
        ("theta", field(|e| e.theta)),
    ];

    for (name, values) in fields {
        let name = format!("{}{}", constant::ELLIPSE_PREFIX, name);
        df.with_column(Column::new(name.into(), values))
            .map_err(|e| OvumError::TableWriteError(e.to_string()))?;
    }

    let scores = results.iter().map(|r| r.score).collect::<Vec<f64>>();
    df.with_column(Column::new(constant::ELLIPSE_JACCARD.into(), scores))
        .map_err(|e| OvumError::TableWriteError(e.to_string()))?;

    Ok(df)
}

#[cfg(test)]
mod test {

    use super::*;

    use std::f64::consts::FRAC_PI_2;

    fn egg() -> AnnotatedEgg {
        AnnotatedEgg::new(
            "ovary_01",
            Point2D::new(10.0, 50.0),
            Point2D::new(90.0, 50.0),
            Point2D::new(50.0, 20.0),
            0,
        )
    }

    #[test]
    fn test_aligned_candidate_matches() {
        let egg = egg();
        assert_eq!(egg.canvas_size().unwrap(), 190);

        let candidate = Ellipse::new(Point2D::new(50.0, 50.0), 40.0, 20.0, 0.0);
        let result = match_egg(&egg, &[candidate], 0.4).unwrap();

        assert!((result.score - 0.505).abs() < 0.01);
        assert_eq!(result.ellipse, Some(candidate));
    }

    #[test]
    fn test_swapped_candidate_is_canonicalized() {
        let candidate = Ellipse::new(Point2D::new(50.0, 50.0), 20.0, 40.0, 0.0);
        let result = match_egg(&egg(), &[candidate], 0.4).unwrap();

        assert!(result.score > 0.4);

        let ellipse = result.ellipse.unwrap();
        assert_eq!(ellipse.a, 40.0);
        assert_eq!(ellipse.b, 20.0);
        assert_eq!(ellipse.theta, FRAC_PI_2);
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(
            match_egg(&egg(), &[], 0.4),
            Err(OvumError::MissingCandidatesError("ovary_01".to_string()))
        );
    }

    #[test]
    fn test_below_threshold_keeps_score() {
        let candidate = Ellipse::new(Point2D::new(150.0, 150.0), 10.0, 10.0, 0.0);
        let result = match_egg(&egg(), &[candidate], 0.4).unwrap();

        assert_eq!(result.ellipse, None);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let first = Ellipse::new(Point2D::new(150.0, 150.0), 5.0, 5.0, 0.0);
        let second = Ellipse::new(Point2D::new(150.0, 20.0), 5.0, 5.0, 0.0);

        let result = match_egg(&egg(), &[first, second], 0.0).unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.ellipse, Some(first));
    }

    #[test]
    fn test_match_table_columns() {
        let annotations = DataFrame::new(vec![
            Column::new("image_name".into(), ["ovary_01", "ovary_02"]),
            Column::new("stage".into(), [9i64, 10]),
        ])
        .unwrap();

        let mut skipped = egg();
        skipped.row = 1;

        let results = vec![
            MatchResult {
                egg: skipped,
                ellipse: None,
                score: 0.1,
            },
            MatchResult {
                egg: egg(),
                ellipse: Some(Ellipse::new(Point2D::new(1.0, 2.0), 4.0, 3.0, 0.5)),
                score: 0.9,
            },
        ];

        let df = match_table(&annotations, &results).unwrap();

        assert_eq!(df.shape(), (2, 8));
        assert_eq!(
            column_f64(&df, "ellipse_x").unwrap(),
            vec![None, Some(1.0)]
        );
        assert_eq!(
            column_f64(&df, "ellipse_Jaccard").unwrap(),
            vec![Some(0.1), Some(0.9)]
        );
        assert_eq!(
            column_f64(&df, "stage").unwrap(),
            vec![Some(10.0), Some(9.0)]
        );
    }
}
