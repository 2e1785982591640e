// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::error::OvumError;
use crate::im::BinaryMask;

/// Intersection and union pixel counts of two equally sized masks
pub fn overlap_counts(a: &BinaryMask, b: &BinaryMask) -> Result<(usize, usize), OvumError> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(OvumError::ShapeMismatchError {
            image: (a.height(), a.width()),
            mask: (b.height(), b.width()),
        });
    }

    Ok(a.iter()
        .zip(b.iter())
        .fold((0, 0), |(intersection, union), (&x, &y)| {
            (intersection + (x && y) as usize, union + (x || y) as usize)
        }))
}

/// Jaccard index (intersection over union) of two masks
///
/// Two empty masks score 0.
///
/// # Examples
///
/// ```
/// use ovum_core::cv::overlap::jaccard;
/// use ovum_core::im::BinaryMask;
///
/// let a = BinaryMask::from_fn(4, 1, |_, col| col < 2);
/// let b = BinaryMask::from_fn(4, 1, |_, col| col > 0);
///
/// assert_eq!(jaccard(&a, &b).unwrap(), 0.25);
/// ```
pub fn jaccard(a: &BinaryMask, b: &BinaryMask) -> Result<f64, OvumError> {
    let (intersection, union) = overlap_counts(a, b)?;

    if union == 0 {
        return Ok(0.0);
    }

    Ok(intersection as f64 / union as f64)
}

#[cfg(test)]
mod test {

    use super::*;

    fn disc(radius: i64, center: (i64, i64)) -> BinaryMask {
        BinaryMask::from_fn(20, 20, |row, col| {
            let dr = row as i64 - center.0;
            let dc = col as i64 - center.1;
            dr * dr + dc * dc <= radius * radius
        })
    }

    #[test]
    fn test_jaccard_self() {
        let a = disc(5, (10, 10));
        assert_eq!(jaccard(&a, &a).unwrap(), 1.0);
    }

    #[test]
    fn test_jaccard_empty() {
        let empty = BinaryMask::zeros(20, 20);
        assert_eq!(jaccard(&empty, &empty).unwrap(), 0.0);
        assert_eq!(jaccard(&empty, &disc(3, (5, 5))).unwrap(), 0.0);
    }

    #[test]
    fn test_jaccard_symmetric_and_bounded() {
        let a = disc(5, (8, 8));
        let b = disc(4, (11, 10));

        let ab = jaccard(&a, &b).unwrap();
        let ba = jaccard(&b, &a).unwrap();

        assert_eq!(ab, ba);
        assert!(ab > 0.0 && ab < 1.0);
    }

    #[test]
    fn test_jaccard_disjoint() {
        let a = disc(2, (3, 3));
        let b = disc(2, (15, 15));
        assert_eq!(jaccard(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_jaccard_shape_mismatch() {
        let a = BinaryMask::zeros(3, 4);
        let b = BinaryMask::zeros(4, 3);
        assert!(matches!(
            jaccard(&a, &b),
            Err(OvumError::ShapeMismatchError { .. })
        ));
    }
}
