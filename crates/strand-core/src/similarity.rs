//! Cosine similarity over embedding vectors

use crate::error::{Error, Result};

/// Compute cosine similarity between two vectors.
///
/// Returns 0 when either vector has zero norm. Vectors of different
/// lengths are rejected with `DimensionMismatch`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    // Rounding can push the ratio just past ±1
    Ok((dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_identical_vectors() {
        let v = [0.3, -1.2, 4.5, 0.01];
        assert!(approx(cosine_similarity(&v, &v).unwrap(), 1.0));
    }

    #[test]
    fn test_opposite_vectors() {
        let v = [0.3, -1.2, 4.5];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();
        assert!(approx(cosine_similarity(&v, &neg).unwrap(), -1.0));
    }

    #[test]
    fn test_orthogonal_vectors() {
        assert!(approx(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0));
    }

    #[test]
    fn test_symmetry() {
        let a = [1.0, 2.0, 3.0];
        let b = [-2.0, 0.5, 1.0];
        assert!(approx(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        ));
    }

    #[test]
    fn test_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = cosine_similarity(&[1.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 1,
                actual: 2
            }
        ));
    }
}
