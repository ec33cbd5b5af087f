//! Row and column permutations stored as index arrays
//!
//! A [`Permutation`] of length `n` is the sequence `p` such that position `i`
//! holds original index `p[i]`. Applying it gathers: `(P·b)[i] = b[p[i]]` for
//! vectors and rows, `(A·Q)[.., j] = A[.., q[j]]` for columns. The dense
//! permutation matrix is never built.

use crate::error::LuError;
use ndarray::{Array1, Array2, Axis};

/// Permutation of `0..n` in index-array form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    indices: Vec<usize>,
}

impl Permutation {
    /// Identity permutation of length `n`
    pub fn identity(n: usize) -> Self {
        Self {
            indices: (0..n).collect(),
        }
    }

    /// Build from an index sequence, checking that it is a bijection on `0..n`
    pub fn from_indices(indices: Vec<usize>) -> Result<Self, LuError> {
        let n = indices.len();
        let mut seen = vec![false; n];
        for &idx in &indices {
            if idx >= n || seen[idx] {
                return Err(LuError::InvalidPermutation { len: n });
            }
            seen[idx] = true;
        }
        Ok(Self { indices })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The index sequence
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn is_identity(&self) -> bool {
        self.indices.iter().enumerate().all(|(i, &p)| i == p)
    }

    /// Compose the transposition of positions `i` and `j` into this permutation
    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.indices.swap(i, j);
    }

    /// Inverse permutation: `inv[p[i]] = i`
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0; self.indices.len()];
        for (i, &p) in self.indices.iter().enumerate() {
            inv[p] = i;
        }
        Self { indices: inv }
    }

    /// Permutation equivalent to applying `other` first, then `self`
    ///
    /// Gathering with the result is the same as gathering with `other` and then
    /// with `self`.
    pub fn compose(&self, other: &Permutation) -> Result<Self, LuError> {
        if self.len() != other.len() {
            return Err(LuError::DimensionMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        Ok(Self {
            indices: self.indices.iter().map(|&p| other.indices[p]).collect(),
        })
    }

    /// True when the permutation is a product of an even number of transpositions
    pub fn is_even(&self) -> bool {
        let n = self.indices.len();
        let mut visited = vec![false; n];
        let mut transpositions = 0;
        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut cycle_len = 0;
            let mut j = start;
            while !visited[j] {
                visited[j] = true;
                j = self.indices[j];
                cycle_len += 1;
            }
            transpositions += cycle_len - 1;
        }
        transpositions % 2 == 0
    }

    /// Gather a vector: `out[i] = v[p[i]]`
    pub fn permute_vec<T: Clone>(&self, v: &Array1<T>) -> Result<Array1<T>, LuError> {
        self.check_len(v.len())?;
        Ok(self.indices.iter().map(|&p| v[p].clone()).collect())
    }

    /// Scatter a vector (apply the inverse): `out[p[i]] = v[i]`
    pub fn scatter_vec<T: Clone>(&self, v: &Array1<T>) -> Result<Array1<T>, LuError> {
        self.check_len(v.len())?;
        let mut out = v.clone();
        for (i, &p) in self.indices.iter().enumerate() {
            out[p] = v[i].clone();
        }
        Ok(out)
    }

    /// Gather the rows of a matrix: `out[i, ..] = a[p[i], ..]`
    pub fn permute_rows<T: Clone>(&self, a: &Array2<T>) -> Result<Array2<T>, LuError> {
        self.check_len(a.nrows())?;
        Ok(a.select(Axis(0), &self.indices))
    }

    /// Gather the columns of a matrix: `out[.., j] = a[.., q[j]]`
    pub fn permute_cols<T: Clone>(&self, a: &Array2<T>) -> Result<Array2<T>, LuError> {
        self.check_len(a.ncols())?;
        Ok(a.select(Axis(1), &self.indices))
    }

    fn check_len(&self, got: usize) -> Result<(), LuError> {
        if got != self.indices.len() {
            return Err(LuError::DimensionMismatch {
                expected: self.indices.len(),
                got,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_indices_rejects_duplicates() {
        assert!(Permutation::from_indices(vec![2, 0, 1]).is_ok());
        assert_eq!(
            Permutation::from_indices(vec![0, 0, 1]),
            Err(LuError::InvalidPermutation { len: 3 })
        );
        assert!(Permutation::from_indices(vec![0, 3, 1]).is_err());
    }

    #[test]
    fn test_inverse() {
        let p = Permutation::from_indices(vec![2, 0, 1]).unwrap();
        assert_eq!(p.inverse().indices(), &[1, 2, 0]);
        assert!(p.compose(&p.inverse()).unwrap().is_identity());
    }

    #[test]
    fn test_permute_and_scatter_vec() {
        let p = Permutation::from_indices(vec![2, 0, 1]).unwrap();
        let v = array![10.0, 20.0, 30.0];

        let gathered = p.permute_vec(&v).unwrap();
        assert_eq!(gathered, array![30.0, 10.0, 20.0]);

        let back = p.scatter_vec(&gathered).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_permute_rows_and_cols() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];

        let q = Permutation::from_indices(vec![2, 0, 1]).unwrap();
        assert_eq!(
            q.permute_cols(&m).unwrap(),
            array![[3.0, 1.0, 2.0], [6.0, 4.0, 5.0]]
        );

        let p = Permutation::from_indices(vec![1, 0]).unwrap();
        assert_eq!(
            p.permute_rows(&m).unwrap(),
            array![[4.0, 5.0, 6.0], [1.0, 2.0, 3.0]]
        );
    }

    #[test]
    fn test_compose_matches_sequential_gather() {
        let p = Permutation::from_indices(vec![1, 2, 0]).unwrap();
        let q = Permutation::from_indices(vec![0, 2, 1]).unwrap();
        let v = array![1.0, 2.0, 3.0];

        let sequential = p.permute_vec(&q.permute_vec(&v).unwrap()).unwrap();
        let composed = p.compose(&q).unwrap().permute_vec(&v).unwrap();
        assert_eq!(sequential, composed);
    }

    #[test]
    fn test_parity() {
        let mut p = Permutation::identity(4);
        assert!(p.is_even());
        p.swap(0, 3);
        assert!(!p.is_even());
        p.swap(1, 2);
        assert!(p.is_even());
        // 3-cycle is even
        assert!(Permutation::from_indices(vec![1, 2, 0]).unwrap().is_even());
    }

    #[test]
    fn test_length_mismatch() {
        let p = Permutation::identity(3);
        let v = array![1.0, 2.0];
        assert_eq!(
            p.permute_vec(&v),
            Err(LuError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        );
    }
}
