//! Applying an ordering `perm` (original index → new position) to vectors.

/// `out[perm[i]] = v[i]`
pub fn permute<T: Copy>(v: &[T], perm: &[usize]) -> Vec<T> {
    assert_eq!(v.len(), perm.len(), "permutation length mismatch");
    let mut out = v.to_vec();
    for (i, &p) in perm.iter().enumerate() {
        out[p] = v[i];
    }
    out
}

/// `out[i] = v[perm[i]]`, the inverse of [`permute`].
pub fn unpermute<T: Copy>(v: &[T], perm: &[usize]) -> Vec<T> {
    assert_eq!(v.len(), perm.len(), "permutation length mismatch");
    perm.iter().map(|&p| v[p]).collect()
}

/// Whether `perm` is a bijection on `0..perm.len()`.
pub fn is_permutation(perm: &[usize]) -> bool {
    let mut seen = vec![false; perm.len()];
    perm.iter().all(|&p| p < perm.len() && !std::mem::replace(&mut seen[p], true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permute_then_unpermute() {
        let perm = [2, 0, 1];
        let v = [10, 20, 30];
        let w = permute(&v, &perm);
        assert_eq!(w, vec![20, 30, 10]);
        assert_eq!(unpermute(&w, &perm), v.to_vec());
    }

    #[test]
    fn detects_non_bijections() {
        assert!(is_permutation(&[1, 2, 0]));
        assert!(!is_permutation(&[0, 0, 1]));
        assert!(!is_permutation(&[0, 3]));
    }
}
