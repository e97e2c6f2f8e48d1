/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Double-buffered rank vectors.

use kahan::KahanSum;

/// The current and next rank vectors of a power iteration.
///
/// During an iteration `current` is only read and `next` is only written;
/// [`promote`](Self::promote) then swaps them, so the vector just computed
/// becomes current and the old one is recycled as the next write target.
#[derive(Debug, Clone)]
pub struct RankStore {
    current: Box<[f64]>,
    next: Box<[f64]>,
}

impl RankStore {
    /// Creates a store for `num_pages` pages with the uniform distribution as
    /// current vector.
    pub fn new(num_pages: usize) -> Self {
        let mut store = Self {
            current: vec![0.0; num_pages].into_boxed_slice(),
            next: vec![0.0; num_pages].into_boxed_slice(),
        };
        store.reset();
        store
    }

    /// Sets every entry of the current vector to 1/*n*.
    pub fn reset(&mut self) {
        let inv_n = 1.0 / self.current.len() as f64;
        self.current.fill(inv_n);
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    /// Returns the current vector for reading and the next one for writing.
    pub fn buffers(&mut self) -> (&[f64], &mut [f64]) {
        (&self.current, &mut self.next)
    }

    /// Returns the ℓ∞ distance between the next and the current vector.
    pub fn max_delta(&self) -> f64 {
        self.current
            .iter()
            .zip(self.next.iter())
            .map(|(c, n)| (n - c).abs())
            .fold(0.0, f64::max)
    }

    /// Makes the next vector current.
    pub fn promote(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Returns the sum of the current vector.
    pub fn mass(&self) -> f64 {
        let mut mass = KahanSum::<f64>::new();
        for &x in self.current.iter() {
            mass += x;
        }
        mass.sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_start() {
        let store = RankStore::new(4);
        assert_eq!(store.current(), &[0.25; 4]);
        assert_eq!(store.mass(), 1.0);
    }

    #[test]
    fn test_promote() {
        let mut store = RankStore::new(2);
        {
            let (current, next) = store.buffers();
            next[0] = current[0] + 0.25;
            next[1] = current[1] - 0.25;
        }
        assert_eq!(store.max_delta(), 0.25);
        store.promote();
        assert_eq!(store.current(), &[0.75, 0.25]);
        assert_eq!(store.mass(), 1.0);
        // The old current vector is now the write target
        let (_, next) = store.buffers();
        assert_eq!(next, &[0.5, 0.5]);
        assert_eq!(store.max_delta(), 0.25);
    }

    #[test]
    fn test_reset() {
        let mut store = RankStore::new(3);
        store.buffers().1.fill(0.0);
        store.promote();
        assert_eq!(store.mass(), 0.0);
        store.reset();
        assert!((store.mass() - 1.0).abs() < 1E-15);
    }
}
