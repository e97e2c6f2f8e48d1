/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The per-thread step of an iteration.

use super::InvariantViolation;
use dsi_progress_logger::ProgressLog;
use kahan::KahanSum;
use std::ops::Range;
use sync_cell_slice::SyncCell;
use webrank::graph::Graph;

/// How many pages a worker processes between progress-log updates.
const PROGRESS_CHUNK: usize = 4096;

/// Computes the next rank of a range of pages.
///
/// For each page *p* of the range, the worker computes
///
/// > *base* + *d* ∑_(*q* → *p*) current[*q*] / outdeg(*q*)
///
/// where *d* is the dampening factor and *base* is the teleportation term
/// (1 − *d*) / *n*, possibly increased by the coordinator to redistribute
/// the rank of dangling pages.
#[derive(Debug, Clone, Copy)]
pub struct Worker<'a> {
    graph: &'a Graph,
    inv_outdegrees: &'a [f64],
    base: f64,
    dampening_factor: f64,
}

impl<'a> Worker<'a> {
    /// Creates a worker.
    ///
    /// `inv_outdegrees[q]` must be the inverse of the outdegree of page *q*,
    /// or zero if *q* is dangling.
    pub fn new(
        graph: &'a Graph,
        inv_outdegrees: &'a [f64],
        base: f64,
        dampening_factor: f64,
    ) -> Self {
        debug_assert_eq!(graph.num_pages(), inv_outdegrees.len());
        Self {
            graph,
            inv_outdegrees,
            base,
            dampening_factor,
        }
    }

    /// Computes the next rank of the pages in `range`, reading `current` and
    /// writing `next`, and returns the maximum absolute change of a rank in
    /// the range (zero if the range is empty).
    ///
    /// If a dangling page is found among the inlinks of a page, the
    /// computation stops and the offending pair is returned; the entries of
    /// `next` in `range` are then only partially updated.
    ///
    /// # Safety
    ///
    /// No other thread may access the entries of `next` in `range` while this
    /// method runs.
    pub unsafe fn compute(
        &self,
        range: Range<usize>,
        current: &[f64],
        next: &[SyncCell<f64>],
        pl: &mut impl ProgressLog,
    ) -> Result<f64, InvariantViolation> {
        let mut max_delta = 0.0_f64;
        let end = range.end;

        for chunk_start in range.step_by(PROGRESS_CHUNK) {
            let chunk = chunk_start..end.min(chunk_start + PROGRESS_CHUNK);
            let len = chunk.len();

            for p in chunk {
                let mut sigma = KahanSum::<f64>::new();
                for &q in self.graph.page(p).inlinks() {
                    let inv_outdegree = self.inv_outdegrees[q];
                    if inv_outdegree == 0.0 {
                        return Err(InvariantViolation::DanglingInlink { page: p, inlink: q });
                    }
                    sigma += current[q] * inv_outdegree;
                }

                let rank = self.base + self.dampening_factor * sigma.sum();
                max_delta = max_delta.max((rank - current[p]).abs());

                // SAFETY: the caller guarantees exclusive access to this
                // entry.
                unsafe { next[p].set(rank) };
            }

            pl.update_with_count(len);
        }

        Ok(max_delta)
    }
}
