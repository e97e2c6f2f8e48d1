/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::ops::Range;
use thiserror::Error;

/// Invalid configurations, rejected before the first iteration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("The dampening factor must be in [0 . . 1], got {0}")]
    DampeningFactor(f64),

    #[error("The convergence tolerance must be positive, got {0}")]
    Tolerance(f64),

    #[error("The number of threads must be greater than 0")]
    NoThreads,

    #[error("The graph has no pages")]
    EmptyGraph,
}

/// Inconsistencies in the graph or in the partition of the pages.
///
/// These are bugs upstream, not runtime conditions: a computation that hits
/// one of them is aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A page with no outlinks appears among the inlinks of another page.
    #[error("Page {inlink} links to page {page} but has no outlinks")]
    DanglingInlink { page: usize, inlink: usize },

    /// A range of the partition does not start where the previous one ended.
    #[error("Range {index} of the partition is {range:?}, but should start at {expected}")]
    Partition {
        index: usize,
        range: Range<usize>,
        expected: usize,
    },

    /// The partition does not cover all pages.
    #[error("The partition covers {covered} pages out of {num_pages}")]
    Coverage { covered: usize, num_pages: usize },

    /// The pool does not have one thread per range.
    #[error("The partition has {ranges} ranges, but the pool has {threads} threads")]
    WorkerCount { ranges: usize, threads: usize },
}

/// Errors returned by [`PageRank`](crate::rank::PageRank).
#[derive(Error, Debug)]
pub enum RankError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Could not build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
