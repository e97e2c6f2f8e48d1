/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Parallel power-iteration PageRank.
//!
//! # The formula
//!
//! If we denote with *P* the row-normalized adjacency matrix of the graph
//! (with zero rows for dangling pages), with *n* the number of pages and with
//! *d* the dampening factor, each iteration computes
//!
//! > **x**⁽*ᵗ* ⁺ ¹⁾ = (1 − *d*) **1** / *n* + *d* **x**⁽*ᵗ*⁾ *P*,
//!
//! that is, for each page *p*,
//!
//! > *x*ₚ⁽*ᵗ* ⁺ ¹⁾ = (1 − *d*) / *n* + *d* ∑_(*q* → *p*) *x*_q⁽*ᵗ*⁾ / outdeg(*q*),
//!
//! starting from the uniform vector **1** / *n*. The rank of dangling pages
//! (pages without outlinks) is handled as specified by the [`Dangling`]
//! policy: by default it is simply not propagated, so the vector is
//! stochastic only if there are no dangling pages;
//! [`Redistribute`](Dangling::Redistribute) spreads it uniformly over all
//! pages instead.
//!
//! # Parallelism
//!
//! Unlike a Gauss–Seidel iteration, every iteration reads a _snapshot_ of the
//! previous vector: ranks are double-buffered in a [`RankStore`], and no entry
//! of the vector being computed is read before the iteration ends. The result
//! is thus independent of the number of threads.
//!
//! The pages are split once and for all into as many contiguous ranges as
//! there are threads (see [`partition`]). A dedicated Rayon pool with that
//! number of threads is built when the computation starts and reused by all
//! iterations: at each iteration the coordinator [broadcasts] the work to the
//! pool, and thread *i* updates the pages of range *i*. The broadcast returns
//! only when all threads are done, and acts as the barrier between
//! iterations. The new vector is written through [`SyncCell`]s since ranges
//! are disjoint; the per-thread maximum changes are returned by the broadcast
//! and combined by the coordinator.
//!
//! # Stopping criteria
//!
//! The computation converges when the ℓ∞ distance between two successive
//! approximations (the _delta_) is smaller than the
//! [tolerance](PageRank::tolerance). The
//! [`run_until`](PageRank::run_until) method accepts in addition a composable
//! [`Predicate`] that is evaluated after each iteration and can stop the
//! computation earlier; see the [`preds`] module.
//!
//! [broadcasts]: rayon::ThreadPool::broadcast
//! [`SyncCell`]: sync_cell_slice::SyncCell

pub mod preds {
    //! Predicates implementing additional stopping conditions.
    //!
    //! [PageRank](super::PageRank) always stops when it converges. These
    //! predicates make it possible to stop earlier: they evaluate to true if
    //! the computation should be stopped.
    //!
    //! You can combine the predicates using the `and` and `or` methods provided
    //! by the [`Predicate`] trait.
    //!
    //! # Examples
    //! ```
    //! use predicates::prelude::*;
    //! use std::sync::Arc;
    //! use std::sync::atomic::AtomicBool;
    //! use webrank_algo::rank::pagerank::preds::{Cancel, LInfNorm, MaxIter};
    //!
    //! let stop = Arc::new(AtomicBool::new(false));
    //! let mut predicate = LInfNorm::try_from(1E-3)?.boxed();
    //! predicate = predicate.or(MaxIter::from(100)).boxed();
    //! predicate = predicate.or(Cancel::from(stop.clone())).boxed();
    //! # Ok::<(), anyhow::Error>(())
    //! ```

    use anyhow::ensure;
    use predicates::{Predicate, reflection::PredicateReflection};
    use std::fmt::Display;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[doc(hidden)]
    /// This structure is passed to stopping predicates to provide the
    /// information that is needed to evaluate them.
    #[derive(Debug)]
    pub struct PredParams {
        pub iteration: usize,
        pub delta: f64,
    }

    /// Caps the number of iterations.
    ///
    /// The computation is stopped once the given number of iterations has
    /// been completed, even if it has not converged; the rank vector is then
    /// the one computed by the last iteration. The default cap,
    /// [`UNBOUNDED`](Self::UNBOUNDED), never stops the computation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MaxIter {
        limit: usize,
    }

    impl MaxIter {
        pub const UNBOUNDED: usize = usize::MAX;

        /// Returns the maximum number of iterations.
        pub fn limit(&self) -> usize {
            self.limit
        }
    }

    impl From<usize> for MaxIter {
        fn from(limit: usize) -> Self {
            MaxIter { limit }
        }
    }

    impl Default for MaxIter {
        fn default() -> Self {
            MaxIter {
                limit: Self::UNBOUNDED,
            }
        }
    }

    impl Display for MaxIter {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self.limit {
                Self::UNBOUNDED => f.write_str("(no iteration limit)"),
                limit => write!(f, "(at most {limit} iterations)"),
            }
        }
    }

    impl PredicateReflection for MaxIter {}

    impl Predicate<PredParams> for MaxIter {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.iteration >= self.limit
        }
    }

    /// Stops when the ℓ∞ distance between successive approximations falls
    /// below the provided threshold.
    ///
    /// This is the same test used for convergence, and it is useful to stop
    /// with a looser threshold than the [tolerance](super::PageRank::tolerance).
    #[derive(Debug, Clone)]
    pub struct LInfNorm {
        threshold: f64,
    }

    impl LInfNorm {
        pub const DEFAULT_THRESHOLD: f64 = super::PageRank::DEFAULT_TOLERANCE;
    }

    impl TryFrom<Option<f64>> for LInfNorm {
        type Error = anyhow::Error;
        fn try_from(threshold: Option<f64>) -> anyhow::Result<Self> {
            Ok(match threshold {
                Some(threshold) => {
                    ensure!(!threshold.is_nan(), "The threshold cannot be NaN");
                    ensure!(threshold > 0.0, "The threshold must be positive");
                    LInfNorm { threshold }
                }
                None => Self::default(),
            })
        }
    }

    impl TryFrom<f64> for LInfNorm {
        type Error = anyhow::Error;
        fn try_from(threshold: f64) -> anyhow::Result<Self> {
            Some(threshold).try_into()
        }
    }

    impl Default for LInfNorm {
        fn default() -> Self {
            LInfNorm {
                threshold: Self::DEFAULT_THRESHOLD,
            }
        }
    }

    impl Display for LInfNorm {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(ℓ∞ norm: {})", self.threshold))
        }
    }

    impl PredicateReflection for LInfNorm {}

    impl Predicate<PredParams> for LInfNorm {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.delta < self.threshold
        }
    }

    /// Stops as soon as a shared flag is set.
    ///
    /// The flag is checked between iterations, so another thread can abort
    /// the computation while leaving a complete rank vector behind.
    #[derive(Debug, Clone)]
    pub struct Cancel {
        flag: Arc<AtomicBool>,
    }

    impl From<Arc<AtomicBool>> for Cancel {
        fn from(flag: Arc<AtomicBool>) -> Self {
            Cancel { flag }
        }
    }

    impl Display for Cancel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("(cancel flag)")
        }
    }

    impl PredicateReflection for Cancel {}

    impl Predicate<PredParams> for Cancel {
        fn eval(&self, _pred_params: &PredParams) -> bool {
            self.flag.load(Ordering::Relaxed)
        }
    }
}

/// Selects how the rank of dangling pages is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dangling {
    /// Dangling pages contribute nothing: each page receives rank only from
    /// its inlinks and from teleportation. If there are dangling pages, the
    /// resulting vector is not stochastic. This is the default.
    #[default]
    Exclude,
    /// The rank of dangling pages is spread uniformly over all pages, which
    /// keeps the vector stochastic.
    Redistribute,
}

impl std::fmt::Display for Dangling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dangling::Exclude => f.write_str("exclude"),
            Dangling::Redistribute => f.write_str("redistribute"),
        }
    }
}

/// The state of a [`PageRank`] computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The configuration has not been validated yet, or it has been changed.
    Initializing,
    /// At least one more iteration is needed.
    Iterating,
    /// The last delta was below the tolerance. This state is final.
    Converged,
}

use super::partition::{check_partition, partition};
use super::store::RankStore;
use super::worker::Worker;
use super::{ConfigError, InvariantViolation, RankError};
use dsi_progress_logger::{ConcurrentProgressLog, ProgressLog, no_logging};
use kahan::KahanSum;
use predicates::Predicate;
use rayon::prelude::*;
use std::ops::Range;
use sync_cell_slice::SyncSlice;
use webrank::graph::Graph;

/// What [`init`](PageRank::init) sets up for the iterations.
struct Engine {
    pool: rayon::ThreadPool,
    ranges: Vec<Range<usize>>,
    inv_outdegrees: Box<[f64]>,
}

/// Computes PageRank using parallel power iteration.
///
/// The struct is configured via setters and then executed via
/// [`run`](Self::run). After completion the rank vector is available via the
/// [`rank`](Self::rank) method. Iterations can also be driven one at a time
/// with [`step`](Self::step).
///
/// # Examples
///
/// ```
/// use webrank::graph::GraphBuilder;
/// use webrank_algo::rank::{PageRank, State};
///
/// // A → C, B → C
/// let mut builder = GraphBuilder::new();
/// for name in ["A", "B", "C"] {
///     builder.add_page(name)?;
/// }
/// builder.add_link("A", "C")?;
/// builder.add_link("B", "C")?;
/// let graph = builder.build();
///
/// let mut pr = PageRank::new(&graph);
/// pr.dampening_factor(0.85).num_threads(2);
/// assert_eq!(pr.run()?, State::Converged);
///
/// let rank = pr.rank();
/// assert!(rank[2] > rank[0] && rank[2] > rank[1]);
/// // A and B have no inlinks
/// assert_eq!(rank[0], (1.0 - 0.85) / 3.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PageRank<'a> {
    graph: &'a Graph,
    dampening_factor: f64,
    tolerance: f64,
    num_threads: usize,
    dangling: Dangling,

    state: State,
    engine: Option<Engine>,
    store: RankStore,
    iteration: usize,
    delta: f64,
}

impl std::fmt::Debug for PageRank<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRank")
            .field("dampening_factor", &self.dampening_factor)
            .field("tolerance", &self.tolerance)
            .field("num_threads", &self.num_threads)
            .field("dangling", &self.dangling)
            .field("state", &self.state)
            .field("iteration", &self.iteration)
            .field("delta", &self.delta)
            .finish_non_exhaustive()
    }
}

impl<'a> PageRank<'a> {
    pub const DEFAULT_DAMPENING_FACTOR: f64 = 0.85;
    pub const DEFAULT_TOLERANCE: f64 = 5E-3;

    /// Creates a new PageRank computation with default parameters.
    ///
    /// The number of threads defaults to that of the current Rayon pool.
    pub fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            dampening_factor: Self::DEFAULT_DAMPENING_FACTOR,
            tolerance: Self::DEFAULT_TOLERANCE,
            num_threads: rayon::current_num_threads().max(1),
            dangling: Dangling::default(),
            state: State::Initializing,
            engine: None,
            store: RankStore::new(graph.num_pages()),
            iteration: 0,
            delta: f64::INFINITY,
        }
    }

    /// Sets the dampening factor *d*, which must be in [0 . . 1].
    pub fn dampening_factor(&mut self, dampening_factor: f64) -> &mut Self {
        self.dampening_factor = dampening_factor;
        self.state = State::Initializing;
        self
    }

    /// Sets the convergence tolerance, which must be positive.
    pub fn tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.tolerance = tolerance;
        self.state = State::Initializing;
        self
    }

    /// Sets the number of worker threads, which must be positive.
    pub fn num_threads(&mut self, num_threads: usize) -> &mut Self {
        if num_threads != self.num_threads {
            self.engine = None;
        }
        self.num_threads = num_threads;
        self.state = State::Initializing;
        self
    }

    /// Sets the [dangling-page policy](Dangling).
    pub fn dangling(&mut self, dangling: Dangling) -> &mut Self {
        self.dangling = dangling;
        self.state = State::Initializing;
        self
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the rank vector, indexed by page index.
    ///
    /// This is always a complete vector: the uniform distribution before the
    /// first iteration, and the result of the last completed iteration
    /// afterwards.
    pub fn rank(&self) -> &[f64] {
        self.store.current()
    }

    /// Returns the sum of the rank vector.
    pub fn mass(&self) -> f64 {
        self.store.mass()
    }

    /// Returns the number of iterations completed since the last
    /// initialization.
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Returns the ℓ∞ delta of the last iteration (infinity before the first
    /// one).
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Returns an iterator over the names of the pages and their ranks, in
    /// index order.
    pub fn ranked_pages(&self) -> impl ExactSizeIterator<Item = (&'a str, f64)> + '_ {
        self.graph.names().zip(self.rank().iter().copied())
    }

    /// Validates the configuration and prepares the computation.
    ///
    /// This method splits the pages among threads, builds the worker pool
    /// (unless one with the right number of threads is already available),
    /// and resets the rank vector to the uniform distribution.
    ///
    /// It is called automatically by [`run`](Self::run) and
    /// [`step`](Self::step) when needed.
    pub fn init(&mut self) -> Result<(), RankError> {
        let n = self.graph.num_pages();
        if n == 0 {
            return Err(ConfigError::EmptyGraph.into());
        }
        if !(0.0..=1.0).contains(&self.dampening_factor) {
            return Err(ConfigError::DampeningFactor(self.dampening_factor).into());
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(ConfigError::Tolerance(self.tolerance).into());
        }

        let previous = self.engine.take();
        self.engine = Some(self.setup_engine(previous)?);

        self.store.reset();
        self.iteration = 0;
        self.delta = f64::INFINITY;
        self.state = State::Iterating;

        log::info!("Dampening factor: {}", self.dampening_factor);
        log::info!("Tolerance: {}", self.tolerance);
        log::info!("Threads: {}", self.num_threads);
        log::info!("Dangling pages: {} ({})", self.graph.num_dangling(), self.dangling);
        Ok(())
    }

    /// Runs the computation until convergence.
    pub fn run(&mut self) -> Result<State, RankError> {
        self.run_with_logging(
            preds::MaxIter::default(),
            no_logging![],
            no_logging![],
        )
    }

    /// Runs the computation until convergence or until the given predicate
    /// is satisfied.
    pub fn run_until(
        &mut self,
        predicate: impl Predicate<preds::PredParams>,
    ) -> Result<State, RankError> {
        self.run_with_logging(predicate, no_logging![], no_logging![])
    }

    /// Runs the computation until convergence or until the given predicate
    /// is satisfied, logging progress.
    ///
    /// `pl` is a sequential [`ProgressLog`] used for iteration counting.
    /// `cpl` is a [`ConcurrentProgressLog`] used for page-level progress
    /// inside each iteration. Their options will be preserved, making thus
    /// possible to customize the logs.
    ///
    /// Returns the state at the end of the computation, which is
    /// [`Converged`](State::Converged) unless the predicate stopped it
    /// earlier. If an error occurs, the rank vector is the one computed by
    /// the last completed iteration.
    pub fn run_with_logging(
        &mut self,
        predicate: impl Predicate<preds::PredParams>,
        pl: &mut impl ProgressLog,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> Result<State, RankError> {
        self.init()?;
        log::info!("Additional stopping criterion: {}", predicate);

        pl.item_name("iteration");
        pl.expected_updates(None);
        pl.start(format!(
            "Computing PageRank (dampening factor={}, threads={})...",
            self.dampening_factor, self.num_threads
        ));

        while self.state == State::Iterating {
            self.step_with_logging(cpl)?;
            pl.update_and_display();

            if predicate.eval(&preds::PredParams {
                iteration: self.iteration,
                delta: self.delta,
            }) {
                break;
            }
        }

        pl.done();
        match self.state {
            State::Converged => log::info!(
                "Converged after {} iteration(s), delta = {}",
                self.iteration,
                self.delta
            ),
            _ => log::info!(
                "Stopped after {} iteration(s) without converging, delta = {}",
                self.iteration,
                self.delta
            ),
        }
        Ok(self.state)
    }

    /// Performs one iteration and returns its delta.
    ///
    /// The computation is initialized first if needed. Once the computation
    /// has converged this method does nothing.
    pub fn step(&mut self) -> Result<f64, RankError> {
        self.step_with_logging(no_logging![])
    }

    /// Performs one iteration, logging page-level progress on `cpl`, and
    /// returns its delta.
    pub fn step_with_logging(
        &mut self,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> Result<f64, RankError> {
        match self.state {
            State::Initializing => self.init()?,
            State::Iterating => {}
            State::Converged => return Ok(self.delta),
        }
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => self.setup_engine(None)?,
        };
        let result = self.iterate(&engine, cpl);
        self.engine = Some(engine);
        let delta = result?;

        self.iteration += 1;
        self.delta = delta;

        log::info!(
            "Iteration {}: delta = {}, mass = {}",
            self.iteration,
            self.delta,
            self.store.mass()
        );

        if delta < self.tolerance {
            self.state = State::Converged;
        }
        Ok(delta)
    }

    /// Splits the pages among threads and sets up the pool and the inverse
    /// outdegrees, reusing those of `previous` if available.
    fn setup_engine(&self, previous: Option<Engine>) -> Result<Engine, RankError> {
        let n = self.graph.num_pages();
        let ranges = partition(n, self.num_threads)?;
        check_partition(&ranges, n)?;
        log::debug!("Partition: {:?}", ranges);

        if let Some(engine) = previous {
            return Ok(Engine { ranges, ..engine });
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .thread_name(|i| format!("webrank-worker-{i}"))
            .build()?;
        let inv_outdegrees = pool.install(|| {
            self.graph
                .pages()
                .par_iter()
                .map(|page| match page.outlink_count() {
                    0 => 0.0,
                    d => 1.0 / d as f64,
                })
                .collect::<Vec<_>>()
                .into_boxed_slice()
        });
        Ok(Engine {
            pool,
            ranges,
            inv_outdegrees,
        })
    }

    /// Computes the next vector on the pool of `engine`, makes it current and
    /// returns the delta.
    fn iterate(
        &mut self,
        engine: &Engine,
        cpl: &mut impl ConcurrentProgressLog,
    ) -> Result<f64, RankError> {
        let n = self.graph.num_pages();
        let d = self.dampening_factor;
        let base = match self.dangling {
            Dangling::Exclude => (1.0 - d) / n as f64,
            Dangling::Redistribute => {
                // Sequential, so that the result does not depend on the
                // partition
                let mut dangling_rank = KahanSum::<f64>::new();
                for (&inv_d, &x) in engine.inv_outdegrees.iter().zip(self.store.current()) {
                    if inv_d == 0.0 {
                        dangling_rank += x;
                    }
                }
                (1.0 - d) / n as f64 + d * dangling_rank.sum() / n as f64
            }
        };
        let worker = Worker::new(self.graph, &engine.inv_outdegrees, base, d);
        let ranges = &engine.ranges;

        cpl.item_name("page");
        cpl.expected_updates(Some(n));
        cpl.start(format!("Iteration {}...", self.iteration + 1));

        let (current, next) = self.store.buffers();
        let next = next.as_sync_slice();

        let results = engine.pool.broadcast(|ctx| {
            if ctx.num_threads() != ranges.len() {
                return Err(InvariantViolation::WorkerCount {
                    ranges: ranges.len(),
                    threads: ctx.num_threads(),
                });
            }
            let mut local_cpl = cpl.clone();
            // SAFETY: ranges are disjoint (see check_partition) and each
            // thread of the pool gets a different one.
            unsafe { worker.compute(ranges[ctx.index()].clone(), current, next, &mut local_cpl) }
        });

        cpl.done();

        // All workers are done: combine their maxima
        let mut delta = 0.0_f64;
        for result in results {
            delta = delta.max(result?);
        }

        debug_assert_eq!(delta, self.store.max_delta());
        self.store.promote();
        Ok(delta)
    }
}
