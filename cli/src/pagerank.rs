/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::GlobalArgs;
use crate::report::{Order, RankFormat};
use anyhow::{Context, Result};
use clap::Args;
use dsi_progress_logger::{ProgressLog, concurrent_progress_logger, progress_logger};
use std::path::PathBuf;
use webrank::loader::{self, Input};
use webrank_algo::rank::pagerank::preds::MaxIter;
use webrank_algo::rank::{Dangling, PageRank, State};

/// How to handle the rank of pages without outlinks.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default)]
pub enum CliDangling {
    /// Do not propagate the rank of dangling pages.
    #[default]
    Exclude,
    /// Spread the rank of dangling pages uniformly over all pages.
    Redistribute,
}

impl From<CliDangling> for Dangling {
    fn from(d: CliDangling) -> Self {
        match d {
            CliDangling::Exclude => Dangling::Exclude,
            CliDangling::Redistribute => Dangling::Redistribute,
        }
    }
}

#[derive(Args, Debug)]
pub struct CliArgs {
    #[arg(value_parser = crate::num_threads_parser)]
    /// The number of worker threads.
    pub threads: usize,

    #[arg(short, long)]
    /// The file containing the graph (default: standard input).
    pub input: Option<PathBuf>,

    #[arg(short, long)]
    /// Where to write the ranks (default: standard output).
    pub output: Option<PathBuf>,

    #[arg(short, long)]
    /// The dampening factor, in the interval [0 . . 1]; overrides the one in
    /// the input.
    pub dampening_factor: Option<f64>,

    #[arg(short, long, default_value_t = PageRank::DEFAULT_TOLERANCE)]
    /// The ℓ∞ distance between successive approximations below which the
    /// computation stops.
    pub tolerance: f64,

    #[arg(long)]
    /// Maximum number of iterations.
    pub max_iter: Option<usize>,

    #[arg(long, value_enum, default_value_t = CliDangling::Exclude)]
    /// How to handle the rank of dangling pages.
    pub dangling: CliDangling,

    #[arg(long, value_enum, default_value_t = RankFormat::Text)]
    /// The output format for the ranks.
    pub fmt: RankFormat,

    #[arg(long)]
    /// Decimal digits for text output formats (default: 4).
    pub precision: Option<usize>,

    #[arg(long, value_enum, default_value_t = Order::Index)]
    /// The order in which pages are written.
    pub sort: Order,
}

/// Loads the graph, computes PageRank and writes the ranks.
pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let Input {
        dampening_factor,
        graph,
    } = match &args.input {
        Some(path) => {
            log::info!("Loading the graph from {}", path.display());
            loader::from_path(path)
                .with_context(|| format!("Could not load the graph from {}", path.display()))?
        }
        None => {
            log::info!("Loading the graph from standard input");
            loader::load(std::io::stdin().lock())
                .context("Could not load the graph from standard input")?
        }
    };
    log::info!(
        "The graph has {} pages and {} arcs",
        graph.num_pages(),
        graph.num_arcs()
    );

    let dampening_factor = match args.dampening_factor {
        Some(d) => {
            log::info!("Overriding the dampening factor {dampening_factor} of the input with {d}");
            d
        }
        None => dampening_factor,
    };

    let mut pl = progress_logger![];
    let mut cpl = concurrent_progress_logger![];
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
        cpl.log_interval(log_interval);
    }

    let predicate = args.max_iter.map(MaxIter::from).unwrap_or_default();

    let mut pr = PageRank::new(&graph);
    pr.dampening_factor(dampening_factor)
        .tolerance(args.tolerance)
        .num_threads(args.threads)
        .dangling(args.dangling.into());

    let state = pr.run_with_logging(predicate, &mut pl, &mut cpl)?;
    if state != State::Converged {
        log::warn!(
            "Stopped after {} iteration(s) with delta {}, above the tolerance {}",
            pr.iterations(),
            pr.delta(),
            args.tolerance
        );
    }

    args.fmt.store(
        args.output.as_deref(),
        pr.ranked_pages(),
        args.sort,
        args.precision,
    )
}
