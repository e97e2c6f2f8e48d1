/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Rank computations.

mod error;
pub use error::*;

pub mod pagerank;
pub use pagerank::{Dangling, PageRank, State};

pub mod partition;
pub mod store;
pub mod worker;
