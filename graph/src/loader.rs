/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Loading graphs from the line-oriented text format.
//!
//! The format is the following, one item per line:
//!
//! 1. the dampening factor, a real number in [0 . . 1];
//! 2. the number of pages *n* > 0;
//! 3. *n* page names;
//! 4. the number of edges *m* > 0;
//! 5. *m* edges, each given by the name of the source page and the name of
//!    the target page separated by whitespace.
//!
//! Only the first token of a line is considered (the first two for edges),
//! and tokens are delimited by whitespace, so page names cannot contain
//! whitespace.

use crate::graph::{Graph, GraphBuilder, GraphError};
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a graph.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Could not read input: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended before all the announced items were read.
    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("Line {line}: invalid dampening factor {value:?} (must be in [0 . . 1])")]
    InvalidDampening { line: usize, value: String },

    #[error("Line {line}: invalid number of pages {value:?}")]
    InvalidPageCount { line: usize, value: String },

    #[error("Line {line}: invalid number of edges {value:?}")]
    InvalidEdgeCount { line: usize, value: String },

    #[error("Line {line}: invalid edge {value:?}")]
    InvalidEdge { line: usize, value: String },

    /// A page name or an edge was rejected by the [`GraphBuilder`].
    #[error("Line {line}: {source}")]
    Graph {
        line: usize,
        #[source]
        source: GraphError,
    },
}

/// The content of an input: a graph and the dampening factor to use with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub dampening_factor: f64,
    pub graph: Graph,
}

/// A line reader keeping track of line numbers.
struct Lines<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> Lines<R> {
    fn next_line(&mut self, what: &'static str) -> Result<String, LoadError> {
        match self.lines.next() {
            Some(line) => {
                self.line += 1;
                Ok(line?)
            }
            None => Err(LoadError::UnexpectedEof(what)),
        }
    }
}

fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

fn parse_count(line: &str) -> Option<usize> {
    first_token(line).parse::<usize>().ok().filter(|&n| n > 0)
}

/// Loads a graph from a reader.
pub fn load(reader: impl BufRead) -> Result<Input, LoadError> {
    let mut lines = Lines {
        lines: reader.lines(),
        line: 0,
    };

    let text = lines.next_line("the dampening factor")?;
    let dampening_factor = first_token(&text)
        .parse::<f64>()
        .ok()
        .filter(|d| (0.0..=1.0).contains(d))
        .ok_or_else(|| LoadError::InvalidDampening {
            line: lines.line,
            value: text.clone(),
        })?;

    let text = lines.next_line("the number of pages")?;
    let num_pages = parse_count(&text).ok_or_else(|| LoadError::InvalidPageCount {
        line: lines.line,
        value: text.clone(),
    })?;

    let mut builder = GraphBuilder::with_capacity(num_pages);
    for _ in 0..num_pages {
        let text = lines.next_line("page names")?;
        builder
            .add_page(first_token(&text))
            .map_err(|source| LoadError::Graph {
                line: lines.line,
                source,
            })?;
    }

    let text = lines.next_line("the number of edges")?;
    let num_edges = parse_count(&text).ok_or_else(|| LoadError::InvalidEdgeCount {
        line: lines.line,
        value: text.clone(),
    })?;

    for _ in 0..num_edges {
        let text = lines.next_line("edges")?;
        let mut tokens = text.split_whitespace();
        let (Some(from), Some(to)) = (tokens.next(), tokens.next()) else {
            return Err(LoadError::InvalidEdge {
                line: lines.line,
                value: text,
            });
        };
        builder
            .add_link(from, to)
            .map_err(|source| LoadError::Graph {
                line: lines.line,
                source,
            })?;
    }

    let graph = builder.build();
    log::debug!(
        "Loaded {} pages and {} edges (dampening factor {})",
        graph.num_pages(),
        graph.num_arcs(),
        dampening_factor
    );

    Ok(Input {
        dampening_factor,
        graph,
    })
}

/// Loads a graph from a string.
pub fn parse(text: &str) -> Result<Input, LoadError> {
    load(text.as_bytes())
}

/// Loads a graph from a file.
pub fn from_path(path: impl AsRef<Path>) -> Result<Input, LoadError> {
    let file = std::fs::File::open(path)?;
    load(std::io::BufReader::new(file))
}
