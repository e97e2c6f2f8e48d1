/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{Graph, GraphError, MAX_NAME_LEN, Page};
use std::collections::HashMap;

/// An incremental builder for [`Graph`].
///
/// Pages receive consecutive indices in insertion order. Names are resolved
/// through a map that lives only as long as the builder: once
/// [`build`](Self::build) is called, pages are referred to by index only.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    pages: Vec<Page>,
    index: HashMap<String, usize>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with room for `num_pages` pages.
    pub fn with_capacity(num_pages: usize) -> Self {
        Self {
            pages: Vec::with_capacity(num_pages),
            index: HashMap::with_capacity(num_pages),
        }
    }

    /// Adds a page and returns its index.
    ///
    /// Names must be nonempty, contain no whitespace, be at most
    /// [`MAX_NAME_LEN`] bytes long, and be distinct from the names of the
    /// pages added so far.
    pub fn add_page(&mut self, name: impl Into<String>) -> Result<usize, GraphError> {
        let name = name.into();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(GraphError::InvalidName(name));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(GraphError::NameTooLong {
                name,
                max: MAX_NAME_LEN,
            });
        }
        if self.index.contains_key(&name) {
            return Err(GraphError::DuplicatePage(name));
        }
        let index = self.pages.len();
        self.index.insert(name.clone(), index);
        self.pages.push(Page::new(name, index, 0, Vec::new()));
        Ok(index)
    }

    /// Returns the index of the page with the given name, if any.
    pub fn page_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Adds a link from page `from` to page `to`, given by index.
    ///
    /// Parallel links are kept: each one contributes an outlink to `from`
    /// and an inlink to `to`.
    pub fn add_arc(&mut self, from: usize, to: usize) -> Result<(), GraphError> {
        let num_pages = self.pages.len();
        let max = from.max(to);
        if max >= num_pages {
            return Err(GraphError::PageOutOfBounds {
                page: max,
                num_pages,
            });
        }
        self.pages[to].inlinks.push(from);
        self.pages[from].outlink_count += 1;
        Ok(())
    }

    /// Adds a link between two pages given by name.
    pub fn add_link(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let from = self
            .page_index(from)
            .ok_or_else(|| GraphError::UnknownPage(from.to_owned()))?;
        let to = self
            .page_index(to)
            .ok_or_else(|| GraphError::UnknownPage(to.to_owned()))?;
        self.add_arc(from, to)
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// Consumes the builder, discarding the name map, and returns the graph.
    pub fn build(self) -> Graph {
        let num_arcs = self.pages.iter().map(|p| p.inlinks.len() as u64).sum();
        Graph {
            pages: self.pages,
            num_arcs,
        }
    }
}
