/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The graph model.
//!
//! A [`Graph`] is a single arena of [`Page`]s: page *i* sits at position *i*
//! and its inlinks are positions in the same arena, so the whole structure is
//! released when the graph goes out of scope. Since PageRank needs the
//! _predecessors_ of each page, only inbound adjacency is stored, together
//! with the number of outbound links of each page.
//!
//! Graphs are immutable once built, which makes them safe to share among any
//! number of threads without locking.

mod builder;
pub use builder::GraphBuilder;

use thiserror::Error;

/// The maximum length in bytes of a page name.
pub const MAX_NAME_LEN: usize = 20;

/// Errors that can occur while building a [`Graph`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A page name exceeds [`MAX_NAME_LEN`] bytes.
    #[error("Page name {name:?} is longer than {max} bytes")]
    NameTooLong { name: String, max: usize },

    /// A page name is empty or contains whitespace.
    #[error("Invalid page name {0:?}")]
    InvalidName(String),

    /// Two pages have the same name.
    #[error("Duplicate page {0:?}")]
    DuplicatePage(String),

    /// A link mentions a page that was never added.
    #[error("Unable to find page for {0}")]
    UnknownPage(String),

    /// A page index is not smaller than the number of pages.
    #[error("Page {page} does not exist (the graph has {num_pages} pages)")]
    PageOutOfBounds { page: usize, num_pages: usize },

    /// The index of a page does not match its position.
    #[error("The page at position {position} has index {index}")]
    IndexMismatch { position: usize, index: usize },
}

/// A page of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    name: String,
    index: usize,
    outlink_count: usize,
    inlinks: Vec<usize>,
}

impl Page {
    /// Creates a new page.
    ///
    /// `inlinks` contains the indices of the pages linking to this page, one
    /// entry per link.
    pub fn new(
        name: impl Into<String>,
        index: usize,
        outlink_count: usize,
        inlinks: Vec<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            outlink_count,
            inlinks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the index of the page, which is also its position in the
    /// rank vector.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of links leaving the page.
    pub fn outlink_count(&self) -> usize {
        self.outlink_count
    }

    /// Returns the indices of the pages linking to this page.
    pub fn inlinks(&self) -> &[usize] {
        &self.inlinks
    }

    /// Returns true if no link leaves the page.
    pub fn is_dangling(&self) -> bool {
        self.outlink_count == 0
    }
}

/// An immutable directed graph stored by inbound adjacency.
///
/// # Examples
///
/// ```
/// use webrank::graph::GraphBuilder;
///
/// let mut builder = GraphBuilder::new();
/// builder.add_page("A")?;
/// builder.add_page("B")?;
/// builder.add_page("C")?;
/// builder.add_link("A", "C")?;
/// builder.add_link("B", "C")?;
/// let graph = builder.build();
///
/// assert_eq!(graph.num_pages(), 3);
/// assert_eq!(graph.num_arcs(), 2);
/// assert_eq!(graph.page(2).inlinks(), &[0, 1]);
/// assert!(graph.page(2).is_dangling());
/// # Ok::<(), webrank::graph::GraphError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    pages: Vec<Page>,
    num_arcs: u64,
}

impl Graph {
    /// Creates a graph from a vector of pages.
    ///
    /// The page at position *i* must have index *i*, and all inlinks must be
    /// valid page indices. No other check is performed: in particular, page
    /// names are not checked for uniqueness and outlink counts are taken at
    /// face value.
    pub fn from_pages(pages: Vec<Page>) -> Result<Self, GraphError> {
        let num_pages = pages.len();
        let mut num_arcs = 0;
        for (position, page) in pages.iter().enumerate() {
            if page.index != position {
                return Err(GraphError::IndexMismatch {
                    position,
                    index: page.index,
                });
            }
            if let Some(&page) = page.inlinks.iter().find(|&&q| q >= num_pages) {
                return Err(GraphError::PageOutOfBounds { page, num_pages });
            }
            num_arcs += page.inlinks.len() as u64;
        }
        Ok(Self { pages, num_arcs })
    }

    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// Returns the number of links, counting parallel links once each.
    pub fn num_arcs(&self) -> u64 {
        self.num_arcs
    }

    /// Returns the page with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than the number of pages.
    pub fn page(&self, index: usize) -> &Page {
        &self.pages[index]
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Returns an iterator over the page names in index order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.pages.iter().map(Page::name)
    }

    /// Returns the number of pages with no outlinks.
    pub fn num_dangling(&self) -> usize {
        self.pages.iter().filter(|p| p.is_dangling()).count()
    }
}
