/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Output of rank vectors.

use crate::create_parent_dir;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The order in which pages are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Order {
    /// Input order, that is, by page index.
    #[default]
    Index,
    /// By decreasing rank; pages with the same rank are in input order.
    Rank,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
/// Formats for writing ranks.
pub enum RankFormat {
    /// One page per line: the page name, a space, and its rank.
    #[default]
    Text,
    /// One rank per line.
    Ascii,
    /// A JSON array of objects with a `name` and a `rank` field.
    Json,
}

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a str,
    rank: f64,
}

impl RankFormat {
    /// The number of decimal digits of text formats.
    pub const DEFAULT_PRECISION: usize = 4;

    /// Writes ranks to `writer` using the format defined by `self`.
    ///
    /// `pages` yields the name and rank of each page in index order.
    /// `precision` is the number of decimal digits used by the text formats
    /// ([`DEFAULT_PRECISION`](Self::DEFAULT_PRECISION) if `None`); JSON output
    /// always uses the shortest representation that round-trips.
    pub fn write<'a>(
        &self,
        mut writer: impl Write,
        pages: impl IntoIterator<Item = (&'a str, f64)>,
        order: Order,
        precision: Option<usize>,
    ) -> Result<()> {
        let mut pages = pages.into_iter().collect::<Vec<_>>();
        if order == Order::Rank {
            // Stable, so ties stay in index order
            pages.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        }
        let precision = precision.unwrap_or(Self::DEFAULT_PRECISION);

        match self {
            RankFormat::Text => {
                for (name, rank) in &pages {
                    writeln!(writer, "{name} {rank:.precision$}")?;
                }
            }
            RankFormat::Ascii => {
                for (_, rank) in &pages {
                    writeln!(writer, "{rank:.precision$}")?;
                }
            }
            RankFormat::Json => {
                let entries = pages
                    .iter()
                    .map(|&(name, rank)| Entry { name, rank })
                    .collect::<Vec<_>>();
                serde_json::to_writer_pretty(&mut writer, &entries)?;
                writeln!(writer)?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes ranks to the file at `path`, or to standard output if `path`
    /// is `None`, using the format defined by `self`.
    ///
    /// See [`write`](Self::write) for the meaning of the other arguments.
    pub fn store<'a>(
        &self,
        path: Option<&Path>,
        pages: impl IntoIterator<Item = (&'a str, f64)>,
        order: Order,
        precision: Option<usize>,
    ) -> Result<()> {
        match path {
            Some(path) => {
                create_parent_dir(path)?;
                let path_display = path.display();
                log::info!("Storing ranks in {:?} format at {}", self, path_display);
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Could not create {}", path_display))?;
                self.write(BufWriter::new(file), pages, order, precision)
                    .with_context(|| format!("Could not write ranks to {}", path_display))
            }
            None => self
                .write(std::io::stdout().lock(), pages, order, precision)
                .context("Could not write ranks to standard output"),
        }
    }
}
