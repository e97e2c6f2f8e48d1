/*
 * SPDX-FileCopyrightText: 2026 The WebRank Authors
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Static partitioning of pages among workers.

use super::{ConfigError, InvariantViolation};
use std::ops::Range;

/// Splits `0..num_pages` into `num_threads` contiguous ranges.
///
/// The ranges are returned in order. The first `num_pages % num_threads`
/// ranges contain one page more than the others, so no range contains more
/// than ⌈`num_pages` / `num_threads`⌉ pages. If there are more threads than
/// pages, the last ranges are empty.
///
/// # Examples
///
/// ```
/// use webrank_algo::rank::partition::partition;
///
/// assert_eq!(partition(10, 3)?, vec![0..4, 4..7, 7..10]);
/// assert_eq!(partition(2, 4)?, vec![0..1, 1..2, 2..2, 2..2]);
/// # Ok::<(), webrank_algo::rank::ConfigError>(())
/// ```
pub fn partition(num_pages: usize, num_threads: usize) -> Result<Vec<Range<usize>>, ConfigError> {
    if num_threads == 0 {
        return Err(ConfigError::NoThreads);
    }
    if num_pages == 0 {
        return Err(ConfigError::EmptyGraph);
    }

    let base = num_pages / num_threads;
    let extra = num_pages % num_threads;
    let mut start = 0;
    Ok((0..num_threads)
        .map(|i| {
            let len = base + usize::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect())
}

/// Checks that `ranges` are contiguous, in order, and cover exactly
/// `0..num_pages`.
pub fn check_partition(ranges: &[Range<usize>], num_pages: usize) -> Result<(), InvariantViolation> {
    let mut expected = 0;
    for (index, range) in ranges.iter().enumerate() {
        if range.start != expected || range.end < range.start {
            return Err(InvariantViolation::Partition {
                index,
                range: range.clone(),
                expected,
            });
        }
        expected = range.end;
    }
    if expected != num_pages {
        return Err(InvariantViolation::Coverage {
            covered: expected,
            num_pages,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage() -> Result<(), ConfigError> {
        for num_pages in 1..=40 {
            for num_threads in 1..=50 {
                let ranges = partition(num_pages, num_threads)?;
                assert_eq!(ranges.len(), num_threads);
                assert!(check_partition(&ranges, num_pages).is_ok());

                let mut seen = vec![0; num_pages];
                for range in &ranges {
                    assert!(range.len() <= num_pages.div_ceil(num_threads));
                    for i in range.clone() {
                        seen[i] += 1;
                    }
                }
                assert!(seen.iter().all(|&c| c == 1), "{num_pages} {num_threads}");
            }
        }
        Ok(())
    }

    #[test]
    fn test_balance() -> Result<(), ConfigError> {
        let lens = partition(11, 4)?
            .into_iter()
            .map(|r| r.len())
            .collect::<Vec<_>>();
        assert_eq!(lens, vec![3, 3, 3, 2]);
        Ok(())
    }

    #[test]
    fn test_invalid() {
        assert_eq!(partition(10, 0), Err(ConfigError::NoThreads));
        assert_eq!(partition(0, 3), Err(ConfigError::EmptyGraph));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(
            check_partition(&[0..3, 4..6], 6),
            Err(InvariantViolation::Partition {
                index: 1,
                range: 4..6,
                expected: 3
            })
        );
        assert_eq!(
            check_partition(&[0..3, 2..6], 6),
            Err(InvariantViolation::Partition {
                index: 1,
                range: 2..6,
                expected: 3
            })
        );
        assert_eq!(
            check_partition(&[0..3, 3..5], 6),
            Err(InvariantViolation::Coverage {
                covered: 5,
                num_pages: 6
            })
        );
    }
}
