/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::ops::Range;

/// Splits `0..total` into `parts` contiguous ranges of nearly equal size.
///
/// Each range has size `total / parts` or `total / parts + 1`; the first
/// `total % parts` ranges get the extra element. If `parts` is larger than
/// `total`, the trailing ranges are empty.
///
/// # Panics
///
/// Panics if `parts` is zero.
///
/// # Examples
///
/// ```
/// use pagerank_barrier::utils::partition;
///
/// let ranges: Vec<_> = partition(10, 3).collect();
/// assert_eq!(ranges, [0..4, 4..7, 7..10]);
/// ```
pub fn partition(total: usize, parts: usize) -> Partition {
    Partition::new(total, parts)
}

/// The iterator returned by [`partition`].
#[derive(Debug, Clone)]
pub struct Partition {
    /// The minimum size of a range.
    base_len: usize,
    /// The number of ranges getting an extra element.
    extra: usize,
    /// The index of the next range.
    index: usize,
    parts: usize,
    start: usize,
}

impl Partition {
    fn new(total: usize, parts: usize) -> Self {
        assert_ne!(parts, 0, "Cannot split into zero parts");
        Self {
            base_len: total / parts,
            extra: total % parts,
            index: 0,
            parts,
            start: 0,
        }
    }
}

impl Iterator for Partition {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index == self.parts {
            return None;
        }
        let len = self.base_len + usize::from(self.index < self.extra);
        let range = self.start..self.start + len;
        self.start += len;
        self.index += 1;
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.parts - self.index;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Partition {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition() {
        assert_eq!(partition(10, 3).collect::<Vec<_>>(), [0..4, 4..7, 7..10]);
        assert_eq!(partition(9, 3).collect::<Vec<_>>(), [0..3, 3..6, 6..9]);
        assert_eq!(partition(5, 1).collect::<Vec<_>>(), [0..5]);
        assert_eq!(
            partition(2, 4).collect::<Vec<_>>(),
            [0..1, 1..2, 2..2, 2..2]
        );
        assert_eq!(partition(0, 2).collect::<Vec<_>>(), [0..0, 0..0]);
    }

    #[test]
    fn test_cover() {
        for total in 0..50 {
            for parts in 1..20 {
                let ranges = partition(total, parts);
                assert_eq!(ranges.len(), parts);
                let mut next = 0;
                for range in ranges {
                    assert_eq!(range.start, next);
                    assert!(range.len() == total / parts || range.len() == total / parts + 1);
                    next = range.end;
                }
                assert_eq!(next, total);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_zero_parts() {
        partition(10, 0);
    }
}
