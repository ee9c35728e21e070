//! Page range parsing
//!
//! Two grammars live here:
//! - [`resolve`]: the forgiving page selector used by page deletion and
//!   custom-range image export (`"1,3,5-8"`).
//! - [`parse_split_ranges`]: the `start-end` list used by range splitting,
//!   where both bounds are mandatory (`"1-5, 6-10"`).

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Ascending, duplicate-free set of 1-based page numbers, all within the
/// document they were resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageIndexSet(Vec<u32>);

impl PageIndexSet {
    /// Pages in ascending order
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Pages in descending order, the only safe order for removing pages
    /// one at a time without shifting the ones still to be removed.
    pub fn descending(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().rev().copied()
    }

    pub fn into_vec(self) -> Vec<u32> {
        self.0
    }
}

impl From<BTreeSet<u32>> for PageIndexSet {
    fn from(pages: BTreeSet<u32>) -> Self {
        Self(pages.into_iter().collect())
    }
}

/// Resolve a page range string (e.g. `"1,3,5-8"`) against a document with
/// `total_pages` pages.
///
/// Never fails: unparsable tokens, open-ended ranges, reversed ranges and
/// out-of-range pages are dropped. Callers decide what an empty result
/// means.
pub fn resolve(spec: &str, total_pages: u32) -> PageIndexSet {
    let mut pages = BTreeSet::new();

    for token in spec.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once('-') {
            let (Some(start), Some(end)) = (parse_bound(start), parse_bound(end)) else {
                continue;
            };
            if start > end {
                continue;
            }
            let first = start.max(1);
            let last = end.min(i64::from(total_pages));
            for page in first..=last {
                pages.insert(page as u32);
            }
        } else if let Some(page) = parse_bound(token) {
            if page >= 1 && page <= i64::from(total_pages) {
                pages.insert(page as u32);
            }
        }
    }

    PageIndexSet::from(pages)
}

fn parse_bound(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

/// One `start-end` token of a split range list (1-based, inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRange {
    pub start: u32,
    pub end: u32,
}

impl SplitRange {
    /// 0-based page indices of this range that exist in a document of
    /// `page_count` pages. Empty when the range is reversed or starts past
    /// the end of the document.
    pub fn page_indices(&self, page_count: u32) -> RangeInclusive<u32> {
        let last = self.end.min(page_count);
        if self.start > last {
            #[allow(clippy::reversed_empty_ranges)]
            return 1..=0;
        }
        (self.start - 1)..=(last - 1)
    }
}

/// Parse a split range list such as `"1-5, 6-10"`.
///
/// Every token must be `start-end` with both bounds positive integers;
/// anything else (single pages included) is skipped. Order is preserved
/// because each range becomes its own output document.
pub fn parse_split_ranges(spec: &str) -> Vec<SplitRange> {
    spec.split(',')
        .filter_map(|token| {
            let (start, end) = token.trim().split_once('-')?;
            let start: u32 = start.trim().parse().ok()?;
            let end: u32 = end.trim().parse().ok()?;
            if start == 0 || end == 0 {
                return None;
            }
            Some(SplitRange { start, end })
        })
        .collect()
}
