//! Booklet page layout.
//!
//! Pure index arithmetic over opaque page handles. Nothing here knows about
//! PDF objects; the PDF splitter feeds `lopdf` page ids through these
//! functions and tests feed plain labels.

/// Number of pages printed on one folded sheet group.
pub const SHEET_PAGES: usize = 8;

/// Result of splitting a page sequence into two booklet halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<P> {
    /// Pages of the first half, in output order.
    pub first: Vec<P>,

    /// Pages of the second half, in output order.
    pub second: Vec<P>,

    /// Number of synthetic pages appended before partitioning.
    pub padding: usize,
}

impl<P> Partition<P> {
    /// Total number of pages across both halves.
    pub fn total(&self) -> usize {
        self.first.len() + self.second.len()
    }
}

/// Smallest multiple of [`SHEET_PAGES`] that is at least `n`.
pub fn padded_len(n: usize) -> usize {
    n.div_ceil(SHEET_PAGES) * SHEET_PAGES
}

/// Distribute `pages` over two halves with the two-cursor booklet rule.
///
/// The first half takes `len / 2` pages by cycling right, left, left, right.
/// The second half then alternates left and right until the cursors meet.
/// `end` is the exclusive right bound, so the right cursor is `end - 1`.
pub fn partition<P: Clone>(pages: &[P]) -> (Vec<P>, Vec<P>) {
    let half = pages.len() / 2;
    let mut left = 0;
    let mut end = pages.len();

    let mut first = Vec::with_capacity(half);
    while first.len() < half {
        end -= 1;
        first.push(pages[end].clone());

        for _ in 0..2 {
            if first.len() < half {
                first.push(pages[left].clone());
                left += 1;
            }
        }

        if first.len() < half {
            end -= 1;
            first.push(pages[end].clone());
        }
    }

    let mut second = Vec::with_capacity(pages.len() - half);
    while left < end {
        second.push(pages[left].clone());
        left += 1;

        if left < end {
            end -= 1;
            second.push(pages[end].clone());
        }
    }

    (first, second)
}

/// Pad `pages` to a multiple of [`SHEET_PAGES`] and partition the result.
///
/// `render_blank` is called once per missing page with that page's 1-based
/// number (`len + 1`, `len + 2`, ...) and must return a handle for the new
/// page. The first error it returns aborts the split.
///
/// # Examples
///
/// ```
/// use pdfbook::split::layout::split;
///
/// let pages: Vec<String> = (1..=6).map(|n| format!("P{n}")).collect();
/// let parts = split(&pages, |n| Ok::<_, ()>(format!("P{n}"))).unwrap();
///
/// assert_eq!(parts.first, ["P8", "P1", "P2", "P7"]);
/// assert_eq!(parts.second, ["P3", "P6", "P4", "P5"]);
/// assert_eq!(parts.padding, 2);
/// ```
pub fn split<P, F, E>(pages: &[P], mut render_blank: F) -> Result<Partition<P>, E>
where
    P: Clone,
    F: FnMut(usize) -> Result<P, E>,
{
    let target = padded_len(pages.len());

    let mut padded = Vec::with_capacity(target);
    padded.extend_from_slice(pages);
    while padded.len() < target {
        padded.push(render_blank(padded.len() + 1)?);
    }

    let (first, second) = partition(&padded);

    Ok(Partition {
        first,
        second,
        padding: target - pages.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn labels(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("P{i}")).collect()
    }

    fn split_labels(n: usize) -> Partition<String> {
        split(&labels(n), |i| Ok::<_, ()>(format!("P{i}"))).unwrap()
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 8)]
    #[case(7, 8)]
    #[case(8, 8)]
    #[case(9, 16)]
    #[case(16, 16)]
    #[case(17, 24)]
    fn test_padded_len(#[case] n: usize, #[case] expected: usize) {
        assert_eq!(padded_len(n), expected);
    }

    #[test]
    fn test_six_pages() {
        let parts = split_labels(6);

        assert_eq!(parts.first, ["P8", "P1", "P2", "P7"]);
        assert_eq!(parts.second, ["P3", "P6", "P4", "P5"]);
        assert_eq!(parts.padding, 2);
    }

    #[test]
    fn test_sixteen_pages() {
        let parts = split_labels(16);

        assert_eq!(
            parts.first,
            ["P16", "P1", "P2", "P15", "P14", "P3", "P4", "P13"]
        );
        assert_eq!(
            parts.second,
            ["P5", "P12", "P6", "P11", "P7", "P10", "P8", "P9"]
        );
        assert_eq!(parts.padding, 0);
    }

    #[test]
    fn test_empty_input() {
        let mut calls = 0;
        let parts = split(&Vec::<String>::new(), |i| {
            calls += 1;
            Ok::<_, ()>(format!("P{i}"))
        })
        .unwrap();

        assert!(parts.first.is_empty());
        assert!(parts.second.is_empty());
        assert_eq!(parts.padding, 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_exact_multiple_is_not_padded() {
        let pages = labels(8);
        let parts = split(&pages, |_| Err::<String, _>("renderer must not run")).unwrap();

        assert_eq!(parts.padding, 0);
        assert_eq!(parts.first, ["P8", "P1", "P2", "P7"]);
        assert_eq!(parts.second, ["P3", "P6", "P4", "P5"]);
    }

    #[test]
    fn test_blank_labels_continue_numbering() {
        let mut requested = Vec::new();
        split(&labels(3), |i| {
            requested.push(i);
            Ok::<_, ()>(format!("P{i}"))
        })
        .unwrap();

        assert_eq!(requested, [4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_renderer_error_aborts() {
        let result = split(&labels(5), |i| if i == 7 { Err(i) } else { Ok(format!("P{i}")) });

        assert_eq!(result, Err(7));
    }

    #[rstest]
    fn test_counts_and_permutation(
        #[values(0, 1, 2, 5, 6, 8, 9, 15, 23, 24, 31, 40, 100)] n: usize,
    ) {
        let parts = split_labels(n);
        let total = padded_len(n);

        assert_eq!(parts.total(), total);
        assert_eq!(parts.first.len(), total / 2);
        assert_eq!(parts.second.len(), total - total / 2);
        assert_eq!(parts.first.len(), parts.second.len());

        let mut seen: Vec<String> = parts.first.iter().chain(&parts.second).cloned().collect();
        let mut expected = labels(total);
        seen.sort();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_partition_unpadded_odd_length() {
        let (first, second) = partition(&[1, 2, 3, 4, 5]);

        assert_eq!(first, [5, 1]);
        assert_eq!(second, [2, 4, 3]);
    }

    #[test]
    fn test_partition_does_not_touch_input() {
        let pages = labels(8);
        let before = pages.clone();
        let _ = partition(&pages);
        assert_eq!(pages, before);
    }
}
