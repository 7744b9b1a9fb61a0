//! Page order for a single-file four-up booklet.
//!
//! Pages are dealt onto sheets of four quadrants (top-left, top-right,
//! bottom-left, bottom-right). Even-numbered pages come from the front of
//! their run on sheet fronts and from the back on sheet backs, odd-numbered
//! pages the other way round. For eight pages:
//!
//! ```text
//! front: [2, 7, 4, 5]
//! back:  [8, 1, 6, 3]
//! ```

use std::collections::VecDeque;

/// Quadrants on one booklet sheet.
pub const QUADRANTS: usize = 4;

/// Number of sheets a booklet of `pages` pages takes.
pub fn sheet_count(pages: usize) -> usize {
    pages.div_ceil(QUADRANTS)
}

/// Arrange `pages` into booklet quadrants.
///
/// The result holds [`QUADRANTS`] slots per sheet, [`sheet_count`] sheets in
/// total. Every page appears exactly once; `None` marks a quadrant left
/// empty because the page count is not a multiple of eight.
///
/// # Examples
///
/// ```
/// use pdfbook::booklet::booklet_order;
///
/// let order = booklet_order(&[1, 2, 3, 4, 5, 6, 7, 8]);
/// let order: Vec<_> = order.into_iter().flatten().collect();
/// assert_eq!(order, [2, 7, 4, 5, 8, 1, 6, 3]);
/// ```
pub fn booklet_order<P: Clone>(pages: &[P]) -> Vec<Option<P>> {
    // page numbers are 1-based, so even pages sit at odd indices
    let (even, odd): (Vec<_>, Vec<_>) = pages
        .iter()
        .enumerate()
        .partition(|(index, _)| index % 2 == 1);
    let mut even: VecDeque<P> = even.into_iter().map(|(_, page)| page.clone()).collect();
    let mut odd: VecDeque<P> = odd.into_iter().map(|(_, page)| page.clone()).collect();

    let mut slots = Vec::with_capacity(pages.len().div_ceil(2 * QUADRANTS) * 2 * QUADRANTS);
    while !even.is_empty() || !odd.is_empty() {
        slots.extend([
            even.pop_front(),
            odd.pop_back(),
            even.pop_front(),
            odd.pop_back(),
            even.pop_back(),
            odd.pop_front(),
            even.pop_back(),
            odd.pop_front(),
        ]);
    }

    // a trailing sheet back that received no page is not printed
    slots.truncate(sheet_count(pages.len()) * QUADRANTS);
    slots
}
