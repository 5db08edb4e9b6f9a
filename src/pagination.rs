//! Page numbering for paginated listings.

use serde::Serialize;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// How many page links surround the edges and the current page.
#[derive(Clone, Copy, Debug)]
struct PageWindow {
    edge: usize,
    before: usize,
    after: usize,
}

const WINDOW: PageWindow = PageWindow {
    edge: 2,
    before: 2,
    after: 4,
};

fn push_range(links: &mut Vec<Option<usize>>, from: usize, to: usize) {
    if matches!(links.last(), Some(Some(last)) if from > last + 1) {
        links.push(None);
    }
    links.extend((from..=to).map(Some));
}

/// Page links for a pager; `None` marks an elided gap.
fn page_links(total_pages: usize, current: usize, window: PageWindow) -> Vec<Option<usize>> {
    if total_pages == 0 {
        return Vec::new();
    }

    let mut links = Vec::new();

    let head_end = window.edge.min(total_pages);
    push_range(&mut links, 1, head_end);

    let mid_start = current.saturating_sub(window.before).max(head_end + 1);
    let mid_end = (current + window.after).min(total_pages);
    if mid_start <= mid_end {
        push_range(&mut links, mid_start, mid_end);
    }

    let covered = links.iter().rev().find_map(|l| *l).unwrap_or(0);
    let tail_start = (total_pages + 1)
        .saturating_sub(window.edge)
        .max(covered + 1);
    if tail_start <= total_pages {
        push_range(&mut links, tail_start, total_pages);
    }

    links
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    /// Wraps one page of `items` out of `total` matching rows.
    pub fn new(items: Vec<T>, page: usize, total: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let total_pages = total.div_ceil(per_page.max(1));

        Self {
            items,
            pages: page_links(total_pages, page, WINDOW),
            page,
            total,
        }
    }
}
