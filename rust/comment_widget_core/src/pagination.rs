//! Page-number window shown under the comment list.

use serde::{Deserialize, Serialize};

use crate::model::total_pages;

/// Consecutive page numbers kept next to the first or last page.
pub const WINDOW_SPAN: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "page")]
pub enum PageEntry {
    Number(u32),
    Ellipsis,
}

/// Builds the abbreviated page selector for `total` items split into pages of `size`.
///
/// Always contains page 1 and the last page once there is at least one page.
/// `current` is clamped into `1..=total_pages`. Page counts past `u32::MAX`
/// saturate; use [`checked_total_pages`](crate::model::checked_total_pages) to refuse them instead.
pub fn compute_window(total: u64, size: u32, current: u32) -> Vec<PageEntry> {
    let pages = total_pages(total, size);
    if pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, pages);

    let (start, end) = if pages <= WINDOW_SPAN {
        (1, pages)
    } else if current <= 3 {
        (1, WINDOW_SPAN)
    } else if current >= pages - 2 {
        (pages - (WINDOW_SPAN - 1), pages)
    } else {
        (current - 2, current + 2)
    };

    let mut entries = Vec::with_capacity((end - start + 5) as usize);
    if start > 1 {
        entries.push(PageEntry::Number(1));
        if start > 2 { entries.push(PageEntry::Ellipsis); }
    }
    entries.extend((start..=end).map(PageEntry::Number));
    if end < pages {
        if end < pages - 1 { entries.push(PageEntry::Ellipsis); }
        entries.push(PageEntry::Number(pages));
    }
    entries
}

/// A clickable element of the strip. Ellipses carry no target and cannot be selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLink {
    pub entry: PageEntry,
    pub is_current: bool,
}

/// Everything the pagination renderer needs: prev/next targets plus the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStrip {
    pub current: u32,
    pub total_pages: u32,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub links: Vec<PageLink>,
}

impl PageStrip {
    pub fn build(total: u64, size: u32, current: u32) -> Self {
        let pages = total_pages(total, size);
        let current = current.clamp(1, pages.max(1));
        let links = compute_window(total, size, current)
            .into_iter()
            .map(|entry| PageLink { is_current: entry == PageEntry::Number(current), entry })
            .collect();
        Self {
            current,
            total_pages: pages,
            prev: (current > 1).then(|| current - 1),
            next: (current < pages).then(|| current + 1),
            links,
        }
    }

    pub fn is_empty(&self) -> bool { self.links.is_empty() }

    /// Page to request when the user picks `target`; `None` when it is already shown
    /// or lies outside the known range.
    pub fn select(&self, target: u32) -> Option<u32> {
        if target == self.current || target == 0 || target > self.total_pages {
            return None;
        }
        Some(target)
    }
}
