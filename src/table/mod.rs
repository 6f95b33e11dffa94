use std::ops::Range;

use crate::present::{DisplayValue, ReviewRow};

fn display_matches(value: &DisplayValue, needle: &str) -> bool {
    match value {
        DisplayValue::Empty => false,
        DisplayValue::Text(s) => s.to_lowercase().contains(needle),
    }
}

/// Case-insensitive search over key, label and both displayed values.
pub fn search_rows<'r>(rows: &'r [ReviewRow], query: &str) -> Vec<&'r ReviewRow> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|r| {
            r.key.to_lowercase().contains(&needle)
                || r.label.to_lowercase().contains(&needle)
                || display_matches(&r.old_display, &needle)
                || display_matches(&r.new_display, &needle)
        })
        .collect()
}

/// 1-based page arithmetic over `total` items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Pagination {
    /// `page` is clamped into `1..=total_pages`; a zero `page_size` shows
    /// everything on one page.
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let page_size = if page_size == 0 { total.max(1) } else { page_size };
        let mut p = Self {
            page: 1,
            page_size,
            total,
        };
        p.page = page.clamp(1, p.total_pages());
        p
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    pub fn range(&self) -> Range<usize> {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.total);
        start.min(end)..end
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn slice<'t, T>(&self, items: &'t [T]) -> &'t [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        &items[range.start.min(end)..end]
    }
}
