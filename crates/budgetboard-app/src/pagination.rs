// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// The same pagination with the index pulled back into range.
    pub fn clamped(self, row_count: usize) -> Self {
        let page_size = nearest_page_size(self.page_size);
        Self {
            page_index: clamp_page_index(self.page_index, row_count, page_size),
            page_size,
        }
    }

    /// Row range of the current page, already clamped to `row_count`.
    pub fn bounds(self, row_count: usize) -> (usize, usize) {
        let clamped = self.clamped(row_count);
        let start = clamped
            .page_index
            .saturating_mul(clamped.page_size)
            .min(row_count);
        let end = start.saturating_add(clamped.page_size).min(row_count);
        (start, end)
    }
}

/// Always at least one page, so an empty table still has page 1 of 1.
pub fn page_count(row_count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    row_count.div_ceil(page_size).max(1)
}

pub fn clamp_page_index(page_index: usize, row_count: usize, page_size: usize) -> usize {
    page_index.min(page_count(row_count, page_size) - 1)
}

/// Snaps an arbitrary size onto the closest allowed option, preferring the
/// smaller one on ties.
pub fn nearest_page_size(size: usize) -> usize {
    PAGE_SIZE_OPTIONS
        .iter()
        .copied()
        .min_by_key(|option| option.abs_diff(size))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Steps through [`PAGE_SIZE_OPTIONS`] without wrapping.
pub fn step_page_size(current: usize, delta: isize) -> usize {
    let current = nearest_page_size(current);
    let index = PAGE_SIZE_OPTIONS
        .iter()
        .position(|option| *option == current)
        .unwrap_or(0);
    let next = if delta.is_negative() {
        index.saturating_sub(delta.unsigned_abs())
    } else {
        index.saturating_add(delta as usize)
    };
    PAGE_SIZE_OPTIONS[next.min(PAGE_SIZE_OPTIONS.len() - 1)]
}

/// Interprets a 1-based page number typed by the user. Numbers outside the
/// range clamp to the first or last page; anything unparsable keeps the
/// current page.
pub fn parse_page_input(raw: &str, current_index: usize, page_count: usize) -> usize {
    let last = page_count.max(1) - 1;
    match raw.trim().parse::<i64>() {
        Ok(number) if number <= 1 => 0,
        Ok(number) => usize::try_from(number - 1).unwrap_or(usize::MAX).min(last),
        Err(_) => current_index.min(last),
    }
}
