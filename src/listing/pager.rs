use serde::Serialize;

/// Items per page on every listing.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// One page of a sorted, filtered collection.
#[derive(Debug, Serialize)]
pub struct Page<'a, T> {
    pub items: Vec<&'a T>,
    /// 1-based, already clamped.
    pub number: usize,
    pub total_pages: usize,
    /// Size of the filtered collection, not of this page.
    pub total_items: usize,
    pub page_size: usize,
}

impl<T> Page<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_prev(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// 1-based index of the first item on this page (0 when empty).
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.number - 1) * self.page_size + 1
        }
    }
}

/// `ceil(total / page_size)`; zero items means zero pages.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Clamp a 1-based page into `[1, max(total_pages, 1)]`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slice `[(page-1)*size, page*size)` out of `items` after clamping `page`.
pub fn paginate<'a, T>(items: Vec<&'a T>, page: usize, page_size: usize) -> Page<'a, T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let number = clamp_page(page, total_pages);
    let start = (number - 1) * page_size;
    let items = items.into_iter().skip(start).take(page_size).collect();
    Page {
        items,
        number,
        total_pages,
        total_items,
        page_size,
    }
}
