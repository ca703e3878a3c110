use serde::{Deserialize, Serialize};

use super::{DatabaseError, DbResult};

/// `?page=` query parameter: a 1-based number or `last`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Which slice of an ordered result set to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(number: u32, per_page: u32) -> Self {
        Self { number, per_page }
    }

    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// Resolves the raw `?page=` value against the total row count.
    ///
    /// Out-of-range and non-numeric pages are `NotFound`; an empty result
    /// set still has a first page.
    pub fn resolve(raw: Option<&str>, per_page: u32, total: i64) -> DbResult<Self> {
        let num_pages = num_pages(total, per_page);
        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(value) => value.parse::<u32>().map_err(|_| DatabaseError::NotFound)?,
        };

        if number == 0 || number > num_pages {
            return Err(DatabaseError::NotFound);
        }
        Ok(Self::new(number, per_page))
    }
}

fn num_pages(total: i64, per_page: u32) -> u32 {
    if total <= 0 || per_page == 0 {
        return 1;
    }
    let per_page = i64::from(per_page);
    u32::try_from((total + per_page - 1) / per_page).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub per_page: u32,
    pub total: i64,
    pub num_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            number: request.number,
            per_page: request.per_page,
            total,
            num_pages: num_pages(total, request.per_page),
        }
    }

    pub fn empty(per_page: u32) -> Self {
        Self::new(Vec::new(), PageRequest::first(per_page), 0)
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_page_number(&self) -> u32 {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_page_number(&self) -> u32 {
        (self.number + 1).min(self.num_pages)
    }

    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numbers_and_last() {
        assert_eq!(PageRequest::resolve(None, 20, 45).unwrap().number, 1);
        assert_eq!(PageRequest::resolve(Some("2"), 20, 45).unwrap().number, 2);
        assert_eq!(PageRequest::resolve(Some("last"), 20, 45).unwrap().number, 3);
    }

    #[test]
    fn rejects_pages_outside_the_range() {
        assert!(matches!(
            PageRequest::resolve(Some("4"), 20, 45),
            Err(DatabaseError::NotFound)
        ));
        assert!(matches!(
            PageRequest::resolve(Some("0"), 20, 45),
            Err(DatabaseError::NotFound)
        ));
        assert!(matches!(
            PageRequest::resolve(Some("two"), 20, 45),
            Err(DatabaseError::NotFound)
        ));
    }

    #[test]
    fn empty_results_still_have_one_page() {
        let request = PageRequest::resolve(None, 20, 0).unwrap();
        let page: Page<()> = Page::new(Vec::new(), request, 0);
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn offsets_follow_page_number() {
        let request = PageRequest::new(3, 20);
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);

        let page = Page::new(vec![1, 2, 3], request, 43);
        assert!(page.has_previous());
        assert!(!page.has_next());
        assert_eq!(page.previous_page_number(), 2);
    }
}
