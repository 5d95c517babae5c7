//! Paginated windows.
//!
//! The engine only needs [`Windowed::items`]; [`Page`] is the concrete
//! window produced by the store.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::EntityRef;

/// Anything exposing an ordered slice of entities.
pub trait Windowed: Send + Sync {
    fn items(&self) -> &[EntityRef];
}

/// One page of a larger result set.
#[derive(Clone)]
pub struct Page {
    items: Vec<EntityRef>,
    current_page: usize,
    per_page: usize,
    total: usize,
}

/// Serializable pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: usize,
    pub per_page: usize,
    pub total: usize,
    pub last_page: usize,
}

impl Page {
    pub fn new(items: Vec<EntityRef>, current_page: usize, per_page: usize, total: usize) -> Self {
        Self {
            items,
            current_page: current_page.max(1),
            per_page: per_page.max(1),
            total,
        }
    }

    /// Cut page `page` (1-based) out of `all`.
    ///
    /// Pages past the end are empty.
    pub fn paginate(all: Vec<EntityRef>, page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = all.len();
        let items = all
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        Self::new(items, page, per_page, total)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last_page(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page()
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page(),
        }
    }
}

impl Windowed for Page {
    fn items(&self) -> &[EntityRef] {
        &self.items
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("items", &self.items.len())
            .field("current_page", &self.current_page)
            .field("per_page", &self.per_page)
            .field("total", &self.total)
            .finish()
    }
}
