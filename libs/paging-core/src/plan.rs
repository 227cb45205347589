//! Page geometry, sort key selection and the in-memory ordering/windowing
//! shared by both engines.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::field::{FieldAccessor, Sortable};
use crate::request::{PageRequest, SortDir};
use crate::resolver::SortKeyResolver;
use crate::value::SortValue;

/// A resolved accessor paired with a direction.
#[derive(Debug)]
pub struct SortKey<T> {
    pub accessor: FieldAccessor<T>,
    pub dir: SortDir,
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            dir: self.dir,
        }
    }
}

impl<T> SortKey<T> {
    pub fn new(accessor: FieldAccessor<T>, dir: SortDir) -> Self {
        Self { accessor, dir }
    }

    /// Provider-level field name, when the accessor has one.
    pub fn field(&self) -> Option<&str> {
        self.accessor.field()
    }
}

/// Validated page geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page_number: u32,
    pub page_size: u32,
    pub skip: u64,
    pub take: u64,
}

impl PageWindow {
    /// Reject a zero page number, a zero page size and sizes above `max_page_size`.
    pub fn from_request(request: &PageRequest, max_page_size: Option<u32>) -> Result<Self> {
        if request.page_number == 0 {
            return Err(Error::invalid_argument(
                "page_number",
                "page number must be at least 1",
            ));
        }
        if request.page_size == 0 {
            return Err(Error::invalid_argument(
                "page_size",
                "page size must be greater than zero",
            ));
        }
        if let Some(max) = max_page_size {
            if request.page_size > max {
                return Err(Error::invalid_argument(
                    "page_size",
                    format!("page size {} exceeds the maximum of {max}", request.page_size),
                ));
            }
        }
        let page_size = u64::from(request.page_size);
        Ok(Self {
            page_number: request.page_number,
            page_size: request.page_size,
            skip: u64::from(request.page_number - 1).saturating_mul(page_size),
            take: page_size,
        })
    }
}

/// Pick the sort key: an explicit accessor wins, then `sort_field`, else none.
///
/// A blank `sort_field` means no ordering, the same as [`PageQuery`](crate::PageQuery).
pub fn select_sort_key<T: Sortable>(
    request: &PageRequest,
    accessor: Option<FieldAccessor<T>>,
    resolver: &SortKeyResolver,
) -> Result<Option<SortKey<T>>> {
    let sort_field = request
        .sort_field
        .as_deref()
        .filter(|name| !name.trim().is_empty());
    let accessor = match (accessor, sort_field) {
        (Some(acc), _) => Some(acc),
        (None, Some(name)) => Some(resolver.resolve::<T>(name)?),
        (None, None) => None,
    };
    Ok(accessor.map(|acc| SortKey::new(acc, request.dir())))
}

struct Directed(SortDir, SortValue);

impl Ord for Directed {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.apply(self.1.cmp(&other.1))
    }
}

impl PartialOrd for Directed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Directed {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Directed {}

/// Stable multi-key sort; each accessor is evaluated once per item.
pub fn sort_in_memory<T>(items: &mut [T], keys: &[SortKey<T>]) {
    if keys.is_empty() {
        return;
    }
    items.sort_by_cached_key(|item| {
        keys.iter()
            .map(|k| Directed(k.dir, k.accessor.project(item)))
            .collect::<Vec<_>>()
    });
}

/// Skip `skip` items and keep at most `take`.
pub fn take_window<T>(items: Vec<T>, skip: u64, take: u64) -> Vec<T> {
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let take = usize::try_from(take).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
}
