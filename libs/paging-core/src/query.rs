//! Deferred query sources.
//!
//! A [`QuerySource`] composes ordering and windowing without executing
//! anything; `count` and `fetch` are the only calls that reach the provider.

use async_trait::async_trait;

use crate::error::Result;
use crate::plan::{sort_in_memory, take_window, SortKey};

#[async_trait]
pub trait QuerySource<T: Send + 'static>: Send + Sync + Sized {
    /// Append an ordering key. Keys added earlier take precedence.
    fn order_by(self, key: &SortKey<T>) -> Result<Self>;

    /// Restrict the fetched rows to `take` items after skipping `skip`.
    fn window(self, skip: u64, take: u64) -> Self;

    /// Number of items in the source, ignoring ordering and windowing.
    async fn count(&self) -> Result<u64>;

    /// Execute the composed query.
    async fn fetch(self) -> Result<Vec<T>>;
}

/// [`QuerySource`] over items that are already in memory.
pub struct MemoryQuery<T> {
    items: Vec<T>,
    order: Vec<SortKey<T>>,
    skip: u64,
    take: Option<u64>,
}

impl<T> MemoryQuery<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            order: Vec::new(),
            skip: 0,
            take: None,
        }
    }
}

impl<T> From<Vec<T>> for MemoryQuery<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

#[async_trait]
impl<T> QuerySource<T> for MemoryQuery<T>
where
    T: Send + Sync + 'static,
{
    fn order_by(mut self, key: &SortKey<T>) -> Result<Self> {
        self.order.push(key.clone());
        Ok(self)
    }

    fn window(mut self, skip: u64, take: u64) -> Self {
        self.skip = skip;
        self.take = Some(take);
        self
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.items.len() as u64)
    }

    async fn fetch(self) -> Result<Vec<T>> {
        let mut items = self.items;
        sort_in_memory(&mut items, &self.order);
        Ok(take_window(items, self.skip, self.take.unwrap_or(u64::MAX)))
    }
}
