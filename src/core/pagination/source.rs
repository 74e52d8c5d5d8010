//! In-memory data source for result sets that are computed up front.

use super::{DataSource, PageRequest};
use crate::errors::Result;
use async_trait::async_trait;

/// Pages over an already ordered `Vec`.
#[derive(Debug, Clone, Default)]
pub struct VecSource<T> {
    items: Vec<T>,
}

impl<T> VecSource<T> {
    /// Wraps `items`, keeping their order.
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl<T> DataSource for VecSource<T>
where
    T: Clone + Send + Sync,
{
    type Item = T;

    async fn count(&self) -> Result<u64> {
        Ok(self.items.len() as u64)
    }

    async fn page(&self, request: PageRequest) -> Result<Vec<T>> {
        let start = usize::try_from(request.offset)
            .unwrap_or(usize::MAX)
            .min(self.items.len());
        let limit = usize::try_from(request.limit).unwrap_or(usize::MAX);
        let end = start.saturating_add(limit).min(self.items.len());
        Ok(self.items[start..end].to_vec())
    }
}
