//! Paging engines.
//!
//! Both engines run the same algorithm: validate the window, short-circuit a
//! missing source, pick the sort key, count, order, slice, assemble. The eager
//! engine does every step in memory; the deferred engine hands ordering,
//! counting and slicing to a [`QuerySource`].

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::config::PagingConfig;
use crate::error::{Error, Result};
use crate::field::{FieldAccessor, Sortable};
use crate::page::PageResult;
use crate::plan::{select_sort_key, sort_in_memory, take_window, PageWindow};
use crate::query::QuerySource;
use crate::request::PageRequest;
use crate::resolver::SortKeyResolver;

#[inline]
fn ensure_live(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Await `fut` unless `cancel` fires first.
async fn until_cancelled<F, R>(cancel: &CancellationToken, fut: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    ensure_live(cancel)?;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}

#[derive(Clone, Debug, Default)]
pub struct Paginator {
    resolver: SortKeyResolver,
    max_page_size: Option<u32>,
}

impl Paginator {
    pub fn new(resolver: SortKeyResolver) -> Self {
        Self {
            resolver,
            max_page_size: None,
        }
    }

    pub fn from_config(cfg: &PagingConfig) -> Self {
        Self {
            resolver: SortKeyResolver::new(cfg.fallback_policy()),
            max_page_size: cfg.max_page_size,
        }
    }

    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = Some(max);
        self
    }

    pub fn resolver(&self) -> &SortKeyResolver {
        &self.resolver
    }

    /// Resolve `field_name` once so the accessor can be reused across calls.
    pub fn resolve_field<T: Sortable>(&self, field_name: &str) -> Result<FieldAccessor<T>> {
        self.resolver.resolve::<T>(field_name)
    }

    /// Page an in-memory sequence.
    ///
    /// The source is materialized once for an exact count, stably ordered and
    /// sliced. Cancellation is checked on entry and around the sort.
    pub fn create_page<T, I>(
        &self,
        source: Option<I>,
        request: &PageRequest,
        accessor: Option<FieldAccessor<T>>,
        cancel: &CancellationToken,
    ) -> Result<PageResult<T>>
    where
        T: Sortable,
        I: IntoIterator<Item = T>,
    {
        ensure_live(cancel)?;
        let window = PageWindow::from_request(request, self.max_page_size)?;

        let Some(source) = source else {
            return Ok(PageResult::empty(window.page_number, window.page_size));
        };

        let sort = select_sort_key(request, accessor, &self.resolver)?;
        let mut items: Vec<T> = source.into_iter().collect();
        let total = items.len() as u64;

        if let Some(key) = sort {
            ensure_live(cancel)?;
            sort_in_memory(&mut items, std::slice::from_ref(&key));
            ensure_live(cancel)?;
        }

        let items = take_window(items, window.skip, window.take);
        debug!(
            entity = T::type_name(),
            total,
            page_number = window.page_number,
            returned = items.len(),
            "built in-memory page"
        );
        Ok(PageResult::assemble(
            total,
            window.page_number,
            window.page_size,
            items,
        ))
    }

    /// Page a deferred source, pushing count, ordering and slicing into it.
    ///
    /// Count and fetch run one after the other and both race `cancel`; a
    /// cancellation at any point fails the whole call. The two reads are not
    /// atomic, so `total_count` and `items` can disagree if the data changes
    /// between them.
    #[instrument(
        name = "paging.create_page_async",
        skip_all,
        fields(
            entity = T::type_name(),
            page_number = request.page_number,
            page_size = request.page_size
        )
    )]
    pub async fn create_page_async<T, Q>(
        &self,
        source: Option<Q>,
        request: &PageRequest,
        accessor: Option<FieldAccessor<T>>,
        cancel: &CancellationToken,
    ) -> Result<PageResult<T>>
    where
        T: Sortable,
        Q: QuerySource<T>,
    {
        ensure_live(cancel)?;
        let window = PageWindow::from_request(request, self.max_page_size)?;

        let Some(source) = source else {
            return Ok(PageResult::empty(window.page_number, window.page_size));
        };

        let sort = select_sort_key(request, accessor, &self.resolver)?;

        // Compose before touching the provider so untranslatable orderings fail fast.
        let mut query = source;
        if let Some(key) = &sort {
            query = query.order_by(key)?;
        }
        let query = query.window(window.skip, window.take);

        let total = until_cancelled(cancel, query.count()).await?;
        debug!(total, "counted");

        let items = until_cancelled(cancel, query.fetch()).await?;
        ensure_live(cancel)?;
        debug!(returned = items.len(), "fetched page window");

        Ok(PageResult::assemble(
            total,
            window.page_number,
            window.page_size,
            items,
        ))
    }
}

/// Page an in-memory sequence with the default (strict) paginator.
pub fn create_page<T, I>(
    source: Option<I>,
    request: &PageRequest,
    accessor: Option<FieldAccessor<T>>,
) -> Result<PageResult<T>>
where
    T: Sortable,
    I: IntoIterator<Item = T>,
{
    Paginator::default().create_page(source, request, accessor, &CancellationToken::new())
}

/// Page a deferred source with the default (strict) paginator.
pub async fn create_page_async<T, Q>(
    source: Option<Q>,
    request: &PageRequest,
    accessor: Option<FieldAccessor<T>>,
    cancel: &CancellationToken,
) -> Result<PageResult<T>>
where
    T: Sortable,
    Q: QuerySource<T>,
{
    Paginator::default()
        .create_page_async(source, request, accessor, cancel)
        .await
}
