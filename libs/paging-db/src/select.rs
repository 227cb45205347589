//! SeaORM `Select<E>` as a deferred [`QuerySource`].
//!
//! Sort keys are translated through a [`FieldMap`] into `ORDER BY` columns;
//! counting runs `SELECT COUNT(*)` over the unordered, unwindowed select and
//! the page window becomes `OFFSET`/`LIMIT`. Nothing is materialized locally
//! beyond the rows of the requested page.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use paging_core::{Error, QuerySource, SortDir, SortKey};
use sea_orm::{
    sea_query::Order, ColumnTrait, ConnectionTrait, EntityTrait, IdenStatic,
    Iterable, PaginatorTrait, QueryOrder, QuerySelect, Select,
};
use tracing::trace;

/// Lookup key for a field or column name: case and underscores are ignored,
/// so `CreatedAt`, `createdat` and `created_at` all name the same column.
fn column_key(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whitelist of API field names → entity columns.
#[derive(Clone)]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, E::Column>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Every column of `E`, reachable by its snake_case column name and by the
    /// camel-case spelling used in field tables.
    pub fn from_entity() -> Self
    where
        E::Column: Iterable,
    {
        E::Column::iter().fold(Self::new(), |m, col| {
            let name = col.as_str().to_owned();
            m.insert(name, col)
        })
    }

    pub fn insert(mut self, api_name: impl Into<String>, col: E::Column) -> Self {
        self.map.insert(column_key(&api_name.into()), col);
        self
    }

    pub fn get(&self, name: &str) -> Option<&E::Column> {
        self.map.get(&column_key(name))
    }
}

fn entity_name<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

fn to_order(dir: SortDir) -> Order {
    match dir {
        SortDir::Asc => Order::Asc,
        SortDir::Desc => Order::Desc,
    }
}

/// A `Select<E>` bound to a connection, with ordering and window recorded
/// but not yet executed.
pub struct SeaQuerySource<'c, E, C>
where
    E: EntityTrait,
{
    select: Select<E>,
    conn: &'c C,
    fields: Arc<FieldMap<E>>,
    order: Vec<(E::Column, Order)>,
    tiebreaker: Option<E::Column>,
    skip: u64,
    take: Option<u64>,
}

impl<'c, E, C> SeaQuerySource<'c, E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    C: ConnectionTrait,
{
    pub fn new(select: Select<E>, conn: &'c C, fields: Arc<FieldMap<E>>) -> Self {
        Self {
            select,
            conn,
            fields,
            order: Vec::new(),
            tiebreaker: None,
            skip: 0,
            take: None,
        }
    }

    /// Append `col ASC` after the requested ordering so equal keys come back
    /// in a deterministic order.
    pub fn with_tiebreaker(mut self, col: E::Column) -> Self {
        self.tiebreaker = Some(col);
        self
    }

    fn ordered(&self) -> Select<E> {
        let mut select = self.select.clone();
        for (col, order) in &self.order {
            select = select.order_by(*col, order.clone());
        }
        if let Some(tb) = self.tiebreaker {
            let tb_name = tb.as_str();
            if !self.order.iter().any(|(c, _)| c.as_str() == tb_name) {
                select = select.order_by(tb, Order::Asc);
            }
        }
        select
    }
}

#[async_trait]
impl<'c, E, C> QuerySource<E::Model> for SeaQuerySource<'c, E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait + Send + Sync,
{
    fn order_by(mut self, key: &SortKey<E::Model>) -> paging_core::Result<Self> {
        let name = key.field().ok_or_else(|| Error::OrderNotTranslatable {
            type_name: entity_name::<E>(),
        })?;
        let col = *self
            .fields
            .get(name)
            .ok_or_else(|| Error::field_not_found(name, entity_name::<E>()))?;
        self.order.push((col, to_order(key.dir)));
        Ok(self)
    }

    fn window(mut self, skip: u64, take: u64) -> Self {
        self.skip = skip;
        self.take = Some(take);
        self
    }

    async fn count(&self) -> paging_core::Result<u64> {
        trace!(entity = %entity_name::<E>(), "count");
        self.select
            .clone()
            .count(self.conn)
            .await
            .map_err(Error::provider)
    }

    async fn fetch(self) -> paging_core::Result<Vec<E::Model>> {
        let mut select = self.ordered();
        if self.skip > 0 {
            select = select.offset(self.skip);
        }
        if let Some(take) = self.take {
            select = select.limit(take);
        }
        trace!(entity = %entity_name::<E>(), skip = self.skip, take = ?self.take, "fetch");
        select.all(self.conn).await.map_err(Error::provider)
    }
}

/// Turn a `Select<E>` into a [`SeaQuerySource`].
pub trait SelectPagingExt<E: EntityTrait>: Sized {
    fn into_page_source<'c, C>(
        self,
        conn: &'c C,
        fields: Arc<FieldMap<E>>,
    ) -> SeaQuerySource<'c, E, C>
    where
        C: ConnectionTrait;
}

impl<E> SelectPagingExt<E> for Select<E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    fn into_page_source<'c, C>(
        self,
        conn: &'c C,
        fields: Arc<FieldMap<E>>,
    ) -> SeaQuerySource<'c, E, C>
    where
        C: ConnectionTrait,
    {
        SeaQuerySource::new(self, conn, fields)
    }
}
