//! SeaORM integration for `paging-core`.
//!
//! Wraps a `sea_orm::Select<E>` into a [`SeaQuerySource`] so that the deferred
//! paging engine pushes ordering, counting and the page window into the
//! database.
//!
//! # Features
//! - `pg`, `mysql`, `sqlite`: enable the matching SeaORM SQLx backend
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use paging_core::{CancellationToken, PageRequest, Paginator};
//! use paging_db::{FieldMap, SelectPagingExt};
//!
//! let fields = Arc::new(FieldMap::<track::Entity>::from_entity());
//! let source = track::Entity::find()
//!     .into_page_source(&db, fields)
//!     .with_tiebreaker(track::Column::Id);
//! let page = Paginator::default()
//!     .create_page_async(Some(source), &PageRequest::new(1, 20).sort_by("title"), None, &CancellationToken::new())
//!     .await?;
//! ```

pub mod select;

pub use select::{FieldMap, SeaQuerySource, SelectPagingExt};
