//! Offset pagination with runtime-selected sort fields.
//!
//! Callers hand in either an in-memory sequence or a deferred [`QuerySource`]
//! together with a [`PageRequest`]. The optional sort field is resolved by
//! name through the type's [`FieldTable`] into a [`FieldAccessor`], cached
//! process-wide in the [`AccessorCache`], and applied either in memory or
//! pushed into the query provider.
//!
//! ```
//! use paging_core::{create_page, sortable, PageRequest};
//!
//! struct User { id: i64, name: String }
//! sortable!(User { "Id" => id, "Name" => name });
//!
//! let users = vec![
//!     User { id: 1, name: "Bob".into() },
//!     User { id: 2, name: "Amy".into() },
//! ];
//! let req = PageRequest::new(1, 10).ascending(true).sort_by("name");
//! let page = create_page(Some(users), &req, None).unwrap();
//! let names: Vec<_> = page.items().iter().map(|u| u.name.as_str()).collect();
//! assert_eq!(names, ["Amy", "Bob"]);
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod page;
pub mod plan;
pub mod query;
pub mod request;
pub mod resolver;
pub mod value;

pub use cache::AccessorCache;
pub use config::PagingConfig;
pub use engine::{create_page, create_page_async, Paginator};
pub use error::{Error, ProviderError, Result};
pub use field::{FieldAccessor, FieldTable, Sortable};
pub use page::PageResult;
pub use plan::{PageWindow, SortKey};
pub use query::{MemoryQuery, QuerySource};
pub use request::{PageQuery, PageRequest, SortDir};
pub use resolver::{resolve_field, FallbackPolicy, SortKeyResolver};
pub use value::{SortValue, ToSortValue};

pub use tokio_util::sync::CancellationToken;
