//! Field descriptors and typed accessors.
//!
//! A [`FieldTable`] is the per-type descriptor that replaces runtime reflection:
//! it maps a case-insensitive API name to a plain getter returning a
//! [`SortValue`]. [`FieldAccessor`] is the resolved, shareable form of one of
//! those getters (or of any caller-supplied closure).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::SortValue;

/// Getter stored in a [`FieldTable`].
pub type Getter<T> = fn(&T) -> SortValue;

/// Normalize an API field name for lookups.
#[inline]
pub fn normalize_field_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Clone)]
pub struct Field<T> {
    /// Name as registered; this is what providers receive for push-down.
    pub name: String,
    pub get: Getter<T>,
}

/// Whitelist of sortable fields of `T`, keyed by normalized name.
#[derive(Clone)]
pub struct FieldTable<T> {
    map: HashMap<String, Field<T>>,
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldTable<T> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, get: Getter<T>) -> Self {
        let name = api_name.into();
        self.map
            .insert(normalize_field_name(&name), Field { name, get });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field<T>> {
        self.map.get(&normalize_field_name(name))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.values().map(|f| f.name.as_str())
    }
}

/// A type whose fields can be looked up by name at runtime.
pub trait Sortable: Sized + Send + Sync + 'static {
    /// Short name used in diagnostics.
    ///
    /// The module path is dropped from the outer type only; generic types keep
    /// their full argument list (`Wrapper<app::Bar>`).
    fn type_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Build the descriptor table. Called only when an accessor is not cached yet.
    fn field_table() -> FieldTable<Self>;
}

fn short_type_name(full: &'static str) -> &'static str {
    let head_end = full
        .find(|c: char| matches!(c, '<' | '(' | '['))
        .unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

/// Implement [`Sortable`] from `"ApiName" => field` pairs.
///
/// ```
/// use paging_core::sortable;
///
/// struct User { id: i64, name: String }
///
/// sortable!(User { "Id" => id, "Name" => name });
/// ```
#[macro_export]
macro_rules! sortable {
    ($ty:ty { $($name:literal => $field:ident),* $(,)? }) => {
        impl $crate::Sortable for $ty {
            fn field_table() -> $crate::FieldTable<Self> {
                $crate::FieldTable::new()
                    $(.insert($name, |item: &$ty| {
                        $crate::ToSortValue::to_sort_value(&item.$field)
                    }))*
            }
        }
    };
}

macro_rules! impl_sortable_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Sortable for $ty {
                fn field_table() -> FieldTable<Self> {
                    FieldTable::new()
                }
            }
        )+
    };
}

// Scalars page in source order or with a caller-supplied accessor; they expose no named fields.
impl_sortable_scalar!(
    String,
    &'static str,
    char,
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    uuid::Uuid,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDate,
    chrono::NaiveTime,
    bigdecimal::BigDecimal,
    SortValue,
);

impl<T: Sortable> Sortable for Option<T> {
    fn field_table() -> FieldTable<Self> {
        FieldTable::new()
    }
}

macro_rules! impl_sortable_tuple {
    ($(($($name:ident),+)),+ $(,)?) => {
        $(
            impl<$($name: Send + Sync + 'static),+> Sortable for ($($name,)+) {
                fn field_table() -> FieldTable<Self> {
                    FieldTable::new()
                }
            }
        )+
    };
}

impl_sortable_tuple!((A), (A, B), (A, B, C), (A, B, C, D));

type AccessorFn<T> = dyn Fn(&T) -> SortValue + Send + Sync;

/// Pure projection from `T` to a comparable [`SortValue`].
pub struct FieldAccessor<T> {
    field: Option<Arc<str>>,
    via_fallback: bool,
    get: Arc<AccessorFn<T>>,
}

impl<T> Clone for FieldAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            via_fallback: self.via_fallback,
            get: Arc::clone(&self.get),
        }
    }
}

impl<T> fmt::Debug for FieldAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("field", &self.field)
            .field("via_fallback", &self.via_fallback)
            .finish_non_exhaustive()
    }
}

impl<T> FieldAccessor<T> {
    /// Accessor bound to a named field; translatable into a provider ordering.
    pub fn named<F>(field: impl AsRef<str>, get: F) -> Self
    where
        F: Fn(&T) -> SortValue + Send + Sync + 'static,
    {
        Self {
            field: Some(Arc::from(field.as_ref())),
            via_fallback: false,
            get: Arc::new(get),
        }
    }

    /// Accessor from an arbitrary closure; usable for in-memory ordering only.
    pub fn from_fn<F>(get: F) -> Self
    where
        F: Fn(&T) -> SortValue + Send + Sync + 'static,
    {
        Self {
            field: None,
            via_fallback: false,
            get: Arc::new(get),
        }
    }

    pub(crate) fn from_field(field: &Field<T>, via_fallback: bool) -> Self
    where
        T: 'static,
    {
        let get = field.get;
        Self {
            field: Some(Arc::from(field.name.as_str())),
            via_fallback,
            get: Arc::new(move |item: &T| get(item)),
        }
    }

    /// Provider-level field name, if any.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn is_fallback(&self) -> bool {
        self.via_fallback
    }

    #[inline]
    pub fn project(&self, item: &T) -> SortValue {
        (self.get)(item)
    }

    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> std::cmp::Ordering {
        self.project(a).cmp(&self.project(b))
    }
}
