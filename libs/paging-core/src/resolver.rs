//! Field name → [`FieldAccessor`] resolution.

use tracing::{debug, trace};

use crate::cache::AccessorCache;
use crate::error::{Error, Result};
use crate::field::{normalize_field_name, FieldAccessor, FieldTable, Sortable};

/// What to do when the requested field does not exist on the type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Fail with [`Error::FieldNotFound`].
    #[default]
    Strict,
    /// Try each listed field in order before failing.
    Fallback(Vec<String>),
}

impl FallbackPolicy {
    /// Fallback through `Id`, then `DateCreated`.
    pub fn id_then_date_created() -> Self {
        FallbackPolicy::Fallback(vec!["Id".to_owned(), "DateCreated".to_owned()])
    }
}

#[derive(Clone, Debug)]
pub struct SortKeyResolver {
    cache: &'static AccessorCache,
    policy: FallbackPolicy,
}

impl Default for SortKeyResolver {
    fn default() -> Self {
        Self::new(FallbackPolicy::Strict)
    }
}

impl SortKeyResolver {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self::with_cache(AccessorCache::global(), policy)
    }

    pub fn with_cache(cache: &'static AccessorCache, policy: FallbackPolicy) -> Self {
        Self { cache, policy }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Resolve `field_name` on `T`.
    ///
    /// A direct match is cached under the requested name. A match found through
    /// the fallback chain is cached under the requested name qualified by that
    /// chain, so resolvers with different chains (or none) never see each
    /// other's fallback entries.
    pub fn resolve<T: Sortable>(&self, field_name: &str) -> Result<FieldAccessor<T>> {
        if field_name.trim().is_empty() {
            return Err(Error::field_not_found(field_name, T::type_name()));
        }

        if let Some(hit) = self.cache.get::<T>(field_name).filter(|a| !a.is_fallback()) {
            trace!(entity = T::type_name(), field = field_name, "accessor cache hit");
            return Ok(hit);
        }

        let candidates = match &self.policy {
            FallbackPolicy::Strict => {
                return self
                    .cache
                    .get_or_try_build(field_name, || direct::<T>(&T::field_table(), field_name))
                    .and_then(|acc| reject_fallback::<T>(acc, field_name));
            }
            FallbackPolicy::Fallback(candidates) => candidates,
        };

        let key = fallback_key(field_name, candidates);
        if let Some(hit) = self.cache.get::<T>(&key) {
            trace!(entity = T::type_name(), field = field_name, "fallback cache hit");
            return Ok(hit);
        }

        let table: FieldTable<T> = T::field_table();
        if table.get(field_name).is_some() {
            return self
                .cache
                .get_or_try_build(field_name, || direct::<T>(&table, field_name))
                .and_then(|acc| reject_fallback::<T>(acc, field_name));
        }

        self.cache.get_or_try_build(&key, || {
            let field = candidates
                .iter()
                .find_map(|c| table.get(c))
                .ok_or_else(|| Error::field_not_found(field_name, T::type_name()))?;
            debug!(
                entity = T::type_name(),
                requested = field_name,
                fallback = %field.name,
                "sort field not found, using fallback"
            );
            Ok(FieldAccessor::from_field(field, true))
        })
    }
}

fn direct<T: Sortable>(table: &FieldTable<T>, field_name: &str) -> Result<FieldAccessor<T>> {
    table
        .get(field_name)
        .map(|field| FieldAccessor::from_field(field, false))
        .ok_or_else(|| Error::field_not_found(field_name, T::type_name()))
}

// A requested name can collide with a fallback key; such an entry is not a direct match.
fn reject_fallback<T: Sortable>(acc: FieldAccessor<T>, field_name: &str) -> Result<FieldAccessor<T>> {
    if acc.is_fallback() {
        Err(Error::field_not_found(field_name, T::type_name()))
    } else {
        Ok(acc)
    }
}

/// Cache key for a fallback resolution: `requested->candidate|candidate`.
fn fallback_key(field_name: &str, candidates: &[String]) -> String {
    let chain: Vec<String> = candidates.iter().map(|c| normalize_field_name(c)).collect();
    format!("{}->{}", normalize_field_name(field_name), chain.join("|"))
}

/// Resolve a field with the global cache and the strict policy.
///
/// Pre-resolved accessors can be passed to the paging engines to skip lookup.
pub fn resolve_field<T: Sortable>(field_name: &str) -> Result<FieldAccessor<T>> {
    SortKeyResolver::default().resolve::<T>(field_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sortable, SortValue, ToSortValue};
    use chrono::{DateTime, TimeZone, Utc};

    struct Article {
        id: i64,
        title: String,
    }
    sortable!(Article { "Id" => id, "Title" => title });

    struct Event {
        date_created: DateTime<Utc>,
    }
    sortable!(Event { "DateCreated" => date_created });

    struct Bare {
        label: String,
    }
    sortable!(Bare { "Label" => label });

    fn leaked_cache() -> &'static AccessorCache {
        Box::leak(Box::new(AccessorCache::new()))
    }

    #[test]
    fn resolves_case_insensitively() {
        let r = SortKeyResolver::with_cache(leaked_cache(), FallbackPolicy::Strict);
        let acc = r.resolve::<Article>("tItLe").unwrap();
        assert_eq!(acc.field(), Some("Title"));
        let a = Article {
            id: 1,
            title: "x".into(),
        };
        assert_eq!(acc.project(&a), "x".to_sort_value());
        assert_eq!(a.id, 1);
    }

    #[test]
    fn strict_reports_field_and_type() {
        let r = SortKeyResolver::with_cache(leaked_cache(), FallbackPolicy::Strict);
        match r.resolve::<Article>("Bogus") {
            Err(Error::FieldNotFound { field, type_name }) => {
                assert_eq!(field, "Bogus");
                assert_eq!(type_name, "Article");
            }
            other => panic!("expected FieldNotFound, got {other:?}"),
        }
    }

    #[test]
    fn fallback_prefers_id_then_date_created() {
        let r = SortKeyResolver::with_cache(leaked_cache(), FallbackPolicy::id_then_date_created());

        let acc = r.resolve::<Article>("Bogus").unwrap();
        assert_eq!(acc.field(), Some("Id"));
        assert!(acc.is_fallback());

        let acc = r.resolve::<Event>("Bogus").unwrap();
        assert_eq!(acc.field(), Some("DateCreated"));
        let e = Event {
            date_created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        assert_eq!(acc.project(&e), e.date_created.to_sort_value());
    }

    #[test]
    fn fallback_without_candidates_fails() {
        let r = SortKeyResolver::with_cache(leaked_cache(), FallbackPolicy::id_then_date_created());
        assert!(matches!(
            r.resolve::<Bare>("Bogus"),
            Err(Error::FieldNotFound { .. })
        ));
    }

    #[test]
    fn fallback_entry_is_cached_under_requested_name() {
        let cache = leaked_cache();
        let r = SortKeyResolver::with_cache(cache, FallbackPolicy::id_then_date_created());
        r.resolve::<Article>("Bogus").unwrap();
        assert!(cache.contains::<Article>("bogus->id|datecreated"));
        assert!(!cache.contains::<Article>("bogus"));
        assert!(!cache.contains::<Article>("id"));
        assert_eq!(cache.len(), 1);

        let again = r.resolve::<Article>("BOGUS").unwrap();
        assert_eq!(again.field(), Some("Id"));
        assert_eq!(cache.len(), 1);

        let strict = SortKeyResolver::with_cache(cache, FallbackPolicy::Strict);
        assert!(strict.resolve::<Article>("Bogus").is_err());
    }

    struct Doc {
        id: i64,
        date_created: i64,
    }
    sortable!(Doc { "Id" => id, "DateCreated" => date_created });

    #[test]
    fn fallback_chains_do_not_share_entries() {
        let cache = leaked_cache();
        let doc = Doc {
            id: 1,
            date_created: 99,
        };

        let by_id = SortKeyResolver::with_cache(cache, FallbackPolicy::id_then_date_created());
        let acc = by_id.resolve::<Doc>("Bogus").unwrap();
        assert_eq!(acc.field(), Some("Id"));
        assert_eq!(acc.project(&doc), SortValue::I64(1));

        let by_date = SortKeyResolver::with_cache(
            cache,
            FallbackPolicy::Fallback(vec!["DateCreated".into()]),
        );
        let acc = by_date.resolve::<Doc>("Bogus").unwrap();
        assert_eq!(acc.field(), Some("DateCreated"));
        assert_eq!(acc.project(&doc), SortValue::I64(99));

        // The first chain still gets its own entry.
        assert_eq!(by_id.resolve::<Doc>("Bogus").unwrap().field(), Some("Id"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn direct_match_is_shared_across_policies() {
        let cache = leaked_cache();
        let fallback = SortKeyResolver::with_cache(cache, FallbackPolicy::id_then_date_created());
        let acc = fallback.resolve::<Doc>("dateCreated").unwrap();
        assert!(!acc.is_fallback());

        let strict = SortKeyResolver::with_cache(cache, FallbackPolicy::Strict);
        assert_eq!(strict.resolve::<Doc>("DATECREATED").unwrap().field(), Some("DateCreated"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_name_is_not_found() {
        let r = SortKeyResolver::with_cache(leaked_cache(), FallbackPolicy::id_then_date_created());
        assert!(matches!(
            r.resolve::<Article>("  "),
            Err(Error::FieldNotFound { .. })
        ));
    }

    #[test]
    fn global_helper_uses_strict_policy() {
        assert!(resolve_field::<Bare>("label").is_ok());
        assert!(resolve_field::<Bare>("id").is_err());
    }
}
