//! Comparable projections used as sort keys.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// A value extracted from an entity for ordering purposes.
///
/// `SortValue` has a total order: `Null` sorts before everything else, values
/// of different kinds are ranked by kind, and floats use IEEE total ordering.
#[derive(Clone, Debug)]
pub enum SortValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
    Uuid(Uuid),
    DateTimeUtc(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Decimal(BigDecimal),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Null => 0,
            SortValue::Bool(_) => 1,
            SortValue::I64(_) | SortValue::U64(_) => 2,
            SortValue::F64(_) => 3,
            SortValue::Decimal(_) => 4,
            SortValue::String(_) => 5,
            SortValue::Uuid(_) => 6,
            SortValue::DateTimeUtc(_) => 7,
            SortValue::Date(_) => 8,
            SortValue::Time(_) => 9,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SortValue::Null)
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use SortValue as V;
        match (self, other) {
            (V::Null, V::Null) => Ordering::Equal,
            (V::Bool(a), V::Bool(b)) => a.cmp(b),
            (V::I64(a), V::I64(b)) => a.cmp(b),
            (V::U64(a), V::U64(b)) => a.cmp(b),
            (V::I64(a), V::U64(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (V::U64(a), V::I64(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (V::F64(a), V::F64(b)) => a.total_cmp(b),
            (V::Decimal(a), V::Decimal(b)) => a.cmp(b),
            (V::String(a), V::String(b)) => a.cmp(b),
            (V::Uuid(a), V::Uuid(b)) => a.cmp(b),
            (V::DateTimeUtc(a), V::DateTimeUtc(b)) => a.cmp(b),
            (V::Date(a), V::Date(b)) => a.cmp(b),
            (V::Time(a), V::Time(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

/// Conversion of a field value into its sort projection.
pub trait ToSortValue {
    fn to_sort_value(&self) -> SortValue;
}

macro_rules! impl_to_sort_value {
    ($variant:ident <- $($ty:ty),+ $(,)?) => {
        $(
            impl ToSortValue for $ty {
                #[inline]
                fn to_sort_value(&self) -> SortValue {
                    SortValue::$variant((*self).into())
                }
            }
        )+
    };
}

impl_to_sort_value!(I64 <- i8, i16, i32, i64);
impl_to_sort_value!(U64 <- u8, u16, u32, u64);
impl_to_sort_value!(F64 <- f32, f64);
impl_to_sort_value!(Bool <- bool);
impl_to_sort_value!(Uuid <- Uuid);
impl_to_sort_value!(DateTimeUtc <- DateTime<Utc>);
impl_to_sort_value!(Date <- NaiveDate);
impl_to_sort_value!(Time <- NaiveTime);

impl ToSortValue for usize {
    fn to_sort_value(&self) -> SortValue {
        SortValue::U64(*self as u64)
    }
}

impl ToSortValue for isize {
    fn to_sort_value(&self) -> SortValue {
        SortValue::I64(*self as i64)
    }
}

impl ToSortValue for str {
    fn to_sort_value(&self) -> SortValue {
        SortValue::String(self.to_owned())
    }
}

impl ToSortValue for char {
    fn to_sort_value(&self) -> SortValue {
        SortValue::String(self.to_string())
    }
}

impl ToSortValue for String {
    fn to_sort_value(&self) -> SortValue {
        SortValue::String(self.clone())
    }
}

impl ToSortValue for BigDecimal {
    fn to_sort_value(&self) -> SortValue {
        SortValue::Decimal(self.clone())
    }
}

impl<T: ToSortValue> ToSortValue for Option<T> {
    fn to_sort_value(&self) -> SortValue {
        match self {
            Some(v) => v.to_sort_value(),
            None => SortValue::Null,
        }
    }
}

impl<T: ToSortValue + ?Sized> ToSortValue for &T {
    fn to_sort_value(&self) -> SortValue {
        (**self).to_sort_value()
    }
}

impl<T: ToSortValue + ?Sized> ToSortValue for Box<T> {
    fn to_sort_value(&self) -> SortValue {
        (**self).to_sort_value()
    }
}

impl ToSortValue for SortValue {
    fn to_sort_value(&self) -> SortValue {
        self.clone()
    }
}
