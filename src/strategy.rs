// Storage strategy selection for standard library types.
use std::collections::{ BTreeMap, BTreeSet, HashMap, HashSet, VecDeque };
use std::rc::Rc;
use std::sync::Arc;
use crate::storage::{ BoxedStorage, EmbeddedStorage };
use crate::traits::Storable;

/// Implements [`Storable`] for one or more concrete types.
///
/// `embedded:` types are held inline in the cell; `boxed:` types get their own
/// allocation.
///
/// ```
/// use deferred_cell::{ storable, LazyCell };
///
/// struct Config { name: String }
/// struct Sample { samples: [f64; 4096] }
///
/// storable!(embedded: Config);
/// storable!(boxed: Sample);
///
/// let config: LazyCell<Config, _> = LazyCell::new(|| Config { name: "default".into() });
/// assert_eq!(config.name, "default");
/// ```
#[macro_export]
macro_rules! storable {
    (embedded: $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Storable for $ty {
                type Storage = $crate::EmbeddedStorage<$ty>;
            }
        )+
    };
    (boxed: $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Storable for $ty {
                type Storage = $crate::BoxedStorage<$ty>;
            }
        )+
    };
}

storable!(embedded:
    (), bool, char,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64,
    String, &'static str,
);

impl<T> Storable for Option<T> {
    type Storage = EmbeddedStorage<Self>;
}
impl<T, E> Storable for Result<T, E> {
    type Storage = EmbeddedStorage<Self>;
}
impl<T> Storable for Vec<T> {
    type Storage = EmbeddedStorage<Self>;
}
impl<T> Storable for VecDeque<T> {
    type Storage = EmbeddedStorage<Self>;
}
impl<K, V, S> Storable for HashMap<K, V, S> {
    type Storage = EmbeddedStorage<Self>;
}
impl<T, S> Storable for HashSet<T, S> {
    type Storage = EmbeddedStorage<Self>;
}
impl<K, V> Storable for BTreeMap<K, V> {
    type Storage = EmbeddedStorage<Self>;
}
impl<T> Storable for BTreeSet<T> {
    type Storage = EmbeddedStorage<Self>;
}
impl<T: ?Sized> Storable for Box<T> {
    type Storage = EmbeddedStorage<Self>;
}
impl<T: ?Sized> Storable for Rc<T> {
    type Storage = EmbeddedStorage<Self>;
}
impl<T: ?Sized> Storable for Arc<T> {
    type Storage = EmbeddedStorage<Self>;
}

// Arrays have no cheap default for arbitrary N and may be large.
impl<T, const N: usize> Storable for [T; N] {
    type Storage = BoxedStorage<Self>;
}

macro_rules! storable_tuple {
    ($($name:ident),+) => {
        impl<$($name),+> Storable for ($($name,)+) {
            type Storage = EmbeddedStorage<Self>;
        }
    };
}
storable_tuple!(A);
storable_tuple!(A, B);
storable_tuple!(A, B, C);
storable_tuple!(A, B, C, D);
