/// # StorageCell
///
/// Owns space for at most one value of type `T`, plus the knowledge of whether that
/// space currently holds a live value. A StorageCell has no notion of how the value
/// was produced; it only constructs, replaces, resets and exchanges it.
///
/// Implementations must never drop a value twice and never hand out a reference
/// into an empty cell through the checked accessors.
pub trait StorageCell<T>: Sized {
    /// An empty cell.
    const EMPTY: Self;

    /// Checks if the cell holds a value.
    fn is_initialized(&self) -> bool;

    /// Destroys the held value, if any. Calling this on an empty cell does nothing.
    fn reset(&mut self);

    /// Get a reference to the value, or None if the cell is empty.
    fn get(&self) -> Option<&T>;

    /// Get a mutable reference to the value, or None if the cell is empty.
    fn get_mut(&mut self) -> Option<&mut T>;

    /// Get a reference to the value without checking that it exists.
    ///
    /// # Safety
    /// The cell must be initialized.
    unsafe fn read(&self) -> &T;

    /// Get a mutable reference to the value without checking that it exists.
    ///
    /// # Safety
    /// The cell must be initialized.
    unsafe fn read_mut(&mut self) -> &mut T;

    /// Installs `value`, destroying whatever was held before.
    fn store(&mut self, value: T);

    /// Calls `producer` once and stores what it returns.
    fn store_from<P>(&mut self, producer: P)
    where
        P: FnOnce() -> T,
    {
        let value = producer();
        self.store(value);
    }

    /// Copy-assigns `value` into the cell.
    fn assign_from(&mut self, value: &T)
    where
        T: Clone;

    /// Moves the value out, leaving the cell empty.
    fn take(&mut self) -> Option<T>;

    /// Exchanges contents with `other`. Empty cells stay empty on the other side;
    /// no value is ever fabricated.
    fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

/// # Storable
///
/// Selects the storage strategy for a type at compile time.
///
/// Types that are cheap to hold inline and safe to overwrite in place use
/// [`EmbeddedStorage`](crate::EmbeddedStorage); types that are large, or that should
/// live behind their own allocation, use [`BoxedStorage`](crate::BoxedStorage).
/// Implement it for your own types with the [`storable!`](crate::storable) macro.
/// It only picks the default: any type can still be stored through
/// [`LazyCell::with_storage`](crate::LazyCell::with_storage).
pub trait Storable: Sized {
    type Storage: StorageCell<Self>;
}
