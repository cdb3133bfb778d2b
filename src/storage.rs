use std::mem::MaybeUninit;
use crate::traits::StorageCell;

/// EmbeddedStorage keeps its value inline, next to an initialized flag.
/// No allocation is ever made.
///
/// # INITIALIZATION
/// `value` is live if and only if `initialized` is true. Every path that
/// writes `value` sets the flag afterwards, and every path that destroys or
/// moves `value` out clears the flag first, so the value can neither be read
/// while uninitialized nor be dropped twice.
pub struct EmbeddedStorage<T> {
    initialized: bool,
    value: MaybeUninit<T>,
}

impl<T> EmbeddedStorage<T> {
    /// Create a new, empty EmbeddedStorage.
    pub const fn new() -> Self {
        Self {
            initialized: false,
            value: MaybeUninit::uninit(),
        }
    }
}

impl<T> Default for EmbeddedStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StorageCell<T> for EmbeddedStorage<T> {
    const EMPTY: Self = Self::new();

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn reset(&mut self) {
        if self.initialized {
            self.initialized = false;
            // SAFETY: the flag was set, so value is live; it is cleared first so a
            // panicking destructor cannot lead to a second drop.
            unsafe { self.value.assume_init_drop() };
        }
    }

    fn get(&self) -> Option<&T> {
        if self.initialized {
            // SAFETY: value is live while the flag is set.
            Some(unsafe { self.value.assume_init_ref() })
        } else {
            None
        }
    }

    fn get_mut(&mut self) -> Option<&mut T> {
        if self.initialized {
            // SAFETY: value is live while the flag is set.
            Some(unsafe { self.value.assume_init_mut() })
        } else {
            None
        }
    }

    unsafe fn read(&self) -> &T {
        debug_assert!(self.initialized, "read of empty EmbeddedStorage");
        self.value.assume_init_ref()
    }

    unsafe fn read_mut(&mut self) -> &mut T {
        debug_assert!(self.initialized, "read of empty EmbeddedStorage");
        self.value.assume_init_mut()
    }

    fn store(&mut self, value: T) {
        if self.initialized {
            // SAFETY: value is live; plain assignment drops the old one in place.
            unsafe { *self.value.assume_init_mut() = value };
        } else {
            self.value.write(value);
            self.initialized = true;
        }
    }

    fn assign_from(&mut self, value: &T)
    where
        T: Clone,
    {
        match self.get_mut() {
            Some(current) => current.clone_from(value),
            None => self.store(value.clone()),
        }
    }

    fn take(&mut self) -> Option<T> {
        if self.initialized {
            self.initialized = false;
            // SAFETY: value was live and the flag is now clear, so it is read out once.
            Some(unsafe { self.value.assume_init_read() })
        } else {
            None
        }
    }
}

impl<T: Clone> Clone for EmbeddedStorage<T> {
    fn clone(&self) -> Self {
        let mut storage = Self::new();
        if let Some(value) = self.get() {
            storage.store(value.clone());
        }
        storage
    }

    fn clone_from(&mut self, source: &Self) {
        match source.get() {
            Some(value) => self.assign_from(value),
            None => self.reset(),
        }
    }
}

impl<T> Drop for EmbeddedStorage<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for EmbeddedStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedStorage")
            .field("value", &self.get())
            .finish()
    }
}

/// BoxedStorage keeps its value in a separately allocated box.
/// Storing always allocates a fresh box and releases the old one, so the value
/// is never assigned over in place.
pub struct BoxedStorage<T> {
    slot: Option<Box<T>>,
}

impl<T> BoxedStorage<T> {
    /// Create a new, empty BoxedStorage.
    pub const fn new() -> Self {
        Self { slot: None }
    }
}

impl<T> Default for BoxedStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StorageCell<T> for BoxedStorage<T> {
    const EMPTY: Self = Self::new();

    fn is_initialized(&self) -> bool {
        self.slot.is_some()
    }

    fn reset(&mut self) {
        self.slot = None;
    }

    fn get(&self) -> Option<&T> {
        self.slot.as_deref()
    }

    fn get_mut(&mut self) -> Option<&mut T> {
        self.slot.as_deref_mut()
    }

    unsafe fn read(&self) -> &T {
        debug_assert!(self.slot.is_some(), "read of empty BoxedStorage");
        self.slot.as_deref().unwrap_unchecked()
    }

    unsafe fn read_mut(&mut self) -> &mut T {
        debug_assert!(self.slot.is_some(), "read of empty BoxedStorage");
        self.slot.as_deref_mut().unwrap_unchecked()
    }

    fn store(&mut self, value: T) {
        self.slot = Some(Box::new(value));
    }

    fn assign_from(&mut self, value: &T)
    where
        T: Clone,
    {
        // Clone before touching the slot; a panicking clone leaves the old value.
        let value = Box::new(value.clone());
        self.slot = Some(value);
    }

    fn take(&mut self) -> Option<T> {
        self.slot.take().map(|boxed| *boxed)
    }
}

impl<T: Clone> Clone for BoxedStorage<T> {
    fn clone(&self) -> Self {
        Self { slot: self.slot.clone() }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for BoxedStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedStorage")
            .field("value", &self.get())
            .finish()
    }
}
