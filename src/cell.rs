use std::cell::{ Cell, UnsafeCell };
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{ Deref, DerefMut };
use crate::error::{ ForceError, LazyError };
use crate::storage::{ BoxedStorage, EmbeddedStorage };
use crate::traits::{ Storable, StorageCell };
use crate::utils::{ self, Rearm };

/// Phase: the logical state of a LazyCell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A producer is waiting to run; no value exists yet.
    Pending,
    /// The producer is currently running. Only observable from inside that producer.
    Evaluating,
    /// The value has been computed or assigned; the producer is gone.
    Ready,
    /// The content was moved out. The cell must not be read again.
    Emptied,
}

/// LazyCell: a value computed on first read.
///
/// The cell holds either a producer that has not run yet, or the value that
/// producer returned. The first read runs the producer exactly once and caches the
/// result; later reads return the cached value.
///
/// Where the value lives is decided by the storage parameter `S`. By default it is
/// `T`'s [`Storable`] choice: inline for cheap types, behind a box for the rest.
/// Any other type can name its storage directly through [`LazyCell::boxed`],
/// [`LazyCell::embedded`] or [`LazyCell::with_storage`].
///
/// Operations on the cell itself are associated functions (`LazyCell::get(&cell)`),
/// so they never hide methods of the stored value reached through `Deref`.
///
/// LazyCell is single-owner. It is `Send` when its contents are, but never `Sync`.
///
/// ```
/// use deferred_cell::LazyCell;
///
/// let answer: LazyCell<i32, _> = LazyCell::new(|| 6 * 7);
/// assert!(LazyCell::is_pending(&answer));
/// assert_eq!(*answer, 42);
/// assert!(LazyCell::is_ready(&answer));
/// ```
pub struct LazyCell<T, F = fn() -> T, S = <T as Storable>::Storage> {
    storage: UnsafeCell<S>,
    producer: Cell<Option<F>>,
    phase: Cell<Phase>,
    value: PhantomData<T>,
}

impl<T, F, S: StorageCell<T>> LazyCell<T, F, S> {
    /// Create a new LazyCell with an explicitly chosen storage strategy.
    pub const fn with_storage(producer: F) -> Self {
        Self {
            storage: UnsafeCell::new(S::EMPTY),
            producer: Cell::new(Some(producer)),
            phase: Cell::new(Phase::Pending),
            value: PhantomData,
        }
    }

    const fn emptied() -> Self {
        Self {
            storage: UnsafeCell::new(S::EMPTY),
            producer: Cell::new(None),
            phase: Cell::new(Phase::Emptied),
            value: PhantomData,
        }
    }

    /// Current logical state of the cell.
    pub fn phase(this: &Self) -> Phase {
        this.phase.get()
    }

    /// Checks if the producer has yet to run.
    pub fn is_pending(this: &Self) -> bool {
        Self::phase(this) == Phase::Pending
    }

    /// Checks if the value is available without running anything.
    pub fn is_ready(this: &Self) -> bool {
        Self::phase(this) == Phase::Ready
    }

    /// Checks if the content was moved out.
    pub fn is_emptied(this: &Self) -> bool {
        Self::phase(this) == Phase::Emptied
    }

    /// Get the value if it has already been computed or assigned.
    /// Never runs the producer.
    pub fn peek(this: &Self) -> Option<&T> {
        if Self::is_ready(this) {
            // SAFETY: the cell is ready.
            Some(unsafe { this.read_ready() })
        } else {
            None
        }
    }

    /// Mutable counterpart of `peek`.
    pub fn peek_mut(this: &mut Self) -> Option<&mut T> {
        if Self::is_ready(this) {
            this.storage.get_mut().get_mut()
        } else {
            None
        }
    }

    /// Assign a value directly.
    /// A pending producer is dropped without being run.
    pub fn set(this: &mut Self, value: T) {
        this.storage.get_mut().store(value);
        *this.producer.get_mut() = None;
        this.phase.set(Phase::Ready);
    }

    /// Move the content out into a new cell, leaving this one emptied.
    pub fn take(this: &mut Self) -> Self {
        std::mem::replace(this, Self::emptied())
    }

    /// Adopt the exact state of `source` (producer or value) without running
    /// anything. `source` is left emptied.
    pub fn transfer_from(this: &mut Self, source: &mut Self) {
        *this = Self::take(source);
    }

    /// Exchange the full logical state of two cells. No producer is run.
    pub fn swap(this: &mut Self, other: &mut Self) {
        this.storage.get_mut().swap(other.storage.get_mut());
        this.producer.swap(&other.producer);
        this.phase.swap(&other.phase);
    }

    /// Copy-assign the logical state of `other` into this cell.
    ///
    /// A ready value is copied, reusing this cell's inline value where the storage
    /// allows it. A pending producer is copied and this cell's old value is dropped;
    /// neither cell's producer is run.
    ///
    /// # Panics
    /// If `other` is in the middle of running its producer.
    pub fn assign(this: &mut Self, other: &Self)
    where
        T: Clone,
        F: Clone,
    {
        match Self::phase(other) {
            Phase::Ready => {
                // SAFETY: other is ready.
                let value = unsafe { other.read_ready() };
                this.storage.get_mut().assign_from(value);
                *this.producer.get_mut() = None;
                this.phase.set(Phase::Ready);
            }
            Phase::Pending => {
                let producer = match other.clone_producer() {
                    Some(producer) => producer,
                    None => panic!("{}", LazyError::Reentrant),
                };
                this.storage.get_mut().reset();
                *this.producer.get_mut() = Some(producer);
                this.phase.set(Phase::Pending);
            }
            Phase::Emptied => {
                this.storage.get_mut().reset();
                *this.producer.get_mut() = None;
                this.phase.set(Phase::Emptied);
            }
            Phase::Evaluating => panic!("{}", LazyError::Reentrant),
        }
    }

    /// Copy the producer without leaving the cell's producer slot empty if the
    /// clone unwinds.
    fn clone_producer(&self) -> Option<F>
    where
        F: Clone,
    {
        let guard = Rearm::check_out(&self.producer, &self.phase)?;
        let copy = guard.producer().clone();
        guard.put_back();
        Some(copy)
    }

    /// # Safety
    /// The cell must be ready. Storage is only mutated through `&mut self` once ready,
    /// so the returned reference cannot be invalidated while `self` is borrowed.
    unsafe fn read_ready(&self) -> &T {
        debug_assert_eq!(self.phase.get(), Phase::Ready);
        (*self.storage.get()).read()
    }

    /// Runs the producer through `run` and stores its result.
    /// On error or unwind the producer is put back and the cell stays pending.
    fn evaluate<E>(
        &self,
        run: impl FnOnce(&mut F) -> Result<T, E>,
    ) -> Result<&T, ForceError<E>> {
        match self.phase.get() {
            // SAFETY: the cell is ready.
            Phase::Ready => return Ok(unsafe { self.read_ready() }),
            Phase::Evaluating => return Err(LazyError::Reentrant.into()),
            Phase::Emptied => return Err(LazyError::Emptied.into()),
            Phase::Pending => {}
        }

        let mut guard = match Rearm::check_out(&self.producer, &self.phase) {
            Some(guard) => guard,
            None => return Err(LazyError::Reentrant.into()),
        };
        utils::trace!(ty = std::any::type_name::<T>(), "evaluating lazy cell");

        let value = match run(guard.producer_mut()) {
            Ok(value) => value,
            Err(err) => {
                utils::debug!(ty = std::any::type_name::<T>(), "lazy cell producer failed");
                return Err(ForceError::Producer(err));
            }
        };

        // SAFETY: the cell is evaluating, so no reference into storage exists, and a
        // re-entrant read is rejected above before it could create one.
        unsafe { (*self.storage.get()).store(value) };
        self.phase.set(Phase::Ready);
        drop(guard.disarm());
        utils::trace!(ty = std::any::type_name::<T>(), "lazy cell ready");

        // SAFETY: the cell is ready.
        Ok(unsafe { self.read_ready() })
    }
}

impl<T: Storable, F: FnMut() -> T> LazyCell<T, F> {
    /// Create a new LazyCell that will run `producer` on first read.
    /// The value is stored the way `T`'s [`Storable`] implementation selects.
    pub const fn new(producer: F) -> Self {
        Self::with_storage(producer)
    }
}

impl<T, F: FnMut() -> T> LazyCell<T, F, BoxedStorage<T>> {
    /// Create a new LazyCell whose value will live in its own allocation.
    /// Works for any `T`.
    pub const fn boxed(producer: F) -> Self {
        Self::with_storage(producer)
    }
}

impl<T, F: FnMut() -> T> LazyCell<T, F, EmbeddedStorage<T>> {
    /// Create a new LazyCell whose value will live inline. Works for any `T`.
    pub const fn embedded(producer: F) -> Self {
        Self::with_storage(producer)
    }
}

impl<T, F: FnMut() -> T, S: StorageCell<T>> LazyCell<T, F, S> {
    /// Get the value, running the producer if this is the first read.
    ///
    /// # Panics
    /// If the cell has been emptied by a move, or if it is read from inside its own
    /// producer. Use `try_get` to handle these as errors.
    pub fn get(this: &Self) -> &T {
        match Self::try_get(this) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Get the value, running the producer if this is the first read.
    pub fn try_get(this: &Self) -> Result<&T, LazyError> {
        this.evaluate(|produce| Ok::<T, Infallible>(produce()))
            .map_err(|err| match err {
                ForceError::Lazy(err) => err,
                ForceError::Producer(never) => match never {},
            })
    }

    /// Get a mutable reference to the value, running the producer first if needed.
    ///
    /// # Panics
    /// Under the same conditions as `get`.
    pub fn get_mut(this: &mut Self) -> &mut T {
        Self::get(this);
        // SAFETY: get returned, so the cell is ready.
        unsafe { this.storage.get_mut().read_mut() }
    }

    /// Run the producer if needed and move the value out of the cell.
    pub fn into_value(mut this: Self) -> Result<T, LazyError> {
        Self::try_get(&this)?;
        match this.storage.get_mut().take() {
            Some(value) => Ok(value),
            None => unreachable!("ready cell without a value"),
        }
    }
}

impl<T: Storable, E, F: FnMut() -> Result<T, E>> LazyCell<T, F> {
    /// Create a new LazyCell whose producer may fail.
    /// Read it with `try_force`.
    pub const fn fallible(producer: F) -> Self {
        Self::with_storage(producer)
    }
}

impl<T, E, F: FnMut() -> Result<T, E>, S: StorageCell<T>> LazyCell<T, F, S> {
    /// Get the value, running a fallible producer if this is the first read.
    ///
    /// If the producer returns an error, the cell stays pending and the next call
    /// runs the producer again.
    pub fn try_force(this: &Self) -> Result<&T, ForceError<E>> {
        this.evaluate(|produce| produce())
    }
}

impl<T, F: FnMut() -> T, S: StorageCell<T>> Deref for LazyCell<T, F, S> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        Self::get(self)
    }
}
impl<T, F: FnMut() -> T, S: StorageCell<T>> DerefMut for LazyCell<T, F, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        Self::get_mut(self)
    }
}

impl<T: Clone, F: Clone, S: StorageCell<T>> Clone for LazyCell<T, F, S> {
    fn clone(&self) -> Self {
        let mut cell = Self::emptied();
        Self::assign(&mut cell, self);
        cell
    }

    fn clone_from(&mut self, source: &Self) {
        Self::assign(self, source);
    }
}

impl<T: Storable + Default> Default for LazyCell<T> {
    fn default() -> Self {
        Self::with_storage(T::default)
    }
}

impl<T: fmt::Debug, F, S: StorageCell<T>> fmt::Debug for LazyCell<T, F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("LazyCell");
        match Self::peek(self) {
            Some(value) => out.field("value", value),
            None => out.field("phase", &Self::phase(self)),
        };
        out.finish()
    }
}
