use std::cell::Cell;
use std::panic::{ self, AssertUnwindSafe };
use std::rc::Rc;
use crate::{ BoxedStorage, EmbeddedStorage, StorageCell };
use super::Tracked;

/// A value whose clone panics once `poisoned` is set.
#[derive(Debug)]
struct Fragile {
    id: u32,
    poisoned: Rc<Cell<bool>>,
}
impl Clone for Fragile {
    fn clone(&self) -> Self {
        if self.poisoned.get() {
            panic!("Fragile {} refused to clone", self.id);
        }
        Self { id: self.id, poisoned: Rc::clone(&self.poisoned) }
    }
}

fn ids<S: StorageCell<Tracked>>(a: &S, b: &S) -> (Option<u32>, Option<u32>) {
    (a.get().map(|t| t.id), b.get().map(|t| t.id))
}

fn check_reset_is_idempotent<S: StorageCell<Tracked>>() {
    let drops = Rc::new(Cell::new(0));
    let mut storage = S::EMPTY;
    storage.reset();
    assert!(!storage.is_initialized());

    storage.store(Tracked::new(1, &drops));
    assert!(storage.is_initialized());
    storage.reset();
    storage.reset();
    assert!(!storage.is_initialized());
    assert_eq!(drops.get(), 1);
    drop(storage);
    assert_eq!(drops.get(), 1);
}

fn check_store_replaces_once<S: StorageCell<Tracked>>() {
    let drops = Rc::new(Cell::new(0));
    let mut storage = S::EMPTY;
    storage.store(Tracked::new(1, &drops));
    storage.store(Tracked::new(2, &drops));
    assert_eq!(drops.get(), 1);
    assert_eq!(storage.get().map(|t| t.id), Some(2));
    drop(storage);
    assert_eq!(drops.get(), 2);
}

fn check_store_from_runs_once<S: StorageCell<Tracked>>() {
    let drops = Rc::new(Cell::new(0));
    let calls = Cell::new(0);
    let mut storage = S::EMPTY;
    storage.store_from(|| {
        calls.set(calls.get() + 1);
        Tracked::new(5, &drops)
    });
    assert_eq!(calls.get(), 1);
    // SAFETY: the storage was just filled.
    assert_eq!(unsafe { storage.read() }.id, 5);
    unsafe { storage.read_mut() }.id = 6;
    assert_eq!(storage.get_mut().map(|t| t.id), Some(6));
}

fn check_take_leaves_empty<S: StorageCell<Tracked>>() {
    let drops = Rc::new(Cell::new(0));
    let mut storage = S::EMPTY;
    assert!(storage.take().is_none());
    storage.store(Tracked::new(3, &drops));
    let taken = storage.take();
    assert!(!storage.is_initialized());
    assert_eq!(drops.get(), 0);
    assert_eq!(taken.map(|t| t.id), Some(3));
    assert_eq!(drops.get(), 1);
    drop(storage);
    assert_eq!(drops.get(), 1);
}

fn check_swap_combinations<S: StorageCell<Tracked>>() {
    let drops = Rc::new(Cell::new(0));

    let mut a = S::EMPTY;
    let mut b = S::EMPTY;
    a.swap(&mut b);
    assert_eq!(ids(&a, &b), (None, None));

    a.store(Tracked::new(1, &drops));
    a.swap(&mut b);
    assert_eq!(ids(&a, &b), (None, Some(1)));

    a.swap(&mut b);
    assert_eq!(ids(&a, &b), (Some(1), None));

    b.store(Tracked::new(2, &drops));
    a.swap(&mut b);
    assert_eq!(ids(&a, &b), (Some(2), Some(1)));

    assert_eq!(drops.get(), 0);
    drop(a);
    drop(b);
    assert_eq!(drops.get(), 2);
}

fn check_assign_from<S: StorageCell<Tracked>>() {
    let drops = Rc::new(Cell::new(0));
    let source = Tracked::new(9, &drops);
    let mut storage = S::EMPTY;
    storage.assign_from(&source);
    storage.assign_from(&source);
    assert_eq!(storage.get().map(|t| t.id), Some(9));
    assert_eq!(drops.get(), 1);
}

fn check_failed_clone_keeps_a_value<S: StorageCell<Fragile>>() {
    let poisoned = Rc::new(Cell::new(false));
    let mut storage = S::EMPTY;
    storage.store(Fragile { id: 1, poisoned: Rc::clone(&poisoned) });
    let source = Fragile { id: 2, poisoned: Rc::clone(&poisoned) };

    poisoned.set(true);
    let result = panic::catch_unwind(AssertUnwindSafe(|| storage.assign_from(&source)));
    assert!(result.is_err());
    assert!(storage.is_initialized());
    assert_eq!(storage.get().map(|v| v.id), Some(1));

    let mut empty = S::EMPTY;
    let result = panic::catch_unwind(AssertUnwindSafe(|| empty.assign_from(&source)));
    assert!(result.is_err());
    assert!(!empty.is_initialized());

    poisoned.set(false);
    storage.assign_from(&source);
    assert_eq!(storage.get().map(|v| v.id), Some(2));
}

#[test]
fn embedded_reset_is_idempotent() {
    check_reset_is_idempotent::<EmbeddedStorage<Tracked>>();
}

#[test]
fn boxed_reset_is_idempotent() {
    check_reset_is_idempotent::<BoxedStorage<Tracked>>();
}

#[test]
fn embedded_store_replaces_once() {
    check_store_replaces_once::<EmbeddedStorage<Tracked>>();
}

#[test]
fn boxed_store_replaces_once() {
    check_store_replaces_once::<BoxedStorage<Tracked>>();
}

#[test]
fn store_from_runs_once() {
    check_store_from_runs_once::<EmbeddedStorage<Tracked>>();
    check_store_from_runs_once::<BoxedStorage<Tracked>>();
}

#[test]
fn take_leaves_empty() {
    check_take_leaves_empty::<EmbeddedStorage<Tracked>>();
    check_take_leaves_empty::<BoxedStorage<Tracked>>();
}

#[test]
fn swap_combinations() {
    check_swap_combinations::<EmbeddedStorage<Tracked>>();
    check_swap_combinations::<BoxedStorage<Tracked>>();
}

#[test]
fn assign_from() {
    check_assign_from::<EmbeddedStorage<Tracked>>();
    check_assign_from::<BoxedStorage<Tracked>>();
}

#[test]
fn boxed_failed_clone_keeps_old_value() {
    check_failed_clone_keeps_a_value::<BoxedStorage<Fragile>>();
}

#[test]
fn embedded_failed_clone_leaves_valid_value() {
    check_failed_clone_keeps_a_value::<EmbeddedStorage<Fragile>>();
}

#[test]
fn clone_copies_only_live_values() {
    let empty: EmbeddedStorage<String> = EmbeddedStorage::new();
    assert!(!empty.clone().is_initialized());

    let mut storage = EmbeddedStorage::new();
    storage.store(String::from("inline"));
    let mut copy = storage.clone();
    if let Some(value) = copy.get_mut() {
        value.push('!');
    }
    assert_eq!(storage.get().map(String::as_str), Some("inline"));
    assert_eq!(copy.get().map(String::as_str), Some("inline!"));

    copy.clone_from(&empty);
    assert!(!copy.is_initialized());

    let mut boxed = BoxedStorage::new();
    boxed.store(vec![1, 2]);
    let boxed_copy = boxed.clone();
    boxed.reset();
    assert_eq!(boxed_copy.get(), Some(&vec![1, 2]));
}

#[test]
fn embedded_assign_keeps_allocation() {
    let mut storage = EmbeddedStorage::new();
    storage.store(Vec::<u8>::with_capacity(128));
    storage.assign_from(&vec![1, 2, 3]);
    assert_eq!(storage.get().map(Vec::len), Some(3));
    assert!(storage.get().map_or(0, Vec::capacity) >= 128);
}

#[test]
fn debug_output() {
    let mut storage: BoxedStorage<u8> = BoxedStorage::new();
    assert_eq!(format!("{storage:?}"), "BoxedStorage { value: None }");
    storage.store(1_u8);
    assert_eq!(format!("{storage:?}"), "BoxedStorage { value: Some(1) }");

    let embedded: EmbeddedStorage<u8> = EmbeddedStorage::default();
    assert_eq!(format!("{embedded:?}"), "EmbeddedStorage { value: None }");
}
