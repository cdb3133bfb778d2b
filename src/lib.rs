//! Single-owner lazily evaluated cells.
//!
//! A [`LazyCell`] holds either a producer that has not run yet, or the value that
//! producer returned. Reading the cell runs the producer once and caches the result.
//! Copying an unread cell copies its producer, never its result; moving a cell
//! moves whichever of the two it holds.
//!
//! The value's storage is picked per type through [`Storable`]: small, cheaply
//! overwritten types live inline in an [`EmbeddedStorage`], everything else in a
//! [`BoxedStorage`]. Types without a [`Storable`] impl, including foreign ones,
//! name their storage directly with [`LazyCell::boxed`] or [`LazyCell::embedded`].
//!
//! ```
//! use std::path::PathBuf;
//! use deferred_cell::LazyCell;
//!
//! let mut dir = LazyCell::boxed(|| PathBuf::from("/tmp"));
//! dir.push("cells");
//! assert_eq!(LazyCell::peek(&dir), Some(&PathBuf::from("/tmp/cells")));
//! ```
//!
//! # Features
//! - `tracing` (default): emit `tracing` events when producers run or fail.


mod cell;
mod error;
mod storage;
mod strategy;
mod traits;
mod utils;

pub use cell::{ LazyCell, Phase };
pub use error::{ ForceError, LazyError };
pub use storage::{ BoxedStorage, EmbeddedStorage };
pub use traits::{ Storable, StorageCell };
