//! Reference-counted, copy-on-write storage for dense tensor data
//! (spec.md §4.1).
//!
//! The source language models this with a hand-rolled refcounted
//! pointer. In Rust the equivalent is `Rc<Vec<T>>` plus `Rc::make_mut`,
//! which performs exactly the "clone on write if not unique" dance the
//! spec asks for — this crate is a thin, documented wrapper around
//! that so the rest of the workspace gets the vocabulary
//! (`Vector::new`, `ref_count`, `as_mut`) the spec names rather than
//! bare `Rc` plumbing spread across call sites.
//!
//! Per spec.md §5 the core is single-threaded, so a non-atomic `Rc` is
//! the right choice; switching to `Arc` would be the only change
//! needed to widen this to a multi-threaded core.

mod vector;

pub use vector::Vector;
