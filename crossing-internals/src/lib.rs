#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`crossing`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased object storage that backs
//! the heap-allocated payloads of the [`crossing`] value slot: strings,
//! structured errors, arrays and anything else that does not fit inline in a
//! slot.
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`crossing`] crate, not this one.
//!
//! # Architecture
//!
//! - **[`object`]**: Type-erased, reference-counted object storage
//!   - [`RawObject`]: Owned handle with [`Arc`]-based allocation
//!   - [`RawObjectRef`]: Borrowed reference to an object
//!   - [`ObjectData`]: `#[repr(C)]` wrapper enabling field access on erased types
//!   - [`ObjectVtable`]: Function pointers for type-erased dispatch
//!
//! - **[`handlers`]**: The [`ObjectHandler`] trait, which names an object type
//!   and defines how it is formatted
//!
//! # Safety Strategy
//!
//! When we erase a type like `ObjectData<String>` to `ObjectData<Erased>`, we
//! must ensure that the vtable function pointers still match the actual
//! concrete type stored in memory.
//!
//! This crate maintains safety through:
//!
//! - **Module-based encapsulation**: Safety-critical types keep fields
//!   module-private, making invariants locally verifiable within a single file
//! - **`#[repr(C)]` layout**: Enables safe field projection on type-erased
//!   pointers without constructing invalid references
//! - **Documented vtable contracts**: Each vtable method specifies exactly when
//!   it can be safely called
//!
//! [`crossing`]: https://docs.rs/crossing/latest/crossing/
//! [`ObjectData`]: object::data::ObjectData
//! [`ObjectVtable`]: object::vtable::ObjectVtable
//! [`ObjectHandler`]: handlers::ObjectHandler
//! [`Arc`]: triomphe::Arc

extern crate alloc;

pub mod handlers;
mod object;
mod util;

pub use object::{RawObject, RawObjectRef};
