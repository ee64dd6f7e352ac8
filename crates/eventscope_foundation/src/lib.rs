//! Core object model, weak references, and error types for eventscope.
//!
//! This crate provides:
//! - [`Inspectable`] - The capability every traced object exposes
//! - [`Element`] - A node in a UI-like object tree
//! - [`ObjectRef`] - A non-owning identity reference to an inspectable object
//! - [`EventArgs`] - A generic event argument payload
//! - [`Error`] - Rich error types with pattern-matchable kinds

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod element;
pub mod error;
pub mod inspect;
pub mod object_ref;

pub use element::{Element, ElementId};
pub use error::{Error, ErrorKind, RenderError, Result};
pub use inspect::{EventArgs, Inspectable, Payload};
pub use object_ref::{NULL_TYPE_NAME, ObjectRef};
