//! JSON mutation engine for Hermes.
//!
//! Five operations, each taking a JSON document as text and returning a
//! new document as text:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`modify_value`] | Replace property values at a path, optionally guarded by their current value |
//! | [`inject_metadata`] | Merge keys into every object at a path |
//! | [`mask_fields`] | Mask scalar property values at each of several paths |
//! | [`remove_field`] | Delete properties at a path |
//! | [`rename_field`] | Rename a property everywhere in the document |
//!
//! The plain functions are best-effort: any failure is logged and the
//! input text is returned unchanged. Each has a `try_*` counterpart that
//! returns a [`MutationError`] instead, for callers that want to attribute
//! failures themselves.
//!
//! Documents are re-serialized in compact form. Object key order is not
//! preserved across a mutation. When an operation changes nothing, the
//! original text is returned as-is.
//!
//! # Example
//!
//! ```rust
//! use hermes_json::{mask_fields, modify_value};
//!
//! let out = modify_value(r#"{"a":{"b":"old"}}"#, "$.a.b", Some("old"), "new");
//! assert_eq!(out, r#"{"a":{"b":"new"}}"#);
//!
//! let out = mask_fields(r#"{"pin":"12"}"#, &["$.pin"]);
//! assert_eq!(out, r#"{"pin":"**"}"#);
//! ```

mod engine;
mod error;
mod mask;
mod path;

pub use engine::{
    inject_metadata, mask_fields, modify_value, remove_field, rename_field, try_inject_metadata,
    try_inject_metadata_at, try_mask_fields, try_modify_value, try_remove_field, try_rename_field,
    TIMESTAMP_PLACEHOLDER,
};
pub use error::{MutationError, MutationResult};
pub use mask::mask_value;
pub use path::{JsonPath, Step};
