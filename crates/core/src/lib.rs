//! sopsbridge-core: conversion engine between typed configuration values
//! and the JSON documents sops encrypts and decrypts.
//!
//! Configuration tooling hands over [`DynamicValue`] trees: typed, possibly
//! holding values that are not known yet, with exact decimal numbers. sops
//! only reads and writes JSON. This crate bridges the two:
//!
//! - [`dynamic_to_native`] / [`native_to_dynamic`] -- the two recursive
//!   transforms, with [`unify_sequence`] deciding list vs tuple for arrays
//! - [`Number`] -- exact decimals with validated rounding to `f64`
//! - [`contains_unknown`] -- detects deferred values before converting
//! - [`hash_value`] -- SHA-256 over the canonical JSON, for change detection
//!
//! Every function is pure and synchronous; nothing here does I/O or keeps
//! state between calls.

pub mod convert;
pub mod error;
pub mod hash;
pub mod input;
pub mod interchange;
pub mod native;
pub mod number;
pub mod path;
pub mod types;
pub mod unify;
pub mod unknown;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use error::ConversionError;
pub use native::NativeValue;
pub use number::{Number, ParseNumberError, RangeError};
pub use path::{PathStep, ValuePath};
pub use types::ValueType;
pub use value::DynamicValue;

// ── Convenience re-exports: operations ───────────────────────────────

pub use convert::{dynamic_to_native, native_to_dynamic};
pub use hash::hash_value;
pub use input::{dynamic_to_bytes, marshal_dynamic, unmarshal_dynamic, validate_object_input};
pub use interchange::{parse_interchange, parse_type, type_to_interchange, value_to_interchange};
pub use unify::{unify_sequence, unify_types, SequenceShape};
pub use unknown::contains_unknown;
