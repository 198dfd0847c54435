//! GraphQL schema definitions for linear-context.
//!
//! The generated schema module lives in its own crate so that changes to the
//! command layer do not force the (large) schema module to be recompiled.

// Disable all clippy lints for this crate - it's entirely generated code
#![allow(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]

/// Linear.app GraphQL schema types.
///
/// Generated from `schemas/linear.graphql`, which carries the subset of the
/// Linear schema this workspace queries.
#[cynic::schema("linear")]
pub mod linear {}
