//! Shared test fixtures for LinkForge crates.
//!
//! This crate provides entity/alignment builders and canned candidate sets.
//! It depends only on `linkforge-core` so every crate can use it.
//!
//! - [`entity`] - Entity and alignment builders
//! - [`candidates`] - Canonical candidate sets used across matcher tests
//! - [`taxonomic`] - SKOS-typed fixtures
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! linkforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use linkforge_test::candidates::five_alignments;
//! use linkforge_test::entity::{link, res};
//! ```

pub mod candidates;
pub mod entity;
pub mod taxonomic;

pub use candidates::{five_alignments, link_names};
pub use entity::{link, res, typed_link};
