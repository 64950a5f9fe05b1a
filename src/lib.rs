//! Civic Scribe - conversational civic feedback intake.
//!
//! This crate turns a free-form, multi-turn resident conversation into a
//! structured feedback record (title, category, description, place),
//! geocodes the place once the record is complete and persists it.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
