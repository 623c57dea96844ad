//! State-wise digital readiness index.
//!
//! Reconciles several differently-shaped state/UT datasets onto one record per
//! region, rescales each dimension onto 0-100, and ranks regions by a
//! fixed-weight composite index. Stages run in order:
//!
//! 1. [`loader`]: read each source CSV into a [`types::RawTable`]
//! 2. [`cleaning`]: positional/header column mapping, region canonicalization
//!    through [`regions`], numeric coercion, derived ratios
//! 3. [`merge`]: left join onto the anchor (Aadhaar) source
//! 4. [`scoring`]: derived dimensions and min-max sub-scores
//! 5. [`index`]: weighted composite and competition ranking
//!
//! [`views`], [`output`] and [`report`] turn the ranked table into exports.
pub mod cleaning;
pub mod config;
pub mod index;
pub mod loader;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod regions;
pub mod report;
pub mod scoring;
pub mod types;
pub mod util;
pub mod views;
