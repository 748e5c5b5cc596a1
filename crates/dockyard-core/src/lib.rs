#![forbid(unsafe_code)]

//! Core: geometry, orientation, and weight arithmetic.
//!
//! # Role in dockyard
//! `dockyard-core` holds the leaf primitives every other layer builds on.
//! Nothing in here knows about tabs, borders, or actions; it is pure math
//! over rectangles and weight vectors.
//!
//! # Primary responsibilities
//! - **Rect / Point / Insets**: pixel-space rectangles and hit testing.
//! - **Orientation / Edge**: axis selection and edge-to-axis mapping.
//! - **Weights**: proportional sizing with min/max clamping.

pub mod geometry;
pub mod orientation;
pub mod weights;

pub use geometry::{Insets, Point, Rect};
pub use orientation::{Edge, Orientation};
