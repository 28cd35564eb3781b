//! Scalar bound shared by all numeric stages.

use core::fmt::{Debug, Display};
use ndarray::LinalgScalar;
use num_traits::Float;

/// Floating-point element type usable throughout the pipeline.
///
/// Implemented for `f32` and `f64`. Dense products go through ndarray's
/// `dot`, so the type must also be a [`LinalgScalar`].
pub trait PhateFloat: Float + LinalgScalar + Debug + Display + Send + Sync + 'static {}

impl<T> PhateFloat for T where T: Float + LinalgScalar + Debug + Display + Send + Sync + 'static {}
