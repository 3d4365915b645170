//! Data preprocessing module
//!
//! Feature scaling applied before fitting and stored alongside the fitted
//! coefficients, so inference sees inputs on the same scale as training.

mod scaler;

pub use scaler::StandardScaler;
