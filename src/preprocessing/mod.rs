//! Feature preprocessing
//!
//! Only standard scaling is needed: every feature is centred on its
//! training mean and divided by its training standard deviation before it
//! reaches the classifier.

mod scaler;

pub use scaler::StandardScaler;
