//! Drift reconciler
//!
//! Folds returned config maps into models and reports where the observed
//! state diverges from the plan.

mod detect;
mod reconcile;

pub use detect::{detect_drift, DriftEntry};
pub use reconcile::reconcile;
