pub mod analyze;
pub mod liveness;
pub mod readiness;
