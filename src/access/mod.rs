pub mod gate;
pub mod roles;

pub use gate::{admitted, evaluate, UsageDecision};
pub use roles::require_admin;
