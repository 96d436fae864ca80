pub mod plans;
pub mod reconcile;
pub mod webhook;

pub use plans::{generate_order_id, plan_for_amount, plan_from_note, plan_price};
pub use reconcile::{apply_outcome, await_confirmation, create_order, ApplyResult, CheckoutSession, ConfirmationStatus, NewOrder};
pub use webhook::{interpret_webhook, WebhookOutcome};
