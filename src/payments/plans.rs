use rust_decimal::Decimal;

use crate::models::PlanType;

/// Gateway order ids are capped at 50 characters; stay well under.
pub const MAX_ORDER_ID_LEN: usize = 45;

const PRICE_TABLE: [(PlanType, i64); 3] = [
    (PlanType::Monthly, 99),
    (PlanType::Yearly, 999),
    (PlanType::Lifetime, 4999),
];

/// Price of a purchasable plan. Free has no price.
pub fn plan_price(plan: PlanType) -> Option<Decimal> {
    PRICE_TABLE
        .iter()
        .find(|(p, _)| *p == plan)
        .map(|(_, amount)| Decimal::from(*amount))
}

/// Inverse of the price table: the plan a paid amount buys.
pub fn plan_for_amount(amount: Decimal) -> Option<PlanType> {
    PRICE_TABLE
        .iter()
        .find(|(_, price)| Decimal::from(*price) == amount)
        .map(|(plan, _)| *plan)
}

/// Plan named in free text such as "MyPnL yearly plan".
pub fn plan_from_note(note: &str) -> Option<PlanType> {
    let note = note.to_lowercase();
    [PlanType::Lifetime, PlanType::Yearly, PlanType::Monthly]
        .into_iter()
        .find(|plan| note.contains(plan.as_str()))
}

/// `order_<first 8 alphanumerics of the user id>_<unix ms>`.
pub fn generate_order_id(user_id: &str, timestamp_ms: i64) -> String {
    let short: String = user_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect();

    let mut id = format!("order_{short}_{timestamp_ms}");
    id.truncate(MAX_ORDER_ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_lookup_matches_prices() {
        assert_eq!(plan_for_amount(Decimal::from(99)), Some(PlanType::Monthly));
        assert_eq!(plan_for_amount(Decimal::from(999)), Some(PlanType::Yearly));
        assert_eq!(plan_for_amount(Decimal::new(499900, 2)), Some(PlanType::Lifetime));
        assert_eq!(plan_for_amount(Decimal::from(100)), None);

        for plan in [PlanType::Monthly, PlanType::Yearly, PlanType::Lifetime] {
            assert_eq!(plan_for_amount(plan_price(plan).unwrap()), Some(plan));
        }
        assert_eq!(plan_price(PlanType::Free), None);
    }

    #[test]
    fn plan_from_note_text() {
        assert_eq!(plan_from_note("MyPnL Yearly Plan"), Some(PlanType::Yearly));
        assert_eq!(plan_from_note("monthly subscription"), Some(PlanType::Monthly));
        assert_eq!(plan_from_note("LIFETIME access"), Some(PlanType::Lifetime));
        assert_eq!(plan_from_note("thanks"), None);
    }

    #[test]
    fn order_ids_are_short_and_derived_from_user() {
        let id = generate_order_id("3f2a-91bc-77de-0011-aaaa", 1_700_000_000_000);
        assert_eq!(id, "order_3f2a91bc_1700000000000");

        let id = generate_order_id(&"x".repeat(200), i64::MAX);
        assert!(id.len() <= MAX_ORDER_ID_LEN);
        assert!(id.starts_with("order_xxxxxxxx_"));
    }
}
