use rust_decimal::{Decimal, RoundingStrategy};

/// Student discount applied to every list price (10% off).
pub const STUDENT_DISCOUNT_MULTIPLIER: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// List price after the student discount, rounded half-to-even at 2 dp.
pub fn student_price(list_price: Decimal) -> Decimal {
    (list_price * STUDENT_DISCOUNT_MULTIPLIER)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

pub fn format_gbp(value: Decimal) -> String {
    format!("£{:.2}", value)
}
