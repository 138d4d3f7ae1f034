use std::cmp::Ordering;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::InvalidRecordError;
use crate::payments::RawPayment;

/// Principals strictly above this pay the lowest rate.
pub const UPPER_TIER_FLOOR: Decimal = dec!(10000);
/// Principals strictly below this pay the highest rate.
pub const LOWER_TIER_CEILING: Decimal = dec!(1000);

pub const UPPER_TIER_RATE: Decimal = dec!(0.02);
pub const MIDDLE_TIER_RATE: Decimal = dec!(0.03);
pub const LOWER_TIER_RATE: Decimal = dec!(0.05);

/// Rate for a principal, picked on its magnitude. Both tier boundaries
/// belong to the middle tier.
pub fn fee_rate(amount: Decimal) -> Decimal {
    let magnitude = amount.abs();
    if magnitude > UPPER_TIER_FLOOR {
        UPPER_TIER_RATE
    } else if magnitude < LOWER_TIER_CEILING {
        LOWER_TIER_RATE
    } else {
        MIDDLE_TIER_RATE
    }
}

/// Tiered fee rounded to whole units, half-up. `None` on overflow.
pub fn compute_fee(amount: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(fee_rate(amount))
        .map(|fee| fee.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Principal plus its rounded fee; zero when the portal sent no principal.
pub fn amount_with_fees(payment: &RawPayment) -> Result<Decimal, InvalidRecordError> {
    let Some(amount) = payment.amount else {
        return Ok(Decimal::ZERO);
    };
    compute_fee(amount)
        .and_then(|fee| amount.checked_add(fee))
        .ok_or_else(|| InvalidRecordError::overflow(payment, "amount"))
}

/// How the amount received compares to what is owed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentBalance {
    Under,
    Settled,
    Over,
}

impl PaymentBalance {
    pub fn over_payment(self) -> bool {
        self == PaymentBalance::Over
    }

    pub fn under_payment(self) -> bool {
        self == PaymentBalance::Under
    }
}

pub fn classify(
    payment: &RawPayment,
    amount_with_fees: Decimal,
) -> Result<PaymentBalance, InvalidRecordError> {
    let received = payment
        .amount_received
        .ok_or_else(|| InvalidRecordError::missing(payment, "amount_received"))?;
    Ok(match received.cmp(&amount_with_fees) {
        Ordering::Less => PaymentBalance::Under,
        Ordering::Equal => PaymentBalance::Settled,
        Ordering::Greater => PaymentBalance::Over,
    })
}
