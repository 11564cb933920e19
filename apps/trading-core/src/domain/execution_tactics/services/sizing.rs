//! Slice sizing helpers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for unlotted slice sizes.
pub const SIZE_DP: u32 = 8;

/// Round a slice size down to a lot multiple, or to [`SIZE_DP`] places when
/// no lot is configured.
#[must_use]
pub fn round_to_lot(size: Decimal, lot_size: Option<Decimal>) -> Decimal {
    match lot_size {
        Some(lot) if lot > Decimal::ZERO => (size / lot).floor() * lot,
        _ => size.round_dp_with_strategy(SIZE_DP, RoundingStrategy::ToZero),
    }
}
