//! USD to local currency price conversion.

use anyhow::{Result, anyhow, bail};
use rust_decimal::{Decimal, RoundingStrategy};

/// Checks that `usd` is an amount a price can be converted from.
pub fn validate_usd(usd: Decimal) -> Result<()> {
    if usd.is_sign_negative() && !usd.is_zero() {
        bail!("USD amount must not be negative: {usd}");
    }
    Ok(())
}

/// Converts a USD price at `rate`, rounded to a whole local unit.
pub fn to_local(usd: Decimal, rate: Decimal) -> Result<Decimal> {
    validate_usd(usd)?;
    let local = usd
        .checked_mul(rate)
        .ok_or_else(|| anyhow!("Conversion of {usd} at rate {rate} overflows"))?;
    Ok(local.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}
