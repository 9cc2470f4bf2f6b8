/// Commission rate applied to the estimated sale amount, in percent.
pub const COMMISSION_RATE_PERCENT: i64 = 5;

/// Status value that zeroes the commission of a lead.
pub const UNQUALIFIED: &str = "unqualified";

/// Computes the estimated commission for a sale amount and lead status.
///
/// Leads whose status is exactly [`UNQUALIFIED`] earn nothing. Every other
/// status earns [`COMMISSION_RATE_PERCENT`] of the amount, rounded to the
/// nearest integer with halves rounding up (`2.5 -> 3`, `-2.5 -> -2`).
///
/// The arithmetic is done on integers, so there is no floating point drift
/// for large amounts.
///
/// # Example
/// ```
/// use leaddesk::estimated_commission;
///
/// assert_eq!(estimated_commission(1000, "qualified"), 50);
/// assert_eq!(estimated_commission(10, "contacted"), 1);
/// assert_eq!(estimated_commission(1000, "unqualified"), 0);
/// ```
pub fn estimated_commission(amount: i64, status: &str) -> i64 {
    if status == UNQUALIFIED {
        return 0;
    }

    // floor(amount * rate / 100 + 1/2) without leaving integer arithmetic.
    let scaled = i128::from(amount) * i128::from(COMMISSION_RATE_PERCENT) + 50;
    let rounded = scaled.div_euclid(100);

    // |rounded| <= |amount| / 20 + 1, which always fits back into an i64.
    rounded as i64
}
