/// Fixed monthly payment for a flat-rate annuity loan, rounded up to the next rupiah.
///
/// Zero rate splits the principal evenly. A non-positive principal or term, or a
/// result that is not finite, yields `0` so document generation never stops here.
pub fn compute_installment(principal: i64, annual_rate_percent: f64, term_months: i64) -> i64 {
    if principal <= 0 || term_months <= 0 || !annual_rate_percent.is_finite() {
        return 0;
    }

    if annual_rate_percent == 0.0 {
        return ceil_div(principal, term_months);
    }

    let Ok(periods) = i32::try_from(term_months) else {
        return 0;
    };

    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let growth = (1.0 + monthly_rate).powi(periods);
    let denominator = growth - 1.0;
    if denominator == 0.0 {
        return 0;
    }

    let payment = principal as f64 * monthly_rate * growth / denominator;
    if !payment.is_finite() || payment < 0.0 {
        return 0;
    }

    payment.ceil() as i64
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    if numerator % denominator == 0 {
        quotient
    } else {
        quotient + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn annuity_payment_is_ceiled() {
        assert_eq!(compute_installment(100_000_000, 6.0, 60), 1_933_281);
        assert_eq!(compute_installment(50_000_000, 9.5, 36), 1_601_648);
        assert_eq!(compute_installment(12_000_000, 12.0, 12), 1_066_186);
    }

    #[test]
    fn zero_rate_divides_evenly_rounding_up() {
        assert_eq!(compute_installment(12_000_000, 0.0, 12), 1_000_000);
        assert_eq!(compute_installment(10_000_000, 0.0, 3), 3_333_334);
    }

    #[test]
    fn degenerate_inputs_yield_zero() {
        assert_eq!(compute_installment(10_000_000, 0.0, 0), 0);
        assert_eq!(compute_installment(10_000_000, 7.0, -12), 0);
        assert_eq!(compute_installment(0, 7.0, 12), 0);
        assert_eq!(compute_installment(10_000_000, f64::NAN, 12), 0);
    }

    proptest! {
        #[test]
        fn zero_rate_matches_ceiling_division(
            principal in 1i64..10_000_000_000,
            term in 1i64..480,
        ) {
            let expected = (principal + term - 1) / term;
            prop_assert_eq!(compute_installment(principal, 0.0, term), expected);
        }

        #[test]
        fn interest_never_lowers_the_payment(
            principal in 1_000i64..10_000_000_000,
            rate in 0.01f64..30.0,
            term in 1i64..480,
        ) {
            prop_assert!(
                compute_installment(principal, rate, term)
                    >= compute_installment(principal, 0.0, term)
            );
        }
    }
}
