use serde::Serialize;

use super::category::Category;
use super::domain::{field, keys, ApplicationRecord};
use super::format::LocaleFormat;
use super::numeric::parse_grouped;

/// Share of income that may go to installments.
pub const DEBT_SERVICE_CAPACITY: f64 = 0.9;

/// Affordability figures computed fresh for each document; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub proposed_installment: i64,
    pub existing_installment_total: i64,
    pub income: i64,
    pub capacity_90: f64,
    /// Capacity left after existing installments; negative when already over.
    pub headroom: f64,
    pub new_installment_total: i64,
    pub ratio_percent: f64,
}

impl DerivedMetrics {
    /// Ratio with two decimals and the locale decimal separator (`"23,45"`).
    pub fn ratio_display(&self, locale: &LocaleFormat) -> String {
        format!("{:.2}", self.ratio_percent).replace('.', &locale.decimal_separator.to_string())
    }
}

/// Why the affordability figures could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    #[error("'{metric}' overflowed while summing installments")]
    Overflow { metric: &'static str },
    #[error("'{metric}' is not a finite number")]
    NonFinite { metric: &'static str },
}

/// Where the income baseline comes from for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeRule {
    pub primary: &'static str,
    /// Consulted when the primary field is empty, zero or unparsable.
    pub fallback: Option<&'static str>,
}

/// Per-category income selection, with the pension-entitlement fallback switchable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeRules {
    pension_fallback: [bool; 4],
}

impl IncomeRules {
    /// Fallback enabled for both purna categories, never for prapurna.
    pub fn standard() -> Self {
        let mut pension_fallback = [false; 4];
        for category in Category::ordered() {
            pension_fallback[category.index()] = !category.is_prapurna();
        }
        Self { pension_fallback }
    }

    pub fn with_pension_fallback(mut self, category: Category, enabled: bool) -> Self {
        self.pension_fallback[category.index()] = enabled;
        self
    }

    pub fn rule(&self, category: Category) -> IncomeRule {
        IncomeRule {
            primary: category.descriptor().income_field,
            fallback: self.pension_fallback[category.index()].then_some(keys::PENSION_ENTITLEMENT),
        }
    }
}

impl Default for IncomeRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Income baseline per the rule, `0` when nothing usable is present.
pub fn select_income(record: &ApplicationRecord, rule: IncomeRule) -> i64 {
    let primary = field(record, rule.primary).map(parse_grouped).unwrap_or(0);
    if primary != 0 {
        return primary;
    }

    rule.fallback
        .and_then(|key| field(record, key))
        .map(parse_grouped)
        .unwrap_or(0)
}

/// Combines income, existing obligations and the new installment into the affordability figures.
pub fn derive_affordability(
    record: &ApplicationRecord,
    category: Category,
    rules: &IncomeRules,
    proposed_installment: i64,
    existing_total: i64,
) -> Result<DerivedMetrics, DerivationError> {
    let income = select_income(record, rules.rule(category));

    let capacity_90 = finite(income as f64 * DEBT_SERVICE_CAPACITY, keys::CAPACITY_90)?;
    let headroom = finite(capacity_90 - existing_total as f64, keys::HEADROOM)?;
    let new_installment_total =
        existing_total
            .checked_add(proposed_installment)
            .ok_or(DerivationError::Overflow {
                metric: keys::NEW_INSTALLMENT_TOTAL,
            })?;

    let ratio_percent = if income > 0 {
        finite(
            new_installment_total as f64 * 100.0 / income as f64,
            keys::INSTALLMENT_RATIO,
        )?
    } else {
        0.0
    };

    Ok(DerivedMetrics {
        proposed_installment,
        existing_installment_total: existing_total,
        income,
        capacity_90,
        headroom,
        new_installment_total,
        ratio_percent,
    })
}

fn finite(value: f64, metric: &'static str) -> Result<f64, DerivationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DerivationError::NonFinite { metric })
    }
}
