use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::affordability::{derive_affordability, DerivedMetrics, IncomeRules};
use super::amortization::compute_installment;
use super::category::{Category, CategoryDescriptor, CategoryError};
use super::domain::{
    currency_keys, field, keys, ApplicationRecord, DATE_KEYS, DERIVATION_ERROR_SENTINEL,
    DERIVED_CURRENCY_KEYS,
};
use super::facilities::{aggregate_existing_installments, takeover_roster};
use super::format::{apply_currency_pass, apply_date_pass, partition_conditions, LocaleFormat};
use super::numeric::{parse_grouped, parse_rate_percent};
use super::templates::TEMPLATE_EXTENSION;

/// A single value handed to the template renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Text(String),
    List(Vec<String>),
}

impl ContextValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::List(_) => None,
        }
    }
}

/// Process-wide, read-only settings for building contexts.
#[derive(Debug, Clone, Default)]
pub struct ContextSettings {
    pub locale: LocaleFormat,
    pub income_rules: IncomeRules,
}

/// Formatted fields ready for rendering, plus the routing for the record's category.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentContext {
    pub descriptor: &'static CategoryDescriptor,
    pub fields: BTreeMap<String, ContextValue>,
    /// Absent when the affordability derivation failed.
    pub metrics: Option<DerivedMetrics>,
}

impl DocumentContext {
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(ContextValue::as_text)
    }
}

/// Loan parameters read from the form with form-input semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub principal: i64,
    pub annual_rate_percent: f64,
    pub term_months: i64,
}

impl LoanTerms {
    /// The proposed plafond wins over the requested one when both are filled in.
    pub fn from_record(record: &ApplicationRecord) -> Self {
        let principal = field(record, keys::PROPOSED_PLAFOND)
            .or_else(|| field(record, keys::REQUESTED_PLAFOND))
            .map(parse_grouped)
            .unwrap_or(0);

        Self {
            principal,
            annual_rate_percent: field(record, keys::ANNUAL_RATE)
                .map(parse_rate_percent)
                .unwrap_or(0.0),
            term_months: field(record, keys::TERM_MONTHS)
                .map(parse_grouped)
                .unwrap_or(0),
        }
    }

    pub fn installment(&self) -> i64 {
        compute_installment(self.principal, self.annual_rate_percent, self.term_months)
    }
}

/// Turns a stored record into the enriched, display-formatted field map.
///
/// Only a missing or unknown category aborts; every numeric problem degrades to
/// zero, an untouched value, or the `ERROR` marker in the ratio field.
pub fn build_document_context(
    record: &ApplicationRecord,
    settings: &ContextSettings,
) -> Result<DocumentContext, CategoryError> {
    let category = Category::from_record(record).inspect_err(|err| {
        warn!(error = %err, "cannot build document context");
    })?;
    let descriptor = category.descriptor();
    let locale = &settings.locale;
    let mut fields = record.clone();

    let terms = LoanTerms::from_record(record);
    let proposed = terms.installment();
    let existing = aggregate_existing_installments(record, category);

    let metrics = match derive_affordability(
        record,
        category,
        &settings.income_rules,
        proposed,
        existing,
    ) {
        Ok(metrics) => {
            insert_metrics(&mut fields, &metrics, locale);
            Some(metrics)
        }
        Err(err) => {
            warn!(%category, error = %err, "affordability derivation failed, marking ratio");
            fields.insert(
                keys::INSTALLMENT_RATIO.to_string(),
                DERIVATION_ERROR_SENTINEL.to_string(),
            );
            None
        }
    };

    if let Some(roster) = takeover_roster(record, category) {
        fields.insert(keys::TAKEOVER_BANKS.to_string(), roster);
    }

    apply_date_pass(&mut fields, DATE_KEYS, locale);
    let currency = currency_keys();
    apply_currency_pass(
        &mut fields,
        currency
            .iter()
            .map(String::as_str)
            .chain(DERIVED_CURRENCY_KEYS),
        locale,
    );

    let conditions = partition_conditions(record);
    let mut context: BTreeMap<String, ContextValue> = fields
        .into_iter()
        .map(|(key, value)| (key, ContextValue::Text(value)))
        .collect();
    context.insert(
        keys::CONDITIONS_AT_SIGNING.to_string(),
        ContextValue::List(conditions.at_signing),
    );
    context.insert(
        keys::CONDITIONS_AT_DISBURSEMENT.to_string(),
        ContextValue::List(conditions.at_disbursement),
    );

    debug!(
        %category,
        proposed_installment = proposed,
        existing_installments = existing,
        fields = context.len(),
        "document context built"
    );

    Ok(DocumentContext {
        descriptor,
        fields: context,
        metrics,
    })
}

fn insert_metrics(fields: &mut ApplicationRecord, metrics: &DerivedMetrics, locale: &LocaleFormat) {
    let derived = [
        (keys::PROPOSED_INSTALLMENT, metrics.proposed_installment.to_string()),
        (
            keys::EXISTING_INSTALLMENT_TOTAL,
            metrics.existing_installment_total.to_string(),
        ),
        (keys::INCOME_BASELINE, metrics.income.to_string()),
        (keys::CAPACITY_90, format!("{:.2}", metrics.capacity_90)),
        (keys::HEADROOM, format!("{:.2}", metrics.headroom)),
        (
            keys::NEW_INSTALLMENT_TOTAL,
            metrics.new_installment_total.to_string(),
        ),
        (keys::INSTALLMENT_RATIO, metrics.ratio_display(locale)),
    ];

    for (key, value) in derived {
        fields.insert(key.to_string(), value);
    }
}

/// Download name for a generated document, e.g. `Kredit_Siti_Aminah_3578014101600002.fodt`.
pub fn document_file_name(record: &ApplicationRecord) -> String {
    let name = field(record, keys::APPLICANT_NAME).unwrap_or("Debitur");
    let id_number = field(record, keys::APPLICANT_ID_NUMBER).unwrap_or("NIK");
    format!(
        "Kredit_{}_{}.{}",
        file_name_safe(name),
        file_name_safe(id_number),
        TEMPLATE_EXTENSION
    )
}

fn file_name_safe(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        .collect()
}
