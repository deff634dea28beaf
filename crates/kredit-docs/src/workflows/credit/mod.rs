//! Credit document engine: turns a stored applicant form into the formatted
//! context merged into the category's document template.
//!
//! Flow: the category router picks the income field and templates, the numeric
//! parser feeds the amortization calculator and facility aggregator, the
//! affordability deriver combines them, and the formatter renders every date and
//! Rupiah field before the context is handed to the template renderer.

pub mod affordability;
pub mod amortization;
pub mod category;
pub mod context;
pub mod domain;
pub mod facilities;
pub mod format;
pub mod numeric;
pub mod records;
pub mod router;
pub mod service;
pub mod templates;

#[cfg(test)]
mod tests;

pub use affordability::{
    derive_affordability, DerivationError, DerivedMetrics, IncomeRule, IncomeRules,
};
pub use amortization::compute_installment;
pub use category::{Category, CategoryDescriptor, CategoryError};
pub use context::{
    build_document_context, ContextSettings, ContextValue, DocumentContext, LoanTerms,
};
pub use domain::ApplicationRecord;
pub use facilities::{aggregate_existing_installments, takeover_roster, FacilitySlot};
pub use format::LocaleFormat;
pub use records::{
    InMemoryRecordStore, RecordId, RecordStore, RecordSummary, RecordTable, RepositoryError,
    StoredRecord,
};
pub use router::credit_router;
pub use service::{CreditDocumentService, CreditServiceError, GeneratedDocument};
pub use templates::{
    FsTemplateStore, PlaceholderRenderer, TemplateAssetStore, TemplateError, TemplateRenderer,
};
