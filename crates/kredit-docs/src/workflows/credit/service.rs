use std::sync::Arc;

use tracing::info;

use super::category::{Category, CategoryError};
use super::context::{build_document_context, document_file_name, ContextSettings, DocumentContext};
use super::domain::ApplicationRecord;
use super::records::{
    normalize_submission, RecordId, RecordStore, RecordSummary, RepositoryError, StoredRecord,
};
use super::templates::{TemplateAssetStore, TemplateError, TemplateRenderer, DOCUMENT_CONTENT_TYPE};

/// Rendered document ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub file_name: String,
    pub content_type: mime::Mime,
    pub bytes: Vec<u8>,
}

/// Service composing the record store, template collaborators and the context engine.
pub struct CreditDocumentService<S, R, T> {
    records: Arc<S>,
    renderer: Arc<R>,
    templates: Arc<T>,
    settings: ContextSettings,
}

impl<S, R, T> CreditDocumentService<S, R, T>
where
    S: RecordStore + 'static,
    R: TemplateRenderer + 'static,
    T: TemplateAssetStore + 'static,
{
    pub fn new(
        records: Arc<S>,
        renderer: Arc<R>,
        templates: Arc<T>,
        settings: ContextSettings,
    ) -> Self {
        Self {
            records,
            renderer,
            templates,
            settings,
        }
    }

    /// Stores a submission, creating a record or replacing an existing one.
    pub fn save(
        &self,
        id: Option<RecordId>,
        mut fields: ApplicationRecord,
    ) -> Result<RecordId, CreditServiceError> {
        normalize_submission(&mut fields);
        let stored = self.records.put(id, fields)?;
        info!(record_id = %stored, updated = id.is_some(), "applicant record saved");
        Ok(stored)
    }

    pub fn get(&self, id: RecordId) -> Result<StoredRecord, CreditServiceError> {
        Ok(self.records.get(id)?)
    }

    pub fn list(&self, filter: Option<&str>) -> Result<Vec<RecordSummary>, CreditServiceError> {
        Ok(self.records.list(filter)?)
    }

    pub fn delete(&self, id: RecordId) -> Result<(), CreditServiceError> {
        self.records.delete(id)?;
        info!(record_id = %id, "applicant record deleted");
        Ok(())
    }

    /// Builds the formatted context for a stored record without rendering it.
    pub fn context(&self, id: RecordId) -> Result<DocumentContext, CreditServiceError> {
        let record = self.records.get(id)?;
        Ok(build_document_context(&record.fields, &self.settings)?)
    }

    /// Renders the category's document template for a stored record.
    pub fn generate(&self, id: RecordId) -> Result<GeneratedDocument, CreditServiceError> {
        let record = self.records.get(id)?;
        let context = build_document_context(&record.fields, &self.settings)?;
        let template_id = context.descriptor.document_template;
        let bytes = self.renderer.render(template_id, &context.fields)?;

        info!(record_id = %id, template_id, size = bytes.len(), "credit document generated");

        Ok(GeneratedDocument {
            file_name: document_file_name(&record.fields),
            content_type: document_mime(),
            bytes,
        })
    }

    /// Replaces the document template for a category.
    pub fn upload_template(
        &self,
        category: Category,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, CreditServiceError> {
        Ok(self.templates.save(category, file_name, bytes)?)
    }
}

fn document_mime() -> mime::Mime {
    DOCUMENT_CONTENT_TYPE
        .parse()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// Error raised by the credit document service.
#[derive(Debug, thiserror::Error)]
pub enum CreditServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}
