use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::credit::category::Category;
use crate::workflows::credit::context::ContextSettings;
use crate::workflows::credit::domain::ApplicationRecord;
use crate::workflows::credit::records::InMemoryRecordStore;
use crate::workflows::credit::service::CreditDocumentService;
use crate::workflows::credit::templates::{PlaceholderRenderer, TemplateAssetStore, TemplateError};

pub(super) type TestService = CreditDocumentService<
    InMemoryRecordStore,
    PlaceholderRenderer<MemoryTemplates>,
    MemoryTemplates,
>;

#[derive(Default)]
pub(super) struct MemoryTemplates {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryTemplates {
    pub(super) fn with(template_id: &str, body: &str) -> Self {
        let templates = Self::default();
        templates
            .files
            .lock()
            .expect("template mutex poisoned")
            .insert(template_id.to_string(), body.as_bytes().to_vec());
        templates
    }
}

impl TemplateAssetStore for MemoryTemplates {
    fn load(&self, template_id: &str) -> Result<Vec<u8>, TemplateError> {
        self.files
            .lock()
            .expect("template mutex poisoned")
            .get(template_id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                template_id: template_id.to_string(),
            })
    }

    fn save(
        &self,
        category: Category,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, TemplateError> {
        if !file_name.ends_with(".fodt") {
            return Err(TemplateError::UnsupportedExtension {
                file_name: file_name.to_string(),
            });
        }
        let template_id = category.descriptor().document_template.to_string();
        self.files
            .lock()
            .expect("template mutex poisoned")
            .insert(template_id.clone(), bytes.to_vec());
        Ok(template_id)
    }
}

pub(super) const TAKEOVER_TEMPLATE: &str = concat!(
    "<office:text><text:p>{{ nama_pemohon }} | {{ angsuran_diusulkan }} | ",
    "{{ rasio_angsuran }} | {{ bank_takeover }} | {{ tgl_slik }}</text:p>",
    "<text:p>{{ syarat_pencairan }}</text:p></office:text>"
);

pub(super) fn build_service(
    templates: MemoryTemplates,
) -> (TestService, Arc<InMemoryRecordStore>, Arc<MemoryTemplates>) {
    let records = Arc::new(InMemoryRecordStore::default());
    let templates = Arc::new(templates);
    let renderer = Arc::new(PlaceholderRenderer::new(templates.clone()));
    let service = CreditDocumentService::new(
        records.clone(),
        renderer,
        templates.clone(),
        ContextSettings::default(),
    );
    (service, records, templates)
}

pub(super) fn fields(pairs: &[(&str, &str)]) -> ApplicationRecord {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// A purna take-over applicant moving two of three facilities, as stored after intake.
pub(super) fn takeover_record() -> ApplicationRecord {
    fields(&[
        ("kategori", "purna_takeover"),
        ("nama_pemohon", "Siti Aminah"),
        ("no_ktp_pemohon", "3578014101600002"),
        ("tgl_lahir_pemohon", "1960-01-01"),
        ("tgl_slik", "2024-03-07"),
        ("usulan_plafon_kredit", "100000000"),
        ("suku_bunga", "6"),
        ("jangka_waktu", "60"),
        ("gaji_bulan_1_jumlah", "4800000"),
        ("gaji_bulan_2_jumlah", "4900000"),
        ("gaji_bulan_3_jumlah", "5000000"),
        ("taspen_hak_pensiun", "4500000"),
        ("slik_bank_1_nama", "Bank Mandiri"),
        ("slik_bank_1_maks", "50000000"),
        ("slik_bank_1_outs", "20000000"),
        ("slik_bank_1_angsuran", "1000000"),
        ("slik_bank_1_takeover", "ya"),
        ("slik_bank_2_nama", "BRI"),
        ("slik_bank_2_angsuran", "500000"),
        ("slik_bank_3_nama", "Bank Jatim"),
        ("slik_bank_3_angsuran", "250000"),
        ("slik_bank_3_takeover", "ya"),
        ("syarat_tambahan_1_teks", "Pelunasan kredit di Bank Mandiri"),
        ("syarat_tambahan_1_waktu", "pencairan"),
        ("syarat_tambahan_2_teks", "Asli SK pensiun diserahkan"),
        ("syarat_tambahan_2_waktu", "penandatanganan"),
    ])
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
