//! End-to-end scenarios for the credit document context engine, driven through the
//! public crate surface only.

use std::sync::Arc;

use kredit_docs::workflows::credit::{
    aggregate_existing_installments, build_document_context, compute_installment,
    derive_affordability, ApplicationRecord, Category, CategoryError, ContextSettings,
    CreditDocumentService, CreditServiceError, FsTemplateStore, IncomeRules, InMemoryRecordStore,
    PlaceholderRenderer,
};

fn record(pairs: &[(&str, &str)]) -> ApplicationRecord {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn hundred_million_over_five_years_at_six_percent() {
    assert_eq!(compute_installment(100_000_000, 6.0, 60), 1_933_281);
}

#[test]
fn purna_reguler_zero_income_uses_pension_entitlement() {
    let input = record(&[
        ("kategori", "purna_reguler"),
        ("gaji_bersih_bulanan", "0"),
        ("taspen_hak_pensiun", "5.000.000"),
    ]);
    let metrics =
        derive_affordability(&input, Category::PurnaReguler, &IncomeRules::standard(), 0, 0)
            .expect("derivation succeeds");
    assert_eq!(metrics.income, 5_000_000);
}

#[test]
fn three_of_fifteen_slots_reported() {
    let mut input = ApplicationRecord::new();
    for slot in 1..=15 {
        let value = if matches!(slot, 2 | 9 | 14) { "1.000.000" } else { "" };
        input.insert(format!("slik_bank_{slot}_angsuran"), value.to_string());
    }
    assert_eq!(
        aggregate_existing_installments(&input, Category::PrapurnaTakeover),
        3_000_000
    );

    input.insert("slik_nihil".to_string(), "ya".to_string());
    assert_eq!(
        aggregate_existing_installments(&input, Category::PrapurnaTakeover),
        0
    );
}

#[test]
fn prapurna_reguler_document_context() {
    let input = record(&[
        ("kategori", "prapurna_reguler"),
        ("nama_pemohon", "Bambang Wijaya"),
        ("tgl_pensiun_pemohon", "2026-08-01"),
        ("plafon_kredit_dimohon", "50000000"),
        ("suku_bunga", "9,5"),
        ("jangka_waktu", "36"),
        ("estimasi_hak_pensiun", "4000000"),
        ("slik_bank_1_angsuran", "400000"),
        ("biaya_provisi_nominal", "500000"),
    ]);

    let context =
        build_document_context(&input, &ContextSettings::default()).expect("context builds");

    assert_eq!(context.descriptor.display_name, "Prapurna Reguler");
    assert_eq!(context.text("tgl_pensiun_pemohon"), Some("01 Agustus 2026"));
    assert_eq!(context.text("angsuran_diusulkan"), Some("1.601.648"));
    assert_eq!(context.text("total_angsuran_baru"), Some("2.001.648"));
    assert_eq!(context.text("kapasitas_angsuran_90"), Some("3.600.000"));
    assert_eq!(context.text("rasio_angsuran"), Some("50,04"));
    assert_eq!(context.text("biaya_provisi_nominal"), Some("500.000"));
    assert_eq!(context.text("bank_takeover"), None);
}

#[test]
fn unknown_category_produces_no_document() {
    let templates_dir = tempfile::tempdir().expect("temp dir");
    let templates = Arc::new(FsTemplateStore::new(templates_dir.path()));
    let service = CreditDocumentService::new(
        Arc::new(InMemoryRecordStore::default()),
        Arc::new(PlaceholderRenderer::new(templates.clone())),
        templates,
        ContextSettings::default(),
    );

    let id = service
        .save(None, record(&[("kategori", "multiguna"), ("nama_pemohon", "Rina")]))
        .expect("save succeeds");

    match service.generate(id) {
        Err(CreditServiceError::Category(CategoryError::Unknown { value })) => {
            assert_eq!(value, "multiguna");
        }
        other => panic!("expected category error, got {other:?}"),
    }
}

#[test]
fn uploaded_template_renders_from_disk() {
    let templates_dir = tempfile::tempdir().expect("temp dir");
    let templates = Arc::new(FsTemplateStore::new(templates_dir.path()));
    let service = CreditDocumentService::new(
        Arc::new(InMemoryRecordStore::default()),
        Arc::new(PlaceholderRenderer::new(templates.clone())),
        templates,
        ContextSettings::default(),
    );

    service
        .upload_template(
            Category::PurnaReguler,
            "surat_purna.fodt",
            b"<text:p>{{ nama_pemohon }}: {{ angsuran_diusulkan }} ({{ rasio_angsuran }}%)</text:p>",
        )
        .expect("template stored");

    let id = service
        .save(
            None,
            record(&[
                ("kategori", "purna_reguler"),
                ("nama_pemohon", "Rina"),
                ("usulan_plafon_kredit", "12.000.000"),
                ("suku_bunga", "0"),
                ("jangka_waktu", "12"),
                ("gaji_bersih_bulanan", "4.000.000"),
            ]),
        )
        .expect("save succeeds");

    let document = service.generate(id).expect("document renders");
    assert_eq!(
        String::from_utf8(document.bytes).expect("utf-8"),
        "<text:p>Rina: 1.000.000 (25,00%)</text:p>"
    );
}
