use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw form fields as submitted, keyed by form field name.
pub type ApplicationRecord = BTreeMap<String, String>;

/// Number of reported credit facilities (SLIK slots) on the form.
pub const FACILITY_SLOT_COUNT: usize = 15;

/// Number of free-text additional condition slots on the form.
pub const CONDITION_SLOT_COUNT: usize = 10;

/// Value a checkbox-style form field carries when ticked.
pub const AFFIRMATIVE: &str = "ya";

/// Marker written to the ratio field when the affordability derivation fails.
pub const DERIVATION_ERROR_SENTINEL: &str = "ERROR";

/// Form and context field names shared by the engine.
pub mod keys {
    pub const CATEGORY: &str = "kategori";
    pub const APPLICANT_NAME: &str = "nama_pemohon";
    pub const APPLICANT_ID_NUMBER: &str = "no_ktp_pemohon";

    pub const REQUESTED_PLAFOND: &str = "plafon_kredit_dimohon";
    pub const PROPOSED_PLAFOND: &str = "usulan_plafon_kredit";
    pub const ANNUAL_RATE: &str = "suku_bunga";
    pub const TERM_MONTHS: &str = "jangka_waktu";

    pub const PENSION_ESTIMATE: &str = "estimasi_hak_pensiun";
    pub const MONTHLY_NET_INCOME: &str = "gaji_bersih_bulanan";
    pub const SALARY_MONTH_1: &str = "gaji_bulan_1_jumlah";
    pub const SALARY_MONTH_2: &str = "gaji_bulan_2_jumlah";
    pub const SALARY_MONTH_3: &str = "gaji_bulan_3_jumlah";
    pub const PENSION_ENTITLEMENT: &str = "taspen_hak_pensiun";

    pub const NO_FACILITIES: &str = "slik_nihil";

    pub const PROPOSED_INSTALLMENT: &str = "angsuran_diusulkan";
    pub const EXISTING_INSTALLMENT_TOTAL: &str = "total_angsuran_existing";
    pub const INCOME_BASELINE: &str = "penghasilan_dasar";
    pub const CAPACITY_90: &str = "kapasitas_angsuran_90";
    pub const HEADROOM: &str = "sisa_kapasitas_angsuran";
    pub const NEW_INSTALLMENT_TOTAL: &str = "total_angsuran_baru";
    pub const INSTALLMENT_RATIO: &str = "rasio_angsuran";

    pub const TAKEOVER_BANKS: &str = "bank_takeover";
    pub const CONDITIONS_AT_SIGNING: &str = "syarat_penandatanganan";
    pub const CONDITIONS_AT_DISBURSEMENT: &str = "syarat_pencairan";

    pub fn facility_limit(slot: usize) -> String {
        format!("slik_bank_{slot}_maks")
    }

    pub fn facility_outstanding(slot: usize) -> String {
        format!("slik_bank_{slot}_outs")
    }

    pub fn facility_installment(slot: usize) -> String {
        format!("slik_bank_{slot}_angsuran")
    }

    pub fn facility_takeover(slot: usize) -> String {
        format!("slik_bank_{slot}_takeover")
    }

    pub fn facility_bank_name(slot: usize) -> String {
        format!("slik_bank_{slot}_nama")
    }

    pub fn condition_text(slot: usize) -> String {
        format!("syarat_tambahan_{slot}_teks")
    }

    pub fn condition_timing(slot: usize) -> String {
        format!("syarat_tambahan_{slot}_waktu")
    }
}

/// Fields rendered as long-form dates.
pub const DATE_KEYS: [&str; 9] = [
    "tgl_lahir_pemohon",
    "tgl_terbit_ktp",
    "tgl_mulai_kerja",
    "tgl_sk_cpns",
    "tgl_sk_golongan",
    "tgl_pensiun_pemohon",
    "tgl_slik",
    "mitigasi_slik_tgl_surat",
    "tgl_call_memo",
];

/// Rupiah form fields other than the per-facility amounts.
pub const NOMINAL_KEYS: [&str; 13] = [
    keys::REQUESTED_PLAFOND,
    keys::PROPOSED_PLAFOND,
    keys::SALARY_MONTH_1,
    keys::SALARY_MONTH_2,
    keys::SALARY_MONTH_3,
    keys::MONTHLY_NET_INCOME,
    keys::PENSION_ESTIMATE,
    "taspen_tht",
    keys::PENSION_ENTITLEMENT,
    "biaya_provisi_nominal",
    "biaya_tata_laksana_nominal",
    "biaya_asuransi_nominal",
    "nilai_agunan",
];

/// Derived amounts rendered as Rupiah. The ratio is excluded; it is formatted on derivation.
pub const DERIVED_CURRENCY_KEYS: [&str; 6] = [
    keys::PROPOSED_INSTALLMENT,
    keys::EXISTING_INSTALLMENT_TOTAL,
    keys::INCOME_BASELINE,
    keys::CAPACITY_90,
    keys::HEADROOM,
    keys::NEW_INSTALLMENT_TOTAL,
];

/// Every form field holding a Rupiah amount, facility sub-fields included.
pub fn currency_keys() -> Vec<String> {
    let mut all: Vec<String> = NOMINAL_KEYS.iter().map(|key| key.to_string()).collect();
    for slot in 1..=FACILITY_SLOT_COUNT {
        all.push(keys::facility_limit(slot));
        all.push(keys::facility_outstanding(slot));
        all.push(keys::facility_installment(slot));
    }
    all
}

/// True when a checkbox-like field holds the affirmative sentinel.
pub fn is_affirmative(value: Option<&String>) -> bool {
    value
        .map(|raw| raw.trim().eq_ignore_ascii_case(AFFIRMATIVE))
        .unwrap_or(false)
}

/// Non-empty, trimmed field value.
pub(crate) fn field<'a>(record: &'a ApplicationRecord, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// When an additional condition has to be fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTiming {
    AtSigning,
    AtDisbursement,
}

impl ConditionTiming {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "penandatanganan" => Some(Self::AtSigning),
            "pencairan" => Some(Self::AtDisbursement),
            _ => None,
        }
    }
}
