//! Existing credit facilities reported on the SLIK (credit bureau) section of the form.

use super::category::Category;
use super::domain::{field, is_affirmative, keys, ApplicationRecord, FACILITY_SLOT_COUNT};
use super::numeric::parse_grouped;

/// One reported facility. Slots have no identity beyond their 1-based index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilitySlot {
    pub index: usize,
    pub limit: i64,
    pub outstanding: i64,
    pub installment: i64,
    pub taken_over: bool,
    pub bank_name: Option<String>,
}

impl FacilitySlot {
    fn read(record: &ApplicationRecord, index: usize) -> Self {
        let amount = |key: String| field(record, &key).map(parse_grouped).unwrap_or(0);

        Self {
            index,
            limit: amount(keys::facility_limit(index)),
            outstanding: amount(keys::facility_outstanding(index)),
            installment: amount(keys::facility_installment(index)),
            taken_over: is_affirmative(record.get(&keys::facility_takeover(index))),
            bank_name: field(record, &keys::facility_bank_name(index)).map(str::to_string),
        }
    }

    /// Reads slots 1 through 15 in order.
    pub fn read_all(record: &ApplicationRecord) -> [FacilitySlot; FACILITY_SLOT_COUNT] {
        std::array::from_fn(|offset| Self::read(record, offset + 1))
    }
}

/// True when the applicant declared no existing facilities.
pub fn declares_no_facilities(record: &ApplicationRecord) -> bool {
    is_affirmative(record.get(keys::NO_FACILITIES))
}

/// Sum of monthly installments across all reported facilities.
///
/// The per-slot fields are ignored entirely once the no-facilities flag is set.
pub fn aggregate_existing_installments(record: &ApplicationRecord, _category: Category) -> i64 {
    if declares_no_facilities(record) {
        return 0;
    }

    FacilitySlot::read_all(record)
        .iter()
        .fold(0i64, |total, slot| total.saturating_add(slot.installment))
}

/// Comma-separated names of the banks whose facilities are being taken over.
///
/// Only take-over categories carry a roster, and only when facilities were declared.
pub fn takeover_roster(record: &ApplicationRecord, category: Category) -> Option<String> {
    if !category.is_takeover() || declares_no_facilities(record) {
        return None;
    }

    let names: Vec<String> = FacilitySlot::read_all(record)
        .into_iter()
        .filter(|slot| slot.taken_over)
        .filter_map(|slot| slot.bank_name)
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}
