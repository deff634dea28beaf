use serde::Serialize;

use crate::workflows::credit::domain::{
    field, keys, ApplicationRecord, ConditionTiming, CONDITION_SLOT_COUNT,
};

/// Additional credit conditions split by when they must be met, in slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConditionLists {
    pub at_signing: Vec<String>,
    pub at_disbursement: Vec<String>,
}

/// Reads condition slots 1 through 10. Slots with empty text or without a
/// recognised timing tag are dropped.
pub fn partition_conditions(record: &ApplicationRecord) -> ConditionLists {
    let slots: [Option<(ConditionTiming, String)>; CONDITION_SLOT_COUNT] =
        std::array::from_fn(|offset| {
            let slot = offset + 1;
            let text = field(record, &keys::condition_text(slot))?;
            let timing = field(record, &keys::condition_timing(slot))
                .and_then(ConditionTiming::from_tag)?;
            Some((timing, text.to_string()))
        });

    let mut lists = ConditionLists::default();
    for (timing, text) in slots.into_iter().flatten() {
        match timing {
            ConditionTiming::AtSigning => lists.at_signing.push(text),
            ConditionTiming::AtDisbursement => lists.at_disbursement.push(text),
        }
    }
    lists
}
