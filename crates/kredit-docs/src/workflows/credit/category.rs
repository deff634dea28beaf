use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{field, keys, ApplicationRecord};

/// Applicant category selecting the income field and document templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PrapurnaReguler,
    PrapurnaTakeover,
    PurnaReguler,
    PurnaTakeover,
}

impl Category {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::PrapurnaReguler,
            Self::PrapurnaTakeover,
            Self::PurnaReguler,
            Self::PurnaTakeover,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrapurnaReguler => "prapurna_reguler",
            Self::PrapurnaTakeover => "prapurna_takeover",
            Self::PurnaReguler => "purna_reguler",
            Self::PurnaTakeover => "purna_takeover",
        }
    }

    /// Applicants still in active service, income estimated from the future pension.
    pub const fn is_prapurna(self) -> bool {
        matches!(self, Self::PrapurnaReguler | Self::PrapurnaTakeover)
    }

    /// Categories moving existing facilities from other banks.
    pub const fn is_takeover(self) -> bool {
        matches!(self, Self::PrapurnaTakeover | Self::PurnaTakeover)
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::PrapurnaReguler => 0,
            Self::PrapurnaTakeover => 1,
            Self::PurnaReguler => 2,
            Self::PurnaTakeover => 3,
        }
    }

    pub fn descriptor(self) -> &'static CategoryDescriptor {
        &DESCRIPTORS[self.index()]
    }

    pub fn from_tag(tag: &str) -> Result<Self, CategoryError> {
        let normalized = tag.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(CategoryError::Missing);
        }

        Self::ordered()
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| CategoryError::Unknown {
                value: tag.trim().to_string(),
            })
    }

    /// Resolves the category tag to its static descriptor.
    pub fn resolve(tag: &str) -> Result<&'static CategoryDescriptor, CategoryError> {
        Self::from_tag(tag).map(Self::descriptor)
    }

    pub fn from_record(record: &ApplicationRecord) -> Result<Self, CategoryError> {
        match field(record, keys::CATEGORY) {
            Some(tag) => Self::from_tag(tag),
            None => Err(CategoryError::Missing),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static routing information for one applicant category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDescriptor {
    pub category: Category,
    pub display_name: &'static str,
    pub form_template: &'static str,
    pub document_template: &'static str,
    /// Form field holding the income the affordability ratio is measured against.
    pub income_field: &'static str,
}

static DESCRIPTORS: [CategoryDescriptor; 4] = [
    CategoryDescriptor {
        category: Category::PrapurnaReguler,
        display_name: "Prapurna Reguler",
        form_template: "form_prapurna_reguler",
        document_template: "template_prapurna_reguler",
        income_field: keys::PENSION_ESTIMATE,
    },
    CategoryDescriptor {
        category: Category::PrapurnaTakeover,
        display_name: "Prapurna Take Over",
        form_template: "form_prapurna_takeover",
        document_template: "template_prapurna_takeover",
        income_field: keys::PENSION_ESTIMATE,
    },
    CategoryDescriptor {
        category: Category::PurnaReguler,
        display_name: "Purna Reguler",
        form_template: "form_purna_reguler",
        document_template: "template_purna_reguler",
        income_field: keys::MONTHLY_NET_INCOME,
    },
    CategoryDescriptor {
        category: Category::PurnaTakeover,
        display_name: "Purna Take Over",
        form_template: "form_purna_takeover",
        document_template: "template_purna_takeover",
        income_field: keys::SALARY_MONTH_3,
    },
];

/// All descriptors in display order.
pub fn descriptors() -> &'static [CategoryDescriptor] {
    &DESCRIPTORS
}

/// Raised when a record cannot be routed to a category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    #[error(
        "field '{}' is empty; a category is required to pick the document template",
        keys::CATEGORY
    )]
    Missing,
    #[error(
        "unknown category '{value}' in field '{}'; expected one of prapurna_reguler, \
         prapurna_takeover, purna_reguler, purna_takeover",
        keys::CATEGORY
    )]
    Unknown { value: String },
}
