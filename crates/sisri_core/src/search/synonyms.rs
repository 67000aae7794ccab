//! Synonym classes and field aliases used by filter comparison.
//!
//! # Responsibility
//! - Hold every spelling-variant list in one place as named data.
//! - Decide class membership for property-type and limitation filters.
//!
//! # Invariants
//! - Variants are stored lowercase; comparison lowercases the input.
//! - A filter value outside every class falls back to plain equality.

use crate::search::text::{contains_ci, eq_ci};

/// One named set of interchangeable spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynonymClass {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl SynonymClass {
    /// Whether `value` names this class. Multi-word labels such as
    /// `"Residencial multifamiliar"` belong to the class of their variant word.
    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        if value.is_empty() {
            return false;
        }
        self.variants.iter().any(|variant| {
            value == *variant
                || value
                    .split(|c: char| !c.is_alphanumeric())
                    .any(|word| word == *variant)
        })
    }
}

pub const RESIDENTIAL: SynonymClass = SynonymClass {
    name: "residential",
    variants: &[
        "residential",
        "residencial",
        "residencia",
        "vivienda",
        "casa",
        "hogar",
        "house",
        "home",
    ],
};

pub const COMMERCIAL: SynonymClass = SynonymClass {
    name: "commercial",
    variants: &[
        "commercial",
        "comercial",
        "comercio",
        "negocio",
        "business",
        "tienda",
        "store",
    ],
};

pub const INDUSTRIAL: SynonymClass = SynonymClass {
    name: "industrial",
    variants: &["industrial", "industria", "fábrica", "fabrica", "factory"],
};

pub const MEDICAL: SynonymClass = SynonymClass {
    name: "hospital/medical",
    variants: &[
        "hospital",
        "medical",
        "médico",
        "medico",
        "salud",
        "health",
        "healthcare",
        "clínica",
        "clinica",
        "clinic",
    ],
};

pub const PROPERTY_TYPE_CLASSES: &[SynonymClass] = &[RESIDENTIAL, COMMERCIAL, INDUSTRIAL, MEDICAL];

/// Limitation filter value that expands to [`DIABETES_ALIASES`].
pub const DIABETES_FILTER: &str = "diabetes";

pub const DIABETES_ALIASES: &[&str] = &[
    "diabetes",
    "diabetic",
    "diabético",
    "diabetico",
    "diabética",
    "diabetica",
    "diabetes tipo 1",
    "diabetes tipo 2",
    "type 1 diabetes",
    "type 2 diabetes",
    "tipo 1",
    "tipo 2",
    "type 1",
    "type 2",
    "azúcar",
    "azucar",
    "azúcar alta",
    "azucar alta",
];

/// Column names accepted for the resident sex field, in preference order.
///
/// Older exports spell the column `sexo`; the store resolves whichever exists
/// once and always surfaces it as `sex`.
pub const RESIDENT_SEX_COLUMNS: &[&str] = &["sex", "sexo"];

/// Returns the class a property-type value belongs to, if any.
pub fn property_type_class(value: &str) -> Option<&'static SynonymClass> {
    PROPERTY_TYPE_CLASSES.iter().find(|class| class.matches(value))
}

/// Compares a property type against a filter value through synonym classes.
pub fn property_type_matches(property_type: &str, filter: &str) -> bool {
    match property_type_class(filter) {
        Some(class) => class.matches(property_type),
        None => eq_ci(property_type, filter),
    }
}

/// Compares a resident's limitation label against a limitation filter value.
pub fn limitation_matches(label: &str, filter: &str) -> bool {
    if eq_ci(filter, DIABETES_FILTER) {
        return DIABETES_ALIASES.iter().any(|alias| eq_ci(label, alias));
    }
    contains_ci(label, filter)
}
