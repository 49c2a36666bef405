//! Price row resolution.
//!
//! Turns one NADAC row into a concept-level record using the reference index,
//! falling back to name extraction for attributes the tables do not carry.
//! Rows that cannot be resolved are dropped with a [`DropReason`]; they are
//! counted, never fatal.

use nadac_types::{canonicalize_code, ConceptId, PriceObservation};
use thiserror::Error;

use crate::extract::{title_case, NameParser};
use crate::index::ReferenceIndex;
use crate::parser::parse;

/// Why an observation was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The product code is empty or not in the code map.
    #[error("no concept for product code {code:?}")]
    UnresolvableCode {
        /// The code as published.
        code: String,
    },

    /// The row resolved but its price or date is unusable.
    #[error("invalid observation: {0}")]
    InvalidObservation(#[from] InvalidField),
}

/// The field that made an observation invalid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidField {
    /// Price is not a finite number greater than zero.
    #[error("price {0:?} is not a positive number")]
    Price(String),

    /// Effective date is blank.
    #[error("effective date is missing")]
    MissingDate,
}

/// Where a resolved field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    /// Looked up in the reference tables.
    Reference,
    /// Extracted from the name or taken from the price row.
    Derived,
    /// No value found.
    #[default]
    Missing,
}

impl Provenance {
    fn of<T>(reference: Option<T>) -> Self {
        if reference.is_some() {
            Self::Reference
        } else {
            Self::Missing
        }
    }
}

/// Provenance of each enriched field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSources {
    /// Display name.
    pub name: Provenance,
    /// Brand/generic partner.
    pub pairing: Provenance,
    /// Ingredient name.
    pub ingredient: Provenance,
    /// Manufacturer name.
    pub manufacturer: Provenance,
    /// Strength.
    pub strength: Provenance,
    /// Dosage form.
    pub form: Provenance,
}

/// A price row bound to its concept, with enriched attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    /// Resolved concept.
    pub concept_id: ConceptId,
    /// Canonical product code.
    pub external_code: String,
    /// Official name, or the NADAC description.
    pub display_name: String,
    /// Brand classification of the row.
    pub is_brand: bool,
    /// Brand side of the pairing.
    pub paired_brand_id: Option<ConceptId>,
    /// Generic side of the pairing.
    pub paired_generic_id: Option<ConceptId>,
    /// Title-cased ingredient name.
    pub ingredient_name: String,
    /// Manufacturer, possibly empty.
    pub manufacturer_name: String,
    /// Strength, possibly empty.
    pub strength: String,
    /// Dosage form, possibly empty.
    pub form: String,
    /// Validated per-unit price.
    pub unit_price: f64,
    /// Trimmed effective date.
    pub effective_date: String,
    /// Where each enriched field came from.
    pub sources: FieldSources,
}

/// Resolver switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// When the direct pairing lookup misses, try the opposite direction for
    /// the same concept. Handles concepts tagged inconsistently across edges.
    pub reciprocal_fallback: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            reciprocal_fallback: true,
        }
    }
}

/// Resolves observations against a borrowed reference index.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a ReferenceIndex,
    names: &'a NameParser,
    config: ResolverConfig,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver.
    pub fn new(index: &'a ReferenceIndex, names: &'a NameParser, config: ResolverConfig) -> Self {
        Self {
            index,
            names,
            config,
        }
    }

    /// Resolves one observation.
    ///
    /// # Errors
    /// [`DropReason::UnresolvableCode`] when the code does not map to a
    /// concept, [`DropReason::InvalidObservation`] when price or date fail
    /// validation. The code is checked first.
    pub fn resolve(&self, observation: &PriceObservation) -> Result<ResolvedRecord, DropReason> {
        let external_code = canonicalize_code(&observation.external_code);
        let concept_id = self
            .index
            .concept_for_code(&external_code)
            .ok_or_else(|| DropReason::UnresolvableCode {
                code: observation.external_code.clone(),
            })?
            .clone();

        let unit_price = parse::positive_price(&observation.unit_price)
            .ok_or_else(|| InvalidField::Price(observation.unit_price.clone()))?;
        let effective_date = observation.effective_date.trim();
        if effective_date.is_empty() {
            return Err(InvalidField::MissingDate.into());
        }

        let mut sources = FieldSources::default();
        let is_brand = observation.is_brand();

        let (paired_brand_id, paired_generic_id) = self.pairing(&concept_id, is_brand);
        sources.pairing = Provenance::of(if is_brand {
            paired_generic_id.as_ref()
        } else {
            paired_brand_id.as_ref()
        });

        let display_name = match self.index.official_name(&concept_id) {
            Some(name) => {
                sources.name = Provenance::Reference;
                name.to_string()
            }
            None => {
                let raw = observation.raw_name.trim();
                if !raw.is_empty() {
                    sources.name = Provenance::Derived;
                }
                raw.to_string()
            }
        };

        let (manufacturer_name, provenance) = self.attribute_or(
            self.index.manufacturer(&concept_id),
            || self.names.bracketed(&display_name),
        );
        sources.manufacturer = provenance;

        let (strength, provenance) = self.attribute_or(self.index.strength(&concept_id), || {
            self.names.strength(&display_name)
        });
        sources.strength = provenance;

        let (form, provenance) = self.attribute_or(self.index.form(&concept_id), || {
            self.names.form(&display_name)
        });
        sources.form = provenance;

        let (ingredient_name, provenance) = self.ingredient(&concept_id, &display_name);
        sources.ingredient = provenance;

        Ok(ResolvedRecord {
            concept_id,
            external_code,
            display_name,
            is_brand,
            paired_brand_id,
            paired_generic_id,
            ingredient_name,
            manufacturer_name,
            strength,
            form,
            unit_price,
            effective_date: effective_date.to_string(),
            sources,
        })
    }

    /// Brand and generic sides for a concept. The concept is its own side.
    fn pairing(&self, concept_id: &ConceptId, is_brand: bool) -> (Option<ConceptId>, Option<ConceptId>) {
        let (direct, reciprocal) = if is_brand {
            (
                self.index.generic_for_brand(concept_id),
                self.index.brand_for_generic(concept_id),
            )
        } else {
            (
                self.index.brand_for_generic(concept_id),
                self.index.generic_for_brand(concept_id),
            )
        };

        let partner = direct
            .or(if self.config.reciprocal_fallback {
                reciprocal
            } else {
                None
            })
            .cloned();

        if is_brand {
            (Some(concept_id.clone()), partner)
        } else {
            (partner, Some(concept_id.clone()))
        }
    }

    fn attribute_or<F>(&self, reference: Option<&str>, derive: F) -> (String, Provenance)
    where
        F: FnOnce() -> Option<String>,
    {
        match reference.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => (value.to_string(), Provenance::Reference),
            None => match derive() {
                Some(value) => (value, Provenance::Derived),
                None => (String::new(), Provenance::Missing),
            },
        }
    }

    /// Ingredient concept name when known, otherwise cleaned from the display name.
    fn ingredient(&self, concept_id: &str, display_name: &str) -> (String, Provenance) {
        let reference = self
            .index
            .ingredient_of(concept_id)
            .and_then(|ingredient| self.index.official_name(ingredient))
            .filter(|name| !name.trim().is_empty());

        match reference {
            Some(name) => (title_case(name.trim()), Provenance::Reference),
            None => {
                let derived = self.names.ingredient(display_name);
                if derived.is_empty() {
                    (derived, Provenance::Missing)
                } else {
                    (derived, Provenance::Derived)
                }
            }
        }
    }
}
