//! RxNorm and NADAC enumeration types.
//!
//! This module provides enum representations for the coded values that appear
//! in RRF reference tables (term types, relationship attributes, suppression
//! flags) and in the NADAC price file (rate-setting classification).

/// RxNorm term type (TTY) of a concept name row.
///
/// Only the term types that take part in pairing rank are enumerated;
/// everything else parses to `None` and falls into the lowest ranking bucket.
///
/// # Examples
///
/// ```
/// use nadac_types::TermType;
///
/// assert_eq!(TermType::from_code("SBD"), Some(TermType::BrandedDrug));
/// assert_eq!(TermType::BrandedDrug.code(), "SBD");
/// assert_eq!(TermType::from_code("SY"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TermType {
    /// Ingredient (IN).
    Ingredient,
    /// Semantic clinical drug (SCD).
    ClinicalDrug,
    /// Semantic clinical drug group (SCDG).
    ClinicalDrugGroup,
    /// Semantic clinical drug form (SCDF).
    ClinicalDrugForm,
    /// Semantic branded drug (SBD).
    BrandedDrug,
    /// Semantic branded drug form (SBDF).
    BrandedDrugForm,
    /// Generic pack (GPCK).
    GenericPack,
    /// Branded pack (BPCK).
    BrandedPack,
}

impl TermType {
    /// Lowest priority bucket, shared by unranked and unknown term types.
    pub const UNRANKED: u8 = 4;

    /// Parses a TTY code.
    ///
    /// Returns `None` if the code is not one the pipeline distinguishes.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "IN" => Some(Self::Ingredient),
            "SCD" => Some(Self::ClinicalDrug),
            "SCDG" => Some(Self::ClinicalDrugGroup),
            "SCDF" => Some(Self::ClinicalDrugForm),
            "SBD" => Some(Self::BrandedDrug),
            "SBDF" => Some(Self::BrandedDrugForm),
            "GPCK" => Some(Self::GenericPack),
            "BPCK" => Some(Self::BrandedPack),
            _ => None,
        }
    }

    /// Returns the TTY code for this term type.
    pub fn code(self) -> &'static str {
        match self {
            Self::Ingredient => "IN",
            Self::ClinicalDrug => "SCD",
            Self::ClinicalDrugGroup => "SCDG",
            Self::ClinicalDrugForm => "SCDF",
            Self::BrandedDrug => "SBD",
            Self::BrandedDrugForm => "SBDF",
            Self::GenericPack => "GPCK",
            Self::BrandedPack => "BPCK",
        }
    }

    /// Priority used when choosing between several pairing partners.
    ///
    /// Lower is better: clinical and branded drug forms rank 1, packs 2,
    /// ingredients 3. Term types without a variant get [`TermType::UNRANKED`]
    /// through [`TermType::rank_of`].
    pub fn pairing_rank(self) -> u8 {
        match self {
            Self::ClinicalDrug
            | Self::ClinicalDrugGroup
            | Self::ClinicalDrugForm
            | Self::BrandedDrugForm
            | Self::BrandedDrug => 1,
            Self::GenericPack | Self::BrandedPack => 2,
            Self::Ingredient => 3,
        }
    }

    /// Ranks an optional term type; unknown concepts get the lowest bucket.
    pub fn rank_of(term_type: Option<Self>) -> u8 {
        term_type.map_or(Self::UNRANKED, Self::pairing_rank)
    }
}

/// Relationship attribute (RELA) of an RXNREL row.
///
/// Direction matters: for the brand-side kinds the first concept of the row
/// is the brand and the second the generic candidate; for the generic-side
/// kinds it is the other way round.
///
/// # Examples
///
/// ```
/// use nadac_types::RelationKind;
///
/// let kind = RelationKind::from_code("tradename_of").unwrap();
/// assert!(kind.is_brand_side());
/// assert!(kind.is_pairing());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationKind {
    /// `tradename_of`: brand → generic.
    TradenameOf,
    /// `has_tradename`: generic → brand.
    HasTradename,
    /// `brand_name_of`: brand → generic.
    BrandNameOf,
    /// `has_brand_name`: generic → brand.
    HasBrandName,
    /// `has_ingredient`: product → active ingredient.
    HasIngredient,
}

impl RelationKind {
    /// Parses a RELA value. Unrecognized values return `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "tradename_of" => Some(Self::TradenameOf),
            "has_tradename" => Some(Self::HasTradename),
            "brand_name_of" => Some(Self::BrandNameOf),
            "has_brand_name" => Some(Self::HasBrandName),
            "has_ingredient" => Some(Self::HasIngredient),
            _ => None,
        }
    }

    /// Returns the RELA value for this kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::TradenameOf => "tradename_of",
            Self::HasTradename => "has_tradename",
            Self::BrandNameOf => "brand_name_of",
            Self::HasBrandName => "has_brand_name",
            Self::HasIngredient => "has_ingredient",
        }
    }

    /// True for the four kinds that pair a brand with a generic.
    pub fn is_pairing(self) -> bool {
        self.is_brand_side() || self.is_generic_side()
    }

    /// First concept is the brand, second the generic.
    pub fn is_brand_side(self) -> bool {
        matches!(self, Self::TradenameOf | Self::BrandNameOf)
    }

    /// First concept is the generic, second the brand.
    pub fn is_generic_side(self) -> bool {
        matches!(self, Self::HasTradename | Self::HasBrandName)
    }
}

/// Suppression flag carried by RXNCONSO and RXNSAT rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SuppressFlag {
    /// `N` or empty: not suppressed.
    #[default]
    NotSuppressed,
    /// `O`: obsolete content.
    Obsolete,
    /// `Y`: suppressed by the source.
    Suppressible,
    /// `E`: suppressed by the editors.
    EditorSuppressed,
}

impl SuppressFlag {
    /// Parses a SUPPRESS column value; anything unknown counts as not suppressed.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "O" => Self::Obsolete,
            "Y" => Self::Suppressible,
            "E" => Self::EditorSuppressed,
            _ => Self::NotSuppressed,
        }
    }

    /// Rows flagged `Y` or `O` are excluded from official-name selection.
    pub fn is_suppressed(self) -> bool {
        matches!(self, Self::Obsolete | Self::Suppressible)
    }
}

/// NADAC "Classification for Rate Setting".
///
/// # Examples
///
/// ```
/// use nadac_types::Classification;
///
/// assert_eq!(Classification::from_flag(" b "), Classification::Brand);
/// assert_eq!(Classification::from_flag("G"), Classification::Generic);
/// assert_eq!(Classification::from_flag(""), Classification::Generic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Classification {
    /// `B` or `Brand`: priced as a brand product.
    Brand,
    /// Anything else: priced as a generic product.
    #[default]
    Generic,
}

impl Classification {
    /// Parses the flag column. `B` and `Brand` (any case, trimmed) are brands.
    pub fn from_flag(flag: &str) -> Self {
        let flag = flag.trim();
        if flag.eq_ignore_ascii_case("B") || flag.eq_ignore_ascii_case("Brand") {
            Self::Brand
        } else {
            Self::Generic
        }
    }

    /// Returns true for [`Classification::Brand`].
    pub fn is_brand(self) -> bool {
        self == Self::Brand
    }
}

/// Which side of a brand/generic pair a concept sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum PairRole {
    /// The branded side.
    Brand,
    /// The generic side.
    Generic,
}

impl PairRole {
    /// Tag used in composite search keys and the pair table.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Brand => "BRAND",
            Self::Generic => "GENERIC",
        }
    }
}

/// Display bucket for a dosage form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormCategory {
    /// Capsules whose form mentions delayed or extended release.
    #[cfg_attr(feature = "serde", serde(rename = "Delayed/Extended Release Oral Capsules"))]
    ModifiedReleaseCapsule,
    /// Tablets whose form mentions delayed or extended release.
    #[cfg_attr(feature = "serde", serde(rename = "Delayed/Extended Release Oral Tablets"))]
    ModifiedReleaseTablet,
    /// Exactly "Oral Capsule".
    #[cfg_attr(feature = "serde", serde(rename = "Oral Capsule"))]
    OralCapsule,
    /// Exactly "Oral Tablet".
    #[cfg_attr(feature = "serde", serde(rename = "Oral Tablet"))]
    OralTablet,
    /// Injectables, syringes and cartridges.
    Injection,
    /// Inhalers and inhalation forms.
    Inhalation,
    /// Topical creams, pastes and gels.
    Topical,
    /// Everything else.
    #[default]
    Other,
}

impl FormCategory {
    /// Buckets a dosage form such as `Delayed Release Oral Capsule`.
    ///
    /// Rules are checked in declaration order; the first that applies wins.
    /// `Oral Capsule` and `Oral Tablet` only match exactly.
    ///
    /// # Examples
    ///
    /// ```
    /// use nadac_types::FormCategory;
    ///
    /// assert_eq!(FormCategory::from_form("24 HR Extended Release Oral Tablet"), FormCategory::ModifiedReleaseTablet);
    /// assert_eq!(FormCategory::from_form("Oral Tablet"), FormCategory::OralTablet);
    /// assert_eq!(FormCategory::from_form("Chewable Tablet"), FormCategory::Other);
    /// ```
    pub fn from_form(form: &str) -> Self {
        let form = form.trim();
        if form.is_empty() || form == "Unknown" {
            return Self::Other;
        }

        let lower = form.to_lowercase();
        let has = |needle: &str| lower.contains(needle);
        let modified_release = has("delayed") || has("extended");

        if has("capsule") && modified_release {
            Self::ModifiedReleaseCapsule
        } else if has("tablet") && modified_release {
            Self::ModifiedReleaseTablet
        } else if form == "Oral Capsule" {
            Self::OralCapsule
        } else if form == "Oral Tablet" {
            Self::OralTablet
        } else if has("inject") || has("syringe") || has("cartridge") {
            Self::Injection
        } else if has("inhal") {
            Self::Inhalation
        } else if ["topical", "cream", "paste", "gel"].iter().any(|t| has(t))
            && !["oral", "nasal", "rectal", "vaginal"].iter().any(|t| has(t))
        {
            Self::Topical
        } else {
            Self::Other
        }
    }

    /// Human-readable label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::ModifiedReleaseCapsule => "Delayed/Extended Release Oral Capsules",
            Self::ModifiedReleaseTablet => "Delayed/Extended Release Oral Tablets",
            Self::OralCapsule => "Oral Capsule",
            Self::OralTablet => "Oral Tablet",
            Self::Injection => "Injection",
            Self::Inhalation => "Inhalation",
            Self::Topical => "Topical",
            Self::Other => "Other",
        }
    }
}
