//! Attribute extraction from drug display names.
//!
//! Used when the reference tables have no value for a concept. RxNorm names
//! follow a loose `<ingredient> <strength> <form> [<brand>]` shape, e.g.
//! `Acetaminophen 500 MG Oral Tablet [Tylenol]`.

use regex::{Regex, RegexSet};

/// Dosage form phrases recognised in names, as written in RxNorm.
///
/// Matching tries longer phrases first, so `Extended Release Oral Tablet`
/// wins over `Oral Tablet`, which wins over `Tablet`.
const FORM_PHRASES: &[&str] = &[
    "12 HR Extended Release Oral Capsule",
    "12 HR Extended Release Oral Tablet",
    "24 HR Extended Release Oral Capsule",
    "24 HR Extended Release Oral Tablet",
    "Delayed Release Oral Capsule",
    "Delayed Release Oral Tablet",
    "Extended Release Oral Capsule",
    "Extended Release Oral Tablet",
    "Extended Release Oral Suspension",
    "Disintegrating Oral Tablet",
    "Chewable Tablet",
    "Effervescent Oral Tablet",
    "Sublingual Tablet",
    "Buccal Tablet",
    "Oral Capsule",
    "Oral Tablet",
    "Oral Solution",
    "Oral Suspension",
    "Oral Powder",
    "Oral Film",
    "Oral Gel",
    "Injectable Solution",
    "Injectable Suspension",
    "Prefilled Syringe",
    "Auto-Injector",
    "Pen Injector",
    "Cartridge",
    "Metered Dose Inhaler",
    "Dry Powder Inhaler",
    "Inhalation Solution",
    "Inhalation Powder",
    "Inhalation Suspension",
    "Nasal Spray",
    "Nasal Solution",
    "Ophthalmic Solution",
    "Ophthalmic Suspension",
    "Ophthalmic Ointment",
    "Otic Solution",
    "Otic Suspension",
    "Topical Cream",
    "Topical Ointment",
    "Topical Lotion",
    "Topical Gel",
    "Topical Solution",
    "Topical Foam",
    "Topical Spray",
    "Medicated Shampoo",
    "Transdermal System",
    "Rectal Suppository",
    "Rectal Cream",
    "Vaginal Cream",
    "Vaginal Suppository",
    "Vaginal Ring",
    "Tablet",
    "Capsule",
    "Injection",
    "Solution",
    "Suspension",
    "Ointment",
    "Cream",
    "Lotion",
    "Syrup",
    "Powder",
    "Aerosol",
    "Patch",
    "Gel",
    "Kit",
    "Vial",
    "Inhalant",
];

/// Unit, dosage form and route words stripped from names to leave the ingredient.
const INGREDIENT_NOISE_WORDS: &[&str] = &[
    "MG", "MCG", "ML", "GM", "UNIT", "TAB", "CAP", "VIAL", "CAN", "BAR", "HCL", "SULFATE",
    "ACETATE", "POWDER", "SOLUTION", "TABLET", "OINTMENT", "SUSPENSION", "INJECTION", "CAPSULE",
    "CREAM", "LOTION", "SYRUP", "AEROSOL", "PATCH", "GEL", "KIT", "ORAL", "TOPICAL", "PER",
    "ACTUAL", "BASE", "CONCENTRATE", "ELIXIR", "SHAMPOO", "SPRAY", "SUPPOSITORY", "SYRINGE",
    "LIQUID", "OPHTHALMIC", "DROPS", "FOAM",
];

/// Compiled extraction patterns.
///
/// Build once per run and share; matching is read-only.
#[derive(Debug, Clone)]
pub struct NameParser {
    bracket: Regex,
    trailing_bracket: Regex,
    strength: Regex,
    forms: RegexSet,
    form_phrases: Vec<&'static str>,
    numbers: Regex,
    noise_words: Regex,
    whitespace: Regex,
}

impl NameParser {
    /// Compiles all patterns.
    ///
    /// # Errors
    /// Returns the regex error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        let mut form_phrases = FORM_PHRASES.to_vec();
        // Stable sort keeps list order among phrases of equal length.
        form_phrases.sort_by_key(|phrase| std::cmp::Reverse(phrase.len()));

        let forms = RegexSet::new(
            form_phrases
                .iter()
                .map(|phrase| format!(r"(?i)\b{}\b", regex::escape(phrase))),
        )?;

        Ok(Self {
            bracket: Regex::new(r"\[([^\]]+)\]")?,
            trailing_bracket: Regex::new(r"\s*\[[^\]]+\]\s*$")?,
            strength: Regex::new(r"(?i)\d+\.?\d*\s*[A-Z]{1,4}(?:/[A-Z]{1,4})?")?,
            forms,
            form_phrases,
            numbers: Regex::new(r"[\d./]+")?,
            noise_words: Regex::new(&format!(r"(?i)\b(?:{})\b", INGREDIENT_NOISE_WORDS.join("|")))?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// First bracketed segment, e.g. the brand in `... [Tylenol]`.
    pub fn bracketed(&self, name: &str) -> Option<String> {
        self.bracket
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Removes a trailing `[...]` marker.
    pub fn strip_trailing_bracket<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
        self.trailing_bracket.replace(name, "")
    }

    /// First strength-looking token, e.g. `500 MG` or `5 MG/ML`.
    pub fn strength(&self, name: &str) -> Option<String> {
        self.strength.find(name).map(|m| m.as_str().to_string())
    }

    /// Highest ranked dosage form phrase found in the name, in canonical spelling.
    pub fn form(&self, name: &str) -> Option<String> {
        let name = self.strip_trailing_bracket(name);
        self.forms
            .matches(&name)
            .iter()
            .next()
            .map(|index| self.form_phrases[index].to_string())
    }

    /// Best-effort ingredient from a display name.
    ///
    /// Drops the brand marker, numbers, unit and form words; when nothing is
    /// left, the first word of the name is used. The result is title-cased.
    pub fn ingredient(&self, name: &str) -> String {
        let stripped = self.strip_trailing_bracket(name);
        let stripped = self.numbers.replace_all(&stripped, "");
        let stripped = self.noise_words.replace_all(&stripped, "");
        let cleaned = self.whitespace.replace_all(&stripped, " ");
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            title_case(name.trim().split(' ').next().unwrap_or(""))
        } else {
            title_case(cleaned)
        }
    }
}

/// Title-cases words: a letter is upper-cased when it follows a non-letter,
/// lower-cased otherwise.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYLENOL: &str = "Acetaminophen 500 MG Oral Tablet [Tylenol]";

    fn parser() -> NameParser {
        NameParser::new().unwrap()
    }

    #[test]
    fn test_tylenol_name() {
        let parser = parser();
        assert_eq!(parser.bracketed(TYLENOL), Some("Tylenol".to_string()));
        assert_eq!(parser.strength(TYLENOL), Some("500 MG".to_string()));
        assert_eq!(parser.form(TYLENOL), Some("Oral Tablet".to_string()));
        assert_eq!(parser.ingredient(TYLENOL), "Acetaminophen");
    }

    #[test]
    fn test_strength_with_ratio_and_decimal() {
        let parser = parser();
        assert_eq!(
            parser.strength("Amoxicillin 250 MG/ML Oral Suspension"),
            Some("250 MG/ML".to_string())
        );
        assert_eq!(
            parser.strength("Levothyroxine 0.025 MG Oral Tablet"),
            Some("0.025 MG".to_string())
        );
        assert_eq!(parser.strength("Ibuprofen Oral Tablet"), None);
    }

    #[test]
    fn test_form_prefers_longer_phrase() {
        let parser = parser();
        assert_eq!(
            parser.form("Metformin 500 MG 24 HR Extended Release Oral Tablet"),
            Some("24 HR Extended Release Oral Tablet".to_string())
        );
        assert_eq!(
            parser.form("omeprazole 20 mg delayed release oral capsule"),
            Some("Delayed Release Oral Capsule".to_string())
        );
        assert_eq!(parser.form("HUMIRA PEN KIT"), Some("Kit".to_string()));
    }

    #[test]
    fn test_form_requires_word_boundary() {
        let parser = parser();
        assert_eq!(parser.form("Gelatin Powderless"), None);
        assert_eq!(parser.form(""), None);
    }

    #[test]
    fn test_form_ignores_brand_marker() {
        let parser = parser();
        assert_eq!(parser.form("Calcitriol 0.003 MG/ML [Gel Labs]"), None);
    }

    #[test]
    fn test_ingredient_cleanup_of_nadac_description() {
        let parser = parser();
        assert_eq!(parser.ingredient("AMOXICILLIN 500 MG CAPSULE"), "Amoxicillin");
        assert_eq!(
            parser.ingredient("METFORMIN HCL 500 MG TABLET"),
            "Metformin"
        );
    }

    #[test]
    fn test_ingredient_falls_back_to_first_word() {
        let parser = parser();
        assert_eq!(parser.ingredient("TABLET 10 MG"), "Tablet");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ACETAMINOPHEN"), "Acetaminophen");
        assert_eq!(title_case("insulin glargine"), "Insulin Glargine");
        assert_eq!(title_case("o'brien-smith"), "O'Brien-Smith");
        assert_eq!(title_case(""), "");
    }
}
