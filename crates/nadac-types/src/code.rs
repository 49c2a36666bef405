//! External product code canonicalization.
//!
//! NADAC publishes NDCs as 11-digit strings while RXNSAT carries them in
//! whatever shape the source used (`0093-4100-01`, `00093410001`, ...). Both
//! sides must go through [`canonicalize_code`] before any lookup.

/// Width every canonical code is left-padded to.
pub const CODE_WIDTH: usize = 11;

/// Canonicalizes an external code: drops every non-alphanumeric character
/// (dashes, spaces, dots) and left-pads with zeros to [`CODE_WIDTH`].
///
/// Codes already longer than the width are returned unpadded. An input with
/// no alphanumeric characters yields an empty string, which never matches.
///
/// # Examples
///
/// ```
/// use nadac_types::canonicalize_code;
///
/// assert_eq!(canonicalize_code("0093-4100-01"), "00093410001");
/// assert_eq!(canonicalize_code(" 00093410001 "), "00093410001");
/// assert_eq!(canonicalize_code("--"), "");
/// ```
pub fn canonicalize_code(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if stripped.is_empty() {
        return stripped;
    }
    format!("{:0>width$}", stripped, width = CODE_WIDTH)
}
