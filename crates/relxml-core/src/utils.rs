/// First letter of every `_`, `-`, `.` or space separated word, lowercased.
///
/// Falls back to `"t"` when the name has no letters to take.
///
/// # Examples
/// ```
/// use relxml_core::utils::initials;
/// assert_eq!(initials("DRUG_LINK"), "dl");
/// assert_eq!(initials("drug"), "d");
/// assert_eq!(initials("__x__y"), "xy");
/// ```
pub fn initials(name: &str) -> String {
    fn is_separator(c: char) -> bool {
        matches!(c, '_' | '-' | '.' | ' ')
    }

    let result: String = name
        .split(is_separator)
        .filter_map(|word| word.chars().find(|c| c.is_ascii_alphabetic()))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if result.is_empty() {
        "t".to_string()
    } else {
        result
    }
}

/// Lowercase every name and join them with `-`.
///
/// # Examples
/// ```
/// use relxml_core::utils::dash_join_lowercase;
/// assert_eq!(dash_join_lowercase(["DRUG_ID", "Seq"]), "drug_id-seq");
/// ```
pub fn dash_join_lowercase<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
