
use rustc_hash::FxHashMap as HashMap;
use lazy_static::lazy_static;
use simple_error::{SimpleError, bail};

lazy_static! {
    /// Three-letter residue code (capitalized) -> one-letter code
    static ref THREE_TO_ONE: HashMap<&'static str, char> = [
        ("Ala", 'A'), ("Arg", 'R'), ("Asn", 'N'), ("Asp", 'D'), ("Cys", 'C'),
        ("Gln", 'Q'), ("Glu", 'E'), ("Gly", 'G'), ("His", 'H'), ("Ile", 'I'),
        ("Leu", 'L'), ("Lys", 'K'), ("Met", 'M'), ("Phe", 'F'), ("Pro", 'P'),
        ("Ser", 'S'), ("Thr", 'T'), ("Trp", 'W'), ("Tyr", 'Y'), ("Val", 'V'),
        ("Sec", 'U'), ("Pyl", 'O'), ("Ter", '*')
    ].iter().cloned().collect();
}

/// Capitalizes a residue code for table lookup: "GLY"/"gly" -> "Gly"
fn capitalize(code: &str) -> String {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new()
    }
}

/// Converts a residue run from mutation syntax into one-letter codes.
/// Accepts either a concatenation of three-letter codes ("GlyAla") or a
/// sequence that is already in one-letter form ("GA"), which passes through
/// uppercased. Three-letter interpretation is tried first.
/// # Arguments
/// * `residues` - the residue run, case-insensitive
/// # Errors
/// * if the run is valid under neither interpretation
pub fn one_letter_sequence(residues: &str) -> Result<String, SimpleError> {
    if residues.is_empty() {
        bail!("empty residue sequence");
    }

    if residues.len() % 3 == 0 {
        let codes: Option<String> = residues.as_bytes()
            .chunks(3)
            .map(|chunk| {
                std::str::from_utf8(chunk).ok()
                    .and_then(|code| THREE_TO_ONE.get(capitalize(code).as_str()))
                    .copied()
            })
            .collect();
        if let Some(converted) = codes {
            return Ok(converted);
        }
    }

    let upper = residues.to_uppercase();
    if upper.chars().all(|c| THREE_TO_ONE.values().any(|&v| v == c)) {
        Ok(upper)
    } else {
        bail!("unrecognized residue sequence: {residues:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_letter_conversion() {
        assert_eq!(one_letter_sequence("Gly").unwrap(), "G");
        assert_eq!(one_letter_sequence("GlyAlaTrp").unwrap(), "GAW");
        assert_eq!(one_letter_sequence("TER").unwrap(), "*");
    }

    #[test]
    fn test_one_letter_passthrough() {
        assert_eq!(one_letter_sequence("G").unwrap(), "G");
        assert_eq!(one_letter_sequence("kras").unwrap(), "KRAS");
    }

    /// A length-3 run that is not a three-letter code still resolves as one-letter codes
    #[test]
    fn test_ambiguous_length_falls_back() {
        assert_eq!(one_letter_sequence("GAW").unwrap(), "GAW");
    }

    #[test]
    fn test_invalid_sequences_rejected() {
        assert!(one_letter_sequence("").is_err());
        assert!(one_letter_sequence("Xyz").is_err());
        assert!(one_letter_sequence("B1").is_err());
    }
}
