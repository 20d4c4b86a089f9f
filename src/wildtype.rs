
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::data_types::peptide::{Peptide, PeptideOrigin};
use crate::data_types::variant::VariantType;
use crate::util::amino_acid::one_letter_sequence;

lazy_static! {
    /// "Gly12Asp" style substitution body: wildtype residues, position, mutant residues
    static ref SUBSTITUTION_REGEX: Regex = Regex::new(r"^(?<wt>[A-Za-z]+)(?<pos>[0-9]+)(?<mut>[A-Za-z]+)").unwrap();
    /// "Lys45del" style deletion body: deleted residues and their position
    static ref DELETION_REGEX: Regex = Regex::new(r"^(?<wt>[A-Za-z]+)(?<pos>[0-9]+)").unwrap();
}

/// Outcome of reversing the mutations within one peptide window. `Unavailable` is
/// an ordinary value, not an error: frameshifts and insertions have no positionally
/// stable wildtype counterpart within a fixed window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WildtypeResult {
    /// a fully reconstructed wildtype window
    Sequence(String),
    /// reconstruction is not possible for this window
    Unavailable
}

/// Reverse-applies the mutation syntax of every variant in one origin to recover
/// the wildtype window. Returns None when the origin carries no variants.
/// # Arguments
/// * `sequence` - the mutated window sequence
/// * `origin` - the source-protein origin whose variants are to be reversed
pub fn reconstruct_origin_wildtype(sequence: &str, origin: &PeptideOrigin) -> Option<WildtypeResult> {
    if !origin.has_variants() {
        return None;
    }

    // cells instead of chars so a deletion can restore multiple residues at one slot
    let mut cells: Vec<String> = sequence.chars().map(|c| c.to_string()).collect();
    for (&position, variants) in origin.variants().iter() {
        let Some(relative) = position.checked_sub(origin.start()) else {
            return Some(WildtypeResult::Unavailable);
        };
        for variant in variants.iter() {
            if variant.variant_type().is_frameshift() || variant.variant_type() == VariantType::Unknown {
                return Some(WildtypeResult::Unavailable);
            }
            let Some(syntax) = variant.coding().get(origin.base_transcript_id()) else {
                return Some(WildtypeResult::Unavailable);
            };
            // "p.Gly12Asp" -> "Gly12Asp"
            let body = match syntax.protein_syntax().split_once('.') {
                Some((_, body)) => body,
                None => syntax.protein_syntax()
            };
            if body.contains('?') {
                return Some(WildtypeResult::Unavailable);
            }

            match variant.variant_type() {
                VariantType::Del => {
                    let Some(captures) = DELETION_REGEX.captures(body) else {
                        return Some(WildtypeResult::Unavailable);
                    };
                    let Ok(wildtype) = one_letter_sequence(&captures["wt"]) else {
                        return Some(WildtypeResult::Unavailable);
                    };
                    // restore the deleted residues in front of the residue at the slot
                    match cells.get_mut(relative) {
                        Some(cell) => *cell = format!("{wildtype}{cell}"),
                        None => return Some(WildtypeResult::Unavailable)
                    }
                },
                VariantType::Ins => {
                    // removing inserted residues would shift the window frame
                    return Some(WildtypeResult::Unavailable);
                },
                _ => {
                    let Some(captures) = SUBSTITUTION_REGEX.captures(body) else {
                        return Some(WildtypeResult::Unavailable);
                    };
                    let Ok(wildtype) = one_letter_sequence(&captures["wt"]) else {
                        return Some(WildtypeResult::Unavailable);
                    };
                    match cells.get_mut(relative) {
                        Some(cell) => *cell = wildtype,
                        None => return Some(WildtypeResult::Unavailable)
                    }
                }
            }
        }
    }
    Some(WildtypeResult::Sequence(cells.concat()))
}

/// Aggregates the wildtype reconstructions across all origins of a peptide into
/// one sorted, comma-joined column value. Returns None when no origin produced a
/// usable sequence.
pub fn wildtype_column_value(peptide: &Peptide) -> Option<String> {
    let sequences: BTreeSet<String> = peptide.origins().iter()
        .filter_map(|origin| reconstruct_origin_wildtype(peptide.sequence(), origin))
        .filter_map(|result| match result {
            WildtypeResult::Sequence(sequence) => Some(sequence),
            WildtypeResult::Unavailable => None
        })
        .collect();
    if sequences.is_empty() {
        None
    } else {
        Some(sequences.into_iter().collect::<Vec<String>>().join(","))
    }
}
