
use log::{info, warn};
use rustc_hash::FxHashMap as HashMap;
use std::collections::BTreeMap;

use crate::annotator::annotate_peptides;
use crate::data_types::annotation::PeptideAnnotationRow;
use crate::data_types::mutated_protein::MutatedProtein;
use crate::data_types::peptide::{Peptide, PeptideKey};
use crate::data_types::variant::Variant;
use crate::resolver::{ProteinIdTable, ProteinResolver};

/// Collapses identical windows from distinct source proteins into one peptide each,
/// preserving first-occurrence order
fn merge_peptides(peptides: Vec<Peptide>) -> Vec<Peptide> {
    let mut by_key: HashMap<PeptideKey, usize> = Default::default();
    let mut merged: Vec<Peptide> = vec![];
    for peptide in peptides.into_iter() {
        match by_key.get(&peptide.key()) {
            Some(&index) => merged[index].merge(peptide),
            None => {
                by_key.insert(peptide.key(), merged.len());
                merged.push(peptide);
            }
        }
    }
    merged
}

/// Runs the full peptide sweep: resolve the proteins once, then for every length in
/// `[min_length, max_length]` generate all windows, keep the variant-created ones,
/// merge duplicates, and annotate them into table rows.
/// # Arguments
/// * `resolver` - the protein resolver seam
/// * `variants` - the guarded canonical variants
/// * `protein_ids` - external protein identifiers per base transcript id
/// * `metadata_columns` - the dynamic metadata columns for this run
/// * `min_length` - shortest window length, inclusive
/// * `max_length` - longest window length, inclusive
/// # Errors
/// * if the resolver fails
pub fn generate_peptides_from_variants(
    resolver: &dyn ProteinResolver, variants: &[Variant], protein_ids: &ProteinIdTable,
    metadata_columns: &[String], min_length: usize, max_length: usize
) -> Result<(Vec<PeptideAnnotationRow>, Vec<MutatedProtein>), Box<dyn std::error::Error>> {
    let proteins = resolver.resolve(variants)?;
    info!("Resolved {} protein sequences.", proteins.len());

    let mut rows: Vec<PeptideAnnotationRow> = vec![];
    for length in min_length..=max_length {
        let windows = resolver.generate_windows(&proteins, length);
        info!("Generated {} peptides of length {length}.", windows.len());

        let created: Vec<Peptide> = windows.into_iter()
            .filter(|peptide| peptide.is_created_by_variant())
            .collect();
        let merged = merge_peptides(created);
        info!("{} variant-created peptides of length {length} after merging.", merged.len());
        if merged.is_empty() {
            continue;
        }
        rows.extend(annotate_peptides(&merged, protein_ids, metadata_columns));
    }

    if rows.is_empty() {
        warn!("No mutated peptides found.");
    }
    Ok((rows, proteins))
}

/// Drops rows whose sequence also occurs verbatim in the reference proteome,
/// keeping only the truly novel peptides.
/// # Arguments
/// * `rows` - the annotated peptide rows
/// * `proteome` - reference protein sequences keyed by record id
pub fn filter_reference_proteome(rows: Vec<PeptideAnnotationRow>, proteome: &BTreeMap<String, String>) -> Vec<PeptideAnnotationRow> {
    let before = rows.len();
    let novel: Vec<PeptideAnnotationRow> = rows.into_iter()
        .filter(|row| !proteome.values().any(|sequence| sequence.contains(&row.sequence)))
        .collect();
    info!("Filtered {} peptides present in the reference proteome.", before - novel.len());
    novel
}
