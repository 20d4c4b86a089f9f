
use bio::io::fasta;
use itertools::Itertools;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::data_types::annotation::PeptideAnnotationRow;
use crate::data_types::mutated_protein::MutatedProtein;

/// One flank-extended subsequence around a cluster of co-occurring variants
#[derive(Clone, Debug, PartialEq)]
pub struct ContextWindow {
    /// the mutated subsequence, flanks included
    pub sequence: String,
    /// CDS notations of the variants in the cluster
    pub cds_details: String,
    /// protein notations of the variants in the cluster
    pub protein_details: String,
    /// consequence terms of the variants in the cluster
    pub consequences: String
}

/// The per-transcript context assembled for FASTA output
#[derive(Clone, Debug, Default)]
pub struct TranscriptContext {
    /// full wildtype sequence, present when the resolver enumerated one
    pub wildtype_sequence: Option<String>,
    /// flank-extended windows, one per valid cluster per enumeration
    pub windows: Vec<ContextWindow>,
    /// gene ids attached to this transcript
    pub gene_ids: String,
    /// Ensembl protein ids attached to this transcript
    pub protein_ids: String,
    /// UniProt ids attached to this transcript
    pub uniprot_ids: String
}

/// Sorted, deduplicated join of the comma-separated fragments in the given values
fn unique_join<'a, I: IntoIterator<Item = &'a str>>(values: I) -> String {
    let unique: BTreeSet<&str> = values.into_iter()
        .flat_map(|value| value.split(','))
        .filter(|fragment| !fragment.is_empty())
        .collect();
    unique.into_iter().join(",")
}

/// Groups the resolved proteins by base transcript and cuts one flank-extended
/// window per mutated enumeration whose variants cluster tightly enough.
/// A cluster is valid when every pair of variant positions lies within
/// `flanking_region_size` of each other; enumerations with looser clusters are
/// skipped. Wildtype enumerations contribute the full wildtype sequence instead.
/// # Arguments
/// * `proteins` - the resolved protein set
/// * `rows` - the annotated peptide rows, mined for per-transcript identifiers
/// * `flanking_region_size` - residues kept on each side of the cluster
pub fn build_context_map(proteins: &[MutatedProtein], rows: &[PeptideAnnotationRow], flanking_region_size: usize) -> BTreeMap<String, TranscriptContext> {
    let mut contexts: BTreeMap<String, TranscriptContext> = BTreeMap::new();

    for protein in proteins.iter() {
        let context = contexts.entry(protein.base_transcript_id().to_string()).or_default();
        if !protein.has_variants() {
            context.wildtype_sequence = Some(protein.sequence().to_string());
            continue;
        }

        // collect (position, cds, protein, consequence) over every coding of every applied variant
        let mut details: Vec<(usize, String, String, String)> = vec![];
        for variants in protein.variants().values() {
            for variant in variants.iter() {
                let consequence = variant.metadata_values("consequence")
                    .and_then(|values| values.first().cloned())
                    .unwrap_or_default();
                for syntax in variant.coding().values() {
                    let Some(position) = syntax.protein_position() else {
                        continue;
                    };
                    details.push((
                        position,
                        syntax.cds_syntax().to_string(),
                        syntax.protein_syntax().to_string(),
                        consequence.clone()
                    ));
                }
            }
        }
        if details.is_empty() {
            continue;
        }
        details.sort_by_key(|(position, _, _, _)| *position);

        let clustered = details.iter()
            .tuple_combinations()
            .all(|((p1, _, _, _), (p2, _, _, _))| p1.abs_diff(*p2) <= flanking_region_size);
        if !clustered {
            debug!(
                "Variants on {} spread too far apart for a context window; skipping.",
                protein.transcript_id()
            );
            continue;
        }

        let min_position = details[0].0;
        let max_position = details[details.len() - 1].0;
        let start = min_position.saturating_sub(flanking_region_size);
        let end = (max_position + flanking_region_size).min(protein.len());
        let sequence = protein.sequence().get(start..end).unwrap_or_default().to_string();
        if sequence.is_empty() {
            continue;
        }

        context.windows.push(ContextWindow {
            sequence,
            cds_details: unique_join(details.iter().map(|(_, cds, _, _)| cds.as_str())),
            protein_details: unique_join(details.iter().map(|(_, _, prot, _)| prot.as_str())),
            consequences: unique_join(details.iter().map(|(_, _, _, cons)| cons.as_str()))
        });
    }

    // attach per-transcript identifiers mined from the table rows
    for (transcript_id, context) in contexts.iter_mut() {
        let matching: Vec<&PeptideAnnotationRow> = rows.iter()
            .filter(|row| row.transcripts == *transcript_id)
            .collect();
        context.gene_ids = unique_join(matching.iter().map(|row| row.genes.as_str()));
        context.protein_ids = unique_join(matching.iter().map(|row| row.proteins.as_str()));
        context.uniprot_ids = unique_join(matching.iter().map(|row| row.uniprot.as_str()));
    }

    contexts
}

/// Writes the context map as FASTA: one wildtype record per transcript that has a
/// wildtype sequence, followed by its numbered mutated windows.
/// # Arguments
/// * `filename` - output FASTA path
/// * `contexts` - the assembled per-transcript contexts
/// # Errors
/// * if the file does not open or a record fails to write
pub fn write_context_fasta(filename: &Path, contexts: &BTreeMap<String, TranscriptContext>) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(filename)?;
    let mut writer = fasta::Writer::new(BufWriter::new(file));

    for (transcript_id, context) in contexts.iter() {
        // UniProt takes precedence as the display id when mapped
        let display = if context.uniprot_ids.is_empty() {
            transcript_id.as_str()
        } else {
            context.uniprot_ids.as_str()
        };
        let middle = format!(
            "{}|{}|{}|{}",
            context.gene_ids, transcript_id, context.protein_ids, context.uniprot_ids
        );

        if let Some(wildtype) = context.wildtype_sequence.as_ref() {
            let id = format!("epi|{display}_wt|{middle}");
            writer.write(&id, None, wildtype.as_bytes())?;
        }
        for (index, window) in context.windows.iter().enumerate() {
            let id = format!(
                "epi|{display}_mut_{}|{middle}|{}|{}|{}",
                index + 1, window.consequences, window.cds_details, window.protein_details
            );
            writer.write(&id, None, window.sequence.as_bytes())?;
        }
    }
    Ok(())
}
