
use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use crate::combinatorics::apply_combinatorics_guard;
use crate::data_types::annotation::PeptideAnnotationRow;
use crate::data_types::mutated_protein::MutatedProtein;
use crate::data_types::variant_record::VariantCallSet;
use crate::peptide_sweep::{filter_reference_proteome, generate_peptides_from_variants};
use crate::resolver::ProteinResolver;
use crate::variant_reader::read_variants;

/// Everything the pipeline produces in one run
#[derive(Debug, Default)]
pub struct PipelineResult {
    /// the annotated peptide rows, all sweep lengths concatenated
    pub rows: Vec<PeptideAnnotationRow>,
    /// the resolved protein set, kept for FASTA context output
    pub proteins: Vec<MutatedProtein>,
    /// the dynamic metadata columns observed in this run
    pub metadata_columns: Vec<String>
}

/// Runs variant reading, the combinatorics guard, protein resolution, the peptide
/// sweep, and the optional reference-proteome filter, in that order.
/// # Arguments
/// * `call_set` - the structured variant records
/// * `resolver` - the protein resolver seam
/// * `proteome` - optional reference proteome; peptides found in it are dropped
/// * `min_length` - shortest peptide length, inclusive
/// * `max_length` - longest peptide length, inclusive
/// * `max_transcript_variants` - combinatorics guard threshold
/// # Errors
/// * if variant reading or the resolver fails
pub fn run_peptide_generation(
    call_set: &VariantCallSet, resolver: &dyn ProteinResolver,
    proteome: Option<&BTreeMap<String, String>>,
    min_length: usize, max_length: usize, max_transcript_variants: usize
) -> Result<PipelineResult, Box<dyn std::error::Error>> {
    let parsed = read_variants(call_set)?;
    info!(
        "Parsed {} variants across {} annotations ({} identifiers).",
        parsed.variants.len(), parsed.transcript_ids.len(), parsed.identifier_system
    );
    if parsed.variants.is_empty() {
        warn!("No usable variants found, no peptides will be generated.");
        return Ok(PipelineResult::default());
    }

    let transcript_ids: Vec<String> = parsed.transcript_ids.iter()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();
    let variants = apply_combinatorics_guard(parsed.variants, max_transcript_variants);
    let protein_ids = resolver.protein_ids(&transcript_ids)?;

    let (rows, proteins) = generate_peptides_from_variants(
        resolver, &variants, &protein_ids, &parsed.metadata_columns, min_length, max_length
    )?;
    let rows = match proteome {
        Some(proteome) => filter_reference_proteome(rows, proteome),
        None => rows
    };

    Ok(PipelineResult {
        rows,
        proteins,
        metadata_columns: parsed.metadata_columns
    })
}

/// Writes the annotated peptide rows as a tab-delimited table
/// # Arguments
/// * `filename` - output TSV path
/// * `rows` - the annotated rows
/// * `metadata_columns` - the dynamic metadata columns for this run
/// * `peptide_column` - the user-facing name of the sequence column
/// # Errors
/// * if the file does not open or a record fails to write
pub fn write_peptide_table(
    filename: &Path, rows: &[PeptideAnnotationRow],
    metadata_columns: &[String], peptide_column: &str
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(filename)?;
    writer.write_record(PeptideAnnotationRow::header(metadata_columns, peptide_column))?;
    for row in rows.iter() {
        writer.write_record(row.to_record(metadata_columns))?;
    }
    writer.flush()?;
    Ok(())
}

/// Creates the declared outputs as empty files so downstream steps see a
/// consistent file set even when nothing was generated
/// # Arguments
/// * `table_filename` - the TSV path
/// * `fasta_filename` - the FASTA path, when FASTA output was requested
/// # Errors
/// * if a file does not create
pub fn write_empty_outputs(table_filename: &Path, fasta_filename: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    File::create(table_filename)?;
    if let Some(fasta_filename) = fasta_filename {
        File::create(fasta_filename)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_window::{build_context_map, write_context_fasta};
    use crate::data_types::mutated_protein::MutatedProteinRecord;
    use crate::data_types::variant_record::VariantRecord;
    use crate::resolver::{FileResolver, ProteinIdRecord, ProteinIdTable, ResolverResponse};
    use crate::variant_reader::SNPEFF_KEY;
    use tempfile::NamedTempFile;

    fn test_call_set() -> VariantCallSet {
        let annotation = [
            "D", "missense_variant", "MODERATE", "KRAS", "ENSG00000133703", "transcript",
            "ENST00000256078", "2", "6", "c.32C>A", "p.Ala11Asp", "32", "32", "11", "0", ""
        ].join("|");
        let mut info = BTreeMap::new();
        info.insert(SNPEFF_KEY.to_string(), vec![annotation]);
        info.insert("HOM".to_string(), vec!["1".to_string()]);
        VariantCallSet {
            vep_format: None,
            info_keys: vec![SNPEFF_KEY.to_string(), "HOM".to_string()],
            format_keys: vec![],
            records: vec![VariantRecord {
                chromosome: "chr12".to_string(),
                position: 25398284,
                id: Some("rs121913529".to_string()),
                reference: "C".to_string(),
                alternates: vec!["A".to_string()],
                filters: vec![],
                info,
                samples: vec![]
            }]
        }
    }

    fn test_resolver() -> FileResolver {
        let mut variant_positions = BTreeMap::new();
        variant_positions.insert(10, vec!["line0_0".to_string()]);
        let mut protein_ids = ProteinIdTable::new();
        protein_ids.insert("ENST00000256078".to_string(), ProteinIdRecord {
            ensembl: Some("ENSP00000256078".to_string()),
            refseq: None,
            uniprot: Some("P01116".to_string())
        });
        FileResolver::new(ResolverResponse {
            proteins: vec![
                MutatedProteinRecord {
                    transcript_id: "ENST00000256078".to_string(),
                    gene_id: "ENSG00000133703".to_string(),
                    sequence: "MTEYKLVVVGA".to_string(),
                    variant_positions: BTreeMap::new()
                },
                MutatedProteinRecord {
                    transcript_id: "ENST00000256078:PEPTIGEN_1".to_string(),
                    gene_id: "ENSG00000133703".to_string(),
                    sequence: "MTEYKLVVVGD".to_string(),
                    variant_positions
                }
            ],
            protein_ids
        })
    }

    #[test]
    fn test_end_to_end_single_snp() {
        let resolver = test_resolver();
        let result = run_peptide_generation(&test_call_set(), &resolver, None, 9, 9, 10).unwrap();
        assert_eq!(result.rows.len(), 1);

        let row = &result.rows[0];
        assert_eq!(row.sequence, "EYKLVVVGD");
        assert_eq!(row.chromosomes, "12");
        assert_eq!(row.positions, "25398284");
        assert_eq!(row.transcripts, "ENST00000256078");
        assert_eq!(row.proteins, "ENSP00000256078");
        assert_eq!(row.uniprot, "P01116");
        assert_eq!(row.variant_types, "SNP");
        assert_eq!(row.homozygous, "true");
        assert_eq!(row.cds_syntax, "c.32C>A");
        assert_eq!(row.protein_syntax, "p.Ala11Asp");
        assert_eq!(row.metadata.get("vardbid"), Some(&Some("rs121913529".to_string())));
        assert_eq!(row.wildtype.as_deref(), Some("EYKLVVVGA"));

        // one transcript context: the full wildtype plus one mutated window
        let contexts = build_context_map(&result.proteins, &result.rows, 25);
        assert_eq!(contexts.len(), 1);
        let context = contexts.get("ENST00000256078").unwrap();
        assert_eq!(context.wildtype_sequence.as_deref(), Some("MTEYKLVVVGA"));
        assert_eq!(context.windows.len(), 1);
        assert_eq!(context.windows[0].sequence, "MTEYKLVVVGD");
        assert_eq!(context.uniprot_ids, "P01116");
    }

    #[test]
    fn test_empty_call_set_short_circuits() {
        let resolver = test_resolver();
        let result = run_peptide_generation(&VariantCallSet::default(), &resolver, None, 9, 9, 10).unwrap();
        assert!(result.rows.is_empty());
        assert!(result.proteins.is_empty());
    }

    #[test]
    fn test_proteome_filter_in_pipeline() {
        let resolver = test_resolver();
        let mut proteome = BTreeMap::new();
        proteome.insert("known".to_string(), "MTEYKLVVVGD".to_string());
        let result = run_peptide_generation(&test_call_set(), &resolver, Some(&proteome), 9, 9, 10).unwrap();
        // the lone mutated peptide is already in the reference proteome
        assert!(result.rows.is_empty());
    }

    #[test]
    fn test_table_output() {
        let resolver = test_resolver();
        let result = run_peptide_generation(&test_call_set(), &resolver, None, 9, 9, 10).unwrap();

        let output = NamedTempFile::new().unwrap();
        write_peptide_table(output.path(), &result.rows, &result.metadata_columns, "sequence").unwrap();
        let written = std::fs::read_to_string(output.path()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("sequence\tchr\tpos\tgene\t"));
        assert!(lines[0].ends_with("\twildtype"));
        assert!(lines[1].starts_with("EYKLVVVGD\t12\t25398284\t"));
        assert!(lines[1].ends_with("\tEYKLVVVGA"));
    }

    /// Two runs over identical input write byte-identical outputs
    #[test]
    fn test_repeated_runs_identical_outputs() {
        let resolver = test_resolver();
        let mut outputs: Vec<(Vec<u8>, Vec<u8>)> = vec![];
        for _ in 0..2 {
            let result = run_peptide_generation(&test_call_set(), &resolver, None, 8, 11, 10).unwrap();

            let table = NamedTempFile::new().unwrap();
            write_peptide_table(table.path(), &result.rows, &result.metadata_columns, "sequence").unwrap();

            let fasta = NamedTempFile::new().unwrap();
            let contexts = build_context_map(&result.proteins, &result.rows, 25);
            write_context_fasta(fasta.path(), &contexts).unwrap();

            outputs.push((
                std::fs::read(table.path()).unwrap(),
                std::fs::read(fasta.path()).unwrap()
            ));
        }
        assert!(!outputs[0].0.is_empty());
        assert!(!outputs[0].1.is_empty());
        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn test_empty_outputs() {
        let table = NamedTempFile::new().unwrap();
        let fasta = NamedTempFile::new().unwrap();
        write_empty_outputs(table.path(), Some(fasta.path())).unwrap();
        assert_eq!(std::fs::metadata(table.path()).unwrap().len(), 0);
        assert_eq!(std::fs::metadata(fasta.path()).unwrap().len(), 0);
    }
}
