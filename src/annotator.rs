
use itertools::Itertools;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::annotation::PeptideAnnotationRow;
use crate::data_types::peptide::Peptide;
use crate::resolver::ProteinIdTable;
use crate::wildtype::wildtype_column_value;

/// Sorted, deduplicated, comma-joined rendering of a value set
fn join_unique<I: IntoIterator<Item = String>>(values: I) -> String {
    let unique: BTreeSet<String> = values.into_iter().collect();
    unique.into_iter().join(",")
}

/// First logged value of the given metadata key across the contributing variants.
/// Later values of multi-valued keys are intentionally not aggregated here; the
/// context windower consumes the full lists separately.
fn metadata_column_value(peptide: &Peptide, column: &str) -> Option<String> {
    let values: Vec<String> = peptide.contributing_variants().iter()
        .filter_map(|variant| variant.metadata_values(column))
        .filter_map(|values| values.first().cloned())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(join_unique(values))
    }
}

/// Flattens each variant-created peptide into one table row, with every
/// contributing-variant attribute aggregated into a sorted, comma-joined set.
/// # Arguments
/// * `peptides` - the merged variant-created peptides of one sweep length
/// * `protein_ids` - external protein identifiers per base transcript id
/// * `metadata_columns` - the dynamic metadata columns for this run
pub fn annotate_peptides(peptides: &[Peptide], protein_ids: &ProteinIdTable, metadata_columns: &[String]) -> Vec<PeptideAnnotationRow> {
    let mut rows: Vec<PeptideAnnotationRow> = Vec::with_capacity(peptides.len());
    for peptide in peptides.iter() {
        let variants = peptide.contributing_variants();
        let transcripts = peptide.base_transcript_ids();

        let mut ensembl_ids: BTreeSet<String> = BTreeSet::new();
        let mut refseq_ids: BTreeSet<String> = BTreeSet::new();
        let mut uniprot_ids: BTreeSet<String> = BTreeSet::new();
        for transcript_id in transcripts.iter() {
            match protein_ids.get(transcript_id) {
                Some(record) => {
                    ensembl_ids.insert(record.ensembl.clone().unwrap_or_default());
                    refseq_ids.insert(record.refseq.clone().unwrap_or_default());
                    uniprot_ids.insert(record.uniprot.clone().unwrap_or_default());
                },
                None => {
                    warn!("No protein identifiers found for transcript {transcript_id}.");
                    ensembl_ids.insert(String::new());
                    refseq_ids.insert(String::new());
                    uniprot_ids.insert(String::new());
                }
            }
        }

        // coding syntax across every coding of every contributing variant
        let cds_syntax = join_unique(
            variants.iter()
                .flat_map(|v| v.coding().values())
                .map(|syntax| syntax.cds_syntax().to_string())
        );
        let protein_syntax = join_unique(
            variants.iter()
                .flat_map(|v| v.coding().values())
                .map(|syntax| syntax.protein_syntax().to_string())
        );

        let mut metadata: BTreeMap<String, Option<String>> = BTreeMap::new();
        for column in metadata_columns.iter() {
            metadata.insert(column.clone(), metadata_column_value(peptide, column));
        }

        rows.push(PeptideAnnotationRow {
            sequence: peptide.sequence().to_string(),
            chromosomes: join_unique(variants.iter().map(|v| v.chromosome().to_string())),
            positions: join_unique(variants.iter().map(|v| v.position().to_string())),
            genes: join_unique(variants.iter().map(|v| v.gene().to_string())),
            transcripts: transcripts.iter().join(","),
            proteins: ensembl_ids.into_iter().join(","),
            refseq: refseq_ids.into_iter().join(","),
            uniprot: uniprot_ids.into_iter().join(","),
            variant_types: join_unique(variants.iter().map(|v| v.variant_type().to_string())),
            synonymous: join_unique(variants.iter().map(|v| v.is_synonymous().to_string())),
            homozygous: join_unique(variants.iter().map(|v| v.is_homozygous().to_string())),
            cds_syntax,
            protein_syntax,
            metadata,
            wildtype: wildtype_column_value(peptide)
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::peptide::PeptideOrigin;
    use crate::data_types::variant::tests::test_snp;
    use crate::resolver::ProteinIdRecord;

    fn test_peptide() -> Peptide {
        let variant = test_snp("line0_0", "ENST00000256078", 11, "p.Gly12Asp");
        let mut variants = std::collections::BTreeMap::new();
        variants.insert(11, vec![variant]);
        Peptide::new("EYKLVVVGD".to_string(), vec![
            PeptideOrigin::new("ENST00000256078:PEPTIGEN_1".to_string(), 3, variants)
        ])
    }

    fn test_table() -> ProteinIdTable {
        let mut table = ProteinIdTable::new();
        table.insert("ENST00000256078".to_string(), ProteinIdRecord {
            ensembl: Some("ENSP00000256078".to_string()),
            refseq: None,
            uniprot: Some("P01116".to_string())
        });
        table
    }

    #[test]
    fn test_single_variant_row() {
        let rows = annotate_peptides(&[test_peptide()], &test_table(), &["vardbid".to_string()]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.sequence, "EYKLVVVGD");
        assert_eq!(row.chromosomes, "1");
        assert_eq!(row.positions, "1000");
        assert_eq!(row.transcripts, "ENST00000256078");
        assert_eq!(row.proteins, "ENSP00000256078");
        // mapped table entry with an absent refseq id degrades to empty
        assert_eq!(row.refseq, "");
        assert_eq!(row.uniprot, "P01116");
        assert_eq!(row.variant_types, "SNP");
        assert_eq!(row.synonymous, "false");
        assert_eq!(row.homozygous, "false");
        assert_eq!(row.protein_syntax, "p.Gly12Asp");
        // no variant logged the column, so the row carries the absence marker
        assert_eq!(row.metadata.get("vardbid"), Some(&None));
    }

    #[test]
    fn test_unmapped_transcript_degrades_to_empty() {
        let rows = annotate_peptides(&[test_peptide()], &ProteinIdTable::new(), &[]);
        assert_eq!(rows[0].proteins, "");
        assert_eq!(rows[0].uniprot, "");
    }

    #[test]
    fn test_metadata_first_value_only() {
        let mut variant = test_snp("line0_0", "ENST00000256078", 11, "p.Gly12Asp");
        variant.log_metadata_values("DP", &["100".to_string(), "120".to_string()]);
        let mut variants = std::collections::BTreeMap::new();
        variants.insert(11, vec![variant]);
        let peptide = Peptide::new("EYKLVVVGD".to_string(), vec![
            PeptideOrigin::new("ENST00000256078".to_string(), 3, variants)
        ]);
        let rows = annotate_peptides(&[peptide], &test_table(), &["DP".to_string()]);
        // only the first logged value is carried
        assert_eq!(rows[0].metadata.get("DP"), Some(&Some("100".to_string())));
    }

    /// Syntax columns carry every coding of a contributing variant, including
    /// codings on transcripts the peptide itself does not map to
    #[test]
    fn test_syntax_spans_all_codings() {
        use crate::data_types::variant::{MutationSyntax, Variant, VariantType};
        let mut coding = std::collections::BTreeMap::new();
        for (transcript_id, cds, prot) in [
            ("ENST00000256078", "c.32C>A", "p.Ala11Asp"),
            ("ENST00000311936", "c.35C>A", "p.Ala12Asp")
        ] {
            coding.insert(transcript_id.to_string(), MutationSyntax::new(
                transcript_id.to_string(), Some(0), Some(10),
                cds.to_string(), prot.to_string()
            ));
        }
        let variant = Variant::new(
            "line0_0".to_string(), VariantType::Snp, "1".to_string(), 1000,
            "C".to_string(), "A".to_string(), coding,
            false, false, "ENSG00000133703".to_string()
        ).unwrap();
        let mut variants = std::collections::BTreeMap::new();
        variants.insert(10, vec![variant]);
        let peptide = Peptide::new("EYKLVVVGD".to_string(), vec![
            PeptideOrigin::new("ENST00000256078".to_string(), 3, variants)
        ]);
        let rows = annotate_peptides(&[peptide], &test_table(), &[]);
        assert_eq!(rows[0].transcripts, "ENST00000256078");
        assert_eq!(rows[0].cds_syntax, "c.32C>A,c.35C>A");
        assert_eq!(rows[0].protein_syntax, "p.Ala11Asp,p.Ala12Asp");
    }

    #[test]
    fn test_multi_variant_aggregation() {
        let v1 = test_snp("line0_0", "ENST00000256078", 11, "p.Gly12Asp");
        let v2 = test_snp("line1_0", "ENST00000256078", 12, "p.Gly13Cys");
        let mut variants = std::collections::BTreeMap::new();
        variants.insert(11, vec![v1]);
        variants.insert(12, vec![v2]);
        let peptide = Peptide::new("EYKLVVVGDC".to_string(), vec![
            PeptideOrigin::new("ENST00000256078".to_string(), 3, variants)
        ]);
        let rows = annotate_peptides(&[peptide], &test_table(), &[]);
        assert_eq!(rows[0].protein_syntax, "p.Gly12Asp,p.Gly13Cys");
        // identical values collapse
        assert_eq!(rows[0].variant_types, "SNP");
    }
}
