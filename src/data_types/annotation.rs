
use std::collections::BTreeMap;

/// Rendering of an absent aggregate in the peptide table. Distinct from an empty
/// string, which is what a present-but-unmapped identifier degrades to.
pub const NOT_AVAILABLE: &str = "NA";

/// One output row of the peptide table: the window sequence plus every
/// contributing-variant attribute flattened into sorted, comma-joined sets.
#[derive(Clone, Debug, PartialEq)]
pub struct PeptideAnnotationRow {
    /// the peptide sequence
    pub sequence: String,
    /// chromosomes of the contributing variants
    pub chromosomes: String,
    /// genomic positions of the contributing variants
    pub positions: String,
    /// gene ids of the contributing variants
    pub genes: String,
    /// base transcript ids the peptide maps back to
    pub transcripts: String,
    /// external protein ids (Ensembl); empty when no mapping is available
    pub proteins: String,
    /// external protein ids (RefSeq); empty when no mapping is available
    pub refseq: String,
    /// external protein ids (UniProt); empty when no mapping is available
    pub uniprot: String,
    /// variant types of the contributing variants
    pub variant_types: String,
    /// synonymous flags of the contributing variants
    pub synonymous: String,
    /// zygosity flags of the contributing variants
    pub homozygous: String,
    /// CDS-level mutation notations across all codings
    pub cds_syntax: String,
    /// protein-level mutation notations across all codings
    pub protein_syntax: String,
    /// dynamic per-run metadata columns; None means no contributing variant carried the key
    pub metadata: BTreeMap<String, Option<String>>,
    /// reconstructed wildtype sequences; None when no reconstruction was possible
    pub wildtype: Option<String>
}

impl PeptideAnnotationRow {
    /// The column header for the peptide table
    /// # Arguments
    /// * `metadata_columns` - the sorted dynamic metadata column names for this run
    /// * `peptide_column` - the user-facing name of the sequence column
    pub fn header(metadata_columns: &[String], peptide_column: &str) -> Vec<String> {
        let mut header: Vec<String> = vec![
            peptide_column.to_string(),
            "chr".to_string(),
            "pos".to_string(),
            "gene".to_string(),
            "transcripts".to_string(),
            "proteins".to_string(),
            "refseq".to_string(),
            "uniprot".to_string(),
            "variant type".to_string(),
            "synonymous".to_string(),
            "homozygous".to_string(),
            "variant_details_gene".to_string(),
            "variant_details_protein".to_string()
        ];
        header.extend(metadata_columns.iter().cloned());
        header.push("wildtype".to_string());
        header
    }

    /// Renders this row in header order, with absent values written as NA
    /// # Arguments
    /// * `metadata_columns` - must match the columns used to build the header
    pub fn to_record(&self, metadata_columns: &[String]) -> Vec<String> {
        let mut record: Vec<String> = vec![
            self.sequence.clone(),
            self.chromosomes.clone(),
            self.positions.clone(),
            self.genes.clone(),
            self.transcripts.clone(),
            self.proteins.clone(),
            self.refseq.clone(),
            self.uniprot.clone(),
            self.variant_types.clone(),
            self.synonymous.clone(),
            self.homozygous.clone(),
            self.cds_syntax.clone(),
            self.protein_syntax.clone()
        ];
        for column in metadata_columns.iter() {
            let value = self.metadata.get(column)
                .and_then(|v| v.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            record.push(value);
        }
        record.push(self.wildtype.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_row() -> PeptideAnnotationRow {
        PeptideAnnotationRow {
            sequence: "EYKLVVVGD".to_string(),
            chromosomes: "12".to_string(),
            positions: "25398284".to_string(),
            genes: "ENSG00000133703".to_string(),
            transcripts: "ENST00000256078".to_string(),
            proteins: "ENSP00000256078".to_string(),
            refseq: "".to_string(),
            uniprot: "P01116".to_string(),
            variant_types: "SNP".to_string(),
            synonymous: "false".to_string(),
            homozygous: "true".to_string(),
            cds_syntax: "c.35G>A".to_string(),
            protein_syntax: "p.Gly12Asp".to_string(),
            metadata: BTreeMap::new(),
            wildtype: None
        }
    }

    #[test]
    fn test_header_record_alignment() {
        let metadata_columns = vec!["DP".to_string(), "vardbid".to_string()];
        let header = PeptideAnnotationRow::header(&metadata_columns, "sequence");
        let mut row = test_row();
        row.metadata.insert("vardbid".to_string(), Some("rs121913529".to_string()));
        row.metadata.insert("DP".to_string(), None);
        let record = row.to_record(&metadata_columns);
        assert_eq!(header.len(), record.len());
        assert_eq!(header[0], "sequence");
        assert_eq!(record[0], "EYKLVVVGD");
        // absent metadata and wildtype render as NA, unmapped refseq stays empty
        assert_eq!(record[header.iter().position(|h| h == "DP").unwrap()], NOT_AVAILABLE);
        assert_eq!(record[header.iter().position(|h| h == "vardbid").unwrap()], "rs121913529");
        assert_eq!(record[header.iter().position(|h| h == "refseq").unwrap()], "");
        assert_eq!(record.last().unwrap(), NOT_AVAILABLE);
    }

    #[test]
    fn test_renamed_peptide_column() {
        let header = PeptideAnnotationRow::header(&[], "mut_peptide");
        assert_eq!(header[0], "mut_peptide");
        assert_eq!(header.last().unwrap(), "wildtype");
    }
}
