
use serde::Serialize;
use simple_error::{SimpleError, bail};
use std::collections::BTreeMap;

/// Enum for the classes of genomic alteration we track
#[derive(Clone, Copy, Debug, strum_macros::Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum VariantType {
    /// Single-base substitution
    #[strum(serialize = "SNP")]
    Snp,
    /// In-frame deletion
    #[strum(serialize = "DEL")]
    Del,
    /// In-frame insertion
    #[strum(serialize = "INS")]
    Ins,
    /// Frameshift deletion
    #[strum(serialize = "FSDEL")]
    FsDel,
    /// Frameshift insertion
    #[strum(serialize = "FSINS")]
    FsIns,
    /// Anything we could not classify
    #[strum(serialize = "UNKNOWN")]
    Unknown
}

impl VariantType {
    /// Returns true if this type shifts the reading frame
    pub fn is_frameshift(&self) -> bool {
        matches!(self, VariantType::FsDel | VariantType::FsIns)
    }
}

/// Per-transcript coding description of a variant's effect
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct MutationSyntax {
    /// the transcript this syntax belongs to
    transcript_id: String,
    /// 0-based position within the coding sequence, if resolvable
    cds_position: Option<usize>,
    /// 0-based position within the protein, if resolvable
    protein_position: Option<usize>,
    /// CDS-level notation, e.g. "c.123A>T"
    cds_syntax: String,
    /// protein-level notation, e.g. "p.Lys41Asn"
    protein_syntax: String
}

impl MutationSyntax {
    /// Basic constructor
    pub fn new(transcript_id: String, cds_position: Option<usize>, protein_position: Option<usize>, cds_syntax: String, protein_syntax: String) -> MutationSyntax {
        MutationSyntax {
            transcript_id,
            cds_position,
            protein_position,
            cds_syntax,
            protein_syntax
        }
    }

    // getters
    pub fn transcript_id(&self) -> &str {
        &self.transcript_id
    }

    pub fn cds_position(&self) -> Option<usize> {
        self.cds_position
    }

    pub fn protein_position(&self) -> Option<usize> {
        self.protein_position
    }

    pub fn cds_syntax(&self) -> &str {
        &self.cds_syntax
    }

    pub fn protein_syntax(&self) -> &str {
        &self.protein_syntax
    }
}

/// Explicit identity key for a variant, used for deduplication.
/// Two variants are the same iff they share genomic position, type, alleles, and transcript set.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VariantKey {
    /// chromosome of the variant
    chromosome: String,
    /// 1-based genomic position
    position: u64,
    /// the classified type
    variant_type: VariantType,
    /// ref allele
    reference: String,
    /// alt allele
    alternate: String,
    /// sorted transcript ids from the coding map
    transcripts: Vec<String>
}

/// A single genomic alteration with one or more transcript-level coding consequences.
/// Immutable after construction apart from metadata logging.
#[derive(Clone, Debug, Serialize)]
pub struct Variant {
    /// stable identifier, unique per (record, alternate allele)
    id: String,
    /// the classified variant type
    variant_type: VariantType,
    /// chromosome of the variant, "chr" prefix stripped
    chromosome: String,
    /// 1-based genomic position after normalization
    position: u64,
    /// normalized ref allele, "-" when absent
    reference: String,
    /// normalized alt allele, "-" when absent
    alternate: String,
    /// true if the variant is present on both alleles
    is_homozygous: bool,
    /// true if the coding consequence is synonymous
    is_synonymous: bool,
    /// gene identifier
    gene: String,
    /// transcript id -> coding syntax; invariant: non-empty
    coding: BTreeMap<String, MutationSyntax>,
    /// open multi-valued metadata store
    metadata: BTreeMap<String, Vec<String>>
}

impl Variant {
    /// Core constructor
    /// # Arguments
    /// * `id` - stable identifier for this variant
    /// * `variant_type` - the classified type
    /// * `chromosome` - chromosome, "chr" prefix already stripped
    /// * `position` - 1-based normalized genomic position
    /// * `reference` - normalized ref allele
    /// * `alternate` - normalized alt allele
    /// * `coding` - per-transcript coding syntax, must be non-empty
    /// * `is_homozygous` - zygosity flag
    /// * `is_synonymous` - synonymous consequence flag
    /// * `gene` - gene identifier
    /// # Errors
    /// * if `coding` is empty; a variant with no coding annotation is discarded upstream
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String, variant_type: VariantType, chromosome: String, position: u64,
        reference: String, alternate: String, coding: BTreeMap<String, MutationSyntax>,
        is_homozygous: bool, is_synonymous: bool, gene: String
    ) -> Result<Variant, SimpleError> {
        if coding.is_empty() {
            bail!("coding cannot be empty for variant {id}");
        }
        Ok(Variant {
            id,
            variant_type,
            chromosome,
            position,
            reference,
            alternate,
            is_homozygous,
            is_synonymous,
            gene,
            coding,
            metadata: Default::default()
        })
    }

    /// Appends a single value under a metadata key
    pub fn log_metadata(&mut self, key: &str, value: String) {
        self.metadata.entry(key.to_string()).or_default().push(value);
    }

    /// Appends multiple values under a metadata key
    pub fn log_metadata_values(&mut self, key: &str, values: &[String]) {
        self.metadata.entry(key.to_string()).or_default().extend_from_slice(values);
    }

    /// Returns the stored values for a metadata key, if any were logged
    pub fn metadata_values(&self, key: &str) -> Option<&Vec<String>> {
        self.metadata.get(key)
    }

    /// Creates the synthetic forced-homozygous duplicate used by the combinatorics guard.
    /// All other fields, including logged metadata, are copied.
    pub fn forced_homozygous_duplicate(&self) -> Variant {
        let mut duplicate = self.clone();
        duplicate.is_homozygous = true;
        duplicate
    }

    /// Derives the explicit deduplication key for this variant
    pub fn key(&self) -> VariantKey {
        // BTreeMap keys are already sorted
        let transcripts: Vec<String> = self.coding.keys().cloned().collect();
        VariantKey {
            chromosome: self.chromosome.clone(),
            position: self.position,
            variant_type: self.variant_type,
            reference: self.reference.clone(),
            alternate: self.alternate.clone(),
            transcripts
        }
    }

    // getters
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn variant_type(&self) -> VariantType {
        self.variant_type
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    pub fn is_homozygous(&self) -> bool {
        self.is_homozygous
    }

    pub fn is_synonymous(&self) -> bool {
        self.is_synonymous
    }

    pub fn gene(&self) -> &str {
        &self.gene
    }

    pub fn coding(&self) -> &BTreeMap<String, MutationSyntax> {
        &self.coding
    }

    pub fn metadata(&self) -> &BTreeMap<String, Vec<String>> {
        &self.metadata
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Utility that builds a minimal coding map on one transcript
    pub fn test_coding(transcript_id: &str, protein_position: usize, cds_syntax: &str, protein_syntax: &str) -> BTreeMap<String, MutationSyntax> {
        let mut coding = BTreeMap::new();
        coding.insert(transcript_id.to_string(), MutationSyntax::new(
            transcript_id.to_string(),
            Some(0),
            Some(protein_position),
            cds_syntax.to_string(),
            protein_syntax.to_string()
        ));
        coding
    }

    /// Utility that builds a simple SNP variant for other test modules
    pub fn test_snp(id: &str, transcript_id: &str, protein_position: usize, protein_syntax: &str) -> Variant {
        Variant::new(
            id.to_string(), VariantType::Snp, "1".to_string(), 1000,
            "C".to_string(), "A".to_string(),
            test_coding(transcript_id, protein_position, "c.32C>A", protein_syntax),
            false, false, "ENSG00000133703".to_string()
        ).unwrap()
    }

    #[test]
    fn test_empty_coding_rejected() {
        let result = Variant::new(
            "line0_0".to_string(), VariantType::Snp, "1".to_string(), 1000,
            "C".to_string(), "A".to_string(), BTreeMap::new(),
            false, false, "ENSG00000133703".to_string()
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_variant_key_ignores_zygosity() {
        let variant = test_snp("line0_0", "ENST00000256078", 10, "p.Ala11Asp");
        let duplicate = variant.forced_homozygous_duplicate();
        assert!(duplicate.is_homozygous());
        assert!(!variant.is_homozygous());
        // same defining fields, same key
        assert_eq!(variant.key(), duplicate.key());
    }

    #[test]
    fn test_variant_key_differs_by_transcript() {
        let v1 = test_snp("line0_0", "ENST00000256078", 10, "p.Ala11Asp");
        let v2 = test_snp("line0_0", "ENST00000311936", 10, "p.Ala11Asp");
        assert_ne!(v1.key(), v2.key());
    }

    #[test]
    fn test_metadata_logging() {
        let mut variant = test_snp("line0_0", "ENST00000256078", 10, "p.Ala11Asp");
        variant.log_metadata("vardbid", "rs121913529".to_string());
        variant.log_metadata_values("DP", &["100".to_string(), "120".to_string()]);
        assert_eq!(variant.metadata_values("vardbid"), Some(&vec!["rs121913529".to_string()]));
        assert_eq!(variant.metadata_values("DP").map(|v| v.len()), Some(2));
        assert_eq!(variant.metadata_values("missing"), None);
    }

    #[test]
    fn test_variant_type_display() {
        assert_eq!(VariantType::Snp.to_string(), "SNP");
        assert_eq!(VariantType::FsDel.to_string(), "FSDEL");
        assert!(VariantType::FsIns.is_frameshift());
        assert!(!VariantType::Del.is_frameshift());
    }
}
