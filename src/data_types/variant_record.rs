
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A full set of annotated variant records plus the header-level definitions that
/// are needed to interpret them. This is the structured form the caller hands us;
/// parsing the variant file container itself happens upstream.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct VariantCallSet {
    /// pipe-delimited VEP field order from the header definition; if absent, a default order is assumed
    #[serde(default)]
    pub vep_format: Option<String>,
    /// info keys declared in the header; values found under these keys become metadata columns
    #[serde(default)]
    pub info_keys: Vec<String>,
    /// per-sample format keys declared in the header
    #[serde(default)]
    pub format_keys: Vec<String>,
    /// the variant records themselves
    #[serde(default)]
    pub records: Vec<VariantRecord>
}

/// One raw annotated variant record
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct VariantRecord {
    /// chromosome, possibly with a "chr" prefix
    pub chromosome: String,
    /// 1-based genomic position
    pub position: u64,
    /// variant database identifier, if any
    #[serde(default)]
    pub id: Option<String>,
    /// reference allele
    pub reference: String,
    /// observed alternate alleles
    pub alternates: Vec<String>,
    /// failed filters; empty means the record passed
    #[serde(default)]
    pub filters: Vec<String>,
    /// info fields, each key may carry multiple values
    #[serde(default)]
    pub info: BTreeMap<String, Vec<String>>,
    /// per-sample genotype/format data
    #[serde(default)]
    pub samples: Vec<SampleRecord>
}

/// Genotype/format data for a single sample
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SampleRecord {
    /// sample name, used to prefix metadata columns
    pub name: String,
    /// format key -> value for this sample
    #[serde(default)]
    pub genotypes: BTreeMap<String, String>
}

impl VariantRecord {
    /// Returns true if this record passed all filters
    pub fn is_pass(&self) -> bool {
        self.filters.is_empty()
    }

    /// Returns true if the given alternate makes this a single-base substitution
    pub fn is_snp(&self, alternate: &str) -> bool {
        self.reference.len() == 1 && alternate.len() == 1 &&
            self.reference != "-" && alternate != "-"
    }

    /// Returns true if the given alternate changes the allele length
    pub fn is_indel(&self, alternate: &str) -> bool {
        self.reference.len() != alternate.len()
    }

    /// Returns true if the given alternate is shorter than the reference
    pub fn is_deletion(&self, alternate: &str) -> bool {
        alternate.len() < self.reference.len()
    }
}
