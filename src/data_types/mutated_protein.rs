
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data_types::variant::Variant;

/// The serialized form of a resolver-produced protein. Variants are referenced by id
/// and joined against the pipeline's own variant list when the response is consumed.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MutatedProteinRecord {
    /// transcript identifier; the resolver may append a ":suffix" per enumerated genotype combination
    pub transcript_id: String,
    /// gene identifier for the transcript
    #[serde(default)]
    pub gene_id: String,
    /// the (possibly mutated) protein residue sequence
    pub sequence: String,
    /// 0-based protein position -> ids of the variants responsible for a change there;
    /// empty for a wildtype enumeration
    #[serde(default)]
    pub variant_positions: BTreeMap<usize, Vec<String>>
}

/// A protein sequence with, for each residue position, the variants responsible for a
/// change at that position. Produced by the external resolver and read-only here.
#[derive(Clone, Debug)]
pub struct MutatedProtein {
    /// transcript identifier, possibly with a resolver enumeration suffix
    transcript_id: String,
    /// gene identifier
    gene_id: String,
    /// protein residue sequence
    sequence: String,
    /// 0-based protein position -> variants applied at that position
    variants: BTreeMap<usize, Vec<Variant>>
}

impl MutatedProtein {
    /// Basic constructor
    pub fn new(transcript_id: String, gene_id: String, sequence: String, variants: BTreeMap<usize, Vec<Variant>>) -> MutatedProtein {
        MutatedProtein {
            transcript_id,
            gene_id,
            sequence,
            variants
        }
    }

    /// The transcript id without any resolver enumeration suffix
    pub fn base_transcript_id(&self) -> &str {
        self.transcript_id.split(':').next().unwrap_or(&self.transcript_id)
    }

    /// Returns true if at least one position was altered by a variant
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Collects the variants applied within `[start, end)` of the protein sequence
    /// # Arguments
    /// * `start` - 0-based inclusive start of the span
    /// * `end` - 0-based exclusive end of the span
    pub fn variants_in_span(&self, start: usize, end: usize) -> BTreeMap<usize, Vec<Variant>> {
        self.variants.range(start..end)
            .map(|(position, variants)| (*position, variants.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    // getters
    pub fn transcript_id(&self) -> &str {
        &self.transcript_id
    }

    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn variants(&self) -> &BTreeMap<usize, Vec<Variant>> {
        &self.variants
    }
}
