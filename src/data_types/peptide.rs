
use rustc_hash::FxHashSet as HashSet;
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::variant::{Variant, VariantKey};

/// Ties a peptide window back to one source protein: the transcript it came from,
/// where the window starts, and the variants applied within the window span.
#[derive(Clone, Debug)]
pub struct PeptideOrigin {
    /// transcript identifier, possibly with a resolver enumeration suffix
    transcript_id: String,
    /// 0-based offset of the window within the protein sequence
    start: usize,
    /// protein position -> variants applied there, restricted to the window span
    variants: BTreeMap<usize, Vec<Variant>>
}

impl PeptideOrigin {
    /// Basic constructor
    pub fn new(transcript_id: String, start: usize, variants: BTreeMap<usize, Vec<Variant>>) -> PeptideOrigin {
        PeptideOrigin {
            transcript_id,
            start,
            variants
        }
    }

    /// The transcript id without any resolver enumeration suffix
    pub fn base_transcript_id(&self) -> &str {
        self.transcript_id.split(':').next().unwrap_or(&self.transcript_id)
    }

    /// Returns true if any spanned position was altered by a variant
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    // getters
    pub fn transcript_id(&self) -> &str {
        &self.transcript_id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn variants(&self) -> &BTreeMap<usize, Vec<Variant>> {
        &self.variants
    }
}

/// Explicit identity key for a peptide: same sequence + same contributing transcript set.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PeptideKey {
    /// the residue sequence
    sequence: String,
    /// sorted, deduplicated base transcript ids
    transcripts: Vec<String>
}

/// A fixed-length contiguous window of a mutated protein sequence. Created transiently
/// per sweep iteration; identical windows from distinct proteins are merged by key.
#[derive(Clone, Debug)]
pub struct Peptide {
    /// the residue sequence of the window
    sequence: String,
    /// one entry per source protein this window was generated from
    origins: Vec<PeptideOrigin>
}

impl Peptide {
    /// Basic constructor
    pub fn new(sequence: String, origins: Vec<PeptideOrigin>) -> Peptide {
        Peptide {
            sequence,
            origins
        }
    }

    /// True iff at least one spanned position was altered by a variant,
    /// as opposed to merely being present in the wildtype sequence.
    pub fn is_created_by_variant(&self) -> bool {
        self.origins.iter().any(|origin| origin.has_variants())
    }

    /// Absorbs the origins of another (identical) peptide
    pub fn merge(&mut self, other: Peptide) {
        self.origins.extend(other.origins);
    }

    /// Derives the explicit deduplication key for this peptide
    pub fn key(&self) -> PeptideKey {
        let transcripts: Vec<String> = self.base_transcript_ids().into_iter().collect();
        PeptideKey {
            sequence: self.sequence.clone(),
            transcripts
        }
    }

    /// The sorted, deduplicated set of base transcript ids this peptide maps back to
    pub fn base_transcript_ids(&self) -> BTreeSet<String> {
        self.origins.iter()
            .map(|origin| origin.base_transcript_id().to_string())
            .collect()
    }

    /// All distinct variants contributing to this peptide, deduplicated by key
    /// while preserving origin order for determinism.
    pub fn contributing_variants(&self) -> Vec<&Variant> {
        let mut seen: HashSet<VariantKey> = Default::default();
        let mut contributing: Vec<&Variant> = vec![];
        for origin in self.origins.iter() {
            for variants in origin.variants().values() {
                for variant in variants.iter() {
                    if seen.insert(variant.key()) {
                        contributing.push(variant);
                    }
                }
            }
        }
        contributing
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    // getters
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn origins(&self) -> &[PeptideOrigin] {
        &self.origins
    }
}
