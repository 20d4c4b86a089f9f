
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use simple_error::bail;
use std::collections::BTreeMap;
use std::path::Path;

use crate::data_types::mutated_protein::{MutatedProtein, MutatedProteinRecord};
use crate::data_types::peptide::{Peptide, PeptideOrigin};
use crate::data_types::variant::Variant;
use crate::util::file_io::load_json;

/// External protein identifiers for one transcript
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProteinIdRecord {
    /// Ensembl protein id
    #[serde(default)]
    pub ensembl: Option<String>,
    /// RefSeq protein id
    #[serde(default)]
    pub refseq: Option<String>,
    /// UniProt accession
    #[serde(default)]
    pub uniprot: Option<String>
}

/// Base transcript id -> external protein identifiers
pub type ProteinIdTable = BTreeMap<String, ProteinIdRecord>;

/// The serialized response of an external transcript/protein resolver run
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResolverResponse {
    /// every protein enumerated from the variants, wildtype enumerations included
    #[serde(default)]
    pub proteins: Vec<MutatedProteinRecord>,
    /// protein identifier mappings for the transcripts involved
    #[serde(default)]
    pub protein_ids: ProteinIdTable
}

/// The seam to the external transcript/protein resolver. The resolver is called once
/// per run, synchronously; a failure here aborts the run with no retry.
pub trait ProteinResolver {
    /// Materializes the mutated (and wildtype) proteins for a set of variants
    /// # Arguments
    /// * `variants` - the canonical variants for this run
    /// # Errors
    /// * if the resolver cannot produce a consistent protein set
    fn resolve(&self, variants: &[Variant]) -> Result<Vec<MutatedProtein>, Box<dyn std::error::Error>>;

    /// Looks up external protein identifiers for the given base transcript ids.
    /// Transcripts without a mapping are simply absent from the result.
    /// # Errors
    /// * if the lookup itself fails; absent mappings are not an error
    fn protein_ids(&self, transcript_ids: &[String]) -> Result<ProteinIdTable, Box<dyn std::error::Error>>;

    /// Generates every sliding window of the given length across the provided proteins.
    /// Proteins shorter than the window length yield nothing.
    /// # Arguments
    /// * `proteins` - the resolved protein set
    /// * `length` - the window length
    fn generate_windows(&self, proteins: &[MutatedProtein], length: usize) -> Vec<Peptide> {
        let mut peptides: Vec<Peptide> = vec![];
        for protein in proteins.iter() {
            if protein.len() < length || length == 0 {
                continue;
            }
            for start in 0..=(protein.len() - length) {
                let sequence = protein.sequence()[start..start+length].to_string();
                let origin = PeptideOrigin::new(
                    protein.transcript_id().to_string(),
                    start,
                    protein.variants_in_span(start, start + length)
                );
                peptides.push(Peptide::new(sequence, vec![origin]));
            }
        }
        peptides
    }
}

/// A resolver backed by a pre-materialized response file. The response references
/// variants by id; `resolve` joins those references against the run's variant list.
pub struct FileResolver {
    /// the loaded resolver response
    response: ResolverResponse
}

impl FileResolver {
    /// Basic constructor
    pub fn new(response: ResolverResponse) -> FileResolver {
        FileResolver {
            response
        }
    }

    /// Loads a resolver response from a JSON file
    /// # Arguments
    /// * `filename` - the response file, optionally gzipped
    /// # Errors
    /// * if the file does not open or parse
    pub fn from_json(filename: &Path) -> Result<FileResolver, Box<dyn std::error::Error>> {
        let response: ResolverResponse = load_json(filename)?;
        Ok(FileResolver::new(response))
    }
}

impl ProteinResolver for FileResolver {
    fn resolve(&self, variants: &[Variant]) -> Result<Vec<MutatedProtein>, Box<dyn std::error::Error>> {
        // index the run's variants by id for the join
        let by_id: HashMap<&str, &Variant> = variants.iter()
            .map(|v| (v.id(), v))
            .collect();

        let mut proteins: Vec<MutatedProtein> = vec![];
        for record in self.response.proteins.iter() {
            let mut joined: BTreeMap<usize, Vec<Variant>> = BTreeMap::new();
            for (&position, variant_ids) in record.variant_positions.iter() {
                let mut at_position: Vec<Variant> = vec![];
                for variant_id in variant_ids.iter() {
                    match by_id.get(variant_id.as_str()) {
                        Some(&variant) => at_position.push(variant.clone()),
                        None => bail!(
                            "Resolver response references unknown variant {:?} on protein {:?}",
                            variant_id, record.transcript_id
                        )
                    }
                }
                joined.insert(position, at_position);
            }
            proteins.push(MutatedProtein::new(
                record.transcript_id.clone(),
                record.gene_id.clone(),
                record.sequence.clone(),
                joined
            ));
        }
        Ok(proteins)
    }

    fn protein_ids(&self, transcript_ids: &[String]) -> Result<ProteinIdTable, Box<dyn std::error::Error>> {
        let table: ProteinIdTable = transcript_ids.iter()
            .filter_map(|tid| {
                self.response.protein_ids.get(tid)
                    .map(|record| (tid.clone(), record.clone()))
            })
            .collect();
        Ok(table)
    }
}
