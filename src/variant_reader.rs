
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::data_types::variant::{MutationSyntax, Variant, VariantKey, VariantType};
use crate::data_types::variant_record::{VariantCallSet, VariantRecord};

/// info key carrying SnpEff annotations
pub const SNPEFF_KEY: &str = "ANN";
/// info key carrying VEP annotations
pub const VEP_KEY: &str = "CSQ";
/// expected field count of one SnpEff annotation
const SNPEFF_FIELD_COUNT: usize = 16;
/// info keys that are annotation payloads rather than user metadata
const EXCLUDED_INFO_KEYS: [&str; 2] = [SNPEFF_KEY, VEP_KEY];

lazy_static! {
    /// Matches the first run of digits in a coding syntax string, e.g. the "123" in "c.123A>T"
    static ref DIGITS_REGEX: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// Errors that can abort variant reading; these are unrecoverable because
/// downstream steps assume coding annotations exist
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AnnotationError {
    #[error("no supported variant annotation found on record {record_index}; records require SnpEff (ANN) or VEP (CSQ) annotation prior to peptide generation")]
    UnsupportedSchema { record_index: usize }
}

/// The gene/transcript identifier system observed in the annotations.
/// Carried explicitly on the parse result rather than as ambient state.
#[derive(Clone, Copy, Debug, strum_macros::Display, Eq, PartialEq, Serialize)]
pub enum IdentifierSystem {
    #[strum(serialize = "ENSEMBL")]
    Ensembl,
    #[strum(serialize = "REFSEQ")]
    RefSeq
}

/// Everything extracted from a variant call set in one pass
#[derive(Clone, Debug)]
pub struct ParsedVariants {
    /// deduplicated canonical variants, in first-occurrence order
    pub variants: Vec<Variant>,
    /// every transcript id referenced by a coding annotation, with repeats
    pub transcript_ids: Vec<String>,
    /// sorted, deduplicated metadata column names observed across all records
    pub metadata_columns: Vec<String>,
    /// the identifier system inferred from the transcript ids
    pub identifier_system: IdentifierSystem
}

/// One coding annotation after schema-specific parsing
#[derive(Clone, Debug)]
struct CodingAnnotation {
    /// transcript id, version suffix stripped for VEP
    transcript_id: String,
    /// the parsed syntax entry
    syntax: MutationSyntax,
    /// gene identifier from the annotation
    gene: String,
    /// the raw consequence/annotation term
    consequence: String,
    /// true if the consequence is synonymous
    is_synonymous: bool
}

/// Classifies a (record, alternate) pair into a variant type.
/// SNP iff single-base substitution; indels are frameshift iff the length
/// change is not a multiple of 3; deletion vs insertion comes from the
/// record's own allele-length flags.
/// # Arguments
/// * `record` - the raw record
/// * `alternate` - the observed alternate allele under consideration
pub fn determine_variant_type(record: &VariantRecord, alternate: &str) -> VariantType {
    if record.is_snp(alternate) {
        VariantType::Snp
    } else if record.is_indel(alternate) {
        let length_change = alternate.len() as i64 - record.reference.len() as i64;
        let frameshift = length_change.abs() % 3 != 0;
        match (record.is_deletion(alternate), frameshift) {
            (true, false) => VariantType::Del,
            (true, true) => VariantType::FsDel,
            (false, false) => VariantType::Ins,
            (false, true) => VariantType::FsIns
        }
    } else {
        VariantType::Unknown
    }
}

/// Re-expresses (position, reference, alternate) in the canonical form the
/// downstream coordinate semantics expect.
/// SNPs pass through. Deletions drop the retained prefix from the reference and
/// advance the position past it. Insertions drop the retained prefix from the
/// alternate. Already-canonical alleles ("-" markers) pass through.
/// # Arguments
/// * `variant_type` - the previously classified type
/// * `position` - 1-based genomic position as given
/// * `reference` - reference allele as given
/// * `alternate` - alternate allele as given
pub fn normalize_alleles(variant_type: VariantType, position: u64, reference: &str, alternate: &str) -> (u64, String, String) {
    match variant_type {
        VariantType::Del | VariantType::FsDel => {
            if alternate != "-" {
                let trimmed = reference.get(alternate.len()..).unwrap_or("");
                (position + alternate.len() as u64, trimmed.to_string(), "-".to_string())
            } else {
                (position, reference.to_string(), alternate.to_string())
            }
        },
        VariantType::Ins | VariantType::FsIns => {
            if reference != "-" {
                let new_alternate = if alternate != "-" {
                    alternate.get(reference.len()..).unwrap_or("").to_string()
                } else {
                    alternate.to_string()
                };
                (position, "-".to_string(), new_alternate)
            } else {
                (position, reference.to_string(), alternate.to_string())
            }
        },
        // SNPs and anything unclassified pass through untouched
        _ => (position, reference.to_string(), alternate.to_string())
    }
}

/// Determines zygosity for a record, first matching rule wins:
/// (1) explicit HOM info flag; (2) SGT genotype-change descriptor;
/// (3) per-sample GT field equal to "1/1". Default is heterozygous.
/// # Arguments
/// * `record` - the raw record
pub fn determine_zygosity(record: &VariantRecord) -> bool {
    if let Some(values) = record.info.get("HOM") {
        if let Some(value) = values.first() {
            return value == "1" || value.eq_ignore_ascii_case("true");
        }
    }

    if let Some(values) = record.info.get("SGT") {
        // descriptor looks like "ref->het"; the post-arrow state is what we want
        if let Some(zygosity) = values.first().and_then(|v| v.split("->").nth(1)) {
            match zygosity {
                "het" => return false,
                "hom" | "ref" => return true,
                other => {
                    // two-character genotype code, e.g. "AA" or "AG"
                    let bytes = other.as_bytes();
                    if bytes.len() >= 2 {
                        return bytes[0] == bytes[1];
                    }
                }
            }
        }
    }

    let mut is_homozygous = false;
    for sample in record.samples.iter() {
        if let Some(gt) = sample.genotypes.get("GT") {
            is_homozygous = gt == "1/1";
        }
    }
    is_homozygous
}

/// First integer in a coding syntax string, converted to 0-based
fn parse_syntax_position(syntax: &str) -> Option<usize> {
    DIGITS_REGEX.find(syntax)
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .and_then(|p| p.checked_sub(1))
}

/// Parses one SnpEff (ANN) annotation into a coding entry.
/// Returns None for annotations that are malformed or not usable for peptide
/// generation (missing protein syntax, stop-gain).
fn parse_snpeff_annotation(raw: &str) -> Option<CodingAnnotation> {
    let fields: Vec<&str> = raw.split('|').collect();
    if fields.len() != SNPEFF_FIELD_COUNT {
        warn!("Omitted annotation: mandatory columns not present in annotation field ({SNPEFF_KEY}). Was this record annotated with SnpEff?");
        return None;
    }

    let consequence = fields[1];
    let gene_id = fields[4];
    let transcript_id = fields[6];
    let cds_syntax = fields[9];
    let protein_syntax = fields[10];

    // stop-gain variants cannot be carried into peptide generation
    if protein_syntax.is_empty() || consequence.contains("stop_gained") {
        return None;
    }

    let cds_position = parse_syntax_position(cds_syntax);
    let protein_position = parse_syntax_position(protein_syntax);

    Some(CodingAnnotation {
        transcript_id: transcript_id.to_string(),
        syntax: MutationSyntax::new(
            transcript_id.to_string(),
            cds_position,
            protein_position,
            cds_syntax.to_string(),
            protein_syntax.to_string()
        ),
        gene: gene_id.to_string(),
        consequence: consequence.to_string(),
        is_synonymous: consequence.contains("synonymous_variant")
    })
}

/// The default VEP field order, used when the header carries no CSQ definition
fn default_vep_fields() -> HashMap<String, usize> {
    [
        "allele", "consequence", "impact", "symbol", "gene", "feature_type",
        "feature", "biotype", "exon", "intron", "hgvsc", "hgvsp",
        "cdna_position", "cds_position", "protein_position", "amino_acids",
        "codons", "existing_variation", "distance", "strand", "flags",
        "symbol_source", "hgnc_id"
    ].iter()
        .enumerate()
        .map(|(idx, &name)| (name.to_string(), idx))
        .collect()
}

/// Builds the VEP field index map from the header definition, falling back to
/// the default order (with a warning) when no definition is present.
fn vep_field_indices(vep_format: Option<&str>) -> HashMap<String, usize> {
    let mut fields = default_vep_fields();
    match vep_format {
        Some(format) => {
            for (idx, field) in format.split('|').enumerate() {
                fields.insert(field.trim().to_lowercase(), idx);
            }
        },
        None => {
            warn!("No {VEP_KEY} definition found in header, trying to map to default VEP format string.");
        }
    }
    fields
}

/// Parses one VEP (CSQ) annotation into a coding entry.
/// Annotations without a CDS position are not usable and return None.
fn parse_vep_annotation(raw: &str, fields: &HashMap<String, usize>) -> Option<CodingAnnotation> {
    let split: Vec<&str> = raw.split('|').collect();
    let get = |name: &str| -> &str {
        fields.get(name)
            .and_then(|&idx| split.get(idx))
            .copied()
            .unwrap_or("")
    };

    let consequence = get("consequence");
    let gene = get("gene");
    let cds_syntax_full = get("hgvsc");
    let protein_syntax_full = get("hgvsp");
    let cds_position_field = get("cds_position");
    if cds_position_field.is_empty() {
        return None;
    }

    // HGVSc is "ENST00000256078.4:c.35G>A"; the prefix doubles as the transcript id
    let transcript_id = cds_syntax_full.split(':')
        .next()
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or_else(|| get("feature"));
    let transcript_id = transcript_id.split('.').next().unwrap_or(transcript_id).to_string();

    // "35/570" or "33-35/570" both resolve to the first coordinate
    let cds_position = cds_position_field.split('/')
        .next()
        .and_then(|p| p.split('-').next())
        .and_then(|p| p.parse::<usize>().ok())
        .and_then(|p| p.checked_sub(1));

    let protein_position = get("protein_position").split('-')
        .next()
        .and_then(|p| p.split('/').next())
        .and_then(|p| p.parse::<usize>().ok())
        .and_then(|p| p.checked_sub(1));

    let cds_syntax = cds_syntax_full.split(':').last().unwrap_or("").to_string();
    let protein_syntax = protein_syntax_full.split(':').last().unwrap_or("").to_string();

    Some(CodingAnnotation {
        transcript_id: transcript_id.clone(),
        syntax: MutationSyntax::new(transcript_id, cds_position, protein_position, cds_syntax, protein_syntax),
        gene: gene.to_string(),
        consequence: consequence.to_string(),
        is_synonymous: consequence.contains("synonymous")
    })
}

/// Reads a variant call set into deduplicated canonical variants.
/// Records that failed filters are skipped; annotations that are individually
/// malformed are skipped with a warning; a record with no supported annotation
/// schema aborts the run.
/// # Arguments
/// * `call_set` - the structured records plus header-level definitions
/// # Errors
/// * `AnnotationError::UnsupportedSchema` if a record carries neither ANN nor CSQ
pub fn read_variants(call_set: &VariantCallSet) -> Result<ParsedVariants, Box<dyn std::error::Error>> {
    // lazily built so the fallback warning only fires when VEP parsing happens
    let mut vep_fields: Option<HashMap<String, usize>> = None;

    let mut variants: Vec<Variant> = vec![];
    let mut seen_keys: HashSet<VariantKey> = Default::default();
    let mut transcript_ids: Vec<String> = vec![];
    let mut metadata_columns: BTreeSet<String> = BTreeSet::new();
    let mut identifier_system = IdentifierSystem::Ensembl;

    for (record_index, record) in call_set.records.iter().enumerate() {
        if !record.is_pass() {
            continue;
        }
        let chromosome = record.chromosome.trim_start_matches("chr").to_string();

        for (alt_index, alternate) in record.alternates.iter().enumerate() {
            let is_homozygous = determine_zygosity(record);
            let variant_type = determine_variant_type(record, alternate);

            let annotations: Vec<CodingAnnotation> = if let Some(raw_annotations) = record.info.get(SNPEFF_KEY) {
                raw_annotations.iter()
                    .filter_map(|raw| parse_snpeff_annotation(raw))
                    .collect()
            } else if let Some(raw_annotations) = record.info.get(VEP_KEY) {
                let fields = vep_fields.get_or_insert_with(|| vep_field_indices(call_set.vep_format.as_deref()));
                raw_annotations.iter()
                    .filter_map(|raw| parse_vep_annotation(raw, fields))
                    .collect()
            } else {
                return Err(AnnotationError::UnsupportedSchema { record_index }.into());
            };

            let mut coding: BTreeMap<String, MutationSyntax> = BTreeMap::new();
            let mut gene = String::new();
            let mut consequence = String::new();
            let mut is_synonymous = false;
            for annotation in annotations.into_iter() {
                if annotation.transcript_id.contains("NM") {
                    identifier_system = IdentifierSystem::RefSeq;
                }
                transcript_ids.push(annotation.transcript_id.clone());
                gene = annotation.gene;
                consequence = annotation.consequence;
                is_synonymous = annotation.is_synonymous;
                coding.insert(annotation.transcript_id, annotation.syntax);
            }
            if coding.is_empty() {
                continue;
            }

            let (position, reference, alternate) = normalize_alleles(
                variant_type, record.position, &record.reference, alternate
            );
            let mut variant = Variant::new(
                format!("line{record_index}_{alt_index}"),
                variant_type,
                chromosome.clone(),
                position,
                reference,
                alternate,
                coding,
                is_homozygous,
                is_synonymous,
                gene
            )?;

            variant.log_metadata("vardbid", record.id.clone().unwrap_or_default());
            metadata_columns.insert("vardbid".to_string());
            for info_key in call_set.info_keys.iter() {
                if EXCLUDED_INFO_KEYS.contains(&info_key.as_str()) {
                    continue;
                }
                if let Some(values) = record.info.get(info_key) {
                    variant.log_metadata_values(info_key, values);
                    metadata_columns.insert(info_key.clone());
                }
            }
            // consumed by the context windower, intentionally not a table column
            variant.log_metadata("consequence", consequence);
            for sample in record.samples.iter() {
                for format_key in call_set.format_keys.iter() {
                    match sample.genotypes.get(format_key) {
                        Some(value) => {
                            let column = format!("{}.{}", sample.name, format_key);
                            variant.log_metadata(&column, value.clone());
                            metadata_columns.insert(column);
                        },
                        None => {
                            warn!("FORMAT entry {format_key} not defined for {}. Skipping.", sample.name);
                        }
                    }
                }
            }

            // first occurrence of a key wins
            if seen_keys.insert(variant.key()) {
                variants.push(variant);
            }
        }
    }

    Ok(ParsedVariants {
        variants,
        transcript_ids,
        metadata_columns: metadata_columns.into_iter().collect(),
        identifier_system
    })
}
