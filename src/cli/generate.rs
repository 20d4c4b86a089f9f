

use clap::Args;
use log::info;
use simple_error::bail;
use std::path::PathBuf;

use crate::cli::core::{check_optional_filename, check_required_filename};

#[derive(Args, Clone, Default)]
#[clap(author, about)]
pub struct GenerateSettings {
    /// Input variant call set (JSON)
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "variants")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub variant_filename: PathBuf,

    /// Input protein resolver response (JSON)
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "resolver")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub resolver_filename: PathBuf,

    /// Prefix for the output files; the peptide table goes to "{prefix}.tsv"
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(value_name = "PREFIX")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_prefix: String,

    /// Additionally writes flank-extended protein contexts to "{prefix}.fasta"
    #[clap(long = "fasta-output")]
    #[clap(help_heading = Some("Input/Output"))]
    pub fasta_output: bool,

    /// Optional reference proteome FASTA; peptides found in it are filtered out
    #[clap(long = "proteome-reference")]
    #[clap(value_name = "FASTA")]
    #[clap(help_heading = Some("Input/Output"))]
    pub proteome_reference: Option<PathBuf>,

    /// The shortest peptide length to generate, inclusive
    #[clap(long = "min-length")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "8")]
    #[clap(help_heading = Some("Peptide generation"))]
    pub min_length: usize,

    /// The longest peptide length to generate, inclusive
    #[clap(long = "max-length")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "14")]
    #[clap(help_heading = Some("Peptide generation"))]
    pub max_length: usize,

    /// Variant count per transcript above which all of its variants are treated as homozygous
    #[clap(long = "max-transcript-variants")]
    #[clap(value_name = "COUNT")]
    #[clap(default_value = "10")]
    #[clap(help_heading = Some("Peptide generation"))]
    pub max_transcript_variants: usize,

    /// Residues kept on each side of a variant cluster in the FASTA contexts
    #[clap(long = "flanking-region-size")]
    #[clap(value_name = "LENGTH")]
    #[clap(default_value = "25")]
    #[clap(help_heading = Some("Peptide generation"))]
    pub flanking_region_size: usize,

    /// The column name for the peptide sequence in the output table
    #[clap(long = "peptide-column")]
    #[clap(value_name = "NAME")]
    #[clap(default_value = "sequence")]
    #[clap(help_heading = Some("Peptide generation"))]
    pub peptide_column: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl GenerateSettings {
    /// The peptide table output path derived from the prefix
    pub fn table_filename(&self) -> PathBuf {
        PathBuf::from(format!("{}.tsv", self.output_prefix))
    }

    /// The FASTA context output path derived from the prefix
    pub fn fasta_filename(&self) -> PathBuf {
        PathBuf::from(format!("{}.fasta", self.output_prefix))
    }
}

pub fn check_generate_settings(settings: GenerateSettings) -> Result<GenerateSettings, Box<dyn std::error::Error>> {
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.variant_filename, "Variant JSON");
    check_required_filename(&settings.resolver_filename, "Resolver JSON");
    check_optional_filename(settings.proteome_reference.as_deref(), "Proteome FASTA");

    // dump stuff to the logger
    info!("\tVariants: {:?}", settings.variant_filename);
    info!("\tResolver response: {:?}", settings.resolver_filename);
    if let Some(proteome_fn) = settings.proteome_reference.as_ref() {
        info!("\tProteome reference: {proteome_fn:?}");
    }

    // outputs
    info!("Outputs:");
    info!("\tPeptide table: {:?}", settings.table_filename());
    if settings.fasta_output {
        info!("\tProtein contexts: {:?}", settings.fasta_filename());
    }

    info!("Peptide generation:");
    if settings.min_length == 0 {
        bail!("--min-length must be greater than 0");
    }
    if settings.min_length > settings.max_length {
        bail!("--min-length cannot be greater than --max-length");
    }
    info!("\tPeptide lengths: [{}, {}]", settings.min_length, settings.max_length);
    info!("\tMax variants per transcript: {}", settings.max_transcript_variants);
    if settings.fasta_output {
        info!("\tFlanking region size: {}", settings.flanking_region_size);
    }
    if settings.peptide_column.is_empty() {
        bail!("--peptide-column cannot be empty");
    }

    Ok(settings)
}
