
use log::{LevelFilter, error, info};
use std::collections::BTreeMap;

use peptigen::cli::core::{Commands, get_cli};
use peptigen::cli::generate::{GenerateSettings, check_generate_settings};
use peptigen::cluster_window::{build_context_map, write_context_fasta};
use peptigen::data_types::variant_record::VariantCallSet;
use peptigen::pipeline::{PipelineResult, run_peptide_generation, write_empty_outputs, write_peptide_table};
use peptigen::resolver::FileResolver;
use peptigen::util::file_io::{load_fasta, load_json};

/// This will run the "generate" mode of the tool
/// # Arguments
/// * `settings` - the GenerateSettings object
fn run_generate(settings: GenerateSettings) {
    // get the settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };

    // immediately setup logging first
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    // okay, now we can check all the other settings
    let cli_settings: GenerateSettings = match check_generate_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while processing CLI settings: {e}");
            std::process::exit(exitcode::USAGE);
        }
    };

    // first load the variant call set
    info!("Loading variant call set from {:?}...", cli_settings.variant_filename);
    let call_set: VariantCallSet = match load_json(&cli_settings.variant_filename) {
        Ok(cs) => cs,
        Err(e) => {
            error!("Error while loading variant call set: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // then the resolver response it joins against
    info!("Loading resolver response from {:?}...", cli_settings.resolver_filename);
    let resolver: FileResolver = match FileResolver::from_json(&cli_settings.resolver_filename) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while loading resolver response: {e}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // pre-load the reference proteome if one was given
    let proteome: Option<BTreeMap<String, String>> = match cli_settings.proteome_reference.as_ref() {
        Some(proteome_fn) => {
            info!("Loading reference proteome from {proteome_fn:?}...");
            match load_fasta(proteome_fn) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Error while loading reference proteome: {e}");
                    std::process::exit(exitcode::IOERR);
                }
            }
        },
        None => None
    };

    // all the work
    let result: PipelineResult = match run_peptide_generation(
        &call_set,
        &resolver,
        proteome.as_ref(),
        cli_settings.min_length,
        cli_settings.max_length,
        cli_settings.max_transcript_variants
    ) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while generating peptides: {e}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    if result.rows.is_empty() {
        // still create the declared outputs so downstream steps see a consistent file set
        info!("Writing empty outputs for prefix {:?}", cli_settings.output_prefix);
        let fasta_filename = cli_settings.fasta_output.then(|| cli_settings.fasta_filename());
        if let Err(e) = write_empty_outputs(&cli_settings.table_filename(), fasta_filename.as_deref()) {
            error!("Error while writing empty outputs: {e}");
            std::process::exit(exitcode::IOERR);
        }
    } else {
        info!("Saving peptide table to {:?}", cli_settings.table_filename());
        if let Err(e) = write_peptide_table(
            &cli_settings.table_filename(), &result.rows,
            &result.metadata_columns, &cli_settings.peptide_column
        ) {
            error!("Error while writing peptide table: {e}");
            std::process::exit(exitcode::IOERR);
        }

        if cli_settings.fasta_output {
            info!("Saving protein contexts to {:?}", cli_settings.fasta_filename());
            let contexts = build_context_map(&result.proteins, &result.rows, cli_settings.flanking_region_size);
            if let Err(e) = write_context_fasta(&cli_settings.fasta_filename(), &contexts) {
                error!("Error while writing protein contexts: {e}");
                std::process::exit(exitcode::IOERR);
            }
        }
    }
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Generate(settings) => {
            run_generate(*settings);
        }
    }

    info!("Process finished successfully.");
}
