
/// the main CLI module
pub mod core;
/// the generate CLI subcommand for producing mutated peptides
pub mod generate;
