
/// Contains the annotated peptide table row and its rendering
pub mod annotation;
/// Contains the resolver-produced mutated protein types
pub mod mutated_protein;
/// Contains the peptide window types and their deduplication keys
pub mod peptide;
/// Contains the canonical variant representation and its coding syntax
pub mod variant;
/// Contains serialization for the raw variant call set input
pub mod variant_record;
