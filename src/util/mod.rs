
/// Conversions between residue code alphabets
pub mod amino_acid;
/// Generic functionality for reading/writing serializable objects to file
pub mod file_io;
