
/// Contains the per-peptide aggregation into table rows
pub mod annotator;
/// Contains all the CLI related functionality
pub mod cli;
/// Contains the flank-extended protein context windowing and FASTA output
pub mod cluster_window;
/// Contains the per-transcript variant-count guard
pub mod combinatorics;
/// Contains any specialized data types that are shared across the tooling
pub mod data_types;
/// Contains the sliding-window peptide sweep across resolved proteins
pub mod peptide_sweep;
/// Contains the end-to-end peptide generation pipeline and table output
pub mod pipeline;
/// Contains the seam to the external transcript/protein resolver
pub mod resolver;
/// Contains generic utilities that are handy wrappers
pub mod util;
/// Contains variant reading, normalization, and annotation parsing
pub mod variant_reader;
/// Contains wildtype window reconstruction from mutation syntax
pub mod wildtype;
