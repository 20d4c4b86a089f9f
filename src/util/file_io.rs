
use bio::io::fasta;
use simple_error::bail;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Helper function that loads a JSON file into some type, helpful generic
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let fp: Box<dyn std::io::Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::read::MultiGzDecoder::new(
                File::open(filename)?
            )
        )
    } else {
        Box::new(File::open(filename)?)
    };
    let result: T = serde_json::from_reader(fp)?;
    Ok(result)
}

/// Loads a FASTA file of protein sequences into a map from record id to sequence
/// # Arguments
/// * `filename` - the FASTA path, optionally gzipped
/// # Errors
/// * if the file does not open or parse
/// * if a record contains non-UTF8 residues
pub fn load_fasta(filename: &Path) -> Result<BTreeMap<String, String>, Box<dyn std::error::Error>> {
    let fp: Box<dyn std::io::Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(
            flate2::read::MultiGzDecoder::new(
                File::open(filename)?
            )
        )
    } else {
        Box::new(File::open(filename)?)
    };
    let reader = fasta::Reader::new(fp);

    let mut sequences: BTreeMap<String, String> = BTreeMap::new();
    for record in reader.records() {
        let record = record?;
        let sequence = String::from_utf8(record.seq().to_vec())?;
        if sequences.insert(record.id().to_string(), sequence).is_some() {
            bail!("Duplicate FASTA record id: {}", record.id());
        }
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        name: String,
        values: Vec<usize>
    }

    #[test]
    fn test_load_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "peptides", "values": [8, 9, 10]}}"#).unwrap();
        let loaded: Payload = load_json(file.path()).unwrap();
        assert_eq!(loaded, Payload {
            name: "peptides".to_string(),
            values: vec![8, 9, 10]
        });
    }

    #[test]
    fn test_load_fasta() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, ">sp|P01116|RASK_HUMAN description\nMTEYKLVVVGA\n>other\nAAAA\n").unwrap();
        let sequences = load_fasta(file.path()).unwrap();
        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences.get("sp|P01116|RASK_HUMAN").unwrap(), "MTEYKLVVVGA");
        assert_eq!(sequences.get("other").unwrap(), "AAAA");
    }

    #[test]
    fn test_load_fasta_duplicate_id() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, ">dup\nMTEY\n>dup\nAAAA\n").unwrap();
        assert!(load_fasta(file.path()).is_err());
    }
}
