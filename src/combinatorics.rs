
use log::info;
use std::collections::BTreeMap;

use crate::data_types::variant::Variant;

/// Caps the genotype-combination explosion per transcript. Transcripts touched by
/// more variants than the threshold get every one of their variants forced to
/// homozygous, which collapses the enumeration to a single combination.
/// Variants on unaffected transcripts pass through untouched.
/// # Arguments
/// * `variants` - the canonical variants for this run
/// * `max_transcript_variants` - the per-transcript threshold, inclusive
pub fn apply_combinatorics_guard(variants: Vec<Variant>, max_transcript_variants: usize) -> Vec<Variant> {
    let mut transcript_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for variant in variants.iter() {
        for transcript_id in variant.coding().keys() {
            *transcript_counts.entry(transcript_id).or_default() += 1;
        }
    }

    let overloaded: Vec<String> = transcript_counts.iter()
        .filter(|(_, &count)| count > max_transcript_variants)
        .map(|(&transcript_id, _)| transcript_id.to_string())
        .collect();
    if overloaded.is_empty() {
        return variants;
    }
    for transcript_id in overloaded.iter() {
        info!(
            "Transcript {} exceeds {} variants ({}); treating its variants as homozygous.",
            transcript_id, max_transcript_variants, transcript_counts[transcript_id.as_str()]
        );
    }

    variants.into_iter()
        .map(|variant| {
            let affected = variant.coding().keys()
                .any(|transcript_id| overloaded.contains(transcript_id));
            if affected && !variant.is_homozygous() {
                variant.forced_homozygous_duplicate()
            } else {
                variant
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::variant::tests::test_snp;

    fn variants_on(transcript_id: &str, count: usize) -> Vec<Variant> {
        (0..count)
            .map(|i| test_snp(&format!("line{i}_0"), transcript_id, i, "p.Ala11Asp"))
            .collect()
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let guarded = apply_combinatorics_guard(variants_on("ENST00000256078", 10), 10);
        assert_eq!(guarded.len(), 10);
        assert!(guarded.iter().all(|v| !v.is_homozygous()));
    }

    #[test]
    fn test_overloaded_transcript_forced_homozygous() {
        let guarded = apply_combinatorics_guard(variants_on("ENST00000256078", 11), 10);
        assert_eq!(guarded.len(), 11);
        assert!(guarded.iter().all(|v| v.is_homozygous()));
        // ids and everything else survive the duplication
        assert_eq!(guarded[0].id(), "line0_0");
    }

    #[test]
    fn test_other_transcripts_untouched() {
        let mut variants = variants_on("ENST00000256078", 11);
        variants.push(test_snp("line99_0", "ENST00000311936", 3, "p.Leu4Ala"));
        let guarded = apply_combinatorics_guard(variants, 10);
        let lone = guarded.iter().find(|v| v.id() == "line99_0").unwrap();
        assert!(!lone.is_homozygous());
    }
}
