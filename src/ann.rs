use rustc_hash::FxHashMap;

use crate::error::ReportError;

/// Marker snpEff puts in the ANN Description ahead of the field list.
pub const ANN_MARKER: &str = "Functional annotations:";

/// One variant site lifted out of a VCF record: just the fields the report
/// needs, with the raw ANN payloads kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub chrom: String,
    /// 1-based position.
    pub pos: i64,
    pub reference: String,
    pub alts: Vec<String>,
    pub qual: Option<f32>,
    /// Raw pipe-delimited ANN payloads, one string per annotation.
    pub ann: Vec<String>,
}

/// One flattened report row: one ALT allele of one site, with the five
/// annotation attributes the report projects out of the ANN payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnRow {
    pub chrom: String,
    pub pos: i64,
    pub reference: String,
    pub alt: String,
    pub qual: Option<f32>,
    pub annotation: String,
    pub gene_id: String,
    pub feature_id: String,
    pub biotype: String,
    pub consequence: String,
}

/// Parse the ordered ANN field names out of the header's Description text.
///
/// snpEff declares the schema as
/// `Functional annotations: 'Allele|Annotation|...'`; everything after the
/// marker is taken, trailing quote/bracket decoration stripped, and the
/// remainder split on `|`. Field names are not trimmed here; trimming
/// happens per-field when payloads are mapped in [`extract_ann_rows`].
pub fn parse_ann_fields(description: Option<&str>) -> Result<Vec<String>, ReportError> {
    let desc = description.ok_or(ReportError::Schema)?;
    if !desc.contains(ANN_MARKER) {
        return Err(ReportError::Schema);
    }
    let fields_line = desc
        .split("Functional annotations: '")
        .last()
        .unwrap_or(desc)
        .trim_end_matches(['\'', '>']);
    Ok(fields_line.split('|').map(str::to_string).collect())
}

/// Flatten one site's ANN payloads into report rows, at most one per ALT
/// allele, in the site's allele order.
///
/// For each allele the payloads are scanned in stored order and the first
/// one whose leading component equals the allele wins; later payloads for
/// the same allele are ignored. An allele with no matching payload yields
/// no row. A matched payload whose component count disagrees with the
/// schema length fails the whole record with [`ReportError::Arity`].
pub fn extract_ann_rows(site: &Site, ann_fields: &[String]) -> Result<Vec<AnnRow>, ReportError> {
    let mut rows = Vec::new();
    for alt in &site.alts {
        let matched = site
            .ann
            .iter()
            .map(|payload| payload.split('|').collect::<Vec<_>>())
            .find(|parts| parts.first() == Some(&alt.as_str()));

        let Some(parts) = matched else {
            continue;
        };

        if parts.len() != ann_fields.len() {
            return Err(ReportError::Arity {
                allele: alt.clone(),
                found: parts.len(),
                expected: ann_fields.len(),
            });
        }

        // keys are trimmed here, not at schema-parse time
        let by_name: FxHashMap<&str, &str> = ann_fields
            .iter()
            .map(|name| name.trim())
            .zip(parts.iter().copied())
            .collect();
        let get = |name: &str| by_name.get(name).copied().unwrap_or("").to_string();

        rows.push(AnnRow {
            chrom: site.chrom.clone(),
            pos: site.pos,
            reference: site.reference.clone(),
            alt: alt.clone(),
            qual: site.qual,
            annotation: get("Annotation"),
            gene_id: get("Gene_ID"),
            feature_id: get("Feature_ID"),
            biotype: get("Transcript_BioType"),
            consequence: get("HGVS.p"),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann_description() -> &'static str {
        "Functional annotations: 'Allele|Annotation|Gene_ID|Feature_ID|Transcript_BioType|HGVS.p'"
    }

    fn ann_fields() -> Vec<String> {
        parse_ann_fields(Some(ann_description())).unwrap()
    }

    fn site(alts: &[&str], ann: &[&str]) -> Site {
        Site {
            chrom: "chr1".to_string(),
            pos: 100,
            reference: "G".to_string(),
            alts: alts.iter().map(|s| s.to_string()).collect(),
            qual: Some(99.0),
            ann: ann.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_ann_fields() {
        let fields = ann_fields();
        assert_eq!(
            fields,
            vec![
                "Allele",
                "Annotation",
                "Gene_ID",
                "Feature_ID",
                "Transcript_BioType",
                "HGVS.p"
            ]
        );
    }

    #[test]
    fn test_parse_ann_fields_strips_trailing_decoration() {
        let desc = "Functional annotations: 'Allele|Annotation|Gene_ID'>";
        let fields = parse_ann_fields(Some(desc)).unwrap();
        assert_eq!(fields, vec!["Allele", "Annotation", "Gene_ID"]);
    }

    #[test]
    fn test_parse_ann_fields_missing_description() {
        assert!(matches!(parse_ann_fields(None), Err(ReportError::Schema)));
    }

    #[test]
    fn test_parse_ann_fields_missing_marker() {
        let desc = "Consequence annotations from Ensembl VEP. Format: Allele|Consequence";
        assert!(matches!(
            parse_ann_fields(Some(desc)),
            Err(ReportError::Schema)
        ));
    }

    #[test]
    fn test_extract_single_alt() {
        let s = site(
            &["A"],
            &["A|missense_variant|gene1|tx1|protein_coding|p.Gly100Arg"],
        );
        let rows = extract_ann_rows(&s, &ann_fields()).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.chrom, "chr1");
        assert_eq!(row.pos, 100);
        assert_eq!(row.reference, "G");
        assert_eq!(row.alt, "A");
        assert_eq!(row.qual, Some(99.0));
        assert_eq!(row.annotation, "missense_variant");
        assert_eq!(row.gene_id, "gene1");
        assert_eq!(row.feature_id, "tx1");
        assert_eq!(row.biotype, "protein_coding");
        assert_eq!(row.consequence, "p.Gly100Arg");
    }

    #[test]
    fn test_extract_multi_alt_preserves_allele_order() {
        // payloads stored T-first; rows must still come out in allele order
        let s = site(
            &["A", "T"],
            &[
                "T|synonymous_variant|gene1|tx1|protein_coding|p.Gly100Gly",
                "A|missense_variant|gene1|tx1|protein_coding|p.Gly100Arg",
            ],
        );
        let rows = extract_ann_rows(&s, &ann_fields()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].alt, "A");
        assert_eq!(rows[0].annotation, "missense_variant");
        assert_eq!(rows[1].alt, "T");
        assert_eq!(rows[1].annotation, "synonymous_variant");
    }

    #[test]
    fn test_extract_first_matching_payload_wins() {
        let s = site(
            &["A"],
            &[
                "A|missense_variant|gene1|tx1|protein_coding|p.Gly100Arg",
                "A|stop_gained|gene2|tx2|protein_coding|p.Gly100Ter",
            ],
        );
        let rows = extract_ann_rows(&s, &ann_fields()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].annotation, "missense_variant");
        assert_eq!(rows[0].gene_id, "gene1");
    }

    #[test]
    fn test_extract_no_matching_payload_yields_no_row() {
        let s = site(
            &["C"],
            &["A|missense_variant|gene1|tx1|protein_coding|p.Gly100Arg"],
        );
        let rows = extract_ann_rows(&s, &ann_fields()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_extract_no_payloads_at_all() {
        let s = site(&["A", "T"], &[]);
        let rows = extract_ann_rows(&s, &ann_fields()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_extract_too_few_components_fails() {
        let s = site(&["A"], &["A|missense_variant|gene1|tx1|protein_coding"]);
        match extract_ann_rows(&s, &ann_fields()) {
            Err(ReportError::Arity {
                allele,
                found,
                expected,
            }) => {
                assert_eq!(allele, "A");
                assert_eq!(found, 5);
                assert_eq!(expected, 6);
            }
            other => panic!("expected Arity error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_too_many_components_fails() {
        let s = site(
            &["A"],
            &["A|missense_variant|gene1|tx1|protein_coding|p.Gly100Arg|extra"],
        );
        assert!(matches!(
            extract_ann_rows(&s, &ann_fields()),
            Err(ReportError::Arity {
                found: 7,
                expected: 6,
                ..
            })
        ));
    }

    #[test]
    fn test_extract_arity_fails_whole_record() {
        // the other allele's payload is well-formed but the record still fails
        let s = site(
            &["A", "T"],
            &[
                "A|missense_variant|gene1|tx1|protein_coding|p.Gly100Arg",
                "T|synonymous_variant|gene1|tx1|protein_coding",
            ],
        );
        assert!(matches!(
            extract_ann_rows(&s, &ann_fields()),
            Err(ReportError::Arity { .. })
        ));
    }

    #[test]
    fn test_extract_trims_field_names_when_mapping() {
        let fields: Vec<String> = [
            " Allele ",
            " Annotation",
            "Gene_ID ",
            "Feature_ID",
            "Transcript_BioType",
            " HGVS.p ",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let s = site(
            &["A"],
            &["A|missense_variant|gene1|tx1|protein_coding|p.Gly100Arg"],
        );
        let rows = extract_ann_rows(&s, &fields).unwrap();
        assert_eq!(rows[0].annotation, "missense_variant");
        assert_eq!(rows[0].gene_id, "gene1");
        assert_eq!(rows[0].consequence, "p.Gly100Arg");
    }

    #[test]
    fn test_extract_absent_projected_field_defaults_to_empty() {
        // schema without HGVS.p: consequence falls back to ""
        let fields: Vec<String> = ["Allele", "Annotation", "Gene_ID", "Feature_ID", "Transcript_BioType"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let s = site(&["A"], &["A|missense_variant|gene1|tx1|protein_coding"]);
        let rows = extract_ann_rows(&s, &fields).unwrap();
        assert_eq!(rows[0].consequence, "");
        assert_eq!(rows[0].annotation, "missense_variant");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let s = site(
            &["A", "T"],
            &[
                "A|missense_variant|gene1|tx1|protein_coding|p.Gly100Arg",
                "T|synonymous_variant|gene1|tx1|protein_coding|p.Gly100Gly",
            ],
        );
        let fields = ann_fields();
        let first = extract_ann_rows(&s, &fields).unwrap();
        let second = extract_ann_rows(&s, &fields).unwrap();
        assert_eq!(first, second);
    }
}
