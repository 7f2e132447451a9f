use std::io::Write;
use std::path::Path;

use rust_htslib::bcf::{self, header::HeaderRecord, Read};

use crate::ann::{self, AnnRow, Site};
use crate::error::ReportError;

/// Fixed report column order. Written exactly once, before any data rows.
pub const REPORT_COLUMNS: [&str; 10] = [
    "CHROM",
    "POS",
    "REF",
    "ALT",
    "QUAL",
    "annotation",
    "gene_id",
    "feature_id",
    "biotype",
    "consequence",
];

/// Find the Description text of the ANN INFO declaration, if any.
fn ann_description(header: &bcf::header::HeaderView) -> Option<String> {
    header.header_records().into_iter().find_map(|rec| match rec {
        HeaderRecord::Info { values, .. }
            if values.get("ID").map(String::as_str) == Some("ANN") =>
        {
            // htslib keeps the surrounding double quotes on Description
            values
                .get("Description")
                .map(|d| d.trim_matches('"').to_string())
        }
        _ => None,
    })
}

/// Parse the ANN field schema from a VCF header. Called once per run.
pub fn ann_fields_from_header(
    header: &bcf::header::HeaderView,
) -> Result<Vec<String>, ReportError> {
    let desc = ann_description(header);
    ann::parse_ann_fields(desc.as_deref())
}

/// Lift the fields the report needs out of an htslib record.
pub fn site_from_record(record: &bcf::Record) -> Result<Site, ReportError> {
    let header = record.header();
    let chrom = match record.rid() {
        Some(rid) => String::from_utf8_lossy(header.rid2name(rid)?).to_string(),
        None => String::new(),
    };

    let alleles = record.alleles();
    let reference = alleles
        .first()
        .map(|a| String::from_utf8_lossy(a).to_string())
        .unwrap_or_default();
    let alts: Vec<String> = alleles
        .iter()
        .skip(1)
        .map(|a| String::from_utf8_lossy(a).to_string())
        .collect();

    let qual = record.qual();
    let qual = if qual.is_nan() { None } else { Some(qual) };

    // a record without ANN is fine; every allele just skips silently
    let ann = match record.info(b"ANN").string() {
        Ok(Some(values)) => values
            .iter()
            .map(|v| String::from_utf8_lossy(v).to_string())
            .collect(),
        Ok(None) => Vec::new(),
        Err(_) => Vec::new(),
    };

    Ok(Site {
        chrom,
        pos: record.pos() + 1,
        reference,
        alts,
        qual,
        ann,
    })
}

fn write_row<W: Write>(wtr: &mut csv::Writer<W>, row: &AnnRow) -> Result<(), ReportError> {
    let pos = row.pos.to_string();
    let qual = row.qual.map(|q| q.to_string()).unwrap_or_default();
    wtr.write_record([
        row.chrom.as_str(),
        pos.as_str(),
        row.reference.as_str(),
        row.alt.as_str(),
        qual.as_str(),
        row.annotation.as_str(),
        row.gene_id.as_str(),
        row.feature_id.as_str(),
        row.biotype.as_str(),
        row.consequence.as_str(),
    ])?;
    Ok(())
}

/// Write the report for an ordered stream of sites.
///
/// Sites are consumed forward-only in source order and their rows appended
/// as produced; an [`ReportError::Arity`] from any site aborts the run with
/// no attempt at a partial report.
pub fn write_report<I, W>(
    sites: I,
    ann_fields: &[String],
    wtr: &mut csv::Writer<W>,
) -> Result<(), ReportError>
where
    I: IntoIterator<Item = Result<Site, ReportError>>,
    W: Write,
{
    wtr.write_record(REPORT_COLUMNS)?;
    for site in sites {
        let site = site?;
        for row in ann::extract_ann_rows(&site, ann_fields)? {
            write_row(wtr, &row)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Stream a snpEff-annotated VCF into a CSV report at `output`.
pub fn run(vcf_path: &Path, output: &Path) -> Result<(), ReportError> {
    let mut reader = bcf::Reader::from_path(vcf_path)?;
    let ann_fields = ann_fields_from_header(reader.header())?;

    let mut wtr = csv::Writer::from_path(output)?;
    let sites = reader.records().map(|rec| {
        rec.map_err(ReportError::from)
            .and_then(|r| site_from_record(&r))
    });
    write_report(sites, &ann_fields, &mut wtr)
}
