use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::ValidateError;

fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Gzip-aware line reader over a possibly-compressed text file.
fn open_text(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn has_extension(path: &Path, suffixes: &[&str]) -> bool {
    let name = path.to_string_lossy();
    suffixes.iter().any(|s| name.ends_with(s))
}

/// A VCF must carry the `.vcf`/`.vcf.gz` extension and contain a header
/// line starting with `#CHROM`.
pub fn validate_vcf(path: &Path) -> Result<(), ValidateError> {
    if !has_extension(path, &[".vcf", ".vcf.gz"]) {
        return Err(ValidateError::BadExtension {
            kind: "VCF",
            path: path.to_path_buf(),
        });
    }
    for line in open_text(path)?.lines() {
        if line?.starts_with("#CHROM") {
            return Ok(());
        }
    }
    Err(ValidateError::MissingVcfHeader(path.to_path_buf()))
}

/// A FASTA must carry a recognized extension and start with a `>` record.
pub fn validate_fasta(path: &Path) -> Result<(), ValidateError> {
    if !has_extension(
        path,
        &[".fa", ".fasta", ".fa.gz", ".fasta.gz", ".fna", ".fna.gz"],
    ) {
        return Err(ValidateError::BadExtension {
            kind: "FASTA",
            path: path.to_path_buf(),
        });
    }
    let first = open_text(path)?.lines().next().transpose()?.unwrap_or_default();
    if !first.starts_with('>') {
        return Err(ValidateError::NotFasta(path.to_path_buf()));
    }
    Ok(())
}

/// A GFF must carry a recognized extension and contain at least one
/// non-comment line with exactly 9 tab-separated fields.
pub fn validate_gff(path: &Path) -> Result<(), ValidateError> {
    if !has_extension(path, &[".gff", ".gff3", ".gff.gz", ".gff3.gz"]) {
        return Err(ValidateError::BadExtension {
            kind: "GFF",
            path: path.to_path_buf(),
        });
    }
    for line in open_text(path)?.lines() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }
        if line.trim().split('\t').count() == 9 {
            return Ok(());
        }
    }
    Err(ValidateError::NoGffFeatures(path.to_path_buf()))
}

/// Decompress a gzipped file to `dest`, or plain-copy it when it is not
/// compressed.
pub fn decompress_if_needed(path: &Path, dest: &Path) -> Result<PathBuf, ValidateError> {
    if is_gzipped(path) {
        let mut reader = MultiGzDecoder::new(File::open(path)?);
        let mut out = File::create(dest)?;
        io::copy(&mut reader, &mut out)?;
    } else {
        fs::copy(path, dest)?;
    }
    Ok(dest.to_path_buf())
}

/// Validate all three pipeline inputs and stage decompressed copies under
/// `out_dir` as `variants.vcf`, `ref.fa` and `annotations.gff`.
pub fn prepare_inputs(
    vcf: &Path,
    fasta: &Path,
    gff: &Path,
    out_dir: &Path,
) -> Result<(PathBuf, PathBuf, PathBuf), ValidateError> {
    for path in [vcf, fasta, gff] {
        if !path.exists() {
            return Err(ValidateError::Missing(path.to_path_buf()));
        }
        if fs::metadata(path)?.len() == 0 {
            return Err(ValidateError::Empty(path.to_path_buf()));
        }
    }

    validate_vcf(vcf)?;
    validate_fasta(fasta)?;
    validate_gff(gff)?;

    fs::create_dir_all(out_dir)?;
    let vcf_out = decompress_if_needed(vcf, &out_dir.join("variants.vcf"))?;
    let fasta_out = decompress_if_needed(fasta, &out_dir.join("ref.fa"))?;
    let gff_out = decompress_if_needed(gff, &out_dir.join("annotations.gff"))?;
    Ok((vcf_out, fasta_out, gff_out))
}
