use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while flattening snpEff annotations into report rows.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("VCF header does not contain a valid ANN field definition from SnpEff")]
    Schema,

    #[error("ANN field for ALT '{allele}' has {found} components; expected {expected}")]
    Arity {
        allele: String,
        found: usize,
        expected: usize,
    },

    #[error(transparent)]
    Htslib(#[from] rust_htslib::errors::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating and staging pipeline inputs.
#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("file does not exist: {}", .0.display())]
    Missing(PathBuf),

    #[error("file is empty: {}", .0.display())]
    Empty(PathBuf),

    #[error("{kind} file does not have a valid extension: {}", .path.display())]
    BadExtension { kind: &'static str, path: PathBuf },

    #[error("VCF file is missing a header line starting with '#CHROM': {}", .0.display())]
    MissingVcfHeader(PathBuf),

    #[error("FASTA file does not start with '>': {}", .0.display())]
    NotFasta(PathBuf),

    #[error("GFF file has no valid feature lines with the expected 9 fields: {}", .0.display())]
    NoGffFeatures(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while driving the snpEff subprocess.
#[derive(Error, Debug)]
pub enum SnpeffError {
    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
