use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::SnpeffError;

fn run_command(mut cmd: Command) -> Result<(), SnpeffError> {
    log::info!("Running: {:?}", cmd);
    let status = cmd.status()?;
    if !status.success() {
        return Err(SnpeffError::CommandFailed {
            program: cmd.get_program().to_string_lossy().into_owned(),
            status,
        });
    }
    Ok(())
}

/// Build a snpEff database for a custom genome from FASTA and GFF files.
///
/// Stages the inputs under `<snpeff_dir>/data/<genome_id>/` with the file
/// names snpEff expects, registers the genome in `snpEff.config`, then runs
/// the build.
pub fn build_db(
    genome_id: &str,
    fasta: &Path,
    gff: &Path,
    snpeff_dir: &Path,
) -> Result<(), SnpeffError> {
    let data_dir = snpeff_dir.join("data").join(genome_id);
    fs::create_dir_all(&data_dir)?;

    fs::copy(fasta, data_dir.join("sequences.fa"))?;
    fs::copy(gff, data_dir.join("genes.gff"))?;

    // snpEff only builds genomes declared in its config file
    let mut config = OpenOptions::new()
        .append(true)
        .create(true)
        .open(snpeff_dir.join("snpEff.config"))?;
    writeln!(config, "{}.genome : CustomGenome", genome_id)?;

    let mut cmd = Command::new("java");
    cmd.args([
        "-Xmx4g",
        "-jar",
        "snpEff.jar",
        "build",
        "-gff3",
        "-noCheckCds",
        "-noCheckProtein",
        "-v",
        genome_id,
    ])
    .current_dir(snpeff_dir);
    run_command(cmd)
}

/// Annotate a VCF with snpEff, writing the annotated VCF to `output_vcf`.
/// The annotation window is limited to +/- 5bp around each variant site.
pub fn annotate(
    genome_id: &str,
    vcf: &Path,
    output_vcf: &Path,
    snpeff_dir: &Path,
) -> Result<(), SnpeffError> {
    let data_dir = snpeff_dir.join("data").join(genome_id);
    fs::create_dir_all(&data_dir)?;
    let staged_vcf = data_dir.join("variants.vcf");
    fs::copy(vcf, &staged_vcf)?;

    let out = File::create(output_vcf)?;
    let mut cmd = Command::new("java");
    cmd.args([
        "-Xmx4g",
        "-jar",
        "snpEff.jar",
        "-no-intergenic",
        "-no-upstream",
        "-no-downstream",
        "-ud",
        "5",
        genome_id,
    ])
    .arg(&staged_vcf)
    .current_dir(snpeff_dir)
    .stdout(Stdio::from(out));
    run_command(cmd)
}
