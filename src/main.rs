use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use vcfann::{report, snpeff, validate};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(version, about = "Annotate VCFs with snpEff and flatten the ANN field into a CSV report")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate VCF/FASTA/GFF inputs and stage decompressed copies.
    Validate {
        /// Path to the input VCF.
        #[arg(long)]
        vcf: PathBuf,
        /// Path to the input FASTA.
        #[arg(long)]
        fasta: PathBuf,
        /// Path to the input GFF.
        #[arg(long)]
        gff: PathBuf,
        /// Directory the validated, decompressed copies are written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Build a snpEff database for a custom genome and annotate a VCF.
    Annotate {
        /// Name for the reference genome used for snpEff db building.
        #[arg(long, default_value = "ref_genome")]
        genome_id: String,
        /// Path to the validated, decompressed FASTA.
        #[arg(long)]
        fasta: PathBuf,
        /// Path to the validated, decompressed GFF.
        #[arg(long)]
        gff: PathBuf,
        /// Path to the validated, decompressed VCF.
        #[arg(long)]
        vcf: PathBuf,
        /// Path to the output VCF with snpEff annotations.
        #[arg(long)]
        output_vcf: PathBuf,
        /// Path to the snpEff installation directory.
        #[arg(long, default_value = "snpEff")]
        snpeff_dir: PathBuf,
    },
    /// Write a CSV report from a snpEff-annotated VCF.
    Report {
        /// Input VCF annotated with snpEff.
        #[arg(long)]
        vcf: PathBuf,
        /// Output CSV file.
        #[arg(long)]
        output: PathBuf,
    },
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Validate {
            vcf,
            fasta,
            gff,
            out_dir,
        } => {
            let (vcf_out, fasta_out, gff_out) =
                validate::prepare_inputs(&vcf, &fasta, &gff, &out_dir)?;
            log::info!(
                "staged inputs: {} {} {}",
                vcf_out.display(),
                fasta_out.display(),
                gff_out.display()
            );
        }
        Commands::Annotate {
            genome_id,
            fasta,
            gff,
            vcf,
            output_vcf,
            snpeff_dir,
        } => {
            snpeff::build_db(&genome_id, &fasta, &gff, &snpeff_dir)?;
            snpeff::annotate(&genome_id, &vcf, &output_vcf, &snpeff_dir)?;
        }
        Commands::Report { vcf, output } => {
            report::run(&vcf, &output)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
