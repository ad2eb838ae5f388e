use clap::{Args, Parser, Subcommand};
use fungphy::align::AlignmentTool;
use fungphy::model::SupportScale;
use fungphy::store::StrainFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fungphy")]
#[command(about = "Multi-marker phylogenies of fungal strains", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Number of threads for per-marker work (default: all available cores)
    #[arg(short = 't', long, global = true, value_name = "INT")]
    pub threads: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Align marker sequences, one marker per FASTA file or taken from a strain store
    Align {
        /// Unaligned FASTA files, one per marker
        #[arg(value_name = "FASTA")]
        fasta: Vec<PathBuf>,

        /// Marker names, in the order of the FASTA files or to take from the store
        #[arg(short = 'm', long = "marker", value_name = "NAME")]
        markers: Vec<String>,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Alignment tool: mafft or muscle
        #[arg(long, value_name = "TOOL", default_value = "mafft")]
        tool: AlignmentTool,

        /// Path of the alignment tool executable
        #[arg(long, value_name = "FILE")]
        executable: Option<PathBuf>,

        /// Remove columns with more than the gap threshold of gaps
        #[arg(long)]
        trim: bool,

        /// Maximal fraction of gaps in a kept column
        #[arg(long, value_name = "FLOAT", default_value = "0.5")]
        gap_threshold: f64,

        /// Skip markers that fail to align instead of aborting
        #[arg(long)]
        lenient: bool,

        /// Output per marker, '*' is replaced by the marker name; without '*'
        /// the concatenated supermatrix is written
        #[arg(short = 'o', long, value_name = "TEMPLATE")]
        out: PathBuf,

        /// Partition file of the supermatrix
        #[arg(short = 'p', long, value_name = "FILE")]
        partitions: Option<PathBuf>,
    },

    /// Concatenate marker alignments into a supermatrix
    Concat {
        /// Aligned FASTA files, one per marker
        #[arg(value_name = "MSA", required = true)]
        alignments: Vec<PathBuf>,

        /// Marker names, in the order of the files (default: file names)
        #[arg(short = 'm', long = "marker", value_name = "NAME")]
        markers: Vec<String>,

        /// Keep only taxa present in every marker
        #[arg(long)]
        intersection: bool,

        /// Output FASTA file of the supermatrix
        #[arg(short = 'o', long, value_name = "FILE")]
        out: PathBuf,

        /// Output partition file
        #[arg(short = 'p', long, value_name = "FILE")]
        partitions: Option<PathBuf>,
    },

    /// Split a supermatrix back into marker alignments
    Split {
        /// Aligned FASTA file of the supermatrix
        #[arg(value_name = "MSA")]
        alignment: PathBuf,

        /// Partition file
        #[arg(short = 'p', long, value_name = "FILE")]
        partitions: PathBuf,

        /// Output per marker, '*' is replaced by the marker name
        #[arg(short = 'o', long, value_name = "TEMPLATE")]
        out: String,
    },

    /// Infer, merge, root and annotate trees
    Tree {
        /// Newick files, `-` for standard input; supports of all trees are
        /// merged onto the first
        #[arg(value_name = "NEWICK")]
        trees: Vec<PathBuf>,

        /// Infer a tree with FastTree from this supermatrix first
        #[arg(long, value_name = "MSA")]
        infer: Option<PathBuf>,

        /// Use the GTR model for inference
        #[arg(long)]
        gtr: bool,

        /// Use gamma rate variation for inference
        #[arg(long)]
        gamma: bool,

        /// Path of the FastTree executable
        #[arg(long, value_name = "FILE")]
        fasttree: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        annotation: AnnotationArgs,

        /// Output Newick file of the annotated tree
        #[arg(short = 'o', long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Table of marker accessions per strain
    Summary {
        /// Markers to list
        #[arg(short = 'm', long = "marker", value_name = "NAME", required = true)]
        markers: Vec<String>,

        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Column delimiter, 'tab' for tabulator
        #[arg(short = 'd', long, value_name = "CHAR", default_value = ",")]
        delimiter: String,

        /// Write a header row
        #[arg(long)]
        headers: bool,

        /// Output file (default: stdout)
        #[arg(short = 'o', long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct StoreArgs {
    /// Strain table of the store
    #[arg(long = "strains", value_name = "CSV")]
    pub strains: Option<PathBuf>,

    /// Marker table of the store
    #[arg(id = "markers_table", long = "markers-table", value_name = "CSV", requires = "strains")]
    pub markers: Option<PathBuf>,
}

#[derive(Args)]
pub struct FilterArgs {
    #[arg(long = "genus", value_name = "NAME")]
    pub genera: Vec<String>,

    #[arg(long = "subgenus", value_name = "NAME")]
    pub subgenera: Vec<String>,

    #[arg(long = "section", value_name = "NAME")]
    pub sections: Vec<String>,

    #[arg(long = "species", value_name = "NAME")]
    pub species: Vec<String>,

    /// Strain ids
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> StrainFilter {
        StrainFilter {
            genera: self.genera.clone(),
            subgenera: self.subgenera.clone(),
            sections: self.sections.clone(),
            species: self.species.clone(),
            ids: self.ids.clone(),
        }
    }
}

#[derive(Args)]
pub struct AnnotationArgs {
    /// Species names to root on
    #[arg(long, value_name = "SPECIES")]
    pub outgroup: Vec<String>,

    /// Species whose leaves are set in bold
    #[arg(long, value_name = "SPECIES")]
    pub bold: Vec<String>,

    /// Species whose leaves show the type strain designation
    #[arg(long = "show-type", value_name = "SPECIES")]
    pub show_type: Vec<String>,

    /// Section name that is never annotated
    #[arg(long, value_name = "NAME")]
    pub exclude_section: Option<String>,

    /// Colors cycled through for sections
    #[arg(long, value_name = "COLOR", value_delimiter = ',')]
    pub palette: Vec<String>,

    /// Support scale: auto, percentage or proportion
    #[arg(long, value_name = "SCALE", default_value = "auto")]
    pub scale: SupportScale,

    /// Fail if merged trees differ in their leaves
    #[arg(long)]
    pub strict: bool,

    /// Reverse child order at every vertex
    #[arg(long)]
    pub flip: bool,
}

/// Parses a delimiter argument into a single byte.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if value.len() == 1 => Ok(value.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single character, got '{value}'")),
    }
}
