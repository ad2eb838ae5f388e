mod cli;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{AnnotationArgs, Cli, Commands, FilterArgs, StoreArgs, parse_delimiter};
use fungphy::align::{AlignmentRunner, FastTree, TreeInference};
use fungphy::annotate::TreeAnnotator;
use fungphy::config::{AlignConfig, AnnotationConfig, TreeBuildConfig};
use fungphy::fasta::{TEMPLATE_PLACEHOLDER, expand_template, read_fasta_file, write_fasta_file};
use fungphy::model::partition::read_partitions;
use fungphy::model::{
    MarkerAlignment, PhyloTree, SequenceSet, Supermatrix, SupermatrixBuilder, TaxonLookup,
    TaxonMetadata, TaxonPolicy,
};
use fungphy::newick::{self, NewickStyle, write_newick_file};
use fungphy::store::{SequenceHeader, StrainStore};
use fungphy::summary::Summary;
use log::{info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Some(num_threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            warn!("Failed to configure thread pool: {e}");
        }
    }

    match cli.command {
        Commands::Align {
            fasta,
            markers,
            store,
            filter,
            tool,
            executable,
            trim,
            gap_threshold,
            lenient,
            out,
            partitions,
        } => {
            let sets = if fasta.is_empty() {
                store_sequences(&store, &filter, &markers)?
            } else {
                fasta_sequences(&fasta, &markers)?
            };

            let mut config = AlignConfig::for_tool(tool);
            config.executable = executable;
            if trim {
                config = config.with_trimming(gap_threshold);
            }

            let runner = AlignmentRunner::from_config(&config);
            let alignments = if lenient {
                runner.align_all_lenient(&sets)
            } else {
                runner
                    .align_all(&sets)
                    .into_iter()
                    .collect::<fungphy::Result<Vec<_>>>()?
            };
            write_alignments(&alignments, &out, partitions.as_deref(), TaxonPolicy::Union)
        }

        Commands::Concat {
            alignments,
            markers,
            intersection,
            out,
            partitions,
        } => {
            let alignments = fasta_sequences(&alignments, &markers)?
                .into_iter()
                .map(MarkerAlignment::new)
                .collect::<fungphy::Result<Vec<_>>>()?;
            let policy = if intersection {
                TaxonPolicy::Intersection
            } else {
                TaxonPolicy::Union
            };
            write_alignments(&alignments, &out, partitions.as_deref(), policy)
        }

        Commands::Split {
            alignment,
            partitions,
            out,
        } => {
            let matrix = MarkerAlignment::new(read_fasta_file(&alignment, None)?)?;
            let partitions = read_partitions(&partitions)
                .with_context(|| format!("Failed to read partitions {}", partitions.display()))?;
            for marker in Supermatrix::from_partitioned(&matrix, &partitions)? {
                let path = expand_template(&out, marker.name());
                write_fasta_file(&path, marker.sequences())?;
                info!("Wrote {} to {}", marker.name(), path.display());
            }
            Ok(())
        }

        Commands::Tree {
            trees,
            infer,
            gtr,
            gamma,
            fasttree,
            store,
            annotation,
            out,
        } => {
            let mut inputs: Vec<PhyloTree> = Vec::new();
            if let Some(msa) = infer {
                let mut config = TreeBuildConfig::nucleotide(gtr, gamma);
                config.executable = fasttree;
                let rows = read_fasta_file(&msa, None)?;
                let matrix = SupermatrixBuilder::new()
                    .add(MarkerAlignment::new(rows)?)
                    .build()?;
                inputs.push(FastTree::new(&config).infer_tree(&matrix)?);
            }
            for path in &trees {
                let parsed = if path.as_os_str() == "-" {
                    newick::parse_reader(std::io::stdin().lock(), "stdin")
                } else {
                    newick::parse_file(path)
                };
                inputs.extend(parsed.with_context(|| format!("Failed to parse {}", path.display()))?);
            }
            if inputs.is_empty() {
                bail!("No trees given, pass Newick files or --infer");
            }

            let store = load_store(&store)?;
            let empty: HashMap<String, TaxonMetadata> = HashMap::new();
            let lookup: &dyn TaxonLookup = match &store {
                Some(store) => store,
                None => &empty,
            };

            let annotated = TreeAnnotator::new(lookup, annotation_config(annotation))
                .annotate(inputs)?;
            println!("{}", annotated.render_text());

            if let Some(out) = out {
                let file = File::create(&out)
                    .with_context(|| format!("Failed to create {}", out.display()))?;
                write_newick_file(file, std::slice::from_ref(annotated.tree()), NewickStyle::MultiSupport)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                info!("Wrote annotated tree to {}", out.display());
            }
            Ok(())
        }

        Commands::Summary {
            markers,
            store,
            filter,
            delimiter,
            headers,
            out,
        } => {
            let Some(store) = load_store(&store)? else {
                bail!("Summary needs a strain store, pass --strains and --markers-table");
            };
            let delimiter = parse_delimiter(&delimiter).map_err(anyhow::Error::msg)?;
            let ids = store.filter(&filter.to_filter());
            let table = Summary::from_strains(&store, ids, &markers).format(delimiter, headers)?;
            match out {
                Some(out) => {
                    std::fs::write(&out, table + "\n")
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                    info!("Wrote marker accession table to {}", out.display());
                }
                None => println!("{table}"),
            }
            Ok(())
        }
    }
}

/// Reads one sequence set per FASTA file, named by `markers` or the file name.
fn fasta_sequences(paths: &[PathBuf], markers: &[String]) -> Result<Vec<SequenceSet>> {
    if !markers.is_empty() && markers.len() != paths.len() {
        bail!(
            "Got {} marker names for {} files",
            markers.len(),
            paths.len()
        );
    }
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            read_fasta_file(path, markers.get(i).map(String::as_str))
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

/// Takes the sequences of the filtered strains from the store, one set per marker.
fn store_sequences(store: &StoreArgs, filter: &FilterArgs, markers: &[String]) -> Result<Vec<SequenceSet>> {
    let Some(store) = load_store(store)? else {
        bail!("No input, pass FASTA files or --strains and --markers-table");
    };
    if markers.is_empty() {
        bail!("No markers given, pass --marker");
    }
    let filter = filter.to_filter();
    if filter.is_empty() {
        warn!("No filter given, taking all strains");
    }

    let ids = store.filter(&filter);
    info!("Found {} strains matching filters", ids.len());
    markers
        .iter()
        .map(|marker| {
            store
                .marker_sequences(ids.iter().copied(), marker, SequenceHeader::StrainId)
                .map_err(anyhow::Error::from)
        })
        .collect()
}

fn load_store(args: &StoreArgs) -> Result<Option<StrainStore>> {
    match (&args.strains, &args.markers) {
        (Some(strains), Some(markers)) => Ok(Some(StrainStore::load(strains, markers)?)),
        (Some(strains), None) => {
            let markers: &[u8] = b"strain_id,marker,accession,sequence\n";
            let file = File::open(strains)
                .with_context(|| format!("Failed to open {}", strains.display()))?;
            let store = StrainStore::from_readers(file, markers)
                .with_context(|| format!("Failed to read {}", strains.display()))?;
            Ok(Some(store))
        }
        _ => Ok(None),
    }
}

/// Writes marker alignments per marker if `out` holds the placeholder,
/// otherwise as concatenated supermatrix.
fn write_alignments(
    alignments: &[MarkerAlignment],
    out: &Path,
    partitions: Option<&Path>,
    policy: TaxonPolicy,
) -> Result<()> {
    let template = out.to_string_lossy();
    if template.contains(TEMPLATE_PLACEHOLDER) {
        for alignment in alignments {
            let path = expand_template(&template, alignment.name());
            write_fasta_file(&path, alignment.sequences())?;
            info!("Wrote aligned {} sequences to {}", alignment.name(), path.display());
        }
        if partitions.is_none() {
            return Ok(());
        }
    }

    let matrix = SupermatrixBuilder::new()
        .with_policy(policy)
        .extend(alignments.iter().cloned())
        .build()?;
    if !template.contains(TEMPLATE_PLACEHOLDER) {
        write_fasta_file(out, matrix.rows())?;
        info!("Wrote combined alignment to {}", out.display());
    }
    if let Some(path) = partitions {
        std::fs::write(path, matrix.raxml_partitions())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote partitions to {}", path.display());
    }
    Ok(())
}

fn annotation_config(args: AnnotationArgs) -> AnnotationConfig {
    let mut config = AnnotationConfig {
        bold: args.bold.into_iter().collect(),
        show_type: args.show_type.into_iter().collect(),
        outgroup: args.outgroup,
        exclude_section: args.exclude_section,
        support_scale: args.scale,
        strict: args.strict,
        flip: args.flip,
        ..Default::default()
    };
    if !args.palette.is_empty() {
        config.palette = args.palette;
    }
    config
}
