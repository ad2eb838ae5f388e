use criterion::{Criterion, criterion_group, criterion_main};
use fungphy::annotate::merge_support_values;
use fungphy::model::{MarkerAlignment, PhyloTree, SequenceSet, SupermatrixBuilder};
use fungphy::newick::parse_str;
use std::hint::black_box;

const TREE_SIZES: &[(&str, usize)] = &[("n64", 64), ("n256", 256)];

const MATRIX_SIZES: &[(&str, usize, usize)] = &[
    ("5x100", 5, 100),
    ("5x500", 5, 500),
];

/// Balanced Newick clade over leaves `first..first + n`, supports derived
/// from `seed` so that analyses differ.
fn balanced_clade(first: usize, n: usize, seed: usize) -> String {
    if n == 1 {
        return format!("{}:0.01", first);
    }
    let half = n / 2;
    let support = (first * 31 + n * 17 + seed * 7) % 101;
    format!(
        "({},{}){}:0.02",
        balanced_clade(first, half, seed),
        balanced_clade(first + half, n - half, seed),
        support
    )
}

fn analyses(num_leaves: usize, num_trees: usize) -> Vec<PhyloTree> {
    (0..num_trees)
        .map(|seed| {
            let half = num_leaves / 2;
            let newick = format!(
                "({},{});",
                balanced_clade(0, half, seed),
                balanced_clade(half, num_leaves - half, seed)
            );
            parse_str(&newick).unwrap()
        })
        .collect()
}

fn marker(name: &str, num_taxa: usize, skip: usize) -> MarkerAlignment {
    let row: String = "ACGT-".chars().cycle().take(600).collect();
    let rows = (0..num_taxa)
        .filter(|i| i % 7 != skip)
        .map(|i| (i.to_string(), row.clone()));
    MarkerAlignment::new(SequenceSet::from_pairs(name, rows).unwrap()).unwrap()
}

fn newick_parsing(c: &mut Criterion) {
    for (name, size) in TREE_SIZES {
        let newick = analyses(*size, 1)[0].to_newick(fungphy::newick::NewickStyle::Support);
        c.bench_function(&format!("parse {name}"), |b| {
            b.iter(|| parse_str(black_box(&newick)).unwrap());
        });
    }
}

fn support_merging(c: &mut Criterion) {
    for (name, size) in TREE_SIZES {
        let trees = analyses(*size, 4);
        c.bench_function(&format!("merge 4x{name}"), |b| {
            b.iter(|| merge_support_values(black_box(&trees), 0, false).unwrap());
        });
    }
}

fn concatenation(c: &mut Criterion) {
    for (name, num_markers, num_taxa) in MATRIX_SIZES {
        let markers: Vec<MarkerAlignment> = (0..*num_markers)
            .map(|m| marker(&format!("marker{m}"), *num_taxa, m))
            .collect();
        c.bench_function(&format!("supermatrix {name}"), |b| {
            b.iter(|| {
                SupermatrixBuilder::new()
                    .extend(black_box(markers.iter().cloned()))
                    .build()
                    .unwrap()
            });
        });
    }
}

criterion_group!(regression, newick_parsing, support_merging);
criterion_group! {
    name = reporting;
    config = Criterion::default().sample_size(10);
    targets = concatenation
}
criterion_main!(regression, reporting);
