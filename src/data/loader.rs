// ============================================================
// Layer 4 - OGB Dataset Loader
// ============================================================
// Reads a graph property prediction dataset stored in the OGB
// raw CSV layout:
//
//   <root>/<folder>/
//     raw/
//       num-node-list.csv.gz   one row per graph: node count
//       num-edge-list.csv.gz   one row per graph: edge count
//       node-feat.csv.gz       one row per node (all graphs concatenated)
//       edge-feat.csv.gz       one row per edge (optional)
//       edge.csv.gz            "src,dst" per edge, LOCAL node indices
//       graph-label.csv.gz     one row per graph (NaN = unlabeled)
//     split/<split>/
//       train.csv.gz  valid.csv.gz  test.csv.gz   one index per row
//
// Every file may also be plain .csv; .csv.gz wins if both exist.
// None of the files carry a header row. An empty cell in
// graph-label is a missing label and is read as NaN.
//
// Walking the flat tables:
//   graph g owns node rows [node_off, node_off + n_nodes[g])
//   and edge rows          [edge_off, edge_off + n_edges[g])
//
// Reference: csv crate documentation (ReaderBuilder)
//            flate2 crate documentation (GzDecoder)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::domain::{
    graph::{GraphDataset, MolGraph},
    split::SplitIndices,
    traits::GraphSource,
};

/// Loads an OGB graph dataset from its extracted folder.
/// Implements the GraphSource trait from Layer 3.
pub struct OgbLoader {
    /// <root>/<folder>
    dir:              PathBuf,
    split_name:       String,
    add_inverse_edge: bool,
}

impl OgbLoader {
    pub fn new(dir: impl Into<PathBuf>, split_name: impl Into<String>, add_inverse_edge: bool) -> Self {
        Self {
            dir:              dir.into(),
            split_name:       split_name.into(),
            add_inverse_edge,
        }
    }

    /// True when the split directory exists on disk
    pub fn has_split(&self) -> bool {
        self.dir.join("split").join(&self.split_name).is_dir()
    }
}

impl GraphSource for OgbLoader {
    fn load_graphs(&self) -> Result<GraphDataset> {
        let raw = self.dir.join("raw");
        if !raw.is_dir() {
            bail!("Dataset directory '{}' has no raw/ folder", self.dir.display());
        }

        let node_counts: Vec<usize> = read_column(&raw, "num-node-list")?;
        let edge_counts: Vec<usize> = read_column(&raw, "num-edge-list")?;
        let node_feat:   Vec<Vec<f32>> = read_table(&raw, "node-feat")?;
        let edge_index:  Vec<Vec<usize>> = read_table(&raw, "edge")?;
        let edge_path = table_path(&raw, "edge").unwrap_or_else(|| raw.join("edge.csv"));
        let labels:      Vec<Vec<f32>> = read_label_table(&raw, "graph-label")?;

        // Edge features are optional in the OGB format
        let edge_feat: Vec<Vec<f32>> = if table_path(&raw, "edge-feat").is_some() {
            read_table(&raw, "edge-feat")?
        } else {
            tracing::debug!("No edge-feat table in '{}'", raw.display());
            Vec::new()
        };

        // ── Cross-check table sizes before slicing ────────────────────────────
        let n_graphs = node_counts.len();
        if edge_counts.len() != n_graphs || labels.len() != n_graphs {
            bail!(
                "Graph count mismatch: num-node-list={}, num-edge-list={}, graph-label={}",
                n_graphs,
                edge_counts.len(),
                labels.len()
            );
        }
        let total_nodes: usize = node_counts.iter().sum();
        let total_edges: usize = edge_counts.iter().sum();
        if node_feat.len() != total_nodes {
            bail!("node-feat has {} rows but num-node-list sums to {}", node_feat.len(), total_nodes);
        }
        if edge_index.len() != total_edges {
            bail!("edge has {} rows but num-edge-list sums to {}", edge_index.len(), total_edges);
        }
        if !edge_feat.is_empty() && edge_feat.len() != total_edges {
            bail!("edge-feat has {} rows but num-edge-list sums to {}", edge_feat.len(), total_edges);
        }

        // ── Slice the flat tables into graphs ─────────────────────────────────
        let mut graphs   = Vec::with_capacity(n_graphs);
        let mut node_off = 0usize;
        let mut edge_off = 0usize;

        for g in 0..n_graphs {
            let n_nodes = node_counts[g];
            let n_edges = edge_counts[g];

            let x: Vec<f32> = node_feat[node_off..node_off + n_nodes].concat();

            let mut edges = Vec::with_capacity(n_edges * 2);
            for (row, pair) in edge_index[edge_off..edge_off + n_edges].iter().enumerate() {
                let line = edge_off + row + 1;
                match pair.as_slice() {
                    [src, dst] if *src >= n_nodes || *dst >= n_nodes => bail!(
                        "{}:{}: edge ({}, {}) out of range for graph {} with {} nodes",
                        edge_path.display(),
                        line,
                        src,
                        dst,
                        g,
                        n_nodes
                    ),
                    [src, dst] => edges.push((*src, *dst)),
                    _ => bail!(
                        "{}:{}: edge row has {} columns, expected 2",
                        edge_path.display(),
                        line,
                        pair.len()
                    ),
                }
            }

            let mut e: Vec<f32> = if edge_feat.is_empty() {
                Vec::new()
            } else {
                edge_feat[edge_off..edge_off + n_edges].concat()
            };

            // Bonds are stored once; message passing wants both directions
            if self.add_inverse_edge {
                let reversed: Vec<(usize, usize)> = edges.iter().map(|&(s, d)| (d, s)).collect();
                edges.extend(reversed);
                let copy = e.clone();
                e.extend(copy);
            }

            let graph = MolGraph::new(n_nodes, x, edges, e, labels[g].clone())
                .with_context(|| format!("Invalid graph {} in '{}'", g, self.dir.display()))?;
            graphs.push(graph);

            node_off += n_nodes;
            edge_off += n_edges;
        }

        let dataset = GraphDataset::new(graphs)
            .with_context(|| format!("Inconsistent dataset in '{}'", self.dir.display()))?;

        tracing::info!(
            "Loaded {} graphs from '{}' ({} node features, {} edge features, {} labels)",
            dataset.len(),
            self.dir.display(),
            dataset.n_node_features(),
            dataset.n_edge_features(),
            dataset.n_labels(),
        );
        Ok(dataset)
    }

    fn load_split(&self, len: usize) -> Result<SplitIndices> {
        let dir = self.dir.join("split").join(&self.split_name);
        let split = SplitIndices::new(
            read_column(&dir, "train")?,
            read_column(&dir, "valid")?,
            read_column(&dir, "test")?,
        );
        split
            .validate(len)
            .with_context(|| format!("Invalid split in '{}'", dir.display()))?;
        Ok(split)
    }
}

// ─── CSV helpers ──────────────────────────────────────────────────────────────

/// Find `<stem>.csv.gz` or `<stem>.csv` inside `dir`
fn table_path(dir: &Path, stem: &str) -> Option<PathBuf> {
    [format!("{stem}.csv.gz"), format!("{stem}.csv")]
        .into_iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Open a table, transparently un-gzipping .gz files
fn open_table(dir: &Path, stem: &str) -> Result<(PathBuf, Box<dyn Read>)> {
    let path = table_path(dir, stem)
        .with_context(|| format!("Missing table '{}.csv[.gz]' in '{}'", stem, dir.display()))?;
    let file = File::open(&path).with_context(|| format!("Cannot open '{}'", path.display()))?;

    let reader: Box<dyn Read> = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok((path, reader))
}

/// Parse every record of a header-less CSV table into rows of `T`.
/// Empty cells become `missing`, or an error when it is None.
fn read_rows<T>(dir: &Path, stem: &str, missing: Option<T>) -> Result<Vec<Vec<T>>>
where
    T: FromStr + Clone,
    T::Err: std::fmt::Display,
{
    let (path, reader) = open_table(dir, stem)?;
    let mut table = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, result) in table.records().enumerate() {
        let record = result.with_context(|| format!("Cannot read '{}'", path.display()))?;
        let line   = record.position().map_or(i as u64 + 1, |p| p.line());

        let row = record
            .iter()
            .map(|cell| match (cell.is_empty(), &missing) {
                (true, Some(fill)) => Ok(fill.clone()),
                (true, None) => Err(anyhow::anyhow!(
                    "{}:{}: empty cell",
                    path.display(),
                    line
                )),
                (false, _) => cell.parse::<T>().map_err(|e| {
                    anyhow::anyhow!("{}:{}: cannot parse '{}': {}", path.display(), line, cell, e)
                }),
            })
            .collect::<Result<Vec<T>>>()?;
        rows.push(row);
    }

    tracing::debug!("Read {} rows from '{}'", rows.len(), path.display());
    Ok(rows)
}

/// Read a header-less numeric CSV into rows of `T`.
pub fn read_table<T>(dir: &Path, stem: &str) -> Result<Vec<Vec<T>>>
where
    T: FromStr + Clone,
    T::Err: std::fmt::Display,
{
    read_rows(dir, stem, None)
}

/// Read a label table; empty cells are unlabeled targets (NaN).
pub fn read_label_table(dir: &Path, stem: &str) -> Result<Vec<Vec<f32>>> {
    read_rows(dir, stem, Some(f32::NAN))
}

/// Read a single-column table
pub fn read_column<T>(dir: &Path, stem: &str) -> Result<Vec<T>>
where
    T: FromStr + Clone,
    T::Err: std::fmt::Display,
{
    read_table(dir, stem)?
        .into_iter()
        .enumerate()
        .map(|(i, mut row)| {
            if row.len() != 1 {
                bail!("'{}' row {} has {} columns, expected 1", stem, i + 1, row.len());
            }
            Ok(row.remove(0))
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::{fs, io::Write};
    use tempfile::tempdir;

    fn write_csv(dir: &Path, stem: &str, body: &str) {
        fs::write(dir.join(format!("{stem}.csv")), body).unwrap();
    }

    fn write_gz(dir: &Path, stem: &str, body: &str) {
        let f = File::create(dir.join(format!("{stem}.csv.gz"))).unwrap();
        let mut enc = GzEncoder::new(f, Compression::default());
        enc.write_all(body.as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    /// Two molecules: a 2-atom chain and a 3-atom chain
    fn write_fixture(root: &Path) -> PathBuf {
        let dir = root.join("ogbg_toy");
        let raw = dir.join("raw");
        fs::create_dir_all(&raw).unwrap();
        write_csv(&raw, "num-node-list", "2\n3\n");
        write_csv(&raw, "num-edge-list", "1\n2\n");
        write_gz(&raw, "node-feat", "6,0\n8,1\n6,0\n6,0\n7,2\n");
        write_csv(&raw, "edge", "0,1\n0,1\n1,2\n");
        write_csv(&raw, "edge-feat", "1\n0\n2\n");
        write_csv(&raw, "graph-label", "-0.77\nnan\n");

        let split = dir.join("split").join("scaffold");
        fs::create_dir_all(&split).unwrap();
        write_csv(&split, "train", "1\n");
        write_csv(&split, "valid", "");
        write_gz(&split, "test", "0\n");
        dir
    }

    #[test]
    fn test_loads_graphs_with_inverse_edges() {
        let tmp    = tempdir().unwrap();
        let dir    = write_fixture(tmp.path());
        let loader = OgbLoader::new(&dir, "scaffold", true);
        let ds     = loader.load_graphs().unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.n_node_features(), 2);
        assert_eq!(ds.n_edge_features(), 1);
        assert_eq!(ds.max_nodes(), 3);

        let graphs = ds.into_graphs();
        let g1 = &graphs[1];
        assert_eq!(g1.edges, vec![(0, 1), (1, 2), (1, 0), (2, 1)]);
        assert_eq!(g1.edge_features, vec![0.0, 2.0, 0.0, 2.0]);
        assert_eq!(&g1.x[4..6], &[7.0, 2.0]);
        assert!(g1.y[0].is_nan());
        assert_eq!(graphs[0].y, vec![-0.77]);
    }

    #[test]
    fn test_empty_label_cell_is_unlabeled() {
        let tmp = tempdir().unwrap();
        let dir = write_fixture(tmp.path());
        write_csv(&dir.join("raw"), "graph-label", "-0.77\n\"\"\n");

        let graphs = OgbLoader::new(&dir, "scaffold", true).load_graphs().unwrap().into_graphs();
        assert_eq!(graphs[0].y, vec![-0.77]);
        assert!(graphs[1].y[0].is_nan());
    }

    #[test]
    fn test_empty_feature_cell_is_an_error() {
        let tmp = tempdir().unwrap();
        let dir = write_fixture(tmp.path());
        write_csv(&dir.join("raw"), "edge-feat", "1\n\"\"\n2\n");

        let err = OgbLoader::new(&dir, "scaffold", true).load_graphs().unwrap_err();
        assert!(format!("{err:#}").contains("edge-feat.csv:2: empty cell"));
    }

    #[test]
    fn test_gzip_table_wins_over_plain_csv() {
        let tmp = tempdir().unwrap();
        write_csv(tmp.path(), "train", "1\n2\n");
        write_gz(tmp.path(), "train", "7\n");

        let rows: Vec<usize> = read_column(tmp.path(), "train").unwrap();
        assert_eq!(rows, vec![7]);
    }

    #[test]
    fn test_edge_out_of_range_names_file_and_line() {
        let tmp = tempdir().unwrap();
        let dir = write_fixture(tmp.path());
        // Third edge row belongs to the 3-atom graph; node 3 does not exist
        write_csv(&dir.join("raw"), "edge", "0,1\n0,1\n1,3\n");

        let err = OgbLoader::new(&dir, "scaffold", true).load_graphs().unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("edge.csv:3"), "{msg}");
        assert!(msg.contains("edge (1, 3) out of range for graph 1 with 3 nodes"), "{msg}");
    }

    #[test]
    fn test_loads_split_from_mixed_compression() {
        let tmp    = tempdir().unwrap();
        let dir    = write_fixture(tmp.path());
        let loader = OgbLoader::new(&dir, "scaffold", true);
        assert!(loader.has_split());

        let split = loader.load_split(2).unwrap();
        assert_eq!(split.train, vec![1]);
        assert!(split.valid.is_empty());
        assert_eq!(split.test, vec![0]);
    }

    #[test]
    fn test_count_mismatch_is_reported() {
        let tmp = tempdir().unwrap();
        let dir = write_fixture(tmp.path());
        write_csv(&dir.join("raw"), "num-node-list", "2\n4\n");

        let err = OgbLoader::new(&dir, "scaffold", true).load_graphs().unwrap_err();
        assert!(err.to_string().contains("node-feat has 5 rows"));
    }

    #[test]
    fn test_bad_number_names_file_and_line() {
        let tmp = tempdir().unwrap();
        let dir = write_fixture(tmp.path());
        write_csv(&dir.join("raw"), "edge", "0,1\n0,x\n1,2\n");

        let err = OgbLoader::new(&dir, "scaffold", true).load_graphs().unwrap_err();
        assert!(format!("{err:#}").contains("edge.csv:2"));
    }

    #[test]
    fn test_missing_raw_folder() {
        let tmp = tempdir().unwrap();
        let err = OgbLoader::new(tmp.path(), "scaffold", true).load_graphs().unwrap_err();
        assert!(err.to_string().contains("no raw/ folder"));
    }
}
