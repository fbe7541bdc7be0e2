// ============================================================
// Layer 4 - Dataset Catalog
// ============================================================
// Static metadata for the benchmark datasets this tool knows
// how to fetch and read. The values mirror the OGB graph
// property prediction "master" table for the molecule
// regression tasks:
//
//   name              folder in zip   tasks  metric  split
//   ogbg-molesol      esol            1      rmse    scaffold
//   ogbg-molfreesolv  freesolv        1      rmse    scaffold
//   ogbg-mollipo      lipophilicity   1      rmse    scaffold
//
// All of them store each bond once, so inverse edges are
// added when loading.

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetInfo {
    /// Public identifier, e.g. "ogbg-molesol"
    pub name:             &'static str,
    /// Where the zip lives
    pub url:              &'static str,
    /// Top-level folder name inside the downloaded zip
    pub zip_folder:       &'static str,
    pub num_tasks:        usize,
    pub metric:           &'static str,
    pub split:            &'static str,
    pub add_inverse_edge: bool,
}

impl DatasetInfo {
    /// Folder name on disk: dashes become underscores
    /// ("ogbg-molesol" → "ogbg_molesol")
    pub fn folder(&self) -> String {
        self.name.replace('-', "_")
    }
}

pub const DATASETS: &[DatasetInfo] = &[
    DatasetInfo {
        name:             "ogbg-molesol",
        url:              "http://snap.stanford.edu/ogb/data/graphproppred/csv_mol_download/esol.zip",
        zip_folder:       "esol",
        num_tasks:        1,
        metric:           "rmse",
        split:            "scaffold",
        add_inverse_edge: true,
    },
    DatasetInfo {
        name:             "ogbg-molfreesolv",
        url:              "http://snap.stanford.edu/ogb/data/graphproppred/csv_mol_download/freesolv.zip",
        zip_folder:       "freesolv",
        num_tasks:        1,
        metric:           "rmse",
        split:            "scaffold",
        add_inverse_edge: true,
    },
    DatasetInfo {
        name:             "ogbg-mollipo",
        url:              "http://snap.stanford.edu/ogb/data/graphproppred/csv_mol_download/lipophilicity.zip",
        zip_folder:       "lipophilicity",
        num_tasks:        1,
        metric:           "rmse",
        split:            "scaffold",
        add_inverse_edge: true,
    },
];

/// Look up a dataset by its public name.
pub fn lookup(name: &str) -> Result<&'static DatasetInfo> {
    match DATASETS.iter().find(|d| d.name == name) {
        Some(info) => Ok(info),
        None => {
            let known: Vec<&str> = DATASETS.iter().map(|d| d.name).collect();
            bail!("Unknown dataset '{}'. Known datasets: {}", name, known.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_default_dataset() {
        let info = lookup("ogbg-molesol").unwrap();
        assert_eq!(info.folder(), "ogbg_molesol");
        assert_eq!(info.metric, "rmse");
        assert!(info.add_inverse_edge);
    }

    #[test]
    fn test_unknown_dataset_lists_known_ones() {
        let err = lookup("ogbg-molhiv").unwrap_err().to_string();
        assert!(err.contains("ogbg-molesol"));
    }
}
