// ============================================================
// Layer 5 - Model Summary
// ============================================================
// Renders a layer-by-layer table of the regressor, printed
// once the model is built:
//
//   Layer              Output shape          Params
//   ────────────────────────────────────────────────
//   x (input)          [b, n, 9]                  0
//   a (input)          [b, n, n]                  0
//   gcn_conv_1         [b, n, 32]               320
//   min_cut_pool       [b, 27, 32]              891
//   ...
//
// `b` is the batch size and `n` the padded node count, both
// only known per batch. Parameter counts come from the layer
// configs, so the table can be rendered without a device.

use std::fmt::{self, Display};

use crate::ml::model::MolRegressorConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRow {
    pub name:   String,
    pub shape:  String,
    pub params: usize,
}

#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub rows: Vec<LayerRow>,
}

impl ModelSummary {
    pub fn from_config(cfg: &MolRegressorConfig) -> Self {
        let h = cfg.hidden;
        let k = cfg.n_clusters;
        let row = |name: &str, shape: String, params: usize| LayerRow {
            name: name.to_string(),
            shape,
            params,
        };

        let rows = vec![
            row("x (input)",         format!("[b, n, {}]", cfg.n_node_features), 0),
            row("a (input)",         "[b, n, n]".to_string(),                     0),
            row("gcn_conv_1",        format!("[b, n, {h}]"),                      cfg.conv1().num_params()),
            row("min_cut_pool",      format!("[b, {k}, {h}], [b, {k}, {k}]"),     cfg.pool().num_params()),
            row("gcn_conv_2",        format!("[b, {k}, {h}]"),                    cfg.conv2().num_params()),
            row("global_sum_pool",   format!("[b, {h}]"),                         0),
            row("dense",             format!("[b, {}]", cfg.n_out),               cfg.head_params()),
        ];
        Self { rows }
    }

    pub fn total_params(&self) -> usize {
        self.rows.iter().map(|r| r.params).sum()
    }
}

impl Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "─".repeat(62);
        writeln!(f, "Model: \"mol_regressor\"")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<20}{:<32}{:>10}", "Layer", "Output shape", "Params")?;
        writeln!(f, "{rule}")?;
        for r in &self.rows {
            writeln!(f, "{:<20}{:<32}{:>10}", r.name, r.shape, r.params)?;
        }
        writeln!(f, "{rule}")?;
        write!(f, "Total params: {}", self.total_params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use burn::module::Module;

    #[test]
    fn test_total_matches_module_params() {
        // ogbg-molesol shape: 9 atom features, N = 55 → 27 clusters, 1 target
        let cfg     = MolRegressorConfig::new(9, 27, 1);
        let summary = ModelSummary::from_config(&cfg);
        let model   = cfg.init::<NdArray>(&NdArrayDevice::default());
        assert_eq!(summary.total_params(), model.num_params());
    }

    #[test]
    fn test_known_layer_counts() {
        let summary = ModelSummary::from_config(&MolRegressorConfig::new(9, 27, 1));
        let params: Vec<usize> = summary.rows.iter().map(|r| r.params).collect();
        // 9*32+32, 32*27+27, 32*32+32, 32*1+1
        assert_eq!(params, vec![0, 0, 320, 891, 1056, 0, 33]);
    }

    #[test]
    fn test_display_lists_every_layer() {
        let text = ModelSummary::from_config(&MolRegressorConfig::new(9, 27, 1)).to_string();
        for name in ["gcn_conv_1", "min_cut_pool", "gcn_conv_2", "global_sum_pool", "dense"] {
            assert!(text.contains(name), "missing {name}");
        }
        assert!(text.ends_with("Total params: 2300"));
    }
}
