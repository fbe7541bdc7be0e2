// ============================================================
// Layer 5 - Graph Convolution (GCN)
// ============================================================
// One graph convolution in batch mode:
//
//   H = relu( Â · (X W) + b )
//
//   X  [batch, n, d_input]   node features
//   Â  [batch, n, n]         GCN-filtered adjacency (Layer 4)
//   W  [d_input, d_output]   shared across all nodes/graphs
//   b  [d_output]            added AFTER propagation
//
// The bias is a separate parameter rather than the Linear's
// own bias: with a normalised Â, Â·(XW + b) ≠ Â·XW + b, and
// the convolution is defined with the bias outside.
//
// Reference: Kipf & Welling (2017)
//            Burn Book §3 (Building Blocks)

use burn::{
    module::Param,
    nn::{Initializer, Linear, LinearConfig},
    prelude::*,
    tensor::activation::relu,
};

/// Dense layer with Glorot-uniform weights and, when present,
/// a zero bias. Every weight matrix in the model starts this way.
pub fn glorot_linear<B: Backend>(
    d_input:  usize,
    d_output: usize,
    bias:     bool,
    device:   &B::Device,
) -> Linear<B> {
    let mut linear = LinearConfig::new(d_input, d_output)
        .with_bias(bias)
        .with_initializer(Initializer::XavierUniform { gain: 1.0 })
        .init(device);
    if bias {
        linear.bias = Some(Param::from_tensor(Tensor::zeros([d_output], device)));
    }
    linear
}

#[derive(Config, Debug)]
pub struct GcnConvConfig {
    pub d_input:  usize,
    pub d_output: usize,
}

impl GcnConvConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GcnConv<B> {
        GcnConv {
            kernel: glorot_linear(self.d_input, self.d_output, false, device),
            bias:   Param::from_tensor(Tensor::zeros([self.d_output], device)),
        }
    }

    /// Trainable parameter count: kernel + bias
    pub fn num_params(&self) -> usize {
        self.d_input * self.d_output + self.d_output
    }
}

#[derive(Module, Debug)]
pub struct GcnConv<B: Backend> {
    pub kernel: Linear<B>,
    pub bias:   Param<Tensor<B, 1>>,
}

impl<B: Backend> GcnConv<B> {
    /// x: [batch, n, d_input], a: [batch, n, n] → [batch, n, d_output]
    pub fn forward(&self, x: Tensor<B, 3>, a: Tensor<B, 3>) -> Tensor<B, 3> {
        let support    = self.kernel.forward(x);
        let propagated = a.matmul(support);
        let bias       = self.bias.val().unsqueeze::<3>();
        relu(propagated + bias)
    }
}
