use std::io::{self, Write};

use ndarray::{Array1, Array2};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Uniform};

use crate::{
    error::Result,
    reduce::Reducible,
    spec::NetSpec,
};

type Header = u32;

/// Flat description of the layer shapes, written ahead of the raw parameters.
#[derive(serde::Serialize, serde::Deserialize)]
struct SnapshotHeader {
    layers: Vec<(usize, usize)>,
}

/// Dense network parameters, one weight matrix and bias vector per layer.
///
/// This is the model snapshot the coordination layer passes around: a value
/// with elementwise merge/scale so many of them can be averaged into one.
#[derive(Debug, Clone, PartialEq)]
pub struct NetParams {
    weights: Vec<Array2<f32>>,
    biases: Vec<Array1<f32>>,
}

impl NetParams {
    /// Builds the initial parameters for a spec, seeded from its generator seed.
    ///
    /// Weights use Xavier-uniform initialization, biases start at zero. The
    /// same spec always produces the same parameters.
    ///
    /// # Errors
    /// Returns an error when a layer's initialization range degenerates.
    pub fn seeded(spec: &NetSpec) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(spec.seed());
        let dims = spec.layer_dims();

        let mut weights = Vec::with_capacity(dims.len());
        let mut biases = Vec::with_capacity(dims.len());

        for (rows, cols) in dims {
            let range = (6.0 / (rows + cols) as f32).sqrt();
            let dist = Uniform::new(-range, range)?;
            weights.push(Array2::from_shape_fn((rows, cols), |_| dist.sample(&mut rng)));
            biases.push(Array1::zeros(rows));
        }

        Ok(Self { weights, biases })
    }

    /// Number of dense layers.
    pub fn layer_count(&self) -> usize {
        self.weights.len()
    }

    /// Total number of scalar parameters across all layers.
    pub fn param_count(&self) -> usize {
        let weights: usize = self.weights.iter().map(|w| w.len()).sum();
        let biases: usize = self.biases.iter().map(|b| b.len()).sum();
        weights + biases
    }

    pub fn weights(&self) -> &[Array2<f32>] {
        &self.weights
    }

    pub fn biases(&self) -> &[Array1<f32>] {
        &self.biases
    }
}

impl Reducible for NetParams {
    fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.weights.len(), other.weights.len());
        debug_assert_eq!(self.biases.len(), other.biases.len());

        for (w, other_w) in self.weights.iter_mut().zip(&other.weights) {
            *w += other_w;
        }
        for (b, other_b) in self.biases.iter_mut().zip(&other.biases) {
            *b += other_b;
        }
    }

    fn scale(&mut self, factor: f32) {
        for w in &mut self.weights {
            *w *= factor;
        }
        for b in &mut self.biases {
            *b *= factor;
        }
    }

    fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        let header = SnapshotHeader {
            layers: self.weights.iter().map(|w| w.dim()).collect(),
        };
        let header = serde_json::to_vec(&header)?;

        let len = Header::try_from(header.len())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        sink.write_all(&len.to_be_bytes())?;
        sink.write_all(&header)?;

        for (w, b) in self.weights.iter().zip(&self.biases) {
            sink.write_all(bytemuck::cast_slice(as_flat(w)?))?;
            sink.write_all(bytemuck::cast_slice(b.as_slice().ok_or_else(non_contiguous)?))?;
        }

        Ok(())
    }
}

fn as_flat(array: &Array2<f32>) -> io::Result<&[f32]> {
    array.as_slice().ok_or_else(non_contiguous)
}

fn non_contiguous() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "parameter matrix is not contiguous")
}
