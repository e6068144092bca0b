use crate::error::{ModelError, Result};

/// Selects which network shape a spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetVariant {
    /// A single dense layer from input to output.
    Shallow,
    /// A chain of dense layers through the hidden widths.
    Deep,
}

/// Immutable network description consumed once at setup.
#[derive(Debug, Clone)]
pub struct NetSpec {
    seed: u64,
    l2: f32,
    momentum: f32,
    n_in: usize,
    n_out: usize,
    hidden: Option<Vec<usize>>,
    variant: NetVariant,
}

impl NetSpec {
    /// Creates a new network spec.
    ///
    /// # Arguments
    /// * `seed` - Seed for the parameter initialization generator.
    /// * `l2` - Regularization coefficient.
    /// * `momentum` - Momentum coefficient.
    /// * `n_in` - Input width.
    /// * `n_out` - Output width.
    /// * `hidden` - Hidden layer widths, required for the deep variant.
    /// * `variant` - Which network shape to build.
    ///
    /// # Errors
    /// Returns an error when a width is zero or the deep variant is missing
    /// its hidden widths.
    pub fn new(
        seed: u64,
        l2: f32,
        momentum: f32,
        n_in: usize,
        n_out: usize,
        hidden: Option<Vec<usize>>,
        variant: NetVariant,
    ) -> Result<Self> {
        if n_in == 0 {
            return Err(ModelError::ZeroWidth { field: "n_in" });
        }
        if n_out == 0 {
            return Err(ModelError::ZeroWidth { field: "n_out" });
        }

        if variant == NetVariant::Deep {
            match &hidden {
                None => return Err(ModelError::MissingHiddenLayers),
                Some(widths) if widths.is_empty() => return Err(ModelError::MissingHiddenLayers),
                Some(widths) if widths.contains(&0) => {
                    return Err(ModelError::ZeroWidth { field: "hidden" });
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            seed,
            l2,
            momentum,
            n_in,
            n_out,
            hidden,
            variant,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn l2(&self) -> f32 {
        self.l2
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    pub fn n_in(&self) -> usize {
        self.n_in
    }

    pub fn n_out(&self) -> usize {
        self.n_out
    }

    pub fn variant(&self) -> NetVariant {
        self.variant
    }

    /// Resolves the `(rows, cols)` dimensions of every dense layer, in order.
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        let widths: Vec<usize> = match self.variant {
            NetVariant::Shallow => vec![self.n_in, self.n_out],
            NetVariant::Deep => {
                let hidden = self.hidden.as_deref().unwrap_or_default();
                let mut widths = Vec::with_capacity(hidden.len() + 2);
                widths.push(self.n_in);
                widths.extend_from_slice(hidden);
                widths.push(self.n_out);
                widths
            }
        };

        widths
            .windows(2)
            .map(|pair| (pair[1], pair[0]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(variant: NetVariant, hidden: Option<Vec<usize>>) -> Result<NetSpec> {
        NetSpec::new(42, 0.01, 0.9, 4, 2, hidden, variant)
    }

    #[test]
    fn shallow_spec_has_a_single_layer() {
        let spec = spec(NetVariant::Shallow, None).unwrap();
        assert_eq!(spec.layer_dims(), vec![(2, 4)]);
    }

    #[test]
    fn deep_spec_chains_hidden_widths() {
        let spec = spec(NetVariant::Deep, Some(vec![8, 3])).unwrap();
        assert_eq!(spec.layer_dims(), vec![(8, 4), (3, 8), (2, 3)]);
    }

    #[test]
    fn deep_spec_requires_hidden_widths() {
        assert!(matches!(
            spec(NetVariant::Deep, None),
            Err(ModelError::MissingHiddenLayers)
        ));
        assert!(matches!(
            spec(NetVariant::Deep, Some(vec![])),
            Err(ModelError::MissingHiddenLayers)
        ));
    }

    #[test]
    fn zero_widths_are_rejected() {
        assert!(NetSpec::new(0, 0.0, 0.0, 0, 2, None, NetVariant::Shallow).is_err());
        assert!(NetSpec::new(0, 0.0, 0.0, 4, 0, None, NetVariant::Shallow).is_err());
        assert!(spec(NetVariant::Deep, Some(vec![4, 0])).is_err());
    }
}
