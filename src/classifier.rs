//! A four-layer fully-connected classifier for 28x28 grayscale digits.
//!
//! References:
//! - https://github.com/pytorch/examples/tree/main/mnist
//! - https://burn.dev/books/burn/basic-workflow/model.html

use crate::error::ShapeError;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::log_softmax;

/// Elements per flattened sample (28 * 28 grayscale pixels).
pub const NUM_FEATURES: usize = 784;

/// One class per digit, 0 through 9.
pub const NUM_CLASSES: usize = 10;

#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub fc3: Linear<B>,
    pub fc4: Linear<B>,
    pub dropout: Dropout,
    pub activation: Relu,
}

#[derive(Config, Debug)]
pub struct ClassifierConfig {
    #[config(default = 256)]
    pub d_hidden1: usize,

    #[config(default = 128)]
    pub d_hidden2: usize,

    #[config(default = 64)]
    pub d_hidden3: usize,

    /// Probability of zeroing each hidden unit while training.
    /// Survivors are scaled by `1 / (1 - dropout)`.
    #[config(default = 0.3)]
    pub dropout: f64,
}

impl ClassifierConfig {
    /// Returns the initialized model.
    ///
    /// All four weight/bias pairs are allocated here, with the backend's
    /// default initialization, and are never reallocated afterwards.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Classifier<B> {
        Classifier {
            fc1: LinearConfig::new(NUM_FEATURES, self.d_hidden1).init(device),
            fc2: LinearConfig::new(self.d_hidden1, self.d_hidden2).init(device),
            fc3: LinearConfig::new(self.d_hidden2, self.d_hidden3).init(device),
            fc4: LinearConfig::new(self.d_hidden3, NUM_CLASSES).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            activation: Relu::new(),
        }
    }
}

impl<B: Backend> Classifier<B> {
    /// Maps a batch of images to per-class log-probabilities.
    ///
    /// The leading dimension is the batch; the trailing dimensions may have
    /// any shape whose element count is [`NUM_FEATURES`], and are flattened
    /// before the first linear layer. Anything else fails with
    /// [`ShapeError::Mismatch`] before any layer runs.
    ///
    /// Dropout is only applied on gradient-recording backends (training).
    /// On an inference backend, or after [`AutodiffModule::valid`], the
    /// output is a pure function of the input.
    ///
    /// [`AutodiffModule::valid`]: burn::module::AutodiffModule::valid
    ///
    /// # Shapes
    ///   - Input [batch, ...], with `...` multiplying to 784
    ///   - Output [batch, 10]
    pub fn forward<const D: usize>(
        &self,
        input: Tensor<B, D>,
    ) -> Result<Tensor<B, 2>, ShapeError> {
        let dims = input.dims();
        let batch = dims[0];
        let features: usize = dims[1..].iter().product();
        if features != NUM_FEATURES {
            return Err(ShapeError::Mismatch {
                expected: NUM_FEATURES,
                found: features,
                dims: dims.to_vec(),
            });
        }

        let x = input.reshape([batch, NUM_FEATURES]);

        let x = self.dropout.forward(self.activation.forward(self.fc1.forward(x)));
        let x = self.dropout.forward(self.activation.forward(self.fc2.forward(x)));
        let x = self.dropout.forward(self.activation.forward(self.fc3.forward(x)));

        let x = self.fc4.forward(x);
        debug_assert_eq!([batch, NUM_CLASSES], x.dims());

        Ok(log_softmax(x, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::module::AutodiffModule;
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32, i32>;

    fn rows(output: Tensor<TestBackend, 2>) -> Vec<Vec<f32>> {
        let [_, classes] = output.dims();
        output
            .into_data()
            .to_vec::<f32>()
            .unwrap()
            .chunks(classes)
            .map(|row| row.to_vec())
            .collect()
    }

    fn assert_rows_normalized(rows: &[Vec<f32>]) {
        for row in rows {
            let sum: f32 = row.iter().map(|v| v.exp()).sum();
            assert!((sum - 1.0).abs() < 1e-5, "row exp-sum was {sum}");
        }
    }

    #[test]
    fn forward_output_shape() {
        let device = Default::default();
        let model = ClassifierConfig::new().init::<TestBackend>(&device);
        let input =
            Tensor::<TestBackend, 3>::random([5, 28, 28], Distribution::Default, &device);

        let output = model.forward(input).unwrap();

        assert_eq!([5, NUM_CLASSES], output.dims());
    }

    #[test]
    fn forward_rows_are_log_probabilities() {
        let device = Default::default();
        let model = ClassifierConfig::new().init::<TestBackend>(&device);
        let input =
            Tensor::<TestBackend, 3>::random([3, 28, 28], Distribution::Default, &device);

        let output = model.forward(input).unwrap();

        assert_rows_normalized(&rows(output));
    }

    #[test]
    fn forward_is_idempotent_without_autodiff() {
        let device = Default::default();
        let model = ClassifierConfig::new().init::<TestBackend>(&device);
        let input =
            Tensor::<TestBackend, 3>::random([2, 28, 28], Distribution::Default, &device);

        let first = model.forward(input.clone()).unwrap();
        let second = model.forward(input).unwrap();

        assert_eq!(
            first.into_data().to_vec::<f32>().unwrap(),
            second.into_data().to_vec::<f32>().unwrap(),
        );
    }

    #[test]
    fn forward_invariants_hold_while_training() {
        // With dropout active the outputs of repeated calls may differ, so
        // only the shape and normalization invariants are asserted.
        let device = Default::default();
        let model = ClassifierConfig::new().init::<Autodiff<TestBackend>>(&device);
        let input = Tensor::<Autodiff<TestBackend>, 3>::random(
            [4, 28, 28],
            Distribution::Default,
            &device,
        );

        let output = model.forward(input).unwrap();

        assert_eq!([4, NUM_CLASSES], output.dims());
        assert_rows_normalized(&rows(output.inner()));
    }

    #[test]
    fn valid_model_runs_without_dropout() {
        let device = Default::default();
        let model = ClassifierConfig::new().init::<Autodiff<TestBackend>>(&device);
        let model = model.valid();
        let input = Tensor::<TestBackend, 3>::zeros([2, 28, 28], &device);

        let first = model.forward(input.clone()).unwrap();
        let second = model.forward(input).unwrap();

        assert_eq!(
            first.into_data().to_vec::<f32>().unwrap(),
            second.into_data().to_vec::<f32>().unwrap(),
        );
    }

    #[test]
    fn forward_accepts_any_784_element_samples() {
        let device = Default::default();
        let model = ClassifierConfig::new().init::<TestBackend>(&device);

        let flat = Tensor::<TestBackend, 2>::zeros([2, 784], &device);
        assert_eq!([2, NUM_CLASSES], model.forward(flat).unwrap().dims());

        let ribbon = Tensor::<TestBackend, 3>::zeros([2, 1, 784], &device);
        assert_eq!([2, NUM_CLASSES], model.forward(ribbon).unwrap().dims());
    }

    #[test]
    fn forward_rejects_wrong_sample_sizes() {
        let device = Default::default();
        let model = ClassifierConfig::new().init::<TestBackend>(&device);

        for features in [783, 785] {
            let input = Tensor::<TestBackend, 2>::zeros([2, features], &device);
            let err = model.forward(input).unwrap_err();
            assert_eq!(
                ShapeError::Mismatch {
                    expected: NUM_FEATURES,
                    found: features,
                    dims: vec![2, features],
                },
                err,
            );
        }
    }

    #[test]
    fn zero_batch_rows_are_identical() {
        let device = Default::default();
        let model = ClassifierConfig::new().init::<TestBackend>(&device);
        let input = Tensor::<TestBackend, 3>::zeros([4, 28, 28], &device);

        let output = model.forward(input).unwrap();
        assert_eq!([4, NUM_CLASSES], output.dims());

        let rows = rows(output);
        assert_rows_normalized(&rows);
        for row in &rows[1..] {
            assert_eq!(&rows[0], row);
        }
    }
}
