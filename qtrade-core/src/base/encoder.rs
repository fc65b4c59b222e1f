//! Encoding observations into feature vectors.

/// Maps an observation to a fixed-width vector of features.
///
/// A batch of `n` observations is encoded into `n * dim()` values laid out row by
/// row, which backends reshape into a `[n, dim()]` input tensor.
pub trait Encoder<O> {
    /// Width of the feature vector.
    fn dim(&self) -> usize;

    /// Appends the `dim()` features of `obs` to `buf`.
    fn encode_into(&self, obs: &O, buf: &mut Vec<f32>);

    /// Encodes a batch of observations. Absent observations are encoded as zeros.
    fn encode_batch<'a, I>(&self, batch: I) -> Vec<f32>
    where
        O: 'a,
        I: IntoIterator<Item = Option<&'a O>>,
    {
        let mut buf = Vec::new();
        for obs in batch {
            match obs {
                Some(obs) => self.encode_into(obs, &mut buf),
                None => buf.extend(std::iter::repeat(0f32).take(self.dim())),
            }
        }
        buf
    }
}
