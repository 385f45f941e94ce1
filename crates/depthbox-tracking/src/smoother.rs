/// Exponential moving average over a scalar stream.
///
/// The first update after construction or [`Smoother::reset`] is returned verbatim.
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f32,
    value: Option<f32>,
}

impl Smoother {
    /// `alpha` is the weight of each new sample, in (0, 1].
    pub fn new(alpha: f32) -> Self {
        debug_assert!(alpha > 0.0 && alpha <= 1.0, "alpha out of range: {alpha}");
        Self { alpha, value: None }
    }

    pub fn update(&mut self, sample: f32) -> f32 {
        let next = match self.value {
            None => sample,
            Some(prev) => prev * (1.0 - self.alpha) + sample * self.alpha,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f32> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}
