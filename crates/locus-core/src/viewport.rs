use crate::scale::LinearScale;

pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 10.0;

/// Factor applied by the zoom-in/zoom-out buttons.
pub const ZOOM_STEP: f64 = 1.2;

/// Horizontal affine view transform over the locus plot: `px' = px·scale + translate_x`.
/// Owned exclusively by the session; rendering layers only ever see the
/// composed scale produced by [`Viewport::transform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scale: f64,
    translate_x: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate_x(&self) -> f64 {
        self.translate_x
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.translate_x == 0.0
    }

    /// Back to identity. Invoked whenever a new dataset is loaded, since the
    /// coordinate domain it was zoomed into no longer exists.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Multiply the scale, anchored at the viewport center.
    pub fn zoom_by(&mut self, factor: f64, width: f64) {
        self.zoom_about(factor, width / 2.0, width);
    }

    /// Multiply the scale, keeping the plot point under `anchor_px`
    /// stationary (wheel gesture). The scale is clamped to [1, 10] and the
    /// anchor math uses the factor that actually applied after clamping.
    pub fn zoom_about(&mut self, factor: f64, anchor_px: f64, width: f64) {
        let previous = self.scale;
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let applied = self.scale / previous;
        self.translate_x = anchor_px - applied * (anchor_px - self.translate_x);
        self.clamp_translate(width);
    }

    /// Shift the view by `dx` screen pixels (drag gesture).
    pub fn pan_by(&mut self, dx: f64, width: f64) {
        self.translate_x += dx;
        self.clamp_translate(width);
    }

    // The visible window may never leave the plotted extent: with
    // scale >= 1, translate stays in [width·(1−scale), 0].
    fn clamp_translate(&mut self, width: f64) {
        let min = width * (1.0 - self.scale);
        self.translate_x = self.translate_x.clamp(min, 0.0);
    }

    /// Compose this transform onto the base x mapper. The session computes
    /// this once per frame and hands the same composed scale to every
    /// position-dependent layer, so axis, points, and track can never move
    /// out of step.
    pub fn transform(&self, base: &LinearScale) -> LinearScale {
        let (r0, r1) = base.range();
        base.with_range((
            r0 * self.scale + self.translate_x,
            r1 * self.scale + self.translate_x,
        ))
    }
}
