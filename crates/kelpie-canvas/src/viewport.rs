use kelpie_core::geom::{Point, Rect, Size, Transform, Vector, point, rect, size, vector};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportOptions {
    pub width: f64,
    pub height: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Multiplicative step applied by `zoom_in`/`zoom_out`.
    pub zoom_step: f64,
    /// Cap applied by fit-to-content so small diagrams are not blown up.
    pub fit_max_scale: f64,
    pub fit_padding: f64,
    /// Rendered footprint of one node; expands the content box during fit.
    pub node_size: Size,
    pub default_scale: f64,
    pub default_translation: Vector,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            min_scale: 0.1,
            max_scale: 4.0,
            zoom_step: 1.2,
            fit_max_scale: 1.0,
            fit_padding: 48.0,
            node_size: size(240.0, 120.0),
            default_scale: 1.0,
            default_translation: vector(0.0, 0.0),
        }
    }
}

/// Clamp applied by timeline-style surfaces: the outermost content edges may
/// never be panned past a fixed screen-space margin. The bounds are
/// re-evaluated against the current scale on every pan and zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanClamp {
    pub margin: f64,
    pub content_min_x: f64,
    pub content_max_x: f64,
}

/// The 2D affine content→screen transform: `screen = content * scale + t`.
///
/// The viewport is independent of node content; it only ever sees content
/// coordinates and its own size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    opts: ViewportOptions,
    scale: f64,
    translation: Vector,
    clamp: Option<PanClamp>,
}

impl Viewport {
    pub fn new(opts: ViewportOptions) -> Self {
        Self {
            scale: opts.default_scale,
            translation: opts.default_translation,
            clamp: None,
            opts,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> Vector {
        self.translation
    }

    pub fn viewport_size(&self) -> Size {
        size(self.opts.width, self.opts.height)
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.opts.width = width;
        self.opts.height = height;
        self.apply_clamp();
    }

    pub fn transform(&self) -> Transform {
        Transform::scale(self.scale, self.scale).then_translate(self.translation)
    }

    pub fn to_screen(&self, p: Point) -> Point {
        point(
            p.x * self.scale + self.translation.x,
            p.y * self.scale + self.translation.y,
        )
    }

    pub fn to_content(&self, p: Point) -> Point {
        if self.scale == 0.0 {
            return point(0.0, 0.0);
        }
        point(
            (p.x - self.translation.x) / self.scale,
            (p.y - self.translation.y) / self.scale,
        )
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.opts.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / self.opts.zoom_step);
    }

    /// Scales by `factor` while holding the content point under the viewport
    /// center fixed on screen.
    pub fn zoom_by(&mut self, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        let new_scale = (self.scale * factor).clamp(self.opts.min_scale, self.opts.max_scale);
        if (new_scale - self.scale).abs() <= f64::EPSILON {
            return;
        }
        let center = point(self.opts.width / 2.0, self.opts.height / 2.0);
        let anchor = self.to_content(center);
        self.scale = new_scale;
        self.translation = center - anchor * new_scale;
        self.apply_clamp();
    }

    pub fn pan_by(&mut self, delta: Vector) {
        self.translation += delta;
        self.apply_clamp();
    }

    pub fn set_pan_clamp(&mut self, clamp: Option<PanClamp>) {
        self.clamp = clamp;
        self.apply_clamp();
    }

    pub fn reset(&mut self) {
        self.scale = self.opts.default_scale;
        self.translation = self.opts.default_translation;
        self.apply_clamp();
    }

    /// Scales and translates so `bounds` is fully visible and centered.
    /// A degenerate box (no content, or zero width/height) falls back to the
    /// default view instead of dividing by zero.
    pub fn fit_to_content(&mut self, bounds: Option<Rect>) {
        let Some(b) = bounds.filter(|b| b.size.width > 0.0 && b.size.height > 0.0) else {
            debug!("degenerate content box, falling back to the default view");
            self.reset();
            return;
        };
        let b = b.inflate(self.opts.fit_padding, self.opts.fit_padding);
        let scale = (self.opts.width / b.size.width)
            .min(self.opts.height / b.size.height)
            .min(self.opts.fit_max_scale)
            .max(self.opts.min_scale);
        self.scale = scale;
        self.translation = vector(
            (self.opts.width - b.size.width * scale) / 2.0 - b.origin.x * scale,
            (self.opts.height - b.size.height * scale) / 2.0 - b.origin.y * scale,
        );
        self.apply_clamp();
    }

    fn apply_clamp(&mut self) {
        let Some(c) = self.clamp else {
            return;
        };
        // leftmost edge may not drift right of `margin`; rightmost edge may
        // not drift left of `width - margin`
        let hi = c.margin - c.content_min_x * self.scale;
        let lo = self.opts.width - c.margin - c.content_max_x * self.scale;
        self.translation.x = if lo <= hi {
            self.translation.x.clamp(lo, hi)
        } else {
            // content narrower than the clamp window: keep it centered
            (lo + hi) / 2.0
        };
    }
}

/// Axis-aligned bounding box of the given positions, each expanded by the
/// rendered node footprint. `None` when there are no positions at all.
pub fn content_bounds(positions: impl IntoIterator<Item = Point>, footprint: Size) -> Option<Rect> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in positions {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    if !min_x.is_finite() {
        return None;
    }
    Some(rect(
        min_x,
        min_y,
        max_x - min_x + footprint.width,
        max_y - min_y + footprint.height,
    ))
}
