// Copyright (c) 2026 rezky_nightky

use tiny_skia::{
    BlendMode, Color, FillRule, GradientStop, LinearGradient, Paint as SkPaint, Path,
    PathBuilder, Pixmap, Point, RadialGradient, Rect, Shader, SpreadMode, Transform,
};

use crate::palette::Rgba;

const GLOW_STOPS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Composite {
    SourceOver,
    Lighter,
}

impl Composite {
    fn blend_mode(self) -> BlendMode {
        match self {
            Composite::SourceOver => BlendMode::SourceOver,
            Composite::Lighter => BlendMode::Plus,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

impl ColorStop {
    pub fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    #[cfg(test)]
    Solid(Rgba),
    Linear {
        from: (f32, f32),
        to: (f32, f32),
        stops: [ColorStop; 2],
    },
    Radial {
        center: (f32, f32),
        r0: f32,
        r1: f32,
        stops: [ColorStop; 2],
    },
}

fn sk_color(c: Rgba, alpha: f32) -> Color {
    let mut color = Color::from_rgba8(c.r, c.g, c.b, 255);
    color.set_alpha((c.a * alpha).clamp(0.0, 1.0));
    color
}

// Offsets are squeezed into [inner, 1]; that is how an inner radius is
// expressed on a single-radius gradient.
fn gradient_stops(stops: &[ColorStop; 2], alpha: f32, inner: f32) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|s| {
            let offset = inner + s.offset.clamp(0.0, 1.0) * (1.0 - inner);
            GradientStop::new(offset, sk_color(s.color, alpha))
        })
        .collect()
}

impl Paint {
    fn shader(&self, alpha: f32) -> Option<Shader<'static>> {
        match self {
            #[cfg(test)]
            Paint::Solid(c) => Some(Shader::SolidColor(sk_color(*c, alpha))),
            Paint::Linear { from, to, stops } => LinearGradient::new(
                Point::from_xy(from.0, from.1),
                Point::from_xy(to.0, to.1),
                gradient_stops(stops, alpha, 0.0),
                SpreadMode::Pad,
                Transform::identity(),
            ),
            Paint::Radial {
                center,
                r0,
                r1,
                stops,
            } => {
                let c = Point::from_xy(center.0, center.1);
                let inner = if *r1 > 0.0 {
                    (r0 / r1).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                RadialGradient::new(
                    c,
                    c,
                    *r1,
                    gradient_stops(stops, alpha, inner),
                    SpreadMode::Pad,
                    Transform::identity(),
                )
            }
        }
    }
}

/// `restore` must undo every state change made since the matching `save`.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn clear(&mut self);

    fn save(&mut self);
    fn restore(&mut self);

    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    fn set_global_alpha(&mut self, alpha: f32);
    fn set_composite(&mut self, op: Composite);
    fn set_shadow(&mut self, blur: f32, color: Rgba);

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgba);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: &Paint);
}

#[derive(Clone, Copy, Debug)]
struct DrawState {
    transform: Transform,
    global_alpha: f32,
    composite: Composite,
    shadow_blur: f32,
    shadow_color: Rgba,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            global_alpha: 1.0,
            composite: Composite::SourceOver,
            shadow_blur: 0.0,
            shadow_color: Rgba::TRANSPARENT,
        }
    }
}

/// Premultiplied RGBA raster. Drawing happens in logical pixels and the
/// pixmap may be coarser, so every fill is scaled into raster space.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: f32,
    height: f32,
    pixmap: Option<Pixmap>,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Canvas {
    pub fn new(width: f32, height: f32, px_w: usize, px_h: usize) -> Self {
        let pixmap = match (u32::try_from(px_w), u32::try_from(px_h)) {
            (Ok(w), Ok(h)) => Pixmap::new(w, h),
            _ => None,
        };
        Self {
            width,
            height,
            pixmap,
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32, px_w: usize, px_h: usize) {
        *self = Canvas::new(width, height, px_w, px_h);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[f32; 4]> {
        let pixmap = self.pixmap.as_ref()?;
        let p = pixmap.pixel(u32::try_from(x).ok()?, u32::try_from(y).ok()?)?;
        let ch = |v: u8| v as f32 / 255.0;
        Some([ch(p.red()), ch(p.green()), ch(p.blue()), ch(p.alpha())])
    }

    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        self.pixmap
            .as_ref()
            .map_or(true, |p| p.pixels().iter().all(|px| px.alpha() == 0))
    }

    #[cfg(test)]
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    fn scale(&self) -> Option<(f32, f32)> {
        let pixmap = self.pixmap.as_ref()?;
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some((
            pixmap.width() as f32 / self.width,
            pixmap.height() as f32 / self.height,
        ))
    }

    fn device_transform(&self) -> Option<Transform> {
        let (sx, sy) = self.scale()?;
        Some(Transform::from_scale(sx, sy).pre_concat(self.state.transform))
    }

    fn sk_paint(&self, shader: Shader<'static>) -> SkPaint<'static> {
        SkPaint {
            shader,
            blend_mode: self.state.composite.blend_mode(),
            anti_alias: true,
            ..SkPaint::default()
        }
    }

    fn fill_path(&mut self, path: &Path, paint: &SkPaint<'_>, rule: FillRule, ts: Transform) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(path, paint, rule, ts, None);
        }
    }

    // Gaussian falloff around a core disc, painted as a radial gradient in
    // raster space centred on the polygon.
    fn paint_glow(&mut self, pts: &[Point]) {
        let Some((sx, sy)) = self.scale() else {
            return;
        };
        let sigma = (self.state.shadow_blur * 0.5 * (sx + sy) * 0.5).max(0.35);
        let n = pts.len() as f32;
        let cx = pts.iter().map(|p| p.x).sum::<f32>() / n;
        let cy = pts.iter().map(|p| p.y).sum::<f32>() / n;
        let core = pts
            .iter()
            .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
            .fold(0.0f32, f32::max)
            * 0.6;
        let reach = core + sigma * 3.0;

        let color = self.state.shadow_color;
        let alpha = self.state.global_alpha;
        let mut stops = Vec::with_capacity(GLOW_STOPS + 2);
        stops.push(GradientStop::new(0.0, sk_color(color, alpha)));
        for i in 0..=GLOW_STOPS {
            let e = 3.0 * sigma * i as f32 / GLOW_STOPS as f32;
            let falloff = (-(e * e) / (2.0 * sigma * sigma)).exp();
            stops.push(GradientStop::new(
                (core + e) / reach,
                sk_color(color, alpha * falloff),
            ));
        }

        let center = Point::from_xy(cx, cy);
        let Some(shader) = RadialGradient::new(
            center,
            center,
            reach,
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };
        let Some(disc) = PathBuilder::from_circle(cx, cy, reach) else {
            return;
        };
        let paint = self.sk_paint(shader);
        self.fill_path(&disc, &paint, FillRule::Winding, Transform::identity());
    }
}

impl Surface for Canvas {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(Color::TRANSPARENT);
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.state = s;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform.pre_translate(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform.pre_rotate(radians.to_degrees());
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.state.global_alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn set_composite(&mut self, op: Composite) {
        self.state.composite = op;
    }

    fn set_shadow(&mut self, blur: f32, color: Rgba) {
        self.state.shadow_blur = blur.max(0.0);
        self.state.shadow_color = color;
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        let Some(ts) = self.device_transform() else {
            return;
        };

        if self.state.shadow_blur > 0.0 && self.state.shadow_color.a > 0.0 {
            let mut device: Vec<Point> =
                points.iter().map(|&(x, y)| Point::from_xy(x, y)).collect();
            ts.map_points(&mut device);
            self.paint_glow(&device);
        }

        let mut pb = PathBuilder::new();
        pb.move_to(points[0].0, points[0].1);
        for &(x, y) in &points[1..] {
            pb.line_to(x, y);
        }
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };
        let paint = self.sk_paint(Shader::SolidColor(sk_color(color, self.state.global_alpha)));
        self.fill_path(&path, &paint, FillRule::EvenOdd, ts);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: &Paint) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let Some(ts) = self.device_transform() else {
            return;
        };
        let (Some(rect), Some(shader)) =
            (Rect::from_xywh(x, y, w, h), paint.shader(self.state.global_alpha))
        else {
            return;
        };
        let paint = self.sk_paint(shader);
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_rect(rect, &paint, ts, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(80.0, 32.0, 10, 4)
    }

    #[test]
    fn solid_fill_then_clear_is_blank() {
        let mut c = canvas();
        c.fill_rect(0.0, 0.0, 80.0, 32.0, &Paint::Solid(Rgba::new(255, 0, 0, 1.0)));
        let p = c.pixel(3, 2).unwrap();
        assert_eq!(p, [1.0, 0.0, 0.0, 1.0]);
        c.clear();
        assert!(c.is_blank());
    }

    #[test]
    fn lighter_adds_and_source_over_occludes() {
        let half = Paint::Solid(Rgba::new(255, 255, 255, 0.3));

        let mut over = canvas();
        over.fill_rect(0.0, 0.0, 8.0, 8.0, &half);
        over.fill_rect(0.0, 0.0, 8.0, 8.0, &half);
        let a_over = over.pixel(0, 0).unwrap()[3];

        let mut lighter = canvas();
        lighter.set_composite(Composite::Lighter);
        lighter.fill_rect(0.0, 0.0, 8.0, 8.0, &half);
        lighter.fill_rect(0.0, 0.0, 8.0, 8.0, &half);
        let a_lighter = lighter.pixel(0, 0).unwrap()[3];

        assert!((a_over - 0.51).abs() < 0.01);
        assert!((a_lighter - 0.6).abs() < 0.01);
    }

    #[test]
    fn restore_undoes_transform_and_alpha() {
        let mut c = canvas();
        c.save();
        c.translate(40.0, 16.0);
        c.rotate(1.0);
        c.set_global_alpha(0.1);
        c.restore();
        assert_eq!(c.save_depth(), 0);
        c.fill_rect(0.0, 0.0, 8.0, 8.0, &Paint::Solid(Rgba::new(0, 255, 0, 1.0)));
        assert_eq!(c.pixel(0, 0).unwrap()[3], 1.0);
        assert_eq!(c.pixel(5, 2).unwrap()[3], 0.0);
    }

    #[test]
    fn translated_polygon_lands_at_offset() {
        let mut c = canvas();
        c.translate(44.0, 20.0);
        let square = [(-6.0, -6.0), (6.0, -6.0), (6.0, 6.0), (-6.0, 6.0)];
        c.fill_polygon(&square, Rgba::new(255, 255, 255, 1.0));
        assert!(c.pixel(5, 2).unwrap()[3] > 0.99);
        assert_eq!(c.pixel(0, 0).unwrap()[3], 0.0);
    }

    #[test]
    fn rotation_turns_x_into_y() {
        let mut c = canvas();
        c.translate(40.0, 16.0);
        c.rotate(FRAC_PI_2);
        c.fill_rect(0.0, 0.0, 16.0, 8.0, &Paint::Solid(Rgba::new(255, 255, 255, 1.0)));
        assert!(c.pixel(4, 3).unwrap()[3] > 0.95);
        assert!(c.pixel(5, 2).unwrap()[3] < 0.05);
    }

    #[test]
    fn shadow_glows_beyond_shape() {
        let mut c = Canvas::new(160.0, 160.0, 20, 20);
        c.translate(80.0, 80.0);
        c.set_shadow(14.0, Rgba::new(255, 255, 255, 1.0));
        let tiny = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        c.fill_polygon(&tiny, Rgba::new(255, 255, 255, 1.0));
        assert!(c.pixel(10, 10).unwrap()[3] > 0.5);
        assert!(c.pixel(11, 10).unwrap()[3] > 0.0);
        assert_eq!(c.pixel(0, 0).unwrap()[3], 0.0);
    }

    #[test]
    fn linear_gradient_runs_top_to_bottom() {
        let mut c = canvas();
        c.fill_rect(
            0.0,
            0.0,
            80.0,
            32.0,
            &Paint::Linear {
                from: (0.0, 0.0),
                to: (0.0, 32.0),
                stops: [
                    ColorStop::new(0.0, Rgba::new(0, 0, 0, 0.0)),
                    ColorStop::new(1.0, Rgba::new(0, 0, 0, 1.0)),
                ],
            },
        );
        let top = c.pixel(0, 0).unwrap()[3];
        let bottom = c.pixel(0, 3).unwrap()[3];
        assert!(top < 0.25, "top {top}");
        assert!(bottom > 0.75, "bottom {bottom}");
    }

    #[test]
    fn radial_inner_radius_is_solid() {
        let mut c = canvas();
        c.fill_rect(
            0.0,
            0.0,
            80.0,
            32.0,
            &Paint::Radial {
                center: (40.0, 16.0),
                r0: 8.0,
                r1: 16.0,
                stops: [
                    ColorStop::new(0.0, Rgba::new(255, 255, 255, 1.0)),
                    ColorStop::new(1.0, Rgba::new(255, 255, 255, 0.0)),
                ],
            },
        );
        assert!(c.pixel(5, 2).unwrap()[3] > 0.95);
        assert_eq!(c.pixel(0, 0).unwrap()[3], 0.0);
    }
}
