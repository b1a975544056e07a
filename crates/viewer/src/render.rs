use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use locus_core::scene::{DrawOp, Paint, TextAnchor};

/// Concrete colors for the scene's semantic paint slots, read from CSS
/// custom properties so the stylesheet stays the single source of theme.
#[derive(Clone)]
pub struct Colors {
    pub axis: String,
    pub axis_label: String,
    pub point: String,
    pub point_hover: String,
    pub point_selected: String,
    pub gene_body: String,
    pub exon: String,
    pub gene_label: String,
    pub effect_bar: String,
    pub whisker: String,
    pub baseline: String,
    pub annotation: String,
}

impl Colors {
    pub fn from_element(el: &web_sys::Element) -> Self {
        let style = web_sys::window()
            .unwrap()
            .get_computed_style(el)
            .unwrap()
            .unwrap();
        let g = |name: &str| -> String {
            style
                .get_property_value(name)
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        Self {
            axis: g("--axis-color"),
            axis_label: g("--axis-label-color"),
            point: g("--point-color"),
            point_hover: g("--point-color-hover"),
            point_selected: g("--point-color-selected"),
            gene_body: g("--gene-body-color"),
            exon: g("--exon-color"),
            gene_label: g("--gene-label-color"),
            effect_bar: g("--effect-bar-color"),
            whisker: g("--whisker-color"),
            baseline: g("--baseline-color"),
            annotation: g("--annotation-color"),
        }
    }

    fn resolve(&self, paint: Paint) -> &str {
        match paint {
            Paint::Axis => &self.axis,
            Paint::AxisLabel => &self.axis_label,
            Paint::Point => &self.point,
            Paint::PointHover => &self.point_hover,
            Paint::PointSelected => &self.point_selected,
            Paint::GeneBody => &self.gene_body,
            Paint::Exon => &self.exon,
            Paint::GeneLabel => &self.gene_label,
            Paint::EffectBar => &self.effect_bar,
            Paint::Whisker => &self.whisker,
            Paint::Baseline => &self.baseline,
            Paint::Annotation => &self.annotation,
        }
    }
}

pub fn size_canvas(canvas: &HtmlCanvasElement, width: u32, height: u32) {
    if canvas.width() != width {
        canvas.set_width(width);
    }
    if canvas.height() != height {
        canvas.set_height(height);
    }
}

pub fn clear_canvas(canvas: &HtmlCanvasElement) {
    let ctx = get_ctx(canvas);
    ctx.save();
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).unwrap();
    ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    ctx.restore();
}

/// Run a layer's draw ops against a canvas, with the plot origin shifted
/// by `origin` so the scene can use plot-area coordinates.
pub fn execute(canvas: &HtmlCanvasElement, ops: &[DrawOp], colors: &Colors, origin: (f64, f64)) {
    let ctx = get_ctx(canvas);
    ctx.save();
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).unwrap();
    ctx.translate(origin.0, origin.1).unwrap();
    ctx.set_line_cap("round");

    for op in ops {
        match op {
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                paint,
            } => {
                ctx.set_stroke_style_str(colors.resolve(*paint));
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(*x1, *y1);
                ctx.line_to(*x2, *y2);
                ctx.stroke();
            }
            DrawOp::Rect {
                x,
                y,
                w,
                h,
                filled,
                paint,
            } => {
                if *filled {
                    ctx.set_fill_style_str(colors.resolve(*paint));
                    ctx.fill_rect(*x, *y, *w, *h);
                } else {
                    ctx.set_stroke_style_str(colors.resolve(*paint));
                    ctx.stroke_rect(*x, *y, *w, *h);
                }
            }
            DrawOp::Circle {
                x,
                y,
                radius,
                filled,
                paint,
            } => {
                ctx.begin_path();
                ctx.arc(*x, *y, *radius, 0.0, std::f64::consts::TAU).unwrap();
                ctx.close_path();
                if *filled {
                    ctx.set_fill_style_str(colors.resolve(*paint));
                    ctx.fill();
                } else {
                    ctx.set_stroke_style_str(colors.resolve(*paint));
                    ctx.stroke();
                }
            }
            DrawOp::Text {
                x,
                y,
                text,
                size,
                angle,
                anchor,
                paint,
            } => {
                ctx.save();
                ctx.set_fill_style_str(colors.resolve(*paint));
                ctx.set_font(&format!("{}px sans-serif", size));
                ctx.set_text_align(match anchor {
                    TextAnchor::Start => "left",
                    TextAnchor::Middle => "center",
                    TextAnchor::End => "right",
                });
                ctx.translate(*x, *y).unwrap();
                if *angle != 0.0 {
                    ctx.rotate(angle.to_radians()).unwrap();
                }
                ctx.fill_text(text, 0.0, 0.0).unwrap();
                ctx.restore();
            }
        }
    }

    ctx.restore();
}

fn get_ctx(canvas: &HtmlCanvasElement) -> CanvasRenderingContext2d {
    canvas
        .get_context("2d")
        .unwrap()
        .unwrap()
        .dyn_into::<CanvasRenderingContext2d>()
        .unwrap()
}
