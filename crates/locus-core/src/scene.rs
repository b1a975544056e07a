use crate::scale::{effect_scale, LinearScale, PlotScales, CI_Z};
use crate::types::{gene_body_extent, Dataset, EffectSizeDetail, ExonRecord};

// ─── Draw vocabulary ────────────────────────────────────────────────

/// Semantic color slots. The drawing surface resolves these to concrete
/// colors (the viewer reads them from CSS custom properties); the scene
/// builders stay free of presentation details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Axis,
    AxisLabel,
    Point,
    PointHover,
    PointSelected,
    GeneBody,
    Exon,
    GeneLabel,
    EffectBar,
    Whisker,
    Baseline,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Primitive drawing instruction. Each layer builder returns a list of
/// these; executing them in order reproduces the layer exactly, so a
/// redraw is always a pure function of current state.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        paint: Paint,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        filled: bool,
        paint: Paint,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        filled: bool,
        paint: Paint,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f64,
        /// Degrees, clockwise, about the text origin.
        angle: f64,
        anchor: TextAnchor,
        paint: Paint,
    },
}

pub const POINT_RADIUS: f64 = 4.0;
pub const POINT_RADIUS_ACTIVE: f64 = 7.0;
/// Pick radius for click/hover hit scans, slightly larger than a point.
pub const HIT_RADIUS: f64 = 9.0;

const TICK_LEN: f64 = 6.0;
const TICK_FONT: f64 = 10.0;
const TITLE_FONT: f64 = 11.0;
const X_TICK_TARGET: usize = 6;
const Y_TICK_TARGET: usize = 5;
/// Below this many pixels per tick the x labels rotate 45°.
const ROTATE_SPACING_PX: f64 = 80.0;

const EXON_HEIGHT: f64 = 10.0;
const EFFECT_BAR_WIDTH: f64 = 36.0;
const EFFECT_CAP_WIDTH: f64 = 14.0;
/// Vertical band reserved for the effect-size panel's annotation text.
const EFFECT_TITLE_BAND: f64 = 36.0;

/// Megabase tick label: position/10⁶ with 2 decimals.
pub fn format_mb(position: f64) -> String {
    format!("{:.2}", position / 1e6)
}

// ─── Axis layer ─────────────────────────────────────────────────────

/// Axis lines plus ticks. The x side is built from the *composed* scale,
/// so ticks track the viewport exactly like the points do.
pub fn axis_layer(scales: &PlotScales, width: f64, height: f64) -> Vec<DrawOp> {
    let mut ops = vec![
        DrawOp::Line {
            x1: 0.0,
            y1: height,
            x2: width,
            y2: height,
            width: 1.0,
            paint: Paint::Axis,
        },
        DrawOp::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: height,
            width: 1.0,
            paint: Paint::Axis,
        },
    ];

    // X ticks over the currently visible domain.
    let d0 = scales.x.invert(0.0);
    let d1 = scales.x.invert(width);
    let step = tick_step(d1 - d0, X_TICK_TARGET);
    if step.is_finite() && step > 0.0 {
        let spacing_px = scales.x.apply(d0 + step) - scales.x.apply(d0);
        let rotated = spacing_px < ROTATE_SPACING_PX;
        let mut v = (d0 / step).ceil() * step;
        while v <= d1 + step * 1e-9 {
            let px = scales.x.apply(v);
            if (-0.5..=width + 0.5).contains(&px) {
                ops.push(DrawOp::Line {
                    x1: px,
                    y1: height,
                    x2: px,
                    y2: height + TICK_LEN,
                    width: 1.0,
                    paint: Paint::Axis,
                });
                ops.push(DrawOp::Text {
                    x: px,
                    y: height + TICK_LEN + TICK_FONT + 2.0,
                    text: format_mb(v),
                    size: TICK_FONT,
                    angle: if rotated { 45.0 } else { 0.0 },
                    anchor: if rotated {
                        TextAnchor::Start
                    } else {
                        TextAnchor::Middle
                    },
                    paint: Paint::AxisLabel,
                });
            }
            v += step;
        }
    }

    // Y ticks over the significance scale.
    let (y0, y1) = scales.y.domain();
    let step = tick_step(y1 - y0, Y_TICK_TARGET);
    if step.is_finite() && step > 0.0 {
        let mut v = (y0 / step).ceil() * step;
        while v <= y1 + step * 1e-9 {
            let py = scales.y.apply(v);
            ops.push(DrawOp::Line {
                x1: -TICK_LEN,
                y1: py,
                x2: 0.0,
                y2: py,
                width: 1.0,
                paint: Paint::Axis,
            });
            let text = if step >= 1.0 {
                format!("{:.0}", v)
            } else {
                format!("{:.1}", v)
            };
            ops.push(DrawOp::Text {
                x: -TICK_LEN - 3.0,
                y: py + 3.0,
                text,
                size: TICK_FONT,
                angle: 0.0,
                anchor: TextAnchor::End,
                paint: Paint::AxisLabel,
            });
            v += step;
        }
    }

    ops.push(DrawOp::Text {
        x: width / 2.0,
        y: height + 38.0,
        text: "Position (Mb)".to_string(),
        size: TITLE_FONT,
        angle: 0.0,
        anchor: TextAnchor::Middle,
        paint: Paint::AxisLabel,
    });
    ops.push(DrawOp::Text {
        x: -38.0,
        y: height / 2.0,
        text: "-log10(p)".to_string(),
        size: TITLE_FONT,
        angle: -90.0,
        anchor: TextAnchor::Middle,
        paint: Paint::AxisLabel,
    });

    ops
}

// 1-2-5 tick interval covering `span` with roughly `target` ticks.
fn tick_step(span: f64, target: usize) -> f64 {
    if !(span.is_finite() && span > 0.0) {
        return f64::NAN;
    }
    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

// ─── Scatter layer ──────────────────────────────────────────────────

/// One point per record, culled to the visible width.
pub fn scatter_layer(dataset: &Dataset, scales: &PlotScales, width: f64) -> Vec<DrawOp> {
    let mut ops = Vec::with_capacity(dataset.len());
    for (i, rec) in dataset.records().iter().enumerate() {
        let px = scales.x.apply(rec.variant.position as f64);
        if px < -POINT_RADIUS_ACTIVE || px > width + POINT_RADIUS_ACTIVE {
            continue;
        }
        ops.push(DrawOp::Circle {
            x: px,
            y: scales.y.apply(dataset.log_significance()[i]),
            radius: POINT_RADIUS,
            filled: true,
            paint: Paint::Point,
        });
    }
    ops
}

/// Hover and selection emphasis, drawn on top of the base scatter.
/// Hover is transient and never displaces the persisted selection, so the
/// selected point is emitted last.
pub fn highlight_layer(
    dataset: &Dataset,
    scales: &PlotScales,
    selected: Option<usize>,
    hover: Option<usize>,
    width: f64,
) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    let emphasize = |index: usize, paint: Paint, ops: &mut Vec<DrawOp>| {
        let Some(rec) = dataset.records().get(index) else {
            return;
        };
        let px = scales.x.apply(rec.variant.position as f64);
        if px < -POINT_RADIUS_ACTIVE || px > width + POINT_RADIUS_ACTIVE {
            return;
        }
        ops.push(DrawOp::Circle {
            x: px,
            y: scales.y.apply(dataset.log_significance()[index]),
            radius: POINT_RADIUS_ACTIVE,
            filled: true,
            paint,
        });
    };
    if let Some(h) = hover {
        if selected != Some(h) {
            emphasize(h, Paint::PointHover, &mut ops);
        }
    }
    if let Some(s) = selected {
        emphasize(s, Paint::PointSelected, &mut ops);
    }
    ops
}

/// Nearest point within [`HIT_RADIUS`] of the cursor, if any.
pub fn hit_scan(dataset: &Dataset, scales: &PlotScales, px: f64, py: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, rec) in dataset.records().iter().enumerate() {
        let dx = scales.x.apply(rec.variant.position as f64) - px;
        let dy = scales.y.apply(dataset.log_significance()[i]) - py;
        let d2 = dx * dx + dy * dy;
        if d2 <= HIT_RADIUS * HIT_RADIUS && best.is_none_or(|(_, bd)| d2 < bd) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}

// ─── Gene track layer ───────────────────────────────────────────────

/// Gene body line, exon boxes, and the gene-name label. Only drawn once an
/// exon set is loaded; positions come through the composed x scale so the
/// track zooms in lockstep with the scatter.
pub fn gene_track_layer(
    exons: &[ExonRecord],
    gene_label: &str,
    x: &LinearScale,
    width: f64,
    track_height: f64,
) -> Vec<DrawOp> {
    let Some((start, end)) = gene_body_extent(exons) else {
        return Vec::new();
    };
    let mut ops = Vec::new();
    let mid_y = track_height * 0.4;
    let x0 = x.apply(start as f64);
    let x1 = x.apply(end as f64);

    let body0 = x0.max(0.0);
    let body1 = x1.min(width);
    if body1 > body0 {
        ops.push(DrawOp::Line {
            x1: body0,
            y1: mid_y,
            x2: body1,
            y2: mid_y,
            width: 2.0,
            paint: Paint::GeneBody,
        });
    }

    for exon in exons {
        let ex0 = x.apply(exon.start_position as f64);
        let ex1 = x.apply(exon.end_position as f64);
        if ex1 < 0.0 || ex0 > width {
            continue;
        }
        ops.push(DrawOp::Rect {
            x: ex0,
            y: mid_y - EXON_HEIGHT / 2.0,
            w: (ex1 - ex0).max(1.0),
            h: EXON_HEIGHT,
            filled: true,
            paint: Paint::Exon,
        });
    }

    let label_x = (x0 + x1) / 2.0;
    if (0.0..=width).contains(&label_x) {
        ops.push(DrawOp::Text {
            x: label_x,
            y: track_height - 4.0,
            text: gene_label.to_string(),
            size: TITLE_FONT,
            angle: 0.0,
            anchor: TextAnchor::Middle,
            paint: Paint::GeneLabel,
        });
    }

    ops
}

// ─── Effect-size layer ──────────────────────────────────────────────

/// Error-bar panel for the selected pair: bar from the zero baseline to
/// beta, whisker spanning the 95% interval with end caps, and the interval
/// annotated to 3 decimals.
pub fn effect_size_layer(detail: &EffectSizeDetail, width: f64, height: f64) -> Vec<DrawOp> {
    let lo = detail.beta - CI_Z * detail.se;
    let hi = detail.beta + CI_Z * detail.se;
    let scale = effect_scale(detail.beta, detail.se, height - EFFECT_TITLE_BAND);
    let y_of = |v: f64| scale.apply(v) + EFFECT_TITLE_BAND;

    let cx = width / 2.0;
    let y_zero = y_of(0.0);
    let y_beta = y_of(detail.beta);

    let variant_label = detail
        .variant
        .rsid
        .as_deref()
        .unwrap_or(&detail.variant.variant_id);
    let gene_label = detail
        .gene
        .gene_name
        .as_deref()
        .unwrap_or(&detail.gene.gene_id);

    let mut ops = vec![
        DrawOp::Text {
            x: cx,
            y: 14.0,
            text: format!("{} \u{2192} {}", variant_label, gene_label),
            size: TITLE_FONT + 1.0,
            angle: 0.0,
            anchor: TextAnchor::Middle,
            paint: Paint::Annotation,
        },
        DrawOp::Text {
            x: cx,
            y: 30.0,
            text: format!(
                "beta {:.3}  95% CI [{:.3}, {:.3}]",
                detail.beta, lo, hi
            ),
            size: TICK_FONT,
            angle: 0.0,
            anchor: TextAnchor::Middle,
            paint: Paint::Annotation,
        },
        DrawOp::Line {
            x1: 0.0,
            y1: y_zero,
            x2: width,
            y2: y_zero,
            width: 1.0,
            paint: Paint::Baseline,
        },
        DrawOp::Rect {
            x: cx - EFFECT_BAR_WIDTH / 2.0,
            y: y_beta.min(y_zero),
            w: EFFECT_BAR_WIDTH,
            h: (y_beta - y_zero).abs(),
            filled: true,
            paint: Paint::EffectBar,
        },
        DrawOp::Line {
            x1: cx,
            y1: y_of(lo),
            x2: cx,
            y2: y_of(hi),
            width: 1.5,
            paint: Paint::Whisker,
        },
    ];
    for v in [lo, hi] {
        ops.push(DrawOp::Line {
            x1: cx - EFFECT_CAP_WIDTH / 2.0,
            y1: y_of(v),
            x2: cx + EFFECT_CAP_WIDTH / 2.0,
            y2: y_of(v),
            width: 1.5,
            paint: Paint::Whisker,
        });
    }
    ops
}
