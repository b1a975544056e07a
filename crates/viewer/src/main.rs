mod api;
mod render;

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement};
use yew::prelude::*;

use locus_core::export::{format_exponential, CSV_FILENAME};
use locus_core::scene;
use locus_core::session::Session;
use locus_core::table::{SortDirection, SortKey};
use locus_core::types::AssociationRecord;

use render::{clear_canvas, execute, size_canvas, Colors};

// Plot-area margins inside the locus canvas stack; the bottom band holds
// the rotated tick labels and the gene track sits below it.
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 12.0;
const MARGIN_BOTTOM: f64 = 48.0;
const TRACK_HEIGHT: f64 = 40.0;

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}

// ─── Render version counter ─────────────────────────────────────────

// Reducer rather than use_state so async flows can bump it repeatedly
// without reading a stale snapshot.
#[derive(PartialEq, Default)]
struct Version(u32);

impl Reducible for Version {
    type Action = ();

    fn reduce(self: Rc<Self>, _action: ()) -> Rc<Self> {
        Rc::new(Version(self.0.wrapping_add(1)))
    }
}

struct DragState {
    pointer_id: i32,
    last_x: f64,
    distance: f64,
    down_time: f64,
}

// ─── App component ──────────────────────────────────────────────────

#[function_component(App)]
fn app() -> Html {
    let session = use_mut_ref(Session::new);
    let version = use_reducer(Version::default);
    let hover: UseStateHandle<Option<usize>> = use_state_eq(|| None);
    let loading = use_state(|| false);
    let searched = use_state(|| false);
    let drag = use_mut_ref(|| None::<DragState>);

    // Full redraw of every layer from current state.
    {
        let session = session.clone();
        let hover = hover.clone();
        use_effect_with(version.0, move |_| {
            redraw_all(&session.borrow(), *hover);
            || ()
        });
    }

    // Hover only touches the highlight canvas.
    {
        let session = session.clone();
        use_effect_with((version.0, *hover), move |(_, hover)| {
            redraw_highlight(&session.borrow(), *hover);
            || ()
        });
    }

    // Window resize re-fits the canvases.
    {
        let version = version.clone();
        use_effect_with((), move |_| {
            let listener = EventListener::new(&web_sys::window().unwrap(), "resize", move |_| {
                version.dispatch(());
            });
            move || drop(listener)
        });
    }

    // ─── Search ─────────────────────────────────────────────────────

    let on_search = {
        let session = session.clone();
        let version = version.clone();
        let loading = loading.clone();
        let searched = searched.clone();
        Callback::from(move |_: MouseEvent| {
            run_search(
                session.clone(),
                version.clone(),
                loading.clone(),
                searched.clone(),
            );
        })
    };

    let on_search_key = {
        let session = session.clone();
        let version = version.clone();
        let loading = loading.clone();
        let searched = searched.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                run_search(
                    session.clone(),
                    version.clone(),
                    loading.clone(),
                    searched.clone(),
                );
            }
        })
    };

    // ─── Zoom buttons ───────────────────────────────────────────────

    let on_zoom_in = {
        let session = session.clone();
        let version = version.clone();
        Callback::from(move |_: MouseEvent| {
            let (plot_w, _) = plot_dimensions();
            session.borrow_mut().zoom_in(plot_w);
            version.dispatch(());
        })
    };

    let on_zoom_out = {
        let session = session.clone();
        let version = version.clone();
        Callback::from(move |_: MouseEvent| {
            let (plot_w, _) = plot_dimensions();
            session.borrow_mut().zoom_out(plot_w);
            version.dispatch(());
        })
    };

    // ─── CSV export ─────────────────────────────────────────────────

    let on_export = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| {
            match session.borrow().export_csv() {
                Ok(csv) => download_csv(&csv),
                Err(err) => {
                    log::error!("csv export failed: {err}");
                    alert("Failed to export CSV.");
                }
            }
        })
    };

    // ─── Canvas gestures ────────────────────────────────────────────

    let on_wheel = {
        let session = session.clone();
        let version = version.clone();
        Callback::from(move |e: WheelEvent| {
            e.prevent_default();
            let mut delta = e.delta_y();
            if e.delta_mode() == 1 {
                delta *= 30.0;
            } else if e.delta_mode() == 2 {
                delta *= 300.0;
            }
            let factor = (1.1f64).powf(-delta / 40.0).clamp(0.5, 2.0);
            let (plot_w, _) = plot_dimensions();
            let anchor = e.offset_x() as f64 - MARGIN_LEFT;
            session.borrow_mut().zoom_about(factor, anchor, plot_w);
            version.dispatch(());
        })
    };

    let on_pointerdown = {
        let drag = drag.clone();
        Callback::from(move |e: PointerEvent| {
            e.prevent_default();
            if let Some(el) = e.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) {
                let _ = el.set_pointer_capture(e.pointer_id());
            }
            *drag.borrow_mut() = Some(DragState {
                pointer_id: e.pointer_id(),
                last_x: e.offset_x() as f64,
                distance: 0.0,
                down_time: js_sys::Date::now(),
            });
        })
    };

    let on_pointermove = {
        let session = session.clone();
        let version = version.clone();
        let hover = hover.clone();
        let drag = drag.clone();
        Callback::from(move |e: PointerEvent| {
            let mut drag_ref = drag.borrow_mut();
            if let Some(state) = drag_ref.as_mut().filter(|s| s.pointer_id == e.pointer_id()) {
                e.prevent_default();
                let dx = e.offset_x() as f64 - state.last_x;
                state.distance += dx.abs();
                state.last_x = e.offset_x() as f64;
                drop(drag_ref);
                let (plot_w, _) = plot_dimensions();
                session.borrow_mut().pan_by(dx, plot_w);
                version.dispatch(());
            } else {
                drop(drag_ref);
                let (plot_w, plot_h) = plot_dimensions();
                let px = e.offset_x() as f64 - MARGIN_LEFT;
                let py = e.offset_y() as f64 - MARGIN_TOP;
                let sess = session.borrow();
                let scales = sess.composed_scales(plot_w, plot_h);
                hover.set(scene::hit_scan(sess.dataset(), &scales, px, py));
            }
        })
    };

    let on_pointerup = {
        let session = session.clone();
        let version = version.clone();
        let drag = drag.clone();
        Callback::from(move |e: PointerEvent| {
            let Some(state) = drag.borrow_mut().take() else {
                return;
            };
            let was_click =
                state.distance < 10.0 && js_sys::Date::now() - state.down_time <= 500.0;
            if !(was_click && e.button() == 0) {
                return;
            }
            let (plot_w, plot_h) = plot_dimensions();
            let px = e.offset_x() as f64 - MARGIN_LEFT;
            let py = e.offset_y() as f64 - MARGIN_TOP;
            let target = {
                let sess = session.borrow();
                let scales = sess.composed_scales(plot_w, plot_h);
                scene::hit_scan(sess.dataset(), &scales, px, py).map(|i| {
                    let rec = &sess.dataset().records()[i];
                    (
                        rec.variant.variant_id.clone(),
                        rec.gene.gene_id.clone(),
                    )
                })
            };
            if let Some((variant_id, gene_id)) = target {
                select_variant(session.clone(), version.clone(), variant_id, gene_id);
            }
        })
    };

    let on_pointerleave = {
        let hover = hover.clone();
        let drag = drag.clone();
        Callback::from(move |_: PointerEvent| {
            *drag.borrow_mut() = None;
            hover.set(None);
        })
    };

    // ─── Table ──────────────────────────────────────────────────────

    let sess = session.borrow();

    let header: Html = SortKey::ALL
        .iter()
        .map(|key| {
            let active = sess.table().key() == *key;
            let marker = if active {
                match sess.table().direction() {
                    SortDirection::Ascending => " \u{25B2}",
                    SortDirection::Descending => " \u{25BC}",
                }
            } else {
                ""
            };
            let onclick = {
                let session = session.clone();
                let version = version.clone();
                let key = *key;
                Callback::from(move |_: MouseEvent| {
                    session.borrow_mut().set_sort(key);
                    version.dispatch(());
                })
            };
            html! {
                <th class={classes!(active.then_some("sorted"))} onclick={onclick}>
                    {format!("{}{}", key.label(), marker)}
                </th>
            }
        })
        .collect();

    let body: Html = if sess.dataset().is_empty() {
        if *searched {
            html! {
                <tr><td colspan="8" class="empty-row">{"No associations found."}</td></tr>
            }
        } else {
            html! {}
        }
    } else {
        sess.row_order()
            .into_iter()
            .map(|i| {
                let rec = &sess.dataset().records()[i];
                let is_selected = sess.selection().is_selected(&rec.variant.variant_id);
                let variant_id = rec.variant.variant_id.clone();
                let gene_id = rec.gene.gene_id.clone();
                let onclick = {
                    let session = session.clone();
                    let version = version.clone();
                    Callback::from(move |_: MouseEvent| {
                        select_variant(
                            session.clone(),
                            version.clone(),
                            variant_id.clone(),
                            gene_id.clone(),
                        );
                    })
                };
                let cells: Html = SortKey::ALL
                    .iter()
                    .map(|key| html! { <td>{cell_text(rec, *key)}</td> })
                    .collect();
                html! {
                    <tr class={classes!(is_selected.then_some("highlighted"))} onclick={onclick}>
                        {cells}
                    </tr>
                }
            })
            .collect()
    };

    let detail_missing = sess.detail().is_none();
    drop(sess);

    html! {
        <div id="topmostdiv">
            <header class="controls">
                <input id="gene-search" type="text"
                    placeholder="Gene name, e.g. TP53"
                    onkeydown={on_search_key} />
                <button id="search-button" onclick={on_search}>{"Search"}</button>
                <button class="zoom-btn" onclick={on_zoom_in}>{"Zoom +"}</button>
                <button class="zoom-btn" onclick={on_zoom_out}>{"Zoom \u{2212}"}</button>
                <button id="export-button" onclick={on_export}>{"Export CSV"}</button>
                if *loading {
                    <span class="status">{"Loading\u{2026}"}</span>
                }
            </header>
            <div class="panels">
                <div id="plotcontainer"
                    onwheel={on_wheel}
                    onpointerdown={on_pointerdown}
                    onpointermove={on_pointermove}
                    onpointerup={on_pointerup}
                    onpointerleave={on_pointerleave}>
                    <canvas id="axis-canvas" style="position: absolute; left: 0; top: 0; z-index: 0;"></canvas>
                    <canvas id="points-canvas" style="position: absolute; left: 0; top: 0; z-index: 1;"></canvas>
                    <canvas id="track-canvas" style="position: absolute; left: 0; top: 0; z-index: 2;"></canvas>
                    <canvas id="highlight-canvas" style="position: absolute; left: 0; top: 0; z-index: 3;"></canvas>
                </div>
                <div id="effectcontainer">
                    <canvas id="effect-canvas"></canvas>
                    if detail_missing {
                        <p class="effect-hint">{"Click a variant to see its effect size."}</p>
                    }
                </div>
            </div>
            <div class="table-container">
                <table id="results-table">
                    <thead><tr>{header}</tr></thead>
                    <tbody>{body}</tbody>
                </table>
            </div>
        </div>
    }
}

// ─── User actions ───────────────────────────────────────────────────

fn run_search(
    session: Rc<RefCell<Session>>,
    version: UseReducerHandle<Version>,
    loading: UseStateHandle<bool>,
    searched: UseStateHandle<bool>,
) {
    let Some(input) = input_by_id("gene-search") else {
        return;
    };
    let request = match session.borrow_mut().begin_search(&input.value()) {
        Ok(request) => request,
        Err(_) => {
            alert("Please enter a gene name.");
            return;
        }
    };
    loading.set(true);
    wasm_bindgen_futures::spawn_local(async move {
        match api::fetch_associations(&request.gene_name).await {
            Ok(records) => {
                let gene_id = records.first().map(|r| r.gene.gene_id.clone());
                let applied = session
                    .borrow_mut()
                    .apply_associations(request.token, records);
                if applied {
                    searched.set(true);
                    version.dispatch(());
                    if let Some(gene_id) = gene_id {
                        match api::fetch_exons(&gene_id).await {
                            Ok(exons) => {
                                if session.borrow_mut().apply_exons(request.token, exons) {
                                    version.dispatch(());
                                }
                            }
                            // The track is auxiliary; the plot stands without it.
                            Err(err) => log::warn!("exon fetch failed: {err}"),
                        }
                    }
                }
            }
            Err(err) => {
                log::error!("association fetch failed: {err}");
                alert("Failed to fetch associations. Please try again.");
            }
        }
        loading.set(false);
    });
}

fn select_variant(
    session: Rc<RefCell<Session>>,
    version: UseReducerHandle<Version>,
    variant_id: String,
    gene_id: String,
) {
    let request = session.borrow_mut().select(&variant_id, &gene_id);
    let Some(request) = request else {
        return;
    };
    version.dispatch(());
    wasm_bindgen_futures::spawn_local(async move {
        match api::fetch_effect_size(&request.variant_id, &request.gene_id).await {
            Ok(detail) => {
                if session
                    .borrow_mut()
                    .apply_effect_detail(request.token, detail)
                {
                    version.dispatch(());
                }
            }
            Err(err) => {
                log::error!("effect size fetch failed: {err}");
                alert("Failed to fetch effect size. Please try again.");
            }
        }
    });
}

fn cell_text(rec: &AssociationRecord, key: SortKey) -> String {
    match key {
        SortKey::VariantId => rec.variant.variant_id.clone(),
        SortKey::Rsid => rec
            .variant
            .rsid
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        SortKey::GeneId => rec.gene.gene_id.clone(),
        SortKey::GeneName => rec
            .gene
            .gene_name
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        SortKey::PValue => format_exponential(rec.pvalue, 2),
        SortKey::Beta => format!("{:.3}", rec.beta),
        SortKey::Se => format!("{:.3}", rec.se),
        SortKey::Position => rec.variant.position.to_string(),
    }
}

// ─── Canvas redraw ──────────────────────────────────────────────────

fn redraw_all(session: &Session, hover: Option<usize>) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(root) = document.get_element_by_id("topmostdiv") else {
        return;
    };
    let (full_w, full_h) = container_size(&document, "plotcontainer");
    if full_w <= 0.0 || full_h <= 0.0 {
        return;
    }
    let (plot_w, plot_h) = plot_dimensions();
    let colors = Colors::from_element(&root);
    let scales = session.composed_scales(plot_w, plot_h);

    for id in [
        "axis-canvas",
        "points-canvas",
        "track-canvas",
        "highlight-canvas",
    ] {
        if let Some(canvas) = canvas_by_id(&document, id) {
            size_canvas(&canvas, full_w as u32, full_h as u32);
            clear_canvas(&canvas);
        }
    }

    // An empty dataset leaves the plot area blank; the table carries the
    // "no associations found" message.
    if session.dataset().is_empty() {
        redraw_effect(session, &colors, &document);
        return;
    }

    if let Some(canvas) = canvas_by_id(&document, "axis-canvas") {
        execute(
            &canvas,
            &scene::axis_layer(&scales, plot_w, plot_h),
            &colors,
            (MARGIN_LEFT, MARGIN_TOP),
        );
    }
    if let Some(canvas) = canvas_by_id(&document, "points-canvas") {
        execute(
            &canvas,
            &scene::scatter_layer(session.dataset(), &scales, plot_w),
            &colors,
            (MARGIN_LEFT, MARGIN_TOP),
        );
    }
    if let Some(canvas) = canvas_by_id(&document, "track-canvas") {
        if let Some(label) = session.gene_label() {
            execute(
                &canvas,
                &scene::gene_track_layer(session.exons(), label, &scales.x, plot_w, TRACK_HEIGHT),
                &colors,
                (MARGIN_LEFT, MARGIN_TOP + plot_h + MARGIN_BOTTOM),
            );
        }
    }

    redraw_highlight(session, hover);
    redraw_effect(session, &colors, &document);
}

fn redraw_highlight(session: &Session, hover: Option<usize>) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(canvas) = canvas_by_id(&document, "highlight-canvas") else {
        return;
    };
    let Some(root) = document.get_element_by_id("topmostdiv") else {
        return;
    };
    clear_canvas(&canvas);
    let (plot_w, plot_h) = plot_dimensions();
    let scales = session.composed_scales(plot_w, plot_h);
    let ops = scene::highlight_layer(
        session.dataset(),
        &scales,
        session.selected_index(),
        hover,
        plot_w,
    );
    execute(
        &canvas,
        &ops,
        &Colors::from_element(&root),
        (MARGIN_LEFT, MARGIN_TOP),
    );
}

fn redraw_effect(session: &Session, colors: &Colors, document: &Document) {
    let Some(canvas) = canvas_by_id(document, "effect-canvas") else {
        return;
    };
    let (w, h) = container_size(document, "effectcontainer");
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    size_canvas(&canvas, w as u32, h as u32);
    clear_canvas(&canvas);
    if let Some(detail) = session.detail() {
        execute(
            &canvas,
            &scene::effect_size_layer(detail, w, h),
            colors,
            (0.0, 0.0),
        );
    }
}

// ─── DOM helpers ────────────────────────────────────────────────────

fn plot_dimensions() -> (f64, f64) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return (1.0, 1.0);
    };
    let (full_w, full_h) = container_size(&document, "plotcontainer");
    (
        (full_w - MARGIN_LEFT - MARGIN_RIGHT).max(50.0),
        (full_h - MARGIN_TOP - MARGIN_BOTTOM - TRACK_HEIGHT).max(50.0),
    )
}

fn container_size(document: &Document, id: &str) -> (f64, f64) {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map(|el| (el.client_width() as f64, el.client_height() as f64))
        .unwrap_or((0.0, 0.0))
}

fn canvas_by_id(document: &Document, id: &str) -> Option<HtmlCanvasElement> {
    document
        .get_element_by_id(id)?
        .dyn_into::<HtmlCanvasElement>()
        .ok()
}

fn input_by_id(id: &str) -> Option<HtmlInputElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<HtmlInputElement>()
        .ok()
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn download_csv(content: &str) {
    let parts = js_sys::Array::of1(&JsValue::from_str(content));
    let props = web_sys::BlobPropertyBag::new();
    props.set_type("text/csv");
    let Ok(blob) = web_sys::Blob::new_with_str_sequence_and_options(&parts, &props) else {
        return;
    };
    let Ok(url) = web_sys::Url::create_object_url_with_blob(&blob) else {
        return;
    };
    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
        if let Ok(anchor) = document.create_element("a") {
            if let Ok(anchor) = anchor.dyn_into::<web_sys::HtmlAnchorElement>() {
                anchor.set_href(&url);
                anchor.set_download(CSV_FILENAME);
                anchor.click();
            }
        }
    }
    let _ = web_sys::Url::revoke_object_url(&url);
}
