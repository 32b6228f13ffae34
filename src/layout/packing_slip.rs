//! # Packing Slip
//!
//! A4 portrait, as many pages as the shipment needs.
//!
//! ## Pipeline
//!
//! 1. Sort items by `(size, gsm, bf, shade, reel)`.
//! 2. `rows = max(ceil(n / 2), min_rows)`. Items `[0, rows)` fill the left
//!    table, `[rows, 2·rows)` the right one. Left is filled completely before
//!    right starts.
//! 3. Paginate both tables together. Page 1 spends its header zone on the
//!    banner and dispatch details; later pages only redraw a short strip and
//!    the table headers, so they hold more rows.
//! 4. Subtotals per `(gsm, bf, shade)`, three to a row.
//! 5. Footer boxes (total items, total weight, freight) and signature labels.
//! 6. QC appendix on fresh pages, when QC records exist.
//!
//! ```text
//! ┌────────────────────── banner ──────────────────────┐
//! │                  PACKING SLIP            ▌▌▌ ▌▌ ▌▌ │
//! │ Client  : …                    Dispatch No : …     │
//! │ Vehicle : …                    Date        : …     │
//! ├──────────── left table ─────┬──── right table ─────┤
//! │ S.No GSM BF Shade Size Reel Wt │ S.No GSM BF …      │
//! │ ░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░ │ ░░░░░░░░░░░░░░     │
//! │ 2    …                         │ 25   …             │
//! ├────────────────────────────────┴───────────────────┤
//! │ 80 gsm, 18 bf, Golden : 4 | 2050 kg   …            │
//! │ ┌Total Items┐┌Total Weight┐┌Freight┐  Manager  In-charge
//! └────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;
use std::ops::Range;

use crate::config::SlipConfig;
use crate::identity::{extract_reel_number, split_year_suffix};
use crate::model::{DispatchItem, QualityCheckRecord, Shipment, SpecValue};

use super::{Align, Layout, LayoutContext, Page, PageSize, Weight};

const HEADER_GRAY: f32 = 0.82;
const STRIPE_GRAY: f32 = 0.93;
const TABLE_PT: f32 = 8.0;
const SUBTOTALS_PER_ROW: usize = 3;

/// A table column: title, share of the table width, alignment.
struct Column {
    title: &'static str,
    share: f32,
    align: Align,
}

const ITEM_COLUMNS: &[Column] = &[
    Column {
        title: "S.No",
        share: 10.0,
        align: Align::Center,
    },
    Column {
        title: "GSM",
        share: 12.0,
        align: Align::Center,
    },
    Column {
        title: "BF",
        share: 10.0,
        align: Align::Center,
    },
    Column {
        title: "Shade",
        share: 20.0,
        align: Align::Left,
    },
    Column {
        title: "Size",
        share: 13.0,
        align: Align::Center,
    },
    Column {
        title: "Reel No",
        share: 16.0,
        align: Align::Center,
    },
    Column {
        title: "Weight",
        share: 12.0,
        align: Align::Right,
    },
];

const QC_COLUMNS: &[Column] = &[
    Column {
        title: "S.No",
        share: 10.0,
        align: Align::Center,
    },
    Column {
        title: "Reel No",
        share: 30.0,
        align: Align::Center,
    },
    Column {
        title: "GSM",
        share: 17.0,
        align: Align::Center,
    },
    Column {
        title: "BF",
        share: 17.0,
        align: Align::Center,
    },
    Column {
        title: "Cobb",
        share: 19.0,
        align: Align::Center,
    },
];

// ============================================================================
// SORTING
// ============================================================================

/// Slip order: size, gsm, bf numerically, shade lexicographically, then reel
/// number numerically.
pub fn compare_items(a: &DispatchItem, b: &DispatchItem) -> Ordering {
    a.size
        .cmp_numeric(&b.size)
        .then_with(|| a.gsm.cmp_numeric(&b.gsm))
        .then_with(|| a.bf.cmp_numeric(&b.bf))
        .then_with(|| a.shade.to_string().cmp(&b.shade.to_string()))
        .then_with(|| compare_reels(&a.reel, &b.reel))
}

/// Stable sort into slip order.
pub fn sort_items(items: &mut [DispatchItem]) {
    items.sort_by(compare_items);
}

fn reel_value(reel: &str) -> Option<u64> {
    let bare = extract_reel_number(reel);
    let (core, _) = split_year_suffix(&bare);
    core.parse().ok()
}

fn compare_reels(a: &str, b: &str) -> Ordering {
    match (reel_value(a), reel_value(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

// ============================================================================
// PAGINATION
// ============================================================================

/// Rows in each of the two side-by-side tables.
pub fn table_rows(item_count: usize, min_rows: usize) -> usize {
    item_count.div_ceil(2).max(min_rows)
}

/// Rows that fit below a table header in `available_mm`. At least one.
pub fn rows_that_fit(available_mm: f32, header_mm: f32, row_mm: f32) -> usize {
    let usable = available_mm - header_mm;
    if usable <= 0.0 || row_mm <= 0.0 {
        return 1;
    }
    ((usable / row_mm).floor() as usize).max(1)
}

/// Where the table rows land, page by page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlipPlan {
    /// Rows per table (`max(ceil(n/2), min_rows)`).
    pub rows: usize,
    pub first_page_rows: usize,
    pub continuation_rows: usize,
    /// Row range of each table page; the left table shows items at these
    /// indices, the right table at `rows +` these indices.
    pub pages: Vec<Range<usize>>,
}

impl SlipPlan {
    pub fn new(item_count: usize, config: &SlipConfig) -> Self {
        let page_h = PageSize::A4_PORTRAIT.height_mm;
        let m = config.margin_mm;
        let first = rows_that_fit(
            page_h - 2.0 * m - config.header_zone_mm,
            config.table_header_mm,
            config.row_height_mm,
        );
        let next = rows_that_fit(
            page_h - 2.0 * m - config.continuation_zone_mm,
            config.table_header_mm,
            config.row_height_mm,
        );
        Self::with_capacity(table_rows(item_count, config.min_rows), first, next)
    }

    pub fn with_capacity(rows: usize, first_page_rows: usize, continuation_rows: usize) -> Self {
        let first_page_rows = first_page_rows.max(1);
        let continuation_rows = continuation_rows.max(1);
        let mut pages = Vec::new();
        let mut start = 0;
        let mut capacity = first_page_rows;
        while start < rows {
            let end = (start + capacity).min(rows);
            pages.push(start..end);
            start = end;
            capacity = continuation_rows;
        }
        if pages.is_empty() {
            pages.push(0..0);
        }
        Self {
            rows,
            first_page_rows,
            continuation_rows,
            pages,
        }
    }

    pub fn table_page_count(&self) -> usize {
        self.pages.len()
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Count and weight of one `(gsm, bf, shade)` group.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtotal {
    pub gsm: SpecValue,
    pub bf: SpecValue,
    pub shade: SpecValue,
    pub count: usize,
    pub weight: f64,
}

impl Subtotal {
    pub fn label(&self) -> String {
        format!(
            "{} gsm, {} bf, {} : {} | {} kg",
            self.gsm,
            self.bf,
            self.shade,
            self.count,
            self.weight.round() as i64
        )
    }

    fn matches(&self, item: &DispatchItem) -> bool {
        self.gsm.to_string() == item.gsm.to_string()
            && self.bf.to_string() == item.bf.to_string()
            && self.shade.to_string() == item.shade.to_string()
    }
}

/// Group items by `(gsm, bf, shade)` in order of first appearance.
///
/// Keys compare by printed value, so `80` and `"80"` share a group no matter
/// which table the items land in.
pub fn subtotals(items: &[DispatchItem]) -> Vec<Subtotal> {
    let mut groups: Vec<Subtotal> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.matches(item)) {
            Some(group) => {
                group.count += 1;
                group.weight += item.weight;
            }
            None => groups.push(Subtotal {
                gsm: item.gsm.clone(),
                bf: item.bf.clone(),
                shade: item.shade.clone(),
                count: 1,
                weight: item.weight,
            }),
        }
    }
    groups
}

/// Figures printed in the footer block.
#[derive(Debug, Clone, PartialEq)]
pub struct SlipSummary {
    pub total_items: usize,
    /// Rounded after summing.
    pub total_weight_kg: i64,
    pub subtotals: Vec<Subtotal>,
}

impl SlipSummary {
    pub fn from_items(sorted: &[DispatchItem]) -> Self {
        Self {
            total_items: sorted.len(),
            total_weight_kg: sorted.iter().map(|i| i.weight).sum::<f64>().round() as i64,
            subtotals: subtotals(sorted),
        }
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// A laid-out slip with the figures it shows.
#[derive(Debug, Clone)]
pub struct PackingSlip {
    pub layout: Layout,
    pub plan: SlipPlan,
    pub summary: SlipSummary,
    /// Pages taken by the QC appendix (0 without QC records).
    pub qc_pages: usize,
}

/// Lay out a packing slip for `shipment`.
pub fn layout_packing_slip(
    shipment: &Shipment,
    config: &SlipConfig,
    ctx: &LayoutContext,
) -> PackingSlip {
    let mut items = shipment.items.clone();
    sort_items(&mut items);

    let plan = SlipPlan::new(items.len(), config);
    let summary = SlipSummary::from_items(&items);
    let geometry = Geometry::new(config);
    let dispatch_no = shipment.header.dispatch_number.as_str();

    let mut layout = Layout::new(format!("Packing Slip {}", dispatch_no), PageSize::A4_PORTRAIT);

    // Item tables
    let mut y = geometry.top;
    for (i, rows) in plan.pages.iter().enumerate() {
        let table_top = if i == 0 {
            draw_first_header(layout.current(), shipment, &geometry, ctx);
            geometry.top + config.header_zone_mm
        } else {
            draw_continuation_strip(layout.new_page(), dispatch_no, &geometry);
            geometry.top + config.continuation_zone_mm
        };
        let page = layout.current();

        let left: Vec<(usize, Option<Vec<String>>)> = rows
            .clone()
            .map(|r| (r, items.get(r).map(|item| item_cells(r, item))))
            .collect();
        let right: Vec<(usize, Option<Vec<String>>)> = rows
            .clone()
            .map(|r| {
                let index = plan.rows + r;
                (r, items.get(index).map(|item| item_cells(index, item)))
            })
            .collect();

        for (x, cells) in [(geometry.left_x, &left), (geometry.right_x, &right)] {
            draw_table(page, x, table_top, geometry.table_w, ITEM_COLUMNS, cells, config);
        }
        y = table_top + config.table_header_mm + rows.len() as f32 * config.row_height_mm;
    }
    y += 4.0;

    // Subtotals
    let subtotal_lines: Vec<String> = summary.subtotals.iter().map(Subtotal::label).collect();
    if !subtotal_lines.is_empty() {
        y = ensure_room(&mut layout, y, config.subtotal_row_mm, dispatch_no, &geometry, config);
        layout.current().text(
            geometry.left_x,
            y + config.subtotal_row_mm * 0.7,
            "Subtotals",
            9.0,
            Weight::Bold,
            Align::Left,
        );
        y += config.subtotal_row_mm;

        let cell_w = geometry.content_w / SUBTOTALS_PER_ROW as f32;
        for chunk in subtotal_lines.chunks(SUBTOTALS_PER_ROW) {
            y = ensure_room(&mut layout, y, config.subtotal_row_mm, dispatch_no, &geometry, config);
            let page = layout.current();
            for (col, line) in chunk.iter().enumerate() {
                page.text(
                    geometry.left_x + col as f32 * cell_w,
                    y + config.subtotal_row_mm * 0.7,
                    line.as_str(),
                    TABLE_PT,
                    Weight::Regular,
                    Align::Left,
                );
            }
            y += config.subtotal_row_mm;
        }
        y += 2.0;
    }

    // Footer
    y = ensure_room(&mut layout, y, config.footer_mm, dispatch_no, &geometry, config);
    draw_footer(layout.current(), &summary, geometry.left_x, y, geometry.content_w);

    // QC appendix
    let qc_pages = if shipment.qc.is_empty() {
        0
    } else {
        draw_qc_appendix(&mut layout, &shipment.qc, dispatch_no, &geometry, config)
    };

    number_pages(&mut layout, &geometry);

    tracing::debug!(
        dispatch = dispatch_no,
        items = summary.total_items,
        rows = plan.rows,
        table_pages = plan.table_page_count(),
        pages = layout.page_count(),
        "packing slip laid out"
    );

    PackingSlip {
        layout,
        plan,
        summary,
        qc_pages,
    }
}

/// Horizontal and vertical page frame derived from the config.
struct Geometry {
    top: f32,
    bottom: f32,
    left_x: f32,
    right_x: f32,
    table_w: f32,
    content_w: f32,
    page_w: f32,
}

impl Geometry {
    fn new(config: &SlipConfig) -> Self {
        let size = PageSize::A4_PORTRAIT;
        let content_w = size.width_mm - 2.0 * config.margin_mm;
        let table_w = (content_w - config.column_gap_mm) / 2.0;
        Self {
            top: config.margin_mm,
            bottom: size.height_mm - config.margin_mm,
            left_x: config.margin_mm,
            right_x: config.margin_mm + table_w + config.column_gap_mm,
            table_w,
            content_w,
            page_w: size.width_mm,
        }
    }
}

/// Start a continuation page if `needed` mm do not fit below `y`.
fn ensure_room(
    layout: &mut Layout,
    y: f32,
    needed: f32,
    dispatch_no: &str,
    geometry: &Geometry,
    config: &SlipConfig,
) -> f32 {
    if y + needed <= geometry.bottom {
        return y;
    }
    let page = layout.new_page();
    draw_continuation_strip(page, dispatch_no, geometry);
    geometry.top + config.continuation_zone_mm
}

fn draw_first_header(
    page: &mut Page,
    shipment: &Shipment,
    geometry: &Geometry,
    ctx: &LayoutContext,
) {
    let top = geometry.top;
    let x = geometry.left_x;
    let w = geometry.content_w;

    // Banner; a missing asset leaves the area blank.
    if let Some(banner) = &ctx.assets.header {
        page.image_fit(banner.clone(), x, top, w, 22.0);
    }

    page.text(
        geometry.page_w / 2.0,
        top + 31.0,
        "PACKING SLIP",
        14.0,
        Weight::Bold,
        Align::Center,
    );

    let header = &shipment.header;
    if !header.dispatch_number.trim().is_empty() {
        let value = header.dispatch_number.trim();
        ctx.barcode_band(page, value, x + w - 50.0, top + 24.0, 50.0, 11.0);
    }

    let date = header.dispatch_date.unwrap_or(ctx.today);
    let driver = match (&header.driver_name, &header.driver_mobile) {
        (Some(name), Some(mobile)) => format!("{} ({})", name, mobile),
        (Some(name), None) => name.clone(),
        (None, Some(mobile)) => mobile.clone(),
        (None, None) => String::new(),
    };
    let left = [
        ("Client", header.client_name.clone().unwrap_or_default()),
        ("Vehicle No", header.vehicle_number.clone().unwrap_or_default()),
        ("Driver", driver),
    ];
    let right = [
        ("Dispatch No", header.dispatch_number.clone()),
        ("Date", date.format("%d-%m-%Y").to_string()),
        ("Order No", header.order_number.clone().unwrap_or_default()),
    ];
    for (column_x, rows) in [(x, &left), (x + w / 2.0 + 5.0, &right)] {
        for (i, (name, value)) in rows.iter().enumerate() {
            let baseline = top + 41.0 + i as f32 * 6.0;
            page.text(column_x, baseline, *name, 9.0, Weight::Bold, Align::Left);
            page.text(column_x + 22.0, baseline, ":", 9.0, Weight::Bold, Align::Left);
            page.text(
                column_x + 25.0,
                baseline,
                value.as_str(),
                9.0,
                Weight::Regular,
                Align::Left,
            );
        }
    }
}

fn draw_continuation_strip(page: &mut Page, dispatch_no: &str, geometry: &Geometry) {
    page.text(
        geometry.left_x,
        geometry.top + 5.0,
        format!("Packing Slip {} (continued)", dispatch_no),
        9.0,
        Weight::Bold,
        Align::Left,
    );
}

fn item_cells(index: usize, item: &DispatchItem) -> Vec<String> {
    vec![
        (index + 1).to_string(),
        item.gsm.to_string(),
        item.bf.to_string(),
        item.shade.to_string(),
        item.size.to_string(),
        extract_reel_number(&item.reel),
        item.display_weight().to_string(),
    ]
}

/// Shaded header row with a single rule under it, then the data rows.
///
/// Rows are `(row index, cells)`; rows with odd 1-based numbers are shaded.
/// `None` rows are blank padding up to the table's minimum length.
fn draw_table(
    page: &mut Page,
    x: f32,
    top: f32,
    width: f32,
    columns: &[Column],
    rows: &[(usize, Option<Vec<String>>)],
    config: &SlipConfig,
) {
    let total_share: f32 = columns.iter().map(|c| c.share).sum();
    let widths: Vec<f32> = columns.iter().map(|c| c.share / total_share * width).collect();

    let header_h = config.table_header_mm;
    page.fill(x, top, width, header_h, HEADER_GRAY);
    let mut cx = x;
    for (column, w) in columns.iter().zip(&widths) {
        let cell = (cx, top, *w, header_h);
        page.text_in_box(cell, column.title, TABLE_PT, Weight::Bold, Align::Center);
        cx += w;
    }
    page.hline(x, x + width, top + header_h, 0.6);

    let row_h = config.row_height_mm;
    for (n, (row, cells)) in rows.iter().enumerate() {
        let y = top + header_h + n as f32 * row_h;
        if row % 2 == 0 {
            page.fill(x, y, width, row_h, STRIPE_GRAY);
        }
        let Some(cells) = cells else { continue };
        let mut cx = x;
        for ((column, w), cell) in columns.iter().zip(&widths).zip(cells) {
            let area = (cx, y, *w, row_h);
            page.text_in_box(area, cell.as_str(), TABLE_PT, Weight::Regular, column.align);
            cx += w;
        }
    }
}

fn draw_footer(page: &mut Page, summary: &SlipSummary, x: f32, y: f32, content_w: f32) {
    let box_w = 40.0;
    let box_h = 14.0;
    let boxes = [
        ("Total Items", summary.total_items.to_string()),
        ("Total Weight", format!("{} kg", summary.total_weight_kg)),
        ("Freight", String::new()),
    ];
    for (i, (title, value)) in boxes.iter().enumerate() {
        let bx = x + i as f32 * (box_w + 3.0);
        page.stroke(bx, y, box_w, box_h, 0.6);
        page.text(bx + box_w / 2.0, y + 4.5, *title, 7.5, Weight::Regular, Align::Center);
        page.text(bx + box_w / 2.0, y + 11.0, value.as_str(), 11.0, Weight::Bold, Align::Center);
    }

    let right = x + content_w;
    page.text(right - 45.0, y + 12.0, "Manager", 9.0, Weight::Bold, Align::Center);
    page.text(right - 12.0, y + 12.0, "In-charge", 9.0, Weight::Bold, Align::Center);
}

/// QC records split at the index midpoint, with their own page capacity.
///
/// Order is the order received; the item sort does not apply.
fn draw_qc_appendix(
    layout: &mut Layout,
    qc: &[QualityCheckRecord],
    dispatch_no: &str,
    geometry: &Geometry,
    config: &SlipConfig,
) -> usize {
    let mid = qc.len().div_ceil(2);
    let start_y = geometry.top + config.qc_header_zone_mm;
    let per_page = rows_that_fit(
        geometry.bottom - start_y,
        config.table_header_mm,
        config.qc_row_height_mm,
    );
    let qc_config = SlipConfig {
        row_height_mm: config.qc_row_height_mm,
        ..config.clone()
    };

    let cells = |index: usize, record: &QualityCheckRecord| {
        vec![
            (index + 1).to_string(),
            extract_reel_number(&record.barcode_id),
            record.gsm.to_string(),
            record.bf.to_string(),
            record.cobb.to_string(),
        ]
    };

    let mut pages = 0;
    let mut start = 0;
    while start < mid {
        let end = (start + per_page).min(mid);
        let page = layout.new_page();
        page.text(
            geometry.page_w / 2.0,
            geometry.top + 8.0,
            "QUALITY CHECK REPORT",
            13.0,
            Weight::Bold,
            Align::Center,
        );
        page.text(
            geometry.left_x,
            geometry.top + 15.0,
            format!("Dispatch No : {}", dispatch_no),
            9.0,
            Weight::Regular,
            Align::Left,
        );

        let left: Vec<(usize, Option<Vec<String>>)> =
            (start..end).map(|r| (r, qc.get(r).map(|rec| cells(r, rec)))).collect();
        let right: Vec<(usize, Option<Vec<String>>)> = (start..end)
            .map(|r| (r, qc.get(mid + r).map(|rec| cells(mid + r, rec))))
            .collect();

        for (x, cells) in [(geometry.left_x, &left), (geometry.right_x, &right)] {
            draw_table(page, x, start_y, geometry.table_w, QC_COLUMNS, cells, &qc_config);
        }

        pages += 1;
        start = end;
    }
    pages
}

fn number_pages(layout: &mut Layout, geometry: &Geometry) {
    let total = layout.page_count();
    for (i, page) in layout.pages.iter_mut().enumerate() {
        page.text(
            geometry.left_x + geometry.content_w,
            geometry.bottom + 6.0,
            format!("Page {} of {}", i + 1, total),
            7.0,
            Weight::Regular,
            Align::Right,
        );
    }
}
