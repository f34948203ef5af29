use crate::gui::theme::ThemeColors;
use crate::viewmodel::DonutChartViewModel;
use cairo::Context;
use donut::{ArcPrimitive, Point, Size};
use palette::Srgba;
use std::f64::consts::PI;

const TITLE_FONT_SIZE: f64 = 20.0;
const CAPTION_FONT_SIZE: f64 = 14.0;
const LINE_GAP: f64 = 6.0;

fn set_source(cr: &Context, color: Srgba<f64>, alpha: f64) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a * alpha);
}

fn draw_arc(cr: &Context, arc: &ArcPrimitive) -> Result<(), cairo::Error> {
    set_source(cr, arc.color, arc.alpha);
    cr.set_line_width(arc.stroke_width);
    cr.set_line_cap(cairo::LineCap::Butt);
    cr.new_path();
    cr.arc(
        arc.center.x,
        arc.center.y,
        arc.radius,
        arc.start_radians(),
        arc.end_radians(),
    );
    cr.stroke()
}

/// Draws `text` horizontally centred with its baseline at `baseline`.
fn draw_centered_text(
    cr: &Context,
    text: &str,
    center_x: f64,
    baseline: f64,
    size: f64,
    weight: cairo::FontWeight,
) -> Result<(), cairo::Error> {
    cr.select_font_face("Sans", cairo::FontSlant::Normal, weight);
    cr.set_font_size(size);
    let ext = cr.text_extents(text)?;
    cr.move_to(center_x - ext.width() / 2.0 - ext.x_bearing(), baseline);
    cr.show_text(text)
}

fn draw_selection(
    cr: &Context,
    center: Point,
    name: &str,
    amount: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_source(cr, colors.label, 1.0);
    draw_centered_text(
        cr,
        name,
        center.x,
        center.y - LINE_GAP / 2.0,
        TITLE_FONT_SIZE,
        cairo::FontWeight::Bold,
    )?;

    set_source(cr, colors.caption, 1.0);
    draw_centered_text(
        cr,
        &format!("{amount:.2}"),
        center.x,
        center.y + LINE_GAP / 2.0 + CAPTION_FONT_SIZE,
        CAPTION_FONT_SIZE,
        cairo::FontWeight::Normal,
    )
}

fn draw_empty(cr: &Context, canvas: Size, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let center = canvas.center();
    let stroke_width = canvas.min_side() / 10.0;
    let radius = (canvas.min_side() - stroke_width) / 2.0;
    if radius > 0.0 {
        set_source(cr, colors.empty_ring, 1.0);
        cr.set_line_width(stroke_width);
        cr.new_path();
        cr.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
        cr.stroke()?;
    }

    set_source(cr, colors.caption, 1.0);
    draw_centered_text(
        cr,
        "No spending yet",
        center.x,
        center.y + CAPTION_FONT_SIZE / 2.0,
        CAPTION_FONT_SIZE,
        cairo::FontWeight::Normal,
    )
}

pub fn draw(
    cr: &Context,
    chart: &DonutChartViewModel,
    canvas: Size,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    if !chart.has_data() {
        return draw_empty(cr, canvas, colors);
    }

    let arcs = match chart.arcs(canvas) {
        Ok(arcs) => arcs,
        Err(e) => {
            log::debug!("Skipping chart frame: {}", e);
            return Ok(());
        }
    };

    for arc in &arcs {
        draw_arc(cr, arc)?;
    }

    if let Some(category) = chart.selected_category() {
        draw_selection(
            cr,
            canvas.center(),
            &category.name,
            category.total_amount,
            colors,
        )?;
    }
    Ok(())
}
