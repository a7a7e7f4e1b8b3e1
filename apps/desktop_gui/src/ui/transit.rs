//! Transit scene painter: star, orbit track, planet.

use client_core::{animation::orbit_frame, presenter::Tone, OrbitFrame, StarColor, TransitGeometry};
use eframe::egui;

const PLANET_COLOR: egui::Color32 = egui::Color32::from_rgb(96, 165, 250);
const ORBIT_TRACK_COLOR: egui::Color32 = egui::Color32::from_gray(70);
const MARGIN_PX: f32 = 12.0;

pub fn tone_color(tone: Tone) -> egui::Color32 {
    match tone {
        Tone::Positive => egui::Color32::from_rgb(74, 222, 128),
        Tone::Caution => egui::Color32::from_rgb(250, 204, 21),
        Tone::Negative => egui::Color32::from_rgb(248, 113, 113),
        Tone::Muted => egui::Color32::from_rgb(156, 163, 175),
    }
}

fn star_color32(color: StarColor) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

/// Square canvas side that fits the orbit, its vertical offset and the planet.
fn canvas_side(geometry: &TransitGeometry) -> f32 {
    let orbit_extent = geometry.orbit_diameter_px + 2.0 * geometry.vertical_offset_px.abs();
    let extent = orbit_extent.max(geometry.star_diameter_px) + geometry.planet_diameter_px;
    extent as f32 + 2.0 * MARGIN_PX
}

/// Paints one frame. Without a running animation the planet rests at the
/// start of its orbit.
pub fn paint_transit(ui: &mut egui::Ui, geometry: &TransitGeometry, frame: Option<OrbitFrame>) {
    let side = canvas_side(geometry);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    let center = rect.center();

    let star = star_color32(geometry.star_color);
    let star_radius = (geometry.star_diameter_px / 2.0) as f32;
    painter.circle_filled(center, star_radius * 1.2, star.gamma_multiply(0.2));
    painter.circle_filled(center, star_radius, star);

    let offset = egui::vec2(0.0, geometry.vertical_offset_px as f32);
    painter.circle_stroke(
        center + offset,
        (geometry.orbit_diameter_px / 2.0) as f32,
        egui::Stroke::new(1.5, ORBIT_TRACK_COLOR),
    );

    let frame = frame.unwrap_or_else(|| orbit_frame(geometry, 0.0));
    painter.circle_filled(
        center + egui::vec2(frame.x_px as f32, frame.y_px as f32),
        (geometry.planet_diameter_px / 2.0) as f32,
        PLANET_COLOR,
    );
}
