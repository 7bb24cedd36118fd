//! egui rendering of panel and title nodes

use bevy::math::Vec2;
use bevy_egui::egui;
use equiview_core::panel::{Cell, Glyph, PanelNode, PanelRow, TextAlign, TitleNode};
use equiview_core::Rgba;

const ROW_HEIGHT: f32 = 22.0;
const TITLE_FONT_SIZE: f32 = 20.0;
const TITLE_ROW_HEIGHT: f32 = 28.0;
const BULLET_SIZE: f32 = 6.0;
const BODY_TEXT_SIZE: f32 = 13.0;
const HEADER_TEXT_SIZE: f32 = 15.0;

pub fn color32(color: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), color.a())
}

/// Nearest egui alignment for a fractional pivot (x from left, y from top)
pub fn pivot_align(pivot: Vec2) -> egui::Align2 {
    fn axis(t: f32) -> egui::Align {
        if t < 0.25 {
            egui::Align::Min
        } else if t > 0.75 {
            egui::Align::Max
        } else {
            egui::Align::Center
        }
    }
    egui::Align2([axis(pivot.x), axis(pivot.y)])
}

/// Frame shared by both data panels
pub fn panel_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(egui::Color32::from_rgba_unmultiplied(8, 28, 58, 215))
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(30, 207, 255, 160)))
        .corner_radius(egui::CornerRadius::same(4))
        .inner_margin(egui::Margin::same(8))
}

/// Square bullet centred on `center`
pub fn bullet_square(center: egui::Pos2) -> egui::Rect {
    egui::Rect::from_center_size(center, egui::vec2(BULLET_SIZE, BULLET_SIZE))
}

/// Draw a data panel: title bar with glyph, then a scrollable two-column table
pub fn render_panel_node(ui: &mut egui::Ui, node: &PanelNode) {
    ui.set_min_width(node.min_width);

    ui.horizontal(|ui| {
        paint_glyph(ui, node.title_bar.glyph);
        ui.label(
            egui::RichText::new(&node.title_bar.title)
                .size(HEADER_TEXT_SIZE)
                .strong()
                .color(egui::Color32::WHITE),
        );
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .max_height(node.max_body_height)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            for row in &node.rows {
                render_row(ui, row);
            }
        });
}

fn render_row(ui: &mut egui::Ui, row: &PanelRow) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 4.0;
        render_cell(ui, &row.label);
        render_cell(ui, &row.value);
    });
}

fn render_cell(ui: &mut egui::Ui, cell: &Cell) {
    let layout = match cell.align {
        TextAlign::Left => egui::Layout::left_to_right(egui::Align::Center),
        TextAlign::Right => egui::Layout::right_to_left(egui::Align::Center),
    };

    ui.allocate_ui_with_layout(egui::vec2(cell.width, ROW_HEIGHT), layout, |ui| {
        ui.set_width(cell.width);

        if let Some(bullet) = cell.bullet {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, ROW_HEIGHT), egui::Sense::hover());
            ui.painter().rect_filled(bullet_square(rect.center()), 0.0, color32(bullet));
        }

        let mut text = egui::RichText::new(&cell.text).size(BODY_TEXT_SIZE).color(color32(cell.color));
        if cell.bold {
            text = text.strong();
        }
        // Every overflow rule clips to one line
        let response = ui.add(egui::Label::new(text).truncate());
        if let Some(hover) = &cell.hover {
            response.on_hover_text(hover);
        }
    });
}

/// Outlined square holding a filled dot with a check mark
fn paint_glyph(ui: &mut egui::Ui, glyph: Glyph) {
    match glyph {
        Glyph::Checkbox => {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
            let accent = color32(equiview_core::panel::BULLET_COLOR);
            let painter = ui.painter();

            painter.rect_stroke(
                rect,
                egui::CornerRadius::same(2),
                egui::Stroke::new(1.0, accent),
                egui::StrokeKind::Inside,
            );
            painter.circle_filled(rect.center(), 4.5, accent);

            let c = rect.center();
            let check = egui::Stroke::new(1.5, egui::Color32::WHITE);
            painter.line_segment([c + egui::vec2(-2.5, 0.0), c + egui::vec2(-0.5, 2.0)], check);
            painter.line_segment([c + egui::vec2(-0.5, 2.0), c + egui::vec2(2.5, -2.0)], check);
        }
    }
}

/// Draw the service title with its status indicator
pub fn render_title_node(ui: &mut egui::Ui, node: &TitleNode) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(24.0, TITLE_ROW_HEIGHT), egui::Sense::hover());
        let painter = ui.painter();
        painter.circle_filled(rect.center(), 9.0, color32(node.halo));
        painter.circle_filled(rect.center(), 5.0, color32(node.indicator));

        ui.label(
            egui::RichText::new(&node.text)
                .size(TITLE_FONT_SIZE)
                .strong()
                .color(egui::Color32::WHITE),
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_align() {
        assert_eq!(pivot_align(Vec2::new(0.5, 1.0)), egui::Align2::CENTER_BOTTOM);
        assert_eq!(pivot_align(Vec2::new(0.0, 0.0)), egui::Align2::LEFT_TOP);
        assert_eq!(pivot_align(Vec2::new(1.0, 0.5)), egui::Align2::RIGHT_CENTER);
    }

    fn painted_shapes(mut add_contents: impl FnMut(&mut egui::Ui)) -> Vec<egui::Shape> {
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| add_contents(ui));
        });
        output.shapes.into_iter().map(|clipped| clipped.shape).collect()
    }

    #[test]
    fn test_bullet_is_square() {
        let bullet = Rgba::rgb(0x1e, 0xcf, 0xff);
        let cell = Cell {
            text: "A相电流".to_string(),
            bullet: Some(bullet),
            color: Rgba::rgb(0xff, 0xff, 0xff),
            align: TextAlign::Left,
            width: 182.0,
            overflow: equiview_core::panel::Overflow::Ellipsis,
            bold: false,
            hover: None,
        };
        let shapes = painted_shapes(|ui| render_cell(ui, &cell));

        let squares: Vec<egui::Rect> = shapes
            .iter()
            .filter_map(|shape| match shape {
                egui::Shape::Rect(rect) if rect.fill == color32(bullet) => Some(rect.rect),
                _ => None,
            })
            .collect();
        assert_eq!(squares.len(), 1);
        assert_eq!(squares[0].width(), BULLET_SIZE);
        assert_eq!(squares[0].height(), BULLET_SIZE);
        assert!(!shapes
            .iter()
            .any(|shape| matches!(shape, egui::Shape::Circle(circle) if circle.fill == color32(bullet))));
    }

    #[test]
    fn test_title_font_size() {
        let node = equiview_core::panel::render_title("Motor A", "Motor P0410");
        let shapes = painted_shapes(|ui| render_title_node(ui, &node));

        let sizes: Vec<f32> = shapes
            .iter()
            .filter_map(|shape| match shape {
                egui::Shape::Text(text) => text.galley.job.sections.first().map(|s| s.format.font_id.size),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec![TITLE_FONT_SIZE]);
    }

    #[test]
    fn test_color32() {
        let color = color32(Rgba([0x1e, 0xcf, 0xff, 0xff]));
        assert_eq!(color, egui::Color32::from_rgb(0x1e, 0xcf, 0xff));
    }
}
