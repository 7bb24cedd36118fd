//! Panel content as a tree of typed presentational nodes
//!
//! Nodes carry everything a surface needs to paint a panel (text, colors,
//! widths, alignment, overflow rule) without depending on any UI toolkit.

use crate::color::Rgba;
use crate::record::PanelRecord;

/// Fixed width of the label column in logical pixels
pub const LABEL_CELL_WIDTH: f32 = 182.0;
/// Fixed width of the value column in logical pixels
pub const VALUE_CELL_WIDTH: f32 = 78.0;
/// Body scrolls beyond this height
pub const MAX_BODY_HEIGHT: f32 = 320.0;
/// Minimum overall panel width
pub const PANEL_MIN_WIDTH: f32 = 278.0;

/// Label-column text color
pub const LABEL_TEXT: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
/// Bullet color in front of labels
pub const BULLET_COLOR: Rgba = Rgba::rgb(0x1e, 0xcf, 0xff);
/// Status dot in the top title
pub const STATUS_DOT: Rgba = Rgba::rgb(0x2f, 0xc0, 0x60);

/// Strings used when building panels
#[derive(Debug, Clone, PartialEq)]
pub struct PanelText {
    /// Label of the single row shown for an empty collection
    pub empty_label: String,
    /// Value of the single row shown for an empty collection
    pub empty_value: String,
}

impl Default for PanelText {
    fn default() -> Self {
        Self {
            empty_label: "No data".to_string(),
            empty_value: "--".to_string(),
        }
    }
}

/// A complete data panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelNode {
    pub title_bar: TitleBar,
    pub rows: Vec<PanelRow>,
    pub min_width: f32,
    pub max_body_height: f32,
}

impl PanelNode {
    pub fn is_empty_state(&self) -> bool {
        matches!(self.rows.as_slice(), [row] if row.kind == RowKind::Placeholder)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleBar {
    pub glyph: Glyph,
    pub title: String,
}

/// Decoration drawn in front of a panel title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Outlined square holding a filled dot with a check mark
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Record,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub kind: RowKind,
    pub label: Cell,
    pub value: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
}

/// What to do with text wider than its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Single line, clipped with a trailing ellipsis
    Ellipsis,
}

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    /// Bullet drawn before the text
    pub bullet: Option<Rgba>,
    pub color: Rgba,
    pub align: TextAlign,
    pub width: f32,
    pub overflow: Overflow,
    pub bold: bool,
    /// Full text shown on hover
    pub hover: Option<String>,
}

impl Cell {
    fn label(text: String, bullet: Option<Rgba>) -> Self {
        Self {
            hover: (!text.is_empty()).then(|| text.clone()),
            text,
            bullet,
            color: LABEL_TEXT,
            align: TextAlign::Left,
            width: LABEL_CELL_WIDTH,
            overflow: Overflow::Ellipsis,
            bold: false,
        }
    }

    fn value(text: String, color: Rgba) -> Self {
        Self {
            hover: (!text.is_empty()).then(|| text.clone()),
            text,
            bullet: None,
            color,
            align: TextAlign::Right,
            width: VALUE_CELL_WIDTH,
            overflow: Overflow::Ellipsis,
            bold: true,
        }
    }
}

/// Build a panel for `records`, preserving their order.
///
/// An empty collection produces exactly one placeholder row.
pub fn render_panel(title: &str, records: &[PanelRecord], text: &PanelText) -> PanelNode {
    let rows = if records.is_empty() {
        vec![PanelRow {
            kind: RowKind::Placeholder,
            label: Cell::label(text.empty_label.clone(), None),
            value: Cell::value(text.empty_value.clone(), LABEL_TEXT),
        }]
    } else {
        records.iter().map(record_row).collect()
    };

    PanelNode {
        title_bar: TitleBar {
            glyph: Glyph::Checkbox,
            title: title.to_string(),
        },
        rows,
        min_width: PANEL_MIN_WIDTH,
        max_body_height: MAX_BODY_HEIGHT,
    }
}

fn record_row(record: &PanelRecord) -> PanelRow {
    PanelRow {
        kind: RowKind::Record,
        label: Cell::label(record.display_label().to_string(), Some(BULLET_COLOR)),
        value: Cell::value(record.value.to_string(), Rgba::parse_or(&record.color, LABEL_TEXT)),
    }
}

/// Service name banner at the top of the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct TitleNode {
    pub text: String,
    pub indicator: Rgba,
    /// Translucent halo around the indicator
    pub halo: Rgba,
}

/// Build the title banner, using `placeholder` when no service name is known
pub fn render_title(service_name: &str, placeholder: &str) -> TitleNode {
    let text = if service_name.is_empty() {
        placeholder
    } else {
        service_name
    };

    TitleNode {
        text: text.to_string(),
        indicator: STATUS_DOT,
        halo: STATUS_DOT.with_alpha(0x40),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordValue;

    fn record(label: &str, value: i64) -> PanelRecord {
        PanelRecord::new(label, value, "#2FC060")
    }

    #[test]
    fn test_empty_panel_has_one_placeholder_row() {
        let node = render_panel("Protector", &[], &PanelText::default());

        assert_eq!(node.title_bar.title, "Protector");
        assert_eq!(node.title_bar.glyph, Glyph::Checkbox);
        assert_eq!(node.rows.len(), 1);
        assert!(node.is_empty_state());
        assert_eq!(node.rows[0].label.text, "No data");
        assert_eq!(node.rows[0].value.text, "--");
    }

    #[test]
    fn test_row_count_matches_records() {
        for n in 1..6 {
            let records: Vec<_> = (0..n).map(|i| record(&format!("r{}", i), i)).collect();
            let node = render_panel("T", &records, &PanelText::default());
            assert_eq!(node.rows.len(), records.len());
            assert!(node.rows.iter().all(|r| r.kind == RowKind::Record));
        }
    }

    #[test]
    fn test_row_order_preserved() {
        let orders: [[&str; 3]; 3] = [["a", "b", "c"], ["c", "a", "b"], ["b", "c", "a"]];
        for order in orders {
            let records: Vec<_> = order.iter().map(|l| record(l, 0)).collect();
            let node = render_panel("T", &records, &PanelText::default());
            let labels: Vec<_> = node.rows.iter().map(|r| r.label.text.as_str()).collect();
            assert_eq!(labels, order);
        }
    }

    #[test]
    fn test_record_cells() {
        let mut rec = PanelRecord::new("温度", 36.5, "#f00");
        let node = render_panel("T", std::slice::from_ref(&rec), &PanelText::default());
        let row = &node.rows[0];

        assert_eq!(row.label.bullet, Some(BULLET_COLOR));
        assert_eq!(row.label.width, LABEL_CELL_WIDTH);
        assert_eq!(row.label.overflow, Overflow::Ellipsis);
        assert_eq!(row.value.text, "36.5");
        assert_eq!(row.value.align, TextAlign::Right);
        assert_eq!(row.value.color, Rgba::rgb(255, 0, 0));
        assert_eq!(row.value.hover.as_deref(), Some("36.5"));

        rec.value = RecordValue::Null;
        rec.color = "not-a-color".to_string();
        let node = render_panel("T", &[rec], &PanelText::default());
        assert_eq!(node.rows[0].value.text, "");
        assert_eq!(node.rows[0].value.hover, None);
        assert_eq!(node.rows[0].value.color, LABEL_TEXT);
    }

    #[test]
    fn test_title_placeholder() {
        assert_eq!(render_title("", "Motor P0410").text, "Motor P0410");
        // Only an empty name falls back; whitespace is a name the host chose
        assert_eq!(render_title("  ", "Motor P0410").text, "  ");
        assert_eq!(render_title("Pump 7", "Motor P0410").text, "Pump 7");
    }
}
