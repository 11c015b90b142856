//! Widget catalog: the static registry of widget type tags.
//!
//! The palette collaborator supplies type tags; the engine consults this table
//! only when creating a widget (for its default footprint) and when a host asks
//! for display metadata. Lookups never fail: an unknown tag resolves to the
//! fallback footprint so a drop is never rejected.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use serde::Serialize;

use crate::consts::{FALLBACK_HEIGHT, FALLBACK_WIDTH};

/// Broad widget family; decides the default footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetFamily {
    Chart,
    Table,
    Metric,
    Filter,
    Text,
    Button,
    Shape,
    Media,
}

impl WidgetFamily {
    /// Default `(width, height)` for widgets of this family.
    #[must_use]
    pub fn footprint(self) -> (f64, f64) {
        match self {
            Self::Chart => (400.0, 300.0),
            Self::Table => (480.0, 280.0),
            Self::Metric => (240.0, 120.0),
            Self::Filter => (240.0, 80.0),
            Self::Text => (200.0, 80.0),
            Self::Button => (120.0, 50.0),
            Self::Shape => (150.0, 150.0),
            Self::Media => (320.0, 240.0),
        }
    }
}

/// Display metadata for one widget type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Type tag stored on placed widgets.
    pub tag: &'static str,
    /// Human-readable palette label.
    pub label: &'static str,
    /// Icon name understood by the host's icon set.
    pub icon: &'static str,
    pub family: WidgetFamily,
}

impl CatalogEntry {
    #[must_use]
    pub fn footprint(&self) -> (f64, f64) {
        self.family.footprint()
    }
}

const fn entry(tag: &'static str, label: &'static str, icon: &'static str, family: WidgetFamily) -> CatalogEntry {
    CatalogEntry { tag, label, icon, family }
}

static CATALOG: &[CatalogEntry] = &[
    entry("bar-chart", "Bar Chart", "chart-bar", WidgetFamily::Chart),
    entry("line-chart", "Line Chart", "chart-line", WidgetFamily::Chart),
    entry("area-chart", "Area Chart", "chart-area", WidgetFamily::Chart),
    entry("pie-chart", "Pie Chart", "chart-pie", WidgetFamily::Chart),
    entry("scatter-chart", "Scatter Plot", "chart-scatter", WidgetFamily::Chart),
    entry("table", "Table", "table", WidgetFamily::Table),
    entry("pivot-table", "Pivot Table", "table-pivot", WidgetFamily::Table),
    entry("kpi-card", "KPI Card", "gauge", WidgetFamily::Metric),
    entry("dropdown-filter", "Dropdown Filter", "filter", WidgetFamily::Filter),
    entry("date-filter", "Date Range", "calendar", WidgetFamily::Filter),
    entry("slicer", "Slicer", "sliders", WidgetFamily::Filter),
    entry("text", "Text", "type", WidgetFamily::Text),
    entry("heading", "Heading", "heading", WidgetFamily::Text),
    entry("button", "Button", "pointer", WidgetFamily::Button),
    entry("rectangle", "Rectangle", "square", WidgetFamily::Shape),
    entry("ellipse", "Ellipse", "circle", WidgetFamily::Shape),
    entry("line", "Line", "minus", WidgetFamily::Shape),
    entry("image", "Image", "image", WidgetFamily::Media),
];

/// Every known widget type, in palette order.
#[must_use]
pub fn entries() -> &'static [CatalogEntry] {
    CATALOG
}

/// Look up a type tag.
#[must_use]
pub fn lookup(tag: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.tag == tag)
}

/// Default footprint for a type tag, falling back for unknown tags.
#[must_use]
pub fn footprint(tag: &str) -> (f64, f64) {
    match lookup(tag) {
        Some(entry) => entry.footprint(),
        None => {
            tracing::debug!(tag, "unknown widget type; using fallback footprint");
            (FALLBACK_WIDTH, FALLBACK_HEIGHT)
        }
    }
}
