/// Two-panel heat-map of shared hits, rendered as SVG
///
/// Row `i` of both panels describes the same identifier. The identity panel
/// is brightest for the highest identity, the E-value panel for the smallest
/// E-value (colour is taken on a -log10 scale).
use anyhow::{bail, Context, Result};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::shared::SharedHit;

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

const VIRIDIS: [Rgb; 9] = [
    Rgb(0x44, 0x01, 0x54),
    Rgb(0x46, 0x32, 0x7e),
    Rgb(0x3b, 0x52, 0x8b),
    Rgb(0x2c, 0x72, 0x8e),
    Rgb(0x21, 0x91, 0x8c),
    Rgb(0x28, 0xae, 0x80),
    Rgb(0x5e, 0xc9, 0x62),
    Rgb(0xad, 0xdc, 0x30),
    Rgb(0xfd, 0xe7, 0x25),
];

const MAGMA: [Rgb; 9] = [
    Rgb(0x00, 0x00, 0x04),
    Rgb(0x1c, 0x10, 0x44),
    Rgb(0x4f, 0x12, 0x7b),
    Rgb(0x81, 0x25, 0x81),
    Rgb(0xb5, 0x36, 0x7a),
    Rgb(0xe5, 0x59, 0x64),
    Rgb(0xfb, 0x87, 0x61),
    Rgb(0xfe, 0xc2, 0x87),
    Rgb(0xfc, 0xfd, 0xbf),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Viridis,
    Magma,
}

impl Colormap {
    fn stops(self) -> &'static [Rgb] {
        match self {
            Colormap::Viridis => &VIRIDIS,
            Colormap::Magma => &MAGMA,
        }
    }

    /// Colour at position `t` in [0, 1], linearly interpolated between stops
    pub fn color(self, t: f64) -> Rgb {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (stops.len() - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(stops.len() - 1);
        let frac = pos - lo as f64;

        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        let (a, b) = (stops[lo], stops[hi]);
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }
}

/// How raw values are turned into colour intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Larger value, more intense
    Linear,
    /// Smaller value, more intense; zero is clamped to the smallest positive f64
    NegLog10,
}

impl Scale {
    fn transform(self, value: f64) -> f64 {
        match self {
            Scale::Linear => value,
            Scale::NegLog10 => -value.max(f64::MIN_POSITIVE).log10(),
        }
    }
}

/// Geometry and colours of the rendered image
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapStyle {
    pub cell_width: u32,
    pub cell_height: u32,
    pub label_width: u32,
    pub panel_gap: u32,
    pub margin: u32,
    pub font_size: u32,
    pub identity_colormap: Colormap,
    pub evalue_colormap: Colormap,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        HeatmapStyle {
            cell_width: 80,
            cell_height: 14,
            label_width: 160,
            panel_gap: 24,
            margin: 12,
            font_size: 9,
            identity_colormap: Colormap::Viridis,
            evalue_colormap: Colormap::Magma,
        }
    }
}

/// One column of the heat-map
pub struct Panel<'a> {
    pub title: &'a str,
    pub values: &'a [f64],
    pub scale: Scale,
    pub colormap: Colormap,
    pub format: fn(f64) -> String,
}

impl Panel<'_> {
    /// Colour intensity of every value, normalised to [0, 1]
    fn intensities(&self) -> Vec<f64> {
        let transformed: Vec<f64> = self.values.iter().map(|&v| self.scale.transform(v)).collect();
        let min = transformed.iter().copied().fold(f64::INFINITY, f64::min);
        let max = transformed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        transformed
            .iter()
            .map(|&v| if range > 0.0 { (v - min) / range } else { 1.0 })
            .collect()
    }

    /// Raw values at the dim and bright ends of the colour bar
    fn extremes(&self) -> (f64, f64) {
        let mut dim = self.values[0];
        let mut bright = self.values[0];
        for &value in self.values {
            if self.scale.transform(value) < self.scale.transform(dim) {
                dim = value;
            }
            if self.scale.transform(value) > self.scale.transform(bright) {
                bright = value;
            }
        }
        (dim, bright)
    }
}

fn format_identity(value: f64) -> String {
    format!("{value:.1}")
}

fn format_evalue(value: f64) -> String {
    format!("{value:.1e}")
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render row-aligned panels as an SVG document
pub fn render_panels(labels: &[&str], panels: &[Panel], style: &HeatmapStyle) -> Result<String> {
    if labels.is_empty() {
        bail!("Nothing to render: no rows");
    }
    for panel in panels {
        if panel.values.len() != labels.len() {
            bail!(
                "Panel '{}' has {} values but there are {} row labels",
                panel.title,
                panel.values.len(),
                labels.len()
            );
        }
    }

    let rows = labels.len() as u32;
    let cols = panels.len() as u32;
    let font = style.font_size;
    let header_height = font * 3;
    let legend_height = style.cell_height + font * 3;
    let grid_top = style.margin + header_height;
    let grid_height = rows * style.cell_height;
    let width = 2 * style.margin
        + style.label_width
        + cols * style.cell_width
        + cols.saturating_sub(1) * style.panel_gap;
    let height = grid_top + grid_height + legend_height + style.margin;

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif" font-size="{font}">"#
    )?;
    writeln!(svg, r#"<rect width="{width}" height="{height}" fill="white"/>"#)?;

    // row labels, right-aligned against the first panel
    let label_x = style.margin + style.label_width - font / 2;
    for (row, label) in labels.iter().enumerate() {
        let y = grid_top + row as u32 * style.cell_height + style.cell_height / 2;
        writeln!(
            svg,
            r#"<text x="{label_x}" y="{y}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            escape_xml(label)
        )?;
    }

    for (col, panel) in panels.iter().enumerate() {
        let x = style.margin + style.label_width + col as u32 * (style.cell_width + style.panel_gap);
        let center = x + style.cell_width / 2;
        let intensities = panel.intensities();

        writeln!(
            svg,
            r#"<text x="{center}" y="{}" text-anchor="middle" font-weight="bold">{}</text>"#,
            style.margin + font * 2,
            escape_xml(panel.title)
        )?;

        for (row, (&value, &t)) in panel.values.iter().zip(&intensities).enumerate() {
            let y = grid_top + row as u32 * style.cell_height;
            writeln!(
                svg,
                r#"<rect x="{x}" y="{y}" width="{}" height="{}" fill="{}"><title>{}: {}</title></rect>"#,
                style.cell_width,
                style.cell_height,
                panel.colormap.color(t).hex(),
                escape_xml(labels[row]),
                (panel.format)(value)
            )?;
        }

        // colour bar from dim to bright with the matching raw values
        let gradient_id = format!("bar{col}");
        let bar_y = grid_top + grid_height + font;
        writeln!(svg, r#"<defs><linearGradient id="{gradient_id}">"#)?;
        for step in 0..=4 {
            let t = step as f64 / 4.0;
            writeln!(
                svg,
                r#"<stop offset="{:.0}%" stop-color="{}"/>"#,
                t * 100.0,
                panel.colormap.color(t).hex()
            )?;
        }
        writeln!(svg, "</linearGradient></defs>")?;
        writeln!(
            svg,
            r#"<rect x="{x}" y="{bar_y}" width="{}" height="{}" fill="url(#{gradient_id})"/>"#,
            style.cell_width,
            style.cell_height / 2
        )?;

        let (dim, bright) = panel.extremes();
        let text_y = bar_y + style.cell_height / 2 + font + 2;
        writeln!(
            svg,
            r#"<text x="{x}" y="{text_y}" text-anchor="start">{}</text>"#,
            (panel.format)(dim)
        )?;
        writeln!(
            svg,
            r#"<text x="{}" y="{text_y}" text-anchor="end">{}</text>"#,
            x + style.cell_width,
            (panel.format)(bright)
        )?;
    }

    writeln!(svg, "</svg>")?;
    Ok(svg)
}

/// Render the identity/E-value heat-map for identifiers sorted as given
pub fn render_dual_panel(
    labels: &[&str],
    identity: &[f64],
    evalue: &[f64],
    style: &HeatmapStyle,
) -> Result<String> {
    if identity.len() != evalue.len() {
        bail!(
            "Identity and E-value vectors differ in length ({} vs {})",
            identity.len(),
            evalue.len()
        );
    }

    let panels = [
        Panel {
            title: "% identity",
            values: identity,
            scale: Scale::Linear,
            colormap: style.identity_colormap,
            format: format_identity,
        },
        Panel {
            title: "E-value",
            values: evalue,
            scale: Scale::NegLog10,
            colormap: style.evalue_colormap,
            format: format_evalue,
        },
    ];
    render_panels(labels, &panels, style)
}

pub fn render_shared_hits(hits: &[SharedHit], style: &HeatmapStyle) -> Result<String> {
    let labels: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
    let identity: Vec<f64> = hits.iter().map(|hit| hit.identity).collect();
    let evalue: Vec<f64> = hits.iter().map(|hit| hit.evalue).collect();
    render_dual_panel(&labels, &identity, &evalue, style)
}

/// Render the shared-hit heat-map and write it to `path`
pub fn write_heatmap<P: AsRef<Path>>(path: P, hits: &[SharedHit], style: &HeatmapStyle) -> Result<()> {
    let path = path.as_ref();
    let svg = render_shared_hits(hits, style)?;

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(svg.as_bytes())
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Heat-map of {} shared hits written to {}", hits.len(), path.display());
    Ok(())
}
