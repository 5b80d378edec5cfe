use std::{io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

use crate::common::PendingWrite;

pub(crate) struct SvgWriter {
    writer: BufWriter<PendingWrite>,
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for SvgWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl SvgWriter {
    /// Create a new SVG writer to a file path
    pub(crate) fn new(path: &Path) -> Result<Self> {
        let sink = PendingWrite::open(path)
            .with_context(|| format!("[to_svg] Failed to create {}", path.display()))?;
        Ok(Self { writer: BufWriter::new(sink) })
    }

    /// Write the SVG header, including the XML declaration and opening <svg> tag.
    pub(crate) fn write_header(&mut self, width: f64, height: f64) -> Result<()> {
        writeln!(self, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
        writeln!(self, r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.3} {height:.3}">"##)?;
        writeln!(self, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        Ok(())
    }

    /// Write SVG styles for map and chart features.
    pub(crate) fn write_styles(&mut self) -> Result<()> {
        writeln!(self, r##"<defs>
<style>
    .state {{ stroke: #111827; stroke-width: 0.5; fill-rule: evenodd; }}
    .axis {{ stroke: #111827; stroke-width: 1; fill: none; }}
    .grid {{ stroke: #d1d5db; stroke-width: 0.5; }}
    .box {{ fill: #e5e7eb; stroke: #111827; stroke-width: 1; }}
    .median {{ stroke: #111827; stroke-width: 2; }}
    .whisker {{ stroke: #111827; stroke-width: 1; }}
    .outlier {{ fill: none; stroke: #111827; stroke-width: 1; }}
    .profile {{ fill: none; stroke-width: 2; }}
    .swatch {{ stroke: #111827; stroke-width: 0.5; }}
    text {{ font-family: Helvetica, Arial, sans-serif; font-size: 12px; fill: #111827; }}
    .title {{ font-size: 16px; font-weight: bold; }}
</style>
</defs>"##)?;
        Ok(())
    }

    /// Write a text label; `anchor` is one of start, middle, end.
    pub(crate) fn write_text(&mut self, x: f64, y: f64, anchor: &str, class: Option<&str>, text: &str) -> Result<()> {
        let class = class.map(|c| format!(r#" class="{c}""#)).unwrap_or_default();
        writeln!(self, r#"<text x="{x:.3}" y="{y:.3}" text-anchor="{anchor}"{class}>{}</text>"#, escape_text(text))?;
        Ok(())
    }

    /// Write the closing </svg> tag and move the file into place.
    pub(crate) fn finish(mut self) -> Result<()> {
        writeln!(self, "</svg>")?;
        let sink = self.writer.into_inner()
            .map_err(|e| anyhow::anyhow!("[to_svg] Failed to flush SVG: {}", e.error()))?;
        sink.finalize()
    }
}

/// Escape the XML special characters of a text node.
pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_complete_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");

        let mut writer = SvgWriter::new(&path).unwrap();
        writer.write_header(100.0, 50.0).unwrap();
        writer.write_styles().unwrap();
        writer.write_text(10.0, 20.0, "start", None, "A & B").unwrap();
        writer.finish().unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("A &amp; B"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
