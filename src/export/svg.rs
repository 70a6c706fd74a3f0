//! Serialize reduced track paths into SVG markup
use crate::geometry::{PixelBounds, PixelPoint};
use crate::style::StyleSpec;
use std::fmt::Write;

/// One stroked polyline in the exported document
#[derive(Debug)]
pub struct SvgPath<'a> {
    points: Vec<PixelPoint>,
    style: &'a StyleSpec,
}

impl<'a> SvgPath<'a> {
    pub fn new(points: Vec<PixelPoint>, style: &'a StyleSpec) -> Self {
        SvgPath { points, style }
    }

    pub fn points(&self) -> &[PixelPoint] {
        &self.points
    }

    /// Path data made of a move to the first point and a line to each following point
    fn path_data(&self) -> String {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let cmd = if i == 0 { "M" } else { "L" };
                format!("{}{} {}", cmd, p.x, p.y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Escape characters that can't appear inside of an attribute value
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Build the SVG document, the view box is set to the export viewport so path coordinates
/// can stay in world pixel space.
pub fn to_svg(viewport: &PixelBounds, paths: &[SvgPath<'_>]) -> String {
    let min = viewport.min();
    let size = viewport.size();
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        min.x, min.y, size.x, size.y
    );
    out.push_str("<g>");
    for path in paths {
        let _ = write!(
            out,
            concat!(
                r#"<path d="{}" stroke="{}" stroke-opacity="{}" stroke-width="{}" "#,
                r#"stroke-linecap="round" stroke-linejoin="round" fill="none"/>"#
            ),
            path.path_data(),
            xml_escape(path.style.color()),
            path.style.opacity(),
            path.style.weight(),
        );
    }
    out.push_str("</g></svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_view_box_and_stroke_attributes() {
        let style = StyleSpec::new("#0CB1E8", 2.0, 0.5).unwrap();
        let viewport = PixelBounds::from_origin_size(
            PixelPoint::new(100.0, 200.0),
            PixelPoint::new(1600.0, 1200.0),
        );
        let paths = vec![SvgPath::new(
            vec![PixelPoint::new(150.5, 250.0), PixelPoint::new(160.0, 260.1)],
            &style,
        )];
        let svg = to_svg(&viewport, &paths);
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="100 200 1600 1200">"#));
        assert!(svg.contains(r#"d="M150.5 250 L160 260.1""#));
        assert!(svg.contains(r##"stroke="#0CB1E8" stroke-opacity="0.5" stroke-width="2""##));
        assert!(svg.contains(r#"stroke-linecap="round" stroke-linejoin="round" fill="none""#));
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn escapes_color_values() {
        let style = StyleSpec::new("a\"b", 1.0, 1.0).unwrap();
        let viewport = PixelBounds::new(PixelPoint::new(0.0, 0.0), PixelPoint::new(1.0, 1.0));
        let svg = to_svg(&viewport, &[SvgPath::new(vec![PixelPoint::new(0.0, 0.0)], &style)]);
        assert!(svg.contains(r#"stroke="a&quot;b""#));
    }
}
