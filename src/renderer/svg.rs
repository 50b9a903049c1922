//! SVG generation from family layouts

use crate::layout::{BoundingBox, Connector, FamilyLayout, Point};
use crate::model::{Family, PartnershipKind, Person};
use crate::stylesheet::Stylesheet;

use super::SvgConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    styles: Vec<String>,
    elements: Vec<String>,
    connections: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            styles: vec![],
            elements: vec![],
            connections: vec![],
            indent: 1,
        }
    }

    /// Add CSS custom properties from a stylesheet, plus the rules using them
    pub fn add_stylesheet(&mut self, stylesheet: &Stylesheet) {
        let mut css = String::from(":root {\n");
        for (token, value) in stylesheet.merged_with_defaults() {
            css.push_str(&format!("      --{}: {};\n", token, value));
        }
        css.push_str("    }");
        self.styles.push(css);

        let p = self.prefix();
        let rules = [
            format!(
                ".{p}person {{ fill: var(--person-fill); stroke: var(--person-stroke); stroke-width: 1.5; }}"
            ),
            format!(".{p}person.{p}self {{ fill: var(--self-fill); }}"),
            format!(
                ".{p}person.{p}deceased {{ fill: var(--deceased-fill); stroke-dasharray: 4 3; }}"
            ),
            format!(
                ".{p}connector {{ fill: none; stroke: var(--connector); stroke-width: 1.5; }}"
            ),
            format!(".{p}connector.{p}former {{ stroke: var(--former-spouse); stroke-dasharray: 6 4; }}"),
            format!(
                ".{p}label {{ fill: var(--text); font-size: {}px; font-family: sans-serif; }}",
                self.config.font_size
            ),
        ];
        self.styles.extend(rules);
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add a person box
    pub fn add_person(&mut self, id: &str, bounds: &BoundingBox, classes: &[String]) {
        let prefix = self.prefix();
        let class_list = std::iter::once(format!("{}person", prefix))
            .chain(classes.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        self.elements.push(format!(
            r#"{}<rect id="{}{}" class="{}" x="{}" y="{}" width="{}" height="{}" rx="4"/>"#,
            self.indent_str(),
            prefix,
            escape_xml(id),
            class_list,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        ));
    }

    /// Add a centered label
    pub fn add_label(&mut self, text: &str, center: Point) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<text class="{}label" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            self.indent_str(),
            prefix,
            center.x,
            center.y,
            escape_xml(text)
        ));
    }

    /// Add a connector path
    pub fn add_connector(&mut self, path: &[Point], classes: &[String]) {
        let prefix = self.prefix();
        let class_list = std::iter::once(format!("{}connector", prefix))
            .chain(classes.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");

        self.connections.push(format!(
            r#"{}<path class="{}" d="{}"/>"#,
            self.indent_str(),
            class_list,
            path_to_d(path)
        ));
    }

    /// Build the final SVG string
    pub fn build(self, viewbox: BoundingBox) -> String {
        let padding = self.config.viewbox_padding;
        let vb_x = viewbox.x - padding;
        let vb_y = viewbox.y - padding;
        let vb_w = viewbox.width + 2.0 * padding;
        let vb_h = viewbox.height + 2.0 * padding;

        let nl = self.newline();

        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            vb_x, vb_y, vb_w, vb_h
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        // Connectors first so boxes sit on top of the line ends
        for conn in &self.connections {
            svg.push_str(conn);
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");

        svg
    }
}

/// Render a family layout to an SVG string
pub fn render_svg(
    family: &Family,
    layout: &FamilyLayout,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    let prefix = config.class_prefix.clone().unwrap_or_default();

    builder.add_stylesheet(stylesheet);

    for connector in &layout.connectors {
        let classes = match connector {
            Connector::UnionBar(bar) => {
                let former = layout
                    .unions
                    .iter()
                    .find(|u| u.id == bar.union)
                    .is_some_and(|u| u.kind == Some(PartnershipKind::FormerSpouse));
                let mut classes = vec![format!("{}union-bar", prefix)];
                if former {
                    classes.push(format!("{}former", prefix));
                }
                classes
            }
            Connector::DropLine(_) => vec![format!("{}drop", prefix)],
        };
        builder.add_connector(connector.path(), &classes);
    }

    for person in family.people() {
        let Some(bounds) = layout.boxes.get(&person.id) else {
            continue;
        };
        let mut classes = Vec::new();
        if person.is_anchor() {
            classes.push(format!("{}self", prefix));
        }
        if !person.is_alive {
            classes.push(format!("{}deceased", prefix));
        }
        builder.add_person(person.id.as_str(), bounds, &classes);
        builder.add_label(&person_label(person, config.show_annotations), bounds.center());
    }

    builder.build(layout.bounds)
}

/// "Name (relation · death label)", with the parenthesis only when there is
/// something to put in it
pub fn person_label(person: &Person, annotated: bool) -> String {
    if !annotated {
        return person.display_name.clone();
    }

    let mut parts: Vec<&str> = Vec::new();
    if let Some(relation) = &person.declared_relation {
        let label = relation.label();
        if !label.is_empty() {
            parts.push(label);
        }
    }
    if !person.is_alive {
        parts.push(person.death_label.as_deref().unwrap_or("deceased"));
    }

    if parts.is_empty() {
        person.display_name.clone()
    } else {
        format!("{} ({})", person.display_name, parts.join(" · "))
    }
}

/// Convert a path of points to an SVG path d attribute
fn path_to_d(path: &[Point]) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut d = format!("M{} {}", path[0].x, path[0].y);
    for point in &path[1..] {
        d.push_str(&format!(" L{} {}", point.x, point.y));
    }
    d
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
