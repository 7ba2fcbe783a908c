//! Formatting helper functions for tool output

use crate::config::Config;
use crate::map::{AreaGroup, AreaGroups, ImportReport, PlacedMarker};

/// Format one placed marker as a list line
///
/// # Example
/// `- [3] 東口* (35.068414, 136.022195) green`
pub fn format_marker(marker: &PlacedMarker) -> String {
    format!(
        "- [{}] {} ({:.6}, {:.6}) {}",
        marker.id,
        marker.label.as_deref().unwrap_or("(no name)"),
        marker.position.lat,
        marker.position.lng,
        marker.color
    )
}

fn format_group(result: &mut String, group: &AreaGroup) {
    result.push_str(&format!(
        "## {} ({} marker(s){})\n",
        group.name(),
        group.len(),
        if group.is_visible() { "" } else { ", hidden" }
    ));
    for marker in group.markers() {
        result.push_str(&format_marker(marker));
        result.push('\n');
    }
}

/// Format all markers grouped by area, optionally limited to one area
pub fn format_marker_list(groups: &AreaGroups, area: Option<&str>) -> String {
    let selected: Vec<&AreaGroup> = groups
        .iter()
        .filter(|g| area.is_none_or(|name| g.name() == name))
        .collect();
    let total: usize = selected.iter().map(|g| g.len()).sum();

    if total == 0 {
        return "No markers found".to_string();
    }

    let mut result = format!("Found {} marker(s):\n\n", total);
    for group in selected {
        format_group(&mut result, group);
    }
    result
}

/// Format the layer switcher contents: base layers, overlays and the initial view
pub fn format_layers(config: &Config, groups: &AreaGroups) -> String {
    let mut result = String::from("Base layers:\n");
    for (i, layer) in config.base_layers.iter().enumerate() {
        result.push_str(&format!(
            "- {}{} {} (max zoom {})\n",
            layer.name,
            if i == 0 { " [initial]" } else { "" },
            layer.url,
            layer.max_zoom
        ));
    }

    result.push_str("\nOverlays:\n");
    if groups.is_empty() {
        result.push_str("(none)\n");
    }
    for group in groups.iter() {
        result.push_str(&format!(
            "- [{}] {} ({} marker(s))\n",
            if group.is_visible() { "x" } else { " " },
            group.name(),
            group.len()
        ));
    }

    result.push_str(&format!(
        "\nView: center ({}, {}), zoom {}\n",
        config.view.center[0], config.view.center[1], config.view.zoom
    ));
    result
}

pub fn format_import_report(report: &ImportReport) -> String {
    format!(
        "Imported {} marker(s), skipped {}",
        report.placed, report.skipped
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LatLng;

    fn placed(id: u32, label: Option<&str>) -> PlacedMarker {
        PlacedMarker {
            id,
            number: None,
            position: LatLng::new(35.0, 136.0),
            color: "blue".to_string(),
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn test_format_marker() {
        assert_eq!(
            format_marker(&placed(3, Some("東口*"))),
            "- [3] 東口* (35.000000, 136.000000) blue"
        );
        assert!(format_marker(&placed(4, None)).contains("(no name)"));

        let mut moved = placed(3, Some("東口*"));
        moved.position = LatLng::new(35.06841434635014, 136.02219521999362);
        moved.color = "green".to_string();
        assert_eq!(
            format_marker(&moved),
            "- [3] 東口* (35.068414, 136.022195) green"
        );
    }

    #[test]
    fn test_format_marker_list_filter() {
        let mut groups = AreaGroups::new();
        groups.group_for("A").push(placed(1, Some("a")));
        groups.group_for("B").push(placed(2, Some("b")));

        let all = format_marker_list(&groups, None);
        assert!(all.starts_with("Found 2 marker(s)"));
        assert!(all.contains("## A") && all.contains("## B"));

        let only_b = format_marker_list(&groups, Some("B"));
        assert!(only_b.starts_with("Found 1 marker(s)"));
        assert!(!only_b.contains("## A"));

        assert_eq!(format_marker_list(&groups, Some("C")), "No markers found");
    }

    #[test]
    fn test_format_layers() {
        let mut groups = AreaGroups::new();
        groups.group_for("A").push(placed(1, Some("a")));
        groups.group_for("B");
        groups.set_visible("B", false);

        let text = format_layers(&Config::default(), &groups);
        assert!(text.contains("- gsi [initial]"));
        assert!(text.contains("- osm "));
        assert!(text.contains("- [x] A (1 marker(s))"));
        assert!(text.contains("- [ ] B (0 marker(s))"));
    }
}
