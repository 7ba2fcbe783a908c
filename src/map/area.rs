use super::marker::LatLng;
use log::warn;
use std::collections::HashMap;

/// Identifier of a placed marker, unique for the lifetime of an engine
pub type MarkerId = u32;

/// A marker as it currently sits on the map
///
/// This is the visual state. After the initial import it is the only source
/// of truth; records are re-derived from it on every export.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub id: MarkerId,
    /// Running number carried over from the source record
    pub number: Option<String>,
    pub position: LatLng,
    /// Icon color (palette entry or explicit record color)
    pub color: String,
    /// Tooltip label; carries the modified glyph once the marker was moved
    pub label: Option<String>,
}

/// An overlay group holding all markers of one area
#[derive(Debug, Clone)]
pub struct AreaGroup {
    name: String,
    markers: Vec<PlacedMarker>,
    /// Overlay toggle in the layer switcher, kept across clears
    visible: bool,
}

impl AreaGroup {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            markers: Vec::new(),
            visible: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Markers in placement order
    pub fn markers(&self) -> &[PlacedMarker] {
        &self.markers
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn push(&mut self, marker: PlacedMarker) {
        self.markers.push(marker);
    }

    /// Remove every marker and return how many were removed
    pub fn clear(&mut self) -> usize {
        let count = self.markers.len();
        self.markers.clear();
        count
    }
}

/// Registry of area groups keyed by area name
pub struct AreaGroups {
    /// Groups in registration order
    ///
    /// Export walks this Vec, so the order of areas in the stored blob follows
    /// the order in which areas were first referenced.
    groups: Vec<AreaGroup>,

    /// Area name → position in `groups`
    ///
    /// Groups are never removed, so positions stay valid for the lifetime of
    /// the registry.
    index: HashMap<String, usize>,
}

impl Default for AreaGroups {
    fn default() -> Self {
        Self::new()
    }
}

impl AreaGroups {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Return the group for `area`, registering an empty visible group on first use
    pub fn group_for(&mut self, area: &str) -> &mut AreaGroup {
        let pos = match self.index.get(area) {
            Some(&pos) => pos,
            None => {
                self.groups.push(AreaGroup::new(area));
                let pos = self.groups.len() - 1;
                self.index.insert(area.to_string(), pos);
                pos
            }
        };
        &mut self.groups[pos]
    }

    /// Look up a group without registering it
    pub fn get(&self, area: &str) -> Option<&AreaGroup> {
        self.index.get(area).map(|&pos| &self.groups[pos])
    }

    /// Iterate groups in registration order
    pub fn iter(&self) -> impl Iterator<Item = &AreaGroup> {
        self.groups.iter()
    }

    /// Number of registered groups, including empty ones
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of placed markers across all groups
    pub fn marker_count(&self) -> usize {
        self.groups.iter().map(AreaGroup::len).sum()
    }

    /// Remove every marker from every group
    ///
    /// Groups stay registered together with their visibility toggles, so a
    /// re-import lands in the same overlays.
    pub fn clear_all(&mut self) -> usize {
        let mut removed = 0;
        for group in self.groups.iter_mut() {
            removed += group.clear();
            warn!("cleared: group \"{}\"", group.name);
        }
        removed
    }

    /// Toggle the overlay of an area
    ///
    /// # Returns
    /// `Some(())` if the area is registered, `None` otherwise
    pub fn set_visible(&mut self, area: &str, visible: bool) -> Option<()> {
        let pos = *self.index.get(area)?;
        self.groups[pos].visible = visible;
        Some(())
    }

    /// Find a placed marker by id together with the name of its area
    pub fn find_marker(&self, id: MarkerId) -> Option<(&str, &PlacedMarker)> {
        self.groups.iter().find_map(|group| {
            group
                .markers
                .iter()
                .find(|m| m.id == id)
                .map(|m| (group.name.as_str(), m))
        })
    }

    /// Find a placed marker by id and return a mutable reference
    pub fn find_marker_mut(&mut self, id: MarkerId) -> Option<&mut PlacedMarker> {
        self.groups
            .iter_mut()
            .flat_map(|group| group.markers.iter_mut())
            .find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(id: MarkerId, label: &str) -> PlacedMarker {
        PlacedMarker {
            id,
            number: None,
            position: LatLng::new(35.0, 136.0),
            color: "blue".to_string(),
            label: Some(label.to_string()),
        }
    }

    #[test]
    fn test_group_for_creates_once() {
        let mut groups = AreaGroups::new();
        groups.group_for("AreaA").push(placed(1, "a"));
        groups.group_for("AreaA").push(placed(2, "b"));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get("AreaA").unwrap().len(), 2);
        assert!(groups.get("AreaA").unwrap().is_visible());
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut groups = AreaGroups::new();
        for area in ["いいいい", "ああああ", "B", "A"] {
            groups.group_for(area);
        }
        groups.group_for("ああああ");

        let names: Vec<&str> = groups.iter().map(AreaGroup::name).collect();
        assert_eq!(names, vec!["いいいい", "ああああ", "B", "A"]);
    }

    #[test]
    fn test_clear_all_keeps_groups_and_toggles() {
        let mut groups = AreaGroups::new();
        groups.group_for("A").push(placed(1, "a"));
        groups.group_for("B").push(placed(2, "b"));
        groups.group_for("B").push(placed(3, "c"));
        groups.set_visible("B", false).unwrap();

        assert_eq!(groups.clear_all(), 3);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.marker_count(), 0);
        assert!(!groups.get("B").unwrap().is_visible());
    }

    #[test]
    fn test_set_visible_unknown_area() {
        let mut groups = AreaGroups::new();
        assert!(groups.set_visible("nowhere", false).is_none());
        // 未登録のエリアを作らない
        assert!(groups.is_empty());
    }

    #[test]
    fn test_find_marker() {
        let mut groups = AreaGroups::new();
        groups.group_for("A").push(placed(1, "a"));
        groups.group_for("B").push(placed(2, "b"));

        let (area, marker) = groups.find_marker(2).unwrap();
        assert_eq!(area, "B");
        assert_eq!(marker.label.as_deref(), Some("b"));

        groups.find_marker_mut(1).unwrap().color = "green".to_string();
        assert_eq!(groups.find_marker(1).unwrap().1.color, "green");
        assert!(groups.find_marker(99).is_none());
    }
}
