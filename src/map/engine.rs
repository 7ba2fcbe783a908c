use super::area::{AreaGroups, MarkerId, PlacedMarker};
use super::marker::{
    LatLng, LayerType, MarkerRecord, add_modified_mark, has_modified_mark, remove_modified_mark,
};
use super::serde_impl::{decode_records, encode_records};
use crate::config::Palette;
use crate::csv_import;
use crate::error::MapError;
use crate::storage::Storage;
use encoding_rs::Encoding;
use log::{info, warn};

/// A mutation of the map state
///
/// Every change to the map goes through `MapEngine::handle`, one command at a
/// time.
#[derive(Debug, Clone)]
pub enum Command {
    /// Place a batch of records on the map
    ImportBatch(Vec<MarkerRecord>),
    /// Clear the map and place the records of a raw CSV upload
    ImportCsv(Vec<u8>),
    /// A marker was dropped at a new position
    ApplyDrag {
        marker_id: MarkerId,
        position: LatLng,
    },
    /// Remove every marker, keeping the area groups
    ClearAll,
    /// Toggle an area overlay
    SetAreaVisible { area: String, visible: bool },
}

/// Counts reported by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Markers placed on the map
    pub placed: usize,
    /// Records or lines that were skipped
    pub skipped: usize,
}

/// What a command did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Imported(ImportReport),
    Moved {
        marker_id: MarkerId,
        label: String,
        /// Whether the full snapshot reached storage
        saved: bool,
    },
    Cleared {
        removed: usize,
    },
    VisibilityChanged,
}

/// Import/export engine
///
/// Owns the area registry (the visual state) and the persistence adapter.
/// Records go in through imports and come out through `export_records`,
/// which always walks the placed markers rather than any earlier input.
pub struct MapEngine {
    groups: AreaGroups,
    storage: Storage,
    palette: Palette,
    csv_encoding: &'static Encoding,
    next_id: MarkerId,
}

impl MapEngine {
    pub fn new(storage: Storage, palette: Palette, csv_encoding: &'static Encoding) -> Self {
        Self {
            groups: AreaGroups::new(),
            storage,
            palette,
            csv_encoding,
            next_id: 1,
        }
    }

    pub fn groups(&self) -> &AreaGroups {
        &self.groups
    }

    /// Run one command to completion
    pub fn handle(&mut self, command: Command) -> Result<Outcome, MapError> {
        match command {
            Command::ImportBatch(records) => Ok(Outcome::Imported(self.import_records(records))),
            Command::ImportCsv(bytes) => Ok(Outcome::Imported(self.import_csv(&bytes))),
            Command::ApplyDrag {
                marker_id,
                position,
            } => self.apply_drag(marker_id, position),
            Command::ClearAll => Ok(Outcome::Cleared {
                removed: self.groups.clear_all(),
            }),
            Command::SetAreaVisible { area, visible } => {
                match self.groups.set_visible(&area, visible) {
                    Some(()) => Ok(Outcome::VisibilityChanged),
                    None => Err(MapError::UnknownArea(area)),
                }
            }
        }
    }

    /// Load the stored blob and place its markers
    ///
    /// `seed` is placed instead when nothing is stored. A store that cannot be
    /// read or a blob that cannot be decoded leaves the map empty.
    pub fn load_data(&mut self, seed: &[MarkerRecord]) -> ImportReport {
        let records = match self.storage.try_load() {
            Ok(None) => seed.to_vec(),
            Ok(Some(blob)) => match decode_records(&blob) {
                Ok(records) => records,
                Err(e) => {
                    warn!("{}", e);
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        };
        let report = self.import_records(records);
        info!(
            "loaded {} marker(s) from storage key '{}'",
            report.placed,
            self.storage.key()
        );
        report
    }

    /// Place records on the map
    ///
    /// Records with an unrecognized type are skipped with a warning; the rest
    /// of the batch is still placed.
    pub fn import_records(&mut self, records: Vec<MarkerRecord>) -> ImportReport {
        let mut report = ImportReport::default();

        for record in records {
            if let LayerType::Other(ref tag) = record.layer_type {
                warn!(
                    "{} when loading markers",
                    MapError::UnrecognizedRecordType(tag.clone())
                );
                report.skipped += 1;
                continue;
            }

            let id = match self.allocate_id() {
                Ok(id) => id,
                Err(e) => {
                    warn!("{}", e);
                    report.skipped += 1;
                    continue;
                }
            };
            let marker = PlacedMarker {
                id,
                number: record.number.clone(),
                position: record.lat_lng,
                color: self
                    .palette
                    .resolve(record.color.as_deref(), record.modified),
                label: record.label(),
            };

            self.groups.group_for(&record.area).push(marker);
            report.placed += 1;
        }

        report
    }

    fn allocate_id(&mut self) -> Result<MarkerId, MapError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(MapError::MarkerIdsExhausted)?;
        Ok(id)
    }

    /// Replace the map contents with the records of a CSV upload
    ///
    /// Existing groups are cleared, not dropped. Nothing is persisted until
    /// the next drag.
    pub fn import_csv(&mut self, bytes: &[u8]) -> ImportReport {
        let parsed = csv_import::import(bytes, self.csv_encoding);
        self.groups.clear_all();
        let mut report = self.import_records(parsed.records);
        report.skipped += parsed.dropped;
        report
    }

    /// Move a marker and persist the whole map
    ///
    /// The marker switches to the modified color and its label gains the
    /// modified glyph (once). The full snapshot is saved before returning; a
    /// failed save is logged and reported in the outcome but does not undo
    /// the move.
    pub fn apply_drag(
        &mut self,
        marker_id: MarkerId,
        position: LatLng,
    ) -> Result<Outcome, MapError> {
        let marker = self
            .groups
            .find_marker_mut(marker_id)
            .ok_or(MapError::UnknownMarker(marker_id))?;

        marker.position = position;
        marker.color = self.palette.modified.clone();
        let label = add_modified_mark(marker.label.as_deref());
        marker.label = Some(label.clone());

        let saved = self.save_data().is_ok();
        Ok(Outcome::Moved {
            marker_id,
            label,
            saved,
        })
    }

    /// Rebuild the record list from the placed markers
    ///
    /// Areas come in registration order, markers in placement order.
    pub fn export_records(&self) -> Vec<MarkerRecord> {
        let mut records = Vec::with_capacity(self.groups.marker_count());

        for group in self.groups.iter() {
            for marker in group.markers() {
                let label = marker.label.as_deref();
                records.push(MarkerRecord {
                    layer_type: LayerType::Marker,
                    area: group.name().to_string(),
                    number: marker.number.clone(),
                    name: label
                        .map(remove_modified_mark)
                        .filter(|name| !name.is_empty()),
                    lat_lng: marker.position,
                    color: Some(marker.color.clone()),
                    modified: has_modified_mark(label),
                });
            }
        }

        records
    }

    /// Export the map and store it
    pub fn save_data(&mut self) -> Result<(), MapError> {
        let records = self.export_records();
        let blob = encode_records(&records)?;
        self.storage.save(&blob)?;
        info!("saved {} marker(s) to storage", records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn engine() -> (MapEngine, MemoryStore) {
        let store = MemoryStore::new();
        let storage = Storage::new(store.clone(), "mymap-data");
        let engine = MapEngine::new(storage, Palette::default(), encoding_rs::SHIFT_JIS);
        (engine, store)
    }

    fn record(area: &str, name: &str) -> MarkerRecord {
        MarkerRecord::marker(area, Some(name), LatLng::new(35.0, 136.0))
    }

    #[test]
    fn test_import_assigns_ids_and_colors() {
        let (mut engine, _) = engine();
        let mut moved = record("A", "b");
        moved.modified = true;

        let report = engine.import_records(vec![record("A", "a"), moved]);
        assert_eq!(report, ImportReport { placed: 2, skipped: 0 });

        let group = engine.groups().get("A").unwrap();
        assert_eq!(group.markers()[0].id, 1);
        assert_eq!(group.markers()[0].color, "blue");
        assert_eq!(group.markers()[0].label.as_deref(), Some("a"));
        assert_eq!(group.markers()[1].id, 2);
        assert_eq!(group.markers()[1].color, "green");
        assert_eq!(group.markers()[1].label.as_deref(), Some("b*"));
    }

    #[test]
    fn test_unknown_type_does_not_block_batch() {
        let (mut engine, _) = engine();
        let mut odd = record("A", "x");
        odd.layer_type = LayerType::Other("polyline".to_string());

        let report = engine.import_records(vec![record("A", "a"), odd, record("B", "b")]);
        assert_eq!(report, ImportReport { placed: 2, skipped: 1 });
        assert_eq!(engine.export_records().len(), 2);
    }

    #[test]
    fn test_drag_unknown_marker() {
        let (mut engine, store) = engine();
        let result = engine.apply_drag(42, LatLng::new(0.0, 0.0));
        assert_eq!(result, Err(MapError::UnknownMarker(42)));
        // 失敗したドラッグは保存しない
        assert_eq!(Storage::new(store, "mymap-data").load(), None);
    }

    #[test]
    fn test_drag_persists_snapshot() {
        let (mut engine, store) = engine();
        engine.import_records(vec![record("A", "Name"), record("B", "Other")]);

        let outcome = engine.apply_drag(1, LatLng::new(35.5, 136.5)).unwrap();
        assert_eq!(
            outcome,
            Outcome::Moved {
                marker_id: 1,
                label: "Name*".to_string(),
                saved: true
            }
        );

        let blob = Storage::new(store, "mymap-data").load().unwrap();
        let stored = decode_records(&blob).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].name.as_deref(), Some("Name"));
        assert!(stored[0].modified);
        assert_eq!(stored[0].lat_lng, LatLng::new(35.5, 136.5));
        assert_eq!(stored[0].color.as_deref(), Some("green"));
        assert!(!stored[1].modified);
    }

    #[test]
    fn test_drag_with_failing_storage_still_moves() {
        let (mut engine, store) = engine();
        engine.import_records(vec![record("A", "Name")]);
        store.set_fail_writes(true);

        let outcome = engine.apply_drag(1, LatLng::new(1.0, 2.0)).unwrap();
        assert!(matches!(outcome, Outcome::Moved { saved: false, .. }));
        assert_eq!(
            engine.groups().find_marker(1).unwrap().1.position,
            LatLng::new(1.0, 2.0)
        );
    }

    #[test]
    fn test_handle_set_area_visible() {
        let (mut engine, _) = engine();
        engine.import_records(vec![record("A", "a")]);

        let outcome = engine
            .handle(Command::SetAreaVisible {
                area: "A".to_string(),
                visible: false,
            })
            .unwrap();
        assert_eq!(outcome, Outcome::VisibilityChanged);
        assert!(!engine.groups().get("A").unwrap().is_visible());

        assert!(
            engine
                .handle(Command::SetAreaVisible {
                    area: "Z".to_string(),
                    visible: true,
                })
                .is_err()
        );
    }

    #[test]
    fn test_handle_clear_all() {
        let (mut engine, _) = engine();
        engine.import_records(vec![record("A", "a"), record("B", "b")]);

        let outcome = engine.handle(Command::ClearAll).unwrap();
        assert_eq!(outcome, Outcome::Cleared { removed: 2 });
        assert_eq!(engine.groups().len(), 2);
        assert!(engine.export_records().is_empty());
    }

    #[test]
    fn test_ids_stop_before_overflow() {
        let (mut engine, _) = engine();
        engine.next_id = MarkerId::MAX - 1;

        let report = engine.import_records(vec![record("A", "a"), record("A", "b")]);
        assert_eq!(report, ImportReport { placed: 1, skipped: 1 });
        assert_eq!(
            engine.groups().get("A").unwrap().markers()[0].id,
            MarkerId::MAX - 1
        );
    }

    #[test]
    fn test_unnamed_modified_marker_exports_without_name() {
        let (mut engine, _) = engine();
        let mut unnamed = MarkerRecord::marker("A", None, LatLng::new(35.0, 136.0));
        unnamed.modified = true;
        engine.import_records(vec![unnamed]);

        // ラベルはグリフのみ、書き出しでは名前なしに戻る
        let marker = &engine.groups().get("A").unwrap().markers()[0];
        assert_eq!(marker.label.as_deref(), Some("*"));
        let exported = engine.export_records();
        assert_eq!(exported[0].name, None);
        assert!(exported[0].modified);
    }

    #[test]
    fn test_load_data_with_corrupt_blob() {
        let (_, store) = engine();
        Storage::new(store.clone(), "mymap-data")
            .save("{broken")
            .unwrap();

        let mut engine = MapEngine::new(
            Storage::new(store, "mymap-data"),
            Palette::default(),
            encoding_rs::SHIFT_JIS,
        );
        let report = engine.load_data(&[record("Seed", "s")]);
        // 壊れたデータの場合はシードを使わず空にする
        assert_eq!(report.placed, 0);
        assert!(engine.groups().is_empty());
    }
}
