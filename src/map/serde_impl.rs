//! Serialization and deserialization implementations for marker records
//!
//! Stored blobs written by older front ends are not uniform: coordinates may
//! be numbers or numeric strings, and a position may be a `[lat, lng]` pair or
//! a `{ "lat": .., "lng": .. }` object. These impls accept all of them and
//! always write the pair form.

use super::marker::{LatLng, LayerType, MarkerRecord};
use crate::error::MapError;
use log::warn;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

impl Serialize for LatLng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.lat)?;
        tuple.serialize_element(&self.lng)?;
        tuple.end()
    }
}

/// A single coordinate given either as a number or as a numeric string
struct Coordinate(f64);

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CoordinateVisitor;

        impl Visitor<'_> for CoordinateVisitor {
            type Value = Coordinate;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number or a numeric string")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Coordinate, E> {
                Ok(Coordinate(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Coordinate, E> {
                Ok(Coordinate(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Coordinate, E> {
                Ok(Coordinate(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Coordinate, E> {
                v.trim()
                    .parse::<f64>()
                    .map(Coordinate)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(CoordinateVisitor)
    }
}

impl<'de> Deserialize<'de> for LatLng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LatLngVisitor;

        impl<'de> Visitor<'de> for LatLngVisitor {
            type Value = LatLng;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a [lat, lng] pair or a {lat, lng} object")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<LatLng, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let lat: Coordinate = seq
                    .next_element()?
                    .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
                let lng: Coordinate = seq
                    .next_element()?
                    .ok_or_else(|| <A::Error as de::Error>::invalid_length(1, &self))?;
                // Leaflet tolerates a trailing altitude; drop it
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                Ok(LatLng::new(lat.0, lng.0))
            }

            fn visit_map<A>(self, mut map: A) -> Result<LatLng, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut lat = None;
                let mut lng = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "lat" => lat = Some(map.next_value::<Coordinate>()?.0),
                        "lng" | "lon" => lng = Some(map.next_value::<Coordinate>()?.0),
                        _ => {
                            map.next_value::<de::IgnoredAny>()?;
                        }
                    }
                }
                let lat = lat.ok_or_else(|| <A::Error as de::Error>::missing_field("lat"))?;
                let lng = lng.ok_or_else(|| <A::Error as de::Error>::missing_field("lng"))?;
                Ok(LatLng::new(lat, lng))
            }
        }

        deserializer.deserialize_any(LatLngVisitor)
    }
}

impl Serialize for LayerType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LayerType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        let Ok(layer_type) = tag.parse::<LayerType>();
        Ok(layer_type)
    }
}

/// Decode a stored blob into marker records
///
/// The blob must be a JSON array; anything else is a `StorageRead` error.
/// Entries that cannot be decoded as a record (missing area, non-numeric
/// coordinates, ...) are skipped with a warning so one bad entry never hides
/// the rest of the data.
pub fn decode_records(blob: &str) -> Result<Vec<MarkerRecord>, MapError> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(blob).map_err(|e| MapError::StorageRead(e.to_string()))?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<MarkerRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => warn!("skipping stored entry {}: {}", index, e),
        }
    }
    Ok(records)
}

/// Encode marker records into the stored blob format
pub fn encode_records(records: &[MarkerRecord]) -> Result<String, MapError> {
    serde_json::to_string(records).map_err(|e| MapError::StorageWrite(e.to_string()))
}
