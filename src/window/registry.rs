//! Authoritative table of app windows.
//!
//! Records keep insertion order (the order windows appear in the dock and in
//! the persisted map) and are indexed by id. A lookup miss always means "no
//! such window"; callers treat it as a no-op.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{GeometryPatch, WindowId, WindowRecord, ZIndex};

#[derive(Debug, Clone, Default)]
pub struct WindowRegistry {
    records: Vec<WindowRecord>,
    index: HashMap<WindowId, usize>,
}

impl PartialEq for WindowRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = WindowRecord>) -> Self {
        let mut registry = Self::new();
        for record in records {
            registry.upsert(record);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &WindowId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &WindowId) -> Option<&WindowRecord> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    fn get_mut(&mut self, id: &WindowId) -> Option<&mut WindowRecord> {
        self.index.get(id).map(|&idx| &mut self.records[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowRecord> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &WindowId> {
        self.records.iter().map(|record| &record.id)
    }

    /// Insert a new record at the end, or replace an existing one in place.
    pub fn upsert(&mut self, record: WindowRecord) {
        if let Some(&idx) = self.index.get(&record.id) {
            self.records[idx] = record;
        } else {
            self.index.insert(record.id.clone(), self.records.len());
            self.records.push(record);
        }
    }

    pub fn max_z(&self) -> ZIndex {
        self.records.iter().map(|r| r.z_index).max().unwrap_or(0)
    }

    pub fn launch(&mut self, id: &WindowId, z_index: ZIndex) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        record.launched = true;
        record.visible = true;
        record.z_index = z_index;
        true
    }

    pub fn minimize(&mut self, id: &WindowId) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        record.visible = false;
        true
    }

    pub fn quit(&mut self, id: &WindowId) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        record.launched = false;
        record.visible = false;
        true
    }

    pub fn set_z(&mut self, id: &WindowId, z_index: ZIndex) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        record.z_index = z_index;
        true
    }

    /// Hide a window whose content is now rendered by a folder. The window
    /// stays launched.
    pub fn hide_in_folder(&mut self, id: &WindowId) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        record.launched = true;
        record.visible = false;
        true
    }

    /// Partial merge. Sizes are clamped to the minimum window footprint.
    pub fn update_geometry(&mut self, id: &WindowId, patch: GeometryPatch) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        if let Some(position) = patch.position {
            record.position = position;
        }
        if let Some(size) = patch.size {
            record.size = size.clamp_min();
        }
        true
    }
}

impl Serialize for WindowRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(record.id.as_str(), record)?;
        }
        map.end()
    }
}

struct RegistryVisitor;

impl<'de> Visitor<'de> for RegistryVisitor {
    type Value = WindowRegistry;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of window id to window record")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut registry = WindowRegistry::new();
        while let Some((key, mut record)) = access.next_entry::<String, WindowRecord>()? {
            // the map key is the index; a disagreeing embedded id loses
            record.id = WindowId::new(key);
            registry.upsert(record);
        }
        Ok(registry)
    }
}

impl<'de> Deserialize<'de> for WindowRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RegistryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Point, Size};

    fn record(id: &str) -> WindowRecord {
        WindowRecord::new(id, id.to_uppercase(), Point::new(10.0, 20.0), Size::new(400.0, 300.0))
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut reg = WindowRegistry::from_records([record("a")]);
        let ghost = WindowId::new("ghost");
        assert!(!reg.launch(&ghost, 9));
        assert!(!reg.minimize(&ghost));
        assert!(!reg.quit(&ghost));
        assert!(!reg.update_geometry(&ghost, GeometryPatch::default()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn lifecycle_flags() {
        let mut reg = WindowRegistry::from_records([record("a")]);
        let id = WindowId::new("a");
        reg.launch(&id, 3);
        let a = reg.get(&id).unwrap();
        assert!(a.launched && a.visible);
        assert_eq!(a.z_index, 3);
        reg.minimize(&id);
        let a = reg.get(&id).unwrap();
        assert!(a.launched && !a.visible);
        reg.quit(&id);
        let a = reg.get(&id).unwrap();
        assert!(!a.launched && !a.visible);
    }

    #[test]
    fn geometry_patch_is_partial_and_clamped() {
        let mut reg = WindowRegistry::from_records([record("a")]);
        let id = WindowId::new("a");
        reg.update_geometry(&id, GeometryPatch::position(Point::new(5.0, 6.0)));
        assert_eq!(reg.get(&id).unwrap().size, Size::new(400.0, 300.0));
        reg.update_geometry(&id, GeometryPatch::size(Size::new(10.0, 10.0)));
        let a = reg.get(&id).unwrap();
        assert_eq!(a.position, Point::new(5.0, 6.0));
        assert_eq!(a.size, Size::new(200.0, 150.0));
    }

    #[test]
    fn serializes_as_ordered_map() {
        let reg = WindowRegistry::from_records([record("zeta"), record("alpha")]);
        let json = serde_json::to_string(&reg).unwrap();
        assert!(json.find("\"zeta\"").unwrap() < json.find("\"alpha\"").unwrap());
        let back: WindowRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reg);
        let order: Vec<_> = back.ids().map(|id| id.as_str().to_string()).collect();
        assert_eq!(order, vec!["zeta", "alpha"]);
    }

    #[test]
    fn map_key_wins_over_embedded_id() {
        let mut rec = record("inner");
        rec.id = WindowId::new("inner");
        let json = format!("{{\"outer\": {}}}", serde_json::to_string(&rec).unwrap());
        let reg: WindowRegistry = serde_json::from_str(&json).unwrap();
        assert!(reg.contains(&WindowId::new("outer")));
        assert!(!reg.contains(&WindowId::new("inner")));
    }
}
