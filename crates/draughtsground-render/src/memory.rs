//! In-memory surface for tests and headless hosts.

use crate::surface::{ElementKind, ElementSpec, Surface, SurfaceError, SurfaceId, SurfaceResult};
use draughtsground_core::Key;
use kurbo::{Point, Size};
use std::collections::BTreeMap;

/// Surface that records elements in a map.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    next_id: SurfaceId,
    elements: BTreeMap<SurfaceId, ElementSpec>,
    /// Creation of elements with this class fails.
    pub fail_class: Option<String>,
    pub created: usize,
    pub relocated: usize,
    pub removed: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: SurfaceId) -> Option<&ElementSpec> {
        self.elements.get(&id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementSpec> {
        self.elements.values()
    }

    /// Elements of one kind standing on `key`.
    pub fn at(&self, kind: ElementKind, key: Key) -> Vec<&ElementSpec> {
        self.elements
            .values()
            .filter(|e| e.kind == kind && e.key == Some(key))
            .collect()
    }

    pub fn count(&self, kind: ElementKind) -> usize {
        self.elements.values().filter(|e| e.kind == kind).count()
    }
}

impl Surface for MemorySurface {
    fn create(&mut self, spec: &ElementSpec) -> SurfaceResult<SurfaceId> {
        if self.fail_class.as_deref() == Some(spec.class.as_str()) {
            return Err(SurfaceError::CreateFailed(spec.class.clone()));
        }
        self.next_id += 1;
        self.elements.insert(self.next_id, spec.clone());
        self.created += 1;
        Ok(self.next_id)
    }

    fn relocate(&mut self, id: SurfaceId, key: Option<Key>, origin: Point, size: Size) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.key = key;
            element.origin = origin;
            element.size = size;
            self.relocated += 1;
        }
    }

    fn remove(&mut self, id: SurfaceId) {
        if self.elements.remove(&id).is_some() {
            self.removed += 1;
        }
    }
}
