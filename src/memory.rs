//! In-memory [`HeapModel`] built from fully materialized snapshot records.
//!
//! Construction indexes classes by name, instances by class, subclasses by superclass
//! and incoming references by target, then computes nearest-GC-root pointers with a
//! breadth-first search from the roots in root order.

use std::collections::{BTreeMap, HashMap, VecDeque};

use tracing::debug;

use crate::heap::{HeapError, HeapModel};
use crate::model::{
    ArrayData, GcRoot, HeapObject, Instance, JavaClass, ObjectId, Reference, Value,
};

const LATIN1: i64 = 0;
const UTF16: i64 = 1;

#[derive(Debug, Default)]
pub struct MemoryHeap {
    classes: BTreeMap<ObjectId, JavaClass>,
    instances: BTreeMap<ObjectId, Instance>,
    roots: Vec<GcRoot>,
    class_names: HashMap<String, ObjectId>,
    class_instances: HashMap<ObjectId, Vec<ObjectId>>,
    subclasses: HashMap<ObjectId, Vec<ObjectId>>,
    incoming: HashMap<ObjectId, Vec<Reference>>,
    roots_by_instance: HashMap<ObjectId, Vec<usize>>,
    nearest_root: HashMap<ObjectId, ObjectId>,
}

impl MemoryHeap {
    pub fn from_parts(
        classes: Vec<JavaClass>,
        instances: Vec<Instance>,
        roots: Vec<GcRoot>,
    ) -> Result<Self, HeapError> {
        let mut heap = MemoryHeap::default();

        for class in classes {
            if heap.classes.contains_key(&class.id) {
                return Err(HeapError::DuplicateClass(class.id));
            }
            heap.classes.insert(class.id, class);
        }

        for instance in instances {
            if heap.instances.contains_key(&instance.id) {
                return Err(HeapError::DuplicateInstance(instance.id));
            }
            if !heap.classes.contains_key(&instance.class_id) {
                return Err(HeapError::UnknownClass {
                    instance: instance.id,
                    class: instance.class_id,
                });
            }
            heap.instances.insert(instance.id, instance);
        }

        heap.roots = roots;
        heap.build_indexes();
        heap.compute_nearest_roots();

        debug!(
            classes = heap.classes.len(),
            instances = heap.instances.len(),
            roots = heap.roots.len(),
            "indexed heap snapshot"
        );
        Ok(heap)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    fn build_indexes(&mut self) {
        // BTreeMap iteration is ascending, so the lowest id wins a name clash.
        for class in self.classes.values() {
            self.class_names.entry(class.name.clone()).or_insert(class.id);
            if let Some(super_id) = class.super_class {
                self.subclasses.entry(super_id).or_default().push(class.id);
            }
            for (index, value) in class.static_values.iter().enumerate() {
                if let Some(target) = value.value.object_id() {
                    self.incoming.entry(target).or_default().push(Reference::Static {
                        defining: class.id,
                        index,
                    });
                }
            }
        }

        for instance in self.instances.values() {
            self.class_instances
                .entry(instance.class_id)
                .or_default()
                .push(instance.id);
            for (index, value) in instance.fields.iter().enumerate() {
                if let Some(target) = value.value.object_id() {
                    self.incoming.entry(target).or_default().push(Reference::Field {
                        defining: instance.id,
                        index,
                    });
                }
            }
            for (index, element) in instance.object_elements().iter().enumerate() {
                if let Some(target) = element {
                    self.incoming
                        .entry(*target)
                        .or_default()
                        .push(Reference::Element {
                            defining: instance.id,
                            index,
                        });
                }
            }
        }

        for (index, root) in self.roots.iter().enumerate() {
            self.roots_by_instance
                .entry(root.instance_id)
                .or_default()
                .push(index);
        }
    }

    fn compute_nearest_roots(&mut self) {
        let mut queue: VecDeque<ObjectId> = VecDeque::new();
        for root in &self.roots {
            queue.push_back(root.instance_id);
        }

        while let Some(current) = queue.pop_front() {
            for target in self.outgoing(current) {
                if self.roots_by_instance.contains_key(&target)
                    || self.nearest_root.contains_key(&target)
                {
                    continue;
                }
                self.nearest_root.insert(target, current);
                queue.push_back(target);
            }
        }
    }

    fn outgoing(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut targets = Vec::new();
        if let Some(instance) = self.instances.get(&id) {
            targets.extend(instance.fields.iter().filter_map(|f| f.value.object_id()));
            targets.extend(instance.object_elements().iter().flatten().copied());
        }
        if let Some(class) = self.classes.get(&id) {
            targets.extend(class.static_values.iter().filter_map(|f| f.value.object_id()));
        }
        targets.retain(|t| self.instances.contains_key(t) || self.classes.contains_key(t));
        targets
    }

    fn string_chars(&self, instance: &Instance) -> Result<String, HeapError> {
        let malformed = |reason: &str| HeapError::MalformedString {
            id: instance.id,
            reason: reason.to_string(),
        };

        let value_id = instance
            .field("value")
            .and_then(Value::object_id)
            .ok_or_else(|| malformed("missing value field"))?;
        let array = self
            .instances
            .get(&value_id)
            .ok_or_else(|| malformed("value array not in snapshot"))?;

        match &array.array {
            Some(ArrayData::Chars(units)) => {
                let offset = instance.field("offset").and_then(Value::as_int);
                let count = instance.field("count").and_then(Value::as_int);
                match (offset, count) {
                    (Some(offset), Some(count)) if offset >= 0 && count >= 0 => {
                        let units = self
                            .decode_chars(array, offset as usize, count as usize)?
                            .unwrap_or_default();
                        Ok(String::from_utf16_lossy(&units))
                    }
                    _ => Ok(String::from_utf16_lossy(units)),
                }
            }
            Some(ArrayData::Bytes(bytes)) => {
                let coder = instance
                    .field("coder")
                    .and_then(Value::as_int)
                    .unwrap_or(LATIN1);
                match coder {
                    LATIN1 => Ok(bytes.iter().map(|b| *b as u8 as char).collect()),
                    UTF16 => {
                        if bytes.len() % 2 != 0 {
                            return Err(malformed("odd byte length for UTF-16 value"));
                        }
                        let units: Vec<u16> = bytes
                            .chunks_exact(2)
                            .map(|pair| u16::from_le_bytes([pair[0] as u8, pair[1] as u8]))
                            .collect();
                        Ok(String::from_utf16_lossy(&units))
                    }
                    other => Err(malformed(&format!("unknown coder {other}"))),
                }
            }
            Some(_) => Err(malformed("value is not a char or byte array")),
            None => Err(malformed("value array contents not in snapshot")),
        }
    }
}

impl HeapModel for MemoryHeap {
    fn class_by_id(&self, id: ObjectId) -> Option<&JavaClass> {
        self.classes.get(&id)
    }

    fn class_by_name(&self, name: &str) -> Option<&JavaClass> {
        self.class_names
            .get(name)
            .and_then(|id| self.classes.get(id))
    }

    fn all_classes(&self) -> impl Iterator<Item = &JavaClass> {
        self.classes.values()
    }

    fn instance_by_id(&self, id: ObjectId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    fn all_instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    fn instances_of(&self, class_id: ObjectId) -> impl Iterator<Item = &Instance> {
        self.class_instances
            .get(&class_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.instances.get(id))
    }

    fn subclasses(&self, class_id: ObjectId) -> impl Iterator<Item = &JavaClass> {
        self.subclasses
            .get(&class_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.classes.get(id))
    }

    fn gc_roots(&self) -> impl Iterator<Item = &GcRoot> {
        self.roots.iter()
    }

    fn gc_roots_of(&self, instance_id: ObjectId) -> impl Iterator<Item = &GcRoot> {
        self.roots_by_instance
            .get(&instance_id)
            .into_iter()
            .flatten()
            .map(|index| &self.roots[*index])
    }

    fn nearest_gc_root_pointer(&self, id: ObjectId) -> Option<HeapObject<'_>> {
        self.nearest_root
            .get(&id)
            .and_then(|parent| self.object_by_id(*parent))
    }

    fn references_to(&self, instance_id: ObjectId) -> impl Iterator<Item = Reference> {
        self.incoming
            .get(&instance_id)
            .into_iter()
            .flatten()
            .copied()
    }

    fn decode_string(&self, instance: &Instance) -> Result<String, HeapError> {
        self.string_chars(instance)
    }

    fn decode_chars(
        &self,
        instance: &Instance,
        offset: usize,
        len: usize,
    ) -> Result<Option<Vec<u16>>, HeapError> {
        let units = match &instance.array {
            Some(ArrayData::Chars(units)) => units,
            Some(_) => return Err(HeapError::NotCharArray(instance.id)),
            None => {
                let is_char_array = self
                    .class_of(instance)
                    .is_some_and(|c| c.name == "char[]");
                if is_char_array {
                    return Ok(None);
                }
                return Err(HeapError::NotCharArray(instance.id));
            }
        };

        let length = units.len();
        let end = offset.saturating_add(len);
        if end > length {
            return Err(HeapError::CharRangeOutOfBounds {
                id: instance.id,
                offset,
                end,
                length,
            });
        }
        Ok(Some(units[offset..end].to_vec()))
    }
}
