//! The read-only surface the navigator consumes from an indexed heap snapshot.

use regex::Regex;
use thiserror::Error;

use crate::model::{GcRoot, HeapObject, Instance, JavaClass, ObjectId, Reference};

#[derive(Debug, Error)]
pub enum HeapError {
    #[error("duplicate class id {0:#x}")]
    DuplicateClass(ObjectId),

    #[error("duplicate instance id {0:#x}")]
    DuplicateInstance(ObjectId),

    #[error("instance {instance:#x} refers to unknown class {class:#x}")]
    UnknownClass { instance: ObjectId, class: ObjectId },

    #[error("instance {0:#x} is not a char array")]
    NotCharArray(ObjectId),

    #[error("char range {offset}..{end} out of bounds for array {id:#x} of length {length}")]
    CharRangeOutOfBounds {
        id: ObjectId,
        offset: usize,
        end: usize,
        length: usize,
    },

    #[error("malformed string {id:#x}: {reason}")]
    MalformedString { id: ObjectId, reason: String },
}

pub trait HeapModel {
    fn class_by_id(&self, id: ObjectId) -> Option<&JavaClass>;

    fn class_by_name(&self, name: &str) -> Option<&JavaClass>;

    fn all_classes(&self) -> impl Iterator<Item = &JavaClass>;

    fn classes_by_regex(&self, pattern: &Regex) -> Vec<&JavaClass> {
        self.all_classes()
            .filter(|c| pattern.is_match(&c.name))
            .collect()
    }

    fn instance_by_id(&self, id: ObjectId) -> Option<&Instance>;

    /// The instance with this id, else the class. A class the dump carries no
    /// `java.lang.Class` instance for stands in for its own mirror.
    fn object_by_id(&self, id: ObjectId) -> Option<HeapObject<'_>> {
        match self.instance_by_id(id) {
            Some(instance) => Some(HeapObject::Instance(instance)),
            None => self.class_by_id(id).map(HeapObject::Class),
        }
    }

    fn all_instances(&self) -> impl Iterator<Item = &Instance>;

    /// Instances whose runtime class is exactly `class_id`.
    fn instances_of(&self, class_id: ObjectId) -> impl Iterator<Item = &Instance>;

    /// Direct subclasses only.
    fn subclasses(&self, class_id: ObjectId) -> impl Iterator<Item = &JavaClass>;

    fn gc_roots(&self) -> impl Iterator<Item = &GcRoot>;

    fn gc_roots_of(&self, instance_id: ObjectId) -> impl Iterator<Item = &GcRoot>;

    fn is_gc_root(&self, id: ObjectId) -> bool {
        self.gc_roots_of(id).next().is_some()
    }

    /// Next hop on the shortest path towards a GC root. Roots have none.
    fn nearest_gc_root_pointer(&self, id: ObjectId) -> Option<HeapObject<'_>>;

    /// Slots in other objects that point at `instance_id`.
    fn references_to(&self, instance_id: ObjectId) -> impl Iterator<Item = Reference>;

    fn class_of(&self, instance: &Instance) -> Option<&JavaClass> {
        self.class_by_id(instance.class_id)
    }

    fn class_loader(&self, class: &JavaClass) -> Option<&Instance> {
        class.class_loader.and_then(|id| self.instance_by_id(id))
    }

    fn field_value(&self, instance: &Instance, name: &str) -> Option<&Instance> {
        instance
            .field(name)
            .and_then(|v| v.object_id())
            .and_then(|id| self.instance_by_id(id))
    }

    fn static_field_value(&self, class: &JavaClass, name: &str) -> Option<&Instance> {
        class
            .static_value(name)
            .and_then(|v| v.object_id())
            .and_then(|id| self.instance_by_id(id))
    }

    /// Decodes the characters of a `java.lang.String` instance.
    fn decode_string(&self, instance: &Instance) -> Result<String, HeapError>;

    /// Extracts `len` UTF-16 code units starting at `offset` from a `char[]` instance.
    /// `Ok(None)` means the array exists but its contents were not dumped.
    fn decode_chars(
        &self,
        instance: &Instance,
        offset: usize,
        len: usize,
    ) -> Result<Option<Vec<u16>>, HeapError>;
}
