//! Weak-reference classification.
//!
//! The reference base class is looked up once per snapshot. Anything whose class
//! descends from it counts as a weak reference and is hidden from referrer and
//! referee listings unless the caller asks for weak edges.

use std::collections::HashSet;

use tracing::debug;

use crate::heap::HeapModel;
use crate::model::{Instance, JavaClass, ObjectId};

pub const REFERENCE_CLASS_NAME: &str = "java.lang.ref.Reference";
pub const LEGACY_REFERENCE_CLASS_NAME: &str = "sun.misc.Ref";
pub const REFERENT_FIELD: &str = "referent";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeakReferences {
    class_id: Option<ObjectId>,
    referent_field_index: usize,
}

impl WeakReferences {
    pub fn detect<H: HeapModel>(heap: &H) -> Self {
        let weak = match heap.class_by_name(REFERENCE_CLASS_NAME) {
            Some(class) => Self {
                class_id: Some(class.id),
                referent_field_index: class.field_index(REFERENT_FIELD).unwrap_or(0),
            },
            None => Self {
                class_id: heap.class_by_name(LEGACY_REFERENCE_CLASS_NAME).map(|c| c.id),
                referent_field_index: 0,
            },
        };
        debug!(
            class_id = ?weak.class_id,
            referent_field_index = weak.referent_field_index,
            "resolved weak reference class"
        );
        weak
    }

    pub fn class_id(&self) -> Option<ObjectId> {
        self.class_id
    }

    pub fn referent_field_index(&self) -> usize {
        self.referent_field_index
    }

    pub fn is_weak<H: HeapModel>(&self, heap: &H, instance: &Instance) -> bool {
        let Some(weak_id) = self.class_id else {
            return false;
        };
        heap.class_of(instance)
            .is_some_and(|class| is_assignable(heap, class, weak_id))
    }
}

/// Climbs the superclass chain from `from` looking for `to`. A chain that loops back
/// on itself counts as not assignable.
pub fn is_assignable<H: HeapModel>(heap: &H, from: &JavaClass, to: ObjectId) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(from);
    while let Some(class) = current {
        if class.id == to {
            return true;
        }
        if !seen.insert(class.id) {
            return false;
        }
        current = class.super_class.and_then(|id| heap.class_by_id(id));
    }
    false
}
