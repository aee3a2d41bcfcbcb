//! Referrers (who points at an object) and referees (what an object points at).

use crate::heap::HeapModel;
use crate::identity;
use crate::model::{HeapObject, ObjectId};
use crate::weak::WeakReferences;

/// Objects holding a reference to `target`.
///
/// For an instance these are the owners of its incoming slots; for a class, its
/// instances followed by its class loader. Instances are reported raw, without
/// class-mirror normalization. A static slot of a class with no mirror instance is
/// owned by the class itself.
pub fn referrers<'a, H: HeapModel>(
    heap: &'a H,
    weak: WeakReferences,
    target: HeapObject<'a>,
    include_weak: bool,
) -> impl Iterator<Item = HeapObject<'a>> + 'a {
    let candidates: Vec<HeapObject<'a>> = match target {
        HeapObject::Instance(instance) => heap
            .references_to(instance.id)
            .filter_map(|r| heap.object_by_id(r.defining_instance()))
            .collect(),
        HeapObject::Class(class) => heap
            .instances_of(class.id)
            .chain(heap.class_loader(class))
            .map(HeapObject::Instance)
            .collect(),
    };

    candidates.into_iter().filter(move |object| {
        include_weak || !object.as_instance().is_some_and(|i| weak.is_weak(heap, i))
    })
}

/// Objects referenced from `source`: instance fields and object-array elements for an
/// instance, static fields for a class. Null slots are skipped and class mirrors are
/// reported as their classes.
pub fn referees<'a, H: HeapModel>(
    heap: &'a H,
    weak: WeakReferences,
    source: HeapObject<'a>,
    include_weak: bool,
) -> impl Iterator<Item = HeapObject<'a>> + 'a {
    let targets: Vec<ObjectId> = match source {
        HeapObject::Instance(instance) => instance
            .fields
            .iter()
            .filter_map(|f| f.value.object_id())
            .chain(instance.object_elements().iter().flatten().copied())
            .collect(),
        HeapObject::Class(class) => class
            .static_values
            .iter()
            .filter_map(|f| f.value.object_id())
            .collect(),
    };

    targets
        .into_iter()
        .filter_map(move |id| match heap.instance_by_id(id) {
            Some(instance) if !include_weak && weak.is_weak(heap, instance) => None,
            Some(instance) => Some(identity::normalize(heap, instance)),
            // A class object the dump carries no mirror instance for.
            None => heap.class_by_id(id).map(HeapObject::Class),
        })
}
