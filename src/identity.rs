use crate::heap::HeapModel;
use crate::model::{HeapObject, Instance};

pub const CLASS_CLASS_NAME: &str = "java.lang.Class";

/// Reports a `java.lang.Class` instance as the class it mirrors, when that class is
/// in the snapshot. Every other instance comes back unchanged.
pub fn normalize<'a, H: HeapModel>(heap: &'a H, instance: &'a Instance) -> HeapObject<'a> {
    let is_mirror = heap
        .class_of(instance)
        .is_some_and(|c| c.name == CLASS_CLASS_NAME);
    if is_mirror && let Some(class) = heap.class_by_id(instance.id) {
        return HeapObject::Class(class);
    }
    HeapObject::Instance(instance)
}
