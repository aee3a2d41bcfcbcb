use std::collections::HashSet;

use crate::heap::HeapModel;
use crate::model::{Instance, ObjectId};

pub const FINALIZER_CLASS_NAME: &str = "java.lang.ref.Finalizer";

/// Objects waiting in the runtime finalizer queue, read lazily node by node.
///
/// The queue is `Finalizer.queue.head`, linked through `next`. The last node points
/// `next` at itself; any node seen twice also ends the walk.
pub struct FinalizerQueue<'a, H: HeapModel> {
    heap: &'a H,
    node: Option<&'a Instance>,
    seen: HashSet<ObjectId>,
}

impl<'a, H: HeapModel> FinalizerQueue<'a, H> {
    pub fn new(heap: &'a H) -> Self {
        let head = heap
            .class_by_name(FINALIZER_CLASS_NAME)
            .and_then(|class| heap.static_field_value(class, "queue"))
            .and_then(|queue| heap.field_value(queue, "head"));
        Self {
            heap,
            node: head,
            seen: HashSet::new(),
        }
    }
}

impl<'a, H: HeapModel> Iterator for FinalizerQueue<'a, H> {
    type Item = &'a Instance;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.node.take()?;
            if !self.seen.insert(node.id) {
                return None;
            }
            let referent = self.heap.field_value(node, "referent");
            self.node = self
                .heap
                .field_value(node, "next")
                .filter(|next| next.id != node.id);
            if referent.is_some() {
                return referent;
            }
        }
    }
}
