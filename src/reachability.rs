use std::collections::HashSet;

use crate::heap::HeapModel;
use crate::model::{GcRoot, Instance, JavaClass, ObjectId};

/// Follows nearest-root pointers from `instance` until a root object is reached.
/// Always takes at least one hop, so `instance` itself is never checked.
/// Returns the root object id and the number of hops taken.
fn walk_to_root<H: HeapModel>(heap: &H, instance: &Instance) -> Option<(ObjectId, usize)> {
    let mut seen = HashSet::new();
    let mut current = instance.id;
    let mut hops = 0usize;
    loop {
        current = heap.nearest_gc_root_pointer(current)?.id();
        hops += 1;
        if heap.is_gc_root(current) {
            return Some((current, hops));
        }
        if !seen.insert(current) {
            return None;
        }
    }
}

pub fn find_nearest_root<'a, H: HeapModel>(
    heap: &'a H,
    instance: &Instance,
) -> Option<&'a GcRoot> {
    let (root, _) = walk_to_root(heap, instance)?;
    heap.gc_roots_of(root).next()
}

/// Hop count to the nearest root, or 0 when the chain breaks first.
pub fn distance_to_root<H: HeapModel>(heap: &H, instance: &Instance) -> usize {
    walk_to_root(heap, instance).map_or(0, |(_, hops)| hops)
}

/// Instances of a class and, optionally, of all its subclasses.
///
/// Classes are walked depth-first off an explicit stack: a class's own instances are
/// yielded before its direct subclasses are pushed. Each class is visited once.
pub struct ClassInstances<'a, H: HeapModel> {
    heap: &'a H,
    include_subclasses: bool,
    pending: Vec<&'a JavaClass>,
    visited: HashSet<ObjectId>,
    current: Option<Box<dyn Iterator<Item = &'a Instance> + 'a>>,
}

impl<'a, H: HeapModel> ClassInstances<'a, H> {
    pub fn new(heap: &'a H, class: &'a JavaClass, include_subclasses: bool) -> Self {
        // Everything descends from the root class, so skip the hierarchy walk.
        if include_subclasses && class.super_class.is_none() {
            return Self {
                heap,
                include_subclasses,
                pending: Vec::new(),
                visited: HashSet::new(),
                current: Some(Box::new(heap.all_instances())),
            };
        }
        Self {
            heap,
            include_subclasses,
            pending: vec![class],
            visited: HashSet::new(),
            current: None,
        }
    }
}

impl<'a, H: HeapModel> Iterator for ClassInstances<'a, H> {
    type Item = &'a Instance;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = self.current.as_mut()
                && let Some(instance) = current.next()
            {
                return Some(instance);
            }

            let class = self.pending.pop()?;
            if !self.visited.insert(class.id) {
                continue;
            }
            if self.include_subclasses {
                self.pending.extend(self.heap.subclasses(class.id));
            }
            self.current = Some(Box::new(self.heap.instances_of(class.id)));
        }
    }
}
