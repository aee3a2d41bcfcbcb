//! Query-facing entry point over one opened heap snapshot.

use std::collections::HashSet;

use regex::Regex;

use crate::descriptor::ClassKey;
use crate::excludes::ReachableExcludes;
use crate::finalizer::FinalizerQueue;
use crate::heap::HeapModel;
use crate::identity;
use crate::model::{GcRoot, HeapObject, Instance, JavaClass, ObjectId};
use crate::reachability::{self, ClassInstances};
use crate::references;
use crate::render;
use crate::weak::WeakReferences;

/// Answers graph questions about a heap snapshot without re-indexing it.
///
/// Owns the heap model for as long as the snapshot is open. Weak-reference metadata
/// is resolved once in [`HeapNavigator::new`]; the reachable-excludes policy is the
/// only thing that can change afterwards.
#[derive(Debug)]
pub struct HeapNavigator<H: HeapModel> {
    heap: H,
    weak: WeakReferences,
    reachable_excludes: Option<Box<dyn ReachableExcludes>>,
}

impl<H: HeapModel> HeapNavigator<H> {
    pub fn new(heap: H) -> Self {
        let weak = WeakReferences::detect(&heap);
        Self {
            heap,
            weak,
            reachable_excludes: None,
        }
    }

    pub fn heap(&self) -> &H {
        &self.heap
    }

    /// Looks a class up by `0x`-hex or decimal id, or by (possibly JVM-encoded) name.
    pub fn resolve_class(&self, descriptor: &str) -> Option<&JavaClass> {
        match ClassKey::parse(descriptor) {
            ClassKey::Id(id) => self.heap.class_by_id(id),
            ClassKey::Name(name) => self.heap.class_by_name(&name),
        }
    }

    pub fn find_instance(&self, id: ObjectId) -> Option<&Instance> {
        self.heap.instance_by_id(id)
    }

    /// Instance or class with the given id, class mirrors normalized.
    pub fn find_object(&self, id: ObjectId) -> Option<HeapObject<'_>> {
        match self.heap.instance_by_id(id) {
            Some(instance) => Some(identity::normalize(&self.heap, instance)),
            None => self.heap.class_by_id(id).map(HeapObject::Class),
        }
    }

    pub fn find_nearest_root<'a>(&'a self, instance: &'a Instance) -> Option<&'a GcRoot> {
        reachability::find_nearest_root(&self.heap, instance)
    }

    pub fn distance_to_root(&self, instance: &Instance) -> usize {
        reachability::distance_to_root(&self.heap, instance)
    }

    pub fn classes(&self) -> impl Iterator<Item = &JavaClass> {
        self.heap.all_classes()
    }

    pub fn class_names<'a>(
        &'a self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = &'a str> + use<'a, H>, regex::Error> {
        let pattern = Regex::new(pattern)?;
        Ok(self
            .heap
            .classes_by_regex(&pattern)
            .into_iter()
            .map(|c| c.name.as_str()))
    }

    pub fn instances_of<'a>(
        &'a self,
        class: &'a JavaClass,
        include_subclasses: bool,
    ) -> ClassInstances<'a, H> {
        ClassInstances::new(&self.heap, class, include_subclasses)
    }

    pub fn referrers<'a>(
        &'a self,
        target: HeapObject<'a>,
        include_weak: bool,
    ) -> impl Iterator<Item = HeapObject<'a>> + 'a {
        references::referrers(&self.heap, self.weak, target, include_weak)
    }

    pub fn referees<'a>(
        &'a self,
        source: HeapObject<'a>,
        include_weak: bool,
    ) -> impl Iterator<Item = HeapObject<'a>> + 'a {
        references::referees(&self.heap, self.weak, source, include_weak)
    }

    pub fn finalizer_objects(&self) -> FinalizerQueue<'_, H> {
        FinalizerQueue::new(&self.heap)
    }

    pub fn roots(&self) -> impl Iterator<Item = &GcRoot> {
        self.heap.gc_roots()
    }

    pub fn roots_array(&self) -> Vec<&GcRoot> {
        self.heap.gc_roots().collect()
    }

    /// Distinct objects held by GC roots, in root order, class mirrors normalized.
    pub fn root_objects(&self) -> Vec<HeapObject<'_>> {
        let mut seen = HashSet::new();
        self.heap
            .gc_roots()
            .filter_map(|root| self.find_object(root.instance_id))
            .filter(|object| seen.insert(object.id()))
            .collect()
    }

    pub fn set_reachable_excludes(&mut self, excludes: Box<dyn ReachableExcludes>) {
        self.reachable_excludes = Some(excludes);
    }

    pub fn reachable_excludes(&self) -> Option<&dyn ReachableExcludes> {
        self.reachable_excludes.as_deref()
    }

    pub fn weak_reference_class(&self) -> Option<&JavaClass> {
        self.weak.class_id().and_then(|id| self.heap.class_by_id(id))
    }

    pub fn referent_field_index(&self) -> usize {
        self.weak.referent_field_index()
    }

    pub fn is_weak(&self, instance: &Instance) -> bool {
        self.weak.is_weak(&self.heap, instance)
    }

    pub fn render(&self, instance: Option<&Instance>) -> Option<String> {
        render::render(&self.heap, instance)
    }
}
