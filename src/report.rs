//! Serializable views of navigator answers, for JSON and text output.

use serde::Serialize;
use std::fmt;

use crate::heap::HeapModel;
use crate::model::{GcRoot, HeapObject, Instance, format_id};
use crate::navigator::HeapNavigator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Class,
    Instance,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectView {
    pub kind: ObjectKind,
    pub id: String,
    pub class_name: String,
}

impl ObjectView {
    pub fn of<H: HeapModel>(navigator: &HeapNavigator<H>, object: HeapObject<'_>) -> Self {
        match object {
            HeapObject::Class(class) => Self {
                kind: ObjectKind::Class,
                id: format_id(class.id),
                class_name: class.name.clone(),
            },
            HeapObject::Instance(instance) => Self::instance(navigator, instance),
        }
    }

    pub fn instance<H: HeapModel>(navigator: &HeapNavigator<H>, instance: &Instance) -> Self {
        let class_name = navigator
            .heap()
            .class_of(instance)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        Self {
            kind: ObjectKind::Instance,
            id: format_id(instance.id),
            class_name,
        }
    }
}

impl fmt::Display for ObjectView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ObjectKind::Class => write!(f, "class {} ({})", self.class_name, self.id),
            ObjectKind::Instance => write!(f, "{}#{}", self.class_name, self.id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RootView {
    pub kind: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl RootView {
    pub fn of<H: HeapModel>(navigator: &HeapNavigator<H>, root: &GcRoot) -> Self {
        let class_name = navigator
            .find_instance(root.instance_id)
            .and_then(|i| navigator.heap().class_of(i))
            .map(|c| c.name.clone());
        Self {
            kind: root.kind.as_str(),
            id: format_id(root.instance_id),
            class_name,
        }
    }
}

impl fmt::Display for RootView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class_name {
            Some(name) => write!(f, "{} {}#{}", self.kind, name, self.id),
            None => write!(f, "{} {}", self.kind, self.id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RootPath {
    pub instance: ObjectView,
    pub is_root: bool,
    pub distance: usize,
    pub nearest_root: Option<RootView>,
}

impl RootPath {
    pub fn of<H: HeapModel>(navigator: &HeapNavigator<H>, instance: &Instance) -> Self {
        Self {
            instance: ObjectView::instance(navigator, instance),
            is_root: navigator.heap().is_gc_root(instance.id),
            distance: navigator.distance_to_root(instance),
            nearest_root: navigator
                .find_nearest_root(instance)
                .map(|r| RootView::of(navigator, r)),
        }
    }
}

impl fmt::Display for RootPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "instance: {}", self.instance)?;
        writeln!(f, "is_root: {}", self.is_root)?;
        writeln!(f, "distance: {}", self.distance)?;
        match &self.nearest_root {
            Some(root) => write!(f, "nearest_root: {root}"),
            None => write!(f, "nearest_root: none"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedValue {
    pub id: String,
    pub value: Option<String>,
}

impl fmt::Display for RenderedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.as_deref().unwrap_or("null"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub path: String,
    pub digest: String,
    pub classes: usize,
    pub instances: usize,
    pub roots: usize,
    pub weak_reference_class: Option<String>,
    pub referent_field_index: usize,
    pub reachable_excludes: Option<usize>,
}

impl fmt::Display for SnapshotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "path: {}", self.path)?;
        writeln!(f, "digest: {}", self.digest)?;
        writeln!(f, "classes: {}", self.classes)?;
        writeln!(f, "instances: {}", self.instances)?;
        writeln!(f, "roots: {}", self.roots)?;
        writeln!(
            f,
            "weak_reference_class: {}",
            self.weak_reference_class.as_deref().unwrap_or("none")
        )?;
        writeln!(f, "referent_field_index: {}", self.referent_field_index)?;
        match self.reachable_excludes {
            Some(count) => write!(f, "reachable_excludes: {count}"),
            None => write!(f, "reachable_excludes: none"),
        }
    }
}

/// A list printed one item per line in text mode.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Listing<T>(pub Vec<T>);

impl<T: fmt::Display> fmt::Display for Listing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, item) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHeap;
    use crate::model::{JavaClass, RootKind, Value};

    fn navigator() -> HeapNavigator<MemoryHeap> {
        HeapNavigator::new(
            MemoryHeap::from_parts(
                vec![JavaClass::new(1, "java.lang.Object")],
                vec![
                    Instance::new(16, 1).with_field("next", Value::reference(17)),
                    Instance::new(17, 1),
                ],
                vec![GcRoot::new(16, RootKind::JavaFrame)],
            )
            .unwrap(),
        )
    }

    #[test]
    fn views_render_hex_ids() {
        let nav = navigator();
        let view = ObjectView::instance(&nav, nav.find_instance(16).unwrap());
        assert_eq!(view.to_string(), "java.lang.Object#0x10");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"], "instance");
        assert_eq!(json["id"], "0x10");
    }

    #[test]
    fn root_path_describes_chain() {
        let nav = navigator();
        let path = RootPath::of(&nav, nav.find_instance(17).unwrap());
        assert!(!path.is_root);
        assert_eq!(path.distance, 1);
        assert_eq!(
            path.nearest_root.as_ref().map(|r| r.kind),
            Some("java-frame")
        );
    }

    #[test]
    fn summary_text_matches_json_fields() {
        let summary = SnapshotSummary {
            path: "heap.json".to_string(),
            digest: "00".repeat(32),
            classes: 1,
            instances: 2,
            roots: 1,
            weak_reference_class: None,
            referent_field_index: 0,
            reachable_excludes: Some(3),
        };
        let text = summary.to_string();
        assert!(text.ends_with("reachable_excludes: 3"));
        assert!(text.contains("weak_reference_class: none"));

        let without = SnapshotSummary {
            reachable_excludes: None,
            ..summary
        };
        assert!(without.to_string().ends_with("reachable_excludes: none"));
    }

    #[test]
    fn listing_prints_one_item_per_line() {
        let listing = Listing(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(listing.to_string(), "a\nb");
        assert_eq!(serde_json::to_string(&listing).unwrap(), r#"["a","b"]"#);
    }
}
