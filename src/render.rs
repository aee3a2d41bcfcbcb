use tracing::warn;

use crate::heap::{HeapError, HeapModel};
use crate::model::{Instance, format_id};

pub const STRING_CLASS_NAME: &str = "java.lang.String";
pub const CHAR_ARRAY_CLASS_NAME: &str = "char[]";
const NULL_CHARS: &str = "*null*";

/// Display string for an instance: decoded text for strings and char arrays,
/// `<class>#<id>` for everything else or when decoding fails.
pub fn render<H: HeapModel>(heap: &H, instance: Option<&Instance>) -> Option<String> {
    let instance = instance?;
    match decode(heap, instance) {
        Ok(Some(text)) => return Some(text),
        Ok(None) => {}
        Err(err) => warn!(
            instance = instance.id,
            error = %err,
            "error getting string value of an instance dump"
        ),
    }
    Some(describe(heap, instance))
}

fn describe<H: HeapModel>(heap: &H, instance: &Instance) -> String {
    let class_name = heap
        .class_of(instance)
        .map_or("<unknown>", |c| c.name.as_str());
    format!("{class_name}#{}", format_id(instance.id))
}

fn decode<H: HeapModel>(heap: &H, instance: &Instance) -> Result<Option<String>, HeapError> {
    let Some(class) = heap.class_of(instance) else {
        return Ok(None);
    };
    match class.name.as_str() {
        STRING_CLASS_NAME => heap.decode_string(instance).map(Some),
        CHAR_ARRAY_CLASS_NAME => {
            let units = heap.decode_chars(instance, 0, instance.array_length())?;
            Ok(Some(match units {
                Some(units) => String::from_utf16_lossy(&units),
                None => NULL_CHARS.to_string(),
            }))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHeap;
    use crate::model::{ArrayData, JavaClass, Value};

    fn heap() -> MemoryHeap {
        MemoryHeap::from_parts(
            vec![
                JavaClass::new(1, "java.lang.Object"),
                JavaClass::new(2, STRING_CLASS_NAME).extends(1),
                JavaClass::new(3, CHAR_ARRAY_CLASS_NAME).extends(1),
                JavaClass::new(4, "int[]").extends(1),
            ],
            vec![
                Instance::new(10, 3).with_array(ArrayData::chars("hello")),
                Instance::new(11, 2).with_field("value", Value::reference(10)),
                Instance::new(12, 3),
                Instance::new(13, 2).with_field("value", Value::reference(14)),
                Instance::new(14, 4).with_array(ArrayData::Ints(vec![1, 2])),
                Instance::new(15, 1),
                Instance::new(16, 3).with_array(ArrayData::Chars(vec![0xdc00, 0x6f, 0x6b])),
            ],
            Vec::new(),
        )
        .unwrap()
    }

    fn render_id(heap: &MemoryHeap, id: u64) -> Option<String> {
        render(heap, heap.instance_by_id(id))
    }

    #[test]
    fn strings_and_char_arrays_render_their_text() {
        let heap = heap();
        assert_eq!(render_id(&heap, 11).as_deref(), Some("hello"));
        assert_eq!(render_id(&heap, 10).as_deref(), Some("hello"));
    }

    #[test]
    fn unpaired_surrogates_render_as_replacement_chars() {
        let heap = heap();
        assert_eq!(render_id(&heap, 16).as_deref(), Some("\u{fffd}ok"));
    }

    #[test]
    fn char_array_without_contents_renders_null_marker() {
        let heap = heap();
        assert_eq!(render_id(&heap, 12).as_deref(), Some("*null*"));
    }

    #[test]
    fn decoding_failure_falls_back_to_description() {
        let heap = heap();
        assert_eq!(render_id(&heap, 13).as_deref(), Some("java.lang.String#0xd"));
    }

    #[test]
    fn other_instances_use_description_and_none_stays_none() {
        let heap = heap();
        assert_eq!(render_id(&heap, 15).as_deref(), Some("java.lang.Object#0xf"));
        assert_eq!(render(&heap, None), None);
    }
}
