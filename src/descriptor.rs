use crate::model::ObjectId;

const REFERENCE_MARKER: char = 'L';

/// What a class descriptor resolves to before it hits the heap model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassKey {
    Id(ObjectId),
    Name(String),
}

impl ClassKey {
    pub fn parse(descriptor: &str) -> Self {
        match parse_object_id(descriptor) {
            Some(id) => ClassKey::Id(id),
            None => ClassKey::Name(canonical_class_name(descriptor)),
        }
    }
}

/// Parses `0x`-prefixed hexadecimal or plain decimal object ids.
pub fn parse_object_id(raw: &str) -> Option<ObjectId> {
    match raw.strip_prefix("0x") {
        Some(hex) => ObjectId::from_str_radix(hex, 16).ok(),
        None => raw.parse::<ObjectId>().ok(),
    }
}

/// Turns JVM-style descriptors into the names classes carry in a heap dump:
/// `[I` becomes `int[]`, `[[Ljava.lang.String;` becomes `java.lang.String[][]`.
/// Plain names pass through untouched.
pub fn canonical_class_name(descriptor: &str) -> String {
    let element = descriptor.trim_start_matches('[');
    let dims = descriptor.len() - element.len();

    let mut name = match primitive_name(element) {
        Some(primitive) => primitive,
        None if dims > 0 => match element.strip_prefix(REFERENCE_MARKER) {
            Some(class_name) => class_name.strip_suffix(';').unwrap_or(class_name),
            None => element,
        },
        None => element,
    }
    .to_string();

    for _ in 0..dims {
        name.push_str("[]");
    }
    name
}

fn primitive_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "Z" => "boolean",
        "C" => "char",
        "B" => "byte",
        "S" => "short",
        "I" => "int",
        "J" => "long",
        "F" => "float",
        "D" => "double",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_arrays_get_canonical_names() {
        let cases = [
            ("[Z", "boolean[]"),
            ("[C", "char[]"),
            ("[B", "byte[]"),
            ("[S", "short[]"),
            ("[I", "int[]"),
            ("[[J", "long[][]"),
            ("[[[F", "float[][][]"),
            ("[D", "double[]"),
        ];
        for (raw, expected) in cases {
            assert_eq!(canonical_class_name(raw), expected, "descriptor {raw}");
        }
    }

    #[test]
    fn bare_primitive_code_maps_to_primitive_name() {
        assert_eq!(canonical_class_name("I"), "int");
        assert_eq!(canonical_class_name("V"), "V");
    }

    #[test]
    fn reference_arrays_drop_marker_and_terminator() {
        assert_eq!(
            canonical_class_name("[[Ljava.lang.String;"),
            "java.lang.String[][]"
        );
        assert_eq!(canonical_class_name("[Ljava.util.Map"), "java.util.Map[]");
    }

    #[test]
    fn plain_names_are_untouched() {
        assert_eq!(canonical_class_name("java.lang.Long"), "java.lang.Long");
        assert_eq!(canonical_class_name("Lfoo.Bar;"), "Lfoo.Bar;");
        assert_eq!(canonical_class_name("int[]"), "int[]");
    }

    #[test]
    fn numeric_descriptors_become_ids() {
        assert_eq!(ClassKey::parse("0x1f"), ClassKey::Id(31));
        assert_eq!(ClassKey::parse("4096"), ClassKey::Id(4096));
        assert_eq!(
            ClassKey::parse("0xzz"),
            ClassKey::Name("0xzz".to_string())
        );
        assert_eq!(
            ClassKey::parse("-12"),
            ClassKey::Name("-12".to_string())
        );
    }
}
