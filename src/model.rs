//! Snapshot entities: classes, instances, field values and GC roots.
//!
//! These are owned by a [`HeapModel`](crate::heap::HeapModel) implementation and only
//! borrowed by the navigator. They double as the on-disk snapshot records, so every
//! type here is serde-serializable.

use serde::{Deserialize, Serialize};

pub type ObjectId = u64;

/// Object ids are shown in hex everywhere they reach a user.
pub fn format_id(id: ObjectId) -> String {
    format!("{id:#x}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Object(Option<ObjectId>),
    Boolean(bool),
    /// A UTF-16 code unit; may be half of a surrogate pair.
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Value {
    pub fn reference(id: ObjectId) -> Self {
        Value::Object(Some(id))
    }

    /// Target of an object-valued field, `None` for null and for primitives.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => *id,
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(v.into()),
            Value::Short(v) => Some(v.into()),
            Value::Int(v) => Some(v.into()),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: Value,
}

impl FieldValue {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JavaClass {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, rename = "super", skip_serializing_if = "Option::is_none")]
    pub super_class: Option<ObjectId>,
    #[serde(default, rename = "loader", skip_serializing_if = "Option::is_none")]
    pub class_loader: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, rename = "statics", skip_serializing_if = "Vec::is_empty")]
    pub static_values: Vec<FieldValue>,
}

impl JavaClass {
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            super_class: None,
            class_loader: None,
            fields: Vec::new(),
            static_values: Vec::new(),
        }
    }

    pub fn extends(mut self, super_class: ObjectId) -> Self {
        self.super_class = Some(super_class);
        self
    }

    pub fn loaded_by(mut self, loader: ObjectId) -> Self {
        self.class_loader = Some(loader);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            type_name: type_name.into(),
        });
        self
    }

    pub fn with_static(mut self, name: impl Into<String>, value: Value) -> Self {
        self.static_values.push(FieldValue::new(name, value));
        self
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn static_value(&self, name: &str) -> Option<&Value> {
        self.static_values
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayData {
    Objects(Vec<Option<ObjectId>>),
    Booleans(Vec<bool>),
    /// UTF-16 code units, unpaired surrogates included.
    Chars(#[serde(with = "char_units")] Vec<u16>),
    Bytes(Vec<i8>),
    Shorts(Vec<i16>),
    Ints(Vec<i32>),
    Longs(Vec<i64>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
}

impl ArrayData {
    pub fn chars(text: &str) -> Self {
        ArrayData::Chars(text.encode_utf16().collect())
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayData::Objects(v) => v.len(),
            ArrayData::Booleans(v) => v.len(),
            ArrayData::Chars(v) => v.len(),
            ArrayData::Bytes(v) => v.len(),
            ArrayData::Shorts(v) => v.len(),
            ArrayData::Ints(v) => v.len(),
            ArrayData::Longs(v) => v.len(),
            ArrayData::Floats(v) => v.len(),
            ArrayData::Doubles(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `char[]` payloads are written as a JSON string when they are well-formed UTF-16
/// and as an array of code units otherwise. Both forms are accepted on read.
mod char_units {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Units(Vec<u16>),
    }

    pub fn serialize<S: Serializer>(units: &[u16], serializer: S) -> Result<S::Ok, S::Error> {
        match String::from_utf16(units) {
            Ok(text) => serializer.serialize_str(&text),
            Err(_) => units.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u16>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.encode_utf16().collect(),
            Repr::Units(units) => units,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: ObjectId,
    #[serde(rename = "class")]
    pub class_id: ObjectId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<ArrayData>,
}

impl Instance {
    pub fn new(id: ObjectId, class_id: ObjectId) -> Self {
        Self {
            id,
            class_id,
            fields: Vec::new(),
            array: None,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.push(FieldValue::new(name, value));
        self
    }

    pub fn with_array(mut self, array: ArrayData) -> Self {
        self.array = Some(array);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn array_length(&self) -> usize {
        self.array.as_ref().map_or(0, ArrayData::len)
    }

    /// Element slots of an object array; empty for everything else.
    pub fn object_elements(&self) -> &[Option<ObjectId>] {
        match &self.array {
            Some(ArrayData::Objects(elements)) => elements,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootKind {
    JniGlobal,
    JniLocal,
    JavaFrame,
    NativeStack,
    StickyClass,
    ThreadBlock,
    MonitorUsed,
    ThreadObject,
    #[default]
    Unknown,
}

impl RootKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootKind::JniGlobal => "jni-global",
            RootKind::JniLocal => "jni-local",
            RootKind::JavaFrame => "java-frame",
            RootKind::NativeStack => "native-stack",
            RootKind::StickyClass => "sticky-class",
            RootKind::ThreadBlock => "thread-block",
            RootKind::MonitorUsed => "monitor-used",
            RootKind::ThreadObject => "thread-object",
            RootKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcRoot {
    #[serde(rename = "id")]
    pub instance_id: ObjectId,
    #[serde(default)]
    pub kind: RootKind,
}

impl GcRoot {
    pub fn new(instance_id: ObjectId, kind: RootKind) -> Self {
        Self { instance_id, kind }
    }
}

/// An incoming edge, identified by the object that holds the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Field { defining: ObjectId, index: usize },
    Element { defining: ObjectId, index: usize },
    /// Static slot; `defining` is the declaring class id, shared with its `java.lang.Class` mirror.
    Static { defining: ObjectId, index: usize },
}

impl Reference {
    pub fn defining_instance(&self) -> ObjectId {
        match *self {
            Reference::Field { defining, .. }
            | Reference::Element { defining, .. }
            | Reference::Static { defining, .. } => defining,
        }
    }
}

/// Either side of the class/instance split that graph queries report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeapObject<'a> {
    Class(&'a JavaClass),
    Instance(&'a Instance),
}

impl<'a> HeapObject<'a> {
    pub fn id(&self) -> ObjectId {
        match self {
            HeapObject::Class(c) => c.id,
            HeapObject::Instance(i) => i.id,
        }
    }

    pub fn as_class(&self) -> Option<&'a JavaClass> {
        match *self {
            HeapObject::Class(c) => Some(c),
            HeapObject::Instance(_) => None,
        }
    }

    pub fn as_instance(&self) -> Option<&'a Instance> {
        match *self {
            HeapObject::Instance(i) => Some(i),
            HeapObject::Class(_) => None,
        }
    }
}

impl<'a> From<&'a JavaClass> for HeapObject<'a> {
    fn from(class: &'a JavaClass) -> Self {
        HeapObject::Class(class)
    }
}

impl<'a> From<&'a Instance> for HeapObject<'a> {
    fn from(instance: &'a Instance) -> Self {
        HeapObject::Instance(instance)
    }
}
