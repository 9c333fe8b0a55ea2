//! Schema-reflective field classifier for proto-generated message structs.
//!
//! Decides, per field of a generated message type, whether a nil value at
//! response-return time is a fault. Classification depends only on the
//! field's declared type and raw tag text, so results are cached per type.

use grpcguard_ir::ir::{StructField, TypeKind};
use grpcguard_ir::types::TypeMap;
use std::collections::HashMap;

/// How risky it is for a field to be nil in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRisk {
    /// Scalars, maps, non-message slices, and oneof-tagged fields. A nil map
    /// is a valid empty map; a oneof member is optional by construction.
    Safe,
    /// Non-optional pointer to a message type.
    MessagePointer,
    /// Slice whose element type is a pointer to a message type.
    RepeatedMessagePointer,
    /// Reserved; treated as risky.
    ImplicitRequirement,
}

impl FieldRisk {
    pub fn is_risky(self) -> bool {
        !matches!(self, FieldRisk::Safe)
    }
}

/// Proto field metadata derived from the generated struct.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    /// Positional index in the struct layout (non-exported fields included in
    /// the numbering, so indices line up with FieldAddr instructions).
    pub index: u32,
    pub type_id: u32,
    pub tag: String,
    pub is_pointer: bool,
    pub is_repeated: bool,
    pub is_map: bool,
    pub is_scalar: bool,
    pub is_optional: bool,
    pub is_message: bool,
    pub risk: FieldRisk,
}

/// Classification result for one message type.
#[derive(Debug, Clone, Default)]
pub struct MessageInfo {
    pub type_id: u32,
    /// Short type name used in diagnostics ("GetUserResponse").
    pub name: String,
    /// Exported fields in declaration order.
    pub fields: Vec<FieldInfo>,
}

impl MessageInfo {
    pub fn field_at(&self, index: u32) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.index == index)
    }

    pub fn risky(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.risk.is_risky())
    }

    pub fn has_risky(&self) -> bool {
        self.risky().next().is_some()
    }
}

/// Caching classifier over message types.
#[derive(Default)]
pub struct FieldClassifier {
    cache: HashMap<u32, MessageInfo>,
}

impl FieldClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a message type, cached by type identity. Pointer types are
    /// normalized to their pointee first. Non-message types get an empty
    /// descriptor.
    pub fn classify(&mut self, type_id: u32, types: &TypeMap) -> &MessageInfo {
        let id = types.strip_pointer(type_id);
        self.cache
            .entry(id)
            .or_insert_with(|| build_message_info(id, types))
    }
}

fn build_message_info(type_id: u32, types: &TypeMap) -> MessageInfo {
    let mut info = MessageInfo {
        type_id,
        name: types.short_name(type_id),
        fields: Vec::new(),
    };
    if !types.is_proto_message(type_id) {
        return info;
    }
    let Some(fields) = types.struct_fields(type_id) else {
        return info;
    };
    for (i, field) in fields.iter().enumerate() {
        if !field.is_exported() {
            continue;
        }
        info.fields.push(classify_field(i as u32, field, types));
    }
    info
}

fn classify_field(index: u32, field: &StructField, types: &TypeMap) -> FieldInfo {
    let kind = types.kind(field.type_id);
    let is_pointer = kind == TypeKind::Pointer;
    let is_repeated = kind == TypeKind::Slice;
    let is_map = kind == TypeKind::Map;
    let is_scalar = !is_pointer && !is_repeated && !is_map;
    let is_message = types.is_proto_message(field.type_id);
    let is_optional = tag_has_flag(&field.tag, "protobuf", "oneof");

    let risk = if is_repeated && element_is_message(field.type_id, types) {
        FieldRisk::RepeatedMessagePointer
    } else if is_pointer && is_message && !is_optional {
        FieldRisk::MessagePointer
    } else {
        FieldRisk::Safe
    };

    FieldInfo {
        name: field.name.clone(),
        index,
        type_id: field.type_id,
        tag: field.tag.clone(),
        is_pointer,
        is_repeated,
        is_map,
        is_scalar,
        is_optional,
        is_message,
        risk,
    }
}

fn element_is_message(slice_id: u32, types: &TypeMap) -> bool {
    types
        .get(slice_id)
        .filter(|t| t.kind == TypeKind::Slice)
        .is_some_and(|t| types.is_proto_message(t.elem))
}

/// Struct tag lookup: `key:"value"` segments separated by single spaces, with
/// the value a comma-separated list. Matches the Go `reflect.StructTag`
/// convention for well-formed generated code.
fn tag_value<'a>(tag: &'a str, key: &str) -> Option<&'a str> {
    for segment in tag.split(' ') {
        if let Some((k, v)) = segment.split_once(':') {
            if k == key {
                return Some(v.trim_matches('"'));
            }
        }
    }
    None
}

fn tag_has_flag(tag: &str, key: &str, part: &str) -> bool {
    tag_value(tag, key).is_some_and(|v| v.split(',').any(|seg| seg == part))
}
