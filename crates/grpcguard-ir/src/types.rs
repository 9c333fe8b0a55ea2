//! Type system helpers for working with Go types from bridge data.

use crate::ir::{Package, StructField, TypeKind, TypeRef};
use std::collections::HashMap;

/// Marker method identifying protobuf-generated message types. Present on the
/// pointer form of every struct emitted by protoc-gen-go.
pub const PROTO_MESSAGE_MARKER: &str = "ProtoMessage";

/// Type lookup table for a package.
pub struct TypeMap {
    types: HashMap<u32, TypeRef>,
}

impl TypeMap {
    pub fn from_package(pkg: &Package) -> Self {
        let types = pkg.types.iter().map(|t| (t.id, t.clone())).collect();
        Self { types }
    }

    pub fn get(&self, id: u32) -> Option<&TypeRef> {
        self.types.get(&id)
    }

    pub fn kind(&self, id: u32) -> TypeKind {
        self.types.get(&id).map(|t| t.kind).unwrap_or(TypeKind::Unknown)
    }

    pub fn is_pointer(&self, id: u32) -> bool {
        self.kind(id) == TypeKind::Pointer
    }

    pub fn is_slice(&self, id: u32) -> bool {
        self.kind(id) == TypeKind::Slice
    }

    pub fn is_map(&self, id: u32) -> bool {
        self.kind(id) == TypeKind::Map
    }

    /// Strip a single layer of pointer; other kinds pass through.
    pub fn strip_pointer(&self, id: u32) -> u32 {
        match self.types.get(&id) {
            Some(t) if t.kind == TypeKind::Pointer && t.elem != 0 => t.elem,
            _ => id,
        }
    }

    /// The named type behind at most one pointer, if any.
    pub fn named(&self, id: u32) -> Option<&TypeRef> {
        let id = self.strip_pointer(id);
        self.types.get(&id).filter(|t| t.kind == TypeKind::Named)
    }

    /// Struct fields of a type: directly for Struct kinds, through `underlying`
    /// for Named kinds.
    pub fn struct_fields(&self, id: u32) -> Option<&[StructField]> {
        let t = self.types.get(&id)?;
        match t.kind {
            TypeKind::Struct => Some(&t.fields),
            TypeKind::Named => {
                let u = self.types.get(&t.underlying)?;
                (u.kind == TypeKind::Struct).then_some(u.fields.as_slice())
            }
            _ => None,
        }
    }

    /// True iff the type, after stripping one pointer layer, is a named type
    /// whose pointer-form method set carries the `ProtoMessage` marker.
    pub fn is_proto_message(&self, id: u32) -> bool {
        self.named(id)
            .is_some_and(|t| t.ptr_methods.iter().any(|m| m == PROTO_MESSAGE_MARKER))
    }

    /// True for the ambient request-context type (`context.Context`).
    pub fn is_context(&self, id: u32) -> bool {
        let id = self.strip_pointer(id);
        self.types
            .get(&id)
            .is_some_and(|t| t.name == "context.Context")
    }

    /// True for the predeclared `error` type.
    pub fn is_error_type(&self, id: u32) -> bool {
        self.types
            .get(&id)
            .is_some_and(|t| t.is_error || t.name == "error")
    }

    /// Short name of a named type ("example.com/pb.GetUserResponse" → "GetUserResponse").
    pub fn short_name(&self, id: u32) -> String {
        let id = self.strip_pointer(id);
        match self.types.get(&id) {
            Some(t) => t.name.rsplit('.').next().unwrap_or(&t.name).to_owned(),
            None => String::new(),
        }
    }

    /// Structural type equality.
    ///
    /// The bridge interns types, so id equality is the common case; the
    /// structural walk covers bridges that emit duplicate entries. Named and
    /// basic types compare by name, which bounds the recursion.
    pub fn identical(&self, a: u32, b: u32) -> bool {
        if a == b {
            return true;
        }
        let (Some(ta), Some(tb)) = (self.types.get(&a), self.types.get(&b)) else {
            return false;
        };
        if ta.kind != tb.kind {
            return false;
        }
        match ta.kind {
            TypeKind::Named | TypeKind::Basic | TypeKind::Interface => ta.name == tb.name,
            TypeKind::Pointer | TypeKind::Slice | TypeKind::Array => {
                self.identical(ta.elem, tb.elem)
            }
            TypeKind::Map => self.identical(ta.key, tb.key) && self.identical(ta.elem, tb.elem),
            TypeKind::Struct => {
                ta.fields.len() == tb.fields.len()
                    && ta
                        .fields
                        .iter()
                        .zip(tb.fields.iter())
                        .all(|(fa, fb)| {
                            fa.name == fb.name && self.identical(fa.type_id, fb.type_id)
                        })
            }
            _ => ta.name == tb.name,
        }
    }
}
