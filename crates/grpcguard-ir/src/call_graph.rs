//! Callee resolution for inter-procedural analysis.
//!
//! Call instructions carry the qualified name of their statically resolved
//! callee; this index maps those names back to function bodies within the
//! package so summaries can inspect return sites.

use crate::ir::{Function, Instruction, Package, ValueKind};
use std::collections::HashMap;

/// Indexed access to a package's functions by qualified name.
pub struct FunctionIndex<'a> {
    by_name: HashMap<&'a str, &'a Function>,
}

impl<'a> FunctionIndex<'a> {
    pub fn from_package(pkg: &'a Package) -> Self {
        let by_name = pkg
            .functions
            .iter()
            .map(|f| (f.name.as_str(), f))
            .collect();
        Self { by_name }
    }

    /// Resolve a qualified callee name to its function body, if the callee is
    /// defined in this package.
    pub fn resolve(&self, name: &str) -> Option<&'a Function> {
        self.by_name.get(name).copied()
    }

    /// Resolve the static callee of a call instruction. Interface dispatch and
    /// out-of-package callees resolve to `None`.
    pub fn static_callee(&self, call: &Instruction) -> Option<&'a Function> {
        if call.kind != ValueKind::Call || call.callee_is_interface {
            return None;
        }
        call.callee.as_deref().and_then(|name| self.resolve(name))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BasicBlock;

    fn make_func(name: &str) -> Function {
        Function {
            name: name.into(),
            short_name: name.rsplit('.').next().unwrap_or(name).into(),
            span: None,
            blocks: vec![BasicBlock {
                id: 0,
                name: "entry".into(),
                instructions: vec![],
            }],
            is_method: false,
            receiver_type_id: 0,
            params: vec![],
            results: vec![],
        }
    }

    fn make_call(callee: Option<&str>, is_interface: bool) -> Instruction {
        Instruction {
            id: 1,
            kind: ValueKind::Call,
            name: "t1".into(),
            type_id: 0,
            span: None,
            operands: vec![],
            callee: callee.map(|s| s.into()),
            callee_is_interface: is_interface,
            field_index: 0,
            op: None,
            const_value: None,
            is_nil: false,
        }
    }

    #[test]
    fn test_resolve_by_name() {
        let pkg = Package {
            import_path: "example.com/pb".into(),
            name: "pb".into(),
            types: vec![],
            functions: vec![make_func("pb.buildProfile"), make_func("pb.helper")],
        };
        let index = FunctionIndex::from_package(&pkg);
        assert_eq!(index.len(), 2);
        assert!(index.resolve("pb.buildProfile").is_some());
        assert!(index.resolve("pb.missing").is_none());
    }

    #[test]
    fn test_static_callee_skips_interface_dispatch() {
        let pkg = Package {
            import_path: "example.com/pb".into(),
            name: "pb".into(),
            types: vec![],
            functions: vec![make_func("pb.buildProfile")],
        };
        let index = FunctionIndex::from_package(&pkg);

        let direct = make_call(Some("pb.buildProfile"), false);
        assert!(index.static_callee(&direct).is_some());

        let iface = make_call(Some("pb.buildProfile"), true);
        assert!(index.static_callee(&iface).is_none());

        let external = make_call(Some("db.Find"), false);
        assert!(index.static_callee(&external).is_none());
    }
}
