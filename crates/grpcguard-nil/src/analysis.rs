//! Handler driver for the nil-response analysis.
//!
//! For each recognized handler, classifies the response message once, walks
//! the handler body in program order, and checks every store whose address
//! denotes a risky response field or a risky slice element. Stores of values
//! that are not provably non-nil produce diagnostics; risky fields with no
//! store at all on a freshly allocated response produce implicit diagnostics.

use std::collections::HashSet;

use grpcguard_diagnostics::diagnostic::Diagnostic;
use grpcguard_ir::call_graph::FunctionIndex;
use grpcguard_ir::ir::{AnalysisInput, Package, ValueKind};
use grpcguard_ir::types::TypeMap;

use crate::fields::{FieldClassifier, FieldRisk, MessageInfo};
use crate::flow::{instr_map, InstrMap, NilFlow};
use crate::handlers::{detect_handler, HandlerInfo};
use crate::rules;

/// Nil-response analyzer over bridge IR.
pub struct ResponseNilAnalyzer;

impl ResponseNilAnalyzer {
    /// Analyze all packages in an `AnalysisInput` and return diagnostics.
    pub fn analyze(input: &AnalysisInput) -> Vec<Diagnostic> {
        input.packages.iter().flat_map(Self::analyze_package).collect()
    }

    /// Analyze a single package. Handlers are visited in the IR's enumeration
    /// order; diagnostics within a handler follow program order of the
    /// offending store.
    pub fn analyze_package(pkg: &Package) -> Vec<Diagnostic> {
        let types = TypeMap::from_package(pkg);
        let index = FunctionIndex::from_package(pkg);
        let mut classifier = FieldClassifier::new();
        let mut flow = NilFlow::new(&index);

        let mut diagnostics = Vec::new();
        for func in &pkg.functions {
            let Some(handler) = detect_handler(func, &types) else {
                continue;
            };
            check_handler(&handler, &types, &mut classifier, &mut flow, &mut diagnostics);
        }
        diagnostics
    }
}

fn check_handler(
    handler: &HandlerInfo<'_>,
    types: &TypeMap,
    classifier: &mut FieldClassifier,
    flow: &mut NilFlow<'_>,
    out: &mut Vec<Diagnostic>,
) {
    let resp_named = types.strip_pointer(handler.response_id);
    let info = classifier.classify(resp_named, types).clone();
    if !info.has_risky() {
        return;
    }

    let instrs = instr_map(handler.func);
    // Value memoization is per handler scan; summaries persist.
    flow.reset();

    // Field indices of *Resp that receive any store, and whether the handler
    // fresh-allocates a response at all. Both feed the implicit-null pass.
    let mut stored_fields: HashSet<u32> = HashSet::new();
    let mut has_response_alloc = false;

    for instr in handler.func.instructions() {
        if instr.kind == ValueKind::Alloc
            && types.identical(types.strip_pointer(instr.type_id), resp_named)
        {
            has_response_alloc = true;
        }

        if instr.kind != ValueKind::Store || instr.operands.len() < 2 {
            continue;
        }
        let addr_id = instr.operands[0];
        let val_id = instr.operands[1];
        let Some(&addr) = instrs.get(&addr_id) else {
            continue;
        };

        match addr.kind {
            // Direct struct field assignment, e.g. resp.Profile = v. Matched
            // by the base's pointer-to-response type, regardless of which
            // alloc site produced the base.
            ValueKind::FieldAddr => {
                let Some(&base_id) = addr.operands.first() else {
                    continue;
                };
                let base_type = value_type(base_id, &instrs);
                if !is_response_pointer(base_type, resp_named, types) {
                    continue;
                }
                stored_fields.insert(addr.field_index);

                let Some(field) = info.field_at(addr.field_index) else {
                    continue;
                };
                if field.risk != FieldRisk::MessagePointer {
                    continue;
                }
                let status = flow.status(val_id, &instrs);
                if status.may_be_null() {
                    out.push(rules::direct_field(
                        instr.span.as_ref(),
                        handler,
                        &info.name,
                        &field.name,
                        &value_name(val_id, &instrs),
                        status,
                    ));
                }
            }

            // Slice element assignment, e.g. resp.Users[i] = v. Matched by
            // structural equality of the container type against a repeated
            // message field of the response.
            ValueKind::IndexAddr => {
                let Some(&base_id) = addr.operands.first() else {
                    continue;
                };
                let base_type = value_type(base_id, &instrs);
                let Some(field) = match_repeated_field(base_type, &info, types) else {
                    continue;
                };
                let status = flow.status(val_id, &instrs);
                if status.may_be_null() {
                    out.push(rules::slice_element(
                        instr.span.as_ref(),
                        handler,
                        &info.name,
                        &field.name,
                        &value_name(val_id, &instrs),
                        status,
                    ));
                }
            }

            _ => {}
        }
    }

    // Implicit-null pass: a freshly allocated response whose risky field is
    // never stored anywhere in the handler body returns that field as nil.
    // Single-alloc over-approximation; anchored at the first return.
    if has_response_alloc {
        let anchor = handler
            .func
            .first_return()
            .and_then(|r| r.span.as_ref())
            .or(handler.func.span.as_ref());
        for field in info.risky() {
            if !stored_fields.contains(&field.index) {
                out.push(rules::implicit_field(anchor, handler, &info.name, &field.name));
            }
        }
    }
}

fn value_type(value_id: u32, instrs: &InstrMap<'_>) -> u32 {
    instrs.get(&value_id).map(|i| i.type_id).unwrap_or(0)
}

fn value_name(value_id: u32, instrs: &InstrMap<'_>) -> String {
    match instrs.get(&value_id) {
        Some(i) if !i.name.is_empty() => i.name.clone(),
        _ => format!("t{value_id}"),
    }
}

/// True when `type_id` is a pointer to the response's named type.
fn is_response_pointer(type_id: u32, resp_named: u32, types: &TypeMap) -> bool {
    types.is_pointer(type_id) && types.identical(types.strip_pointer(type_id), resp_named)
}

/// Find the repeated-message field of the response whose declared slice type
/// matches the store's container type.
fn match_repeated_field<'i>(
    type_id: u32,
    info: &'i MessageInfo,
    types: &TypeMap,
) -> Option<&'i crate::fields::FieldInfo> {
    info.fields
        .iter()
        .filter(|f| f.risk == FieldRisk::RepeatedMessagePointer)
        .find(|f| types.identical(f.type_id, type_id))
}
