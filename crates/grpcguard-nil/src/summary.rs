//! Inter-procedural summaries for the nil-flow analysis.
//!
//! A summary is a single `NilStatus` describing the nullability of a callee's
//! first result across all of its return sites. Summaries are deliberately
//! shallow: a return of anything other than a fresh allocation or a constant
//! contributes `MaybeNull`, so summary computation never recurses and
//! terminates on cyclic call graphs.

use std::collections::HashMap;

use grpcguard_ir::ir::{Function, Instruction, ValueKind};

use crate::lattice::NilStatus;

/// Global per-callee summary cache, keyed by qualified function name. Lives
/// for the analyzer instance; once computed, a summary is stable.
pub type SummaryCache = HashMap<String, NilStatus>;

/// Summary of `func`'s first result, computed on first request and cached.
pub fn return_status(func: &Function, cache: &mut SummaryCache) -> NilStatus {
    if let Some(&status) = cache.get(&func.name) {
        return status;
    }
    let status = compute_return_status(func);
    cache.insert(func.name.clone(), status);
    status
}

fn compute_return_status(func: &Function) -> NilStatus {
    let instr_map: HashMap<u32, &Instruction> = func.instructions().map(|i| (i.id, i)).collect();

    let mut status = NilStatus::NotNull;
    for ret in func
        .instructions()
        .filter(|i| i.kind == ValueKind::Return && !i.operands.is_empty())
    {
        let contribution = match instr_map.get(&ret.operands[0]) {
            Some(rv) => match rv.kind {
                ValueKind::Alloc | ValueKind::MakeSlice | ValueKind::MakeMap => NilStatus::NotNull,
                ValueKind::Const if rv.is_nil => NilStatus::DefinitelyNull,
                ValueKind::Const => NilStatus::NotNull,
                // Phis, nested calls, loads: conservative, do not recurse.
                _ => NilStatus::MaybeNull,
            },
            None => NilStatus::MaybeNull,
        };
        status = status.join(contribution);
        if status.is_saturated() {
            break;
        }
    }
    status
}
