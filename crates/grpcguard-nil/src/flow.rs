//! Value-level nil-flow engine.
//!
//! Answers, for any SSA value inside a handler, whether it may be nil at the
//! point of use. Evaluation is a memoized recursion over the value graph;
//! cycles (phi-induced) are broken by seeding the cache with `Unknown` before
//! descending, trading precision for bounded cost.

use std::collections::HashMap;

use grpcguard_ir::call_graph::FunctionIndex;
use grpcguard_ir::ir::{Instruction, ValueKind};

use crate::lattice::NilStatus;
use crate::summary::{self, SummaryCache};

/// Value id → defining instruction, for the function under analysis.
pub type InstrMap<'a> = HashMap<u32, &'a Instruction>;

/// Build the defining-instruction map for a function body.
pub fn instr_map(func: &grpcguard_ir::ir::Function) -> InstrMap<'_> {
    func.instructions().map(|i| (i.id, i)).collect()
}

/// Conservative nil-flow analyzer over SSA values.
///
/// Carries two caches with different lifetimes: the per-query value cache,
/// cleared by the driver before each handler scan, and the per-callee summary
/// cache, which is stable for the lifetime of the analyzer.
pub struct NilFlow<'a> {
    index: &'a FunctionIndex<'a>,
    visited: HashMap<u32, NilStatus>,
    summaries: SummaryCache,
}

impl<'a> NilFlow<'a> {
    pub fn new(index: &'a FunctionIndex<'a>) -> Self {
        Self {
            index,
            visited: HashMap::new(),
            summaries: SummaryCache::new(),
        }
    }

    /// Clear the per-query value cache. Summaries are kept: they are
    /// per-callee facts, reusable across handlers.
    pub fn reset(&mut self) {
        self.visited.clear();
    }

    /// Compute a conservative nil status for a value, memoized per query.
    pub fn status(&mut self, value_id: u32, instrs: &InstrMap<'_>) -> NilStatus {
        if let Some(&status) = self.visited.get(&value_id) {
            return status;
        }
        // Seed with Unknown so a re-visit during recursion terminates instead
        // of looping; a cyclic value can therefore never be proven NotNull.
        self.visited.insert(value_id, NilStatus::Unknown);

        let status = match instrs.get(&value_id) {
            None => NilStatus::Unknown,
            Some(&instr) => match instr.kind {
                ValueKind::Const if instr.is_nil => NilStatus::DefinitelyNull,
                ValueKind::Const => NilStatus::NotNull,

                // Fresh allocations are never nil.
                ValueKind::Alloc | ValueKind::MakeSlice | ValueKind::MakeMap => NilStatus::NotNull,

                // Interface construction/change wraps the operand.
                ValueKind::MakeInterface | ValueKind::ChangeInterface => {
                    self.operand_status(instr, instrs)
                }

                ValueKind::Phi => {
                    let mut joined = NilStatus::NotNull;
                    for &edge in &instr.operands {
                        joined = joined.join(self.status(edge, instrs));
                        if joined.is_saturated() {
                            break;
                        }
                    }
                    joined
                }

                // Dereference surfaces the nullness of the underlying value
                // for downstream stores.
                ValueKind::UnOp if instr.op.as_deref() == Some("*") => {
                    self.operand_status(instr, instrs)
                }
                ValueKind::Load => self.operand_status(instr, instrs),

                ValueKind::Call => self.call_status(instr),

                _ => NilStatus::Unknown,
            },
        };

        self.visited.insert(value_id, status);
        status
    }

    /// The driver's reporting predicate: not provably non-nil.
    pub fn is_maybe_nil(&mut self, value_id: u32, instrs: &InstrMap<'_>) -> bool {
        self.status(value_id, instrs).may_be_null()
    }

    fn operand_status(&mut self, instr: &Instruction, instrs: &InstrMap<'_>) -> NilStatus {
        match instr.operands.first() {
            Some(&op) => self.status(op, instrs),
            None => NilStatus::Unknown,
        }
    }

    fn call_status(&mut self, call: &Instruction) -> NilStatus {
        match self.index.static_callee(call) {
            Some(callee) => summary::return_status(callee, &mut self.summaries),
            None => {
                tracing::debug!(callee = ?call.callee, "callee not statically resolvable");
                NilStatus::Unknown
            }
        }
    }
}
