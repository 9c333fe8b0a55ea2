//! High-level IR wrappers for Go code analysis.
//!
//! These types mirror the JSON schema produced by the Go bridge and provide
//! the intermediate representation consumed by the analysis passes. The IR is
//! read-only from the analyzer's point of view: passes borrow it and never
//! mutate it.

use serde::{Deserialize, Serialize};

/// Root type — complete analysis input from the Go bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub packages: Vec<Package>,
    pub go_version: String,
    pub bridge_version: String,
}

/// A Go package with full SSA IR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub import_path: String,
    pub name: String,
    pub types: Vec<TypeRef>,
    pub functions: Vec<Function>,
}

/// Type reference with unique ID.
///
/// Type identity is the `id`: the bridge interns types, so two occurrences of
/// the same Go type share one entry. `underlying`, `elem` and `key` are IDs
/// into the same table (0 = none).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRef {
    pub id: u32,
    pub kind: TypeKind,
    /// Fully qualified name for named types (e.g. "example.com/pb.GetUserResponse"),
    /// the Go syntax otherwise (e.g. "*pb.UserProfile", "[]*pb.User").
    pub name: String,
    /// For Named types: the underlying type.
    #[serde(default)]
    pub underlying: u32,
    /// For Pointer/Slice/Array types: the element type. For Map: the value type.
    #[serde(default)]
    pub elem: u32,
    /// For Map types: the key type.
    #[serde(default)]
    pub key: u32,
    /// For Struct types: fields in declaration order.
    #[serde(default)]
    pub fields: Vec<StructField>,
    /// For Named types: the method set of the pointer form `*T`. This includes
    /// both value-receiver and pointer-receiver methods, matching Go's method
    /// set rules.
    #[serde(default)]
    pub ptr_methods: Vec<String>,
    /// True for the predeclared `error` interface.
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TypeKind {
    Basic,
    Named,
    Pointer,
    Slice,
    Array,
    Map,
    Struct,
    Interface,
    Signature,
    Tuple,
    #[serde(other)]
    Unknown,
}

/// A struct field with its raw tag text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub type_id: u32,
    #[serde(default)]
    pub tag: String,
}

impl StructField {
    /// Exported per the Go rule: leading ASCII uppercase.
    pub fn is_exported(&self) -> bool {
        self.name
            .as_bytes()
            .first()
            .is_some_and(|b| b.is_ascii_uppercase())
    }
}

/// Source location span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    pub file: String,
    pub start_line: u32,
    pub start_col: u32,
    #[serde(default)]
    pub end_line: u32,
    #[serde(default)]
    pub end_col: u32,
}

impl Span {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col,
        }
    }
}

/// SSA instruction.
///
/// Every value-producing instruction defines exactly one SSA value, named by
/// `id`; `operands` reference other instructions' ids. Non-value instructions
/// (Store, Return, If, Jump) participate with an id but are never referenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub id: u32,
    pub kind: ValueKind,
    /// SSA register name from the bridge (e.g. "t3"), empty for non-values.
    #[serde(default)]
    pub name: String,
    pub type_id: u32,
    #[serde(default)]
    pub span: Option<Span>,
    #[serde(default)]
    pub operands: Vec<u32>,

    // Call-specific
    /// Qualified callee name for statically resolved calls.
    #[serde(default)]
    pub callee: Option<String>,
    #[serde(default)]
    pub callee_is_interface: bool,

    // FieldAddr-specific: positional index of the selected field.
    #[serde(default)]
    pub field_index: u32,

    // UnOp/BinOp-specific operator token ("*", "==", ...).
    #[serde(default)]
    pub op: Option<String>,

    // Const-specific
    #[serde(default)]
    pub const_value: Option<String>,
    /// True when the constant denotes the nil reference for its type.
    #[serde(default)]
    pub is_nil: bool,
}

/// The closed set of SSA kinds the analysis discriminates.
///
/// Anything the bridge emits beyond this set deserializes as `Unknown`, which
/// the nil-flow rules treat conservatively. Adding a kind is additive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValueKind {
    Const,
    Parameter,
    Alloc,
    FieldAddr,
    IndexAddr,
    Call,
    BinOp,
    UnOp,
    Load,
    Store,
    Phi,
    Extract,
    MakeInterface,
    ChangeInterface,
    MakeSlice,
    MakeMap,
    Convert,
    Return,
    If,
    Jump,
    #[serde(other)]
    Unknown,
}

/// SSA basic block. Instructions appear in program order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub instructions: Vec<Instruction>,
}

/// SSA function with signature metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    /// Qualified name (e.g. "(*pb.UserService).GetUser" or "pb.buildProfile").
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub span: Option<Span>,
    pub blocks: Vec<BasicBlock>,
    #[serde(default)]
    pub is_method: bool,
    /// Receiver type id for methods (0 for plain functions). May be a pointer type.
    #[serde(default)]
    pub receiver_type_id: u32,
    /// Parameter type ids in declaration order, receiver excluded.
    #[serde(default)]
    pub params: Vec<u32>,
    /// Result type ids in declaration order.
    #[serde(default)]
    pub results: Vec<u32>,
}

impl Function {
    /// Iterate instructions of all blocks in program order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }

    /// The first `Return` instruction in program order, if any.
    pub fn first_return(&self) -> Option<&Instruction> {
        self.instructions().find(|i| i.kind == ValueKind::Return)
    }
}
