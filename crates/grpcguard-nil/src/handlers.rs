//! Handler recognizer: identifies unary gRPC handler methods by signature.
//!
//! A handler is a method of the shape
//!
//!   func (s *Service) Method(ctx context.Context, req *Req) (*Resp, error)
//!
//! where `Req` and `Resp` are proto message types. Streaming handlers fail
//! the arity and type checks below and are never recognized.

use grpcguard_ir::ir::Function;
use grpcguard_ir::types::TypeMap;

/// A recognized gRPC handler and its bound message types.
#[derive(Debug, Clone)]
pub struct HandlerInfo<'a> {
    pub func: &'a Function,
    /// Named receiver type (pointer stripped).
    pub receiver_id: u32,
    /// Declared request type (`*Req`).
    pub request_id: u32,
    /// Declared response type (`*Resp`).
    pub response_id: u32,
    /// Short name of the receiver type.
    pub service: String,
    pub method: String,
}

/// Inspect a function signature and return its handler descriptor if it
/// matches the unary handler shape. Pure function of the signature.
pub fn detect_handler<'a>(func: &'a Function, types: &TypeMap) -> Option<HandlerInfo<'a>> {
    if !func.is_method || func.receiver_type_id == 0 {
        return None;
    }
    // At least (ctx, req) parameters and exactly (resp, error) results.
    if func.params.len() < 2 || func.results.len() != 2 {
        return None;
    }

    let ctx = func.params[0];
    let req = func.params[1];
    let resp = func.results[0];
    let err = func.results[1];

    if !types.is_context(ctx) {
        return None;
    }
    if !types.is_error_type(err) {
        return None;
    }
    // Both request and response must be pointers to proto messages.
    if !types.is_pointer(req) || !types.is_proto_message(req) {
        return None;
    }
    if !types.is_pointer(resp) || !types.is_proto_message(resp) {
        return None;
    }

    let receiver = types.named(func.receiver_type_id)?;
    Some(HandlerInfo {
        func,
        receiver_id: receiver.id,
        request_id: req,
        response_id: resp,
        service: types.short_name(receiver.id),
        method: func.short_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grpcguard_ir::ir::{BasicBlock, Package, TypeKind, TypeRef};

    fn t(id: u32, kind: TypeKind, name: &str) -> TypeRef {
        TypeRef {
            id,
            kind,
            name: name.into(),
            underlying: 0,
            elem: 0,
            key: 0,
            fields: vec![],
            ptr_methods: vec![],
            is_error: false,
        }
    }

    /// Type ids:
    ///   1 context.Context      5 pb.GetUserResponse (msg)
    ///   2 *pb.GetUserRequest   6 *pb.GetUserResponse
    ///   3 pb.GetUserRequest    7 error
    ///   4 (unused struct)      8 pb.UserService    9 *pb.UserService
    fn make_types() -> TypeMap {
        let ctx = t(1, TypeKind::Named, "context.Context");
        let mut req_named = t(3, TypeKind::Named, "pb.GetUserRequest");
        req_named.ptr_methods = vec!["ProtoMessage".into()];
        let mut req_ptr = t(2, TypeKind::Pointer, "*pb.GetUserRequest");
        req_ptr.elem = 3;
        let mut resp_named = t(5, TypeKind::Named, "pb.GetUserResponse");
        resp_named.ptr_methods = vec!["ProtoMessage".into()];
        let mut resp_ptr = t(6, TypeKind::Pointer, "*pb.GetUserResponse");
        resp_ptr.elem = 5;
        let mut err = t(7, TypeKind::Interface, "error");
        err.is_error = true;
        let svc = t(8, TypeKind::Named, "pb.UserService");
        let mut svc_ptr = t(9, TypeKind::Pointer, "*pb.UserService");
        svc_ptr.elem = 8;

        let pkg = Package {
            import_path: "example.com/pb".into(),
            name: "pb".into(),
            types: vec![
                ctx,
                req_ptr,
                req_named,
                t(4, TypeKind::Struct, "struct{}"),
                resp_named,
                resp_ptr,
                err,
                svc,
                svc_ptr,
            ],
            functions: vec![],
        };
        TypeMap::from_package(&pkg)
    }

    fn make_method(params: Vec<u32>, results: Vec<u32>) -> Function {
        Function {
            name: "(*pb.UserService).GetUser".into(),
            short_name: "GetUser".into(),
            span: None,
            blocks: vec![BasicBlock {
                id: 0,
                name: "entry".into(),
                instructions: vec![],
            }],
            is_method: true,
            receiver_type_id: 9,
            params,
            results,
        }
    }

    #[test]
    fn test_recognizes_unary_handler() {
        let types = make_types();
        let func = make_method(vec![1, 2], vec![6, 7]);
        let h = detect_handler(&func, &types).expect("should recognize handler");
        assert_eq!(h.service, "UserService");
        assert_eq!(h.method, "GetUser");
        assert_eq!(h.request_id, 2);
        assert_eq!(h.response_id, 6);
        assert_eq!(h.receiver_id, 8);
    }

    #[test]
    fn test_rejects_plain_function() {
        let types = make_types();
        let mut func = make_method(vec![1, 2], vec![6, 7]);
        func.is_method = false;
        func.receiver_type_id = 0;
        assert!(detect_handler(&func, &types).is_none());
    }

    #[test]
    fn test_rejects_wrong_first_param() {
        let types = make_types();
        // First parameter is the request, not context.
        let func = make_method(vec![2, 2], vec![6, 7]);
        assert!(detect_handler(&func, &types).is_none());
    }

    #[test]
    fn test_rejects_wrong_result_arity() {
        let types = make_types();
        let func = make_method(vec![1, 2], vec![6]);
        assert!(detect_handler(&func, &types).is_none());

        let func3 = make_method(vec![1, 2], vec![6, 6, 7]);
        assert!(detect_handler(&func3, &types).is_none());
    }

    #[test]
    fn test_rejects_non_error_second_result() {
        let types = make_types();
        let func = make_method(vec![1, 2], vec![6, 6]);
        assert!(detect_handler(&func, &types).is_none());
    }

    #[test]
    fn test_rejects_non_message_response() {
        let types = make_types();
        // Second result is error, but first is the service pointer (no marker).
        let func = make_method(vec![1, 2], vec![9, 7]);
        assert!(detect_handler(&func, &types).is_none());
    }

    #[test]
    fn test_rejects_non_pointer_request() {
        let types = make_types();
        let func = make_method(vec![1, 3], vec![6, 7]);
        assert!(detect_handler(&func, &types).is_none());
    }

    #[test]
    fn test_extra_leading_arity_allowed() {
        // Arity >= 2 on the parameter side: generated code sometimes carries
        // trailing options; only the first two positions are constrained.
        let types = make_types();
        let func = make_method(vec![1, 2, 1], vec![6, 7]);
        assert!(detect_handler(&func, &types).is_some());
    }
}
