//! Nil-response rules (RESP001, RESP002, RESP003).

use grpcguard_diagnostics::diagnostic::{Diagnostic, DiagnosticBuilder, Severity};
use grpcguard_ir::ir::Span;

use crate::handlers::HandlerInfo;
use crate::lattice::NilStatus;

/// RESP001: maybe-nil value stored into a required message-pointer field.
pub fn direct_field(
    span: Option<&Span>,
    handler: &HandlerInfo<'_>,
    response: &str,
    field: &str,
    value_name: &str,
    status: NilStatus,
) -> Diagnostic {
    let (file, line, col) = span_parts(span);
    DiagnosticBuilder::new(
        "RESP001",
        Severity::Error,
        format!(
            "potential nil field in gRPC response {response}.{field} (handler {}.{})",
            handler.service, handler.method
        ),
    )
    .location(file, line, col)
    .confidence(confidence_for(status))
    .explanation(format!(
        "value `{value_name}` stored into required field `{field}` {}",
        status_phrase(status)
    ))
    .handler(&handler.service, &handler.method)
    .response_field(response, field)
    .build()
}

/// RESP002: maybe-nil element stored into a repeated message field.
pub fn slice_element(
    span: Option<&Span>,
    handler: &HandlerInfo<'_>,
    response: &str,
    field: &str,
    value_name: &str,
    status: NilStatus,
) -> Diagnostic {
    let (file, line, col) = span_parts(span);
    DiagnosticBuilder::new(
        "RESP002",
        Severity::Error,
        format!(
            "potential nil element in gRPC response slice {field} (handler {}.{})",
            handler.service, handler.method
        ),
    )
    .location(file, line, col)
    .confidence(confidence_for(status))
    .explanation(format!(
        "element `{value_name}` stored into repeated field `{field}` {}",
        status_phrase(status)
    ))
    .handler(&handler.service, &handler.method)
    .response_field(response, field)
    .build()
}

/// RESP003: required field never assigned on a freshly allocated response.
pub fn implicit_field(
    span: Option<&Span>,
    handler: &HandlerInfo<'_>,
    response: &str,
    field: &str,
) -> Diagnostic {
    let (file, line, col) = span_parts(span);
    DiagnosticBuilder::new(
        "RESP003",
        Severity::Warning,
        format!("implicit nil field in gRPC response {response}.{field}"),
    )
    .location(file, line, col)
    .confidence(0.9)
    .explanation(format!(
        "required field `{field}` of `{response}` is never assigned before the response is returned"
    ))
    .handler(&handler.service, &handler.method)
    .response_field(response, field)
    .build()
}

fn status_phrase(status: NilStatus) -> &'static str {
    match status {
        NilStatus::DefinitelyNull => "is nil on every path",
        NilStatus::MaybeNull => "may be nil on some path",
        _ => "cannot be proven non-nil",
    }
}

fn confidence_for(status: NilStatus) -> f64 {
    match status {
        NilStatus::DefinitelyNull => 0.95,
        NilStatus::MaybeNull => 0.85,
        _ => 0.6,
    }
}

fn span_parts(span: Option<&Span>) -> (String, u32, u32) {
    match span {
        Some(s) => (s.file.clone(), s.start_line, s.start_col),
        None => ("unknown".into(), 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grpcguard_ir::ir::{BasicBlock, Function};

    fn make_handler_func() -> Function {
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
            params: vec![],
            results: vec![],
        }
    }

    fn make_handler(func: &Function) -> HandlerInfo<'_> {
        HandlerInfo {
            func,
            receiver_id: 8,
            request_id: 2,
            response_id: 6,
            service: "UserService".into(),
            method: "GetUser".into(),
        }
    }

    #[test]
    fn test_direct_field_message_shape() {
        let func = make_handler_func();
        let handler = make_handler(&func);
        let span = Span::new("handler.go", 18, 2);
        let diag = direct_field(
            Some(&span),
            &handler,
            "GetUserResponse",
            "Profile",
            "t4",
            NilStatus::DefinitelyNull,
        );
        assert_eq!(
            diag.title,
            "potential nil field in gRPC response GetUserResponse.Profile (handler UserService.GetUser)"
        );
        assert_eq!(diag.rule, "RESP001");
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.location.line, 18);
        assert_eq!(diag.confidence, 0.95);
        assert!(diag.explanation.contains("t4"));
        assert!(diag.explanation.contains("nil on every path"));
    }

    #[test]
    fn test_slice_element_message_shape() {
        let func = make_handler_func();
        let handler = make_handler(&func);
        let span = Span::new("handler.go", 30, 2);
        let diag = slice_element(
            Some(&span),
            &handler,
            "ListUsersResponse",
            "Users",
            "t7",
            NilStatus::MaybeNull,
        );
        assert_eq!(
            diag.title,
            "potential nil element in gRPC response slice Users (handler UserService.GetUser)"
        );
        assert_eq!(diag.rule, "RESP002");
        assert_eq!(diag.confidence, 0.85);
    }

    #[test]
    fn test_implicit_field_message_shape() {
        let func = make_handler_func();
        let handler = make_handler(&func);
        let diag = implicit_field(None, &handler, "GetUserResponse", "Profile");
        assert_eq!(
            diag.title,
            "implicit nil field in gRPC response GetUserResponse.Profile"
        );
        assert_eq!(diag.rule, "RESP003");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.location.file, "unknown");
    }

    #[test]
    fn test_unknown_status_lowers_confidence() {
        let func = make_handler_func();
        let handler = make_handler(&func);
        let diag = direct_field(
            None,
            &handler,
            "GetUserResponse",
            "Profile",
            "t2",
            NilStatus::Unknown,
        );
        assert_eq!(diag.confidence, 0.6);
        assert!(diag.explanation.contains("cannot be proven non-nil"));
    }
}
