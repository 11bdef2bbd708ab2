use super::*;

#[test]
fn new_context_is_first_attempt() {
    let ctx = RequestContext::new(Method::GET, "/applications");
    assert_eq!(ctx.attempt(), 0);
    assert!(!ctx.retried());
    assert_eq!(ctx.body, RequestBody::Empty);
}

#[test]
fn into_retry_spends_budget() {
    let ctx = RequestContext::new(Method::GET, "/users").into_retry();
    assert_eq!(ctx.attempt(), 1);
    assert!(ctx.retried());
}

#[test]
fn retry_keeps_request_fields() {
    let ctx = RequestContext::new(Method::PUT, "/credentials/4")
        .with_query(&[("page", "2")])
        .with_body(serde_json::json!({ "clientId": "c" }).into())
        .into_retry();
    assert_eq!(ctx.method, Method::PUT);
    assert_eq!(ctx.path, "/credentials/4");
    assert_eq!(ctx.query, vec![("page".to_owned(), "2".to_owned())]);
    assert_eq!(ctx.body, RequestBody::Json(serde_json::json!({ "clientId": "c" })));
}

#[test]
fn retry_counter_saturates() {
    let mut ctx = RequestContext::new(Method::GET, "/");
    for _ in 0..300 {
        ctx = ctx.into_retry();
    }
    assert_eq!(ctx.attempt(), u8::MAX);
}

#[test]
fn clones_have_independent_budgets() {
    let original = RequestContext::new(Method::GET, "/applications");
    let retried = original.clone().into_retry();
    assert!(!original.retried());
    assert!(retried.retried());
}

#[test]
fn csv_part_sets_mime() {
    let part = FilePart::csv("file", "apps.csv", b"a,b\n".to_vec());
    assert_eq!(part.mime, "text/csv");
    assert!(RequestBody::Multipart(vec![part]).is_multipart());
    assert!(!RequestBody::Json(Value::Null).is_multipart());
}
