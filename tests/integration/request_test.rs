//! Request construction integration tests.
//!
//! Checks what actually reaches the transport: URL, fields and auth header.

use pretty_assertions::assert_eq;
use saiku_embed::transport::MockTransport;
use saiku_embed::{ConnectionSettings, ParamValue, Params, RenderOverrides, RenderRequest};

use super::common::{result_body, test_settings, Harness};

#[tokio::test]
async fn test_params_are_namespaced() {
    let harness = Harness::new(MockTransport::with_body(&result_body(None, None)));

    harness
        .client
        .execute_and_wait(
            RenderOverrides::new()
                .file("/homes/home:admin/sales.saiku")
                .param("region", "EU")
                .param("year", 2020),
        )
        .await
        .unwrap();

    let request = &harness.transport.requests()[0];
    assert_eq!(request.url, "http://saiku.test/saiku/rest/saiku/embed/export/saiku/json");
    assert_eq!(request.field("paramregion"), Some("EU"));
    assert_eq!(request.field("paramyear"), Some("2020"));
    assert_eq!(request.field("formatter"), Some("flattened"));
    assert_eq!(request.field("file"), Some("/homes/home:admin/sales.saiku"));
    assert_eq!(request.field("region"), None);
    assert_eq!(request.field("year"), None);
    assert_eq!(request.fields.len(), 4);
}

#[tokio::test]
async fn test_admin_credentials_send_basic_auth() {
    let harness = Harness::new(MockTransport::with_body(&result_body(None, None)));

    harness
        .client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();

    assert_eq!(
        harness.transport.requests()[0].authorization.as_deref(),
        Some("Basic YWRtaW46YWRtaW4=")
    );
}

#[tokio::test]
async fn test_empty_password_sends_no_auth() {
    let settings = ConnectionSettings {
        password: String::new(),
        ..test_settings()
    };
    let harness = Harness::with_settings(MockTransport::with_body(&result_body(None, None)), settings);

    let outcome = harness
        .client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();

    assert!(outcome.is_rendered());
    assert_eq!(harness.transport.requests()[0].authorization, None);
}

#[tokio::test]
async fn test_encoding_failure_aborts_before_sending() {
    let settings = ConnectionSettings {
        password: "\u{20ac}uro".to_string(),
        ..test_settings()
    };
    let harness = Harness::with_settings(MockTransport::with_body(&result_body(None, None)), settings);

    let err = harness.client.execute(RenderOverrides::new()).unwrap_err();

    assert_eq!(err.category(), "Encoding Error");
    assert_eq!(harness.transport.request_count(), 0);
    assert!(harness.surface.writes().is_empty());
}

#[tokio::test]
async fn test_default_params_replaced_not_merged() {
    let defaults = RenderRequest {
        params: Params::from([
            ("region".to_string(), ParamValue::from("EU")),
            ("currency".to_string(), ParamValue::from("EUR")),
        ]),
        ..RenderRequest::default()
    };
    let harness = Harness::new(MockTransport::with_body(&result_body(None, None)));
    let client = harness.client.with_render_defaults(defaults);

    client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();
    client
        .execute_and_wait(RenderOverrides::new().param("year", 2021))
        .await
        .unwrap();
    client
        .execute_and_wait(RenderOverrides::new().params(Params::new()))
        .await
        .unwrap();

    let requests = harness.transport.requests();
    let names = |i: usize| -> Vec<String> {
        requests[i].fields.iter().map(|(k, _)| k.clone()).collect()
    };
    assert_eq!(
        names(0),
        vec!["paramcurrency", "paramregion", "formatter", "file"]
    );
    assert_eq!(names(1), vec!["paramyear", "formatter", "file"]);
    assert_eq!(names(2), vec!["formatter", "file"]);
}

#[tokio::test]
async fn test_reconfigure_changes_later_requests() {
    let mut harness = Harness::new(MockTransport::with_body(&result_body(None, None)));

    harness.client.reconfigure(&saiku_embed::ConnectionOverrides {
        server: Some("https://reports.example.com".to_string()),
        path: Some(String::new()),
        user: Some(String::new()),
        ..Default::default()
    });
    harness
        .client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();

    let request = &harness.transport.requests()[0];
    assert_eq!(request.url, "https://reports.example.com/export/saiku/json");
    assert_eq!(request.authorization, None);
}
