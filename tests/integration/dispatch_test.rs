//! Dispatch integration tests.
//!
//! Tests renderer selection, server presentation hints and failure handling
//! across full `execute` calls.

use std::sync::Arc;
use std::time::Duration;

use saiku_embed::render::{MemorySurface, RendererRegistry};
use saiku_embed::transport::{MockTransport, TransportFailure};
use saiku_embed::{DispatchOutcome, RenderKind, RenderOverrides, SaikuClient};

use super::common::{result_body, test_settings, Harness};

#[tokio::test]
async fn test_server_mode_overrides_requested_table() {
    let harness = Harness::new(MockTransport::with_body(&result_body(Some("chart"), None)));

    let outcome = harness
        .client
        .execute_and_wait(RenderOverrides::new().file("/r.saiku").render("table"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome::Rendered {
            kind: RenderKind::Chart,
            mode: None
        }
    );
    assert_eq!(harness.rendered(), vec![("chart".to_string(), None)]);
}

#[tokio::test]
async fn test_no_hints_uses_caller_render() {
    for requested in ["table", "chart"] {
        let harness = Harness::new(MockTransport::with_body(&result_body(None, None)));

        harness
            .client
            .execute_and_wait(
                RenderOverrides::new()
                    .file("/r.saiku")
                    .render(requested)
                    .mode("bar"),
            )
            .await
            .unwrap();

        assert_eq!(
            harness.rendered(),
            vec![(requested.to_string(), Some("bar".to_string()))]
        );
    }
}

#[tokio::test]
async fn test_server_submode_overrides_caller_mode() {
    let harness = Harness::new(MockTransport::with_body(&result_body(None, Some("sparkline"))));

    let outcome = harness
        .client
        .execute_and_wait(RenderOverrides::new().mode("sparkbar"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome::Rendered {
            kind: RenderKind::Table,
            mode: Some("sparkline".to_string())
        }
    );
    assert_eq!(
        harness.rendered(),
        vec![("table".to_string(), Some("sparkline".to_string()))]
    );
}

#[tokio::test]
async fn test_unknown_render_kind_alerts_and_renders_nothing() {
    let harness = Harness::new(MockTransport::with_body(&result_body(None, None)));

    let outcome = harness
        .client
        .execute_and_wait(RenderOverrides::new().render("pivot"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        DispatchOutcome::RenderKindUnrecognized {
            kind: RenderKind::from("pivot")
        }
    );
    assert!(harness.rendered().is_empty());
    assert_eq!(harness.surface.alerts(), vec!["Render type pivot not found!"]);
    assert_eq!(harness.surface.text("#saiku"), None);
}

#[tokio::test]
async fn test_server_hint_naming_unknown_kind_is_unrecognized() {
    let harness = Harness::new(MockTransport::with_body(&result_body(Some("map"), None)));

    let outcome = harness
        .client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        DispatchOutcome::RenderKindUnrecognized { ref kind } if kind.as_str() == "map"
    ));
    assert_eq!(harness.surface.alerts(), vec!["Render type map not found!"]);
}

#[tokio::test]
async fn test_unrecognized_kind_does_not_affect_later_calls() {
    let harness = Harness::new(MockTransport::with_body(&result_body(None, None)));

    harness
        .client
        .execute_and_wait(RenderOverrides::new().render("pivot"))
        .await
        .unwrap();
    let outcome = harness
        .client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();

    assert!(outcome.is_rendered());
    assert_eq!(harness.transport.request_count(), 2);
}

#[tokio::test]
async fn test_transport_failure_writes_error_to_mount() {
    let failure = TransportFailure::http_status(401, Some("Unauthorized"), "");
    let harness = Harness::new(MockTransport::failing(failure.clone()));

    let outcome = harness
        .client
        .execute_and_wait(RenderOverrides::new().mount("#panel-body"))
        .await
        .unwrap();

    assert_eq!(outcome, DispatchOutcome::TransportFailed(failure));
    assert_eq!(
        harness.surface.text("#panel-body").as_deref(),
        Some("Error: error")
    );
    assert!(harness.rendered().is_empty());
    assert!(harness.surface.alerts().is_empty());
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let harness = Harness::new(MockTransport::failing(TransportFailure::timeout(
        "operation timed out",
    )));

    let outcome = harness
        .client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();

    assert!(matches!(outcome, DispatchOutcome::TransportFailed(ref f) if f.status_text == "timeout"));
    assert_eq!(harness.surface.text("#saiku").as_deref(), Some("Error: timeout"));
}

#[tokio::test]
async fn test_malformed_json_is_parsererror() {
    let harness = Harness::new(MockTransport::with_body("<html>Login</html>"));

    harness
        .client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();

    assert_eq!(
        harness.surface.text("#saiku").as_deref(),
        Some("Error: parsererror")
    );
}

#[tokio::test]
async fn test_execute_returns_before_response_arrives() {
    let transport = MockTransport::with_body(&result_body(None, None))
        .with_delay(Duration::from_millis(50));
    let harness = Harness::new(transport);

    let handle = harness.client.execute(RenderOverrides::new()).unwrap();
    assert!(harness.rendered().is_empty());

    let outcome = handle.await.unwrap();
    assert!(outcome.is_rendered());
    assert_eq!(harness.rendered().len(), 1);
}

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let harness = Harness::new(MockTransport::with_body(&result_body(None, None)));

    let first = harness
        .client
        .execute(RenderOverrides::new().render("table").mount("#a"))
        .unwrap();
    let second = harness
        .client
        .execute(RenderOverrides::new().render("chart").mount("#b"))
        .unwrap();

    let (first, second) = (first.await.unwrap(), second.await.unwrap());

    assert!(first.is_rendered());
    assert!(second.is_rendered());
    assert_eq!(harness.surface.text("#a").as_deref(), Some("rendered by table"));
    assert_eq!(harness.surface.text("#b").as_deref(), Some("rendered by chart"));
}

#[tokio::test]
async fn test_default_renderers_write_to_mount() {
    let transport = Arc::new(MockTransport::with_body(&result_body(None, None)));
    let surface = Arc::new(MemorySurface::new());
    let client = SaikuClient::with_transport(test_settings(), transport)
        .with_registry(RendererRegistry::with_defaults())
        .with_surface(surface.clone());

    client
        .execute_and_wait(RenderOverrides::new().mount("#table"))
        .await
        .unwrap();
    client
        .execute_and_wait(RenderOverrides::new().render("chart").mount("#chart"))
        .await
        .unwrap();

    let table = surface.text("#table").unwrap();
    assert!(table.contains("│ EU     │ 1,200   │"));
    assert!(table.ends_with("1 row (15ms)"));

    let chart = surface.text("#chart").unwrap();
    assert!(chart.starts_with("sales"));
    assert!(chart.contains("EU │█"));
}

#[tokio::test]
async fn test_server_error_with_null_fields_renders_message() {
    let transport = Arc::new(MockTransport::with_body(
        r#"{"query":null,"error":"MDX syntax error","cellset":null}"#,
    ));
    let surface = Arc::new(MemorySurface::new());
    let client = SaikuClient::with_transport(test_settings(), transport)
        .with_registry(RendererRegistry::with_defaults())
        .with_surface(surface.clone());

    let outcome = client
        .execute_and_wait(RenderOverrides::new())
        .await
        .unwrap();

    assert!(outcome.is_rendered());
    assert_eq!(
        surface.text("#saiku").as_deref(),
        Some("Error: MDX syntax error")
    );
}
