//! End-to-end session tests against a mocked generation service
//!
//! These exercise the full path the TUI uses: HTTP client, tree
//! conversion, history, and the session controller, with wiremock
//! standing in for the generation service.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mindmapper::config::Config;
use mindmapper::error::{Error, GenerationError};
use mindmapper::generation::HttpGenerationClient;
use mindmapper::session::{NodeActivation, SessionController};

fn test_config(base_url: &str) -> Config {
    Config {
        service_base_url: base_url.to_string(),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

fn controller_for(
    config: &Config,
) -> SessionController<HttpGenerationClient> {
    let client = HttpGenerationClient::new(config).unwrap();
    let (controller, _events) = SessionController::new(client);
    controller
}

/// Mount the volcano fixtures: a full map for "volcanoes", a refinement
/// for the Types context, and a sub-map for the refined prompt.
async fn mount_volcano_service(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({"message": "volcanoes"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "root": {
                "content": "Volcanoes",
                "children": [
                    {"content": "Types", "description": "Kinds of volcano", "children": []},
                    {"content": "Eruptions", "children": []},
                ]
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/refine-prompt"))
        .and(body_json(json!({"prompt": "Volcanoes > Types"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("  Explain the types of volcanoes \n"),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({"message": "Explain the types of volcanoes"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "root": {
                "content": "Types",
                "children": [
                    {"content": "Shield", "children": []},
                    {"content": "Stratovolcano", "children": []},
                ]
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_submit_then_drill_down() {
    let server = MockServer::start().await;
    mount_volcano_service(&server).await;

    let config = test_config(&server.uri());
    let controller = controller_for(&config);

    controller.submit("volcanoes").await.unwrap();

    let view = controller.view().await;
    assert_eq!(view.history_len, 1);
    assert_eq!(view.tree.as_ref().unwrap().root.label, "Volcanoes");
    assert!(!view.can_go_back);

    // Drill into "Types": the context path is refined into a new prompt
    // and a sub-map is generated from it.
    controller
        .activate(NodeActivation::drill_down("Types", None))
        .await
        .unwrap();

    let view = controller.view().await;
    assert_eq!(view.history_len, 2);
    assert_eq!(view.current_input, "Explain the types of volcanoes");
    let tree = view.tree.unwrap();
    assert_eq!(tree.root.label, "Types");
    assert_eq!(tree.root.children.len(), 2);
    assert!(view.can_go_back);
    assert!(!view.can_go_forward);
}

#[tokio::test]
async fn test_back_and_forward_across_generated_maps() {
    let server = MockServer::start().await;
    mount_volcano_service(&server).await;

    let config = test_config(&server.uri());
    let controller = controller_for(&config);

    controller.submit("volcanoes").await.unwrap();
    controller
        .activate(NodeActivation::drill_down("Types", None))
        .await
        .unwrap();

    assert!(controller.back().await);
    let view = controller.view().await;
    assert_eq!(view.tree.as_ref().unwrap().root.label, "Volcanoes");
    assert_eq!(view.current_input, "volcanoes");

    // At the first snapshot, back is a no-op
    assert!(!controller.back().await);

    assert!(controller.forward().await);
    let view = controller.view().await;
    assert_eq!(view.tree.as_ref().unwrap().root.label, "Types");
    assert_eq!(view.current_input, "Explain the types of volcanoes");

    // At the last snapshot, forward is a no-op
    assert!(!controller.forward().await);
}

#[tokio::test]
async fn test_unknown_label_falls_back_without_refinement() {
    let server = MockServer::start().await;
    mount_volcano_service(&server).await;

    // The fallback prompt is the activation's label itself
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({"message": "Geysers"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "root": {"content": "Geysers", "children": []}
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let controller = controller_for(&config);

    controller.submit("volcanoes").await.unwrap();
    controller
        .activate(NodeActivation::drill_down("Geysers", None))
        .await
        .unwrap();

    let view = controller.view().await;
    assert_eq!(view.history_len, 2);
    assert_eq!(view.current_input, "Geysers");
    assert_eq!(view.tree.unwrap().root.label, "Geysers");
}

#[tokio::test]
async fn test_service_failure_leaves_session_intact() {
    let server = MockServer::start().await;
    mount_volcano_service(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({"message": "earthquakes"})))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let controller = controller_for(&config);

    controller.submit("volcanoes").await.unwrap();

    let err = controller.submit("earthquakes").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Generation(GenerationError::Service(_))
    ));

    // The failed generation left no trace: same snapshot, same input,
    // and the session accepts new submissions.
    let view = controller.view().await;
    assert_eq!(view.history_len, 1);
    assert_eq!(view.current_input, "volcanoes");
    assert!(!view.pending);

    controller
        .activate(NodeActivation::drill_down("Types", None))
        .await
        .unwrap();
    assert_eq!(controller.view().await.history_len, 2);
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Port 1 is essentially never listening
    let config = test_config("http://127.0.0.1:1");
    let controller = controller_for(&config);

    let err = controller.submit("volcanoes").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Generation(GenerationError::Network(_))
    ));
    assert_eq!(controller.view().await.history_len, 0);
}

#[tokio::test]
async fn test_malformed_service_payload_is_rejected() {
    let server = MockServer::start().await;

    // Valid JSON, valid `root`, but the nested child is missing `content`
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "root": {
                "content": "Volcanoes",
                "children": [{"description": "orphan", "children": []}]
            }
        })))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let controller = controller_for(&config);

    let err = controller.submit("volcanoes").await.unwrap_err();
    assert!(matches!(err, Error::Shape(_)));
    assert_eq!(controller.view().await.history_len, 0);
}
