//! Session controller - the state machine behind the map explorer
//!
//! Owns tree versions, the current input text, and the pending-request
//! guard, and orchestrates user actions into tree/history/generation
//! calls. All session mutation flows through the operations here; the
//! presentation layer reads a [`SessionView`] per frame and listens on
//! the [`SessionEvent`] channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SessionError};
use crate::generation::GenerationClient;
use crate::history::{HistoryStore, Snapshot};
use crate::session::types::{NodeActivation, SessionEvent, SessionView};
use crate::tree::{self, Tree};

/// Mutable session state behind the controller's lock
struct SessionState {
    current_input: String,
    history: HistoryStore,
}

/// RAII claim on the single in-flight generation slot.
///
/// Dropping the guard releases the slot, so an aborted generation task
/// can never leave the session stuck in a pending state.
struct PendingGuard {
    flag: Arc<AtomicBool>,
}

impl PendingGuard {
    fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Session controller
///
/// Generic over the generation client so tests can substitute a stub.
/// Methods take `&self`; the controller is shared behind an `Arc` with
/// whatever drives it.
pub struct SessionController<C> {
    client: C,
    state: RwLock<SessionState>,
    pending: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<C: GenerationClient> SessionController<C> {
    /// Create a controller with an empty session.
    ///
    /// Returns the receiving end of the event channel; the caller decides
    /// who observes it.
    pub fn new(client: C) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            client,
            state: RwLock::new(SessionState {
                current_input: String::new(),
                history: HistoryStore::new(),
            }),
            pending: Arc::new(AtomicBool::new(false)),
            events,
        };
        (controller, rx)
    }

    /// Whether a generation request is in flight
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Take a read-only view of the session for rendering
    pub async fn view(&self) -> SessionView {
        let state = self.state.read().await;
        let current = state.history.current();
        SessionView {
            tree: current.map(|s| Arc::clone(&s.tree)),
            current_input: state.current_input.clone(),
            pending: self.is_pending(),
            can_go_back: state.history.can_go_back(),
            can_go_forward: state.history.can_go_forward(),
            history_len: state.history.len(),
            history_position: state.history.position(),
            generated_at: current.map(|s| s.created_at),
        }
    }

    /// Submit a prompt for full generation.
    ///
    /// Rejected with [`SessionError::RequestInFlight`] while another
    /// request is pending - at most one generation is in flight, and a
    /// second submission is refused, not queued. On failure, history and
    /// the current input are left untouched and the error surfaces to the
    /// caller; the pending flag is released on every exit path.
    #[instrument(skip(self, prompt))]
    pub async fn submit(&self, prompt: &str) -> Result<()> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt.into());
        }

        let guard = self.claim_pending()?;
        self.generate_into_history(guard, prompt.to_string()).await
    }

    /// Handle a node activation from the renderer.
    ///
    /// A no-op unless the activation is a drill-down gesture. When the
    /// label resolves in the current tree, the ancestor context string is
    /// sent to the refinement endpoint and the refined text becomes the
    /// new prompt; when it does not (or no tree exists yet), the node's
    /// description - or its label, when it has none - is used directly.
    /// Either branch then proceeds exactly as [`submit`](Self::submit).
    #[instrument(skip(self, activation), fields(label = %activation.label))]
    pub async fn activate(&self, activation: NodeActivation) -> Result<()> {
        if !activation.drill_down {
            debug!("ignoring non-drill-down activation");
            return Ok(());
        }

        // Claimed before the refinement suspension point: the guard
        // covers the whole drill-down, not just the generate call.
        let guard = self.claim_pending()?;

        let context = {
            let state = self.state.read().await;
            state.history.current().and_then(|snapshot| {
                tree::path_to(&snapshot.tree, &activation.label)
                    .map(|path| tree::context_string(&path))
            })
        };

        let prompt = match context {
            Some(context) => {
                debug!(%context, "drilling down via refined context");
                match self.client.refine_prompt(&context).await {
                    Ok(refined) => refined,
                    Err(e) => {
                        warn!(error = %e, "prompt refinement failed");
                        self.notify(SessionEvent::GenerationFailed {
                            message: e.to_string(),
                        });
                        return Err(e.into());
                    }
                }
            }
            None => {
                // Unresolvable label: ground the new map in the node's
                // own text instead of failing the gesture.
                debug!("label not in current tree, using fallback prompt");
                activation
                    .description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or(activation.label)
            }
        };

        self.generate_into_history(guard, prompt).await
    }

    /// Step back in history. No-op at the first snapshot; returns whether
    /// the pointer moved. On success the current input is restored from
    /// the snapshot's source prompt, so subsequent edits continue from
    /// the restored context.
    pub async fn back(&self) -> bool {
        let mut state = self.state.write().await;
        if !state.history.back() {
            return false;
        }
        self.restore_input(&mut state);
        true
    }

    /// Step forward in history. No-op at the last snapshot; returns
    /// whether the pointer moved.
    pub async fn forward(&self) -> bool {
        let mut state = self.state.write().await;
        if !state.history.forward() {
            return false;
        }
        self.restore_input(&mut state);
        true
    }

    fn restore_input(&self, state: &mut SessionState) {
        if let Some(snapshot) = state.history.current() {
            state.current_input = snapshot.source_input.clone();
        }
        if let Some(position) = state.history.position() {
            self.notify(SessionEvent::HistoryMoved { position });
        }
    }

    fn claim_pending(&self) -> Result<PendingGuard> {
        match PendingGuard::claim(&self.pending) {
            Some(guard) => Ok(guard),
            None => {
                debug!("submission rejected, request already in flight");
                self.notify(SessionEvent::SubmissionRejected);
                Err(SessionError::RequestInFlight.into())
            }
        }
    }

    /// Run one generation and record the result.
    ///
    /// The snapshot is pushed only after the response resolves and
    /// converts cleanly - no partial entry ever reaches history.
    async fn generate_into_history(&self, guard: PendingGuard, prompt: String) -> Result<()> {
        self.notify(SessionEvent::GenerationStarted {
            prompt: prompt.clone(),
        });

        let raw = match self.client.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "generation failed");
                self.notify(SessionEvent::GenerationFailed {
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let tree = match Tree::from_raw(&raw) {
            Ok(tree) => Arc::new(tree),
            Err(e) => {
                warn!(error = %e, "generation returned a malformed tree");
                self.notify(SessionEvent::GenerationFailed {
                    message: e.to_string(),
                });
                return Err(e.into());
            }
        };

        let node_count = tree.node_count();
        {
            let mut state = self.state.write().await;
            state.history.push(Snapshot::new(tree, prompt.clone()));
            state.current_input = prompt.clone();
        }

        // Release the slot before observers hear about the update.
        drop(guard);

        info!(node_count, "tree updated");
        self.notify(SessionEvent::TreeUpdated {
            source_input: prompt,
            node_count,
        });
        Ok(())
    }

    fn notify(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::Notify;

    use crate::error::{Error, GenerationError};
    use crate::generation::GenerationResult;

    /// Scriptable stub client.
    ///
    /// Responses are popped front-to-back; prompts and contexts are
    /// recorded for assertions. When a gate is set, `generate` signals
    /// `entered` and blocks until `release` fires.
    #[derive(Default)]
    struct StubClient {
        generate_results: Mutex<VecDeque<GenerationResult<Value>>>,
        refine_results: Mutex<VecDeque<GenerationResult<String>>>,
        generate_prompts: Mutex<Vec<String>>,
        refine_contexts: Mutex<Vec<String>>,
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl StubClient {
        fn with_trees(trees: Vec<Value>) -> Self {
            Self {
                generate_results: Mutex::new(trees.into_iter().map(Ok).collect()),
                ..Default::default()
            }
        }

        fn push_refinement(self, refined: GenerationResult<String>) -> Self {
            self.refine_results.lock().unwrap().push_back(refined);
            self
        }

        fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
            self.gate = Some((entered, release));
            self
        }

        fn recorded_prompts(&self) -> Vec<String> {
            self.generate_prompts.lock().unwrap().clone()
        }

        fn recorded_contexts(&self) -> Vec<String> {
            self.refine_contexts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationClient for StubClient {
        async fn generate(&self, prompt: &str) -> GenerationResult<Value> {
            self.generate_prompts.lock().unwrap().push(prompt.to_string());
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            self.generate_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Service("unscripted call".into())))
        }

        async fn refine_prompt(&self, context: &str) -> GenerationResult<String> {
            self.refine_contexts.lock().unwrap().push(context.to_string());
            self.refine_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Service("unscripted call".into())))
        }
    }

    fn volcano_tree() -> Value {
        json!({
            "content": "Volcanoes",
            "children": [
                {"content": "Types", "description": "Kinds of volcano", "children": []},
            ]
        })
    }

    fn types_tree() -> Value {
        json!({
            "content": "Types",
            "children": [
                {"content": "Shield", "children": []},
                {"content": "Stratovolcano", "children": []},
            ]
        })
    }

    #[tokio::test]
    async fn test_submit_records_snapshot() {
        let (controller, _rx) =
            SessionController::new(StubClient::with_trees(vec![volcano_tree()]));

        controller.submit("volcanoes").await.unwrap();

        let view = controller.view().await;
        assert_eq!(view.history_len, 1);
        assert_eq!(view.current_input, "volcanoes");
        assert!(!view.pending);
        assert_eq!(view.tree.unwrap().root.label, "Volcanoes");
        assert!(view.generated_at.is_some());
    }

    #[tokio::test]
    async fn test_submit_trims_prompt() {
        let (controller, _rx) =
            SessionController::new(StubClient::with_trees(vec![volcano_tree()]));

        controller.submit("  volcanoes \n").await.unwrap();

        let view = controller.view().await;
        assert_eq!(view.current_input, "volcanoes");
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let (controller, _rx) = SessionController::new(StubClient::default());

        let err = controller.submit("   ").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::EmptyPrompt)
        ));
        assert_eq!(controller.view().await.history_len, 0);
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_state_untouched() {
        let stub = StubClient {
            generate_results: Mutex::new(VecDeque::from([Err(GenerationError::Service(
                "status 500".into(),
            ))])),
            ..Default::default()
        };
        let (controller, _rx) = SessionController::new(stub);

        let err = controller.submit("volcanoes").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));

        let view = controller.view().await;
        assert_eq!(view.history_len, 0);
        assert_eq!(view.current_input, "");
        assert!(!view.pending);
    }

    #[tokio::test]
    async fn test_malformed_tree_is_not_recorded() {
        let stub = StubClient::with_trees(vec![json!({"content": "x", "children": 42})]);
        let (controller, _rx) = SessionController::new(stub);

        let err = controller.submit("volcanoes").await.unwrap_err();
        assert!(matches!(err, Error::Shape(_)));

        let view = controller.view().await;
        assert_eq!(view.history_len, 0);
        assert!(!view.pending);
    }

    #[tokio::test]
    async fn test_submit_rejected_while_pending() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let stub = StubClient::with_trees(vec![volcano_tree()])
            .gated(Arc::clone(&entered), Arc::clone(&release));
        let (controller, _rx) = SessionController::new(stub);
        let controller = Arc::new(controller);

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.submit("volcanoes").await })
        };

        // Wait until the first request is inside the client call
        entered.notified().await;
        assert!(controller.is_pending());

        let err = controller.submit("earthquakes").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Session(SessionError::RequestInFlight)
        ));

        release.notify_one();
        first.await.unwrap().unwrap();

        let view = controller.view().await;
        assert_eq!(view.history_len, 1);
        assert_eq!(view.current_input, "volcanoes");
        assert!(!view.pending);
    }

    #[tokio::test]
    async fn test_drill_down_refines_context_and_submits() {
        let stub = StubClient::with_trees(vec![volcano_tree(), types_tree()])
            .push_refinement(Ok("Explain the types of volcanoes".to_string()));
        let (controller, _rx) = SessionController::new(stub);

        controller.submit("volcanoes").await.unwrap();
        controller
            .activate(NodeActivation::drill_down("Types", None))
            .await
            .unwrap();

        let view = controller.view().await;
        assert_eq!(view.history_len, 2);
        assert_eq!(view.current_input, "Explain the types of volcanoes");
        assert_eq!(view.tree.unwrap().root.label, "Types");

        assert_eq!(
            controller.client.recorded_contexts(),
            vec!["Volcanoes > Types"]
        );
        assert_eq!(
            controller.client.recorded_prompts(),
            vec!["volcanoes", "Explain the types of volcanoes"]
        );
    }

    #[tokio::test]
    async fn test_non_drill_down_activation_is_noop() {
        let (controller, _rx) =
            SessionController::new(StubClient::with_trees(vec![volcano_tree()]));

        controller.submit("volcanoes").await.unwrap();
        controller
            .activate(NodeActivation::inspect("Types"))
            .await
            .unwrap();

        let view = controller.view().await;
        assert_eq!(view.history_len, 1);
        assert!(controller.client.recorded_contexts().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_label_falls_back_to_label() {
        let stub = StubClient::with_trees(vec![volcano_tree(), types_tree()]);
        let (controller, _rx) = SessionController::new(stub);

        controller.submit("volcanoes").await.unwrap();
        controller
            .activate(NodeActivation::drill_down("NoSuchLabel", None))
            .await
            .unwrap();

        let view = controller.view().await;
        assert_eq!(view.history_len, 2);
        assert_eq!(view.current_input, "NoSuchLabel");
        // The refinement endpoint is never consulted on the fallback path
        assert!(controller.client.recorded_contexts().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_label_prefers_description() {
        let stub = StubClient::with_trees(vec![volcano_tree(), types_tree()]);
        let (controller, _rx) = SessionController::new(stub);

        controller.submit("volcanoes").await.unwrap();
        controller
            .activate(NodeActivation::drill_down(
                "NoSuchLabel",
                Some("All about lava flows".to_string()),
            ))
            .await
            .unwrap();

        assert_eq!(controller.view().await.current_input, "All about lava flows");
    }

    #[tokio::test]
    async fn test_drill_down_before_first_generation_uses_fallback() {
        let stub = StubClient::with_trees(vec![volcano_tree()]);
        let (controller, _rx) = SessionController::new(stub);

        controller
            .activate(NodeActivation::drill_down("Volcanoes", None))
            .await
            .unwrap();

        let view = controller.view().await;
        assert_eq!(view.history_len, 1);
        assert!(controller.client.recorded_contexts().is_empty());
    }

    #[tokio::test]
    async fn test_refinement_failure_preserves_history() {
        let stub = StubClient::with_trees(vec![volcano_tree(), types_tree()])
            .push_refinement(Err(GenerationError::Network("connection reset".into())));
        let (controller, _rx) = SessionController::new(stub);

        controller.submit("volcanoes").await.unwrap();
        let err = controller
            .activate(NodeActivation::drill_down("Types", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));

        let view = controller.view().await;
        assert_eq!(view.history_len, 1);
        assert_eq!(view.current_input, "volcanoes");
        assert!(!view.pending);
    }

    #[tokio::test]
    async fn test_back_forward_restore_input() {
        let stub = StubClient::with_trees(vec![volcano_tree(), types_tree()]);
        let (controller, _rx) = SessionController::new(stub);

        controller.submit("volcanoes").await.unwrap();
        controller.submit("volcano types").await.unwrap();

        assert!(controller.back().await);
        let view = controller.view().await;
        assert_eq!(view.current_input, "volcanoes");
        assert_eq!(view.tree.unwrap().root.label, "Volcanoes");

        // Already at the first snapshot
        assert!(!controller.back().await);

        assert!(controller.forward().await);
        let view = controller.view().await;
        assert_eq!(view.current_input, "volcano types");

        // Already at the last snapshot
        assert!(!controller.forward().await);
    }

    #[tokio::test]
    async fn test_events_for_successful_submit() {
        let (controller, mut rx) =
            SessionController::new(StubClient::with_trees(vec![volcano_tree()]));

        controller.submit("volcanoes").await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::GenerationStarted { .. })
        ));
        match rx.recv().await {
            Some(SessionEvent::TreeUpdated {
                source_input,
                node_count,
            }) => {
                assert_eq!(source_input, "volcanoes");
                assert_eq!(node_count, 2);
            }
            other => panic!("expected TreeUpdated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_events_for_failed_submit() {
        let stub = StubClient {
            generate_results: Mutex::new(VecDeque::from([Err(GenerationError::Network(
                "timed out".into(),
            ))])),
            ..Default::default()
        };
        let (controller, mut rx) = SessionController::new(stub);

        let _ = controller.submit("volcanoes").await;

        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::GenerationStarted { .. })
        ));
        match rx.recv().await {
            Some(SessionEvent::GenerationFailed { message }) => {
                assert!(message.contains("timed out"));
            }
            other => panic!("expected GenerationFailed, got {other:?}"),
        }
    }
}
