use async_trait::async_trait;
use realtime_relay::{
    ClientSink, Error, OutboundEvent, RelayChannel, Result, SessionController, ToolRegistry,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

struct MockSink {
    outgoing: mpsc::Sender<Vec<Value>>,
}

#[async_trait]
impl ClientSink for MockSink {
    async fn deliver(&self, events: Vec<Value>) -> Result<()> {
        self.outgoing
            .send(events)
            .await
            .map_err(|e| Error::Delivery(e.to_string()))
    }
}

fn controller_with(tools: ToolRegistry) -> (SessionController, mpsc::Receiver<Vec<Value>>) {
    let (out_tx, out_rx) = mpsc::channel(8);
    let relay = RelayChannel::new(Box::new(MockSink { outgoing: out_tx }));
    (SessionController::new(relay, tools), out_rx)
}

#[derive(Deserialize, JsonSchema)]
struct SetModeArgs {
    mode: String,
}

#[tokio::test]
async fn set_mode_round_trip() {
    let modes = Arc::new(Mutex::new(Vec::new()));
    let modes2 = Arc::clone(&modes);
    let mut tools = ToolRegistry::new();
    tools.tool("setMode", move |args: SetModeArgs| {
        let modes2 = Arc::clone(&modes2);
        async move {
            modes2.lock().unwrap().push(args.mode);
            Ok::<_, Error>(())
        }
    });
    let (controller, mut out_rx) = controller_with(tools);

    controller
        .receive(
            r#"{"type":"response.function_call_arguments.done","name":"setMode","arguments":"{\"mode\":\"click\"}"}"#,
        )
        .await;

    assert_eq!(*modes.lock().unwrap(), vec!["click".to_string()]);
    assert!(out_rx.try_recv().is_err(), "no repair message on success");
}

#[tokio::test]
async fn response_lifecycle_subscriber_fires_in_order() {
    let (controller, _out_rx) = controller_with(ToolRegistry::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen2 = Arc::clone(&seen);
    let _handle = controller.on("response.*", move |event| {
        let seen2 = Arc::clone(&seen2);
        async move {
            seen2
                .lock()
                .unwrap()
                .push(event["type"].as_str().unwrap_or("").to_string());
            Ok(())
        }
    });

    controller.receive(r#"{"type":"response.created"}"#).await;
    controller.receive(r#"{"type":"response.done"}"#).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["response.created".to_string(), "response.done".to_string()]
    );
}

#[tokio::test]
async fn unsubscribe_handle_is_independent() {
    let (controller, _out_rx) = controller_with(ToolRegistry::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_a = Arc::clone(&seen);
    let handle = controller.on("response.*", move |_event| {
        let seen_a = Arc::clone(&seen_a);
        async move {
            seen_a.lock().unwrap().push("a");
            Ok(())
        }
    });
    let seen_b = Arc::clone(&seen);
    let _keep = controller.on("response.*", move |_event| {
        let seen_b = Arc::clone(&seen_b);
        async move {
            seen_b.lock().unwrap().push("b");
            Ok(())
        }
    });

    controller.receive(r#"{"type":"response.created"}"#).await;
    handle.unsubscribe();
    controller.receive(r#"{"type":"response.done"}"#).await;

    assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "b"]);
}

#[tokio::test]
async fn send_text_produces_message_then_trigger() {
    let (controller, mut out_rx) = controller_with(ToolRegistry::new());

    controller.send_text("hello", true).await.unwrap();

    let batch = out_rx.recv().await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["type"], "conversation.item.create");
    assert_eq!(batch[0]["item"]["content"][0]["text"], "hello");
    assert_eq!(batch[1], json!({"type": "response.create"}));
    assert!(out_rx.try_recv().is_err(), "exactly one batched push");
}

#[tokio::test]
async fn send_forwards_arbitrary_envelopes() {
    let (controller, mut out_rx) = controller_with(ToolRegistry::new());

    controller
        .send(&[
            OutboundEvent::user_message("first"),
            OutboundEvent::user_message("second"),
        ])
        .await
        .unwrap();

    let batch = out_rx.recv().await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["item"]["content"][0]["text"], "first");
    assert_eq!(batch[1]["item"]["content"][0]["text"], "second");
}

#[tokio::test]
async fn transcript_deltas_reach_global_subscribers() {
    let (controller, _out_rx) = controller_with(ToolRegistry::new());
    let count = Arc::new(Mutex::new(0usize));
    let count2 = Arc::clone(&count);
    let _handle = controller.on("*", move |_event| {
        let count2 = Arc::clone(&count2);
        async move {
            *count2.lock().unwrap() += 1;
            Ok(())
        }
    });

    controller
        .receive(r#"{"type":"response.output_audio_transcript.delta","delta":"he"}"#)
        .await;
    controller
        .receive(r#"{"type":"response.output_audio_transcript.delta","delta":"llo"}"#)
        .await;
    controller.receive(r#"{"type":"response.done"}"#).await;

    assert_eq!(*count.lock().unwrap(), 3);
}

#[tokio::test]
async fn dead_sink_does_not_fault_the_session() {
    let (controller, out_rx) = controller_with(ToolRegistry::new());
    // Every delivery now fails; repair messages have nowhere to go.
    drop(out_rx);

    controller.receive("not-json").await;
    controller
        .receive(
            r#"{"type":"response.function_call_arguments.done","name":"nope","arguments":"{}"}"#,
        )
        .await;

    // The session stays usable: later events still reach subscribers.
    let count = Arc::new(Mutex::new(0usize));
    let count2 = Arc::clone(&count);
    let _handle = controller.on("*", move |_event| {
        let count2 = Arc::clone(&count2);
        async move {
            *count2.lock().unwrap() += 1;
            Ok(())
        }
    });
    controller.receive(r#"{"type":"response.done"}"#).await;

    assert_eq!(*count.lock().unwrap(), 1);
    let current = controller.current_event().unwrap();
    assert_eq!(current["type"], "response.done");
}

#[tokio::test]
async fn current_event_is_overwritten_not_queued() {
    let (controller, _out_rx) = controller_with(ToolRegistry::new());

    controller
        .receive(r#"{"type":"response.created","seq":1}"#)
        .await;
    controller
        .receive(r#"{"type":"response.done","seq":2}"#)
        .await;

    let current = controller.current_event().unwrap();
    assert_eq!(current["seq"], 2);
}
