use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use url::Url;

use lookout_core::{FeedState, OnlineStatus, PresenceView, PresenceWatch};
use lookout_feed::{BackoffPolicy, FeedClient, FeedConfig};

const INIT_STATE: &str = r#"{"op":0,"seq":1,"t":"INIT_STATE","d":{"discord_status":"online",
    "activities":[],
    "spotify":{"song":"Song","artist":"Artist","track_id":"t1",
               "timestamps":{"start":1000,"end":5000}}}}"#;
const UPDATE_NO_TRACK: &str =
    r#"{"op":0,"seq":2,"t":"PRESENCE_UPDATE","d":{"discord_status":"idle","activities":[]}}"#;

async fn within<F: std::future::Future>(fut: F) -> F::Output {
    timeout(Duration::from_secs(10), fut)
        .await
        .expect("test timed out")
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.expect("accept tcp");
    accept_async(stream).await.expect("websocket handshake")
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text,
            Some(Ok(_)) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

async fn wait_for(presence: &mut PresenceWatch, ready: impl FnMut(&PresenceView) -> bool) {
    within(presence.wait_for(ready))
        .await
        .expect("feed task alive");
}

async fn setup() -> (TcpListener, FeedConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let url = Url::parse(&format!("ws://{addr}/socket")).expect("url");
    let mut config = FeedConfig::new(url, "992171799536218142");
    config.backoff = BackoffPolicy {
        initial: Duration::from_millis(200),
        max: Duration::from_millis(400),
    };
    (listener, config)
}

#[tokio::test]
async fn subscribes_heartbeats_and_keeps_snapshot_across_reconnect() {
    let (listener, config) = setup().await;
    let handle = FeedClient::new(config).spawn();
    let mut presence = handle.watch();

    let mut ws = within(accept(&listener)).await;
    assert_eq!(
        within(next_text(&mut ws)).await,
        r#"{"op":2,"d":{"subscribe_to_id":"992171799536218142"}}"#
    );
    ws.send(Message::Text(r#"{"op":1,"d":{"heartbeat_interval":50}}"#.into()))
        .await
        .expect("send hello");
    ws.send(Message::Text(INIT_STATE.into()))
        .await
        .expect("send init state");

    wait_for(&mut presence, |view| view.feed == FeedState::Receiving).await;
    {
        let view = presence.borrow();
        let snapshot = view.snapshot.as_ref().expect("snapshot");
        assert_eq!(snapshot.status, OnlineStatus::Online);
        assert_eq!(
            snapshot.track.as_ref().map(|t| t.display()),
            Some("Song - Artist".to_owned())
        );
    }

    assert_eq!(within(next_text(&mut ws)).await, r#"{"op":3}"#);

    drop(ws);
    wait_for(&mut presence, |view| view.feed != FeedState::Receiving).await;
    assert!(presence.borrow().snapshot.is_some());

    let mut ws = within(accept(&listener)).await;
    assert!(within(next_text(&mut ws)).await.contains(r#""op":2"#));
    ws.send(Message::Text(UPDATE_NO_TRACK.into()))
        .await
        .expect("send update");

    wait_for(&mut presence, |view| {
        view.snapshot
            .as_ref()
            .is_some_and(|s| s.status == OnlineStatus::Idle)
    })
    .await;
    assert!(presence
        .borrow()
        .snapshot
        .as_ref()
        .is_some_and(|s| s.track.is_none()));

    within(handle.close()).await;
    assert_eq!(presence.borrow().feed, FeedState::Disconnected);
}

#[tokio::test]
async fn malformed_frames_do_not_drop_the_connection() {
    let (listener, config) = setup().await;
    let handle = FeedClient::new(config).spawn();
    let mut presence = handle.watch();

    let mut ws = within(accept(&listener)).await;
    within(next_text(&mut ws)).await;
    ws.send(Message::Text("{".into())).await.expect("send garbage");
    ws.send(Message::Text(r#"{"op":0,"t":"PRESENCE_UPDATE","d":{"discord_status":7}}"#.into()))
        .await
        .expect("send bad payload");
    ws.send(Message::Text(UPDATE_NO_TRACK.into()))
        .await
        .expect("send update");

    wait_for(&mut presence, |view| view.snapshot.is_some()).await;
    assert_eq!(presence.borrow().feed, FeedState::Receiving);

    within(handle.close()).await;
    let closing = within(ws.next()).await;
    assert!(matches!(closing, Some(Ok(Message::Close(_))) | None));
}
