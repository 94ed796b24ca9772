/// OBS session listener.
///
/// Holds one WebSocket connection to OBS, forwards recording events to the
/// mover in arrival order, and reconnects with exponential backoff (1s,
/// doubling, capped at 30s) whenever the connection drops.
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::protocol::{self, Envelope, EventPayload, Hello};
use crate::config::Config;
use crate::error::ConnectionError;
use crate::event::MoverEvent;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection parameters and retry schedule.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub host: String,
    pub port: u16,
    /// `None` when OBS authentication is disabled.
    pub password: Option<String>,
    /// Delay before the first retry after a failed attempt.
    pub retry_initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub retry_max_delay: Duration,
    /// Factor applied to the delay after each failed attempt.
    pub retry_multiplier: f64,
    /// Upper bound on one connection attempt including the handshake.
    pub connect_timeout: Duration,
}

impl ListenerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            password: (!config.password.is_empty()).then(|| config.password.clone()),
            ..Self::default()
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: crate::config::DEFAULT_HOST.to_string(),
            port: crate::config::DEFAULT_PORT,
            password: None,
            retry_initial_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(30),
            retry_multiplier: 2.0,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// An identified connection to OBS, ready to receive events.
pub struct Session {
    ws: WsStream,
}

/// Why a session stopped pumping.
enum SessionEnd {
    /// OBS went away; reconnect.
    Disconnected,
    /// Shutdown requested or the mover stopped listening.
    Shutdown,
}

pub struct SessionListener {
    config: ListenerConfig,
    tx: mpsc::Sender<MoverEvent>,
    shutdown: watch::Receiver<bool>,
}

impl SessionListener {
    pub fn new(
        config: ListenerConfig,
        tx: mpsc::Sender<MoverEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            tx,
            shutdown,
        }
    }

    /// One connection attempt including the Hello/Identify handshake, bounded
    /// by `connect_timeout`.
    pub async fn connect(&self) -> Result<Session, ConnectionError> {
        let url = self.config.url();
        debug!(url = %url, "Connecting to OBS WebSocket");
        let attempt = async {
            let (mut ws, _) = connect_async(url.as_str())
                .await
                .map_err(|source| ConnectionError::Connect {
                    url: url.clone(),
                    source,
                })?;
            handshake(&mut ws, self.config.password.as_deref()).await?;
            Ok::<_, ConnectionError>(Session { ws })
        };
        let outcome = timeout(self.config.connect_timeout, attempt).await;
        match outcome {
            Ok(result) => result,
            Err(_) => Err(ConnectionError::Timeout {
                url,
                after: self.config.connect_timeout,
            }),
        }
    }

    /// First connection at startup.
    ///
    /// An endpoint that has never worked fails on the first error. A `known`
    /// endpoint is waited for with the usual backoff. A rejected password
    /// fails either way.
    pub async fn connect_at_startup(&mut self, known: bool) -> Result<Session, ConnectionError> {
        match self.connect().await {
            Ok(session) => Ok(session),
            Err(e) if e.is_permanent() || !known => Err(e),
            Err(e) => {
                warn!(error = %e, url = %self.config.url(), "Waiting for OBS");
                self.retry(true).await
            }
        }
    }

    /// Connects, retrying with exponential backoff until it succeeds.
    ///
    /// Only returns an error when shutdown is requested.
    pub async fn connect_with_retry(&mut self) -> Result<Session, ConnectionError> {
        self.retry(false).await
    }

    /// Backoff loop. With `stop_on_permanent`, errors that retrying cannot fix
    /// are returned instead of retried.
    async fn retry(&mut self, stop_on_permanent: bool) -> Result<Session, ConnectionError> {
        let mut delay = self.config.retry_initial_delay;
        let mut attempt = 0u32;
        let mut last_error: Option<String> = None;

        loop {
            if self.is_shutting_down() {
                return Err(ConnectionError::Cancelled);
            }
            attempt = attempt.saturating_add(1);

            match self.connect().await {
                Ok(session) => {
                    debug!(attempt, "Connection successful");
                    return Ok(session);
                }
                Err(e) if stop_on_permanent && e.is_permanent() => return Err(e),
                Err(e) => {
                    report_failure(&mut last_error, attempt, &e);
                }
            }

            tokio::select! {
                _ = sleep(delay) => {
                    let next_ms = (delay.as_millis() as f64 * self.config.retry_multiplier) as u64;
                    delay = Duration::from_millis(next_ms).min(self.config.retry_max_delay);
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Connection retry cancelled");
                        return Err(ConnectionError::Cancelled);
                    }
                }
            }
        }
    }

    /// Pumps events from `session` until shutdown, reconnecting whenever OBS
    /// drops the connection.
    pub async fn run(mut self, session: Session) {
        let mut ws = session.ws;
        info!("Listening to OBS events");

        loop {
            match self.pump(&mut ws).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Disconnected) => warn!("OBS closed the connection"),
                Err(e) => warn!(error = %e, "Connection to OBS lost"),
            }

            match self.connect_with_retry().await {
                Ok(session) => {
                    info!("Reconnected to OBS");
                    ws = session.ws;
                }
                Err(_) => break,
            }
        }

        info!("OBS listener stopped");
    }

    async fn pump(&mut self, ws: &mut WsStream) -> Result<SessionEnd, ConnectionError> {
        loop {
            if self.is_shutting_down() {
                let _ = ws.close(None).await;
                return Ok(SessionEnd::Shutdown);
            }

            let msg = tokio::select! {
                msg = ws.next() => msg,
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        let _ = ws.close(None).await;
                        return Ok(SessionEnd::Shutdown);
                    }
                    continue;
                }
            };

            let text = match msg {
                None => return Ok(SessionEnd::Disconnected),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Binary(bin))) => String::from_utf8_lossy(&bin).into_owned(),
                Some(Ok(Message::Close(frame))) => {
                    debug!(frame = ?frame, "Close frame from OBS");
                    return Ok(SessionEnd::Disconnected);
                }
                Some(Ok(_)) => continue,
            };

            if !self.handle_text(&text).await {
                return Ok(SessionEnd::Shutdown);
            }
        }
    }

    /// Forwards a recording event, if `text` is one. Returns `false` once the
    /// mover has stopped receiving.
    async fn handle_text(&self, text: &str) -> bool {
        let envelope: Envelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                // Don't disconnect on a single bad message.
                warn!(error = %e, "Failed to parse message from OBS");
                return true;
            }
        };
        if envelope.op != protocol::OP_EVENT {
            return true;
        }
        let payload: EventPayload = match serde_json::from_value(envelope.d) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Malformed event from OBS");
                return true;
            }
        };

        match protocol::decode_event(&payload) {
            Some(event) => {
                debug!(event = ?event, "Recording event");
                self.tx.send(MoverEvent::Recording(event)).await.is_ok()
            }
            None => true,
        }
    }

    fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Logs a failed attempt. Only a new kind of failure is logged above debug
/// level; returns whether it was.
fn report_failure(last_error: &mut Option<String>, attempt: u32, e: &ConnectionError) -> bool {
    let message = e.to_string();
    let repeated = last_error.as_deref() == Some(message.as_str());
    if repeated {
        debug!(attempt, error = %e, "Connection attempt failed");
    } else if e.is_permanent() {
        error!(error = %e, "OBS refused the connection; will keep retrying");
    } else {
        warn!(error = %e, "OBS not reachable, waiting for it to become available");
    }
    *last_error = Some(message);
    !repeated
}

async fn handshake(ws: &mut WsStream, password: Option<&str>) -> Result<(), ConnectionError> {
    let hello = next_envelope(ws).await?;
    if hello.op != protocol::OP_HELLO {
        return Err(ConnectionError::Handshake(format!(
            "expected Hello, got op {}",
            hello.op
        )));
    }
    let hello: Hello = serde_json::from_value(hello.d)?;
    debug!(
        obs_websocket_version = hello.obs_web_socket_version.as_deref().unwrap_or("unknown"),
        rpc_version = hello.rpc_version,
        auth_required = hello.authentication.is_some(),
        "Received Hello"
    );

    let auth = hello
        .authentication
        .as_ref()
        .map(|challenge| protocol::auth_response(password.unwrap_or_default(), challenge));
    ws.send(Message::Text(protocol::identify_message(auth.as_deref())))
        .await?;

    let identified = next_envelope(ws).await?;
    if identified.op != protocol::OP_IDENTIFIED {
        return Err(ConnectionError::Handshake(format!(
            "expected Identified, got op {}",
            identified.op
        )));
    }
    Ok(())
}

/// Reads the next JSON message, mapping a close frame to the matching error.
async fn next_envelope(ws: &mut WsStream) -> Result<Envelope, ConnectionError> {
    while let Some(msg) = ws.next().await {
        match msg? {
            Message::Text(text) => return Ok(serde_json::from_str(&text)?),
            Message::Binary(bin) => return Ok(serde_json::from_slice(&bin)?),
            Message::Close(Some(frame))
                if u16::from(frame.code) == protocol::CLOSE_AUTHENTICATION_FAILED =>
            {
                return Err(ConnectionError::Authentication);
            }
            Message::Close(frame) => {
                let reason = frame
                    .map(|f| format!("{} {}", u16::from(f.code), f.reason))
                    .unwrap_or_else(|| "no reason given".to_string());
                return Err(ConnectionError::Closed(reason));
            }
            _ => {}
        }
    }
    Err(ConnectionError::Closed("connection ended".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RecordingEvent;
    use crate::obs::protocol::AuthChallenge;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tokio::net::TcpListener;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::{accept_async, WebSocketStream};

    const PATIENCE: Duration = Duration::from_secs(5);

    type ServerWs = WebSocketStream<TcpStream>;

    fn test_config(port: u16, password: Option<&str>) -> ListenerConfig {
        ListenerConfig {
            host: "127.0.0.1".to_string(),
            port,
            password: password.map(str::to_string),
            retry_initial_delay: Duration::from_millis(10),
            retry_max_delay: Duration::from_millis(50),
            retry_multiplier: 2.0,
            connect_timeout: Duration::from_secs(2),
        }
    }

    fn stopped(path: &str) -> Value {
        json!({
            "op": 5,
            "d": {
                "eventType": "RecordStateChanged",
                "eventIntent": 64,
                "eventData": {
                    "outputActive": false,
                    "outputState": "OBS_WEBSOCKET_OUTPUT_STOPPED",
                    "outputPath": path
                }
            }
        })
    }

    fn started(path: &str) -> Value {
        json!({
            "op": 5,
            "d": {
                "eventType": "RecordStateChanged",
                "eventIntent": 64,
                "eventData": {
                    "outputActive": true,
                    "outputState": "OBS_WEBSOCKET_OUTPUT_STARTED",
                    "outputPath": path
                }
            }
        })
    }

    async fn send_json(ws: &mut ServerWs, value: Value) {
        ws.send(Message::Text(value.to_string())).await.unwrap();
    }

    /// Plays OBS's side of the handshake. Returns the Identify payload.
    async fn serve_handshake(
        listener: &TcpListener,
        challenge: Option<(&str, &str)>,
    ) -> (ServerWs, Value) {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let mut hello = json!({"op": 0, "d": {"obsWebSocketVersion": "5.4.2", "rpcVersion": 1}});
        if let Some((challenge, salt)) = challenge {
            hello["d"]["authentication"] = json!({"challenge": challenge, "salt": salt});
        }
        send_json(&mut ws, hello).await;

        let identify = match ws.next().await.unwrap().unwrap() {
            Message::Text(text) => serde_json::from_str::<Value>(&text).unwrap(),
            other => panic!("expected Identify, got {other:?}"),
        };
        assert_eq!(identify["op"], 1);
        (ws, identify)
    }

    async fn identified(ws: &mut ServerWs) {
        send_json(ws, json!({"op": 2, "d": {"negotiatedRpcVersion": 1}})).await;
    }

    async fn recv(rx: &mut mpsc::Receiver<MoverEvent>) -> RecordingEvent {
        match timeout(PATIENCE, rx.recv()).await.unwrap().unwrap() {
            MoverEvent::Recording(event) => event,
            MoverEvent::Shutdown => panic!("unexpected shutdown event"),
        }
    }

    async fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn connect_fails_fast_when_nothing_listens() {
        let port = unused_port().await;
        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);
        let listener = SessionListener::new(test_config(port, None), tx, shutdown);

        let err = timeout(PATIENCE, listener.connect()).await.unwrap();
        assert!(matches!(err, Err(ConnectionError::Connect { .. })));
    }

    #[tokio::test]
    async fn connect_sends_auth_response_for_challenge() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        let server_task = tokio::spawn(async move {
            let (mut ws, identify) = serve_handshake(&server, Some(("chal", "salt"))).await;
            identified(&mut ws).await;
            identify
        });

        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);
        let listener = SessionListener::new(test_config(port, Some("pw")), tx, shutdown);
        timeout(PATIENCE, listener.connect()).await.unwrap().unwrap();

        let identify = timeout(PATIENCE, server_task).await.unwrap().unwrap();
        let expected = protocol::auth_response(
            "pw",
            &AuthChallenge {
                challenge: "chal".to_string(),
                salt: "salt".to_string(),
            },
        );
        assert_eq!(identify["d"]["authentication"], expected.as_str());
        assert_eq!(identify["d"]["eventSubscriptions"], 64);
    }

    #[tokio::test]
    async fn wrong_password_is_an_authentication_error() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut ws, _) = serve_handshake(&server, Some(("chal", "salt"))).await;
            let _ = ws
                .close(Some(CloseFrame {
                    code: CloseCode::from(protocol::CLOSE_AUTHENTICATION_FAILED),
                    reason: "Authentication failed.".into(),
                }))
                .await;
            // Let the close handshake finish before dropping the socket.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);
        let listener = SessionListener::new(test_config(port, Some("wrong")), tx, shutdown);

        let result = timeout(PATIENCE, listener.connect()).await.unwrap();
        assert!(matches!(result, Err(ConnectionError::Authentication)));
    }

    #[tokio::test]
    async fn events_are_forwarded_in_order() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut ws, _) = serve_handshake(&server, None).await;
            identified(&mut ws).await;
            send_json(&mut ws, started("/rec/part1.mkv")).await;
            send_json(
                &mut ws,
                json!({"op": 5, "d": {"eventType": "RecordStateChanged", "eventData": {
                    "outputActive": true, "outputState": "OBS_WEBSOCKET_OUTPUT_PAUSED"}}}),
            )
            .await;
            send_json(
                &mut ws,
                json!({"op": 5, "d": {"eventType": "RecordFileChanged", "eventData": {
                    "newOutputPath": "/rec/part2.mkv"}}}),
            )
            .await;
            ws.send(Message::Text("not json".to_string())).await.unwrap();
            send_json(&mut ws, stopped("/rec/part2.mkv")).await;
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (tx, mut rx) = mpsc::channel(8);
        let (stop, shutdown) = watch::channel(false);
        let mut listener = SessionListener::new(test_config(port, None), tx, shutdown);
        let session = timeout(PATIENCE, listener.connect_with_retry())
            .await
            .unwrap()
            .unwrap();
        let handle = tokio::spawn(listener.run(session));

        assert_eq!(
            recv(&mut rx).await,
            RecordingEvent::Started(Some(PathBuf::from("/rec/part1.mkv")))
        );
        assert_eq!(
            recv(&mut rx).await,
            RecordingEvent::FileChanged(PathBuf::from("/rec/part2.mkv"))
        );
        assert_eq!(
            recv(&mut rx).await,
            RecordingEvent::Stopped(PathBuf::from("/rec/part2.mkv"))
        );

        stop.send(true).unwrap();
        timeout(PATIENCE, handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn reconnects_after_disconnect_and_resumes_events() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();

        tokio::spawn(async move {
            // First session: one event, then OBS goes away.
            let (mut ws, _) = serve_handshake(&server, None).await;
            identified(&mut ws).await;
            send_json(&mut ws, stopped("/rec/first.mkv")).await;
            let _ = ws.close(None).await;
            drop(ws);

            // OBS half-started: the socket opens but drops before Hello.
            let (stream, _) = server.accept().await.unwrap();
            drop(stream);

            // Back for real.
            let (mut ws, _) = serve_handshake(&server, None).await;
            identified(&mut ws).await;
            send_json(&mut ws, stopped("/rec/second.mkv")).await;
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (tx, mut rx) = mpsc::channel(8);
        let (stop, shutdown) = watch::channel(false);
        let listener = SessionListener::new(test_config(port, None), tx, shutdown);
        let session = timeout(PATIENCE, listener.connect()).await.unwrap().unwrap();
        let handle = tokio::spawn(listener.run(session));

        assert_eq!(
            recv(&mut rx).await,
            RecordingEvent::Stopped(PathBuf::from("/rec/first.mkv"))
        );
        assert_eq!(
            recv(&mut rx).await,
            RecordingEvent::Stopped(PathBuf::from("/rec/second.mkv"))
        );

        stop.send(true).unwrap();
        timeout(PATIENCE, handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn retry_stops_on_shutdown() {
        let port = unused_port().await;
        let (tx, _rx) = mpsc::channel(8);
        let (stop, shutdown) = watch::channel(false);
        let mut listener = SessionListener::new(test_config(port, None), tx, shutdown);

        let retry = tokio::spawn(async move { listener.connect_with_retry().await.err() });
        tokio::time::sleep(Duration::from_millis(30)).await;
        stop.send(true).unwrap();

        let err = timeout(PATIENCE, retry).await.unwrap().unwrap();
        assert!(matches!(err, Some(ConnectionError::Cancelled)));
    }

    /// Serves one handshake on `server` that rejects the password.
    async fn reject_password(server: &TcpListener) {
        let (mut ws, _) = serve_handshake(server, Some(("chal", "salt"))).await;
        let _ = ws
            .close(Some(CloseFrame {
                code: CloseCode::from(protocol::CLOSE_AUTHENTICATION_FAILED),
                reason: "Authentication failed.".into(),
            }))
            .await;
        while let Some(Ok(_)) = ws.next().await {}
    }

    #[tokio::test]
    async fn startup_fails_fast_for_unknown_endpoint() {
        let port = unused_port().await;
        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);
        let mut listener = SessionListener::new(test_config(port, None), tx, shutdown);

        let result = timeout(PATIENCE, listener.connect_at_startup(false)).await.unwrap();
        assert!(matches!(result, Err(ConnectionError::Connect { .. })));
    }

    #[tokio::test]
    async fn startup_waits_for_known_endpoint() {
        let port = unused_port().await;

        let server_task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let server = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
            let (mut ws, _) = serve_handshake(&server, None).await;
            identified(&mut ws).await;
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);
        let mut listener = SessionListener::new(test_config(port, None), tx, shutdown);

        let result = timeout(PATIENCE, listener.connect_at_startup(true)).await.unwrap();
        assert!(result.is_ok(), "{:?}", result.err());
        server_task.abort();
    }

    #[tokio::test]
    async fn startup_rejects_wrong_password_even_for_known_endpoint() {
        let server = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = server.local_addr().unwrap().port();
        tokio::spawn(async move { reject_password(&server).await });

        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);
        let mut listener = SessionListener::new(test_config(port, Some("wrong")), tx, shutdown);

        let result = timeout(PATIENCE, listener.connect_at_startup(true)).await.unwrap();
        assert!(matches!(result, Err(ConnectionError::Authentication)));
    }

    #[tokio::test]
    async fn startup_wait_ends_when_obs_rejects_password() {
        let port = unused_port().await;
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let server = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
            reject_password(&server).await;
        });

        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);
        let mut listener = SessionListener::new(test_config(port, Some("wrong")), tx, shutdown);

        let result = timeout(PATIENCE, listener.connect_at_startup(true)).await.unwrap();
        assert!(matches!(result, Err(ConnectionError::Authentication)));
    }

    #[tokio::test]
    async fn connect_times_out_when_obs_never_answers() {
        // Accepted by the kernel backlog, never served.
        let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();
        let mut config = test_config(port, None);
        config.connect_timeout = Duration::from_millis(100);

        let (tx, _rx) = mpsc::channel(8);
        let (_stop, shutdown) = watch::channel(false);
        let listener = SessionListener::new(config, tx, shutdown);

        let result = timeout(PATIENCE, listener.connect()).await.unwrap();
        assert!(matches!(result, Err(ConnectionError::Timeout { .. })));
        drop(silent);
    }

    #[test]
    fn repeated_failures_are_reported_once() {
        let mut last = None;
        assert!(report_failure(&mut last, 1, &ConnectionError::Authentication));
        assert!(!report_failure(&mut last, 2, &ConnectionError::Authentication));
        assert!(!report_failure(&mut last, 3, &ConnectionError::Authentication));
        assert!(report_failure(&mut last, 4, &ConnectionError::Closed("gone".to_string())));
        assert!(report_failure(&mut last, 5, &ConnectionError::Authentication));
    }

    #[test]
    fn listener_config_from_config_maps_empty_password_to_none() {
        let mut c = Config::default();
        assert!(ListenerConfig::from_config(&c).password.is_none());
        c.password = "pw".to_string();
        c.host = "obs.lan".to_string();
        let lc = ListenerConfig::from_config(&c);
        assert_eq!(lc.password.as_deref(), Some("pw"));
        assert_eq!(lc.url(), "ws://obs.lan:4455");
        assert_eq!(lc.retry_max_delay, Duration::from_secs(30));
        assert_eq!(lc.connect_timeout, Duration::from_secs(5));
    }
}
