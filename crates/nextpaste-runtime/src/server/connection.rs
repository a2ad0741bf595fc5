//! One WebSocket connection: register, read frames, write the send queue.

use std::net::SocketAddr;

use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use nextpaste_core::{AppEvent, ClipboardContent};
use nextpaste_protocol::{
    AssemblyOutcome, Frame, ImageAssembler, MessageType, ProtocolError, SyncMessage,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at, timeout};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ConnectionTiming, ServerContext};

pub(super) async fn run(
    socket: WebSocket,
    addr: SocketAddr,
    ctx: ServerContext,
    cancel: CancellationToken,
) {
    let (info, queue) = ctx.hub.register(addr);
    let id = info.id.clone();
    ctx.log.info(format!("new client connected: {id} (from {addr})"));
    ctx.events.emit(AppEvent::client_connected(info));

    let (sink, stream) = socket.split();
    let mut writer = tokio::spawn(write_loop(sink, queue, ctx.timing, cancel));
    let mut reader = tokio::spawn(read_loop(stream, id.clone(), ctx.clone()));

    tokio::select! {
        _ = &mut reader => writer.abort(),
        _ = &mut writer => reader.abort(),
    }

    if let Some(info) = ctx.hub.remove(&id) {
        ctx.events.emit(AppEvent::client_disconnected(id, info.device_name));
    }
}

async fn read_loop(mut stream: SplitStream<WebSocket>, id: String, ctx: ServerContext) {
    let mut assembler = ImageAssembler::new();
    loop {
        let Ok(next) = timeout(ctx.timing.read_timeout, stream.next()).await else {
            ctx.log.warning(format!("client {id} timed out, closing connection"));
            break;
        };

        match next {
            Some(Ok(Message::Binary(data))) => handle_binary(&ctx, &id, &mut assembler, data),
            Some(Ok(Message::Text(text))) => handle_text(&ctx, &id, text.as_str()),
            Some(Ok(Message::Close(_))) | None => break,
            // Pings are answered by axum; any inbound frame refreshes the deadline.
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Err(e)) => {
                ctx.log.error(format!("client {id} disconnected abnormally: {e}"));
                break;
            }
        }
    }
}

async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut queue: mpsc::Receiver<Bytes>,
    timing: ConnectionTiming,
    cancel: CancellationToken,
) {
    let mut ping = interval_at(Instant::now() + timing.ping_interval, timing.ping_interval);
    loop {
        let message = tokio::select! {
            () = cancel.cancelled() => None,
            frame = queue.recv() => frame.map(Message::Binary),
            _ = ping.tick() => Some(Message::Ping(Bytes::new())),
        };

        let Some(message) = message else {
            let _ = timeout(timing.write_timeout, sink.send(Message::Close(None))).await;
            break;
        };

        match timeout(timing.write_timeout, sink.send(message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(error = %e, "websocket write failed");
                break;
            }
            Err(_) => {
                debug!("websocket write timed out");
                break;
            }
        }
    }
}

fn handle_text(ctx: &ServerContext, id: &str, text: &str) {
    match SyncMessage::parse(text) {
        Ok(msg) => ctx.log.warning(format!(
            "client {id} sent a V1.0 JSON message ({:?}); binary protocol V1.1 required",
            msg.action
        )),
        Err(_) => ctx.log.warning(format!(
            "received non-binary message from {id}; incompatible protocol version"
        )),
    }
}

fn handle_binary(ctx: &ServerContext, id: &str, assembler: &mut ImageAssembler, data: Bytes) {
    let frame = match ctx.codec.parse(data) {
        Ok(frame) => frame,
        Err(ProtocolError::Loopback) => return,
        Err(e) => {
            ctx.log.error(format!("failed to parse binary message: {e}"));
            return;
        }
    };

    match frame.kind {
        MessageType::Handshake => handle_handshake(ctx, id, &frame),
        MessageType::Text => {
            let text = frame.text_content().unwrap_or_default();
            let content = ClipboardContent::text(text);
            let from = sender_name(ctx, id);
            ctx.log.info(format!(
                "received text [{} chars] from {from}",
                content.len()
            ));
            deliver(ctx, id, &from, content);
        }
        MessageType::Image => match assembler.push(&frame) {
            AssemblyOutcome::Pending { restarted } => warn_restart(ctx, id, restarted),
            AssemblyOutcome::Complete { image, restarted } => {
                warn_restart(ctx, id, restarted);
                let content = image.into_content();
                let from = sender_name(ctx, id);
                ctx.log.info(format!(
                    "received image [{:.2} MB] from {from}",
                    content.size_mb()
                ));
                deliver(ctx, id, &from, content);
            }
            AssemblyOutcome::Dropped { pending, received } => {
                debug!(client = %id, pending, received, "fragment for another message, transfer dropped");
            }
            AssemblyOutcome::Ignored => {}
        },
        MessageType::Heartbeat => {}
        MessageType::File | MessageType::Unknown(_) => {
            ctx.log.warning(format!("unsupported message type: {}", frame.kind));
        }
    }
}

fn handle_handshake(ctx: &ServerContext, id: &str, frame: &Frame) {
    let meta = match frame.handshake_meta() {
        Ok(meta) => meta,
        Err(e) => {
            ctx.log.error(format!("failed to parse handshake: {e}"));
            return;
        }
    };

    if let Some(info) = ctx.hub.update_device(id, &meta.name, &meta.os) {
        ctx.events.emit(AppEvent::client_connected(info));
    }
    ctx.log.success(format!(
        "client handshake: {} ({}) [protocol V1.{}]",
        meta.name,
        meta.os,
        meta.minor_version()
    ));
}

/// Hand content to the local clipboard and relay it to every other client.
fn deliver(ctx: &ServerContext, id: &str, from: &str, content: ClipboardContent) {
    ctx.events.emit(AppEvent::clipboard_received(&content, from));

    let frames = match ctx.codec.content_frames(&content, ctx.timing.chunk_size) {
        Ok(frames) => frames,
        Err(e) => {
            ctx.log.error(format!("failed to encode {} for broadcast: {e}", content.kind));
            Vec::new()
        }
    };

    if let Some(handler) = &ctx.on_clipboard {
        if let Some(info) = ctx.hub.get(id) {
            handler(content, &info);
        }
    }

    if !frames.is_empty() {
        ctx.hub.broadcast(&frames, Some(id));
    }
}

fn warn_restart(ctx: &ServerContext, id: &str, restarted: bool) {
    if restarted {
        ctx.log.warning(format!(
            "client {id} started a new transfer before finishing the previous one, old data discarded"
        ));
    }
}

fn sender_name(ctx: &ServerContext, id: &str) -> String {
    ctx.hub
        .get(id)
        .map_or_else(|| id.to_string(), |info| info.display_name().to_string())
}
