// BSD 3-Clause License
// Copyright (c) 2026, Virtual Cable S.L.
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
//    this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
//    may be used to endorse or promote products derived from this software
//    without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

// Authors: Adolfo Gómez, dkmaster at dkmon dot com

use super::*;

use std::time::{Duration, Instant};

use tokio::io::AsyncRead;
use tokio::net::TcpStream;

use shared::protocol::codec::{FrameReader, FrameWriter};
use shared::ticket::Ticket;

use crate::config::RelayConfig;

fn test_config(npc: bool) -> RelayConfig {
    RelayConfig {
        login_addr: "127.0.0.1:0".parse().unwrap(),
        game_addr: "127.0.0.1:0".parse().unwrap(),
        public_host: "127.0.0.1".to_string(),
        public_port: "5556".to_string(),
        server_addr: "127.0.0.1:9".to_string(),
        server_port: "9".to_string(),
        force_admin: false,
        talk_to_every_npc: npc,
        debug: true,
    }
}

async fn spawn_proxy(store: Arc<TicketStore>, npc: bool) -> (SocketAddr, Trigger, Arc<GameProxy>) {
    let proxy = Arc::new(GameProxy::new(&test_config(npc), store));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stop = Trigger::new();
    tokio::spawn({
        let proxy = proxy.clone();
        let stop = stop.clone();
        async move {
            let _ = proxy.serve(listener, stop).await;
        }
    });
    (addr, stop, proxy)
}

async fn next<R: AsyncRead + Unpin>(reader: &mut FrameReader<R>) -> Option<String> {
    tokio::time::timeout(Duration::from_secs(5), reader.next_frame())
        .await
        .expect("timed out waiting for a frame")
        .unwrap()
}

fn ticket_for(addr: SocketAddr) -> Ticket {
    Ticket {
        host: addr.ip().to_string(),
        port: addr.port().to_string(),
        original: "opaque-credential".to_string(),
        server_id: 42,
        issued_at: Instant::now(),
    }
}

#[tokio::test]
async fn test_happy_game_replays_ticket_and_proxies() {
    log::setup_logging("debug", log::LogType::Test);

    let upstream = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = upstream.local_addr().unwrap();
    let upstream_task = tokio::spawn(async move {
        let (conn, _) = upstream.accept().await.unwrap();
        let (rd, wr) = conn.into_split();
        let mut reader = FrameReader::from_client(rd);
        let mut writer = FrameWriter::to_client(wr);

        writer.send("Hg").await.unwrap();
        // the original credential comes back, not the minted uuid
        assert_eq!(
            next(&mut reader).await.as_deref(),
            Some("ATopaque-credential")
        );
        writer.send("ATK").await.unwrap();
        // the client frame sent before the hello arrives only now
        assert_eq!(next(&mut reader).await.as_deref(), Some("GC250;10"));
        writer.send("BN").await.unwrap();
    });

    let store = Arc::new(TicketStore::new());
    store.set_ticket("minted-uuid", ticket_for(upstream_addr));
    let (proxy_addr, stop, proxy) = spawn_proxy(store.clone(), false).await;
    assert_eq!(proxy.session_count(), 0);

    let client = TcpStream::connect(proxy_addr).await.unwrap();
    let (rd, wr) = client.into_split();
    let mut reader = FrameReader::from_server(rd);
    let mut writer = FrameWriter::to_server(wr);

    // the proxy greets before reading anything
    assert_eq!(next(&mut reader).await.as_deref(), Some("Hg"));
    assert_eq!(proxy.session_count(), 1);
    writer.send("ATminted-uuid").await.unwrap();
    // sent before the upstream hello; must be held, never lost
    writer.send("GC250;10").await.unwrap();

    assert_eq!(next(&mut reader).await.as_deref(), Some("ATK"));
    assert_eq!(next(&mut reader).await.as_deref(), Some("BN"));

    assert_eq!(store.count(), 0);
    upstream_task.await.unwrap();
    stop.trigger();
}

#[tokio::test]
async fn test_unknown_ticket_is_rejected() {
    log::setup_logging("debug", log::LogType::Test);

    let store = Arc::new(TicketStore::new());
    let (proxy_addr, stop, _proxy) = spawn_proxy(store, false).await;

    let client = TcpStream::connect(proxy_addr).await.unwrap();
    let (rd, wr) = client.into_split();
    let mut reader = FrameReader::from_server(rd);
    let mut writer = FrameWriter::to_server(wr);

    assert_eq!(next(&mut reader).await.as_deref(), Some("Hg"));
    writer.send("ATdeadbeef").await.unwrap();
    assert_eq!(next(&mut reader).await.as_deref(), Some("ATE"));
    assert_eq!(next(&mut reader).await, None);

    stop.trigger();
}

#[tokio::test]
async fn test_expired_ticket_behaves_like_unknown() {
    log::setup_logging("debug", log::LogType::Test);

    let store = Arc::new(TicketStore::new());
    store.set_ticket(
        "expired-uuid",
        ticket_for("127.0.0.1:9".parse().unwrap()),
    );
    std::thread::sleep(Duration::from_millis(5));
    store.delete_old_tickets(Duration::from_millis(1));

    let (proxy_addr, stop, _proxy) = spawn_proxy(store, false).await;

    let client = TcpStream::connect(proxy_addr).await.unwrap();
    let (rd, wr) = client.into_split();
    let mut reader = FrameReader::from_server(rd);
    let mut writer = FrameWriter::to_server(wr);

    assert_eq!(next(&mut reader).await.as_deref(), Some("Hg"));
    writer.send("ATexpired-uuid").await.unwrap();
    assert_eq!(next(&mut reader).await.as_deref(), Some("ATE"));
    assert_eq!(next(&mut reader).await, None);

    stop.trigger();
}

#[tokio::test]
async fn test_bogus_first_frame_closes_without_ticket_error() {
    log::setup_logging("debug", log::LogType::Test);

    let store = Arc::new(TicketStore::new());
    let (proxy_addr, stop, _proxy) = spawn_proxy(store, false).await;

    let client = TcpStream::connect(proxy_addr).await.unwrap();
    let (rd, wr) = client.into_split();
    let mut reader = FrameReader::from_server(rd);
    let mut writer = FrameWriter::to_server(wr);

    assert_eq!(next(&mut reader).await.as_deref(), Some("Hg"));
    writer.send("xyz").await.unwrap();
    assert_eq!(next(&mut reader).await, None);

    stop.trigger();
}

#[tokio::test]
async fn test_recognized_but_wrong_first_frame_is_fatal() {
    log::setup_logging("debug", log::LogType::Test);

    let store = Arc::new(TicketStore::new());
    let (proxy_addr, stop, _proxy) = spawn_proxy(store, false).await;

    let client = TcpStream::connect(proxy_addr).await.unwrap();
    let (rd, wr) = client.into_split();
    let mut reader = FrameReader::from_server(rd);
    let mut writer = FrameWriter::to_server(wr);

    assert_eq!(next(&mut reader).await.as_deref(), Some("Hg"));
    writer.send("AXserver=1").await.unwrap();
    assert_eq!(next(&mut reader).await, None);

    stop.trigger();
}

#[tokio::test]
async fn test_double_redemption_single_winner() {
    log::setup_logging("debug", log::LogType::Test);

    let upstream = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = upstream.local_addr().unwrap();
    let upstream_task = tokio::spawn(async move {
        let (conn, _) = upstream.accept().await.unwrap();
        let (rd, wr) = conn.into_split();
        let mut reader = FrameReader::from_client(rd);
        let mut writer = FrameWriter::to_client(wr);
        writer.send("Hg").await.unwrap();
        assert_eq!(
            next(&mut reader).await.as_deref(),
            Some("ATopaque-credential")
        );
    });

    let store = Arc::new(TicketStore::new());
    store.set_ticket("minted-uuid", ticket_for(upstream_addr));
    let (proxy_addr, stop, _proxy) = spawn_proxy(store, false).await;

    let first = TcpStream::connect(proxy_addr).await.unwrap();
    let (rd, wr) = first.into_split();
    let mut first_reader = FrameReader::from_server(rd);
    let mut first_writer = FrameWriter::to_server(wr);
    assert_eq!(next(&mut first_reader).await.as_deref(), Some("Hg"));
    first_writer.send("ATminted-uuid").await.unwrap();
    upstream_task.await.unwrap();

    // the second redemption of the same id misses
    let second = TcpStream::connect(proxy_addr).await.unwrap();
    let (rd, wr) = second.into_split();
    let mut second_reader = FrameReader::from_server(rd);
    let mut second_writer = FrameWriter::to_server(wr);
    assert_eq!(next(&mut second_reader).await.as_deref(), Some("Hg"));
    second_writer.send("ATminted-uuid").await.unwrap();
    assert_eq!(next(&mut second_reader).await.as_deref(), Some("ATE"));

    stop.trigger();
}

#[tokio::test]
async fn test_npc_auto_dialog_holds_client_frames() {
    log::setup_logging("debug", log::LogType::Test);

    let (create_seen_tx, create_seen_rx) = flume::bounded::<()>(1);

    let upstream = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = upstream.local_addr().unwrap();
    let upstream_task = tokio::spawn(async move {
        let (conn, _) = upstream.accept().await.unwrap();
        let (rd, wr) = conn.into_split();
        let mut reader = FrameReader::from_client(rd);
        let mut writer = FrameWriter::to_client(wr);

        writer.send("Hg").await.unwrap();
        assert_eq!(
            next(&mut reader).await.as_deref(),
            Some("ATopaque-credential")
        );

        // one npc on the map triggers an automatic dialog
        writer.send("GM0|55;2;guard").await.unwrap();
        assert_eq!(next(&mut reader).await.as_deref(), Some("DC55"));
        create_seen_tx.send_async(()).await.unwrap();

        writer.send("DCK").await.unwrap();
        writer.send("DQ").await.unwrap();
        assert_eq!(next(&mut reader).await.as_deref(), Some("DV"));
        writer.send("DV").await.unwrap();

        // the held client frame arrives only after the dialog settles
        assert_eq!(next(&mut reader).await.as_deref(), Some("GC9"));
        writer.send("BN").await.unwrap();
    });

    let store = Arc::new(TicketStore::new());
    store.set_ticket("minted-uuid", ticket_for(upstream_addr));
    let (proxy_addr, stop, _proxy) = spawn_proxy(store, true).await;

    let client = TcpStream::connect(proxy_addr).await.unwrap();
    let (rd, wr) = client.into_split();
    let mut reader = FrameReader::from_server(rd);
    let mut writer = FrameWriter::to_server(wr);

    assert_eq!(next(&mut reader).await.as_deref(), Some("Hg"));
    writer.send("ATminted-uuid").await.unwrap();

    // the movement itself still reaches the client
    assert_eq!(next(&mut reader).await.as_deref(), Some("GM0|55;2;guard"));

    // wait until the dialog is in flight, then send a frame that must be held
    create_seen_rx.recv_async().await.unwrap();
    writer.send("GC9").await.unwrap();

    // none of the consumed dialog frames leak to the client
    assert_eq!(next(&mut reader).await.as_deref(), Some("BN"));

    upstream_task.await.unwrap();
    stop.trigger();
}
