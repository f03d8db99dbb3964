use super::*;
use bzp_core::*;
use bzp_engine::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

struct RoomEntry {
    commands: UnboundedSender<Command>,
    seats: PerSlot<Option<ParticipantId>>,
    connected: PerSlot<bool>,
    /// Per-seat attachment counter. Each connect bumps it, so a teardown
    /// arriving from an older attachment can be recognized and dropped.
    sessions: PerSlot<u64>,
    started: bool,
}

/// A participant's live attachment to a room, socket-free so the lobby
/// can be driven end to end in tests. The WebSocket layer is just a
/// pump between this and an `actix_ws` session.
pub struct Connection {
    pub slot: Slot,
    pub commands: UnboundedSender<Command>,
    pub outbox: UnboundedReceiver<String>,
    /// Pre-encoded `room_state` frame to send first.
    pub hello: String,
    /// Attachment generation; pass it back to [`Lobby::disconnect`] so a
    /// reconnect cannot be unbound by its predecessor's late teardown.
    pub generation: u64,
}

/// Manages active match rooms and their lifecycles: creation, seat
/// binding, connection bridging, and result reporting.
pub struct Lobby {
    config: MatchConfig,
    source: Arc<dyn QuestionSource>,
    stats: Arc<dyn StatsStore>,
    rooms: RwLock<HashMap<RoomCode, RoomEntry>>,
}

impl Lobby {
    pub fn new(
        config: MatchConfig,
        source: Arc<dyn QuestionSource>,
        stats: Arc<dyn StatsStore>,
    ) -> Self {
        Self {
            config,
            source,
            stats,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a new room with the host seated in slot A.
    /// Draws the match's questions up front so a bad deck fails here,
    /// then spawns the room task and a waiter for its result.
    pub async fn create(self: &Arc<Self>, host: ParticipantId) -> anyhow::Result<RoomCode> {
        let questions = self.source.draw(self.config.questions_per_match).await?;
        let (done_tx, done_rx) = oneshot::channel();
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let code = RoomCode::random();
            if !rooms.contains_key(&code) {
                break code;
            }
        };
        let commands = Room::spawn(code.clone(), self.config.clone(), questions, done_tx)?;
        rooms.insert(
            code.clone(),
            RoomEntry {
                commands,
                seats: PerSlot::new(Some(host), None),
                connected: PerSlot::init(|_| false),
                sessions: PerSlot::default(),
                started: false,
            },
        );
        drop(rooms);
        let lobby = self.clone();
        tokio::spawn(async move {
            if let Ok(summary) = done_rx.await {
                lobby.finish(summary).await;
            }
        });
        log::info!("[lobby] room {} created by {}", code, host);
        Ok(code)
    }

    /// Seats a guest in slot B. Re-joining with a seated identity just
    /// returns its existing slot, so reconnect flows can reuse this.
    pub async fn join(&self, code: &RoomCode, guest: ParticipantId) -> anyhow::Result<Slot> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms
            .get_mut(code)
            .ok_or_else(|| anyhow::anyhow!("room not found"))?;
        for slot in Slot::BOTH {
            if entry.seats[slot] == Some(guest) {
                return Ok(slot);
            }
        }
        if entry.seats[Slot::B].is_some() {
            anyhow::bail!("room is full");
        }
        entry.seats[Slot::B] = Some(guest);
        let _ = entry.commands.send(Command::Notify(
            ServerMessage::PlayerJoined { slot: Slot::B }.to_json(),
        ));
        log::info!("[lobby] {} joined room {} as B", guest, code);
        Ok(Slot::B)
    }

    /// Attaches a seated participant to its room and builds the hello
    /// frame from a fresh snapshot. The match starts on the connect
    /// that brings both seats online.
    pub async fn connect(
        self: &Arc<Self>,
        code: &RoomCode,
        who: ParticipantId,
    ) -> anyhow::Result<Connection> {
        let (commands, slot, opponent, start, generation) = {
            let mut rooms = self.rooms.write().await;
            let entry = rooms
                .get_mut(code)
                .ok_or_else(|| anyhow::anyhow!("room not found"))?;
            let slot = Slot::BOTH
                .into_iter()
                .find(|&s| entry.seats[s] == Some(who))
                .ok_or_else(|| anyhow::anyhow!("not a participant in this room"))?;
            entry.connected[slot] = true;
            entry.sessions[slot] += 1;
            let start = !entry.started && Slot::BOTH.iter().all(|&s| entry.connected[s]);
            if start {
                entry.started = true;
            }
            (
                entry.commands.clone(),
                slot,
                entry.seats[slot.other()],
                start,
                entry.sessions[slot],
            )
        };
        let (out_tx, out_rx) = unbounded_channel();
        commands.send(Command::Attach(slot, out_tx))?;
        let (snap_tx, snap_rx) = oneshot::channel();
        commands.send(Command::Snapshot(snap_tx))?;
        let (snapshot, deadline) = snap_rx.await?;
        let opponent_rating = match opponent {
            Some(id) => Some(self.stats.rating(id).await),
            None => None,
        };
        let hello = ServerMessage::RoomState {
            room_code: code.to_string(),
            you: slot,
            config: ConfigEcho::from(&self.config),
            opponent_rating,
            snapshot,
            deadline,
        }
        .to_json();
        if start {
            log::info!("[lobby] room {} starting", code);
            commands.send(Command::Start)?;
        }
        log::debug!("[lobby] {} connected to {} as {}", who, code, slot);
        Ok(Connection {
            slot,
            commands,
            outbox: out_rx,
            hello,
            generation,
        })
    }

    /// Routes one raw client frame into the room. Shape errors surface
    /// here; legality is the engine's silent concern.
    pub async fn submit(
        &self,
        code: &RoomCode,
        who: ParticipantId,
        frame: &str,
    ) -> anyhow::Result<()> {
        let rooms = self.rooms.read().await;
        let entry = rooms
            .get(code)
            .ok_or_else(|| anyhow::anyhow!("room not found"))?;
        let Some(slot) = Slot::BOTH
            .into_iter()
            .find(|&s| entry.seats[s] == Some(who))
        else {
            log::warn!("[lobby] {} tried to act in {} without a seat", who, code);
            anyhow::bail!("not a participant in this room");
        };
        let action = Protocol::decode(frame)?;
        entry.commands.send(Command::Act(slot, action))?;
        Ok(())
    }

    /// Detaches a participant. Seats stay bound so the identity can
    /// reconnect later; a started match keeps running against its
    /// timers. A room everyone left before it started is torn down.
    /// Teardown from an attachment that a later connect superseded is
    /// ignored, so the fresh attachment keeps its outbox.
    pub async fn disconnect(&self, code: &RoomCode, who: ParticipantId, generation: u64) {
        let mut rooms = self.rooms.write().await;
        let Some(entry) = rooms.get_mut(code) else {
            return;
        };
        let Some(slot) = Slot::BOTH
            .into_iter()
            .find(|&s| entry.seats[s] == Some(who))
        else {
            return;
        };
        if entry.sessions[slot] != generation {
            log::debug!("[lobby] stale teardown for {} in {} dropped", who, code);
            return;
        }
        entry.connected[slot] = false;
        let _ = entry.commands.send(Command::Detach(slot));
        let _ = entry.commands.send(Command::Notify(
            ServerMessage::PlayerLeft { slot }.to_json(),
        ));
        log::debug!("[lobby] {} disconnected from {}", who, code);
        if !entry.started && Slot::BOTH.iter().all(|&s| !entry.connected[s]) {
            if let Some(entry) = rooms.remove(code) {
                let _ = entry.commands.send(Command::Destroy);
            }
            log::info!("[lobby] room {} abandoned, closed", code);
        }
    }

    pub async fn is_open(&self, code: &RoomCode) -> bool {
        self.rooms.read().await.contains_key(code)
    }

    /// Report and tear down a completed room.
    async fn finish(&self, summary: MatchSummary) {
        let entry = self.rooms.write().await.remove(&summary.code);
        let Some(entry) = entry else {
            return;
        };
        let _ = entry.commands.send(Command::Destroy);
        if let (Some(a), Some(b)) = (entry.seats[Slot::A], entry.seats[Slot::B]) {
            let record = MatchRecord {
                code: summary.code.clone(),
                participants: PerSlot::new(a, b),
                winner: summary.winner,
                final_balances: summary.final_balances,
            };
            if let Err(e) = self.stats.record(record).await {
                log::error!("[lobby] failed to record match {}: {}", summary.code, e);
            }
        }
        log::info!("[lobby] room {} finished, cleaned up", summary.code);
    }

    /// Spawns the WebSocket pump between a client session and its room.
    pub async fn bridge(
        self: &Arc<Self>,
        code: RoomCode,
        who: ParticipantId,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) -> anyhow::Result<()> {
        use futures::StreamExt;
        let connection = self.connect(&code, who).await?;
        let generation = connection.generation;
        let mut outbox = connection.outbox;
        session
            .text(connection.hello)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        log::debug!("[bridge {}] connected", code);
        let lobby = self.clone();
        actix_web::rt::spawn(async move {
            'sesh: loop {
                tokio::select! {
                    biased;
                    msg = outbox.recv() => match msg {
                        Some(json) => if session.text(json).await.is_err() { break 'sesh },
                        None => break 'sesh,
                    },
                    msg = stream.next() => match msg {
                        Some(Ok(actix_ws::Message::Text(text))) => {
                            if let Err(e) = lobby.submit(&code, who, &text).await {
                                if session.text(ServerMessage::error(e.to_string()).to_json()).await.is_err() {
                                    break 'sesh;
                                }
                            }
                        }
                        Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                        Some(Err(_)) => break 'sesh,
                        None => break 'sesh,
                        _ => continue 'sesh,
                    },
                }
            }
            lobby.disconnect(&code, who, generation).await;
            log::debug!("[bridge {}] disconnected", code);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn fast_config() -> MatchConfig {
        MatchConfig {
            category_reveal: Duration::from_millis(5),
            bet_time_limit: Duration::from_millis(5),
            clue_tick_interval: Duration::from_millis(2),
            post_clue_timeout: Duration::from_millis(5),
            answer_time_limit: Duration::from_millis(5),
            resolution_display: Duration::from_millis(5),
            ..MatchConfig::default()
        }
    }
    fn lobby() -> Arc<Lobby> {
        Arc::new(Lobby::new(
            fast_config(),
            Arc::new(sample_deck()),
            Arc::new(NullStats),
        ))
    }
    async fn next_typed(rx: &mut UnboundedReceiver<String>, kind: &str) -> String {
        let tag = format!(r#""type":"{}""#, kind);
        timeout(Duration::from_secs(5), async {
            loop {
                let msg = rx.recv().await.expect("outbox closed");
                if msg.contains(&tag) {
                    return msg;
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {}", kind))
    }

    #[tokio::test]
    async fn create_join_connect_runs_a_match() {
        let lobby = lobby();
        let (host, guest) = (ParticipantId::new(), ParticipantId::new());
        let code = lobby.create(host).await.unwrap();
        assert_eq!(lobby.join(&code, guest).await.unwrap(), Slot::B);
        let mut host_conn = lobby.connect(&code, host).await.unwrap();
        assert_eq!(host_conn.slot, Slot::A);
        assert!(host_conn.hello.contains(r#""type":"room_state""#));
        assert!(host_conn.hello.contains(r#""you":"A""#));
        let guest_conn = lobby.connect(&code, guest).await.unwrap();
        assert_eq!(guest_conn.slot, Slot::B);
        // both online: the match kicks off without further input
        next_typed(&mut host_conn.outbox, "phase_category").await;
        // and runs to completion on timeouts alone
        next_typed(&mut host_conn.outbox, "phase_complete").await;
    }

    #[tokio::test]
    async fn unknown_rooms_and_strangers_are_rejected() {
        let lobby = lobby();
        let nobody = ParticipantId::new();
        let code: RoomCode = "ZZZZZZ".parse().unwrap();
        assert!(lobby.join(&code, nobody).await.is_err());
        assert!(lobby.connect(&code, nobody).await.is_err());
        let code = lobby.create(ParticipantId::new()).await.unwrap();
        assert!(lobby.connect(&code, nobody).await.is_err());
        assert!(lobby.submit(&code, nobody, r#"{"type":"buzz"}"#).await.is_err());
    }

    #[tokio::test]
    async fn a_room_seats_exactly_two() {
        let lobby = lobby();
        let (host, guest) = (ParticipantId::new(), ParticipantId::new());
        let code = lobby.create(host).await.unwrap();
        lobby.join(&code, guest).await.unwrap();
        assert!(lobby.join(&code, ParticipantId::new()).await.is_err());
        // seated identities may re-join
        assert_eq!(lobby.join(&code, guest).await.unwrap(), Slot::B);
        assert_eq!(lobby.join(&code, host).await.unwrap(), Slot::A);
    }

    #[tokio::test]
    async fn malformed_frames_are_rejected_at_the_edge() {
        let lobby = lobby();
        let host = ParticipantId::new();
        let code = lobby.create(host).await.unwrap();
        lobby.connect(&code, host).await.unwrap();
        assert!(lobby.submit(&code, host, "not json").await.is_err());
        // well-formed but currently illegal actions are silently ignored
        assert!(lobby.submit(&code, host, r#"{"type":"buzz"}"#).await.is_ok());
    }

    #[tokio::test]
    async fn reconnect_sees_a_snapshot() {
        let lobby = lobby();
        let (host, guest) = (ParticipantId::new(), ParticipantId::new());
        let code = lobby.create(host).await.unwrap();
        lobby.join(&code, guest).await.unwrap();
        let mut host_conn = lobby.connect(&code, host).await.unwrap();
        let _guest_conn = lobby.connect(&code, guest).await.unwrap();
        next_typed(&mut host_conn.outbox, "phase_category").await;
        lobby.disconnect(&code, host, host_conn.generation).await;
        let conn = lobby.connect(&code, host).await.unwrap();
        assert!(conn.hello.contains(r#""snapshot":{"#));
        assert!(conn.hello.contains(r#""balances":{"A":"#));
    }

    #[tokio::test]
    async fn a_superseded_connection_cannot_detach_its_successor() {
        let lobby = lobby();
        let (host, guest) = (ParticipantId::new(), ParticipantId::new());
        let code = lobby.create(host).await.unwrap();
        lobby.join(&code, guest).await.unwrap();
        let first = lobby.connect(&code, host).await.unwrap();
        let _guest_conn = lobby.connect(&code, guest).await.unwrap();
        // reconnect while the first socket is still up, then let the
        // first attachment's teardown land late
        let mut second = lobby.connect(&code, host).await.unwrap();
        lobby.disconnect(&code, host, first.generation).await;
        // the fresh attachment keeps receiving broadcasts
        next_typed(&mut second.outbox, "phase_complete").await;
    }

    #[tokio::test]
    async fn finished_rooms_are_cleaned_up() {
        let lobby = lobby();
        let (host, guest) = (ParticipantId::new(), ParticipantId::new());
        let code = lobby.create(host).await.unwrap();
        lobby.join(&code, guest).await.unwrap();
        let mut host_conn = lobby.connect(&code, host).await.unwrap();
        let _guest_conn = lobby.connect(&code, guest).await.unwrap();
        next_typed(&mut host_conn.outbox, "phase_complete").await;
        timeout(Duration::from_secs(5), async {
            while lobby.is_open(&code).await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("room was not cleaned up");
    }

    #[tokio::test]
    async fn unstarted_rooms_close_when_everyone_leaves() {
        let lobby = lobby();
        let host = ParticipantId::new();
        let code = lobby.create(host).await.unwrap();
        let conn = lobby.connect(&code, host).await.unwrap();
        lobby.disconnect(&code, host, conn.generation).await;
        assert!(!lobby.is_open(&code).await);
    }

    #[tokio::test]
    async fn started_matches_survive_a_full_disconnect() {
        let lobby = lobby();
        let (host, guest) = (ParticipantId::new(), ParticipantId::new());
        let code = lobby.create(host).await.unwrap();
        lobby.join(&code, guest).await.unwrap();
        let mut host_conn = lobby.connect(&code, host).await.unwrap();
        let guest_conn = lobby.connect(&code, guest).await.unwrap();
        next_typed(&mut host_conn.outbox, "phase_category").await;
        lobby.disconnect(&code, host, host_conn.generation).await;
        lobby.disconnect(&code, guest, guest_conn.generation).await;
        // timers keep driving the match; it finishes and only then closes
        timeout(Duration::from_secs(5), async {
            while lobby.is_open(&code).await {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("match did not run to completion");
    }
}
