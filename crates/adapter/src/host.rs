//! Host module - session store and command processing
//!
//! The host owns every session. It runs on a single thread and handles one
//! command at a time, so commands for one session are always applied in the
//! order they were accepted.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use thiserror::Error;

use crate::config::HostConfig;
use crate::core::{GridError, MazeSession, SimpleRng};
use crate::encode::FrameEncoder;
use crate::engine::{FrameRenderer, Raster};
use crate::protocol::*;
use crate::runtime::SessionCommand;
use crate::types::{ColorScheme, DEFAULT_MAZE_SIZE, MAX_MAZE_SIZE, MIN_MAZE_SIZE};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("maze size {size} outside {min}..={max}")]
    InvalidSize { size: usize, min: usize, max: usize },

    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug)]
struct Slot {
    session: MazeSession,
    last_used: u64,
}

/// Sessions keyed by client-chosen id. When the store is full, opening a new
/// id evicts the least recently used session.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<String, Slot>,
    max_sessions: usize,
    seeds: SimpleRng,
    clock: u64,
}

impl SessionStore {
    /// `seed` drives the seeds of sessions created without an explicit one.
    pub fn new(max_sessions: usize, seed: u32) -> Self {
        Self {
            sessions: HashMap::new(),
            max_sessions: max_sessions.max(1),
            seeds: SimpleRng::new(seed),
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MazeSession> {
        self.sessions.get(id).map(|slot| &slot.session)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Drop least recently used sessions until `id` fits.
    fn make_room(&mut self, id: &str) {
        if self.sessions.contains_key(id) {
            return;
        }
        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    self.sessions.remove(&key);
                    log::info!("session {:?}: evicted, store full at {}", key, self.max_sessions);
                }
                None => break,
            }
        }
    }

    /// Start a new maze under `id`, replacing any existing session.
    pub fn create(
        &mut self,
        id: &str,
        size: usize,
        seed: Option<u32>,
    ) -> Result<&mut MazeSession, StoreError> {
        if !(MIN_MAZE_SIZE..=MAX_MAZE_SIZE).contains(&size) {
            return Err(StoreError::InvalidSize {
                size,
                min: MIN_MAZE_SIZE,
                max: MAX_MAZE_SIZE,
            });
        }

        let seed = seed.unwrap_or_else(|| self.seeds.next_u32());
        let session = MazeSession::new(size, seed)?;
        log::debug!("session {:?}: new {}x{} maze, seed {}", id, size, size, seed);

        self.make_room(id);
        let slot = Slot {
            session,
            last_used: self.tick(),
        };
        let slot = match self.sessions.entry(id.to_string()) {
            Entry::Occupied(mut e) => {
                e.insert(slot);
                e.into_mut()
            }
            Entry::Vacant(e) => e.insert(slot),
        };
        Ok(&mut slot.session)
    }

    /// The session under `id`, creating a default-size maze if there is none.
    pub fn get_or_create(&mut self, id: &str) -> Result<&mut MazeSession, StoreError> {
        self.make_room(id);
        let now = self.tick();
        let slot = match self.sessions.entry(id.to_string()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let seed = self.seeds.next_u32();
                log::debug!("session {:?}: created on first use, seed {}", id, seed);
                e.insert(Slot {
                    session: MazeSession::new(DEFAULT_MAZE_SIZE, seed)?,
                    last_used: now,
                })
            }
        };
        slot.last_used = now;
        Ok(&mut slot.session)
    }
}

/// What the host sends back for one command.
#[derive(Debug, Clone)]
pub enum HostReply {
    Frame(FrameMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
}

impl HostReply {
    pub fn seq(&self) -> u64 {
        match self {
            HostReply::Frame(m) => m.seq,
            HostReply::Ack(m) => m.seq,
            HostReply::Error(m) => m.seq,
        }
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        match self {
            HostReply::Frame(m) => serde_json::to_string(m),
            HostReply::Ack(m) => serde_json::to_string(m),
            HostReply::Error(m) => serde_json::to_string(m),
        }
    }
}

pub struct Host {
    store: SessionStore,
    renderer: FrameRenderer,
    encoder: FrameEncoder,
    raster: Raster,
}

impl Host {
    pub fn new(config: &HostConfig, scheme: ColorScheme) -> Self {
        let config = config.clone().clamped();
        Self {
            store: SessionStore::new(config.max_sessions, SimpleRng::seed_from_time()),
            renderer: FrameRenderer::new(config.frame_size, scheme),
            encoder: FrameEncoder::new(config.format).with_jpeg_quality(config.jpeg_quality),
            raster: Raster::new(0, 0, scheme.background),
        }
    }

    /// Build from config, loading the colour file if one is set.
    pub fn from_config(config: &HostConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config, config.color_scheme()?))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            frame_size: self.renderer.frame_size(),
            ..HostCapabilities::default()
        }
    }

    /// Apply one command. `format` overrides the configured image format.
    pub fn handle(&mut self, seq: u64, cmd: &SessionCommand, format: Option<FrameFormat>) -> HostReply {
        let action = cmd.action.as_str();
        match cmd.action {
            CommandAction::NewMaze => {
                let size = cmd.size.unwrap_or(DEFAULT_MAZE_SIZE);
                if let Err(e) = self.store.create(&cmd.session, size, cmd.seed) {
                    return store_error(seq, e);
                }
            }
            CommandAction::Nav(nav) => {
                let session = match self.store.get_or_create(&cmd.session) {
                    Ok(s) => s,
                    Err(e) => return store_error(seq, e),
                };
                let outcome = session.apply(nav);
                if !outcome.changed {
                    log::debug!("session {:?}: {} blocked", cmd.session, action);
                    return HostReply::Ack(create_ack(seq, &cmd.session, action, AckStatus::Blocked));
                }
            }
        }
        self.frame(seq, &cmd.session, action, format)
    }

    fn frame(&mut self, seq: u64, id: &str, action: &str, format: Option<FrameFormat>) -> HostReply {
        let Some(session) = self.store.get(id) else {
            return HostReply::Error(create_error(seq, ErrorCode::InvalidCommand, "unknown session"));
        };

        self.renderer
            .render_into(session.grid(), session.nav(), &mut self.raster);
        let encoder = match format {
            Some(f) => self.encoder.with_format(f),
            None => self.encoder,
        };
        let image = match encoder.encode_base64(&self.raster) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("session {:?}: frame encoding failed: {}", id, e);
                return HostReply::Error(create_error(seq, ErrorCode::RenderFailed, &e.to_string()));
            }
        };

        let snap = session.snapshot();
        HostReply::Frame(FrameMessage {
            msg_type: FrameType::Frame,
            seq,
            ts: current_timestamp_ms(),
            session: id.to_string(),
            action: action.to_string(),
            size: snap.size,
            seed: snap.seed,
            row: snap.row,
            col: snap.col,
            heading: snap.heading.as_str().to_string(),
            view: snap.view.as_str().to_string(),
            at_finish: snap.at_finish,
            steps: snap.steps,
            format: encoder.format(),
            width: self.raster.width(),
            height: self.raster.height(),
            checksum: format!("{:016x}", self.raster.checksum()),
            image,
        })
    }
}

fn store_error(seq: u64, err: StoreError) -> HostReply {
    let code = match &err {
        StoreError::InvalidSize { .. } | StoreError::Grid(GridError::TooSmall { .. }) => {
            ErrorCode::InvalidSize
        }
        StoreError::Grid(_) => ErrorCode::InvalidCommand,
    };
    log::warn!("rejected command {}: {}", seq, err);
    HostReply::Error(create_error(seq, code, &err.to_string()))
}
