//! Handles returned by [`World::request_chunk`](crate::World::request_chunk).

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use strata_voxel::ChunkCoord;

use crate::error::WorldError;
use crate::world::{SharedChunk, World};

/// What a pending request eventually receives. Failures are shared between
/// every coalesced waiter.
pub type Delivery = Result<SharedChunk, Arc<WorldError>>;

const PUMP_INTERVAL: Duration = Duration::from_millis(5);

/// A chunk that is either already available or being produced by a worker.
#[derive(Debug)]
pub enum ChunkRequest {
    Ready(Option<Result<SharedChunk, WorldError>>),
    Waiting {
        coord: ChunkCoord,
        rx: Receiver<Delivery>,
    },
}

impl ChunkRequest {
    pub(crate) fn ready(chunk: SharedChunk) -> Self {
        Self::Ready(Some(Ok(chunk)))
    }

    pub fn coord(&self) -> Option<ChunkCoord> {
        match self {
            Self::Ready(Some(Ok(chunk))) => Some(chunk.read().coord()),
            Self::Ready(_) => None,
            Self::Waiting { coord, .. } => Some(*coord),
        }
    }

    /// True once [`try_take`](Self::try_take) would yield a value.
    pub fn is_ready(&self) -> bool {
        match self {
            Self::Ready(slot) => slot.is_some(),
            Self::Waiting { rx, .. } => !rx.is_empty(),
        }
    }

    /// Blocks until the chunk is delivered.
    ///
    /// Someone else must be pumping the world, otherwise this never returns.
    /// Callers that own the world use [`wait_pumping`](Self::wait_pumping).
    pub fn wait(self) -> Result<SharedChunk, WorldError> {
        match self {
            Self::Ready(slot) => slot.unwrap_or(Err(WorldError::WorkerGone)),
            Self::Waiting { rx, .. } => match rx.recv() {
                Ok(delivery) => delivery.map_err(WorldError::Shared),
                Err(_) => Err(WorldError::WorkerGone),
            },
        }
    }

    /// Polls without blocking. Yields the result at most once.
    pub fn try_take(&mut self) -> Option<Result<SharedChunk, WorldError>> {
        match self {
            Self::Ready(slot) => slot.take(),
            Self::Waiting { rx, .. } => match rx.try_recv() {
                Ok(delivery) => {
                    let out = delivery.map_err(WorldError::Shared);
                    *self = Self::Ready(None);
                    Some(out)
                }
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    *self = Self::Ready(None);
                    Some(Err(WorldError::WorkerGone))
                }
            },
        }
    }

    /// Drives `world` until this request resolves.
    pub fn wait_pumping(mut self, world: &mut World) -> Result<SharedChunk, WorldError> {
        loop {
            if let Self::Ready(None) = self {
                return Err(WorldError::WorkerGone);
            }
            if let Some(result) = self.try_take() {
                return result;
            }
            world.pump_wait(PUMP_INTERVAL)?;
        }
    }
}
