use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Read-back state of one staging buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub(super) enum MapState {
    /// Unmapped; may receive a new copy.
    Idle = 0,
    /// `map_async` issued, callback not yet run.
    Pending = 1,
    /// Mapped and holding the value for the read in progress.
    Ready = 2,
    /// Mapping failed; the buffer is not mapped.
    Failed = 3,
    /// Given up on while pending; the late result must not be read.
    Abandoned = 4,
    /// An abandoned mapping that completed; mapped but stale.
    Stale = 5,
}

impl MapState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Idle,
            1 => Self::Pending,
            2 => Self::Ready,
            3 => Self::Failed,
            4 => Self::Abandoned,
            _ => Self::Stale,
        }
    }

    /// State after the `map_async` callback reports `ok`.
    ///
    /// Only in-flight states change; anything else means the callback is
    /// not ours to act on.
    pub(super) fn on_mapped(self, ok: bool) -> Self {
        match (self, ok) {
            (Self::Pending, true) => Self::Ready,
            (Self::Abandoned, true) => Self::Stale,
            (Self::Pending | Self::Abandoned, false) => Self::Failed,
            (other, _) => other,
        }
    }

    /// True while the staging buffer may be a copy target.
    pub(super) fn can_record(self) -> bool {
        self == Self::Idle
    }

    /// True when the buffer is mapped and must be unmapped before reuse.
    pub(super) fn is_mapped(self) -> bool {
        matches!(self, Self::Ready | Self::Stale)
    }
}

/// What a read does with a slot after polling the device.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(super) enum ReadAction {
    /// Nothing was copied for this query.
    NotRecorded,
    /// Still mapping after a non-blocking poll: warn, then block.
    Wait,
    /// Still mapping after a blocking poll: abandon the slot.
    Abandon,
    /// Abandoned earlier and not completed yet.
    InFlight,
    /// Read the value, unmap, back to idle.
    Read,
    /// Drop the slot's content, unmapping first when `unmap`.
    Discard { unmap: bool },
}

pub(super) fn read_action(state: MapState, blocked: bool) -> ReadAction {
    match state {
        MapState::Idle => ReadAction::NotRecorded,
        MapState::Pending if blocked => ReadAction::Abandon,
        MapState::Pending => ReadAction::Wait,
        MapState::Abandoned => ReadAction::InFlight,
        MapState::Ready => ReadAction::Read,
        MapState::Failed => ReadAction::Discard { unmap: false },
        MapState::Stale => ReadAction::Discard { unmap: true },
    }
}

/// `MapState` shared between the render thread and the `map_async` callback.
#[derive(Debug, Clone)]
pub(super) struct MapSlot(Arc<AtomicU8>);

impl MapSlot {
    pub(super) fn new() -> Self {
        Self(Arc::new(AtomicU8::new(MapState::Idle as u8)))
    }

    pub(super) fn get(&self) -> MapState {
        MapState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Idle → Pending. Returns false if the slot was not idle.
    pub(super) fn begin_map(&self) -> bool {
        self.transition(MapState::Idle, MapState::Pending)
    }

    /// Applies the callback result. Called from the wgpu callback.
    pub(super) fn complete(&self, ok: bool) {
        let _ = self.0.fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
            let cur = MapState::from_u8(v);
            let next = cur.on_mapped(ok);
            (next != cur).then_some(next as u8)
        });
    }

    /// Pending → Abandoned. Returns false if the callback got there first.
    pub(super) fn abandon(&self) -> bool {
        self.transition(MapState::Pending, MapState::Abandoned)
    }

    pub(super) fn reset(&self) {
        self.0.store(MapState::Idle as u8, Ordering::Release);
    }

    fn transition(&self, from: MapState, to: MapState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
