//! Room-scoped broadcast transports

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::NetError;

/// Fire-and-forget broadcast to everyone in the room, sender included
pub trait PeerChannel: Send + Sync {
    fn send(&mut self, payload: &[u8]) -> Result<(), NetError>;

    /// Drain every payload received since the last poll
    fn poll(&mut self) -> Result<Vec<Vec<u8>>, NetError>;

    /// Leave the room. Further sends fail with [`NetError::Closed`].
    fn close(&mut self);
}

#[derive(Default)]
struct RoomState {
    queues: Vec<Option<VecDeque<Vec<u8>>>>,
    offline: bool,
}

/// In-process room shared by several [`LoopbackChannel`]s (tests, simulations, local demos)
#[derive(Clone, Default)]
pub struct LoopbackRoom {
    state: Arc<Mutex<RoomState>>,
}

impl LoopbackRoom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the room with a fresh subscriber queue
    pub fn connect(&self) -> LoopbackChannel {
        let id = match self.state.lock() {
            Ok(mut state) => {
                state.queues.push(Some(VecDeque::new()));
                Some(state.queues.len() - 1)
            }
            Err(_) => None,
        };
        LoopbackChannel {
            room: self.clone(),
            id,
        }
    }

    /// Simulate the transport going down: every send fails until restored
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.offline = offline;
        }
    }
}

pub struct LoopbackChannel {
    room: LoopbackRoom,
    id: Option<usize>,
}

impl PeerChannel for LoopbackChannel {
    fn send(&mut self, payload: &[u8]) -> Result<(), NetError> {
        if self.id.is_none() {
            return Err(NetError::Closed);
        }
        let mut state = self.room.state.lock().map_err(|_| NetError::Closed)?;
        if state.offline {
            return Err(NetError::Offline);
        }
        for queue in state.queues.iter_mut().flatten() {
            queue.push_back(payload.to_vec());
        }
        Ok(())
    }

    fn poll(&mut self) -> Result<Vec<Vec<u8>>, NetError> {
        let Some(id) = self.id else {
            return Err(NetError::Closed);
        };
        let mut state = self.room.state.lock().map_err(|_| NetError::Closed)?;
        match state.queues.get_mut(id) {
            Some(Some(queue)) => Ok(queue.drain(..).collect()),
            _ => Err(NetError::Closed),
        }
    }

    fn close(&mut self) {
        if let Some(id) = self.id.take()
            && let Ok(mut state) = self.room.state.lock()
            && let Some(slot) = state.queues.get_mut(id)
        {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_broadcasts_to_everyone() {
        let room = LoopbackRoom::new();
        let mut a = room.connect();
        let mut b = room.connect();
        a.send(b"hello").unwrap();
        assert_eq!(a.poll().unwrap(), vec![b"hello".to_vec()]);
        assert_eq!(b.poll().unwrap(), vec![b"hello".to_vec()]);
        assert!(b.poll().unwrap().is_empty());
    }

    #[test]
    fn test_offline_room_fails_sends() {
        let room = LoopbackRoom::new();
        let mut a = room.connect();
        room.set_offline(true);
        assert!(matches!(a.send(b"x"), Err(NetError::Offline)));
        room.set_offline(false);
        assert!(a.send(b"x").is_ok());
    }

    #[test]
    fn test_closed_channel_stops_receiving() {
        let room = LoopbackRoom::new();
        let mut a = room.connect();
        let mut b = room.connect();
        b.close();
        a.send(b"after").unwrap();
        assert!(matches!(b.poll(), Err(NetError::Closed)));
        assert!(matches!(b.send(b"x"), Err(NetError::Closed)));
        b.close();
    }
}
