//! NFSv4 client and session registry.
//!
//! Clients are stored twice: by their opaque owner (so EXCHANGE_ID and
//! SETCLIENTID can rediscover them) and by the server-assigned 64-bit
//! client id. Sessions hang off clients and carry a fixed-size slot table
//! of open states; a stateid encodes its slot index and owning client id
//! in the `other` bytes, so an unknown stateid can be resolved without
//! any session context.
//!
//! One coarse mutex guards the whole registry; every mutation under it is
//! O(1) apart from the slot sweep on session destroy.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::protocol::xdr::nfs4::{
    channel_attrs4, clientid4, sessionid4, stateid4, NFS4_OTHER_SIZE,
};
use crate::vfs::dispatch::VfsRouter;
use crate::vfs::open_cache::OpenHandle;

/// Slots per session; a freelist stack of 16-bit indices bounds it.
pub const SESSION_MAX_SLOTS: usize = 1024;

/// Builds a stateid for a freshly allocated slot: the sequence starts at
/// 1, `other[0..4]` is the slot index and `other[4..12]` the client id,
/// both little-endian.
pub fn encode_stateid(slot: u16, clientid: clientid4) -> stateid4 {
    let mut other = [0u8; NFS4_OTHER_SIZE];
    other[0..4].copy_from_slice(&(slot as u32).to_le_bytes());
    other[4..12].copy_from_slice(&clientid.to_le_bytes());
    stateid4 { seqid: 1, other }
}

/// The slot index encoded in a stateid.
pub fn stateid_slot(stateid: &stateid4) -> u32 {
    u32::from_le_bytes(stateid.other[0..4].try_into().expect("stateid slot bytes"))
}

/// The owning client id encoded in a stateid.
pub fn stateid_client(stateid: &stateid4) -> clientid4 {
    u64::from_le_bytes(stateid.other[4..12].try_into().expect("stateid client bytes"))
}

/// One open state slot.
struct Nfs4State {
    active: bool,
    handle: Option<Arc<OpenHandle>>,
    /// Share access bits recorded at OPEN, adjusted by OPEN_DOWNGRADE.
    share_access: u32,
}

impl Default for Nfs4State {
    fn default() -> Nfs4State {
        Nfs4State { active: false, handle: None, share_access: 0 }
    }
}

struct SessionInner {
    slots: Vec<Nfs4State>,
    free_slots: Vec<u16>,
}

/// One NFSv4.1 session: identity, owning client, channel attributes and
/// the open-state slot table.
pub struct Session {
    /// 16-byte session identifier
    pub id: sessionid4,
    /// Owning client
    pub clientid: clientid4,
    /// Fore channel attributes agreed at CREATE_SESSION
    pub fore_attrs: channel_attrs4,
    /// Back channel attributes agreed at CREATE_SESSION
    pub back_attrs: channel_attrs4,
    inner: Mutex<SessionInner>,
}

impl Session {
    fn new(
        id: sessionid4,
        clientid: clientid4,
        fore_attrs: channel_attrs4,
        back_attrs: channel_attrs4,
    ) -> Session {
        let mut slots = Vec::with_capacity(SESSION_MAX_SLOTS);
        slots.resize_with(SESSION_MAX_SLOTS, Nfs4State::default);
        let free_slots = (0..SESSION_MAX_SLOTS as u16).rev().collect();
        Session {
            id,
            clientid,
            fore_attrs,
            back_attrs,
            inner: Mutex::new(SessionInner { slots, free_slots }),
        }
    }

    /// Allocates a state slot for a fresh open. Running out of slots is
    /// a server-side accounting bug, not a client error.
    pub fn alloc_slot(&self, handle: Arc<OpenHandle>, share_access: u32) -> stateid4 {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        let slot = inner.free_slots.pop().expect("no free session slots");
        let state = &mut inner.slots[slot as usize];
        state.active = true;
        state.handle = Some(handle);
        state.share_access = share_access;
        encode_stateid(slot, self.clientid)
    }

    /// Frees the slot named by the stateid, returning the open handle it
    /// held so the caller can release it.
    pub fn free_slot(&self, stateid: &stateid4) -> Option<Arc<OpenHandle>> {
        let slot = stateid_slot(stateid) as usize;
        if slot >= SESSION_MAX_SLOTS {
            return None;
        }
        let mut inner = self.inner.lock().expect("session lock poisoned");
        let state = &mut inner.slots[slot];
        if !state.active {
            return None;
        }
        state.active = false;
        state.share_access = 0;
        let handle = state.handle.take();
        inner.free_slots.push(slot as u16);
        handle
    }

    /// The open handle behind an active stateid.
    pub fn handle_of(&self, stateid: &stateid4) -> Option<Arc<OpenHandle>> {
        let slot = stateid_slot(stateid) as usize;
        if slot >= SESSION_MAX_SLOTS {
            return None;
        }
        let inner = self.inner.lock().expect("session lock poisoned");
        let state = &inner.slots[slot];
        if state.active {
            state.handle.clone()
        } else {
            None
        }
    }

    /// True when the stateid names an active slot of this session.
    pub fn stateid_is_active(&self, stateid: &stateid4) -> bool {
        let slot = stateid_slot(stateid) as usize;
        if slot >= SESSION_MAX_SLOTS {
            return false;
        }
        let inner = self.inner.lock().expect("session lock poisoned");
        inner.slots[slot].active
    }

    /// Adjusts the share access recorded on an active slot; used by
    /// OPEN_DOWNGRADE, which never reopens the backend handle.
    pub fn downgrade(&self, stateid: &stateid4, share_access: u32) -> bool {
        let slot = stateid_slot(stateid) as usize;
        if slot >= SESSION_MAX_SLOTS {
            return false;
        }
        let mut inner = self.inner.lock().expect("session lock poisoned");
        let state = &mut inner.slots[slot];
        if !state.active {
            return false;
        }
        state.share_access = share_access;
        true
    }

    /// Detaches every active slot's handle for the destroy sweep.
    fn drain_handles(&self) -> Vec<Arc<OpenHandle>> {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        let mut handles = Vec::new();
        for slot in 0..SESSION_MAX_SLOTS {
            let state = &mut inner.slots[slot];
            if state.active {
                state.active = false;
                if let Some(handle) = state.handle.take() {
                    handles.push(handle);
                }
                inner.free_slots.push(slot as u16);
            }
        }
        handles
    }
}

/// One registered client.
struct Nfs4Client {
    clientid: clientid4,
    owner: Vec<u8>,
    verifier: u64,
    confirmed: bool,
}

struct ClientTableInner {
    clients_by_owner: HashMap<Vec<u8>, clientid4>,
    clients_by_id: HashMap<clientid4, Nfs4Client>,
    sessions: HashMap<sessionid4, Arc<Session>>,
    next_client_id: clientid4,
    next_session_serial: u64,
}

/// The shared client/session registry.
pub struct ClientTable {
    inner: Mutex<ClientTableInner>,
}

impl Default for ClientTable {
    fn default() -> ClientTable {
        ClientTable::new()
    }
}

impl ClientTable {
    /// Creates an empty registry.
    pub fn new() -> ClientTable {
        ClientTable {
            inner: Mutex::new(ClientTableInner {
                clients_by_owner: HashMap::new(),
                clients_by_id: HashMap::new(),
                sessions: HashMap::new(),
                next_client_id: 1,
                next_session_serial: 1,
            }),
        }
    }

    /// Registers a client by owner, or rediscovers the existing
    /// registration. An owner returning with a new verifier gets a fresh
    /// client id (a rebooted client instance).
    pub fn register(&self, owner: &[u8], verifier: u64) -> clientid4 {
        let mut inner = self.inner.lock().expect("client table lock poisoned");
        if let Some(&clientid) = inner.clients_by_owner.get(owner) {
            let known = inner.clients_by_id.get_mut(&clientid).expect("client index out of sync");
            if known.verifier == verifier {
                return clientid;
            }
            inner.clients_by_id.remove(&clientid);
            inner.clients_by_owner.remove(owner);
        }

        let clientid = inner.next_client_id;
        inner.next_client_id += 1;
        inner.clients_by_owner.insert(owner.to_vec(), clientid);
        inner.clients_by_id.insert(
            clientid,
            Nfs4Client { clientid, owner: owner.to_vec(), verifier, confirmed: false },
        );
        info!("registered nfs4 client {} ({} owner bytes)", clientid, owner.len());
        clientid
    }

    /// Marks a v4.0 client as confirmed (SETCLIENTID_CONFIRM).
    pub fn confirm(&self, clientid: clientid4) -> bool {
        let mut inner = self.inner.lock().expect("client table lock poisoned");
        match inner.clients_by_id.get_mut(&clientid) {
            Some(client) => {
                client.confirmed = true;
                true
            }
            None => false,
        }
    }

    /// True when the client id is registered.
    pub fn is_registered(&self, clientid: clientid4) -> bool {
        let inner = self.inner.lock().expect("client table lock poisoned");
        inner.clients_by_id.contains_key(&clientid)
    }

    /// Removes a client registration. Fails while the client still has
    /// sessions.
    pub fn unregister(&self, clientid: clientid4) -> bool {
        let mut inner = self.inner.lock().expect("client table lock poisoned");
        if inner.sessions.values().any(|s| s.clientid == clientid) {
            return false;
        }
        match inner.clients_by_id.remove(&clientid) {
            Some(client) => {
                inner.clients_by_owner.remove(&client.owner);
                debug!("unregistered nfs4 client {}", client.clientid);
                true
            }
            None => false,
        }
    }

    /// Creates a session for a registered client; the slot count is
    /// bounded by the session slot table size.
    pub fn create_session(
        &self,
        clientid: clientid4,
        fore_attrs: channel_attrs4,
        back_attrs: channel_attrs4,
    ) -> Option<Arc<Session>> {
        let mut inner = self.inner.lock().expect("client table lock poisoned");
        if !inner.clients_by_id.contains_key(&clientid) {
            return None;
        }

        let serial = inner.next_session_serial;
        inner.next_session_serial += 1;
        let mut id = [0u8; 16];
        id[0..8].copy_from_slice(&clientid.to_le_bytes());
        id[8..16].copy_from_slice(&serial.to_le_bytes());

        let mut fore_attrs = fore_attrs;
        fore_attrs.ca_maxrequests = fore_attrs.ca_maxrequests.min(SESSION_MAX_SLOTS as u32);

        let session = Arc::new(Session::new(id, clientid, fore_attrs, back_attrs));
        inner.sessions.insert(id, session.clone());
        info!("created nfs4 session for client {}", clientid);
        Some(session)
    }

    /// Looks up a session by id.
    pub fn session(&self, id: &sessionid4) -> Option<Arc<Session>> {
        let inner = self.inner.lock().expect("client table lock poisoned");
        inner.sessions.get(id).cloned()
    }

    /// Finds any session owned by the client; the fast path for
    /// resolving a stateid when the connection has no session attached.
    pub fn session_by_clientid(&self, clientid: clientid4) -> Option<Arc<Session>> {
        let inner = self.inner.lock().expect("client table lock poisoned");
        inner.sessions.values().find(|s| s.clientid == clientid).cloned()
    }

    /// Resolves the session owning a stateid: the attached session when
    /// present, otherwise by the client id embedded in the stateid.
    pub fn resolve_session(
        &self,
        attached: Option<Arc<Session>>,
        stateid: &stateid4,
    ) -> Option<Arc<Session>> {
        if let Some(session) = attached {
            return Some(session);
        }
        self.session_by_clientid(stateid_client(stateid))
    }

    /// Destroys a session: the table entry is unhashed first, then every
    /// active slot's open handle is released through the router. Ops
    /// already holding a clone of a slot's handle run to completion.
    pub fn destroy_session(&self, id: &sessionid4, router: &VfsRouter) -> bool {
        let session = {
            let mut inner = self.inner.lock().expect("client table lock poisoned");
            inner.sessions.remove(id)
        };
        match session {
            Some(session) => {
                let handles = session.drain_handles();
                debug!(
                    "destroyed nfs4 session of client {}, releasing {} states",
                    session.clientid,
                    handles.len()
                );
                for handle in handles {
                    router.release(&handle);
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stateid_roundtrip() {
        let stateid = encode_stateid(713, 0xDEAD_BEEF_0BAD_F00D);
        assert_eq!(stateid.seqid, 1);
        assert_eq!(stateid_slot(&stateid), 713);
        assert_eq!(stateid_client(&stateid), 0xDEAD_BEEF_0BAD_F00D);
    }

    #[test]
    fn reregistering_same_owner_same_verifier_is_stable() {
        let table = ClientTable::new();
        let a = table.register(b"owner-a", 7);
        assert_eq!(table.register(b"owner-a", 7), a);
        // A new verifier means the client rebooted; it gets a new id.
        let b = table.register(b"owner-a", 8);
        assert_ne!(a, b);
        assert!(!table.is_registered(a));
        assert!(table.is_registered(b));
    }

    #[test]
    fn session_requires_registered_client() {
        let table = ClientTable::new();
        assert!(table
            .create_session(42, Default::default(), Default::default())
            .is_none());
        let id = table.register(b"owner", 1);
        let session = table.create_session(id, Default::default(), Default::default()).unwrap();
        assert_eq!(table.session(&session.id).unwrap().clientid, id);
        assert!(table.session_by_clientid(id).is_some());
    }
}
