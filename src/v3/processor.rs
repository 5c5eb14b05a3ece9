//! The message-processing model (RFC 3412 §4): msgID allocation, the
//! outstanding-request cache, and cross-checking a Response/Report against
//! the request that provoked it.
//!
//! Grounded on the same shape the teacher's shared UDP transport uses for
//! its own request/response correlation: a `std::sync::Mutex`-guarded table
//! keyed by a wire-visible ID, with a `tokio::sync::oneshot` channel as the
//! one-shot delivery slot per entry.

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::ber::EncodeBuf;
use crate::error::{Error, Result};
use crate::pdu::Pdu;
use crate::security::{SecurityLevel, SecurityModel, SecurityModule};
use crate::v3::engine::DEFAULT_MSG_MAX_SIZE;
use crate::v3::message::{HeaderData, MessageFlags, ScopedPdu, SnmpV3Message};

/// msgID is a 31-bit non-negative value (RFC 3412 §6.3); 0 is reserved so a
/// freshly-initialized generator drawing 0 doesn't hand out an ambiguous ID.
const MAX_MSG_ID: i32 = i32::MAX;
const MAX_ALLOC_ATTEMPTS: u32 = 10;
const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(60);

/// One outstanding request's expected response shape, consulted when its
/// Response/Report arrives.
///
/// Ports the Python original's `CacheEntry` (held in a `MessagePreparer`
/// dict keyed by msgID) to this crate's ownership idiom: instead of a
/// weakref the caller polls, the entry carries the oneshot sender directly,
/// and [`RequestHandle`]'s `Drop` is the cancellation token.
struct CacheEntry {
    engine_id: Bytes,
    context_name: Bytes,
    security_name: Bytes,
    security_model: SecurityModel,
    security_level: SecurityLevel,
    sender: oneshot::Sender<Result<IncomingMessage>>,
    deadline: Instant,
}

/// A fully unwrapped, cross-checked incoming message, delivered to the
/// [`RequestHandle`] that requested it.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub security_engine_id: Bytes,
    pub security_name: Bytes,
    pub security_level: SecurityLevel,
    pub scoped_pdu: ScopedPdu,
}

/// The receiving half of a prepared request.
///
/// Resolves once [`MessageProcessor::process_incoming_message`] matches a
/// Response/Report to this handle's msgID. This is the single cancellation
/// token for an outstanding request: dropping it before a match arrives
/// removes the [`CacheEntry`] immediately (the registered-callback policy),
/// so a response that arrives afterward finds no entry and is reported as
/// [`Error::LateResponse`] rather than lingering until [`MessageProcessor::sweep`]
/// next runs.
pub struct RequestHandle {
    msg_id: i32,
    // `Option` because `recv` needs to hand the receiver to
    // `tokio::time::timeout` by value, and a type with a `Drop` impl can't
    // have a field moved out of it directly; `Option::take` sidesteps that.
    receiver: Option<oneshot::Receiver<Result<IncomingMessage>>>,
    outstanding: Arc<Mutex<HashMap<i32, CacheEntry>>>,
}

impl RequestHandle {
    pub fn msg_id(&self) -> i32 {
        self.msg_id
    }

    /// Await the matching response, failing with [`Error::Timeout`] if none
    /// arrives first.
    pub async fn recv(mut self, timeout: Duration) -> Result<IncomingMessage> {
        let msg_id = self.msg_id;
        let receiver = self.receiver.take().expect("recv consumes the handle");
        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::LateResponse { msg_id }),
            Err(_) => Err(Error::Timeout {
                target: None,
                elapsed: timeout,
                request_id: msg_id,
                retries: 0,
            }),
        }
    }
}

impl Drop for RequestHandle {
    fn drop(&mut self) {
        self.outstanding.lock().unwrap().remove(&self.msg_id);
    }
}

/// RFC 3412 §4's message processing model, parameterized over a single
/// [`SecurityModule`] (USM is the only one this crate implements).
pub struct MessageProcessor<S> {
    security: S,
    outstanding: Arc<Mutex<HashMap<i32, CacheEntry>>>,
    next_msg_id: AtomicI32,
}

impl<S: SecurityModule> MessageProcessor<S> {
    pub fn new(security: S) -> Self {
        Self {
            security,
            outstanding: Arc::new(Mutex::new(HashMap::new())),
            next_msg_id: AtomicI32::new(initial_msg_id_seed()),
        }
    }

    pub fn security(&self) -> &S {
        &self.security
    }

    fn alloc_msg_id(&self) -> i32 {
        loop {
            let id = self.next_msg_id.fetch_add(1, Ordering::Relaxed) & MAX_MSG_ID;
            if id != 0 {
                return id;
            }
        }
    }

    fn cache(&self, entry: CacheEntry) -> Result<i32> {
        let mut outstanding = self.outstanding.lock().unwrap();
        for _ in 0..MAX_ALLOC_ATTEMPTS {
            let id = self.alloc_msg_id();
            if let MapEntry::Vacant(slot) = outstanding.entry(id) {
                slot.insert(entry);
                return Ok(id);
            }
        }
        Err(Error::MsgIdExhausted {
            attempts: MAX_ALLOC_ATTEMPTS,
        })
    }

    fn uncache(&self, msg_id: i32) -> Option<CacheEntry> {
        self.outstanding.lock().unwrap().remove(&msg_id)
    }

    /// Remove outstanding entries whose deadline has passed. Dropping a
    /// [`RequestHandle`] already evicts its own entry immediately, so this
    /// only matters for entries whose handle is still held (e.g. a caller
    /// stuck waiting elsewhere); an optional counterpart to the teacher's
    /// inline per-receive-loop-iteration sweep, not required for correctness.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.outstanding.lock().unwrap().retain(|_, entry| entry.deadline > now);
    }

    /// Build and serialize an outgoing message, caching an entry so the
    /// matching Response/Report can be routed back to the returned handle.
    #[allow(clippy::too_many_arguments)]
    pub fn prepare_outgoing_message(
        &self,
        pdu: Pdu,
        engine_id: impl Into<Bytes>,
        security_name: impl Into<Bytes>,
        security_level: SecurityLevel,
        context_name: impl Into<Bytes>,
        timeout: Duration,
    ) -> Result<(Bytes, RequestHandle)> {
        let engine_id = engine_id.into();
        let security_name = security_name.into();
        let context_name = context_name.into();
        let reportable = pdu.is_confirmed();

        let (sender, receiver) = oneshot::channel();
        let entry = CacheEntry {
            engine_id: engine_id.clone(),
            context_name: context_name.clone(),
            security_name: security_name.clone(),
            security_model: self.security.model(),
            security_level,
            sender,
            deadline: Instant::now() + timeout.max(DEFAULT_ENTRY_TTL),
        };
        let msg_id = self.cache(entry)?;

        let scoped_pdu = ScopedPdu::new(engine_id.clone(), context_name, pdu);
        let scoped_bytes = scoped_pdu.encode_to_bytes();

        let (security_parameters, payload) = match self
            .security
            .prepare_outgoing(&engine_id, &security_name, security_level, &scoped_bytes)
        {
            Ok(result) => result,
            Err(err) => {
                self.uncache(msg_id);
                return Err(err);
            }
        };

        let header = HeaderData {
            msg_id,
            msg_max_size: DEFAULT_MSG_MAX_SIZE,
            flags: MessageFlags::new(security_level, reportable),
            security_model: self.security.model().as_i32(),
        };
        let message = SnmpV3Message {
            header,
            security_parameters,
            data: payload,
        };

        let mut buf = EncodeBuf::new();
        message.encode(&mut buf);

        Ok((
            buf.finish(),
            RequestHandle {
                msg_id,
                receiver: Some(receiver),
                outstanding: self.outstanding.clone(),
            },
        ))
    }

    /// Parse a received datagram, unwrap its security layer, and route the
    /// result to the outstanding [`RequestHandle`] whose msgID it matches.
    ///
    /// Returns `Ok(())` once the match (or a definitive rejection) has been
    /// delivered to the handle's `sender`; errors returned here are ones
    /// that occurred before a msgID could even be identified (malformed
    /// envelope) or that don't correspond to any cached request.
    pub fn process_incoming_message(&self, whole_message: &[u8]) -> Result<()> {
        let message = SnmpV3Message::decode_from_bytes(Bytes::copy_from_slice(whole_message))?;

        if SecurityModel::from_i32(message.header.security_model) != self.security.model() {
            return Err(Error::UnsupportedFeature("security model not handled by this processor"));
        }

        let security_level = message
            .header
            .flags
            .security_level()
            .ok_or(Error::InvalidMessage("msgFlags: privacy without authentication"))?;

        let secure_data = self.security.process_incoming(
            whole_message,
            &message.security_parameters,
            &message.data,
            security_level,
        )?;
        let scoped_pdu = ScopedPdu::decode_from_bytes(secure_data.data)?;

        if !matches!(scoped_pdu.pdu, Pdu::Response(_) | Pdu::Report(_)) {
            return Err(Error::UnsupportedFeature("only Response/Report PDUs are accepted here"));
        }
        let is_report = scoped_pdu.pdu.is_internal();

        let msg_id = message.header.msg_id;
        let entry = match self.uncache(msg_id) {
            Some(entry) => entry,
            None => return Err(Error::LateResponse { msg_id }),
        };

        if let Err(reason) = cross_check(&entry, &secure_data.security_engine_id, &secure_data.security_name, secure_data.security_level, &scoped_pdu, is_report)
        {
            let _ = entry.sender.send(Err(Error::ResponseMismatch { msg_id, reason }));
            return Err(Error::ResponseMismatch { msg_id, reason });
        }

        let incoming = IncomingMessage {
            security_engine_id: secure_data.security_engine_id,
            security_name: secure_data.security_name,
            security_level: secure_data.security_level,
            scoped_pdu,
        };
        let _ = entry.sender.send(Ok(incoming));
        Ok(())
    }
}

/// RFC 3412 §4's ordered field comparison, stopping at the first mismatch.
/// Report PDUs (generated internally, not genuine responses) skip the
/// checks that only make sense for an authenticated reply: security level,
/// security engine ID, and context engine ID.
fn cross_check(
    entry: &CacheEntry,
    security_engine_id: &[u8],
    security_name: &[u8],
    security_level: SecurityLevel,
    scoped_pdu: &ScopedPdu,
    is_report: bool,
) -> std::result::Result<(), &'static str> {
    if !is_report && security_level < entry.security_level {
        return Err("security level does not match request");
    }
    if !is_report && !entry.engine_id.is_empty() && entry.engine_id != security_engine_id {
        return Err("security engine ID does not match request");
    }
    if entry.security_name != security_name {
        return Err("security name does not match request");
    }
    if !is_report && !entry.engine_id.is_empty() && entry.engine_id != scoped_pdu.context_engine_id {
        return Err("context engine ID does not match request");
    }
    if entry.context_name != scoped_pdu.context_name {
        return Err("context name does not match request");
    }
    Ok(())
}

/// Seed the msgID generator away from 0 using wall-clock entropy, so a
/// fresh process restarting quickly doesn't immediately reuse IDs a peer
/// might still associate with the previous incarnation.
fn initial_msg_id_seed() -> i32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i32)
        .unwrap_or(1);
    (nanos & MAX_MSG_ID).max(1)
}
