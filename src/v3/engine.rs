//! Remote engine bookkeeping: discovery, timeliness, and Report
//! classification (RFC 3414 §4).
//!
//! An [`EngineState`] tracks one remote authoritative engine's last-known
//! `engineBoots`/`engineTime` pair and the local clock reading taken when
//! that pair was observed, so the current `engineTime` estimate can be
//! recovered without a fresh round trip. [`EngineCache`] keyed by engineID
//! is what a [`crate::v3::usm::UsmSecurityModule`] consults for both the
//! outgoing path (filling authoritativeEngine{ID,Boots,Time}) and the
//! incoming timeliness check.

use std::collections::HashMap;
use std::time::Instant;

use bytes::Bytes;

use crate::pdu::Pdu;

/// RFC 3412's minimum `msgMaxSize`; also this crate's default when
/// constructing outgoing messages before a peer's actual limit is known.
pub const DEFAULT_MSG_MAX_SIZE: i32 = 1472;

/// `engineBoots` saturates at 2^31 - 1 (RFC 3414 §2.2.2); once an engine
/// reports this value every further message from it is treated as
/// permanently stale and rejected with `NotInTimeWindow`.
pub const MAX_ENGINE_TIME: i32 = i32::MAX;

/// The timeliness window (RFC 3414 §3.2, step 7b): a message is stale if
/// the local clock has drifted from the claimed `engineTime` by more than
/// this many seconds.
pub const TIME_WINDOW: i32 = 150;

/// What's known locally about one remote authoritative engine.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub engine_boots: i32,
    pub engine_time: i32,
    /// Local monotonic clock reading taken when `engine_time` was observed,
    /// used to project the peer's current time without another exchange.
    observed_at: Instant,
}

impl EngineState {
    pub fn new(engine_boots: i32, engine_time: i32) -> Self {
        Self {
            engine_boots,
            engine_time,
            observed_at: Instant::now(),
        }
    }

    /// The peer's estimated current `engineTime`, projected forward from
    /// the last observation by however much local wall-clock time has
    /// elapsed.
    pub fn estimated_engine_time(&self) -> i32 {
        let elapsed = self.observed_at.elapsed().as_secs();
        self.engine_time.saturating_add(elapsed.min(i32::MAX as u64) as i32)
    }

    /// Whether `engine_boots` has saturated, per RFC 3414 §2.2.2 — once
    /// true, the engine can never again be considered in-window.
    pub fn is_boots_saturated(&self) -> bool {
        self.engine_boots == MAX_ENGINE_TIME
    }

    /// RFC 3414 §3.2 step 7b timeliness check against a freshly received
    /// (boots, time) pair.
    pub fn is_in_time_window(&self, received_boots: i32, received_time: i32) -> bool {
        if self.is_boots_saturated() {
            return false;
        }
        if received_boots != self.engine_boots {
            return false;
        }
        (received_time - self.estimated_engine_time()).abs() <= TIME_WINDOW
    }

    /// Update after receiving an authenticated message with a newer
    /// (boots, time) than previously recorded.
    pub fn observe(&mut self, engine_boots: i32, engine_time: i32) {
        self.engine_boots = engine_boots;
        self.engine_time = engine_time;
        self.observed_at = Instant::now();
    }
}

/// Per-engineID table of [`EngineState`], shared by every user authenticating
/// to a given remote engine.
#[derive(Debug, Default)]
pub struct EngineCache {
    engines: HashMap<Bytes, EngineState>,
}

impl EngineCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, engine_id: &[u8]) -> Option<&EngineState> {
        self.engines.get(engine_id)
    }

    /// Insert or overwrite the record for `engine_id` (used after a
    /// successful discovery exchange or a newer authenticated observation).
    pub fn record(&mut self, engine_id: Bytes, engine_boots: i32, engine_time: i32) {
        match self.engines.get_mut(&engine_id) {
            Some(state) => state.observe(engine_boots, engine_time),
            None => {
                self.engines.insert(engine_id, EngineState::new(engine_boots, engine_time));
            }
        }
    }

    pub fn remove(&mut self, engine_id: &[u8]) {
        self.engines.remove(engine_id);
    }
}

/// A successful engine-discovery parse: the authoritative engine's claimed
/// identity and clock, read off a Report PDU's varbinds.
#[derive(Debug, Clone)]
pub struct DiscoveryResponse {
    pub engine_id: Bytes,
    pub engine_boots: i32,
    pub engine_time: i32,
}

/// Parse a discovery Report's usmStats varbinds into the authoritative
/// engine's (id, boots, time), applying this crate's default sanity limits.
///
/// `security_engine_id` and the boots/time pair are carried in the Report's
/// own `UsmSecurityParams`, not its varbind list (RFC 3414 §4); callers pass
/// those fields in directly since the varbinds themselves only carry the
/// usmStats counter being reported.
pub fn parse_discovery_response(engine_id: Bytes, engine_boots: i32, engine_time: i32) -> Option<DiscoveryResponse> {
    parse_discovery_response_with_limits(engine_id, engine_boots, engine_time, DEFAULT_MSG_MAX_SIZE as usize)
}

/// As [`parse_discovery_response`], but with an explicit cap on the
/// engineID length (RFC 3411 §5 bounds it at 32 octets; callers with a
/// smaller transport MTU may pass a tighter limit).
pub fn parse_discovery_response_with_limits(
    engine_id: Bytes,
    engine_boots: i32,
    engine_time: i32,
    max_engine_id_len: usize,
) -> Option<DiscoveryResponse> {
    if engine_id.is_empty() || engine_id.len() > max_engine_id_len.min(32) {
        return None;
    }
    if engine_boots < 0 || engine_time < 0 {
        return None;
    }
    Some(DiscoveryResponse {
        engine_id,
        engine_boots,
        engine_time,
    })
}

/// usmStats OID arcs (RFC 3414 §5), the last sub-identifier under
/// `1.3.6.1.6.3.15.1.1`, used to classify which counter a Report PDU is
/// reporting.
mod usm_stats {
    pub const UNSUPPORTED_SEC_LEVELS: u32 = 1;
    pub const NOT_IN_TIME_WINDOWS: u32 = 2;
    pub const UNKNOWN_USER_NAMES: u32 = 3;
    pub const UNKNOWN_ENGINE_IDS: u32 = 4;
    pub const WRONG_DIGESTS: u32 = 5;
    pub const DECRYPTION_ERRORS: u32 = 6;
}

/// Whether `pdu` is a Report carrying exactly one varbind whose OID ends in
/// the given usmStats arc — the shape every usmStats Report takes.
fn is_report_with_arc(pdu: &Pdu, arc: u32) -> bool {
    let Pdu::Report(body) = pdu else { return false };
    match body.varbinds.as_slice() {
        [vb] => vb.oid.arcs().last().copied() == Some(arc),
        _ => false,
    }
}

pub fn is_unsupported_sec_level_report(pdu: &Pdu) -> bool {
    is_report_with_arc(pdu, usm_stats::UNSUPPORTED_SEC_LEVELS)
}

pub fn is_not_in_time_window_report(pdu: &Pdu) -> bool {
    is_report_with_arc(pdu, usm_stats::NOT_IN_TIME_WINDOWS)
}

pub fn is_unknown_user_name_report(pdu: &Pdu) -> bool {
    is_report_with_arc(pdu, usm_stats::UNKNOWN_USER_NAMES)
}

pub fn is_unknown_engine_id_report(pdu: &Pdu) -> bool {
    is_report_with_arc(pdu, usm_stats::UNKNOWN_ENGINE_IDS)
}

pub fn is_wrong_digest_report(pdu: &Pdu) -> bool {
    is_report_with_arc(pdu, usm_stats::WRONG_DIGESTS)
}

pub fn is_decryption_error_report(pdu: &Pdu) -> bool {
    is_report_with_arc(pdu, usm_stats::DECRYPTION_ERRORS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::RequestPdu;
    use crate::value::Value;
    use crate::varbind::VarBind;

    fn report_with_arc(arc: u32) -> Pdu {
        let oid = oid!(1, 3, 6, 1, 6, 3, 15, 1, 1, arc, 0);
        Pdu::Report(RequestPdu::new(1, vec![VarBind::new(oid, Value::Counter32(0))]))
    }

    #[test]
    fn test_engine_state_time_window() {
        let state = EngineState::new(1, 1000);
        assert!(state.is_in_time_window(1, 1000));
        assert!(state.is_in_time_window(1, 1000 + TIME_WINDOW));
        assert!(!state.is_in_time_window(1, 1000 + TIME_WINDOW + 1));
        assert!(!state.is_in_time_window(2, 1000));
    }

    #[test]
    fn test_engine_state_saturated_boots_never_in_window() {
        let state = EngineState::new(MAX_ENGINE_TIME, 1000);
        assert!(!state.is_in_time_window(MAX_ENGINE_TIME, 1000));
    }

    #[test]
    fn test_engine_cache_record_and_get() {
        let mut cache = EngineCache::new();
        let id = Bytes::from_static(b"engine-1");
        cache.record(id.clone(), 1, 100);
        assert_eq!(cache.get(&id).unwrap().engine_time, 100);
        cache.record(id.clone(), 1, 200);
        assert_eq!(cache.get(&id).unwrap().engine_time, 200);
    }

    #[test]
    fn test_parse_discovery_response_rejects_empty_engine_id() {
        assert!(parse_discovery_response(Bytes::new(), 0, 0).is_none());
    }

    #[test]
    fn test_parse_discovery_response_rejects_oversized_engine_id() {
        let oversized = Bytes::from(vec![0u8; 64]);
        assert!(parse_discovery_response(oversized, 0, 0).is_none());
    }

    #[test]
    fn test_parse_discovery_response_accepts_valid() {
        let id = Bytes::from_static(b"\x80\x00\x00\x01");
        let discovered = parse_discovery_response(id.clone(), 3, 500).unwrap();
        assert_eq!(discovered.engine_id, id);
        assert_eq!(discovered.engine_boots, 3);
        assert_eq!(discovered.engine_time, 500);
    }

    #[test]
    fn test_report_classification() {
        assert!(is_unknown_engine_id_report(&report_with_arc(
            usm_stats::UNKNOWN_ENGINE_IDS
        )));
        assert!(is_not_in_time_window_report(&report_with_arc(
            usm_stats::NOT_IN_TIME_WINDOWS
        )));
        assert!(is_wrong_digest_report(&report_with_arc(usm_stats::WRONG_DIGESTS)));
        assert!(is_decryption_error_report(&report_with_arc(
            usm_stats::DECRYPTION_ERRORS
        )));
        assert!(is_unknown_user_name_report(&report_with_arc(
            usm_stats::UNKNOWN_USER_NAMES
        )));
        assert!(is_unsupported_sec_level_report(&report_with_arc(
            usm_stats::UNSUPPORTED_SEC_LEVELS
        )));
        assert!(!is_unknown_engine_id_report(&report_with_arc(
            usm_stats::WRONG_DIGESTS
        )));
    }

    #[test]
    fn test_non_report_pdu_is_never_classified() {
        let pdu = Pdu::GetRequest(RequestPdu::new(1, vec![]));
        assert!(!is_unknown_engine_id_report(&pdu));
    }
}
