//! Object identifiers (OIDs).
//!
//! An OID is a sequence of non-negative integers ("arcs") identifying a node
//! in the ASN.1 object tree. SNMP OIDs are BER-encoded per X.690 §8.19: the
//! first two arcs are packed into a single subidentifier as `40*X + Y`, and
//! each remaining arc is encoded as a base-128 group with the high bit of
//! all but the last byte of the group set (continuation).

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, OidErrorKind};

/// Inline storage for the common case: most SNMP OIDs have well under 16 arcs.
type OidStorage = SmallVec<[u32; 16]>;

/// Maximum number of arcs accepted when decoding an OID from the wire.
///
/// Matches net-snmp's `MAX_OID_LEN` (in subidentifiers), used as a decoder
/// sanity bound rather than a protocol limit.
pub const MAX_OID_LEN: usize = 128;

/// An ASN.1 object identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid(OidStorage);

impl Oid {
    /// Build an OID from a slice of arcs.
    ///
    /// Returns an error if there are fewer than two arcs, the first arc is
    /// not 0, 1, or 2, or the second arc exceeds 39 when the first arc is 0
    /// or 1 (the `40*X + Y` packing requires `Y < 40` in that case).
    pub fn new(arcs: &[u32]) -> Result<Self, Error> {
        if arcs.len() < 2 {
            return Err(Error::invalid_oid(OidErrorKind::TooShort));
        }
        let first = arcs[0];
        if first > 2 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidFirstArc(first)));
        }
        let second = arcs[1];
        if first < 2 && second >= 40 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidSecondArc {
                first,
                second,
            }));
        }
        Ok(Self(arcs.iter().copied().collect()))
    }

    /// Build an OID from arcs without validating the `40*X + Y` packing
    /// constraint. Used internally by the BER decoder and the `oid!` macro,
    /// where the first subidentifier has already been unpacked correctly.
    pub(crate) fn from_arcs_unchecked(arcs: OidStorage) -> Self {
        Self(arcs)
    }

    /// The arcs as a slice.
    pub fn arcs(&self) -> &[u32] {
        &self.0
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this OID has zero arcs. Only possible via [`Oid::root`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The zero-arc OID, used only as a decode placeholder; not a valid
    /// standalone SNMP OID (every real OID has at least two arcs).
    pub(crate) fn root() -> Self {
        Self(OidStorage::new())
    }

    /// Whether `self` is `prefix` followed by zero or more additional arcs.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Append an arc, returning a new OID (e.g. to build an instance OID from
    /// a column OID).
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = self.0.clone();
        arcs.push(arc);
        Self(arcs)
    }

    /// BER-encode the arcs (the tag/length-free contents octets) into a
    /// stack/inline-allocated buffer.
    pub(crate) fn to_ber_smallvec(&self) -> SmallVec<[u8; 32]> {
        let mut out: SmallVec<[u8; 32]> = SmallVec::new();
        if self.0.len() < 2 {
            return out;
        }
        let first = self.0[0] * 40 + self.0[1];
        encode_subidentifier(first, &mut out);
        for &arc in &self.0[2..] {
            encode_subidentifier(arc, &mut out);
        }
        out
    }

    /// Decode the contents octets of an OBJECT IDENTIFIER into arcs.
    ///
    /// Rejects non-minimal base-128 groups (a leading `0x80` continuation
    /// byte starting a group) and OIDs with more than [`MAX_OID_LEN`] arcs.
    pub(crate) fn from_ber_contents(data: &[u8]) -> Result<Self, crate::error::internal::DecodeErrorKind> {
        use crate::error::internal::DecodeErrorKind;

        if data.is_empty() {
            // An empty OID decodes to the two-arc root per common practice;
            // net-snmp and most stacks reject it outright. We reject too,
            // since every SNMP OID has at least `{iso}` plus an arc.
            return Err(DecodeErrorKind::TruncatedData);
        }

        let mut arcs: OidStorage = OidStorage::new();
        let mut i = 0;
        while i < data.len() {
            if data[i] == 0x80 {
                return Err(DecodeErrorKind::InvalidOid);
            }
            let mut value: u64 = 0;
            let mut consumed = false;
            loop {
                if i >= data.len() {
                    return Err(DecodeErrorKind::TruncatedData);
                }
                let byte = data[i];
                i += 1;
                value = (value << 7) | u64::from(byte & 0x7F);
                if value > u64::from(u32::MAX) {
                    return Err(DecodeErrorKind::InvalidOid);
                }
                if byte & 0x80 == 0 {
                    consumed = true;
                    break;
                }
            }
            debug_assert!(consumed);
            arcs.push(value as u32);
            if arcs.len() > MAX_OID_LEN {
                return Err(DecodeErrorKind::OidTooLong {
                    count: arcs.len(),
                    max: MAX_OID_LEN,
                });
            }
        }

        // Unpack the first subidentifier into the first two arcs.
        let mut unpacked: OidStorage = OidStorage::with_capacity(arcs.len() + 1);
        let first_sub = arcs[0];
        if first_sub < 80 {
            unpacked.push(first_sub / 40);
            unpacked.push(first_sub % 40);
        } else {
            unpacked.push(2);
            unpacked.push(first_sub - 80);
        }
        unpacked.extend(arcs.into_iter().skip(1));

        Ok(Self(unpacked))
    }
}

fn encode_subidentifier(mut value: u32, out: &mut SmallVec<[u8; 32]>) {
    let mut groups: SmallVec<[u8; 5]> = SmallVec::new();
    groups.push((value & 0x7F) as u8);
    value >>= 7;
    while value > 0 {
        groups.push(((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }
    out.extend(groups.into_iter().rev());
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    /// Lexicographic, arc-by-arc comparison as unsigned integers; a prefix
    /// sorts before any of its extensions.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix('.').unwrap_or(s);
        if s.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }
        let mut arcs: OidStorage = OidStorage::new();
        for part in s.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }
        Oid::new(&arcs).map_err(|e| match e {
            Error::InvalidOid { kind, .. } => Error::invalid_oid_with_input(kind, s),
            other => other,
        })
    }
}

/// Construct an [`Oid`] from a fixed list of arcs at compile time (panics on
/// an invalid arc list, so only use with literal, known-good arcs).
///
/// ```
/// use snmp3_core::oid;
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),+ $(,)?) => {
        $crate::oid::Oid::new(&[$($arc),+]).expect("invalid literal OID")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_display() {
        let oid = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
    }

    #[test]
    fn test_oid_from_str() {
        let oid: Oid = "1.3.6.1.2.1".parse().unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1, 2, 1));

        let oid: Oid = ".1.3.6.1".parse().unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1));

        assert!("".parse::<Oid>().is_err());
        assert!("1.3.x.1".parse::<Oid>().is_err());
    }

    #[test]
    fn test_oid_new_validation() {
        assert!(Oid::new(&[1]).is_err());
        assert!(Oid::new(&[3, 1]).is_err());
        assert!(Oid::new(&[0, 40]).is_err());
        assert!(Oid::new(&[1, 39]).is_ok());
        assert!(Oid::new(&[2, 100]).is_ok());
    }

    #[test]
    fn test_oid_ordering() {
        assert!(oid!(1, 3, 6, 1, 2) < oid!(1, 3, 6, 1, 2, 1));
        assert!(oid!(1, 3, 6, 1, 2, 1) < oid!(1, 3, 6, 1, 3));
        assert!(oid!(1, 3, 6, 1, 2, 1) == oid!(1, 3, 6, 1, 2, 1));
    }

    #[test]
    fn test_oid_starts_with() {
        let base = oid!(1, 3, 6, 1, 2, 1);
        assert!(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0).starts_with(&base));
        assert!(!oid!(1, 3, 6, 1, 3).starts_with(&base));
        assert!(base.starts_with(&base));
    }

    #[test]
    fn test_oid_ber_roundtrip() {
        // 1.3.6.1.2.1 -> 2B 06 01 02 01 (concrete scenario 5 in spec §8)
        let oid = oid!(1, 3, 6, 1, 2, 1);
        let encoded = oid.to_ber_smallvec();
        assert_eq!(&encoded[..], &[0x2B, 0x06, 0x01, 0x02, 0x01]);

        let decoded = Oid::from_ber_contents(&encoded).unwrap();
        assert_eq!(decoded, oid);
    }

    #[test]
    fn test_oid_ber_roundtrip_large_arc() {
        let oid = oid!(1, 3, 6, 1, 4, 1, 99999, 1, 0);
        let encoded = oid.to_ber_smallvec();
        let decoded = Oid::from_ber_contents(&encoded).unwrap();
        assert_eq!(decoded, oid);
    }

    #[test]
    fn test_oid_rejects_non_minimal_subidentifier() {
        // A leading 0x80 continuation byte starting a group is non-minimal.
        let bad = [0x2B, 0x80, 0x01];
        assert!(Oid::from_ber_contents(&bad).is_err());
    }

    #[test]
    fn test_oid_child() {
        let column = oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10);
        let instance = column.child(5);
        assert_eq!(instance, oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10, 5));
    }
}
