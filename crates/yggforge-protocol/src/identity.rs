//! Identifier minting, offline-mode name derivation, and format conversion.
//!
//! Every id in the system (users, profiles, access tokens, server-minted
//! client tokens) is a 128-bit [`Identifier`]. There are two ways to get
//! one:
//!
//! - [`random_identifier`] → fresh random bits, tagged as a version-4 id.
//!   Used for anything that must be unguessable (tokens) or merely unique
//!   (user ids).
//! - [`derive_from_name`] → the "offline-mode" id of a player name. This
//!   one is bit-for-bit what an offline game server computes for the same
//!   name, so a profile keeps its id whether or not it logs in through us.
//!
//! On the wire ids are 32 lowercase hex characters without separators
//! (the "undashed" form). [`to_dashed`] and [`to_undashed`] convert to and
//! from the familiar `8-4-4-4-12` layout.
//!
//! Everything here is a pure function; call it from as many threads as
//! you like.

use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};
use rand::Rng;
use uuid::Uuid;

use crate::ProtocolError;

/// Prefix hashed in front of a player name by offline-mode servers.
const OFFLINE_PLAYER_PREFIX: &str = "OfflinePlayer:";

/// Length of the undashed form.
const UNDASHED_LEN: usize = 32;

/// Byte offsets of the separators in the dashed form.
const DASH_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// A 128-bit identifier.
///
/// `Display` renders the canonical undashed lowercase form used on the
/// wire; [`Identifier::dashed`] gives the `8-4-4-4-12` form. Parsing via
/// [`FromStr`] accepts either form.
///
/// ```rust
/// use yggforge_protocol::Identifier;
///
/// let id: Identifier = "b50ad385-829d-3141-a216-7e7d7539ba7f".parse().unwrap();
/// assert_eq!(id, Identifier::from_name("Notch"));
/// assert_eq!(id.to_string(), "b50ad385829d3141a2167e7d7539ba7f");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(Uuid);

impl Identifier {
    /// Mints a fresh random identifier. Same as [`random_identifier`].
    pub fn random() -> Self {
        random_identifier()
    }

    /// The offline-mode identifier of a player name. Same as
    /// [`derive_from_name`].
    pub fn from_name(name: &str) -> Self {
        derive_from_name(name)
    }

    /// Wraps raw bytes as-is, without touching version or variant bits.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// The raw 16 bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// The version nibble: `4` for random ids, `3` for name-derived ones.
    pub fn version(&self) -> usize {
        self.0.get_version_num()
    }

    /// The `8-4-4-4-12` lowercase form.
    pub fn dashed(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for Identifier {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let undashed = to_undashed(s)?;
        Uuid::parse_str(&undashed)
            .map(Self)
            .map_err(|_| malformed(s))
    }
}

impl From<Identifier> for Uuid {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Mints a uniformly random identifier with the random-id tags set
/// (version nibble `4`, variant bits `10`).
///
/// 122 random bits are left after tagging. The authority never re-checks
/// for collisions.
pub fn random_identifier() -> Identifier {
    let bytes: [u8; 16] = rand::rng().random();
    Identifier(uuid::Builder::from_random_bytes(bytes).into_uuid())
}

/// Derives the offline-mode identifier of a player name.
///
/// The algorithm, which must stay bit-exact:
///
/// 1. MD5 the UTF-8 bytes of `"OfflinePlayer:" + name`.
/// 2. Byte 6: clear the top nibble, set it to `3` (name-derived version).
/// 3. Byte 8: clear the top two bits, set them to `10` (standard variant).
///
/// MD5 is used for compatibility with offline-mode servers, not for any
/// security property.
///
/// ```rust
/// use yggforge_protocol::derive_from_name;
///
/// assert_eq!(
///     derive_from_name("Bob").to_string(),
///     "faa5dca3c3d4354bae1bdde9e5a14b3b",
/// );
/// ```
pub fn derive_from_name(name: &str) -> Identifier {
    let mut hasher = Md5::new();
    hasher.update(OFFLINE_PLAYER_PREFIX.as_bytes());
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    bytes[6] = (bytes[6] & 0x0f) | 0x30;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Identifier::from_bytes(bytes)
}

// ---------------------------------------------------------------------------
// Format conversion
// ---------------------------------------------------------------------------

/// Converts a 32-hex undashed id into the `8-4-4-4-12` dashed form.
///
/// Character case is preserved.
///
/// # Errors
/// [`ProtocolError::MalformedIdentifier`] if the input is not exactly 32
/// hex characters or if the dashed reconstruction does not parse.
pub fn to_dashed(undashed: &str) -> Result<String, ProtocolError> {
    if undashed.len() != UNDASHED_LEN
        || !undashed.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(malformed(undashed));
    }

    let dashed = format!(
        "{}-{}-{}-{}-{}",
        &undashed[0..8],
        &undashed[8..12],
        &undashed[12..16],
        &undashed[16..20],
        &undashed[20..32],
    );

    Uuid::parse_str(&dashed).map_err(|_| malformed(undashed))?;
    Ok(dashed)
}

/// Converts a dashed or undashed id into the undashed form.
///
/// Undashed input is returned unchanged (after validation); dashed input
/// must have its separators exactly at the `8-4-4-4-12` positions.
/// Character case is preserved, so `to_undashed(&to_dashed(u)?)` gives
/// back `u` for every valid `u`.
///
/// # Errors
/// [`ProtocolError::MalformedIdentifier`] for anything else.
pub fn to_undashed(value: &str) -> Result<String, ProtocolError> {
    let undashed = match value.len() {
        UNDASHED_LEN => value.to_string(),
        36 if has_dashed_layout(value) => value.replace('-', ""),
        _ => return Err(malformed(value)),
    };

    if is_valid(&undashed) {
        Ok(undashed)
    } else {
        Err(malformed(value))
    }
}

/// Returns `true` if `undashed` is 32 hex characters (either case) that
/// [`to_dashed`] accepts.
pub fn is_valid(undashed: &str) -> bool {
    to_dashed(undashed).is_ok()
}

fn has_dashed_layout(value: &str) -> bool {
    value.bytes().enumerate().all(|(i, b)| {
        if DASH_POSITIONS.contains(&i) {
            b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

fn malformed(value: &str) -> ProtocolError {
    ProtocolError::MalformedIdentifier(value.to_string())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    /// MD5("OfflinePlayer:Bob") = faa5dca3c3d4954b2e1bdde9e5a14b3b,
    /// with byte 6 (0x95) patched to 0x35 and byte 8 (0x2e) to 0xae.
    const BOB: &str = "faa5dca3c3d4354bae1bdde9e5a14b3b";

    /// Widely published offline id of "Notch".
    const NOTCH: &str = "b50ad385829d3141a2167e7d7539ba7f";

    // =====================================================================
    // derive_from_name()
    // =====================================================================

    #[test]
    fn test_derive_from_name_bob_matches_pinned_value() {
        assert_eq!(derive_from_name("Bob").to_string(), BOB);
    }

    #[test]
    fn test_derive_from_name_notch_matches_offline_servers() {
        assert_eq!(derive_from_name("Notch").to_string(), NOTCH);
        assert_eq!(
            derive_from_name("Notch").dashed(),
            "b50ad385-829d-3141-a216-7e7d7539ba7f"
        );
    }

    #[test]
    fn test_derive_from_name_is_deterministic() {
        for name in ["Bob", "Steve", "", "名前", "with space"] {
            assert_eq!(derive_from_name(name), derive_from_name(name));
        }
    }

    #[test]
    fn test_derive_from_name_is_case_sensitive() {
        assert_ne!(derive_from_name("bob"), derive_from_name("Bob"));
    }

    #[test]
    fn test_derive_from_name_sets_version_and_variant() {
        for name in ["Bob", "Alex", "x", "a-much-longer-player-name"] {
            let id = derive_from_name(name);
            let bytes = id.as_bytes();
            assert_eq!(bytes[6] >> 4, 0x3, "version nibble for {name}");
            assert_eq!(bytes[8] >> 6, 0b10, "variant bits for {name}");
            assert_eq!(id.version(), 3);
        }
    }

    // =====================================================================
    // random_identifier()
    // =====================================================================

    #[test]
    fn test_random_identifier_sets_version_and_variant() {
        let id = random_identifier();
        let bytes = id.as_bytes();

        assert_eq!(bytes[6] >> 4, 0x4);
        assert_eq!(bytes[8] >> 6, 0b10);
    }

    #[test]
    fn test_random_identifier_does_not_repeat() {
        let ids: HashSet<_> = (0..1000).map(|_| random_identifier()).collect();

        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_random_identifier_display_is_valid_undashed() {
        let text = random_identifier().to_string();

        assert_eq!(text.len(), 32);
        assert!(is_valid(&text));
        assert_eq!(text, text.to_lowercase());
    }

    // =====================================================================
    // to_dashed() / to_undashed() / is_valid()
    // =====================================================================

    #[test]
    fn test_to_dashed_inserts_separators() {
        assert_eq!(
            to_dashed(BOB).expect("valid"),
            "faa5dca3-c3d4-354b-ae1b-dde9e5a14b3b"
        );
    }

    #[test]
    fn test_to_dashed_wrong_length_returns_malformed() {
        let too_long = format!("{BOB}0");
        for input in ["", "abc", &BOB[..31], too_long.as_str()] {
            assert!(
                matches!(
                    to_dashed(input),
                    Err(ProtocolError::MalformedIdentifier(_))
                ),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_to_dashed_non_hex_returns_malformed() {
        let bad = "zaa5dca3c3d4354bae1bdde9e5a14b3b";

        assert!(matches!(
            to_dashed(bad),
            Err(ProtocolError::MalformedIdentifier(s)) if s == bad
        ));
    }

    #[test]
    fn test_to_dashed_multibyte_input_does_not_panic() {
        // 32 bytes, but not 32 ASCII characters.
        let tricky = "éééééééééééééééé";
        assert_eq!(tricky.len(), 32);

        assert!(to_dashed(tricky).is_err());
    }

    #[test]
    fn test_round_trip_preserves_input() {
        let upper = BOB.to_uppercase();
        let random = random_identifier().to_string();

        for u in [BOB, NOTCH, upper.as_str(), random.as_str()] {
            let dashed = to_dashed(u).expect("valid");
            assert_eq!(to_undashed(&dashed).expect("valid"), u);
        }
    }

    #[test]
    fn test_to_undashed_accepts_undashed_input() {
        assert_eq!(to_undashed(NOTCH).expect("valid"), NOTCH);
    }

    #[test]
    fn test_to_undashed_rejects_misplaced_separators() {
        let shifted = "faa5dca3c-3d4-354b-ae1b-dde9e5a14b3b";
        assert_eq!(shifted.len(), 36);

        assert!(to_undashed(shifted).is_err());
    }

    #[test]
    fn test_to_undashed_rejects_braced_and_urn_forms() {
        assert!(to_undashed("{faa5dca3-c3d4-354b-ae1b-dde9e5a14b3b}").is_err());
        assert!(
            to_undashed("urn:uuid:faa5dca3-c3d4-354b-ae1b-dde9e5a14b3b")
                .is_err()
        );
    }

    #[test]
    fn test_is_valid_cases() {
        assert!(is_valid(BOB));
        assert!(is_valid(&BOB.to_uppercase()));
        assert!(!is_valid("faa5dca3-c3d4-354b-ae1b-dde9e5a14b3b"));
        assert!(!is_valid("not-an-id"));
        assert!(!is_valid(""));
    }

    // =====================================================================
    // Identifier parsing
    // =====================================================================

    #[test]
    fn test_identifier_parses_both_forms_to_same_value() {
        let a: Identifier = BOB.parse().expect("undashed");
        let b: Identifier =
            "FAA5DCA3-C3D4-354B-AE1B-DDE9E5A14B3B".parse().expect("dashed");

        assert_eq!(a, b);
        assert_eq!(b.to_string(), BOB);
    }

    #[test]
    fn test_identifier_parse_garbage_returns_malformed() {
        let result: Result<Identifier, _> = "nope".parse();

        assert!(matches!(result, Err(ProtocolError::MalformedIdentifier(_))));
    }
}
