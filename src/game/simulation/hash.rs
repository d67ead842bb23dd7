//! Portable digest of the full world state.
//!
//! The world is serialized with bincode (fixed-width little-endian integers,
//! insertion-ordered entity stores) straight into a keyed SipHash-1-3. The
//! result depends only on the logical state, never on pointer values, hash map
//! seeds or store compaction timing.

use std::fmt;
use std::hash::Hasher;
use std::io;

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;

use super::world::World;

const HASH_KEYS: (u64, u64) = (0x6761_756e_746c_6574, 0x7374_6174_6568_7368);

/// 64-bit world digest, displayed as 16 uppercase hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateHash(pub u64);

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

struct HashWriter(SipHasher13);

impl io::Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn compute_state_hash(world: &World) -> Result<StateHash, bincode::Error> {
    let mut writer = HashWriter(SipHasher13::new_with_keys(HASH_KEYS.0, HASH_KEYS.1));
    bincode::serialize_into(&mut writer, world)?;
    Ok(StateHash(writer.0.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::SimConfig;

    #[test]
    fn test_display_is_zero_padded_hex() {
        assert_eq!(StateHash(0xAB).to_string(), "00000000000000AB");
        assert_eq!(StateHash(u64::MAX).to_string(), "FFFFFFFFFFFFFFFF");
    }

    #[test]
    fn test_identical_worlds_hash_identically() {
        let config = SimConfig::default();
        let a = World::new(config.limits);
        let b = World::new(config.limits);
        assert_eq!(compute_state_hash(&a).unwrap(), compute_state_hash(&b).unwrap());
    }

    #[test]
    fn test_tick_changes_hash() {
        let config = SimConfig::default();
        let a = World::new(config.limits);
        let mut b = World::new(config.limits);
        b.advance_tick();
        assert_ne!(compute_state_hash(&a).unwrap(), compute_state_hash(&b).unwrap());
    }
}
