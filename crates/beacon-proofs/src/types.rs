//! Shared primitives: the 32-byte hash type, per-field container roots, and
//! hex encoding helpers for JSON output.

use crate::proof::ProofError;

/// A 32-byte SHA-256 digest or SSZ chunk.
pub type Hash32 = [u8; 32];

/// Containers whose field order is known at compile time.
///
/// Implemented by the `ssz_container!` macro in [`crate::beacon_state`], which
/// takes `FIELD_NAMES` straight from the struct definition.
pub trait FieldRoots {
    /// Container name, for error messages.
    const NAME: &'static str;
    /// Field names in declaration (= Merkleization) order.
    const FIELD_NAMES: &'static [&'static str];
    const FIELD_COUNT: usize = Self::FIELD_NAMES.len();

    /// `hash_tree_root` of the field at `position`.
    ///
    /// # Errors
    /// `IndexOutOfBounds` past the last field, `Merkleization` if hashing fails.
    fn field_root(&self, position: usize) -> Result<Hash32, ProofError>;

    /// Roots of all fields, in order.
    ///
    /// # Errors
    /// As [`Self::field_root`].
    fn field_roots(&self) -> Result<Vec<Hash32>, ProofError> {
        (0..Self::FIELD_COUNT).map(|i| self.field_root(i)).collect()
    }

    /// Position of `name`, if the container has such a field.
    #[must_use]
    fn field_position(name: &str) -> Option<usize> {
        Self::FIELD_NAMES.iter().position(|field| *field == name)
    }
}

/// `0x`-prefixed hex for a single hash.
#[must_use]
pub fn to_hex(bytes: &Hash32) -> String {
    format!("0x{}", hex::encode(bytes))
}

// Hex encoding helpers for serde
pub(crate) mod hex_bytes32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::to_hex(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

/// Custom serde for `Vec<[u8; 32]>` as hex strings
pub(crate) mod proof_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S>(data: &Vec<[u8; 32]>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hex_strings: Vec<String> = data.iter().map(super::to_hex).collect();
        hex_strings.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<[u8; 32]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_strings: Vec<String> = Vec::deserialize(deserializer)?;
        hex_strings
            .into_iter()
            .map(|s| {
                let s = s.strip_prefix("0x").unwrap_or(&s);
                let bytes = hex::decode(s).map_err(serde::de::Error::custom)?;
                if bytes.len() != 32 {
                    return Err(serde::de::Error::custom("expected 32 bytes"));
                }
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(arr)
            })
            .collect()
    }
}
