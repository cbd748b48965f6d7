//! Format adapters for the two database generations.
//!
//! All knowledge of how a generation encodes its cipher and KDF parameters
//! lives here; everything above works on [`CryptoSettings`] and never
//! inspects the tree shape itself.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::settings::CryptoSettings;

pub mod v1;
pub mod v2;
mod variant;

pub use v1::V1Tree;
pub use v2::V2Tree;
pub use variant::{VariantDict, VariantValue};

/// The tree handle of an open database, tagged by format generation.
///
/// Holds only the slice of the tree this crate edits; parsing and persisting
/// the on-disk file belong to the owner of the real tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdbTree {
    V1(V1Tree),
    V2(V2Tree),
}

impl KdbTree {
    /// Human-readable format generation, for info displays.
    pub fn generation(&self) -> &'static str {
        match self {
            KdbTree::V1(_) => "1.x",
            KdbTree::V2(_) => "2.x",
        }
    }
}

/// Reads the editable crypto settings out of a tree.
pub fn load(tree: &KdbTree) -> CryptoSettings {
    match tree {
        KdbTree::V1(t) => CryptoSettings::V1(v1::load(t)),
        KdbTree::V2(t) => CryptoSettings::V2(v2::load(t)),
    }
}

/// Writes settings back into a tree of the matching generation.
///
/// A generation mismatch between settings and tree is a caller bug; it fails
/// without touching the tree.
pub fn store(tree: &mut KdbTree, settings: &CryptoSettings) -> Result<()> {
    match (tree, settings) {
        (KdbTree::V1(t), CryptoSettings::V1(s)) => v1::store(t, s),
        (KdbTree::V2(t), CryptoSettings::V2(s)) => v2::store(t, s),
        _ => bail!("settings generation does not match the tree generation"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{CipherV1, V1Settings};

    #[test]
    fn mismatched_generation_fails_without_writing() {
        let mut tree = KdbTree::V2(V2Tree {
            database_name: String::new(),
            database_description: String::new(),
            cipher_uuid: v2::CIPHER_AES,
            kdf: VariantDict::new(),
        });
        let before = tree.clone();

        let settings = CryptoSettings::V1(V1Settings {
            cipher: CipherV1::Rijndael,
            rounds: 1,
        });

        assert!(store(&mut tree, &settings).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn generation_labels() {
        let tree = KdbTree::V1(V1Tree { flags: 0, rounds: 0 });
        assert_eq!(tree.generation(), "1.x");
    }
}
