//! Format adapter for version 1.x trees.
//!
//! A 1.x header encodes the cipher as a bit in its flags word and the single
//! KDF knob as a 32-bit round count. The other flag bits (hash selection,
//! stream cipher) belong to collaborators and are passed through untouched.

use serde::{Deserialize, Serialize};

use crate::settings::{CipherV1, V1Settings};

pub const FLAG_SHA2: u32 = 1;
pub const FLAG_RIJNDAEL: u32 = 2;
pub const FLAG_ARCFOUR: u32 = 4;
pub const FLAG_TWOFISH: u32 = 8;

/// The crypto-relevant slice of an open version 1.x database tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct V1Tree {
    pub flags: u32,
    pub rounds: u32,
}

/// Reads the editable settings out of a 1.x tree. A set `FLAG_RIJNDAEL` bit
/// selects Rijndael; anything else reads as TwoFish.
pub fn load(tree: &V1Tree) -> V1Settings {
    let cipher = if tree.flags & FLAG_RIJNDAEL != 0 {
        CipherV1::Rijndael
    } else {
        CipherV1::TwoFish
    };

    V1Settings {
        cipher,
        rounds: u64::from(tree.rounds),
    }
}

/// Writes the settings back into a 1.x tree. Both cipher bits are cleared
/// before exactly one is set; unrelated flag bits survive. The round count is
/// clamped to the header's 32-bit field.
pub fn store(tree: &mut V1Tree, settings: &V1Settings) {
    let mut flags = tree.flags & !(FLAG_RIJNDAEL | FLAG_TWOFISH);
    flags |= match settings.cipher {
        CipherV1::Rijndael => FLAG_RIJNDAEL,
        CipherV1::TwoFish => FLAG_TWOFISH,
    };

    tree.flags = flags;
    tree.rounds = u32::try_from(settings.rounds).unwrap_or(u32::MAX);
}
