//! Format adapter for version 2.x trees.
//!
//! A 2.x tree identifies its cipher and KDF by 16-byte UUIDs and keeps the
//! KDF parameters in a [`VariantDict`]. Unrecognized UUIDs (databases written
//! by newer tools) fall back to AES / AES-KDF so the database stays editable.
//! The dictionary also carries entries this adapter does not own, such as the
//! KDF salt; those are preserved verbatim across a store.

use serde::{Deserialize, Serialize};

use crate::format::variant::VariantDict;
use crate::settings::{AesKdfParams, Argon2Params, CipherV2, KdfVariant, V2Settings};

/// Dictionary key of the KDF identifier (raw UUID bytes).
pub const KDF_KEY_UUID: &str = "$UUID";
/// Dictionary key of the AES-KDF round count (u64).
pub const KDF_AES_KEY_ROUNDS: &str = "R";
/// Dictionary key of the Argon2 iteration count (u64).
pub const KDF_ARGON2_KEY_ITERATIONS: &str = "I";
/// Dictionary key of the Argon2 memory cost in bytes (u64).
pub const KDF_ARGON2_KEY_MEMORY: &str = "M";
/// Dictionary key of the Argon2 parallelism factor (u32).
pub const KDF_ARGON2_KEY_PARALLELISM: &str = "P";

pub const UUID_LEN: usize = 16;

/// 31C1F2E6-BF71-4350-BE58-05216AFC5AFF
pub const CIPHER_AES: [u8; UUID_LEN] = [
    0x31, 0xC1, 0xF2, 0xE6, 0xBF, 0x71, 0x43, 0x50, 0xBE, 0x58, 0x05, 0x21, 0x6A, 0xFC, 0x5A, 0xFF,
];
/// D6038A2B-8B6F-4CB5-A524-339A31DBB59A
pub const CIPHER_CHACHA20: [u8; UUID_LEN] = [
    0xD6, 0x03, 0x8A, 0x2B, 0x8B, 0x6F, 0x4C, 0xB5, 0xA5, 0x24, 0x33, 0x9A, 0x31, 0xDB, 0xB5, 0x9A,
];
/// C9D9F39A-628A-4460-BF74-0D08C18A4FEA
pub const KDF_AES: [u8; UUID_LEN] = [
    0xC9, 0xD9, 0xF3, 0x9A, 0x62, 0x8A, 0x44, 0x60, 0xBF, 0x74, 0x0D, 0x08, 0xC1, 0x8A, 0x4F, 0xEA,
];
/// EF636DDF-8C29-444B-91F7-A9A403E30A0C
pub const KDF_ARGON2: [u8; UUID_LEN] = [
    0xEF, 0x63, 0x6D, 0xDF, 0x8C, 0x29, 0x44, 0x4B, 0x91, 0xF7, 0xA9, 0xA4, 0x03, 0xE3, 0x0A, 0x0C,
];

const BYTES_PER_MIB: u64 = 1024 * 1024;

/// The crypto-relevant slice of an open version 2.x database tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V2Tree {
    pub database_name: String,
    pub database_description: String,
    pub cipher_uuid: [u8; UUID_LEN],
    pub kdf: VariantDict,
}

fn cipher_from_uuid(uuid: &[u8; UUID_LEN]) -> CipherV2 {
    if *uuid == CIPHER_CHACHA20 {
        CipherV2::ChaCha20
    } else {
        // Includes the fallback for unrecognized UUIDs.
        CipherV2::Aes
    }
}

fn uuid_for_cipher(cipher: CipherV2) -> [u8; UUID_LEN] {
    match cipher {
        CipherV2::Aes => CIPHER_AES,
        CipherV2::ChaCha20 => CIPHER_CHACHA20,
    }
}

fn kdf_from_uuid(uuid: Option<&[u8]>) -> KdfVariant {
    match uuid {
        Some(bytes) if bytes == KDF_ARGON2 => KdfVariant::Argon2,
        // Absent or unrecognized identifiers fall back to AES-KDF.
        _ => KdfVariant::AesKdf,
    }
}

fn uuid_for_kdf(kdf: KdfVariant) -> [u8; UUID_LEN] {
    match kdf {
        KdfVariant::AesKdf => KDF_AES,
        KdfVariant::Argon2 => KDF_ARGON2,
    }
}

/// Reads the editable settings out of a 2.x tree.
///
/// Both variants' records are populated: the variant named in the tree takes
/// its stored values (defaults filling any absent key), the other keeps its
/// defaults so a later variant switch starts from sane values. Memory comes
/// back in MiB.
pub fn load(tree: &V2Tree) -> V2Settings {
    let cipher = cipher_from_uuid(&tree.cipher_uuid);
    let kdf = kdf_from_uuid(tree.kdf.get_bytes(KDF_KEY_UUID));

    let mut aes_kdf = AesKdfParams::default();
    let mut argon2 = Argon2Params::default();

    match kdf {
        KdfVariant::AesKdf => {
            if let Some(rounds) = tree.kdf.get_u64(KDF_AES_KEY_ROUNDS) {
                aes_kdf.rounds = rounds;
            }
        }
        KdfVariant::Argon2 => {
            if let Some(iterations) = tree.kdf.get_u64(KDF_ARGON2_KEY_ITERATIONS) {
                argon2.iterations = iterations;
            }
            if let Some(memory) = tree.kdf.get_u64(KDF_ARGON2_KEY_MEMORY) {
                argon2.memory_mib = memory / BYTES_PER_MIB;
            }
            if let Some(parallelism) = tree.kdf.get_u32(KDF_ARGON2_KEY_PARALLELISM) {
                argon2.parallelism = parallelism;
            }
        }
    }

    V2Settings {
        cipher,
        kdf,
        aes_kdf,
        argon2,
    }
}

/// Writes the settings back into a 2.x tree.
///
/// Exactly the selected variant's keys are written (memory converted back to
/// bytes, parallelism as u32, the rest as u64); the other variant's keys are
/// dropped and every unrelated entry is kept. The dictionary is rebuilt on a
/// copy and swapped in whole, so the tree never holds a half-written state.
pub fn store(tree: &mut V2Tree, settings: &V2Settings) {
    let mut kdf = tree.kdf.clone();

    match settings.kdf {
        KdfVariant::AesKdf => {
            kdf.set_bytes(KDF_KEY_UUID, KDF_AES.to_vec());
            kdf.set_u64(KDF_AES_KEY_ROUNDS, settings.aes_kdf.rounds);
            kdf.remove(KDF_ARGON2_KEY_ITERATIONS);
            kdf.remove(KDF_ARGON2_KEY_MEMORY);
            kdf.remove(KDF_ARGON2_KEY_PARALLELISM);
        }
        KdfVariant::Argon2 => {
            kdf.set_bytes(KDF_KEY_UUID, KDF_ARGON2.to_vec());
            kdf.set_u64(KDF_ARGON2_KEY_ITERATIONS, settings.argon2.iterations);
            kdf.set_u64(
                KDF_ARGON2_KEY_MEMORY,
                settings.argon2.memory_mib.saturating_mul(BYTES_PER_MIB),
            );
            kdf.set_u32(KDF_ARGON2_KEY_PARALLELISM, settings.argon2.parallelism);
            kdf.remove(KDF_AES_KEY_ROUNDS);
        }
    }

    tree.cipher_uuid = uuid_for_cipher(settings.cipher);
    tree.kdf = kdf;
}
