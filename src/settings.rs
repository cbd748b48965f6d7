//! The unified in-memory representation of a database's crypto settings.
//!
//! Both format generations load into [`CryptoSettings`]; the per-variant KDF
//! parameters live in fixed records rather than a string-keyed map, so a
//! missing or extra parameter is unrepresentable. Name-based access exists
//! only at the edge, for callers that address fields by their display label.

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Display label of the AES-KDF round count.
pub const PARAM_ROUNDS: &str = "Rounds";
/// Display label of the Argon2 iteration count.
pub const PARAM_ITERATIONS: &str = "Iterations";
/// Display label of the Argon2 memory cost (edited in MiB).
pub const PARAM_MEMORY: &str = "Memory";
/// Display label of the Argon2 parallelism factor.
pub const PARAM_PARALLELISM: &str = "Parallelism";

/// Ciphers a version 1.x database can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherV1 {
    Rijndael,
    TwoFish,
}

impl CipherV1 {
    const ALL: [CipherV1; 2] = [CipherV1::Rijndael, CipherV1::TwoFish];
    // Rijndael is shown as "AES", matching every other KeePass client.
    const LABELS: [&'static str; 2] = ["AES", "TwoFish"];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Ciphers a version 2.x database can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherV2 {
    Aes,
    ChaCha20,
}

impl CipherV2 {
    const ALL: [CipherV2; 2] = [CipherV2::Aes, CipherV2::ChaCha20];
    const LABELS: [&'static str; 2] = ["AES", "ChaCha20"];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Key derivation functions a version 2.x database can use. Version 1.x has
/// a single fixed KDF with only a round count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfVariant {
    AesKdf,
    Argon2,
}

impl KdfVariant {
    const ALL: [KdfVariant; 2] = [KdfVariant::AesKdf, KdfVariant::Argon2];
    const LABELS: [&'static str; 2] = ["AES-KDF", "Argon2"];

    /// Labels in selection order, for list-style pickers.
    pub fn labels() -> &'static [&'static str] {
        &Self::LABELS
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Labels of this variant's parameters, in their canonical edit order.
    pub fn parameter_labels(self) -> &'static [&'static str] {
        match self {
            KdfVariant::AesKdf => &[PARAM_ROUNDS],
            KdfVariant::Argon2 => &[PARAM_ITERATIONS, PARAM_MEMORY, PARAM_PARALLELISM],
        }
    }
}

/// Tunable parameters of AES-KDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AesKdfParams {
    pub rounds: u64,
}

impl Default for AesKdfParams {
    fn default() -> Self {
        // KeePass 2.x default transform rounds.
        Self { rounds: 60_000 }
    }
}

/// Tunable parameters of Argon2. Memory is held in MiB while editing; the
/// persisted form is bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    pub iterations: u64,
    pub memory_mib: u64,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        // KeePass 2.x Argon2 defaults: 2 passes over 64 MiB on 2 lanes.
        Self {
            iterations: 2,
            memory_mib: 64,
            parallelism: 2,
        }
    }
}

/// Editable settings of a version 1.x database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct V1Settings {
    pub cipher: CipherV1,
    pub rounds: u64,
}

/// Editable settings of a version 2.x database.
///
/// Both KDF variants' records stay live regardless of which one is selected,
/// so switching variants back and forth never loses an edited or loaded
/// value. Only the selected variant's record is persisted on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct V2Settings {
    pub cipher: CipherV2,
    pub kdf: KdfVariant,
    pub aes_kdf: AesKdfParams,
    pub argon2: Argon2Params,
}

/// Crypto settings of an open database, tagged by format generation.
///
/// The format generation is fixed at load time; edits can change the cipher,
/// the KDF variant (2.x only) and the parameter values, never the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CryptoSettings {
    V1(V1Settings),
    V2(V2Settings),
}

impl CryptoSettings {
    /// Cipher labels valid for this format generation, in selection order.
    pub fn cipher_labels(&self) -> &'static [&'static str] {
        match self {
            CryptoSettings::V1(_) => &CipherV1::LABELS,
            CryptoSettings::V2(_) => &CipherV2::LABELS,
        }
    }

    /// Index of the selected cipher within [`Self::cipher_labels`].
    pub fn cipher_index(&self) -> usize {
        match self {
            CryptoSettings::V1(s) => s.cipher.index(),
            CryptoSettings::V2(s) => s.cipher.index(),
        }
    }

    /// Index of the selected KDF variant, `None` for version 1.x.
    pub fn kdf_index(&self) -> Option<usize> {
        match self {
            CryptoSettings::V1(_) => None,
            CryptoSettings::V2(s) => Some(s.kdf.index()),
        }
    }

    /// Selects a cipher by its index within [`Self::cipher_labels`].
    pub fn select_cipher(&mut self, index: usize) -> Result<(), OptionsError> {
        match self {
            CryptoSettings::V1(s) => {
                s.cipher = CipherV1::from_index(index).ok_or(OptionsError::InvalidSelection(index))?;
            }
            CryptoSettings::V2(s) => {
                s.cipher = CipherV2::from_index(index).ok_or(OptionsError::InvalidSelection(index))?;
            }
        }
        Ok(())
    }

    /// Selects a KDF variant by its index within [`KdfVariant::labels`].
    ///
    /// Version 1.x databases have a fixed KDF; selecting one there is a
    /// caller bug and fails with [`OptionsError::FixedKdf`].
    pub fn select_kdf(&mut self, index: usize) -> Result<(), OptionsError> {
        match self {
            CryptoSettings::V1(_) => Err(OptionsError::FixedKdf),
            CryptoSettings::V2(s) => {
                s.kdf = KdfVariant::from_index(index).ok_or(OptionsError::InvalidSelection(index))?;
                Ok(())
            }
        }
    }

    /// Labels of the active variant's parameters, in canonical order.
    pub fn parameter_labels(&self) -> &'static [&'static str] {
        match self {
            CryptoSettings::V1(_) => &[PARAM_ROUNDS],
            CryptoSettings::V2(s) => s.kdf.parameter_labels(),
        }
    }

    /// The active variant's parameters as (label, value) pairs in canonical
    /// order, ready for rendering.
    pub fn parameters(&self) -> Vec<(&'static str, u64)> {
        match self {
            CryptoSettings::V1(s) => vec![(PARAM_ROUNDS, s.rounds)],
            CryptoSettings::V2(s) => match s.kdf {
                KdfVariant::AesKdf => vec![(PARAM_ROUNDS, s.aes_kdf.rounds)],
                KdfVariant::Argon2 => vec![
                    (PARAM_ITERATIONS, s.argon2.iterations),
                    (PARAM_MEMORY, s.argon2.memory_mib),
                    (PARAM_PARALLELISM, u64::from(s.argon2.parallelism)),
                ],
            },
        }
    }

    /// Value of a single parameter of the active variant, by label.
    pub fn parameter(&self, name: &str) -> Option<u64> {
        self.parameters()
            .into_iter()
            .find(|(label, _)| *label == name)
            .map(|(_, value)| value)
    }

    /// Sets a parameter of the active variant by label.
    ///
    /// Labels outside the active variant's set indicate a wiring bug in the
    /// caller and fail with [`OptionsError::UnknownParameter`]; nothing is
    /// written in that case.
    pub fn set_parameter(&mut self, name: &str, value: u64) -> Result<(), OptionsError> {
        match self {
            CryptoSettings::V1(s) if name == PARAM_ROUNDS => s.rounds = value,
            CryptoSettings::V2(s) => match (s.kdf, name) {
                (KdfVariant::AesKdf, n) if n == PARAM_ROUNDS => s.aes_kdf.rounds = value,
                (KdfVariant::Argon2, n) if n == PARAM_ITERATIONS => s.argon2.iterations = value,
                (KdfVariant::Argon2, n) if n == PARAM_MEMORY => s.argon2.memory_mib = value,
                (KdfVariant::Argon2, n) if n == PARAM_PARALLELISM => {
                    s.argon2.parallelism = u32::try_from(value)
                        .map_err(|_| OptionsError::InvalidNumber(value.to_string()))?;
                }
                _ => return Err(OptionsError::UnknownParameter(name.to_string())),
            },
            CryptoSettings::V1(_) => return Err(OptionsError::UnknownParameter(name.to_string())),
        }
        Ok(())
    }

    /// Flattens every field relevant to change detection into a fixed-order
    /// scalar vector: cipher index, KDF index (2.x), then each parameter of
    /// the active variant in canonical order.
    pub fn snapshot(&self) -> Vec<u64> {
        let mut fields = vec![self.cipher_index() as u64];
        if let Some(kdf) = self.kdf_index() {
            fields.push(kdf as u64);
        }
        fields.extend(self.parameters().into_iter().map(|(_, value)| value));
        fields
    }
}
