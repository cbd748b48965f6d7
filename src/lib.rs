pub mod format;
mod error;
mod settings;
mod validate;

pub use crate::error::OptionsError;
pub use crate::format::{KdbTree, V1Tree, V2Tree, VariantDict, VariantValue};
pub use crate::settings::{
    AesKdfParams, Argon2Params, CipherV1, CipherV2, CryptoSettings, KdfVariant,
    PARAM_ITERATIONS, PARAM_MEMORY, PARAM_PARALLELISM, PARAM_ROUNDS, V1Settings, V2Settings,
};
pub use crate::validate::parse_whole_number;

use anyhow::Result;

/// What a commit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing differed from the loaded state; the tree was not touched.
    Unchanged,
    /// The tree was updated; the caller must now run its save.
    Applied,
}

/// One editing session over a database's crypto settings.
///
/// Opening a session takes exclusive ownership of the tree handle, loads the
/// current settings (merged with per-variant defaults) and freezes them as
/// the comparison baseline. Edits go through the selection and parameter
/// methods; [`OptionsSession::commit`] writes back only if something actually
/// changed. Dropping the session without committing abandons every edit and
/// leaves the tree exactly as it was opened.
pub struct OptionsSession {
    tree: KdbTree,
    settings: CryptoSettings,
    initial: Vec<u64>,
}

impl OptionsSession {
    pub fn open(tree: KdbTree) -> Self {
        let settings = format::load(&tree);
        let initial = settings.snapshot();
        Self {
            tree,
            settings,
            initial,
        }
    }

    /// The live settings, for rendering.
    pub fn settings(&self) -> &CryptoSettings {
        &self.settings
    }

    /// One-line database summary: name and format generation, plus the
    /// description where the format stores one.
    pub fn info(&self) -> String {
        match &self.tree {
            KdbTree::V1(_) => format!("(Version {}) Database", self.tree.generation()),
            KdbTree::V2(t) => format!(
                "{} (Version {})\n{}",
                t.database_name,
                self.tree.generation(),
                t.database_description
            ),
        }
    }

    /// Cipher choices valid for this database, in selection order.
    pub fn cipher_labels(&self) -> &'static [&'static str] {
        self.settings.cipher_labels()
    }

    /// Index of the selected cipher within [`Self::cipher_labels`].
    pub fn selected_cipher(&self) -> usize {
        self.settings.cipher_index()
    }

    /// KDF choices, in selection order. The list is the same for every
    /// database; a 1.x database simply cannot select from it.
    pub fn kdf_labels(&self) -> &'static [&'static str] {
        KdfVariant::labels()
    }

    /// Index of the selected KDF variant, `None` for 1.x databases.
    pub fn selected_kdf(&self) -> Option<usize> {
        self.settings.kdf_index()
    }

    /// The active variant's parameters as (label, value) pairs.
    pub fn parameters(&self) -> Vec<(&'static str, u64)> {
        self.settings.parameters()
    }

    /// Value of one parameter of the active variant, by label.
    pub fn parameter(&self, name: &str) -> Option<u64> {
        self.settings.parameter(name)
    }

    /// Selects a cipher by picker index.
    pub fn select_cipher(&mut self, index: usize) -> Result<(), OptionsError> {
        self.settings.select_cipher(index)
    }

    /// Selects a KDF variant by picker index (2.x only). Values of the
    /// variant being left stay live, so switching back restores them.
    pub fn select_kdf(&mut self, index: usize) -> Result<(), OptionsError> {
        self.settings.select_kdf(index)
    }

    /// Sets a parameter of the active variant.
    pub fn set_parameter(&mut self, name: &str, value: u64) -> Result<(), OptionsError> {
        self.settings.set_parameter(name, value)
    }

    /// Validates a text entry and, if it is a whole number, sets the
    /// parameter. The error carries the user-facing message for the field.
    pub fn set_parameter_text(&mut self, name: &str, text: &str) -> Result<(), OptionsError> {
        let value = parse_whole_number(text)?;
        self.set_parameter(name, value)
    }

    /// Whether any field differs from the state captured at open. Compares
    /// the full canonical field vector of the active variant.
    pub fn has_changed(&self) -> bool {
        self.settings.snapshot() != self.initial
    }

    /// Writes the settings back into the tree if anything changed.
    ///
    /// Returns [`CommitOutcome::Applied`] when the tree was updated, which is
    /// the caller's signal to run its external save. No partial write can
    /// occur: either the adapter swaps in the full new state or the tree is
    /// left alone.
    pub fn commit(&mut self) -> Result<CommitOutcome> {
        if !self.has_changed() {
            return Ok(CommitOutcome::Unchanged);
        }

        format::store(&mut self.tree, &self.settings)?;
        self.initial = self.settings.snapshot();
        Ok(CommitOutcome::Applied)
    }

    /// The tree handle as of the last commit (or open).
    pub fn tree(&self) -> &KdbTree {
        &self.tree
    }

    /// Ends the session and hands the tree handle back.
    pub fn into_tree(self) -> KdbTree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{v1, v2};

    fn v1_tree(flags: u32, rounds: u32) -> KdbTree {
        KdbTree::V1(V1Tree { flags, rounds })
    }

    fn v2_argon2_tree() -> KdbTree {
        let mut kdf = VariantDict::new();
        kdf.set_bytes(v2::KDF_KEY_UUID, v2::KDF_ARGON2.to_vec());
        kdf.set_u64(v2::KDF_ARGON2_KEY_ITERATIONS, 3);
        kdf.set_u64(v2::KDF_ARGON2_KEY_MEMORY, 64 * 1024 * 1024);
        kdf.set_u32(v2::KDF_ARGON2_KEY_PARALLELISM, 2);

        KdbTree::V2(V2Tree {
            database_name: "Personal".to_string(),
            database_description: "Everyday passwords".to_string(),
            cipher_uuid: v2::CIPHER_AES,
            kdf,
        })
    }

    fn v2_aes_kdf_tree(rounds: u64) -> KdbTree {
        let mut kdf = VariantDict::new();
        kdf.set_bytes(v2::KDF_KEY_UUID, v2::KDF_AES.to_vec());
        kdf.set_u64(v2::KDF_AES_KEY_ROUNDS, rounds);

        KdbTree::V2(V2Tree {
            database_name: "Work".to_string(),
            database_description: String::new(),
            cipher_uuid: v2::CIPHER_AES,
            kdf,
        })
    }

    #[test]
    fn commit_without_edits_is_unchanged() {
        for tree in [
            v1_tree(v1::FLAG_SHA2 | v1::FLAG_RIJNDAEL, 60_000),
            v1_tree(v1::FLAG_TWOFISH, 50_000),
            v2_argon2_tree(),
            v2_aes_kdf_tree(75_000),
        ] {
            let before = tree.clone();
            let mut session = OptionsSession::open(tree);
            assert!(!session.has_changed());
            assert_eq!(session.commit().unwrap(), CommitOutcome::Unchanged);
            assert_eq!(session.into_tree(), before);
        }
    }

    #[test]
    fn v1_load_edit_commit() {
        let mut session = OptionsSession::open(v1_tree(v1::FLAG_SHA2 | v1::FLAG_TWOFISH, 50_000));
        assert_eq!(session.cipher_labels(), ["AES", "TwoFish"]);
        assert_eq!(session.selected_cipher(), 1);
        assert_eq!(session.parameter(PARAM_ROUNDS), Some(50_000));

        session.select_cipher(0).unwrap();
        assert!(session.has_changed());
        assert_eq!(session.commit().unwrap(), CommitOutcome::Applied);

        let KdbTree::V1(tree) = session.into_tree() else {
            panic!("generation changed");
        };
        assert_ne!(tree.flags & v1::FLAG_RIJNDAEL, 0);
        assert_eq!(tree.flags & v1::FLAG_TWOFISH, 0);
        assert_eq!(tree.rounds, 50_000);
    }

    #[test]
    fn v2_cipher_only_change_leaves_kdf_alone() {
        let mut session = OptionsSession::open(v2_argon2_tree());
        let kdf_before = match session.tree() {
            KdbTree::V2(t) => t.kdf.clone(),
            KdbTree::V1(_) => unreachable!(),
        };

        session.select_cipher(1).unwrap();
        assert!(session.has_changed());
        assert_eq!(session.commit().unwrap(), CommitOutcome::Applied);

        let KdbTree::V2(tree) = session.into_tree() else {
            panic!("generation changed");
        };
        assert_eq!(tree.cipher_uuid, v2::CIPHER_CHACHA20);
        assert_eq!(tree.kdf, kdf_before);
    }

    #[test]
    fn switching_kdf_and_back_restores_values_and_stays_unchanged() {
        let mut session = OptionsSession::open(v2_aes_kdf_tree(75_000));
        assert_eq!(session.selected_kdf(), Some(0));

        session.select_kdf(1).unwrap();
        // The Argon2 side shows loader defaults while selected.
        assert_eq!(session.parameter(PARAM_ITERATIONS), Some(2));
        assert_eq!(session.parameter(PARAM_MEMORY), Some(64));
        assert!(session.has_changed());

        session.select_kdf(0).unwrap();
        assert_eq!(session.parameter(PARAM_ROUNDS), Some(75_000));
        assert!(!session.has_changed());
        assert_eq!(session.commit().unwrap(), CommitOutcome::Unchanged);
    }

    #[test]
    fn kdf_switch_commits_new_variant() {
        let mut session = OptionsSession::open(v2_aes_kdf_tree(75_000));
        session.select_kdf(1).unwrap();
        session.set_parameter_text(PARAM_MEMORY, "128").unwrap();
        assert_eq!(session.commit().unwrap(), CommitOutcome::Applied);

        let KdbTree::V2(tree) = session.into_tree() else {
            panic!("generation changed");
        };
        assert_eq!(tree.kdf.get_bytes(v2::KDF_KEY_UUID), Some(&v2::KDF_ARGON2[..]));
        assert_eq!(tree.kdf.get_u64(v2::KDF_ARGON2_KEY_MEMORY), Some(128 * 1024 * 1024));
        assert!(!tree.kdf.contains(v2::KDF_AES_KEY_ROUNDS));
    }

    #[test]
    fn parameter_edit_detected_and_persisted() {
        let mut session = OptionsSession::open(v2_argon2_tree());
        session.set_parameter_text(PARAM_ITERATIONS, "5").unwrap();
        assert!(session.has_changed());
        assert_eq!(session.commit().unwrap(), CommitOutcome::Applied);

        // Committing marks the new state as the baseline.
        assert!(!session.has_changed());
        assert_eq!(session.commit().unwrap(), CommitOutcome::Unchanged);
    }

    #[test]
    fn rejected_entry_changes_nothing() {
        let mut session = OptionsSession::open(v2_argon2_tree());
        let err = session.set_parameter_text(PARAM_ITERATIONS, "3.5").unwrap_err();
        assert!(err.to_string().contains("whole number"));
        assert!(!session.has_changed());
    }

    #[test]
    fn wrong_variant_parameter_is_a_contract_violation() {
        let mut session = OptionsSession::open(v2_argon2_tree());
        assert_eq!(
            session.set_parameter(PARAM_ROUNDS, 1),
            Err(OptionsError::UnknownParameter(PARAM_ROUNDS.to_string()))
        );
        assert!(!session.has_changed());
    }

    #[test]
    fn abandoning_a_session_leaves_the_tree_untouched() {
        let before = v2_argon2_tree();
        let mut session = OptionsSession::open(before.clone());
        session.select_cipher(1).unwrap();
        session.set_parameter(PARAM_ITERATIONS, 99).unwrap();
        // No commit; cancel is just dropping the session.
        assert_eq!(session.into_tree(), before);
    }

    #[test]
    fn info_names_the_generation() {
        let session = OptionsSession::open(v2_argon2_tree());
        assert_eq!(session.info(), "Personal (Version 2.x)\nEveryday passwords");

        let session = OptionsSession::open(v1_tree(v1::FLAG_RIJNDAEL, 1));
        assert_eq!(session.info(), "(Version 1.x) Database");
    }
}
