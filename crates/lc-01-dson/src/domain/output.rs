//! Output modes and per-field visibility.

/// Which projection of a value to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DsonOutput {
    /// Every field. Used for the wire.
    #[default]
    Default,
    /// Only fields that contribute to identity. Pre-image of hashes and
    /// signatures.
    Hash,
    /// Every field except those that exist only for hashing.
    AllButHash,
}

/// Which output modes a field appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Always present.
    #[default]
    All,
    /// Stripped from the hash projection (e.g. signatures).
    NotInHash,
    /// Present only in the hash projection.
    HashOnly,
}

impl Visibility {
    /// Whether a field with this visibility is written in `mode`.
    #[must_use]
    pub const fn is_included_in(self, mode: DsonOutput) -> bool {
        match (self, mode) {
            (Self::All, _) => true,
            (Self::NotInHash, DsonOutput::Hash) => false,
            (Self::NotInHash, _) => true,
            (Self::HashOnly, DsonOutput::AllButHash) => false,
            (Self::HashOnly, _) => true,
        }
    }
}
