//! SQLite store for venues, artists and shows
//!
//! Writes run inside a transaction that is committed only once every
//! statement has succeeded. An early return drops the transaction, which
//! rolls it back.

pub mod artists;
pub mod init;
pub mod shows;
pub mod venues;

pub use artists::*;
pub use init::*;
pub use shows::*;
pub use venues::*;

/// Case-insensitive substring match on a name
///
/// Case is folded with Unicode lowercase mapping, so `"café"` finds
/// `"CAFÉ ÜBER"`. A blank term matches every name.
pub(crate) fn name_contains(name: &str, term: &str) -> bool {
    name.to_lowercase().contains(&term.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_contains_folds_unicode_case() {
        assert!(name_contains("CAFÉ ÜBER", "café"));
        assert!(name_contains("CAFÉ ÜBER", "über"));
        assert!(name_contains("The Musical Hop", " HOP "));
        assert!(!name_contains("The Musical Hop", "hops"));
    }

    #[test]
    fn test_name_contains_takes_wildcards_literally() {
        assert!(name_contains("100% Jazz", "100%"));
        assert!(!name_contains("1000 Jazz", "10_0"));
        assert!(name_contains("anything", ""));
    }
}
