/* Catalogue recognition for the runtime's shared codecs */

use abi_runtime::stdlib::CATALOGUE;
use std::collections::HashSet;
use std::sync::OnceLock;

static CATALOGUE_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// True when `identifier` (a canonical type string) has a shared
/// implementation in `abi_runtime::stdlib`.
pub fn is_catalogued(identifier: &str) -> bool {
    CATALOGUE_SET
        .get_or_init(|| CATALOGUE.iter().copied().collect())
        .contains(identifier)
}

pub use abi_runtime::stdlib::stem;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_by_canonical_string() {
        assert!(is_catalogued("uint256[]"));
        assert!(is_catalogued("string"));
        assert!(!is_catalogued("uint24[]"));
        assert!(!is_catalogued("(uint256,bool)"));
        assert!(!is_catalogued("uint256[2]"));
    }
}
