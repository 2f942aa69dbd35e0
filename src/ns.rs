//! Fixed namespace bindings for the ST.96 trademark schemas.
//!
//! These are process-wide constants; selectors are compiled against them once
//! at schema construction and the bindings are never mutated afterward.

/// WIPO ST.96 Trademark namespace.
pub const TMK: &str = "http://www.wipo.int/standards/XMLSchema/ST96/Trademark";

/// CIPO jurisdiction extension of the Trademark namespace.
pub const CATMK: &str = "http://www.cipo.ic.gc.ca/standards/XMLSchema/ST96/Trademark";

/// WIPO ST.96 Common namespace.
pub const COM: &str = "http://www.wipo.int/standards/XMLSchema/ST96/Common";

/// CIPO jurisdiction extension of the Common namespace.
pub const CACOM: &str = "http://www.cipo.ic.gc.ca/standards/XMLSchema/ST96/Common";

/// Local name of the compound record element each collection is made of.
pub const RECORD_LOCAL: &str = "TrademarkBag";

/// Namespace of the compound record element.
pub const RECORD_NS: &str = TMK;

/// Resolve a selector prefix to its namespace URI.
pub fn resolve_prefix(prefix: &str) -> Option<&'static str> {
    match prefix {
        "tmk" => Some(TMK),
        "catmk" => Some(CATMK),
        "com" => Some(COM),
        "cacom" => Some(CACOM),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefixes_resolve() {
        assert_eq!(resolve_prefix("tmk"), Some(TMK));
        assert_eq!(resolve_prefix("catmk"), Some(CATMK));
        assert_eq!(resolve_prefix("com"), Some(COM));
        assert_eq!(resolve_prefix("cacom"), Some(CACOM));
    }

    #[test]
    fn unknown_prefix_is_none() {
        assert_eq!(resolve_prefix("xsi"), None);
        assert_eq!(resolve_prefix(""), None);
    }
}
