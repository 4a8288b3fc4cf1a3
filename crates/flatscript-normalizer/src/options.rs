//! Normalization options.

use serde::{Deserialize, Serialize};

/// Option record accepted by the normalizer entry points.
///
/// Deserializes from loose config records: every field defaults to `false`
/// and unknown keys are ignored. Always run through [`Options::canonical`]
/// before use; the rest of the pipeline assumes the overrides have been
/// applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Compatibility mode for older consumers: forces
    /// `reference_errors = false`, `unify_ret = false`, `unfold_ifs = true`,
    /// renders empty statements as empty blocks, and pads any block that
    /// ends in an `if`.
    pub backwards_compatible: bool,

    /// Reads of globals that are not declared-global get an inlined
    /// membership test and an explicit `ReferenceError` throw.
    pub reference_errors: bool,

    /// Collapse all `return`s into a single labeled `break` plus one final
    /// `return` from a dedicated variable.
    pub unify_ret: bool,

    /// Split every two-armed `if` with non-empty arms into two one-armed
    /// `if`s sharing a captured test value.
    pub unfold_ifs: bool,
}

impl Options {
    /// Apply the compatibility overrides.
    pub fn canonical(mut self) -> Self {
        if self.backwards_compatible {
            self.reference_errors = false;
            self.unify_ret = false;
            self.unfold_ifs = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_off() {
        assert_eq!(
            Options::default(),
            Options {
                backwards_compatible: false,
                reference_errors: false,
                unify_ret: false,
                unfold_ifs: false,
            }
        );
    }

    #[test]
    fn compatibility_forces_overrides() {
        let opts = Options {
            backwards_compatible: true,
            reference_errors: true,
            unify_ret: true,
            unfold_ifs: false,
        }
        .canonical();
        assert!(opts.backwards_compatible);
        assert!(!opts.reference_errors);
        assert!(!opts.unify_ret);
        assert!(opts.unfold_ifs);
    }

    #[test]
    fn deserializes_from_partial_record() {
        let opts: Options =
            serde_json::from_str(r#"{"unify_ret": true, "some_future_key": 3}"#).expect("parses");
        assert!(opts.unify_ret);
        assert!(!opts.unfold_ifs);
    }
}
