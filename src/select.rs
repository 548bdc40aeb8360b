//! Precompiled option sets for `select_name`/`select_string`: fast
//! decoding against a known candidate list that returns the matching
//! index, or no-match, without advancing past unmatched content.

/// A precompiled set of candidate strings. Small option sets (the common
/// case: a handful of known object keys) are resolved with a linear
/// scan; there is no need for a trie since `select_name`/`select_string`
/// sites are called with the same small constant option set on every
/// object instance, and LLVM-grade branch prediction on a few string
/// comparisons outperforms a more complex automaton at these sizes.
#[derive(Debug, Clone)]
pub struct SelectOptions {
    options: Vec<String>,
}

/// No match was found among the provided options.
pub const NO_MATCH: i32 = -1;

impl SelectOptions {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SelectOptions {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Return the index of `candidate` among the options, or [`NO_MATCH`].
    pub fn index_of(&self, candidate: &str) -> i32 {
        self.options
            .iter()
            .position(|o| o == candidate)
            .map(|i| i as i32)
            .unwrap_or(NO_MATCH)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_select_options() {
        let opts = SelectOptions::new(["id", "name", "tags"]);
        assert_eq!(opts.index_of("name"), 1);
        assert_eq!(opts.index_of("missing"), NO_MATCH);
        assert_eq!(opts.len(), 3);
    }
}
