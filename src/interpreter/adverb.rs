//! The `init`/`iterate` adverb vocabulary (§4.7): long and short spellings
//! decode to the same fixed set, with an `Unknown` catch-all and `Sync` as
//! the default when no adverb attribute is present.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Adverb {
    #[default]
    Sync,
    Async,
    Asc,
    Desc,
    Excl,
    Uniq,
    Unknown,
}

impl Adverb {
    pub fn parse(token: &str) -> Adverb {
        match token {
            "synchronously" | "sync" => Adverb::Sync,
            "asynchronously" | "async" => Adverb::Async,
            "ascendingly" | "asc" => Adverb::Asc,
            "descendingly" | "desc" => Adverb::Desc,
            "exclusively" | "excl" => Adverb::Excl,
            "uniquely" | "uniq" => Adverb::Uniq,
            _ => Adverb::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_and_short_forms_agree() {
        assert_eq!(Adverb::parse("asynchronously"), Adverb::parse("async"));
        assert_eq!(Adverb::parse("descendingly"), Adverb::parse("desc"));
    }

    #[test]
    fn unrecognised_token_is_unknown() {
        assert_eq!(Adverb::parse("sideways"), Adverb::Unknown);
    }

    #[test]
    fn default_is_sync() {
        assert_eq!(Adverb::default(), Adverb::Sync);
    }
}
