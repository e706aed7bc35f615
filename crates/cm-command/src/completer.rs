//! Prefix and acronym matching over a name table.
//!
//! Matching rules, given user input `p`:
//! * dehyphenated prefix: stripping `-` from both sides, `p` is a
//!   prefix of the name (`fa` matches `find-all`, `gl` matches
//!   `goto-line` typed as `gotol...`); literal prefixes are the
//!   degenerate case.
//! * acronym: `p` is a prefix of the first letters of the name's
//!   hyphen-separated segments (`bl` matches `buffer-list`).

#[derive(Debug, Clone)]
pub struct Completer {
    names: Vec<String>,
}

fn dehyphenate(s: &str) -> String {
    s.chars().filter(|c| *c != '-').collect()
}

fn acronym(s: &str) -> String {
    s.split('-')
        .filter_map(|seg| seg.chars().next())
        .collect()
}

impl Completer {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// A completer over the subset of `names` sharing a filter prefix
    /// (the child-completer construction for symbol tables).
    pub fn filtered<I, S>(names: I, filter: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(Into::into)
                .filter(|n: &String| n.starts_with(filter))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn matches_entry(name: &str, input: &str) -> bool {
        if input.len() > name.len() {
            return false;
        }
        let clean_name = dehyphenate(name);
        let clean_input = dehyphenate(input);
        clean_name.starts_with(&clean_input) || acronym(name).starts_with(input)
    }

    /// All names matching `input` under any rule, in table order.
    pub fn find_matches(&self, input: &str) -> Vec<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|n| Self::matches_entry(n, input))
            .collect()
    }

    /// Completion for `input`: the full name on a unique match, the
    /// longest common dehyphenated prefix (mapped back onto the
    /// hyphenated form) across several, or the input unchanged when
    /// nothing matches.
    pub fn complete_prefix(&self, input: &str) -> String {
        let matches = self.find_matches(input);
        match matches.len() {
            0 => input.to_string(),
            1 => matches[0].to_string(),
            _ => {
                let first = dehyphenate(matches[0]);
                let mut common = first.len();
                for name in &matches[1..] {
                    let other = dehyphenate(name);
                    common = first
                        .chars()
                        .zip(other.chars())
                        .take(common)
                        .take_while(|(a, b)| a == b)
                        .count();
                }
                rehyphenate(matches[0], common)
            }
        }
    }
}

/// Map a dehyphenated prefix length back onto the hyphenated name:
/// hyphens pass through for free, and a hyphen sitting right at the
/// boundary is included so completion lands on `buffer-`, ready for
/// the next segment.
fn rehyphenate(name: &str, dehyphenated_len: usize) -> String {
    let mut out = String::new();
    let mut consumed = 0usize;
    let mut chars = name.chars().peekable();
    while let Some(&c) = chars.peek() {
        if consumed == dehyphenated_len {
            break;
        }
        chars.next();
        out.push(c);
        if c != '-' {
            consumed += 1;
        }
    }
    if chars.peek() == Some(&'-') {
        out.push('-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> Completer {
        Completer::new([
            "find",
            "goto-line",
            "buffer-next",
            "buffer-prev",
            "buffer-new",
            "buffer-list",
            "save",
            "save-as",
        ])
    }

    #[test]
    fn acronyms_complete_to_full_names() {
        let c = canonical();
        assert_eq!(c.complete_prefix("bl"), "buffer-list");
        assert_eq!(c.complete_prefix("gl"), "goto-line");
    }

    #[test]
    fn dehyphenated_prefixes_match() {
        let c = canonical();
        assert!(c.find_matches("gotol").contains(&"goto-line"));
        assert!(c.find_matches("bufferl").contains(&"buffer-list"));
    }

    #[test]
    fn common_prefix_maps_back_to_hyphenated_form() {
        let c = canonical();
        assert_eq!(c.complete_prefix("buff"), "buffer-");
    }

    #[test]
    fn unique_literal_prefix_completes_fully() {
        let c = canonical();
        assert_eq!(c.complete_prefix("f"), "find");
        assert_eq!(c.complete_prefix("go"), "goto-line");
    }

    #[test]
    fn shared_prefix_stops_at_divergence() {
        let c = canonical();
        // "save" and "save-as" share "save"; no trailing hyphen since
        // the short name ends there.
        assert_eq!(c.complete_prefix("sa"), "save");
    }

    #[test]
    fn no_match_returns_input() {
        let c = canonical();
        assert_eq!(c.complete_prefix("zz"), "zz");
        assert!(c.find_matches("zz").is_empty());
    }

    #[test]
    fn over_long_input_cannot_match() {
        let c = Completer::new(["find"]);
        assert!(c.find_matches("find-").is_empty());
    }

    #[test]
    fn filtered_builds_child_tables() {
        let c = Completer::filtered(["box-cross", "box-tee-up", "sym-bullet"], "box-");
        assert_eq!(c.find_matches("box").len(), 2);
        assert!(c.find_matches("sym").is_empty());
    }
}
