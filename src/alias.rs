//! Option aliases.
//!
//! Every option is declared with a list of spellings. The longest
//! one becomes the option's real name in its `FlagSet`, and all the
//! others are entered into the owning command's alias table so they
//! can be rewritten before the flags are parsed.
//!
//! Three spelling styles are understood:
//! * **POSIX** - `-c`
//! * **Multics** - `-count`
//! * **GNU** - `--count`

use {
    crate::FlagSet,
    std::collections::BTreeMap,
    tracing::{trace, warn},
};

/// Maps a dash-prefixed alias to the dash-prefixed canonical name
pub type AliasTable = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasSet {
    pub canonical: String,
    /// Every other spelling, in the order given
    pub rejected: Vec<String>,
}

/// Picks the canonical spelling from `aliases`: the longest one,
/// with ties going to whichever came first. Leading dashes on the
/// given spellings are ignored.
///
/// Returns `None` for an empty list, or when a spelling is nothing
/// but dashes.
pub fn setup_aliases<S: AsRef<str>>(aliases: &[S]) -> Option<AliasSet> {
    let names: Vec<&str> = aliases
        .iter()
        .map(|a| a.as_ref().trim_start_matches('-'))
        .collect();
    if names.iter().any(|name| name.is_empty()) {
        return None;
    }
    let mut longest = 0;
    for (i, name) in names.iter().enumerate().skip(1) {
        if name.chars().count() > names[longest].chars().count() {
            longest = i;
        }
    }
    let canonical = (*names.get(longest)?).to_owned();
    let rejected = names
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != longest)
        .map(|(_, name)| (*name).to_owned())
        .collect();
    Some(AliasSet {
        canonical,
        rejected,
    })
}

impl AliasSet {
    /// `-c` for a single character, `--count` otherwise
    pub fn prefixed(&self) -> String {
        prefix(&self.canonical)
    }

    /// The alias table entries for this option. Multi-character
    /// aliases get both a single and a double dash entry.
    pub fn entries(&self) -> Vec<(String, String)> {
        let target = self.prefixed();
        let mut out = Vec::with_capacity(self.rejected.len() * 2);
        for alias in &self.rejected {
            out.push((format!("-{alias}"), target.clone()));
            if alias.chars().count() > 1 {
                out.push((format!("--{alias}"), target.clone()));
            }
        }
        out
    }

    /// Adds this option's entries to `table`. A later registration of
    /// the same alias replaces the earlier one.
    pub fn merge_into(&self, table: &mut AliasTable) {
        for (alias, target) in self.entries() {
            if let Some(previous) = table.insert(alias.clone(), target) {
                if previous != table[&alias] {
                    warn!(
                        alias = %alias,
                        previous = %previous,
                        now = %table[&alias],
                        "option alias reassigned"
                    );
                }
            }
        }
    }
}

pub(crate) fn prefix(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

/// Replaces aliased flag names in `tokens` with their canonical
/// spelling. Only tokens that `FlagSet::parse` would read as flags are
/// touched: rewriting stops where flag parsing stops, and the value
/// following a flag that takes one is skipped.
pub(crate) fn rewrite(
    table: &AliasTable,
    flags: &FlagSet,
    tokens: &mut [String],
) {
    if table.is_empty() {
        return;
    }
    let mut i = 0;
    while i < tokens.len() {
        let token = &mut tokens[i];
        i += 1;
        // Same stopping points as `FlagSet::parse`
        if token.len() < 2
            || !token.starts_with('-')
            || token.as_str() == "--"
        {
            break;
        }
        let inline = rewrite_name(table, token);
        let end = eq_position(token).unwrap_or(token.len());
        let name = token[..end].trim_start_matches('-');
        let takes_value = flags
            .lookup(name)
            .is_some_and(|flag| !flag.value.is_bool_flag());
        if takes_value && !inline {
            i += 1;
        }
    }
}

// Returns whether the token carries its value after an '='
fn rewrite_name(table: &AliasTable, token: &mut String) -> bool {
    if let Some(target) = table.get(token.as_str()) {
        trace!(from = %token, to = %target, "alias");
        *token = target.clone();
        return false;
    }
    let Some(eq) = eq_position(token) else {
        return false;
    };
    // `-c=4` becomes `--count=4`
    if let Some(target) = table.get(&token[..eq]) {
        trace!(from = %token, to = %target, "alias");
        *token = format!("{}{}", target, &token[eq..]);
    }
    true
}

#[cfg(feature = "eq-separator")]
fn eq_position(token: &str) -> Option<usize> {
    token.find('=')
}
#[cfg(not(feature = "eq-separator"))]
fn eq_position(_: &str) -> Option<usize> {
    None
}

/// Orders aliases for display: POSIX, then Multics, then GNU, each
/// group sorted
pub fn sort_aliases(aliases: &mut [String]) {
    aliases.sort_by(|a, b| {
        style_rank(a).cmp(&style_rank(b)).then_with(|| a.cmp(b))
    });
}

fn style_rank(alias: &str) -> u8 {
    if alias.starts_with("--") {
        2
    } else if alias.chars().count() == 2 {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{ErrorPolicy, Handle, Opt},
    };

    #[test]
    fn should_choose_the_longest_alias() {
        let set = setup_aliases(&["c", "count"]).unwrap();
        assert_eq!(set.canonical, "count");
        assert_eq!(set.rejected, vec!["c"]);
        assert_eq!(set.prefixed(), "--count");
    }
    #[test]
    fn should_break_ties_by_first_occurrence() {
        let set = setup_aliases(&["n", "abc", "xyz", "q"]).unwrap();
        assert_eq!(set.canonical, "abc");
        assert_eq!(set.rejected, vec!["n", "xyz", "q"]);
    }
    #[test]
    fn should_build_the_same_table_every_time() {
        let list = ["v", "verbose", "loud", "V"];
        let mut first = AliasTable::new();
        setup_aliases(&list).unwrap().merge_into(&mut first);
        for _ in 0..3 {
            let mut again = AliasTable::new();
            let set = setup_aliases(&list).unwrap();
            assert_eq!(set.canonical, "verbose");
            set.merge_into(&mut again);
            assert_eq!(again, first);
        }
        assert_eq!(
            first.into_iter().collect::<Vec<_>>(),
            vec![
                ("--loud".to_string(), "--verbose".to_string()),
                ("-V".to_string(), "--verbose".to_string()),
                ("-loud".to_string(), "--verbose".to_string()),
                ("-v".to_string(), "--verbose".to_string()),
            ]
        );
    }
    #[test]
    fn should_create_no_entries_for_a_single_alias() {
        let set = setup_aliases(&["count"]).unwrap();
        assert_eq!(set.canonical, "count");
        assert!(set.rejected.is_empty());
        assert!(set.entries().is_empty());
        assert!(setup_aliases::<&str>(&[]).is_none());
    }
    #[test]
    fn should_use_a_single_dash_for_short_canonical_names() {
        let set = setup_aliases(&["x", "y"]).unwrap();
        assert_eq!(set.canonical, "x");
        assert_eq!(
            set.entries(),
            vec![("-y".to_string(), "-x".to_string())]
        );
    }
    #[test]
    fn should_reject_spellings_made_of_dashes() {
        assert!(setup_aliases(&["-"]).is_none());
        assert!(setup_aliases(&["count", "--"]).is_none());
    }
    #[test]
    fn should_ignore_dashes_on_given_aliases() {
        let set = setup_aliases(&["-c", "--count"]).unwrap();
        assert_eq!(set.canonical, "count");
        assert_eq!(set.rejected, vec!["c"]);
    }
    #[test]
    fn should_let_later_registrations_win() {
        let mut table = AliasTable::new();
        setup_aliases(&["c", "count"]).unwrap().merge_into(&mut table);
        setup_aliases(&["c", "color"]).unwrap().merge_into(&mut table);
        assert_eq!(table["-c"], "--color");
    }
    fn data() -> (AliasTable, FlagSet) {
        let mut table = AliasTable::new();
        let mut flags = FlagSet::new("test", ErrorPolicy::Continue);
        for (aliases, value) in [
            (["c", "count"], Opt::Int(Handle::new(0))),
            (["n", "name"], Opt::Str(Handle::new(String::new()))),
            (["q", "quiet"], Opt::Bool(Handle::new(false))),
        ] {
            let set = setup_aliases(&aliases).unwrap();
            flags.define(&set.canonical, value, "");
            set.merge_into(&mut table);
        }
        (table, flags)
    }
    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn should_rewrite_aliases_before_the_terminator() {
        let (table, flags) = data();
        let mut list = tokens(&["-c", "2", "-q", "-n", "x", "--", "-c"]);
        rewrite(&table, &flags, &mut list);
        assert_eq!(
            list,
            vec!["--count", "2", "--quiet", "--name", "x", "--", "-c"]
        );

        #[cfg(feature = "eq-separator")]
        {
            let mut list = tokens(&["-c=4", "-q", "-c", "5"]);
            rewrite(&table, &flags, &mut list);
            assert_eq!(list, vec!["--count=4", "--quiet", "--count", "5"]);
        }
    }
    #[test]
    fn should_leave_operands_and_option_values_alone() {
        let (table, flags) = data();
        let mut list = tokens(&["two", "-c"]);
        rewrite(&table, &flags, &mut list);
        assert_eq!(list, vec!["two", "-c"]);

        let mut list = tokens(&["--name", "-c", "x", "-q"]);
        rewrite(&table, &flags, &mut list);
        assert_eq!(list, vec!["--name", "-c", "x", "-q"]);

        let mut list = tokens(&["-q", "-", "-c"]);
        rewrite(&table, &flags, &mut list);
        assert_eq!(list, vec!["--quiet", "-", "-c"]);
    }
    #[test]
    fn should_sort_aliases_by_style() {
        let mut aliases: Vec<String> = ["--loud", "-loud", "-v", "-V", "--am"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        sort_aliases(&mut aliases);
        assert_eq!(aliases, vec!["-V", "-v", "-loud", "--am", "--loud"]);
    }
}
