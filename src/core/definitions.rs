use std::collections::HashMap;

/// Macro table shared by every script of one run
///
/// Each name maps to a flag. Names that were never defined check as `false`.
/// There is no scoping: a `#define` in one file is visible to every file processed after it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Definitions {
    flags: HashMap<String, bool>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a name is defined
    pub fn check(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set(&mut self, name: &str, value: bool) {
        log::debug!("definition {name} = {value}");
        self.flags.insert(name.to_string(), value);
    }

    pub fn define<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.set(name.as_ref(), true);
        }
    }

    pub fn undefine<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.set(name.as_ref(), false);
        }
    }

    /// Names currently checking as `true`, sorted
    pub fn defined_names(&self) -> Vec<&str> {
        let mut names = self
            .flags
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

impl<S> FromIterator<S> for Definitions
where
    S: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut defs = Self::new();
        defs.define(iter);
        defs
    }
}
