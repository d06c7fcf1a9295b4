use super::CommandInfo;
use crate::error::{PpError, PpErrorKind};
use error_stack::{Report, Result};
use std::collections::BTreeMap;

/// Raw plugin settings
///
/// Keys are `prefix:flag` for plugin-specific settings, or just `flag` for
/// settings every plugin sees. Each key can have multiple values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: BTreeMap<String, Vec<String>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to a key
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values of a key
    pub fn set<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Parse settings in the form `prefix:flag=value`, `flag=value` or `flag`
    ///
    /// A flag without `=` gets an empty value, which switches boolean settings on.
    pub fn parse<I, S>(args: I) -> Result<Self, PpError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Self::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg.split_once('=').unwrap_or((arg, ""));
            let key = key.trim();
            if key.is_empty() || key.starts_with(':') || key.ends_with(':') {
                return Err(Report::new(PpError::new(PpErrorKind::Config, "", 0))
                    .attach_printable(format!("invalid setting `{arg}`")));
            }
            settings.push(key, value);
        }
        Ok(settings)
    }

    /// The view of the settings for a plugin with the given prefixes
    ///
    /// `prefix:flag` entries lose their prefix; entries without a prefix are kept.
    /// When several prefixes set the same flag, values are merged in prefix order.
    pub fn with_prefixes(&self, prefixes: &[&str]) -> Settings {
        let mut view = Settings::new();
        for (key, values) in &self.entries {
            if !key.contains(':') {
                view.entries.entry(key.clone()).or_default().extend(values.iter().cloned());
            }
        }
        for prefix in prefixes {
            for (key, values) in &self.entries {
                let flag = match key.split_once(':') {
                    Some((p, flag)) if p == *prefix => flag,
                    _ => continue,
                };
                view.entries
                    .entry(flag.to_string())
                    .or_default()
                    .extend(values.iter().cloned());
            }
        }
        view
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values of a setting, by long name first and then by short name
    pub fn lookup(&self, info: &CommandInfo) -> Option<&[String]> {
        self.get(info.long)
            .or_else(|| self.get(info.short))
            .filter(|v| !v.is_empty())
    }

    /// Last value of a setting, or its default
    pub fn value(&self, info: &CommandInfo) -> String {
        self.lookup(info)
            .and_then(|v| v.last())
            .cloned()
            .unwrap_or_else(|| info.default.to_string())
    }

    /// Boolean value of a setting
    ///
    /// A present setting with an empty value is `true`.
    pub fn flag(&self, info: &CommandInfo) -> Result<bool, PpError> {
        let value = match self.lookup(info).and_then(|v| v.last()) {
            Some(v) => v.as_str(),
            None => info.default,
        };
        match value {
            "" | "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(Report::new(PpError::new(PpErrorKind::Config, "", 0))
                .attach_printable(format!(
                    "invalid value `{other}` for flag `{}`",
                    info.long
                ))),
        }
    }
}

#[cfg(test)]
mod ut {
    use super::*;

    const SEP: CommandInfo = CommandInfo::new("separator", "s", "token separator", " ");
    const FLAG: CommandInfo = CommandInfo::new("no-define", "nd", "disable define", "false");

    #[test]
    fn test_parse() {
        let s = Settings::parse(["inc:separator=,", "verbose", "cond:if=#when"]).unwrap();
        assert_eq!(Some(&[",".to_string()][..]), s.get("inc:separator"));
        assert_eq!(Some(&["".to_string()][..]), s.get("verbose"));
        assert!(Settings::parse(["=x"]).is_err());
        assert!(Settings::parse(["inc:=x"]).is_err());
    }

    #[test]
    fn test_with_prefixes() {
        let s = Settings::parse(["inc:separator=,", "include:s=;", "cond:separator=|", "g=1"])
            .unwrap();
        let view = s.with_prefixes(&["inc", "include"]);
        assert_eq!(",", view.value(&SEP));
        assert_eq!(Some(&["1".to_string()][..]), view.get("g"));
        assert!(view.get("cond:separator").is_none());
        let view = s.with_prefixes(&["other"]);
        assert_eq!(" ", view.value(&SEP));
    }

    #[test]
    fn test_short_name() {
        let s = Settings::parse(["inc:s=;"]).unwrap().with_prefixes(&["inc"]);
        assert_eq!(";", s.value(&SEP));
    }

    #[test]
    fn test_flag() {
        let s = Settings::new();
        assert!(!s.flag(&FLAG).unwrap());
        let s = Settings::parse(["nd"]).unwrap();
        assert!(s.flag(&FLAG).unwrap());
        let s = Settings::parse(["no-define=false"]).unwrap();
        assert!(!s.flag(&FLAG).unwrap());
        let s = Settings::parse(["no-define=maybe"]).unwrap();
        assert!(s.flag(&FLAG).is_err());
    }
}
