use std::fmt;

use thiserror::Error;

const CHANNEL_SEPARATOR: &str = "::";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("unrecognized package specifier: \"{0}\"")]
    Unrecognized(String),
}

/// A manifest dependency of the form `(<channel>::)?<name>(<constraint>)?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageSpec {
    pub channel: Option<String>,
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    pub fn parse(input: &str) -> Result<Self, SpecError> {
        parse_spec(input)
    }

    /// Whether the spec constrains anything beyond the bare name.
    pub fn is_constrained(&self) -> bool {
        self.channel.is_some() || self.version.is_some()
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(channel) = &self.channel {
            write!(f, "{channel}{CHANNEL_SEPARATOR}")?;
        }
        f.write_str(&self.name)?;
        if let Some(version) = &self.version {
            f.write_str(version)?;
        }
        Ok(())
    }
}

pub fn parse_spec(input: &str) -> Result<PackageSpec, SpecError> {
    let unrecognized = || SpecError::Unrecognized(input.to_string());

    let (channel, rest) = match input.rsplit_once(CHANNEL_SEPARATOR) {
        Some((channel, rest)) => {
            if channel.is_empty() || channel.chars().any(char::is_whitespace) {
                return Err(unrecognized());
            }
            (Some(channel.to_string()), rest)
        }
        None => (None, input),
    };

    let name_len = rest
        .find(|ch: char| !is_name_char(ch))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return Err(unrecognized());
    }
    let (name, constraint) = rest.split_at(name_len);

    let version = if constraint.is_empty() {
        None
    } else {
        validate_constraint(constraint).ok_or_else(unrecognized)?;
        Some(constraint.to_string())
    };

    Ok(PackageSpec {
        channel,
        name: name.to_string(),
        version,
    })
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn is_operator_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | '=' | '!' | '~')
}

fn validate_constraint(constraint: &str) -> Option<()> {
    if constraint.contains(['\n', '\r']) {
        return None;
    }
    let operand = constraint.trim_start_matches(is_operator_char);
    if operand.len() == constraint.len() || operand.trim().is_empty() {
        return None;
    }
    Some(())
}
