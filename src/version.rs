//! Semantic versions and range constraints for cached tools
//!
//! Cached version directories are written by many producers, so parsing is
//! lenient: `v1.2`, `1.02.3` and `1.2.3-rc.1` are all accepted, and the
//! directory's original text is kept so a resolved entry maps back to the
//! exact path on disk.
//!
//! Constraints accept the range syntax used in CI workflow files:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `1.2` / `=1.2` | any `1.2.x` |
//! | `~1.2` / `~>1.2` | `>=1.2.0, <1.3.0` |
//! | `^1.2` | `>=1.2.0, <2.0.0` |
//! | `>=1.2 <2` / `>=1.2, <2` | both comparators must hold |
//! | `1.2 - 1.4.5` | `>=1.2, <=1.4.5` |
//! | `!=1.3.0` | excludes a version |
//! | `* \|\| 1.x` | either side may hold |

use crate::error::{ToolCacheError, ToolCacheResult};
use semver::{BuildMetadata, Prerelease, Version, VersionReq};
use std::cmp::Ordering;
use std::fmt;

/// Strip the `=v` marker some producers prepend to exact versions
pub fn clean_version(version: &str) -> &str {
    version.strip_prefix("=v").unwrap_or(version)
}

/// A parsed version that remembers how it was written
#[derive(Debug, Clone)]
pub struct ToolVersion {
    parsed: Version,
    original: String,
}

impl ToolVersion {
    /// Parse a version string leniently
    pub fn parse(input: &str) -> Result<Self, String> {
        let text = input.trim();
        let body = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);

        let (core, build) = match body.split_once('+') {
            Some((core, build)) => (core, Some(build)),
            None => (body, None),
        };
        let (core, pre) = match core.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (core, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(format!("expected 1 to 3 numeric components in '{}'", input));
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("invalid numeric component '{}' in '{}'", part, input));
            }
            *slot = part
                .parse()
                .map_err(|e| format!("component '{}' in '{}': {}", part, input, e))?;
        }

        let mut parsed = Version::new(numbers[0], numbers[1], numbers[2]);
        if let Some(pre) = pre {
            parsed.pre = Prerelease::new(pre).map_err(|e| e.to_string())?;
        }
        if let Some(build) = build {
            parsed.build = BuildMetadata::new(build).map_err(|e| e.to_string())?;
        }

        Ok(Self {
            parsed,
            original: input.to_string(),
        })
    }

    /// The normalized semantic version
    pub fn version(&self) -> &Version {
        &self.parsed
    }

    /// The text this version was parsed from
    pub fn original(&self) -> &str {
        &self.original
    }
}

impl PartialEq for ToolVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToolVersion {}

impl PartialOrd for ToolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ToolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed
            .cmp(&other.parsed)
            .then_with(|| self.original.cmp(&other.original))
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// One AND-group of a constraint
#[derive(Debug, Clone)]
struct Group {
    require: VersionReq,
    exclude: Vec<VersionReq>,
}

impl Group {
    fn matches(&self, version: &Version) -> bool {
        self.require.matches(version) && !self.exclude.iter().any(|e| e.matches(version))
    }
}

/// A parsed range constraint: groups joined by `||`
#[derive(Debug, Clone)]
pub struct VersionConstraint {
    groups: Vec<Group>,
    source: String,
}

impl VersionConstraint {
    /// Parse a constraint expression
    pub fn parse(input: &str) -> ToolCacheResult<Self> {
        let parse_err = |reason: String| ToolCacheError::VersionParse {
            input: input.to_string(),
            reason,
        };

        if input.trim().is_empty() {
            return Err(parse_err("constraint is empty".to_string()));
        }

        let groups = input
            .split("||")
            .map(|group| parse_group(group).map_err(&parse_err))
            .collect::<ToolCacheResult<Vec<_>>>()?;

        Ok(Self {
            groups,
            source: input.to_string(),
        })
    }

    /// Whether the version satisfies any group of the constraint
    pub fn matches(&self, version: &ToolVersion) -> bool {
        self.groups.iter().any(|g| g.matches(version.version()))
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '!', '~', '^'];

fn parse_group(group: &str) -> Result<Group, String> {
    let tokens: Vec<&str> = group
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err("empty range between '||'".to_string());
    }

    let mut comparators = Vec::new();
    let mut exclude = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let mut token = tokens[i].to_string();
        // An operator written apart from its version, as in ">= 1.2"
        if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            let next = tokens
                .get(i + 1)
                .ok_or_else(|| format!("operator '{}' without a version", token))?;
            token.push_str(next);
            i += 1;
        }

        if tokens.get(i + 1) == Some(&"-") {
            let upper = tokens
                .get(i + 2)
                .ok_or_else(|| format!("hyphen range '{} -' without an upper bound", token))?;
            comparators.push(comparator(">=", strip_v(&token))?);
            comparators.push(comparator("<=", strip_v(upper))?);
            i += 3;
            continue;
        }

        let split = token
            .find(|c: char| !OPERATOR_CHARS.contains(&c))
            .ok_or_else(|| format!("operator '{}' without a version", token))?;
        let (op, version) = token.split_at(split);
        let version = strip_v(version);

        match op {
            "" | "=" | "==" => comparators.push(comparator("=", version)?),
            "!=" => exclude.push(parse_req(&comparator("=", version)?)?),
            ">" | ">=" | "<" | "<=" | "~" | "^" => comparators.push(comparator(op, version)?),
            "=<" => comparators.push(comparator("<=", version)?),
            "=>" => comparators.push(comparator(">=", version)?),
            "~>" => comparators.push(comparator("~", version)?),
            other => return Err(format!("unknown operator '{}'", other)),
        }
        i += 1;
    }

    // `*` next to other comparators adds nothing
    comparators.retain(|c| c != "*");
    let require = if comparators.is_empty() {
        VersionReq::STAR
    } else {
        parse_req(&comparators.join(", "))?
    };

    Ok(Group { require, exclude })
}

fn strip_v(version: &str) -> &str {
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
}

/// Render one comparator, folding `x`/`X`/`*` components into a partial version
fn comparator(op: &str, version: &str) -> Result<String, String> {
    let (core, suffix) = match version.find(['-', '+']) {
        Some(pos) => version.split_at(pos),
        None => (version, ""),
    };

    let mut parts = Vec::new();
    for part in core.split('.') {
        if matches!(part, "x" | "X" | "*") {
            break;
        }
        // Leading zeros are accepted, as in cached directory names
        match part.parse::<u64>() {
            Ok(n) => parts.push(n.to_string()),
            Err(_) => parts.push(part.to_string()),
        }
    }

    if parts.is_empty() {
        return match op {
            "=" | ">=" | "<=" | "~" | "^" => Ok("*".to_string()),
            _ => Err(format!("'{}' cannot be combined with a wildcard", op)),
        };
    }
    if parts.len() < core.split('.').count() && !suffix.is_empty() {
        return Err(format!("wildcard version '{}' cannot carry a suffix", version));
    }

    Ok(format!("{}{}{}", op, parts.join("."), suffix))
}

fn parse_req(text: &str) -> Result<VersionReq, String> {
    VersionReq::parse(text).map_err(|e| e.to_string())
}
