//! Reaction rules and the ordered table that resolves them.
//!
//! Rules are non-constructive: the reactants drawn for a step stay in the vessel, and the rule
//! only names the single molecule that takes the place of a random one. A rule is written as
//! `2A + B -> C`; an empty left side (`-> C`) matches any sample.

use crate::config::ConfigError;
use crate::counts::*;
use crate::molecule::*;
use atoi::FromRadix10Checked;
use std::fmt::{self, Display, Formatter};
use thiserror::Error;
use tracing::debug;

/// Parse a rule literal against a registry, panicking on failure.
#[macro_export]
macro_rules! rule {
    ($registry:expr, $rule:literal) => {
        $crate::reaction::ReactionRule::parse(&$registry, $rule)
            .expect(concat!("Failed to parse rule ", $rule))
    };
}

/// A minimum reactant requirement and the molecule produced when it is met.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReactionRule {
    requirement: ReactantCounts,
    product: MoleculeType,
}
impl ReactionRule {
    /// Build a rule from `(reactant, amount)` pairs. Repeated reactants add up, and any type not
    /// mentioned requires zero. The total number of reactants must fit in a `usize`.
    pub fn new<I: IntoIterator<Item = (MoleculeType, usize)>>(
        registry: &Registry,
        requirement: I,
        product: MoleculeType,
    ) -> Result<Self, ConfigError> {
        if !registry.contains(product) {
            return Err(ConfigError::UndeclaredProduct(product));
        }
        let mut counts = ReactantCounts::zeroed(registry);
        let mut order = 0usize;
        for (ty, amount) in requirement {
            counts.add(ty, amount).map_err(|e| match e {
                CountError::Undeclared(e) => ConfigError::UndeclaredReactant(e.0),
                CountError::Overflow(ty) => ConfigError::RequirementOverflow(ty),
            })?;
            order = order
                .checked_add(amount)
                .ok_or(ConfigError::RequirementOverflow(ty))?;
        }
        Ok(Self {
            requirement: counts,
            product,
        })
    }

    pub fn requirement(&self) -> &ReactantCounts {
        &self.requirement
    }
    pub fn product(&self) -> MoleculeType {
        self.product
    }
    /// Total number of reactants this rule needs.
    pub fn order(&self) -> usize {
        self.requirement.total()
    }

    /// Check if `counts` has at least the required amount of every type.
    ///
    /// Counts over a different registry never satisfy a rule.
    pub fn can_occur(&self, counts: &ReactantCounts) -> bool {
        if counts.registry() != self.requirement.registry()
            || counts.kinds() != self.requirement.kinds()
        {
            debug!(?counts, "reactant counts are over a different registry");
            return false;
        }
        self.requirement
            .as_slice()
            .iter()
            .zip(counts.as_slice())
            .all(|(need, have)| have >= need)
    }

    /// Format this rule in the notation accepted by [`parse`](Self::parse).
    pub fn display<'a>(&'a self, registry: &'a Registry) -> RuleDisplay<'a> {
        RuleDisplay {
            rule: self,
            registry,
        }
    }

    /// Parse a rule such as `A + B -> A`, `2B -> A`, or `-> B`, resolving names in `registry`.
    pub fn parse(registry: &Registry, s: impl AsRef<[u8]>) -> Result<Self, RuleParseError> {
        use RuleParseErrorKind::*;
        let input = s.as_ref();
        let mut idx = skip_ws(input, 0);
        let mut requirement = ReactantCounts::zeroed(registry);
        let mut order = 0usize;
        if !input[idx..].starts_with(b"->") {
            loop {
                let start = idx;
                let (n, u) = usize::from_radix_10_checked(&input[idx..]);
                let n = match (n, u) {
                    (_, 0) => 1,
                    (Some(n), _) => n,
                    (None, _) => return Err(RuleParseError::new(start, CoefficientOverflow)),
                };
                idx = skip_ws(input, idx + u);
                if idx == input.len() {
                    return Err(RuleParseError::new(idx, MissingArrow));
                }
                let (ty, len) = read_molecule(registry, input, idx)?;
                let name = &input[idx..(idx + len)];
                requirement.add(ty, n).map_err(|e| match e {
                    CountError::Overflow(_) => RuleParseError::new(start, CoefficientOverflow),
                    CountError::Undeclared(_) => RuleParseError::new(
                        idx,
                        UnknownMolecule(String::from_utf8_lossy(name).into_owned()),
                    ),
                })?;
                order = order
                    .checked_add(n)
                    .ok_or(RuleParseError::new(start, CoefficientOverflow))?;
                idx = skip_ws(input, idx + len);
                match input.get(idx) {
                    Some(&b'+') => idx = skip_ws(input, idx + 1),
                    Some(&b'-') if input.get(idx + 1) == Some(&b'>') => break,
                    Some(&c) => return Err(RuleParseError::new(idx, UnexpectedChar(c as char))),
                    None => return Err(RuleParseError::new(idx, MissingArrow)),
                }
            }
        }
        idx = skip_ws(input, idx + 2);
        if idx == input.len() {
            return Err(RuleParseError::new(idx, MissingProduct));
        }
        let (product, len) = read_molecule(registry, input, idx)?;
        idx = skip_ws(input, idx + len);
        if idx != input.len() {
            return Err(RuleParseError::new(idx, TrailingInput));
        }
        Ok(Self {
            requirement,
            product,
        })
    }
}

fn skip_ws(input: &[u8], mut idx: usize) -> usize {
    while input.get(idx).map_or(false, u8::is_ascii_whitespace) {
        idx += 1;
    }
    idx
}

/// Read a molecule name at `idx`, returning the type and the name's length.
fn read_molecule(
    registry: &Registry,
    input: &[u8],
    idx: usize,
) -> Result<(MoleculeType, usize), RuleParseError> {
    use RuleParseErrorKind::*;
    match input.get(idx) {
        Some(&c) if c.is_ascii_alphabetic() || c == b'_' => {}
        Some(&c) => return Err(RuleParseError::new(idx, UnexpectedChar(c as char))),
        None => return Err(RuleParseError::new(idx, MissingProduct)),
    }
    let len = input[idx..]
        .iter()
        .take_while(|&&c| c.is_ascii_alphanumeric() || c == b'_' || c == b'\'')
        .count();
    // only ASCII bytes were taken
    let name = std::str::from_utf8(&input[idx..(idx + len)]).unwrap_or_default();
    registry
        .lookup(name)
        .map(|ty| (ty, len))
        .ok_or_else(|| RuleParseError::new(idx, UnknownMolecule(name.to_string())))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum RuleParseErrorKind {
    #[error("unknown molecule {0:?}")]
    UnknownMolecule(String),
    #[error("unexpected character: {0:?}")]
    UnexpectedChar(char),
    #[error("expected \"->\"")]
    MissingArrow,
    #[error("expected a product")]
    MissingProduct,
    #[error("unexpected input after the product")]
    TrailingInput,
    #[error("coefficient is too large")]
    CoefficientOverflow,
}
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("error at index {idx} in reaction rule: {kind}")]
pub struct RuleParseError {
    pub kind: RuleParseErrorKind,
    pub idx: usize,
}
impl RuleParseError {
    pub const fn new(idx: usize, kind: RuleParseErrorKind) -> Self {
        Self { kind, idx }
    }
}

/// Helper returned by [`ReactionRule::display`].
pub struct RuleDisplay<'a> {
    rule: &'a ReactionRule,
    registry: &'a Registry,
}
impl Display for RuleDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (ty, n) in self.rule.requirement.iter().filter(|&(_, n)| n > 0) {
            if !first {
                f.write_str(" + ")?;
            }
            first = false;
            if n > 1 {
                write!(f, "{n}")?;
            }
            f.write_str(self.registry.name(ty).unwrap_or("?"))?;
        }
        if !first {
            f.write_str(" ")?;
        }
        write!(
            f,
            "-> {}",
            self.registry.name(self.rule.product).unwrap_or("?")
        )
    }
}

/// Rules in priority order. The first rule that can occur wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<ReactionRule>,
}
impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn from_rules<I: IntoIterator<Item = ReactionRule>>(rules: I) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Parse one rule per line. Blank lines are skipped and `#` starts a comment.
    pub fn parse<'a, I: IntoIterator<Item = &'a str>>(
        registry: &Registry,
        lines: I,
    ) -> Result<Self, RuleParseError> {
        let mut out = Self::new();
        for line in lines {
            let line = line.split_once('#').map_or(line, |(l, _)| l);
            if line.trim().is_empty() {
                continue;
            }
            out.push(ReactionRule::parse(registry, line)?);
        }
        Ok(out)
    }

    pub fn push(&mut self, rule: ReactionRule) {
        self.rules.push(rule);
    }
    pub fn len(&self) -> usize {
        self.rules.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
    pub fn get(&self, idx: usize) -> Option<&ReactionRule> {
        self.rules.get(idx)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, ReactionRule> {
        self.rules.iter()
    }

    /// Find the first rule, in table order, that can occur with `counts`.
    pub fn first_match(&self, counts: &ReactantCounts) -> Option<&ReactionRule> {
        self.first_match_index(counts).map(|(_, r)| r)
    }
    /// Like [`first_match`](Self::first_match), but also return the rule's position.
    pub fn first_match_index(&self, counts: &ReactantCounts) -> Option<(usize, &ReactionRule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.can_occur(counts))
    }
}
impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a ReactionRule;
    type IntoIter = std::slice::Iter<'a, ReactionRule>;
    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
