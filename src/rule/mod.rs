//! Boolean half-space algebra over signed surface handles.
//!
//! A [`HeadRule`] is an immutable expression tree: literals are signed
//! surface handles, interior nodes are intersections and unions. The text
//! form follows MCNP cell cards: juxtaposition is intersection, `:` is
//! union, parentheses group and `#` complements the following factor.
//! Intersection binds tighter than union.
//!
//! ```text
//! 1 -2 (3 : -4) #(5 6)
//! ```
//!
//! The empty rule stands for "no constraint yet": it is all of space when
//! evaluated and composes as a no-op, being the identity of intersection
//! and of union and its own complement.

mod parse;
mod simplify;
mod track;

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, Mul, Neg};
use std::str::FromStr;

use crate::error::{KernelError, Result};
use crate::geometry::SurfaceRegistry;
use crate::math::Point3;

pub use track::LineIntercept;

/// A node of a rule tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rule {
    /// A signed surface handle: the half-space on that side of the surface.
    Literal(i32),
    /// All children must hold.
    Intersection(Vec<Rule>),
    /// At least one child must hold.
    Union(Vec<Rule>),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    And,
    Or,
}

impl Rule {
    /// Builds an intersection, flattening nested intersections.
    #[must_use]
    pub fn and(items: Vec<Rule>) -> Rule {
        Self::combine(Kind::And, items)
    }

    /// Builds a union, flattening nested unions.
    #[must_use]
    pub fn or(items: Vec<Rule>) -> Rule {
        Self::combine(Kind::Or, items)
    }

    fn combine(kind: Kind, items: Vec<Rule>) -> Rule {
        let mut flat = Vec::with_capacity(items.len());
        for item in items {
            match (kind, item) {
                (Kind::And, Rule::Intersection(sub)) | (Kind::Or, Rule::Union(sub)) => {
                    flat.extend(sub);
                }
                (_, other) => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.swap_remove(0);
        }
        match kind {
            Kind::And => Rule::Intersection(flat),
            Kind::Or => Rule::Union(flat),
        }
    }

    /// De Morgan dual: intersections become unions and every literal flips.
    #[must_use]
    pub fn complement(&self) -> Rule {
        match self {
            Rule::Literal(n) => Rule::Literal(-n),
            Rule::Intersection(items) => Rule::Union(items.iter().map(Rule::complement).collect()),
            Rule::Union(items) => Rule::Intersection(items.iter().map(Rule::complement).collect()),
        }
    }

    /// Evaluates the rule given a function returning the side (`1`, `-1`
    /// or `0` for on-surface) of the point of interest for an unsigned handle.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `side`.
    pub fn is_valid_with<F>(&self, side: &mut F) -> Result<bool>
    where
        F: FnMut(i32) -> Result<i32>,
    {
        match self {
            Rule::Literal(n) => {
                let s = side(n.abs())?;
                Ok(s == 0 || s == n.signum())
            }
            Rule::Intersection(items) => {
                for item in items {
                    if !item.is_valid_with(side)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Rule::Union(items) => {
                for item in items {
                    if item.is_valid_with(side)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn map_literals<F: Fn(i32) -> Result<i32> + Copy>(&self, f: F) -> Result<Rule> {
        Ok(match self {
            Rule::Literal(n) => Rule::Literal(f(*n)?),
            Rule::Intersection(items) => Rule::Intersection(
                items.iter().map(|r| r.map_literals(f)).collect::<Result<_>>()?,
            ),
            Rule::Union(items) => {
                Rule::Union(items.iter().map(|r| r.map_literals(f)).collect::<Result<_>>()?)
            }
        })
    }

    fn visit_literals<F: FnMut(i32)>(&self, f: &mut F) {
        match self {
            Rule::Literal(n) => f(*n),
            Rule::Intersection(items) | Rule::Union(items) => {
                for item in items {
                    item.visit_literals(f);
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Rule::Literal(_) => 0,
            Rule::Intersection(items) | Rule::Union(items) => {
                1 + items.iter().map(Rule::depth).max().unwrap_or(0)
            }
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, inside_and: bool) -> fmt::Result {
        match self {
            Rule::Literal(n) => write!(f, "{n}"),
            Rule::Intersection(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    item.write(f, true)?;
                }
                Ok(())
            }
            Rule::Union(items) => {
                if inside_and {
                    f.write_str("(")?;
                }
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" : ")?;
                    }
                    item.write(f, false)?;
                }
                if inside_and {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

/// A CSG region: a Boolean expression over signed surface handles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HeadRule {
    root: Option<Rule>,
}

impl HeadRule {
    /// The empty rule (all of space).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule holding a single signed surface.
    #[must_use]
    pub fn from_surf(handle: i32) -> Self {
        Self {
            root: Some(Rule::Literal(handle)),
        }
    }

    /// Wraps an existing tree.
    #[must_use]
    pub fn from_rule(rule: Rule) -> Self {
        Self { root: Some(rule) }
    }

    /// Parses the text grammar described in the module documentation.
    ///
    /// # Errors
    ///
    /// Returns a parse error on unknown tokens, unbalanced parentheses,
    /// dangling operators or a zero surface number.
    pub fn parse(input: &str) -> Result<Self> {
        parse::parse(input).map(|root| Self { root })
    }

    /// Parses `expr`, adds `offset` to every surface number and resolves each
    /// through the registry. This is how components write their cells using
    /// local surface numbers `1, 2, 3, ...` relative to their build index.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or a surface is unknown.
    pub fn composite(registry: &SurfaceRegistry, offset: i32, expr: &str) -> Result<Self> {
        Self::parse(expr)?.with_offset(offset).resolve(registry)
    }

    /// True when the rule is all of space.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The rule tree, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Rule> {
        self.root.as_ref()
    }

    /// Intersection of two rules. The empty rule is the identity.
    #[must_use]
    pub fn intersect(&self, other: &HeadRule) -> HeadRule {
        match (&self.root, &other.root) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => HeadRule::from_rule(Rule::and(vec![a.clone(), b.clone()])),
        }
    }

    /// Union of two rules. The empty rule is the identity.
    #[must_use]
    pub fn union(&self, other: &HeadRule) -> HeadRule {
        match (&self.root, &other.root) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => HeadRule::from_rule(Rule::or(vec![a.clone(), b.clone()])),
        }
    }

    /// De Morgan complement. The empty rule complements to itself so that it
    /// stays a no-op when used as a cut.
    #[must_use]
    pub fn complement(&self) -> HeadRule {
        Self {
            root: self.root.as_ref().map(Rule::complement),
        }
    }

    /// In-place intersection.
    pub fn add_intersection(&mut self, other: &HeadRule) {
        *self = self.intersect(other);
    }

    /// In-place union.
    pub fn add_union(&mut self, other: &HeadRule) {
        *self = self.union(other);
    }

    /// True when `point` lies inside the region. Points on a surface count
    /// as inside for either sign of that surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule references an unregistered surface.
    pub fn is_valid(&self, registry: &SurfaceRegistry, point: &Point3) -> Result<bool> {
        self.is_valid_with(|handle| registry.side(handle, point))
    }

    /// Evaluates the rule with a caller-supplied side function.
    ///
    /// # Errors
    ///
    /// Propagates any error returned by `side`.
    pub fn is_valid_with<F>(&self, mut side: F) -> Result<bool>
    where
        F: FnMut(i32) -> Result<i32>,
    {
        match &self.root {
            None => Ok(true),
            Some(rule) => rule.is_valid_with(&mut side),
        }
    }

    /// Replaces every literal on `|old|` by `new`, keeping each literal's sign.
    #[must_use]
    pub fn substitute_surf(&self, old: i32, new: i32) -> HeadRule {
        let old = old.abs();
        self.map(|n| if n.abs() == old { n.signum() * new } else { n })
    }

    /// Adds `offset` to the magnitude of every literal.
    #[must_use]
    pub fn with_offset(&self, offset: i32) -> HeadRule {
        self.map(|n| n.signum() * (n.abs() + offset))
    }

    /// Resolves every literal to its canonical registry handle.
    ///
    /// # Errors
    ///
    /// Returns an error if a surface is not registered.
    pub fn resolve(&self, registry: &SurfaceRegistry) -> Result<HeadRule> {
        let root = match &self.root {
            None => None,
            Some(rule) => Some(rule.map_literals(|n| registry.real_surf(n))?),
        };
        Ok(Self { root })
    }

    fn map<F: Fn(i32) -> i32 + Copy>(&self, f: F) -> HeadRule {
        let root = self
            .root
            .as_ref()
            .map(|r| r.map_literals(|n| Ok::<i32, KernelError>(f(n))));
        Self {
            root: root.and_then(Result::ok),
        }
    }

    /// Best-effort simplification; never changes which points are inside.
    #[must_use]
    pub fn remove_common(&self) -> HeadRule {
        simplify::remove_common(self)
    }

    /// Unsigned handles of every surface used.
    #[must_use]
    pub fn surfaces(&self) -> BTreeSet<i32> {
        let mut out = BTreeSet::new();
        if let Some(rule) = &self.root {
            rule.visit_literals(&mut |n| {
                out.insert(n.abs());
            });
        }
        out
    }

    /// Signed literals used.
    #[must_use]
    pub fn literals(&self) -> BTreeSet<i32> {
        let mut out = BTreeSet::new();
        if let Some(rule) = &self.root {
            rule.visit_literals(&mut |n| {
                out.insert(n);
            });
        }
        out
    }

    /// The first literal in reading order.
    #[must_use]
    pub fn primary_surface(&self) -> Option<i32> {
        let mut first = None;
        if let Some(rule) = &self.root {
            rule.visit_literals(&mut |n| {
                first.get_or_insert(n);
            });
        }
        first
    }

    /// True when the signed literal `handle` appears.
    #[must_use]
    pub fn contains_surf(&self, handle: i32) -> bool {
        self.literals().contains(&handle)
    }

    /// Number of literals.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        if let Some(rule) = &self.root {
            rule.visit_literals(&mut |_| count += 1);
        }
        count
    }

    /// Nesting depth of the tree (a single literal is 0).
    #[must_use]
    pub fn level(&self) -> usize {
        self.root.as_ref().map_or(0, Rule::depth)
    }
}

impl FromStr for HeadRule {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for HeadRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            None => Ok(()),
            Some(rule) => rule.write(f, false),
        }
    }
}

impl Mul for &HeadRule {
    type Output = HeadRule;

    fn mul(self, rhs: &HeadRule) -> HeadRule {
        self.intersect(rhs)
    }
}

impl Mul for HeadRule {
    type Output = HeadRule;

    fn mul(self, rhs: HeadRule) -> HeadRule {
        self.intersect(&rhs)
    }
}

impl Add for &HeadRule {
    type Output = HeadRule;

    fn add(self, rhs: &HeadRule) -> HeadRule {
        self.union(rhs)
    }
}

impl Add for HeadRule {
    type Output = HeadRule;

    fn add(self, rhs: HeadRule) -> HeadRule {
        self.union(&rhs)
    }
}

impl BitAnd for &HeadRule {
    type Output = HeadRule;

    fn bitand(self, rhs: &HeadRule) -> HeadRule {
        self.intersect(rhs)
    }
}

impl BitOr for &HeadRule {
    type Output = HeadRule;

    fn bitor(self, rhs: &HeadRule) -> HeadRule {
        self.union(rhs)
    }
}

impl Neg for &HeadRule {
    type Output = HeadRule;

    fn neg(self) -> HeadRule {
        self.complement()
    }
}

impl Neg for HeadRule {
    type Output = HeadRule;

    fn neg(self) -> HeadRule {
        self.complement()
    }
}
