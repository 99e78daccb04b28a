//! Relationship resolution for embedded resources.
//!
//! Given an embedding field and the relation it appears under, find the one
//! foreign key it travels along and the direction of travel.
//!
//! - With a hint, the key is chosen by constraint name, then by referenced
//!   relation name, then by single owning column.
//! - Without a hint, keys owned by the target and pointing at the current
//!   relation (reverse) win over keys owned by the current relation and
//!   pointing at the target (forward). Self references are therefore
//!   always reverse.
//! - An embedding may also be named after a foreign-key column or
//!   constraint of the current relation (`author_id(*)`).

use tracing::debug;

use crate::ast::Field;
use crate::error::{Candidate, ShapeError};
use crate::schema::{Edge, Relationship, SchemaIndex};

/// Which end of the foreign key the embedding starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The current relation owns the key (many-to-one).
    Forward,
    /// The target relation owns the key (one-to-many or one-to-one).
    Reverse,
}

/// How the relationship was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Chosen by an explicit `!hint`.
    ByHint,
    /// Chosen by the embedded field's name.
    ByName,
}

/// Row multiplicity of an embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one row.
    One,
    /// Any number of rows.
    Many,
}

/// A relationship chosen for an embedding.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedRelationship<'s> {
    /// The foreign key.
    pub relationship: &'s Relationship,
    /// Direction of travel.
    pub direction: Direction,
    /// The relation the embedding appears under.
    pub from_relation: &'s str,
    /// The embedded relation.
    pub to_relation: &'s str,
    /// How it was found.
    pub match_kind: MatchKind,
}

impl ResolvedRelationship<'_> {
    /// Returns the multiplicity and nullability of the embedded value.
    ///
    /// Forward keys yield one row, nullable unless every owning column is
    /// non-nullable or the join is inner. Reverse one-to-one keys yield one
    /// row, nullable unless the join is inner. Other reverse keys yield an
    /// array, which is never null.
    #[must_use]
    pub fn cardinality(&self, index: &SchemaIndex<'_>, inner_join: bool) -> (Cardinality, bool) {
        match self.direction {
            Direction::Forward => {
                let owner = index.relation(self.from_relation);
                let nullable = self.relationship.columns.iter().any(|name| {
                    owner
                        .and_then(|r| r.find_column(name))
                        .map_or(true, |c| c.nullable)
                });
                (Cardinality::One, nullable && !inner_join)
            }
            Direction::Reverse if self.relationship.is_one_to_one => {
                (Cardinality::One, !inner_join)
            }
            Direction::Reverse => (Cardinality::Many, false),
        }
    }

    /// Returns true when both resolutions travel the same key the same way.
    #[must_use]
    pub fn same_as(&self, other: &ResolvedRelationship<'_>) -> bool {
        self.to_relation == other.to_relation
            && self.direction == other.direction
            && self.relationship.foreign_key_name == other.relationship.foreign_key_name
            && self.relationship.columns == other.relationship.columns
    }
}

fn candidate(edge: &Edge<'_>) -> Candidate {
    Candidate {
        foreign_key_name: edge.relationship.foreign_key_name.clone(),
        owner: String::from(edge.owner),
        columns: edge.relationship.columns.clone(),
        referenced_relation: edge.relationship.referenced_relation.clone(),
    }
}

/// Resolves the relationship an embedding field refers to.
///
/// # Errors
///
/// Returns an ambiguity error when more than one key matches in the
/// deciding step, and a not-found error when nothing matches.
pub fn resolve<'s>(
    index: &SchemaIndex<'s>,
    current: &str,
    field: &Field,
) -> Result<ResolvedRelationship<'s>, ShapeError> {
    let target = field.name.as_str();
    let resolved = match &field.hint {
        Some(hint) => resolve_hinted(index, current, target, hint),
        None => resolve_by_name(index, current, target)?,
    };

    let Some(resolved) = resolved else {
        return Err(ShapeError::relationship_not_found(current, target));
    };

    debug!(
        from = resolved.from_relation,
        to = resolved.to_relation,
        foreign_key = %resolved.relationship.foreign_key_name,
        direction = ?resolved.direction,
        match_kind = ?resolved.match_kind,
        "resolved embedding"
    );
    Ok(resolved)
}

/// Edges connecting `current` and `target`, reverse ones first.
///
/// When `target` is not a relation every edge touching `current` is
/// returned so hints can name the key directly.
fn connecting_edges<'s>(
    index: &SchemaIndex<'s>,
    current: &str,
    target: &str,
) -> Vec<(Edge<'s>, Direction)> {
    let any_target = index.relation(target).is_none();
    let reverse = index
        .incoming(current)
        .iter()
        .filter(|e| any_target || e.owner == target)
        .map(|e| (*e, Direction::Reverse));
    let forward = index
        .outgoing(current)
        .iter()
        .filter(|e| any_target || e.referenced() == target)
        .map(|e| (*e, Direction::Forward));
    reverse.chain(forward).collect()
}

fn resolve_hinted<'s>(
    index: &SchemaIndex<'s>,
    current: &str,
    target: &str,
    hint: &str,
) -> Option<ResolvedRelationship<'s>> {
    let edges = connecting_edges(index, current, target);

    let rules: [&dyn Fn(&Relationship) -> bool; 3] = [
        &|r: &Relationship| r.foreign_key_name == hint,
        &|r: &Relationship| r.referenced_relation == hint,
        &|r: &Relationship| r.is_single_column(hint),
    ];

    rules.iter().find_map(|rule| {
        edges
            .iter()
            .find(|(edge, _)| rule(edge.relationship))
            .and_then(|(edge, direction)| {
                let self_reference = edge.owner == edge.referenced();
                let direction = if self_reference {
                    Direction::Reverse
                } else {
                    *direction
                };
                let other = match direction {
                    Direction::Reverse => edge.owner,
                    Direction::Forward => edge.relationship.referenced_relation.as_str(),
                };
                Some(ResolvedRelationship {
                    relationship: edge.relationship,
                    direction,
                    from_relation: index.relation(current)?.name.as_str(),
                    to_relation: index.relation(other)?.name.as_str(),
                    match_kind: MatchKind::ByHint,
                })
            })
    })
}

fn resolve_by_name<'s>(
    index: &SchemaIndex<'s>,
    current: &str,
    target: &str,
) -> Result<Option<ResolvedRelationship<'s>>, ShapeError> {
    let (Some(from), to) = (index.relation(current), index.relation(target)) else {
        return Ok(None);
    };

    if let Some(to) = to {
        let reverse: Vec<&Edge<'s>> = index
            .incoming(current)
            .iter()
            .filter(|e| e.owner == target)
            .collect();
        if let Some(edge) = single(current, target, &reverse)? {
            return Ok(Some(ResolvedRelationship {
                relationship: edge.relationship,
                direction: Direction::Reverse,
                from_relation: &from.name,
                to_relation: &to.name,
                match_kind: MatchKind::ByName,
            }));
        }

        let forward: Vec<&Edge<'s>> = index
            .outgoing(current)
            .iter()
            .filter(|e| e.referenced() == target)
            .collect();
        if let Some(edge) = single(current, target, &forward)? {
            return Ok(Some(ResolvedRelationship {
                relationship: edge.relationship,
                direction: Direction::Forward,
                from_relation: &from.name,
                to_relation: &to.name,
                match_kind: MatchKind::ByName,
            }));
        }
    }

    // `author_id(*)` or `posts_author_id_fkey(*)` under `posts`.
    let by_key: Vec<&Edge<'s>> = index
        .outgoing(current)
        .iter()
        .filter(|e| {
            e.relationship.is_single_column(target) || e.relationship.foreign_key_name == target
        })
        .collect();
    let Some(edge) = single(current, target, &by_key)? else {
        return Ok(None);
    };
    let Some(to) = index.relation(edge.referenced()) else {
        return Ok(None);
    };
    Ok(Some(ResolvedRelationship {
        relationship: edge.relationship,
        direction: if to.name == from.name {
            Direction::Reverse
        } else {
            Direction::Forward
        },
        from_relation: &from.name,
        to_relation: &to.name,
        match_kind: MatchKind::ByName,
    }))
}

/// Returns the only edge, `None` for no edges, or an ambiguity error.
fn single<'e, 's>(
    current: &str,
    target: &str,
    edges: &[&'e Edge<'s>],
) -> Result<Option<&'e Edge<'s>>, ShapeError> {
    match edges {
        [] => Ok(None),
        [edge] => Ok(Some(edge)),
        many => Err(ShapeError::ambiguous(
            current,
            target,
            many.iter().map(|e| candidate(e)).collect(),
        )),
    }
}
