//! Relation adjacency built once per resolution call.

use std::collections::HashMap;

use super::{Relation, Relationship, Schema};

/// One foreign key seen from one of its two ends.
#[derive(Debug, Clone, Copy)]
pub struct Edge<'s> {
    /// The relation that declares the key.
    pub owner: &'s str,
    /// The key itself.
    pub relationship: &'s Relationship,
}

impl Edge<'_> {
    /// Returns the relation the key points at.
    #[must_use]
    pub fn referenced(&self) -> &str {
        &self.relationship.referenced_relation
    }
}

/// Lookup tables over a [`Schema`]: relations by name, foreign keys by
/// owner (outgoing) and by referenced relation (incoming).
#[derive(Debug)]
pub struct SchemaIndex<'s> {
    schema: &'s Schema,
    relations: HashMap<&'s str, &'s Relation>,
    outgoing: HashMap<&'s str, Vec<Edge<'s>>>,
    incoming: HashMap<&'s str, Vec<Edge<'s>>>,
}

impl<'s> SchemaIndex<'s> {
    /// Indexes the schema.
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        let mut relations = HashMap::new();
        let mut outgoing: HashMap<&str, Vec<Edge<'s>>> = HashMap::new();
        let mut incoming: HashMap<&str, Vec<Edge<'s>>> = HashMap::new();

        for relation in &schema.relations {
            relations.entry(relation.name.as_str()).or_insert(relation);
            for relationship in &relation.relationships {
                let edge = Edge {
                    owner: &relation.name,
                    relationship,
                };
                outgoing.entry(relation.name.as_str()).or_default().push(edge);
                incoming
                    .entry(relationship.referenced_relation.as_str())
                    .or_default()
                    .push(edge);
            }
        }

        Self {
            schema,
            relations,
            outgoing,
            incoming,
        }
    }

    /// Returns the indexed schema.
    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Looks up a relation by name.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&'s Relation> {
        self.relations.get(name).copied()
    }

    /// Foreign keys declared by `relation`.
    #[must_use]
    pub fn outgoing(&self, relation: &str) -> &[Edge<'s>] {
        self.outgoing.get(relation).map_or(&[], Vec::as_slice)
    }

    /// Foreign keys pointing at `relation`.
    #[must_use]
    pub fn incoming(&self, relation: &str) -> &[Edge<'s>] {
        self.incoming.get(relation).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new()
            .relation(Relation::table("users").column("id", "int8"))
            .relation(
                Relation::table("posts")
                    .column("id", "int8")
                    .column("author_id", "int8")
                    .relationship(Relationship::new(
                        "posts_author_id_fkey",
                        &["author_id"],
                        "users",
                        &["id"],
                    )),
            )
    }

    #[test]
    fn test_edges_both_directions() {
        let schema = schema();
        let index = SchemaIndex::new(&schema);
        assert_eq!(index.outgoing("posts").len(), 1);
        assert_eq!(index.incoming("users").len(), 1);
        assert_eq!(index.incoming("users")[0].owner, "posts");
        assert_eq!(index.outgoing("posts")[0].referenced(), "users");
        assert!(index.outgoing("users").is_empty());
        assert!(index.incoming("missing").is_empty());
    }

    #[test]
    fn test_relation_lookup() {
        let schema = schema();
        let index = SchemaIndex::new(&schema);
        assert!(index.relation("users").is_some());
        assert!(index.relation("comments").is_none());
    }
}
