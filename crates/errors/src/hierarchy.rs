//! Single-inheritance failure type hierarchy, declared at runtime.

use std::collections::HashMap;

use thiserror::Error;

use crate::FailureType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("failure type '{0}' cannot be its own parent")]
    SelfParent(FailureType),

    #[error("failure type '{child}' already declared under '{existing}', not '{requested}'")]
    ConflictingParent {
        child: FailureType,
        existing: String,
        requested: String,
    },

    #[error("declaring '{child}' under '{parent}' would create a cycle")]
    Cycle {
        child: FailureType,
        parent: FailureType,
    },
}

/// Parent relations between failure types.
///
/// Every type has at most one parent. Undeclared types behave as isolated
/// roots: their only ancestor is themselves.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    parents: HashMap<FailureType, Option<FailureType>>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type with no parent. Re-declaring an existing root is a no-op.
    pub fn declare_root(&mut self, ty: FailureType) -> Result<(), HierarchyError> {
        match self.parents.get(&ty) {
            None => {
                self.parents.insert(ty, None);
                Ok(())
            }
            Some(None) => Ok(()),
            Some(Some(existing)) => Err(HierarchyError::ConflictingParent {
                existing: existing.to_string(),
                requested: "<root>".to_string(),
                child: ty,
            }),
        }
    }

    /// Declare `child` as a direct subtype of `parent`.
    ///
    /// An unknown `parent` is declared as a root. Repeating an identical
    /// declaration is accepted, so independent modules may share ancestors.
    pub fn declare(&mut self, child: FailureType, parent: FailureType) -> Result<(), HierarchyError> {
        if child == parent {
            return Err(HierarchyError::SelfParent(child));
        }

        match self.parents.get(&child) {
            Some(Some(existing)) if *existing == parent => return Ok(()),
            Some(Some(existing)) => {
                return Err(HierarchyError::ConflictingParent {
                    existing: existing.to_string(),
                    requested: parent.to_string(),
                    child,
                });
            }
            // A declared root may be attached later, as long as that does not loop.
            Some(None) | None => {}
        }

        if self.ancestors(&parent).any(|a| *a == child) {
            return Err(HierarchyError::Cycle { child, parent });
        }

        if !self.parents.contains_key(&parent) {
            self.parents.insert(parent.clone(), None);
        }
        self.parents.insert(child, Some(parent));
        Ok(())
    }

    pub fn contains(&self, ty: &FailureType) -> bool {
        self.parents.contains_key(ty)
    }

    pub fn parent(&self, ty: &FailureType) -> Option<&FailureType> {
        self.parents.get(ty).and_then(Option::as_ref)
    }

    /// Iterate `ty` and then each of its ancestors, nearest first.
    pub fn ancestors<'a>(&'a self, ty: &'a FailureType) -> Ancestors<'a> {
        Ancestors {
            hierarchy: self,
            next: Some(ty),
        }
    }

    /// Distance from `ty` to its root (roots and undeclared types are 0).
    pub fn depth(&self, ty: &FailureType) -> usize {
        self.ancestors(ty).count() - 1
    }

    pub fn is_ancestor_or_self(&self, ancestor: &FailureType, ty: &FailureType) -> bool {
        self.ancestors(ty).any(|a| a == ancestor)
    }

    /// All declared types, in no particular order.
    pub fn types(&self) -> impl Iterator<Item = &FailureType> {
        self.parents.keys()
    }
}

/// Iterator over a type and its ancestors. See [`TypeHierarchy::ancestors`].
pub struct Ancestors<'a> {
    hierarchy: &'a TypeHierarchy,
    next: Option<&'a FailureType>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a FailureType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.hierarchy.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(name: &'static str) -> FailureType {
        FailureType::from_static(name)
    }

    fn sample() -> TypeHierarchy {
        let mut h = TypeHierarchy::new();
        h.declare(ty("validation"), ty("failure")).unwrap();
        h.declare(ty("duplicate_email"), ty("validation")).unwrap();
        h.declare(ty("forbidden"), ty("failure")).unwrap();
        h
    }

    #[test]
    fn ancestors_walk_nearest_first() {
        let h = sample();
        let leaf = ty("duplicate_email");
        let chain: Vec<&str> = h.ancestors(&leaf).map(FailureType::as_str).collect();
        assert_eq!(chain, vec!["duplicate_email", "validation", "failure"]);
    }

    #[test]
    fn depth_counts_edges_to_root() {
        let h = sample();
        assert_eq!(h.depth(&ty("failure")), 0);
        assert_eq!(h.depth(&ty("validation")), 1);
        assert_eq!(h.depth(&ty("duplicate_email")), 2);
        assert_eq!(h.depth(&ty("never_declared")), 0);
    }

    #[test]
    fn ancestor_checks() {
        let h = sample();
        assert!(h.is_ancestor_or_self(&ty("validation"), &ty("duplicate_email")));
        assert!(h.is_ancestor_or_self(&ty("forbidden"), &ty("forbidden")));
        assert!(!h.is_ancestor_or_self(&ty("forbidden"), &ty("duplicate_email")));
        assert!(!h.is_ancestor_or_self(&ty("duplicate_email"), &ty("validation")));
    }

    #[test]
    fn identical_redeclaration_is_accepted() {
        let mut h = sample();
        assert!(h.declare(ty("validation"), ty("failure")).is_ok());
    }

    #[test]
    fn conflicting_parent_is_rejected() {
        let mut h = sample();
        let err = h.declare(ty("validation"), ty("forbidden")).unwrap_err();
        assert!(matches!(err, HierarchyError::ConflictingParent { .. }));
    }

    #[test]
    fn cycles_are_rejected() {
        let mut h = sample();
        let err = h.declare(ty("failure"), ty("duplicate_email")).unwrap_err();
        assert!(matches!(err, HierarchyError::Cycle { .. }));

        let err = h.declare(ty("x"), ty("x")).unwrap_err();
        assert_eq!(err, HierarchyError::SelfParent(ty("x")));
    }

    #[test]
    fn root_can_be_attached_later() {
        let mut h = TypeHierarchy::new();
        h.declare_root(ty("account")).unwrap();
        h.declare(ty("account"), ty("failure")).unwrap();
        assert_eq!(h.parent(&ty("account")), Some(&ty("failure")));
        assert!(h.declare_root(ty("account")).is_err());
    }
}
