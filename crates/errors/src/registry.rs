//! Handler registration and most-specific-type resolution.
//!
//! Specificity is settled once, in [`HandlerRegistryBuilder::build`]: every
//! handler gets a rank (depth of its declared type) and every declared type
//! gets a precomputed pointer to the deepest handler on its ancestor chain.
//! Request-time resolution is then a single map lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    ComposedErrorResponse, ErrorHandler, Failure, FailureType, FnHandler, HandlerModule,
    HierarchyError, TypeHierarchy,
};

/// A configuration problem detected while building the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationWarning {
    /// Two handlers claim exactly the same type; the earlier registration wins.
    DuplicateHandler {
        failure_type: FailureType,
        kept: usize,
        shadowed: usize,
    },
    /// A handler claims a type nothing declared; it only matches that exact type.
    UndeclaredType { failure_type: FailureType },
}

impl core::fmt::Display for RegistrationWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RegistrationWarning::DuplicateHandler {
                failure_type,
                kept,
                shadowed,
            } => write!(
                f,
                "handlers #{kept} and #{shadowed} both claim '{failure_type}'; #{shadowed} is never used"
            ),
            RegistrationWarning::UndeclaredType { failure_type } => {
                write!(f, "handler claims undeclared failure type '{failure_type}'")
            }
        }
    }
}

/// A registered handler with its precomputed specificity.
pub struct RankedHandler {
    handler: Arc<dyn ErrorHandler>,
    rank: usize,
    order: usize,
}

impl RankedHandler {
    pub fn handler(&self) -> &dyn ErrorHandler {
        self.handler.as_ref()
    }

    pub fn handles(&self) -> &FailureType {
        self.handler.handles()
    }

    /// Depth of the declared type; deeper is more specific.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Registration order (0-based).
    pub fn order(&self) -> usize {
        self.order
    }
}

impl core::fmt::Debug for RankedHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RankedHandler")
            .field("handles", self.handles())
            .field("rank", &self.rank)
            .field("order", &self.order)
            .finish()
    }
}

#[derive(Default)]
pub struct HandlerRegistryBuilder {
    hierarchy: TypeHierarchy,
    handlers: Vec<Arc<dyn ErrorHandler>>,
}

impl HandlerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, child: FailureType, parent: FailureType) -> Result<&mut Self, HierarchyError> {
        self.hierarchy.declare(child, parent)?;
        Ok(self)
    }

    pub fn declare_root(&mut self, ty: FailureType) -> Result<&mut Self, HierarchyError> {
        self.hierarchy.declare_root(ty)?;
        Ok(self)
    }

    pub fn register<H>(&mut self, handler: H) -> &mut Self
    where
        H: ErrorHandler + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn register_fn<F>(&mut self, handles: FailureType, compose: F) -> &mut Self
    where
        F: Fn(&dyn Failure) -> ComposedErrorResponse + Send + Sync + 'static,
    {
        self.register(FnHandler::new(handles, compose))
    }

    pub fn install(&mut self, module: &dyn HandlerModule) -> Result<&mut Self, HierarchyError> {
        info!(module = module.name(), "installing error handler module");
        module.register(self)?;
        Ok(self)
    }

    pub fn build(self) -> HandlerRegistry {
        let Self { hierarchy, handlers } = self;
        let mut warnings = Vec::new();

        let ranked: Vec<RankedHandler> = handlers
            .into_iter()
            .enumerate()
            .map(|(order, handler)| RankedHandler {
                rank: hierarchy.depth(handler.handles()),
                handler,
                order,
            })
            .collect();

        // Exact-type owner per failure type; first registration wins.
        let mut owners: HashMap<FailureType, usize> = HashMap::new();
        for entry in &ranked {
            let ty = entry.handles();
            if !hierarchy.contains(ty) {
                warnings.push(RegistrationWarning::UndeclaredType {
                    failure_type: ty.clone(),
                });
            }
            match owners.get(ty) {
                Some(&kept) => warnings.push(RegistrationWarning::DuplicateHandler {
                    failure_type: ty.clone(),
                    kept,
                    shadowed: entry.order,
                }),
                None => {
                    owners.insert(ty.clone(), entry.order);
                }
            }
        }

        // The ancestor walk is nearest-first, so the first owner found is the
        // deepest (highest-ranked) candidate.
        let mut resolved: HashMap<FailureType, usize> = HashMap::new();
        for ty in hierarchy.types().chain(owners.keys()) {
            if resolved.contains_key(ty) {
                continue;
            }
            if let Some(idx) = hierarchy.ancestors(ty).find_map(|a| owners.get(a).copied()) {
                resolved.insert(ty.clone(), idx);
            }
        }

        for w in &warnings {
            warn!(warning = %w, "error handler registration");
        }
        debug!(
            handlers = ranked.len(),
            resolved_types = resolved.len(),
            "built error handler registry"
        );

        HandlerRegistry {
            hierarchy,
            handlers: ranked,
            resolved,
            warnings,
        }
    }
}

/// Immutable, shareable set of handlers plus their resolution table.
pub struct HandlerRegistry {
    hierarchy: TypeHierarchy,
    handlers: Vec<RankedHandler>,
    resolved: HashMap<FailureType, usize>,
    warnings: Vec<RegistrationWarning>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    /// The most specific handler applicable to `ty`, if any.
    pub fn resolve(&self, ty: &FailureType) -> Option<&RankedHandler> {
        self.resolved.get(ty).and_then(|&idx| self.handlers.get(idx))
    }

    /// Every handler whose declared type is an ancestor-or-self of `ty`,
    /// most specific first, ties in registration order.
    pub fn candidates(&self, ty: &FailureType) -> Vec<&RankedHandler> {
        let mut found: Vec<&RankedHandler> = self
            .handlers
            .iter()
            .filter(|h| self.hierarchy.is_ancestor_or_self(h.handles(), ty))
            .collect();
        found.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.order.cmp(&b.order)));
        found
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    pub fn warnings(&self) -> &[RegistrationWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl core::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers)
            .field("warnings", &self.warnings)
            .finish()
    }
}
