//! Grouping of resolved routes by the class that declares them.

use crate::route::Route;
use std::collections::HashMap;

/// Routes declared by one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    pub class_fqn: String,
    pub routes: Vec<Route>,
}

/// Routes of a pass, grouped by declaring class.
///
/// Groups appear in the order their first route was seen; routes keep their order
/// within a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRegistry {
    groups: Vec<RouteGroup>,
}

impl RouteRegistry {
    /// Aggregates a complete sequence of routes.
    pub fn aggregate(routes: impl IntoIterator<Item = Route>) -> Self {
        let mut groups: Vec<RouteGroup> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for route in routes {
            match positions.get(&route.class_fqn) {
                Some(&idx) => groups[idx].routes.push(route),
                None => {
                    positions.insert(route.class_fqn.clone(), groups.len());
                    groups.push(RouteGroup {
                        class_fqn: route.class_fqn.clone(),
                        routes: vec![route],
                    });
                }
            }
        }

        Self { groups }
    }

    pub fn groups(&self) -> &[RouteGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of routes across all groups
    pub fn route_count(&self) -> usize {
        self.groups.iter().map(|g| g.routes.len()).sum()
    }
}
