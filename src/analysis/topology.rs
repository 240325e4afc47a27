use crate::store::{CurveGraph, CurveId};
use crate::validation::GraphError;

/// Performs a Topological Sort using Depth-First Search (DFS).
///
/// Returns every curve of the graph such that each in-graph underlying appears
/// before the curves built on top of it. Exogenous underlyings are not edges.
///
/// The walk keeps an explicit stack, so chain depth is limited by memory, not by
/// the call stack. A cycle is reported with its full path, read off
/// that stack.
pub fn sort(graph: &CurveGraph) -> Result<Vec<CurveId>, GraphError> {
    let count = graph.count();
    let mut order = Vec::with_capacity(count);
    let mut state = vec![VisitState::None; count];
    // (curve, index of the next underlying to visit)
    let mut stack: Vec<(CurveId, usize)> = Vec::new();

    // Iterate in insertion order so that disconnected curves are visited and the
    // resulting order is stable for a given graph.
    for root in graph.ids() {
        if state[root.index()] != VisitState::None {
            continue;
        }
        state[root.index()] = VisitState::Visiting;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let curve = top.0;
            if let Some(&underlying) = graph.underlyings(curve).get(top.1) {
                top.1 += 1;
                match state[underlying.index()] {
                    VisitState::Visited => {}
                    VisitState::Visiting => return Err(cycle_error(graph, &stack, underlying)),
                    VisitState::None => {
                        state[underlying.index()] = VisitState::Visiting;
                        stack.push((underlying, 0));
                    }
                }
            } else {
                stack.pop();
                state[curve.index()] = VisitState::Visited;
                order.push(curve);
            }
        }
    }

    Ok(order)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting, // On the stack
    Visited,
}

fn cycle_error(graph: &CurveGraph, stack: &[(CurveId, usize)], repeated: CurveId) -> GraphError {
    let start = stack.iter().position(|&(c, _)| c == repeated).unwrap_or(0);
    let mut path: Vec<String> = stack[start..].iter().map(|&(c, _)| graph.name(c).to_string()).collect();
    path.push(graph.name(repeated).to_string());
    GraphError::Cycle { path }
}

/// Groups curves into dependents-first levels.
///
/// Level 0 holds curves nothing in the graph is built on; a curve sits one level
/// below its deepest dependent. Curves in one level never depend on each other,
/// and every dependent of a curve lives in an earlier level. Within a level curves
/// are listed by id.
pub fn fold_levels(graph: &CurveGraph, order: &[CurveId]) -> Vec<Vec<CurveId>> {
    let mut level = vec![0usize; graph.count()];
    let mut depth = 0;

    // Reverse topological order visits every dependent before its underlyings.
    for &curve in order.iter().rev() {
        let lvl = graph
            .dependents(curve)
            .map(|d| level[d.index()] + 1)
            .max()
            .unwrap_or(0);
        level[curve.index()] = lvl;
        depth = depth.max(lvl + 1);
    }

    let mut levels = vec![Vec::new(); depth];
    for id in graph.ids() {
        levels[level[id.index()]].push(id);
    }
    levels
}
