//! Province connectivity graph.
//!
//! Nodes are super-provinces; each owns one or more coast sub-nodes, and
//! edges run between sub-nodes. Everything lives in flat arenas indexed by
//! position, so the graph has no internal references and can be shared
//! read-only across games behind an `Arc`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use super::province::{CenterOwner, Flags, Nation, Province};

#[derive(Debug, Clone, Copy)]
struct Edge {
    to: usize,
    flags: Flags,
}

#[derive(Debug, Clone)]
struct Node {
    name: Province,
    supply_center: Option<CenterOwner>,
    /// Sub-node indices, super first then coasts by name.
    subs: Vec<usize>,
}

#[derive(Debug, Clone)]
struct SubNode {
    name: Province,
    node: usize,
    flags: Flags,
    edges: Vec<Edge>,
}

/// The immutable map topology of a variant.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    subs: Vec<SubNode>,
    node_index: HashMap<Province, usize>,
    sub_index: HashMap<Province, usize>,
}

/// The provinces visited so far by a path search, excluding the start.
#[derive(Clone, Copy)]
pub struct Trace<'a> {
    steps: &'a [usize],
}

impl<'a> Trace<'a> {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A candidate step handed to a path filter.
pub struct Step<'a> {
    /// The province the search wants to enter.
    pub province: &'a Province,
    /// Flags of the edge leading there.
    pub edge: Flags,
    /// Flags of the province being entered.
    pub node: Flags,
    /// Authored supply-center owner of the province being entered.
    pub supply_center: Option<&'a CenterOwner>,
    /// Path so far.
    pub trace: Trace<'a>,
}

impl Graph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    fn sub(&self, p: &Province) -> Option<&SubNode> {
        self.sub_index.get(p.as_str()).map(|&i| &self.subs[i])
    }

    fn node(&self, p: &Province) -> Option<&Node> {
        self.node_index.get(p.split().0).map(|&i| &self.nodes[i])
    }

    /// True if the exact province (including coast) exists.
    pub fn has(&self, p: &Province) -> bool {
        self.sub_index.contains_key(p.as_str())
    }

    /// Flags of the exact province, empty if unknown.
    pub fn flags(&self, p: &Province) -> Flags {
        self.sub(p).map(|s| s.flags).unwrap_or_default()
    }

    /// Union of flags over every coast of the super-province.
    pub fn all_flags(&self, p: &Province) -> Flags {
        self.node(p)
            .map(|n| {
                n.subs
                    .iter()
                    .fold(Flags::empty(), |acc, &s| acc | self.subs[s].flags)
            })
            .unwrap_or_default()
    }

    /// The authored supply-center owner of the super-province.
    pub fn supply_center(&self, p: &Province) -> Option<&CenterOwner> {
        self.node(p).and_then(|n| n.supply_center.as_ref())
    }

    /// Home centers of a nation, sorted by name.
    pub fn supply_centers(&self, nation: &Nation) -> Vec<Province> {
        let mut result: Vec<Province> = self
            .nodes
            .iter()
            .filter(|n| n.supply_center.as_ref().and_then(CenterOwner::nation) == Some(nation))
            .map(|n| n.name.clone())
            .collect();
        result.sort();
        result
    }

    /// Every supply center on the map, sorted by name.
    pub fn all_supply_centers(&self) -> Vec<Province> {
        let mut result: Vec<Province> = self
            .nodes
            .iter()
            .filter(|n| n.supply_center.is_some())
            .map(|n| n.name.clone())
            .collect();
        result.sort();
        result
    }

    /// Nations owning at least one home center, sorted.
    pub fn nations(&self) -> Vec<Nation> {
        let found: BTreeSet<&Nation> = self
            .nodes
            .iter()
            .filter_map(|n| n.supply_center.as_ref().and_then(CenterOwner::nation))
            .collect();
        found.into_iter().cloned().collect()
    }

    /// Every province and coast, sorted by name.
    pub fn provinces(&self) -> Vec<Province> {
        let mut result: Vec<Province> = self.subs.iter().map(|s| s.name.clone()).collect();
        result.sort();
        result
    }

    /// The super-province followed by its named coasts.
    pub fn coasts(&self, p: &Province) -> Vec<Province> {
        self.node(p)
            .map(|n| n.subs.iter().map(|&s| self.subs[s].name.clone()).collect())
            .unwrap_or_default()
    }

    /// Outgoing edges with their flags.
    pub fn edges<'a>(&'a self, p: &Province) -> impl Iterator<Item = (&'a Province, Flags)> + 'a {
        self.sub(p)
            .into_iter()
            .flat_map(move |s| s.edges.iter().map(move |e| (&self.subs[e.to].name, e.flags)))
    }

    /// Flags of the direct edge `src -> dst`, if any.
    pub fn edge(&self, src: &Province, dst: &Province) -> Option<Flags> {
        let s = self.sub(src)?;
        let d = *self.sub_index.get(dst.as_str())?;
        s.edges.iter().find(|e| e.to == d).map(|e| e.flags)
    }

    /// Breadth-first search from `src` to `dst`.
    ///
    /// A step is taken only if `filter` admits it. Returns the provinces
    /// visited after `src`, ending with `dst`, or `None` if no admissible
    /// route exists. `path(a, a, _)` is the empty path.
    pub fn path<F>(&self, src: &Province, dst: &Province, filter: F) -> Option<Vec<Province>>
    where
        F: FnMut(&Step<'_>) -> bool,
    {
        let start = *self.sub_index.get(src.as_str())?;
        let target = *self.sub_index.get(dst.as_str())?;
        if start == target {
            return Some(Vec::new());
        }
        self.search(start, Some(target), filter)
            .map(|steps| steps.into_iter().map(|i| self.subs[i].name.clone()).collect())
    }

    /// Every province a filtered search from `src` can enter, sorted.
    pub fn reachable<F>(&self, src: &Province, mut filter: F) -> Vec<Province>
    where
        F: FnMut(&Step<'_>) -> bool,
    {
        let Some(&start) = self.sub_index.get(src.as_str()) else {
            return Vec::new();
        };
        let mut found = BTreeSet::new();
        self.search(start, None, |step| {
            let ok = filter(step);
            if ok {
                found.insert(step.province.clone());
            }
            ok
        });
        found.into_iter().collect()
    }

    fn search<F>(&self, start: usize, target: Option<usize>, mut filter: F) -> Option<Vec<usize>>
    where
        F: FnMut(&Step<'_>) -> bool,
    {
        let mut queue: VecDeque<(Option<usize>, usize, Vec<usize>)> = VecDeque::new();
        let mut seen: HashSet<(Option<usize>, usize)> = HashSet::new();
        queue.push_back((None, start, Vec::new()));

        while let Some((prev, cur, trace)) = queue.pop_front() {
            if !seen.insert((prev, cur)) {
                continue;
            }
            for edge in &self.subs[cur].edges {
                let to = &self.subs[edge.to];
                let step = Step {
                    province: &to.name,
                    edge: edge.flags,
                    node: to.flags,
                    supply_center: self.nodes[to.node].supply_center.as_ref(),
                    trace: Trace { steps: &trace },
                };
                if !filter(&step) {
                    continue;
                }
                let mut next = trace.clone();
                next.push(edge.to);
                if Some(edge.to) == target {
                    return Some(next);
                }
                queue.push_back((Some(cur), edge.to, next));
            }
        }
        None
    }
}

#[derive(Debug, Default)]
struct PendingSub {
    flags: Flags,
    edges: Vec<(Province, Flags)>,
}

/// Builder used once at variant-definition time.
///
/// Calls chain on a "current" province set by [`GraphBuilder::province`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    subs: BTreeMap<Province, PendingSub>,
    centers: BTreeMap<Province, CenterOwner>,
    current: Option<Province>,
}

impl GraphBuilder {
    /// Selects (creating if needed) the province the following calls apply to.
    pub fn province(mut self, name: &str) -> Self {
        let p = Province::new(name);
        self.subs.entry(p.clone()).or_default();
        self.current = Some(p);
        self
    }

    /// Adds a directed edge from the current province.
    pub fn connect(mut self, to: &str, flags: Flags) -> Self {
        let to = Province::new(to);
        self.subs.entry(to.clone()).or_default();
        if let Some(cur) = &self.current {
            if let Some(sub) = self.subs.get_mut(cur) {
                sub.edges.push((to, flags));
            }
        }
        self
    }

    /// Adds an edge in both directions.
    pub fn connect_both(self, to: &str, flags: Flags) -> Self {
        let Some(cur) = self.current.clone() else {
            return self;
        };
        self.connect(to, flags)
            .province(to)
            .connect(cur.as_str(), flags)
            .province(cur.as_str())
    }

    pub fn flag(mut self, flags: Flags) -> Self {
        if let Some(cur) = &self.current {
            if let Some(sub) = self.subs.get_mut(cur) {
                sub.flags = sub.flags | flags;
            }
        }
        self
    }

    /// Marks the current province's super-province as a supply center.
    pub fn supply_center(mut self, owner: CenterOwner) -> Self {
        if let Some(cur) = &self.current {
            self.centers.insert(cur.super_province(), owner);
        }
        self
    }

    pub fn build(self) -> Graph {
        let mut graph = Graph {
            nodes: Vec::new(),
            subs: Vec::new(),
            node_index: HashMap::new(),
            sub_index: HashMap::new(),
        };

        // BTreeMap order puts "spa" before "spa/nc", so supers lead their coasts.
        for name in self.subs.keys() {
            let sup = name.super_province();
            let node = match graph.node_index.get(&sup) {
                Some(&i) => i,
                None => {
                    graph.nodes.push(Node {
                        name: sup.clone(),
                        supply_center: self.centers.get(&sup).cloned(),
                        subs: Vec::new(),
                    });
                    graph.node_index.insert(sup, graph.nodes.len() - 1);
                    graph.nodes.len() - 1
                }
            };
            let idx = graph.subs.len();
            graph.subs.push(SubNode {
                name: name.clone(),
                node,
                flags: Flags::empty(),
                edges: Vec::new(),
            });
            graph.nodes[node].subs.push(idx);
            graph.sub_index.insert(name.clone(), idx);
        }

        for (name, pending) in self.subs {
            let from = graph.sub_index[&name];
            graph.subs[from].flags = pending.flags;
            let mut edges = pending.edges;
            edges.sort_by(|a, b| a.0.cmp(&b.0));
            edges.dedup_by(|a, b| a.0 == b.0);
            for (to, flags) in edges {
                let to = graph.sub_index[&to];
                graph.subs[from].edges.push(Edge { to, flags });
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Graph {
        Graph::builder()
            .province("a")
            .flag(Flags::LAND)
            .supply_center(CenterOwner::Home(Nation::new("X")))
            .connect_both("b", Flags::LAND)
            .province("b")
            .flag(Flags::COAST)
            .connect_both("c", Flags::LAND)
            .connect_both("s", Flags::SEA)
            .province("c")
            .flag(Flags::COAST)
            .supply_center(CenterOwner::Neutral)
            .connect_both("s", Flags::SEA)
            .province("s")
            .flag(Flags::SEA)
            .province("d")
            .flag(Flags::LAND)
            .connect_both("e", Flags::LAND)
            .connect_both("e/nc", Flags::SEA)
            .province("e")
            .flag(Flags::LAND)
            .province("e/nc")
            .flag(Flags::SEA)
            .build()
    }

    fn p(s: &str) -> Province {
        Province::new(s)
    }

    #[test]
    fn lookups() {
        let g = small();
        assert!(g.has(&p("a")));
        assert!(g.has(&p("e/nc")));
        assert!(!g.has(&p("e/sc")));
        assert!(!g.has(&p("zzz")));
        assert_eq!(g.flags(&p("s")), Flags::SEA);
        assert_eq!(g.flags(&p("zzz")), Flags::empty());
        assert_eq!(g.all_flags(&p("e")), Flags::COAST);
        assert_eq!(g.coasts(&p("e/nc")), vec![p("e"), p("e/nc")]);
        assert_eq!(g.edge(&p("a"), &p("b")), Some(Flags::LAND));
        assert_eq!(g.edge(&p("a"), &p("c")), None);
    }

    #[test]
    fn supply_centers_and_nations() {
        let g = small();
        assert_eq!(g.supply_centers(&Nation::new("X")), vec![p("a")]);
        assert_eq!(g.all_supply_centers(), vec![p("a"), p("c")]);
        assert_eq!(g.nations(), vec![Nation::new("X")]);
        assert_eq!(g.supply_center(&p("c")), Some(&CenterOwner::Neutral));
        assert_eq!(g.supply_center(&p("b")), None);
    }

    #[test]
    fn path_to_self_is_empty() {
        let g = small();
        assert_eq!(g.path(&p("a"), &p("a"), |_| false), Some(vec![]));
    }

    #[test]
    fn path_is_shortest_and_excludes_start() {
        let g = small();
        assert_eq!(g.path(&p("a"), &p("c"), |_| true), Some(vec![p("b"), p("c")]));
    }

    #[test]
    fn path_respects_filter() {
        let g = small();
        let land = g.path(&p("b"), &p("c"), |s| s.edge.land());
        assert_eq!(land, Some(vec![p("c")]));
        let sea = g.path(&p("b"), &p("c"), |s| s.edge.sea());
        assert_eq!(sea, Some(vec![p("s"), p("c")]));
        // Removing the only route makes the search fail.
        let none = g.path(&p("a"), &p("c"), |s| s.province.as_str() != "b");
        assert_eq!(none, None);
    }

    #[test]
    fn filter_sees_trace() {
        let g = small();
        let mut max_trace = 0;
        g.path(&p("a"), &p("s"), |s| {
            max_trace = max_trace.max(s.trace.len());
            true
        });
        assert_eq!(max_trace, 1);
    }

    #[test]
    fn reachable_collects_admitted() {
        let g = small();
        let r = g.reachable(&p("s"), |s| s.edge.sea());
        assert_eq!(r, vec![p("b"), p("c"), p("s")]);
    }
}
