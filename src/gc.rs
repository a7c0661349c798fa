//! Cycle collection for the object heap
//!
//! Object handles are reference counted, so acyclic garbage frees itself the
//! moment its last handle drops. Cycles need help: a function and its
//! `prototype.constructor`, an activation record and the arguments object
//! stored in it, a closure kept in a binding of the scope it captured.
//!
//! Collection is mark-and-sweep over the heap graph. The graph has four kinds
//! of nodes: objects, scope chain links, environment records and slot tables.
//! Roots are found by trial deletion: a node whose strong count exceeds the
//! number of edges pointing at it from other nodes is held from outside the
//! heap (the realm, a live execution context, the host) and is a root.
//! Everything reachable from a root is marked; unmarked objects are severed,
//! which breaks their cycles so reference counting frees them.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Weak;

use rustc_hash::FxHashMap;

use crate::interpreter::context::VariableValues;
use crate::interpreter::environment::{EnvironmentRecord, LexicalEnvironment};
use crate::value::{JsObject, JsObjectRef};

/// Types that report the heap nodes they hold strong references to.
///
/// Every call to `visitor` must stand for exactly one strong reference owned by
/// `self`. Reporting a reference twice would make its target look unreachable.
pub(crate) trait Traceable {
    fn trace(&self, visitor: &mut dyn FnMut(HeapRef));
}

/// A node of the heap graph
#[derive(Debug)]
pub(crate) enum HeapRef {
    Object(JsObjectRef),
    Scope(LexicalEnvironment),
    Record(EnvironmentRecord),
    Slots(VariableValues),
}

impl HeapRef {
    fn addr(&self) -> usize {
        match self {
            HeapRef::Object(obj) => obj.addr(),
            HeapRef::Scope(env) => env.addr(),
            HeapRef::Record(record) => record.addr(),
            HeapRef::Slots(vars) => vars.addr(),
        }
    }

    fn strong_count(&self) -> usize {
        match self {
            HeapRef::Object(obj) => obj.strong_count(),
            HeapRef::Scope(env) => env.strong_count(),
            HeapRef::Record(record) => record.strong_count(),
            HeapRef::Slots(vars) => vars.strong_count(),
        }
    }

    /// Report outgoing edges. Returns false when the node is mutably borrowed;
    /// such a node is in use and its children are treated as externally held.
    fn trace(&self, visitor: &mut dyn FnMut(HeapRef)) -> bool {
        match self {
            HeapRef::Object(obj) => match obj.try_borrow() {
                Ok(object) => {
                    object.trace(visitor);
                    true
                }
                Err(_) => false,
            },
            HeapRef::Scope(env) => env.trace_edges(visitor),
            HeapRef::Record(record) => record.trace_edges(visitor),
            HeapRef::Slots(vars) => vars.trace_edges(visitor),
        }
    }
}

/// Heap statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GcStats {
    /// Registry entries, including ones whose object already died
    pub total_objects: usize,
    pub live_objects: usize,
    /// Completed collections
    pub collections: usize,
    /// Objects severed across all collections
    pub reclaimed_objects: usize,
}

/// Weak registry of every object allocated in a realm, plus the collector
pub(crate) struct Heap {
    objects: RefCell<Vec<Weak<RefCell<JsObject>>>>,
    allocs_since_collect: Cell<usize>,
    live_after_collect: Cell<usize>,
    threshold: Cell<usize>,
    collections: Cell<usize>,
    reclaimed: Cell<usize>,
    collecting: Cell<bool>,
}

impl Heap {
    /// `threshold` is the allocation count between automatic collections;
    /// zero disables them.
    pub fn new(threshold: usize) -> Self {
        Self {
            objects: RefCell::new(Vec::new()),
            allocs_since_collect: Cell::new(0),
            live_after_collect: Cell::new(0),
            threshold: Cell::new(threshold),
            collections: Cell::new(0),
            reclaimed: Cell::new(0),
            collecting: Cell::new(false),
        }
    }

    pub fn alloc(&self, object: JsObject) -> JsObjectRef {
        let obj = JsObjectRef::new(object);
        self.objects.borrow_mut().push(obj.downgrade());

        let allocs = self.allocs_since_collect.get() + 1;
        self.allocs_since_collect.set(allocs);
        let threshold = self.threshold.get();
        // Scale with the live set so large heaps are not rescanned constantly
        if threshold > 0 && allocs >= threshold.max(self.live_after_collect.get()) {
            self.collect(Vec::new());
        }
        obj
    }

    pub fn set_threshold(&self, threshold: usize) {
        self.threshold.set(threshold);
    }

    pub fn live_objects(&self) -> usize {
        self.objects
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn stats(&self) -> GcStats {
        GcStats {
            total_objects: self.objects.borrow().len(),
            live_objects: self.live_objects(),
            collections: self.collections.get(),
            reclaimed_objects: self.reclaimed.get(),
        }
    }

    /// Sever every object no root can reach and return how many there were.
    ///
    /// Each entry of `owned` stands for one reference the caller holds and
    /// wants ignored when looking for roots. The realm passes its own fields
    /// when it shuts down, so only what the host still holds survives.
    pub fn collect(&self, owned: Vec<HeapRef>) -> usize {
        if self.collecting.replace(true) {
            return 0;
        }
        let mut graph = Graph::default();
        {
            let objects = self.objects.borrow();
            for weak in objects.iter() {
                if let Some(rc) = weak.upgrade() {
                    graph.intern(HeapRef::Object(JsObjectRef::from_rc(rc)));
                }
            }
        }
        for node in owned {
            let index = graph.intern(node);
            graph.add_internal(index);
        }
        graph.trace_all();
        let marked = graph.mark();
        let reclaimed = graph.sweep(&marked);
        drop(graph);

        self.objects
            .borrow_mut()
            .retain(|weak| weak.strong_count() > 0);
        let live = self.live_objects();
        self.live_after_collect.set(live);
        self.allocs_since_collect.set(0);
        self.collections.set(self.collections.get() + 1);
        self.reclaimed.set(self.reclaimed.get() + reclaimed);
        self.collecting.set(false);
        log::debug!("gc: reclaimed {} objects, {} live", reclaimed, live);
        reclaimed
    }
}

#[derive(Default)]
struct Graph {
    nodes: Vec<HeapRef>,
    index: FxHashMap<usize, usize>,
    /// Strong references to each node held by other nodes
    internal: Vec<usize>,
    edges: Vec<Vec<usize>>,
    /// Nodes that could not be traced
    opaque: Vec<bool>,
}

impl Graph {
    fn intern(&mut self, node: HeapRef) -> usize {
        let addr = node.addr();
        if let Some(&index) = self.index.get(&addr) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(node);
        self.index.insert(addr, index);
        self.internal.push(0);
        self.edges.push(Vec::new());
        self.opaque.push(false);
        index
    }

    fn add_internal(&mut self, index: usize) {
        if let Some(count) = self.internal.get_mut(index) {
            *count += 1;
        }
    }

    /// Trace every node, discovering scope and slot nodes along the way
    fn trace_all(&mut self) {
        let mut next = 0;
        while next < self.nodes.len() {
            let mut children = Vec::new();
            let traced = match self.nodes.get(next) {
                Some(node) => node.trace(&mut |child| children.push(child)),
                None => break,
            };
            if !traced {
                if let Some(flag) = self.opaque.get_mut(next) {
                    *flag = true;
                }
            }
            let targets: Vec<usize> = children
                .into_iter()
                .map(|child| self.intern(child))
                .collect();
            for &target in &targets {
                self.add_internal(target);
            }
            if let Some(edges) = self.edges.get_mut(next) {
                *edges = targets;
            }
            next += 1;
        }
    }

    fn mark(&self) -> Vec<bool> {
        let mut marked = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let internal = self.internal.get(index).copied().unwrap_or(0);
            // One reference is the graph's own clone
            let external = node.strong_count().saturating_sub(1 + internal);
            let opaque = self.opaque.get(index).copied().unwrap_or(false);
            if external > 0 || opaque {
                queue.push_back(index);
            }
        }
        while let Some(index) = queue.pop_front() {
            match marked.get_mut(index) {
                Some(flag) if !*flag => *flag = true,
                _ => continue,
            }
            if let Some(edges) = self.edges.get(index) {
                queue.extend(edges.iter().copied());
            }
        }
        marked
    }

    fn sweep(&self, marked: &[bool]) -> usize {
        let mut reclaimed = 0;
        for (node, &live) in self.nodes.iter().zip(marked) {
            if live {
                continue;
            }
            if let HeapRef::Object(obj) = node {
                if let Ok(mut object) = obj.try_borrow_mut() {
                    object.sever();
                    reclaimed += 1;
                }
            }
        }
        reclaimed
    }
}
