//! A directed graph of filter chains.
//!
//! Nodes are chains, edges are labelled pads: linking chain `A` to chain `B`
//! through pad `p` makes `[i<input>cA_p]` an output label of `A` and an input
//! label of `B`. Flattening walks the chains by descending priority, then
//! insertion order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rf_core::{is_filter_key, Error, OptionMap, Result, StreamMask};

use super::chain::{collapse, ChainPads, FilterChain};
use super::{check_priority, pad_type, Filter, FilterContext};
use crate::media::Media;

/// Handle of a chain inside a [`FilterGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(usize);

impl ChainId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Node {
    chain: FilterChain,
    priority: u32,
    seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    from: ChainId,
    to: ChainId,
    pad: String,
}

/// Fragments of a graph applied on behalf of an extra input, plus the labels
/// its filtered streams end up on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundFragments {
    pub options: OptionMap,
    /// Final output label per stream-type letter.
    pub outputs: BTreeMap<char, String>,
}

/// Filter chains of one media, linked to other media's graphs by their pads.
#[derive(Debug, Clone, Default)]
pub struct FilterGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    default_chain: Option<ChainId>,
    next_seq: u64,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a whole chain as its own node.
    pub fn insert_chain(&mut self, chain: FilterChain, priority: u32) -> Result<ChainId> {
        check_priority(priority)?;
        let id = ChainId(self.nodes.len());
        self.nodes.push(Node {
            chain,
            priority,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        Ok(id)
    }

    /// Add an atomic edit to the default chain, creating that chain on first
    /// use.
    pub fn insert(&mut self, filter: impl Filter + 'static, priority: u32) -> Result<ChainId> {
        self.insert_shared(Arc::new(filter), priority)
    }

    pub fn insert_shared(&mut self, filter: Arc<dyn Filter>, priority: u32) -> Result<ChainId> {
        check_priority(priority)?;
        let id = match self.default_chain {
            Some(id) => id,
            None => {
                let id = self.insert_chain(FilterChain::new(), 0)?;
                self.default_chain = Some(id);
                id
            }
        };
        self.nodes[id.0].chain.add_shared(filter, priority)?;
        Ok(id)
    }

    /// Connect the output of `from` to the input of `to` through `pad`.
    pub fn link(&mut self, from: ChainId, to: ChainId, pad: &str) -> Result<()> {
        if from.0 >= self.nodes.len() || to.0 >= self.nodes.len() {
            return Err(Error::validation(format!("cannot link unknown chain {from} -> {to}")));
        }
        if from == to {
            return Err(Error::validation(format!("chain {from} cannot be linked to itself")));
        }
        if pad.is_empty() || !pad.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::validation(format!(
                "pad name '{pad}' must be non-empty and alphanumeric"
            )));
        }
        if self.edges.iter().any(|e| e.from == from && e.pad == pad) {
            return Err(Error::validation(format!("pad '{pad}' of chain {from} is already linked")));
        }
        self.edges.push(Edge {
            from,
            to,
            pad: pad.to_string(),
        });
        Ok(())
    }

    pub fn chain(&self, id: ChainId) -> Option<&FilterChain> {
        self.nodes.get(id.0).map(|n| &n.chain)
    }

    pub fn default_chain(&self) -> Option<ChainId> {
        self.default_chain
    }

    /// True when any chains are connected to each other.
    pub fn is_linked(&self) -> bool {
        !self.edges.is_empty()
    }

    /// Number of chains.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|n| n.chain.is_empty())
    }

    pub fn kinds(&self) -> StreamMask {
        self.nodes
            .iter()
            .fold(StreamMask::NONE, |acc, n| acc | n.chain.kinds())
    }

    /// Extra sources referenced by any filter of the graph.
    pub fn inputs(&self) -> Vec<&Media> {
        self.ordered()
            .into_iter()
            .flat_map(|(_, node)| node.chain.inputs())
            .collect()
    }

    fn ordered(&self) -> Vec<(ChainId, &Node)> {
        let mut nodes: Vec<(ChainId, &Node)> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (ChainId(i), n))
            .collect();
        nodes.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
        nodes
    }

    fn link_labels(&self, input: usize, id: ChainId) -> (Vec<String>, Vec<String>) {
        let label = |e: &Edge| format!("[i{input}{}_{}]", e.from, e.pad);
        let inputs = self.edges.iter().filter(|e| e.to == id).map(label).collect();
        let outputs = self.edges.iter().filter(|e| e.from == id).map(label).collect();
        (inputs, outputs)
    }

    /// Flatten every chain into one option map. Unlinked chain ends are left
    /// unlabelled so the transcoder binds them to the matching input stream.
    pub fn apply(&self, ctx: &FilterContext<'_>) -> Result<OptionMap> {
        let input = ctx.pads.index_of(ctx.media.source()).unwrap_or(0);
        let mut options = OptionMap::new();

        for (id, node) in self.ordered() {
            let (inputs, outputs) = self.link_labels(input, id);
            let pads = ChainPads {
                inputs,
                outputs,
                tag: format!("i{input}{id}"),
                default_input: input,
            };
            options.merge_append(node.chain.apply(ctx, &pads)?);
        }

        tracing::trace!("graph for input {input} flattened to {} option(s)", options.len());
        Ok(options)
    }

    /// Flatten the graph of an extra input. Every unlinked chain end is bound
    /// explicitly: chains read `[<input>:<type>]` or the previous chain of
    /// the same type and write `[s<input><type><n>]`.
    pub fn apply_bound(&self, ctx: &FilterContext<'_>, input: usize) -> Result<BoundFragments> {
        let mut result = BoundFragments::default();
        let mut counters: BTreeMap<char, usize> = BTreeMap::new();

        for (id, node) in self.ordered() {
            let (linked_inputs, linked_outputs) = self.link_labels(input, id);

            for (key, values) in node.chain.fragments(ctx)? {
                if !is_filter_key(&key) {
                    for value in values {
                        result.options.push(&key, value);
                    }
                    continue;
                }

                let t = pad_type(&key);
                let inputs = if linked_inputs.is_empty() {
                    vec![result
                        .outputs
                        .get(&t)
                        .cloned()
                        .unwrap_or_else(|| format!("[{input}:{t}]"))]
                } else {
                    linked_inputs.clone()
                };
                let n = counters.get(&t).copied().unwrap_or(0);
                let fresh = format!("[s{input}{t}{n}]");
                let outputs = if linked_outputs.is_empty() {
                    vec![fresh.clone()]
                } else {
                    linked_outputs.clone()
                };

                let pads = ChainPads {
                    inputs,
                    outputs,
                    tag: format!("i{input}{id}"),
                    default_input: input,
                };
                let expression = collapse(&values, &pads, t);
                if expression.is_empty() {
                    continue;
                }
                if linked_outputs.is_empty() {
                    counters.insert(t, n + 1);
                    result.outputs.insert(t, fresh);
                }
                result.options.push(&key, expression);
            }
        }

        Ok(result)
    }
}
