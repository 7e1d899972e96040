//! Synchronous signal-conditioning pipeline.
//!
//! A `Pipeline` owns a named source node followed by an ordered list of
//! transform stages. Each node may have any number of sinks attached; a sink
//! receives every value its node emits, in the order sinks were connected.
//! Attaching sinks to intermediate stages is how diagnostics observe the
//! resistance or degree value on the way to the published radians.
//!
//! Propagation of one raw sample runs to completion inside `push`. A stage
//! that fails, or returns NaN/±Inf, ends the cycle: downstream stages and
//! their sinks receive nothing, the fault goes to the optional fault sink,
//! and the next `push` starts clean.
//!
//! The pipeline is single-owner: `push` and `connect` take `&mut self`, so
//! sharing one instance across threads needs external serialization.

use crate::error::{BuildError, CoreError};
use crate::status::PropagationStatus;
use crate::transform::Transform;

/// Address of a node inside a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Source,
    /// Zero-based index into the transform list.
    Stage(usize),
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Stage(i) => write!(f, "stage[{i}]"),
        }
    }
}

/// A value leaving a node, as seen by a sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission<'a> {
    pub node: NodeId,
    pub name: &'a str,
    pub value: f64,
}

/// Owned per-node value returned by [`Pipeline::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub node: NodeId,
    pub name: String,
    pub value: f64,
}

pub type Sink = Box<dyn FnMut(&Emission<'_>) + Send>;
pub type FaultSink = Box<dyn FnMut(&CoreError) + Send>;

struct Stage {
    transform: Box<dyn Transform>,
    sinks: Vec<Sink>,
}

pub struct Pipeline {
    source_name: String,
    source_sinks: Vec<Sink>,
    stages: Vec<Stage>,
    on_fault: Option<FaultSink>,
    emitted: u64,
    skipped: u64,
}

impl core::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let stages: Vec<&str> = self.stages.iter().map(|s| s.transform.name()).collect();
        f.debug_struct("Pipeline")
            .field("source", &self.source_name)
            .field("stages", &stages)
            .field("emitted", &self.emitted)
            .field("skipped", &self.skipped)
            .finish()
    }
}

impl Pipeline {
    /// Chain `transforms` after a source named `source_name`, in order.
    pub fn compose(
        source_name: impl Into<String>,
        transforms: impl IntoIterator<Item = Box<dyn Transform>>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            source_sinks: Vec::new(),
            stages: transforms
                .into_iter()
                .map(|transform| Stage {
                    transform,
                    sinks: Vec::new(),
                })
                .collect(),
            on_fault: None,
            emitted: 0,
            skipped: 0,
        }
    }

    /// Append one more stage at the end of the chain and return its id.
    pub fn then(&mut self, transform: impl Transform + 'static) -> NodeId {
        self.stages.push(Stage {
            transform: Box::new(transform),
            sinks: Vec::new(),
        });
        NodeId::Stage(self.stages.len() - 1)
    }

    /// Attach `sink` to `node`. Returns `node` so calls can be chained.
    pub fn connect(
        &mut self,
        node: NodeId,
        sink: impl FnMut(&Emission<'_>) + Send + 'static,
    ) -> Result<NodeId, BuildError> {
        let sinks = match node {
            NodeId::Source => &mut self.source_sinks,
            NodeId::Stage(i) => match self.stages.get_mut(i) {
                Some(stage) => &mut stage.sinks,
                None => return Err(BuildError::UnknownNode(node.to_string())),
            },
        };
        sinks.push(Box::new(sink));
        Ok(node)
    }

    /// Attach `sink` to the last node (the last stage, or the source when empty).
    pub fn connect_output(&mut self, sink: impl FnMut(&Emission<'_>) + Send + 'static) -> NodeId {
        let node = self.output();
        match node {
            NodeId::Source => self.source_sinks.push(Box::new(sink)),
            NodeId::Stage(i) => self.stages[i].sinks.push(Box::new(sink)),
        }
        node
    }

    /// Route per-event faults to `f` in addition to the warning log.
    pub fn on_fault(&mut self, f: impl FnMut(&CoreError) + Send + 'static) {
        self.on_fault = Some(Box::new(f));
    }

    /// Look up a stage by the name its transform reports.
    pub fn stage_id(&self, name: &str) -> Option<NodeId> {
        self.stages
            .iter()
            .position(|s| s.transform.name() == name)
            .map(NodeId::Stage)
    }

    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        match node {
            NodeId::Source => Some(&self.source_name),
            NodeId::Stage(i) => self.stages.get(i).map(|s| s.transform.name()),
        }
    }

    /// The terminal node.
    pub fn output(&self) -> NodeId {
        match self.stages.len() {
            0 => NodeId::Source,
            n => NodeId::Stage(n - 1),
        }
    }

    /// Number of transform stages (the source is not counted).
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Cycles that reached the final stage.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Cycles dropped because a stage faulted.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Propagate one raw sample through every stage.
    pub fn push(&mut self, raw: f64) -> PropagationStatus {
        if !raw.is_finite() {
            let e = CoreError::NonFiniteResult {
                stage: self.source_name.clone(),
                value: raw,
            };
            return self.fault(e);
        }

        tracing::trace!(node = %self.source_name, value = raw, "source emitted");
        deliver(&mut self.source_sinks, NodeId::Source, &self.source_name, raw);

        let mut value = raw;
        let mut failure = None;
        for (i, stage) in self.stages.iter_mut().enumerate() {
            let Stage { transform, sinks } = stage;
            let name = transform.name();
            match transform.apply(value) {
                Ok(y) if y.is_finite() => value = y,
                Ok(y) => {
                    failure = Some(CoreError::NonFiniteResult {
                        stage: name.to_string(),
                        value: y,
                    });
                    break;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
            tracing::trace!(node = name, value, "stage emitted");
            deliver(sinks, NodeId::Stage(i), name, value);
        }

        if let Some(e) = failure {
            return self.fault(e);
        }
        self.emitted = self.emitted.saturating_add(1);
        PropagationStatus::Delivered(value)
    }

    /// Run `raw` through every stage without touching sinks or counters.
    ///
    /// Returns the value leaving each node, source first.
    pub fn evaluate(&self, raw: f64) -> Result<Vec<Reading>, CoreError> {
        if !raw.is_finite() {
            return Err(CoreError::NonFiniteResult {
                stage: self.source_name.clone(),
                value: raw,
            });
        }
        let mut out = Vec::with_capacity(self.stages.len() + 1);
        out.push(Reading {
            node: NodeId::Source,
            name: self.source_name.clone(),
            value: raw,
        });
        let mut value = raw;
        for (i, stage) in self.stages.iter().enumerate() {
            let name = stage.transform.name();
            value = stage.transform.apply(value)?;
            if !value.is_finite() {
                return Err(CoreError::NonFiniteResult {
                    stage: name.to_string(),
                    value,
                });
            }
            out.push(Reading {
                node: NodeId::Stage(i),
                name: name.to_string(),
                value,
            });
        }
        Ok(out)
    }

    fn fault(&mut self, e: CoreError) -> PropagationStatus {
        self.skipped = self.skipped.saturating_add(1);
        tracing::warn!(error = %e, skipped = self.skipped, "propagation skipped");
        if let Some(f) = self.on_fault.as_mut() {
            f(&e);
        }
        PropagationStatus::Skipped(e)
    }
}

#[inline]
fn deliver(sinks: &mut [Sink], node: NodeId, name: &str, value: f64) {
    let emission = Emission { node, name, value };
    for sink in sinks.iter_mut() {
        sink(&emission);
    }
}
