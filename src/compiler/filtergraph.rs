//! Filter graph construction
//!
//! A filter graph is an ordered list of named processing stages, each a
//! filter expression string carrying its own input/output tag wiring.
//! Stages render semicolon-joined; tags are wrapped in `[name]`.

use std::fmt;

/// Output tag of the combined video stream
pub const FINAL_VIDEO_TAG: &str = "finalVideo";

/// Output tag of the k-th combined audio stream
pub fn final_audio_tag(k: usize) -> String {
    format!("finalAudio{}", k)
}

/// Wrap a tag name in brackets for use inside a filter expression
pub fn bracket(tag: &str) -> String {
    format!("[{}]", tag)
}

/// Identity of a processing stage within a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    /// Joins the per-clip streams into one continuous timeline
    Concat,
    /// Rewrites frame dimensions
    Scale,
    /// Re-times video presentation timestamps
    Setpts,
    /// Re-times the k-th audio stream
    Atempo(usize),
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::Concat => write!(f, "concat"),
            FilterStage::Scale => write!(f, "scale"),
            FilterStage::Setpts => write!(f, "setpts"),
            FilterStage::Atempo(k) => write!(f, "atempo{}", k),
        }
    }
}

/// Ordered set of filter stages with their rendered expressions.
///
/// Stage order is insertion order and is semantically significant: each
/// stage consumes the tag produced by an earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGraph {
    stages: Vec<StageEntry>,
}

#[derive(Debug, Clone, PartialEq)]
struct StageEntry {
    stage: FilterStage,
    expression: String,
    outputs: Vec<String>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn push(&mut self, stage: FilterStage, expression: String, outputs: &[String]) {
        self.stages.push(StageEntry {
            stage,
            expression,
            outputs: outputs.to_vec(),
        });
    }

    /// Expression of a stage, if present
    pub fn stage(&self, stage: FilterStage) -> Option<&str> {
        self.stages
            .iter()
            .find(|entry| entry.stage == stage)
            .map(|entry| entry.expression.as_str())
    }

    /// Stage identities in emission order
    pub fn stage_order(&self) -> Vec<FilterStage> {
        self.stages.iter().map(|entry| entry.stage).collect()
    }

    /// Whether some stage declares the given tag as an output
    pub fn produces(&self, tag: &str) -> bool {
        self.stages
            .iter()
            .any(|entry| entry.outputs.iter().any(|out| out == tag))
    }

    /// The aggregated filter-graph expression: stages joined with `;`
    pub fn render(&self) -> String {
        self.stages
            .iter()
            .map(|entry| entry.expression.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_with_semicolons() {
        let mut graph = FilterGraph::new();
        graph.push(
            FilterStage::Scale,
            "[0:v]scale=1280:720[finalVideo]".to_string(),
            &[FINAL_VIDEO_TAG.to_string()],
        );
        graph.push(
            FilterStage::Setpts,
            "[finalVideo]setpts=PTS/2[finalVideo]".to_string(),
            &[FINAL_VIDEO_TAG.to_string()],
        );
        assert_eq!(
            graph.render(),
            "[0:v]scale=1280:720[finalVideo];[finalVideo]setpts=PTS/2[finalVideo]"
        );
    }

    #[test]
    fn test_produces_checks_declared_outputs() {
        let mut graph = FilterGraph::new();
        graph.push(
            FilterStage::Scale,
            "[0:v]scale=1280:720[finalVideo]".to_string(),
            &[FINAL_VIDEO_TAG.to_string()],
        );
        assert!(graph.produces(FINAL_VIDEO_TAG));
        assert!(!graph.produces("finalAudio0"));
    }
}
