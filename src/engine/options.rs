//! Analysis configuration.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Class name prefix of blueprint graph nodes.
pub const DEFAULT_NODE_CLASS_PREFIX: &str = "K2Node_";

/// Configuration for asset analysis.
///
/// The defaults suit interactive use: functions are analyzed in parallel, instrumentation is
/// dropped from the pseudocode and only `K2Node_*` exports are treated as graph nodes.
///
/// # Examples
///
/// ```rust
/// use kismetscope::AnalysisOptions;
///
/// let options = AnalysisOptions::sequential().with_noise(true);
/// assert!(!options.parallel);
/// assert!(options.keep_noise);
/// assert!(options.is_node_class("K2Node_CallFunction"));
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Analyze functions on the rayon thread pool
    pub parallel: bool,
    /// Export class name prefixes identifying graph nodes
    pub node_class_prefixes: Vec<String>,
    /// Render instrumentation records as comments
    pub keep_noise: bool,
    /// Cooperative cancellation flag, checked before each function
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            parallel: true,
            node_class_prefixes: vec![DEFAULT_NODE_CLASS_PREFIX.to_string()],
            keep_noise: false,
            cancel: None,
        }
    }
}

impl AnalysisOptions {
    /// Default options with parallelism disabled.
    #[must_use]
    pub fn sequential() -> Self {
        AnalysisOptions {
            parallel: false,
            ..AnalysisOptions::default()
        }
    }

    /// Builder-style parallelism switch.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder-style instrumentation switch.
    #[must_use]
    pub fn with_noise(mut self, keep_noise: bool) -> Self {
        self.keep_noise = keep_noise;
        self
    }

    /// Replace the graph node class prefixes.
    #[must_use]
    pub fn with_node_class_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_class_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a cancellation flag.
    #[must_use]
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Returns `true` once the cancellation flag has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Returns `true` if exports of `class_name` are graph nodes.
    #[must_use]
    pub fn is_node_class(&self, class_name: &str) -> bool {
        self.node_class_prefixes
            .iter()
            .any(|prefix| class_name.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AnalysisOptions::default();
        assert!(options.parallel);
        assert!(!options.keep_noise);
        assert!(!options.is_cancelled());
        assert!(options.is_node_class("K2Node_IfThenElse"));
        assert!(!options.is_node_class("EdGraph"));
    }

    #[test]
    fn test_custom_prefixes() {
        let options = AnalysisOptions::default().with_node_class_prefixes(["MaterialExpression"]);
        assert!(options.is_node_class("MaterialExpressionAdd"));
        assert!(!options.is_node_class("K2Node_Event"));
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let options = AnalysisOptions::default().with_cancel(Arc::clone(&flag));
        assert!(!options.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(options.is_cancelled());
    }
}
