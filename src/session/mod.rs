// Submission history behind the interactive front end

use crate::parser::{analyze, Analysis, AnalysisError, Classifier, Dialect};
use tracing::info;

/// Oldest submissions are dropped beyond this many entries
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// One analyzed program: either every stage passed, or the first error
#[derive(Debug, Clone)]
pub struct Submission {
    pub source: String,
    pub outcome: Result<Analysis, AnalysisError>,
}

impl Submission {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        self.outcome.as_ref().err()
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.outcome.as_ref().ok()
    }
}

/// Analyzes programs one after another and remembers them
#[derive(Debug, Clone)]
pub struct Session {
    classifier: Classifier,
    history: Vec<Submission>,
    position: usize,
    limit: usize,
}

impl Session {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_limit(dialect, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(dialect: Dialect, limit: usize) -> Self {
        Session {
            classifier: Classifier::new(dialect),
            history: Vec::new(),
            position: 0,
            limit: limit.max(1),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn dialect(&self) -> Dialect {
        self.classifier.dialect()
    }

    /// Analyze `source`, append it to the history, and make it current
    pub fn submit(&mut self, source: &str) -> &Submission {
        let outcome = analyze(source, &self.classifier);
        match &outcome {
            Ok(analysis) => info!(
                tokens = analysis.tokens.len(),
                nodes = analysis.ast.node_count(),
                "analysis succeeded"
            ),
            Err(err) => info!(kind = err.category(), %err, "analysis failed"),
        }

        if self.history.len() == self.limit {
            self.history.remove(0);
        }
        self.history.push(Submission {
            source: source.to_string(),
            outcome,
        });
        self.position = self.history.len() - 1;
        &self.history[self.position]
    }

    pub fn current(&self) -> Option<&Submission> {
        self.history.get(self.position)
    }

    /// Move to the previous submission; `None` when already at the oldest
    pub fn step_backward(&mut self) -> Option<&Submission> {
        if self.position == 0 || self.history.is_empty() {
            return None;
        }
        self.position -= 1;
        self.current()
    }

    /// Move to the next submission; `None` when already at the newest
    pub fn step_forward(&mut self) -> Option<&Submission> {
        if self.position + 1 >= self.history.len() {
            return None;
        }
        self.position += 1;
        self.current()
    }

    pub fn history_position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Rule;

    #[test]
    fn test_submit_success_and_failure() {
        let mut session = Session::default();

        let ok = session.submit("{ x = 1 ; }");
        assert!(ok.is_ok());
        assert_eq!(ok.analysis().unwrap().tokens.len(), 6);

        let failed = session.submit("{ 5 5 ; }");
        assert_eq!(failed.error().and_then(|e| e.rule()), Some(Rule::NoStutter));

        assert_eq!(session.len(), 2);
        assert_eq!(session.history_position(), 1);
    }

    #[test]
    fn test_history_navigation() {
        let mut session = Session::default();
        assert!(session.current().is_none());
        assert!(session.step_backward().is_none());

        session.submit("{ a = 1 ; }");
        session.submit("{ b = 2 ; }");
        session.submit("{ c = 3 ; }");

        assert_eq!(session.step_backward().unwrap().source, "{ b = 2 ; }");
        assert_eq!(session.step_backward().unwrap().source, "{ a = 1 ; }");
        assert!(session.step_backward().is_none());
        assert_eq!(session.step_forward().unwrap().source, "{ b = 2 ; }");
        assert_eq!(session.step_forward().unwrap().source, "{ c = 3 ; }");
        assert!(session.step_forward().is_none());
    }

    #[test]
    fn test_history_limit_drops_oldest() {
        let mut session = Session::with_limit(Dialect::Scheme, 2);
        session.submit("{ a = 1 ; }");
        session.submit("{ b = 2 ; }");
        session.submit("{ c = 3 ; }");

        assert_eq!(session.len(), 2);
        assert_eq!(session.step_backward().unwrap().source, "{ b = 2 ; }");
    }

    #[test]
    fn test_dialect_applies_to_submissions() {
        let mut session = Session::new(Dialect::C);
        assert_eq!(session.dialect(), Dialect::C);

        // `int` is a keyword in C, so the statement no longer starts with an identifier
        let submission = session.submit("{ int = 1 ; }");
        assert_eq!(
            submission.error().and_then(|e| e.rule()),
            Some(Rule::OperatorPlacement)
        );
    }
}
