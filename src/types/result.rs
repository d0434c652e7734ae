use serde::Serialize;

/// Outcome of one use case's attempt against one target (e.g. one project
/// board).
///
/// Built through the constructors below and read through accessors; a result
/// is never modified once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    id: String,
    success: bool,
    executed: bool,
    steps: Vec<String>,
    errors: Vec<String>,
}

impl ActionResult {
    /// The use case ran and changed (or confirmed) remote state.
    pub fn success(id: impl Into<String>, steps: Vec<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            executed: true,
            steps,
            errors: Vec::new(),
        }
    }

    /// The use case decided there was nothing to do.
    pub fn skipped(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            executed: false,
            steps: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Like [`ActionResult::skipped`], with a step explaining why.
    pub fn skipped_with(id: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            steps: vec![step.into()],
            ..Self::skipped(id)
        }
    }

    /// The use case ran and failed.
    pub fn failure(id: impl Into<String>, steps: Vec<String>, errors: Vec<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            executed: true,
            steps,
            errors,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// `true` when every result in the batch succeeded.
pub fn all_succeeded(results: &[ActionResult]) -> bool {
    results.iter().all(ActionResult::is_success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_is_successful_but_not_executed() {
        let r = ActionResult::skipped("priority");
        assert!(r.is_success());
        assert!(!r.is_executed());
        assert!(r.steps().is_empty());
    }

    #[test]
    fn failure_carries_errors() {
        let r = ActionResult::failure("setup", vec!["step".into()], vec!["boom".into()]);
        assert!(!r.is_success());
        assert!(r.is_executed());
        assert_eq!(r.errors(), ["boom"]);
    }

    #[test]
    fn serializes_flat() {
        let r = ActionResult::success("move", vec!["moved".into()]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["id"], "move");
        assert_eq!(json["success"], true);
        assert_eq!(json["steps"][0], "moved");
    }

    #[test]
    fn all_succeeded_checks_every_entry() {
        let ok = ActionResult::skipped("a");
        let bad = ActionResult::failure("b", vec![], vec![]);
        assert!(all_succeeded(&[ok.clone()]));
        assert!(!all_succeeded(&[ok, bad]));
    }
}
