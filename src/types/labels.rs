use crate::config::types::{IssueTypesConfig, LabelsConfig};

use super::common::{Priority, SizeTier};

/// Work categories that drive title emoji and issue types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Hotfix,
    Release,
    Docs,
    Chore,
    Bugfix,
    Feature,
    Help,
    Question,
}

impl Category {
    /// Evaluation order for title formatting: first match wins.
    pub const TITLE_ORDER: [Category; 8] = [
        Category::Hotfix,
        Category::Release,
        Category::Docs,
        Category::Chore,
        Category::Bugfix,
        Category::Feature,
        Category::Help,
        Category::Question,
    ];
}

/// Configured label names plus the labels currently attached to the issue or
/// pull request being processed.
#[derive(Debug, Clone)]
pub struct Labels {
    config: LabelsConfig,
    current: Vec<String>,
}

impl Labels {
    pub fn new(config: LabelsConfig, current: Vec<String>) -> Self {
        Self { config, current }
    }

    pub fn config(&self) -> &LabelsConfig {
        &self.config
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    /// Case-insensitive membership test against the current labels.
    pub fn contains(&self, name: &str) -> bool {
        self.current.iter().any(|l| l.eq_ignore_ascii_case(name))
    }

    pub fn name_of(&self, category: Category) -> &str {
        let c = &self.config;
        match category {
            Category::Hotfix => &c.hotfix.name,
            Category::Release => &c.release.name,
            Category::Docs => &c.docs.name,
            Category::Chore => &c.chore.name,
            Category::Bugfix => &c.bugfix.name,
            Category::Feature => &c.feature.name,
            Category::Help => &c.help.name,
            Category::Question => &c.question.name,
        }
    }

    pub fn has(&self, category: Category) -> bool {
        self.contains(self.name_of(category))
    }

    /// Highest-ranked category present, in [`Category::TITLE_ORDER`].
    pub fn primary_category(&self) -> Option<Category> {
        Category::TITLE_ORDER.into_iter().find(|c| self.has(*c))
    }

    pub fn is_branched(&self) -> bool {
        self.contains(&self.config.branched.name)
    }

    pub fn is_in_progress(&self) -> bool {
        self.contains(&self.config.in_progress.name)
    }

    /// Name of the priority label attached, if any of the four configured
    /// priority labels is present.
    pub fn current_priority_label(&self) -> Option<&str> {
        let c = &self.config;
        [&c.priority_high, &c.priority_medium, &c.priority_low, &c.priority_none]
            .into_iter()
            .map(|e| e.name.as_str())
            .find(|name| self.contains(name))
    }

    /// Priority token for the attached priority label.
    ///
    /// `None` for the "no priority" label and for unconfigured labels.
    pub fn priority(&self) -> Option<Priority> {
        let label = self.current_priority_label()?;
        let c = &self.config;
        if label.eq_ignore_ascii_case(&c.priority_high.name) {
            Some(Priority::P0)
        } else if label.eq_ignore_ascii_case(&c.priority_medium.name) {
            Some(Priority::P1)
        } else if label.eq_ignore_ascii_case(&c.priority_low.name) {
            Some(Priority::P2)
        } else {
            None
        }
    }

    pub fn size_label(&self, tier: SizeTier) -> &str {
        &self.config.size(tier).name
    }

    pub fn is_size_label(&self, name: &str) -> bool {
        SizeTier::ALL
            .iter()
            .any(|t| self.size_label(*t).eq_ignore_ascii_case(name))
    }
}

/// Configured organization issue-type names.
#[derive(Debug, Clone, Default)]
pub struct IssueTypes {
    config: IssueTypesConfig,
}

impl IssueTypes {
    pub fn new(config: IssueTypesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IssueTypesConfig {
        &self.config
    }

    /// Issue type matching the labels; the task type when nothing matches.
    pub fn desired_for(&self, labels: &Labels) -> &str {
        let c = &self.config;
        match labels.primary_category() {
            Some(Category::Hotfix) => &c.hotfix.name,
            Some(Category::Release) => &c.release.name,
            Some(Category::Docs) => &c.documentation.name,
            Some(Category::Chore) => &c.maintenance.name,
            Some(Category::Bugfix) => &c.bug.name,
            Some(Category::Feature) => &c.feature.name,
            Some(Category::Help | Category::Question) => &c.question.name,
            None => &c.task.name,
        }
    }
}
