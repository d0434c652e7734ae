use indexmap::IndexMap;
use serde::Deserialize;

use crate::color::LabelColor;
use crate::types::{IssueTypeSpec, LabelSpec, SizeTier};

// ---------------------------------------------------------------------------
// Custom color deserialization
// ---------------------------------------------------------------------------

/// Deserialize a `LabelColor` from a TOML string value.
pub(crate) mod color_de {
    use serde::{self, Deserialize, Deserializer};

    use crate::color::LabelColor;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<LabelColor, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        LabelColor::parse(&s, "<labels>").map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub labels: LabelsConfig,
    pub issue_types: IssueTypesConfig,
    pub emoji: EmojiConfig,
    pub projects: ProjectsConfig,
    pub size: SizeConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token. Prefer `PERSONAL_ACCESS_TOKEN` in `.env`.
    pub token: Option<String>,
    /// `owner/name`; detected from the git remote when absent.
    pub repo: Option<String>,
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelEntry {
    pub name: String,
    #[serde(deserialize_with = "color_de::deserialize")]
    pub color: LabelColor,
    #[serde(default)]
    pub description: String,
}

impl LabelEntry {
    fn new(name: &str, color: LabelColor, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            color,
            description: description.to_owned(),
        }
    }

    pub fn to_spec(&self) -> LabelSpec {
        LabelSpec::new(&self.name, self.color.to_string(), &self.description)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub hotfix: LabelEntry,
    pub release: LabelEntry,
    pub docs: LabelEntry,
    pub chore: LabelEntry,
    pub bugfix: LabelEntry,
    pub feature: LabelEntry,
    pub help: LabelEntry,
    pub question: LabelEntry,
    pub branched: LabelEntry,
    pub in_progress: LabelEntry,
    pub priority_high: LabelEntry,
    pub priority_medium: LabelEntry,
    pub priority_low: LabelEntry,
    pub priority_none: LabelEntry,
    pub size_xs: LabelEntry,
    pub size_s: LabelEntry,
    pub size_m: LabelEntry,
    pub size_l: LabelEntry,
    pub size_xl: LabelEntry,
    pub size_xxl: LabelEntry,
    /// Additional repository labels, created by `setup` after the built-in ones.
    pub custom: IndexMap<String, LabelEntry>,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        let c = LabelColor::new;
        Self {
            hotfix: LabelEntry::new("hotfix", c(0xb6, 0x02, 0x05), "Urgent fix on a released version"),
            release: LabelEntry::new("release", c(0x00, 0x80, 0x80), "Release preparation"),
            docs: LabelEntry::new("documentation", c(0x00, 0x75, 0xca), "Documentation changes"),
            chore: LabelEntry::new("chore", c(0xd4, 0xc5, 0xf9), "Maintenance work"),
            bugfix: LabelEntry::new("bugfix", c(0xd7, 0x3a, 0x4a), "Something isn't working"),
            feature: LabelEntry::new("feature", c(0xa2, 0xee, 0xef), "New feature or request"),
            help: LabelEntry::new("help", c(0x00, 0x86, 0x72), "Extra attention is needed"),
            question: LabelEntry::new("question", c(0xd8, 0x76, 0xe3), "Further information is requested"),
            branched: LabelEntry::new("branched", c(0x0e, 0x8a, 0x16), "A branch exists for this issue"),
            in_progress: LabelEntry::new("in-progress", c(0xfb, 0xca, 0x04), "Work has started"),
            priority_high: LabelEntry::new("priority: high", c(0xb6, 0x02, 0x05), "Highest priority"),
            priority_medium: LabelEntry::new("priority: medium", c(0xd9, 0x3f, 0x0b), "Medium priority"),
            priority_low: LabelEntry::new("priority: low", c(0x0e, 0x8a, 0x16), "Low priority"),
            priority_none: LabelEntry::new("priority: none", c(0xcc, 0xcc, 0xcc), "No priority assigned"),
            size_xs: LabelEntry::new("size: XS", c(0x3c, 0xbf, 0x00), "Extra small change"),
            size_s: LabelEntry::new("size: S", c(0x5d, 0x9e, 0x01), "Small change"),
            size_m: LabelEntry::new("size: M", c(0x7f, 0x7f, 0x00), "Medium change"),
            size_l: LabelEntry::new("size: L", c(0xa1, 0x4c, 0x05), "Large change"),
            size_xl: LabelEntry::new("size: XL", c(0xc2, 0x2e, 0x04), "Extra large change"),
            size_xxl: LabelEntry::new("size: XXL", c(0xe5, 0x0b, 0x09), "Huge change"),
            custom: IndexMap::new(),
        }
    }
}

impl LabelsConfig {
    pub fn size(&self, tier: SizeTier) -> &LabelEntry {
        match tier {
            SizeTier::Xs => &self.size_xs,
            SizeTier::S => &self.size_s,
            SizeTier::M => &self.size_m,
            SizeTier::L => &self.size_l,
            SizeTier::Xl => &self.size_xl,
            SizeTier::Xxl => &self.size_xxl,
        }
    }

    /// Every configured label in declaration order, custom labels last.
    pub fn specs(&self) -> Vec<LabelSpec> {
        let builtin = [
            &self.hotfix,
            &self.release,
            &self.docs,
            &self.chore,
            &self.bugfix,
            &self.feature,
            &self.help,
            &self.question,
            &self.branched,
            &self.in_progress,
            &self.priority_high,
            &self.priority_medium,
            &self.priority_low,
            &self.priority_none,
        ];
        builtin
            .into_iter()
            .chain(SizeTier::ALL.iter().map(|t| self.size(*t)))
            .chain(self.custom.values())
            .map(LabelEntry::to_spec)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Issue types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueTypeEntry {
    pub name: String,
    #[serde(default = "default_issue_type_color")]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

fn default_issue_type_color() -> String {
    "gray".to_owned()
}

impl IssueTypeEntry {
    fn new(name: &str, color: &str, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            color: color.to_owned(),
            description: description.to_owned(),
        }
    }

    pub fn to_spec(&self) -> IssueTypeSpec {
        IssueTypeSpec::new(&self.name, &self.color, &self.description)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IssueTypesConfig {
    pub task: IssueTypeEntry,
    pub bug: IssueTypeEntry,
    pub feature: IssueTypeEntry,
    pub documentation: IssueTypeEntry,
    pub maintenance: IssueTypeEntry,
    pub hotfix: IssueTypeEntry,
    pub release: IssueTypeEntry,
    pub question: IssueTypeEntry,
}

impl Default for IssueTypesConfig {
    fn default() -> Self {
        Self {
            task: IssueTypeEntry::new("Task", "yellow", "A specific piece of work"),
            bug: IssueTypeEntry::new("Bug", "red", "An unexpected problem or behavior"),
            feature: IssueTypeEntry::new("Feature", "blue", "A request, idea, or new functionality"),
            documentation: IssueTypeEntry::new("Documentation", "gray", "Documentation work"),
            maintenance: IssueTypeEntry::new("Maintenance", "purple", "Chores and upkeep"),
            hotfix: IssueTypeEntry::new("Hotfix", "orange", "Urgent fix on a released version"),
            release: IssueTypeEntry::new("Release", "green", "Release preparation"),
            question: IssueTypeEntry::new("Question", "pink", "A question or request for help"),
        }
    }
}

impl IssueTypesConfig {
    pub fn specs(&self) -> Vec<IssueTypeSpec> {
        [
            &self.task,
            &self.bug,
            &self.feature,
            &self.documentation,
            &self.maintenance,
            &self.hotfix,
            &self.release,
            &self.question,
        ]
        .into_iter()
        .map(IssueTypeEntry::to_spec)
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Title emoji
// ---------------------------------------------------------------------------

/// GitHub emoji shortcodes used when formatting titles.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmojiConfig {
    /// Rewrite issue and PR titles at all.
    pub enabled: bool,
    /// Prefix PR titles with the linked issue as `[#N]`.
    pub linked_issue_prefix: bool,
    pub hotfix: String,
    pub release: String,
    pub docs: String,
    pub chore: String,
    pub bugfix: String,
    pub feature: String,
    pub help: String,
    pub question: String,
    pub branched: String,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            linked_issue_prefix: true,
            hotfix: ":fire:".to_owned(),
            release: ":rocket:".to_owned(),
            docs: ":memo:".to_owned(),
            chore: ":wrench:".to_owned(),
            bugfix: ":bug:".to_owned(),
            feature: ":sparkles:".to_owned(),
            help: ":sos:".to_owned(),
            question: ":question:".to_owned(),
            branched: ":seedling:".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardOwner {
    #[default]
    Organization,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardRef {
    pub owner: String,
    pub number: u64,
    #[serde(default, rename = "type")]
    pub kind: BoardOwner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectsConfig {
    pub boards: Vec<BoardRef>,
    pub status_field: String,
    pub priority_field: String,
    pub in_progress_column: String,
    pub in_review_column: String,
    /// Push the priority label to the boards' priority field.
    pub priority_labels_enabled: bool,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            boards: Vec::new(),
            status_field: "Status".to_owned(),
            priority_field: "Priority".to_owned(),
            in_progress_column: "In Progress".to_owned(),
            in_review_column: "In Review".to_owned(),
            priority_labels_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Size thresholds
// ---------------------------------------------------------------------------

/// Upper bounds (inclusive, changed lines) for each size tier; above `xl` is XXL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    pub xs: u64,
    pub s: u64,
    pub m: u64,
    pub l: u64,
    pub xl: u64,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            xs: 10,
            s: 50,
            m: 200,
            l: 500,
            xl: 1000,
        }
    }
}

impl SizeConfig {
    pub fn tier_for(&self, changed_lines: u64) -> SizeTier {
        if changed_lines <= self.xs {
            SizeTier::Xs
        } else if changed_lines <= self.s {
            SizeTier::S
        } else if changed_lines <= self.m {
            SizeTier::M
        } else if changed_lines <= self.l {
            SizeTier::L
        } else if changed_lines <= self.xl {
            SizeTier::Xl
        } else {
            SizeTier::Xxl
        }
    }
}

// ---------------------------------------------------------------------------
// AI agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Base URL of the coding-agent server.
    pub server_url: String,
    /// `provider/model` identifier forwarded to the agent.
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:4096".to_owned(),
            model: "openai/gpt-4o".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_specs_cover_builtin_and_size_labels() {
        let specs = LabelsConfig::default().specs();
        assert_eq!(specs.len(), 20);
        assert_eq!(specs[0].name, "hotfix");
        assert_eq!(specs[0].color, "b60205");
        assert_eq!(specs.last().unwrap().name, "size: XXL");
    }

    #[test]
    fn size_tiers_use_inclusive_bounds() {
        let s = SizeConfig::default();
        assert_eq!(s.tier_for(0), SizeTier::Xs);
        assert_eq!(s.tier_for(10), SizeTier::Xs);
        assert_eq!(s.tier_for(11), SizeTier::S);
        assert_eq!(s.tier_for(200), SizeTier::M);
        assert_eq!(s.tier_for(1000), SizeTier::Xl);
        assert_eq!(s.tier_for(1001), SizeTier::Xxl);
    }

    #[test]
    fn issue_type_specs_in_order() {
        let names: Vec<_> = IssueTypesConfig::default()
            .specs()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names[0], "Task");
        assert_eq!(names.len(), 8);
    }
}
