//! Projects (v2) board operations over GraphQL.
//!
//! Columns and priorities are both single-select fields on the board; moving
//! a card and setting its priority share [`set_single_select`].

use std::sync::Arc;

use anyhow::{Context, Result};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};

use crate::config::types::{BoardOwner, BoardRef};
use crate::github::graphql::{self, RawRateLimit};
use crate::types::{ProjectDetail, ProjectOwnerKind};

// ---------------------------------------------------------------------------
// GraphQL documents
// ---------------------------------------------------------------------------

const ORG_PROJECT_QUERY: &str = r"
query OrgProject($owner: String!, $number: Int!) {
  rateLimit { limit remaining cost }
  owner: organization(login: $owner) {
    projectV2(number: $number) { id title url number }
  }
}
";

const USER_PROJECT_QUERY: &str = r"
query UserProject($owner: String!, $number: Int!) {
  rateLimit { limit remaining cost }
  owner: user(login: $owner) {
    projectV2(number: $number) { id title url number }
  }
}
";

const CONTENT_ITEMS_QUERY: &str = r"
query ContentProjectItems($contentId: ID!, $field: String!) {
  rateLimit { limit remaining cost }
  node(id: $contentId) {
    ... on Issue {
      projectItems(first: 50) {
        nodes {
          id
          project { id }
          fieldValueByName(name: $field) {
            ... on ProjectV2ItemFieldSingleSelectValue { name }
          }
        }
      }
    }
    ... on PullRequest {
      projectItems(first: 50) {
        nodes {
          id
          project { id }
          fieldValueByName(name: $field) {
            ... on ProjectV2ItemFieldSingleSelectValue { name }
          }
        }
      }
    }
  }
}
";

const PROJECT_FIELD_QUERY: &str = r"
query ProjectField($projectId: ID!, $field: String!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      field(name: $field) {
        ... on ProjectV2SingleSelectField { id name options { id name } }
      }
    }
  }
}
";

const ADD_ITEM_MUTATION: &str = r"
mutation AddProjectItem($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: { projectId: $projectId, contentId: $contentId }) {
    item { id }
  }
}
";

const UPDATE_FIELD_MUTATION: &str = r"
mutation SetSingleSelect($projectId: ID!, $itemId: ID!, $fieldId: ID!, $optionId: String!) {
  updateProjectV2ItemFieldValue(input: {
    projectId: $projectId
    itemId: $itemId
    fieldId: $fieldId
    value: { singleSelectOptionId: $optionId }
  }) {
    projectV2Item { id }
  }
}
";

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ProjectVariables<'a> {
    owner: &'a str,
    number: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentItemsVariables<'a> {
    content_id: &'a str,
    field: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectFieldVariables<'a> {
    project_id: &'a str,
    field: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemVariables<'a> {
    project_id: &'a str,
    content_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateFieldVariables<'a> {
    project_id: &'a str,
    item_id: &'a str,
    field_id: &'a str,
    option_id: &'a str,
}

// ---------------------------------------------------------------------------
// Raw response types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectData {
    rate_limit: Option<RawRateLimit>,
    owner: Option<RawOwner>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOwner {
    project_v2: Option<RawProject>,
}

#[derive(Deserialize)]
struct RawProject {
    id: String,
    title: String,
    #[serde(default)]
    url: String,
    number: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentItemsData {
    rate_limit: Option<RawRateLimit>,
    node: Option<RawContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContent {
    project_items: Option<RawItemConnection>,
}

#[derive(Deserialize)]
struct RawItemConnection {
    #[serde(default)]
    nodes: Vec<RawItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: String,
    project: RawItemProject,
    field_value_by_name: Option<RawFieldValue>,
}

#[derive(Deserialize)]
struct RawItemProject {
    id: String,
}

#[derive(Deserialize)]
struct RawFieldValue {
    name: Option<String>,
}

#[derive(Deserialize)]
struct ProjectFieldData {
    node: Option<RawProjectNode>,
}

#[derive(Deserialize)]
struct RawProjectNode {
    field: Option<RawField>,
}

#[derive(Deserialize)]
struct RawField {
    id: Option<String>,
    #[serde(default)]
    options: Vec<RawOption>,
}

#[derive(Deserialize)]
struct RawOption {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemData {
    add_project_v2_item_by_id: Option<RawAddItem>,
}

#[derive(Deserialize)]
struct RawAddItem {
    item: Option<RawItemId>,
}

#[derive(Deserialize)]
struct RawItemId {
    id: String,
}

#[derive(Deserialize)]
struct UpdateFieldData {}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Resolve a configured board reference into its details.
pub(crate) async fn fetch_project(
    octocrab: &Arc<Octocrab>,
    board: &BoardRef,
) -> Result<ProjectDetail> {
    let (query, kind) = match board.kind {
        BoardOwner::Organization => (ORG_PROJECT_QUERY, ProjectOwnerKind::Organization),
        BoardOwner::User => (USER_PROJECT_QUERY, ProjectOwnerKind::User),
    };
    let variables = ProjectVariables {
        owner: &board.owner,
        number: board.number,
    };
    let data: ProjectData = graphql::execute(octocrab, "project", query, &variables).await?;
    if let Some(rl) = data.rate_limit {
        rl.log("project");
    }

    let raw = data
        .owner
        .and_then(|o| o.project_v2)
        .with_context(|| format!("project {}#{} not found", board.owner, board.number))?;

    Ok(ProjectDetail {
        id: raw.id,
        title: raw.title,
        kind,
        owner: board.owner.clone(),
        url: raw.url,
        number: raw.number,
    })
}

/// Set a single-select field of the card for `content_id` to `option`.
///
/// Adds the content to the board when it has no card yet. Returns `false`
/// without writing when the field already holds `option` (case-insensitive).
pub(crate) async fn set_single_select(
    octocrab: &Arc<Octocrab>,
    project: &ProjectDetail,
    content_id: &str,
    field: &str,
    option: &str,
) -> Result<bool> {
    let items: ContentItemsData = graphql::execute(
        octocrab,
        "content project items",
        CONTENT_ITEMS_QUERY,
        &ContentItemsVariables { content_id, field },
    )
    .await?;
    if let Some(rl) = items.rate_limit {
        rl.log("content project items");
    }

    let existing = items
        .node
        .and_then(|n| n.project_items)
        .map(|c| c.nodes)
        .unwrap_or_default()
        .into_iter()
        .find(|item| item.project.id == project.id);

    let item_id = match existing {
        Some(item) => {
            let current = item.field_value_by_name.and_then(|v| v.name);
            if current.is_some_and(|c| c.eq_ignore_ascii_case(option)) {
                tracing::debug!(project = %project.title, field, option, "field already set");
                return Ok(false);
            }
            item.id
        }
        None => add_item(octocrab, project, content_id).await?,
    };

    let field_data: ProjectFieldData = graphql::execute(
        octocrab,
        "project field",
        PROJECT_FIELD_QUERY,
        &ProjectFieldVariables {
            project_id: &project.id,
            field,
        },
    )
    .await?;

    let raw_field = field_data
        .node
        .and_then(|n| n.field)
        .with_context(|| format!("field \"{field}\" not found on project \"{}\"", project.title))?;
    let field_id = raw_field
        .id
        .with_context(|| format!("field \"{field}\" is not a single-select field"))?;
    let option_id = raw_field
        .options
        .into_iter()
        .find(|o| o.name.eq_ignore_ascii_case(option))
        .map(|o| o.id)
        .with_context(|| {
            format!(
                "option \"{option}\" not found in field \"{field}\" of project \"{}\"",
                project.title
            )
        })?;

    let _: UpdateFieldData = graphql::execute(
        octocrab,
        "update project field",
        UPDATE_FIELD_MUTATION,
        &UpdateFieldVariables {
            project_id: &project.id,
            item_id: &item_id,
            field_id: &field_id,
            option_id: &option_id,
        },
    )
    .await?;

    Ok(true)
}

async fn add_item(
    octocrab: &Arc<Octocrab>,
    project: &ProjectDetail,
    content_id: &str,
) -> Result<String> {
    tracing::debug!(project = %project.title, content_id, "adding card to project");
    let data: AddItemData = graphql::execute(
        octocrab,
        "add project item",
        ADD_ITEM_MUTATION,
        &AddItemVariables {
            project_id: &project.id,
            content_id,
        },
    )
    .await?;
    data.add_project_v2_item_by_id
        .and_then(|a| a.item)
        .map(|i| i.id)
        .context("addProjectV2ItemById returned no item")
}
