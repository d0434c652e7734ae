use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectOwnerKind {
    Organization,
    User,
}

impl ProjectOwnerKind {
    fn url_segment(self) -> &'static str {
        match self {
            ProjectOwnerKind::Organization => "orgs",
            ProjectOwnerKind::User => "users",
        }
    }
}

/// One project board linked to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetail {
    /// GraphQL node id of the project (`PVT_...`).
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ProjectOwnerKind,
    pub owner: String,
    #[serde(default)]
    pub url: String,
    pub number: u64,
}

impl ProjectDetail {
    /// Browser URL of the board.
    ///
    /// The API-provided `url` is used as-is when it is an `https://` URL;
    /// otherwise the URL is rebuilt from the owner kind, owner and number.
    pub fn public_url(&self) -> String {
        if self.url.starts_with("https://") {
            return self.url.clone();
        }
        format!(
            "https://github.com/{}/{}/projects/{}",
            self.kind.url_segment(),
            self.owner,
            self.number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(kind: ProjectOwnerKind, owner: &str, number: u64, url: &str) -> ProjectDetail {
        ProjectDetail {
            id: "PVT_1".into(),
            title: "Board".into(),
            kind,
            owner: owner.into(),
            url: url.into(),
            number,
        }
    }

    #[test]
    fn organization_url_is_synthesized() {
        let p = project(ProjectOwnerKind::Organization, "acme", 1, "");
        assert_eq!(p.public_url(), "https://github.com/orgs/acme/projects/1");
    }

    #[test]
    fn user_url_is_synthesized() {
        let p = project(ProjectOwnerKind::User, "jane", 3, "");
        assert_eq!(p.public_url(), "https://github.com/users/jane/projects/3");
    }

    #[test]
    fn https_url_is_returned_verbatim() {
        let p = project(
            ProjectOwnerKind::User,
            "jane",
            3,
            "https://github.com/orgs/x/projects/9",
        );
        assert_eq!(p.public_url(), "https://github.com/orgs/x/projects/9");
    }

    #[test]
    fn non_https_url_is_ignored() {
        let p = project(ProjectOwnerKind::Organization, "acme", 7, "http://example.com");
        assert_eq!(p.public_url(), "https://github.com/orgs/acme/projects/7");
    }

    #[test]
    fn deserializes_type_field() {
        let json = r#"{"id":"PVT_2","title":"Roadmap","type":"organization","owner":"acme","number":2}"#;
        let p: ProjectDetail = serde_json::from_str(json).unwrap();
        assert_eq!(p.kind, ProjectOwnerKind::Organization);
        assert!(p.url.is_empty());
    }
}
