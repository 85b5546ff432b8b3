//! Project type classification.
//!
//! Mirrors the classification the execution backend applies before choosing
//! install/run commands, so the client can decide locally whether a project
//! is a plain static site it can preview without a backend session.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::file_tree::{FileTree, TreeEntry};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ProjectType {
    #[serde(rename = "nextjs")]
    #[strum(serialize = "nextjs")]
    NextJs,
    #[serde(rename = "react-cra")]
    #[strum(serialize = "react-cra")]
    ReactCra,
    #[serde(rename = "vite")]
    #[strum(serialize = "vite")]
    Vite,
    #[serde(rename = "nodejs")]
    #[strum(serialize = "nodejs")]
    NodeJs,
    #[serde(rename = "python")]
    #[strum(serialize = "python")]
    Python,
    #[serde(rename = "simple-web")]
    #[strum(serialize = "simple-web")]
    SimpleWeb,
    #[default]
    #[serde(rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl ProjectType {
    /// Parses a backend-provided name; unrecognized names map to `Unknown`.
    pub fn from_wire(name: &str) -> Self {
        name.parse().unwrap_or(Self::Unknown)
    }

    /// Whether the project runs a dev server that should get a preview pane.
    pub fn serves_http(&self) -> bool {
        !matches!(self, Self::Python | Self::Unknown)
    }
}

/// JavaScript frameworks in detection precedence order.
const JS_FRAMEWORKS: [(&str, ProjectType); 3] = [
    ("next", ProjectType::NextJs),
    ("react-scripts", ProjectType::ReactCra),
    ("vite", ProjectType::Vite),
];

/// Classifies a project from its file tree.
pub fn detect_project_type(tree: &FileTree) -> ProjectType {
    let files = tree.files();

    if let Some(detected) = content_of(&files, "package.json").and_then(from_package_json) {
        return detected;
    }
    if let Some(detected) = content_of(&files, "package-lock.json").and_then(from_package_lock) {
        return detected;
    }

    if files
        .iter()
        .any(|e| e.node.name == "requirements.txt" || e.node.name.ends_with(".py"))
    {
        return ProjectType::Python;
    }
    if files.iter().any(|e| e.node.name == "index.html") {
        return ProjectType::SimpleWeb;
    }

    ProjectType::Unknown
}

/// Content of the last non-empty file named `name`, in pre-order.
fn content_of<'a>(files: &[TreeEntry<'a>], name: &str) -> Option<&'a str> {
    files
        .iter()
        .rev()
        .filter(|e| e.node.name == name)
        .find_map(|e| e.node.content.as_deref().filter(|c| !c.is_empty()))
}

fn from_package_json(content: &str) -> Option<ProjectType> {
    let pkg: Value = serde_json::from_str(content).ok()?;
    let has_dep = |name: &str| {
        ["dependencies", "devDependencies"]
            .iter()
            .any(|section| pkg.get(section).and_then(|d| d.get(name)).is_some())
    };

    Some(framework_or_node(has_dep))
}

fn from_package_lock(content: &str) -> Option<ProjectType> {
    let lock: Value = serde_json::from_str(content).ok()?;
    let packages = lock.get("packages");
    let root_deps = packages
        .and_then(|p| p.get(""))
        .and_then(|root| root.get("dependencies"));

    if let Some(found) = JS_FRAMEWORKS
        .iter()
        .find(|(name, _)| root_deps.and_then(|d| d.get(*name)).is_some())
    {
        return Some(found.1);
    }

    let package_keys: Vec<&String> = packages
        .and_then(Value::as_object)
        .map(|map| map.keys().collect())
        .unwrap_or_default();

    Some(framework_or_node(|name| {
        let needle = format!("node_modules/{}", name);
        package_keys.iter().any(|key| key.contains(&needle))
    }))
}

fn framework_or_node(has_dep: impl Fn(&str) -> bool) -> ProjectType {
    JS_FRAMEWORKS
        .iter()
        .find(|(name, _)| has_dep(*name))
        .map(|(_, kind)| *kind)
        .unwrap_or(ProjectType::NodeJs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_tree::FileNode;

    fn tree(nodes: Vec<FileNode>) -> FileTree {
        FileTree::new(nodes)
    }

    #[test]
    fn test_next_from_package_json() {
        let t = tree(vec![FileNode::file(
            "package.json",
            r#"{"dependencies":{"next":"14.0.0","react":"18"}}"#,
        )]);
        assert_eq!(detect_project_type(&t), ProjectType::NextJs);
    }

    #[test]
    fn test_vite_from_dev_dependencies() {
        let t = tree(vec![FileNode::folder(
            "app",
            vec![FileNode::file("package.json", r#"{"devDependencies":{"vite":"5"}}"#)],
        )]);
        assert_eq!(detect_project_type(&t), ProjectType::Vite);
    }

    #[test]
    fn test_last_package_json_wins() {
        let t = tree(vec![
            FileNode::folder(
                "client",
                vec![FileNode::file("package.json", r#"{"dependencies":{"vite":"5"}}"#)],
            ),
            FileNode::folder(
                "server",
                vec![
                    FileNode::file("package.json", r#"{"dependencies":{"next":"14"}}"#),
                    FileNode::folder("empty", vec![FileNode::file("package.json", "")]),
                ],
            ),
        ]);
        assert_eq!(detect_project_type(&t), ProjectType::NextJs);
    }

    #[test]
    fn test_plain_node() {
        let t = tree(vec![FileNode::file("package.json", r#"{"name":"server"}"#)]);
        assert_eq!(detect_project_type(&t), ProjectType::NodeJs);
    }

    #[test]
    fn test_package_lock_fallback() {
        let lock = r#"{"packages":{"":{"name":"x"},"node_modules/react-scripts":{}}}"#;
        let t = tree(vec![
            FileNode::file("package.json", "{ not json"),
            FileNode::file("package-lock.json", lock),
        ]);
        assert_eq!(detect_project_type(&t), ProjectType::ReactCra);
    }

    #[test]
    fn test_python_and_simple_web() {
        let py = tree(vec![FileNode::folder("src", vec![FileNode::file("main.py", "")])]);
        assert_eq!(detect_project_type(&py), ProjectType::Python);

        let web = tree(vec![FileNode::file("index.html", "<h1>hi</h1>")]);
        assert_eq!(detect_project_type(&web), ProjectType::SimpleWeb);

        assert_eq!(detect_project_type(&tree(vec![])), ProjectType::Unknown);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(ProjectType::from_wire("react-cra"), ProjectType::ReactCra);
        assert_eq!(ProjectType::from_wire("cobol"), ProjectType::Unknown);
        assert_eq!(ProjectType::SimpleWeb.to_string(), "simple-web");
        let json = serde_json::to_string(&ProjectType::NextJs).unwrap();
        assert_eq!(json, "\"nextjs\"");
    }
}
