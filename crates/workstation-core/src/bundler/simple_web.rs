//! Simple-web bundler.
//!
//! Produces a single HTML document from a project tree by inlining the
//! stylesheets and scripts its entry page references.
//!
//! Asset resolution order for an `href`/`src` reference:
//! 1. external references (`http:`, `https:`, `//`, `data:`) are left as-is
//! 2. the reference as a path relative to the HTML file's folder
//!    (`./` and `../` are normalized, a leading `/` means the project root)
//! 3. the first file anywhere in the tree with the reference's basename
//!
//! Query strings and fragments are ignored for matching. A tag whose asset
//! cannot be found is left untouched.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::file_tree::{FileTree, TreeEntry, path};

pub const DEFAULT_ENTRYPOINT: &str = "index.html";

/// Returned when the tree contains no HTML file at all.
pub const NO_HTML_PLACEHOLDER: &str = "<!DOCTYPE html>\n<html>\n<head><title>Preview</title></head>\n<body style=\"font-family: sans-serif; padding: 2rem;\">\n<h1>No HTML file found</h1>\n<p>Create an index.html file to preview your project.</p>\n</body>\n</html>\n";

static LINK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<link\b[^>]*>").expect("valid link regex"));
static SCRIPT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>\s*</script>").expect("valid script regex")
});
static HREF_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*["']([^"']+)["']"#).expect("valid href regex")
});
static SRC_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid src regex"));
static REL_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\brel\s*=\s*["']([^"']*)["']"#).expect("valid rel regex"));
static MODULE_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\btype\s*=\s*["']module["']"#).expect("valid type regex")
});

const STYLE_EXTENSIONS: &[&str] = &["css"];
const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs"];

/// Builds a self-contained HTML document for preview.
///
/// `entrypoint` defaults to `index.html`. It is looked up by name anywhere in
/// the tree (first match in pre-order); failing that, the first `.html` file
/// is used; failing that, [`NO_HTML_PLACEHOLDER`] is returned.
pub fn build(files: &FileTree, entrypoint: Option<&str>) -> String {
    let entrypoint = entrypoint.unwrap_or(DEFAULT_ENTRYPOINT);
    let Some(entry) = find_entry(files, entrypoint) else {
        return NO_HTML_PLACEHOLDER.to_string();
    };

    let base_dir = path::parent_path(&entry.path);
    let html = entry.node.content_or_empty();

    let html = LINK_TAG.replace_all(html, |caps: &Captures| {
        let tag = &caps[0];
        let is_stylesheet = REL_ATTR
            .captures(tag)
            .map(|rel| rel[1].eq_ignore_ascii_case("stylesheet"))
            .unwrap_or(true);
        let inlined = is_stylesheet
            .then(|| HREF_ATTR.captures(tag))
            .flatten()
            .and_then(|href| resolve_asset(files, &base_dir, &href[1], STYLE_EXTENSIONS))
            .map(|css| format!("<style>\n{}\n</style>", css));
        inlined.unwrap_or_else(|| tag.to_string())
    });

    let html = SCRIPT_TAG.replace_all(&html, |caps: &Captures| {
        let attrs = &caps[1];
        let inlined = SRC_ATTR
            .captures(attrs)
            .and_then(|src| resolve_asset(files, &base_dir, &src[1], SCRIPT_EXTENSIONS))
            .map(|js| {
                let open = if MODULE_TYPE.is_match(attrs) {
                    "<script type=\"module\">"
                } else {
                    "<script>"
                };
                format!("{}\n{}\n</script>", open, js)
            });
        inlined.unwrap_or_else(|| caps[0].to_string())
    });

    html.into_owned()
}

fn find_entry<'a>(files: &'a FileTree, entrypoint: &str) -> Option<TreeEntry<'a>> {
    files
        .find_by_name(entrypoint)
        .filter(|e| e.node.is_file())
        .or_else(|| {
            files
                .files()
                .into_iter()
                .find(|e| e.node.name.to_ascii_lowercase().ends_with(".html"))
        })
}

fn is_external(reference: &str) -> bool {
    let lower = reference.to_ascii_lowercase();
    ["http:", "https:", "//", "data:"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn resolve_asset<'a>(
    files: &'a FileTree,
    base_dir: &str,
    reference: &str,
    extensions: &[&str],
) -> Option<&'a str> {
    if is_external(reference) {
        return None;
    }
    let reference = reference.split(['?', '#']).next().unwrap_or_default();
    let accepts = |entry: &TreeEntry<'_>| {
        entry.node.is_file()
            && entry
                .node
                .extension()
                .is_some_and(|ext| extensions.contains(&ext.as_str()))
    };

    let relative = join_relative(base_dir, reference);
    let by_path = files
        .files()
        .into_iter()
        .find(|e| e.path == relative && accepts(e));
    if let Some(found) = by_path {
        return Some(found.node.content_or_empty());
    }

    let basename = path::file_name(reference)?;
    files
        .files()
        .into_iter()
        .find(|e| e.node.name == basename && accepts(e))
        .map(|e| e.node.content_or_empty())
}

fn join_relative(base_dir: &str, reference: &str) -> String {
    let mut segments = if reference.starts_with('/') {
        Vec::new()
    } else {
        path::decode(base_dir)
    };
    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    path::encode(&segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_tree::FileNode;

    const PAGE: &str = r#"<html><head><link rel="stylesheet" href="style.css"></head><body><script src="script.js"></script></body></html>"#;

    #[test]
    fn test_inlines_css_and_js() {
        let tree = FileTree::new(vec![
            FileNode::file("index.html", PAGE),
            FileNode::file("style.css", "body { color: red; }"),
            FileNode::file("script.js", "console.log('hi');"),
        ]);

        let html = build(&tree, None);
        assert!(!html.contains("<link"));
        assert!(!html.contains("src=\"script.js\""));
        assert!(html.contains("<style>\nbody { color: red; }\n</style>"));
        assert!(html.contains("<script>\nconsole.log('hi');\n</script>"));
    }

    #[test]
    fn test_link_without_rel_is_inlined() {
        let tree = FileTree::new(vec![
            FileNode::file("index.html", r#"<link href="style.css"><p>x</p>"#),
            FileNode::file("style.css", "p{}"),
        ]);
        let html = build(&tree, None);
        assert_eq!(html, "<style>\np{}\n</style><p>x</p>");
    }

    #[test]
    fn test_non_stylesheet_links_untouched() {
        let page = r#"<link rel="icon" href="favicon.css">"#;
        let tree = FileTree::new(vec![
            FileNode::file("index.html", page),
            FileNode::file("favicon.css", "x"),
        ]);
        assert_eq!(build(&tree, None), page);
    }

    #[test]
    fn test_relative_path_wins_over_basename() {
        let tree = FileTree::new(vec![
            FileNode::folder("other", vec![FileNode::file("app.js", "wrong()")]),
            FileNode::folder(
                "site",
                vec![
                    FileNode::file("index.html", r#"<script src="./js/app.js"></script>"#),
                    FileNode::folder("js", vec![FileNode::file("app.js", "right()")]),
                ],
            ),
        ]);
        let html = build(&tree, None);
        assert!(html.contains("right()"));
        assert!(!html.contains("wrong()"));
    }

    #[test]
    fn test_basename_fallback_and_parent_dirs() {
        let tree = FileTree::new(vec![
            FileNode::folder(
                "pages",
                vec![FileNode::file(
                    "index.html",
                    r#"<link rel="stylesheet" href="../css/main.css?v=2"><script src="lib/missing/util.js"></script>"#,
                )],
            ),
            FileNode::folder("css", vec![FileNode::file("main.css", "main{}")]),
            FileNode::folder("vendor", vec![FileNode::file("util.js", "util()")]),
        ]);
        let html = build(&tree, None);
        assert!(html.contains("main{}"));
        assert!(html.contains("util()"));
    }

    #[test]
    fn test_external_and_missing_assets_untouched() {
        let page = r#"<script src="https://cdn.example.com/app.js"></script><script src="nope.js"></script>"#;
        let tree = FileTree::new(vec![
            FileNode::file("index.html", page),
            FileNode::file("app.js", "local()"),
        ]);
        assert_eq!(build(&tree, None), page);
    }

    #[test]
    fn test_module_scripts_keep_type() {
        let tree = FileTree::new(vec![
            FileNode::file("index.html", r#"<script type="module" src="main.js"></script>"#),
            FileNode::file("main.js", "import x from './x.js';"),
        ]);
        assert!(build(&tree, None).starts_with("<script type=\"module\">\nimport x"));
    }

    #[test]
    fn test_entrypoint_fallback_to_first_html() {
        let tree = FileTree::new(vec![FileNode::folder(
            "public",
            vec![FileNode::file("about.html", "<h1>About</h1>")],
        )]);
        assert_eq!(build(&tree, None), "<h1>About</h1>");
        assert_eq!(build(&tree, Some("about.html")), "<h1>About</h1>");
    }

    #[test]
    fn test_named_entrypoint() {
        let tree = FileTree::new(vec![
            FileNode::file("index.html", "home"),
            FileNode::file("demo.html", "demo"),
        ]);
        assert_eq!(build(&tree, Some("demo.html")), "demo");
    }

    #[test]
    fn test_no_html_placeholder() {
        let tree = FileTree::new(vec![FileNode::file("main.py", "print(1)")]);
        assert_eq!(build(&tree, Some("index.html")), NO_HTML_PLACEHOLDER);
        assert!(NO_HTML_PLACEHOLDER.contains("No HTML file found"));
    }

    #[test]
    fn test_dollar_signs_in_assets_are_literal() {
        let tree = FileTree::new(vec![
            FileNode::file("index.html", r#"<script src="a.js"></script>"#),
            FileNode::file("a.js", "const price = `$1 ${x}`;"),
        ]);
        assert!(build(&tree, None).contains("const price = `$1 ${x}`;"));
    }
}
