//! Keyword-table topic classifier for article titles.

/// Topic table, in display order. A topic matches when any of its keywords
/// appears as a substring of the lowercased title. Order matters: tags are
/// collected in declaration order, not relevance order.
pub const TAG_TABLE: &[(&str, &[&str])] = &[
    ("javascript", &["javascript", "js", "node", "npm", "v8", "bun"]),
    ("python", &["python", "pip", "django", "flask", "pytorch"]),
    (
        "ai/ml",
        &[
            "ai",
            "llm",
            "gpt",
            "claude",
            "gemini",
            "machine learning",
            "openai",
            "anthropic",
        ],
    ),
    ("rust", &["rust", "cargo"]),
    ("typescript", &["typescript"]),
    ("react", &["react", "nextjs", "next.js", "jsx"]),
    // Trailing space avoids matching e.g. "google"
    ("go", &["golang", "go "]),
    ("docker", &["docker", "container", "kubernetes", "k8s"]),
    ("security", &["security", "vulnerability", "exploit", "cve"]),
    ("cloud", &["aws", "azure", "gcp", "serverless"]),
    ("open source", &["open source", "opensource", "github"]),
    ("web", &["web", "browser", "css", "html", "frontend", "backend"]),
];

pub const MAX_TAGS: usize = 3;

/// Classify a title into at most [`MAX_TAGS`] topic labels.
pub fn extract_tags(title: &str) -> Vec<String> {
    let lower = title.to_lowercase();
    TAG_TABLE
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| topic.to_string())
        .take(MAX_TAGS)
        .collect()
}

/// All configured topic labels, in table order.
pub fn all_topics() -> Vec<&'static str> {
    TAG_TABLE.iter().map(|(topic, _)| *topic).collect()
}
