//! Travel knowledge search tool.
//!
//! `search_tokyo_info` ranks snippets from a local knowledge index by
//! keyword relevance. Vector embeddings are deliberately out of scope —
//! the index is a drop-in seam where a real vector store client could go.
//!
//! Failure contract: the tool never errors upward. An empty result set or
//! an index failure becomes descriptive text that the model reads as
//! "no results".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use annai_core::error::ToolError;
use annai_core::tool::{Tool, ToolResult};

/// One entry in the travel knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub title: String,
    pub content: String,
    pub area: String,
    pub category: String,
}

/// A keyword-scored index over knowledge entries.
pub struct KnowledgeIndex {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeIndex {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Load entries from a JSON file (an array of entries).
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        debug!(path = %path.display(), count = entries.len(), "Knowledge index loaded");
        Ok(Self::new(entries))
    }

    /// The built-in Tokyo attraction set, used when no file is configured.
    pub fn builtin() -> Self {
        Self::new(builtin_entries())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `top_k` most relevant entries for a query, best first.
    ///
    /// Scoring: occurrences of each query word across title, content, area
    /// and category, normalized by entry length so long entries don't win
    /// by volume alone.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<KnowledgeEntry> {
        let words: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.len() > 2)
            .map(String::from)
            .collect();

        if words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &KnowledgeEntry)> = self
            .entries
            .iter()
            .filter_map(|e| {
                let haystack = format!(
                    "{} {} {} {}",
                    e.title.to_lowercase(),
                    e.content.to_lowercase(),
                    e.area.to_lowercase(),
                    e.category.to_lowercase()
                );
                let occurrences: usize = words.iter().map(|w| haystack.matches(w.as_str()).count()).sum();
                if occurrences == 0 {
                    return None;
                }
                let score = occurrences as f32 / (haystack.len() as f32 / 100.0).max(1.0);
                Some((score, e))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

/// The `search_tokyo_info` tool.
pub struct SearchTokyoInfoTool {
    index: KnowledgeIndex,
    top_k: usize,
}

impl SearchTokyoInfoTool {
    pub fn new(index: KnowledgeIndex, top_k: usize) -> Self {
        Self { index, top_k }
    }
}

#[async_trait]
impl Tool for SearchTokyoInfoTool {
    fn name(&self) -> &str {
        "search_tokyo_info"
    }

    fn description(&self) -> &str {
        "Search for information about Tokyo temples, shrines, views, neighborhoods, and attractions"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query for Tokyo attractions (e.g. 'temples in Asakusa', 'best views')"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let results = self.index.search(query, self.top_k);

        let output = if results.is_empty() {
            "No travel information found for this query.".to_string()
        } else {
            results
                .iter()
                .map(|r| {
                    format!(
                        "• {}\n  {}\n  Location: {} | Category: {}\n",
                        r.title, r.content, r.area, r.category
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        Ok(ToolResult {
            call_id: String::new(),
            output,
        })
    }
}

fn builtin_entries() -> Vec<KnowledgeEntry> {
    let entry = |title: &str, content: &str, area: &str, category: &str| KnowledgeEntry {
        title: title.into(),
        content: content.into(),
        area: area.into(),
        category: category.into(),
    };

    vec![
        entry(
            "Senso-ji Temple",
            "Tokyo's oldest temple, founded in 645. The approach through Kaminarimon gate and the Nakamise shopping street is a classic first stop. Free to enter, busiest mid-morning.",
            "Asakusa",
            "temple",
        ),
        entry(
            "Asakusa Shrine",
            "A Shinto shrine next to Senso-ji honoring the temple's founders. Far quieter than its neighbor and one of the few structures in the area to survive the war.",
            "Asakusa",
            "shrine",
        ),
        entry(
            "Meiji Jingu",
            "A forested Shinto shrine dedicated to Emperor Meiji, minutes from Harajuku station. The gravel approach under towering torii gates feels removed from the city.",
            "Shibuya",
            "shrine",
        ),
        entry(
            "Tokyo Skytree",
            "At 634 meters the tallest structure in Japan, with two observation decks. On clear winter days you can see Mount Fuji from the upper deck.",
            "Sumida",
            "view",
        ),
        entry(
            "Shibuya Crossing",
            "The famous scramble crossing outside Shibuya station. Best viewed from the Shibuya Sky deck or the second floor of the station building at dusk.",
            "Shibuya",
            "view",
        ),
        entry(
            "Ueno Park",
            "A large public park holding several national museums, a zoo, and Shinobazu pond. One of Tokyo's most popular cherry blossom spots in early April.",
            "Ueno",
            "park",
        ),
        entry(
            "Shinjuku Gyoen",
            "A spacious landscape garden blending Japanese, French, and English styles. Paid entry keeps it calm even on weekends.",
            "Shinjuku",
            "park",
        ),
        entry(
            "Tsukiji Outer Market",
            "The retail market that remained after the wholesale fish auction moved to Toyosu. Dense rows of food stalls; go early and hungry.",
            "Chuo",
            "food",
        ),
        entry(
            "Yanaka",
            "An old shitamachi neighborhood that escaped both the 1923 earthquake and the war. Temple-lined lanes, small galleries, and the Yanaka Ginza shopping street.",
            "Taito",
            "neighborhood",
        ),
        entry(
            "Tokyo National Museum",
            "The oldest and largest museum in Japan, holding the world's biggest collection of Japanese art, inside Ueno Park.",
            "Ueno",
            "museum",
        ),
    ]
}
