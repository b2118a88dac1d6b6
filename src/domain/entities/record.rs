use serde::{Deserialize, Serialize};

/// Descriptive fields stored next to a record's document.
///
/// Both fields are written on ingestion but treated as optional on read, so
/// records inserted by other tools still come back with whatever they carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub embedding: Vec<f32>,
    pub content: String,
    pub metadata: Metadata,
}

impl Record {
    pub fn new(id: String, embedding: Vec<f32>, content: String, title: String, link: String) -> Self {
        Self {
            id,
            embedding,
            content,
            metadata: Metadata {
                title: Some(title),
                link: Some(link),
            },
        }
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }
}

/// One item of an ingestion batch, exactly as it appears in the input file.
///
/// `embedding`, `content`, `title` and `link` are required: a missing one
/// fails deserialization of the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedArticle {
    /// Explicit record id. Falls back to the item's position in the batch.
    #[serde(default)]
    pub id: Option<String>,
    pub embedding: Vec<f32>,
    pub content: String,
    pub title: String,
    pub link: String,
}

impl EmbeddedArticle {
    pub fn into_record(self, index: usize) -> Record {
        let id = self.id.unwrap_or_else(|| index.to_string());
        Record::new(id, self.embedding, self.content, self.title, self.link)
    }
}
