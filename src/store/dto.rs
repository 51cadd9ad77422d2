use serde::Deserialize;

/// Body of `GET /repos/{owner}/{repo}/contents/{path}`: an array for a
/// directory, a single object for anything else.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentsResponse {
    Directory(Vec<ContentItem>),
    Single(ContentItem),
}

#[derive(Debug, Deserialize)]
pub struct ContentItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
