pub(crate) mod insert;
pub(crate) mod list;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReference {
    /// Dataset name without the project prefix.
    pub dataset_id: String,
    /// Defaults to the project in the request path when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Dataset resource as sent to `datasets.insert`. Output-only fields are never serialized
/// when empty so a create body carries just what the caller set.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub dataset_reference: DatasetReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// e.g. `US`, `EU`, `asia-northeast1`. The service picks its default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
