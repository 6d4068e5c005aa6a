use serde::{Deserialize, Serialize};

/// A locally installed model. Only the name is read from the richer server metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
}

/// Body of the tags endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub models: Option<Vec<ModelDescriptor>>,
}

impl ModelList {
    /// Model names in server order; empty when the server lists none.
    pub fn into_names(self) -> Vec<String> {
        self.models
            .unwrap_or_default()
            .into_iter()
            .map(|model| model.name)
            .collect()
    }
}
