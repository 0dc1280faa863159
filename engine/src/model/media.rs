use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Content type tag carried next to an opaque media handle.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub enum MediaContentType {
    Image,
    Video,
    Audio,
    Model3D,
    Json,
    #[default]
    Unknown,
}

/// Reference to a media object owned by some media provider.
///
/// `source` is the document-level media id (what the user imported) and
/// keys the loaded-media cache; `id` is the handle of this object.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MediaRef {
    pub id: Uuid,
    pub source: Uuid,
    pub content_type: MediaContentType,
}

impl MediaRef {
    /// A reference to imported (not computed) media.
    pub fn imported(source: Uuid, content_type: MediaContentType) -> Self {
        Self {
            id: source,
            source,
            content_type,
        }
    }
}
