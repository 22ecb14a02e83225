//! Components v2 tree model.
//!
//! Payloads are decoded into [`RawComponent`] with serde and then folded into the
//! closed [`ComponentNode`] enum. Any tag outside the known set becomes
//! [`ComponentNode::Unknown`] so traversal never has to inspect raw JSON.

use serde::Deserialize;

use super::errors::PayloadError;

/// Known component type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    ActionRow,
    Button,
    SelectMenu,
    TextInput,
    TextDisplay,
    MediaGallery,
    File,
    Separator,
    Container,
    Section,
    Thumbnail,
    ComponentsV2Root,
}

impl ComponentKind {
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            1 => Some(Self::ActionRow),
            2 => Some(Self::Button),
            3 => Some(Self::SelectMenu),
            4 => Some(Self::TextInput),
            10 => Some(Self::TextDisplay),
            11 => Some(Self::MediaGallery),
            12 => Some(Self::File),
            13 => Some(Self::Separator),
            14 => Some(Self::Container),
            15 => Some(Self::Section),
            16 => Some(Self::Thumbnail),
            17 => Some(Self::ComponentsV2Root),
            _ => None,
        }
    }

    pub fn tag(self) -> i64 {
        match self {
            Self::ActionRow => 1,
            Self::Button => 2,
            Self::SelectMenu => 3,
            Self::TextInput => 4,
            Self::TextDisplay => 10,
            Self::MediaGallery => 11,
            Self::File => 12,
            Self::Separator => 13,
            Self::Container => 14,
            Self::Section => 15,
            Self::Thumbnail => 16,
            Self::ComponentsV2Root => 17,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ActionRow => "ActionRow",
            Self::Button => "Button",
            Self::SelectMenu => "SelectMenu",
            Self::TextInput => "TextInput",
            Self::TextDisplay => "TextDisplay",
            Self::MediaGallery => "MediaGallery",
            Self::File => "File",
            Self::Separator => "Separator",
            Self::Container => "Container",
            Self::Section => "Section",
            Self::Thumbnail => "Thumbnail",
            Self::ComponentsV2Root => "ComponentsV2Root",
        }
    }
}

/// Wire shape of a single component, as stored in `components_payload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComponent {
    #[serde(rename = "type", default)]
    pub kind: i64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub items: Vec<RawMediaItem>,
    #[serde(default)]
    pub components: Vec<RawComponent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMediaItem {
    #[serde(default)]
    pub media: Option<RawMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMedia {
    #[serde(default)]
    pub url: Option<String>,
}

/// A decoded component. Containers own their children; there is no sharing.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentNode {
    /// ActionRow, Container, Section or the v2 root.
    Container {
        kind: ComponentKind,
        children: Vec<ComponentNode>,
    },
    Button {
        label: Option<String>,
        url: Option<String>,
    },
    SelectMenu {
        placeholder: Option<String>,
    },
    TextDisplay {
        content: String,
    },
    MediaGallery {
        urls: Vec<String>,
    },
    File {
        url: Option<String>,
    },
    /// Known kinds that carry nothing we extract (TextInput, Separator, Thumbnail).
    Inert(ComponentKind),
    Unknown(i64),
}

impl ComponentNode {
    /// Decodes a `components_payload` JSON list.
    pub fn parse_list(payload: &str) -> Result<Vec<ComponentNode>, PayloadError> {
        let raw: Vec<RawComponent> = serde_json::from_str(payload)
            .map_err(|e| PayloadError::Components(e.to_string()))?;
        Ok(raw.into_iter().map(ComponentNode::from_raw).collect())
    }

    pub fn from_raw(raw: RawComponent) -> Self {
        let kind = match ComponentKind::from_tag(raw.kind) {
            Some(kind) => kind,
            None => return ComponentNode::Unknown(raw.kind),
        };

        match kind {
            ComponentKind::ActionRow
            | ComponentKind::Container
            | ComponentKind::Section
            | ComponentKind::ComponentsV2Root => ComponentNode::Container {
                kind,
                children: raw.components.into_iter().map(Self::from_raw).collect(),
            },
            ComponentKind::Button => ComponentNode::Button {
                label: raw.label,
                url: raw.url.filter(|u| !u.is_empty()),
            },
            ComponentKind::SelectMenu => ComponentNode::SelectMenu {
                placeholder: raw.placeholder,
            },
            ComponentKind::TextDisplay => ComponentNode::TextDisplay {
                content: raw
                    .content
                    .filter(|c| !c.is_empty())
                    .or(raw.text)
                    .unwrap_or_default(),
            },
            ComponentKind::MediaGallery => ComponentNode::MediaGallery {
                urls: raw
                    .items
                    .into_iter()
                    .filter_map(|item| item.media.and_then(|m| m.url))
                    .filter(|u| !u.is_empty())
                    .collect(),
            },
            ComponentKind::File => ComponentNode::File { url: raw.url },
            ComponentKind::TextInput | ComponentKind::Separator | ComponentKind::Thumbnail => {
                ComponentNode::Inert(kind)
            }
        }
    }

    /// Display name used in layout traces and the component type list.
    pub fn type_name(&self) -> String {
        match self {
            ComponentNode::Container { kind, .. } => kind.name().to_string(),
            ComponentNode::Button { .. } => ComponentKind::Button.name().to_string(),
            ComponentNode::SelectMenu { .. } => ComponentKind::SelectMenu.name().to_string(),
            ComponentNode::TextDisplay { .. } => ComponentKind::TextDisplay.name().to_string(),
            ComponentNode::MediaGallery { .. } => ComponentKind::MediaGallery.name().to_string(),
            ComponentNode::File { .. } => ComponentKind::File.name().to_string(),
            ComponentNode::Inert(kind) => kind.name().to_string(),
            ComponentNode::Unknown(tag) => format!("Unknown({})", tag),
        }
    }
}
