//! Organization ("entity") resolution for third-party attribution.
//!
//! Known organizations come from a static domain table. Unknown domains get
//! a synthesized placeholder entity cached by root domain, so every request
//! to the same unrecognized domain shares one entity for the registry's
//! lifetime. The registry is an explicit value the orchestrator owns and
//! injects; nothing here is global.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

// ---------------------------------------------------------------------------
// Entity model
// ---------------------------------------------------------------------------

/// Stable handle into one registry's entity arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub usize);

/// Category of an organization, for grouping in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Analytics,
    Advertising,
    Social,
    Cdn,
    FontFoundry,
    TagManager,
    Video,
    Extension,
    Unrecognized,
}

/// One organization owning one or more domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub category: EntityCategory,
    /// Domains the entity is known to own; a placeholder carries only the
    /// root domain (or extension origin) it was synthesized from.
    pub domains: Vec<String>,
    /// True for placeholders synthesized from unrecognized domains.
    pub is_unrecognized: bool,
}

// ---------------------------------------------------------------------------
// Known-entity database
// ---------------------------------------------------------------------------

struct KnownEntity {
    name: &'static str,
    category: EntityCategory,
    domains: &'static [&'static str],
}

const KNOWN_ENTITIES: &[KnownEntity] = &[
    KnownEntity {
        name: "Google Analytics",
        category: EntityCategory::Analytics,
        domains: &["google-analytics.com", "analytics.google.com"],
    },
    KnownEntity {
        name: "Google Tag Manager",
        category: EntityCategory::TagManager,
        domains: &["googletagmanager.com"],
    },
    KnownEntity {
        name: "Google Fonts",
        category: EntityCategory::FontFoundry,
        domains: &["fonts.googleapis.com", "fonts.gstatic.com"],
    },
    KnownEntity {
        name: "Google/Doubleclick Ads",
        category: EntityCategory::Advertising,
        domains: &["doubleclick.net", "googlesyndication.com", "googleadservices.com"],
    },
    KnownEntity {
        name: "Facebook",
        category: EntityCategory::Social,
        domains: &["facebook.com", "facebook.net", "fbcdn.net"],
    },
    KnownEntity {
        name: "YouTube",
        category: EntityCategory::Video,
        domains: &["youtube.com", "ytimg.com", "googlevideo.com"],
    },
    KnownEntity {
        name: "Cloudflare CDN",
        category: EntityCategory::Cdn,
        domains: &["cdnjs.cloudflare.com"],
    },
    KnownEntity {
        name: "jsDelivr CDN",
        category: EntityCategory::Cdn,
        domains: &["jsdelivr.net"],
    },
];

// ---------------------------------------------------------------------------
// Root-domain extraction
// ---------------------------------------------------------------------------

/// Second-level labels that act as public suffixes under a country TLD, so
/// `shop.example.co.uk` reduces to `example.co.uk` rather than `co.uk`.
const SECOND_LEVEL_SUFFIXES: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "org"];

/// Reduce a host to its registrable root domain. IP literals and single-label
/// hosts are returned unchanged.
pub fn root_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host.to_string();
    }
    let take = if labels.len() >= 3 && SECOND_LEVEL_SUFFIXES.contains(&labels[labels.len() - 2]) {
        3
    } else {
        2
    };
    labels[labels.len() - take..].join(".")
}

// ---------------------------------------------------------------------------
// EntityRegistry
// ---------------------------------------------------------------------------

/// Memoizing entity lookup: known domains preloaded, placeholders cached by
/// root domain or extension origin as they are first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    by_domain: BTreeMap<String, EntityId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        let mut registry = Self::default();
        for known in KNOWN_ENTITIES {
            let id = EntityId(registry.entities.len());
            registry.entities.push(Entity {
                name: known.name.to_string(),
                category: known.category,
                domains: known.domains.iter().map(|d| d.to_string()).collect(),
                is_unrecognized: false,
            });
            for domain in known.domains {
                registry.by_domain.insert((*domain).to_string(), id);
            }
        }
        registry
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    /// Snapshot of the arena, index-aligned with the ids handed out so far.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Resolve the organization owning a URL. Known domains match by exact
    /// host first, then by root domain; anything else gets a cached
    /// placeholder. Non-http(s), non-extension URLs resolve to `None`.
    pub fn resolve_url(&mut self, raw_url: &str) -> Option<EntityId> {
        let parsed = Url::parse(raw_url).ok()?;
        match parsed.scheme() {
            "http" | "https" => {
                let host = match parsed.host()? {
                    Host::Domain(domain) => domain.to_string(),
                    Host::Ipv4(addr) => return Some(self.placeholder(addr.to_string())),
                    Host::Ipv6(addr) => return Some(self.placeholder(addr.to_string())),
                };
                if let Some(&id) = self.by_domain.get(&host) {
                    return Some(id);
                }
                let root = root_domain(&host);
                if let Some(&id) = self.by_domain.get(&root) {
                    return Some(id);
                }
                Some(self.placeholder(root))
            }
            "chrome-extension" => {
                let origin = parsed.host_str()?.to_string();
                Some(self.extension_placeholder(origin))
            }
            _ => None,
        }
    }

    fn placeholder(&mut self, root: String) -> EntityId {
        if let Some(&id) = self.by_domain.get(&root) {
            return id;
        }
        let id = EntityId(self.entities.len());
        self.entities.push(Entity {
            name: root.clone(),
            category: EntityCategory::Unrecognized,
            domains: vec![root.clone()],
            is_unrecognized: true,
        });
        self.by_domain.insert(root, id);
        id
    }

    fn extension_placeholder(&mut self, origin: String) -> EntityId {
        if let Some(&id) = self.by_domain.get(&origin) {
            return id;
        }
        let id = EntityId(self.entities.len());
        self.entities.push(Entity {
            name: format!("Chrome Extension: {origin}"),
            category: EntityCategory::Extension,
            domains: vec![origin.clone()],
            is_unrecognized: true,
        });
        self.by_domain.insert(origin, id);
        id
    }
}
