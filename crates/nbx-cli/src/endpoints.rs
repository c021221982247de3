//! Declarative table of the NetBox DCIM endpoints the CLI talks to.
//!
//! Resource path fragments live here, in one place, rather than being spread
//! through the command handlers as string literals.

use anyhow::anyhow;
use reqwest::Url;

use crate::client::{CliError, CliResult};

/// One NetBox collection endpoint plus the nouns used when rendering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Endpoint {
    /// Path fragment under `/api/`, without leading or trailing slash.
    pub(crate) path: &'static str,
    /// Singular noun for messages ("region").
    pub(crate) singular: &'static str,
    /// Plural noun for messages ("regions").
    pub(crate) plural: &'static str,
}

pub(crate) const REGIONS: Endpoint = Endpoint {
    path: "dcim/regions",
    singular: "region",
    plural: "regions",
};

pub(crate) const SITE_GROUPS: Endpoint = Endpoint {
    path: "dcim/site-groups",
    singular: "site group",
    plural: "site groups",
};

pub(crate) const SITES: Endpoint = Endpoint {
    path: "dcim/sites",
    singular: "site",
    plural: "sites",
};

pub(crate) const LOCATIONS: Endpoint = Endpoint {
    path: "dcim/locations",
    singular: "location",
    plural: "locations",
};

pub(crate) const RACKS: Endpoint = Endpoint {
    path: "dcim/racks",
    singular: "rack",
    plural: "racks",
};

pub(crate) const MANUFACTURERS: Endpoint = Endpoint {
    path: "dcim/manufacturers",
    singular: "manufacturer",
    plural: "manufacturers",
};

pub(crate) const DEVICE_ROLES: Endpoint = Endpoint {
    path: "dcim/device-roles",
    singular: "device role",
    plural: "device roles",
};

pub(crate) const DEVICES: Endpoint = Endpoint {
    path: "dcim/devices",
    singular: "device",
    plural: "devices",
};

impl Endpoint {
    /// URL of the collection, e.g. `https://host/api/dcim/regions/`.
    pub(crate) fn collection_url(&self, base: &Url) -> CliResult<Url> {
        base.join(&format!("/api/{}/", self.path))
            .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))
    }

    /// URL of a single object, e.g. `https://host/api/dcim/regions/7/`.
    pub(crate) fn object_url(&self, base: &Url, id: u64) -> CliResult<Url> {
        base.join(&format!("/api/{}/{id}/", self.path))
            .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))
    }

    /// Noun matching the count, for user-facing messages.
    pub(crate) const fn noun(&self, count: u64) -> &'static str {
        if count == 1 { self.singular } else { self.plural }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_joins_against_base() {
        let base: Url = "https://netbox.example.net".parse().expect("valid URL");
        let url = REGIONS.collection_url(&base).expect("join");
        assert_eq!(url.as_str(), "https://netbox.example.net/api/dcim/regions/");
    }

    #[test]
    fn object_url_appends_numeric_id() {
        let base: Url = "http://127.0.0.1:8000".parse().expect("valid URL");
        let url = SITE_GROUPS.object_url(&base, 42).expect("join");
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/dcim/site-groups/42/");
    }

    #[test]
    fn noun_pluralizes_on_count() {
        assert_eq!(SITES.noun(1), "site");
        assert_eq!(SITES.noun(0), "sites");
        assert_eq!(SITES.noun(7), "sites");
    }
}
