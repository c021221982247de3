#![forbid(unsafe_code)]
#![deny(
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    unused_must_use
)]

//! Serde models mirroring the NetBox DCIM REST API wire schema.
//!
//! These types are pure data-transfer shapes: constructed by decoding one
//! HTTP response, read once for rendering, then discarded. Every field
//! beyond `id` is optional or defaulted because NetBox omits or nulls
//! attributes freely depending on version and serializer depth.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The NetBox list envelope returned by every collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paged<T> {
    /// Total number of objects matching the query, across all pages.
    pub count: u64,
    /// URL of the next page, when more results remain.
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, when not on the first page.
    #[serde(default)]
    pub previous: Option<String>,
    /// The objects on this page.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Field group shared by every NetBox object, embedded via `serde(flatten)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Numeric primary key.
    pub id: u64,
    /// Canonical API URL of the object.
    #[serde(default)]
    pub url: Option<String>,
    /// Human-readable display label computed by the server.
    #[serde(default)]
    pub display: Option<String>,
}

/// Name + slug group shared by slugged organizational resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Named {
    /// Display name.
    pub name: String,
    /// URL-safe unique shorthand.
    pub slug: String,
}

/// Brief reference to a related object, as nested inside other records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NestedRef {
    /// Numeric primary key of the referenced object.
    pub id: u64,
    /// Canonical API URL of the referenced object.
    #[serde(default)]
    pub url: Option<String>,
    /// Display label of the referenced object.
    #[serde(default)]
    pub display: Option<String>,
    /// Name, when the referenced type carries one.
    #[serde(default)]
    pub name: Option<String>,
    /// Slug, when the referenced type carries one.
    #[serde(default)]
    pub slug: Option<String>,
}

/// A NetBox choice field rendered as a machine value plus display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelValue {
    /// Machine-readable choice value (e.g. `active`).
    pub value: String,
    /// Human-readable label (e.g. `Active`).
    pub label: String,
}

/// Tag attached to an object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Numeric primary key.
    pub id: u64,
    /// Canonical API URL of the tag.
    #[serde(default)]
    pub url: Option<String>,
    /// Display label of the tag.
    #[serde(default)]
    pub display: Option<String>,
    /// Tag name.
    pub name: String,
    /// Tag slug.
    pub slug: String,
    /// Six-digit hex color assigned in NetBox.
    #[serde(default)]
    pub color: Option<String>,
}

/// Creation/update timestamps shared by most records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Timestamps {
    /// When the object was created.
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    /// When the object was last modified.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A region in the DCIM hierarchy (`/api/dcim/regions/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Region {
    /// Shared id/url/display group.
    #[serde(flatten)]
    pub header: ObjectHeader,
    /// Shared name/slug group.
    #[serde(flatten)]
    pub named: Named,
    /// Parent region, for nested hierarchies.
    #[serde(default)]
    pub parent: Option<NestedRef>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Number of sites directly within this region.
    #[serde(default)]
    pub site_count: Option<u64>,
    /// Nesting depth annotation emitted by list endpoints.
    #[serde(default, rename = "_depth")]
    pub depth: Option<u32>,
    /// Creation/update timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A site group (`/api/dcim/site-groups/`); wire-identical to [`Region`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteGroup {
    /// Shared id/url/display group.
    #[serde(flatten)]
    pub header: ObjectHeader,
    /// Shared name/slug group.
    #[serde(flatten)]
    pub named: Named,
    /// Parent group, for nested hierarchies.
    #[serde(default)]
    pub parent: Option<NestedRef>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Number of sites directly within this group.
    #[serde(default)]
    pub site_count: Option<u64>,
    /// Nesting depth annotation emitted by list endpoints.
    #[serde(default, rename = "_depth")]
    pub depth: Option<u32>,
    /// Creation/update timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A site (`/api/dcim/sites/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Site {
    /// Shared id/url/display group.
    #[serde(flatten)]
    pub header: ObjectHeader,
    /// Shared name/slug group.
    #[serde(flatten)]
    pub named: Named,
    /// Operational status choice.
    #[serde(default)]
    pub status: Option<LabelValue>,
    /// Region the site belongs to.
    #[serde(default)]
    pub region: Option<NestedRef>,
    /// Site group the site belongs to.
    #[serde(default)]
    pub group: Option<NestedRef>,
    /// Owning tenant.
    #[serde(default)]
    pub tenant: Option<NestedRef>,
    /// Local facility identifier.
    #[serde(default)]
    pub facility: Option<String>,
    /// IANA time zone name.
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Physical street address.
    #[serde(default)]
    pub physical_address: Option<String>,
    /// Shipping address, when it differs.
    #[serde(default)]
    pub shipping_address: Option<String>,
    /// GPS latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// GPS longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Number of racks at this site.
    #[serde(default)]
    pub rack_count: Option<u64>,
    /// Number of devices at this site.
    #[serde(default)]
    pub device_count: Option<u64>,
    /// Creation/update timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A location within a site (`/api/dcim/locations/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Shared id/url/display group.
    #[serde(flatten)]
    pub header: ObjectHeader,
    /// Shared name/slug group.
    #[serde(flatten)]
    pub named: Named,
    /// Site the location belongs to.
    #[serde(default)]
    pub site: Option<NestedRef>,
    /// Parent location, for nested hierarchies.
    #[serde(default)]
    pub parent: Option<NestedRef>,
    /// Operational status choice.
    #[serde(default)]
    pub status: Option<LabelValue>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Number of racks at this location.
    #[serde(default)]
    pub rack_count: Option<u64>,
    /// Number of devices at this location.
    #[serde(default)]
    pub device_count: Option<u64>,
    /// Nesting depth annotation emitted by list endpoints.
    #[serde(default, rename = "_depth")]
    pub depth: Option<u32>,
    /// Creation/update timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A rack (`/api/dcim/racks/`). Racks are named but not slugged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rack {
    /// Shared id/url/display group.
    #[serde(flatten)]
    pub header: ObjectHeader,
    /// Rack name, unique within its location.
    pub name: String,
    /// Site the rack belongs to.
    #[serde(default)]
    pub site: Option<NestedRef>,
    /// Location within the site.
    #[serde(default)]
    pub location: Option<NestedRef>,
    /// Operational status choice.
    #[serde(default)]
    pub status: Option<LabelValue>,
    /// Functional role.
    #[serde(default)]
    pub role: Option<NestedRef>,
    /// Serial number.
    #[serde(default)]
    pub serial: Option<String>,
    /// Asset tag.
    #[serde(default)]
    pub asset_tag: Option<String>,
    /// Height in rack units.
    #[serde(default)]
    pub u_height: Option<u16>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Number of devices mounted in this rack.
    #[serde(default)]
    pub device_count: Option<u64>,
    /// Creation/update timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A hardware manufacturer (`/api/dcim/manufacturers/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manufacturer {
    /// Shared id/url/display group.
    #[serde(flatten)]
    pub header: ObjectHeader,
    /// Shared name/slug group.
    #[serde(flatten)]
    pub named: Named,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Number of device types from this manufacturer.
    #[serde(default)]
    pub devicetype_count: Option<u64>,
    /// Creation/update timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A device role (`/api/dcim/device-roles/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceRole {
    /// Shared id/url/display group.
    #[serde(flatten)]
    pub header: ObjectHeader,
    /// Shared name/slug group.
    #[serde(flatten)]
    pub named: Named,
    /// Six-digit hex color used in the NetBox UI.
    #[serde(default)]
    pub color: Option<String>,
    /// Whether the role also applies to virtual machines.
    #[serde(default)]
    pub vm_role: Option<bool>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Number of devices with this role.
    #[serde(default)]
    pub device_count: Option<u64>,
    /// Creation/update timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// A device (`/api/dcim/devices/`). Devices may be unnamed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Device {
    /// Shared id/url/display group.
    #[serde(flatten)]
    pub header: ObjectHeader,
    /// Device name; NetBox permits anonymous devices.
    #[serde(default)]
    pub name: Option<String>,
    /// Hardware model.
    #[serde(default)]
    pub device_type: Option<NestedRef>,
    /// Functional role.
    #[serde(default)]
    pub role: Option<NestedRef>,
    /// Owning tenant.
    #[serde(default)]
    pub tenant: Option<NestedRef>,
    /// Operating platform.
    #[serde(default)]
    pub platform: Option<NestedRef>,
    /// Serial number.
    #[serde(default)]
    pub serial: Option<String>,
    /// Asset tag.
    #[serde(default)]
    pub asset_tag: Option<String>,
    /// Site the device is installed at.
    #[serde(default)]
    pub site: Option<NestedRef>,
    /// Location within the site.
    #[serde(default)]
    pub location: Option<NestedRef>,
    /// Rack the device is mounted in.
    #[serde(default)]
    pub rack: Option<NestedRef>,
    /// Lowest rack unit occupied, halves allowed.
    #[serde(default)]
    pub position: Option<f64>,
    /// Rack face the device is mounted on.
    #[serde(default)]
    pub face: Option<LabelValue>,
    /// Operational status choice.
    #[serde(default)]
    pub status: Option<LabelValue>,
    /// Primary IP address assigned to the device.
    #[serde(default)]
    pub primary_ip: Option<NestedRef>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Creation/update timestamps.
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

/// Error document returned by NetBox on failed requests.
///
/// Operational errors carry a single `detail` string; validation errors
/// instead map field names to arrays of messages, captured here through the
/// flattened remainder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ApiErrorBody {
    /// Summary message for operational errors (auth, missing object, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Per-field validation messages, keyed by field name.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl ApiErrorBody {
    /// Flatten the document into a single human-readable message, or `None`
    /// when the body carried nothing usable.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        if let Some(detail) = &self.detail {
            if !detail.trim().is_empty() {
                return Some(detail.trim().to_string());
            }
        }
        let mut parts = Vec::new();
        for (field, messages) in &self.fields {
            let text = match messages {
                Value::Array(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .map_or_else(|| item.to_string(), str::to_string)
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            if !text.is_empty() {
                parts.push(format!("{field}: {text}"));
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn region_list_envelope_decodes() {
        let body = json!({
            "count": 2,
            "next": "https://netbox.example.net/api/dcim/regions/?limit=1&offset=1",
            "previous": null,
            "results": [{
                "id": 7,
                "url": "https://netbox.example.net/api/dcim/regions/7/",
                "display": "Europe",
                "name": "Europe",
                "slug": "europe",
                "parent": null,
                "description": "EMEA footprint",
                "tags": [{"id": 1, "name": "prod", "slug": "prod", "color": "2196f3"}],
                "site_count": 12,
                "_depth": 0,
                "created": "2024-01-10T09:30:00Z",
                "last_updated": "2024-06-02T17:01:12Z"
            }]
        });

        let paged: Paged<Region> = serde_json::from_value(body).expect("decode");
        assert_eq!(paged.count, 2);
        assert!(paged.next.is_some());
        assert!(paged.previous.is_none());
        let region = &paged.results[0];
        assert_eq!(region.header.id, 7);
        assert_eq!(region.named.slug, "europe");
        assert_eq!(region.depth, Some(0));
        assert_eq!(region.site_count, Some(12));
        assert_eq!(region.tags[0].color.as_deref(), Some("2196f3"));
        assert!(region.timestamps.created.is_some());
    }

    #[test]
    fn sparse_record_tolerates_missing_fields() {
        let body = json!({
            "id": 3,
            "name": "lab-1",
            "slug": "lab-1"
        });

        let site: Site = serde_json::from_value(body).expect("decode");
        assert_eq!(site.header.id, 3);
        assert!(site.header.url.is_none());
        assert!(site.status.is_none());
        assert!(site.tags.is_empty());
        assert!(site.timestamps.created.is_none());
    }

    #[test]
    fn device_decodes_nested_references() {
        let body = json!({
            "id": 101,
            "url": "https://netbox.example.net/api/dcim/devices/101/",
            "display": "edge-sw-01",
            "name": "edge-sw-01",
            "device_type": {"id": 9, "display": "QFX5120-48Y", "slug": "qfx5120-48y"},
            "role": {"id": 4, "name": "leaf", "slug": "leaf"},
            "site": {"id": 3, "name": "lab-1", "slug": "lab-1"},
            "rack": {"id": 12, "name": "R12"},
            "position": 38.5,
            "face": {"value": "front", "label": "Front"},
            "status": {"value": "active", "label": "Active"},
            "primary_ip": {"id": 55, "display": "10.0.12.7/24"}
        });

        let device: Device = serde_json::from_value(body).expect("decode");
        assert_eq!(device.position, Some(38.5));
        assert_eq!(
            device.device_type.as_ref().and_then(|t| t.slug.as_deref()),
            Some("qfx5120-48y")
        );
        assert_eq!(
            device.status.as_ref().map(|s| s.value.as_str()),
            Some("active")
        );
    }

    #[test]
    fn error_body_prefers_detail() {
        let body: ApiErrorBody =
            serde_json::from_value(json!({"detail": "Invalid token"})).expect("decode");
        assert_eq!(body.message().as_deref(), Some("Invalid token"));
    }

    #[test]
    fn error_body_flattens_field_errors() {
        let body: ApiErrorBody = serde_json::from_value(json!({
            "name": ["This field is required."],
            "slug": ["This field is required.", "Enter a valid slug."]
        }))
        .expect("decode");
        let message = body.message().expect("message");
        assert!(message.contains("name: This field is required."));
        assert!(message.contains("Enter a valid slug."));
    }

    #[test]
    fn error_body_without_content_yields_none() {
        let body = ApiErrorBody::default();
        assert!(body.message().is_none());
    }
}
