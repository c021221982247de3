//! Output renderers and formatting helpers for CLI commands.
//!
//! Renderers build full strings rather than printing line by line so the
//! formatting rules (missing-field markers, pluralization, zero-result
//! messages) stay unit-testable.

use std::io::IsTerminal;

use anyhow::anyhow;
use nbx_api_models::{
    Device, DeviceRole, LabelValue, Location, Manufacturer, NestedRef, Paged, Rack, Region, Site,
    SiteGroup, Tag, Timestamps,
};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};
use crate::endpoints::Endpoint;

const MISSING: &str = "(none)";

/// Color configuration for human-readable output.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    enabled: bool,
}

impl Palette {
    /// Enable color only on a terminal and only when `NO_COLOR` is unset.
    #[must_use]
    pub(crate) fn detect() -> Self {
        Self {
            enabled: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    #[must_use]
    pub(crate) const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint(text, Style::new().bold().cyan())
    }

    fn count(&self, text: &str) -> String {
        self.paint(text, Style::new().bold())
    }

    fn label(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }

    fn missing(&self) -> String {
        self.paint(MISSING, Style::new().dimmed())
    }

    fn tags(&self, text: &str) -> String {
        self.paint(text, Style::new().magenta())
    }

    fn status(&self, status: &LabelValue) -> String {
        let style = match status.value.as_str() {
            "active" => Style::new().green(),
            "planned" | "staging" | "staged" => Style::new().yellow(),
            "offline" | "failed" | "retired" | "decommissioning" => Style::new().red(),
            _ => Style::new(),
        };
        self.paint(&status.label, style)
    }
}

/// Accumulates the labeled lines of one result block.
struct Block<'a> {
    palette: &'a Palette,
    lines: Vec<String>,
}

impl<'a> Block<'a> {
    fn new(palette: &'a Palette, singular: &str, name: &str, id: u64) -> Self {
        let heading = format!(
            "{} {} (id {id})",
            palette.heading(singular),
            palette.heading(name)
        );
        Self {
            palette,
            lines: vec![heading],
        }
    }

    fn field(&mut self, label: &str, value: &str) {
        self.lines
            .push(format!("  {}: {value}", self.palette.label(label)));
    }

    fn field_or_missing(&mut self, label: &str, value: Option<String>) {
        match value {
            Some(value) => self.field(label, &value),
            None => {
                let marker = self.palette.missing();
                self.field(label, &marker);
            }
        }
    }

    fn status(&mut self, status: Option<&LabelValue>) {
        match status {
            Some(status) => {
                let value = self.palette.status(status);
                self.field("status", &value);
            }
            None => self.field_or_missing("status", None),
        }
    }

    fn tags(&mut self, tags: &[Tag]) {
        if tags.is_empty() {
            self.field_or_missing("tags", None);
        } else {
            let joined = tags
                .iter()
                .map(|tag| tag.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let value = self.palette.tags(&joined);
            self.field("tags", &value);
        }
    }

    fn timestamps(&mut self, timestamps: &Timestamps) {
        if let Some(created) = timestamps.created {
            self.field("created", &created.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        }
        if let Some(updated) = timestamps.last_updated {
            self.field("updated", &updated.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Render a decoded list envelope.
///
/// `count == 0` yields only the "none found" message; otherwise one block
/// per result, preceded by a count header and followed by the pagination
/// cursors when the server supplied them.
pub(crate) fn render_list<T: Serialize>(
    paged: &Paged<T>,
    endpoint: &Endpoint,
    format: OutputFormat,
    palette: &Palette,
    block: fn(&T, &Palette) -> String,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(paged)
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}"))),
        OutputFormat::Human => {
            if paged.count == 0 {
                return Ok(format!("No {} found.", endpoint.plural));
            }

            let shown = u64::try_from(paged.results.len()).unwrap_or(u64::MAX);
            let mut header = format!("{} {}", paged.count, endpoint.noun(paged.count));
            if shown != paged.count {
                header.push_str(&format!(" ({shown} shown)"));
            }

            let mut out = palette.count(&header);
            for item in &paged.results {
                out.push_str("\n\n");
                out.push_str(&block(item, palette));
            }
            if let Some(next) = &paged.next {
                out.push_str(&format!("\n\n{}: {next}", palette.label("next")));
            }
            if let Some(previous) = &paged.previous {
                let separator = if paged.next.is_some() { "\n" } else { "\n\n" };
                out.push_str(&format!(
                    "{separator}{}: {previous}",
                    palette.label("previous")
                ));
            }
            Ok(out)
        }
    }
}

/// Render a bare array of records, as returned by bulk write endpoints.
pub(crate) fn render_items<T: Serialize>(
    records: &[T],
    format: OutputFormat,
    palette: &Palette,
    block: fn(&T, &Palette) -> String,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(records)
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}"))),
        OutputFormat::Human => Ok(records
            .iter()
            .map(|record| block(record, palette))
            .collect::<Vec<_>>()
            .join("\n\n")),
    }
}

/// Render a single object fetched by ID.
pub(crate) fn render_detail<T: Serialize>(
    record: &T,
    format: OutputFormat,
    palette: &Palette,
    block: fn(&T, &Palette) -> String,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(record)
            .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}"))),
        OutputFormat::Human => Ok(block(record, palette)),
    }
}

pub(crate) fn region_block(region: &Region, palette: &Palette) -> String {
    let mut block = Block::new(palette, "region", &region.named.name, region.header.id);
    block.field("slug", &region.named.slug);
    block.field_or_missing("parent", region.parent.as_ref().map(nested_label));
    block.field_or_missing("description", non_empty(region.description.as_deref()));
    block.field_or_missing("sites", region.site_count.map(|count| count.to_string()));
    block.field_or_missing("depth", region.depth.map(|depth| depth.to_string()));
    block.tags(&region.tags);
    block.timestamps(&region.timestamps);
    block.finish()
}

pub(crate) fn site_group_block(group: &SiteGroup, palette: &Palette) -> String {
    let mut block = Block::new(palette, "site group", &group.named.name, group.header.id);
    block.field("slug", &group.named.slug);
    block.field_or_missing("parent", group.parent.as_ref().map(nested_label));
    block.field_or_missing("description", non_empty(group.description.as_deref()));
    block.field_or_missing("sites", group.site_count.map(|count| count.to_string()));
    block.field_or_missing("depth", group.depth.map(|depth| depth.to_string()));
    block.tags(&group.tags);
    block.timestamps(&group.timestamps);
    block.finish()
}

pub(crate) fn site_block(site: &Site, palette: &Palette) -> String {
    let mut block = Block::new(palette, "site", &site.named.name, site.header.id);
    block.field("slug", &site.named.slug);
    block.status(site.status.as_ref());
    block.field_or_missing("region", site.region.as_ref().map(nested_label));
    block.field_or_missing("group", site.group.as_ref().map(nested_label));
    block.field_or_missing("tenant", site.tenant.as_ref().map(nested_label));
    block.field_or_missing("facility", non_empty(site.facility.as_deref()));
    block.field_or_missing("time zone", non_empty(site.time_zone.as_deref()));
    block.field_or_missing("description", non_empty(site.description.as_deref()));
    block.field_or_missing(
        "address",
        non_empty(site.physical_address.as_deref()).map(|text| text.replace('\n', ", ")),
    );
    if let (Some(latitude), Some(longitude)) = (site.latitude, site.longitude) {
        block.field("coordinates", &format!("{latitude}, {longitude}"));
    }
    block.field_or_missing("racks", site.rack_count.map(|count| count.to_string()));
    block.field_or_missing("devices", site.device_count.map(|count| count.to_string()));
    block.tags(&site.tags);
    block.timestamps(&site.timestamps);
    block.finish()
}

pub(crate) fn location_block(location: &Location, palette: &Palette) -> String {
    let mut block = Block::new(palette, "location", &location.named.name, location.header.id);
    block.field("slug", &location.named.slug);
    block.status(location.status.as_ref());
    block.field_or_missing("site", location.site.as_ref().map(nested_label));
    block.field_or_missing("parent", location.parent.as_ref().map(nested_label));
    block.field_or_missing("description", non_empty(location.description.as_deref()));
    block.field_or_missing("racks", location.rack_count.map(|count| count.to_string()));
    block.field_or_missing(
        "devices",
        location.device_count.map(|count| count.to_string()),
    );
    block.field_or_missing("depth", location.depth.map(|depth| depth.to_string()));
    block.tags(&location.tags);
    block.timestamps(&location.timestamps);
    block.finish()
}

pub(crate) fn rack_block(rack: &Rack, palette: &Palette) -> String {
    let mut block = Block::new(palette, "rack", &rack.name, rack.header.id);
    block.status(rack.status.as_ref());
    block.field_or_missing("site", rack.site.as_ref().map(nested_label));
    block.field_or_missing("location", rack.location.as_ref().map(nested_label));
    block.field_or_missing("role", rack.role.as_ref().map(nested_label));
    block.field_or_missing("height", rack.u_height.map(|height| format!("{height}U")));
    block.field_or_missing("serial", non_empty(rack.serial.as_deref()));
    block.field_or_missing("asset tag", non_empty(rack.asset_tag.as_deref()));
    block.field_or_missing("description", non_empty(rack.description.as_deref()));
    block.field_or_missing("devices", rack.device_count.map(|count| count.to_string()));
    block.tags(&rack.tags);
    block.timestamps(&rack.timestamps);
    block.finish()
}

pub(crate) fn manufacturer_block(manufacturer: &Manufacturer, palette: &Palette) -> String {
    let mut block = Block::new(
        palette,
        "manufacturer",
        &manufacturer.named.name,
        manufacturer.header.id,
    );
    block.field("slug", &manufacturer.named.slug);
    block.field_or_missing(
        "description",
        non_empty(manufacturer.description.as_deref()),
    );
    block.field_or_missing(
        "device types",
        manufacturer.devicetype_count.map(|count| count.to_string()),
    );
    block.tags(&manufacturer.tags);
    block.timestamps(&manufacturer.timestamps);
    block.finish()
}

pub(crate) fn device_role_block(role: &DeviceRole, palette: &Palette) -> String {
    let mut block = Block::new(palette, "device role", &role.named.name, role.header.id);
    block.field("slug", &role.named.slug);
    block.field_or_missing("color", non_empty(role.color.as_deref()));
    block.field_or_missing("vm role", role.vm_role.map(|flag| flag.to_string()));
    block.field_or_missing("description", non_empty(role.description.as_deref()));
    block.field_or_missing("devices", role.device_count.map(|count| count.to_string()));
    block.tags(&role.tags);
    block.timestamps(&role.timestamps);
    block.finish()
}

pub(crate) fn device_block(device: &Device, palette: &Palette) -> String {
    let name = device
        .name
        .as_deref()
        .or(device.header.display.as_deref())
        .unwrap_or("(unnamed)");
    let mut block = Block::new(palette, "device", name, device.header.id);
    block.status(device.status.as_ref());
    block.field_or_missing("type", device.device_type.as_ref().map(nested_label));
    block.field_or_missing("role", device.role.as_ref().map(nested_label));
    block.field_or_missing("platform", device.platform.as_ref().map(nested_label));
    block.field_or_missing("tenant", device.tenant.as_ref().map(nested_label));
    block.field_or_missing("site", device.site.as_ref().map(nested_label));
    block.field_or_missing("location", device.location.as_ref().map(nested_label));
    block.field_or_missing("rack", device.rack.as_ref().map(nested_label));
    block.field_or_missing(
        "position",
        device.position.map(|position| format!("U{position}")),
    );
    block.field_or_missing(
        "face",
        device.face.as_ref().map(|face| face.label.clone()),
    );
    block.field_or_missing("serial", non_empty(device.serial.as_deref()));
    block.field_or_missing("asset tag", non_empty(device.asset_tag.as_deref()));
    block.field_or_missing("primary ip", device.primary_ip.as_ref().map(nested_label));
    block.field_or_missing("description", non_empty(device.description.as_deref()));
    block.tags(&device.tags);
    block.timestamps(&device.timestamps);
    block.finish()
}

/// Best available label for a nested object reference.
fn nested_label(reference: &NestedRef) -> String {
    reference
        .display
        .as_deref()
        .or(reference.name.as_deref())
        .map_or_else(|| format!("#{}", reference.id), str::to_string)
}

/// NetBox serializes cleared text fields as empty strings, not nulls.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn plain() -> Palette {
        Palette::new(false)
    }

    fn sample_region(description: &str) -> Region {
        serde_json::from_value(json!({
            "id": 7,
            "url": "https://netbox.example.net/api/dcim/regions/7/",
            "display": "Europe",
            "name": "Europe",
            "slug": "europe",
            "description": description,
            "tags": [{"id": 1, "name": "prod", "slug": "prod"}],
            "site_count": 12,
            "_depth": 0
        }))
        .expect("valid region")
    }

    #[test]
    fn zero_count_list_renders_only_not_found_message() {
        let paged: Paged<Region> = Paged {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        };
        let text = render_list(
            &paged,
            &crate::endpoints::REGIONS,
            OutputFormat::Human,
            &plain(),
            region_block,
        )
        .expect("render");
        assert_eq!(text, "No regions found.");
    }

    #[test]
    fn list_renders_one_block_per_result_and_cursors() {
        let paged = Paged {
            count: 3,
            next: Some("https://netbox.example.net/api/dcim/regions/?offset=2".into()),
            previous: None,
            results: vec![sample_region("EMEA footprint"), sample_region("")],
        };
        let text = render_list(
            &paged,
            &crate::endpoints::REGIONS,
            OutputFormat::Human,
            &plain(),
            region_block,
        )
        .expect("render");

        assert!(text.starts_with("3 regions (2 shown)"));
        assert_eq!(text.matches("region Europe (id 7)").count(), 2);
        assert!(text.contains("next: https://netbox.example.net/api/dcim/regions/?offset=2"));
        assert!(!text.contains("previous:"));
    }

    #[test]
    fn singular_count_uses_singular_noun() {
        let paged = Paged {
            count: 1,
            next: None,
            previous: None,
            results: vec![sample_region("x")],
        };
        let text = render_list(
            &paged,
            &crate::endpoints::REGIONS,
            OutputFormat::Human,
            &plain(),
            region_block,
        )
        .expect("render");
        assert!(text.starts_with("1 region\n"));
    }

    #[test]
    fn block_marks_empty_optional_fields_as_missing() {
        let region: Region = serde_json::from_value(json!({
            "id": 9,
            "name": "APAC",
            "slug": "apac",
            "description": ""
        }))
        .expect("valid region");

        let text = region_block(&region, &plain());
        assert!(text.contains("description: (none)"));
        assert!(text.contains("sites: (none)"));
        assert!(text.contains("depth: (none)"));
        assert!(text.contains("parent: (none)"));
        assert!(text.contains("tags: (none)"));
    }

    #[test]
    fn block_renders_all_populated_fields() {
        let text = region_block(&sample_region("EMEA footprint"), &plain());
        assert!(text.contains("region Europe (id 7)"));
        assert!(text.contains("slug: europe"));
        assert!(text.contains("description: EMEA footprint"));
        assert!(text.contains("sites: 12"));
        assert!(text.contains("depth: 0"));
        assert!(text.contains("tags: prod"));
    }

    #[test]
    fn device_block_handles_anonymous_devices() {
        let device: Device = serde_json::from_value(json!({"id": 4})).expect("valid device");
        let text = device_block(&device, &plain());
        assert!(text.contains("device (unnamed) (id 4)"));
        assert!(text.contains("status: (none)"));
    }

    #[test]
    fn status_line_uses_the_label() {
        let site: Site = serde_json::from_value(json!({
            "id": 3,
            "name": "lab-1",
            "slug": "lab-1",
            "status": {"value": "active", "label": "Active"}
        }))
        .expect("valid site");
        let text = site_block(&site, &plain());
        assert!(text.contains("status: Active"));
    }

    #[test]
    fn colored_output_differs_from_plain() {
        let region = sample_region("EMEA footprint");
        let plain_text = region_block(&region, &plain());
        let colored_text = region_block(&region, &Palette::new(true));
        assert_ne!(plain_text, colored_text);
        assert!(colored_text.contains("\u{1b}["));
        assert!(!plain_text.contains("\u{1b}["));
    }

    #[test]
    fn json_format_round_trips() {
        let paged = Paged {
            count: 1,
            next: None,
            previous: None,
            results: vec![sample_region("EMEA footprint")],
        };
        let text = render_list(
            &paged,
            &crate::endpoints::REGIONS,
            OutputFormat::Json,
            &plain(),
            region_block,
        )
        .expect("render");
        let parsed: Paged<Region> = serde_json::from_str(&text).expect("parse back");
        assert_eq!(parsed, paged);
    }

    #[test]
    fn nested_label_falls_back_to_id() {
        let reference: NestedRef = serde_json::from_value(json!({"id": 12})).expect("valid ref");
        assert_eq!(nested_label(&reference), "#12");
    }

    #[test]
    fn render_items_joins_blocks_with_blank_lines() {
        let regions = vec![sample_region("first"), sample_region("second")];
        let text = render_items(&regions, OutputFormat::Human, &plain(), region_block)
            .expect("render");
        assert_eq!(text.matches("region Europe (id 7)").count(), 2);
        assert!(text.contains("description: first"));
        assert!(text.contains("\n\n"));
    }

    #[test]
    fn site_group_block_renders_populated_fields() {
        let group: SiteGroup = serde_json::from_value(json!({
            "id": 2,
            "name": "Colo",
            "slug": "colo",
            "parent": {"id": 1, "name": "All", "slug": "all"},
            "description": "Colocation footprint",
            "site_count": 4,
            "_depth": 1
        }))
        .expect("valid site group");

        let text = site_group_block(&group, &plain());
        assert!(text.contains("site group Colo (id 2)"));
        assert!(text.contains("parent: All"));
        assert!(text.contains("description: Colocation footprint"));
        assert!(text.contains("sites: 4"));
        assert!(text.contains("depth: 1"));
    }

    #[test]
    fn site_group_block_marks_empty_fields_as_missing() {
        let group: SiteGroup = serde_json::from_value(json!({
            "id": 2,
            "name": "Colo",
            "slug": "colo",
            "description": ""
        }))
        .expect("valid site group");

        let text = site_group_block(&group, &plain());
        assert!(text.contains("parent: (none)"));
        assert!(text.contains("description: (none)"));
        assert!(text.contains("sites: (none)"));
        assert!(text.contains("depth: (none)"));
    }

    #[test]
    fn location_block_renders_populated_fields() {
        let location: Location = serde_json::from_value(json!({
            "id": 11,
            "name": "Row A",
            "slug": "row-a",
            "site": {"id": 3, "name": "lab-1", "slug": "lab-1"},
            "status": {"value": "active", "label": "Active"},
            "description": "First row",
            "rack_count": 6,
            "device_count": 40,
            "_depth": 0
        }))
        .expect("valid location");

        let text = location_block(&location, &plain());
        assert!(text.contains("location Row A (id 11)"));
        assert!(text.contains("site: lab-1"));
        assert!(text.contains("status: Active"));
        assert!(text.contains("racks: 6"));
        assert!(text.contains("devices: 40"));
    }

    #[test]
    fn location_block_marks_empty_fields_as_missing() {
        let location: Location = serde_json::from_value(json!({
            "id": 11,
            "name": "Row A",
            "slug": "row-a"
        }))
        .expect("valid location");

        let text = location_block(&location, &plain());
        assert!(text.contains("site: (none)"));
        assert!(text.contains("parent: (none)"));
        assert!(text.contains("racks: (none)"));
        assert!(text.contains("depth: (none)"));
    }

    #[test]
    fn rack_block_renders_populated_fields() {
        let rack: Rack = serde_json::from_value(json!({
            "id": 12,
            "name": "R12",
            "site": {"id": 3, "name": "lab-1", "slug": "lab-1"},
            "status": {"value": "active", "label": "Active"},
            "u_height": 42,
            "serial": "SN-1234",
            "device_count": 18
        }))
        .expect("valid rack");

        let text = rack_block(&rack, &plain());
        assert!(text.contains("rack R12 (id 12)"));
        assert!(text.contains("height: 42U"));
        assert!(text.contains("serial: SN-1234"));
        assert!(text.contains("devices: 18"));
    }

    #[test]
    fn rack_block_marks_empty_fields_as_missing() {
        let rack: Rack =
            serde_json::from_value(json!({"id": 12, "name": "R12", "serial": ""}))
                .expect("valid rack");

        let text = rack_block(&rack, &plain());
        assert!(text.contains("site: (none)"));
        assert!(text.contains("height: (none)"));
        assert!(text.contains("serial: (none)"));
        assert!(text.contains("asset tag: (none)"));
    }

    #[test]
    fn manufacturer_block_renders_populated_fields() {
        let manufacturer: Manufacturer = serde_json::from_value(json!({
            "id": 5,
            "name": "Juniper",
            "slug": "juniper",
            "description": "Network hardware",
            "devicetype_count": 3
        }))
        .expect("valid manufacturer");

        let text = manufacturer_block(&manufacturer, &plain());
        assert!(text.contains("manufacturer Juniper (id 5)"));
        assert!(text.contains("slug: juniper"));
        assert!(text.contains("description: Network hardware"));
        assert!(text.contains("device types: 3"));
    }

    #[test]
    fn manufacturer_block_marks_empty_fields_as_missing() {
        let manufacturer: Manufacturer = serde_json::from_value(json!({
            "id": 5,
            "name": "Juniper",
            "slug": "juniper",
            "description": ""
        }))
        .expect("valid manufacturer");

        let text = manufacturer_block(&manufacturer, &plain());
        assert!(text.contains("description: (none)"));
        assert!(text.contains("device types: (none)"));
        assert!(text.contains("tags: (none)"));
    }

    #[test]
    fn device_role_block_renders_populated_fields() {
        let role: DeviceRole = serde_json::from_value(json!({
            "id": 4,
            "name": "leaf",
            "slug": "leaf",
            "color": "2196f3",
            "vm_role": true,
            "description": "Leaf switches",
            "device_count": 24
        }))
        .expect("valid device role");

        let text = device_role_block(&role, &plain());
        assert!(text.contains("device role leaf (id 4)"));
        assert!(text.contains("color: 2196f3"));
        assert!(text.contains("vm role: true"));
        assert!(text.contains("devices: 24"));
    }

    #[test]
    fn device_role_block_marks_empty_fields_as_missing() {
        let role: DeviceRole =
            serde_json::from_value(json!({"id": 4, "name": "leaf", "slug": "leaf"}))
                .expect("valid device role");

        let text = device_role_block(&role, &plain());
        assert!(text.contains("color: (none)"));
        assert!(text.contains("vm role: (none)"));
        assert!(text.contains("description: (none)"));
        assert!(text.contains("devices: (none)"));
    }
}
