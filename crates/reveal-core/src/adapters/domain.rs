//! `domain://` -- DNS resolution for a hostname, via `std::net` for the
//! common A/AAAA lookup and shelling out to `dig` (when present) for record
//! types `std::net` cannot express, rather than vendoring a DNS client.

use std::net::ToSocketAddrs;
use std::process::Command;

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `domain://`.
pub struct DomainAdapter;

fn resolve_addresses(host: &str) -> RevealResult<Vec<String>> {
    (host, 0u16)
        .to_socket_addrs()
        .map(|addrs| addrs.map(|a| a.ip().to_string()).collect())
        .map_err(|e| RevealError::ResourceUnavailable { resource: host.to_string(), message: e.to_string() })
}

/// Query a specific record type via `dig`, when it's installed. Absence of
/// `dig` degrades to an empty result rather than a hard error, since A/AAAA
/// lookups above already cover the common case.
fn dig_records(host: &str, record_type: &str) -> Vec<String> {
    let Ok(output) = Command::new("dig").args(["+short", record_type, host]).output() else {
        return Vec::new();
    };
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

impl Adapter for DomainAdapter {
    fn scheme(&self) -> &'static str {
        "domain"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let host = uri.resource.clone();
        let addresses = resolve_addresses(&host)?;

        let mut structure = Structure::new("domain_structure", host.clone(), SourceType::Remote);
        let mut elements: Vec<Element> =
            addresses.into_iter().map(|ip| Element::new(ip, 0, 0).with_attr("record_type", "A/AAAA")).collect();

        let mx = dig_records(&host, "MX");
        if mx.is_empty() {
            structure.warn("dig_unavailable_or_empty", "MX records unavailable -- `dig` not installed or none found");
        }
        elements.extend(mx.into_iter().map(|r| Element::new(r, 0, 0).with_attr("record_type", "MX")));

        structure = structure.with_category("records", elements);
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let host = uri.resource.clone();
        let ElementRef::Name(parts) = element else {
            return Err(RevealError::NoSuchElement { resource: host, element: format!("{element:?}") });
        };
        let record_type = parts.first().cloned().unwrap_or_else(|| "A".to_string()).to_uppercase();
        let records = dig_records(&host, &record_type);

        let mut structure = Structure::new("domain_element", host, SourceType::Remote);
        let elements = records.into_iter().map(|r| Element::new(r, 0, 0)).collect();
        structure = structure.with_category(record_type.to_lowercase(), elements);
        Ok(structure)
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "domain".to_string(),
            summary: "DNS records for a hostname".to_string(),
            examples: vec!["domain://example.com".to_string(), "domain://example.com/txt".to_string()],
            queryable_fields: vec![],
        }
    }
}
