//! `ssl://` -- certificate introspection for a remote host, shelling out to
//! the system `openssl` binary rather than linking a TLS stack, so the
//! result matches exactly what `openssl s_client`/`openssl x509` would show.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::adapter::{Adapter, HelpRecord};
use crate::config::Config;
use crate::error::{RevealError, RevealResult};
use crate::model::{Element, SourceType, Structure};
use crate::query::CompiledQuery;
use crate::uri::{ElementRef, Uri};

/// Handles `ssl://`.
pub struct SslAdapter;

/// Fetch and describe the leaf certificate a host presents, via
/// `openssl s_client` piped into `openssl x509 -subject -issuer -dates`.
fn describe_cert(host: &str, port: u16) -> RevealResult<String> {
    let spawn_err = |e: std::io::Error| RevealError::ResourceUnavailable {
        resource: host.to_string(),
        message: format!("failed to spawn openssl: {e}"),
    };

    let s_client = Command::new("openssl")
        .args(["s_client", "-connect", &format!("{host}:{port}"), "-servername", host])
        .stdin(Stdio::null())
        .output()
        .map_err(spawn_err)?;

    let pem = String::from_utf8_lossy(&s_client.stdout);
    let Some(start) = pem.find("-----BEGIN CERTIFICATE-----") else {
        return Err(RevealError::ResourceUnavailable {
            resource: host.to_string(),
            message: "no certificate returned by openssl s_client".to_string(),
        });
    };
    let end = pem[start..].find("-----END CERTIFICATE-----").map_or(pem.len(), |i| start + i + "-----END CERTIFICATE-----".len());
    let cert_pem = &pem[start..end];

    let mut x509 = Command::new("openssl")
        .args(["x509", "-noout", "-subject", "-issuer", "-dates"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(spawn_err)?;
    x509.stdin.take().expect("piped stdin").write_all(cert_pem.as_bytes()).map_err(spawn_err)?;
    let output = x509.wait_with_output().map_err(spawn_err)?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_field<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.lines().find_map(|l| l.strip_prefix(prefix))
}

impl Adapter for SslAdapter {
    fn scheme(&self) -> &'static str {
        "ssl"
    }

    fn get_structure(&self, uri: &Uri, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        let (host, port) = match uri.resource.split_once(':') {
            Some((h, p)) => (h.to_string(), p.parse().unwrap_or(443)),
            None => (uri.resource.clone(), 443),
        };
        let raw = describe_cert(&host, port)?;

        let mut structure = Structure::new("ssl_structure", format!("{host}:{port}"), SourceType::Remote);
        let element = Element::new(host.clone(), 0, 0)
            .with_attr("subject", parse_field(&raw, "subject=").unwrap_or("").trim().to_string())
            .with_attr("issuer", parse_field(&raw, "issuer=").unwrap_or("").trim().to_string())
            .with_attr("not_before", parse_field(&raw, "notBefore=").unwrap_or("").trim().to_string())
            .with_attr("not_after", parse_field(&raw, "notAfter=").unwrap_or("").trim().to_string());
        structure = structure.with_category("certificate", vec![element]);
        Ok(structure)
    }

    fn get_element(&self, uri: &Uri, element: &ElementRef, _query: &CompiledQuery, _config: &Config) -> RevealResult<Structure> {
        Err(RevealError::NoSuchElement { resource: uri.resource.clone(), element: format!("{element:?}") })
    }

    fn get_help(&self) -> HelpRecord {
        HelpRecord {
            scheme: "ssl".to_string(),
            summary: "TLS certificate subject/issuer/validity for a host".to_string(),
            examples: vec!["ssl://example.com".to_string(), "ssl://example.com:8443".to_string()],
            queryable_fields: vec![],
        }
    }
}
