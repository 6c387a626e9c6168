//! Docker Compose output
//!
//! Service and document types written by the converter, the YAML emitter
//! with its quoting policy, and a thin parser for existing compose files.

pub mod config;
pub mod emitter;
pub mod parser;

pub use config::{ComposeDocument, ConvertOptions, ServiceRecord};
pub use emitter::{ComposeEmitter, EmitterConfig};
pub use parser::ComposeParser;

use crate::error::Result;

/// Render a single service and the external networks it joins
pub fn emit(
    service_name: &str,
    service: ServiceRecord,
    networks: &[String],
    options: &ConvertOptions,
    emitter: &ComposeEmitter,
) -> Result<String> {
    let document = ComposeDocument::single(service_name, service, networks, options);
    emitter.emit(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateParser;
    use serde_yaml::Value;

    const FULL_TEMPLATE: &str = r#"<?xml version="1.0"?>
<Container version="2">
  <Name>binhex-sonarr</Name>
  <Repository>binhex/arch-sonarr</Repository>
  <Network>proxynet</Network>
  <Privileged>true</Privileged>
  <Support>https://forums.unraid.net/topic/45466</Support>
  <Project>https://sonarr.tv/</Project>
  <WebUI>http://[IP]:[PORT:8989]/</WebUI>
  <ExtraParams>--cpus=1.5 --memory=512m --cpu-shares=256</ExtraParams>
  <CPUset>0,1</CPUset>
  <Config Name="Port" Type="Port" Target="8989" Mode="tcp">8989</Config>
  <Config Name="Media" Type="Path" Target="/media" Mode="ro">/mnt/user/media</Config>
  <Config Name="UMASK" Type="Variable" Target="UMASK">000</Config>
  <Config Name="TZ" Type="Variable" Target="TZ">Europe/London</Config>
</Container>"#;

    fn render(xml: &str) -> String {
        let parsed = TemplateParser::default().parse(xml).unwrap();
        emit(
            &parsed.name,
            parsed.service,
            &parsed.networks,
            &ConvertOptions::default(),
            &ComposeEmitter::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_emit_minimal_service() {
        let yaml = render(
            r#"<Container><Name>plex</Name><Repository>plexinc/pms</Repository>
<Config Type="Port" Target="32400" Mode="tcp">32400</Config></Container>"#,
        );

        assert_eq!(
            yaml,
            "version: '3.8'
services:
  plex:
    image: plexinc/pms
    container_name: plex
    restart: unless-stopped
    ports:
    - \"32400:32400/tcp\"
"
        );
    }

    #[test]
    fn test_emit_full_service() {
        let yaml = render(FULL_TEMPLATE);

        assert_eq!(
            yaml,
            "version: '3.8'
services:
  binhex-sonarr:
    image: binhex/arch-sonarr
    container_name: binhex-sonarr
    restart: unless-stopped
    environment:
      UMASK: '000'
      TZ: Europe/London
    volumes:
    - \"/mnt/user/media:/media:ro\"
    ports:
    - \"8989:8989/tcp\"
    privileged: true
    networks:
    - proxynet
    cpuset: 0,1
    deploy:
      resources:
        limits:
          cpus: '1.5'
          memory: 512m
    cpu_shares: 256
    labels:
      unraid.webui: \"http://[IP]:[PORT:8989]/\"
      unraid.support: \"https://forums.unraid.net/topic/45466\"
      unraid.project: \"https://sonarr.tv/\"
networks:
  proxynet:
    external: true
"
        );
    }

    #[test]
    fn test_emit_without_version() {
        let parsed = TemplateParser::default()
            .parse("<C><Name>a</Name><Repository>b</Repository><Network>host</Network></C>")
            .unwrap();
        let options = ConvertOptions {
            compose_version: None,
            ..ConvertOptions::default()
        };
        let yaml = emit(
            &parsed.name,
            parsed.service,
            &parsed.networks,
            &options,
            &ComposeEmitter::default(),
        )
        .unwrap();

        assert_eq!(
            yaml,
            "services:\n  a:\n    image: b\n    container_name: a\n    restart: unless-stopped\n    network_mode: host\n"
        );
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let first = render(FULL_TEMPLATE);
        let emitter = ComposeEmitter::default();

        let reparsed: Value = serde_yaml::from_str(&first).unwrap();
        let second = emitter.emit_value(&reparsed).unwrap();
        assert_eq!(first, second);

        let reparsed_again: Value = serde_yaml::from_str(&second).unwrap();
        assert_eq!(reparsed, reparsed_again);
    }

    #[test]
    fn test_emitted_text_keeps_string_types() {
        let yaml = render(FULL_TEMPLATE);
        let value: Value = serde_yaml::from_str(&yaml).unwrap();
        let service = &value["services"]["binhex-sonarr"];

        assert_eq!(service["image"].as_str(), Some("binhex/arch-sonarr"));
        assert_eq!(service["environment"]["UMASK"].as_str(), Some("000"));
        assert_eq!(service["deploy"]["resources"]["limits"]["cpus"].as_str(), Some("1.5"));
        assert_eq!(service["cpu_shares"].as_u64(), Some(256));
        assert!(service["deploy"]["resources"]["limits"].get("cpuset").is_none());
    }
}
