/*
Copyright 2024 San Francisco Compute Company

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! lshw XML parsing functions
//!
//! The document is read into a DOM once; the system node gives the machine
//! identity and every nested `node` element is classified as a CPU socket, a
//! memory bank, or ignored.

use super::common::parse_integer;
use crate::domain::{CpuSlot, Machine, MemorySlot, ParseError};
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::str::FromStr;

const NODE_TAG: &str = "node";
const SKU_SETTING: &str = "sku";

/// Machine identity and slots extracted from one lshw document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareInventory {
    pub machine: Machine,
    pub cpus: Vec<CpuSlot>,
    pub memory: Vec<MemorySlot>,
}

/// Parse an lshw XML document
///
/// # Arguments
/// * `xml` - Output of `lshw -xml`
///
/// # Returns
/// * `Ok(HardwareInventory)` - Machine plus CPU and memory slots in document order
/// * `Err(ParseError)` - Malformed XML or a missing mandatory field
pub fn parse_hardware_document(xml: &str) -> Result<HardwareInventory, ParseError> {
    let document =
        Document::parse(xml).map_err(|e| ParseError::MalformedDocument(e.to_string()))?;
    let system = system_node(&document)?;
    let machine = parse_machine_node(system)?;

    let mut cpus = Vec::new();
    let mut memory = Vec::new();
    for node in document.descendants().filter(|n| n.has_tag_name(NODE_TAG)) {
        if is_cpu_node(node) {
            cpus.push(parse_cpu_node(node)?);
        } else if is_memory_bank_node(node) {
            memory.push(parse_memory_node(node)?);
        }
    }

    Ok(HardwareInventory {
        machine,
        cpus,
        memory,
    })
}

/// Locate the system node: `<list><node/></list>` or a bare `<node/>` root
fn system_node<'a, 'input>(document: &'a Document<'input>) -> Result<Node<'a, 'input>, ParseError> {
    let root = document.root_element();
    if root.has_tag_name(NODE_TAG) {
        return Ok(root);
    }
    child_element(root, NODE_TAG).ok_or_else(|| {
        ParseError::MalformedDocument(format!(
            "no system node under <{}>",
            root.tag_name().name()
        ))
    })
}

fn is_cpu_node(node: Node) -> bool {
    node.attribute("class") == Some("processor")
        && node.attribute("id").is_some_and(|id| id.starts_with("cpu"))
}

fn is_memory_bank_node(node: Node) -> bool {
    node.attribute("class") == Some("memory")
        && node.attribute("id").is_some_and(|id| id.starts_with("bank"))
}

fn parse_machine_node(node: Node) -> Result<Machine, ParseError> {
    let (id, class) = identity(node)?;

    let product_id = child_element(node, "configuration").and_then(|configuration| {
        configuration
            .children()
            .filter(|setting| setting.attribute("id") == Some(SKU_SETTING))
            .filter_map(|setting| setting.attribute("value"))
            .last()
            .map(str::to_string)
    });

    Ok(Machine {
        product: required_text(node, "product", id)?,
        vendor: required_text(node, "vendor", id)?,
        description: required_text(node, "description", id)?,
        serial: required_text(node, "serial", id)?,
        id: id.to_string(),
        class: class.to_string(),
        product_id,
    })
}

/// A socket without a configuration block is unpopulated: its product, vendor
/// and clocks are blanked and its core/thread counts are unknown.
fn parse_cpu_node(node: Node) -> Result<CpuSlot, ParseError> {
    let (id, class) = identity(node)?;
    let description = required_text(node, "description", id)?;
    let slot = required_text(node, "slot", id)?;

    let Some(settings) = configuration_settings(node) else {
        return Ok(CpuSlot {
            id: id.to_string(),
            class: class.to_string(),
            product: String::new(),
            vendor: String::new(),
            description,
            slot,
            clock_min: 0,
            clock_max: 0,
            architecture: 0,
            cores: None,
            threads: None,
        });
    };

    Ok(CpuSlot {
        id: id.to_string(),
        class: class.to_string(),
        product: required_text(node, "product", id)?,
        vendor: required_text(node, "vendor", id)?,
        description,
        slot,
        clock_min: optional_integer(node, "size", id)?.unwrap_or(0),
        clock_max: optional_integer(node, "capacity", id)?.unwrap_or(0),
        architecture: optional_integer(node, "width", id)?.unwrap_or(0),
        cores: setting_integer(&settings, "cores", id)?,
        threads: setting_integer(&settings, "threads", id)?,
    })
}

fn parse_memory_node(node: Node) -> Result<MemorySlot, ParseError> {
    let (id, class) = identity(node)?;
    Ok(MemorySlot {
        id: id.to_string(),
        class: class.to_string(),
        description: required_text(node, "description", id)?,
        slot: required_text(node, "slot", id)?,
        size: optional_integer(node, "size", id)?.unwrap_or(0),
        clock: optional_integer(node, "clock", id)?.unwrap_or(0),
    })
}

fn identity<'a>(node: Node<'a, '_>) -> Result<(&'a str, &'a str), ParseError> {
    let id = node
        .attribute("id")
        .ok_or_else(|| ParseError::missing(node.tag_name().name(), "id"))?;
    let class = node
        .attribute("class")
        .ok_or_else(|| ParseError::missing(id, "class"))?;
    Ok((id, class))
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

/// Text of a direct child element; present but empty elements give `""`
fn child_text(node: Node, name: &str) -> Option<String> {
    child_element(node, name).map(|child| child.text().unwrap_or("").trim().to_string())
}

fn required_text(node: Node, name: &str, id: &str) -> Result<String, ParseError> {
    child_text(node, name).ok_or_else(|| ParseError::missing(id, name))
}

/// Integer child element; absent or blank gives `None`
fn optional_integer<T: FromStr>(node: Node, name: &str, id: &str) -> Result<Option<T>, ParseError> {
    match child_text(node, name) {
        Some(text) if !text.is_empty() => parse_integer(&text, &format!("{id}.{name}")).map(Some),
        _ => Ok(None),
    }
}

/// `setting` id/value pairs of the node's configuration block, if it has one
fn configuration_settings(node: Node) -> Option<HashMap<String, String>> {
    child_element(node, "configuration").map(|configuration| {
        configuration
            .children()
            .filter(|setting| setting.has_tag_name("setting"))
            .filter_map(|setting| {
                Some((
                    setting.attribute("id")?.to_string(),
                    setting.attribute("value")?.to_string(),
                ))
            })
            .collect()
    })
}

fn setting_integer(
    settings: &HashMap<String, String>,
    key: &str,
    id: &str,
) -> Result<Option<u32>, ParseError> {
    settings
        .get(key)
        .map(|value| parse_integer(value, &format!("{id}.{key}")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Inventory;

    const LSHW_XML: &str = r#"<?xml version="1.0" standalone="yes" ?>
<!-- generated by lshw-B.02.19.2 -->
<list>
<node id="hv01" claimed="true" class="system" handle="DMI:0100">
 <description>Rack Mount Chassis</description>
 <product>PowerEdge R640 (SKU=0716;ModelName=PowerEdge R640)</product>
 <vendor>Dell Inc.</vendor>
 <serial>ABC1234</serial>
 <width units="bits">64</width>
 <configuration>
  <setting id="boot" value="normal" />
  <setting id="sku" value="SKU=0716;ModelName=PowerEdge R640" />
 </configuration>
  <node id="core" claimed="true" class="bus" handle="DMI:0200">
   <description>Motherboard</description>
   <product>0H28RR</product>
    <node id="cpu:0" claimed="true" class="processor" handle="DMI:0400">
     <description>CPU</description>
     <product>Intel(R) Xeon(R) Silver 4114 CPU @ 2.20GHz</product>
     <vendor>Intel Corp.</vendor>
     <slot>CPU1</slot>
     <size units="Hz">2200000000</size>
     <capacity units="Hz">4000000000</capacity>
     <width units="bits">64</width>
     <configuration>
      <setting id="cores" value="10" />
      <setting id="enabledcores" value="10" />
      <setting id="threads" value="20" />
     </configuration>
    </node>
    <node id="cpu:1" disabled="true" claimed="true" class="processor" handle="DMI:0401">
     <description>CPU [empty]</description>
     <slot>CPU2</slot>
    </node>
    <node id="memory" claimed="true" class="memory" handle="DMI:1000">
     <description>System Memory</description>
     <slot>System board or motherboard</slot>
     <size units="bytes">17179869184</size>
      <node id="bank:0" claimed="true" class="memory" handle="DMI:1100">
       <description>DIMM DDR4 Synchronous Registered (Buffered) 2666 MHz (0.4 ns)</description>
       <product>M393A2K43BB1-CTD</product>
       <vendor>Samsung</vendor>
       <slot>A1</slot>
       <size units="bytes">17179869184</size>
       <width units="bits">64</width>
       <clock units="Hz">2666000000</clock>
      </node>
      <node id="bank:1" claimed="true" class="memory" handle="DMI:1101">
       <description>[empty]</description>
       <slot>A2</slot>
      </node>
    </node>
    <node id="cache:0" claimed="true" class="memory" handle="DMI:0700">
     <description>L1 cache</description>
     <slot>Not Specified</slot>
     <size units="bytes">655360</size>
    </node>
  </node>
</node>
</list>
"#;

    #[test]
    fn test_parse_machine() {
        let hw = parse_hardware_document(LSHW_XML).unwrap();
        assert_eq!(hw.machine.id, "hv01");
        assert_eq!(hw.machine.class, "system");
        assert_eq!(hw.machine.vendor, "Dell Inc.");
        assert_eq!(hw.machine.serial, "ABC1234");
        assert_eq!(hw.machine.description, "Rack Mount Chassis");
        assert_eq!(
            hw.machine.product_id.as_deref(),
            Some("SKU=0716;ModelName=PowerEdge R640")
        );
    }

    #[test]
    fn test_parse_populated_cpu() {
        let hw = parse_hardware_document(LSHW_XML).unwrap();
        assert_eq!(hw.cpus.len(), 2);
        let cpu = &hw.cpus[0];
        assert_eq!(cpu.id, "cpu:0");
        assert_eq!(cpu.vendor, "Intel Corp.");
        assert_eq!(cpu.slot, "CPU1");
        assert_eq!(cpu.clock_min, 2_200_000_000);
        assert_eq!(cpu.clock_max, 4_000_000_000);
        assert_eq!(cpu.architecture, 64);
        assert_eq!(cpu.cores, Some(10));
        assert_eq!(cpu.threads, Some(20));
        assert!(!cpu.is_empty());
    }

    #[test]
    fn test_cpu_without_configuration_gets_empty_defaults() {
        let hw = parse_hardware_document(LSHW_XML).unwrap();
        let cpu = &hw.cpus[1];
        assert_eq!(cpu.id, "cpu:1");
        assert_eq!(cpu.description, "CPU [empty]");
        assert_eq!(cpu.slot, "CPU2");
        assert_eq!(cpu.product, "");
        assert_eq!(cpu.vendor, "");
        assert_eq!(cpu.clock_min, 0);
        assert_eq!(cpu.clock_max, 0);
        assert_eq!(cpu.architecture, 0);
        assert_eq!(cpu.cores, None);
        assert_eq!(cpu.threads, None);
    }

    #[test]
    fn test_parse_memory_banks_only() {
        let hw = parse_hardware_document(LSHW_XML).unwrap();
        // "memory" and "cache:0" nodes are not banks
        assert_eq!(hw.memory.len(), 2);
        assert_eq!(hw.memory[0].id, "bank:0");
        assert_eq!(hw.memory[0].size, 17_179_869_184);
        assert_eq!(hw.memory[0].clock, 2_666_000_000);
        assert_eq!(hw.memory[1].id, "bank:1");
        assert_eq!(hw.memory[1].size, 0);
        assert_eq!(hw.memory[1].clock, 0);
        assert!(hw.memory[1].is_empty());
    }

    #[test]
    fn test_bare_node_root_without_sku() {
        let xml = r#"<node id="box" class="system">
  <description>Desktop Computer</description>
  <product>OptiPlex</product>
  <vendor>Dell</vendor>
  <serial></serial>
</node>"#;
        let hw = parse_hardware_document(xml).unwrap();
        assert_eq!(hw.machine.id, "box");
        assert_eq!(hw.machine.serial, "");
        assert_eq!(hw.machine.product_id, None);
        assert!(hw.cpus.is_empty());
        assert!(hw.memory.is_empty());
    }

    #[test]
    fn test_missing_machine_serial() {
        let xml = r#"<list><node id="box" class="system">
  <description>Desktop Computer</description>
  <product>OptiPlex</product>
  <vendor>Dell</vendor>
</node></list>"#;
        let err = parse_hardware_document(xml).unwrap_err();
        assert_eq!(err, ParseError::missing("box", "serial"));
    }

    #[test]
    fn test_missing_memory_description() {
        let xml = r#"<list><node id="box" class="system">
  <description>d</description><product>p</product><vendor>v</vendor><serial>s</serial>
  <node id="bank:0" class="memory"><slot>A1</slot></node>
</node></list>"#;
        let err = parse_hardware_document(xml).unwrap_err();
        assert_eq!(err, ParseError::missing("bank:0", "description"));
    }

    fn document_with(child: &str) -> String {
        format!(
            r#"<list><node id="box" class="system">
  <description>d</description><product>p</product><vendor>v</vendor><serial>s</serial>
  {child}
</node></list>"#
        )
    }

    #[test]
    fn test_cpu_without_description() {
        let xml = document_with(r#"<node id="cpu:0" class="processor"><slot>CPU1</slot></node>"#);
        let err = parse_hardware_document(&xml).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingField {
                node: "cpu:0".to_string(),
                field: "description".to_string()
            }
        );
    }

    #[test]
    fn test_cpu_without_slot() {
        let xml = document_with(
            r#"<node id="cpu:0" class="processor"><description>CPU</description></node>"#,
        );
        let err = parse_hardware_document(&xml).unwrap_err();
        assert_eq!(err, ParseError::missing("cpu:0", "slot"));
    }

    #[test]
    fn test_configured_cpu_without_product() {
        let xml = document_with(
            r#"<node id="cpu:0" class="processor">
    <description>CPU</description><vendor>Intel Corp.</vendor><slot>CPU1</slot>
    <configuration><setting id="threads" value="8" /></configuration>
  </node>"#,
        );
        let err = parse_hardware_document(&xml).unwrap_err();
        assert_eq!(err, ParseError::missing("cpu:0", "product"));
    }

    #[test]
    fn test_configured_cpu_without_vendor() {
        let xml = document_with(
            r#"<node id="cpu:0" class="processor">
    <description>CPU</description><product>Xeon</product><slot>CPU1</slot>
    <configuration><setting id="threads" value="8" /></configuration>
  </node>"#,
        );
        let err = parse_hardware_document(&xml).unwrap_err();
        assert_eq!(err, ParseError::missing("cpu:0", "vendor"));
    }

    #[test]
    fn test_unconfigured_cpu_without_marker_adds_no_threads() {
        let xml = document_with(
            r#"<node id="cpu:0" class="processor">
    <description>CPU</description><slot>CPU1</slot>
  </node>
  <node id="cpu:1" class="processor">
    <description>CPU</description><product>Xeon</product><vendor>Intel Corp.</vendor>
    <slot>CPU2</slot>
    <configuration><setting id="threads" value="16" /></configuration>
  </node>"#,
        );
        let hw = parse_hardware_document(&xml).unwrap();
        assert!(!hw.cpus[0].is_empty());
        assert_eq!(hw.cpus[0].threads, None);
        assert_eq!(hw.cpus[0].product, "");

        let inventory = Inventory::new(hw.machine, hw.cpus, hw.memory, vec![], vec![], vec![]);
        assert_eq!(inventory.cpu_installed_count(), 2);
        assert_eq!(inventory.cpu_thread_total(), 16);
    }

    #[test]
    fn test_populated_cpu_without_thread_setting() {
        let xml = r#"<list><node id="box" class="system">
  <description>d</description><product>p</product><vendor>v</vendor><serial>s</serial>
  <node id="cpu" class="processor">
    <description>CPU</description><product>EPYC</product><vendor>AMD</vendor><slot>P0</slot>
    <configuration><setting id="microcode" value="1" /></configuration>
  </node>
</node></list>"#;
        let hw = parse_hardware_document(xml).unwrap();
        assert_eq!(hw.cpus[0].threads, None);
        assert_eq!(hw.cpus[0].clock_max, 0);
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_hardware_document("<list><node id=").unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)));
    }

    #[test]
    fn test_no_system_node() {
        let err = parse_hardware_document("<list></list>").unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)));
    }

    #[test]
    fn test_invalid_clock() {
        let xml = r#"<list><node id="box" class="system">
  <description>d</description><product>p</product><vendor>v</vendor><serial>s</serial>
  <node id="bank:0" class="memory"><description>DIMM</description><slot>A1</slot><clock>fast</clock></node>
</node></list>"#;
        let err = parse_hardware_document(xml).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                field: "bank:0.clock".to_string(),
                value: "fast".to_string()
            }
        );
    }
}
