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

//! HTML host page and fleet index

use crate::domain::units::{hz_to_ghz, kib_to_display_unit, percent, to_display_unit};
use crate::domain::{HostSummary, Inventory};

const HEALTHY: &str = "green";
const UNHEALTHY: &str = "red";

const PAGE_HEAD: &str = r#"<html>
<head>
<meta content="text/html;charset=utf-8" http-equiv="Content-Type">
<meta content="utf-8" http-equiv="encoding">
</head>
"#;

const CLEAR: &str = r#"<div style="clear: both;"></div>"#;

/// Escape text for use in element content and attribute values
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn card(title: &str, background: &str, lines: &[(&str, String)]) -> String {
    let body: String = lines
        .iter()
        .map(|(label, value)| format!("{label} : {}<br>\n", escape(value)))
        .collect();
    format!(
        r#"<div style="float: left; padding: 20px;">
<h2>{}</h2>
<p style="padding: 5px; border: 1px solid black; border-radius: 5px; background-color: {background}">
{body}</p>
</div>
"#,
        escape(title)
    )
}

fn machine_section(inventory: &Inventory) -> String {
    let machine = inventory.machine();
    let host_memory = to_display_unit(inventory.memory_installed_total_bytes());
    format!(
        r#"<h1 style="text-align: center;">{id}</h1>
<p style="border: 1px solid black; text-align: center;">
{vendor} {product} ({description})<br>
serial : {serial}<br>
product id : {product_id}<br>
-----<br>
processor slots : {cpu_slots}<br>
installed processors : {cpu_installed}<br>
memory slots : {memory_slots}<br>
installed memory : {memory_installed}<br>
total memory amount : {host_memory}GiB<br>
-----<br>
running virtual machines : {vm_running}/{vm_total}<br>
cpu used by virtual machines : {vm_cpu}/{threads}<br>
memory used by virtual machines : {vm_memory}/{host_memory}GiB<br>
</p>
"#,
        id = escape(&machine.id),
        vendor = escape(&machine.vendor),
        product = escape(&machine.product),
        description = escape(&machine.description),
        serial = escape(&machine.serial),
        product_id = escape(machine.product_id.as_deref().unwrap_or("unknown")),
        cpu_slots = inventory.cpu_slot_count(),
        cpu_installed = inventory.cpu_installed_count(),
        memory_slots = inventory.memory_slot_count(),
        memory_installed = inventory.memory_installed_count(),
        vm_running = inventory.vm_running_count(),
        vm_total = inventory.vm_count(),
        vm_cpu = inventory.vm_vcpu_total(),
        threads = inventory.cpu_thread_total(),
        vm_memory = kib_to_display_unit(inventory.vm_memory_total()),
    )
}

fn physical_volume_section(inventory: &Inventory) -> String {
    inventory
        .physical_volumes()
        .iter()
        .map(|pv| {
            format!(
                r#"<h2>{name}</h2>
<p>
Size : {size}GiB<br>
Free : {free}GiB ({percent_free}%)<br>
</p>
<div style="background-color: black; border-radius: 9px; padding: 3px;">
<div style="background-color: orange; width: {percent_used}%; height: 20px; border-radius: 5px;"></div>
</div>
"#,
                name = escape(&pv.name),
                size = to_display_unit(pv.size),
                free = to_display_unit(pv.free),
                percent_free = percent(pv.free, pv.size),
                percent_used = percent(pv.used(), pv.size),
            )
        })
        .collect()
}

fn virtual_machine_section(inventory: &Inventory) -> String {
    inventory
        .virtual_machines()
        .iter()
        .map(|vm| {
            let background = if vm.is_running() { HEALTHY } else { UNHEALTHY };
            card(
                vm.name(),
                background,
                &[
                    ("state", vm.state().to_string()),
                    ("autoboot", vm.autoboot().to_string()),
                    ("cpu", vm.cpu().to_string()),
                    ("memory", format!("{}GiB", kib_to_display_unit(vm.memory()))),
                ],
            )
        })
        .collect()
}

fn cpu_section(inventory: &Inventory) -> String {
    let unknown = || "unknown".to_string();
    inventory
        .cpus()
        .iter()
        .map(|cpu| {
            let background = if cpu.is_empty() { UNHEALTHY } else { HEALTHY };
            card(
                &cpu.id,
                background,
                &[
                    ("product", cpu.product.clone()),
                    ("vendor", cpu.vendor.clone()),
                    ("description", cpu.description.clone()),
                    ("slot", cpu.slot.clone()),
                    ("clock_min", format!("{}GHz", hz_to_ghz(cpu.clock_min))),
                    ("clock_max", format!("{}GHz", hz_to_ghz(cpu.clock_max))),
                    ("architecture", format!("{}Bits", cpu.architecture)),
                    ("cores", cpu.cores.map_or_else(unknown, |c| c.to_string())),
                    ("threads", cpu.threads.map_or_else(unknown, |t| t.to_string())),
                ],
            )
        })
        .collect()
}

fn memory_section(inventory: &Inventory) -> String {
    inventory
        .memory()
        .iter()
        .map(|bank| {
            let background = if bank.is_empty() { UNHEALTHY } else { HEALTHY };
            card(
                &bank.id,
                background,
                &[
                    ("description", bank.description.clone()),
                    ("slot", bank.slot.clone()),
                    ("size", format!("{}GiB", to_display_unit(bank.size))),
                    ("clock", format!("{}GHz", hz_to_ghz(bank.clock))),
                ],
            )
        })
        .collect()
}

/// Render the page of one host
///
/// # Arguments
/// * `inventory` - Loaded host model
/// * `index_link` - Optional href back to the fleet index
///
/// # Returns
/// * Complete HTML document
pub fn render_host(inventory: &Inventory, index_link: Option<&str>) -> String {
    let mut html = String::from(PAGE_HEAD);
    if let Some(href) = index_link {
        html.push_str(&format!(
            "<tt><a href=\"{}\" style=\"font-size:20px; float:left;\">&#8618; Back to server list</a></tt>\n",
            escape(href)
        ));
    }
    html.push_str(&machine_section(inventory));
    html.push_str(&physical_volume_section(inventory));
    html.push_str(&virtual_machine_section(inventory));
    html.push_str(CLEAR);
    html.push_str(&cpu_section(inventory));
    html.push_str(CLEAR);
    html.push_str(&memory_section(inventory));
    html.push_str("</html>\n");
    html
}

/// Render the fleet index, one row per host linking to `<host dir>/index.html`
///
/// # Arguments
/// * `hosts` - Host summaries paired with their output directory names
pub fn render_index(hosts: &[(String, HostSummary)]) -> String {
    let rows: String = hosts
        .iter()
        .map(|(dir, host)| {
            format!(
                "<tr><td><a href=\"{dir}/index.html\">{id}</a></td><td>{vendor} {product}</td>\
<td>{cpu_installed}/{cpu_slots}</td><td>{threads}</td>\
<td>{memory_installed}/{memory_slots}</td><td>{memory}GiB</td>\
<td>{vm_running}/{vm_total}</td><td>{vm_vcpu}</td><td>{vm_memory}GiB</td></tr>\n",
                dir = escape(dir),
                id = escape(&host.id),
                vendor = escape(&host.vendor),
                product = escape(&host.product),
                cpu_installed = host.cpu_installed,
                cpu_slots = host.cpu_slots,
                threads = host.cpu_threads,
                memory_installed = host.memory_installed,
                memory_slots = host.memory_slots,
                memory = to_display_unit(host.memory_total),
                vm_running = host.vm_running,
                vm_total = host.vm_total,
                vm_vcpu = host.vm_vcpu,
                vm_memory = kib_to_display_unit(host.vm_memory),
            )
        })
        .collect();

    format!(
        r#"{PAGE_HEAD}<h1>Hypervisors</h1>
<table border="1" cellpadding="5">
<tr><th>host</th><th>model</th><th>processors</th><th>threads</th><th>memory slots</th><th>memory</th><th>running vms</th><th>vm cpu</th><th>vm memory</th></tr>
{rows}</table>
</html>
"#
    )
}
