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

//! VM CSV export

use crate::domain::units::kib_to_display_unit;
use crate::domain::Inventory;

/// Header row of the VM export
pub const VM_CSV_HEADER: &str = "hypervisor,name;autoboot;state;cpu;memory";

pub fn vm_csv_header() -> &'static str {
    VM_CSV_HEADER
}

/// One line per virtual machine, optionally preceded by the header
///
/// Rows are `host;name;autoboot;state;vcpu;memory` with memory in display
/// units.
pub fn vm_csv_lines(inventory: &Inventory, header: bool) -> Vec<String> {
    let host = &inventory.machine().id;
    let rows = inventory.virtual_machines().iter().map(|vm| {
        format!(
            "{};{};{};{};{};{}",
            host,
            vm.name(),
            vm.autoboot(),
            vm.state(),
            vm.cpu(),
            kib_to_display_unit(vm.memory())
        )
    });

    if header {
        std::iter::once(VM_CSV_HEADER.to_string()).chain(rows).collect()
    } else {
        rows.collect()
    }
}
