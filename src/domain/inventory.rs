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

//! Inventory aggregate and derived utilization metrics

use super::entities::{
    CpuSlot, Machine, MemorySlot, PhysicalVolume, VirtualMachine, VolumeGroup,
};
use serde::Serialize;

/// Everything known about one hypervisor snapshot (root aggregate)
///
/// Built once by the loader and never modified. Metrics are recomputed on each
/// call.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Inventory {
    machine: Machine,
    cpus: Vec<CpuSlot>,
    memory: Vec<MemorySlot>,
    physical_volumes: Vec<PhysicalVolume>,
    volume_groups: Vec<VolumeGroup>,
    virtual_machines: Vec<VirtualMachine>,
}

impl Inventory {
    pub fn new(
        machine: Machine,
        cpus: Vec<CpuSlot>,
        memory: Vec<MemorySlot>,
        physical_volumes: Vec<PhysicalVolume>,
        volume_groups: Vec<VolumeGroup>,
        virtual_machines: Vec<VirtualMachine>,
    ) -> Self {
        Self {
            machine,
            cpus,
            memory,
            physical_volumes,
            volume_groups,
            virtual_machines,
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    /// CPU sockets in document order, empty ones included
    pub fn cpus(&self) -> &[CpuSlot] {
        &self.cpus
    }

    /// Memory banks in document order, empty ones included
    pub fn memory(&self) -> &[MemorySlot] {
        &self.memory
    }

    pub fn physical_volumes(&self) -> &[PhysicalVolume] {
        &self.physical_volumes
    }

    pub fn volume_groups(&self) -> &[VolumeGroup] {
        &self.volume_groups
    }

    pub fn virtual_machines(&self) -> &[VirtualMachine] {
        &self.virtual_machines
    }

    pub fn cpu_slot_count(&self) -> usize {
        self.cpus.len()
    }

    pub fn cpu_installed_count(&self) -> usize {
        self.cpus.iter().filter(|cpu| !cpu.is_empty()).count()
    }

    /// Threads across populated sockets
    ///
    /// Empty sockets are filtered out before their thread field is looked at;
    /// populated sockets with an unknown thread count contribute nothing.
    pub fn cpu_thread_total(&self) -> u64 {
        self.cpus
            .iter()
            .filter(|cpu| !cpu.is_empty())
            .filter_map(|cpu| cpu.threads)
            .map(u64::from)
            .sum()
    }

    pub fn memory_slot_count(&self) -> usize {
        self.memory.len()
    }

    pub fn memory_installed_count(&self) -> usize {
        self.memory.iter().filter(|bank| !bank.is_empty()).count()
    }

    /// Sum of the size field of every bank, in bytes
    ///
    /// Banks are not filtered on the empty marker here, unlike the CPU thread
    /// total. Empty banks normally report no size so the result is the same.
    pub fn memory_installed_total_bytes(&self) -> u64 {
        self.memory.iter().map(|bank| bank.size).sum()
    }

    pub fn vm_count(&self) -> usize {
        self.virtual_machines.len()
    }

    pub fn vm_running_count(&self) -> usize {
        self.virtual_machines
            .iter()
            .filter(|vm| vm.is_running())
            .count()
    }

    /// Virtual CPUs allocated across all domains, running or not
    pub fn vm_vcpu_total(&self) -> u64 {
        self.virtual_machines
            .iter()
            .map(|vm| u64::from(vm.cpu()))
            .sum()
    }

    /// Memory allocated across all domains, in KiB
    pub fn vm_memory_total(&self) -> u64 {
        self.virtual_machines.iter().map(VirtualMachine::memory).sum()
    }
}

/// Headline figures of one host, as listed on the fleet index
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct HostSummary {
    pub id: String,
    pub vendor: String,
    pub product: String,
    pub cpu_slots: usize,
    pub cpu_installed: usize,
    pub cpu_threads: u64,
    pub memory_slots: usize,
    pub memory_installed: usize,
    pub memory_total: u64,
    pub vm_total: usize,
    pub vm_running: usize,
    pub vm_vcpu: u64,
    pub vm_memory: u64,
}

impl From<&Inventory> for HostSummary {
    fn from(inventory: &Inventory) -> Self {
        let machine = inventory.machine();
        Self {
            id: machine.id.clone(),
            vendor: machine.vendor.clone(),
            product: machine.product.clone(),
            cpu_slots: inventory.cpu_slot_count(),
            cpu_installed: inventory.cpu_installed_count(),
            cpu_threads: inventory.cpu_thread_total(),
            memory_slots: inventory.memory_slot_count(),
            memory_installed: inventory.memory_installed_count(),
            memory_total: inventory.memory_installed_total_bytes(),
            vm_total: inventory.vm_count(),
            vm_running: inventory.vm_running_count(),
            vm_vcpu: inventory.vm_vcpu_total(),
            vm_memory: inventory.vm_memory_total(),
        }
    }
}

/// Rendered outputs of one host, ready to publish
#[derive(Debug, Clone)]
pub struct HostReport {
    pub inventory: Inventory,
    /// Host page
    pub html: String,
    /// VM CSV lines, header included when configured
    pub vm_csv: Vec<String>,
}

impl HostReport {
    pub fn summary(&self) -> HostSummary {
        HostSummary::from(&self.inventory)
    }
}
