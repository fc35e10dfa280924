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

//! Virtual machine export parsing functions

use super::common::{parse_integer, split_record};
use crate::domain::{ParseError, VirtualMachine};

const VM_EXPORT: &str = "vm";
const VM_FIELDS: usize = 5;

/// Parse one VM export record: `name,state,vcpu,memory,autoboot`
///
/// # Arguments
/// * `line` - Raw export line
/// * `line_number` - 1-based line number for error reporting
///
/// # Returns
/// * `Ok(VirtualMachine)` - Parsed domain, memory scaled by 1024
/// * `Err(ParseError)` - Wrong field count or non-numeric vcpu/memory
pub fn parse_vm_record(line: &str, line_number: usize) -> Result<VirtualMachine, ParseError> {
    let fields = split_record(line, VM_FIELDS, VM_EXPORT, line_number)?;
    let (name, state, autoboot) = (fields[0], fields[1], fields[4]);
    let cpu: u32 = parse_integer(fields[2], "vm.cpu")?;
    let memory: u64 = parse_integer(fields[3], "vm.memory")?;

    VirtualMachine::new(name, state, cpu, memory, autoboot).ok_or_else(|| {
        ParseError::InvalidNumber {
            field: "vm.memory".to_string(),
            value: fields[3].to_string(),
        }
    })
}

/// Parse the VM export, one domain per line
///
/// Whitespace-only lines are skipped; order is preserved.
///
/// # Arguments
/// * `content` - Full export contents
///
/// # Returns
/// * `Ok(Vec<VirtualMachine>)` - All domains
/// * `Err(ParseError)` - First malformed record
pub fn parse_vm_export(content: &str) -> Result<Vec<VirtualMachine>, ParseError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_vm_record(line, index + 1))
        .collect()
}
